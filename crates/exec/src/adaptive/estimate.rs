//! Group-cardinality estimation from a uniform sample
//!
//! After k samples from a population with G distinct keys drawn uniformly,
//! the expected number of distinct keys seen is
//! `E(k, G) = G · (1 − ((G−1)/G)^k)`. The estimator inverts this: given the
//! observed distinct count g̃, solve `E(k, G) = g̃` for G. E is monotone
//! increasing in G, so a doubling search brackets the root and bisection
//! pins it down to a tolerance of one key.

/// Hard ceiling on the estimate, to bound the doubling search on
/// near-saturated samples where the inversion diverges.
pub const ESTIMATE_CAP: f64 = 1e7;

/// Expected distinct keys after `k` uniform samples from `g` groups.
pub fn expected_distinct(k: f64, g: f64) -> f64 {
    if g <= 0.0 {
        return 0.0;
    }
    g * (1.0 - ((g - 1.0) / g).powf(k))
}

/// Estimate the total distinct-key count from a sample of `sample_len`
/// rows in which `distinct_seen` distinct keys appeared.
///
/// `distinct_seen` is clamped to `sample_len − 1` first: a fully saturated
/// sample carries no upper-bound information and would send the inversion
/// to infinity.
pub fn estimate_g(sample_len: usize, distinct_seen: usize) -> f64 {
    if sample_len == 0 || distinct_seen == 0 {
        return 0.0;
    }
    let k = sample_len as f64;
    let g_tilde = distinct_seen.min(sample_len.saturating_sub(1)) as f64;
    if g_tilde < 1.0 {
        return 1.0;
    }

    // Bracket: E(k, g_tilde) <= g_tilde always, so double upward.
    let mut lo = g_tilde;
    let mut hi = g_tilde.max(1.0);
    while expected_distinct(k, hi) < g_tilde && hi < ESTIMATE_CAP {
        hi = (hi * 2.0).min(ESTIMATE_CAP);
    }

    while hi - lo > 1.0 {
        let mid = (lo + hi) / 2.0;
        if expected_distinct(k, mid) < g_tilde {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    hi
}
