//! The {count, sum, min, max} reduction algebra
//!
//! `merge` is associative and commutative with [`Accumulator::IDENTITY`] as
//! the identity element, which is what lets every strategy split the scan
//! arbitrarily across threads and still agree on the result. SUM wraps in
//! two's complement; COUNT, MIN and MAX cannot overflow under realistic
//! inputs.

/// Per-key aggregation state: (count, sum, min, max).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Accumulator {
    /// Number of rows absorbed
    pub count: i64,
    /// Wrapping sum of absorbed values
    pub sum: i64,
    /// Minimum absorbed value
    pub min: i64,
    /// Maximum absorbed value
    pub max: i64,
}

impl Accumulator {
    /// Identity element: absorbs and merges as a no-op.
    pub const IDENTITY: Accumulator = Accumulator {
        count: 0,
        sum: 0,
        min: i64::MAX,
        max: i64::MIN,
    };

    /// Accumulator holding exactly one value.
    #[inline]
    pub fn of_value(v: i64) -> Self {
        Self {
            count: 1,
            sum: v,
            min: v,
            max: v,
        }
    }

    /// Absorb one row value: `self ⊕ (1, v, v, v)`.
    #[inline]
    pub fn absorb_value(&mut self, v: i64) {
        self.count += 1;
        self.sum = self.sum.wrapping_add(v);
        self.min = self.min.min(v);
        self.max = self.max.max(v);
    }

    /// Component-wise combine: `self ⊕ other`.
    #[inline]
    pub fn merge(&mut self, other: &Accumulator) {
        self.count += other.count;
        self.sum = self.sum.wrapping_add(other.sum);
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }
}

impl Default for Accumulator {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_identity_absorbs_first_value() {
        let mut acc = Accumulator::IDENTITY;
        acc.absorb_value(5);
        assert_eq!(acc, Accumulator::of_value(5));
    }

    #[test]
    fn test_absorb_sequence() {
        let mut acc = Accumulator::IDENTITY;
        for v in [10, -3, 7] {
            acc.absorb_value(v);
        }
        assert_eq!(acc.count, 3);
        assert_eq!(acc.sum, 14);
        assert_eq!(acc.min, -3);
        assert_eq!(acc.max, 10);
    }

    #[test]
    fn test_sum_wraps() {
        let mut acc = Accumulator::of_value(i64::MAX);
        acc.absorb_value(1);
        assert_eq!(acc.sum, i64::MIN);
        assert_eq!(acc.count, 2);
    }

    fn arb_acc() -> impl Strategy<Value = Accumulator> {
        (any::<i64>(), any::<i64>(), any::<i64>()).prop_map(|(a, b, c)| {
            let mut acc = Accumulator::IDENTITY;
            acc.absorb_value(a);
            acc.absorb_value(b);
            acc.absorb_value(c);
            acc
        })
    }

    proptest! {
        #[test]
        fn prop_merge_identity(acc in arb_acc()) {
            let mut merged = acc;
            merged.merge(&Accumulator::IDENTITY);
            prop_assert_eq!(merged, acc);
        }

        #[test]
        fn prop_merge_commutative(a in arb_acc(), b in arb_acc()) {
            let mut ab = a;
            ab.merge(&b);
            let mut ba = b;
            ba.merge(&a);
            prop_assert_eq!(ab, ba);
        }

        #[test]
        fn prop_merge_associative(a in arb_acc(), b in arb_acc(), c in arb_acc()) {
            let mut ab_c = a;
            ab_c.merge(&b);
            ab_c.merge(&c);

            let mut bc = b;
            bc.merge(&c);
            let mut a_bc = a;
            a_bc.merge(&bc);

            prop_assert_eq!(ab_c, a_bc);
        }

        #[test]
        fn prop_absorb_is_merge_of_singleton(acc in arb_acc(), v in any::<i64>()) {
            let mut absorbed = acc;
            absorbed.absorb_value(v);
            let mut merged = acc;
            merged.merge(&Accumulator::of_value(v));
            prop_assert_eq!(absorbed, merged);
        }
    }
}
