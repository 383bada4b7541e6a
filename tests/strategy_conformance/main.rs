//! Strategy Conformance Tests
//!
//! Every engine must produce the sequential baseline's multiset of output
//! tuples for any input and thread count. Heavy full-size scenarios are
//! marked #[ignore]; run with: cargo test --test strategy_conformance -- --ignored

#[path = "../common/mod.rs"]
mod common;

mod adaptive_selection;
mod end_to_end;
mod equivalence;
mod scenarios;
mod stress;
