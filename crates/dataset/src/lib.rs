//! Dataset I/O for the aggregation testbed
//!
//! - [`loader`]: gzipped `key,val` CSV into a frozen row table
//! - [`validation`]: reference aggregates and exact-match checking
//! - [`generator`]: synthetic datasets under chosen key distributions
//!
//! The core never sees files; everything here terminates in either a
//! [`groupby_core::RowTable`] or a reference map.

pub mod generator;
pub mod loader;
pub mod validation;

pub use generator::{generate, Distribution, GeneratorConfig};
pub use loader::load_dataset;
pub use validation::{load_validation, validate};
