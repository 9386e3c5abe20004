//! Foundation layer: shared data types.

pub mod types;
