//! CLI command implementations.

pub mod adjust;
