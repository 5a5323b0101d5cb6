//! Shared foundation for life_trace crates.

pub mod error;

pub use error::{Error, ErrorCategory, Result, StructuredError};
