//! Shared error definitions and filesystem helpers used across the dazzle crates.

pub mod error;
pub mod fs;

pub use error::{Error, FromMessage, Result};
