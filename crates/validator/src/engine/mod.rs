//! Validation execution
//!
//! - [`Validator`]: the recursive traversal
//! - [`ValidationContext`] / [`PathScope`]: per-call path, depth and errors
//! - [`ValidatorOptions`] / [`DepthPolicy`]: limits and behaviour switches

mod config;
mod context;
mod validator;

pub use config::{DEFAULT_MAX_DEPTH, DepthPolicy, ValidatorOptions};
pub use context::{PathScope, ValidationContext};
pub use validator::Validator;
