//! Error handling with context propagation
//!
//! - A closed [`ErrorKind`] set that callers branch on
//! - Context chaining that never changes the kind
//! - Backtrace capture behind the `full-backtrace` feature
//! - [`ErrorClass`] for transport-side status mapping

pub mod constructors;
pub mod display;
pub mod extensions;
pub mod macros;
pub mod types;

pub use extensions::{OptionExt, ResultExt};
pub use types::{Error, ErrorClass, ErrorKind, Result};
