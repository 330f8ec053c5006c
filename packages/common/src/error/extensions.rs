//! Extension traits for attaching context to results and options

use super::types::{Error, ErrorKind, Result};
use std::fmt;

/// Context helpers for `Result<T, Error>`
pub trait ResultExt<T> {
    /// Prepend context to the error, if any
    ///
    /// # Errors
    ///
    /// Returns the original error with `context` prepended.
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: fmt::Display,
        F: FnOnce() -> C;
}

impl<T> ResultExt<T> for Result<T> {
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: fmt::Display,
        F: FnOnce() -> C,
    {
        self.map_err(|e| e.context(f()))
    }
}

/// Conversion helpers for `Option<T>`
pub trait OptionExt<T> {
    /// Turn `None` into an error of the given kind
    ///
    /// # Errors
    ///
    /// Returns an error of `kind` carrying `message` when `self` is `None`.
    fn ok_or_kind<M: Into<String>>(self, kind: ErrorKind, message: M) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_kind<M: Into<String>>(self, kind: ErrorKind, message: M) -> Result<T> {
        self.ok_or_else(|| Error::msg(kind, message))
    }
}
