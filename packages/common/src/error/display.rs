//! Rendering of errors and their cause chains
//!
//! `{}` prints the kind and context, then one `Caused by:` line per error in
//! the source chain. `{:#}` prints the same chain on a single line, joined
//! with `: `, for structured output.

use super::types::Error;
use std::error::Error as StdError;
use std::fmt;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let separator = if f.alternate() { ": " } else { "\nCaused by: " };

        write!(f, "{}", self.inner.kind)?;
        if let Some(context) = &self.inner.context {
            write!(f, ": {context}")?;
        }

        let mut cause = self.source();
        while let Some(err) = cause {
            write!(f, "{separator}{err}")?;
            cause = err.source();
        }
        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner
            .source
            .as_deref()
            .map(|e| e as &(dyn StdError + 'static))
    }
}
