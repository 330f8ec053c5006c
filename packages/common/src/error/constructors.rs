//! Error constructors and methods

use super::types::{Error, ErrorClass, ErrorInner, ErrorKind};
use std::fmt;
use std::sync::Arc;

impl Error {
    /// Create a new error with the given kind
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self::build(kind, None, None)
    }

    /// Create an error with a source error
    #[must_use]
    pub fn with_source<E>(kind: ErrorKind, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::build(kind, None, Some(Arc::new(source)))
    }

    /// Create an error of `kind` carrying `message` as its context
    pub fn msg<M: Into<String>>(kind: ErrorKind, message: M) -> Self {
        Self::build(kind, Some(message.into()), None)
    }

    fn build(
        kind: ErrorKind,
        context: Option<String>,
        source: Option<Arc<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self {
            inner: Arc::new(ErrorInner {
                kind,
                context,
                source,
                #[cfg(feature = "full-backtrace")]
                backtrace: Arc::new(backtrace::Backtrace::new()),
            }),
        }
    }

    /// Add context to this error
    ///
    /// The new context is placed in front of any existing one; kind and
    /// source are preserved.
    #[must_use]
    pub fn context<C: fmt::Display>(self, context: C) -> Self {
        let context = match &self.inner.context {
            Some(existing) => format!("{context}: {existing}"),
            None => context.to_string(),
        };
        Self {
            inner: Arc::new(ErrorInner {
                kind: self.inner.kind,
                context: Some(context),
                source: self.inner.source.clone(),
                #[cfg(feature = "full-backtrace")]
                backtrace: Arc::clone(&self.inner.backtrace),
            }),
        }
    }

    /// Get the error kind
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.inner.kind
    }

    /// Transport-neutral class of this error
    #[must_use]
    pub fn class(&self) -> ErrorClass {
        self.inner.kind.class()
    }

    /// Get the error context if any
    #[must_use]
    pub fn get_context(&self) -> Option<&str> {
        self.inner.context.as_deref()
    }

    /// Get the backtrace
    #[cfg(feature = "full-backtrace")]
    #[must_use]
    pub fn backtrace(&self) -> &backtrace::Backtrace {
        &self.inner.backtrace
    }

    /// Create an invalid name error
    pub fn invalid_name<M: Into<String>>(message: M) -> Self {
        Self::msg(ErrorKind::InvalidName, message)
    }

    /// Create an invalid parameters error
    pub fn invalid_parameters<M: Into<String>>(message: M) -> Self {
        Self::msg(ErrorKind::InvalidParameters, message)
    }

    /// Create a malformed PEM error
    pub fn malformed_pem<M: Into<String>>(message: M) -> Self {
        Self::msg(ErrorKind::MalformedPem, message)
    }

    /// Create an unexpected block type error
    pub fn unexpected_block_type<M: Into<String>>(message: M) -> Self {
        Self::msg(ErrorKind::UnexpectedBlockType, message)
    }

    /// Create a certificate parse error
    pub fn certificate_parse<M: Into<String>>(message: M) -> Self {
        Self::msg(ErrorKind::CertificateParse, message)
    }

    /// Create a not found error
    pub fn not_found<M: Into<String>>(message: M) -> Self {
        Self::msg(ErrorKind::NotFound, message)
    }

    /// Create an already exists error
    pub fn already_exists<M: Into<String>>(message: M) -> Self {
        Self::msg(ErrorKind::AlreadyExists, message)
    }

    /// Create a key/certificate mismatch error
    pub fn key_cert_mismatch<M: Into<String>>(message: M) -> Self {
        Self::msg(ErrorKind::KeyCertMismatch, message)
    }

    /// Create a backend unavailable error
    pub fn backend_unavailable<M: Into<String>>(message: M) -> Self {
        Self::msg(ErrorKind::BackendUnavailable, message)
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}
