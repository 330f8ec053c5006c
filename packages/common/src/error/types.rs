//! Core error types and definitions

use std::sync::Arc;
use thiserror::Error;

/// Core error type with context propagation support
///
/// Cloning is cheap: the payload lives behind an `Arc`, so an error can be
/// logged, wrapped and returned without copying its source chain.
#[derive(Debug, Clone)]
pub struct Error {
    /// The actual error
    pub(super) inner: Arc<ErrorInner>,
}

#[derive(Debug)]
pub(super) struct ErrorInner {
    /// The error kind
    pub kind: ErrorKind,
    /// Optional error context, outermost first
    pub context: Option<String>,
    /// Optional source error
    pub source: Option<Arc<dyn std::error::Error + Send + Sync>>,
    /// Backtrace captured at error creation
    #[cfg(feature = "full-backtrace")]
    pub backtrace: Arc<backtrace::Backtrace>,
}

/// Closed set of failure kinds surfaced by CA lifecycle operations
///
/// Callers branch on the kind, never on message text or error identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ErrorKind {
    /// Missing, empty or otherwise unusable CA identifier
    #[error("Invalid CA name")]
    InvalidName,

    /// Inconsistent or unsupported creation/import parameters
    #[error("Invalid parameters")]
    InvalidParameters,

    /// Input contained no PEM block
    #[error("Malformed PEM")]
    MalformedPem,

    /// PEM block was not a bare `CERTIFICATE` block
    #[error("Unexpected PEM block type")]
    UnexpectedBlockType,

    /// DER payload is not a valid X.509 certificate
    #[error("Certificate parse error")]
    CertificateParse,

    /// No CA with the requested name
    #[error("Not found")]
    NotFound,

    /// A CA with the requested name already exists
    #[error("Already exists")]
    AlreadyExists,

    /// Private key does not belong to the certificate
    #[error("Key does not match certificate")]
    KeyCertMismatch,

    /// Storage backend could not be reached or refused the session
    #[error("Backend unavailable")]
    BackendUnavailable,

    /// Backend failure that fits no other kind
    #[error("Unknown backend error")]
    Unknown,
}

/// Transport-neutral classification of an [`ErrorKind`]
///
/// Transport layers map these classes onto their own status codes; the core
/// never hardcodes protocol codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// The caller sent something unusable
    Client,
    /// The addressed CA does not exist
    NotFound,
    /// The request collides with existing state
    Conflict,
    /// Anything the caller cannot fix by changing the request
    Server,
}

impl ErrorKind {
    /// Classify this kind for the transport boundary
    #[must_use]
    pub fn class(self) -> ErrorClass {
        match self {
            Self::InvalidName | Self::InvalidParameters => ErrorClass::Client,
            Self::NotFound => ErrorClass::NotFound,
            Self::AlreadyExists | Self::KeyCertMismatch => ErrorClass::Conflict,
            Self::MalformedPem
            | Self::UnexpectedBlockType
            | Self::CertificateParse
            | Self::BackendUnavailable
            | Self::Unknown => ErrorClass::Server,
        }
    }

    /// True for kinds produced by certificate extraction
    #[must_use]
    pub fn is_extraction(self) -> bool {
        matches!(
            self,
            Self::MalformedPem | Self::UnexpectedBlockType | Self::CertificateParse
        )
    }
}

/// Result type alias using our Error
pub type Result<T> = std::result::Result<T, Error>;
