//! Structured logging bootstrap
//!
//! Library code emits events through `tracing`; with no subscriber installed
//! the `log` feature forwards them to the `env_logger` backend set up here.

use log::{error, info, warn};
use sha2::{Digest, Sha256};
use std::sync::Once;

static INIT_LOGGER: Once = Once::new();

/// Logging setup and privacy-preserving log helpers
pub struct LoggingTransformer;

impl LoggingTransformer {
    /// Initialize logging once at process start-up
    ///
    /// Levels come from `RUST_LOG`, for example:
    /// - `RUST_LOG=info` for operation outcomes
    /// - `RUST_LOG=cabinet_ca=debug` for backend request traces
    pub fn init() {
        INIT_LOGGER.call_once(|| {
            env_logger::Builder::from_default_env()
                .format_timestamp_micros()
                .init();

            info!("Structured logging initialized");
        });
    }

    /// Initialize logging for tests
    ///
    /// Safe to call from every test; later calls are ignored.
    pub fn init_test() {
        let _ = env_logger::Builder::from_default_env()
            .is_test(true)
            .try_init();
    }

    /// Log the outcome of a CA lifecycle operation
    pub fn log_ca_operation(operation: &str, ca_name: &str, success: bool) {
        if success {
            info!("CA operation succeeded: {operation} (ca: {ca_name})");
        } else {
            warn!("CA operation failed: {operation} (ca: {ca_name})");
        }
    }

    /// Log an authentication event
    ///
    /// The subject is hashed so logs stay traceable without exposing identities.
    pub fn log_auth_event(subject: Option<&str>, success: bool) {
        let subject_hash = subject.map_or_else(|| "anonymous".to_string(), Self::secure_hash);
        if success {
            info!("Request authorized (subject_hash: {subject_hash})");
        } else {
            warn!("Request rejected (subject_hash: {subject_hash})");
        }
    }

    /// Log a storage backend failure without its payload
    pub fn log_backend_error(operation: &str, error: &dyn std::error::Error) {
        error!(
            "Backend operation failed: {} (error_type: {})",
            operation,
            std::any::type_name_of_val(error)
        );
    }

    /// First 12 hex chars of the SHA-256 digest, `#`-prefixed
    fn secure_hash(value: &str) -> String {
        let hash = Sha256::digest(value.as_bytes());
        let hex_hash = format!("{hash:x}");
        format!("#{}", &hex_hash[..12])
    }
}
