//! CA lifecycle service
//!
//! Thin orchestration over one [`CaSecrets`] backend. Each operation
//! validates its input, then makes exactly one backend call. Nothing is
//! retried and nothing is cached; the backend's answer is authoritative.

use std::future::Future;
use std::sync::Arc;

use cabinet_common::{LoggingTransformer, RequestContext, Result, ResultExt, ensure};

use crate::secrets::CaSecrets;
use crate::types::{Ca, CaCrt, CaImport, Cas};

/// Lifecycle operations exposed to transport layers
#[derive(Clone)]
pub struct CaLifecycleService {
    backend: Arc<dyn CaSecrets>,
}

/// Reject names that would reach the backend empty or address another path
///
/// Surrounding whitespace is stripped.
fn validate_name(name: &str) -> Result<&str> {
    let name = name.trim();
    ensure!(!name.is_empty(), InvalidName, "CA name must not be empty");
    ensure!(!name.contains('/'), InvalidName, "CA name {name:?} must not contain '/'");
    Ok(name)
}

impl CaLifecycleService {
    /// Wrap a connected backend
    pub fn new(backend: Arc<dyn CaSecrets>) -> Self {
        Self { backend }
    }

    /// Identifier of the active backend
    #[must_use]
    pub fn backend_name(&self) -> &'static str {
        self.backend.backend_name()
    }

    /// Run one backend call with context tagging and outcome logging
    async fn observe<T, F>(
        &self,
        ctx: &RequestContext,
        operation: &str,
        ca_name: &str,
        call: F,
    ) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        tracing::debug!(
            request_id = %ctx.request_id(),
            backend = self.backend.backend_name(),
            operation,
            ca = ca_name,
            "Starting CA operation"
        );

        let result = call.await.with_context(|| format!("{operation} {ca_name}"));
        LoggingTransformer::log_ca_operation(operation, ca_name, result.is_ok());
        if let Err(e) = &result {
            tracing::warn!(
                request_id = %ctx.request_id(),
                operation,
                ca = ca_name,
                kind = ?e.kind(),
                "CA operation failed"
            );
        }
        result
    }

    /// List every CA in the backend
    ///
    /// # Errors
    ///
    /// Backend errors, tagged `list_cas`.
    pub async fn list_cas(&self, ctx: &RequestContext) -> Result<Cas> {
        self.observe(ctx, "list_cas", "*", self.backend.enumerate()).await
    }

    /// Public certificate of `name`
    ///
    /// # Errors
    ///
    /// `InvalidName` before any backend call; `NotFound` if absent.
    pub async fn get_ca_certificate(&self, ctx: &RequestContext, name: &str) -> Result<CaCrt> {
        let name = validate_name(name)?;
        self.observe(ctx, "get_ca_certificate", name, self.backend.fetch_certificate(name)).await
    }

    /// Metadata extracted from the certificate of `name`
    ///
    /// # Errors
    ///
    /// `InvalidName` before any backend call; `NotFound` if absent;
    /// extraction errors for unreadable certificates.
    pub async fn get_ca_info(&self, ctx: &RequestContext, name: &str) -> Result<Ca> {
        let name = validate_name(name)?;
        self.observe(ctx, "get_ca_info", name, self.backend.fetch_metadata(name)).await
    }

    /// Provision a new CA called `name`
    ///
    /// # Errors
    ///
    /// `InvalidName` or `InvalidParameters` before any backend call;
    /// `AlreadyExists` if the name is taken.
    pub async fn create_ca(&self, ctx: &RequestContext, name: &str, spec: &Ca) -> Result<()> {
        let name = validate_name(name)?;
        spec.validate_key_spec()?;
        self.observe(ctx, "create_ca", name, self.backend.create(name, spec)).await
    }

    /// Provision `name` from an external certificate and key
    ///
    /// # Errors
    ///
    /// `InvalidName` before any backend call; `KeyCertMismatch`,
    /// `AlreadyExists` from the backend.
    pub async fn import_ca(
        &self,
        ctx: &RequestContext,
        name: &str,
        bundle: &CaImport,
    ) -> Result<()> {
        let name = validate_name(name)?;
        self.observe(ctx, "import_ca", name, self.backend.import(name, bundle)).await
    }

    /// Irreversibly delete `name`
    ///
    /// # Errors
    ///
    /// `InvalidName` before any backend call; `NotFound` if absent.
    pub async fn delete_ca(&self, ctx: &RequestContext, name: &str) -> Result<()> {
        let name = validate_name(name)?;
        self.observe(ctx, "delete_ca", name, self.backend.delete(name)).await
    }

    /// Backend liveness
    ///
    /// # Errors
    ///
    /// `BackendUnavailable` when the backend cannot serve requests.
    pub async fn health(&self, ctx: &RequestContext) -> Result<()> {
        self.observe(ctx, "health", "-", self.backend.health()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cabinet_common::ErrorKind;

    #[test]
    fn name_validation() {
        assert_eq!(validate_name("root-a").unwrap(), "root-a");
        assert_eq!(validate_name("  root-a\n").unwrap(), "root-a");
        for bad in ["", "   ", "pki/root", "/root"] {
            assert_eq!(validate_name(bad).unwrap_err().kind(), ErrorKind::InvalidName, "{bad:?}");
        }
    }
}
