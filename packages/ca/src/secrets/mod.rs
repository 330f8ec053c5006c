//! CA secrets contract and its backend adapters
//!
//! The lifecycle service talks to exactly one [`CaSecrets`] implementation,
//! chosen once at start-up from configuration. Every operation is addressed
//! by CA name and keeps no state between calls.

pub mod memory;
pub mod ttl;
pub mod vault;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use cabinet_common::{Error, Result, ResultExt};

use crate::certificate;
use crate::config::CabinetConfig;
use crate::types::{Ca, CaCrt, CaImport, Cas};

pub use memory::MemorySecrets;
pub use vault::VaultPki;

/// Capability set every CA storage backend provides
#[async_trait]
pub trait CaSecrets: Send + Sync {
    /// List every CA provisioned in the backend
    ///
    /// An empty backend yields an empty collection, not an error.
    async fn enumerate(&self) -> Result<Cas>;

    /// Fetch the public certificate of `ca_name`
    ///
    /// Fails with `NotFound` when no such CA exists.
    async fn fetch_certificate(&self, ca_name: &str) -> Result<CaCrt>;

    /// Fetch the certificate of `ca_name` and extract its metadata
    ///
    /// Extraction errors keep their kind and are tagged with the CA name.
    async fn fetch_metadata(&self, ca_name: &str) -> Result<Ca> {
        let crt = self.fetch_certificate(ca_name).await?;
        let mut ca = certificate::extract(crt.crt.as_bytes())
            .with_context(|| format!("certificate of {ca_name}"))?;
        ca.ca_name = ca_name.to_string();
        Ok(ca)
    }

    /// Provision a new CA under an unused name
    ///
    /// Fails with `AlreadyExists` on a name collision and
    /// `InvalidParameters` for key or TTL settings the backend rejects.
    async fn create(&self, ca_name: &str, spec: &Ca) -> Result<()>;

    /// Provision a CA from caller-supplied certificate and key
    ///
    /// Fails with `KeyCertMismatch` when the key does not belong to the
    /// certificate and `AlreadyExists` on a name collision.
    async fn import(&self, ca_name: &str, bundle: &CaImport) -> Result<()>;

    /// Irreversibly remove a CA and everything issued under it
    ///
    /// Fails with `NotFound` when absent, every time.
    async fn delete(&self, ca_name: &str) -> Result<()>;

    /// Probe backend liveness
    async fn health(&self) -> Result<()>;

    /// Static adapter identifier for logs
    fn backend_name(&self) -> &'static str;
}

/// Which [`CaSecrets`] adapter to run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecretsBackendKind {
    /// HashiCorp Vault PKI secrets engine
    #[default]
    Vault,
    /// Process-local store for development and tests
    Memory,
}

impl fmt::Display for SecretsBackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vault => f.write_str("vault"),
            Self::Memory => f.write_str("memory"),
        }
    }
}

impl FromStr for SecretsBackendKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vault" => Ok(Self::Vault),
            "memory" => Ok(Self::Memory),
            other => Err(Error::invalid_parameters(format!(
                "unknown secrets backend {other:?}, expected vault or memory"
            ))),
        }
    }
}

/// Build the backend selected by `config`
///
/// # Errors
///
/// `BackendUnavailable` if the Vault login fails; `InvalidParameters` for
/// unusable Vault settings.
pub async fn connect(config: &CabinetConfig) -> Result<Arc<dyn CaSecrets>> {
    let backend: Arc<dyn CaSecrets> = match config.backend {
        SecretsBackendKind::Vault => Arc::new(VaultPki::connect(&config.vault).await?),
        SecretsBackendKind::Memory => Arc::new(MemorySecrets::new()),
    };
    tracing::info!("Using {} secrets backend", backend.backend_name());
    Ok(backend)
}
