//! Certificate Authority lifecycle management
//!
//! - [`certificate`]: PEM certificate to catalog metadata
//! - [`secrets`]: the backend contract plus Vault and in-memory adapters
//! - [`service`]: validated lifecycle operations over one backend
//! - [`config`] and [`cli`]: the `cabinet` binary

pub mod certificate;
pub mod cli;
pub mod config;
pub mod secrets;
pub mod service;
pub mod types;

pub use config::{CabinetConfig, VaultConfig};
pub use secrets::{CaSecrets, MemorySecrets, SecretsBackendKind, VaultPki};
pub use service::CaLifecycleService;
pub use types::{Ca, CaCrt, CaImport, Cas, KeyType};
