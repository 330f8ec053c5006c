//! Process configuration
//!
//! Read from a TOML file, then overlaid with environment variables:
//!
//! ```toml
//! backend = "vault"
//!
//! [vault]
//! address = "https://vault.internal:8200"
//! role_id = "cabinet"
//! secret_id = "..."
//! ca_cert = "/etc/cabinet/vault-ca.pem"
//! ```

use std::path::{Path, PathBuf};

use secrecy::SecretString;
use serde::Deserialize;
use tracing::warn;

use cabinet_common::{Error, ErrorKind, Result, ResultExt};

use crate::secrets::SecretsBackendKind;
use crate::secrets::ttl::parse_ttl;
use crate::types::deserialize_secret;

/// Top-level configuration
#[derive(Debug, Default, Deserialize)]
pub struct CabinetConfig {
    /// Secrets backend to run
    #[serde(default)]
    pub backend: SecretsBackendKind,
    /// Vault connection settings, used when `backend = "vault"`
    #[serde(default)]
    pub vault: VaultConfig,
}

/// Vault connection settings
#[derive(Debug, Deserialize)]
pub struct VaultConfig {
    /// Base URL of the Vault server
    #[serde(default = "default_address")]
    pub address: String,
    /// AppRole role id
    #[serde(default)]
    pub role_id: String,
    /// AppRole secret id
    #[serde(default = "empty_secret", deserialize_with = "deserialize_secret")]
    pub secret_id: SecretString,
    /// PEM bundle trusted for the Vault TLS endpoint
    #[serde(default)]
    pub ca_cert: Option<PathBuf>,
    /// Per-request timeout
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// `max_lease_ttl` of new pki mounts when the request has no TTL
    #[serde(default = "default_max_lease_ttl")]
    pub default_max_lease_ttl: String,
}

fn default_address() -> String {
    "https://127.0.0.1:8200".to_string()
}

fn empty_secret() -> SecretString {
    SecretString::from(String::new())
}

fn default_request_timeout() -> u64 {
    30
}

fn default_max_lease_ttl() -> String {
    "87600h".to_string() // 10 years
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            role_id: String::new(),
            secret_id: empty_secret(),
            ca_cert: None,
            request_timeout_secs: default_request_timeout(),
            default_max_lease_ttl: default_max_lease_ttl(),
        }
    }
}

impl CabinetConfig {
    /// Parse a TOML configuration file
    ///
    /// # Errors
    ///
    /// `InvalidParameters` if the file cannot be read, is not valid TOML, or
    /// holds unusable values.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::with_source(ErrorKind::InvalidParameters, e))
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_toml(&raw).with_context(|| format!("config {}", path.display()))
    }

    /// Parse configuration from a TOML string
    ///
    /// # Errors
    ///
    /// `InvalidParameters` for malformed TOML or unusable values.
    pub fn from_toml(raw: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(raw).map_err(|e| Error::with_source(ErrorKind::InvalidParameters, e))?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overlaid with environment variables
    ///
    /// # Errors
    ///
    /// `InvalidParameters` for an unknown `CABINET_BACKEND`.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Load `path` if it exists, then apply environment overrides
    ///
    /// # Errors
    ///
    /// See [`CabinetConfig::load`] and [`CabinetConfig::from_env`].
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        let path = path.map(Path::to_path_buf).or_else(Self::default_path);
        let mut config = match path {
            Some(path) if path.exists() => Self::load(&path)?,
            _ => Self::default(),
        };
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// `<os config dir>/cabinet/config.toml`
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        match dirs::config_dir() {
            Some(dir) => Some(dir.join("cabinet").join("config.toml")),
            None => {
                warn!("Could not determine OS config directory");
                None
            }
        }
    }

    /// Overlay `CABINET_BACKEND`, `VAULT_ADDR`, `VAULT_ROLE_ID`,
    /// `VAULT_SECRET_ID` and `VAULT_CACERT`
    ///
    /// # Errors
    ///
    /// `InvalidParameters` for an unknown `CABINET_BACKEND`.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_vars(|key| std::env::var(key).ok().filter(|v| !v.is_empty()))
    }

    fn apply_vars<F>(&mut self, var: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(backend) = var("CABINET_BACKEND") {
            self.backend = backend.parse()?;
        }
        if let Some(address) = var("VAULT_ADDR") {
            self.vault.address = address;
        }
        if let Some(role_id) = var("VAULT_ROLE_ID") {
            self.vault.role_id = role_id;
        }
        if let Some(secret_id) = var("VAULT_SECRET_ID") {
            self.vault.secret_id = SecretString::from(secret_id);
        }
        if let Some(ca_cert) = var("VAULT_CACERT") {
            self.vault.ca_cert = Some(PathBuf::from(ca_cert));
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.vault.request_timeout_secs == 0 {
            return Err(Error::invalid_parameters(
                "vault.request_timeout_secs must be positive",
            ));
        }
        if !self.vault.address.starts_with("http://") && !self.vault.address.starts_with("https://") {
            return Err(Error::invalid_parameters(format!(
                "vault.address {:?} must be an http(s) URL",
                self.vault.address
            )));
        }
        parse_ttl(&self.vault.default_max_lease_ttl)
            .map(|_| ())
            .with_context(|| "vault.default_max_lease_ttl")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;

    #[test]
    fn env_overrides_file_values() {
        let mut config = CabinetConfig::from_toml(
            r#"
            backend = "memory"
            [vault]
            address = "https://vault.example.com:8200"
            role_id = "file-role"
            "#,
        )
        .unwrap();

        let vars: HashMap<&str, &str> = [
            ("CABINET_BACKEND", "vault"),
            ("VAULT_ROLE_ID", "env-role"),
            ("VAULT_SECRET_ID", "env-secret"),
            ("VAULT_CACERT", "/etc/cabinet/ca.pem"),
        ]
        .into_iter()
        .collect();
        config
            .apply_vars(|key| vars.get(key).map(|v| (*v).to_string()))
            .unwrap();

        assert_eq!(config.backend, SecretsBackendKind::Vault);
        assert_eq!(config.vault.address, "https://vault.example.com:8200");
        assert_eq!(config.vault.role_id, "env-role");
        assert_eq!(config.vault.secret_id.expose_secret(), "env-secret");
        assert_eq!(config.vault.ca_cert, Some(PathBuf::from("/etc/cabinet/ca.pem")));
    }

    #[test]
    fn unknown_backend_in_env_is_rejected() {
        let mut config = CabinetConfig::default();
        let err = config
            .apply_vars(|key| (key == "CABINET_BACKEND").then(|| "consul".to_string()))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameters);
    }
}
