//! Vault PKI secrets engine adapter
//!
//! Each CA lives in its own `pki` mount named after the CA. Creation mounts a
//! fresh engine and asks Vault to generate an internal root; import mounts an
//! engine and uploads the caller's key and certificate bundle.

mod client;
mod types;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde_json::Value;

use cabinet_common::{Error, ErrorKind, LoggingTransformer, Result};

use super::CaSecrets;
use crate::certificate;
use crate::config::VaultConfig;
use crate::types::{Ca, CaCrt, CaImport, Cas, KeyType};
use client::VaultClient;
use types::{CertificateResponse, ConfigCa, EnableMount, GenerateRoot, MountTuning};

const PKI_ENGINE: &str = "pki";

/// [`CaSecrets`] adapter for the Vault PKI secrets engine
pub struct VaultPki {
    client: VaultClient,
    default_max_lease_ttl: String,
}

impl VaultPki {
    /// Log in to Vault and return a ready adapter
    ///
    /// # Errors
    ///
    /// `BackendUnavailable` if the AppRole login fails; `InvalidParameters`
    /// for an unusable TLS bundle.
    pub async fn connect(config: &VaultConfig) -> Result<Self> {
        let client = VaultClient::login(config).await?;
        Ok(Self {
            client,
            default_max_lease_ttl: config.default_max_lease_ttl.clone(),
        })
    }

    /// Names of all `pki` mounts, sorted, without the trailing slash
    async fn pki_mounts(&self) -> Result<Vec<String>> {
        let body: Option<Value> = self.client.get("sys/mounts").await?;
        let Some(body) = body else {
            return Ok(Vec::new());
        };

        // Newer Vault versions nest the mount table under `data`.
        let table = body.get("data").unwrap_or(&body);
        let mut names: Vec<String> = table
            .as_object()
            .map(|mounts| {
                mounts
                    .iter()
                    .filter(|(_, mount)| {
                        mount.get("type").and_then(Value::as_str) == Some(PKI_ENGINE)
                    })
                    .map(|(path, _)| path.trim_end_matches('/').to_string())
                    .collect()
            })
            .unwrap_or_default();
        names.sort();
        names.dedup();
        Ok(names)
    }

    async fn mount_exists(&self, ca_name: &str) -> Result<bool> {
        Ok(self.pki_mounts().await?.iter().any(|name| name == ca_name))
    }

    async fn enable_mount(&self, ca_name: &str, max_lease_ttl: Option<&str>) -> Result<()> {
        let body = EnableMount {
            mount_type: PKI_ENGINE,
            config: MountTuning {
                max_lease_ttl: max_lease_ttl.unwrap_or(self.default_max_lease_ttl.as_str()),
            },
        };
        self.client
            .post(&format!("sys/mounts/{ca_name}"), &body)
            .await
    }

    /// Remove a mount created by a failed provisioning attempt
    async fn discard_mount(&self, ca_name: &str) {
        if let Err(e) = self.client.delete(&format!("sys/mounts/{ca_name}")).await {
            LoggingTransformer::log_backend_error("discard mount", &e);
            tracing::warn!(ca = ca_name, error = %e, "Failed to remove mount after provisioning error");
        }
    }
}

fn vault_key_type(key_type: KeyType) -> &'static str {
    match key_type {
        KeyType::Rsa => "rsa",
        KeyType::Ecdsa => "ec",
    }
}

#[async_trait]
impl CaSecrets for VaultPki {
    async fn enumerate(&self) -> Result<Cas> {
        let mut cas = Vec::new();
        for ca_name in self.pki_mounts().await? {
            match self.fetch_metadata(&ca_name).await {
                Ok(ca) => cas.push(ca),
                Err(e) if e.kind() == ErrorKind::NotFound || e.kind().is_extraction() => {
                    tracing::warn!(ca = %ca_name, error = %e, "Listing pki mount without a readable CA");
                    cas.push(Ca {
                        ca_name,
                        ..Ca::default()
                    });
                }
                Err(e) => return Err(e),
            }
        }
        Ok(Cas::from(cas))
    }

    async fn fetch_certificate(&self, ca_name: &str) -> Result<CaCrt> {
        let response: Option<CertificateResponse> =
            self.client.get(&format!("{ca_name}/cert/ca")).await?;
        let pem = response
            .and_then(|r| r.data)
            .map(|data| data.certificate)
            .filter(|crt| !crt.trim().is_empty())
            .ok_or_else(|| Error::not_found(format!("mount {ca_name} holds no CA certificate")))?;
        certificate::ca_crt(&pem)
    }

    async fn create(&self, ca_name: &str, spec: &Ca) -> Result<()> {
        if self.mount_exists(ca_name).await? {
            return Err(Error::already_exists(format!("mount {ca_name} already exists")));
        }

        self.enable_mount(ca_name, spec.ttl.as_deref()).await?;

        let body = GenerateRoot {
            common_name: &spec.common_name,
            key_type: spec.key_type.map(vault_key_type),
            key_bits: (spec.key_bits > 0).then_some(spec.key_bits),
            ttl: spec.ttl.as_deref(),
            organization: &spec.organization,
            ou: &spec.organization_unit,
            country: &spec.country,
            province: &spec.province,
            locality: &spec.locality,
        };
        if let Err(e) = self
            .client
            .post(&format!("{ca_name}/root/generate/internal"), &body)
            .await
        {
            self.discard_mount(ca_name).await;
            return Err(e);
        }
        Ok(())
    }

    async fn import(&self, ca_name: &str, bundle: &CaImport) -> Result<()> {
        certificate::verify_key_pair(&bundle.crt, &bundle.private_key)?;

        if self.mount_exists(ca_name).await? {
            return Err(Error::already_exists(format!("mount {ca_name} already exists")));
        }

        self.enable_mount(ca_name, bundle.ttl.as_deref()).await?;

        let pem_bundle = format!(
            "{}\n{}",
            bundle.private_key.expose_secret().trim_end(),
            bundle.crt.trim_end()
        );
        if let Err(e) = self
            .client
            .post(&format!("{ca_name}/config/ca"), &ConfigCa { pem_bundle: &pem_bundle })
            .await
        {
            self.discard_mount(ca_name).await;
            return Err(e);
        }
        Ok(())
    }

    async fn delete(&self, ca_name: &str) -> Result<()> {
        if !self.mount_exists(ca_name).await? {
            return Err(Error::not_found(format!("no pki mount named {ca_name}")));
        }
        self.client.delete(&format!("{ca_name}/root")).await?;
        self.client.delete(&format!("sys/mounts/{ca_name}")).await
    }

    async fn health(&self) -> Result<()> {
        self.client.health().await
    }

    fn backend_name(&self) -> &'static str {
        "vault"
    }
}
