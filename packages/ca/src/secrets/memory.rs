//! In-process CA store
//!
//! Keeps CA material in memory for development and tests. Creation issues a
//! self-signed ECDSA CA with `rcgen`; RSA generation is not available.

use std::collections::BTreeMap;
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use rcgen::{
    BasicConstraints, CertificateParams, DistinguishedName, DnType, IsCa, KeyPair,
    KeyUsagePurpose, SignatureAlgorithm,
};
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::RwLock;

use cabinet_common::{Error, ErrorKind, Result, ResultExt};

use super::CaSecrets;
use super::ttl::parse_ttl;
use crate::certificate;
use crate::types::{Ca, CaCrt, CaImport, Cas, KeyType};

/// Validity used when a creation spec carries no TTL
pub const DEFAULT_TTL: Duration = Duration::from_secs(87_600 * 3_600);

struct StoredCa {
    crt: String,
    // Never read back out.
    _private_key: SecretString,
}

/// [`CaSecrets`] adapter backed by a process-local map
pub struct MemorySecrets {
    store: RwLock<BTreeMap<String, StoredCa>>,
}

impl Default for MemorySecrets {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySecrets {
    /// Empty store
    #[must_use]
    pub fn new() -> Self {
        Self {
            store: RwLock::new(BTreeMap::new()),
        }
    }

    /// Number of stored CAs
    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    /// True when no CA is stored
    pub async fn is_empty(&self) -> bool {
        self.store.read().await.is_empty()
    }
}

fn signature_algorithm(spec: &Ca) -> Result<&'static SignatureAlgorithm> {
    match (spec.key_type, spec.key_bits) {
        (None, _) | (Some(KeyType::Ecdsa), 256) => Ok(&rcgen::PKCS_ECDSA_P256_SHA256),
        (Some(KeyType::Ecdsa), 384) => Ok(&rcgen::PKCS_ECDSA_P384_SHA384),
        (Some(KeyType::Ecdsa), bits) => Err(Error::invalid_parameters(format!(
            "unsupported ECDSA key size {bits}, expected 256 or 384"
        ))),
        (Some(KeyType::Rsa), _) => Err(Error::invalid_parameters(
            "RSA key generation is not supported by the memory backend",
        )),
    }
}

fn distinguished_name(spec: &Ca) -> DistinguishedName {
    let mut dn = DistinguishedName::new();
    let optional = [
        (DnType::CountryName, &spec.country),
        (DnType::StateOrProvinceName, &spec.province),
        (DnType::LocalityName, &spec.locality),
        (DnType::OrganizationName, &spec.organization),
        (DnType::OrganizationalUnitName, &spec.organization_unit),
    ];
    for (dn_type, value) in optional {
        if !value.is_empty() {
            dn.push(dn_type, value.as_str());
        }
    }
    dn.push(DnType::CommonName, spec.common_name.as_str());
    dn
}

/// Issue a self-signed CA certificate for `spec`
fn issue_self_signed(spec: &Ca, ttl: Duration) -> Result<(String, SecretString)> {
    let algorithm = signature_algorithm(spec)?;

    let now = SystemTime::now();
    let not_after = now
        .checked_add(ttl)
        .ok_or_else(|| Error::invalid_parameters("ttl exceeds the representable time range"))?;

    let mut params = CertificateParams::new(Vec::<String>::new())
        .map_err(|e| Error::with_source(ErrorKind::Unknown, e))?;
    params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
    params.key_usages = vec![
        KeyUsagePurpose::KeyCertSign,
        KeyUsagePurpose::CrlSign,
        KeyUsagePurpose::DigitalSignature,
    ];
    params.distinguished_name = distinguished_name(spec);
    params.not_before = now.into();
    params.not_after = not_after.into();

    let key_pair =
        KeyPair::generate_for(algorithm).map_err(|e| Error::with_source(ErrorKind::Unknown, e))?;
    let cert = params
        .self_signed(&key_pair)
        .map_err(|e| Error::with_source(ErrorKind::InvalidParameters, e))?;

    Ok((cert.pem(), SecretString::from(key_pair.serialize_pem())))
}

#[async_trait]
impl CaSecrets for MemorySecrets {
    async fn enumerate(&self) -> Result<Cas> {
        let store = self.store.read().await;
        let mut cas = Vec::with_capacity(store.len());
        for (name, stored) in store.iter() {
            let mut ca = certificate::extract(stored.crt.as_bytes())
                .with_context(|| format!("certificate of {name}"))?;
            ca.ca_name.clone_from(name);
            cas.push(ca);
        }
        Ok(Cas::from(cas))
    }

    async fn fetch_certificate(&self, ca_name: &str) -> Result<CaCrt> {
        let store = self.store.read().await;
        let stored = store
            .get(ca_name)
            .ok_or_else(|| Error::not_found(format!("no CA named {ca_name}")))?;
        certificate::ca_crt(&stored.crt)
    }

    async fn create(&self, ca_name: &str, spec: &Ca) -> Result<()> {
        if spec.common_name.trim().is_empty() {
            return Err(Error::invalid_parameters("common_name is required"));
        }
        let ttl = match spec.ttl.as_deref() {
            Some(ttl) => parse_ttl(ttl)?,
            None => DEFAULT_TTL,
        };

        let mut store = self.store.write().await;
        if store.contains_key(ca_name) {
            return Err(Error::already_exists(format!("CA {ca_name} already exists")));
        }

        let (crt, private_key) = issue_self_signed(spec, ttl)?;
        store.insert(
            ca_name.to_string(),
            StoredCa {
                crt,
                _private_key: private_key,
            },
        );
        tracing::debug!("Issued self-signed CA {ca_name} valid for {}s", ttl.as_secs());
        Ok(())
    }

    async fn import(&self, ca_name: &str, bundle: &CaImport) -> Result<()> {
        certificate::verify_key_pair(&bundle.crt, &bundle.private_key)?;
        if let Some(ttl) = bundle.ttl.as_deref() {
            parse_ttl(ttl)?;
        }

        let mut store = self.store.write().await;
        if store.contains_key(ca_name) {
            return Err(Error::already_exists(format!("CA {ca_name} already exists")));
        }
        store.insert(
            ca_name.to_string(),
            StoredCa {
                crt: bundle.crt.clone(),
                _private_key: SecretString::from(bundle.private_key.expose_secret().to_owned()),
            },
        );
        Ok(())
    }

    async fn delete(&self, ca_name: &str) -> Result<()> {
        self.store
            .write()
            .await
            .remove(ca_name)
            .map(|_| ())
            .ok_or_else(|| Error::not_found(format!("no CA named {ca_name}")))
    }

    async fn health(&self) -> Result<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
