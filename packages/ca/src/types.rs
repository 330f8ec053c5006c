//! CA catalog records exchanged with callers
//!
//! These are transient values rebuilt from backend responses on every call.
//! JSON field names follow the public wire format.

use cabinet_common::{Error, Result};
use secrecy::SecretString;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Public-key algorithms the catalog recognises
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyType {
    /// RSA; `key_bits` is the modulus length
    #[serde(rename = "RSA")]
    Rsa,
    /// ECDSA; `key_bits` is the curve size
    #[serde(rename = "ECDSA")]
    Ecdsa,
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rsa => f.write_str("RSA"),
            Self::Ecdsa => f.write_str("ECDSA"),
        }
    }
}

/// Catalog record for one CA
///
/// Also used as the creation spec: subject fields, key parameters and `ttl`
/// describe the CA to provision.
///
/// Subject attributes that occur more than once are joined with a single
/// space, so `O=A, O=B` reads back as `"A B"`. The join is lossy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ca {
    /// Unique name of the CA within the backend
    #[serde(default)]
    pub ca_name: String,
    /// Certificate serial, lowercase colon-separated hex
    #[serde(default)]
    pub serial_number: String,
    /// Subject common name
    #[serde(default)]
    pub common_name: String,
    /// `None` for algorithms outside the recognised set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_type: Option<KeyType>,
    /// Zero when `key_type` is `None`
    #[serde(default)]
    pub key_bits: u32,
    /// Subject organization
    #[serde(default)]
    pub organization: String,
    /// Subject organizational unit
    #[serde(default)]
    pub organization_unit: String,
    /// Subject country
    #[serde(default)]
    pub country: String,
    /// State or province
    #[serde(default)]
    pub province: String,
    /// Subject locality
    #[serde(default)]
    pub locality: String,
    /// Requested validity, Vault duration syntax (`"8760h"`); creation only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<String>,
}

impl Ca {
    /// Creation spec with just a common name
    pub fn with_common_name(common_name: impl Into<String>) -> Self {
        Self {
            common_name: common_name.into(),
            ..Self::default()
        }
    }

    /// Check that a key size accompanies every key type
    ///
    /// # Errors
    ///
    /// `InvalidParameters` when `key_type` is set and `key_bits` is zero.
    pub fn validate_key_spec(&self) -> Result<()> {
        match self.key_type {
            Some(key_type) if self.key_bits == 0 => Err(Error::invalid_parameters(format!(
                "key_bits must be positive for key_type {key_type}"
            ))),
            _ => Ok(()),
        }
    }
}

/// Public certificate material of a CA
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaCrt {
    /// PEM-encoded certificate
    pub crt: String,
    /// PEM-encoded `SubjectPublicKeyInfo`
    pub pub_key: String,
}

/// Import envelope for an externally issued CA
///
/// Consumed once by the import operation. The private key is never logged
/// and cannot be serialised back out.
#[derive(Debug, Deserialize)]
pub struct CaImport {
    /// PEM-encoded CA certificate
    pub crt: String,
    /// PEM-encoded PKCS#8 private key
    #[serde(deserialize_with = "deserialize_secret")]
    pub private_key: SecretString,
    /// Optional max lease TTL override for the new mount
    #[serde(default)]
    pub ttl: Option<String>,
}

/// Deserialize a plain string straight into a [`SecretString`]
pub(crate) fn deserialize_secret<'de, D>(deserializer: D) -> std::result::Result<SecretString, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(SecretString::from)
}

/// Collection of catalog records
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cas {
    /// Records in backend order
    #[serde(default)]
    pub cas: Vec<Ca>,
}

impl Cas {
    /// Number of records
    #[must_use]
    pub fn len(&self) -> usize {
        self.cas.len()
    }

    /// True when the backend has no CAs
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cas.is_empty()
    }

    /// Look up a record by name
    #[must_use]
    pub fn get(&self, ca_name: &str) -> Option<&Ca> {
        self.cas.iter().find(|ca| ca.ca_name == ca_name)
    }
}

impl From<Vec<Ca>> for Cas {
    fn from(cas: Vec<Ca>) -> Self {
        Self { cas }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cabinet_common::ErrorKind;

    #[test]
    fn key_type_wire_names() {
        assert_eq!(serde_json::to_string(&KeyType::Rsa).unwrap(), "\"RSA\"");
        assert_eq!(serde_json::to_string(&KeyType::Ecdsa).unwrap(), "\"ECDSA\"");
    }

    #[test]
    fn key_spec_requires_bits() {
        let mut ca = Ca::with_common_name("Root");
        assert!(ca.validate_key_spec().is_ok());

        ca.key_type = Some(KeyType::Rsa);
        let err = ca.validate_key_spec().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameters);

        ca.key_bits = 4096;
        assert!(ca.validate_key_spec().is_ok());
    }

    #[test]
    fn creation_spec_from_json() {
        let ca: Ca = serde_json::from_str(
            r#"{"common_name":"Root","key_type":"ECDSA","key_bits":384,"ttl":"8760h"}"#,
        )
        .unwrap();
        assert_eq!(ca.key_type, Some(KeyType::Ecdsa));
        assert_eq!(ca.key_bits, 384);
        assert_eq!(ca.ttl.as_deref(), Some("8760h"));
        assert!(ca.ca_name.is_empty());
    }
}
