//! Private key to certificate matching
//!
//! Accepts the three unencrypted private key encodings Vault reads in a
//! `pem_bundle`: PKCS#8 (`PRIVATE KEY`), PKCS#1 (`RSA PRIVATE KEY`) and SEC1
//! (`EC PRIVATE KEY`).

use const_oid::ObjectIdentifier;
use const_oid::db::rfc5912::{ID_EC_PUBLIC_KEY, RSA_ENCRYPTION};
use der::asn1::{AnyRef, BitStringRef, OctetStringRef, UintRef};
use der::{Decode, Sequence};
use rcgen::{KeyPair, PublicKeyData};
use secrecy::{ExposeSecret, SecretString};
use spki::SubjectPublicKeyInfoOwned;

use cabinet_common::{Error, ErrorKind, Result};

use super::core::decode_certificate_pem;
use super::key_extraction::RsaPublicKey;

const PKCS8_LABEL: &str = "PRIVATE KEY";
const PKCS1_LABEL: &str = "RSA PRIVATE KEY";
const SEC1_LABEL: &str = "EC PRIVATE KEY";

/// PKCS#1 `RSAPrivateKey`
#[allow(dead_code)]
#[derive(Sequence)]
struct RsaPrivateKey<'a> {
    version: u8,
    modulus: UintRef<'a>,
    public_exponent: UintRef<'a>,
    private_exponent: UintRef<'a>,
    prime1: UintRef<'a>,
    prime2: UintRef<'a>,
    exponent1: UintRef<'a>,
    exponent2: UintRef<'a>,
    coefficient: UintRef<'a>,
    other_prime_infos: Option<AnyRef<'a>>,
}

/// SEC1 `ECPrivateKey`
#[allow(dead_code)]
#[derive(Sequence)]
struct EcPrivateKey<'a> {
    version: u8,
    private_key: OctetStringRef<'a>,
    #[asn1(context_specific = "0", tag_mode = "EXPLICIT", optional = "true")]
    parameters: Option<ObjectIdentifier>,
    #[asn1(context_specific = "1", tag_mode = "EXPLICIT", optional = "true")]
    public_key: Option<BitStringRef<'a>>,
}

fn unreadable_key(e: der::Error) -> Error {
    Error::with_source(ErrorKind::InvalidParameters, e)
}

/// Confirm that a private key belongs to a certificate
///
/// The public key derived from the private key must equal the certificate's
/// subject public key.
///
/// # Errors
///
/// - extraction errors of the certificate
/// - `InvalidParameters` if the private key cannot be parsed, is encrypted,
///   or is a SEC1 key without its public point
/// - `KeyCertMismatch` if the keys differ
pub fn verify_key_pair(cert_pem: &str, key_pem: &SecretString) -> Result<()> {
    let cert = decode_certificate_pem(cert_pem.as_bytes())?;
    let spki = &cert.tbs_certificate.subject_public_key_info;

    let block = pem::parse(key_pem.expose_secret())
        .map_err(|e| Error::with_source(ErrorKind::InvalidParameters, e))?;
    let matches = match block.tag() {
        PKCS8_LABEL => pkcs8_matches(key_pem, spki)?,
        PKCS1_LABEL => pkcs1_matches(block.contents(), spki)?,
        SEC1_LABEL => sec1_matches(block.contents(), spki)?,
        other => {
            return Err(Error::invalid_parameters(format!(
                "unsupported private key block {other}"
            )));
        }
    };

    if matches {
        Ok(())
    } else {
        Err(Error::key_cert_mismatch(
            "private key does not match the certificate public key",
        ))
    }
}

fn pkcs8_matches(key_pem: &SecretString, spki: &SubjectPublicKeyInfoOwned) -> Result<bool> {
    let key_pair = KeyPair::from_pem(key_pem.expose_secret())
        .map_err(|e| Error::with_source(ErrorKind::InvalidParameters, e))?;
    Ok(key_pair.der_bytes() == spki.subject_public_key.raw_bytes())
}

fn pkcs1_matches(key_der: &[u8], spki: &SubjectPublicKeyInfoOwned) -> Result<bool> {
    let key = RsaPrivateKey::from_der(key_der).map_err(unreadable_key)?;
    if spki.algorithm.oid != RSA_ENCRYPTION {
        return Ok(false);
    }
    let Ok(cert_key) = RsaPublicKey::from_der(spki.subject_public_key.raw_bytes()) else {
        return Ok(false);
    };
    Ok(key.modulus == cert_key.modulus && key.public_exponent == cert_key.public_exponent)
}

fn sec1_matches(key_der: &[u8], spki: &SubjectPublicKeyInfoOwned) -> Result<bool> {
    let key = EcPrivateKey::from_der(key_der).map_err(unreadable_key)?;
    let public_key = key
        .public_key
        .ok_or_else(|| Error::invalid_parameters("EC private key carries no public key"))?;
    if spki.algorithm.oid != ID_EC_PUBLIC_KEY {
        return Ok(false);
    }

    let cert_curve = spki
        .algorithm
        .parameters
        .as_ref()
        .and_then(|p| p.decode_as::<ObjectIdentifier>().ok());
    if let (Some(key_curve), Some(cert_curve)) = (key.parameters, cert_curve) {
        if key_curve != cert_curve {
            return Ok(false);
        }
    }

    Ok(public_key.raw_bytes() == spki.subject_public_key.raw_bytes())
}
