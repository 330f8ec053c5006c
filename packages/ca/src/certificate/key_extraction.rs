//! Key algorithm and size extraction

use const_oid::ObjectIdentifier;
use const_oid::db::rfc5912::{
    ID_EC_PUBLIC_KEY, RSA_ENCRYPTION, SECP_224_R_1, SECP_256_R_1, SECP_384_R_1, SECP_521_R_1,
};
use der::asn1::UintRef;
use der::{Decode, Sequence};
use spki::SubjectPublicKeyInfoOwned;

use cabinet_common::{Error, ErrorKind, OptionExt, Result};

use crate::types::KeyType;

const SECP_192_R_1: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.3.1.1");
const SECP_256_K_1: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.132.0.10");

/// PKCS#1 `RSAPublicKey`
#[derive(Clone, Debug, Sequence)]
pub(super) struct RsaPublicKey<'a> {
    pub(super) modulus: UintRef<'a>,
    pub(super) public_exponent: UintRef<'a>,
}

/// Determine key type and size of a subject public key
///
/// Algorithms other than RSA and ECDSA yield `(None, 0)` so that exotic keys
/// never block cataloguing.
///
/// # Errors
///
/// `CertificateParse` if an RSA key cannot be decoded, or an ECDSA key lacks
/// a named curve or uses a curve outside the supported set.
pub fn extract_key_info(spki: &SubjectPublicKeyInfoOwned) -> Result<(Option<KeyType>, u32)> {
    let algorithm = &spki.algorithm;

    if algorithm.oid == RSA_ENCRYPTION {
        let bits = rsa_modulus_bits(spki.subject_public_key.raw_bytes())?;
        Ok((Some(KeyType::Rsa), bits))
    } else if algorithm.oid == ID_EC_PUBLIC_KEY {
        let curve = algorithm
            .parameters
            .as_ref()
            .ok_or_kind(ErrorKind::CertificateParse, "ECDSA key without curve parameters")?
            .decode_as::<ObjectIdentifier>()
            .map_err(|e| Error::with_source(ErrorKind::CertificateParse, e))?;
        let bits = curve_bits(&curve).ok_or_kind(
            ErrorKind::CertificateParse,
            format!("unsupported elliptic curve {curve}"),
        )?;
        Ok((Some(KeyType::Ecdsa), bits))
    } else {
        tracing::debug!("Unrecognised public key algorithm {}", algorithm.oid);
        Ok((None, 0))
    }
}

fn rsa_modulus_bits(key_bytes: &[u8]) -> Result<u32> {
    let key = RsaPublicKey::from_der(key_bytes)
        .map_err(|e| Error::with_source(ErrorKind::CertificateParse, e))?;
    if key.public_exponent.as_bytes().is_empty() {
        return Err(Error::certificate_parse("RSA public exponent is empty"));
    }
    compute_bit_length(key.modulus.as_bytes())
        .ok_or_kind(ErrorKind::CertificateParse, "RSA modulus is zero")
}

/// Field size in bits of a named curve
fn curve_bits(curve: &ObjectIdentifier) -> Option<u32> {
    match *curve {
        SECP_192_R_1 => Some(192),
        SECP_224_R_1 => Some(224),
        SECP_256_R_1 | SECP_256_K_1 => Some(256),
        SECP_384_R_1 => Some(384),
        SECP_521_R_1 => Some(521),
        _ => None,
    }
}

/// Compute the bit length of a big-endian byte slice representing a positive integer
fn compute_bit_length(bytes: &[u8]) -> Option<u32> {
    let start = bytes.iter().position(|&b| b != 0)?;
    let effective = &bytes[start..];
    let high_bits = 8u32 - effective[0].leading_zeros();
    let rest_bits = u32::try_from((effective.len() - 1) * 8).ok()?;
    Some(high_bits + rest_bits)
}
