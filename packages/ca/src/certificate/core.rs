//! Core extraction operations

use der::{Decode, Encode};
use pem::{EncodeConfig, LineEnding, Pem};
use x509_cert::Certificate;

use cabinet_common::{Error, ErrorKind, Result};

use super::key_extraction::extract_key_info;
use super::name_extraction::extract_subject;
use crate::types::{Ca, CaCrt};

const CERTIFICATE_LABEL: &str = "CERTIFICATE";
const PUBLIC_KEY_LABEL: &str = "PUBLIC KEY";

/// Decode a single PEM `CERTIFICATE` block into an X.509 certificate
///
/// # Errors
///
/// - `MalformedPem` if no PEM block can be decoded or the block is empty
/// - `UnexpectedBlockType` if the label is not `CERTIFICATE` or the block
///   carries headers
/// - `CertificateParse` if the DER payload is not a certificate
pub fn decode_certificate_pem(pem_bytes: &[u8]) -> Result<Certificate> {
    let block = pem::parse(pem_bytes).map_err(|e| Error::with_source(ErrorKind::MalformedPem, e))?;

    if block.tag() != CERTIFICATE_LABEL {
        return Err(Error::unexpected_block_type(format!(
            "expected {CERTIFICATE_LABEL}, found {}",
            block.tag()
        )));
    }
    if block.contents().is_empty() {
        return Err(Error::malformed_pem("certificate block is empty"));
    }
    if block.headers().iter().next().is_some() {
        return Err(Error::unexpected_block_type(
            "certificate block must not carry PEM headers",
        ));
    }

    Certificate::from_der(block.contents())
        .map_err(|e| Error::with_source(ErrorKind::CertificateParse, e))
}

/// Extract catalog metadata from a PEM certificate
///
/// The returned record has an empty `ca_name`; callers that know the name
/// fill it in.
///
/// # Errors
///
/// See [`decode_certificate_pem`]. An ECDSA key on an unrecognised curve is
/// reported as `CertificateParse`.
pub fn extract(pem_bytes: &[u8]) -> Result<Ca> {
    let cert = decode_certificate_pem(pem_bytes)?;
    extract_from_certificate(&cert)
}

/// Extract catalog metadata from an already parsed certificate
///
/// # Errors
///
/// `CertificateParse` if the public key cannot be sized.
pub fn extract_from_certificate(cert: &Certificate) -> Result<Ca> {
    let tbs = &cert.tbs_certificate;
    let subject = extract_subject(&tbs.subject);
    let (key_type, key_bits) = extract_key_info(&tbs.subject_public_key_info)?;

    Ok(Ca {
        ca_name: String::new(),
        serial_number: serial_to_string(tbs.serial_number.as_bytes()),
        common_name: subject.common_name.unwrap_or_default(),
        key_type,
        key_bits,
        organization: subject.organization.join(" "),
        organization_unit: subject.organization_unit.join(" "),
        country: subject.country.join(" "),
        province: subject.province.join(" "),
        locality: subject.locality.join(" "),
        ttl: None,
    })
}

/// Re-encode the certificate's `SubjectPublicKeyInfo` as a `PUBLIC KEY` PEM block
///
/// # Errors
///
/// `CertificateParse` if the key info cannot be DER-encoded.
pub fn public_key_pem(cert: &Certificate) -> Result<String> {
    let spki_der = cert
        .tbs_certificate
        .subject_public_key_info
        .to_der()
        .map_err(|e| Error::with_source(ErrorKind::CertificateParse, e))?;
    let config = EncodeConfig::new().set_line_ending(LineEnding::LF);
    Ok(pem::encode_config(&Pem::new(PUBLIC_KEY_LABEL, spki_der), config))
}

/// Build the public material record for a PEM certificate
///
/// # Errors
///
/// Any extraction error of [`decode_certificate_pem`].
pub fn ca_crt(crt: &str) -> Result<CaCrt> {
    let cert = decode_certificate_pem(crt.as_bytes())?;
    Ok(CaCrt {
        crt: crt.to_string(),
        pub_key: public_key_pem(&cert)?,
    })
}

/// Render a serial number as lowercase colon-separated hex
///
/// The DER sign octet is dropped so `00:9f:..` reads as `9f:..`.
fn serial_to_string(serial: &[u8]) -> String {
    let significant = match serial {
        [0, rest @ ..] if !rest.is_empty() => rest,
        _ => serial,
    };
    significant
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(":")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serial_rendering() {
        assert_eq!(serial_to_string(&[0x7e, 0x36, 0x13]), "7e:36:13");
        assert_eq!(serial_to_string(&[0x00, 0x9f, 0x01]), "9f:01");
        assert_eq!(serial_to_string(&[0x00]), "00");
    }

    #[test]
    fn empty_input_is_malformed() {
        let err = extract(b"").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedPem);
    }
}
