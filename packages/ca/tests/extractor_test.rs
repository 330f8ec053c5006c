//! Certificate metadata extraction against real certificates

use cabinet_ca::certificate::{self, decode_certificate_pem, public_key_pem, verify_key_pair};
use cabinet_ca::types::KeyType;
use cabinet_common::ErrorKind;
use secrecy::SecretString;

const RSA2048_CRT: &str = include_str!("fixtures/rsa2048.crt");
const RSA2048_KEY: &str = include_str!("fixtures/rsa2048.key");
const RSA2048_PKCS1_KEY: &str = include_str!("fixtures/rsa2048_pkcs1.key");
const RSA2048_PUB: &str = include_str!("fixtures/rsa2048.pub");
const RSA3072_CRT: &str = include_str!("fixtures/rsa3072.crt");
const RSA3072_KEY: &str = include_str!("fixtures/rsa3072.key");
const RSA3072_PKCS1_KEY: &str = include_str!("fixtures/rsa3072_pkcs1.key");
const EC384_CRT: &str = include_str!("fixtures/ec384.crt");
const EC384_KEY: &str = include_str!("fixtures/ec384.key");
const EC384_SEC1_KEY: &str = include_str!("fixtures/ec384_sec1.key");
const EC384_SEC1_NO_PUBLIC_KEY: &str = include_str!("fixtures/ec384_sec1_nopub.key");
const EC521_CRT: &str = include_str!("fixtures/ec521.crt");
const ED25519_CRT: &str = include_str!("fixtures/ed25519.crt");
const MULTI_ORG_CRT: &str = include_str!("fixtures/ec256_multi_org.crt");
const MULTI_VALUE_RDN_CRT: &str = include_str!("fixtures/ec256_multivalue_rdn.crt");

#[test]
fn rsa_2048_metadata() {
    let ca = certificate::extract(RSA2048_CRT.as_bytes()).unwrap();

    assert_eq!(ca.key_type, Some(KeyType::Rsa));
    assert_eq!(ca.key_bits, 2048);
    assert_eq!(ca.common_name, "Cabinet Root CA RSA2048");
    assert_eq!(ca.organization, "Cabinet");
    assert_eq!(ca.organization_unit, "Root Authority");
    assert_eq!(ca.country, "ES");
    assert_eq!(ca.province, "Gipuzkoa");
    assert_eq!(ca.locality, "Arrasate");
    assert_eq!(
        ca.serial_number,
        "14:82:fb:02:01:ea:5e:97:a6:0f:7b:6e:7e:ea:31:97:60:bd:d8:c7"
    );
    assert!(ca.ca_name.is_empty());
    assert!(ca.ttl.is_none());
}

#[test]
fn rsa_3072_metadata_joins_repeated_organizations() {
    let ca = certificate::extract(RSA3072_CRT.as_bytes()).unwrap();

    assert_eq!(ca.key_type, Some(KeyType::Rsa));
    assert_eq!(ca.key_bits, 3072);
    assert_eq!(ca.organization, "S. Coop Cabinet Next");
    assert_eq!(ca.common_name, "Cabinet Next Root CA");
}

#[test]
fn ecdsa_key_bits_follow_the_curve() {
    let p384 = certificate::extract(EC384_CRT.as_bytes()).unwrap();
    assert_eq!(p384.key_type, Some(KeyType::Ecdsa));
    assert_eq!(p384.key_bits, 384);
    assert_eq!(p384.country, "US");
    assert_eq!(p384.province, "California");
    assert_eq!(p384.locality, "San Francisco");

    let p521 = certificate::extract(EC521_CRT.as_bytes()).unwrap();
    assert_eq!(p521.key_type, Some(KeyType::Ecdsa));
    assert_eq!(p521.key_bits, 521);
    assert_eq!(p521.common_name, "Cabinet Root CA P521");
    assert!(p521.organization.is_empty());

    let p256 = certificate::extract(MULTI_ORG_CRT.as_bytes()).unwrap();
    assert_eq!(p256.key_bits, 256);
}

#[test]
fn unsupported_algorithm_is_catalogued_without_key_info() {
    let ca = certificate::extract(ED25519_CRT.as_bytes()).unwrap();

    assert_eq!(ca.key_type, None);
    assert_eq!(ca.key_bits, 0);
    assert_eq!(ca.common_name, "Cabinet Root CA Ed25519");
    assert_eq!(ca.organization, "Cabinet");
    assert!(ca.validate_key_spec().is_ok());
}

#[test]
fn repeated_subject_attributes_join_with_a_space() {
    let separate = certificate::extract(MULTI_ORG_CRT.as_bytes()).unwrap();
    assert_eq!(separate.organization, "A B");
    assert_eq!(separate.common_name, "Multi Org Root");

    let multi_valued = certificate::extract(MULTI_VALUE_RDN_CRT.as_bytes()).unwrap();
    assert_eq!(multi_valued.organization, "A B");
    assert_eq!(multi_valued.country, "ES");
}

#[test]
fn input_without_pem_block_is_malformed() {
    let inputs: [&[u8]; 3] = [b"", b"hello world", b"-----BEGIN CERTIFICATE-----\nAAAA"];
    for input in inputs {
        let err = certificate::extract(input).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedPem, "{input:?}");
    }
}

#[test]
fn non_certificate_label_is_rejected() {
    let err = certificate::extract(RSA2048_KEY.as_bytes()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnexpectedBlockType);

    let err = certificate::extract(RSA2048_PUB.as_bytes()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnexpectedBlockType);
}

#[test]
fn certificate_block_with_headers_is_rejected() {
    let with_headers = RSA2048_CRT.replacen(
        "-----BEGIN CERTIFICATE-----\n",
        "-----BEGIN CERTIFICATE-----\nProc-Type: 4,ENCRYPTED\nDEK-Info: AES-128-CBC,0123456789ABCDEF0123456789ABCDEF\n\n",
        1,
    );
    let err = certificate::extract(with_headers.as_bytes()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnexpectedBlockType);
}

#[test]
fn certificate_label_with_garbage_der_fails_to_parse() {
    let garbage = pem::encode(&pem::Pem::new("CERTIFICATE", b"definitely not DER".to_vec()));
    let err = certificate::extract(garbage.as_bytes()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CertificateParse);
}

#[test]
fn public_key_pem_matches_openssl() {
    let cert = decode_certificate_pem(RSA2048_CRT.as_bytes()).unwrap();
    let ours = pem::parse(public_key_pem(&cert).unwrap()).unwrap();
    let openssl = pem::parse(RSA2048_PUB).unwrap();

    assert_eq!(ours.tag(), "PUBLIC KEY");
    assert_eq!(ours.contents(), openssl.contents());
}

#[test]
fn ca_crt_carries_certificate_and_public_key() {
    let crt = certificate::ca_crt(EC384_CRT).unwrap();
    assert_eq!(crt.crt, EC384_CRT);
    assert!(crt.pub_key.starts_with("-----BEGIN PUBLIC KEY-----"));
}

#[test]
fn matching_key_pairs_verify() {
    verify_key_pair(RSA2048_CRT, &SecretString::from(RSA2048_KEY.to_string())).unwrap();
    verify_key_pair(RSA3072_CRT, &SecretString::from(RSA3072_KEY.to_string())).unwrap();
    verify_key_pair(EC384_CRT, &SecretString::from(EC384_KEY.to_string())).unwrap();
}

#[test]
fn foreign_key_is_a_mismatch() {
    let err = verify_key_pair(RSA2048_CRT, &SecretString::from(RSA3072_KEY.to_string())).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::KeyCertMismatch);

    let err = verify_key_pair(EC384_CRT, &SecretString::from(RSA2048_KEY.to_string())).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::KeyCertMismatch);
}

#[test]
fn unreadable_key_is_invalid_parameters() {
    let err = verify_key_pair(RSA2048_CRT, &SecretString::from("not a key".to_string())).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidParameters);
}

fn secret(pem: &str) -> SecretString {
    SecretString::from(pem.to_string())
}

#[test]
fn traditional_key_encodings_verify() {
    verify_key_pair(RSA2048_CRT, &secret(RSA2048_PKCS1_KEY)).unwrap();
    verify_key_pair(RSA3072_CRT, &secret(RSA3072_PKCS1_KEY)).unwrap();
    verify_key_pair(EC384_CRT, &secret(EC384_SEC1_KEY)).unwrap();
}

#[test]
fn foreign_traditional_keys_are_mismatches() {
    let cases = [
        (RSA2048_CRT, RSA3072_PKCS1_KEY),
        (EC384_CRT, RSA2048_PKCS1_KEY),
        (RSA2048_CRT, EC384_SEC1_KEY),
    ];
    for (crt, key) in cases {
        let err = verify_key_pair(crt, &secret(key)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::KeyCertMismatch);
    }
}

#[test]
fn sec1_key_without_public_point_is_invalid_parameters() {
    let err = verify_key_pair(EC384_CRT, &secret(EC384_SEC1_NO_PUBLIC_KEY)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidParameters);
}

#[test]
fn encrypted_or_garbled_keys_are_invalid_parameters() {
    let encrypted = pem::encode(&pem::Pem::new("ENCRYPTED PRIVATE KEY", vec![0x30, 0x00]));
    let garbled = pem::encode(&pem::Pem::new("RSA PRIVATE KEY", b"not DER".to_vec()));
    for key in [encrypted, garbled] {
        let err = verify_key_pair(RSA2048_CRT, &secret(&key)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameters, "{key}");
    }
}

#[test]
fn empty_certificate_block_is_malformed() {
    let empty = pem::encode(&pem::Pem::new("CERTIFICATE", Vec::new()));
    let err = certificate::extract(empty.as_bytes()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedPem);
}
