//! Configuration loading from disk

use std::io::Write;

use secrecy::ExposeSecret;
use tempfile::NamedTempFile;

use cabinet_ca::config::CabinetConfig;
use cabinet_ca::secrets::SecretsBackendKind;
use cabinet_common::ErrorKind;

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn loads_vault_settings_from_file() {
    let file = config_file(
        r#"
        backend = "vault"

        [vault]
        address = "https://vault.internal:8200"
        role_id = "cabinet"
        secret_id = "s3cr3t"
        ca_cert = "/etc/cabinet/vault-ca.pem"
        request_timeout_secs = 5
        default_max_lease_ttl = "43800h"
        "#,
    );

    let config = CabinetConfig::load(file.path()).unwrap();
    assert_eq!(config.backend, SecretsBackendKind::Vault);
    assert_eq!(config.vault.address, "https://vault.internal:8200");
    assert_eq!(config.vault.role_id, "cabinet");
    assert_eq!(config.vault.secret_id.expose_secret(), "s3cr3t");
    assert_eq!(
        config.vault.ca_cert.as_deref(),
        Some(std::path::Path::new("/etc/cabinet/vault-ca.pem"))
    );
    assert_eq!(config.vault.request_timeout_secs, 5);
    assert_eq!(config.vault.default_max_lease_ttl, "43800h");
}

#[test]
fn omitted_fields_take_defaults() {
    let file = config_file("backend = \"memory\"\n");

    let config = CabinetConfig::load(file.path()).unwrap();
    assert_eq!(config.backend, SecretsBackendKind::Memory);
    assert_eq!(config.vault.address, "https://127.0.0.1:8200");
    assert!(config.vault.role_id.is_empty());
    assert!(config.vault.secret_id.expose_secret().is_empty());
    assert_eq!(config.vault.request_timeout_secs, 30);
    assert_eq!(config.vault.default_max_lease_ttl, "87600h");
}

#[test]
fn secret_id_is_redacted_in_debug_output() {
    let file = config_file("[vault]\nsecret_id = \"do-not-print\"\n");

    let config = CabinetConfig::load(file.path()).unwrap();
    assert!(!format!("{config:?}").contains("do-not-print"));
}

#[test]
fn broken_files_are_invalid_parameters() {
    let cases = [
        "backend = ",
        "backend = \"consul\"",
        "[vault]\nrequest_timeout_secs = 0",
        "[vault]\naddress = \"vault.internal:8200\"",
        "[vault]\ndefault_max_lease_ttl = \"ten years\"",
    ];
    for contents in cases {
        let file = config_file(contents);
        let err = CabinetConfig::load(file.path()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameters, "{contents}");
        assert!(
            err.get_context().unwrap_or_default().contains("config"),
            "{contents}: {err}"
        );
    }
}

#[test]
fn missing_file_is_invalid_parameters_for_load() {
    let dir = tempfile::tempdir().unwrap();
    let err = CabinetConfig::load(&dir.path().join("absent.toml")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidParameters);
}

#[test]
fn resolve_falls_back_to_defaults_when_file_is_absent() {
    let dir = tempfile::tempdir().unwrap();
    let config = CabinetConfig::resolve(Some(&dir.path().join("absent.toml"))).unwrap();
    assert_eq!(config.vault.request_timeout_secs, 30);
}
