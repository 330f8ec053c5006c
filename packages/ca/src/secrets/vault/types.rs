//! Vault HTTP API request and response bodies

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub(super) struct AppRoleLogin<'a> {
    pub role_id: &'a str,
    pub secret_id: &'a str,
}

#[derive(Debug, Deserialize)]
pub(super) struct LoginResponse {
    pub auth: Option<LoginAuth>,
}

#[derive(Debug, Deserialize)]
pub(super) struct LoginAuth {
    pub client_token: String,
}

/// Body Vault sends with every non-2xx status
#[derive(Debug, Default, Deserialize)]
pub(super) struct ErrorBody {
    #[serde(default)]
    pub errors: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CertificateResponse {
    pub data: Option<CertificateData>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CertificateData {
    #[serde(default)]
    pub certificate: String,
}

#[derive(Debug, Serialize)]
pub(super) struct EnableMount<'a> {
    #[serde(rename = "type")]
    pub mount_type: &'a str,
    pub config: MountTuning<'a>,
}

#[derive(Debug, Serialize)]
pub(super) struct MountTuning<'a> {
    pub max_lease_ttl: &'a str,
}

/// `POST /v1/<mount>/root/generate/internal`
#[derive(Debug, Serialize)]
pub(super) struct GenerateRoot<'a> {
    pub common_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_bits: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<&'a str>,
    #[serde(skip_serializing_if = "str::is_empty")]
    pub organization: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    pub ou: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    pub country: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    pub province: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    pub locality: &'a str,
}

/// `POST /v1/<mount>/config/ca`; the bundle holds the private key
#[derive(Serialize)]
pub(super) struct ConfigCa<'a> {
    pub pem_bundle: &'a str,
}
