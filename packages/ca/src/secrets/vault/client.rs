//! Authenticated HTTP client for the Vault API

use std::time::Duration;

use reqwest::{Client, Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;

use cabinet_common::{Error, ErrorKind, Result, ResultExt};

use super::types::{AppRoleLogin, ErrorBody, LoginResponse};
use crate::config::VaultConfig;

const TOKEN_HEADER: &str = "X-Vault-Token";

/// Map a Vault status code and error list onto an error kind
pub(crate) fn classify_status(status: StatusCode, errors: &[String]) -> ErrorKind {
    match status {
        StatusCode::BAD_REQUEST => {
            let conflict = errors.iter().any(|e| {
                let e = e.to_ascii_lowercase();
                e.contains("already in use") || e.contains("existing mount")
            });
            if conflict {
                ErrorKind::AlreadyExists
            } else {
                ErrorKind::InvalidParameters
            }
        }
        StatusCode::NOT_FOUND => ErrorKind::NotFound,
        // Expired or revoked token
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::SERVICE_UNAVAILABLE => {
            ErrorKind::BackendUnavailable
        }
        _ => ErrorKind::Unknown,
    }
}

fn transport_error(method: &Method, path: &str, e: reqwest::Error) -> Error {
    Error::with_source(ErrorKind::BackendUnavailable, e).context(format!("{method} {path}"))
}

/// Vault session holding an AppRole token
pub(crate) struct VaultClient {
    http: Client,
    address: String,
    token: SecretString,
}

impl VaultClient {
    /// Build the HTTP client and log in with AppRole
    ///
    /// # Errors
    ///
    /// - `InvalidParameters` if the CA bundle cannot be read or the client
    ///   cannot be built
    /// - `BackendUnavailable` if Vault is unreachable or rejects the login
    pub(crate) async fn login(config: &VaultConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(concat!("cabinet/", env!("CARGO_PKG_VERSION")));

        if let Some(ca_cert) = &config.ca_cert {
            let bundle = tokio::fs::read(ca_cert)
                .await
                .map_err(|e| Error::with_source(ErrorKind::InvalidParameters, e))
                .with_context(|| format!("reading Vault CA bundle {}", ca_cert.display()))?;
            let root = reqwest::Certificate::from_pem(&bundle)
                .map_err(|e| Error::with_source(ErrorKind::InvalidParameters, e))
                .with_context(|| format!("parsing Vault CA bundle {}", ca_cert.display()))?;
            builder = builder.add_root_certificate(root);
        }

        let http = builder
            .build()
            .map_err(|e| Error::with_source(ErrorKind::InvalidParameters, e))
            .with_context(|| "building Vault HTTP client")?;

        let address = config.address.trim_end_matches('/').to_string();
        let path = "auth/approle/login";
        let body = AppRoleLogin {
            role_id: &config.role_id,
            secret_id: config.secret_id.expose_secret(),
        };

        let response = http
            .post(format!("{address}/v1/{path}"))
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(&Method::POST, path, e))?;

        let status = response.status();
        if !status.is_success() {
            let errors = response.json::<ErrorBody>().await.unwrap_or_default().errors;
            return Err(Error::backend_unavailable(format!(
                "AppRole login rejected with {status}: {}",
                errors.join("; ")
            )));
        }

        let token = response
            .json::<LoginResponse>()
            .await
            .map_err(|e| Error::with_source(ErrorKind::BackendUnavailable, e))?
            .auth
            .map(|auth| auth.client_token)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| Error::backend_unavailable("AppRole login returned no client token"))?;

        tracing::info!(address = %address, "Authenticated to Vault with AppRole");

        Ok(Self {
            http,
            address,
            token: SecretString::from(token),
        })
    }

    /// Send an authenticated request and decode the JSON response body
    ///
    /// An empty body (204) decodes as `None`.
    pub(crate) async fn call<B, T>(&self, method: Method, path: &str, body: Option<&B>) -> Result<Option<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        tracing::debug!(method = %method, path, "Vault request");

        let mut request = self
            .http
            .request(method.clone(), format!("{}/v1/{path}", self.address))
            .header(TOKEN_HEADER, self.token.expose_secret());
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| transport_error(&method, path, e))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| transport_error(&method, path, e))?;

        if !status.is_success() {
            let errors = serde_json::from_str::<ErrorBody>(&text)
                .unwrap_or_default()
                .errors;
            let kind = classify_status(status, &errors);
            tracing::debug!(method = %method, path, status = status.as_u16(), "Vault request failed");
            return Err(Error::msg(
                kind,
                format!("{method} {path}: Vault returned {status}: {}", errors.join("; ")),
            ));
        }

        if text.trim().is_empty() {
            return Ok(None);
        }
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| Error::with_source(ErrorKind::Unknown, e))
            .with_context(|| format!("{method} {path}: unexpected response body"))
    }

    /// Authenticated `GET`
    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        self.call::<(), T>(Method::GET, path, None).await
    }

    /// Authenticated `POST` discarding any response body
    pub(crate) async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<()> {
        self.call::<B, serde::de::IgnoredAny>(Method::POST, path, Some(body))
            .await
            .map(|_| ())
    }

    /// Authenticated `DELETE`
    pub(crate) async fn delete(&self, path: &str) -> Result<()> {
        self.call::<(), serde::de::IgnoredAny>(Method::DELETE, path, None)
            .await
            .map(|_| ())
    }

    /// Probe `sys/health`
    ///
    /// Active and standby nodes count as healthy; sealed or uninitialised
    /// nodes do not.
    pub(crate) async fn health(&self) -> Result<()> {
        let path = "sys/health";
        let response = self
            .http
            .get(format!("{}/v1/{path}", self.address))
            .send()
            .await
            .map_err(|e| transport_error(&Method::GET, path, e))?;

        match response.status().as_u16() {
            200 | 429 | 472 | 473 => Ok(()),
            code => Err(Error::backend_unavailable(format!(
                "Vault health check returned {code}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn errs(msgs: &[&str]) -> Vec<String> {
        msgs.iter().map(|m| (*m).to_string()).collect()
    }

    #[test]
    fn mount_collisions_are_conflicts() {
        let kind = classify_status(
            StatusCode::BAD_REQUEST,
            &errs(&["path is already in use at root-a/"]),
        );
        assert_eq!(kind, ErrorKind::AlreadyExists);

        let kind = classify_status(
            StatusCode::BAD_REQUEST,
            &errs(&["cannot mount under existing mount \"root-a/\""]),
        );
        assert_eq!(kind, ErrorKind::AlreadyExists);
    }

    #[test]
    fn status_mapping() {
        assert_eq!(
            classify_status(StatusCode::BAD_REQUEST, &errs(&["invalid key_bits"])),
            ErrorKind::InvalidParameters
        );
        assert_eq!(classify_status(StatusCode::NOT_FOUND, &[]), ErrorKind::NotFound);
        assert_eq!(
            classify_status(StatusCode::SERVICE_UNAVAILABLE, &errs(&["Vault is sealed"])),
            ErrorKind::BackendUnavailable
        );
        assert_eq!(
            classify_status(StatusCode::FORBIDDEN, &errs(&["permission denied"])),
            ErrorKind::BackendUnavailable
        );
        assert_eq!(
            classify_status(StatusCode::UNAUTHORIZED, &[]),
            ErrorKind::BackendUnavailable
        );
        assert_eq!(
            classify_status(StatusCode::INTERNAL_SERVER_ERROR, &[]),
            ErrorKind::Unknown
        );
    }
}
