//! Request-scoped authentication context
//!
//! The transport layer verifies the bearer token and hands the decoded claims
//! to the lifecycle service inside a [`RequestContext`]. Nothing here checks
//! signatures.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use uuid::Uuid;

use crate::logging::LoggingTransformer;

/// Verified identity claims.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject.
    pub sub: String,
    /// Issuer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    /// Expiry (unix seconds).
    #[serde(default)]
    pub exp: i64,
    /// Issued-at (unix seconds).
    #[serde(default)]
    pub iat: i64,
    /// Human-readable user name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_username: Option<String>,
    /// Granted roles.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,
    /// Custom data.
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl Claims {
    /// Claims for the given subject with no other attributes.
    pub fn for_subject(sub: impl Into<String>) -> Self {
        Self {
            sub: sub.into(),
            ..Self::default()
        }
    }

    /// Add a role.
    #[must_use]
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.push(role.into());
        self
    }

    /// True if the claims grant `role`.
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

/// Per-request context passed by reference to every service call
#[derive(Debug, Clone)]
pub struct RequestContext {
    claims: Claims,
    request_id: Uuid,
}

impl RequestContext {
    /// Wrap already-verified claims with a fresh request id
    #[must_use]
    pub fn new(claims: Claims) -> Self {
        let ctx = Self {
            claims,
            request_id: Uuid::new_v4(),
        };
        LoggingTransformer::log_auth_event(Some(&ctx.claims.sub), true);
        ctx
    }

    /// Context for local tooling with no authenticated caller
    #[must_use]
    pub fn anonymous() -> Self {
        LoggingTransformer::log_auth_event(None, true);
        Self {
            claims: Claims::default(),
            request_id: Uuid::new_v4(),
        }
    }

    /// Verified claims of the caller
    #[must_use]
    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    /// Unique id for correlating log lines of one request
    #[must_use]
    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    /// Subject of the caller, `None` when anonymous
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        if self.claims.sub.is_empty() {
            None
        } else {
            Some(&self.claims.sub)
        }
    }
}
