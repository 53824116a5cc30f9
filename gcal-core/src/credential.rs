//! Credential and OAuth client types.

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

pub const GOOGLE_AUTH_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/auth";
pub const GOOGLE_TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
pub const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar";
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost";

/// Lifetime assumed when the token endpoint omits `expires_in`.
const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;

/// The persisted delegated-access token.
///
/// Field names match the JSON the usual OAuth client libraries write, so an
/// existing `token.json` can be picked up as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCredential {
    pub access_token: String,
    pub token_type: String,
    pub refresh_token: String,
    pub expiry: DateTime<Utc>,
}

impl StoredCredential {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expiry
    }

    pub fn can_refresh(&self) -> bool {
        !self.refresh_token.is_empty()
    }

    /// Build a credential from a token endpoint response.
    ///
    /// Refresh responses usually omit `refresh_token`; `previous` supplies it then.
    pub fn from_grant(
        grant: TokenGrant,
        previous: Option<&StoredCredential>,
        now: DateTime<Utc>,
    ) -> Self {
        let refresh_token = grant
            .refresh_token
            .filter(|t| !t.is_empty())
            .or_else(|| previous.map(|p| p.refresh_token.clone()))
            .unwrap_or_default();

        let token_type = grant
            .token_type
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "Bearer".to_string());

        let expires_in = grant.expires_in.unwrap_or(DEFAULT_EXPIRES_IN_SECS);

        StoredCredential {
            access_token: grant.access_token,
            token_type,
            refresh_token,
            expiry: now + Duration::seconds(expires_in),
        }
    }
}

/// What a token endpoint hands back for a code exchange or a refresh.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// OAuth client registration. Read-only for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub client_id: String,
    pub client_secret: String,
    pub auth_endpoint: String,
    pub token_endpoint: String,
    pub redirect_uri: String,
    pub scopes: BTreeSet<String>,
}

impl ClientConfig {
    /// A Google client with the default endpoints and the full calendar scope.
    pub fn google(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        ClientConfig {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            auth_endpoint: GOOGLE_AUTH_ENDPOINT.to_string(),
            token_endpoint: GOOGLE_TOKEN_ENDPOINT.to_string(),
            redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
            scopes: BTreeSet::from([CALENDAR_SCOPE.to_string()]),
        }
    }

    /// Scopes in the space-separated form OAuth expects.
    pub fn scope_param(&self) -> String {
        self.scopes.iter().cloned().collect::<Vec<_>>().join(" ")
    }
}
