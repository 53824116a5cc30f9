//! Interactive OAuth authorization-code flow.
//!
//! The flow is a small state machine:
//!
//! ```text
//! AwaitingUserAction --(code entered)--> Exchanging --(token granted)--> Done
//! ```
//!
//! Waiting for the operator to paste the code is the only place the program
//! blocks on a human. There is no timeout; the process is simply killed if the
//! operator walks away.

use std::io;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info};
use url::Url;
use uuid::Uuid;

use crate::credential::{ClientConfig, StoredCredential, TokenGrant};
use crate::error::{GcalError, GcalResult, RemoteError};
use crate::store::CredentialStore;

/// The OAuth token endpoint.
#[async_trait(?Send)]
pub trait TokenEndpoint {
    /// Trade a one-time authorization code for tokens.
    async fn exchange_code(
        &self,
        config: &ClientConfig,
        code: &str,
    ) -> Result<TokenGrant, RemoteError>;

    /// Obtain a new access token without operator involvement.
    async fn refresh(
        &self,
        config: &ClientConfig,
        refresh_token: &str,
    ) -> Result<TokenGrant, RemoteError>;
}

/// Whoever is sitting at the terminal.
pub trait Operator {
    /// Show the authorization URL.
    fn present(&mut self, authorization_url: &Url);

    /// Block until one line of input arrives. `None` means input is closed.
    fn read_code(&mut self) -> io::Result<Option<String>>;
}

enum FlowState {
    AwaitingUserAction { url: Url, csrf_state: String },
    Exchanging { code: String },
    Done(StoredCredential),
}

/// One run of the authorization-code flow. Consumed by [`AuthorizationFlow::run`].
pub struct AuthorizationFlow<'a, E: ?Sized, O: ?Sized> {
    config: &'a ClientConfig,
    store: &'a CredentialStore,
    endpoint: &'a E,
    operator: &'a mut O,
}

impl<'a, E, O> AuthorizationFlow<'a, E, O>
where
    E: TokenEndpoint + ?Sized,
    O: Operator + ?Sized,
{
    pub fn new(
        config: &'a ClientConfig,
        store: &'a CredentialStore,
        endpoint: &'a E,
        operator: &'a mut O,
    ) -> Self {
        AuthorizationFlow {
            config,
            store,
            endpoint,
            operator,
        }
    }

    /// Drive the flow to completion. The credential is persisted before it is
    /// returned. Codes are single-use, so a failed exchange is never retried.
    pub async fn run(self) -> GcalResult<StoredCredential> {
        let csrf_state = Uuid::new_v4().to_string();
        let mut state = FlowState::AwaitingUserAction {
            url: authorization_url(self.config, &csrf_state)?,
            csrf_state,
        };

        loop {
            state = match state {
                FlowState::AwaitingUserAction { url, csrf_state } => {
                    self.operator.present(&url);

                    let input = self
                        .operator
                        .read_code()
                        .map_err(|e| {
                            GcalError::AuthorizationFailed(format!(
                                "Unable to read authorization code: {}",
                                e
                            ))
                        })?
                        .ok_or_else(|| {
                            GcalError::AuthorizationFailed(
                                "No authorization code was entered (input closed)".to_string(),
                            )
                        })?;

                    FlowState::Exchanging {
                        code: parse_code_input(&input, &csrf_state)?,
                    }
                }
                FlowState::Exchanging { code } => {
                    debug!("Exchanging authorization code for tokens");

                    let grant = self
                        .endpoint
                        .exchange_code(self.config, &code)
                        .await
                        .map_err(|e| {
                            GcalError::AuthorizationFailed(format!(
                                "Unable to retrieve token from web: {}",
                                e
                            ))
                        })?;

                    FlowState::Done(StoredCredential::from_grant(grant, None, Utc::now()))
                }
                FlowState::Done(credential) => {
                    if !credential.can_refresh() {
                        info!("Token endpoint issued no refresh token; the next expiry will need a new authorization");
                    }
                    self.store.save(&credential)?;
                    return Ok(credential);
                }
            };
        }
    }
}

/// Build the consent URL: client id, scopes, offline access (so a refresh
/// token is issued) and the anti-forgery `state`.
pub fn authorization_url(config: &ClientConfig, csrf_state: &str) -> GcalResult<Url> {
    let mut url = Url::parse(&config.auth_endpoint).map_err(|e| {
        GcalError::AuthorizationFailed(format!(
            "Invalid authorization endpoint {}: {}",
            config.auth_endpoint, e
        ))
    })?;

    url.query_pairs_mut()
        .append_pair("client_id", &config.client_id)
        .append_pair("redirect_uri", &config.redirect_uri)
        .append_pair("response_type", "code")
        .append_pair("scope", &config.scope_param())
        .append_pair("access_type", "offline")
        .append_pair("state", csrf_state);

    Ok(url)
}

/// Accept either the bare code or the whole URL the browser was redirected to.
pub fn parse_code_input(input: &str, expected_state: &str) -> GcalResult<String> {
    let input = input.trim();

    if input.is_empty() {
        return Err(GcalError::AuthorizationFailed(
            "No authorization code was entered".to_string(),
        ));
    }

    if !(input.starts_with("http://") || input.starts_with("https://")) {
        return Ok(input.to_string());
    }

    let url = Url::parse(input).map_err(|e| {
        GcalError::AuthorizationFailed(format!("Could not parse redirect URL: {}", e))
    })?;

    let param = |name: &str| {
        url.query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.to_string())
    };

    if let Some(error) = param("error") {
        return Err(GcalError::AuthorizationFailed(format!(
            "Authorization was denied: {}",
            error
        )));
    }

    if let Some(state) = param("state")
        && state != expected_state
    {
        return Err(GcalError::AuthorizationFailed(
            "State in redirect URL does not match this authorization request".to_string(),
        ));
    }

    param("code")
        .filter(|c| !c.is_empty())
        .ok_or_else(|| GcalError::AuthorizationFailed("No code in redirect URL".to_string()))
}
