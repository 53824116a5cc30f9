//! OAuth token endpoint over HTTP.

use async_trait::async_trait;
use gcal_core::{ClientConfig, RemoteError, TokenEndpoint, TokenGrant};
use tracing::debug;

pub struct HttpTokenEndpoint {
    client: reqwest::Client,
}

impl HttpTokenEndpoint {
    pub fn new() -> Self {
        HttpTokenEndpoint {
            client: reqwest::Client::new(),
        }
    }

    async fn request(
        &self,
        config: &ClientConfig,
        params: &[(&str, &str)],
    ) -> Result<TokenGrant, RemoteError> {
        let grant_type = params
            .iter()
            .find(|(k, _)| *k == "grant_type")
            .map(|(_, v)| *v)
            .unwrap_or_default();
        debug!(endpoint = %config.token_endpoint, grant_type, "Requesting token");

        let response = self
            .client
            .post(&config.token_endpoint)
            .form(params)
            .send()
            .await
            .map_err(|e| RemoteError::new(format!("Failed to send token request: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(RemoteError::new(format!("{}: {}", status, error_text.trim())));
        }

        response
            .json::<TokenGrant>()
            .await
            .map_err(|e| RemoteError::new(format!("Failed to parse token response: {}", e)))
    }
}

#[async_trait(?Send)]
impl TokenEndpoint for HttpTokenEndpoint {
    async fn exchange_code(
        &self,
        config: &ClientConfig,
        code: &str,
    ) -> Result<TokenGrant, RemoteError> {
        self.request(
            config,
            &[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("client_id", &config.client_id),
                ("client_secret", &config.client_secret),
                ("redirect_uri", &config.redirect_uri),
            ],
        )
        .await
    }

    async fn refresh(
        &self,
        config: &ClientConfig,
        refresh_token: &str,
    ) -> Result<TokenGrant, RemoteError> {
        self.request(
            config,
            &[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
                ("client_id", &config.client_id),
                ("client_secret", &config.client_secret),
            ],
        )
        .await
    }
}
