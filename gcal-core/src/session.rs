//! Creates a valid session (access token) that we can use to call the calendar API.

use std::fmt;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::auth::{AuthorizationFlow, Operator, TokenEndpoint};
use crate::credential::{ClientConfig, StoredCredential};
use crate::error::GcalResult;
use crate::store::CredentialStore;

/// Proof of a usable session: client registration plus a live credential.
///
/// Not `Clone`; callers borrow it for the duration of one command.
pub struct AuthenticatedHandle {
    config: ClientConfig,
    credential: StoredCredential,
}

impl AuthenticatedHandle {
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn access_token(&self) -> &str {
        &self.credential.access_token
    }

    pub fn refresh_token(&self) -> &str {
        &self.credential.refresh_token
    }

    pub fn token_type(&self) -> &str {
        &self.credential.token_type
    }

    pub fn expiry(&self) -> DateTime<Utc> {
        self.credential.expiry
    }
}

impl fmt::Debug for AuthenticatedHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthenticatedHandle")
            .field("client_id", &self.config.client_id)
            .field("token_type", &self.credential.token_type)
            .field("expiry", &self.credential.expiry)
            .finish_non_exhaustive()
    }
}

/// The one entry point for getting an authenticated handle.
///
/// Stored credential if still valid, silent refresh if expired, interactive
/// authorization if there is nothing usable on disk or the refresh is refused.
pub struct SessionManager<E, O> {
    store: CredentialStore,
    endpoint: E,
    operator: O,
}

impl<E, O> SessionManager<E, O>
where
    E: TokenEndpoint,
    O: Operator,
{
    pub fn new(store: CredentialStore, endpoint: E, operator: O) -> Self {
        SessionManager {
            store,
            endpoint,
            operator,
        }
    }

    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    pub async fn get_handle(&mut self, config: ClientConfig) -> GcalResult<AuthenticatedHandle> {
        let credential = match self.store.load() {
            Ok(credential) => self.ensure_fresh(&config, credential).await?,
            Err(e) if e.is_recoverable() => {
                info!("{}; starting authorization", e);
                self.authorize(&config).await?
            }
            Err(e) => return Err(e),
        };

        Ok(AuthenticatedHandle { config, credential })
    }

    async fn ensure_fresh(
        &mut self,
        config: &ClientConfig,
        credential: StoredCredential,
    ) -> GcalResult<StoredCredential> {
        if !credential.is_expired(Utc::now()) {
            debug!(expiry = %credential.expiry, "Stored access token is still valid");
            return Ok(credential);
        }

        if !credential.can_refresh() {
            warn!("Access token expired and no refresh token is stored; re-authorizing");
            return self.authorize(config).await;
        }

        info!("Access token expired, refreshing");

        match self.endpoint.refresh(config, &credential.refresh_token).await {
            Ok(grant) => {
                let refreshed = StoredCredential::from_grant(grant, Some(&credential), Utc::now());
                self.store.save(&refreshed)?;
                Ok(refreshed)
            }
            Err(e) => {
                warn!(error = %e, "Token refresh was refused; falling back to interactive authorization");
                self.authorize(config).await
            }
        }
    }

    async fn authorize(&mut self, config: &ClientConfig) -> GcalResult<StoredCredential> {
        AuthorizationFlow::new(config, &self.store, &self.endpoint, &mut self.operator)
            .run()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{GcalError, RemoteError};
    use crate::testing::{EndpointCall, RecordingEndpoint, ScriptedOperator, grant};
    use chrono::Duration;

    fn config() -> ClientConfig {
        ClientConfig::google("client-id", "client-secret")
    }

    fn stored(expiry: DateTime<Utc>, refresh_token: &str) -> StoredCredential {
        StoredCredential {
            access_token: "stored-access".into(),
            token_type: "Bearer".into(),
            refresh_token: refresh_token.into(),
            expiry,
        }
    }

    fn manager(
        dir: &tempfile::TempDir,
        endpoint: &RecordingEndpoint,
        code: Option<&str>,
    ) -> SessionManager<RecordingEndpoint, ScriptedOperator> {
        SessionManager::new(
            CredentialStore::new(dir.path().join("token.json")),
            endpoint.clone(),
            ScriptedOperator::new(code),
        )
    }

    #[tokio::test]
    async fn valid_token_is_used_without_network_or_operator() {
        let dir = tempfile::tempdir().unwrap();
        let endpoint = RecordingEndpoint::new(Ok(grant("x", Some("y"))), Ok(grant("x", None)));
        let mut manager = manager(&dir, &endpoint, None);
        manager
            .store()
            .save(&stored(Utc::now() + Duration::hours(1), "refresh"))
            .unwrap();

        let handle = manager.get_handle(config()).await.unwrap();

        assert_eq!(handle.access_token(), "stored-access");
        assert!(endpoint.calls().is_empty());
    }

    #[tokio::test]
    async fn expired_token_is_refreshed_and_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let endpoint = RecordingEndpoint::new(
            Ok(grant("should-not-exchange", Some("r"))),
            Ok(grant("refreshed-access", None)),
        );
        let mut manager = manager(&dir, &endpoint, None);
        manager
            .store()
            .save(&stored(Utc::now() - Duration::minutes(5), "long-lived"))
            .unwrap();

        let handle = manager.get_handle(config()).await.unwrap();

        assert_eq!(handle.access_token(), "refreshed-access");
        assert_eq!(handle.refresh_token(), "long-lived");
        assert!(handle.expiry() > Utc::now());
        assert_eq!(endpoint.calls(), vec![EndpointCall::Refresh("long-lived".into())]);

        let on_disk = manager.store().load().unwrap();
        assert_eq!(on_disk.access_token, "refreshed-access");
        assert_eq!(on_disk.refresh_token, "long-lived");
    }

    #[tokio::test]
    async fn refused_refresh_falls_back_to_interactive_authorization() {
        let dir = tempfile::tempdir().unwrap();
        let endpoint = RecordingEndpoint::new(
            Ok(grant("authorized-access", Some("new-refresh"))),
            Err(RemoteError::new("invalid_grant: Token has been expired or revoked.")),
        );
        let mut manager = manager(&dir, &endpoint, Some("4/code"));
        manager
            .store()
            .save(&stored(Utc::now() - Duration::days(30), "revoked"))
            .unwrap();

        let handle = manager.get_handle(config()).await.unwrap();

        assert_eq!(handle.access_token(), "authorized-access");
        assert_eq!(
            endpoint.calls(),
            vec![
                EndpointCall::Refresh("revoked".into()),
                EndpointCall::Exchange("4/code".into()),
            ]
        );
        assert_eq!(manager.store().load().unwrap().refresh_token, "new-refresh");
    }

    #[tokio::test]
    async fn expired_token_without_refresh_token_goes_straight_to_authorization() {
        let dir = tempfile::tempdir().unwrap();
        let endpoint = RecordingEndpoint::new(Ok(grant("authorized", Some("r"))), Ok(grant("x", None)));
        let mut manager = manager(&dir, &endpoint, Some("code"));
        manager
            .store()
            .save(&stored(Utc::now() - Duration::hours(1), ""))
            .unwrap();

        manager.get_handle(config()).await.unwrap();

        assert_eq!(endpoint.calls(), vec![EndpointCall::Exchange("code".into())]);
    }

    #[tokio::test]
    async fn missing_token_file_triggers_authorization() {
        let dir = tempfile::tempdir().unwrap();
        let endpoint = RecordingEndpoint::new(Ok(grant("first", Some("r"))), Ok(grant("x", None)));
        let mut manager = manager(&dir, &endpoint, Some("code"));

        let handle = manager.get_handle(config()).await.unwrap();

        assert_eq!(handle.access_token(), "first");
        assert_eq!(endpoint.calls(), vec![EndpointCall::Exchange("code".into())]);
        assert!(dir.path().join("token.json").exists());
    }

    #[tokio::test]
    async fn corrupt_token_file_is_treated_like_a_missing_one() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("token.json"), "{\"access_token\": \"trunc").unwrap();
        let endpoint = RecordingEndpoint::new(Ok(grant("replacement", Some("r"))), Ok(grant("x", None)));
        let mut manager = manager(&dir, &endpoint, Some("code"));

        let handle = manager.get_handle(config()).await.unwrap();

        assert_eq!(handle.access_token(), "replacement");
        assert_eq!(endpoint.calls(), vec![EndpointCall::Exchange("code".into())]);
        assert_eq!(manager.store().load().unwrap().access_token, "replacement");
    }

    #[tokio::test]
    async fn no_operator_input_aborts_the_session() {
        let dir = tempfile::tempdir().unwrap();
        let endpoint = RecordingEndpoint::new(Ok(grant("a", Some("r"))), Ok(grant("a", None)));
        let mut manager = manager(&dir, &endpoint, None);

        let err = manager.get_handle(config()).await.unwrap_err();

        assert!(matches!(err, GcalError::AuthorizationFailed(_)));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn debug_output_hides_tokens() {
        let handle = AuthenticatedHandle {
            config: config(),
            credential: stored(Utc::now(), "secret-refresh"),
        };
        let rendered = format!("{:?}", handle);
        assert!(!rendered.contains("stored-access"));
        assert!(!rendered.contains("secret-refresh"));
    }
}
