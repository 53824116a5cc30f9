//! Config root and OAuth client registration.
//!
//! Files live in:
//!   ~/.config/gcal/credentials.json   (OAuth client, written by the user)
//!   ~/.config/gcal/token.json         (stored credential, written by gcal)

use anyhow::{Context, Result};
use gcal_core::ClientConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Overrides the config root when set.
pub const CONFIG_DIR_ENV: &str = "GCAL_CONFIG_DIR";

/// Get the config directory path (~/.config/gcal)
pub fn config_dir() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(dir));
    }

    let config_dir = dirs::config_dir()
        .context("Could not determine config directory")?
        .join("gcal");
    Ok(config_dir)
}

pub fn token_path(config_dir: &Path) -> PathBuf {
    config_dir.join("token.json")
}

pub fn credentials_path(config_dir: &Path) -> PathBuf {
    config_dir.join("credentials.json")
}

/// Either the file Google's console hands out, or a plain object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CredentialsFile {
    Installed { installed: GoogleClient },
    Web { web: GoogleClient },
    Flat(FlatClient),
}

#[derive(Debug, Deserialize)]
struct GoogleClient {
    client_id: String,
    client_secret: String,
    #[serde(default)]
    auth_uri: Option<String>,
    #[serde(default)]
    token_uri: Option<String>,
    #[serde(default)]
    redirect_uris: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct FlatClient {
    client_id: String,
    client_secret: String,
    #[serde(default)]
    auth_endpoint: Option<String>,
    #[serde(default)]
    token_endpoint: Option<String>,
    #[serde(default)]
    redirect_uri: Option<String>,
    #[serde(default)]
    scopes: Option<Vec<String>>,
}

impl From<CredentialsFile> for ClientConfig {
    fn from(file: CredentialsFile) -> Self {
        let (client, auth, token, redirect, scopes) = match file {
            CredentialsFile::Installed { installed: c } | CredentialsFile::Web { web: c } => (
                ClientConfig::google(c.client_id, c.client_secret),
                c.auth_uri,
                c.token_uri,
                c.redirect_uris.into_iter().next(),
                None,
            ),
            CredentialsFile::Flat(c) => (
                ClientConfig::google(c.client_id, c.client_secret),
                c.auth_endpoint,
                c.token_endpoint,
                c.redirect_uri,
                c.scopes,
            ),
        };

        let non_empty = |s: Option<String>| s.filter(|s| !s.trim().is_empty());

        ClientConfig {
            auth_endpoint: non_empty(auth).unwrap_or(client.auth_endpoint),
            token_endpoint: non_empty(token).unwrap_or(client.token_endpoint),
            redirect_uri: non_empty(redirect).unwrap_or(client.redirect_uri),
            scopes: scopes
                .filter(|s| !s.is_empty())
                .map(|s| s.into_iter().collect())
                .unwrap_or(client.scopes),
            ..client
        }
    }
}

pub fn parse_client_config(contents: &str) -> Result<ClientConfig> {
    let file: CredentialsFile = serde_json::from_str(contents)
        .context("Expected an OAuth client file with client_id and client_secret")?;
    Ok(file.into())
}

/// Load the OAuth client registration from credentials.json.
pub fn load_client_config(path: &Path) -> Result<ClientConfig> {
    if !path.exists() {
        anyhow::bail!(
            "Google credentials not found.\n\n\
            Create {} with:\n\n\
            {{\n  \
              \"client_id\": \"your-client-id.apps.googleusercontent.com\",\n  \
              \"client_secret\": \"your-client-secret\"\n\
            }}\n\n\
            or save the OAuth client JSON downloaded from\n\
            https://console.cloud.google.com/apis/credentials under that name.",
            path.display()
        );
    }

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read credentials from {}", path.display()))?;

    parse_client_config(&contents)
        .with_context(|| format!("Failed to parse credentials from {}", path.display()))
}
