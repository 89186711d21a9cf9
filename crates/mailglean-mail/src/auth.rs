use std::fs;
use std::path::Path;
use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{MailError, Result};

pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
pub const MAILBOX_SCOPE: &str = "https://www.googleapis.com/auth/gmail.modify";

const TOKEN_TIMEOUT: Duration = Duration::from_secs(10);

/// Long-lived credentials persisted after the one-time code exchange.
/// Client id and secret are stored alongside the refresh token so later
/// refreshes need nothing from the environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredCredentials {
    pub refresh_token: String,
    pub client_id: String,
    pub client_secret: String,
    pub token_uri: String,
    pub scopes: String,
}

impl StoredCredentials {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        restrict_permissions(path)?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    refresh_token: Option<String>,
}

/// One-time exchange of an authorization code for a refresh token.
pub fn exchange_code(
    client_id: &str,
    client_secret: &str,
    redirect_uri: &str,
    code: &str,
) -> Result<StoredCredentials> {
    let response: TokenResponse = token_client()?
        .post(DEFAULT_TOKEN_URI)
        .form(&[
            ("code", code),
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("redirect_uri", redirect_uri),
            ("grant_type", "authorization_code"),
            ("access_type", "offline"),
        ])
        .send()?
        .error_for_status()?
        .json()?;

    let refresh_token = response.refresh_token.ok_or_else(|| {
        MailError::Auth(
            "token response had no refresh token; re-consent with offline access".to_string(),
        )
    })?;
    debug!("authorization code exchanged");

    Ok(StoredCredentials {
        refresh_token,
        client_id: client_id.to_string(),
        client_secret: client_secret.to_string(),
        token_uri: DEFAULT_TOKEN_URI.to_string(),
        scopes: MAILBOX_SCOPE.to_string(),
    })
}

/// Trade the stored refresh token for a short-lived access token.
pub fn fetch_access_token(credentials: &StoredCredentials) -> Result<String> {
    let response: TokenResponse = token_client()?
        .post(&credentials.token_uri)
        .form(&[
            ("refresh_token", credentials.refresh_token.as_str()),
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
            ("grant_type", "refresh_token"),
        ])
        .send()?
        .error_for_status()?
        .json()?;

    response
        .access_token
        .ok_or_else(|| MailError::Auth("token response had no access token".to_string()))
}

fn token_client() -> Result<Client> {
    Ok(Client::builder()
        .timeout(TOKEN_TIMEOUT)
        .connect_timeout(TOKEN_TIMEOUT)
        .build()?)
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = fs::metadata(path)?.permissions();
    perms.set_mode(0o600);
    fs::set_permissions(path, perms)?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::StoredCredentials;
    use tempfile::TempDir;

    #[test]
    fn credentials_round_trip() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("nested").join("credentials.json");
        let creds = StoredCredentials {
            refresh_token: "refresh".to_string(),
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
            token_uri: super::DEFAULT_TOKEN_URI.to_string(),
            scopes: super::MAILBOX_SCOPE.to_string(),
        };
        creds.save(&path).expect("save");

        let loaded = StoredCredentials::load(&path).expect("load");
        assert_eq!(loaded.refresh_token, "refresh");
        assert_eq!(loaded.client_id, "id");

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).expect("metadata").permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[test]
    fn load_missing_credentials_fails() {
        let temp = TempDir::new().expect("tempdir");
        assert!(StoredCredentials::load(&temp.path().join("absent.json")).is_err());
    }
}
