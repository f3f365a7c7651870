//! Bearer token storage.
//!
//! The token is issued by the auth flow (out of scope here) and persisted
//! at ~/.orgdesk/token.json. File permissions are tightened on unix.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Persisted bearer token. `access_token` is accepted on read for
/// compatibility with older auth flows.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthToken {
    #[serde(alias = "access_token")]
    pub token: String,
    /// Token expiry (ISO 8601). Absent means unknown — treated as expired
    /// so callers re-authenticate rather than fail mid-session.
    #[serde(default)]
    pub expires_at: Option<String>,
    /// Authenticated account identifier, when the auth flow recorded one.
    #[serde(default)]
    pub account: Option<String>,
}

/// Canonical token file path.
pub fn token_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_default()
        .join(".orgdesk")
        .join("token.json")
}

pub fn load_token() -> Result<AuthToken, ApiError> {
    load_token_from(&token_path())
}

pub fn save_token(token: &AuthToken) -> Result<(), ApiError> {
    save_token_to(&token_path(), token)
}

pub fn delete_token() -> Result<(), ApiError> {
    let path = token_path();
    if path.exists() {
        std::fs::remove_file(path)?;
    }
    Ok(())
}

/// Probe for an authenticated account without propagating errors.
pub fn peek_account() -> Option<String> {
    match load_token() {
        Ok(token) => Some(
            token
                .account
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| "connected".to_string()),
        ),
        Err(_) => None,
    }
}

/// Check whether a token is expired, with a 60 second skew so a token
/// about to lapse is not handed to an in-flight call.
pub fn is_token_expired(token: &AuthToken) -> bool {
    match &token.expires_at {
        None => true,
        Some(raw) => match chrono::DateTime::parse_from_rfc3339(raw) {
            Ok(expiry) => expiry <= chrono::Utc::now() + chrono::Duration::seconds(60),
            Err(_) => true,
        },
    }
}

pub(crate) fn load_token_from(path: &Path) -> Result<AuthToken, ApiError> {
    if !path.exists() {
        return Err(ApiError::TokenNotFound(path.to_path_buf()));
    }
    let content = std::fs::read_to_string(path)?;
    let token: AuthToken = serde_json::from_str(&content)?;
    Ok(token)
}

pub(crate) fn save_token_to(path: &Path, token: &AuthToken) -> Result<(), ApiError> {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent)?;
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                std::fs::set_permissions(parent, std::fs::Permissions::from_mode(0o700))?;
            }
        }
    }

    let content = serde_json::to_string_pretty(token)?;
    crate::util::atomic_write_str(path, &content)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(expires_at: Option<String>) -> AuthToken {
        AuthToken {
            token: "orgdesk-test-token".to_string(),
            expires_at,
            account: Some("admin@acme.test".to_string()),
        }
    }

    #[test]
    fn test_token_roundtrip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");

        save_token_to(&path, &token(Some("2027-01-01T00:00:00+00:00".to_string()))).unwrap();
        let loaded = load_token_from(&path).unwrap();
        assert_eq!(loaded.token, "orgdesk-test-token");
        assert_eq!(loaded.account.as_deref(), Some("admin@acme.test"));
    }

    #[cfg(unix)]
    #[test]
    fn test_token_file_is_private() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        save_token_to(&path, &token(None)).unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_missing_token_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        assert!(matches!(
            load_token_from(&path),
            Err(ApiError::TokenNotFound(_))
        ));
    }

    #[test]
    fn test_access_token_alias_accepted() {
        let json = r#"{ "access_token": "legacy-token" }"#;
        let parsed: AuthToken = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.token, "legacy-token");
    }

    #[test]
    fn test_expiry_checks() {
        assert!(is_token_expired(&token(None)));
        assert!(is_token_expired(&token(Some("garbage".to_string()))));

        let future = (chrono::Utc::now() + chrono::Duration::hours(1)).to_rfc3339();
        assert!(!is_token_expired(&token(Some(future))));

        let past = (chrono::Utc::now() - chrono::Duration::hours(1)).to_rfc3339();
        assert!(is_token_expired(&token(Some(past))));
    }
}
