//! Directory REST API client.
//!
//! Direct HTTP via reqwest with Bearer token auth. Every response is
//! expected in the `{ "success": ..., "data": ... }` envelope; error bodies
//! carry `{ "message": ... }`. Decoding is strict — nothing enters the
//! store layer untyped.
//!
//! Modules:
//! - companies: company CRUD + company users sub-resource
//! - teams: team CRUD + membership mutation
//! - users: organization user directory
//! - profile: own-profile read/update (JSON or multipart)
//! - token_store: persisted bearer token

pub mod companies;
pub mod profile;
pub mod teams;
pub mod token_store;
pub mod users;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

use crate::error::ApiError;
use crate::types::{
    AssignUsers, Company, Config, CreateCompany, CreateTeam, Page, ProfileRecord, Team,
    UpdateCompany, UpdateProfile, UpdateTeam, User,
};

use token_store::AuthToken;

// ============================================================================
// Response envelope
// ============================================================================

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    success: bool,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// Parse a 2xx body: envelope must report success and carry data.
pub(crate) fn parse_envelope<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    let envelope: Envelope<T> = serde_json::from_str(body)?;
    if !envelope.success {
        return Err(ApiError::Envelope(
            "server reported success=false".to_string(),
        ));
    }
    envelope
        .data
        .ok_or_else(|| ApiError::Envelope("missing data field".to_string()))
}

/// Parse a 2xx body for operations with no payload (delete, assign).
/// Only `success` is required.
pub(crate) fn parse_unit(body: &str) -> Result<(), ApiError> {
    let envelope: Envelope<serde_json::Value> = serde_json::from_str(body)?;
    if !envelope.success {
        return Err(ApiError::Envelope(
            "server reported success=false".to_string(),
        ));
    }
    Ok(())
}

/// Turn a response into a typed payload. 401 maps to `AuthExpired`; other
/// non-2xx statuses extract the server's `message` when the body has one.
pub(crate) async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ApiError> {
    let body = check_status(resp).await?;
    parse_envelope(&body)
}

pub(crate) async fn decode_unit(resp: reqwest::Response) -> Result<(), ApiError> {
    let body = check_status(resp).await?;
    parse_unit(&body)
}

async fn check_status(resp: reqwest::Response) -> Result<String, ApiError> {
    let status = resp.status();
    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(ApiError::AuthExpired);
    }
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.message);
        return Err(ApiError::Api {
            status: status.as_u16(),
            message,
        });
    }
    Ok(resp.text().await.unwrap_or_default())
}

// ============================================================================
// Client
// ============================================================================

pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
    token: String,
}

impl ApiClient {
    pub fn new(base_url: &str, token: &str) -> Result<Self, ApiError> {
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };
        let base = Url::parse(&normalized)
            .map_err(|e| ApiError::InvalidBaseUrl(format!("{}: {}", base_url, e)))?;
        Ok(Self {
            http: reqwest::Client::new(),
            base,
            token: token.to_string(),
        })
    }

    pub fn from_config(config: &Config, token: &AuthToken) -> Result<Self, ApiError> {
        Self::new(&config.base_url_normalized(), &token.token)
    }

    /// Join a relative endpoint path onto the base URL.
    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base
            .join(path)
            .map_err(|e| ApiError::InvalidBaseUrl(format!("{}: {}", path, e)))
    }

    pub(crate) fn get(&self, url: Url) -> reqwest::RequestBuilder {
        self.http.get(url).bearer_auth(&self.token)
    }

    pub(crate) fn post(&self, url: Url) -> reqwest::RequestBuilder {
        self.http.post(url).bearer_auth(&self.token)
    }

    pub(crate) fn put(&self, url: Url) -> reqwest::RequestBuilder {
        self.http.put(url).bearer_auth(&self.token)
    }

    pub(crate) fn delete(&self, url: Url) -> reqwest::RequestBuilder {
        self.http.delete(url).bearer_auth(&self.token)
    }
}

// ============================================================================
// Endpoint surface
// ============================================================================

/// The full endpoint surface the sync engines dispatch against.
///
/// Dyn-compatible so tests can drive engines through in-memory stubs; the
/// production implementation is `ApiClient`.
#[async_trait]
pub trait DirectoryApi: Send + Sync {
    async fn list_companies(
        &self,
        organization_id: i64,
        page: u32,
        limit: u32,
        search: Option<&str>,
    ) -> Result<Page<Company>, ApiError>;
    async fn create_company(&self, req: &CreateCompany) -> Result<Company, ApiError>;
    async fn update_company(&self, id: i64, req: &UpdateCompany) -> Result<Company, ApiError>;
    async fn delete_company(&self, id: i64) -> Result<(), ApiError>;
    async fn company_users(&self, id: i64) -> Result<Vec<User>, ApiError>;

    async fn list_teams(
        &self,
        organization_id: i64,
        page: u32,
        limit: u32,
        search: Option<&str>,
    ) -> Result<Page<Team>, ApiError>;
    async fn create_team(&self, req: &CreateTeam) -> Result<Team, ApiError>;
    async fn update_team(&self, id: i64, req: &UpdateTeam) -> Result<Team, ApiError>;
    async fn delete_team(&self, id: i64) -> Result<(), ApiError>;
    async fn add_team_members(&self, team_id: i64, user_ids: &[i64]) -> Result<Team, ApiError>;
    async fn remove_team_members(
        &self,
        organization_id: i64,
        team_id: i64,
        user_ids: &[i64],
    ) -> Result<Team, ApiError>;
    async fn assign_users(&self, req: &AssignUsers) -> Result<(), ApiError>;

    async fn user_directory(&self, organization_id: i64) -> Result<Vec<User>, ApiError>;

    async fn fetch_profile(&self, user_id: i64) -> Result<ProfileRecord, ApiError>;
    async fn update_profile(&self, req: &UpdateProfile) -> Result<ProfileRecord, ApiError>;
}

#[async_trait]
impl DirectoryApi for ApiClient {
    async fn list_companies(
        &self,
        organization_id: i64,
        page: u32,
        limit: u32,
        search: Option<&str>,
    ) -> Result<Page<Company>, ApiError> {
        companies::list(self, organization_id, page, limit, search).await
    }

    async fn create_company(&self, req: &CreateCompany) -> Result<Company, ApiError> {
        companies::create(self, req).await
    }

    async fn update_company(&self, id: i64, req: &UpdateCompany) -> Result<Company, ApiError> {
        companies::update(self, id, req).await
    }

    async fn delete_company(&self, id: i64) -> Result<(), ApiError> {
        companies::delete(self, id).await
    }

    async fn company_users(&self, id: i64) -> Result<Vec<User>, ApiError> {
        companies::users(self, id).await
    }

    async fn list_teams(
        &self,
        organization_id: i64,
        page: u32,
        limit: u32,
        search: Option<&str>,
    ) -> Result<Page<Team>, ApiError> {
        teams::list(self, organization_id, page, limit, search).await
    }

    async fn create_team(&self, req: &CreateTeam) -> Result<Team, ApiError> {
        teams::create(self, req).await
    }

    async fn update_team(&self, id: i64, req: &UpdateTeam) -> Result<Team, ApiError> {
        teams::update(self, id, req).await
    }

    async fn delete_team(&self, id: i64) -> Result<(), ApiError> {
        teams::delete(self, id).await
    }

    async fn add_team_members(&self, team_id: i64, user_ids: &[i64]) -> Result<Team, ApiError> {
        teams::add_members(self, team_id, user_ids).await
    }

    async fn remove_team_members(
        &self,
        organization_id: i64,
        team_id: i64,
        user_ids: &[i64],
    ) -> Result<Team, ApiError> {
        teams::remove_members(self, organization_id, team_id, user_ids).await
    }

    async fn assign_users(&self, req: &AssignUsers) -> Result<(), ApiError> {
        teams::assign_users(self, req).await
    }

    async fn user_directory(&self, organization_id: i64) -> Result<Vec<User>, ApiError> {
        users::directory(self, organization_id).await
    }

    async fn fetch_profile(&self, user_id: i64) -> Result<ProfileRecord, ApiError> {
        profile::fetch(self, user_id).await
    }

    async fn update_profile(&self, req: &UpdateProfile) -> Result<ProfileRecord, ApiError> {
        profile::update(self, req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_envelope_success() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct Payload {
            value: i64,
        }
        let parsed: Payload =
            parse_envelope(r#"{ "success": true, "data": { "value": 7 } }"#).unwrap();
        assert_eq!(parsed, Payload { value: 7 });
    }

    #[test]
    fn test_parse_envelope_success_false() {
        let err = parse_envelope::<serde_json::Value>(r#"{ "success": false, "data": {} }"#)
            .unwrap_err();
        assert!(matches!(err, ApiError::Envelope(_)));
    }

    #[test]
    fn test_parse_envelope_missing_data() {
        let err = parse_envelope::<serde_json::Value>(r#"{ "success": true }"#).unwrap_err();
        assert!(matches!(err, ApiError::Envelope(_)));
    }

    #[test]
    fn test_parse_envelope_malformed_json() {
        let err = parse_envelope::<serde_json::Value>("not json").unwrap_err();
        assert!(matches!(err, ApiError::Json(_)));
    }

    #[test]
    fn test_parse_unit_ignores_data() {
        parse_unit(r#"{ "success": true }"#).unwrap();
        parse_unit(r#"{ "success": true, "data": null }"#).unwrap();
        assert!(parse_unit(r#"{ "success": false }"#).is_err());
    }

    #[test]
    fn test_endpoint_join_preserves_base_path() {
        let client = ApiClient::new("https://api.example.com/admin", "tok").unwrap();
        let url = client.endpoint("v1/42/companies").unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/admin/v1/42/companies");
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        assert!(matches!(
            ApiClient::new("not a url", "tok"),
            Err(ApiError::InvalidBaseUrl(_))
        ));
    }
}
