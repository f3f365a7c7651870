//! Team endpoints, including membership mutation.

use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::types::{AssignUsers, CreateTeam, Page, Pagination, Team, UpdateTeam};

use super::{decode, decode_unit, ApiClient};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TeamListData {
    #[serde(default)]
    teams: Vec<Team>,
    #[serde(default)]
    pagination: Pagination,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MembersBody<'a> {
    user_ids: &'a [i64],
}

/// GET /v1/{organizationId}/teams?page&limit&search
pub async fn list(
    client: &ApiClient,
    organization_id: i64,
    page: u32,
    limit: u32,
    search: Option<&str>,
) -> Result<Page<Team>, ApiError> {
    let url = client.endpoint(&format!("v1/{}/teams", organization_id))?;
    let mut req = client
        .get(url)
        .query(&[("page", page.to_string()), ("limit", limit.to_string())]);
    if let Some(term) = search.filter(|t| !t.is_empty()) {
        req = req.query(&[("search", term)]);
    }
    let resp = req.send().await?;
    let data: TeamListData = decode(resp).await?;
    Ok(Page {
        items: data.teams,
        pagination: data.pagination,
    })
}

/// POST /v1/team
///
/// Singular path segment — the one asymmetry in the surface, kept as the
/// server defines it.
pub async fn create(client: &ApiClient, req: &CreateTeam) -> Result<Team, ApiError> {
    let url = client.endpoint("v1/team")?;
    let resp = client.post(url).json(req).send().await?;
    decode(resp).await
}

/// PUT /v1/teams/{id}
pub async fn update(client: &ApiClient, id: i64, req: &UpdateTeam) -> Result<Team, ApiError> {
    let url = client.endpoint(&format!("v1/teams/{}", id))?;
    let resp = client.put(url).json(req).send().await?;
    decode(resp).await
}

/// DELETE /v1/teams/{id}
pub async fn delete(client: &ApiClient, id: i64) -> Result<(), ApiError> {
    let url = client.endpoint(&format!("v1/teams/{}", id))?;
    let resp = client.delete(url).send().await?;
    decode_unit(resp).await
}

/// POST /v1/teams/{id}/members — returns the updated team.
pub async fn add_members(
    client: &ApiClient,
    team_id: i64,
    user_ids: &[i64],
) -> Result<Team, ApiError> {
    let url = client.endpoint(&format!("v1/teams/{}/members", team_id))?;
    let resp = client
        .post(url)
        .json(&MembersBody { user_ids })
        .send()
        .await?;
    decode(resp).await
}

/// DELETE /v1/{organizationId}/teams/{id}/remove-members — returns the
/// updated team.
pub async fn remove_members(
    client: &ApiClient,
    organization_id: i64,
    team_id: i64,
    user_ids: &[i64],
) -> Result<Team, ApiError> {
    let url = client.endpoint(&format!(
        "v1/{}/teams/{}/remove-members",
        organization_id, team_id
    ))?;
    let resp = client
        .delete(url)
        .json(&MembersBody { user_ids })
        .send()
        .await?;
    decode(resp).await
}

/// POST /v1/teams/assign-users
pub async fn assign_users(client: &ApiClient, req: &AssignUsers) -> Result<(), ApiError> {
    let url = client.endpoint("v1/teams/assign-users")?;
    let resp = client.post(url).json(req).send().await?;
    decode_unit(resp).await
}
