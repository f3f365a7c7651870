//! Company endpoints.

use serde::Deserialize;

use crate::error::ApiError;
use crate::types::{Company, CreateCompany, Page, Pagination, UpdateCompany, User};

use super::{decode, decode_unit, ApiClient};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompanyListData {
    #[serde(default)]
    companies: Vec<Company>,
    #[serde(default)]
    pagination: Pagination,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompanyUsersData {
    #[serde(default)]
    users: Vec<User>,
}

/// GET /v1/{organizationId}/companies?page&limit&search
pub async fn list(
    client: &ApiClient,
    organization_id: i64,
    page: u32,
    limit: u32,
    search: Option<&str>,
) -> Result<Page<Company>, ApiError> {
    let url = client.endpoint(&format!("v1/{}/companies", organization_id))?;
    let mut req = client
        .get(url)
        .query(&[("page", page.to_string()), ("limit", limit.to_string())]);
    if let Some(term) = search.filter(|t| !t.is_empty()) {
        req = req.query(&[("search", term)]);
    }
    let resp = req.send().await?;
    let data: CompanyListData = decode(resp).await?;
    Ok(Page {
        items: data.companies,
        pagination: data.pagination,
    })
}

/// POST /v1/companies
pub async fn create(client: &ApiClient, req: &CreateCompany) -> Result<Company, ApiError> {
    let url = client.endpoint("v1/companies")?;
    let resp = client.post(url).json(req).send().await?;
    decode(resp).await
}

/// PUT /v1/companies/{id}
pub async fn update(
    client: &ApiClient,
    id: i64,
    req: &UpdateCompany,
) -> Result<Company, ApiError> {
    let url = client.endpoint(&format!("v1/companies/{}", id))?;
    let resp = client.put(url).json(req).send().await?;
    decode(resp).await
}

/// DELETE /v1/companies/{id}
pub async fn delete(client: &ApiClient, id: i64) -> Result<(), ApiError> {
    let url = client.endpoint(&format!("v1/companies/{}", id))?;
    let resp = client.delete(url).send().await?;
    decode_unit(resp).await
}

/// GET /v1/companies/{id}/users
pub async fn users(client: &ApiClient, id: i64) -> Result<Vec<User>, ApiError> {
    let url = client.endpoint(&format!("v1/companies/{}/users", id))?;
    let resp = client.get(url).send().await?;
    let data: CompanyUsersData = decode(resp).await?;
    Ok(data.users)
}
