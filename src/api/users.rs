//! Organization user directory.

use serde::Deserialize;

use crate::error::ApiError;
use crate::types::User;

use super::{decode, ApiClient};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DirectoryData {
    #[serde(default)]
    users: Vec<User>,
}

/// GET /user/{organizationId}/users?getAll=true
///
/// The directory feeds the eligibility filter, which needs the whole
/// organization at once — pagination stays client-side.
pub async fn directory(client: &ApiClient, organization_id: i64) -> Result<Vec<User>, ApiError> {
    let url = client.endpoint(&format!("user/{}/users", organization_id))?;
    let resp = client.get(url).query(&[("getAll", "true")]).send().await?;
    let data: DirectoryData = decode(resp).await?;
    Ok(data.users)
}
