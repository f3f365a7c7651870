//! Own-profile read/update.
//!
//! Updates go out as JSON, or as multipart when an avatar file accompanies
//! the change.

use crate::error::ApiError;
use crate::types::{ProfileRecord, UpdateProfile};

use super::{decode, ApiClient};

/// GET /user/profile?user={id}
pub async fn fetch(client: &ApiClient, user_id: i64) -> Result<ProfileRecord, ApiError> {
    let url = client.endpoint("user/profile")?;
    let resp = client
        .get(url)
        .query(&[("user", user_id.to_string())])
        .send()
        .await?;
    decode(resp).await
}

/// PUT /user/profile
pub async fn update(client: &ApiClient, req: &UpdateProfile) -> Result<ProfileRecord, ApiError> {
    let url = client.endpoint("user/profile")?;

    let resp = match &req.avatar_path {
        Some(path) => {
            let bytes = tokio::fs::read(path).await?;
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| "avatar".to_string());

            let mut form = reqwest::multipart::Form::new();
            if let Some(v) = &req.first_name {
                form = form.text("firstName", v.clone());
            }
            if let Some(v) = &req.last_name {
                form = form.text("lastName", v.clone());
            }
            if let Some(v) = &req.phone {
                form = form.text("phone", v.clone());
            }
            if let Some(v) = &req.job_title {
                form = form.text("jobTitle", v.clone());
            }
            form = form.part(
                "avatar",
                reqwest::multipart::Part::bytes(bytes).file_name(file_name),
            );

            client.put(url).multipart(form).send().await?
        }
        None => client.put(url).json(req).send().await?,
    };

    decode(resp).await
}

#[cfg(test)]
mod tests {
    use crate::api::parse_envelope;
    use crate::types::{ProfileRecord, UpdateProfile};

    #[test]
    fn test_profile_wire_decode() {
        let body = r#"{
            "success": true,
            "data": {
                "id": 12,
                "username": "jdoe",
                "email": "jdoe@acme.test",
                "firstName": "Jane",
                "lastName": "Doe",
                "jobTitle": "Operations Lead",
                "avatarUrl": "https://cdn.acme.test/a/12.png"
            }
        }"#;
        let record: ProfileRecord = parse_envelope(body).unwrap();
        assert_eq!(record.id, 12);
        assert_eq!(record.job_title.as_deref(), Some("Operations Lead"));
    }

    #[test]
    fn test_update_profile_json_body_omits_avatar() {
        let req = UpdateProfile {
            first_name: Some("Jane".to_string()),
            job_title: Some("Ops".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["firstName"], "Jane");
        assert_eq!(json["jobTitle"], "Ops");
        assert!(json.get("avatarPath").is_none());
        assert!(json.get("avatar_path").is_none());
    }
}
