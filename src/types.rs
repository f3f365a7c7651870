//! Wire-facing domain types and configuration.
//!
//! Every type that crosses the HTTP boundary is fully typed and decoded
//! before it enters a store. Field names follow the server's camelCase;
//! `#[serde(default)]` keeps older server payloads deserializable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Configuration stored in ~/.orgdesk/config.json
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Base URL of the directory API, e.g. "https://api.example.com/".
    pub base_url: String,
    /// Organization scope for list endpoints. Absent until the user picks
    /// one; organization-scoped calls fail client-side without it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<i64>,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Seconds a success message stays visible before it is auto-cleared.
    #[serde(default = "default_toast_window_secs")]
    pub toast_window_secs: u64,
    /// Delay before the silent reconcile refetch that follows an update.
    #[serde(default = "default_silent_refresh_delay_ms")]
    pub silent_refresh_delay_ms: u64,
}

pub fn default_page_size() -> u32 {
    10
}

fn default_toast_window_secs() -> u64 {
    4
}

fn default_silent_refresh_delay_ms() -> u64 {
    750
}

impl Config {
    /// Base URL guaranteed to end with '/' so endpoint joins never clobber
    /// a path segment.
    pub fn base_url_normalized(&self) -> String {
        if self.base_url.ends_with('/') {
            self.base_url.clone()
        } else {
            format!("{}/", self.base_url)
        }
    }
}

// =============================================================================
// Pagination
// =============================================================================

/// Server pagination metadata mirrored from list responses.
///
/// Client-only views (the cached user directory, the member browser) use
/// `Pagination::default()`, which is the "absent" form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    #[serde(default)]
    pub current_page: u32,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_items: u64,
    #[serde(default)]
    pub per_page: u32,
}

/// One page of a server-side list: the entities plus the mirrored metadata.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

// =============================================================================
// Entities
// =============================================================================

/// Anything held in a collection store: stable integer id, matched by
/// linear scan on update/delete.
pub trait Keyed {
    fn id(&self) -> i64;
}

/// Case-insensitive substring search over an entity's searchable fields.
/// `needle` arrives already normalized (trimmed, lowercased).
pub trait Searchable {
    fn matches(&self, needle: &str) -> bool;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub id: i64,
    pub name: String,
}

/// Group backreference carried by companies that belong to a group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupRef {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub tax_id: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    /// Ordered as the server returns them.
    #[serde(default)]
    pub departments: Vec<Department>,
    #[serde(default)]
    pub group: Option<GroupRef>,
    #[serde(default)]
    pub employee_count: u32,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Keyed for Company {
    fn id(&self) -> i64 {
        self.id
    }
}

impl Searchable for Company {
    fn matches(&self, needle: &str) -> bool {
        crate::util::contains_ci(&self.name, needle)
            || self
                .tax_id
                .as_deref()
                .is_some_and(|t| crate::util::contains_ci(t, needle))
            || self
                .group
                .as_ref()
                .is_some_and(|g| crate::util::contains_ci(&g.name, needle))
    }
}

/// The role that may see and assign other holders of itself anywhere in the
/// hierarchy. Compared case-insensitively.
pub const OVERALL_ROLE: &str = "overall";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub role: String,
    /// Hierarchy level; absent means 0 for every comparison.
    #[serde(default)]
    pub level: Option<u32>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl User {
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }

    pub fn is_overall(&self) -> bool {
        self.role.eq_ignore_ascii_case(OVERALL_ROLE)
    }

    pub fn level_or_zero(&self) -> u32 {
        self.level.unwrap_or(0)
    }
}

impl Keyed for User {
    fn id(&self) -> i64 {
        self.id
    }
}

impl Searchable for User {
    fn matches(&self, needle: &str) -> bool {
        crate::util::contains_ci(&self.username, needle)
            || crate::util::contains_ci(&self.email, needle)
            || crate::util::contains_ci(&self.first_name, needle)
            || crate::util::contains_ci(&self.last_name, needle)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Stored separately from `member_ids`; the combined participant view
    /// is always derived, never materialized into the members list.
    #[serde(default)]
    pub supervisor: Option<User>,
    #[serde(default)]
    pub member_ids: Vec<i64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Team {
    /// Ids of everyone on the team: supervisor first, then members, with a
    /// supervisor redundantly present in `member_ids` counted once.
    pub fn participant_ids(&self) -> Vec<i64> {
        let mut ids = Vec::with_capacity(self.member_ids.len() + 1);
        if let Some(ref sup) = self.supervisor {
            ids.push(sup.id);
        }
        for &id in &self.member_ids {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        ids
    }

    pub fn supervisor_id(&self) -> Option<i64> {
        self.supervisor.as_ref().map(|s| s.id)
    }
}

impl Keyed for Team {
    fn id(&self) -> i64 {
        self.id
    }
}

impl Searchable for Team {
    fn matches(&self, needle: &str) -> bool {
        crate::util::contains_ci(&self.name, needle)
            || self
                .supervisor
                .as_ref()
                .is_some_and(|s| crate::util::contains_ci(&s.display_name(), needle))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRecord {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Request payloads
// =============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCompany {
    pub organization_id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCompany {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTeam {
    pub organization_id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supervisor_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTeam {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supervisor_id: Option<i64>,
}

/// Bulk assignment of users across teams.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignUsers {
    pub team_id: i64,
    pub user_ids: Vec<i64>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    /// When set, the update goes out as multipart with the file attached.
    #[serde(skip)]
    pub avatar_path: Option<std::path::PathBuf>,
}
