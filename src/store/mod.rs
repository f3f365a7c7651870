//! Client-side entity stores.
//!
//! One `CollectionState` per list domain (companies, teams, user directory)
//! plus the single-record `ProfileStore`. Stores are plain state containers
//! with explicit transition methods; they are owned by `AppState` and only
//! ever mutated from a sync engine's resolution path.
//!
//! Every dispatched operation draws a monotonically increasing ticket from
//! its store. A completion is applied only while its ticket is the newest
//! issued for that operation kind, and a ticket resolves at most once —
//! duplicate or superseded completions are discarded. Stale list pages can
//! therefore never overwrite newer ones, and no flag is ever left stuck.

mod collection;
mod profile;

pub use collection::CollectionState;
pub use profile::ProfileStore;

/// Operation kinds that flow through the three-phase lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    /// List fetch (full replace + pagination overwrite).
    Fetch,
    Create,
    Update,
    Delete,
    AddMembers,
    RemoveMembers,
    /// Bulk cross-team assignment; shares the adding-members flag.
    AssignUsers,
}

impl OpKind {
    pub fn is_mutation(&self) -> bool {
        !matches!(self, OpKind::Fetch)
    }

    /// Fixed success message shown after a fulfilled operation.
    pub fn success_message(&self, noun: &str, plural: &str) -> String {
        match self {
            OpKind::Fetch => format!("{} loaded successfully", capitalize(plural)),
            OpKind::Create => format!("{} created successfully", capitalize(noun)),
            OpKind::Update => format!("{} updated successfully", capitalize(noun)),
            OpKind::Delete => format!("{} deleted successfully", capitalize(noun)),
            OpKind::AddMembers => "Members added successfully".to_string(),
            OpKind::RemoveMembers => "Members removed successfully".to_string(),
            OpKind::AssignUsers => "Users assigned successfully".to_string(),
        }
    }

    /// Fallback error message when the server response carried none.
    pub fn default_error(&self, noun: &str, plural: &str) -> String {
        match self {
            OpKind::Fetch => format!("Failed to fetch {}", plural),
            OpKind::Create => format!("Failed to create {}", noun),
            OpKind::Update => format!("Failed to update {}", noun),
            OpKind::Delete => format!("Failed to delete {}", noun),
            OpKind::AddMembers => "Failed to add members".to_string(),
            OpKind::RemoveMembers => "Failed to remove members".to_string(),
            OpKind::AssignUsers => "Failed to assign users".to_string(),
        }
    }
}

/// How a completion landed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Applied; carries the success ticket for the deferred display clear.
    Fulfilled { success_ticket: u64 },
    /// Applied as a failure; `message` is now in the store's `error` field.
    Rejected { message: String },
    /// Superseded by a newer operation of the same kind, or already
    /// resolved. Nothing changed.
    Discarded,
}

fn capitalize(s: &str) -> String {
    let mut c = s.chars();
    match c.next() {
        None => String::new(),
        Some(f) => f.to_uppercase().to_string() + c.as_str(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_messages() {
        assert_eq!(
            OpKind::Update.success_message("company", "companies"),
            "Company updated successfully"
        );
        assert_eq!(
            OpKind::Fetch.success_message("company", "companies"),
            "Companies loaded successfully"
        );
        assert_eq!(
            OpKind::AssignUsers.success_message("team", "teams"),
            "Users assigned successfully"
        );
    }

    #[test]
    fn test_default_errors() {
        assert_eq!(
            OpKind::Fetch.default_error("company", "companies"),
            "Failed to fetch companies"
        );
        assert_eq!(
            OpKind::Delete.default_error("team", "teams"),
            "Failed to delete team"
        );
    }

    #[test]
    fn test_fetch_is_not_a_mutation() {
        assert!(!OpKind::Fetch.is_mutation());
        assert!(OpKind::Create.is_mutation());
        assert!(OpKind::AssignUsers.is_mutation());
    }
}
