//! Team-membership eligibility.
//!
//! Pure functions over the cached team and user directory: who can be
//! assigned to a team, who can be removed from it. Nothing here touches a
//! store or the network; the assignment UI renders straight from these
//! results.
//!
//! Visibility rules:
//! - a user already on the team (the supervisor counts as an implicit
//!   member) is never assignable;
//! - holders of the overall role are only visible to an overall viewer;
//! - when the team's supervisor sits at a hierarchy level above zero, a
//!   candidate's level must be strictly below it (missing level reads as
//!   zero). A level-zero or absent supervisor imposes no level rule.
//! - everyone on the team shows up for removal, but the supervisor is not
//!   selectable — a team cannot lose its own supervisor.

use std::collections::HashSet;

use crate::types::{Pagination, Searchable, Team, User};

/// A row in the removal picker. The supervisor appears but cannot be
/// ticked.
#[derive(Debug, Clone, PartialEq)]
pub struct RemovalCandidate<'a> {
    pub user: &'a User,
    pub selectable: bool,
}

/// Users who may be added to `team`, in directory order.
pub fn eligible_for_assignment<'a>(
    team: &Team,
    directory: &'a [User],
    viewer: &User,
) -> impl Iterator<Item = &'a User> + 'a {
    let participants: HashSet<i64> = team.participant_ids().into_iter().collect();
    let viewer_is_overall = viewer.is_overall();
    let supervisor_level = team
        .supervisor
        .as_ref()
        .map(|s| s.level_or_zero())
        .unwrap_or(0);

    directory.iter().filter(move |candidate| {
        if participants.contains(&candidate.id) {
            return false;
        }
        if candidate.is_overall() && !viewer_is_overall {
            return false;
        }
        if supervisor_level > 0 && candidate.level_or_zero() >= supervisor_level {
            return false;
        }
        true
    })
}

/// Everyone currently on `team`, supervisor first, resolved against the
/// directory. Ids the directory does not know are skipped.
pub fn eligible_for_removal<'a>(
    team: &Team,
    directory: &'a [User],
) -> impl Iterator<Item = RemovalCandidate<'a>> + 'a {
    let supervisor_id = team.supervisor_id();
    team.participant_ids()
        .into_iter()
        .filter_map(move |id| {
            directory
                .iter()
                .find(|u| u.id == id)
                .map(|user| RemovalCandidate {
                    user,
                    selectable: Some(id) != supervisor_id,
                })
        })
}

// =============================================================================
// Member browser
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerMode {
    Assign,
    Remove,
}

/// Paging and narrowing state for the assign/remove picker. The text and
/// role filters apply identically to both modes; any filter or mode change
/// drops back to page 1.
#[derive(Debug, Clone)]
pub struct MemberBrowser {
    mode: PickerMode,
    search: String,
    role: Option<String>,
    page: u32,
    per_page: u32,
}

impl MemberBrowser {
    pub fn new(per_page: u32) -> Self {
        Self {
            mode: PickerMode::Assign,
            search: String::new(),
            role: None,
            page: 1,
            per_page: per_page.max(1),
        }
    }

    pub fn mode(&self) -> PickerMode {
        self.mode
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn set_mode(&mut self, mode: PickerMode) {
        if self.mode != mode {
            self.mode = mode;
            self.page = 1;
        }
    }

    pub fn set_search(&mut self, term: &str) {
        self.search = crate::util::normalize_search(term);
        self.page = 1;
    }

    pub fn set_role(&mut self, role: Option<&str>) {
        self.role = role.map(|r| r.to_string());
        self.page = 1;
    }

    pub fn set_page(&mut self, page: u32) {
        self.page = page.max(1);
    }

    fn passes(&self, user: &User) -> bool {
        if !self.search.is_empty() && !user.matches(&self.search) {
            return false;
        }
        match &self.role {
            Some(role) => user.role.eq_ignore_ascii_case(role),
            None => true,
        }
    }

    /// Current page of assignable users.
    pub fn assignment_page<'a>(
        &self,
        team: &Team,
        directory: &'a [User],
        viewer: &User,
    ) -> (Vec<&'a User>, Pagination) {
        let filtered: Vec<&User> = eligible_for_assignment(team, directory, viewer)
            .filter(|u| self.passes(u))
            .collect();
        paginate(filtered, self.page, self.per_page)
    }

    /// Current page of removal candidates.
    pub fn removal_page<'a>(
        &self,
        team: &Team,
        directory: &'a [User],
    ) -> (Vec<RemovalCandidate<'a>>, Pagination) {
        let filtered: Vec<RemovalCandidate> = eligible_for_removal(team, directory)
            .filter(|c| self.passes(c.user))
            .collect();
        paginate(filtered, self.page, self.per_page)
    }
}

/// Page/perPage windowing over an already-filtered list. An out-of-range
/// page clamps to the last page rather than returning nothing.
fn paginate<T>(items: Vec<T>, page: u32, per_page: u32) -> (Vec<T>, Pagination) {
    let total_items = items.len() as u64;
    let total_pages = ((total_items + per_page as u64 - 1) / per_page as u64).max(1) as u32;
    let current_page = page.clamp(1, total_pages);

    let start = ((current_page - 1) * per_page) as usize;
    let window: Vec<T> = items
        .into_iter()
        .skip(start)
        .take(per_page as usize)
        .collect();

    (
        window,
        Pagination {
            current_page,
            total_pages,
            total_items,
            per_page,
        },
    )
}
