//! Synchronization engines.
//!
//! One async operation per CRUD verb per domain. Every operation runs the
//! same three-phase contract against its store: `begin` (pending, draws a
//! ticket), the network call, `complete_*` (fulfilled/rejected, applied only
//! if the ticket is still current). Client-side validation failures (no
//! organization selected) take the same path, so the store always observes a
//! well-formed lifecycle.
//!
//! Engines are the only writers to the stores. Each dispatched operation
//! gets a correlation id for log visibility; resolution is exactly-once by
//! construction, so there are no recovery timers anywhere.

pub mod companies;
pub mod profile;
pub mod teams;
pub mod users;

use std::time::Duration;

use crate::state::AppState;

/// Run `f` after `delay` without blocking the caller. Used for the success
/// display clear and the post-update silent refetch.
pub(crate) fn defer<F>(delay: Duration, f: F)
where
    F: FnOnce() + Send + 'static,
{
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        f();
    });
}

/// Run an async task after `delay`, fire-and-forget.
pub(crate) fn defer_async<Fut>(delay: Duration, fut: Fut)
where
    Fut: std::future::Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        fut.await;
    });
}

/// Shorthand used by every engine to lock its store.
pub(crate) fn lock_err() -> String {
    "Lock poisoned".to_string()
}

pub(crate) fn notify_success(state: &AppState, silent: bool, message: &str) {
    if !silent {
        state.notifier.success(message);
    }
}

pub(crate) fn notify_error(state: &AppState, silent: bool, message: &str) {
    if !silent {
        state.notifier.error(message);
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use crate::api::DirectoryApi;
    use crate::error::ApiError;
    use crate::notify::testing::RecordingNotifier;
    use crate::state::AppState;
    use crate::types::{
        AssignUsers, Company, Config, CreateCompany, CreateTeam, Page, Pagination, ProfileRecord,
        Team, UpdateCompany, UpdateProfile, UpdateTeam, User,
    };

    /// Canned response with an optional artificial latency, so tests can
    /// force out-of-order resolution.
    pub struct Canned<T> {
        pub delay_ms: u64,
        pub result: Result<T, ApiError>,
    }

    pub fn ok<T>(value: T) -> Canned<T> {
        Canned {
            delay_ms: 0,
            result: Ok(value),
        }
    }

    pub fn ok_after<T>(delay_ms: u64, value: T) -> Canned<T> {
        Canned {
            delay_ms,
            result: Ok(value),
        }
    }

    pub fn rejected<T>(status: u16, message: &str) -> Canned<T> {
        Canned {
            delay_ms: 0,
            result: Err(ApiError::Api {
                status,
                message: Some(message.to_string()),
            }),
        }
    }

    async fn take<T>(queue: &Mutex<VecDeque<Canned<T>>>, what: &str) -> Result<T, ApiError> {
        let canned = queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected {} call", what));
        if canned.delay_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(canned.delay_ms)).await;
        }
        canned.result
    }

    /// In-memory `DirectoryApi`: every method pops its queue in call order.
    #[derive(Default)]
    pub struct StubApi {
        pub company_pages: Mutex<VecDeque<Canned<Page<Company>>>>,
        pub company_results: Mutex<VecDeque<Canned<Company>>>,
        pub company_user_lists: Mutex<VecDeque<Canned<Vec<User>>>>,
        pub team_pages: Mutex<VecDeque<Canned<Page<Team>>>>,
        pub team_results: Mutex<VecDeque<Canned<Team>>>,
        pub unit_results: Mutex<VecDeque<Canned<()>>>,
        pub directories: Mutex<VecDeque<Canned<Vec<User>>>>,
        pub profiles: Mutex<VecDeque<Canned<ProfileRecord>>>,
    }

    #[async_trait]
    impl DirectoryApi for StubApi {
        async fn list_companies(
            &self,
            _organization_id: i64,
            _page: u32,
            _limit: u32,
            _search: Option<&str>,
        ) -> Result<Page<Company>, ApiError> {
            take(&self.company_pages, "list_companies").await
        }

        async fn create_company(&self, _req: &CreateCompany) -> Result<Company, ApiError> {
            take(&self.company_results, "create_company").await
        }

        async fn update_company(
            &self,
            _id: i64,
            _req: &UpdateCompany,
        ) -> Result<Company, ApiError> {
            take(&self.company_results, "update_company").await
        }

        async fn delete_company(&self, _id: i64) -> Result<(), ApiError> {
            take(&self.unit_results, "delete_company").await
        }

        async fn company_users(&self, _id: i64) -> Result<Vec<User>, ApiError> {
            take(&self.company_user_lists, "company_users").await
        }

        async fn list_teams(
            &self,
            _organization_id: i64,
            _page: u32,
            _limit: u32,
            _search: Option<&str>,
        ) -> Result<Page<Team>, ApiError> {
            take(&self.team_pages, "list_teams").await
        }

        async fn create_team(&self, _req: &CreateTeam) -> Result<Team, ApiError> {
            take(&self.team_results, "create_team").await
        }

        async fn update_team(&self, _id: i64, _req: &UpdateTeam) -> Result<Team, ApiError> {
            take(&self.team_results, "update_team").await
        }

        async fn delete_team(&self, _id: i64) -> Result<(), ApiError> {
            take(&self.unit_results, "delete_team").await
        }

        async fn add_team_members(
            &self,
            _team_id: i64,
            _user_ids: &[i64],
        ) -> Result<Team, ApiError> {
            take(&self.team_results, "add_team_members").await
        }

        async fn remove_team_members(
            &self,
            _organization_id: i64,
            _team_id: i64,
            _user_ids: &[i64],
        ) -> Result<Team, ApiError> {
            take(&self.team_results, "remove_team_members").await
        }

        async fn assign_users(&self, _req: &AssignUsers) -> Result<(), ApiError> {
            take(&self.unit_results, "assign_users").await
        }

        async fn user_directory(&self, _organization_id: i64) -> Result<Vec<User>, ApiError> {
            take(&self.directories, "user_directory").await
        }

        async fn fetch_profile(&self, _user_id: i64) -> Result<ProfileRecord, ApiError> {
            take(&self.profiles, "fetch_profile").await
        }

        async fn update_profile(&self, _req: &UpdateProfile) -> Result<ProfileRecord, ApiError> {
            take(&self.profiles, "update_profile").await
        }
    }

    pub struct Harness {
        pub state: Arc<AppState>,
        pub api: Arc<StubApi>,
        pub notifier: Arc<RecordingNotifier>,
    }

    /// State + stub wired for engine tests: org 42, tiny deferral windows.
    pub fn harness() -> Harness {
        let notifier = Arc::new(RecordingNotifier::default());
        let config = Config {
            base_url: "https://api.example.com".to_string(),
            organization_id: Some(42),
            page_size: 10,
            toast_window_secs: 0,
            silent_refresh_delay_ms: 1,
        };
        let state = Arc::new(AppState::with_config(
            Some(config),
            notifier.clone() as Arc<dyn crate::notify::Notifier>,
        ));
        Harness {
            state,
            api: Arc::new(StubApi::default()),
            notifier,
        }
    }

    pub fn api_dyn(h: &Harness) -> Arc<dyn DirectoryApi> {
        h.api.clone() as Arc<dyn DirectoryApi>
    }

    pub fn company(id: i64, name: &str) -> Company {
        Company {
            id,
            name: name.to_string(),
            tax_id: None,
            address: None,
            departments: vec![],
            group: None,
            employee_count: 0,
            created_at: None,
        }
    }

    pub fn page_of(items: Vec<Company>) -> Page<Company> {
        let total_items = items.len() as u64;
        Page {
            items,
            pagination: Pagination {
                current_page: 1,
                total_pages: 1,
                total_items,
                per_page: 10,
            },
        }
    }

    pub fn user(id: i64, username: &str, role: &str, level: Option<u32>) -> User {
        User {
            id,
            username: username.to_string(),
            email: format!("{username}@acme.test"),
            first_name: String::new(),
            last_name: String::new(),
            role: role.to_string(),
            level,
            avatar_url: None,
        }
    }

    pub fn team(id: i64, name: &str, supervisor: Option<User>, member_ids: Vec<i64>) -> Team {
        Team {
            id,
            name: name.to_string(),
            description: None,
            supervisor,
            member_ids,
            created_at: None,
        }
    }
}
