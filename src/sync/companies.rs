//! Company synchronization operations.

use std::sync::Arc;

use uuid::Uuid;

use crate::api::DirectoryApi;
use crate::state::AppState;
use crate::store::{OpKind, Resolution};
use crate::types::{CreateCompany, UpdateCompany, User};

use super::{defer, defer_async, lock_err, notify_error, notify_success};

const NOUN: &str = "company";
const PLURAL: &str = "companies";

/// Fields the create/edit form collects; the organization scope is injected
/// from config at dispatch time.
#[derive(Debug, Clone)]
pub struct CompanyDraft {
    pub name: String,
    pub tax_id: Option<String>,
    pub address: Option<String>,
    pub group_id: Option<i64>,
}

/// List fetch. `silent` refreshes in the background without touching the
/// user-visible loading flag or raising toasts.
pub async fn fetch_companies(
    state: &Arc<AppState>,
    api: &Arc<dyn DirectoryApi>,
    page: u32,
    search: Option<String>,
    silent: bool,
) -> Result<(), String> {
    let op_id = Uuid::new_v4();
    let limit = state.page_size();
    let ticket = state
        .companies
        .lock()
        .map_err(|_| lock_err())?
        .begin(OpKind::Fetch, silent);
    log::debug!(
        "companies.fetch {}: page {} silent {}",
        op_id,
        page,
        silent
    );

    let result = match state.organization_id() {
        Ok(org) => api.list_companies(org, page, limit, search.as_deref()).await,
        Err(err) => Err(err),
    };

    let resolution = {
        let mut store = state.companies.lock().map_err(|_| lock_err())?;
        let result = result.map_err(|e| e.user_message(&store.default_error(OpKind::Fetch)));
        store.complete_fetch(ticket, result)
    };
    settle(state, OpKind::Fetch, silent, op_id, resolution)
}

pub async fn create_company(
    state: &Arc<AppState>,
    api: &Arc<dyn DirectoryApi>,
    draft: CompanyDraft,
) -> Result<(), String> {
    let op_id = Uuid::new_v4();
    let ticket = state
        .companies
        .lock()
        .map_err(|_| lock_err())?
        .begin(OpKind::Create, false);
    log::debug!("companies.create {}: '{}'", op_id, draft.name);

    let result = match state.organization_id() {
        Ok(org) => {
            let req = CreateCompany {
                organization_id: org,
                name: draft.name,
                tax_id: draft.tax_id,
                address: draft.address,
                group_id: draft.group_id,
            };
            api.create_company(&req).await
        }
        Err(err) => Err(err),
    };

    let resolution = {
        let mut store = state.companies.lock().map_err(|_| lock_err())?;
        let result = result.map_err(|e| e.user_message(&store.default_error(OpKind::Create)));
        store.complete_create(ticket, result)
    };
    settle(state, OpKind::Create, false, op_id, resolution)
}

/// Update, then reconcile: a successful update schedules one silent list
/// refetch so server-side side effects (recomputed aggregates) land without
/// disturbing the user.
pub async fn update_company(
    state: &Arc<AppState>,
    api: &Arc<dyn DirectoryApi>,
    id: i64,
    req: UpdateCompany,
) -> Result<(), String> {
    let op_id = Uuid::new_v4();
    let ticket = state
        .companies
        .lock()
        .map_err(|_| lock_err())?
        .begin(OpKind::Update, false);
    log::debug!("companies.update {}: id {}", op_id, id);

    let result = api.update_company(id, &req).await;

    let resolution = {
        let mut store = state.companies.lock().map_err(|_| lock_err())?;
        let result = result.map_err(|e| e.user_message(&store.default_error(OpKind::Update)));
        store.complete_update(ticket, result)
    };

    if matches!(resolution, Resolution::Fulfilled { .. }) {
        schedule_silent_refetch(state, api);
    }
    settle(state, OpKind::Update, false, op_id, resolution)
}

pub async fn delete_company(
    state: &Arc<AppState>,
    api: &Arc<dyn DirectoryApi>,
    id: i64,
) -> Result<(), String> {
    let op_id = Uuid::new_v4();
    let ticket = state
        .companies
        .lock()
        .map_err(|_| lock_err())?
        .begin(OpKind::Delete, false);
    log::debug!("companies.delete {}: id {}", op_id, id);

    let result = api.delete_company(id).await;

    let resolution = {
        let mut store = state.companies.lock().map_err(|_| lock_err())?;
        let result = result.map_err(|e| e.user_message(&store.default_error(OpKind::Delete)));
        store.complete_delete(ticket, id, result)
    };
    settle(state, OpKind::Delete, false, op_id, resolution)
}

/// Sub-resource fetch: users of one company. Surfaced to the caller only —
/// no store flags, no toasts.
pub async fn fetch_company_users(
    api: &Arc<dyn DirectoryApi>,
    company_id: i64,
) -> Result<Vec<User>, String> {
    let op_id = Uuid::new_v4();
    log::debug!("companies.users {}: company {}", op_id, company_id);
    api.company_users(company_id)
        .await
        .map_err(|e| e.user_message("Failed to fetch company users"))
}

fn schedule_silent_refetch(state: &Arc<AppState>, api: &Arc<dyn DirectoryApi>) {
    let page = state
        .companies
        .lock()
        .map(|s| s.pagination.current_page.max(1))
        .unwrap_or(1);
    let state = Arc::clone(state);
    let api = Arc::clone(api);
    defer_async(state.silent_refresh_delay(), async move {
        if let Err(e) = fetch_companies(&state, &api, page, None, true).await {
            log::warn!("companies.refresh: background refetch failed: {}", e);
        }
    });
}

fn settle(
    state: &Arc<AppState>,
    kind: OpKind,
    silent: bool,
    op_id: Uuid,
    resolution: Resolution,
) -> Result<(), String> {
    match resolution {
        Resolution::Fulfilled { success_ticket } => {
            log::debug!("companies.{:?} {}: fulfilled", kind, op_id);
            if kind.is_mutation() {
                notify_success(state, silent, &kind.success_message(NOUN, PLURAL));
            }
            let clear_state = Arc::clone(state);
            defer(state.toast_window(), move || {
                if let Ok(mut store) = clear_state.companies.lock() {
                    store.clear_success(success_ticket);
                }
            });
            Ok(())
        }
        Resolution::Rejected { message } => {
            log::warn!("companies.{:?} {}: rejected: {}", kind, op_id, message);
            notify_error(state, silent, &message);
            Err(message)
        }
        Resolution::Discarded => {
            log::debug!("companies.{:?} {}: superseded, discarded", kind, op_id);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::testing::{
        api_dyn, company, harness, ok, ok_after, page_of, rejected, user,
    };
    use crate::types::Pagination;

    #[tokio::test]
    async fn test_fetch_replaces_items_without_toasting() {
        let h = harness();
        let api = api_dyn(&h);
        h.api
            .company_pages
            .lock()
            .unwrap()
            .push_back(ok(page_of(vec![company(1, "Acme"), company(2, "Globex")])));

        fetch_companies(&h.state, &api, 1, None, false).await.unwrap();

        let store = h.state.companies.lock().unwrap();
        assert_eq!(store.items.len(), 2);
        assert_eq!(store.filtered_items.len(), 2);
        assert!(!store.loading);
        assert!(h.notifier.successes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_without_organization_rejects_before_network() {
        let h = harness();
        let api = api_dyn(&h);
        h.state.config.lock().unwrap().as_mut().unwrap().organization_id = None;
        // queue left empty on purpose: a network call would panic the stub

        let err = fetch_companies(&h.state, &api, 1, None, false)
            .await
            .unwrap_err();
        assert_eq!(err, "No organization selected");

        let store = h.state.companies.lock().unwrap();
        assert_eq!(store.error.as_deref(), Some("No organization selected"));
        assert!(!store.loading);
    }

    #[tokio::test]
    async fn test_silent_fetch_failure_sets_error_without_toast() {
        let h = harness();
        let api = api_dyn(&h);
        h.api
            .company_pages
            .lock()
            .unwrap()
            .push_back(rejected(500, "upstream exploded"));

        let err = fetch_companies(&h.state, &api, 1, None, true)
            .await
            .unwrap_err();
        assert_eq!(err, "upstream exploded");

        let store = h.state.companies.lock().unwrap();
        assert_eq!(store.error.as_deref(), Some("upstream exploded"));
        assert!(!store.is_silent_fetching);
        assert!(h.notifier.errors.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_out_of_order_pages_keep_newest() {
        let h = harness();
        let api = api_dyn(&h);
        {
            let mut queue = h.api.company_pages.lock().unwrap();
            queue.push_back(ok_after(50, page_of(vec![company(1, "Stale")])));
            queue.push_back(ok(page_of(vec![company(2, "Fresh")])));
        }

        let slow = fetch_companies(&h.state, &api, 1, None, false);
        let fast = fetch_companies(&h.state, &api, 2, None, false);
        let (r1, r2) = tokio::join!(slow, fast);
        r1.unwrap();
        r2.unwrap();

        let store = h.state.companies.lock().unwrap();
        assert_eq!(store.items.len(), 1);
        assert_eq!(store.items[0].id, 2);
        assert!(!store.loading);
    }

    #[tokio::test]
    async fn test_create_prepends_and_toasts() {
        let h = harness();
        let api = api_dyn(&h);
        {
            let mut pages = h.api.company_pages.lock().unwrap();
            pages.push_back(ok(page_of(vec![company(1, "Old")])));
        }
        fetch_companies(&h.state, &api, 1, None, false).await.unwrap();

        h.api
            .company_results
            .lock()
            .unwrap()
            .push_back(ok(company(2, "New")));
        create_company(
            &h.state,
            &api,
            CompanyDraft {
                name: "New".to_string(),
                tax_id: None,
                address: None,
                group_id: None,
            },
        )
        .await
        .unwrap();

        let store = h.state.companies.lock().unwrap();
        assert_eq!(store.items[0].id, 2);
        assert_eq!(
            h.notifier.successes.lock().unwrap().as_slice(),
            ["Company created successfully"]
        );
    }

    #[tokio::test]
    async fn test_update_merges_then_silently_reconciles() {
        let h = harness();
        let api = api_dyn(&h);
        {
            let mut pages = h.api.company_pages.lock().unwrap();
            pages.push_back(ok(page_of(vec![company(5, "Before")])));
            // reconcile refetch sees the server-recomputed aggregate
            let mut reconciled = company(5, "Acme");
            reconciled.employee_count = 99;
            pages.push_back(ok(page_of(vec![reconciled])));
        }
        fetch_companies(&h.state, &api, 1, None, false).await.unwrap();

        h.api
            .company_results
            .lock()
            .unwrap()
            .push_back(ok(company(5, "Acme")));
        update_company(
            &h.state,
            &api,
            5,
            UpdateCompany {
                name: Some("Acme".to_string()),
                tax_id: None,
                address: None,
                group_id: None,
            },
        )
        .await
        .unwrap();

        {
            let store = h.state.companies.lock().unwrap();
            let matches: Vec<_> = store.items.iter().filter(|c| c.id == 5).collect();
            assert_eq!(matches.len(), 1);
            assert_eq!(matches[0].name, "Acme");
            assert!(store.selected.is_none());
            assert_eq!(
                store.success_message.as_deref(),
                Some("Company updated successfully")
            );
        }

        // harness sets a 1 ms reconcile delay; give the spawned task room
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        let store = h.state.companies.lock().unwrap();
        assert_eq!(store.items[0].employee_count, 99);
        assert!(!store.loading);
        assert!(!store.is_silent_fetching);
    }

    #[tokio::test]
    async fn test_delete_removes_and_server_message_wins_on_failure() {
        let h = harness();
        let api = api_dyn(&h);
        {
            let mut pages = h.api.company_pages.lock().unwrap();
            pages.push_back(ok(page_of(vec![company(1, "Acme"), company(2, "Globex")])));
        }
        fetch_companies(&h.state, &api, 1, None, false).await.unwrap();

        h.api.unit_results.lock().unwrap().push_back(ok(()));
        delete_company(&h.state, &api, 2).await.unwrap();
        {
            let store = h.state.companies.lock().unwrap();
            assert!(store.items.iter().all(|c| c.id != 2));
            assert!(store.filtered_items.iter().all(|c| c.id != 2));
        }

        h.api
            .unit_results
            .lock()
            .unwrap()
            .push_back(rejected(409, "Company still has active users"));
        let err = delete_company(&h.state, &api, 1).await.unwrap_err();
        assert_eq!(err, "Company still has active users");
        assert_eq!(
            h.notifier.errors.lock().unwrap().as_slice(),
            ["Company still has active users"]
        );
    }

    #[tokio::test]
    async fn test_company_users_surfaced_to_caller_only() {
        let h = harness();
        let api = api_dyn(&h);
        h.api
            .company_user_lists
            .lock()
            .unwrap()
            .push_back(ok(vec![user(1, "jdoe", "manager", Some(2))]));

        let users = fetch_company_users(&api, 5).await.unwrap();
        assert_eq!(users.len(), 1);

        let store = h.state.companies.lock().unwrap();
        assert!(store.items.is_empty());
        assert!(!store.loading);
        assert!(store.error.is_none());
    }

    #[tokio::test]
    async fn test_pagination_mirrors_server_page() {
        let h = harness();
        let api = api_dyn(&h);
        {
            let mut pages = h.api.company_pages.lock().unwrap();
            let mut first = page_of((1..=10).map(|i| company(i, "Co")).collect());
            first.pagination = Pagination {
                current_page: 1,
                total_pages: 3,
                total_items: 25,
                per_page: 10,
            };
            let mut second = page_of((11..=20).map(|i| company(i, "Co")).collect());
            second.pagination = Pagination {
                current_page: 2,
                total_pages: 3,
                total_items: 25,
                per_page: 10,
            };
            pages.push_back(ok(first));
            pages.push_back(ok(second));
        }

        fetch_companies(&h.state, &api, 1, None, false).await.unwrap();
        {
            let store = h.state.companies.lock().unwrap();
            assert_eq!(store.items.len(), 10);
            assert_eq!(store.pagination.total_pages, 3);
        }

        fetch_companies(&h.state, &api, 2, None, false).await.unwrap();
        let store = h.state.companies.lock().unwrap();
        assert_eq!(store.pagination.current_page, 2);
        assert_eq!(store.items[0].id, 11);
        assert_eq!(store.items.len(), 10);
    }
}
