//! Team synchronization operations, including membership mutation.

use std::sync::Arc;

use uuid::Uuid;

use crate::api::DirectoryApi;
use crate::state::AppState;
use crate::store::{OpKind, Resolution};
use crate::types::{AssignUsers, CreateTeam, UpdateTeam};

use super::{defer, defer_async, lock_err, notify_error, notify_success};

const NOUN: &str = "team";
const PLURAL: &str = "teams";

#[derive(Debug, Clone)]
pub struct TeamDraft {
    pub name: String,
    pub description: Option<String>,
    pub supervisor_id: Option<i64>,
}

pub async fn fetch_teams(
    state: &Arc<AppState>,
    api: &Arc<dyn DirectoryApi>,
    page: u32,
    search: Option<String>,
    silent: bool,
) -> Result<(), String> {
    let op_id = Uuid::new_v4();
    let limit = state.page_size();
    let ticket = state
        .teams
        .lock()
        .map_err(|_| lock_err())?
        .begin(OpKind::Fetch, silent);
    log::debug!("teams.fetch {}: page {} silent {}", op_id, page, silent);

    let result = match state.organization_id() {
        Ok(org) => api.list_teams(org, page, limit, search.as_deref()).await,
        Err(err) => Err(err),
    };

    let resolution = {
        let mut store = state.teams.lock().map_err(|_| lock_err())?;
        let result = result.map_err(|e| e.user_message(&store.default_error(OpKind::Fetch)));
        store.complete_fetch(ticket, result)
    };
    settle(state, OpKind::Fetch, silent, op_id, resolution)
}

pub async fn create_team(
    state: &Arc<AppState>,
    api: &Arc<dyn DirectoryApi>,
    draft: TeamDraft,
) -> Result<(), String> {
    let op_id = Uuid::new_v4();
    let ticket = state
        .teams
        .lock()
        .map_err(|_| lock_err())?
        .begin(OpKind::Create, false);
    log::debug!("teams.create {}: '{}'", op_id, draft.name);

    let result = match state.organization_id() {
        Ok(org) => {
            let req = CreateTeam {
                organization_id: org,
                name: draft.name,
                description: draft.description,
                supervisor_id: draft.supervisor_id,
            };
            api.create_team(&req).await
        }
        Err(err) => Err(err),
    };

    let resolution = {
        let mut store = state.teams.lock().map_err(|_| lock_err())?;
        let result = result.map_err(|e| e.user_message(&store.default_error(OpKind::Create)));
        store.complete_create(ticket, result)
    };
    settle(state, OpKind::Create, false, op_id, resolution)
}

pub async fn update_team(
    state: &Arc<AppState>,
    api: &Arc<dyn DirectoryApi>,
    id: i64,
    req: UpdateTeam,
) -> Result<(), String> {
    let op_id = Uuid::new_v4();
    let ticket = state
        .teams
        .lock()
        .map_err(|_| lock_err())?
        .begin(OpKind::Update, false);
    log::debug!("teams.update {}: id {}", op_id, id);

    let result = api.update_team(id, &req).await;

    let resolution = {
        let mut store = state.teams.lock().map_err(|_| lock_err())?;
        let result = result.map_err(|e| e.user_message(&store.default_error(OpKind::Update)));
        store.complete_update(ticket, result)
    };

    if matches!(resolution, Resolution::Fulfilled { .. }) {
        schedule_silent_refetch(state, api);
    }
    settle(state, OpKind::Update, false, op_id, resolution)
}

pub async fn delete_team(
    state: &Arc<AppState>,
    api: &Arc<dyn DirectoryApi>,
    id: i64,
) -> Result<(), String> {
    let op_id = Uuid::new_v4();
    let ticket = state
        .teams
        .lock()
        .map_err(|_| lock_err())?
        .begin(OpKind::Delete, false);
    log::debug!("teams.delete {}: id {}", op_id, id);

    let result = api.delete_team(id).await;

    let resolution = {
        let mut store = state.teams.lock().map_err(|_| lock_err())?;
        let result = result.map_err(|e| e.user_message(&store.default_error(OpKind::Delete)));
        store.complete_delete(ticket, id, result)
    };
    settle(state, OpKind::Delete, false, op_id, resolution)
}

/// Add members. The server answers with the updated team, which replaces
/// the cached one; the member modal stays open, so the selection survives.
pub async fn add_members(
    state: &Arc<AppState>,
    api: &Arc<dyn DirectoryApi>,
    team_id: i64,
    user_ids: Vec<i64>,
) -> Result<(), String> {
    let op_id = Uuid::new_v4();
    let ticket = state
        .teams
        .lock()
        .map_err(|_| lock_err())?
        .begin(OpKind::AddMembers, false);
    log::debug!(
        "teams.add_members {}: team {} += {:?}",
        op_id,
        team_id,
        user_ids
    );

    let result = api.add_team_members(team_id, &user_ids).await;

    let resolution = {
        let mut store = state.teams.lock().map_err(|_| lock_err())?;
        let result =
            result.map_err(|e| e.user_message(&store.default_error(OpKind::AddMembers)));
        store.complete_members(OpKind::AddMembers, ticket, result)
    };
    settle(state, OpKind::AddMembers, false, op_id, resolution)
}

/// Remove members. Removing the supervisor is rejected client-side — the
/// eligibility layer never offers them, and this guard keeps a direct call
/// honest.
pub async fn remove_members(
    state: &Arc<AppState>,
    api: &Arc<dyn DirectoryApi>,
    team_id: i64,
    user_ids: Vec<i64>,
) -> Result<(), String> {
    let op_id = Uuid::new_v4();

    let supervisor_id = state
        .teams
        .lock()
        .map_err(|_| lock_err())?
        .items
        .iter()
        .find(|t| t.id == team_id)
        .and_then(|t| t.supervisor_id());

    let ticket = state
        .teams
        .lock()
        .map_err(|_| lock_err())?
        .begin(OpKind::RemoveMembers, false);
    log::debug!(
        "teams.remove_members {}: team {} -= {:?}",
        op_id,
        team_id,
        user_ids
    );

    let result = if supervisor_id.is_some_and(|sup| user_ids.contains(&sup)) {
        Err(crate::error::ApiError::Api {
            status: 400,
            message: Some("The supervisor cannot be removed from their own team".to_string()),
        })
    } else {
        match state.organization_id() {
            Ok(org) => api.remove_team_members(org, team_id, &user_ids).await,
            Err(err) => Err(err),
        }
    };

    let resolution = {
        let mut store = state.teams.lock().map_err(|_| lock_err())?;
        let result =
            result.map_err(|e| e.user_message(&store.default_error(OpKind::RemoveMembers)));
        store.complete_members(OpKind::RemoveMembers, ticket, result)
    };
    settle(state, OpKind::RemoveMembers, false, op_id, resolution)
}

/// Bulk assignment across teams. No entity payload comes back, so a silent
/// list refetch reconciles membership counts afterwards.
pub async fn assign_users(
    state: &Arc<AppState>,
    api: &Arc<dyn DirectoryApi>,
    team_id: i64,
    user_ids: Vec<i64>,
) -> Result<(), String> {
    let op_id = Uuid::new_v4();
    let ticket = state
        .teams
        .lock()
        .map_err(|_| lock_err())?
        .begin(OpKind::AssignUsers, false);
    log::debug!(
        "teams.assign_users {}: team {} users {:?}",
        op_id,
        team_id,
        user_ids
    );

    let result = api.assign_users(&AssignUsers { team_id, user_ids }).await;

    let resolution = {
        let mut store = state.teams.lock().map_err(|_| lock_err())?;
        let result =
            result.map_err(|e| e.user_message(&store.default_error(OpKind::AssignUsers)));
        store.complete_assign(ticket, result)
    };

    if matches!(resolution, Resolution::Fulfilled { .. }) {
        schedule_silent_refetch(state, api);
    }
    settle(state, OpKind::AssignUsers, false, op_id, resolution)
}

fn schedule_silent_refetch(state: &Arc<AppState>, api: &Arc<dyn DirectoryApi>) {
    let page = state
        .teams
        .lock()
        .map(|s| s.pagination.current_page.max(1))
        .unwrap_or(1);
    let state = Arc::clone(state);
    let api = Arc::clone(api);
    defer_async(state.silent_refresh_delay(), async move {
        if let Err(e) = fetch_teams(&state, &api, page, None, true).await {
            log::warn!("teams.refresh: background refetch failed: {}", e);
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
            log::debug!("teams.{:?} {}: fulfilled", kind, op_id);
            if kind.is_mutation() {
                notify_success(state, silent, &kind.success_message(NOUN, PLURAL));
            }
            let clear_state = Arc::clone(state);
            defer(state.toast_window(), move || {
                if let Ok(mut store) = clear_state.teams.lock() {
                    store.clear_success(success_ticket);
                }
            });
            Ok(())
        }
        Resolution::Rejected { message } => {
            log::warn!("teams.{:?} {}: rejected: {}", kind, op_id, message);
            notify_error(state, silent, &message);
            Err(message)
        }
        Resolution::Discarded => {
            log::debug!("teams.{:?} {}: superseded, discarded", kind, op_id);
            Ok(())
        }
    }
}
