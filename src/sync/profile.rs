//! Own-profile synchronization.

use std::sync::Arc;

use uuid::Uuid;

use crate::api::DirectoryApi;
use crate::state::AppState;
use crate::store::{OpKind, Resolution};
use crate::types::UpdateProfile;

use super::{defer, defer_async, lock_err, notify_error, notify_success};

pub async fn fetch_profile(
    state: &Arc<AppState>,
    api: &Arc<dyn DirectoryApi>,
    user_id: i64,
    silent: bool,
) -> Result<(), String> {
    let op_id = Uuid::new_v4();
    let ticket = state
        .profile
        .lock()
        .map_err(|_| lock_err())?
        .begin(OpKind::Fetch, silent);
    log::debug!("profile.fetch {}: user {} silent {}", op_id, user_id, silent);

    let result = api.fetch_profile(user_id).await;

    let resolution = {
        let mut store = state.profile.lock().map_err(|_| lock_err())?;
        let result = result.map_err(|e| e.user_message(&store.default_error(OpKind::Fetch)));
        store.complete_fetch(ticket, result)
    };
    settle(state, OpKind::Fetch, silent, op_id, resolution)
}

/// Update the profile, then silently re-read it so server-derived fields
/// (avatar URL, normalized phone) land without a visible reload.
pub async fn update_profile(
    state: &Arc<AppState>,
    api: &Arc<dyn DirectoryApi>,
    req: UpdateProfile,
) -> Result<(), String> {
    let op_id = Uuid::new_v4();
    let ticket = state
        .profile
        .lock()
        .map_err(|_| lock_err())?
        .begin(OpKind::Update, false);
    log::debug!("profile.update {}", op_id);

    let result = api.update_profile(&req).await;

    let resolution = {
        let mut store = state.profile.lock().map_err(|_| lock_err())?;
        let result = result.map_err(|e| e.user_message(&store.default_error(OpKind::Update)));
        store.complete_update(ticket, result)
    };

    if matches!(resolution, Resolution::Fulfilled { .. }) {
        let user_id = state
            .profile
            .lock()
            .ok()
            .and_then(|s| s.record.as_ref().map(|r| r.id));
        if let Some(user_id) = user_id {
            let state = Arc::clone(state);
            let api = Arc::clone(api);
            defer_async(state.silent_refresh_delay(), async move {
                if let Err(e) = fetch_profile(&state, &api, user_id, true).await {
                    log::warn!("profile.refresh: background refetch failed: {}", e);
                }
            });
        }
    }
    settle(state, OpKind::Update, false, op_id, resolution)
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
            log::debug!("profile.{:?} {}: fulfilled", kind, op_id);
            if kind.is_mutation() {
                notify_success(state, silent, &kind.success_message("profile", "profile"));
            }
            let clear_state = Arc::clone(state);
            defer(state.toast_window(), move || {
                if let Ok(mut store) = clear_state.profile.lock() {
                    store.clear_success(success_ticket);
                }
            });
            Ok(())
        }
        Resolution::Rejected { message } => {
            log::warn!("profile.{:?} {}: rejected: {}", kind, op_id, message);
            notify_error(state, silent, &message);
            Err(message)
        }
        Resolution::Discarded => {
            log::debug!("profile.{:?} {}: superseded, discarded", kind, op_id);
            Ok(())
        }
    }
}
