//! Organization user directory synchronization.
//!
//! The directory backs the member browser and the eligibility filter, so it
//! is fetched whole (`getAll=true`) and paginated client-side.

use std::sync::Arc;

use uuid::Uuid;

use crate::api::DirectoryApi;
use crate::state::AppState;
use crate::store::{OpKind, Resolution};
use crate::types::{Page, Pagination};

use super::{defer, lock_err, notify_error};

pub async fn fetch_directory(
    state: &Arc<AppState>,
    api: &Arc<dyn DirectoryApi>,
    silent: bool,
) -> Result<(), String> {
    let op_id = Uuid::new_v4();
    let ticket = state
        .directory
        .lock()
        .map_err(|_| lock_err())?
        .begin(OpKind::Fetch, silent);
    log::debug!("users.fetch {}: silent {}", op_id, silent);

    let result = match state.organization_id() {
        Ok(org) => api.user_directory(org).await,
        Err(err) => Err(err),
    };

    let resolution = {
        let mut store = state.directory.lock().map_err(|_| lock_err())?;
        let result = result
            .map(|users| Page {
                items: users,
                pagination: Pagination::default(),
            })
            .map_err(|e| e.user_message(&store.default_error(OpKind::Fetch)));
        store.complete_fetch(ticket, result)
    };

    match resolution {
        Resolution::Fulfilled { success_ticket } => {
            log::debug!("users.fetch {}: fulfilled", op_id);
            let clear_state = Arc::clone(state);
            defer(state.toast_window(), move || {
                if let Ok(mut store) = clear_state.directory.lock() {
                    store.clear_success(success_ticket);
                }
            });
            Ok(())
        }
        Resolution::Rejected { message } => {
            log::warn!("users.fetch {}: rejected: {}", op_id, message);
            notify_error(state, silent, &message);
            Err(message)
        }
        Resolution::Discarded => {
            log::debug!("users.fetch {}: superseded, discarded", op_id);
            Ok(())
        }
    }
}
