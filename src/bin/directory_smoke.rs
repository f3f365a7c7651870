//! Directory API smoke check.
//!
//! Loads config + bearer token, then runs one non-silent list fetch per
//! domain against the live server and prints what landed in the stores.
//! Useful after server upgrades to confirm the wire contract still decodes.
//!
//! Usage: `directory_smoke` (reads ~/.orgdesk/config.json and token.json)

use std::sync::Arc;

use orgdesk::api::{token_store, ApiClient, DirectoryApi};
use orgdesk::notify::LogNotifier;
use orgdesk::state::{load_config, AppState};
use orgdesk::sync;

#[tokio::main]
async fn main() {
    env_logger::init();

    if let Err(e) = run().await {
        eprintln!("directory_smoke: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), String> {
    let config = load_config()?;
    let token = token_store::load_token().map_err(|e| e.to_string())?;
    if token_store::is_token_expired(&token) {
        return Err("Bearer token expired; re-authenticate first".to_string());
    }
    if let Some(account) = token_store::peek_account() {
        log::info!("authenticated as {}", account);
    }

    let client = ApiClient::from_config(&config, &token).map_err(|e| e.to_string())?;
    let api: Arc<dyn DirectoryApi> = Arc::new(client);
    let state = Arc::new(AppState::with_config(Some(config), Arc::new(LogNotifier)));

    sync::companies::fetch_companies(&state, &api, 1, None, false).await?;
    sync::teams::fetch_teams(&state, &api, 1, None, false).await?;
    sync::users::fetch_directory(&state, &api, false).await?;

    {
        let companies = state.companies.lock().map_err(|_| "Lock poisoned")?;
        println!(
            "companies: {} cached, {} total across {} pages",
            companies.items.len(),
            companies.pagination.total_items,
            companies.pagination.total_pages
        );
    }
    {
        let teams = state.teams.lock().map_err(|_| "Lock poisoned")?;
        println!(
            "teams:     {} cached, {} total across {} pages",
            teams.items.len(),
            teams.pagination.total_items,
            teams.pagination.total_pages
        );
        for team in &teams.items {
            println!(
                "  - {} ({} participants)",
                team.name,
                team.participant_ids().len()
            );
        }
    }
    {
        let directory = state.directory.lock().map_err(|_| "Lock poisoned")?;
        println!("users:     {} in directory", directory.items.len());
    }

    Ok(())
}
