//! Shared application state.
//!
//! One `AppState` owns every per-domain store behind its own mutex plus the
//! loaded configuration. Stores are only ever mutated from a sync engine's
//! resolution path; nothing else writes to them.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::error::ApiError;
use crate::notify::Notifier;
use crate::store::{CollectionState, ProfileStore};
use crate::types::{Company, Config, Team, User};

pub struct AppState {
    pub config: Mutex<Option<Config>>,
    pub companies: Mutex<CollectionState<Company>>,
    pub teams: Mutex<CollectionState<Team>>,
    /// Whole-organization user directory; client-side pagination only.
    pub directory: Mutex<CollectionState<User>>,
    pub profile: Mutex<ProfileStore>,
    pub notifier: Arc<dyn Notifier>,
}

impl AppState {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        let config = load_config().ok();
        Self::with_config(config, notifier)
    }

    pub fn with_config(config: Option<Config>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            config: Mutex::new(config),
            companies: Mutex::new(CollectionState::new("company", "companies")),
            teams: Mutex::new(CollectionState::new("team", "teams")),
            directory: Mutex::new(CollectionState::new("user", "users")),
            profile: Mutex::new(ProfileStore::new()),
            notifier,
        }
    }

    /// Organization scope for list endpoints. Absence is a client-side
    /// validation failure, never a network error.
    pub fn organization_id(&self) -> Result<i64, ApiError> {
        self.config
            .lock()
            .ok()
            .and_then(|guard| guard.as_ref().and_then(|c| c.organization_id))
            .ok_or(ApiError::MissingOrganization)
    }

    pub fn page_size(&self) -> u32 {
        self.config
            .lock()
            .ok()
            .and_then(|guard| guard.as_ref().map(|c| c.page_size))
            .unwrap_or_else(crate::types::default_page_size)
    }

    pub fn toast_window(&self) -> std::time::Duration {
        let secs = self
            .config
            .lock()
            .ok()
            .and_then(|guard| guard.as_ref().map(|c| c.toast_window_secs))
            .unwrap_or(4);
        std::time::Duration::from_secs(secs)
    }

    pub fn silent_refresh_delay(&self) -> std::time::Duration {
        let ms = self
            .config
            .lock()
            .ok()
            .and_then(|guard| guard.as_ref().map(|c| c.silent_refresh_delay_ms))
            .unwrap_or(750);
        std::time::Duration::from_millis(ms)
    }
}

/// Get the canonical config file path (~/.orgdesk/config.json)
pub fn config_path() -> Result<PathBuf, String> {
    let home = dirs::home_dir().ok_or("Could not find home directory")?;
    Ok(home.join(".orgdesk").join("config.json"))
}

/// Load configuration from ~/.orgdesk/config.json
pub fn load_config() -> Result<Config, String> {
    let path = config_path()?;
    load_config_from(&path)
}

pub(crate) fn load_config_from(path: &Path) -> Result<Config, String> {
    if !path.exists() {
        return Err(format!(
            "Config file not found at {}. Create it with: {{ \"baseUrl\": \"https://api.example.com\" }}",
            path.display()
        ));
    }

    let content =
        fs::read_to_string(path).map_err(|e| format!("Failed to read config: {}", e))?;

    let config: Config =
        serde_json::from_str(&content).map_err(|e| format!("Failed to parse config: {}", e))?;

    // Validate the base URL up front so a typo fails at load, not mid-call
    url::Url::parse(&config.base_url_normalized())
        .map_err(|e| format!("Invalid baseUrl '{}': {}", config.base_url, e))?;

    Ok(config)
}

/// Create or update config.json atomically.
///
/// If config already exists in-memory, clones it, applies the mutator, and
/// writes back. If config is None (first-run), starts from an empty Config,
/// applies the mutator, ensures ~/.orgdesk/ exists, and writes + updates
/// in-memory state.
pub fn create_or_update_config(
    state: &AppState,
    mutator: impl FnOnce(&mut Config),
) -> Result<Config, String> {
    let mut guard = state.config.lock().map_err(|_| "Lock poisoned")?;

    let mut config = match guard.clone() {
        Some(c) => c,
        None => Config {
            base_url: String::new(),
            organization_id: None,
            page_size: crate::types::default_page_size(),
            toast_window_secs: 4,
            silent_refresh_delay_ms: 750,
        },
    };

    mutator(&mut config);

    let path = config_path()?;
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config dir: {}", e))?;
        }
    }

    let content = serde_json::to_string_pretty(&config)
        .map_err(|e| format!("Failed to serialize config: {}", e))?;
    crate::util::atomic_write_str(&path, &content)
        .map_err(|e| format!("Failed to write config: {}", e))?;

    *guard = Some(config.clone());

    Ok(config)
}

/// Reload configuration from disk
pub fn reload_config(state: &AppState) -> Result<Config, String> {
    let config = load_config()?;
    let mut guard = state.config.lock().map_err(|_| "Lock poisoned")?;
    *guard = Some(config.clone());
    Ok(config)
}
