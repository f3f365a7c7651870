//! Client-side synchronization core for the orgdesk admin console.
//!
//! The server owns the data; this crate owns the client's cached view of
//! it. Each domain (companies, teams, user directory, profile) gets a store
//! holding the canonical entity list, a derived search view, pagination
//! metadata, and per-operation status flags. Sync engines run every CRUD
//! verb through a pending/fulfilled/rejected lifecycle against the REST API,
//! with ticket-fenced, exactly-once resolution. The eligibility module
//! computes team-membership candidacy from the cached state alone.

pub mod api;
pub mod eligibility;
pub mod error;
pub mod notify;
pub mod state;
pub mod store;
pub mod sync;
pub mod types;
pub mod util;
