//! Single-record store for the signed-in user's profile. Same ticketed
//! lifecycle as the collection stores, without list machinery.

use std::collections::HashMap;

use crate::types::ProfileRecord;

use super::{OpKind, Resolution};

#[derive(Debug, Clone, Copy)]
struct InFlight {
    ticket: u64,
    silent: bool,
}

#[derive(Debug, Default)]
pub struct ProfileStore {
    pub record: Option<ProfileRecord>,

    pub loading: bool,
    pub is_updating: bool,
    pub is_silent_fetching: bool,

    pub error: Option<String>,
    pub success: bool,
    pub success_message: Option<String>,

    next_ticket: u64,
    success_ticket: u64,
    in_flight: HashMap<OpKind, InFlight>,
}

impl ProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn default_error(&self, kind: OpKind) -> String {
        kind.default_error("profile", "profile")
    }

    pub fn begin(&mut self, kind: OpKind, silent: bool) -> u64 {
        debug_assert!(matches!(kind, OpKind::Fetch | OpKind::Update));
        self.next_ticket += 1;
        let ticket = self.next_ticket;

        if let Some(prev) = self
            .in_flight
            .insert(kind, InFlight { ticket, silent })
        {
            self.clear_flag(kind, prev.silent);
        }
        self.set_flag(kind, silent);
        self.error = None;
        ticket
    }

    pub fn complete_fetch(
        &mut self,
        ticket: u64,
        result: Result<ProfileRecord, String>,
    ) -> Resolution {
        if !self.take_in_flight(OpKind::Fetch, ticket) {
            return Resolution::Discarded;
        }
        match result {
            Ok(record) => {
                self.record = Some(record);
                self.fulfill(OpKind::Fetch)
            }
            Err(message) => self.reject(message),
        }
    }

    pub fn complete_update(
        &mut self,
        ticket: u64,
        result: Result<ProfileRecord, String>,
    ) -> Resolution {
        if !self.take_in_flight(OpKind::Update, ticket) {
            return Resolution::Discarded;
        }
        match result {
            Ok(record) => {
                self.record = Some(record);
                self.fulfill(OpKind::Update)
            }
            Err(message) => self.reject(message),
        }
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn clear_success(&mut self, success_ticket: u64) {
        if self.success_ticket == success_ticket {
            self.success = false;
            self.success_message = None;
        }
    }

    fn take_in_flight(&mut self, kind: OpKind, ticket: u64) -> bool {
        let current = self
            .in_flight
            .get(&kind)
            .is_some_and(|slot| slot.ticket == ticket);
        if !current {
            return false;
        }
        if let Some(slot) = self.in_flight.remove(&kind) {
            self.clear_flag(kind, slot.silent);
        }
        true
    }

    fn fulfill(&mut self, kind: OpKind) -> Resolution {
        self.success = true;
        self.success_message = Some(kind.success_message("profile", "profile"));
        self.success_ticket += 1;
        Resolution::Fulfilled {
            success_ticket: self.success_ticket,
        }
    }

    fn reject(&mut self, message: String) -> Resolution {
        self.error = Some(message.clone());
        Resolution::Rejected { message }
    }

    fn set_flag(&mut self, kind: OpKind, silent: bool) {
        match kind {
            OpKind::Fetch if silent => self.is_silent_fetching = true,
            OpKind::Fetch => self.loading = true,
            _ => self.is_updating = true,
        }
    }

    fn clear_flag(&mut self, kind: OpKind, silent: bool) {
        match kind {
            OpKind::Fetch if silent => self.is_silent_fetching = false,
            OpKind::Fetch => self.loading = false,
            _ => self.is_updating = false,
        }
    }
}
