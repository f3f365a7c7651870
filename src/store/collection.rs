//! Generic collection store: cached entity list, derived filtered view,
//! selection, pagination, and per-operation status flags.

use std::collections::HashMap;

use crate::types::{Keyed, Page, Pagination, Searchable};

use super::{OpKind, Resolution};

#[derive(Debug, Clone, Copy)]
struct InFlight {
    ticket: u64,
    silent: bool,
}

/// Canonical client-side copy of one server list. The server remains the
/// source of truth; every fulfilled list fetch replaces `items` wholesale.
#[derive(Debug)]
pub struct CollectionState<T> {
    noun: &'static str,
    plural: &'static str,

    pub items: Vec<T>,
    /// Derived view: `items` narrowed by the current search term. Always an
    /// id-subset of `items`, original order preserved.
    pub filtered_items: Vec<T>,
    search_term: String,
    /// At most one entity, owned by the currently open detail/edit surface.
    pub selected: Option<T>,
    pub pagination: Pagination,

    pub loading: bool,
    pub is_updating: bool,
    pub is_deleting: bool,
    pub is_adding_members: bool,
    pub is_removing_members: bool,
    pub is_silent_fetching: bool,

    pub error: Option<String>,
    pub success: bool,
    pub success_message: Option<String>,

    next_ticket: u64,
    success_ticket: u64,
    in_flight: HashMap<OpKind, InFlight>,
}

impl<T> CollectionState<T>
where
    T: Keyed + Searchable + Clone,
{
    pub fn new(noun: &'static str, plural: &'static str) -> Self {
        Self {
            noun,
            plural,
            items: Vec::new(),
            filtered_items: Vec::new(),
            search_term: String::new(),
            selected: None,
            pagination: Pagination::default(),
            loading: false,
            is_updating: false,
            is_deleting: false,
            is_adding_members: false,
            is_removing_members: false,
            is_silent_fetching: false,
            error: None,
            success: false,
            success_message: None,
            next_ticket: 0,
            success_ticket: 0,
            in_flight: HashMap::new(),
        }
    }

    pub fn noun(&self) -> &'static str {
        self.noun
    }

    pub fn default_error(&self, kind: OpKind) -> String {
        kind.default_error(self.noun, self.plural)
    }

    // =========================================================================
    // Lifecycle: pending
    // =========================================================================

    /// Pending phase. Returns the ticket the matching `complete_*` call must
    /// present. A begin for a kind with an operation still in flight
    /// supersedes it: the old ticket can no longer resolve.
    pub fn begin(&mut self, kind: OpKind, silent: bool) -> u64 {
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

    // =========================================================================
    // Lifecycle: fulfilled / rejected
    // =========================================================================

    /// List fetch: full replace of `items`, pagination overwritten from the
    /// server page. `selected` untouched.
    pub fn complete_fetch(&mut self, ticket: u64, result: Result<Page<T>, String>) -> Resolution {
        if !self.take_in_flight(OpKind::Fetch, ticket) {
            return Resolution::Discarded;
        }
        match result {
            Ok(page) => {
                self.items = page.items;
                self.pagination = page.pagination;
                self.refresh_filter();
                self.fulfill(OpKind::Fetch)
            }
            Err(message) => self.reject(message),
        }
    }

    /// Create: prepend the complete entity the server returned. `selected`
    /// untouched on success; a rejection ends the edit session.
    pub fn complete_create(&mut self, ticket: u64, result: Result<T, String>) -> Resolution {
        if !self.take_in_flight(OpKind::Create, ticket) {
            return Resolution::Discarded;
        }
        match result {
            Ok(entity) => {
                self.items.insert(0, entity);
                self.refresh_filter();
                self.fulfill(OpKind::Create)
            }
            Err(message) => {
                self.selected = None;
                self.reject(message)
            }
        }
    }

    /// Update: splice-replace at the matched id (no-op when the id is not
    /// cached). The edit session ends either way, so `selected` clears on
    /// both outcomes.
    pub fn complete_update(&mut self, ticket: u64, result: Result<T, String>) -> Resolution {
        if !self.take_in_flight(OpKind::Update, ticket) {
            return Resolution::Discarded;
        }
        self.selected = None;
        match result {
            Ok(entity) => {
                if let Some(pos) = self.items.iter().position(|e| e.id() == entity.id()) {
                    self.items[pos] = entity;
                }
                self.refresh_filter();
                self.fulfill(OpKind::Update)
            }
            Err(message) => self.reject(message),
        }
    }

    /// Delete: drop the id from `items` (and thereby `filtered_items`);
    /// clear `selected` when it was the deleted entity.
    pub fn complete_delete(
        &mut self,
        ticket: u64,
        id: i64,
        result: Result<(), String>,
    ) -> Resolution {
        if !self.take_in_flight(OpKind::Delete, ticket) {
            return Resolution::Discarded;
        }
        match result {
            Ok(()) => {
                self.items.retain(|e| e.id() != id);
                self.refresh_filter();
                if self.selected.as_ref().is_some_and(|s| s.id() == id) {
                    self.selected = None;
                }
                self.fulfill(OpKind::Delete)
            }
            Err(message) => self.reject(message),
        }
    }

    /// Membership mutation: the server returns the updated entity, which is
    /// splice-replaced in place. The member modal stays open, so `selected`
    /// is untouched.
    pub fn complete_members(
        &mut self,
        kind: OpKind,
        ticket: u64,
        result: Result<T, String>,
    ) -> Resolution {
        debug_assert!(matches!(
            kind,
            OpKind::AddMembers | OpKind::RemoveMembers
        ));
        if !self.take_in_flight(kind, ticket) {
            return Resolution::Discarded;
        }
        match result {
            Ok(entity) => {
                if let Some(pos) = self.items.iter().position(|e| e.id() == entity.id()) {
                    self.items[pos] = entity;
                }
                self.refresh_filter();
                self.fulfill(kind)
            }
            Err(message) => self.reject(message),
        }
    }

    /// Bulk assignment: no single-entity payload comes back; the engine
    /// follows up with a silent list refetch.
    pub fn complete_assign(&mut self, ticket: u64, result: Result<(), String>) -> Resolution {
        if !self.take_in_flight(OpKind::AssignUsers, ticket) {
            return Resolution::Discarded;
        }
        match result {
            Ok(()) => self.fulfill(OpKind::AssignUsers),
            Err(message) => self.reject(message),
        }
    }

    // =========================================================================
    // Search / selection / display
    // =========================================================================

    pub fn set_search_term(&mut self, term: &str) {
        self.search_term = crate::util::normalize_search(term);
        self.refresh_filter();
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn select(&mut self, entity: T) {
        self.selected = Some(entity);
    }

    pub fn clear_selected(&mut self) {
        self.selected = None;
    }

    /// Dismiss the inline error banner.
    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Clears the success display, but only for the operation that set it —
    /// a deferred clear never wipes a newer success.
    pub fn clear_success(&mut self, success_ticket: u64) {
        if self.success_ticket == success_ticket {
            self.success = false;
            self.success_message = None;
        }
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// True and consumes the slot when `ticket` is the in-flight operation
    /// of `kind`; false for superseded or already-resolved tickets.
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
        self.success_message = Some(kind.success_message(self.noun, self.plural));
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
            OpKind::Create | OpKind::Update => self.is_updating = true,
            OpKind::Delete => self.is_deleting = true,
            OpKind::AddMembers | OpKind::AssignUsers => self.is_adding_members = true,
            OpKind::RemoveMembers => self.is_removing_members = true,
        }
    }

    fn clear_flag(&mut self, kind: OpKind, silent: bool) {
        match kind {
            OpKind::Fetch if silent => self.is_silent_fetching = false,
            OpKind::Fetch => self.loading = false,
            OpKind::Create | OpKind::Update => self.is_updating = false,
            OpKind::Delete => self.is_deleting = false,
            OpKind::AddMembers | OpKind::AssignUsers => self.is_adding_members = false,
            OpKind::RemoveMembers => self.is_removing_members = false,
        }
    }

    fn refresh_filter(&mut self) {
        if self.search_term.is_empty() {
            self.filtered_items = self.items.clone();
        } else {
            self.filtered_items = self
                .items
                .iter()
                .filter(|e| e.matches(&self.search_term))
                .cloned()
                .collect();
        }
    }
}
