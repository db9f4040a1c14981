//! Plain states of the user table.

use std::{collections::BTreeSet, sync::Arc};

use chrono::{DateTime, Utc};
use roster_states::State;

use crate::{NewUser, User, UserId};

/// The full record collection, replaced wholesale on every change.
#[derive(Debug, Clone, Default)]
pub struct UsersState {
    users: Arc<[User]>,
}

impl State for UsersState {}

impl UsersState {
    pub fn new(users: Vec<User>) -> Self {
        Self {
            users: users.into(),
        }
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn snapshot(&self) -> Arc<[User]> {
        Arc::clone(&self.users)
    }

    pub fn replace(&mut self, users: Vec<User>) {
        self.users = users.into();
    }

    /// `max(ids ∪ {0}) + 1`
    pub fn next_id(&self) -> UserId {
        self.users.iter().map(|user| user.id).max().unwrap_or(0) + 1
    }

    pub fn remove_ids(&mut self, ids: &BTreeSet<UserId>) {
        self.users = self
            .users
            .iter()
            .filter(|user| !ids.contains(&user.id))
            .cloned()
            .collect();
    }

    /// Prepend a record built from `draft` with the next free id, and return that id.
    pub fn insert_new(&mut self, draft: &NewUser, now: DateTime<Utc>) -> UserId {
        let id = self.next_id();
        self.users = std::iter::once(User::from_draft(id, draft, now))
            .chain(self.users.iter().cloned())
            .collect();
        id
    }
}

/// Selected record ids. Independent of filtering and pagination.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    ids: BTreeSet<UserId>,
}

impl State for SelectionState {}

impl SelectionState {
    pub fn ids(&self) -> &BTreeSet<UserId> {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: UserId) -> bool {
        self.ids.contains(&id)
    }

    pub fn set(&mut self, id: UserId, selected: bool) {
        if selected {
            self.ids.insert(id);
        } else {
            self.ids.remove(&id);
        }
    }

    /// Flip one id and return whether it is now selected.
    pub fn toggle(&mut self, id: UserId) -> bool {
        let selected = !self.ids.contains(&id);
        self.set(id, selected);
        selected
    }

    pub fn extend(&mut self, ids: impl IntoIterator<Item = UserId>) {
        self.ids.extend(ids);
    }

    pub fn remove_all(&mut self, ids: &BTreeSet<UserId>) {
        self.ids.retain(|id| !ids.contains(id));
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }
}

/// Progress flags of the table's async operations.
///
/// The flags are advisory: nothing stops a second load while one is in flight.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableStatus {
    pub is_loading: bool,
    pub is_saving: bool,
    /// Message of the last failed load; cleared when a new load starts.
    pub error: Option<String>,
}

impl State for TableStatus {}

impl TableStatus {
    pub fn start_loading(&mut self) {
        self.is_loading = true;
        self.error = None;
    }

    pub fn finish_loading(&mut self) {
        self.is_loading = false;
    }

    pub fn set_error(&mut self, message: String) {
        self.error = Some(message);
    }

    pub fn start_saving(&mut self) {
        self.is_saving = true;
    }

    pub fn finish_saving(&mut self) {
        self.is_saving = false;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModalState {
    pub add_user_open: bool,
    pub details_open: bool,
    pub selected_user: Option<User>,
}

impl State for ModalState {}

impl ModalState {
    pub fn open_add_user(&mut self) {
        self.add_user_open = true;
    }

    pub fn close_add_user(&mut self) {
        self.add_user_open = false;
    }

    pub fn open_details(&mut self, user: User) {
        self.selected_user = Some(user);
        self.details_open = true;
    }

    pub fn close_details(&mut self) {
        self.details_open = false;
        self.selected_user = None;
    }
}
