//! Async table operations.
//!
//! Each command reads its inputs synchronously, flips the relevant progress flag, and
//! returns a future that awaits the [`UserSource`](crate::UserSource). Results flow back
//! through the [`Updater`] and land on the next sync, so they always apply to the latest
//! collection.

use chrono::Utc;
use log::{error, info};
use roster_states::{Command, CommandFuture, Dep, State, Updater};

use super::state::{ModalState, SelectionState, TableStatus, UsersState};
use crate::{NewUser, NotifierState, UserSourceState};

/// Draft handed to [`AddUserCommand`]; set it before dispatching.
#[derive(Debug, Clone, Default)]
pub struct AddUserInput {
    pub draft: Option<NewUser>,
}

impl State for AddUserInput {}

fn idle() -> CommandFuture {
    Box::pin(async {})
}

fn missing(what: &str, command: &str) -> CommandFuture {
    error!("{command}: {what} is not registered");
    idle()
}

#[derive(Debug, Default)]
pub struct LoadUsersCommand;

impl Command for LoadUsersCommand {
    fn run(&self, deps: Dep<'_>, updater: Updater) -> CommandFuture {
        let Ok(source) = deps.state::<UserSourceState>() else {
            return missing("UserSourceState", "LoadUsersCommand");
        };
        let source = source.inner.clone();

        updater.update::<TableStatus>(TableStatus::start_loading);

        Box::pin(async move {
            match source.fetch_users().await {
                Ok(users) => {
                    info!("Loaded {} users", users.len());
                    updater.update::<UsersState>(move |state| state.replace(users));
                }
                Err(err) => {
                    error!("Failed to load users: {err}");
                    let message = format!("Failed to load data: {err}");
                    updater.update::<TableStatus>(move |status| status.set_error(message));
                }
            }
            updater.update::<TableStatus>(TableStatus::finish_loading);
        })
    }
}

/// Deletes the ids selected at dispatch time.
///
/// On success only those ids leave the selection; rows selected while the request is in
/// flight stay selected.
#[derive(Debug, Default)]
pub struct DeleteSelectedCommand;

impl Command for DeleteSelectedCommand {
    fn run(&self, deps: Dep<'_>, updater: Updater) -> CommandFuture {
        let (Ok(source), Ok(notifier), Ok(selection)) = (
            deps.state::<UserSourceState>(),
            deps.state::<NotifierState>(),
            deps.state::<SelectionState>(),
        ) else {
            return missing("a delete input", "DeleteSelectedCommand");
        };
        let source = source.inner.clone();
        let notifier = notifier.inner.clone();
        let ids = selection.ids().clone();

        Box::pin(async move {
            match source.delete_users(&ids).await {
                Ok(()) => {
                    info!("Deleted {} users", ids.len());
                    let deleted = ids.clone();
                    updater.update::<UsersState>(move |state| state.remove_ids(&deleted));
                    updater.update::<SelectionState>(move |selection| selection.remove_all(&ids));
                }
                Err(err) => {
                    error!("Failed to delete users {ids:?}: {err}");
                    notifier.notify(&format!("Failed to delete users: {err}"));
                }
            }
        })
    }
}

#[derive(Debug, Default)]
pub struct AddUserCommand;

impl Command for AddUserCommand {
    fn run(&self, deps: Dep<'_>, updater: Updater) -> CommandFuture {
        let (Ok(source), Ok(notifier), Ok(input)) = (
            deps.state::<UserSourceState>(),
            deps.state::<NotifierState>(),
            deps.state::<AddUserInput>(),
        ) else {
            return missing("an add-user input", "AddUserCommand");
        };
        let Some(draft) = input.draft.clone() else {
            return missing("AddUserInput::draft", "AddUserCommand");
        };
        let source = source.inner.clone();
        let notifier = notifier.inner.clone();

        updater.update::<TableStatus>(TableStatus::start_saving);

        Box::pin(async move {
            match source.create_user(&draft).await {
                Ok(()) => {
                    let now = Utc::now();
                    updater.update::<UsersState>(move |state| {
                        let id = state.insert_new(&draft, now);
                        info!("Created user {id}");
                    });
                    updater.update::<ModalState>(ModalState::close_add_user);
                }
                Err(err) => {
                    error!("Failed to create user: {err}");
                    notifier.notify(&format!("Failed to create user: {err}"));
                }
            }
            updater.update::<TableStatus>(TableStatus::finish_saving);
        })
    }
}
