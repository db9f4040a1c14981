use std::{collections::BTreeSet, num::NonZeroUsize, sync::Arc};

use chrono::NaiveDate;
use log::{debug, info};
use roster_states::StateCtx;

use super::{
    commands::{AddUserCommand, AddUserInput, DeleteSelectedCommand, LoadUsersCommand},
    existing_emails_compute::ExistingEmailsCompute,
    filter_compute::{FilterCriteria, FilteredUsersCompute},
    pagination_compute::{PageState, PageView, PaginationCompute},
    sort_compute::{SortColumn, SortCriteria, SortedUsersCompute},
    state::{ModalState, SelectionState, TableStatus, UsersState},
};
use crate::{
    Confirmation, NewUser, Notifier, NotifierState, TableConfig, TableError, User, UserId,
    UserRole, UserSource, UserSourceState, UserStatus,
    validation::{Validation, new_user_rules},
};

/// The user-administration table: records, filter, sort, pagination, selection, dialogs.
///
/// Reads are always current: every mutation recomputes the affected derived views before
/// returning. Async operations come in two flavours, an awaiting one (`load_users`) and a
/// `dispatch_*` one that returns while the operation is in flight; [`UserTable::sync`]
/// applies whatever has finished since.
pub struct UserTable {
    ctx: StateCtx,
    confirmation: Box<dyn Confirmation>,
}

impl std::fmt::Debug for UserTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserTable")
            .field("ctx", &self.ctx)
            .finish_non_exhaustive()
    }
}

impl UserTable {
    pub fn new(
        config: TableConfig,
        source: Arc<dyn UserSource>,
        notifier: Arc<dyn Notifier>,
        confirmation: impl Confirmation + 'static,
    ) -> Result<Self, TableError> {
        let page_size = NonZeroUsize::new(config.page_size).ok_or(TableError::ZeroPageSize)?;

        let mut ctx = StateCtx::new();
        ctx.add_state(config);
        ctx.add_state(UserSourceState::new(source));
        ctx.add_state(NotifierState::new(notifier));
        ctx.add_state(UsersState::default());
        ctx.add_state(FilterCriteria::default());
        ctx.add_state(SortCriteria::default());
        ctx.add_state(PageState::new(page_size));
        ctx.add_state(SelectionState::default());
        ctx.add_state(TableStatus::default());
        ctx.add_state(ModalState::default());
        ctx.add_state(AddUserInput::default());

        ctx.record_compute(FilteredUsersCompute::default())?;
        ctx.record_compute(SortedUsersCompute::default())?;
        ctx.record_compute(PaginationCompute::default())?;
        ctx.record_compute(ExistingEmailsCompute::default())?;

        ctx.record_command(LoadUsersCommand);
        ctx.record_command(DeleteSelectedCommand);
        ctx.record_command(AddUserCommand);

        ctx.run_computed()?;

        Ok(Self {
            ctx,
            confirmation: Box::new(confirmation),
        })
    }

    /// The underlying runtime, for inspecting recompute generations.
    pub fn ctx(&self) -> &StateCtx {
        &self.ctx
    }

    pub async fn load_users(&mut self) -> Result<(), TableError> {
        self.dispatch_load()?;
        self.flush().await
    }

    pub async fn retry_load(&mut self) -> Result<(), TableError> {
        self.load_users().await
    }

    pub fn dispatch_load(&mut self) -> Result<(), TableError> {
        self.ctx.dispatch::<LoadUsersCommand>()?;
        Ok(())
    }

    /// Ask for confirmation, then delete every selected record.
    ///
    /// Returns `false` when the user declined; nothing changes then.
    pub async fn delete_selected(&mut self) -> Result<bool, TableError> {
        let confirmed = self.dispatch_delete_selected()?;
        if confirmed {
            self.flush().await?;
        }
        Ok(confirmed)
    }

    pub fn dispatch_delete_selected(&mut self) -> Result<bool, TableError> {
        let count = self.ctx.state::<SelectionState>()?.len();
        let message = format!("Are you sure you want to delete {count} users?");
        if !self.confirmation.confirm(&message) {
            info!("Deletion of {count} users declined");
            return Ok(false);
        }

        self.ctx.dispatch::<DeleteSelectedCommand>()?;
        Ok(true)
    }

    pub async fn add_user(&mut self, draft: NewUser) -> Result<(), TableError> {
        self.dispatch_add_user(draft)?;
        self.flush().await
    }

    pub fn dispatch_add_user(&mut self, draft: NewUser) -> Result<(), TableError> {
        self.ctx
            .update::<AddUserInput>(|input| input.draft = Some(draft))?;
        self.ctx.dispatch::<AddUserCommand>()?;
        Ok(())
    }

    /// Apply the results of operations that have finished.
    pub fn sync(&mut self) -> Result<(), TableError> {
        self.ctx.sync_computes()?;
        Ok(())
    }

    /// Wait for every operation in flight, then apply the results.
    pub async fn flush(&mut self) -> Result<(), TableError> {
        self.ctx.flush().await?;
        Ok(())
    }

    pub fn in_flight(&self) -> usize {
        self.ctx.in_flight()
    }

    /// Every filter edit lands here; the page returns to 1 only when the criteria change.
    fn update_filter(&mut self, edit: impl FnOnce(&mut FilterCriteria)) -> Result<(), TableError> {
        let current = self.ctx.state::<FilterCriteria>()?;
        let mut next = current.clone();
        edit(&mut next);
        if next == *current {
            return Ok(());
        }

        debug!("Filter changed to {next:?}");
        self.ctx.update_deferred::<FilterCriteria>(|criteria| *criteria = next)?;
        self.ctx.update_deferred::<PageState>(PageState::reset)?;
        self.ctx.run_computed()?;
        Ok(())
    }

    pub fn set_search(&mut self, search: impl Into<String>) -> Result<(), TableError> {
        let search = search.into();
        self.update_filter(|criteria| criteria.search = search)
    }

    pub fn set_role_filter(&mut self, role: Option<UserRole>) -> Result<(), TableError> {
        self.update_filter(|criteria| criteria.role = role)
    }

    pub fn set_status_filter(&mut self, status: Option<UserStatus>) -> Result<(), TableError> {
        self.update_filter(|criteria| criteria.status = status)
    }

    pub fn set_date_from(&mut self, date: Option<NaiveDate>) -> Result<(), TableError> {
        self.update_filter(|criteria| criteria.date_from = date)
    }

    pub fn set_date_to(&mut self, date: Option<NaiveDate>) -> Result<(), TableError> {
        self.update_filter(|criteria| criteria.date_to = date)
    }

    pub fn clear_date_filter(&mut self) -> Result<(), TableError> {
        self.update_filter(|criteria| {
            criteria.date_from = None;
            criteria.date_to = None;
        })
    }

    pub fn clear_all_filters(&mut self) -> Result<(), TableError> {
        self.update_filter(|criteria| *criteria = FilterCriteria::default())
    }

    pub fn sort_by(&mut self, column: SortColumn) -> Result<(), TableError> {
        self.ctx
            .update::<SortCriteria>(|criteria| criteria.sort_by(column))?;
        Ok(())
    }

    /// Returns whether the page changed; pages outside `1..=total_pages` are ignored.
    pub fn go_to_page(&mut self, page: usize) -> Result<bool, TableError> {
        let total_pages = self.page()?.total_pages;
        let mut next = *self.ctx.state::<PageState>()?;
        if !next.go_to(page, total_pages) {
            return Ok(false);
        }

        self.ctx.set(next)?;
        Ok(true)
    }

    pub fn set_page_size(&mut self, page_size: usize) -> Result<(), TableError> {
        let page_size = NonZeroUsize::new(page_size).ok_or(TableError::ZeroPageSize)?;
        self.ctx
            .update::<PageState>(|state| state.set_page_size(page_size))?;
        Ok(())
    }

    /// Returns whether `id` is selected afterwards.
    pub fn toggle_selected(&mut self, id: UserId) -> Result<bool, TableError> {
        let mut selected = false;
        self.ctx
            .update::<SelectionState>(|selection| selected = selection.toggle(id))?;
        Ok(selected)
    }

    pub fn set_selected(&mut self, id: UserId, selected: bool) -> Result<(), TableError> {
        self.ctx
            .update::<SelectionState>(|selection| selection.set(id, selected))?;
        Ok(())
    }

    /// Add every row of the current page to the selection.
    pub fn select_page(&mut self) -> Result<(), TableError> {
        let ids = self.page_ids()?;
        self.ctx
            .update::<SelectionState>(|selection| selection.extend(ids))?;
        Ok(())
    }

    /// Deselect the current page if all of it is selected, otherwise select all of it.
    pub fn toggle_page_selection(&mut self) -> Result<(), TableError> {
        let ids = self.page_ids()?;
        if ids.is_empty() {
            return Ok(());
        }

        let all_selected = {
            let selection = self.ctx.state::<SelectionState>()?;
            ids.iter().all(|id| selection.contains(*id))
        };
        self.ctx.update::<SelectionState>(|selection| {
            if all_selected {
                selection.remove_all(&ids);
            } else {
                selection.extend(ids);
            }
        })?;
        Ok(())
    }

    pub fn is_page_selected(&self) -> Result<bool, TableError> {
        let page = self.page()?;
        let selection = self.ctx.state::<SelectionState>()?;
        Ok(!page.rows.is_empty() && page.rows.iter().all(|user| selection.contains(user.id)))
    }

    pub fn clear_selection(&mut self) -> Result<(), TableError> {
        self.ctx.update::<SelectionState>(SelectionState::clear)?;
        Ok(())
    }

    pub fn is_selected(&self, id: UserId) -> Result<bool, TableError> {
        Ok(self.ctx.state::<SelectionState>()?.contains(id))
    }

    pub fn selected_ids(&self) -> Result<&BTreeSet<UserId>, TableError> {
        Ok(self.ctx.state::<SelectionState>()?.ids())
    }

    fn page_ids(&self) -> Result<BTreeSet<UserId>, TableError> {
        Ok(self.page()?.rows.iter().map(|user| user.id).collect())
    }

    pub fn open_add_user(&mut self) -> Result<(), TableError> {
        self.ctx.update::<ModalState>(ModalState::open_add_user)?;
        Ok(())
    }

    pub fn close_add_user(&mut self) -> Result<(), TableError> {
        self.ctx.update::<ModalState>(ModalState::close_add_user)?;
        Ok(())
    }

    pub fn open_user_details(&mut self, user: User) -> Result<(), TableError> {
        self.ctx
            .update::<ModalState>(|modals| modals.open_details(user))?;
        Ok(())
    }

    pub fn close_user_details(&mut self) -> Result<(), TableError> {
        self.ctx.update::<ModalState>(ModalState::close_details)?;
        Ok(())
    }

    /// A fresh add-user form checked against the emails currently in the collection.
    pub fn new_user_form(&self) -> Result<Validation<NewUser>, TableError> {
        Ok(Validation::new(
            NewUser::default(),
            new_user_rules(self.existing_emails()?),
        ))
    }

    pub fn users(&self) -> Result<&[User], TableError> {
        Ok(self.ctx.state::<UsersState>()?.users())
    }

    pub fn filtered_users(&self) -> Result<&[User], TableError> {
        Ok(&self.ctx.cached::<FilteredUsersCompute>()?.users)
    }

    pub fn sorted_users(&self) -> Result<&[User], TableError> {
        Ok(&self.ctx.cached::<SortedUsersCompute>()?.users)
    }

    pub fn page(&self) -> Result<&PageView, TableError> {
        Ok(&self.ctx.cached::<PaginationCompute>()?.view)
    }

    pub fn existing_emails(&self) -> Result<&[String], TableError> {
        Ok(&self.ctx.cached::<ExistingEmailsCompute>()?.emails)
    }

    pub fn status(&self) -> Result<&TableStatus, TableError> {
        Ok(self.ctx.state::<TableStatus>()?)
    }

    pub fn filter(&self) -> Result<&FilterCriteria, TableError> {
        Ok(self.ctx.state::<FilterCriteria>()?)
    }

    pub fn sort(&self) -> Result<&SortCriteria, TableError> {
        Ok(self.ctx.state::<SortCriteria>()?)
    }

    pub fn page_state(&self) -> Result<&PageState, TableError> {
        Ok(self.ctx.state::<PageState>()?)
    }

    pub fn modals(&self) -> Result<&ModalState, TableError> {
        Ok(self.ctx.state::<ModalState>()?)
    }

    pub fn config(&self) -> Result<&TableConfig, TableError> {
        Ok(self.ctx.state::<TableConfig>()?)
    }
}
