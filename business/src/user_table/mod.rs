//! User table domain module.
//!
//! Data flows one way: [`UsersState`] → [`FilteredUsersCompute`] → [`SortedUsersCompute`]
//! → [`PaginationCompute`]. Each stage is a plain function (`filter_users`, `sort_users`,
//! `paginate`) wrapped in a compute, so a change only recomputes the stages after it.
//!
//! Front ends drive everything through [`UserTable`]; the states, computes and commands are
//! public for hosts that want to embed them in their own `StateCtx`.

pub mod commands;
pub mod existing_emails_compute;
pub mod filter_compute;
pub mod pagination_compute;
pub mod sort_compute;
pub mod state;
mod table;

pub use commands::{AddUserCommand, AddUserInput, DeleteSelectedCommand, LoadUsersCommand};
pub use existing_emails_compute::ExistingEmailsCompute;
pub use filter_compute::{FilterCriteria, FilteredUsersCompute, filter_users};
pub use pagination_compute::{
    PageItem, PageState, PageView, PaginationCompute, paginate, visible_pages,
};
pub use sort_compute::{SortColumn, SortCriteria, SortDirection, SortedUsersCompute, sort_users};
pub use state::{ModalState, SelectionState, TableStatus, UsersState};
pub use table::UserTable;
