//! Business layer of the user-administration table.
//!
//! - [`user_table`]: records, filter/sort/pagination pipeline, selection and the async
//!   load/delete/add operations, driven through [`UserTable`].
//! - [`validation`]: declarative form validation and the add-user rule set.
//! - [`UserSource`]: where records come from; [`MockUserSource`] simulates a backend.
//! - [`display`]: labels and generated avatars for front ends.

mod config;
mod dialog;
pub mod display;
mod error;
mod source;
mod user;
pub mod user_table;
pub mod validation;

pub use config::TableConfig;
pub use dialog::{AutoConfirm, Confirmation, LogNotifier, Notifier, NotifierState};
pub use error::{SourceError, TableError, UnknownVariant};
pub use source::{
    MemoryUserSource, MockUserSource, UserSource, UserSourceState, generate_mock_users,
};
pub use user::{NewUser, User, UserId, UserRole, UserStatus};
pub use user_table::{
    FilterCriteria, PageItem, PageState, PageView, SortColumn, SortCriteria, SortDirection,
    UserTable,
};
