use roster_states::{Compute, ComputeDeps, Dep, Error};

use super::state::UsersState;

/// Every email in the collection, for the add-user uniqueness rule.
#[derive(Debug, Clone, Default)]
pub struct ExistingEmailsCompute {
    pub emails: Vec<String>,
}

impl Compute for ExistingEmailsCompute {
    fn deps(&self) -> ComputeDeps {
        ComputeDeps::new().state::<UsersState>()
    }

    fn compute(&self, deps: Dep<'_>) -> Result<Self, Error> {
        let users = deps.state::<UsersState>()?;

        Ok(Self {
            emails: users.users().iter().map(|user| user.email.clone()).collect(),
        })
    }
}
