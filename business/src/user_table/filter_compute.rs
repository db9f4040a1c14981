use std::borrow::Cow;

use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, Utc};
use roster_states::{Compute, ComputeDeps, Dep, Error, State};

use super::state::UsersState;
use crate::{User, UserRole, UserStatus};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub search: String,
    pub role: Option<UserRole>,
    pub status: Option<UserStatus>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl State for FilterCriteria {}

impl FilterCriteria {
    /// Trimmed, lowercased search text; `None` when blank.
    pub fn normalized_query(&self) -> Option<String> {
        let query = self.search.trim();
        (!query.is_empty()).then(|| query.to_lowercase())
    }

    /// Start of `date_from`, UTC.
    pub fn from_instant(&self) -> Option<DateTime<Utc>> {
        self.date_from.map(start_of_day)
    }

    /// Last millisecond of `date_to`, UTC.
    pub fn to_instant(&self) -> Option<DateTime<Utc>> {
        self.date_to
            .map(|date| start_of_day(date) + TimeDelta::days(1) - TimeDelta::milliseconds(1))
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::default()).and_utc()
}

fn narrow<'a, C: Copy>(
    users: Cow<'a, [User]>,
    criterion: Option<C>,
    keep: impl Fn(&User, C) -> bool,
) -> Cow<'a, [User]> {
    match criterion {
        None => users,
        Some(criterion) => users
            .iter()
            .filter(|user| keep(user, criterion))
            .cloned()
            .collect::<Vec<_>>()
            .into(),
    }
}

/// Role, status, date range, then free-text search. Input order is preserved.
pub fn filter_users(users: &[User], criteria: &FilterCriteria) -> Vec<User> {
    let query = criteria.normalized_query();

    let users = narrow(Cow::Borrowed(users), criteria.role, |user, role| {
        user.role == role
    });
    let users = narrow(users, criteria.status, |user, status| user.status == status);
    let users = narrow(users, criteria.from_instant(), |user, from| {
        user.registration_date >= from
    });
    let users = narrow(users, criteria.to_instant(), |user, to| {
        user.registration_date <= to
    });
    let users = narrow(users, query.as_deref(), |user, query| {
        user.matches_query(query)
    });

    users.into_owned()
}

#[derive(Debug, Clone, Default)]
pub struct FilteredUsersCompute {
    pub users: Vec<User>,
}

impl Compute for FilteredUsersCompute {
    fn deps(&self) -> ComputeDeps {
        ComputeDeps::new()
            .state::<UsersState>()
            .state::<FilterCriteria>()
    }

    fn compute(&self, deps: Dep<'_>) -> Result<Self, Error> {
        let users = deps.state::<UsersState>()?;
        let criteria = deps.state::<FilterCriteria>()?;

        Ok(Self {
            users: filter_users(users.users(), criteria),
        })
    }
}
