use std::cmp::Ordering;

use roster_states::{Compute, ComputeDeps, Dep, Error, State};
use serde::{Deserialize, Serialize};

use super::filter_compute::FilteredUsersCompute;
use crate::User;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortColumn {
    #[default]
    Id,
    Name,
    Email,
    RegistrationDate,
    LastActivity,
}

impl SortColumn {
    pub fn compare(self, a: &User, b: &User) -> Ordering {
        match self {
            Self::Id => a.id.cmp(&b.id),
            Self::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            Self::Email => a.email.to_lowercase().cmp(&b.email.to_lowercase()),
            Self::RegistrationDate => a.registration_date.cmp(&b.registration_date),
            Self::LastActivity => a.last_activity.cmp(&b.last_activity),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Asc => ordering,
            Self::Desc => ordering.reverse(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortCriteria {
    pub column: SortColumn,
    pub direction: SortDirection,
}

impl State for SortCriteria {}

impl SortCriteria {
    /// Same column flips the direction; another column starts ascending.
    pub fn sort_by(&mut self, column: SortColumn) {
        if self.column == column {
            self.direction = self.direction.toggled();
        } else {
            self.column = column;
            self.direction = SortDirection::Asc;
        }
    }

    pub fn compare(&self, a: &User, b: &User) -> Ordering {
        self.direction.apply(self.column.compare(a, b))
    }
}

/// Stable sort into a new vector; records with equal keys keep their input order.
pub fn sort_users(users: &[User], criteria: &SortCriteria) -> Vec<User> {
    let mut sorted = users.to_vec();
    sorted.sort_by(|a, b| criteria.compare(a, b));
    sorted
}

#[derive(Debug, Clone, Default)]
pub struct SortedUsersCompute {
    pub users: Vec<User>,
}

impl Compute for SortedUsersCompute {
    fn deps(&self) -> ComputeDeps {
        ComputeDeps::new()
            .compute::<FilteredUsersCompute>()
            .state::<SortCriteria>()
    }

    fn compute(&self, deps: Dep<'_>) -> Result<Self, Error> {
        let filtered = deps.compute::<FilteredUsersCompute>()?;
        let criteria = deps.state::<SortCriteria>()?;

        Ok(Self {
            users: sort_users(&filtered.users, criteria),
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeDelta, TimeZone, Utc};

    use super::*;
    use crate::{UserId, UserRole, UserStatus};

    fn user(id: UserId, name: &str, email: &str, days: i64) -> User {
        let base = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        User {
            id,
            name: name.to_owned(),
            avatar: String::new(),
            email: email.to_owned(),
            registration_date: base + TimeDelta::days(days),
            last_activity: base - TimeDelta::days(days),
            login_count: 0,
            posts_count: 0,
            comments_count: 0,
            status: UserStatus::Active,
            role: UserRole::User,
        }
    }

    fn roster() -> Vec<User> {
        vec![
            user(3, "bob", "b@x.io", 5),
            user(1, "Alice", "C@x.io", 9),
            user(10, "alice", "a@x.io", 1),
            user(2, "Carol", "d@x.io", 5),
        ]
    }

    fn ids(users: &[User]) -> Vec<UserId> {
        users.iter().map(|u| u.id).collect()
    }

    #[test]
    fn sort_by_toggles_or_switches() {
        let mut criteria = SortCriteria::default();
        assert_eq!(criteria.column, SortColumn::Id);
        assert_eq!(criteria.direction, SortDirection::Asc);

        criteria.sort_by(SortColumn::Id);
        assert_eq!(criteria.direction, SortDirection::Desc);

        criteria.sort_by(SortColumn::Email);
        assert_eq!(criteria.column, SortColumn::Email);
        assert_eq!(criteria.direction, SortDirection::Asc);
    }

    #[test]
    fn ids_sort_numerically() {
        let asc = SortCriteria::default();
        assert_eq!(ids(&sort_users(&roster(), &asc)), vec![1, 2, 3, 10]);

        let desc = SortCriteria {
            direction: SortDirection::Desc,
            ..asc
        };
        assert_eq!(ids(&sort_users(&roster(), &desc)), vec![10, 3, 2, 1]);
    }

    #[test]
    fn names_ignore_case_and_ties_keep_input_order() {
        let criteria = SortCriteria {
            column: SortColumn::Name,
            direction: SortDirection::Asc,
        };
        assert_eq!(ids(&sort_users(&roster(), &criteria)), vec![1, 10, 3, 2]);

        let desc = SortCriteria {
            direction: SortDirection::Desc,
            ..criteria
        };
        assert_eq!(ids(&sort_users(&roster(), &desc)), vec![2, 3, 1, 10]);
    }

    #[test]
    fn emails_ignore_case() {
        let criteria = SortCriteria {
            column: SortColumn::Email,
            direction: SortDirection::Asc,
        };
        assert_eq!(ids(&sort_users(&roster(), &criteria)), vec![10, 3, 1, 2]);
    }

    #[test]
    fn dates_compare_by_instant() {
        let registered = SortCriteria {
            column: SortColumn::RegistrationDate,
            direction: SortDirection::Asc,
        };
        assert_eq!(ids(&sort_users(&roster(), &registered)), vec![10, 3, 2, 1]);

        let active = SortCriteria {
            column: SortColumn::LastActivity,
            direction: SortDirection::Asc,
        };
        assert_eq!(ids(&sort_users(&roster(), &active)), vec![1, 3, 2, 10]);
    }

    #[test]
    fn input_is_left_untouched() {
        let users = roster();
        let _ = sort_users(&users, &SortCriteria::default());
        assert_eq!(ids(&users), vec![3, 1, 10, 2]);
    }
}
