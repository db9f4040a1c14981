//! User record and the draft used to create one.

use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use rand::{
    Rng,
    distributions::{Distribution, Standard},
};
use serde::{Deserialize, Serialize};

use crate::UnknownVariant;

pub type UserId = u64;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    User,
    Admin,
    Moderator,
}

impl UserRole {
    pub const ALL: [Self; 3] = [Self::Admin, Self::User, Self::Moderator];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
            Self::Moderator => "moderator",
        }
    }
}

impl Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| UnknownVariant::new("role", s))
    }
}

impl Distribution<UserRole> for Standard {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> UserRole {
        match rng.gen_range(0..3) {
            0 => UserRole::Admin,
            1 => UserRole::User,
            _ => UserRole::Moderator,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    #[default]
    Active,
    Inactive,
}

impl UserStatus {
    pub const ALL: [Self; 2] = [Self::Active, Self::Inactive];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

impl Display for UserStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownVariant::new("status", s))
    }
}

impl Distribution<UserStatus> for Standard {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> UserStatus {
        if rng.gen_bool(0.5) {
            UserStatus::Active
        } else {
            UserStatus::Inactive
        }
    }
}

/// One row of the table.
///
/// Records are never edited once they are part of the collection; loads, deletes and adds
/// replace the collection instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    /// Image reference; empty means "derive one from the name".
    pub avatar: String,
    pub email: String,
    pub registration_date: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    pub login_count: u32,
    pub posts_count: u32,
    pub comments_count: u32,
    pub status: UserStatus,
    pub role: UserRole,
}

impl User {
    /// A freshly created account: active, zero counters, both timestamps at `now`.
    pub fn from_draft(id: UserId, draft: &NewUser, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name.clone(),
            avatar: String::new(),
            email: draft.email.clone(),
            registration_date: now,
            last_activity: now,
            login_count: 0,
            posts_count: 0,
            comments_count: 0,
            status: UserStatus::Active,
            role: draft.role,
        }
    }

    /// `query` must already be trimmed and lowercased.
    pub fn matches_query(&self, query: &str) -> bool {
        self.name.to_lowercase().contains(query)
            || self.email.to_lowercase().contains(query)
            || self.id.to_string().contains(query)
    }
}

/// Input of the "add user" form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub send_welcome_email: bool,
}
