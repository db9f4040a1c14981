//! Where user records come from.
//!
//! The table only talks to a [`UserSource`]. [`MockUserSource`] generates random records
//! behind simulated latency; [`MemoryUserSource`] serves a fixed collection and can be told
//! to fail, which is what the table tests drive.

use std::{
    collections::BTreeSet,
    fmt::Debug,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, Utc};
use log::{debug, info};
use rand::{
    Rng,
    distributions::{Distribution, Standard},
    seq::SliceRandom,
};
use roster_states::State;

use crate::{NewUser, SourceError, TableConfig, User, UserId};

#[async_trait]
pub trait UserSource: Send + Sync + Debug {
    async fn fetch_users(&self) -> Result<Vec<User>, SourceError>;

    async fn delete_users(&self, ids: &BTreeSet<UserId>) -> Result<(), SourceError>;

    async fn create_user(&self, draft: &NewUser) -> Result<(), SourceError>;
}

#[derive(Debug, Clone)]
pub struct UserSourceState {
    pub inner: Arc<dyn UserSource>,
}

impl UserSourceState {
    pub fn new(inner: Arc<dyn UserSource>) -> Self {
        Self { inner }
    }
}

impl State for UserSourceState {}

const MOCK_NAMES: [&str; 10] = [
    "Ivan Petrov",
    "Maria Sidorova",
    "Alexey Ivanov",
    "Elena Kuznetsova",
    "Dmitry Smirnov",
    "Olga Popova",
    "Sergey Vasiliev",
    "Anna Sokolova",
    "Nikolay Mikhailov",
    "Tatiana Novikova",
];

const MOCK_YEAR: i32 = 2020;
const MOCK_ACTIVITY_WINDOW_MS: i64 = 30 * 24 * 60 * 60 * 1000;

/// Random records with ids `1..=count`.
///
/// Registration dates fall on days 1 to 28 of a month of 2020, last activity within the
/// 30 days before `now`.
pub fn generate_mock_users<R: Rng + ?Sized>(
    count: usize,
    rng: &mut R,
    now: DateTime<Utc>,
) -> Vec<User> {
    (1..=count as UserId)
        .map(|id| {
            let name = MOCK_NAMES.choose(rng).copied().unwrap_or_default();
            User {
                id,
                name: format!("{name} {id}"),
                avatar: String::new(),
                email: format!("user{id}@example.com"),
                registration_date: mock_registration_date(rng),
                last_activity: now
                    - TimeDelta::milliseconds(rng.gen_range(0..MOCK_ACTIVITY_WINDOW_MS)),
                login_count: rng.gen_range(0..500),
                posts_count: rng.gen_range(0..100),
                comments_count: rng.gen_range(0..300),
                status: Standard.sample(rng),
                role: Standard.sample(rng),
            }
        })
        .collect()
}

fn mock_registration_date<R: Rng + ?Sized>(rng: &mut R) -> DateTime<Utc> {
    let month = rng.gen_range(1..=12);
    let day = rng.gen_range(1..=28);
    NaiveDate::from_ymd_opt(MOCK_YEAR, month, day)
        .unwrap_or(NaiveDate::MIN)
        .and_time(NaiveTime::default())
        .and_utc()
}

/// Simulated backend: fresh random records on every fetch, every write succeeds.
#[derive(Debug, Clone)]
pub struct MockUserSource {
    count: usize,
    load_latency: Duration,
    delete_latency: Duration,
    save_latency: Duration,
}

impl MockUserSource {
    pub fn from_config(config: &TableConfig) -> Self {
        Self {
            count: config.mock_count,
            load_latency: config.load_latency(),
            delete_latency: config.delete_latency(),
            save_latency: config.save_latency(),
        }
    }
}

impl Default for MockUserSource {
    fn default() -> Self {
        Self::from_config(&TableConfig::default())
    }
}

#[async_trait]
impl UserSource for MockUserSource {
    async fn fetch_users(&self) -> Result<Vec<User>, SourceError> {
        tokio::time::sleep(self.load_latency).await;
        let users = generate_mock_users(self.count, &mut rand::thread_rng(), Utc::now());
        debug!("Generated {} mock users", users.len());
        Ok(users)
    }

    async fn delete_users(&self, ids: &BTreeSet<UserId>) -> Result<(), SourceError> {
        tokio::time::sleep(self.delete_latency).await;
        info!("Deleting users: {ids:?}");
        Ok(())
    }

    async fn create_user(&self, draft: &NewUser) -> Result<(), SourceError> {
        tokio::time::sleep(self.save_latency).await;
        info!("Creating user: {draft:?}");
        Ok(())
    }
}

/// In-process store over a fixed collection.
///
/// While a failure is set every call returns it without touching the store.
#[derive(Debug, Default)]
pub struct MemoryUserSource {
    users: Mutex<Vec<User>>,
    failure: Mutex<Option<SourceError>>,
    latency: Duration,
}

impl MemoryUserSource {
    pub fn new(users: Vec<User>) -> Self {
        Self {
            users: Mutex::new(users),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn fail_with(&self, error: SourceError) {
        if let Ok(mut failure) = self.failure.lock() {
            *failure = Some(error);
        }
    }

    pub fn recover(&self) {
        if let Ok(mut failure) = self.failure.lock() {
            *failure = None;
        }
    }

    pub fn stored(&self) -> Vec<User> {
        self.users
            .lock()
            .map(|users| users.clone())
            .unwrap_or_default()
    }

    fn check(&self) -> Result<(), SourceError> {
        let failure = self.failure.lock().map_err(poisoned)?;
        match failure.as_ref() {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

fn poisoned<T>(_: T) -> SourceError {
    SourceError::Unavailable("store lock poisoned".to_owned())
}

#[async_trait]
impl UserSource for MemoryUserSource {
    async fn fetch_users(&self) -> Result<Vec<User>, SourceError> {
        tokio::time::sleep(self.latency).await;
        self.check()?;
        let users = self.users.lock().map_err(poisoned)?;
        Ok(users.clone())
    }

    async fn delete_users(&self, ids: &BTreeSet<UserId>) -> Result<(), SourceError> {
        tokio::time::sleep(self.latency).await;
        self.check()?;
        let mut users = self.users.lock().map_err(poisoned)?;
        users.retain(|user| !ids.contains(&user.id));
        Ok(())
    }

    async fn create_user(&self, draft: &NewUser) -> Result<(), SourceError> {
        tokio::time::sleep(self.latency).await;
        self.check()?;
        let mut users = self.users.lock().map_err(poisoned)?;
        let id = users.iter().map(|user| user.id).max().unwrap_or(0) + 1;
        users.insert(0, User::from_draft(id, draft, Utc::now()));
        Ok(())
    }
}
