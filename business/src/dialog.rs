//! Host-provided dialogs: a blocking yes/no prompt and a fire-and-forget notification.

use std::{
    fmt::{Debug, Formatter},
    sync::Arc,
};

use log::warn;
use roster_states::State;

pub trait Confirmation: Send + Sync {
    fn confirm(&self, message: &str) -> bool;
}

impl<F> Confirmation for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn confirm(&self, message: &str) -> bool {
        self(message)
    }
}

/// Answers every prompt the same way.
#[derive(Debug, Clone, Copy)]
pub struct AutoConfirm(pub bool);

impl Confirmation for AutoConfirm {
    fn confirm(&self, _message: &str) -> bool {
        self.0
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

impl<F> Notifier for F
where
    F: Fn(&str) + Send + Sync,
{
    fn notify(&self, message: &str) {
        self(message)
    }
}

/// Routes notifications to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str) {
        warn!("{message}");
    }
}

#[derive(Clone)]
pub struct NotifierState {
    pub inner: Arc<dyn Notifier>,
}

impl NotifierState {
    pub fn new(inner: Arc<dyn Notifier>) -> Self {
        Self { inner }
    }
}

impl Debug for NotifierState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("NotifierState")
    }
}

impl State for NotifierState {}
