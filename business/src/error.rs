use thiserror::Error;

/// Failure reported by a [`UserSource`](crate::UserSource).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    #[error("data source unavailable: {0}")]
    Unavailable(String),

    #[error("request rejected: {0}")]
    Rejected(String),
}

#[derive(Debug, Error)]
pub enum TableError {
    #[error(transparent)]
    States(#[from] roster_states::Error),

    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_env::Error),

    #[error("Page size must be positive")]
    ZeroPageSize,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownVariant {
    kind: &'static str,
    value: String,
}

impl UnknownVariant {
    pub fn new(kind: &'static str, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}
