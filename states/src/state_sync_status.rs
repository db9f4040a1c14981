#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StateSyncStatus {
    /// Registered but never computed.
    #[default]
    BeforeInit,
    /// An upstream value changed since the last compute.
    Dirty,
    Clean,
}
