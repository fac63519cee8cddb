#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// I/O or database error reported by the backend.
    #[error("storage backend error: {0}")]
    Backend(String),
    #[error("no undo session is open")]
    NoOpenSession,
}
