use thiserror::Error;

/// Error type shared by the gateways and the entity stores.
///
/// Store actions catch every variant at the store boundary and convert it
/// into a rollback plus a notification; nothing here escapes as a panic.
/// `Unauthorized` is the one class with a side effect beyond the store: it
/// terminates the session before it is reported.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Transport-level failure raised outside reqwest (fakes, injected
    /// failures in tests).
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Not found: {0}")]
    NotFound(String),

    /// Server-reported version mismatch (HTTP 409). The stores keep
    /// last-write-wins semantics and attach no version bookkeeping, but the
    /// variant keeps conflicts distinguishable from transport failures.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl StoreError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, StoreError::Unauthorized)
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
