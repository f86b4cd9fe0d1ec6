use axum::http::StatusCode;
use thiserror::Error;

/// Caller-side problems detected before any write is attempted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("slug must not be empty")]
    EmptySlug,

    #[error("slug must be at least {min} characters")]
    SlugTooShort { min: usize },

    #[error("slug may only contain lower-case letters, digits and single hyphens")]
    MalformedSlug,

    #[error("this URL is taken")]
    SlugTaken,

    #[error("identity provider subject id must not be empty")]
    MissingIdentity,
}

/// How the backend failed. `Conflict` and `Unavailable` must stay apart:
/// one means "pick another slug", the other means "try again later".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageErrorKind {
    /// A uniqueness constraint rejected the write.
    Conflict,
    /// The backend could not be reached (I/O, pool timeout, pool closed).
    Unavailable,
    /// The backend rejected the statement for any other reason.
    Query,
    /// A stored row could not be decoded into its record type.
    Decode,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("storage error ({kind:?}): {message}")]
pub struct StorageError {
    pub kind: StorageErrorKind,
    pub message: String,
}

impl StorageError {
    pub fn new(kind: StorageErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StorageErrorKind::Conflict, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(StorageErrorKind::Unavailable, message)
    }

    pub fn is_conflict(&self) -> bool {
        self.kind == StorageErrorKind::Conflict
    }

    pub fn is_unavailable(&self) -> bool {
        self.kind == StorageErrorKind::Unavailable
    }
}

impl From<sqlx::Error> for StorageError {
    fn from(error: sqlx::Error) -> Self {
        let kind = match &error {
            sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
                StorageErrorKind::Conflict
            }
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => StorageErrorKind::Unavailable,
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => StorageErrorKind::Decode,
            _ => StorageErrorKind::Query,
        };
        StorageError::new(kind, error.to_string())
    }
}

/// The backend handle could not be built from the environment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),

    #[error("unknown store backend {0:?}, expected \"postgres\" or \"memory\"")]
    UnknownBackend(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("store is not configured: {0}")]
    Configuration(#[from] ConfigError),
}

impl StoreError {
    /// True when the slug was claimed by someone else, whether the advisory
    /// pre-check or the write-time constraint noticed it.
    pub fn is_slug_taken(&self) -> bool {
        matches!(
            self,
            StoreError::Validation(ValidationError::SlugTaken)
        ) || matches!(self, StoreError::Storage(e) if e.is_conflict())
    }
}

/// Status and message shown to API callers. A taken slug and an unreachable
/// store must never read the same.
pub fn api_error(e: StoreError) -> (StatusCode, String) {
    match &e {
        StoreError::Validation(ValidationError::SlugTaken) => {
            (StatusCode::CONFLICT, "this URL is taken".into())
        }
        StoreError::Validation(v) => (StatusCode::BAD_REQUEST, v.to_string()),
        StoreError::Storage(s) if s.is_conflict() => {
            (StatusCode::CONFLICT, "this URL is taken".into())
        }
        StoreError::Storage(s) if s.is_unavailable() => (
            StatusCode::SERVICE_UNAVAILABLE,
            "could not reach the server".into(),
        ),
        StoreError::Storage(_) | StoreError::Configuration(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}
