/// Failure reported by a persistence or upstream collaborator.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// A write collided with a uniqueness constraint (constraint name attached).
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    /// The collaborator is unavailable or failed for any other reason.
    #[error("{0}")]
    Backend(String),
}

/// Domain error taxonomy shared by the session and payment services.
///
/// Everything except [`CoreError::StorageFailure`] and [`CoreError::Internal`]
/// is an expected outcome the caller can act on. `InvalidCredentials`,
/// `InvalidSession` and `SessionExpired` deliberately carry no detail.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Email already registered")]
    DuplicateIdentity,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Malformed refresh credential")]
    MalformedCredential,

    #[error("Invalid session")]
    InvalidSession,

    #[error("Session expired")]
    SessionExpired,

    #[error("Invalid or expired access token")]
    InvalidToken,

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Payment event has no payment reference")]
    MissingReference,

    #[error("Payment event has no user")]
    MissingUser,

    #[error("Storage failure: {0}")]
    StorageFailure(#[from] StoreError),

    /// A primitive (hashing, signing, task join) failed unexpectedly.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for [`CoreError::NotFound`].
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
