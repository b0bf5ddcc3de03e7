use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(String),

    #[error("Activity is full")]
    CapacityExceeded,

    #[error("Student is not signed up for this activity")]
    NotRegistered,

    #[error("max_participants ({requested}) is below the current enrollment ({enrolled})")]
    CapacityBelowEnrollment { requested: i32, enrolled: u64 },

    #[error("Incorrect username or password")]
    InvalidCredentials,

    #[error("Could not validate credentials")]
    InvalidToken,

    #[error("Insufficient permissions")]
    Forbidden,

    #[error("Weak password (minimum 8 characters required)")]
    WeakPassword,

    #[error("Invalid email address")]
    InvalidEmail,

    #[error("max_participants must be a positive integer")]
    InvalidMaxParticipants,

    #[error("{0} must not be empty")]
    EmptyField(&'static str),

    #[error("Password hashing failed: {0}")]
    PasswordHash(String),

    #[error("Failed to issue token: {0}")]
    TokenIssue(String),
}

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Not found")]
    NotFound,

    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}
