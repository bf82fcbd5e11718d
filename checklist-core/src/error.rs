use thiserror::Error as ThisError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("username `{0}` already exists")]
    DuplicateUsername(String),

    #[error("email `{0}` is already registered")]
    DuplicateEmail(String),

    #[error(transparent)]
    Authentication(#[from] AuthFailure),

    #[error("could not open database: {0}")]
    Open(#[source] sqlx::Error),

    #[error("could not initialize database schema: {0}")]
    Schema(#[source] sqlx::Error),

    #[error("database error: {0}")]
    Store(#[from] sqlx::Error),

    #[error("password hashing failed: {0}")]
    PasswordHash(String),

    #[error("could not find a directory for application data")]
    NoDataDir,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A required form field was left blank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ThisError)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("please enter both username and password")]
    MissingCredentials,
}

/// Both variants deny the session identically; they only differ in messaging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ThisError)]
pub enum AuthFailure {
    #[error("username does not exist")]
    UnknownUsername,

    #[error("incorrect password")]
    WrongPassword,
}
