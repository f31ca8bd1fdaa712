use db::{AuthError, DocumentError, QueryError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failure of a user action. Every variant is terminal for the action that triggered it and is
/// shown to the user once.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("No internet connection, please try again later")]
    NoNetwork,
    #[error("The requested item could not be found")]
    NotFound,
    #[error("This item already exists")]
    AlreadyExists,
    #[error("The email or password is incorrect")]
    InvalidCredential,
    #[error("An account already exists for this email")]
    UserCollision,
    #[error("The password must be at least {} characters", db::MIN_PASSWORD_LENGTH)]
    WeakPassword,
    #[error("The email address is not valid")]
    InvalidEmail,
    #[error("No account exists for this email")]
    UserNotFound,
    #[error("You must be signed in to do this")]
    NotSignedIn,
    #[error("You have already reviewed this course")]
    AlreadyReviewed,
    #[error("Please wait {retry_after} seconds before trying again")]
    TooManyRequests { retry_after: u64 },
    #[error(transparent)]
    Validation(#[from] Validation),
    #[error("Something went wrong: {0}")]
    Backend(String),
}

/// Input rejected before reaching the backend.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Validation {
    #[error("Please enter your name")]
    EmptyName,
    #[error("Please enter your surname")]
    EmptySurname,
    #[error("The passwords do not match")]
    PasswordsDoNotMatch,
    #[error("The year must be between 1 and {}", crate::validation::MAX_YEAR)]
    InvalidYear,
    #[error("Please pick a faculty and a department")]
    MissingDepartment,
    #[error("The rating must be between {} and {}", crate::validation::MIN_RATING, crate::validation::MAX_RATING)]
    RatingOutOfRange,
    #[error("Please write a comment")]
    EmptyComment,
    #[error("Comments are limited to {} characters", crate::validation::MAX_COMMENT_LENGTH)]
    CommentTooLong,
}

impl From<AuthError> for Error {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidCredential => Self::InvalidCredential,
            AuthError::UserCollision => Self::UserCollision,
            AuthError::WeakPassword => Self::WeakPassword,
            AuthError::InvalidEmail => Self::InvalidEmail,
            AuthError::UserNotFound => Self::UserNotFound,
        }
    }
}

impl From<DocumentError> for Error {
    fn from(e: DocumentError) -> Self {
        match e {
            DocumentError::NotFound => Self::NotFound,
            DocumentError::AlreadyExists => Self::AlreadyExists,
            other => Self::Backend(other.to_string()),
        }
    }
}

impl From<QueryError> for Error {
    fn from(e: QueryError) -> Self {
        Self::Backend(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Backend(format!("malformed document: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_errors_are_classified() {
        assert_eq!(Error::from(AuthError::UserCollision), Error::UserCollision);
        assert_eq!(Error::from(DocumentError::NotFound), Error::NotFound);
        assert!(matches!(
            Error::from(DocumentError::NotAnObject),
            Error::Backend(_)
        ));
    }

    #[test]
    fn messages_are_user_facing() {
        assert_eq!(
            Error::TooManyRequests { retry_after: 42 }.to_string(),
            "Please wait 42 seconds before trying again"
        );
        assert_eq!(
            Error::from(Validation::EmptyComment).to_string(),
            "Please write a comment"
        );
    }
}
