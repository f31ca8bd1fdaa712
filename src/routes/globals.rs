use db::{AuthError, DocumentError, QueryError};
use serde::Serialize;
use warp::{http::StatusCode, reply};

#[derive(Serialize)]
pub struct FailureResponse {
    status: &'static str,
    code: ErrorCode,
}

impl FailureResponse {
    pub fn new(code: ErrorCode) -> Self {
        Self {
            status: "error",
            code,
        }
    }

    pub fn new_reply(code: ErrorCode, status: StatusCode) -> reply::WithStatus<reply::Json> {
        reply::with_status(reply::json(&Self::new(code)), status)
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    InvalidCredentials,
    InsufficientAuthorization,
    MalformedData,
    PasswordTooSimple,
    InvalidEmail,
    EmailAlreadyUsed,
    UserNotFound,
    UnknownCollection,
    AlreadyExists,
    NotAnArray,
    NotANumber,
    InvalidQuery,
    MethodNotAllowed,
    InternalServerError,
    NotFound,
}

impl From<AuthError> for ErrorCode {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidCredential => Self::InvalidCredentials,
            AuthError::UserCollision => Self::EmailAlreadyUsed,
            AuthError::WeakPassword => Self::PasswordTooSimple,
            AuthError::InvalidEmail => Self::InvalidEmail,
            AuthError::UserNotFound => Self::UserNotFound,
        }
    }
}

impl From<&DocumentError> for ErrorCode {
    fn from(e: &DocumentError) -> Self {
        match e {
            DocumentError::NotFound => Self::NotFound,
            DocumentError::AlreadyExists => Self::AlreadyExists,
            DocumentError::NotAnObject => Self::MalformedData,
            DocumentError::NotAnArray(_) => Self::NotAnArray,
            DocumentError::NotANumber(_) => Self::NotANumber,
        }
    }
}

impl From<&QueryError> for ErrorCode {
    fn from(_: &QueryError) -> Self {
        Self::InvalidQuery
    }
}

impl ErrorCode {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidCredentials => StatusCode::FORBIDDEN,
            Self::InsufficientAuthorization => StatusCode::UNAUTHORIZED,
            Self::UserNotFound | Self::UnknownCollection | Self::NotFound => StatusCode::NOT_FOUND,
            Self::EmailAlreadyUsed | Self::AlreadyExists => StatusCode::CONFLICT,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
            Self::MalformedData
            | Self::PasswordTooSimple
            | Self::InvalidEmail
            | Self::NotAnArray
            | Self::NotANumber
            | Self::InvalidQuery => StatusCode::BAD_REQUEST,
        }
    }

    pub fn reply(self) -> reply::WithStatus<reply::Json> {
        FailureResponse::new_reply(self, self.status())
    }
}

#[derive(Serialize)]
pub struct SimpleSuccessResponse {
    status: &'static str,
}

impl SimpleSuccessResponse {
    pub fn new() -> Self {
        Self { status: "success" }
    }

    pub fn new_reply(status: StatusCode) -> reply::WithStatus<reply::Json> {
        reply::with_status(reply::json(&Self::new()), status)
    }
}
