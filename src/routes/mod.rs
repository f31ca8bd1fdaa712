use std::convert::Infallible;
use warp::{Filter, Rejection, Reply};

use db::Db;
use filters::Forbidden;

mod auth;
mod documents;
mod globals;
mod manage;

pub use globals::{ErrorCode, FailureResponse};

pub fn routes(db: &Db) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    manage::routes(db)
        .or(auth::routes(db))
        .or(documents::routes(db))
}

pub async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let error_code;

    if err.is_not_found() {
        error_code = ErrorCode::NotFound;
    } else if let Some(Forbidden) = err.find() {
        error_code = ErrorCode::InvalidCredentials;
    } else if err.find::<warp::reject::MissingHeader>().is_some() {
        error_code = ErrorCode::InsufficientAuthorization;
    } else if err.find::<warp::filters::body::BodyDeserializeError>().is_some() {
        error_code = ErrorCode::MalformedData;
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        error_code = ErrorCode::MethodNotAllowed;
    } else {
        log::warn!("unhandled rejection: {:?}", err);
        error_code = ErrorCode::InternalServerError;
    }

    Ok(FailureResponse::new_reply(error_code, error_code.status()))
}
