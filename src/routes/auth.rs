use serde::{Deserialize, Serialize};
use warp::{http::StatusCode, Filter, Rejection, Reply};

use super::globals::{ErrorCode, SimpleSuccessResponse};
use db::{Database, Db};
use filters::{authed, bearer_token, delayed, with_db, Forbidden};

#[derive(Deserialize)]
struct Credentials {
    email: String,
    password: String,
}

#[derive(Deserialize)]
struct PasswordResetRequest {
    email: String,
}

#[derive(Serialize)]
struct SessionResponse<'a> {
    status: &'a str,
    uid: &'a str,
    email: &'a str,
    token: &'a str,
}

#[derive(Serialize)]
struct AccountCreatedResponse<'a> {
    status: &'a str,
    uid: &'a str,
}

pub fn routes(db: &Db) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    let post_session_route = warp::path!("api" / "session")
        .and(warp::post())
        .and(warp::body::content_length_limit(1024 * 16).and(warp::body::json()))
        .and(with_db(db.clone()))
        .and_then(post_session)
        .and(delayed(db))
        .boxed();

    let delete_session_route = warp::path!("api" / "session")
        .and(warp::delete())
        .and(warp::header::<String>("Authorization"))
        .and(with_db(db.clone()))
        .and_then(delete_session)
        .and(delayed(db))
        .boxed();

    let sign_up_route = warp::path!("api" / "accounts")
        .and(warp::post())
        .and(warp::body::content_length_limit(1024 * 16).and(warp::body::json()))
        .and(with_db(db.clone()))
        .and_then(sign_up)
        .and(delayed(db))
        .boxed();

    let delete_account_route = warp::path!("api" / "accounts")
        .and(warp::delete())
        .and(authed(db))
        .and(with_db(db.clone()))
        .and_then(delete_account)
        .and(delayed(db))
        .boxed();

    let password_reset_route = warp::path!("api" / "password-reset")
        .and(warp::post())
        .and(warp::body::content_length_limit(1024 * 16).and(warp::body::json()))
        .and(with_db(db.clone()))
        .and_then(password_reset)
        .and(delayed(db))
        .boxed();

    post_session_route
        .or(delete_session_route)
        .or(sign_up_route)
        .or(delete_account_route)
        .or(password_reset_route)
}

async fn post_session(request: Credentials, db: Db) -> Result<impl warp::Reply, warp::Rejection> {
    let mut db = db.lock().await;

    match db.auth_sign_in(&request.email, &request.password) {
        Ok((account, token)) => Ok(warp::reply::json(&SessionResponse {
            status: "success",
            uid: &account.uid,
            email: &account.email,
            token: &token,
        })),
        Err(_) => Err(warp::reject::custom(Forbidden)),
    }
}

async fn delete_session(
    authorization: String,
    db: Db,
) -> Result<impl warp::Reply, warp::Rejection> {
    let mut db = db.lock().await;

    let logged_out = match bearer_token(&authorization) {
        Some(token) => db.auth_sign_out(token),
        None => false,
    };

    if logged_out {
        Ok(warp::reply::json(&SimpleSuccessResponse::new()))
    } else {
        Err(warp::reject::custom(Forbidden))
    }
}

async fn sign_up(request: Credentials, db: Db) -> Result<impl warp::Reply, warp::Rejection> {
    let mut db = db.lock().await;

    match db.auth_sign_up(&request.email, &request.password) {
        Ok(account) => {
            log::info!("account {} created for {}", account.uid, account.email);
            Ok(warp::reply::with_status(
                warp::reply::json(&AccountCreatedResponse {
                    status: "success",
                    uid: &account.uid,
                }),
                StatusCode::CREATED,
            ))
        }
        Err(e) => Ok(ErrorCode::from(e).reply()),
    }
}

async fn delete_account(uid: String, db: Db) -> Result<impl warp::Reply, warp::Rejection> {
    let mut db = db.lock().await;

    if db.auth_delete_account(&uid) {
        log::info!("account {} deleted", uid);
        Ok(SimpleSuccessResponse::new_reply(StatusCode::OK))
    } else {
        Ok(ErrorCode::UserNotFound.reply())
    }
}

async fn password_reset(
    request: PasswordResetRequest,
    db: Db,
) -> Result<impl warp::Reply, warp::Rejection> {
    let mut db = db.lock().await;

    match db.auth_request_password_reset(&request.email) {
        Ok(()) => Ok(SimpleSuccessResponse::new_reply(StatusCode::OK)),
        Err(e) => Ok(ErrorCode::from(e).reply()),
    }
}
