use crate::with_db;
use db::{Database, Db};

use warp::{Filter, Rejection};

/// Filter that checks if the caller holds a valid session token, extracting the account uid
pub fn authed(db: &Db) -> impl Filter<Extract = (String,), Error = Rejection> + Clone {
    with_db(db.clone())
        .and(warp::header::optional::<String>("Authorization"))
        .and_then(guard)
}

#[derive(Debug)]
pub struct Forbidden;

impl warp::reject::Reject for Forbidden {}

/// Extracts the token of a `Bearer <token>` authorization header.
pub fn bearer_token(authorization: &str) -> Option<&str> {
    let (auth_type, token) = {
        let mut parts = authorization.splitn(2, ' ');
        (parts.next().unwrap_or(""), parts.next().unwrap_or(""))
    };

    if auth_type.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token)
    } else {
        None
    }
}

async fn guard(db: Db, authorization: Option<String>) -> Result<String, warp::Rejection> {
    let token = match authorization.as_deref().and_then(bearer_token) {
        Some(token) => token,
        None => return Err(warp::reject::custom(Forbidden)),
    };

    let db = db.lock().await;

    match db.auth_get_account(token) {
        Some(account) => Ok(account.uid.clone()),
        None => Err(warp::reject::custom(Forbidden)),
    }
}

#[cfg(test)]
mod tests {
    use super::bearer_token;

    #[test]
    fn parses_bearer_header() {
        assert_eq!(bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(bearer_token("bearer abc"), Some("abc"));
        assert_eq!(bearer_token("Basic abc"), None);
        assert_eq!(bearer_token("Bearer"), None);
    }
}
