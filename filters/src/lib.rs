use db::Db;
use std::convert::Infallible;
use warp::Filter;

mod authed;
mod delayed;

pub use authed::{authed, bearer_token, Forbidden};
pub use delayed::delayed;

/// Hands a clone of the shared database handle to the route
pub fn with_db(db: Db) -> impl Filter<Extract = (Db,), Error = Infallible> + Clone {
    warp::any().map(move || db.clone())
}
