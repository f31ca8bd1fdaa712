use db::{Database, Db};
use filters::with_db;
use std::{convert::Infallible, time::Duration};
use warp::{http::StatusCode, Filter, Rejection, Reply};

use super::globals::{ErrorCode, SimpleSuccessResponse};

pub fn routes(db: &Db) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    let dump_route = warp::path!("api" / "dump")
        .and(warp::get())
        .and(with_db(db.clone()))
        .and_then(dump);

    let reset_route = warp::path!("api" / "reset")
        .and(warp::get())
        .and(with_db(db.clone()))
        .and_then(reset);

    let delay_route = warp::path!("api" / "delay")
        .and(warp::get())
        .and(with_db(db.clone()))
        .and_then(delay);

    let set_delay_route = warp::path!("api" / "delay" / u64)
        .and(warp::get())
        .and(with_db(db.clone()))
        .and_then(set_delay);

    dump_route
        .or(reset_route)
        .or(delay_route)
        .or(set_delay_route)
}

async fn dump(db: Db) -> Result<warp::reply::Response, Infallible> {
    let db = db.lock().await;

    match db.dump_as_json() {
        Ok(json) => Ok(warp::reply::with_header(json, "content-type", "application/json")
            .into_response()),
        Err(e) => {
            log::error!("could not dump the database: {}", e);
            Ok(ErrorCode::InternalServerError.reply().into_response())
        }
    }
}

// Back to the seed data
async fn reset(db: Db) -> Result<impl warp::Reply, Infallible> {
    let mut db = db.lock().await;
    db.reset();
    log::info!("database reset");
    Ok(SimpleSuccessResponse::new_reply(StatusCode::OK))
}

async fn delay(db: Db) -> Result<impl warp::Reply, Infallible> {
    let db = db.lock().await;
    let delay = db.delay_get().as_millis() as u64;
    Ok(warp::reply::json(&delay))
}

async fn set_delay(delay: u64, db: Db) -> Result<impl warp::Reply, Infallible> {
    let mut db = db.lock().await;
    db.delay_set(Duration::from_millis(delay));
    log::info!("artificial delay set to {} ms", delay);
    Ok(SimpleSuccessResponse::new_reply(StatusCode::OK))
}
