use serde::Serialize;
use serde_json::Value;
use warp::{http::StatusCode, Filter, Rejection, Reply};

use super::globals::{ErrorCode, SimpleSuccessResponse};
use db::{models::ALL_COLLECTIONS, Database, Db, FieldUpdate, Query};
use filters::{authed, delayed, with_db};

#[derive(Serialize)]
struct DocumentResponse<'a> {
    status: &'static str,
    document: &'a Value,
}

#[derive(Serialize)]
struct DocumentAddedResponse {
    status: &'static str,
    id: String,
}

#[derive(Serialize)]
struct QueryResponse<'a> {
    status: &'static str,
    documents: Vec<&'a Value>,
}

pub fn routes(db: &Db) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    let get_route = warp::path!("api" / "documents" / String / String)
        .and(warp::get())
        .and(with_db(db.clone()))
        .and_then(get)
        .and(delayed(db))
        .boxed();

    let set_route = warp::path!("api" / "documents" / String / String)
        .and(warp::put())
        .and(authed(db))
        .and(warp::body::content_length_limit(1024 * 64).and(warp::body::json()))
        .and(with_db(db.clone()))
        .and_then(set)
        .and(delayed(db))
        .boxed();

    let create_route = warp::path!("api" / "documents" / String / String)
        .and(warp::post())
        .and(authed(db))
        .and(warp::body::content_length_limit(1024 * 64).and(warp::body::json()))
        .and(with_db(db.clone()))
        .and_then(create)
        .and(delayed(db))
        .boxed();

    let update_route = warp::path!("api" / "documents" / String / String)
        .and(warp::patch())
        .and(authed(db))
        .and(warp::body::content_length_limit(1024 * 16).and(warp::body::json()))
        .and(with_db(db.clone()))
        .and_then(update)
        .and(delayed(db))
        .boxed();

    let delete_route = warp::path!("api" / "documents" / String / String)
        .and(warp::delete())
        .and(authed(db))
        .and(with_db(db.clone()))
        .and_then(delete)
        .and(delayed(db))
        .boxed();

    let add_route = warp::path!("api" / "documents" / String)
        .and(warp::post())
        .and(authed(db))
        .and(warp::body::content_length_limit(1024 * 64).and(warp::body::json()))
        .and(with_db(db.clone()))
        .and_then(add)
        .and(delayed(db))
        .boxed();

    let query_route = warp::path!("api" / "query")
        .and(warp::post())
        .and(warp::body::content_length_limit(1024 * 16).and(warp::body::json()))
        .and(with_db(db.clone()))
        .and_then(query)
        .and(delayed(db))
        .boxed();

    get_route
        .or(set_route)
        .or(create_route)
        .or(update_route)
        .or(delete_route)
        .or(add_route)
        .or(query_route)
}

fn known(collection: &str) -> bool {
    ALL_COLLECTIONS.contains(&collection)
}

async fn get(
    collection: String,
    id: String,
    db: Db,
) -> Result<warp::reply::Response, warp::Rejection> {
    if !known(&collection) {
        return Ok(ErrorCode::UnknownCollection.reply().into_response());
    }

    let db = db.lock().await;

    match db.document_get(&collection, &id) {
        Some(document) => Ok(warp::reply::json(&DocumentResponse {
            status: "success",
            document,
        })
        .into_response()),
        None => Ok(ErrorCode::NotFound.reply().into_response()),
    }
}

async fn set(
    collection: String,
    id: String,
    uid: String,
    data: Value,
    db: Db,
) -> Result<impl warp::Reply, warp::Rejection> {
    if !known(&collection) {
        return Ok(ErrorCode::UnknownCollection.reply());
    }

    let mut db = db.lock().await;

    match db.document_set(&collection, &id, data) {
        Ok(()) => {
            log::debug!("{} wrote {}/{}", uid, collection, id);
            Ok(SimpleSuccessResponse::new_reply(StatusCode::OK))
        }
        Err(e) => Ok(ErrorCode::from(&e).reply()),
    }
}

async fn create(
    collection: String,
    id: String,
    uid: String,
    data: Value,
    db: Db,
) -> Result<impl warp::Reply, warp::Rejection> {
    if !known(&collection) {
        return Ok(ErrorCode::UnknownCollection.reply());
    }

    let mut db = db.lock().await;

    match db.document_create(&collection, &id, data) {
        Ok(()) => {
            log::debug!("{} created {}/{}", uid, collection, id);
            Ok(SimpleSuccessResponse::new_reply(StatusCode::CREATED))
        }
        Err(e) => Ok(ErrorCode::from(&e).reply()),
    }
}

async fn update(
    collection: String,
    id: String,
    uid: String,
    updates: Vec<FieldUpdate>,
    db: Db,
) -> Result<impl warp::Reply, warp::Rejection> {
    if !known(&collection) {
        return Ok(ErrorCode::UnknownCollection.reply());
    }

    let mut db = db.lock().await;

    match db.document_update(&collection, &id, &updates) {
        Ok(changed) => {
            log::debug!("{} updated {}/{} (changed: {})", uid, collection, id, changed);
            Ok(SimpleSuccessResponse::new_reply(StatusCode::OK))
        }
        Err(e) => Ok(ErrorCode::from(&e).reply()),
    }
}

// Deleting a missing document is not an error
async fn delete(
    collection: String,
    id: String,
    uid: String,
    db: Db,
) -> Result<impl warp::Reply, warp::Rejection> {
    if !known(&collection) {
        return Ok(ErrorCode::UnknownCollection.reply());
    }

    let mut db = db.lock().await;

    if db.document_delete(&collection, &id) {
        log::debug!("{} deleted {}/{}", uid, collection, id);
    }

    Ok(SimpleSuccessResponse::new_reply(StatusCode::OK))
}

async fn add(
    collection: String,
    uid: String,
    data: Value,
    db: Db,
) -> Result<warp::reply::Response, warp::Rejection> {
    if !known(&collection) {
        return Ok(ErrorCode::UnknownCollection.reply().into_response());
    }

    let mut db = db.lock().await;

    match db.document_add(&collection, data) {
        Ok(id) => {
            log::debug!("{} added {}/{}", uid, collection, id);
            Ok(warp::reply::with_status(
                warp::reply::json(&DocumentAddedResponse {
                    status: "success",
                    id,
                }),
                StatusCode::CREATED,
            )
            .into_response())
        }
        Err(e) => Ok(ErrorCode::from(&e).reply().into_response()),
    }
}

async fn query(query: Query, db: Db) -> Result<warp::reply::Response, warp::Rejection> {
    if !known(&query.collection) {
        return Ok(ErrorCode::UnknownCollection.reply().into_response());
    }

    let db = db.lock().await;

    match db.document_query(&query) {
        Ok(rows) => Ok(warp::reply::json(&QueryResponse {
            status: "success",
            documents: rows.into_iter().map(|(_, document)| document).collect(),
        })
        .into_response()),
        Err(e) => Ok(ErrorCode::from(&e).reply().into_response()),
    }
}
