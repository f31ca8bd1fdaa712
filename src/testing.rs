//! Backends for the unit tests: a seeded in-memory dev backend and a wrapper that counts calls
//! and fails reads of chosen collections.

use async_trait::async_trait;
use db::{
    models::{COMMENT_REVIEWS, COURSES},
    new_memory_db, Database, Db, FieldUpdate, Query,
};
use serde_json::{json, Value};
use std::{
    collections::HashSet,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

use crate::{
    backend::{DocumentStore, LocalBackend},
    connectivity::NetworkMonitor,
    error::{Error, Result},
    repositories::Repositories,
};

pub async fn seeded_db() -> Db {
    let db = new_memory_db();
    db.lock().await.reset();
    db
}

pub async fn seeded_repositories() -> (Db, Repositories) {
    let db = seeded_db().await;
    let repos = Repositories::local(db.clone(), Arc::new(NetworkMonitor::default()));
    (db, repos)
}

pub struct FlakyStore {
    inner: LocalBackend,
    failing: Mutex<HashSet<String>>,
    failing_writes: Mutex<HashSet<String>>,
    queries: AtomicUsize,
}

impl FlakyStore {
    pub fn fail_reads_of(&self, collection: &str) {
        self.failing.lock().unwrap().insert(collection.to_string());
    }

    pub fn fail_writes_of(&self, collection: &str) {
        self.failing_writes
            .lock()
            .unwrap()
            .insert(collection.to_string());
    }

    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    fn check(&self, collection: &str) -> Result<()> {
        if self.failing.lock().unwrap().contains(collection) {
            Err(Error::Backend(format!("{} is unavailable", collection)))
        } else {
            Ok(())
        }
    }

    fn check_write(&self, collection: &str) -> Result<()> {
        if self.failing_writes.lock().unwrap().contains(collection) {
            Err(Error::Backend(format!("{} is read-only", collection)))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl DocumentStore for FlakyStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>> {
        self.check(collection)?;
        self.inner.get(collection, id).await
    }

    async fn set(&self, collection: &str, id: &str, data: Value) -> Result<()> {
        self.check_write(collection)?;
        self.inner.set(collection, id, data).await
    }

    async fn create(&self, collection: &str, id: &str, data: Value) -> Result<()> {
        self.check_write(collection)?;
        self.inner.create(collection, id, data).await
    }

    async fn add(&self, collection: &str, data: Value) -> Result<String> {
        self.check_write(collection)?;
        self.inner.add(collection, data).await
    }

    async fn update(&self, collection: &str, id: &str, updates: Vec<FieldUpdate>) -> Result<()> {
        self.check_write(collection)?;
        self.inner.update(collection, id, updates).await
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<()> {
        self.check_write(collection)?;
        self.inner.delete(collection, id).await
    }

    async fn query(&self, query: Query) -> Result<Vec<Value>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.check(&query.collection)?;
        self.inner.query(query).await
    }
}

/// Repositories over `db` whose document reads go through a `FlakyStore`.
pub fn flaky_repositories(db: Db) -> (Arc<FlakyStore>, Repositories) {
    let local = Arc::new(LocalBackend::new(db.clone()));
    let store = Arc::new(FlakyStore {
        inner: LocalBackend::new(db),
        failing: Mutex::new(HashSet::new()),
        failing_writes: Mutex::new(HashSet::new()),
        queries: AtomicUsize::new(0),
    });

    let repos = Repositories::new(
        store.clone(),
        local,
        Arc::new(NetworkMonitor::default()),
    );
    (store, repos)
}

/// Replaces the seeded courses and reviews with the given ones.
pub async fn replace_courses(db: &Db, courses: &[(&str, f64)]) {
    let mut locked = db.lock().await;

    for collection in [COMMENT_REVIEWS, COURSES] {
        let ids: Vec<String> = locked
            .document_query(&Query::new(collection))
            .unwrap()
            .into_iter()
            .map(|(id, _)| id.clone())
            .collect();

        for id in ids {
            locked.document_delete(collection, &id);
        }
    }

    for (i, (id, rating)) in courses.iter().enumerate() {
        // Reviews first, writing them refreshes the course rating
        locked.document_set(
            COMMENT_REVIEWS,
            &format!("{}_student-ada", id),
            json!({
                "student_id": "student-ada",
                "course_id": id,
                "rating": 3,
                "comment": format!("review of {}", id),
                "created_at": 1_700_000_000_000u64 + i as u64,
            }),
        )
        .unwrap();

        locked.document_set(
            COURSES,
            id,
            json!({
                "code": id.to_uppercase(),
                "name": format!("Course {}", id),
                "faculty_id": "engineering",
                "credits": 3,
                "ects": 6,
                "average_rating": rating,
                "rating_count": 1,
            }),
        )
        .unwrap();
    }
}
