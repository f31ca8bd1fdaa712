//! Thin wrappers around the remote calls, one per entity. Every operation checks connectivity
//! first and returns a `Result` rather than failing past its boundary.

use db::{
    models::Collection, new_memory_db, query::MAX_ID_IN, Db, FieldUpdate, Filter, Query,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::{collections::HashMap, sync::Arc};

use crate::{
    backend::{AuthService, DocumentStore, LocalBackend},
    connectivity::{Connectivity, NetworkMonitor},
    error::{Error, Result},
};

mod auth;
mod catalog;
mod comment;
mod course;
mod instructor;
mod student;

pub use auth::{AuthRepository, AuthState};
pub use catalog::CatalogRepository;
pub use comment::CommentRepository;
pub use course::CourseRepository;
pub use instructor::InstructorRepository;
pub use student::{ProfileUpdate, StudentRepository};

/// Every repository the view-models need, sharing one backend.
#[derive(Clone)]
pub struct Repositories {
    pub auth: AuthRepository,
    pub students: StudentRepository,
    pub courses: CourseRepository,
    pub instructors: InstructorRepository,
    pub catalog: CatalogRepository,
    pub comments: CommentRepository,
}

impl Repositories {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        auth: Arc<dyn AuthService>,
        connectivity: Arc<dyn Connectivity>,
    ) -> Self {
        let remote = Remote::new(store, connectivity.clone());

        Self {
            auth: AuthRepository::new(auth, connectivity),
            students: StudentRepository::new(remote.clone()),
            courses: CourseRepository::new(remote.clone()),
            instructors: InstructorRepository::new(remote.clone()),
            catalog: CatalogRepository::new(remote.clone()),
            comments: CommentRepository::new(remote),
        }
    }

    /// Repositories over the in-process dev backend.
    pub fn local(db: Db, connectivity: Arc<dyn Connectivity>) -> Self {
        let backend = Arc::new(LocalBackend::new(db));
        Self::new(backend.clone(), backend, connectivity)
    }

    /// Repositories over an empty in-memory dev backend that is always online.
    pub fn in_memory() -> Self {
        Self::local(new_memory_db(), Arc::new(NetworkMonitor::default()))
    }
}

/// Typed access to the document store, shared by the entity repositories.
#[derive(Clone)]
pub(crate) struct Remote {
    store: Arc<dyn DocumentStore>,
    connectivity: Arc<dyn Connectivity>,
}

impl Remote {
    pub(crate) fn new(store: Arc<dyn DocumentStore>, connectivity: Arc<dyn Connectivity>) -> Self {
        Self {
            store,
            connectivity,
        }
    }

    fn online(&self) -> Result<()> {
        if self.connectivity.is_connected() {
            Ok(())
        } else {
            Err(Error::NoNetwork)
        }
    }

    pub(crate) async fn find<T>(&self, id: &str) -> Result<Option<T>>
    where
        T: Collection + DeserializeOwned,
    {
        self.online()?;

        match self.store.get(T::NAME, id).await? {
            Some(document) => Ok(Some(serde_json::from_value(document)?)),
            None => Ok(None),
        }
    }

    pub(crate) async fn get<T>(&self, id: &str) -> Result<T>
    where
        T: Collection + DeserializeOwned,
    {
        self.find(id).await?.ok_or(Error::NotFound)
    }

    /// Loads documents by id in batches, keeping the order of `ids` and skipping missing ones.
    pub(crate) async fn get_many<T>(&self, ids: &[String]) -> Result<Vec<T>>
    where
        T: Collection + DeserializeOwned + Send,
    {
        self.online()?;

        let mut found: HashMap<String, Value> = HashMap::new();

        for chunk in ids.chunks(MAX_ID_IN) {
            let query = Query::new(T::NAME).filter(Filter::id_in(chunk));

            for document in self.store.query(query).await? {
                let id = document.get("id").and_then(Value::as_str).map(str::to_string);

                if let Some(id) = id {
                    found.insert(id, document);
                }
            }
        }

        ids.iter()
            .filter_map(|id| found.remove(id))
            .map(|document| serde_json::from_value(document).map_err(Error::from))
            .collect()
    }

    pub(crate) async fn query<T>(&self, query: Query) -> Result<Vec<T>>
    where
        T: DeserializeOwned + Send,
    {
        self.online()?;

        self.store
            .query(query)
            .await?
            .into_iter()
            .map(|document| serde_json::from_value(document).map_err(Error::from))
            .collect()
    }

    pub(crate) async fn set<T>(&self, id: &str, record: &T) -> Result<()>
    where
        T: Collection + Serialize + Sync,
    {
        self.online()?;
        self.store
            .set(T::NAME, id, serde_json::to_value(record)?)
            .await
    }

    pub(crate) async fn create<T>(&self, id: &str, record: &T) -> Result<()>
    where
        T: Collection + Serialize + Sync,
    {
        self.online()?;
        self.store
            .create(T::NAME, id, serde_json::to_value(record)?)
            .await
    }

    pub(crate) async fn update(
        &self,
        collection: &str,
        id: &str,
        updates: Vec<FieldUpdate>,
    ) -> Result<()> {
        self.online()?;
        self.store.update(collection, id, updates).await
    }

    pub(crate) async fn delete(&self, collection: &str, id: &str) -> Result<()> {
        self.online()?;
        self.store.delete(collection, id).await
    }
}
