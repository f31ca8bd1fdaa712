use db::{
    models::{Instructor, INSTRUCTORS},
    search_key, Filter, Query,
};

use super::Remote;
use crate::error::Result;

#[derive(Clone)]
pub struct InstructorRepository {
    remote: Remote,
}

impl InstructorRepository {
    pub(crate) fn new(remote: Remote) -> Self {
        Self { remote }
    }

    pub async fn get(&self, id: &str) -> Result<Instructor> {
        self.remote.get(id).await
    }

    pub async fn get_many(&self, ids: &[String]) -> Result<Vec<Instructor>> {
        self.remote.get_many(ids).await
    }

    pub async fn by_department(&self, department_id: &str) -> Result<Vec<Instructor>> {
        let query = Query::new(INSTRUCTORS)
            .filter(Filter::array_contains("department_ids", department_id))
            .order_by("search_key", false);
        self.remote.query(query).await
    }

    pub async fn search_by_prefix(&self, text: &str, limit: usize) -> Result<Vec<Instructor>> {
        let query = Query::new(INSTRUCTORS)
            .filter(Filter::prefix("search_key", &search_key(text)))
            .order_by("search_key", false)
            .limit(limit);
        self.remote.query(query).await
    }
}
