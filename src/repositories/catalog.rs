use db::{
    models::{Department, Faculty, DEPARTMENTS, FACULTIES},
    Filter, Query,
};

use super::Remote;
use crate::error::Result;

/// Faculties and departments, the organizational units courses hang from.
#[derive(Clone)]
pub struct CatalogRepository {
    remote: Remote,
}

impl CatalogRepository {
    pub(crate) fn new(remote: Remote) -> Self {
        Self { remote }
    }

    pub async fn faculties(&self) -> Result<Vec<Faculty>> {
        self.remote
            .query(Query::new(FACULTIES).order_by("name", false))
            .await
    }

    pub async fn faculty(&self, id: &str) -> Result<Faculty> {
        self.remote.get(id).await
    }

    pub async fn departments_of(&self, faculty_id: &str) -> Result<Vec<Department>> {
        let query = Query::new(DEPARTMENTS)
            .filter(Filter::eq("faculty_id", faculty_id))
            .order_by("name", false);
        self.remote.query(query).await
    }

    pub async fn department(&self, id: &str) -> Result<Department> {
        self.remote.get(id).await
    }
}

#[cfg(test)]
mod tests {
    use crate::{error::Error, testing::seeded_repositories};

    #[tokio::test]
    async fn departments_belong_to_their_faculty() {
        let (_, repos) = seeded_repositories().await;

        let faculties = repos.catalog.faculties().await.unwrap();
        assert_eq!(faculties.len(), 2);

        let departments = repos.catalog.departments_of("science").await.unwrap();
        let names: Vec<&str> = departments.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Mathematics", "Physics"]);
        assert!(departments.iter().all(|d| d.faculty_id == "science"));

        assert_eq!(
            repos.catalog.department("nowhere").await,
            Err(Error::NotFound)
        );
    }
}
