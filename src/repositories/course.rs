use db::{code_key, models::{Course, COURSES}, search_key, Filter, Query};

use super::Remote;
use crate::{error::Result, utils::UniqueExt};

#[derive(Clone)]
pub struct CourseRepository {
    remote: Remote,
}

impl CourseRepository {
    pub(crate) fn new(remote: Remote) -> Self {
        Self { remote }
    }

    pub async fn get(&self, id: &str) -> Result<Course> {
        self.remote.get(id).await
    }

    pub async fn get_many(&self, ids: &[String]) -> Result<Vec<Course>> {
        self.remote.get_many(ids).await
    }

    pub async fn all(&self) -> Result<Vec<Course>> {
        self.remote
            .query(Query::new(COURSES).order_by("search_key", false))
            .await
    }

    pub async fn by_faculty(&self, faculty_id: &str) -> Result<Vec<Course>> {
        let query = Query::new(COURSES)
            .filter(Filter::eq("faculty_id", faculty_id))
            .order_by("search_key", false);
        self.remote.query(query).await
    }

    pub async fn by_department(&self, department_id: &str) -> Result<Vec<Course>> {
        let query = Query::new(COURSES)
            .filter(Filter::array_contains("department_ids", department_id))
            .order_by("search_key", false);
        self.remote.query(query).await
    }

    pub async fn by_instructor(&self, instructor_id: &str) -> Result<Vec<Course>> {
        let query = Query::new(COURSES)
            .filter(Filter::array_contains("instructor_ids", instructor_id))
            .order_by("search_key", false);
        self.remote.query(query).await
    }

    /// Courses whose code, code and name, or name starts with `text`, code matches first.
    pub async fn search_by_prefix(&self, text: &str, limit: usize) -> Result<Vec<Course>> {
        let by_code = Query::new(COURSES)
            .filter(Filter::prefix("code_key", &code_key(text)))
            .order_by("search_key", false)
            .limit(limit);
        let by_full = Query::new(COURSES)
            .filter(Filter::prefix("search_key", &search_key(text)))
            .order_by("search_key", false)
            .limit(limit);
        let by_name = Query::new(COURSES)
            .filter(Filter::prefix("name_key", &search_key(text)))
            .order_by("name_key", false)
            .limit(limit);

        let (by_code, by_full, by_name) = tokio::try_join!(
            self.remote.query::<Course>(by_code),
            self.remote.query::<Course>(by_full),
            self.remote.query::<Course>(by_name)
        )?;

        Ok(by_code
            .into_iter()
            .chain(by_full)
            .chain(by_name)
            .unique_by(|course| course.id.clone())
            .take(limit)
            .collect())
    }

    /// The best rated courses, ranked by the store on `average_rating`.
    pub async fn popular(&self, limit: usize) -> Result<Vec<Course>> {
        let query = Query::new(COURSES)
            .order_by("average_rating", true)
            .limit(limit);
        self.remote.query(query).await
    }
}

#[cfg(test)]
mod tests {
    use crate::testing::seeded_repositories;

    fn codes(courses: &[db::models::Course]) -> Vec<&str> {
        courses.iter().map(|c| c.code.as_str()).collect()
    }

    #[tokio::test]
    async fn prefix_search_matches_codes_and_names() {
        let (_, repos) = seeded_repositories().await;

        let found = repos.courses.search_by_prefix("cs 1", 10).await.unwrap();
        assert_eq!(codes(&found), vec!["CS 101"]);

        let found = repos.courses.search_by_prefix("cs", 10).await.unwrap();
        assert_eq!(codes(&found), vec!["CS 101", "CS 201", "CS 315"]);

        let found = repos.courses.search_by_prefix("Linear", 10).await.unwrap();
        assert_eq!(codes(&found), vec!["MATH 221"]);

        let found = repos.courses.search_by_prefix("cs", 2).await.unwrap();
        assert_eq!(found.len(), 2);
    }

    #[tokio::test]
    async fn prefix_search_runs_from_the_code_into_the_name() {
        let (_, repos) = seeded_repositories().await;

        let found = repos.courses.search_by_prefix("CS 101 Intr", 10).await.unwrap();
        assert_eq!(codes(&found), vec!["CS 101"]);

        let found = repos.courses.search_by_prefix("cs101", 10).await.unwrap();
        assert_eq!(codes(&found), vec!["CS 101"]);

        let found = repos.courses.search_by_prefix("cs 101 linear", 10).await.unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn relationship_queries() {
        let (_, repos) = seeded_repositories().await;

        let found = repos.courses.by_department("mathematics").await.unwrap();
        assert_eq!(codes(&found), vec!["MATH 101", "MATH 221"]);

        let found = repos.courses.by_instructor("i-ozturk").await.unwrap();
        assert_eq!(codes(&found), vec!["CS 101", "CS 201"]);

        let found = repos.courses.by_faculty("science").await.unwrap();
        assert_eq!(codes(&found), vec!["MATH 101", "MATH 221", "PHYS 101"]);
    }

    #[tokio::test]
    async fn popular_courses_are_ranked_by_rating() {
        let (_, repos) = seeded_repositories().await;

        let found = repos.courses.popular(3).await.unwrap();
        assert_eq!(codes(&found), vec!["CS 101", "CS 201", "PHYS 101"]);
        assert!(found.windows(2).all(|w| w[0].average_rating >= w[1].average_rating));
    }

    #[tokio::test]
    async fn get_many_keeps_requested_order() {
        let (_, repos) = seeded_repositories().await;

        let ids: Vec<String> = ["phys101", "missing", "cs101"]
            .iter()
            .map(|id| id.to_string())
            .collect();
        let found = repos.courses.get_many(&ids).await.unwrap();
        assert_eq!(codes(&found), vec!["PHYS 101", "CS 101"]);
    }
}
