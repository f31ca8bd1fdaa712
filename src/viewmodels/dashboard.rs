use chrono::{DateTime, Utc};
use db::models::{AvatarKey, CommentReview, Course, Student};
use serde::Deserialize;

use super::{Notifier, StateContainer};
use crate::{
    error::Result,
    repositories::{CommentRepository, CourseRepository, Repositories, StudentRepository},
};

const UNKNOWN_REVIEWER: &str = "Unknown";

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DashboardSettings {
    /// Size of the ranked page.
    pub limit: usize,
    pub comments_per_course: usize,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            limit: 5,
            comments_per_course: 1,
        }
    }
}

/// A review as shown on the dashboard, denormalized with its author.
#[derive(Clone, Debug, PartialEq)]
pub struct ReviewSnippet {
    pub comment: String,
    pub rating: Option<u8>,
    pub reviewer: String,
    pub avatar: AvatarKey,
    pub created_at: Option<DateTime<Utc>>,
}

impl ReviewSnippet {
    /// Stands in for a review that could not be loaded.
    pub fn placeholder() -> Self {
        Self {
            comment: String::new(),
            rating: None,
            reviewer: UNKNOWN_REVIEWER.to_string(),
            avatar: AvatarKey::Default,
            created_at: None,
        }
    }

    fn new(review: CommentReview, author: Option<Student>) -> Self {
        let (reviewer, avatar) = match author {
            Some(student) => (student.full_name(), student.avatar),
            None => (UNKNOWN_REVIEWER.to_string(), AvatarKey::Default),
        };

        Self {
            comment: review.comment,
            rating: Some(review.rating),
            reviewer,
            avatar,
            created_at: Some(review.created_at),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PopularCourse {
    pub course: Course,
    pub reviews: Vec<ReviewSnippet>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DashboardState {
    pub loading: bool,
    pub courses: Vec<PopularCourse>,
}

pub struct DashboardViewModel {
    courses: CourseRepository,
    comments: CommentRepository,
    students: StudentRepository,
    settings: DashboardSettings,
    state: StateContainer<DashboardState>,
    notifier: Notifier,
}

impl DashboardViewModel {
    pub fn new(repos: &Repositories, settings: DashboardSettings, notifier: Notifier) -> Self {
        Self {
            courses: repos.courses.clone(),
            comments: repos.comments.clone(),
            students: repos.students.clone(),
            settings,
            state: StateContainer::default(),
            notifier,
        }
    }

    pub fn state(&self) -> &StateContainer<DashboardState> {
        &self.state
    }

    /// Reloads the dashboard, replacing the list only once it is complete.
    pub async fn load(&self) {
        self.state.update(|current| DashboardState {
            loading: true,
            ..current.clone()
        });

        match self.notifier.report(self.popular_courses().await) {
            Ok(courses) => self.state.set(DashboardState {
                loading: false,
                courses,
            }),
            Err(_) => self.state.update(|current| DashboardState {
                loading: false,
                ..current.clone()
            }),
        }
    }

    /// The ranked page of rated courses, each with its latest reviews.
    ///
    /// Only the ranked page itself can fail. Reviews and reviewers that cannot be loaded are
    /// replaced by placeholders, so every rated course of the page is part of the result.
    pub async fn popular_courses(&self) -> Result<Vec<PopularCourse>> {
        let ranked = self.courses.popular(self.settings.limit).await?;
        let mut popular = Vec::new();

        for course in ranked.into_iter().filter(|c| c.average_rating > 0.0) {
            let reviews = self.latest_reviews(&course.id).await;
            popular.push(PopularCourse { course, reviews });
        }

        Ok(popular)
    }

    async fn latest_reviews(&self, course_id: &str) -> Vec<ReviewSnippet> {
        let reviews = match self
            .comments
            .latest_for_course(course_id, self.settings.comments_per_course)
            .await
        {
            Ok(reviews) => reviews,
            Err(e) => {
                log::warn!("latest reviews of {} unavailable: {}", course_id, e);
                Vec::new()
            }
        };

        if reviews.is_empty() {
            return vec![ReviewSnippet::placeholder()];
        }

        let mut snippets = Vec::with_capacity(reviews.len());

        for review in reviews {
            let author = match self.students.find(&review.student_id).await {
                Ok(author) => author,
                Err(e) => {
                    log::warn!("reviewer {} unavailable: {}", review.student_id, e);
                    None
                }
            };
            snippets.push(ReviewSnippet::new(review, author));
        }

        snippets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        testing::{flaky_repositories, replace_courses, seeded_db, seeded_repositories},
        viewmodels::UiEvent,
    };
    use db::models::{COMMENT_REVIEWS, COURSES, STUDENTS};

    fn ids(courses: &[PopularCourse]) -> Vec<&str> {
        courses.iter().map(|p| p.course.id.as_str()).collect()
    }

    #[tokio::test]
    async fn zero_rated_courses_are_left_out() {
        let (db, repos) = seeded_repositories().await;
        replace_courses(&db, &[("c1", 0.0), ("c2", 3.0), ("c3", 4.5), ("c4", 2.0)]).await;
        let dashboard = DashboardViewModel::new(&repos, DashboardSettings::default(), Notifier::new());

        let popular = dashboard.popular_courses().await.unwrap();

        assert_eq!(ids(&popular), vec!["c3", "c2", "c4"]);
        for entry in &popular {
            assert_eq!(entry.reviews.len(), 1);
            assert_eq!(entry.reviews[0].comment, format!("review of {}", entry.course.id));
            assert_eq!(entry.reviews[0].reviewer, "Ada Yılmaz");
            assert_eq!(entry.reviews[0].avatar, AvatarKey::Owl);
        }
    }

    #[tokio::test]
    async fn failed_lookups_keep_every_rated_course() {
        let db = seeded_db().await;
        replace_courses(&db, &[("c1", 0.0), ("c2", 3.0), ("c3", 4.5), ("c4", 2.0)]).await;
        let (store, repos) = flaky_repositories(db);
        store.fail_reads_of(COMMENT_REVIEWS);
        store.fail_reads_of(STUDENTS);
        let dashboard = DashboardViewModel::new(&repos, DashboardSettings::default(), Notifier::new());

        let popular = dashboard.popular_courses().await.unwrap();

        assert_eq!(ids(&popular), vec!["c3", "c2", "c4"]);
        assert!(popular
            .iter()
            .all(|p| p.reviews == vec![ReviewSnippet::placeholder()]));
    }

    #[tokio::test]
    async fn unknown_reviewers_keep_their_comment() {
        let (store, repos) = flaky_repositories(seeded_db().await);
        store.fail_reads_of(STUDENTS);
        let dashboard = DashboardViewModel::new(&repos, DashboardSettings::default(), Notifier::new());

        let popular = dashboard.popular_courses().await.unwrap();
        let review = &popular[0].reviews[0];

        assert_eq!(review.comment, "Clear lectures, a bit slow at the start.");
        assert_eq!(review.rating, Some(4));
        assert_eq!(review.reviewer, UNKNOWN_REVIEWER);
    }

    #[tokio::test]
    async fn seeded_dashboard() {
        let (_, repos) = seeded_repositories().await;
        let dashboard = DashboardViewModel::new(&repos, DashboardSettings::default(), Notifier::new());

        dashboard.load().await;
        let state = dashboard.state().get();

        assert!(!state.loading);
        assert_eq!(ids(&state.courses), vec!["cs101", "cs201", "phys101", "math101"]);

        let latest = &state.courses[0].reviews[0];
        assert_eq!(latest.reviewer, "Zeynep Arslan");
        assert_eq!(latest.avatar, AvatarKey::Panda);
        assert_eq!(latest.comment, "Clear lectures, a bit slow at the start.");
    }

    #[tokio::test]
    async fn several_comments_per_course() {
        let (_, repos) = seeded_repositories().await;
        let settings = DashboardSettings {
            limit: 1,
            comments_per_course: 3,
        };
        let dashboard = DashboardViewModel::new(&repos, settings, Notifier::new());

        let popular = dashboard.popular_courses().await.unwrap();

        assert_eq!(ids(&popular), vec!["cs101"]);
        let reviewers: Vec<&str> = popular[0].reviews.iter().map(|r| r.reviewer.as_str()).collect();
        assert_eq!(reviewers, vec!["Zeynep Arslan", "Ada Yılmaz"]);
    }

    #[tokio::test]
    async fn reloading_is_idempotent() {
        let (_, repos) = seeded_repositories().await;
        let dashboard = DashboardViewModel::new(&repos, DashboardSettings::default(), Notifier::new());

        dashboard.load().await;
        let first = dashboard.state().get();
        dashboard.load().await;

        assert_eq!(dashboard.state().get(), first);
    }

    #[tokio::test]
    async fn a_failed_ranking_is_reported() {
        let (store, repos) = flaky_repositories(seeded_db().await);
        store.fail_reads_of(COURSES);
        let notifier = Notifier::new();
        let mut events = notifier.subscribe();
        let dashboard = DashboardViewModel::new(&repos, DashboardSettings::default(), notifier);

        dashboard.load().await;

        assert_eq!(dashboard.state().get(), DashboardState::default());
        assert!(matches!(events.recv().await, Ok(UiEvent::Toast(_))));
    }
}
