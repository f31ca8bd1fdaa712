use chrono::Utc;
use db::{
    models::{CommentReview, COMMENT_REVIEWS},
    Filter, Query,
};

use super::Remote;
use crate::error::{Error, Result};

#[derive(Clone)]
pub struct CommentRepository {
    remote: Remote,
}

impl CommentRepository {
    pub(crate) fn new(remote: Remote) -> Self {
        Self { remote }
    }

    /// Posts a review. The document id is derived from the (course, student) pair and written
    /// create-if-absent, so a second review by the same student is refused by the store.
    pub async fn add(
        &self,
        student_id: &str,
        course_id: &str,
        rating: u8,
        comment: &str,
    ) -> Result<CommentReview> {
        let review = CommentReview {
            id: CommentReview::document_id(course_id, student_id),
            student_id: student_id.to_string(),
            course_id: course_id.to_string(),
            rating,
            comment: comment.to_string(),
            created_at: Utc::now(),
        };

        match self.remote.create(&review.id, &review).await {
            Ok(()) => Ok(review),
            Err(Error::AlreadyExists) => Err(Error::AlreadyReviewed),
            Err(e) => Err(e),
        }
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.remote.delete(COMMENT_REVIEWS, id).await
    }

    /// The student's review of the course, if any.
    pub async fn find(&self, student_id: &str, course_id: &str) -> Result<Option<CommentReview>> {
        self.remote
            .find(&CommentReview::document_id(course_id, student_id))
            .await
    }

    /// The `count` most recent reviews of the course, newest first.
    pub async fn latest_for_course(
        &self,
        course_id: &str,
        count: usize,
    ) -> Result<Vec<CommentReview>> {
        let query = Query::new(COMMENT_REVIEWS)
            .filter(Filter::eq("course_id", course_id))
            .order_by("created_at", true)
            .limit(count);
        self.remote.query(query).await
    }

    pub async fn for_course(&self, course_id: &str) -> Result<Vec<CommentReview>> {
        let query = Query::new(COMMENT_REVIEWS)
            .filter(Filter::eq("course_id", course_id))
            .order_by("created_at", true);
        self.remote.query(query).await
    }

    pub async fn for_student(&self, student_id: &str) -> Result<Vec<CommentReview>> {
        let query = Query::new(COMMENT_REVIEWS)
            .filter(Filter::eq("student_id", student_id))
            .order_by("created_at", true);
        self.remote.query(query).await
    }
}
