use db::models::{CommentReview, Course, Instructor, Student};
use std::collections::HashMap;

use super::{Notifier, StateContainer};
use crate::{
    error::{Error, Result},
    repositories::{
        AuthRepository, CommentRepository, CourseRepository, InstructorRepository, Repositories,
        StudentRepository,
    },
    utils::UniqueExt,
    validation,
};

#[derive(Clone, Debug, PartialEq)]
pub struct CourseReview {
    pub review: CommentReview,
    /// `None` when the reviewer's profile no longer exists.
    pub reviewer: Option<Student>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CourseDetailState {
    pub loading: bool,
    pub course: Option<Course>,
    pub instructors: Vec<Instructor>,
    /// Newest first.
    pub reviews: Vec<CourseReview>,
    pub enrolled: bool,
    pub saved: bool,
    /// Whether the signed-in student already reviewed the course.
    pub reviewed: bool,
}

pub struct CourseDetailViewModel {
    course_id: String,
    auth: AuthRepository,
    courses: CourseRepository,
    instructors: InstructorRepository,
    comments: CommentRepository,
    students: StudentRepository,
    state: StateContainer<CourseDetailState>,
    notifier: Notifier,
}

impl CourseDetailViewModel {
    pub fn new(repos: &Repositories, course_id: &str, notifier: Notifier) -> Self {
        Self {
            course_id: course_id.to_string(),
            auth: repos.auth.clone(),
            courses: repos.courses.clone(),
            instructors: repos.instructors.clone(),
            comments: repos.comments.clone(),
            students: repos.students.clone(),
            state: StateContainer::default(),
            notifier,
        }
    }

    pub fn state(&self) -> &StateContainer<CourseDetailState> {
        &self.state
    }

    pub async fn load(&self) -> Result<()> {
        self.state.update(|current| CourseDetailState {
            loading: true,
            ..current.clone()
        });

        let result = self.notifier.report(self.fetch().await);

        match result {
            Ok(state) => {
                self.state.set(state);
                Ok(())
            }
            Err(e) => {
                self.state.update(|current| CourseDetailState {
                    loading: false,
                    ..current.clone()
                });
                Err(e)
            }
        }
    }

    async fn fetch(&self) -> Result<CourseDetailState> {
        let course = self.courses.get(&self.course_id).await?;
        let instructors = self.instructors.get_many(&course.instructor_ids).await?;
        let reviews = self.comments.for_course(&self.course_id).await?;

        let reviewer_ids: Vec<String> = reviews
            .iter()
            .map(|review| review.student_id.clone())
            .unique_by(|id| id.clone())
            .collect();
        let reviewers: HashMap<String, Student> = self
            .students
            .get_many(&reviewer_ids)
            .await?
            .into_iter()
            .map(|student| (student.id.clone(), student))
            .collect();

        let mut state = CourseDetailState::default();

        if let Some(session) = self.auth.session() {
            if let Some(student) = self.students.find(&session.uid).await? {
                state.enrolled = student.is_enrolled(&course.id);
                state.saved = student.has_saved(&course.id);
            }
            state.reviewed = reviews.iter().any(|r| r.student_id == session.uid);
        }

        state.reviews = reviews
            .into_iter()
            .map(|review| CourseReview {
                reviewer: reviewers.get(&review.student_id).cloned(),
                review,
            })
            .collect();
        state.course = Some(course);
        state.instructors = instructors;

        Ok(state)
    }

    pub async fn toggle_enrollment(&self) -> Result<bool> {
        let toggled = async {
            let uid = self.auth.current_uid()?;
            self.students.toggle_enrollment(&uid, &self.course_id).await
        };
        let enrolled = self.notifier.report(toggled.await)?;

        self.state.update(|current| CourseDetailState {
            enrolled,
            ..current.clone()
        });
        Ok(enrolled)
    }

    pub async fn toggle_saved(&self) -> Result<bool> {
        let toggled = async {
            let uid = self.auth.current_uid()?;
            self.students.toggle_saved(&uid, &self.course_id).await
        };
        let saved = self.notifier.report(toggled.await)?;

        self.state.update(|current| CourseDetailState {
            saved,
            ..current.clone()
        });
        Ok(saved)
    }

    pub async fn add_review(&self, rating: u8, comment: &str) -> Result<()> {
        let posted = async {
            let uid = self.auth.current_uid()?;
            let comment = validation::review(rating, comment)?;
            self.comments
                .add(&uid, &self.course_id, rating, &comment)
                .await
        };

        let review = self.notifier.report(posted.await)?;
        log::info!("{} reviewed {}", review.student_id, review.course_id);
        self.notifier.toast("Thanks for your review");
        self.load().await
    }

    /// Deletes the signed-in student's review of the course.
    pub async fn delete_review(&self) -> Result<()> {
        let deleted = async {
            let uid = self.auth.current_uid()?;
            let review = self
                .comments
                .find(&uid, &self.course_id)
                .await?
                .ok_or(Error::NotFound)?;
            self.comments.delete(&review.id).await
        };

        self.notifier.report(deleted.await)?;
        self.load().await
    }
}
