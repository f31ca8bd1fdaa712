use db::models::{CommentReview, Course, Student};

use super::{Notifier, StateContainer};
use crate::{
    error::{Error, Result, Validation},
    repositories::{
        AuthRepository, CommentRepository, CourseRepository, ProfileUpdate, Repositories,
        StudentRepository,
    },
    validation,
};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProfileState {
    pub loading: bool,
    pub student: Option<Student>,
    pub enrolled: Vec<Course>,
    /// Saved courses. Saved comments are not part of the profile.
    pub saved: Vec<Course>,
    pub reviews: Vec<CommentReview>,
}

/// The signed-in student's profile.
pub struct ProfileViewModel {
    auth: AuthRepository,
    students: StudentRepository,
    courses: CourseRepository,
    comments: CommentRepository,
    state: StateContainer<ProfileState>,
    notifier: Notifier,
}

impl ProfileViewModel {
    pub fn new(repos: &Repositories, notifier: Notifier) -> Self {
        Self {
            auth: repos.auth.clone(),
            students: repos.students.clone(),
            courses: repos.courses.clone(),
            comments: repos.comments.clone(),
            state: StateContainer::default(),
            notifier,
        }
    }

    pub fn state(&self) -> &StateContainer<ProfileState> {
        &self.state
    }

    pub async fn load(&self) -> Result<()> {
        self.state.update(|current| ProfileState {
            loading: true,
            ..current.clone()
        });

        match self.notifier.report(self.fetch().await) {
            Ok(state) => {
                self.state.set(state);
                Ok(())
            }
            Err(e) => {
                self.state.update(|current| ProfileState {
                    loading: false,
                    ..current.clone()
                });
                Err(e)
            }
        }
    }

    async fn fetch(&self) -> Result<ProfileState> {
        let uid = self.auth.current_uid()?;
        let student = self.students.get(&uid).await?;

        let (enrolled, saved, reviews) = tokio::try_join!(
            self.courses.get_many(&student.enrolled_course_ids),
            self.courses.get_many(&student.saved_course_ids),
            self.comments.for_student(&uid)
        )?;

        Ok(ProfileState {
            loading: false,
            student: Some(student),
            enrolled,
            saved,
            reviews,
        })
    }

    pub async fn update_profile(&self, update: ProfileUpdate) -> Result<()> {
        let updated = async {
            let uid = self.auth.current_uid()?;

            if update.name.as_deref().is_some_and(|name| name.trim().is_empty()) {
                return Err(Error::Validation(Validation::EmptyName));
            }

            if update.surname.as_deref().is_some_and(|s| s.trim().is_empty()) {
                return Err(Error::Validation(Validation::EmptySurname));
            }

            if let Some(year) = update.year {
                validation::year(year)?;
            }

            self.students.update_profile(&uid, update).await
        };

        self.notifier.report(updated.await)?;
        self.notifier.toast("Your profile was updated");
        self.load().await
    }
}
