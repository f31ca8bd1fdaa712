use db::models::{Course, Instructor};

use super::{Notifier, StateContainer};
use crate::{
    error::Result,
    repositories::{CourseRepository, InstructorRepository, Repositories},
};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct InstructorDetailState {
    pub loading: bool,
    pub instructor: Option<Instructor>,
    pub courses: Vec<Course>,
}

pub struct InstructorDetailViewModel {
    instructor_id: String,
    instructors: InstructorRepository,
    courses: CourseRepository,
    state: StateContainer<InstructorDetailState>,
    notifier: Notifier,
}

impl InstructorDetailViewModel {
    pub fn new(repos: &Repositories, instructor_id: &str, notifier: Notifier) -> Self {
        Self {
            instructor_id: instructor_id.to_string(),
            instructors: repos.instructors.clone(),
            courses: repos.courses.clone(),
            state: StateContainer::default(),
            notifier,
        }
    }

    pub fn state(&self) -> &StateContainer<InstructorDetailState> {
        &self.state
    }

    pub async fn load(&self) -> Result<()> {
        self.state.update(|current| InstructorDetailState {
            loading: true,
            ..current.clone()
        });

        let (instructor, courses) = tokio::join!(
            self.instructors.get(&self.instructor_id),
            self.courses.by_instructor(&self.instructor_id)
        );
        let loaded = self
            .notifier
            .report(instructor.and_then(|instructor| Ok((instructor, courses?))));

        match loaded {
            Ok((instructor, courses)) => {
                self.state.set(InstructorDetailState {
                    loading: false,
                    instructor: Some(instructor),
                    courses,
                });
                Ok(())
            }
            Err(e) => {
                self.state.update(|current| InstructorDetailState {
                    loading: false,
                    ..current.clone()
                });
                Err(e)
            }
        }
    }
}
