use db::models::{Course, Department, Faculty, Instructor};

use super::{Notifier, StateContainer};
use crate::{
    error::Result,
    repositories::{CatalogRepository, CourseRepository, InstructorRepository, Repositories},
};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CatalogState {
    pub loading: bool,
    pub faculties: Vec<Faculty>,
    pub faculty_id: Option<String>,
    pub departments: Vec<Department>,
    pub department_id: Option<String>,
    pub courses: Vec<Course>,
    pub instructors: Vec<Instructor>,
}

/// Faculty, then department, then the department's courses and staff.
pub struct CatalogViewModel {
    catalog: CatalogRepository,
    courses: CourseRepository,
    instructors: InstructorRepository,
    state: StateContainer<CatalogState>,
    notifier: Notifier,
}

impl CatalogViewModel {
    pub fn new(repos: &Repositories, notifier: Notifier) -> Self {
        Self {
            catalog: repos.catalog.clone(),
            courses: repos.courses.clone(),
            instructors: repos.instructors.clone(),
            state: StateContainer::default(),
            notifier,
        }
    }

    pub fn state(&self) -> &StateContainer<CatalogState> {
        &self.state
    }

    fn set_loading(&self, loading: bool) {
        self.state.update(|current| CatalogState {
            loading,
            ..current.clone()
        });
    }

    pub async fn load(&self) -> Result<()> {
        self.set_loading(true);
        let faculties = self.notifier.report(self.catalog.faculties().await);
        self.set_loading(false);

        self.state.set(CatalogState {
            faculties: faculties?,
            ..CatalogState::default()
        });
        Ok(())
    }

    pub async fn select_faculty(&self, faculty_id: &str) -> Result<()> {
        self.set_loading(true);
        let departments = self.notifier.report(self.catalog.departments_of(faculty_id).await);
        self.set_loading(false);
        let departments = departments?;

        self.state.update(|current| CatalogState {
            loading: false,
            faculties: current.faculties.clone(),
            faculty_id: Some(faculty_id.to_string()),
            departments,
            ..CatalogState::default()
        });
        Ok(())
    }

    pub async fn select_department(&self, department_id: &str) -> Result<()> {
        self.set_loading(true);
        let (courses, instructors) = tokio::join!(
            self.courses.by_department(department_id),
            self.instructors.by_department(department_id)
        );
        let found = self
            .notifier
            .report(courses.and_then(|courses| Ok((courses, instructors?))));
        self.set_loading(false);
        let (courses, instructors) = found?;

        self.state.update(|current| CatalogState {
            department_id: Some(department_id.to_string()),
            courses,
            instructors,
            ..current.clone()
        });
        Ok(())
    }
}
