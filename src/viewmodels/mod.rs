//! Screen logic without any layout. Each view-model exposes its state through a
//! `StateContainer` and reports failures as one-shot `UiEvent`s.

mod auth;
mod catalog;
mod course_detail;
mod dashboard;
mod instructor;
mod profile;
mod search;
mod state;

pub use auth::{AccountState, AuthSettings, AuthViewModel, SignUpForm};
pub use catalog::{CatalogState, CatalogViewModel};
pub use course_detail::{CourseDetailState, CourseDetailViewModel, CourseReview};
pub use dashboard::{
    DashboardSettings, DashboardState, DashboardViewModel, PopularCourse, ReviewSnippet,
};
pub use instructor::{InstructorDetailState, InstructorDetailViewModel};
pub use profile::{ProfileState, ProfileViewModel};
pub use search::{SearchSettings, SearchState, SearchViewModel};
pub use state::{Notifier, StateContainer, UiEvent};
