use db::models::{Course, Instructor};
use serde::Deserialize;
use std::{sync::Arc, time::Duration};
use tokio::{sync::Mutex, task::JoinHandle};

use super::StateContainer;
use crate::repositories::{CourseRepository, InstructorRepository, Repositories};

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SearchSettings {
    /// Quiet period after the last keystroke before the backend is queried.
    pub debounce_ms: u64,
    /// Shorter queries (in chars, after trimming) clear the results instead.
    pub min_query_len: usize,
    /// Maximum results per collection.
    pub limit: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            min_query_len: 3,
            limit: 20,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SearchState {
    pub query: String,
    pub courses: Vec<Course>,
    pub instructors: Vec<Instructor>,
    pub loading: bool,
}

#[derive(Default)]
struct Pending {
    generation: u64,
    task: Option<JoinHandle<()>>,
}

/// Live search over courses and instructors.
///
/// Every call to `on_query_changed` supersedes the previous one. A superseded search is aborted,
/// and because results are only published while holding the same lock that supersession takes,
/// a search that already finished its queries can never overwrite newer results.
pub struct SearchViewModel {
    courses: CourseRepository,
    instructors: InstructorRepository,
    settings: SearchSettings,
    state: Arc<StateContainer<SearchState>>,
    pending: Arc<Mutex<Pending>>,
}

impl SearchViewModel {
    pub fn new(repos: &Repositories, settings: SearchSettings) -> Self {
        Self {
            courses: repos.courses.clone(),
            instructors: repos.instructors.clone(),
            settings,
            state: Arc::new(StateContainer::default()),
            pending: Arc::new(Mutex::new(Pending::default())),
        }
    }

    pub fn state(&self) -> &StateContainer<SearchState> {
        &self.state
    }

    pub async fn on_query_changed(&self, query: &str) {
        let mut pending = self.pending.lock().await;
        pending.generation += 1;

        if let Some(task) = pending.task.take() {
            task.abort();
        }

        let query = query.trim().to_string();

        if query.chars().count() < self.settings.min_query_len {
            self.state.set(SearchState {
                query,
                ..SearchState::default()
            });
            return;
        }

        self.state.update(|current| SearchState {
            query: query.clone(),
            ..current.clone()
        });

        let generation = pending.generation;
        let debounce = Duration::from_millis(self.settings.debounce_ms);
        let limit = self.settings.limit;
        let courses = self.courses.clone();
        let instructors = self.instructors.clone();
        let state = self.state.clone();
        let guard = self.pending.clone();

        pending.task = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;

            {
                // Held until loading is set, so a newer query cannot clear the state in between
                let pending = guard.lock().await;
                if pending.generation != generation {
                    return;
                }

                state.update(|current| SearchState {
                    loading: true,
                    ..current.clone()
                });
            }

            let (found_courses, found_instructors) = tokio::join!(
                courses.search_by_prefix(&query, limit),
                instructors.search_by_prefix(&query, limit)
            );

            let found_courses = found_courses.unwrap_or_else(|e| {
                log::warn!("course search for {:?} failed: {}", query, e);
                Vec::new()
            });
            let found_instructors = found_instructors.unwrap_or_else(|e| {
                log::warn!("instructor search for {:?} failed: {}", query, e);
                Vec::new()
            });

            let pending = guard.lock().await;

            if pending.generation == generation {
                log::debug!(
                    "search {:?}: {} courses, {} instructors",
                    query,
                    found_courses.len(),
                    found_instructors.len()
                );
                state.set(SearchState {
                    query,
                    courses: found_courses,
                    instructors: found_instructors,
                    loading: false,
                });
            }
        }));
    }
}

impl Drop for SearchViewModel {
    fn drop(&mut self) {
        if let Ok(mut pending) = self.pending.try_lock() {
            if let Some(task) = pending.task.take() {
                task.abort();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{flaky_repositories, seeded_db, seeded_repositories};
    use db::{
        models::{COURSES, INSTRUCTORS},
        Database,
    };

    fn codes(state: &SearchState) -> Vec<&str> {
        state.courses.iter().map(|c| c.code.as_str()).collect()
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_secs(5)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn short_queries_never_reach_the_backend() {
        let (store, repos) = flaky_repositories(seeded_db().await);
        let search = SearchViewModel::new(&repos, SearchSettings::default());

        search.on_query_changed("c").await;
        search.on_query_changed("cs").await;
        search.on_query_changed(" cs  ").await;
        settle().await;

        assert_eq!(store.query_count(), 0);
        let state = search.state().get();
        assert!(state.courses.is_empty());
        assert!(state.instructors.is_empty());
        assert!(!state.loading);
    }

    #[tokio::test(start_paused = true)]
    async fn shortening_the_query_clears_results() {
        let (_, repos) = seeded_repositories().await;
        let search = SearchViewModel::new(&repos, SearchSettings::default());

        search.on_query_changed("cs 1").await;
        settle().await;
        assert_eq!(codes(&search.state().get()), vec!["CS 101"]);

        search.on_query_changed("cs").await;
        assert_eq!(search.state().get(), SearchState {
            query: "cs".to_string(),
            ..SearchState::default()
        });
    }

    #[tokio::test(start_paused = true)]
    async fn keystrokes_within_the_debounce_issue_one_search() {
        let (store, repos) = flaky_repositories(seeded_db().await);
        let search = SearchViewModel::new(&repos, SearchSettings::default());

        for query in ["mat", "math", "math 1", "math 10"] {
            search.on_query_changed(query).await;
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        settle().await;

        // One course query per key plus the instructor query
        assert_eq!(store.query_count(), 4);
        let state = search.state().get();
        assert_eq!(state.query, "math 10");
        assert_eq!(codes(&state), vec!["MATH 101"]);
    }

    #[tokio::test(start_paused = true)]
    async fn superseded_searches_never_overwrite_newer_results() {
        let (db, repos) = seeded_repositories().await;
        db.lock().await.delay_set(Duration::from_millis(500));
        let search = SearchViewModel::new(&repos, SearchSettings::default());

        search.on_query_changed("phys").await;
        // Past the debounce, the first search is waiting on the backend
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert!(search.state().get().loading);

        search.on_query_changed("calc").await;
        settle().await;

        let state = search.state().get();
        assert_eq!(state.query, "calc");
        assert_eq!(codes(&state), vec!["MATH 101"]);
        assert!(!state.loading);
    }

    #[tokio::test(start_paused = true)]
    async fn a_failing_branch_only_empties_itself() {
        let (store, repos) = flaky_repositories(seeded_db().await);
        store.fail_reads_of(INSTRUCTORS);
        let search = SearchViewModel::new(&repos, SearchSettings::default());

        search.on_query_changed("cs 2").await;
        settle().await;

        let state = search.state().get();
        assert_eq!(codes(&state), vec!["CS 201"]);
        assert!(state.instructors.is_empty());
        assert!(!state.loading);
    }

    #[tokio::test(start_paused = true)]
    async fn failing_course_search_keeps_instructors() {
        let (store, repos) = flaky_repositories(seeded_db().await);
        store.fail_reads_of(COURSES);
        let search = SearchViewModel::new(&repos, SearchSettings::default());

        search.on_query_changed("ayse").await;
        settle().await;

        let state = search.state().get();
        assert!(state.courses.is_empty());
        let names: Vec<&str> = state.instructors.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Ayşe Şahin"]);
        assert!(!state.loading);
    }

    #[tokio::test(start_paused = true)]
    async fn instructor_names_match_without_accents() {
        let (_, repos) = seeded_repositories().await;
        let search = SearchViewModel::new(&repos, SearchSettings::default());

        search.on_query_changed("Ayşe").await;
        settle().await;

        let state = search.state().get();
        assert!(state.courses.is_empty());
        let names: Vec<&str> = state.instructors.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Ayşe Şahin"]);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_view_model_cancels_the_search() {
        let (store, repos) = flaky_repositories(seeded_db().await);
        let search = SearchViewModel::new(&repos, SearchSettings::default());
        let state = search.state.clone();

        search.on_query_changed("cs 1").await;
        drop(search);
        settle().await;

        assert_eq!(store.query_count(), 0);
        assert!(state.get().courses.is_empty());
    }
}
