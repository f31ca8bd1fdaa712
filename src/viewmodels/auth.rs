use db::models::{AvatarKey, Student};
use serde::Deserialize;
use std::{future::Future, time::Duration};
use tokio::{sync::Mutex, time::Instant};

use super::{Notifier, StateContainer, UiEvent};
use crate::{
    backend::Session,
    error::{Error, Result, Validation},
    repositories::{AuthRepository, CommentRepository, Repositories, StudentRepository},
    validation,
};

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AuthSettings {
    /// Minimum time between two password reset mails.
    pub reset_cooldown_secs: u64,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            reset_cooldown_secs: 60,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AccountState {
    pub loading: bool,
    pub session: Option<Session>,
}

#[derive(Clone, Debug, Default)]
pub struct SignUpForm {
    pub name: String,
    pub surname: String,
    pub email: String,
    pub password: String,
    pub confirmation: String,
    pub year: u8,
    pub faculty_id: String,
    pub department_id: String,
    pub avatar: AvatarKey,
}

impl SignUpForm {
    fn validate(&self) -> Result<()> {
        validation::names(&self.name, &self.surname)?;
        validation::email(&self.email)?;
        validation::password(&self.password, &self.confirmation)?;
        validation::year(self.year)?;

        if self.faculty_id.is_empty() || self.department_id.is_empty() {
            return Err(Validation::MissingDepartment.into());
        }

        Ok(())
    }

    fn student(&self, uid: String) -> Student {
        Student {
            id: uid,
            name: self.name.trim().to_string(),
            surname: self.surname.trim().to_string(),
            email: self.email.trim().to_lowercase(),
            year: self.year,
            avatar: self.avatar,
            faculty_id: self.faculty_id.clone(),
            department_id: self.department_id.clone(),
            enrolled_course_ids: Vec::new(),
            saved_course_ids: Vec::new(),
        }
    }
}

/// Sign in, sign up, password reset and account removal.
pub struct AuthViewModel {
    auth: AuthRepository,
    students: StudentRepository,
    comments: CommentRepository,
    cooldown: Duration,
    last_reset: Mutex<Option<Instant>>,
    state: StateContainer<AccountState>,
    notifier: Notifier,
}

impl AuthViewModel {
    pub fn new(repos: &Repositories, settings: AuthSettings, notifier: Notifier) -> Self {
        Self {
            auth: repos.auth.clone(),
            students: repos.students.clone(),
            comments: repos.comments.clone(),
            cooldown: Duration::from_secs(settings.reset_cooldown_secs),
            last_reset: Mutex::new(None),
            state: StateContainer::new(AccountState {
                loading: false,
                session: repos.auth.session(),
            }),
            notifier,
        }
    }

    pub fn state(&self) -> &StateContainer<AccountState> {
        &self.state
    }

    async fn run<T>(&self, action: impl Future<Output = Result<T>>) -> Result<T> {
        self.state.update(|current| AccountState {
            loading: true,
            ..current.clone()
        });

        let result = self.notifier.report(action.await);

        self.state.set(AccountState {
            loading: false,
            session: self.auth.session(),
        });
        result
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        self.run(async {
            validation::email(email)?;
            self.auth.sign_in(email, password).await
        })
        .await
    }

    /// Creates the account and its student profile, then signs in. When the profile cannot be
    /// written the account is removed again.
    pub async fn sign_up(&self, form: &SignUpForm) -> Result<Session> {
        self.run(async {
            form.validate()?;

            let uid = self.auth.sign_up(&form.email, &form.password).await?;
            let session = self.auth.sign_in(&form.email, &form.password).await?;

            if let Err(e) = self.students.create(&form.student(uid)).await {
                log::warn!("profile of {} not written, removing account: {}", session.uid, e);

                if let Err(rollback) = self.auth.delete_account().await {
                    log::error!("could not remove account {}: {}", session.uid, rollback);
                    self.auth.sign_out().await;
                }

                return Err(e);
            }

            Ok(session)
        })
        .await
    }

    /// Sends a password reset mail, at most once per cooldown period.
    pub async fn send_password_reset(&self, email: &str) -> Result<()> {
        let result = self
            .run(async {
                validation::email(email)?;

                let mut last_reset = self.last_reset.lock().await;

                if let Some(sent_at) = *last_reset {
                    let elapsed = sent_at.elapsed();

                    if elapsed < self.cooldown {
                        let remaining = self.cooldown - elapsed;
                        let retry_after =
                            remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0);
                        return Err(Error::TooManyRequests { retry_after });
                    }
                }

                self.auth.send_password_reset(email).await?;
                *last_reset = Some(Instant::now());
                Ok(())
            })
            .await;

        if result.is_ok() {
            self.notifier.toast("A password reset link was sent to your email");
        }

        result
    }

    pub async fn sign_out(&self) {
        self.auth.sign_out().await;
        self.state.set(AccountState::default());
        self.notifier.emit(UiEvent::SignedOut);
    }

    /// Removes the student profile and reviews, then the account itself.
    pub async fn delete_account(&self) -> Result<()> {
        self.run(async {
            let uid = self.auth.current_uid()?;

            self.students.delete(&uid).await?;

            for review in self.comments.for_student(&uid).await? {
                self.comments.delete(&review.id).await?;
            }

            self.auth.delete_account().await
        })
        .await?;

        self.notifier.emit(UiEvent::SignedOut);
        Ok(())
    }
}
