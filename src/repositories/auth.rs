use std::sync::Arc;
use tokio::sync::watch;

use crate::{
    backend::{AuthService, Session},
    connectivity::Connectivity,
    error::{Error, Result},
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthState {
    SignedOut,
    SignedIn(Session),
}

/// Account operations plus the current session, observable as a stream of `AuthState`.
#[derive(Clone)]
pub struct AuthRepository {
    service: Arc<dyn AuthService>,
    connectivity: Arc<dyn Connectivity>,
    state: Arc<watch::Sender<AuthState>>,
}

impl AuthRepository {
    pub(crate) fn new(service: Arc<dyn AuthService>, connectivity: Arc<dyn Connectivity>) -> Self {
        let (state, _) = watch::channel(AuthState::SignedOut);

        Self {
            service,
            connectivity,
            state: Arc::new(state),
        }
    }

    fn online(&self) -> Result<()> {
        if self.connectivity.is_connected() {
            Ok(())
        } else {
            Err(Error::NoNetwork)
        }
    }

    pub fn session(&self) -> Option<Session> {
        match &*self.state.borrow() {
            AuthState::SignedIn(session) => Some(session.clone()),
            AuthState::SignedOut => None,
        }
    }

    pub fn current_uid(&self) -> Result<String> {
        self.session()
            .map(|session| session.uid)
            .ok_or(Error::NotSignedIn)
    }

    /// Every change of the signed-in account, starting with the current one.
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> Result<String> {
        self.online()?;
        let uid = self.service.sign_up(email.trim(), password).await?;
        log::info!("account {} created", uid);
        Ok(uid)
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        self.online()?;
        let session = self.service.sign_in(email.trim(), password).await?;
        log::info!("account {} signed in", session.uid);
        self.state.send_replace(AuthState::SignedIn(session.clone()));
        Ok(session)
    }

    /// Always signs out locally, the remote session is revoked when possible.
    pub async fn sign_out(&self) {
        let previous = self.state.send_replace(AuthState::SignedOut);

        if let AuthState::SignedIn(session) = previous {
            if !self.connectivity.is_connected() {
                log::warn!("offline, session of {} not revoked", session.uid);
                return;
            }

            if let Err(e) = self.service.sign_out(&session).await {
                log::warn!("could not revoke session of {}: {}", session.uid, e);
            }
        }
    }

    pub async fn send_password_reset(&self, email: &str) -> Result<()> {
        self.online()?;
        self.service.send_password_reset(email.trim()).await
    }

    pub async fn delete_account(&self) -> Result<()> {
        self.online()?;
        let session = self.session().ok_or(Error::NotSignedIn)?;
        self.service.delete_account(&session).await?;
        log::info!("account {} deleted", session.uid);
        self.state.send_replace(AuthState::SignedOut);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{connectivity::NetworkMonitor, repositories::Repositories};
    use super::*;
    use db::new_memory_db;

    #[tokio::test]
    async fn auth_state_follows_sign_in_and_out() {
        let repos = Repositories::in_memory();
        let mut changes = repos.auth.subscribe();
        assert_eq!(*changes.borrow_and_update(), AuthState::SignedOut);

        repos.auth.sign_up("ada@uni.edu", "secret1").await.unwrap();
        let session = repos.auth.sign_in("ada@uni.edu", "secret1").await.unwrap();

        changes.changed().await.unwrap();
        assert_eq!(
            *changes.borrow_and_update(),
            AuthState::SignedIn(session.clone())
        );
        assert_eq!(repos.auth.current_uid(), Ok(session.uid));

        repos.auth.sign_out().await;
        changes.changed().await.unwrap();
        assert_eq!(*changes.borrow(), AuthState::SignedOut);
        assert_eq!(repos.auth.current_uid(), Err(Error::NotSignedIn));
    }

    #[tokio::test]
    async fn offline_calls_fail_before_reaching_the_backend() {
        let network = Arc::new(NetworkMonitor::new(false));
        let repos = Repositories::local(new_memory_db(), network.clone());

        assert_eq!(
            repos.auth.sign_in("ada@uni.edu", "secret1").await,
            Err(Error::NoNetwork)
        );

        network.set_connected(true);
        assert_eq!(
            repos.auth.sign_in("ada@uni.edu", "secret1").await,
            Err(Error::InvalidCredential)
        );
    }

    #[tokio::test]
    async fn delete_account_needs_a_session() {
        let repos = Repositories::in_memory();
        assert_eq!(repos.auth.delete_account().await, Err(Error::NotSignedIn));
    }
}
