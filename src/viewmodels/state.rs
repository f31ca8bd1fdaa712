use tokio::sync::{broadcast, watch};

use crate::error::Error;

/// Holds a screen's state. Writers always replace the whole value, readers observe snapshots.
pub struct StateContainer<T> {
    sender: watch::Sender<T>,
}

impl<T: Clone> StateContainer<T> {
    pub fn new(initial: T) -> Self {
        let (sender, _) = watch::channel(initial);
        Self { sender }
    }

    pub fn get(&self) -> T {
        self.sender.borrow().clone()
    }

    pub fn set(&self, state: T) {
        self.sender.send_replace(state);
    }

    /// Replaces the state with one derived from the current snapshot.
    pub fn update(&self, next: impl FnOnce(&T) -> T) {
        self.sender.send_modify(|state| *state = next(state));
    }

    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.sender.subscribe()
    }
}

impl<T: Clone + Default> Default for StateContainer<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

/// One-shot notifications for the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UiEvent {
    Toast(String),
    SignedOut,
}

/// Fans out `UiEvent`s. Events emitted while nobody listens are dropped.
#[derive(Clone)]
pub struct Notifier {
    sender: broadcast::Sender<UiEvent>,
}

impl Notifier {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(16);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<UiEvent> {
        self.sender.subscribe()
    }

    pub fn emit(&self, event: UiEvent) {
        // No receiver means no screen is showing
        let _ = self.sender.send(event);
    }

    pub fn toast(&self, message: impl Into<String>) {
        self.emit(UiEvent::Toast(message.into()));
    }

    /// Shows the failure of `result` to the user and hands it back.
    pub fn report<T>(&self, result: Result<T, Error>) -> Result<T, Error> {
        if let Err(e) = &result {
            log::debug!("action failed: {:?}", e);
            self.toast(e.to_string());
        }

        result
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}
