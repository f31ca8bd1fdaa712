//! The remote services the application talks to: a document store and an account service.
//!
//! Both are traits so that the repositories can run against the bundled dev backend, a hosted
//! service, or a test double.

use async_trait::async_trait;
use db::{FieldUpdate, Query};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

mod local;

pub use local::LocalBackend;

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>>;
    /// Creates or replaces the document.
    async fn set(&self, collection: &str, id: &str, data: Value) -> Result<()>;
    /// Creates the document, failing with `Error::AlreadyExists` if the id is taken.
    async fn create(&self, collection: &str, id: &str, data: Value) -> Result<()>;
    /// Creates the document under a generated id.
    async fn add(&self, collection: &str, data: Value) -> Result<String>;
    async fn update(&self, collection: &str, id: &str, updates: Vec<FieldUpdate>) -> Result<()>;
    /// Deleting a missing document succeeds.
    async fn delete(&self, collection: &str, id: &str) -> Result<()>;
    async fn query(&self, query: Query) -> Result<Vec<Value>>;
}

#[async_trait]
pub trait AuthService: Send + Sync {
    /// Registers the account and returns its uid.
    async fn sign_up(&self, email: &str, password: &str) -> Result<String>;
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session>;
    async fn sign_out(&self, session: &Session) -> Result<()>;
    async fn send_password_reset(&self, email: &str) -> Result<()>;
    async fn delete_account(&self, session: &Session) -> Result<()>;
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub uid: String,
    pub email: String,
    pub token: String,
}
