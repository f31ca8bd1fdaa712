use async_trait::async_trait;
use db::{Database, Db, FieldUpdate, Query};
use serde_json::Value;

use super::{AuthService, DocumentStore, Session};
use crate::error::{Error, Result};

/// Runs the backend in-process over the dev database, honouring its artificial latency.
#[derive(Clone)]
pub struct LocalBackend {
    db: Db,
}

impl LocalBackend {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Db {
        &self.db
    }

    async fn latency(&self) {
        // Release db before sleeping
        let delay = {
            let db = self.db.lock().await;
            db.delay_get()
        };

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl DocumentStore for LocalBackend {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>> {
        self.latency().await;
        let db = self.db.lock().await;
        Ok(db.document_get(collection, id).cloned())
    }

    async fn set(&self, collection: &str, id: &str, data: Value) -> Result<()> {
        self.latency().await;
        let mut db = self.db.lock().await;
        Ok(db.document_set(collection, id, data)?)
    }

    async fn create(&self, collection: &str, id: &str, data: Value) -> Result<()> {
        self.latency().await;
        let mut db = self.db.lock().await;
        Ok(db.document_create(collection, id, data)?)
    }

    async fn add(&self, collection: &str, data: Value) -> Result<String> {
        self.latency().await;
        let mut db = self.db.lock().await;
        Ok(db.document_add(collection, data)?)
    }

    async fn update(&self, collection: &str, id: &str, updates: Vec<FieldUpdate>) -> Result<()> {
        self.latency().await;
        let mut db = self.db.lock().await;
        db.document_update(collection, id, &updates)?;
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<()> {
        self.latency().await;
        let mut db = self.db.lock().await;
        db.document_delete(collection, id);
        Ok(())
    }

    async fn query(&self, query: Query) -> Result<Vec<Value>> {
        self.latency().await;
        let db = self.db.lock().await;
        let documents = db.document_query(&query)?;
        Ok(documents.into_iter().map(|(_, d)| d.clone()).collect())
    }
}

#[async_trait]
impl AuthService for LocalBackend {
    async fn sign_up(&self, email: &str, password: &str) -> Result<String> {
        self.latency().await;
        let mut db = self.db.lock().await;
        let account = db.auth_sign_up(email, password)?;
        Ok(account.uid.clone())
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        self.latency().await;
        let mut db = self.db.lock().await;
        let (account, token) = db.auth_sign_in(email, password)?;

        Ok(Session {
            uid: account.uid.clone(),
            email: account.email.clone(),
            token,
        })
    }

    async fn sign_out(&self, session: &Session) -> Result<()> {
        self.latency().await;
        let mut db = self.db.lock().await;
        db.auth_sign_out(&session.token);
        Ok(())
    }

    async fn send_password_reset(&self, email: &str) -> Result<()> {
        self.latency().await;
        let mut db = self.db.lock().await;
        Ok(db.auth_request_password_reset(email)?)
    }

    async fn delete_account(&self, session: &Session) -> Result<()> {
        self.latency().await;
        let mut db = self.db.lock().await;

        match db.auth_get_account(&session.token) {
            Some(account) if account.uid == session.uid => {}
            _ => return Err(Error::NotSignedIn),
        }

        db.auth_delete_account(&session.uid);
        Ok(())
    }
}
