use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{sync::Arc, time::Duration};
use thiserror::Error;
use tokio::sync::Mutex;

mod json;
pub mod models;
pub mod query;
mod seed;

pub use json::JSONDatabase;
pub use query::{Filter, OrderBy, Query, QueryError};

use models::Account;

/// Length of generated document ids.
pub const ID_LENGTH: usize = 20;
/// Length of generated session tokens.
pub const TOKEN_LENGTH: usize = 25;
pub const MIN_PASSWORD_LENGTH: usize = 6;

pub type Db = Arc<Mutex<JSONDatabase>>;

pub fn new_db(filename: String) -> Db {
    Arc::new(Mutex::new(JSONDatabase::new(filename)))
}

pub fn new_memory_db() -> Db {
    Arc::new(Mutex::new(JSONDatabase::in_memory()))
}

/// Storage operations of the dev backend, shared by the HTTP routes and the in-process backend.
pub trait Database {
    fn reset(&mut self);
    fn seed(
        &mut self,
        accounts: impl Iterator<Item = NewAccount>,
        documents: impl Iterator<Item = NewDocument>,
    );
    fn dump_as_json(&self) -> Result<String, serde_json::Error>;

    fn delay_set(&mut self, delay: Duration);
    fn delay_get(&self) -> Duration;

    fn auth_sign_up(&mut self, email: &str, password: &str) -> Result<&Account, AuthError>;
    fn auth_sign_in(&mut self, email: &str, password: &str)
        -> Result<(&Account, String), AuthError>;
    fn auth_sign_out(&mut self, token: &str) -> bool;
    fn auth_get_account(&self, token: &str) -> Option<&Account>;
    fn auth_request_password_reset(&mut self, email: &str) -> Result<(), AuthError>;
    fn auth_delete_account(&mut self, uid: &str) -> bool;

    fn document_get(&self, collection: &str, id: &str) -> Option<&Value>;
    fn document_set(&mut self, collection: &str, id: &str, data: Value)
        -> Result<(), DocumentError>;
    fn document_create(
        &mut self,
        collection: &str,
        id: &str,
        data: Value,
    ) -> Result<(), DocumentError>;
    fn document_add(&mut self, collection: &str, data: Value) -> Result<String, DocumentError>;
    fn document_update(
        &mut self,
        collection: &str,
        id: &str,
        updates: &[FieldUpdate],
    ) -> Result<bool, DocumentError>;
    fn document_delete(&mut self, collection: &str, id: &str) -> bool;
    fn document_query(&self, query: &Query) -> Result<Vec<(&String, &Value)>, QueryError>;
}

#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum AuthError {
    #[error("the email or password is incorrect")]
    InvalidCredential,
    #[error("an account already exists for this email")]
    UserCollision,
    #[error("the password must be at least {MIN_PASSWORD_LENGTH} characters")]
    WeakPassword,
    #[error("the email address is badly formatted")]
    InvalidEmail,
    #[error("no account exists for this email")]
    UserNotFound,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DocumentError {
    #[error("the document could not be found")]
    NotFound,
    #[error("the document already exists")]
    AlreadyExists,
    #[error("a document must be a JSON object")]
    NotAnObject,
    #[error("field `{0}` does not hold an array")]
    NotAnArray(String),
    #[error("field `{0}` does not hold a number")]
    NotANumber(String),
}

/// A single field mutation applied by `Database::document_update`.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum FieldUpdate {
    Set { field: String, value: Value },
    /// Appends every value not already present.
    ArrayUnion { field: String, values: Vec<Value> },
    /// Removes every occurrence of the values.
    ArrayRemove { field: String, values: Vec<Value> },
    Increment { field: String, by: f64 },
}

impl FieldUpdate {
    pub fn set(field: &str, value: impl Into<Value>) -> Self {
        Self::Set {
            field: field.to_string(),
            value: value.into(),
        }
    }

    pub fn array_union(field: &str, value: impl Into<Value>) -> Self {
        Self::ArrayUnion {
            field: field.to_string(),
            values: vec![value.into()],
        }
    }

    pub fn array_remove(field: &str, value: impl Into<Value>) -> Self {
        Self::ArrayRemove {
            field: field.to_string(),
            values: vec![value.into()],
        }
    }
}

pub struct NewAccount {
    pub uid: String,
    pub email: String,
    pub password: String,
}

pub struct NewDocument {
    pub collection: &'static str,
    pub id: String,
    pub data: Value,
}

/// Normalized form used by the prefix searches: ASCII, trimmed and lowercase.
pub fn search_key(text: &str) -> String {
    unidecode::unidecode(text.trim()).to_ascii_lowercase()
}

/// Course codes are matched without their inner spaces, so "cs 101" finds "CS101".
pub fn code_key(code: &str) -> String {
    search_key(code).replace(' ', "")
}

pub fn random_id(length: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();

    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let (local, domain) = match email.split_once('@') {
        Some(parts) => parts,
        None => return false,
    };

    !local.is_empty()
        && !domain.contains('@')
        && domain
            .split_once('.')
            .map(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
            .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_keys_are_transliterated() {
        assert_eq!(search_key("  Çağrı Öztürk "), "cagri ozturk");
        assert_eq!(code_key("CS 101"), "cs101");
    }

    #[test]
    fn email_validation() {
        assert!(is_valid_email("ada@uni.edu.tr"));
        assert!(!is_valid_email("ada@uni"));
        assert!(!is_valid_email("@uni.edu"));
        assert!(!is_valid_email("ada uni@uni.edu"));
        assert!(!is_valid_email("ada@@uni.edu"));
        assert!(!is_valid_email("ada.uni.edu"));
    }

    #[test]
    fn random_ids_have_requested_length() {
        let id = random_id(ID_LENGTH);
        assert_eq!(id.len(), ID_LENGTH);
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
