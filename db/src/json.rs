use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::io::{Read, Write};
use std::{
    collections::{BTreeMap, HashMap},
    fs::File,
    time::Duration,
};

use super::{
    code_key, is_valid_email, random_id, search_key, seed::seed_db, AuthError, Database,
    DocumentError, FieldUpdate, NewAccount, NewDocument, Query, QueryError, ID_LENGTH,
    MIN_PASSWORD_LENGTH, TOKEN_LENGTH,
};
use crate::models::{Account, COMMENT_REVIEWS, COURSES, INSTRUCTORS};

#[derive(Serialize, Deserialize, Default)]
pub struct JSONDatabase {
    #[serde(skip)]
    filename: Option<String>,
    delay: Duration,
    accounts: HashMap<String, Account>,
    /// Session token to uid. An account may hold several sessions.
    tokens: HashMap<String, String>,
    password_resets: HashMap<String, DateTime<Utc>>,
    collections: HashMap<String, BTreeMap<String, Value>>,
}

impl JSONDatabase {
    pub fn new(filename: String) -> Self {
        // Try to read from disk
        if let Ok(mut db) = Self::from_file(&filename) {
            db.filename = Some(filename);
            return db;
        }

        let mut db = Self {
            filename: Some(filename),
            ..Self::default()
        };

        db.reset();

        db
    }

    /// An empty database that is never written to disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    fn from_file(filename: &str) -> Result<Self, std::io::Error> {
        let contents = {
            let mut file = File::open(filename)?;
            let mut contents = String::new();
            file.read_to_string(&mut contents)?;
            contents
        };

        Ok(serde_json::from_str(&contents)?)
    }

    fn persist(&self) -> Result<(), std::io::Error> {
        let filename = match &self.filename {
            Some(filename) => filename,
            None => return Ok(()),
        };

        let mut output = File::create(filename)?;
        write!(output, "{}", self.dump_as_json()?)?;
        Ok(())
    }

    fn save(&self) {
        if let Err(e) = self.persist() {
            log::error!("could not save DB: {}", e);
        }
    }

    pub fn password_reset_requested_at(&self, email: &str) -> Option<DateTime<Utc>> {
        self.password_resets.get(&email.trim().to_lowercase()).copied()
    }
}

impl Database for JSONDatabase {
    fn delay_set(&mut self, delay: Duration) {
        self.delay = delay;
        self.save();
    }

    fn delay_get(&self) -> Duration {
        self.delay
    }

    fn reset(&mut self) {
        self.delay = Duration::from_millis(0);
        self.accounts.clear();
        self.tokens.clear();
        self.password_resets.clear();
        self.collections.clear();

        seed_db(self);

        self.save();
    }

    fn seed(
        &mut self,
        accounts: impl Iterator<Item = NewAccount>,
        documents: impl Iterator<Item = NewDocument>,
    ) {
        accounts.for_each(|a| {
            let account = Account {
                uid: a.uid,
                email: a.email.trim().to_lowercase(),
                password: a.password,
            };
            self.accounts.insert(account.uid.clone(), account);
        });

        for document in documents {
            if let Err(e) = self._write(document.collection, &document.id, document.data) {
                log::warn!("skipping seed document {}: {}", document.id, e);
            }
        }

        self.save();
    }

    fn dump_as_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self)
    }

    fn auth_sign_up(&mut self, email: &str, password: &str) -> Result<&Account, AuthError> {
        let email = email.trim().to_lowercase();

        if !is_valid_email(&email) {
            return Err(AuthError::InvalidEmail);
        }

        if self._account_by_email(&email).is_some() {
            return Err(AuthError::UserCollision);
        }

        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AuthError::WeakPassword);
        }

        let uid = random_id(ID_LENGTH);
        self.accounts.insert(
            uid.clone(),
            Account {
                uid: uid.clone(),
                email,
                password: password.to_string(),
            },
        );
        self.save();

        Ok(self.accounts.get(&uid).expect("account was just added"))
    }

    fn auth_sign_in(
        &mut self,
        email: &str,
        password: &str,
    ) -> Result<(&Account, String), AuthError> {
        let email = email.trim().to_lowercase();

        if !is_valid_email(&email) {
            return Err(AuthError::InvalidEmail);
        }

        let uid = match self._account_by_email(&email) {
            Some(account) if account.password == password => account.uid.clone(),
            _ => return Err(AuthError::InvalidCredential),
        };

        let token = random_id(TOKEN_LENGTH);
        self.tokens.insert(token.clone(), uid.clone());
        self.save();

        let account = self.accounts.get(&uid).expect("account was just found");
        Ok((account, token))
    }

    fn auth_sign_out(&mut self, token: &str) -> bool {
        let removed = self.tokens.remove(token).is_some();
        self.save();
        removed
    }

    fn auth_get_account(&self, token: &str) -> Option<&Account> {
        let uid = self.tokens.get(token)?;
        self.accounts.get(uid)
    }

    fn auth_request_password_reset(&mut self, email: &str) -> Result<(), AuthError> {
        let email = email.trim().to_lowercase();

        if !is_valid_email(&email) {
            return Err(AuthError::InvalidEmail);
        }

        if self._account_by_email(&email).is_none() {
            return Err(AuthError::UserNotFound);
        }

        log::info!("password reset mail queued for {}", email);
        self.password_resets.insert(email, Utc::now());
        self.save();
        Ok(())
    }

    fn auth_delete_account(&mut self, uid: &str) -> bool {
        let removed = self.accounts.remove(uid).is_some();

        if removed {
            self.tokens.retain(|_, owner| owner != uid);
            self.save();
        }

        removed
    }

    fn document_get(&self, collection: &str, id: &str) -> Option<&Value> {
        self.collections.get(collection)?.get(id)
    }

    fn document_set(
        &mut self,
        collection: &str,
        id: &str,
        data: Value,
    ) -> Result<(), DocumentError> {
        self._write(collection, id, data)?;
        self.save();
        Ok(())
    }

    fn document_create(
        &mut self,
        collection: &str,
        id: &str,
        data: Value,
    ) -> Result<(), DocumentError> {
        if self.document_get(collection, id).is_some() {
            return Err(DocumentError::AlreadyExists);
        }

        self.document_set(collection, id, data)
    }

    fn document_add(&mut self, collection: &str, data: Value) -> Result<String, DocumentError> {
        let mut id = random_id(ID_LENGTH);

        while self.document_get(collection, &id).is_some() {
            id = random_id(ID_LENGTH);
        }

        self.document_set(collection, &id, data)?;
        Ok(id)
    }

    fn document_update(
        &mut self,
        collection: &str,
        id: &str,
        updates: &[FieldUpdate],
    ) -> Result<bool, DocumentError> {
        let mut document = match self.document_get(collection, id) {
            Some(Value::Object(document)) => document.clone(),
            _ => return Err(DocumentError::NotFound),
        };

        let mut updated = false;

        for update in updates {
            updated |= apply_update(&mut document, update)?;
        }

        if updated {
            self._write(collection, id, Value::Object(document))?;
            self.save();
        }

        Ok(updated)
    }

    fn document_delete(&mut self, collection: &str, id: &str) -> bool {
        let removed = self
            .collections
            .get_mut(collection)
            .and_then(|documents| documents.remove(id));

        match removed {
            Some(document) => {
                self._after_write(collection, &document);
                self.save();
                true
            }
            None => false,
        }
    }

    fn document_query(&self, query: &Query) -> Result<Vec<(&String, &Value)>, QueryError> {
        query.validate()?;

        Ok(match self.collections.get(&query.collection) {
            Some(documents) => query.run(documents.iter()),
            None => Vec::new(),
        })
    }
}

impl JSONDatabase {
    fn _account_by_email(&self, email: &str) -> Option<&Account> {
        self.accounts.values().find(|a| a.email == email)
    }

    /// Stores the document without persisting, keeping derived fields up to date.
    fn _write(&mut self, collection: &str, id: &str, data: Value) -> Result<(), DocumentError> {
        let mut document = match data {
            Value::Object(document) => document,
            _ => return Err(DocumentError::NotAnObject),
        };

        document.insert("id".to_string(), Value::String(id.to_string()));
        derive_keys(collection, &mut document);

        let previous = self
            .collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), Value::Object(document.clone()));

        // A review moved to another course must refresh the old course too
        if let Some(previous) = previous {
            if previous.get("course_id") != document.get("course_id") {
                self._after_write(collection, &previous);
            }
        }

        self._after_write(collection, &Value::Object(document));
        Ok(())
    }

    fn _after_write(&mut self, collection: &str, document: &Value) {
        if collection == COMMENT_REVIEWS {
            if let Some(Value::String(course_id)) = document.get("course_id") {
                let course_id = course_id.clone();
                self._refresh_course_rating(&course_id);
            }
        }
    }

    /// Maintains the denormalized rating fields of a course from its reviews.
    fn _refresh_course_rating(&mut self, course_id: &str) {
        let ratings: Vec<f64> = self
            .collections
            .get(COMMENT_REVIEWS)
            .map(|reviews| {
                reviews
                    .values()
                    .filter(|r| r.get("course_id").and_then(Value::as_str) == Some(course_id))
                    .filter_map(|r| r.get("rating").and_then(Value::as_f64))
                    .collect()
            })
            .unwrap_or_default();

        let course = self
            .collections
            .get_mut(COURSES)
            .and_then(|courses| courses.get_mut(course_id))
            .and_then(Value::as_object_mut);

        if let Some(course) = course {
            let count = ratings.len();
            let average = if count == 0 {
                0.0
            } else {
                ratings.iter().sum::<f64>() / count as f64
            };

            course.insert("average_rating".to_string(), Value::from(average));
            course.insert("rating_count".to_string(), Value::from(count as u64));
        }
    }
}

fn derive_keys(collection: &str, document: &mut Map<String, Value>) {
    let derived: Vec<(&str, String)> = match collection {
        COURSES => {
            let code = document.get("code").and_then(Value::as_str);
            let name = document.get("name").and_then(Value::as_str);
            let mut derived = Vec::new();
            if let Some(code) = code {
                derived.push(("code_key", code_key(code)));
            }
            if let Some(name) = name {
                derived.push(("name_key", search_key(name)));
            }
            let full: Vec<&str> = code.into_iter().chain(name).collect();
            if !full.is_empty() {
                derived.push(("search_key", search_key(&full.join(" "))));
            }
            derived
        }
        INSTRUCTORS => document
            .get("name")
            .and_then(Value::as_str)
            .map(|name| vec![("search_key", search_key(name))])
            .unwrap_or_default(),
        _ => Vec::new(),
    };

    for (field, key) in derived {
        document.insert(field.to_string(), Value::String(key));
    }
}

/// Applies one update, returning whether the document changed.
fn apply_update(
    document: &mut Map<String, Value>,
    update: &FieldUpdate,
) -> Result<bool, DocumentError> {
    match update {
        FieldUpdate::Set { field, value } => {
            let previous = document.insert(field.clone(), value.clone());
            Ok(previous.as_ref() != Some(value))
        }
        FieldUpdate::ArrayUnion { field, values } => {
            let items = array_field(document, field)?;
            let mut updated = false;

            for value in values {
                if !items.contains(value) {
                    items.push(value.clone());
                    updated = true;
                }
            }

            Ok(updated)
        }
        FieldUpdate::ArrayRemove { field, values } => {
            let items = array_field(document, field)?;
            let before = items.len();
            items.retain(|item| !values.contains(item));
            Ok(items.len() != before)
        }
        FieldUpdate::Increment { field, by } => {
            let current = match document.get(field) {
                None | Some(Value::Null) => 0.0,
                Some(value) => value
                    .as_f64()
                    .ok_or_else(|| DocumentError::NotANumber(field.clone()))?,
            };

            document.insert(field.clone(), Value::from(current + by));
            Ok(*by != 0.0)
        }
    }
}

fn array_field<'a>(
    document: &'a mut Map<String, Value>,
    field: &str,
) -> Result<&'a mut Vec<Value>, DocumentError> {
    let value = document
        .entry(field.to_string())
        .or_insert_with(|| Value::Array(Vec::new()));

    match value {
        Value::Array(items) => Ok(items),
        _ => Err(DocumentError::NotAnArray(field.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{Course, STUDENTS},
        Filter,
    };
    use serde_json::json;

    fn course(code: &str, name: &str) -> Value {
        json!({
            "code": code,
            "name": name,
            "faculty_id": "eng",
            "credits": 3,
            "ects": 6,
        })
    }

    #[test]
    fn writes_derive_search_keys() {
        let mut db = JSONDatabase::in_memory();
        db.document_set(COURSES, "c1", course("CS 101", "Introduction à Python"))
            .unwrap();

        let stored: Course =
            serde_json::from_value(db.document_get(COURSES, "c1").unwrap().clone()).unwrap();
        assert_eq!(stored.id, "c1");
        assert_eq!(stored.search_key, "cs 101 introduction a python");
        assert_eq!(stored.code_key, "cs101");
        assert_eq!(stored.name_key, "introduction a python");
    }

    #[test]
    fn create_refuses_existing_documents() {
        let mut db = JSONDatabase::in_memory();
        db.document_create(COURSES, "c1", course("CS101", "A")).unwrap();

        assert_eq!(
            db.document_create(COURSES, "c1", course("CS101", "B")),
            Err(DocumentError::AlreadyExists)
        );
        assert_eq!(
            db.document_set(COURSES, "c2", json!([1, 2])),
            Err(DocumentError::NotAnObject)
        );
    }

    #[test]
    fn array_updates_behave_like_sets() {
        let mut db = JSONDatabase::in_memory();
        db.document_set(STUDENTS, "s1", json!({"enrolled_course_ids": ["c1"]}))
            .unwrap();

        let union = [FieldUpdate::array_union("enrolled_course_ids", "c2")];
        assert_eq!(db.document_update(STUDENTS, "s1", &union), Ok(true));
        assert_eq!(db.document_update(STUDENTS, "s1", &union), Ok(false));

        let remove = [FieldUpdate::array_remove("enrolled_course_ids", "c1")];
        assert_eq!(db.document_update(STUDENTS, "s1", &remove), Ok(true));

        assert_eq!(
            db.document_get(STUDENTS, "s1").unwrap()["enrolled_course_ids"],
            json!(["c2"])
        );
        assert_eq!(
            db.document_update(STUDENTS, "missing", &remove),
            Err(DocumentError::NotFound)
        );
    }

    #[test]
    fn increment_starts_from_zero() {
        let mut db = JSONDatabase::in_memory();
        db.document_set(STUDENTS, "s1", json!({"name": "Ada"})).unwrap();

        let update = [FieldUpdate::Increment {
            field: "year".to_string(),
            by: 1.0,
        }];
        db.document_update(STUDENTS, "s1", &update).unwrap();
        db.document_update(STUDENTS, "s1", &update).unwrap();
        assert_eq!(db.document_get(STUDENTS, "s1").unwrap()["year"], json!(2.0));

        let bad = [FieldUpdate::Increment {
            field: "name".to_string(),
            by: 1.0,
        }];
        assert_eq!(
            db.document_update(STUDENTS, "s1", &bad),
            Err(DocumentError::NotANumber("name".to_string()))
        );
    }

    #[test]
    fn reviews_maintain_course_rating() {
        let mut db = JSONDatabase::in_memory();
        db.document_set(COURSES, "c1", course("CS101", "A")).unwrap();

        for (student, rating) in [("s1", 4), ("s2", 5)] {
            db.document_set(
                COMMENT_REVIEWS,
                &format!("c1_{}", student),
                json!({
                    "student_id": student,
                    "course_id": "c1",
                    "rating": rating,
                    "comment": "ok",
                    "created_at": 1_704_067_200_000u64,
                }),
            )
            .unwrap();
        }

        let stored = db.document_get(COURSES, "c1").unwrap();
        assert_eq!(stored["average_rating"], json!(4.5));
        assert_eq!(stored["rating_count"], json!(2));

        assert!(db.document_delete(COMMENT_REVIEWS, "c1_s2"));
        assert!(db.document_delete(COMMENT_REVIEWS, "c1_s1"));
        let stored = db.document_get(COURSES, "c1").unwrap();
        assert_eq!(stored["average_rating"], json!(0.0));
        assert_eq!(stored["rating_count"], json!(0));
    }

    #[test]
    fn accounts_lifecycle() {
        let mut db = JSONDatabase::in_memory();

        assert_eq!(
            db.auth_sign_up("not-an-email", "secret1").err(),
            Some(AuthError::InvalidEmail)
        );
        assert_eq!(
            db.auth_sign_up("ada@uni.edu", "123").err(),
            Some(AuthError::WeakPassword)
        );

        let uid = db.auth_sign_up("Ada@Uni.edu", "secret1").unwrap().uid.clone();
        assert_eq!(
            db.auth_sign_up("ada@uni.edu", "another1").err(),
            Some(AuthError::UserCollision)
        );
        assert_eq!(
            db.auth_sign_in("ada@uni.edu", "wrong").err(),
            Some(AuthError::InvalidCredential)
        );

        let token = {
            let (account, token) = db.auth_sign_in("ada@uni.edu", "secret1").unwrap();
            assert_eq!(account.uid, uid);
            token
        };
        assert_eq!(token.len(), TOKEN_LENGTH);
        assert_eq!(db.auth_get_account(&token).map(|a| a.uid.clone()), Some(uid.clone()));

        assert_eq!(
            db.auth_request_password_reset("nobody@uni.edu"),
            Err(AuthError::UserNotFound)
        );
        db.auth_request_password_reset("ada@uni.edu").unwrap();
        assert!(db.password_reset_requested_at("ada@uni.edu").is_some());

        assert!(db.auth_delete_account(&uid));
        assert!(db.auth_get_account(&token).is_none());
        assert!(!db.auth_sign_out(&token));
    }

    #[test]
    fn sessions_are_independent() {
        let mut db = JSONDatabase::in_memory();
        let uid = db.auth_sign_up("ada@uni.edu", "secret1").unwrap().uid.clone();

        let first = db.auth_sign_in("ada@uni.edu", "secret1").unwrap().1;
        let second = db.auth_sign_in("ada@uni.edu", "secret1").unwrap().1;
        assert_ne!(first, second);
        assert_eq!(db.auth_get_account(&first).map(|a| a.uid.clone()), Some(uid.clone()));
        assert_eq!(db.auth_get_account(&second).map(|a| a.uid.clone()), Some(uid.clone()));

        assert!(db.auth_sign_out(&first));
        assert!(db.auth_get_account(&first).is_none());
        assert!(db.auth_get_account(&second).is_some());

        let third = db.auth_sign_in("ada@uni.edu", "secret1").unwrap().1;
        assert!(db.auth_delete_account(&uid));
        assert!(db.auth_get_account(&second).is_none());
        assert!(db.auth_get_account(&third).is_none());
    }

    #[test]
    fn query_unknown_collection_is_empty() {
        let db = JSONDatabase::in_memory();
        let results = db
            .document_query(&Query::new("nothing").filter(Filter::eq("a", 1)))
            .unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn dump_round_trips_through_json() {
        let mut db = JSONDatabase::in_memory();
        db.reset();

        let dumped = db.dump_as_json().unwrap();
        let restored: JSONDatabase = serde_json::from_str(&dumped).unwrap();
        assert_eq!(
            restored.document_query(&Query::new(COURSES)).unwrap().len(),
            db.document_query(&Query::new(COURSES)).unwrap().len()
        );
    }
}
