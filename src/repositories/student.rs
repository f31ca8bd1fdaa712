use db::{
    models::{AvatarKey, Student, STUDENTS},
    FieldUpdate,
};

use super::Remote;
use crate::error::Result;

const ENROLLED: &str = "enrolled_course_ids";
const SAVED: &str = "saved_course_ids";

/// Editable profile fields, `None` leaves the stored value untouched.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub surname: Option<String>,
    pub year: Option<u8>,
    pub avatar: Option<AvatarKey>,
}

impl ProfileUpdate {
    fn into_updates(self) -> Vec<FieldUpdate> {
        let mut updates = Vec::new();

        if let Some(name) = self.name {
            updates.push(FieldUpdate::set("name", name.trim()));
        }

        if let Some(surname) = self.surname {
            updates.push(FieldUpdate::set("surname", surname.trim()));
        }

        if let Some(year) = self.year {
            updates.push(FieldUpdate::set("year", year));
        }

        if let Some(avatar) = self.avatar {
            updates.push(FieldUpdate::set("avatar", avatar.as_str()));
        }

        updates
    }
}

#[derive(Clone)]
pub struct StudentRepository {
    remote: Remote,
}

impl StudentRepository {
    pub(crate) fn new(remote: Remote) -> Self {
        Self { remote }
    }

    pub async fn get(&self, uid: &str) -> Result<Student> {
        self.remote.get(uid).await
    }

    pub async fn find(&self, uid: &str) -> Result<Option<Student>> {
        self.remote.find(uid).await
    }

    pub async fn get_many(&self, uids: &[String]) -> Result<Vec<Student>> {
        self.remote.get_many(uids).await
    }

    pub async fn create(&self, student: &Student) -> Result<()> {
        self.remote.set(&student.id, student).await
    }

    pub async fn update_profile(&self, uid: &str, update: ProfileUpdate) -> Result<()> {
        let updates = update.into_updates();

        if updates.is_empty() {
            return Ok(());
        }

        self.remote.update(STUDENTS, uid, updates).await
    }

    pub async fn delete(&self, uid: &str) -> Result<()> {
        self.remote.delete(STUDENTS, uid).await
    }

    pub async fn enroll(&self, uid: &str, course_id: &str) -> Result<()> {
        let update = FieldUpdate::array_union(ENROLLED, course_id);
        self.remote.update(STUDENTS, uid, vec![update]).await
    }

    pub async fn unenroll(&self, uid: &str, course_id: &str) -> Result<()> {
        let update = FieldUpdate::array_remove(ENROLLED, course_id);
        self.remote.update(STUDENTS, uid, vec![update]).await
    }

    /// Bookmarks a course or a comment.
    pub async fn save(&self, uid: &str, id: &str) -> Result<()> {
        let update = FieldUpdate::array_union(SAVED, id);
        self.remote.update(STUDENTS, uid, vec![update]).await
    }

    pub async fn unsave(&self, uid: &str, id: &str) -> Result<()> {
        let update = FieldUpdate::array_remove(SAVED, id);
        self.remote.update(STUDENTS, uid, vec![update]).await
    }

    /// Flips the enrollment and returns whether the student is now enrolled.
    pub async fn toggle_enrollment(&self, uid: &str, course_id: &str) -> Result<bool> {
        let student = self.get(uid).await?;

        if student.is_enrolled(course_id) {
            self.unenroll(uid, course_id).await?;
            Ok(false)
        } else {
            self.enroll(uid, course_id).await?;
            Ok(true)
        }
    }

    /// Flips the bookmark and returns whether the item is now saved.
    pub async fn toggle_saved(&self, uid: &str, id: &str) -> Result<bool> {
        let student = self.get(uid).await?;

        if student.has_saved(id) {
            self.unsave(uid, id).await?;
            Ok(false)
        } else {
            self.save(uid, id).await?;
            Ok(true)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::Error, testing::seeded_repositories};

    const ADA: &str = "student-ada";

    #[tokio::test]
    async fn saving_twice_round_trips_the_saved_set() {
        let (_, repos) = seeded_repositories().await;
        let before = repos.students.get(ADA).await.unwrap().saved_course_ids;

        assert_eq!(repos.students.toggle_saved(ADA, "cs101").await, Ok(true));
        let saved = repos.students.get(ADA).await.unwrap().saved_course_ids;
        assert_eq!(saved.iter().filter(|id| *id == "cs101").count(), 1);

        assert_eq!(repos.students.toggle_saved(ADA, "cs101").await, Ok(false));
        let after = repos.students.get(ADA).await.unwrap().saved_course_ids;
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn enrolling_is_idempotent() {
        let (_, repos) = seeded_repositories().await;

        repos.students.enroll(ADA, "ee211").await.unwrap();
        repos.students.enroll(ADA, "ee211").await.unwrap();
        let student = repos.students.get(ADA).await.unwrap();
        assert_eq!(
            student
                .enrolled_course_ids
                .iter()
                .filter(|id| *id == "ee211")
                .count(),
            1
        );

        assert_eq!(repos.students.toggle_enrollment(ADA, "ee211").await, Ok(false));
        assert!(!repos.students.get(ADA).await.unwrap().is_enrolled("ee211"));
    }

    #[tokio::test]
    async fn profile_updates_only_touch_given_fields() {
        let (_, repos) = seeded_repositories().await;

        repos
            .students
            .update_profile(
                ADA,
                ProfileUpdate {
                    year: Some(3),
                    avatar: Some(AvatarKey::Penguin),
                    ..ProfileUpdate::default()
                },
            )
            .await
            .unwrap();

        let student = repos.students.get(ADA).await.unwrap();
        assert_eq!(student.year, 3);
        assert_eq!(student.avatar, AvatarKey::Penguin);
        assert_eq!(student.name, "Ada");
    }

    #[tokio::test]
    async fn missing_students() {
        let (_, repos) = seeded_repositories().await;
        assert_eq!(repos.students.get("nobody").await, Err(Error::NotFound));
        assert_eq!(repos.students.find("nobody").await, Ok(None));
        assert_eq!(
            repos.students.enroll("nobody", "cs101").await,
            Err(Error::NotFound)
        );
    }
}
