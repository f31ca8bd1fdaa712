use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Binds a record type to the collection it is stored in.
pub trait Collection {
    const NAME: &'static str;
}

pub const STUDENTS: &str = "students";
pub const COURSES: &str = "courses";
pub const FACULTIES: &str = "faculties";
pub const DEPARTMENTS: &str = "departments";
pub const INSTRUCTORS: &str = "instructors";
pub const COMMENT_REVIEWS: &str = "comment_reviews";

pub const ALL_COLLECTIONS: [&str; 6] = [
    STUDENTS,
    COURSES,
    FACULTIES,
    DEPARTMENTS,
    INSTRUCTORS,
    COMMENT_REVIEWS,
];

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Student {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub surname: String,
    pub email: String,
    pub year: u8,
    #[serde(default)]
    pub avatar: AvatarKey,
    pub faculty_id: String,
    pub department_id: String,
    #[serde(default)]
    pub enrolled_course_ids: Vec<String>,
    #[serde(default)]
    pub saved_course_ids: Vec<String>,
}

impl Student {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.name, self.surname)
    }

    pub fn is_enrolled(&self, course_id: &str) -> bool {
        self.enrolled_course_ids.iter().any(|id| id == course_id)
    }

    pub fn has_saved(&self, id: &str) -> bool {
        self.saved_course_ids.iter().any(|saved| saved == id)
    }
}

impl Collection for Student {
    const NAME: &'static str = STUDENTS;
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Course {
    #[serde(default)]
    pub id: String,
    pub code: String,
    pub name: String,
    pub faculty_id: String,
    pub credits: u8,
    pub ects: u8,
    /// Derived from `code` and `name`, see `search_key`.
    #[serde(default)]
    pub search_key: String,
    /// `code` without spaces, see `code_key`.
    #[serde(default)]
    pub code_key: String,
    /// Derived from `name` alone.
    #[serde(default)]
    pub name_key: String,
    #[serde(default)]
    pub department_ids: Vec<String>,
    #[serde(default)]
    pub instructor_ids: Vec<String>,
    #[serde(default)]
    pub average_rating: f64,
    #[serde(default)]
    pub rating_count: u32,
}

impl Collection for Course {
    const NAME: &'static str = COURSES;
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Instructor {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub title: Title,
    pub email: String,
    #[serde(default)]
    pub search_key: String,
    #[serde(default)]
    pub department_ids: Vec<String>,
}

impl Instructor {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.title.abbreviation(), self.name)
    }
}

impl Collection for Instructor {
    const NAME: &'static str = INSTRUCTORS;
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub enum Title {
    #[serde(rename = "PROF")]
    Professor,
    #[serde(rename = "ASSOC")]
    AssociateProfessor,
    #[serde(rename = "ASSIST")]
    AssistantProfessor,
    #[serde(rename = "LECT")]
    Lecturer,
    #[serde(rename = "RA")]
    ResearchAssistant,
}

impl Title {
    pub fn abbreviation(&self) -> &'static str {
        match self {
            Self::Professor => "Prof. Dr.",
            Self::AssociateProfessor => "Assoc. Prof. Dr.",
            Self::AssistantProfessor => "Asst. Prof. Dr.",
            Self::Lecturer => "Lect.",
            Self::ResearchAssistant => "Res. Asst.",
        }
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Faculty {
    #[serde(default)]
    pub id: String,
    pub name: String,
}

impl Collection for Faculty {
    const NAME: &'static str = FACULTIES;
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Department {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub faculty_id: String,
}

impl Collection for Department {
    const NAME: &'static str = DEPARTMENTS;
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct CommentReview {
    #[serde(default)]
    pub id: String,
    pub student_id: String,
    pub course_id: String,
    pub rating: u8,
    pub comment: String,
    /// Stored as epoch milliseconds so that the store orders reviews by recency.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

impl CommentReview {
    /// At most one review exists per (course, student) pair, so the pair is the key.
    pub fn document_id(course_id: &str, student_id: &str) -> String {
        format!("{}_{}", course_id, student_id)
    }
}

impl Collection for CommentReview {
    const NAME: &'static str = COMMENT_REVIEWS;
}

/// Symbolic profile picture, resolved to a bundled image by the client.
#[derive(Clone, Copy, Serialize, Debug, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum AvatarKey {
    Owl,
    Fox,
    Cat,
    Panda,
    Penguin,
    #[default]
    Default,
}

impl AvatarKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Owl => "owl",
            Self::Fox => "fox",
            Self::Cat => "cat",
            Self::Panda => "panda",
            Self::Penguin => "penguin",
            Self::Default => "default",
        }
    }

    pub fn from_key(key: &str) -> Self {
        match key {
            "owl" => Self::Owl,
            "fox" => Self::Fox,
            "cat" => Self::Cat,
            "panda" => Self::Panda,
            "penguin" => Self::Penguin,
            _ => Self::Default,
        }
    }
}

// Unknown keys written by older clients fall back to the default picture
impl<'de> Deserialize<'de> for AvatarKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let key = String::deserialize(deserializer)?;
        Ok(Self::from_key(&key))
    }
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct Account {
    pub uid: String,
    pub email: String,
    pub password: String,
}
