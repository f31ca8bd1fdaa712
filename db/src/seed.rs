use chrono::{Duration, TimeZone, Utc};
use serde_json::json;

use super::{Database, NewAccount, NewDocument};
use crate::models::{
    CommentReview, COMMENT_REVIEWS, COURSES, DEPARTMENTS, FACULTIES, INSTRUCTORS, STUDENTS,
};

pub fn seed_db<D: Database>(db: &mut D) {
    let documents = test_faculties()
        .into_iter()
        .chain(test_departments())
        .chain(test_instructors())
        .chain(test_courses())
        .chain(test_students())
        .chain(test_reviews());

    db.seed(test_accounts().into_iter(), documents);
}

fn test_accounts() -> Vec<NewAccount> {
    vec![
        NewAccount {
            uid: "student-ada".to_string(),
            email: "ada@uni.edu.tr".to_string(),
            password: "student.ada".to_string(),
        },
        NewAccount {
            uid: "student-mert".to_string(),
            email: "mert@uni.edu.tr".to_string(),
            password: "student.mert".to_string(),
        },
        NewAccount {
            uid: "student-zeynep".to_string(),
            email: "zeynep@uni.edu.tr".to_string(),
            password: "student.zeynep".to_string(),
        },
    ]
}

fn test_faculties() -> Vec<NewDocument> {
    [("engineering", "Faculty of Engineering"), ("science", "Faculty of Science")]
        .iter()
        .map(|(id, name)| NewDocument {
            collection: FACULTIES,
            id: id.to_string(),
            data: json!({ "name": name }),
        })
        .collect()
}

fn test_departments() -> Vec<NewDocument> {
    [
        ("computer-engineering", "Computer Engineering", "engineering"),
        ("electrical-engineering", "Electrical Engineering", "engineering"),
        ("mathematics", "Mathematics", "science"),
        ("physics", "Physics", "science"),
    ]
    .iter()
    .map(|(id, name, faculty_id)| NewDocument {
        collection: DEPARTMENTS,
        id: id.to_string(),
        data: json!({ "name": name, "faculty_id": faculty_id }),
    })
    .collect()
}

fn test_instructors() -> Vec<NewDocument> {
    [
        ("i-ozturk", "Çağrı Öztürk", "PROF", "computer-engineering"),
        ("i-demir", "Elif Demir", "ASSOC", "computer-engineering"),
        ("i-kaya", "Burak Kaya", "ASSIST", "electrical-engineering"),
        ("i-sahin", "Ayşe Şahin", "PROF", "mathematics"),
        ("i-celik", "Emre Çelik", "LECT", "physics"),
    ]
    .iter()
    .map(|(id, name, title, department_id)| NewDocument {
        collection: INSTRUCTORS,
        id: id.to_string(),
        data: json!({
            "name": name,
            "title": title,
            "email": format!("{}@uni.edu.tr", id.trim_start_matches("i-")),
            "department_ids": [department_id],
        }),
    })
    .collect()
}

type CourseRow = (
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    &'static [&'static str],
    &'static [&'static str],
    u8,
    u8,
);

type StudentRow = (
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    u8,
    &'static str,
    &'static [&'static str],
);

fn test_courses() -> Vec<NewDocument> {
    let courses: [CourseRow; 7] = [
        ("cs101", "CS 101", "Introduction to Programming", "engineering", &["computer-engineering"], &["i-ozturk"], 3, 6),
        ("cs201", "CS 201", "Data Structures", "engineering", &["computer-engineering"], &["i-demir", "i-ozturk"], 3, 7),
        ("cs315", "CS 315", "Programming Languages", "engineering", &["computer-engineering"], &["i-demir"], 3, 6),
        ("ee211", "EE 211", "Circuit Theory", "engineering", &["electrical-engineering"], &["i-kaya"], 4, 7),
        ("math101", "MATH 101", "Calculus I", "science", &["mathematics", "computer-engineering", "electrical-engineering"], &["i-sahin"], 4, 8),
        ("math221", "MATH 221", "Linear Algebra", "science", &["mathematics", "computer-engineering"], &["i-sahin"], 3, 6),
        ("phys101", "PHYS 101", "General Physics", "science", &["physics", "electrical-engineering"], &["i-celik"], 4, 7),
    ];

    courses
        .iter()
        .map(
            |(id, code, name, faculty_id, departments, instructors, credits, ects)| NewDocument {
                collection: COURSES,
                id: id.to_string(),
                data: json!({
                    "code": code,
                    "name": name,
                    "faculty_id": faculty_id,
                    "credits": credits,
                    "ects": ects,
                    "department_ids": departments,
                    "instructor_ids": instructors,
                    "average_rating": 0.0,
                    "rating_count": 0,
                }),
            },
        )
        .collect()
}

fn test_students() -> Vec<NewDocument> {
    let students: [StudentRow; 3] = [
        ("student-ada", "Ada", "Yılmaz", "ada@uni.edu.tr", 2, "owl", &["cs201", "math221"]),
        ("student-mert", "Mert", "Aydın", "mert@uni.edu.tr", 1, "fox", &["cs101", "math101", "phys101"]),
        ("student-zeynep", "Zeynep", "Arslan", "zeynep@uni.edu.tr", 3, "panda", &["cs315", "ee211"]),
    ];

    students
        .iter()
        .map(|(id, name, surname, email, year, avatar, enrolled)| NewDocument {
            collection: STUDENTS,
            id: id.to_string(),
            data: json!({
                "name": name,
                "surname": surname,
                "email": email,
                "year": year,
                "avatar": avatar,
                "faculty_id": "engineering",
                "department_id": "computer-engineering",
                "enrolled_course_ids": enrolled,
                "saved_course_ids": [],
            }),
        })
        .collect()
}

fn test_reviews() -> Vec<NewDocument> {
    let start = Utc
        .with_ymd_and_hms(2024, 2, 12, 9, 0, 0)
        .single()
        .expect("seed date is valid");

    [
        ("cs101", "student-ada", 5, "Great first course, the weekly labs help a lot."),
        ("cs101", "student-zeynep", 4, "Clear lectures, a bit slow at the start."),
        ("cs201", "student-zeynep", 4, "Heavy workload but you learn a lot."),
        ("math101", "student-ada", 3, "Exams are much harder than the homework."),
        ("math101", "student-zeynep", 2, "Hard to follow without the textbook."),
        ("phys101", "student-ada", 4, "Fun experiments."),
    ]
    .iter()
    .enumerate()
    .map(|(i, (course_id, student_id, rating, comment))| NewDocument {
        collection: COMMENT_REVIEWS,
        id: CommentReview::document_id(course_id, student_id),
        data: json!({
            "student_id": student_id,
            "course_id": course_id,
            "rating": rating,
            "comment": comment,
            "created_at": (start + Duration::days(i as i64)).timestamp_millis(),
        }),
    })
    .collect()
}
