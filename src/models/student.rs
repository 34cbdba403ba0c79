// src/models/student.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Cohort attributes shared by students and (denormalized) submissions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cohort {
    #[serde(default)]
    pub branch: String,
    #[serde(default)]
    pub semester: String,
    #[serde(default)]
    pub batch: String,
}

/// A roster entry.
///
/// Wire shape follows the roster source: `_id` is the internal key,
/// `id` is the student's roll number shown in tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    /// Empty when the source omitted it; such records are dropped by `normalize`.
    #[serde(rename = "_id", default)]
    pub key: String,

    #[serde(default)]
    pub username: String,

    #[serde(rename = "id", default)]
    pub roll_no: String,

    #[serde(flatten)]
    pub cohort: Cohort,
}

/// Represents the 'students' table in the database.
#[derive(Debug, Clone, FromRow)]
pub struct StudentRow {
    pub id: i64,
    pub roll_no: String,
    pub username: String,
    pub branch: String,
    pub semester: String,
    pub batch: String,
}

impl From<StudentRow> for Student {
    fn from(row: StudentRow) -> Self {
        Student {
            key: row.id.to_string(),
            username: row.username,
            roll_no: row.roll_no,
            cohort: Cohort {
                branch: row.branch,
                semester: row.semester,
                batch: row.batch,
            },
        }
    }
}

/// Response body of the roster source.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterResponse {
    pub students: Vec<Student>,
    pub total_students: usize,
}

/// Query parameters for listing a batch roster.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct RosterParams {
    #[validate(range(min = 1))]
    pub page: Option<usize>,

    #[validate(range(min = 1, max = 100))]
    pub limit: Option<usize>,

    /// Case-insensitive match on username or roll number.
    pub search: Option<String>,
}

/// DTO for enrolling a student.
#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct CreateStudentRequest {
    #[validate(length(min = 1, max = 50))]
    pub roll_no: String,
    #[validate(length(min = 1, max = 100))]
    pub username: String,
    #[validate(length(min = 1, max = 50))]
    pub branch: String,
    #[validate(length(min = 1, max = 20))]
    pub semester: String,
    #[validate(length(min = 1, max = 50))]
    pub batch: String,
}
