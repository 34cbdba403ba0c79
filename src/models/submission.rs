// src/models/submission.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::student::{Cohort, Student};

/// A submission as returned by the submission source.
///
/// Every scalar is optional on the wire; `analytics::normalize` turns this
/// into a canonical `Submission` with defaults applied.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSubmission {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Populated student profile of the submitter.
    #[serde(rename = "user_id", default)]
    pub user: Option<Student>,

    #[serde(rename = "problem_id", default, skip_serializing_if = "Option::is_none")]
    pub problem_id: Option<String>,

    #[serde(rename = "contest_id", default, skip_serializing_if = "Option::is_none")]
    pub contest_id: Option<String>,

    #[serde(default)]
    pub number_of_test_case: Option<i64>,

    #[serde(default)]
    pub number_of_test_case_pass: Option<i64>,

    #[serde(default)]
    pub marks: Option<f64>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub language: Option<String>,
}

/// Flat row of `submissions` joined with `students`.
#[derive(Debug, Clone, FromRow)]
pub struct SubmissionRow {
    pub id: i64,
    pub problem_id: i64,
    pub contest_id: Option<i64>,
    pub number_of_test_case: Option<i32>,
    pub number_of_test_case_pass: Option<i32>,
    pub marks: Option<f64>,
    pub language: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub student_id: i64,
    pub roll_no: String,
    pub username: String,
    pub branch: String,
    pub semester: String,
    pub batch: String,
}

impl From<SubmissionRow> for RawSubmission {
    fn from(row: SubmissionRow) -> Self {
        RawSubmission {
            id: Some(row.id.to_string()),
            user: Some(Student {
                key: row.student_id.to_string(),
                username: row.username,
                roll_no: row.roll_no,
                cohort: Cohort {
                    branch: row.branch,
                    semester: row.semester,
                    batch: row.batch,
                },
            }),
            problem_id: Some(row.problem_id.to_string()),
            contest_id: row.contest_id.map(|id| id.to_string()),
            number_of_test_case: row.number_of_test_case.map(i64::from),
            number_of_test_case_pass: row.number_of_test_case_pass.map(i64::from),
            marks: row.marks,
            created_at: row.created_at,
            language: row.language,
        }
    }
}

/// Response body of the submission source.
#[derive(Debug, Serialize, Deserialize)]
pub struct SubmissionsResponse {
    pub submissions: Vec<RawSubmission>,
}

/// Which slice of the submission source to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionView {
    All,
    BestOnly,
}

/// DTO for recording a judged submission.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubmissionRequest {
    pub student_id: i64,
    pub problem_id: i64,
    pub contest_id: Option<i64>,

    #[validate(range(min = 0, max = 10000))]
    pub number_of_test_case: i32,

    #[validate(range(min = 0, max = 10000))]
    pub number_of_test_case_pass: i32,

    /// Omitted marks are derived from the problem's max marks and the pass ratio.
    #[validate(range(min = 0.0))]
    pub marks: Option<f64>,

    #[validate(length(min = 1, max = 30))]
    pub language: String,
}

/// A submission ready to be persisted, with marks resolved.
#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub student_id: i64,
    pub problem_id: i64,
    pub contest_id: Option<i64>,
    pub number_of_test_case: i32,
    pub number_of_test_case_pass: i32,
    pub marks: f64,
    pub language: String,
    pub created_at: DateTime<Utc>,
}
