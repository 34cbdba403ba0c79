// src/models/problem.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'problems' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Problem {
    pub id: i64,
    pub title: String,

    /// Marks awarded for passing every test case.
    pub max_marks: f64,
}

/// A contest together with its problems, in display order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contest {
    pub id: i64,
    pub title: String,
    pub problems: Vec<Problem>,
}

/// Represents a row of the 'contests' table.
#[derive(Debug, Clone, FromRow)]
pub struct ContestRow {
    pub id: i64,
    pub title: String,
}

/// DTO for creating a problem.
#[derive(Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProblemRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(range(min = 0.0, max = 10000.0))]
    pub max_marks: f64,
}

/// DTO for creating a contest over existing problems.
#[derive(Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateContestRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    /// Ordered problem list; the order becomes the column order of the ranking table.
    #[validate(length(min = 1, max = 50), custom(function = validate_unique_ids))]
    pub problem_ids: Vec<i64>,
}

fn validate_unique_ids(ids: &[i64]) -> Result<(), validator::ValidationError> {
    let mut seen = std::collections::HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(validator::ValidationError::new("duplicate_problem_id"));
        }
    }
    Ok(())
}
