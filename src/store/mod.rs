// src/store/mod.rs

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::{
    analytics::cohort::CohortFilter,
    error::AppError,
    models::{
        problem::{Contest, CreateContestRequest, CreateProblemRequest, Problem},
        student::{CreateStudentRequest, Student},
        submission::{NewSubmission, RawSubmission},
    },
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Backing data source for rosters, problems, contests and submissions.
///
/// Reads return raw wire records; all analytics happen above this layer.
#[async_trait]
pub trait JudgeStore: Send + Sync {
    /// Students matching `filter`, ordered by roll number.
    async fn roster(&self, filter: &CohortFilter) -> Result<Vec<Student>, AppError>;

    async fn problem(&self, id: i64) -> Result<Option<Problem>, AppError>;

    /// Every attempt on a problem, oldest first.
    async fn problem_submissions(&self, problem_id: i64) -> Result<Vec<RawSubmission>, AppError>;

    /// A contest with its problems in display order.
    async fn contest(&self, id: i64) -> Result<Option<Contest>, AppError>;

    /// Every attempt made inside a contest, oldest first.
    async fn contest_submissions(&self, contest_id: i64) -> Result<Vec<RawSubmission>, AppError>;

    async fn create_student(&self, req: &CreateStudentRequest) -> Result<i64, AppError>;

    async fn create_problem(&self, req: &CreateProblemRequest) -> Result<i64, AppError>;

    async fn create_contest(&self, req: &CreateContestRequest) -> Result<i64, AppError>;

    async fn record_submission(&self, submission: &NewSubmission) -> Result<i64, AppError>;
}
