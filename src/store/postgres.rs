// src/store/postgres.rs

use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    analytics::cohort::CohortFilter,
    error::AppError,
    models::{
        problem::{Contest, ContestRow, CreateContestRequest, CreateProblemRequest, Problem},
        student::{CreateStudentRequest, Student, StudentRow},
        submission::{NewSubmission, RawSubmission, SubmissionRow},
    },
    store::JudgeStore,
};

const SUBMISSION_COLUMNS: &str = r#"
    s.id, s.problem_id, s.contest_id,
    s.number_of_test_case, s.number_of_test_case_pass,
    s.marks, s.language, s.created_at,
    st.id AS student_id, st.roll_no, st.username, st.branch, st.semester, st.batch
"#;

/// Postgres-backed store. Schema lives in `migrations/`.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Maps constraint violations on writes to client errors.
fn write_error(e: sqlx::Error, what: &str) -> AppError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            return AppError::Conflict(format!("{} already exists", what));
        }
        if db.is_foreign_key_violation() {
            return AppError::NotFound(format!("{} references a missing record", what));
        }
        if db.is_check_violation() {
            return AppError::BadRequest(format!("{} violates a constraint", what));
        }
    }
    tracing::error!("Failed to write {}: {:?}", what, e);
    AppError::InternalServerError(e.to_string())
}

#[async_trait]
impl JudgeStore for PgStore {
    async fn roster(&self, filter: &CohortFilter) -> Result<Vec<Student>, AppError> {
        let rows = sqlx::query_as::<_, StudentRow>(
            r#"
            SELECT id, roll_no, username, branch, semester, batch
            FROM students
            WHERE ($1::TEXT IS NULL OR LOWER(TRIM(branch)) = LOWER(TRIM($1)))
              AND ($2::TEXT IS NULL OR LOWER(TRIM(semester)) = LOWER(TRIM($2)))
              AND ($3::TEXT IS NULL OR LOWER(TRIM(batch)) = LOWER(TRIM($3)))
            ORDER BY roll_no
            "#,
        )
        .bind(filter.branch.as_deref())
        .bind(filter.semester.as_deref())
        .bind(filter.batch.as_deref())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch roster: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

        Ok(rows.into_iter().map(Student::from).collect())
    }

    async fn problem(&self, id: i64) -> Result<Option<Problem>, AppError> {
        let problem = sqlx::query_as::<_, Problem>(
            "SELECT id, title, max_marks FROM problems WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(problem)
    }

    async fn problem_submissions(&self, problem_id: i64) -> Result<Vec<RawSubmission>, AppError> {
        let sql = format!(
            r#"
            SELECT {}
            FROM submissions s
            JOIN students st ON st.id = s.student_id
            WHERE s.problem_id = $1
            ORDER BY s.created_at, s.id
            "#,
            SUBMISSION_COLUMNS
        );

        let rows = sqlx::query_as::<_, SubmissionRow>(&sql)
            .bind(problem_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch problem submissions: {:?}", e);
                AppError::InternalServerError(e.to_string())
            })?;

        Ok(rows.into_iter().map(RawSubmission::from).collect())
    }

    async fn contest(&self, id: i64) -> Result<Option<Contest>, AppError> {
        let Some(contest) =
            sqlx::query_as::<_, ContestRow>("SELECT id, title FROM contests WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?
        else {
            return Ok(None);
        };

        let problems = sqlx::query_as::<_, Problem>(
            r#"
            SELECT p.id, p.title, p.max_marks
            FROM contest_problems cp
            JOIN problems p ON p.id = cp.problem_id
            WHERE cp.contest_id = $1
            ORDER BY cp.position
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(Contest {
            id: contest.id,
            title: contest.title,
            problems,
        }))
    }

    async fn contest_submissions(&self, contest_id: i64) -> Result<Vec<RawSubmission>, AppError> {
        let sql = format!(
            r#"
            SELECT {}
            FROM submissions s
            JOIN students st ON st.id = s.student_id
            WHERE s.contest_id = $1
            ORDER BY s.created_at, s.id
            "#,
            SUBMISSION_COLUMNS
        );

        let rows = sqlx::query_as::<_, SubmissionRow>(&sql)
            .bind(contest_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch contest submissions: {:?}", e);
                AppError::InternalServerError(e.to_string())
            })?;

        Ok(rows.into_iter().map(RawSubmission::from).collect())
    }

    async fn create_student(&self, req: &CreateStudentRequest) -> Result<i64, AppError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO students (roll_no, username, branch, semester, batch)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(&req.roll_no)
        .bind(&req.username)
        .bind(&req.branch)
        .bind(&req.semester)
        .bind(&req.batch)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| write_error(e, &format!("Student '{}'", req.roll_no)))?;

        Ok(id)
    }

    async fn create_problem(&self, req: &CreateProblemRequest) -> Result<i64, AppError> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO problems (title, max_marks) VALUES ($1, $2) RETURNING id",
        )
        .bind(&req.title)
        .bind(req.max_marks)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| write_error(e, "Problem"))?;

        Ok(id)
    }

    async fn create_contest(&self, req: &CreateContestRequest) -> Result<i64, AppError> {
        let mut tx = self.pool.begin().await?;

        let id: i64 = sqlx::query_scalar("INSERT INTO contests (title) VALUES ($1) RETURNING id")
            .bind(&req.title)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| write_error(e, "Contest"))?;

        for (position, problem_id) in req.problem_ids.iter().enumerate() {
            sqlx::query(
                "INSERT INTO contest_problems (contest_id, problem_id, position) VALUES ($1, $2, $3)",
            )
            .bind(id)
            .bind(problem_id)
            .bind(position as i32)
            .execute(&mut *tx)
            .await
            .map_err(|e| write_error(e, &format!("Contest problem {}", problem_id)))?;
        }

        tx.commit().await?;
        Ok(id)
    }

    async fn record_submission(&self, submission: &NewSubmission) -> Result<i64, AppError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO submissions
            (student_id, problem_id, contest_id, number_of_test_case,
             number_of_test_case_pass, marks, language, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(submission.student_id)
        .bind(submission.problem_id)
        .bind(submission.contest_id)
        .bind(submission.number_of_test_case)
        .bind(submission.number_of_test_case_pass)
        .bind(submission.marks)
        .bind(&submission.language)
        .bind(submission.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| write_error(e, "Submission"))?;

        Ok(id)
    }
}
