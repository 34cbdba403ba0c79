// src/handlers/submissions.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use validator::Validate;

use crate::{
    analytics::pipeline::{all_submissions, best_submissions},
    error::AppError,
    models::{
        dashboard::CohortParams,
        submission::{CreateSubmissionRequest, NewSubmission, SubmissionView, SubmissionsResponse},
    },
    state::SharedStore,
};

async fn problem_submissions(
    store: &SharedStore,
    problem_id: i64,
    params: &CohortParams,
    view: SubmissionView,
) -> Result<SubmissionsResponse, AppError> {
    store
        .problem(problem_id)
        .await?
        .ok_or(AppError::NotFound("Problem not found".to_string()))?;

    let raw = store.problem_submissions(problem_id).await?;
    let filter = params.filter();

    let submissions = match view {
        SubmissionView::All => all_submissions(&filter, &raw),
        SubmissionView::BestOnly => best_submissions(&filter, &raw),
    };

    Ok(SubmissionsResponse { submissions })
}

/// Lists every attempt on a problem, optionally narrowed to a cohort.
pub async fn list_problem_submissions(
    State(store): State<SharedStore>,
    Path(problem_id): Path<i64>,
    Query(params): Query<CohortParams>,
) -> Result<impl IntoResponse, AppError> {
    let body = problem_submissions(&store, problem_id, &params, SubmissionView::All).await?;
    Ok(Json(body))
}

/// Lists only each student's best attempt on a problem.
pub async fn list_best_submissions(
    State(store): State<SharedStore>,
    Path(problem_id): Path<i64>,
    Query(params): Query<CohortParams>,
) -> Result<impl IntoResponse, AppError> {
    let body = problem_submissions(&store, problem_id, &params, SubmissionView::BestOnly).await?;
    Ok(Json(body))
}

/// Records a judged submission.
///
/// * Rejects more passed test cases than exist.
/// * Without explicit marks, awards `max_marks` scaled by the pass ratio.
/// * A contest submission must target one of the contest's problems.
pub async fn create_submission(
    State(store): State<SharedStore>,
    Json(payload): Json<CreateSubmissionRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    if payload.number_of_test_case_pass > payload.number_of_test_case {
        return Err(AppError::BadRequest(
            "numberOfTestCasePass cannot exceed numberOfTestCase".to_string(),
        ));
    }

    let problem = store
        .problem(payload.problem_id)
        .await?
        .ok_or(AppError::NotFound("Problem not found".to_string()))?;

    if let Some(contest_id) = payload.contest_id {
        let contest = store
            .contest(contest_id)
            .await?
            .ok_or(AppError::NotFound("Contest not found".to_string()))?;
        if !contest.problems.iter().any(|p| p.id == problem.id) {
            return Err(AppError::BadRequest(
                "Problem is not part of this contest".to_string(),
            ));
        }
    }

    let marks = payload.marks.unwrap_or_else(|| {
        let ratio =
            payload.number_of_test_case_pass as f64 / payload.number_of_test_case.max(1) as f64;
        (problem.max_marks * ratio * 100.0).round() / 100.0
    });

    let submission = NewSubmission {
        student_id: payload.student_id,
        problem_id: payload.problem_id,
        contest_id: payload.contest_id,
        number_of_test_case: payload.number_of_test_case,
        number_of_test_case_pass: payload.number_of_test_case_pass,
        marks,
        language: payload.language,
        created_at: Utc::now(),
    };

    let id = store.record_submission(&submission).await?;
    tracing::info!(
        "Recorded submission {} for student {} on problem {}",
        id,
        submission.student_id,
        submission.problem_id
    );

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "id": id, "marks": marks })),
    ))
}
