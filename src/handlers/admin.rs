// src/handlers/admin.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        problem::{CreateContestRequest, CreateProblemRequest},
        student::CreateStudentRequest,
    },
    state::SharedStore,
};

/// Enrolls a student. Roll numbers are unique.
pub async fn create_student(
    State(store): State<SharedStore>,
    Json(payload): Json<CreateStudentRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let id = store.create_student(&payload).await?;
    tracing::info!("Enrolled student {} in batch {}", payload.roll_no, payload.batch);

    Ok((StatusCode::CREATED, Json(serde_json::json!({"id": id}))))
}

/// Creates a problem.
pub async fn create_problem(
    State(store): State<SharedStore>,
    Json(payload): Json<CreateProblemRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let id = store.create_problem(&payload).await?;

    Ok((StatusCode::CREATED, Json(serde_json::json!({"id": id}))))
}

/// Creates a contest over existing problems, keeping the given order.
pub async fn create_contest(
    State(store): State<SharedStore>,
    Json(payload): Json<CreateContestRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let id = store.create_contest(&payload).await?;
    tracing::info!(
        "Created contest {} with {} problems",
        id,
        payload.problem_ids.len()
    );

    Ok((StatusCode::CREATED, Json(serde_json::json!({"id": id}))))
}
