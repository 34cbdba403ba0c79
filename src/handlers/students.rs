// src/handlers/students.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    analytics::{cohort::CohortFilter, ranking::paginate},
    config::Config,
    error::AppError,
    models::student::{RosterParams, RosterResponse, Student},
    state::SharedStore,
};

fn matches_search(student: &Student, needle: &str) -> bool {
    student.username.to_lowercase().contains(needle)
        || student.roll_no.to_lowercase().contains(needle)
}

/// Lists the roster of a batch.
///
/// * Optional `search` matches username or roll number, case-insensitively.
/// * `totalStudents` counts every match, not just the returned page.
pub async fn list_batch_students(
    State(store): State<SharedStore>,
    State(config): State<Config>,
    Path(batch): Path<String>,
    Query(params): Query<RosterParams>,
) -> Result<impl IntoResponse, AppError> {
    params.validate()?;

    let filter = CohortFilter::new(None, None, Some(batch));
    let mut students = store.roster(&filter).await?;

    if let Some(needle) = params
        .search
        .as_deref()
        .map(|q| q.trim().to_lowercase())
        .filter(|q| !q.is_empty())
    {
        students.retain(|s| matches_search(s, &needle));
    }

    let page = paginate(
        students,
        params.page.unwrap_or(1),
        params.limit.unwrap_or(config.default_page_limit),
    );

    Ok(Json(RosterResponse {
        students: page.items,
        total_students: page.total_items,
    }))
}
