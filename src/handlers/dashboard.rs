// src/handlers/dashboard.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    analytics::{
        cohort::CohortFilter,
        export::{export_header, export_rows},
        pipeline::{contest_dashboard, contest_table, problem_dashboard},
        ranking::{RankingQuery, SortField},
    },
    config::Config,
    error::AppError,
    models::{
        dashboard::{
            CohortParams, DashboardParams, ExportResponse, Pagination, ProblemAnalyticsResponse,
            RankingRow, RankingsResponse,
        },
        problem::Contest,
        student::Student,
    },
    state::SharedStore,
};

/// Loads a roster, degrading to `None` when the roster source fails so the
/// dashboards can still show submission-derived figures.
async fn roster_or_partial(store: &SharedStore, filter: &CohortFilter) -> Option<Vec<Student>> {
    match store.roster(filter).await {
        Ok(students) => Some(students),
        Err(e) => {
            tracing::warn!("Roster unavailable, reporting partial analytics: {}", e);
            None
        }
    }
}

async fn load_contest(store: &SharedStore, contest_id: i64) -> Result<Contest, AppError> {
    store
        .contest(contest_id)
        .await?
        .ok_or(AppError::NotFound("Contest not found".to_string()))
}

fn problem_ids(contest: &Contest) -> Vec<String> {
    contest.problems.iter().map(|p| p.id.to_string()).collect()
}

/// Completion, average score and pass rate for one problem, overall and
/// broken down by branch, semester and batch.
pub async fn problem_analytics(
    State(store): State<SharedStore>,
    Path(problem_id): Path<i64>,
    Query(params): Query<CohortParams>,
) -> Result<impl IntoResponse, AppError> {
    let problem = store
        .problem(problem_id)
        .await?
        .ok_or(AppError::NotFound("Problem not found".to_string()))?;

    let filter = params.filter();
    let raw = store.problem_submissions(problem_id).await?;
    let roster = roster_or_partial(&store, &filter).await;

    let dashboard = problem_dashboard(&filter, roster.as_deref(), &raw);

    Ok(Json(ProblemAnalyticsResponse {
        problem,
        overall: dashboard.overall,
        by_branch: dashboard.by_branch,
        by_semester: dashboard.by_semester,
        by_batch: dashboard.by_batch,
    }))
}

/// One page of a contest's ranking table.
///
/// Filters apply before ranking, so ranks are relative to the selected
/// cohort. `sortBy`/`order` only change row order, never rank numbers.
pub async fn contest_rankings(
    State(store): State<SharedStore>,
    State(config): State<Config>,
    Path(contest_id): Path<i64>,
    Query(params): Query<DashboardParams>,
) -> Result<impl IntoResponse, AppError> {
    params.validate()?;

    let contest = load_contest(&store, contest_id).await?;
    let raw = store.contest_submissions(contest_id).await?;
    // Whole roster: profiles are looked up before the cohort filter applies.
    let roster = roster_or_partial(&store, &CohortFilter::default()).await;

    let query = RankingQuery {
        filter: params.filter(),
        page: params.page.unwrap_or(1),
        limit: params.limit.unwrap_or(config.default_page_limit),
        sort_by: params.sort_by.unwrap_or(SortField::Rank),
        order: params.order,
    };

    let page = contest_dashboard(&query, &problem_ids(&contest), roster.as_deref(), &raw);

    Ok(Json(RankingsResponse {
        rankings: page.items.iter().map(RankingRow::from).collect(),
        problems: contest.problems,
        pagination: Pagination {
            total_students: page.total_items,
            total_pages: page.total_pages,
            current_page: page.current_page,
        },
    }))
}

/// The full filtered ranking table flattened into primitive rows.
pub async fn export_contest(
    State(store): State<SharedStore>,
    Path(contest_id): Path<i64>,
    Query(params): Query<CohortParams>,
) -> Result<impl IntoResponse, AppError> {
    let contest = load_contest(&store, contest_id).await?;
    let raw = store.contest_submissions(contest_id).await?;
    let roster = roster_or_partial(&store, &CohortFilter::default()).await;

    let query = RankingQuery {
        filter: params.filter(),
        ..RankingQuery::default()
    };
    let entries = contest_table(&query, &problem_ids(&contest), roster.as_deref(), &raw);

    let titles: Vec<String> = contest.problems.iter().map(|p| p.title.clone()).collect();

    Ok(Json(ExportResponse {
        header: export_header(&titles),
        rows: export_rows(&entries),
    }))
}
