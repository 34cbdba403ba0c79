// src/models/dashboard.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::analytics::{
    cohort::{CohortFilter, CohortStats, GroupStats},
    export::ExportCell,
    ranking::{RankedEntry, SortField, SortOrder},
};
use crate::models::problem::Problem;

/// Query parameters shared by the analytics endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct CohortParams {
    pub branch: Option<String>,
    pub semester: Option<String>,
    pub batch: Option<String>,
}

impl CohortParams {
    pub fn filter(&self) -> CohortFilter {
        CohortFilter::new(
            self.branch.clone(),
            self.semester.clone(),
            self.batch.clone(),
        )
    }
}

/// Query parameters for the contest ranking table.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DashboardParams {
    pub branch: Option<String>,
    pub semester: Option<String>,
    pub batch: Option<String>,

    #[validate(range(min = 1))]
    pub page: Option<usize>,

    #[validate(range(min = 1, max = 100))]
    pub limit: Option<usize>,

    pub sort_by: Option<SortField>,
    pub order: Option<SortOrder>,
}

impl DashboardParams {
    pub fn filter(&self) -> CohortFilter {
        CohortFilter::new(
            self.branch.clone(),
            self.semester.clone(),
            self.batch.clone(),
        )
    }
}

/// One row of the ranking table, in the dashboard source's wire shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingRow {
    pub rank: u32,
    pub student_id: String,
    pub username: String,
    pub branch: String,
    pub semester: String,
    pub batch: String,
    pub problem_marks: Vec<f64>,
    pub total_marks: f64,
    pub last_submission_date: String,
    pub last_submission_time: String,
}

impl From<&RankedEntry> for RankingRow {
    fn from(entry: &RankedEntry) -> Self {
        let (date, time) = entry.last_submission_parts();
        RankingRow {
            rank: entry.rank,
            student_id: entry.student_id.clone(),
            username: entry.display_name.clone(),
            branch: entry.cohort.branch.clone(),
            semester: entry.cohort.semester.clone(),
            batch: entry.cohort.batch.clone(),
            problem_marks: entry.per_problem_marks.clone(),
            total_marks: entry.total_marks,
            last_submission_date: date,
            last_submission_time: time,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total_students: usize,
    pub total_pages: usize,
    pub current_page: usize,
}

/// Response body of the dashboard/ranking source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingsResponse {
    pub rankings: Vec<RankingRow>,
    pub problems: Vec<Problem>,
    pub pagination: Pagination,
}

/// Per-problem analytics panel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemAnalyticsResponse {
    pub problem: Problem,
    pub overall: CohortStats,
    pub by_branch: Vec<GroupStats>,
    pub by_semester: Vec<GroupStats>,
    pub by_batch: Vec<GroupStats>,
}

/// Flattened ranking table for spreadsheet/PDF renderers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportResponse {
    pub header: Vec<String>,
    pub rows: Vec<Vec<ExportCell>>,
}
