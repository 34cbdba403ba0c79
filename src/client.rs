// src/client.rs

use reqwest::Url;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::{
    analytics::{
        cohort::CohortFilter,
        pipeline::{ProblemDashboard, problem_dashboard},
        ranking::{MAX_PAGE_LIMIT, RankingQuery},
    },
    models::{
        dashboard::RankingsResponse,
        student::{RosterResponse, Student},
        submission::{SubmissionView, SubmissionsResponse},
    },
    utils::refresh::RefreshGate,
};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server responded {status}: {message}")]
    Status { status: u16, message: String },

    #[error("invalid base url: {0}")]
    InvalidUrl(String),
}

/// Typed client for the roster, submission and ranking sources.
///
/// Ranking and analytics refreshes follow "latest request wins": when an
/// older request resolves after a newer one, its result is dropped and the
/// call returns `Ok(None)`. No retries are attempted.
pub struct DashboardClient {
    http: reqwest::Client,
    base_url: String,
    rankings_gate: RefreshGate,
    analytics_gate: RefreshGate,
}

fn filter_query(filter: &CohortFilter) -> Vec<(&'static str, String)> {
    let mut query = Vec::new();
    if let Some(branch) = &filter.branch {
        query.push(("branch", branch.clone()));
    }
    if let Some(semester) = &filter.semester {
        query.push(("semester", semester.clone()));
    }
    if let Some(batch) = &filter.batch {
        query.push(("batch", batch.clone()));
    }
    query
}

impl DashboardClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            rankings_gate: RefreshGate::new(),
            analytics_gate: RefreshGate::new(),
        }
    }

    /// Base url plus `segments`, each percent-encoded as one path segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> Result<T, ClientError> {
        let response = self
            .http
            .get(self.endpoint(segments)?)
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<serde_json::Value>().await {
                Ok(body) => body
                    .get("error")
                    .and_then(|e| e.as_str())
                    .unwrap_or_default()
                    .to_string(),
                Err(_) => String::new(),
            };
            return Err(ClientError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json::<T>().await?)
    }

    pub async fn fetch_roster(
        &self,
        batch: &str,
        page: Option<usize>,
        limit: Option<usize>,
        search: Option<&str>,
    ) -> Result<RosterResponse, ClientError> {
        let mut query = Vec::new();
        if let Some(page) = page {
            query.push(("page", page.to_string()));
        }
        if let Some(limit) = limit {
            query.push(("limit", limit.to_string()));
        }
        if let Some(search) = search {
            query.push(("search", search.to_string()));
        }

        self.get_json(&["api", "batches", batch, "students"], &query)
            .await
    }

    /// Every roster page of a batch.
    pub async fn fetch_full_roster(&self, batch: &str) -> Result<Vec<Student>, ClientError> {
        let mut students = Vec::new();
        let mut page = 1;
        loop {
            let body = self
                .fetch_roster(batch, Some(page), Some(MAX_PAGE_LIMIT), None)
                .await?;
            let fetched = body.students.len();
            students.extend(body.students);
            if fetched == 0 || students.len() >= body.total_students {
                return Ok(students);
            }
            page += 1;
        }
    }

    pub async fn fetch_submissions(
        &self,
        problem_id: i64,
        view: SubmissionView,
        filter: &CohortFilter,
    ) -> Result<SubmissionsResponse, ClientError> {
        let problem_id = problem_id.to_string();
        let mut segments = vec!["api", "problems", problem_id.as_str(), "submissions"];
        if view == SubmissionView::BestOnly {
            segments.push("best");
        }
        self.get_json(&segments, &filter_query(filter)).await
    }

    /// Fetches one ranking page. `Ok(None)` means a newer refresh already won.
    pub async fn fetch_rankings(
        &self,
        contest_id: i64,
        query: &RankingQuery,
    ) -> Result<Option<RankingsResponse>, ClientError> {
        let ticket = self.rankings_gate.begin();

        let mut params = filter_query(&query.filter);
        params.push(("page", query.page.to_string()));
        params.push(("limit", query.limit.to_string()));
        params.push(("sortBy", query.sort_by.as_str().to_string()));
        if let Some(order) = query.order {
            params.push(("order", order.as_str().to_string()));
        }

        let id = contest_id.to_string();
        let result: Result<RankingsResponse, ClientError> = self
            .get_json(&["api", "contests", id.as_str(), "dashboard"], &params)
            .await;

        // Stale failures are discarded like stale results.
        if !self.rankings_gate.resolve(ticket) {
            tracing::debug!("Discarding stale rankings for contest {}", contest_id);
            return Ok(None);
        }
        result.map(Some)
    }

    /// Recomputes a problem dashboard locally from the raw sources.
    ///
    /// The roster is only available per batch; without a batch constraint, or
    /// when the roster request fails, the stats come back partial.
    pub async fn problem_dashboard(
        &self,
        problem_id: i64,
        filter: &CohortFilter,
    ) -> Result<Option<ProblemDashboard>, ClientError> {
        let ticket = self.analytics_gate.begin();

        let submissions = self
            .fetch_submissions(problem_id, SubmissionView::All, filter)
            .await;

        let roster = match (&submissions, &filter.batch) {
            (Ok(_), Some(batch)) => match self.fetch_full_roster(batch).await {
                Ok(students) => Some(students),
                Err(e) => {
                    tracing::warn!("Roster unavailable for batch {}: {}", batch, e);
                    None
                }
            },
            _ => None,
        };

        if !self.analytics_gate.resolve(ticket) {
            tracing::debug!("Discarding stale analytics for problem {}", problem_id);
            return Ok(None);
        }
        let submissions = submissions?;

        Ok(Some(problem_dashboard(
            filter,
            roster.as_deref(),
            &submissions.submissions,
        )))
    }
}
