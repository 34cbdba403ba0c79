// src/analytics/ranking.rs

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analytics::{
    best_attempt::best_attempts_by_problem,
    cohort::CohortFilter,
    normalize::{Submission, cmp_submitted_at},
};
use crate::models::student::{Cohort, Student};

pub const DEFAULT_PAGE_LIMIT: usize = 10;
pub const MAX_PAGE_LIMIT: usize = 100;

/// Columns the ranking table can be displayed by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    #[default]
    Rank,
    TotalMarks,
    StudentId,
    Username,
    LastSubmission,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortField {
    pub fn as_str(self) -> &'static str {
        match self {
            SortField::Rank => "rank",
            SortField::TotalMarks => "totalMarks",
            SortField::StudentId => "studentId",
            SortField::Username => "username",
            SortField::LastSubmission => "lastSubmission",
        }
    }

    /// Direction used when the caller names a column but no order.
    pub fn default_order(self) -> SortOrder {
        match self {
            SortField::TotalMarks => SortOrder::Desc,
            _ => SortOrder::Asc,
        }
    }
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Everything the ranking table needs besides the data itself.
#[derive(Debug, Clone)]
pub struct RankingQuery {
    pub filter: CohortFilter,
    pub page: usize,
    pub limit: usize,
    pub sort_by: SortField,
    pub order: Option<SortOrder>,
}

impl Default for RankingQuery {
    fn default() -> Self {
        RankingQuery {
            filter: CohortFilter::default(),
            page: 1,
            limit: DEFAULT_PAGE_LIMIT,
            sort_by: SortField::Rank,
            order: None,
        }
    }
}

/// One row of the ranking table.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedEntry {
    pub rank: u32,
    pub student_key: String,
    pub student_id: String,
    pub display_name: String,
    pub cohort: Cohort,
    /// Best marks per problem, aligned to the contest's problem list.
    pub per_problem_marks: Vec<f64>,
    pub total_marks: f64,
    pub last_submission_at: Option<DateTime<Utc>>,
}

impl RankedEntry {
    /// Last submission split into `YYYY-MM-DD` and `HH:MM:SS` (UTC).
    /// Both parts are empty when the time is unknown.
    pub fn last_submission_parts(&self) -> (String, String) {
        match self.last_submission_at {
            Some(at) => (
                at.format("%Y-%m-%d").to_string(),
                at.format("%H:%M:%S").to_string(),
            ),
            None => (String::new(), String::new()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_items: usize,
    pub total_pages: usize,
    pub current_page: usize,
}

/// Slices `items` into a 1-based page. `limit` is clamped to `1..=MAX_PAGE_LIMIT`;
/// pages past the end come back empty.
pub fn paginate<T>(items: Vec<T>, page: usize, limit: usize) -> Page<T> {
    let limit = limit.clamp(1, MAX_PAGE_LIMIT);
    let page = page.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(limit);

    let items = items
        .into_iter()
        .skip((page - 1).saturating_mul(limit))
        .take(limit)
        .collect();

    Page {
        items,
        total_items,
        total_pages,
        current_page: page,
    }
}

// Sums of fractional marks are rounded so equal totals compare equal.
fn round_marks(value: f64) -> f64 {
    (value * 1_000_000.0).round() / 1_000_000.0
}

struct Profile {
    student_id: String,
    display_name: String,
    cohort: Cohort,
}

fn profiles(roster: Option<&[Student]>, submissions: &[Submission]) -> HashMap<String, Profile> {
    let mut profiles: HashMap<String, Profile> = HashMap::new();

    for submission in submissions {
        profiles
            .entry(submission.student_key.clone())
            .or_insert_with(|| Profile {
                student_id: submission.student_id.clone(),
                display_name: submission.username.clone(),
                cohort: submission.cohort.clone(),
            });
    }

    // Roster profiles are current; denormalized submission copies may be stale.
    for student in roster.unwrap_or_default() {
        if let Some(profile) = profiles.get_mut(&student.key) {
            if !student.roll_no.is_empty() {
                profile.student_id = student.roll_no.clone();
            }
            profile.display_name = student.username.clone();
            profile.cohort = student.cohort.clone();
        }
    }

    profiles
}

fn by_marks(a: &RankedEntry, b: &RankedEntry) -> Ordering {
    b.total_marks
        .total_cmp(&a.total_marks)
        .then_with(|| cmp_submitted_at(&a.last_submission_at, &b.last_submission_at))
        .then_with(|| a.student_id.cmp(&b.student_id))
        .then_with(|| a.student_key.cmp(&b.student_key))
}

/// Ranks every student with at least one submission on `problem_ids`.
///
/// * The cohort filter is applied first, so ranks describe the filtered cohort.
/// * Each student's best attempt per problem contributes its marks.
/// * Ties on total marks share a rank and the next distinct total skips
///   (standard competition ranking: 90, 90, 80 rank 1, 1, 3).
/// * Within a tie, rows are ordered by earlier last submission, then student id.
pub fn rank_students(
    problem_ids: &[String],
    submissions: &[Submission],
    roster: Option<&[Student]>,
    filter: &CohortFilter,
) -> Vec<RankedEntry> {
    let columns: HashMap<&str, usize> = problem_ids
        .iter()
        .enumerate()
        .map(|(idx, id)| (id.as_str(), idx))
        .collect();

    let in_contest: Vec<Submission> = submissions
        .iter()
        .filter(|s| columns.contains_key(s.problem_id.as_str()))
        .cloned()
        .collect();

    let profiles = profiles(roster, &in_contest);

    let eligible: Vec<Submission> = in_contest
        .into_iter()
        .filter(|s| {
            profiles
                .get(&s.student_key)
                .is_some_and(|p| filter.matches(&p.cohort))
        })
        .collect();

    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut entries: Vec<RankedEntry> = Vec::new();

    for submission in &eligible {
        let idx = *slots.entry(submission.student_key.as_str()).or_insert_with(|| {
            let profile = &profiles[&submission.student_key];
            entries.push(RankedEntry {
                rank: 0,
                student_key: submission.student_key.clone(),
                student_id: profile.student_id.clone(),
                display_name: profile.display_name.clone(),
                cohort: profile.cohort.clone(),
                per_problem_marks: vec![0.0; problem_ids.len()],
                total_marks: 0.0,
                last_submission_at: None,
            });
            entries.len() - 1
        });

        let entry = &mut entries[idx];
        if let Some(at) = submission.submitted_at {
            if entry.last_submission_at.is_none_or(|last| at > last) {
                entry.last_submission_at = Some(at);
            }
        }
    }

    for best in best_attempts_by_problem(&eligible) {
        let s = &best.submission;
        if let (Some(&idx), Some(&col)) = (
            slots.get(s.student_key.as_str()),
            columns.get(s.problem_id.as_str()),
        ) {
            entries[idx].per_problem_marks[col] = s.marks;
        }
    }

    for entry in &mut entries {
        entry.total_marks = round_marks(entry.per_problem_marks.iter().sum());
    }

    entries.sort_by(by_marks);

    let mut previous: Option<(f64, u32)> = None;
    for (position, entry) in entries.iter_mut().enumerate() {
        let rank = match previous {
            Some((total, rank)) if total == entry.total_marks => rank,
            _ => position as u32 + 1,
        };
        entry.rank = rank;
        previous = Some((entry.total_marks, rank));
    }

    entries
}

/// Re-orders ranked rows for display. Rank numbers are left untouched.
pub fn apply_display_sort(entries: &mut [RankedEntry], field: SortField, order: Option<SortOrder>) {
    let order = order.unwrap_or_else(|| field.default_order());

    entries.sort_by(|a, b| {
        let ordering = match field {
            SortField::Rank => a.rank.cmp(&b.rank),
            SortField::TotalMarks => a.total_marks.total_cmp(&b.total_marks),
            SortField::StudentId => a.student_id.cmp(&b.student_id),
            SortField::Username => a
                .display_name
                .to_lowercase()
                .cmp(&b.display_name.to_lowercase()),
            SortField::LastSubmission => {
                cmp_submitted_at(&a.last_submission_at, &b.last_submission_at)
            }
        };
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
}

/// Ranks, re-sorts for display and paginates in one pass.
pub fn rank_page(
    query: &RankingQuery,
    problem_ids: &[String],
    submissions: &[Submission],
    roster: Option<&[Student]>,
) -> Page<RankedEntry> {
    let mut entries = rank_students(problem_ids, submissions, roster, &query.filter);
    apply_display_sort(&mut entries, query.sort_by, query.order);
    paginate(entries, query.page, query.limit)
}
