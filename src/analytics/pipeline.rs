// src/analytics/pipeline.rs
//
// Pure functions from (filters, fetched data) to dashboard view models.
// Handlers and the HTTP client both go through these, so the analytics and
// ranking views always share one normalizer and one reducer.

use std::collections::HashSet;

use crate::analytics::{
    best_attempt::{BestAttempt, best_attempts},
    cohort::{CohortFilter, CohortStats, Dimension, GroupStats, aggregate, aggregate_by},
    normalize::{Submission, normalize_all},
    ranking::{Page, RankedEntry, RankingQuery, rank_page, rank_students},
};
use crate::models::{student::Student, submission::RawSubmission};

/// View model of the per-problem dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct ProblemDashboard {
    pub overall: CohortStats,
    pub by_branch: Vec<GroupStats>,
    pub by_semester: Vec<GroupStats>,
    pub by_batch: Vec<GroupStats>,
    pub best_attempts: Vec<BestAttempt>,
}

fn filtered_roster(filter: &CohortFilter, roster: Option<&[Student]>) -> Option<Vec<Student>> {
    roster.map(|students| {
        students
            .iter()
            .filter(|s| filter.matches_student(s))
            .cloned()
            .collect()
    })
}

/// Normalizes and filters submissions for one problem.
///
/// With a roster, membership decides (roster profiles are current); without
/// one the cohort recorded on each submission is used.
fn cohort_submissions(
    filter: &CohortFilter,
    roster: Option<&[Student]>,
    raw: &[RawSubmission],
) -> Vec<Submission> {
    let submissions = normalize_all(raw);
    match roster {
        Some(_) => submissions,
        None => submissions
            .into_iter()
            .filter(|s| filter.matches_submission(s))
            .collect(),
    }
}

/// Computes the per-problem dashboard for the cohort selected by `filter`.
///
/// `roster` is `None` when the roster source was unavailable; the stats are
/// then partial instead of inventing a denominator.
pub fn problem_dashboard(
    filter: &CohortFilter,
    roster: Option<&[Student]>,
    raw: &[RawSubmission],
) -> ProblemDashboard {
    let roster = filtered_roster(filter, roster);
    let roster = roster.as_deref();

    let mut best = best_attempts(&cohort_submissions(filter, roster, raw));
    if let Some(members) = roster {
        let keys: HashSet<&str> = members.iter().map(|s| s.key.as_str()).collect();
        best.retain(|a| keys.contains(a.student_key()));
    }

    ProblemDashboard {
        overall: aggregate(roster, &best),
        by_branch: aggregate_by(Dimension::Branch, roster, &best),
        by_semester: aggregate_by(Dimension::Semester, roster, &best),
        by_batch: aggregate_by(Dimension::Batch, roster, &best),
        best_attempts: best,
    }
}

/// Best attempt per student in wire form, for the "best-attempt-only" view.
pub fn best_submissions(filter: &CohortFilter, raw: &[RawSubmission]) -> Vec<RawSubmission> {
    best_attempts(&cohort_submissions(filter, None, raw))
        .iter()
        .map(|a| a.submission.to_raw())
        .collect()
}

/// Every attempt matching `filter`, in wire form with defaults applied.
pub fn all_submissions(filter: &CohortFilter, raw: &[RawSubmission]) -> Vec<RawSubmission> {
    cohort_submissions(filter, None, raw)
        .iter()
        .map(Submission::to_raw)
        .collect()
}

/// Computes one page of the contest ranking table.
pub fn contest_dashboard(
    query: &RankingQuery,
    problem_ids: &[String],
    roster: Option<&[Student]>,
    raw: &[RawSubmission],
) -> Page<RankedEntry> {
    rank_page(query, problem_ids, &normalize_all(raw), roster)
}

/// The full ranked table (no display sort, no pagination), for export.
pub fn contest_table(
    query: &RankingQuery,
    problem_ids: &[String],
    roster: Option<&[Student]>,
    raw: &[RawSubmission],
) -> Vec<RankedEntry> {
    rank_students(problem_ids, &normalize_all(raw), roster, &query.filter)
}
