// src/analytics/cohort.rs

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::analytics::{best_attempt::BestAttempt, normalize::Submission};
use crate::models::student::{Cohort, Student};

/// A best attempt at or above this pass ratio counts as passed.
pub const PASS_THRESHOLD: f64 = 0.5;

/// Sentinel the dashboards send for "no constraint".
const ALL: &str = "ALL";

/// Optional equality constraints on the cohort attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CohortFilter {
    pub branch: Option<String>,
    pub semester: Option<String>,
    pub batch: Option<String>,
}

fn constraint(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case(ALL))
}

/// Comparison key for cohort values. Mirrors `LOWER(TRIM(col))` in the
/// Postgres roster query, so both stores agree on membership.
pub fn fold(value: &str) -> String {
    value.trim().to_lowercase()
}

fn satisfies(wanted: &Option<String>, actual: &str) -> bool {
    match wanted {
        Some(w) => fold(w) == fold(actual),
        None => true,
    }
}

impl CohortFilter {
    /// Builds a filter, treating absent, empty and `"ALL"` values as unconstrained.
    pub fn new(branch: Option<String>, semester: Option<String>, batch: Option<String>) -> Self {
        CohortFilter {
            branch: constraint(branch),
            semester: constraint(semester),
            batch: constraint(batch),
        }
    }

    pub fn matches(&self, cohort: &Cohort) -> bool {
        satisfies(&self.branch, &cohort.branch)
            && satisfies(&self.semester, &cohort.semester)
            && satisfies(&self.batch, &cohort.batch)
    }

    pub fn matches_student(&self, student: &Student) -> bool {
        self.matches(&student.cohort)
    }

    pub fn matches_submission(&self, submission: &Submission) -> bool {
        self.matches(&submission.cohort)
    }
}

/// Completion and score figures for one cohort on one problem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CohortStats {
    /// Roster size; `None` when the roster could not be loaded.
    pub total_students: Option<usize>,
    pub students_submitted: usize,
    /// Percentage of the roster with a best attempt; `None` without a roster.
    pub completion_rate: Option<f64>,
    /// Mean test-case percentage over submitters.
    pub average_score: f64,
    /// Percentage of submitters whose best attempt passed at least half the test cases.
    pub pass_rate: f64,
    /// Set when figures were computed from submissions alone.
    pub partial: bool,
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

fn submitter_figures(attempts: &[&BestAttempt]) -> (f64, f64) {
    if attempts.is_empty() {
        return (0.0, 0.0);
    }
    let total_score: f64 = attempts.iter().map(|a| a.submission.score_percent()).sum();
    let passed = attempts
        .iter()
        .filter(|a| a.pass_ratio() >= PASS_THRESHOLD)
        .count();
    (
        total_score / attempts.len() as f64,
        percent(passed, attempts.len()),
    )
}

/// Aggregates the best attempts on one problem against a cohort roster.
///
/// With a roster, attempts by students outside it are ignored. Without one
/// the stats only describe the submitters and are flagged as partial.
pub fn aggregate(roster: Option<&[Student]>, attempts: &[BestAttempt]) -> CohortStats {
    match roster {
        Some(roster) => {
            let members: HashSet<&str> = roster.iter().map(|s| s.key.as_str()).collect();
            let mut seen: HashSet<&str> = HashSet::new();
            let counted: Vec<&BestAttempt> = attempts
                .iter()
                .filter(|a| members.contains(a.student_key()) && seen.insert(a.student_key()))
                .collect();
            let (average_score, pass_rate) = submitter_figures(&counted);

            CohortStats {
                total_students: Some(members.len()),
                students_submitted: counted.len(),
                completion_rate: Some(percent(counted.len(), members.len())),
                average_score,
                pass_rate,
                partial: false,
            }
        }
        None => {
            let counted: Vec<&BestAttempt> = attempts.iter().collect();
            let (average_score, pass_rate) = submitter_figures(&counted);

            CohortStats {
                total_students: None,
                students_submitted: counted.len(),
                completion_rate: None,
                average_score,
                pass_rate,
                partial: true,
            }
        }
    }
}

/// Cohort attribute used to break a dashboard down into groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Branch,
    Semester,
    Batch,
}

impl Dimension {
    pub fn value<'a>(&self, cohort: &'a Cohort) -> &'a str {
        match self {
            Dimension::Branch => &cohort.branch,
            Dimension::Semester => &cohort.semester,
            Dimension::Batch => &cohort.batch,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupStats {
    pub group: String,
    pub stats: CohortStats,
}

/// Buckets items by the folded `value` of each. Each bucket is labelled
/// with the first spelling seen, trimmed.
fn group_by<'a, T: Clone>(
    items: impl IntoIterator<Item = &'a T>,
    value: impl Fn(&T) -> &str,
) -> BTreeMap<String, (String, Vec<T>)>
where
    T: 'a,
{
    let mut groups: BTreeMap<String, (String, Vec<T>)> = BTreeMap::new();
    for item in items {
        let raw = value(item);
        groups
            .entry(fold(raw))
            .or_insert_with(|| (raw.trim().to_string(), Vec::new()))
            .1
            .push(item.clone());
    }
    groups
}

/// Aggregates per group of `dimension`, ordered by group name.
///
/// Groups come from the roster when one is available, otherwise from the
/// cohort attributes recorded on the attempts. Values that differ only in
/// case or surrounding whitespace share a group, as they do in `CohortFilter`.
pub fn aggregate_by(
    dimension: Dimension,
    roster: Option<&[Student]>,
    attempts: &[BestAttempt],
) -> Vec<GroupStats> {
    match roster {
        Some(roster) => group_by(roster, |s: &Student| dimension.value(&s.cohort))
            .into_values()
            .map(|(group, members)| GroupStats {
                group,
                stats: aggregate(Some(members.as_slice()), attempts),
            })
            .collect(),
        None => group_by(attempts, |a: &BestAttempt| {
            dimension.value(&a.submission.cohort)
        })
        .into_values()
        .map(|(group, members)| GroupStats {
            group,
            stats: aggregate(None, &members),
        })
        .collect(),
    }
}
