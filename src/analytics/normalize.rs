// src/analytics/normalize.rs

use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use crate::models::{
    student::{Cohort, Student},
    submission::RawSubmission,
};

/// Canonical shape of one attempt by one student on one problem.
///
/// Invariant: `test_cases_passed <= test_cases_total` and `marks >= 0`.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub id: Option<String>,
    /// Internal student key (`_id` on the wire).
    pub student_key: String,
    /// Roll number shown in tables.
    pub student_id: String,
    pub username: String,
    pub problem_id: String,
    pub contest_id: Option<String>,
    pub cohort: Cohort,
    pub test_cases_total: u32,
    pub test_cases_passed: u32,
    pub marks: f64,
    pub submitted_at: Option<DateTime<Utc>>,
    pub language: String,
}

impl Submission {
    /// Fraction of test cases passed. Zero when the problem has no test cases.
    pub fn pass_ratio(&self) -> f64 {
        self.test_cases_passed as f64 / self.test_cases_total.max(1) as f64
    }

    pub fn score_percent(&self) -> f64 {
        self.pass_ratio() * 100.0
    }

    /// Wire form of the normalized record, with defaults filled in.
    pub fn to_raw(&self) -> RawSubmission {
        RawSubmission {
            id: self.id.clone(),
            user: Some(Student {
                key: self.student_key.clone(),
                username: self.username.clone(),
                roll_no: self.student_id.clone(),
                cohort: self.cohort.clone(),
            }),
            problem_id: Some(self.problem_id.clone()),
            contest_id: self.contest_id.clone(),
            number_of_test_case: Some(self.test_cases_total as i64),
            number_of_test_case_pass: Some(self.test_cases_passed as i64),
            marks: Some(self.marks),
            created_at: self.submitted_at,
            language: Some(self.language.clone()),
        }
    }
}

/// Orders timestamps with a missing value after every real one.
pub fn cmp_submitted_at(a: &Option<DateTime<Utc>>, b: &Option<DateTime<Utc>>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn clamp_count(value: Option<i64>) -> u32 {
    value.unwrap_or(0).clamp(0, u32::MAX as i64) as u32
}

/// Converts a wire record into a `Submission`.
///
/// Missing or negative numbers default to zero and the passed count is
/// clamped to the total. Returns `None` only when the record carries no
/// student identity, since such an attempt cannot be attributed.
pub fn normalize(raw: &RawSubmission) -> Option<Submission> {
    let user = raw.user.as_ref()?;
    if user.key.is_empty() {
        return None;
    }

    let test_cases_total = clamp_count(raw.number_of_test_case);
    let test_cases_passed = clamp_count(raw.number_of_test_case_pass).min(test_cases_total);

    let marks = match raw.marks {
        Some(m) if m.is_finite() && m > 0.0 => m,
        _ => 0.0,
    };

    let student_id = if user.roll_no.is_empty() {
        user.key.clone()
    } else {
        user.roll_no.clone()
    };

    Some(Submission {
        id: raw.id.clone(),
        student_key: user.key.clone(),
        student_id,
        username: user.username.clone(),
        problem_id: raw.problem_id.clone().unwrap_or_default(),
        contest_id: raw.contest_id.clone(),
        cohort: user.cohort.clone(),
        test_cases_total,
        test_cases_passed,
        marks,
        submitted_at: raw.created_at,
        language: raw.language.clone().unwrap_or_default(),
    })
}

pub fn normalize_all(raw: &[RawSubmission]) -> Vec<Submission> {
    let normalized: Vec<Submission> = raw.iter().filter_map(normalize).collect();
    if normalized.len() < raw.len() {
        tracing::debug!(
            "Dropped {} submissions without a student identity",
            raw.len() - normalized.len()
        );
    }
    normalized
}
