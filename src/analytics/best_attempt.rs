// src/analytics/best_attempt.rs

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::analytics::normalize::{Submission, cmp_submitted_at};

/// The highest-scoring attempt of one student on one problem.
#[derive(Debug, Clone, PartialEq)]
pub struct BestAttempt {
    pub submission: Submission,
    /// Number of attempts the reduction saw for this pair.
    pub attempts: usize,
}

impl BestAttempt {
    pub fn student_key(&self) -> &str {
        &self.submission.student_key
    }

    pub fn pass_ratio(&self) -> f64 {
        self.submission.pass_ratio()
    }
}

/// True when `candidate` should replace `current` as the best attempt:
/// higher marks win, equal marks fall back to the earlier submission.
fn is_better(candidate: &Submission, current: &Submission) -> bool {
    match candidate.marks.total_cmp(&current.marks) {
        Ordering::Greater => true,
        Ordering::Less => false,
        Ordering::Equal => {
            cmp_submitted_at(&candidate.submitted_at, &current.submitted_at) == Ordering::Less
        }
    }
}

fn reduce_by<K, F>(submissions: &[Submission], key: F) -> Vec<BestAttempt>
where
    K: std::hash::Hash + Eq,
    F: Fn(&Submission) -> K,
{
    let mut slots: HashMap<K, usize> = HashMap::new();
    let mut best: Vec<BestAttempt> = Vec::new();

    for submission in submissions {
        match slots.get(&key(submission)) {
            Some(&idx) => {
                let slot = &mut best[idx];
                slot.attempts += 1;
                if is_better(submission, &slot.submission) {
                    slot.submission = submission.clone();
                }
            }
            None => {
                slots.insert(key(submission), best.len());
                best.push(BestAttempt {
                    submission: submission.clone(),
                    attempts: 1,
                });
            }
        }
    }

    best
}

/// Reduces the attempts on a single problem to one best attempt per student.
///
/// Output keeps the order in which each student first appears.
pub fn best_attempts(submissions: &[Submission]) -> Vec<BestAttempt> {
    reduce_by(submissions, |s| s.student_key.clone())
}

/// Same reduction keyed by (student, problem), for submission sets that span
/// several problems.
pub fn best_attempts_by_problem(submissions: &[Submission]) -> Vec<BestAttempt> {
    reduce_by(submissions, |s| (s.student_key.clone(), s.problem_id.clone()))
}
