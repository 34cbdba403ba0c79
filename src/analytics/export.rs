// src/analytics/export.rs

use serde::{Deserialize, Serialize};

use crate::analytics::ranking::RankedEntry;

/// Columns before the per-problem marks.
const LEADING_COLUMNS: [&str; 6] = ["Rank", "Student ID", "Name", "Branch", "Semester", "Batch"];
/// Columns after the per-problem marks.
const TRAILING_COLUMNS: [&str; 3] = ["Total Marks", "Last Submission Date", "Last Submission Time"];

/// A primitive table cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExportCell {
    Int(i64),
    Number(f64),
    Text(String),
}

impl ExportCell {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ExportCell::Int(v) => Some(*v as f64),
            ExportCell::Number(v) => Some(*v),
            ExportCell::Text(_) => None,
        }
    }
}

/// Column titles in export order, one marks column per problem.
pub fn export_header(problem_titles: &[String]) -> Vec<String> {
    LEADING_COLUMNS
        .iter()
        .map(|c| c.to_string())
        .chain(problem_titles.iter().cloned())
        .chain(TRAILING_COLUMNS.iter().map(|c| c.to_string()))
        .collect()
}

pub fn export_row(entry: &RankedEntry) -> Vec<ExportCell> {
    let (date, time) = entry.last_submission_parts();

    let mut row = vec![
        ExportCell::Int(entry.rank as i64),
        ExportCell::Text(entry.student_id.clone()),
        ExportCell::Text(entry.display_name.clone()),
        ExportCell::Text(entry.cohort.branch.clone()),
        ExportCell::Text(entry.cohort.semester.clone()),
        ExportCell::Text(entry.cohort.batch.clone()),
    ];
    row.extend(entry.per_problem_marks.iter().map(|m| ExportCell::Number(*m)));
    row.push(ExportCell::Number(entry.total_marks));
    row.push(ExportCell::Text(date));
    row.push(ExportCell::Text(time));
    row
}

pub fn export_rows(entries: &[RankedEntry]) -> Vec<Vec<ExportCell>> {
    entries.iter().map(export_row).collect()
}

/// Scoring columns recovered from an exported row.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedScore {
    pub rank: u32,
    pub per_problem_marks: Vec<f64>,
    pub total_marks: f64,
}

/// Reads rank, per-problem marks and total marks back out of a row produced
/// by `export_row`. Returns `None` if the row does not have that layout.
pub fn read_back(row: &[ExportCell], problem_count: usize) -> Option<ExportedScore> {
    if row.len() != LEADING_COLUMNS.len() + problem_count + TRAILING_COLUMNS.len() {
        return None;
    }

    let rank = match row.first()? {
        ExportCell::Int(r) => u32::try_from(*r).ok()?,
        _ => return None,
    };

    let marks_start = LEADING_COLUMNS.len();
    let per_problem_marks = row[marks_start..marks_start + problem_count]
        .iter()
        .map(ExportCell::as_f64)
        .collect::<Option<Vec<f64>>>()?;
    let total_marks = row[marks_start + problem_count].as_f64()?;

    Some(ExportedScore {
        rank,
        per_problem_marks,
        total_marks,
    })
}
