// src/store/memory.rs

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    analytics::cohort::CohortFilter,
    error::AppError,
    models::{
        problem::{Contest, CreateContestRequest, CreateProblemRequest, Problem},
        student::{CreateStudentRequest, Student, StudentRow},
        submission::{NewSubmission, RawSubmission, SubmissionRow},
    },
    store::JudgeStore,
};

struct ContestEntry {
    id: i64,
    title: String,
    problem_ids: Vec<i64>,
}

#[derive(Default)]
struct Tables {
    students: Vec<StudentRow>,
    problems: Vec<Problem>,
    contests: Vec<ContestEntry>,
    submissions: Vec<(i64, NewSubmission)>,
}

impl Tables {
    fn student(&self, id: i64) -> Option<&StudentRow> {
        self.students.iter().find(|s| s.id == id)
    }

    fn problem(&self, id: i64) -> Option<&Problem> {
        self.problems.iter().find(|p| p.id == id)
    }

    /// Same join the Postgres store performs.
    fn joined<F>(&self, keep: F) -> Vec<RawSubmission>
    where
        F: Fn(&NewSubmission) -> bool,
    {
        let mut rows: Vec<SubmissionRow> = self
            .submissions
            .iter()
            .filter(|(_, s)| keep(s))
            .filter_map(|(id, s)| {
                let student = self.student(s.student_id)?;
                Some(SubmissionRow {
                    id: *id,
                    problem_id: s.problem_id,
                    contest_id: s.contest_id,
                    number_of_test_case: Some(s.number_of_test_case),
                    number_of_test_case_pass: Some(s.number_of_test_case_pass),
                    marks: Some(s.marks),
                    language: Some(s.language.clone()),
                    created_at: Some(s.created_at),
                    student_id: student.id,
                    roll_no: student.roll_no.clone(),
                    username: student.username.clone(),
                    branch: student.branch.clone(),
                    semester: student.semester.clone(),
                    batch: student.batch.clone(),
                })
            })
            .collect();
        rows.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        rows.into_iter().map(RawSubmission::from).collect()
    }
}

/// Process-local store used for development and tests.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn next_id(len: usize) -> i64 {
    len as i64 + 1
}

#[async_trait]
impl JudgeStore for MemoryStore {
    async fn roster(&self, filter: &CohortFilter) -> Result<Vec<Student>, AppError> {
        let tables = self.tables.read().await;
        let mut students: Vec<Student> = tables
            .students
            .iter()
            .cloned()
            .map(Student::from)
            .filter(|s| filter.matches_student(s))
            .collect();
        students.sort_by(|a, b| a.roll_no.cmp(&b.roll_no));
        Ok(students)
    }

    async fn problem(&self, id: i64) -> Result<Option<Problem>, AppError> {
        Ok(self.tables.read().await.problem(id).cloned())
    }

    async fn problem_submissions(&self, problem_id: i64) -> Result<Vec<RawSubmission>, AppError> {
        Ok(self
            .tables
            .read()
            .await
            .joined(|s| s.problem_id == problem_id))
    }

    async fn contest(&self, id: i64) -> Result<Option<Contest>, AppError> {
        let tables = self.tables.read().await;
        let Some(entry) = tables.contests.iter().find(|c| c.id == id) else {
            return Ok(None);
        };

        let problems = entry
            .problem_ids
            .iter()
            .filter_map(|pid| tables.problem(*pid).cloned())
            .collect();

        Ok(Some(Contest {
            id: entry.id,
            title: entry.title.clone(),
            problems,
        }))
    }

    async fn contest_submissions(&self, contest_id: i64) -> Result<Vec<RawSubmission>, AppError> {
        Ok(self
            .tables
            .read()
            .await
            .joined(|s| s.contest_id == Some(contest_id)))
    }

    async fn create_student(&self, req: &CreateStudentRequest) -> Result<i64, AppError> {
        let mut tables = self.tables.write().await;
        if tables.students.iter().any(|s| s.roll_no == req.roll_no) {
            return Err(AppError::Conflict(format!(
                "Student '{}' already exists",
                req.roll_no
            )));
        }

        let id = next_id(tables.students.len());
        tables.students.push(StudentRow {
            id,
            roll_no: req.roll_no.clone(),
            username: req.username.clone(),
            branch: req.branch.clone(),
            semester: req.semester.clone(),
            batch: req.batch.clone(),
        });
        Ok(id)
    }

    async fn create_problem(&self, req: &CreateProblemRequest) -> Result<i64, AppError> {
        let mut tables = self.tables.write().await;
        let id = next_id(tables.problems.len());
        tables.problems.push(Problem {
            id,
            title: req.title.clone(),
            max_marks: req.max_marks,
        });
        Ok(id)
    }

    async fn create_contest(&self, req: &CreateContestRequest) -> Result<i64, AppError> {
        let mut tables = self.tables.write().await;
        if let Some(missing) = req.problem_ids.iter().find(|id| tables.problem(**id).is_none()) {
            return Err(AppError::NotFound(format!(
                "Contest problem {} references a missing record",
                missing
            )));
        }

        let id = next_id(tables.contests.len());
        tables.contests.push(ContestEntry {
            id,
            title: req.title.clone(),
            problem_ids: req.problem_ids.clone(),
        });
        Ok(id)
    }

    async fn record_submission(&self, submission: &NewSubmission) -> Result<i64, AppError> {
        let mut tables = self.tables.write().await;
        let contest_known = submission
            .contest_id
            .is_none_or(|cid| tables.contests.iter().any(|c| c.id == cid));
        if tables.student(submission.student_id).is_none()
            || tables.problem(submission.problem_id).is_none()
            || !contest_known
        {
            return Err(AppError::NotFound(
                "Submission references a missing record".to_string(),
            ));
        }

        let id = next_id(tables.submissions.len());
        tables.submissions.push((id, submission.clone()));
        Ok(id)
    }
}
