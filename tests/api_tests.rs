// tests/api_tests.rs

use std::sync::Arc;

use async_trait::async_trait;
use judge_dashboard::{
    analytics::cohort::CohortFilter,
    config::Config,
    error::AppError,
    models::{
        problem::{Contest, CreateContestRequest, CreateProblemRequest, Problem},
        student::{CreateStudentRequest, Student},
        submission::{NewSubmission, RawSubmission},
    },
    routes,
    state::{AppState, SharedStore},
    store::{JudgeStore, MemoryStore},
};
use serde_json::{Value, json};

/// Helper function to spawn the app on a random port for testing.
/// Returns the base URL (e.g., "http://127.0.0.1:12345").
async fn spawn_app_with(store: SharedStore) -> String {
    let config = Config {
        rust_log: "error".to_string(),
        ..Config::default()
    };

    let state = AppState { store, config };
    let app = routes::create_router(state);

    // Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    address
}

async fn spawn_app() -> String {
    spawn_app_with(Arc::new(MemoryStore::new())).await
}

async fn post(client: &reqwest::Client, url: String, body: Value) -> reqwest::Response {
    client
        .post(url)
        .json(&body)
        .send()
        .await
        .expect("Failed to execute request")
}

async fn get_json(client: &reqwest::Client, url: String) -> (u16, Value) {
    let response = client
        .get(url)
        .send()
        .await
        .expect("Failed to execute request");
    let status = response.status().as_u16();
    let body = response.json::<Value>().await.unwrap_or(Value::Null);
    (status, body)
}

async fn create_student(
    client: &reqwest::Client,
    address: &str,
    roll_no: &str,
    branch: &str,
    batch: &str,
) -> i64 {
    let response = post(
        client,
        format!("{}/api/admin/students", address),
        json!({
            "roll_no": roll_no,
            "username": format!("name_{}", roll_no),
            "branch": branch,
            "semester": "5",
            "batch": batch
        }),
    )
    .await;
    assert_eq!(response.status().as_u16(), 201);
    response.json::<Value>().await.unwrap()["id"].as_i64().unwrap()
}

async fn create_problem(client: &reqwest::Client, address: &str, title: &str, max_marks: f64) -> i64 {
    let response = post(
        client,
        format!("{}/api/admin/problems", address),
        json!({ "title": title, "maxMarks": max_marks }),
    )
    .await;
    assert_eq!(response.status().as_u16(), 201);
    response.json::<Value>().await.unwrap()["id"].as_i64().unwrap()
}

async fn submit(
    client: &reqwest::Client,
    address: &str,
    student_id: i64,
    problem_id: i64,
    contest_id: Option<i64>,
    total: i32,
    passed: i32,
) -> reqwest::Response {
    post(
        client,
        format!("{}/api/submissions", address),
        json!({
            "studentId": student_id,
            "problemId": problem_id,
            "contestId": contest_id,
            "numberOfTestCase": total,
            "numberOfTestCasePass": passed,
            "language": "cpp"
        }),
    )
    .await
}

#[tokio::test]
async fn unknown_path_is_404() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    // Act
    let response = client
        .get(format!("{}/random_path_that_does_not_exist", address))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn student_enrollment_validates_and_rejects_duplicates() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let roll = format!("R{}", &uuid::Uuid::new_v4().to_string()[..8]);

    create_student(&client, &address, &roll, "CSE", "B1").await;

    let duplicate = post(
        &client,
        format!("{}/api/admin/students", address),
        json!({"roll_no": roll, "username": "x", "branch": "CSE", "semester": "5", "batch": "B1"}),
    )
    .await;
    assert_eq!(duplicate.status().as_u16(), 409);

    let invalid = post(
        &client,
        format!("{}/api/admin/students", address),
        json!({"roll_no": "", "username": "x", "branch": "CSE", "semester": "5", "batch": "B1"}),
    )
    .await;
    assert_eq!(invalid.status().as_u16(), 400);
}

#[tokio::test]
async fn roster_is_paginated_and_searchable() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    for roll in ["R001", "R002", "R003"] {
        create_student(&client, &address, roll, "CSE", "B1").await;
    }
    create_student(&client, &address, "R004", "CSE", "B2").await;

    let (status, body) = get_json(
        &client,
        format!("{}/api/batches/B1/students?page=1&limit=2", address),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["totalStudents"], 3);
    let students = body["students"].as_array().unwrap();
    assert_eq!(students.len(), 2);
    assert_eq!(students[0]["id"], "R001");
    assert_eq!(students[0]["batch"], "B1");
    assert!(students[0]["_id"].is_string());

    let (_, searched) = get_json(
        &client,
        format!("{}/api/batches/B1/students?search=r002", address),
    )
    .await;
    assert_eq!(searched["totalStudents"], 1);
    assert_eq!(searched["students"][0]["username"], "name_R002");

    let (status, _) = get_json(
        &client,
        format!("{}/api/batches/B1/students?limit=500", address),
    )
    .await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn roster_filter_ignores_case_and_padding() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    create_student(&client, &address, "R001", "CSE", "B1").await;
    create_student(&client, &address, "R002", "cse", "b1 ").await;

    let (status, body) = get_json(&client, format!("{}/api/batches/B1/students", address)).await;
    assert_eq!(status, 200);
    assert_eq!(body["totalStudents"], 2);

    let (_, padded) = get_json(&client, format!("{}/api/batches/%20b1/students", address)).await;
    assert_eq!(padded["totalStudents"], 2);
}

#[tokio::test]
async fn submission_recording_rules() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let student = create_student(&client, &address, "R001", "CSE", "B1").await;
    let problem = create_problem(&client, &address, "Two Sum", 50.0).await;

    let too_many = submit(&client, &address, student, problem, None, 4, 5).await;
    assert_eq!(too_many.status().as_u16(), 400);

    let missing_problem = submit(&client, &address, student, 9999, None, 4, 1).await;
    assert_eq!(missing_problem.status().as_u16(), 404);

    let missing_student = submit(&client, &address, 9999, problem, None, 4, 1).await;
    assert_eq!(missing_student.status().as_u16(), 404);

    let ok = submit(&client, &address, student, problem, None, 4, 3).await;
    assert_eq!(ok.status().as_u16(), 201);
    let body = ok.json::<Value>().await.unwrap();
    assert_eq!(body["marks"], 37.5);
}

#[tokio::test]
async fn problem_analytics_and_submission_views() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let mut students = Vec::new();
    for (roll, branch) in [("R001", "CSE"), ("R002", "CSE"), ("R003", "ECE"), ("R004", "ECE")] {
        students.push(create_student(&client, &address, roll, branch, "B1").await);
    }
    let problem = create_problem(&client, &address, "Two Sum", 100.0).await;

    submit(&client, &address, students[0], problem, None, 10, 4).await;
    submit(&client, &address, students[0], problem, None, 10, 10).await;
    submit(&client, &address, students[1], problem, None, 10, 6).await;
    submit(&client, &address, students[2], problem, None, 10, 0).await;

    let (status, body) = get_json(
        &client,
        format!("{}/api/problems/{}/analytics?batch=B1", address, problem),
    )
    .await;
    assert_eq!(status, 200);
    let overall = &body["overall"];
    assert_eq!(overall["totalStudents"], 4);
    assert_eq!(overall["studentsSubmitted"], 3);
    assert_eq!(overall["completionRate"], 75.0);
    assert!((overall["passRate"].as_f64().unwrap() - 66.67).abs() < 0.01);
    assert!((overall["averageScore"].as_f64().unwrap() - 53.33).abs() < 0.01);
    assert_eq!(overall["partial"], false);
    assert_eq!(body["byBranch"].as_array().unwrap().len(), 2);
    assert_eq!(body["byBranch"][0]["group"], "CSE");
    assert_eq!(body["byBranch"][0]["stats"]["completionRate"], 100.0);

    let (_, all) = get_json(
        &client,
        format!("{}/api/problems/{}/submissions", address, problem),
    )
    .await;
    assert_eq!(all["submissions"].as_array().unwrap().len(), 4);
    assert_eq!(all["submissions"][0]["numberOfTestCase"], 10);
    assert_eq!(all["submissions"][0]["user_id"]["id"], "R001");

    let (_, best) = get_json(
        &client,
        format!("{}/api/problems/{}/submissions/best?branch=CSE", address, problem),
    )
    .await;
    let best = best["submissions"].as_array().unwrap();
    assert_eq!(best.len(), 2);
    assert_eq!(best[0]["numberOfTestCasePass"], 10);

    let (status, _) = get_json(
        &client,
        format!("{}/api/problems/9999/analytics", address),
    )
    .await;
    assert_eq!(status, 404);
}

async fn seed_contest(client: &reqwest::Client, address: &str) -> i64 {
    let a = create_student(client, address, "R001", "CSE", "B1").await;
    let b = create_student(client, address, "R002", "CSE", "B1").await;
    let c = create_student(client, address, "R003", "ECE", "B1").await;
    let p1 = create_problem(client, address, "Arrays", 50.0).await;
    let p2 = create_problem(client, address, "Graphs", 50.0).await;

    let response = post(
        client,
        format!("{}/api/admin/contests", address),
        json!({ "title": "Midterm", "problemIds": [p1, p2] }),
    )
    .await;
    assert_eq!(response.status().as_u16(), 201);
    let contest = response.json::<Value>().await.unwrap()["id"].as_i64().unwrap();

    // a: 50 + 40 = 90, b: 45 + 45 = 90, c: 40 + 40 = 80
    submit(client, address, a, p1, Some(contest), 10, 10).await;
    submit(client, address, a, p2, Some(contest), 10, 8).await;
    submit(client, address, b, p1, Some(contest), 10, 9).await;
    submit(client, address, b, p2, Some(contest), 10, 9).await;
    submit(client, address, c, p1, Some(contest), 10, 8).await;
    submit(client, address, c, p2, Some(contest), 10, 2).await;
    submit(client, address, c, p2, Some(contest), 10, 8).await;

    contest
}

#[tokio::test]
async fn contest_dashboard_ranks_with_competition_ties() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let contest = seed_contest(&client, &address).await;

    let (status, body) = get_json(
        &client,
        format!("{}/api/contests/{}/dashboard", address, contest),
    )
    .await;
    assert_eq!(status, 200);

    let rankings = body["rankings"].as_array().unwrap();
    let ranks: Vec<i64> = rankings.iter().map(|r| r["rank"].as_i64().unwrap()).collect();
    assert_eq!(ranks, vec![1, 1, 3]);
    assert_eq!(rankings[2]["studentId"], "R003");
    assert_eq!(rankings[2]["problemMarks"], json!([40.0, 40.0]));
    assert_eq!(rankings[0]["totalMarks"], 90.0);
    assert!(rankings[0]["lastSubmissionDate"].as_str().unwrap().len() == 10);
    assert_eq!(body["pagination"]["totalStudents"], 3);
    assert_eq!(body["pagination"]["totalPages"], 1);
    assert_eq!(body["problems"][1]["title"], "Graphs");

    // Display sort does not renumber.
    let (_, sorted) = get_json(
        &client,
        format!(
            "{}/api/contests/{}/dashboard?sortBy=studentId&order=desc&limit=2",
            address, contest
        ),
    )
    .await;
    let rows = sorted["rankings"].as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["studentId"], "R003");
    assert_eq!(rows[0]["rank"], 3);
    assert_eq!(sorted["pagination"]["totalPages"], 2);

    // Filtering happens before ranking.
    let (_, ece) = get_json(
        &client,
        format!("{}/api/contests/{}/dashboard?branch=ECE", address, contest),
    )
    .await;
    assert_eq!(ece["rankings"].as_array().unwrap().len(), 1);
    assert_eq!(ece["rankings"][0]["rank"], 1);

    let (status, _) = get_json(
        &client,
        format!("{}/api/contests/{}/dashboard?page=0", address, contest),
    )
    .await;
    assert_eq!(status, 400);

    let (status, _) = get_json(&client, format!("{}/api/contests/9999/dashboard", address)).await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn contest_export_flattens_the_full_table() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let contest = seed_contest(&client, &address).await;

    let (status, body) = get_json(
        &client,
        format!("{}/api/contests/{}/export", address, contest),
    )
    .await;
    assert_eq!(status, 200);

    let header: Vec<&str> = body["header"]
        .as_array()
        .unwrap()
        .iter()
        .map(|h| h.as_str().unwrap())
        .collect();
    assert_eq!(header[6], "Arrays");
    assert_eq!(header[7], "Graphs");
    assert_eq!(header[8], "Total Marks");
    assert_eq!(header.len(), 11);

    let rows = body["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[2][0], 3);
    assert_eq!(rows[2][1], "R003");
    assert_eq!(rows[2][8], 80.0);
}

#[tokio::test]
async fn contest_submission_must_target_a_contest_problem() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let contest = seed_contest(&client, &address).await;
    let outside = create_problem(&client, &address, "Extra", 10.0).await;

    let response = submit(&client, &address, 1, outside, Some(contest), 1, 1).await;
    assert_eq!(response.status().as_u16(), 400);
}

/// Store whose roster source is down.
struct RosterDown(MemoryStore);

#[async_trait]
impl JudgeStore for RosterDown {
    async fn roster(&self, _filter: &CohortFilter) -> Result<Vec<Student>, AppError> {
        Err(AppError::InternalServerError("roster offline".to_string()))
    }
    async fn problem(&self, id: i64) -> Result<Option<Problem>, AppError> {
        self.0.problem(id).await
    }
    async fn problem_submissions(&self, problem_id: i64) -> Result<Vec<RawSubmission>, AppError> {
        self.0.problem_submissions(problem_id).await
    }
    async fn contest(&self, id: i64) -> Result<Option<Contest>, AppError> {
        self.0.contest(id).await
    }
    async fn contest_submissions(&self, contest_id: i64) -> Result<Vec<RawSubmission>, AppError> {
        self.0.contest_submissions(contest_id).await
    }
    async fn create_student(&self, req: &CreateStudentRequest) -> Result<i64, AppError> {
        self.0.create_student(req).await
    }
    async fn create_problem(&self, req: &CreateProblemRequest) -> Result<i64, AppError> {
        self.0.create_problem(req).await
    }
    async fn create_contest(&self, req: &CreateContestRequest) -> Result<i64, AppError> {
        self.0.create_contest(req).await
    }
    async fn record_submission(&self, submission: &NewSubmission) -> Result<i64, AppError> {
        self.0.record_submission(submission).await
    }
}

#[tokio::test]
async fn analytics_degrade_when_roster_is_unavailable() {
    let address = spawn_app_with(Arc::new(RosterDown(MemoryStore::new()))).await;
    let client = reqwest::Client::new();

    let student = create_student(&client, &address, "R001", "CSE", "B1").await;
    let problem = create_problem(&client, &address, "Two Sum", 100.0).await;
    submit(&client, &address, student, problem, None, 10, 7).await;

    let (status, body) = get_json(
        &client,
        format!("{}/api/problems/{}/analytics?batch=B1", address, problem),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["overall"]["totalStudents"], Value::Null);
    assert_eq!(body["overall"]["completionRate"], Value::Null);
    assert_eq!(body["overall"]["studentsSubmitted"], 1);
    assert_eq!(body["overall"]["passRate"], 100.0);
    assert_eq!(body["overall"]["partial"], true);

    let (status, roster) = get_json(&client, format!("{}/api/batches/B1/students", address)).await;
    assert_eq!(status, 500);
    assert_eq!(roster["error"], "Internal Server Error");
}
