// tests/api_tests.rs

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use course_quiz::{
    backend::HttpBackend, config::Config, routes, state::AppState, utils::jwt::sign_jwt,
};
use serde_json::{Value, json};

const SECRET: &str = "test_secret_for_integration_tests";

/// In-memory stand-in for the LMS backend.
#[derive(Default)]
struct Lms {
    fail_writes: bool,
    progress: Mutex<Vec<Value>>,
    attempts: Mutex<Vec<Value>>,
}

type LmsState = Arc<Lms>;

fn course_json(id: &str) -> Value {
    json!({
        "id": id,
        "titulo": "Workplace Safety",
        "descripcion": "Basics",
        "modulos": [
            {
                "modulo_titulo": "Intro",
                "lecciones": [
                    { "id": 1, "titulo": "Welcome", "duracion_minutos": 2 },
                    { "id": 2, "titulo": "Hazards", "duracion_minutos": "10" }
                ]
            },
            {
                "modulo_titulo": "Wrap-up",
                "lecciones": [ { "id": 3, "titulo": "Summary" } ]
            }
        ]
    })
}

fn exam_json() -> Value {
    json!({
        "id": 77,
        "titulo": "Final exam",
        "puntajeMinimoAprobacion": "70",
        "pages": [
            {
                "name": "page1",
                "elements": [
                    {
                        "name": "q1",
                        "title": "Which language?",
                        "type": "radiogroup",
                        "isRequired": true,
                        "choices": [
                            { "value": "a", "text": "Rust" },
                            { "value": "b", "text": "Go" }
                        ],
                        "correctAnswer": "a"
                    },
                    {
                        "name": "q2",
                        "title": "Wear a helmet?",
                        "type": "radiogroup",
                        "isRequired": true,
                        "choices": ["Yes", "No"],
                        "correctAnswer": "Yes"
                    }
                ]
            },
            {
                "name": "page2",
                "elements": [
                    { "name": "q3", "title": "Any comments?", "type": "comment", "isRequired": true }
                ]
            }
        ]
    })
}

async fn lms_course(Path(id): Path<String>) -> impl IntoResponse {
    if id == "missing" {
        return (StatusCode::NOT_FOUND, Json(json!({ "success": false }))).into_response();
    }
    Json(json!({ "success": true, "data": course_json(&id) })).into_response()
}

async fn lms_progress(Path((_user, _course)): Path<(String, String)>) -> impl IntoResponse {
    Json(json!({
        "success": true,
        "data": {
            "inscripcion": { "id": 9, "fechaInscripcion": "2026-01-05" },
            "progresosVideos": [
                { "leccionId": 1, "segundoActual": 120, "duracionTotal": 120, "completado": true }
            ]
        }
    }))
}

async fn lms_exams(Path(course): Path<String>) -> impl IntoResponse {
    if course == "no-exam" {
        return Json(json!({ "success": true, "data": [] }));
    }
    Json(json!({ "success": true, "data": [exam_json()] }))
}

async fn lms_save_progress(State(lms): State<LmsState>, Json(body): Json<Value>) -> StatusCode {
    if lms.fail_writes {
        return StatusCode::INTERNAL_SERVER_ERROR;
    }
    lms.progress.lock().unwrap().push(body);
    StatusCode::OK
}

async fn lms_submit_attempt(
    State(lms): State<LmsState>,
    Path(_exam): Path<String>,
    Json(body): Json<Value>,
) -> StatusCode {
    if lms.fail_writes {
        return StatusCode::INTERNAL_SERVER_ERROR;
    }
    lms.attempts.lock().unwrap().push(body);
    StatusCode::CREATED
}

/// Stored attempts of the requested learner, as the LMS would return them.
async fn lms_results(
    State(lms): State<LmsState>,
    Path(_exam): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let user = params.get("usuarioId").cloned().unwrap_or_default();
    let results: Vec<Value> = lms
        .attempts
        .lock()
        .unwrap()
        .iter()
        .filter(|a| a["usuarioId"] == user.as_str())
        .enumerate()
        .map(|(i, a)| {
            json!({
                "numero_intento": i + 1,
                "puntaje": a["puntaje"].to_string(),
                "aprobado": a["aprobado"],
                "completado": true,
                "fecha_inicio": "2026-02-10T09:00:00Z",
                "fecha_fin": format!("2026-02-1{}T10:00:00Z", i),
            })
        })
        .collect();
    Json(json!({ "success": true, "data": results }))
}

async fn lms_validation(Path((_user, course)): Path<(String, String)>) -> impl IntoResponse {
    Json(json!({
        "success": true,
        "data": {
            "cursoCompleto": course != "unfinished",
            "inscripcion": { "fechaInscripcion": "2026-01-05" }
        }
    }))
}

async fn spawn_lms(lms: LmsState) -> String {
    let app = Router::new()
        .route("/api/cursos/{id}", get(lms_course))
        .route("/api/progreso/usuario/{user}/curso/{course}", get(lms_progress))
        .route("/api/examenes/curso/{course}", get(lms_exams))
        .route("/api/progreso/video", put(lms_save_progress))
        .route("/api/examenes/{exam}/responder", post(lms_submit_attempt))
        .route("/api/examenes/{exam}/resultados", get(lms_results))
        .route(
            "/api/progreso/validacion/usuario/{user}/curso/{course}",
            get(lms_validation),
        )
        .with_state(lms);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let address = format!("http://127.0.0.1:{}", listener.local_addr().unwrap().port());

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    address
}

struct TestApp {
    address: String,
    lms: LmsState,
    client: reqwest::Client,
}

impl TestApp {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    fn token(&self, user_id: &str) -> String {
        sign_jwt(user_id, Some("Ana Learner"), SECRET, 600).expect("Failed to sign token")
    }

    async fn post(&self, user_id: &str, path: &str) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .bearer_auth(self.token(user_id))
            .send()
            .await
            .expect("Failed to execute request")
    }

    async fn get(&self, user_id: &str, path: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .bearer_auth(self.token(user_id))
            .send()
            .await
            .expect("Failed to execute request")
    }

    async fn answer(&self, user_id: &str, session: &str, question_id: &str, value: &str) -> Value {
        let response = self
            .client
            .put(self.url(&format!("/api/quiz/sessions/{}/answers", session)))
            .bearer_auth(self.token(user_id))
            .json(&json!({ "question_id": question_id, "value": value }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status().as_u16(), 200);
        response.json().await.unwrap()
    }

    async fn open_quiz(&self, user_id: &str, course_id: &str) -> Value {
        let response = self
            .post(
                user_id,
                &format!("/api/courses/{}/quiz/sessions?skip_welcome=true", course_id),
            )
            .await;
        assert_eq!(response.status().as_u16(), 201);
        response.json().await.unwrap()
    }

    /// Answers every question in presentation order and clicks next after
    /// each one. Returns the final `next` response.
    async fn complete_quiz(&self, user_id: &str, session: &Value, correct: bool) -> Value {
        let id = session["id"].as_str().unwrap().to_string();
        let mut view = session.clone();

        while view["phase"] == "in_progress" {
            let question = view["current_question"]["id"].as_str().unwrap().to_string();
            let value = match (question.as_str(), correct) {
                // Label instead of value is accepted.
                ("q1", true) => "Rust",
                ("q1", false) => "b",
                ("q2", true) => "Yes",
                ("q2", false) => "No",
                _ => "Looks good",
            };
            self.answer(user_id, &id, &question, value).await;

            let response = self
                .post(user_id, &format!("/api/quiz/sessions/{}/next", id))
                .await;
            assert_eq!(response.status().as_u16(), 200);
            view = response.json().await.unwrap();
            assert_eq!(view["blocked"], false);
        }

        view
    }

    /// Attempts are submitted on a background task.
    async fn wait_for_attempts(&self, count: usize) -> Vec<Value> {
        for _ in 0..100 {
            let attempts = self.lms.attempts.lock().unwrap().clone();
            if attempts.len() >= count {
                return attempts;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        self.lms.attempts.lock().unwrap().clone()
    }
}

/// Spawns the LMS fake and the app, each on a random port.
async fn spawn_app_with(lms: Lms) -> TestApp {
    let lms = Arc::new(lms);
    let backend_url = spawn_lms(Arc::clone(&lms)).await;

    let config = Config {
        backend_url: backend_url.clone(),
        jwt_secret: SECRET.to_string(),
        public_base_url: "https://learn.example.com".to_string(),
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        rust_log: "error".to_string(),
        shuffle_questions: true,
        shuffle_choices: true,
        backend_timeout_secs: 5,
    };

    let backend = HttpBackend::from_config(&config).expect("Failed to build backend client");
    let state = AppState::new(config, Arc::new(backend));
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let address = format!("http://127.0.0.1:{}", listener.local_addr().unwrap().port());

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        address,
        lms,
        client: reqwest::Client::new(),
    }
}

async fn spawn_app() -> TestApp {
    spawn_app_with(Lms::default()).await
}

#[tokio::test]
async fn health_check_404() {
    let app = spawn_app().await;

    let response = app
        .client
        .get(app.url("/random_path_that_does_not_exist"))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn protected_routes_require_token() {
    let app = spawn_app().await;

    let response = app
        .client
        .get(app.url("/api/courses/c1"))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 401);

    let response = app
        .client
        .get(app.url("/api/courses/c1"))
        .bearer_auth("not-a-jwt")
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn course_page_resumes_at_first_unwatched_lesson() {
    let app = spawn_app().await;

    let response = app.get("user-1", "/api/courses/c1").await;
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();

    assert_eq!(body["title"], "Workplace Safety");
    assert_eq!(body["lessons"].as_array().unwrap().len(), 3);
    assert_eq!(body["lessons"][1]["duration_seconds"], 600);
    assert_eq!(body["lessons"][2]["module_title"], "Wrap-up");
    assert_eq!(body["completed_lesson_ids"], json!(["1"]));
    assert_eq!(body["resume_index"], 1);
    assert_eq!(body["resume_lesson_id"], "2");
    assert_eq!(body["quiz_unlocked"], false);
    assert_eq!(body["exam"]["question_count"], 3);
    assert_eq!(body["exam"]["min_score_percent"], 70);
}

#[tokio::test]
async fn course_page_without_exam_is_not_an_error() {
    let app = spawn_app().await;

    let response = app.get("user-1", "/api/courses/no-exam").await;
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert!(body["exam"].is_null());

    let response = app.get("user-1", "/api/courses/missing").await;
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn quiz_without_exam_is_404() {
    let app = spawn_app().await;

    let response = app
        .post("user-1", "/api/courses/no-exam/quiz/sessions")
        .await;

    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn quiz_end_to_end_scores_and_reports_once() {
    let app = spawn_app().await;

    let session = app.open_quiz("user-1", "c1").await;
    assert_eq!(session["phase"], "in_progress");
    assert_eq!(session["question_count"], 3);
    // The answer key never reaches the learner.
    assert!(session["current_question"].get("correct_answer").is_none());

    let done = app.complete_quiz("user-1", &session, true).await;
    assert_eq!(done["phase"], "completed");
    assert_eq!(done["result"]["score"], 100);
    assert_eq!(done["result"]["passed"], true);
    assert_eq!(done["result"]["scored"], 2);

    let attempts = app.wait_for_attempts(1).await;
    assert_eq!(attempts.len(), 1);
    let attempt = &attempts[0];
    assert_eq!(attempt["usuarioId"], "user-1");
    assert_eq!(attempt["puntaje"], 100);
    assert_eq!(attempt["aprobado"], true);
    assert_eq!(attempt["respuestas"].as_array().unwrap().len(), 3);

    // Completed sessions refuse further transitions and are not re-reported.
    let id = session["id"].as_str().unwrap();
    let response = app
        .post("user-1", &format!("/api/quiz/sessions/{}/next", id))
        .await;
    assert_eq!(response.status().as_u16(), 409);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(app.lms.attempts.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn required_question_blocks_next() {
    let app = spawn_app().await;

    let session = app.open_quiz("user-1", "c1").await;
    let id = session["id"].as_str().unwrap();
    assert_eq!(session["can_proceed"], false);

    let response = app
        .post("user-1", &format!("/api/quiz/sessions/{}/next", id))
        .await;
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["blocked"], true);
    assert_eq!(body["current_index"], 0);

    let question = session["current_question"]["id"].as_str().unwrap();
    app.answer("user-1", id, question, "").await;
    let view = app.answer("user-1", id, question, "something").await;
    assert_eq!(view["can_proceed"], true);
    assert_eq!(view["answered_count"], 1);
    assert_eq!(view["current_answer"], "something");

    let response = app
        .post("user-1", &format!("/api/quiz/sessions/{}/next", id))
        .await;
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["blocked"], false);
    assert_eq!(body["current_index"], 1);
}

#[tokio::test]
async fn welcome_phase_must_be_started() {
    let app = spawn_app().await;

    let response = app.post("user-1", "/api/courses/c1/quiz/sessions").await;
    assert_eq!(response.status().as_u16(), 201);
    let session: Value = response.json().await.unwrap();
    assert_eq!(session["phase"], "welcome");
    assert!(session["current_question"].is_null());
    let id = session["id"].as_str().unwrap();

    let response = app
        .client
        .put(app.url(&format!("/api/quiz/sessions/{}/answers", id)))
        .bearer_auth(app.token("user-1"))
        .json(&json!({ "question_id": "q1", "value": "a" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 409);

    let response = app
        .post("user-1", &format!("/api/quiz/sessions/{}/start", id))
        .await;
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["phase"], "in_progress");
}

#[tokio::test]
async fn unknown_question_is_rejected() {
    let app = spawn_app().await;

    let session = app.open_quiz("user-1", "c1").await;
    let id = session["id"].as_str().unwrap();

    let response = app
        .client
        .put(app.url(&format!("/api/quiz/sessions/{}/answers", id)))
        .bearer_auth(app.token("user-1"))
        .json(&json!({ "question_id": "q99", "value": "a" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn sessions_are_private_to_their_owner() {
    let app = spawn_app().await;

    let session = app.open_quiz("user-1", "c1").await;
    let id = session["id"].as_str().unwrap();

    let response = app
        .get("user-2", &format!("/api/quiz/sessions/{}", id))
        .await;
    assert_eq!(response.status().as_u16(), 404);

    let response = app
        .get("user-1", &format!("/api/quiz/sessions/{}", id))
        .await;
    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
async fn retake_opens_a_fresh_session() {
    let app = spawn_app().await;

    let session = app.open_quiz("user-1", "c1").await;
    let done = app.complete_quiz("user-1", &session, false).await;
    assert_eq!(done["result"]["passed"], false);
    let old_id = session["id"].as_str().unwrap();

    let response = app
        .post("user-1", &format!("/api/quiz/sessions/{}/retake", old_id))
        .await;
    assert_eq!(response.status().as_u16(), 201);
    let retake: Value = response.json().await.unwrap();

    assert_ne!(retake["id"], session["id"]);
    assert_eq!(retake["phase"], "welcome");
    assert_eq!(retake["answered_count"], 0);
    assert!(retake["result"].is_null());

    // The old attempt is gone.
    let response = app
        .get("user-1", &format!("/api/quiz/sessions/{}", old_id))
        .await;
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn certificate_requires_a_passed_attempt() {
    let app = spawn_app().await;

    let session = app.open_quiz("user-1", "c1").await;
    let id = session["id"].as_str().unwrap().to_string();

    let response = app
        .get("user-1", &format!("/api/quiz/sessions/{}/certificate", id))
        .await;
    assert_eq!(response.status().as_u16(), 409);

    app.complete_quiz("user-1", &session, false).await;
    let response = app
        .get("user-1", &format!("/api/quiz/sessions/{}/certificate", id))
        .await;
    assert_eq!(response.status().as_u16(), 403);

    let session = app.open_quiz("user-1", "c1").await;
    let id = session["id"].as_str().unwrap().to_string();
    app.complete_quiz("user-1", &session, true).await;

    let response = app
        .get("user-1", &format!("/api/quiz/sessions/{}/certificate", id))
        .await;
    assert_eq!(response.status().as_u16(), 200);
    let cert: Value = response.json().await.unwrap();
    assert_eq!(cert["recipient_name"], "Ana Learner");
    assert_eq!(cert["course_title"], "Workplace Safety");
    assert_eq!(cert["score"], 100);
    assert_eq!(
        cert["verification_url"],
        "https://learn.example.com/verify/user-1/c1?userName=Ana+Learner&courseName=Workplace+Safety&score=100"
    );

    // Asking again issues the same certificate, dated by the attempt.
    let again: Value = app
        .get("user-1", &format!("/api/quiz/sessions/{}/certificate", id))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(again["completion_date"], cert["completion_date"]);
    assert_eq!(again, cert);
}

#[tokio::test]
async fn course_certificate_comes_from_stored_attempts() {
    let app = spawn_app().await;

    let response = app.get("user-1", "/api/courses/c1/certificate").await;
    assert_eq!(response.status().as_u16(), 403);

    let session = app.open_quiz("user-1", "c1").await;
    app.complete_quiz("user-1", &session, false).await;
    app.wait_for_attempts(1).await;
    let response = app.get("user-1", "/api/courses/c1/certificate").await;
    assert_eq!(response.status().as_u16(), 403);

    let session = app.open_quiz("user-1", "c1").await;
    app.complete_quiz("user-1", &session, true).await;
    app.wait_for_attempts(2).await;

    // No live session is needed once the pass is stored.
    let id = session["id"].as_str().unwrap();
    let response = app
        .client
        .delete(app.url(&format!("/api/quiz/sessions/{}", id)))
        .bearer_auth(app.token("user-1"))
        .send()
        .await
        .expect("Failed to execute request");
    assert!(response.status().is_success());

    let response = app.get("user-1", "/api/courses/c1/certificate").await;
    assert_eq!(response.status().as_u16(), 200);
    let cert: Value = response.json().await.unwrap();
    assert_eq!(cert["score"], 100);
    assert_eq!(cert["course_title"], "Workplace Safety");
    assert_eq!(cert["completion_date"], "2026-02-11");
    assert!(
        cert["verification_url"]
            .as_str()
            .unwrap()
            .starts_with("https://learn.example.com/verify/user-1/c1?")
    );

    // Another learner's passes do not count.
    let response = app.get("user-2", "/api/courses/c1/certificate").await;
    assert_eq!(response.status().as_u16(), 403);

    let response = app.get("user-1", "/api/courses/no-exam/certificate").await;
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn verify_endpoint_is_public() {
    let app = spawn_app().await;

    let response = app
        .client
        .get(app.url("/api/verify/user-1/c1"))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["valid"], true);
    assert_eq!(body["enrolled_at"], "2026-01-05");

    let response = app
        .client
        .get(app.url("/api/verify/user-1/unfinished"))
        .send()
        .await
        .expect("Failed to execute request");
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["valid"], false);
}

#[tokio::test]
async fn progress_ticks_are_throttled() {
    let app = spawn_app().await;
    app.get("user-1", "/api/courses/c1").await;

    for second in 1..=25 {
        let response = app
            .client
            .post(app.url("/api/courses/c1/lessons/2/progress"))
            .bearer_auth(app.token("user-1"))
            .json(&json!({ "current_seconds": second as f64, "total_seconds": 600.0 }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status().as_u16(), 200);
    }

    let saved = app.lms.progress.lock().unwrap().clone();
    assert_eq!(saved.len(), 2);
    assert_eq!(saved[0]["segundoActual"], 10);
    assert_eq!(saved[1]["segundoActual"], 20);
    assert_eq!(saved[0]["leccionId"], "2");
    assert_eq!(saved[0]["duracionTotal"], 600);
}

#[tokio::test]
async fn lesson_completes_at_ninety_percent_and_on_end() {
    let app = spawn_app().await;
    app.get("user-1", "/api/courses/c1").await;

    let response = app
        .client
        .post(app.url("/api/courses/c1/lessons/2/progress"))
        .bearer_auth(app.token("user-1"))
        .json(&json!({ "current_seconds": 545.0, "total_seconds": 600.0 }))
        .send()
        .await
        .expect("Failed to execute request");
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["saved"], true);
    assert_eq!(body["completed"], true);
    assert_eq!(body["next_lesson_id"], "3");
    assert_eq!(body["all_lessons_completed"], false);

    // Lesson 3 has no catalog duration; the ended report falls back to 0.
    let response = app.post("user-1", "/api/courses/c1/lessons/3/ended").await;
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["completed"], true);
    assert_eq!(body["all_lessons_completed"], true);
    assert!(body["next_lesson_id"].is_null());

    let saved = app.lms.progress.lock().unwrap().clone();
    // Tick save, 90% completion, end of stream.
    assert_eq!(saved.len(), 3);
    assert_eq!(saved[1]["segundoActual"], 600);
    assert_eq!(saved[1]["duracionTotal"], 600);
    assert_eq!(saved[2]["leccionId"], "3");

    let response = app.get("user-1", "/api/courses/c1").await;
    let body: Value = response.json().await.unwrap();
    // Progress comes from the LMS, which this fake does not update.
    assert_eq!(body["resume_index"], 1);
}

#[tokio::test]
async fn unknown_lesson_is_404() {
    let app = spawn_app().await;

    let response = app
        .client
        .post(app.url("/api/courses/c1/lessons/999/progress"))
        .bearer_auth(app.token("user-1"))
        .json(&json!({ "current_seconds": 1.0, "total_seconds": 10.0 }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn invalid_progress_tick_is_400() {
    let app = spawn_app().await;

    let response = app
        .client
        .post(app.url("/api/courses/c1/lessons/2/progress"))
        .bearer_auth(app.token("user-1"))
        .json(&json!({ "current_seconds": -5.0, "total_seconds": 10.0 }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn failing_backend_writes_never_reach_the_learner() {
    let app = spawn_app_with(Lms {
        fail_writes: true,
        ..Default::default()
    })
    .await;

    let response = app
        .client
        .post(app.url("/api/courses/c1/lessons/2/progress"))
        .bearer_auth(app.token("user-1"))
        .json(&json!({ "current_seconds": 12.0, "total_seconds": 600.0 }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["saved"], false);

    let session = app.open_quiz("user-1", "c1").await;
    let done = app.complete_quiz("user-1", &session, true).await;
    assert_eq!(done["result"]["score"], 100);
    assert_eq!(done["result"]["passed"], true);

    let id = session["id"].as_str().unwrap();
    let response = app
        .get("user-1", &format!("/api/quiz/sessions/{}/certificate", id))
        .await;
    assert_eq!(response.status().as_u16(), 200);
}
