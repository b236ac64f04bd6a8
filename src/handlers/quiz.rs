// src/handlers/quiz.rs

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppError,
    models::{exam::AttemptReport, question::PublicQuestion},
    quiz::{Advance, Outcome, Phase, QuizSession, StoredSession, build_definition},
    state::AppState,
    utils::jwt::Claims,
};

#[derive(Debug, Default, Deserialize)]
pub struct CreateSessionParams {
    #[serde(default)]
    pub skip_welcome: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AnswerRequest {
    #[validate(length(min = 1, message = "question_id is required"))]
    pub question_id: String,
    pub value: String,
}

/// What the learner sees of a session. The answer key never leaves the
/// service.
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub id: Uuid,
    pub course_id: String,
    pub exam_id: String,
    pub title: String,
    pub description: String,
    pub phase: Phase,
    pub min_score_percent: u32,
    pub max_attempts: Option<u32>,
    pub duration_minutes: Option<u32>,
    pub question_count: usize,
    pub current_index: usize,
    pub current_question: Option<PublicQuestion>,
    pub current_answer: Option<String>,
    pub answered_count: usize,
    pub can_proceed: bool,
    pub result: Option<Outcome>,
}

impl SessionView {
    fn new(id: Uuid, entry: &StoredSession) -> Self {
        let session = &entry.session;
        let definition = session.definition();
        let current = (session.phase() == Phase::InProgress)
            .then(|| session.current_question())
            .flatten();

        Self {
            id,
            course_id: entry.course_id.clone(),
            exam_id: definition.id.clone(),
            title: definition.title.clone(),
            description: definition.description.clone(),
            phase: session.phase(),
            min_score_percent: definition.min_score_percent,
            max_attempts: definition.max_attempts,
            duration_minutes: definition.duration_minutes,
            question_count: session.len(),
            current_index: session.current_index(),
            current_question: current.map(PublicQuestion::from),
            current_answer: current
                .and_then(|q| session.answer_for(&q.id))
                .map(str::to_string),
            answered_count: session.answers().len(),
            can_proceed: session.can_proceed(),
            result: session.outcome(),
        }
    }
}

#[derive(Debug, Serialize)]
struct StepResponse {
    /// `next` refused to move: the current question is required.
    blocked: bool,
    #[serde(flatten)]
    session: SessionView,
}

/// Opens a quiz session on the course's exam.
///
/// Replaces any session the learner already had for this course. An exam
/// with no questions completes on creation and is reported right away.
pub async fn create_session(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(course_id): Path<String>,
    Query(params): Query<CreateSessionParams>,
) -> Result<impl IntoResponse, AppError> {
    let (course, exam) = tokio::join!(
        state.backend.course(&course_id),
        state.backend.exam_for_course(&course_id),
    );

    let course = course?;
    let payload = exam?.ok_or_else(|| {
        AppError::NotFound("No exam configured for this course".to_string())
    })?;

    let definition = Arc::new(build_definition(payload));
    let mut session = QuizSession::new(definition, state.config.shuffle_options());
    if params.skip_welcome && session.phase() == Phase::Welcome {
        session.start()?;
    }

    let id = Uuid::new_v4();
    let (view, report) = open(&state, id, &claims, &course_id, &course.title, session).await;
    if let Some(report) = report {
        state.reporter.spawn_attempt(report);
    }

    Ok((StatusCode::CREATED, Json(view)))
}

async fn open(
    state: &AppState,
    id: Uuid,
    claims: &Claims,
    course_id: &str,
    course_title: &str,
    mut session: QuizSession,
) -> (SessionView, Option<AttemptReport>) {
    let report = session.take_report(&claims.sub);
    let entry = StoredSession {
        owner: claims.sub.clone(),
        course_id: course_id.to_string(),
        course_title: course_title.to_string(),
        session,
    };
    let view = SessionView::new(id, &entry);

    tracing::info!(
        "Quiz session {} opened: user {} exam {} ({} questions)",
        id,
        claims.sub,
        view.exam_id,
        view.question_count
    );
    state.sessions.insert(id, entry).await;
    (view, report)
}

/// Applies `f` to the caller's session and hands a freshly completed
/// attempt to the reporter without waiting for it.
async fn transition<T, F>(
    state: &AppState,
    claims: &Claims,
    id: Uuid,
    f: F,
) -> Result<(T, SessionView), AppError>
where
    F: FnOnce(&mut QuizSession) -> Result<T, AppError>,
{
    let (value, view, report) = state
        .sessions
        .with_session(id, &claims.sub, |entry| {
            let value = f(&mut entry.session)?;
            let report = entry.session.take_report(&entry.owner);
            Ok((value, SessionView::new(id, entry), report))
        })
        .await?;

    if let Some(report) = report {
        state.reporter.spawn_attempt(report);
    }
    Ok((value, view))
}

pub async fn get_session(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let view = state
        .sessions
        .with_session(id, &claims.sub, |entry| Ok(SessionView::new(id, entry)))
        .await?;
    Ok(Json(view))
}

/// Leaves the quiz. Nothing is reported for an unfinished attempt.
pub async fn abandon_session(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    state
        .sessions
        .remove(id, &claims.sub)
        .await
        .ok_or_else(|| AppError::NotFound("Quiz session not found".to_string()))?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn start_session(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let ((), view) = transition(&state, &claims, id, |s| Ok(s.start()?)).await?;
    Ok(Json(view))
}

pub async fn answer_question(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let ((), view) = transition(&state, &claims, id, |s| {
        Ok(s.answer(&payload.question_id, payload.value)?)
    })
    .await?;
    Ok(Json(view))
}

pub async fn next_question(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let (advance, session) = transition(&state, &claims, id, |s| Ok(s.next()?)).await?;

    if let Advance::Completed(outcome) = advance {
        tracing::info!(
            "Quiz session {} completed: score {}% passed {}",
            id,
            outcome.score,
            outcome.passed
        );
    }

    Ok(Json(StepResponse {
        blocked: advance == Advance::Blocked,
        session,
    }))
}

pub async fn previous_question(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let (_, session) = transition(&state, &claims, id, |s| Ok(s.previous()?)).await?;
    Ok(Json(StepResponse {
        blocked: false,
        session,
    }))
}

/// Starts over with a fresh shuffle under a new session id.
///
/// The exam is fetched again so the new order is drawn from the canonical
/// definition; when that fails the previous canonical definition is used.
pub async fn retake_session(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let previous = state
        .sessions
        .with_session(id, &claims.sub, |entry| {
            Ok((
                entry.course_id.clone(),
                entry.course_title.clone(),
                Arc::clone(entry.session.definition()),
                entry.session.options(),
            ))
        })
        .await?;
    let (course_id, course_title, cached, options) = previous;

    let definition = match state.backend.exam_for_course(&course_id).await {
        Ok(Some(payload)) => Arc::new(build_definition(payload)),
        Ok(None) => {
            tracing::warn!("Exam for course {} disappeared, retaking cached copy", course_id);
            cached
        }
        Err(e) => {
            tracing::warn!("Exam refetch failed for course {}: {:?}", course_id, e);
            cached
        }
    };
    let session = QuizSession::new(definition, options);

    let new_id = Uuid::new_v4();
    let (view, report) = open(&state, new_id, &claims, &course_id, &course_title, session).await;
    if let Some(report) = report {
        state.reporter.spawn_attempt(report);
    }

    Ok((StatusCode::CREATED, Json(view)))
}
