// src/handlers/course.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde::Serialize;
use validator::Validate;

use crate::{
    error::AppError,
    lessons::LessonPlan,
    models::{
        course::Lesson,
        progress::{ProgressTickRequest, VideoProgressTick},
    },
    quiz::build_definition,
    reporter::{LessonTracker, TickDecision},
    state::AppState,
    utils::jwt::Claims,
};

#[derive(Serialize)]
struct LessonView {
    id: String,
    title: String,
    module_title: Option<String>,
    video_url: Option<String>,
    duration_seconds: u64,
    completed: bool,
}

#[derive(Serialize)]
struct ExamSummary {
    id: String,
    title: String,
    question_count: usize,
    min_score_percent: u32,
}

#[derive(Serialize)]
struct CoursePageResponse {
    id: String,
    title: String,
    description: Option<String>,
    lessons: Vec<LessonView>,
    completed_lesson_ids: Vec<String>,
    resume_index: usize,
    resume_lesson_id: Option<String>,
    progress_percent: f64,
    quiz_unlocked: bool,
    exam: Option<ExamSummary>,
}

#[derive(Serialize)]
struct PlaybackResponse {
    saved: bool,
    completed: bool,
    all_lessons_completed: bool,
    next_lesson_id: Option<String>,
}

/// Loads a course page.
///
/// Course, progress and exam are fetched concurrently. Only the course is
/// mandatory: missing progress means nothing watched yet, and a missing or
/// failing exam just hides the quiz.
pub async fn get_course_page(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(course_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let (course, progress, exam) = tokio::join!(
        state.backend.course(&course_id),
        state.backend.course_progress(&claims.sub, &course_id),
        state.backend.exam_for_course(&course_id),
    );

    let course = course?;

    let progress = progress.unwrap_or_else(|e| {
        tracing::warn!("Progress unavailable for course {}: {:?}", course_id, e);
        None
    });

    let exam = match exam {
        Ok(Some(payload)) => {
            let definition = build_definition(payload);
            Some(ExamSummary {
                id: definition.id.clone(),
                title: definition.title.clone(),
                question_count: definition.questions.len(),
                min_score_percent: definition.min_score_percent,
            })
        }
        Ok(None) => None,
        Err(e) => {
            tracing::warn!("Exam unavailable for course {}: {:?}", course_id, e);
            None
        }
    };

    let plan = LessonPlan::new(&course, progress.as_ref());
    let resume_index = plan.resume_index();

    let response = CoursePageResponse {
        id: course.id.clone(),
        title: course.title.clone(),
        description: course.description.clone(),
        lessons: plan
            .lessons()
            .iter()
            .map(|l| LessonView {
                id: l.id.clone(),
                title: l.title.clone(),
                module_title: plan.module_title_of(&l.id).map(str::to_string),
                video_url: l.video_url.clone(),
                duration_seconds: l.duration_seconds(),
                completed: plan.is_completed(&l.id),
            })
            .collect(),
        completed_lesson_ids: plan.completed_ids(),
        resume_index,
        resume_lesson_id: plan.lessons().get(resume_index).map(|l| l.id.clone()),
        progress_percent: plan.progress_percent(),
        quiz_unlocked: plan.all_completed(),
        exam,
    };

    // A page load starts playback tracking over.
    state.playback.reset(&claims.sub, &course_id, plan).await;

    Ok(Json(response))
}

/// Lesson state read under the playback lock, reported after it is released.
struct PlaybackStep {
    lesson: Lesson,
    decision: TickDecision,
    fallback_total: u64,
    all_lessons_completed: bool,
    next_lesson_id: Option<String>,
}

/// Tracks a course the page was never loaded for.
async fn ensure_playback(state: &AppState, user_id: &str, course_id: &str) -> Result<(), AppError> {
    if state.playback.contains(user_id, course_id).await {
        return Ok(());
    }

    let (course, progress) = tokio::join!(
        state.backend.course(course_id),
        state.backend.course_progress(user_id, course_id),
    );
    let course = course?;
    let progress = progress.unwrap_or_else(|e| {
        tracing::warn!("Progress unavailable for course {}: {:?}", course_id, e);
        None
    });

    state
        .playback
        .reset(user_id, course_id, LessonPlan::new(&course, progress.as_ref()))
        .await;
    Ok(())
}

fn next_lesson_id(plan: &LessonPlan, lesson_id: &str) -> Option<String> {
    plan.index_of(lesson_id)
        .and_then(|i| plan.next_index(i))
        .and_then(|i| plan.lessons().get(i))
        .map(|l| l.id.clone())
}

async fn playback_step<F>(
    state: &AppState,
    claims: &Claims,
    course_id: &str,
    lesson_id: &str,
    f: F,
) -> Result<PlaybackStep, AppError>
where
    F: FnOnce(&mut LessonTracker) -> TickDecision,
{
    ensure_playback(state, &claims.sub, course_id).await?;

    state
        .playback
        .with_playback(&claims.sub, course_id, |playback| {
            let lesson = playback
                .plan
                .lesson(lesson_id)
                .cloned()
                .ok_or_else(|| AppError::NotFound("Lesson not found in this course".to_string()))?;

            playback.tracker.switch_to(lesson_id);
            let decision = f(&mut playback.tracker);
            if decision.complete {
                playback.plan.mark_completed(lesson_id);
            }

            Ok(PlaybackStep {
                lesson,
                decision,
                fallback_total: playback.tracker.last_total_sec(),
                all_lessons_completed: playback.plan.all_completed(),
                next_lesson_id: next_lesson_id(&playback.plan, lesson_id),
            })
        })
        .await
}

/// One playback sample from the player.
///
/// The backend outcome only shows up in `saved`; this endpoint does not
/// fail because the backend did.
pub async fn report_progress(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((course_id, lesson_id)): Path<(String, String)>,
    Json(payload): Json<ProgressTickRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let tick = VideoProgressTick::new(payload.current_seconds, payload.total_seconds);
    let step = playback_step(&state, &claims, &course_id, &lesson_id, |tracker| {
        tracker.observe(&tick)
    })
    .await?;

    let saved = match step.decision.save_at {
        Some(second) => {
            state
                .reporter
                .report_video_progress(&claims.sub, &course_id, &lesson_id, second, &tick)
                .await
        }
        None => false,
    };

    if step.decision.complete {
        state
            .reporter
            .report_lesson_complete(&claims.sub, &course_id, &step.lesson, step.fallback_total)
            .await;
    }

    Ok(Json(PlaybackResponse {
        saved,
        completed: step.decision.complete,
        all_lessons_completed: step.all_lessons_completed,
        next_lesson_id: step.next_lesson_id,
    }))
}

/// End of stream: the lesson counts as watched even below the threshold.
pub async fn lesson_ended(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((course_id, lesson_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let step = playback_step(&state, &claims, &course_id, &lesson_id, |tracker| {
        tracker.ended();
        TickDecision {
            save_at: None,
            complete: true,
        }
    })
    .await?;

    let saved = state
        .reporter
        .report_lesson_complete(&claims.sub, &course_id, &step.lesson, step.fallback_total)
        .await;

    Ok(Json(PlaybackResponse {
        saved,
        completed: true,
        all_lessons_completed: step.all_lessons_completed,
        next_lesson_id: step.next_lesson_id,
    }))
}
