// src/handlers/certificate.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    certificate::{self, Achievement, CertificateRequest},
    error::AppError,
    models::exam::best_passed,
    state::AppState,
    utils::jwt::Claims,
};

/// Certificate data for the caller's completed attempt.
///
/// 409 while the quiz is still open, 403 when the attempt did not pass.
pub async fn get_certificate(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let public_base_url = state.config.public_base_url.clone();

    let data = state
        .sessions
        .with_session(id, &claims.sub, |entry| {
            let outcome = entry.session.outcome().ok_or_else(|| {
                AppError::Conflict("The quiz has not been completed yet".to_string())
            })?;

            let request = CertificateRequest {
                public_base_url: &public_base_url,
                user_id: &claims.sub,
                recipient_name: claims.display_name(),
                course_id: &entry.course_id,
                course_title: &entry.course_title,
            };
            certificate::issue(&request, &Achievement::from(&outcome))
        })
        .await?;

    tracing::info!(
        "Certificate issued: user {} course {} score {}%",
        claims.sub,
        data.course_title,
        data.score
    );
    Ok(Json(data))
}

/// Certificate for the caller's best stored pass of the course exam.
///
/// Works without a live session, so a pass survives restarts and retakes.
/// 404 when the course has no exam, 403 when no stored attempt passed.
pub async fn get_course_certificate(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(course_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let (course, exam) = tokio::join!(
        state.backend.course(&course_id),
        state.backend.exam_for_course(&course_id),
    );

    let course = course?;
    let exam = exam?.ok_or_else(|| {
        AppError::NotFound("No exam configured for this course".to_string())
    })?;

    let results = state.backend.exam_results(&claims.sub, &exam.id).await?;
    let best = best_passed(&results).ok_or_else(|| {
        AppError::Forbidden("No passed attempt on record for this course".to_string())
    })?;

    let request = CertificateRequest {
        public_base_url: &state.config.public_base_url,
        user_id: &claims.sub,
        recipient_name: claims.display_name(),
        course_id: &course_id,
        course_title: &course.title,
    };
    let data = certificate::issue(
        &request,
        &Achievement::from_result(best, Utc::now().date_naive()),
    )?;

    tracing::info!(
        "Certificate issued from stored attempt: user {} course {} score {}%",
        claims.sub,
        data.course_title,
        data.score
    );
    Ok(Json(data))
}

/// Public lookup behind the link printed on a certificate.
pub async fn verify_certificate(
    State(state): State<AppState>,
    Path((user_id, course_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let validation = state
        .backend
        .validate_certificate(&user_id, &course_id)
        .await?;
    Ok(Json(validation))
}
