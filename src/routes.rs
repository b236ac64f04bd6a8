// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use url::Url;

use crate::{
    handlers::{certificate, course, quiz},
    state::AppState,
    utils::jwt::auth_middleware,
};

/// Assembles the main application router.
///
/// * Course pages, playback reports and quiz sessions require a bearer token.
/// * Certificate verification is public.
/// * Applies global middleware (Trace, CORS).
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);
    let cors = match allowed_origin(&state.config.public_base_url) {
        Some(origin) => cors.allow_origin(origin),
        None => {
            tracing::warn!(
                "PUBLIC_BASE_URL '{}' has no usable origin; CORS disabled",
                state.config.public_base_url
            );
            cors
        }
    };

    let course_routes = Router::new()
        .route("/{course_id}", get(course::get_course_page))
        .route(
            "/{course_id}/lessons/{lesson_id}/progress",
            post(course::report_progress),
        )
        .route(
            "/{course_id}/lessons/{lesson_id}/ended",
            post(course::lesson_ended),
        )
        .route("/{course_id}/quiz/sessions", post(quiz::create_session))
        .route(
            "/{course_id}/certificate",
            get(certificate::get_course_certificate),
        );

    let quiz_routes = Router::new()
        .route(
            "/sessions/{id}",
            get(quiz::get_session).delete(quiz::abandon_session),
        )
        .route("/sessions/{id}/start", post(quiz::start_session))
        .route("/sessions/{id}/answers", put(quiz::answer_question))
        .route("/sessions/{id}/next", post(quiz::next_question))
        .route("/sessions/{id}/previous", post(quiz::previous_question))
        .route("/sessions/{id}/retake", post(quiz::retake_session))
        .route(
            "/sessions/{id}/certificate",
            get(certificate::get_certificate),
        );

    let protected = Router::new()
        .nest("/api/courses", course_routes)
        .nest("/api/quiz", quiz_routes)
        // Unmatched paths fall through to 404 without a token check.
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route(
            "/api/verify/{user_id}/{course_id}",
            get(certificate::verify_certificate),
        )
        .merge(protected)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn allowed_origin(public_base_url: &str) -> Option<HeaderValue> {
    let origin = Url::parse(public_base_url).ok()?.origin();
    if !origin.is_tuple() {
        return None;
    }
    HeaderValue::from_str(&origin.ascii_serialization()).ok()
}
