// src/backend/mod.rs

//! Client side of the remote LMS API, which owns courses, enrollments,
//! progress and exam results.

pub mod http;

use async_trait::async_trait;

use crate::{
    error::AppError,
    models::{
        certificate::CertificateValidation,
        course::{Course, CourseProgress},
        exam::{AttemptReport, ExamPayload, ExamResult},
        progress::VideoProgressRecord,
    },
};

pub use http::HttpBackend;

#[async_trait]
pub trait LmsBackend: Send + Sync {
    /// Course detail. A missing course is `AppError::NotFound`.
    async fn course(&self, course_id: &str) -> Result<Course, AppError>;

    /// Learner progress; `None` when the learner has none yet.
    async fn course_progress(
        &self,
        user_id: &str,
        course_id: &str,
    ) -> Result<Option<CourseProgress>, AppError>;

    /// First exam configured for the course; `None` when there is none.
    async fn exam_for_course(&self, course_id: &str) -> Result<Option<ExamPayload>, AppError>;

    async fn save_video_progress(&self, record: &VideoProgressRecord) -> Result<(), AppError>;

    async fn submit_attempt(&self, report: &AttemptReport) -> Result<(), AppError>;

    /// Stored attempts of one learner for one exam, oldest first.
    async fn exam_results(
        &self,
        user_id: &str,
        exam_id: &str,
    ) -> Result<Vec<ExamResult>, AppError>;

    async fn validate_certificate(
        &self,
        user_id: &str,
        course_id: &str,
    ) -> Result<CertificateValidation, AppError>;
}
