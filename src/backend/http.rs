// src/backend/http.rs

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use super::LmsBackend;
use crate::{
    config::Config,
    error::AppError,
    models::{
        Envelope,
        certificate::{CertificateValidation, ValidationPayload},
        course::{Course, CourseProgress},
        exam::{AttemptReport, AttemptSubmission, ExamPayload, ExamResult},
        lenient,
        progress::VideoProgressRecord,
    },
};

/// `LmsBackend` over the backend's JSON REST API.
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: Url,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AppError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| AppError::Config(format!("BACKEND_URL is not a valid URL: {}", e)))?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::Config("BACKEND_URL cannot be a base URL".to_string()));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, base_url })
    }

    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        Self::new(
            &config.backend_url,
            Duration::from_secs(config.backend_timeout_secs),
        )
    }

    /// `base_url` + percent-encoded path segments.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, AppError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| AppError::Config("BACKEND_URL cannot be a base URL".to_string()))?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    async fn get(&self, segments: &[&str]) -> Result<Response, AppError> {
        let url = self.endpoint(segments)?;
        tracing::debug!("GET {}", url);
        Ok(self.client.get(url).send().await?)
    }
}

async fn envelope<T: DeserializeOwned>(response: Response) -> Result<Envelope<T>, AppError> {
    let response = response.error_for_status()?;
    Ok(response.json::<Envelope<T>>().await?)
}

fn message_text(message: Option<serde_json::Value>) -> Option<String> {
    message.as_ref().and_then(lenient::value_text)
}

#[async_trait]
impl LmsBackend for HttpBackend {
    async fn course(&self, course_id: &str) -> Result<Course, AppError> {
        let response = self.get(&["api", "cursos", course_id]).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(AppError::NotFound("Course not found".to_string()));
        }

        let body: Envelope<Course> = envelope(response).await?;
        match body.data {
            Some(course) if body.success => Ok(course),
            _ => Err(AppError::NotFound("Course not found".to_string())),
        }
    }

    async fn course_progress(
        &self,
        user_id: &str,
        course_id: &str,
    ) -> Result<Option<CourseProgress>, AppError> {
        let response = self
            .get(&["api", "progreso", "usuario", user_id, "curso", course_id])
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let body: Envelope<CourseProgress> = envelope(response).await?;
        Ok(body.data.filter(|_| body.success))
    }

    async fn exam_for_course(&self, course_id: &str) -> Result<Option<ExamPayload>, AppError> {
        let response = self.get(&["api", "examenes", "curso", course_id]).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let body: Envelope<Vec<ExamPayload>> = envelope(response).await?;
        Ok(body.data.unwrap_or_default().into_iter().next())
    }

    async fn save_video_progress(&self, record: &VideoProgressRecord) -> Result<(), AppError> {
        let url = self.endpoint(&["api", "progreso", "video"])?;
        self.client
            .put(url)
            .json(record)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn submit_attempt(&self, report: &AttemptReport) -> Result<(), AppError> {
        let url = self.endpoint(&["api", "examenes", report.exam_id.as_str(), "responder"])?;
        self.client
            .post(url)
            .json(&AttemptSubmission::from(report))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn exam_results(
        &self,
        user_id: &str,
        exam_id: &str,
    ) -> Result<Vec<ExamResult>, AppError> {
        let mut url = self.endpoint(&["api", "examenes", exam_id, "resultados"])?;
        url.query_pairs_mut().append_pair("usuarioId", user_id);
        tracing::debug!("GET {}", url);

        let response = self.client.get(url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }

        let body: Envelope<Vec<ExamResult>> = envelope(response).await?;
        Ok(body.data.unwrap_or_default())
    }

    async fn validate_certificate(
        &self,
        user_id: &str,
        course_id: &str,
    ) -> Result<CertificateValidation, AppError> {
        let response = self
            .get(&["api", "progreso", "validacion", "usuario", user_id, "curso", course_id])
            .await?;

        // A rejected lookup is an answer ("not valid"), not an outage.
        if response.status().is_client_error() {
            let body = response
                .json::<Envelope<serde_json::Value>>()
                .await
                .ok()
                .and_then(|b| message_text(b.message));
            return Ok(CertificateValidation {
                valid: false,
                message: body.unwrap_or_else(|| "Certificate could not be validated".to_string()),
                enrolled_at: None,
            });
        }

        let body: Envelope<ValidationPayload> = envelope(response).await?;
        let payload = body.data.unwrap_or_default();
        let valid = body.success && payload.course_completed;
        let message = payload
            .message
            .or_else(|| message_text(body.message))
            .unwrap_or_else(|| {
                if valid {
                    "Certificate is valid".to_string()
                } else {
                    "Course not completed".to_string()
                }
            });

        Ok(CertificateValidation {
            valid,
            message,
            enrolled_at: payload.enrollment.and_then(|e| e.enrolled_at),
        })
    }
}
