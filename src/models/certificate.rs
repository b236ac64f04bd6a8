// src/models/certificate.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{course::Enrollment, lenient};

/// Data handed to the certificate renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CertificateData {
    pub recipient_name: String,
    pub course_title: String,
    pub completion_date: NaiveDate,
    pub score: u32,
    pub verification_url: String,
}

/// Raw body of `GET /api/progreso/validacion/usuario/{u}/curso/{c}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ValidationPayload {
    #[serde(rename = "cursoCompleto", default, deserialize_with = "lenient::flag")]
    pub course_completed: bool,

    #[serde(default, deserialize_with = "lenient::text")]
    pub message: Option<String>,

    #[serde(rename = "inscripcion", default)]
    pub enrollment: Option<Enrollment>,
}

/// Public answer of the verification endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CertificateValidation {
    pub valid: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enrolled_at: Option<String>,
}
