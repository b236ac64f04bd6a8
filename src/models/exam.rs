// src/models/exam.rs

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{lenient, question::{Question, RawQuestion}};

/// Exam as returned by `GET /api/examenes/curso/{courseId}`.
///
/// Questions arrive either grouped in `pages` or as a flat `preguntas` list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExamPayload {
    #[serde(default, deserialize_with = "lenient::id")]
    pub id: String,

    #[serde(default, alias = "titulo", deserialize_with = "lenient::text")]
    pub title: Option<String>,

    #[serde(default, alias = "descripcion", deserialize_with = "lenient::text")]
    pub description: Option<String>,

    #[serde(default, deserialize_with = "lenient::list")]
    pub pages: Vec<RawPage>,

    #[serde(default, deserialize_with = "lenient::list")]
    pub preguntas: Vec<RawQuestion>,

    /// Pass threshold in percent, sometimes sent as a numeric string.
    #[serde(
        default,
        rename = "minScore",
        alias = "puntajeMinimoAprobacion",
        deserialize_with = "lenient::number"
    )]
    pub min_score: Option<f64>,

    #[serde(
        default,
        rename = "maxAttempts",
        alias = "intentosMaximos",
        deserialize_with = "lenient::number"
    )]
    pub max_attempts: Option<f64>,

    #[serde(
        default,
        rename = "durationMinutes",
        alias = "duracionMinutos",
        deserialize_with = "lenient::number"
    )]
    pub duration_minutes: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPage {
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub elements: Vec<RawQuestion>,
}

/// Immutable, flattened exam. `questions` keeps the canonical order.
#[derive(Debug, Clone)]
pub struct ExamDefinition {
    pub id: String,
    pub title: String,
    pub description: String,
    pub min_score_percent: u32,
    pub max_attempts: Option<u32>,
    /// Advisory only. No timer enforces it.
    pub duration_minutes: Option<u32>,
    pub questions: Vec<Question>,
    index: HashMap<String, usize>,
}

impl ExamDefinition {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        min_score_percent: u32,
        questions: Vec<Question>,
    ) -> Self {
        let mut index = HashMap::with_capacity(questions.len());
        for (i, q) in questions.iter().enumerate() {
            index.entry(q.id.clone()).or_insert(i);
        }

        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            min_score_percent,
            max_attempts: None,
            duration_minutes: None,
            questions,
            index,
        }
    }

    pub fn with_limits(mut self, max_attempts: Option<u32>, duration_minutes: Option<u32>) -> Self {
        self.max_attempts = max_attempts;
        self.duration_minutes = duration_minutes;
        self
    }

    pub fn question(&self, id: &str) -> Option<&Question> {
        self.index.get(id).and_then(|&i| self.questions.get(i))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

/// Output of a completed quiz session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttemptReport {
    pub user_id: String,
    pub exam_id: String,
    pub answers: HashMap<String, String>,
    pub score_percent: u32,
    pub passed: bool,
}

/// Body of `POST /api/examenes/{examId}/responder`.
#[derive(Debug, Serialize)]
pub struct AttemptSubmission {
    #[serde(rename = "usuarioId")]
    pub user_id: String,
    #[serde(rename = "puntaje")]
    pub score: u32,
    #[serde(rename = "aprobado")]
    pub passed: bool,
    #[serde(rename = "completado")]
    pub completed: bool,
    #[serde(rename = "respuestas")]
    pub answers: Vec<SubmittedAnswer>,
}

#[derive(Debug, Serialize)]
pub struct SubmittedAnswer {
    #[serde(rename = "preguntaId")]
    pub question_id: String,
    #[serde(rename = "respuesta")]
    pub answer: String,
}

impl From<&AttemptReport> for AttemptSubmission {
    fn from(report: &AttemptReport) -> Self {
        let mut answers: Vec<SubmittedAnswer> = report
            .answers
            .iter()
            .map(|(q, a)| SubmittedAnswer {
                question_id: q.clone(),
                answer: a.clone(),
            })
            .collect();
        answers.sort_by(|a, b| a.question_id.cmp(&b.question_id));

        Self {
            user_id: report.user_id.clone(),
            score: report.score_percent,
            passed: report.passed,
            completed: true,
            answers,
        }
    }
}

/// One persisted attempt from `GET /api/examenes/{examId}/resultados`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExamResult {
    #[serde(
        default,
        rename = "numero_intento",
        alias = "numeroIntento",
        deserialize_with = "lenient::number"
    )]
    pub attempt_number: Option<f64>,

    #[serde(default, rename = "puntaje", deserialize_with = "lenient::number")]
    pub score: Option<f64>,

    #[serde(default, rename = "aprobado", deserialize_with = "lenient::flag")]
    pub passed: bool,

    #[serde(default, rename = "completado", deserialize_with = "lenient::flag")]
    pub completed: bool,

    #[serde(
        default,
        rename = "fecha_inicio",
        alias = "fechaInicio",
        deserialize_with = "lenient::text"
    )]
    pub started_at: Option<String>,

    #[serde(
        default,
        rename = "fecha_fin",
        alias = "fechaFin",
        deserialize_with = "lenient::text"
    )]
    pub finished_at: Option<String>,

    #[serde(default, rename = "fechaAprobacion", deserialize_with = "lenient::text")]
    pub approved_at: Option<String>,
}

impl ExamResult {
    /// Stored score as a whole percent in `0..=100`.
    pub fn score_percent(&self) -> u32 {
        self.score
            .filter(|s| s.is_finite())
            .map(|s| s.round().clamp(0.0, 100.0) as u32)
            .unwrap_or(0)
    }

    /// UTC day the attempt was approved or finished, when the backend sent
    /// an RFC 3339 timestamp or a `YYYY-MM-DD`-prefixed date.
    pub fn finished_on(&self) -> Option<NaiveDate> {
        let raw = self
            .approved_at
            .as_deref()
            .or(self.finished_at.as_deref())?
            .trim();
        DateTime::parse_from_rfc3339(raw)
            .map(|d| d.with_timezone(&Utc).date_naive())
            .ok()
            .or_else(|| NaiveDate::parse_from_str(raw.get(..10)?, "%Y-%m-%d").ok())
    }
}

/// The passed attempt a certificate is issued from: highest score, then the
/// earliest attempt among equal scores.
pub fn best_passed(results: &[ExamResult]) -> Option<&ExamResult> {
    results
        .iter()
        .filter(|r| r.passed)
        .min_by(|a, b| {
            b.score_percent()
                .cmp(&a.score_percent())
                .then_with(|| a.finished_on().cmp(&b.finished_on()))
        })
}
