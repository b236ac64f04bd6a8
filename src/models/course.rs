// src/models/course.rs

use serde::{Deserialize, Serialize};

use super::lenient;

/// Course detail from `GET /api/cursos/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Course {
    #[serde(default, deserialize_with = "lenient::id")]
    pub id: String,

    #[serde(default, alias = "titulo", deserialize_with = "lenient::id")]
    pub title: String,

    #[serde(default, alias = "descripcion", deserialize_with = "lenient::text")]
    pub description: Option<String>,

    #[serde(default, alias = "modulos", deserialize_with = "lenient::list")]
    pub modules: Vec<Module>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Module {
    #[serde(default, alias = "modulo_titulo", deserialize_with = "lenient::id")]
    pub title: String,

    #[serde(default, alias = "descripcion", deserialize_with = "lenient::text")]
    pub description: Option<String>,

    #[serde(default, alias = "lecciones", deserialize_with = "lenient::list")]
    pub lessons: Vec<Lesson>,
}

/// One video unit within a module.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    #[serde(default, deserialize_with = "lenient::id")]
    pub id: String,

    #[serde(default, alias = "titulo", deserialize_with = "lenient::id")]
    pub title: String,

    #[serde(default, alias = "descripcion", deserialize_with = "lenient::text")]
    pub description: Option<String>,

    #[serde(default, alias = "url_video", deserialize_with = "lenient::text")]
    pub video_url: Option<String>,

    #[serde(default, alias = "duracion_minutos", deserialize_with = "lenient::number")]
    pub duration_minutes: Option<f64>,

    /// Mapped from 'tipo'/'type' since `type` is a reserved keyword in Rust.
    #[serde(default, rename = "type", alias = "tipo")]
    pub lesson_type: Option<String>,
}

impl Lesson {
    /// Nominal length in whole seconds, 0 when the backend gave no duration.
    pub fn duration_seconds(&self) -> u64 {
        self.duration_minutes
            .filter(|m| m.is_finite() && *m > 0.0)
            .map(|m| (m * 60.0).floor() as u64)
            .unwrap_or(0)
    }
}

/// Learner progress for one course from
/// `GET /api/progreso/usuario/{userId}/curso/{courseId}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CourseProgress {
    #[serde(default, rename = "inscripcion")]
    pub enrollment: Option<Enrollment>,

    #[serde(default, rename = "progresosVideos", deserialize_with = "lenient::list")]
    pub videos: Vec<LessonProgress>,
}

impl CourseProgress {
    pub fn completed_lesson_ids(&self) -> impl Iterator<Item = &str> {
        self.videos
            .iter()
            .filter(|v| v.completed)
            .map(|v| v.lesson_id.as_str())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Enrollment {
    #[serde(default, deserialize_with = "lenient::id")]
    pub id: String,

    #[serde(default, rename = "fechaInscripcion")]
    pub enrolled_at: Option<String>,

    #[serde(default, rename = "progresoPorcentaje", deserialize_with = "lenient::number")]
    pub progress_percent: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LessonProgress {
    #[serde(default, rename = "leccionId", deserialize_with = "lenient::id")]
    pub lesson_id: String,

    #[serde(default, rename = "segundoActual", deserialize_with = "lenient::number")]
    pub current_second: Option<f64>,

    #[serde(default, rename = "duracionTotal", deserialize_with = "lenient::number")]
    pub total_duration: Option<f64>,

    #[serde(default, rename = "completado", deserialize_with = "lenient::flag")]
    pub completed: bool,
}
