// src/models/progress.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

/// One playback sample emitted by the video player.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VideoProgressTick {
    pub current_seconds: f64,
    pub total_seconds: f64,
    pub percent: f64,
}

impl VideoProgressTick {
    pub fn new(current_seconds: f64, total_seconds: f64) -> Self {
        let percent = if total_seconds > 0.0 {
            current_seconds / total_seconds * 100.0
        } else {
            0.0
        };

        Self {
            current_seconds,
            total_seconds,
            percent,
        }
    }

    /// Whole seconds played so far.
    pub fn elapsed_secs(&self) -> u64 {
        if self.current_seconds.is_finite() && self.current_seconds > 0.0 {
            self.current_seconds.floor() as u64
        } else {
            0
        }
    }

    pub fn total_secs(&self) -> u64 {
        if self.total_seconds.is_finite() && self.total_seconds > 0.0 {
            self.total_seconds.floor() as u64
        } else {
            0
        }
    }
}

/// DTO for a playback sample posted by the page.
#[derive(Debug, Deserialize, Validate)]
pub struct ProgressTickRequest {
    #[validate(range(min = 0.0))]
    pub current_seconds: f64,
    #[validate(range(min = 0.0))]
    pub total_seconds: f64,
}

/// Body of `PUT /api/progreso/video`. The backend upserts by
/// (user, course, lesson) and derives completion itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoProgressRecord {
    #[serde(rename = "usuarioId")]
    pub user_id: String,
    #[serde(rename = "cursoId")]
    pub course_id: String,
    #[serde(rename = "leccionId")]
    pub lesson_id: String,
    #[serde(rename = "segundoActual")]
    pub current_second: u64,
    #[serde(rename = "duracionTotal")]
    pub total_duration: u64,
}
