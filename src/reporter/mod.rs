// src/reporter/mod.rs

//! Fire-and-forget persistence of playback progress and quiz attempts.
//!
//! Every method here logs a failed backend call and reports it as `false`.
//! Nothing is retried and nothing propagates: the learner's view of a
//! video or a score never depends on whether the backend accepted it.

pub mod tracker;

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::{
    backend::LmsBackend,
    models::{
        course::Lesson,
        exam::AttemptReport,
        progress::{VideoProgressRecord, VideoProgressTick},
    },
};

pub use tracker::{CoursePlayback, LessonTracker, PlaybackRegistry, TickDecision};

#[derive(Clone)]
pub struct Reporter {
    backend: Arc<dyn LmsBackend>,
}

impl Reporter {
    pub fn new(backend: Arc<dyn LmsBackend>) -> Self {
        Self { backend }
    }

    /// Persists playback position `second` of a lesson.
    pub async fn report_video_progress(
        &self,
        user_id: &str,
        course_id: &str,
        lesson_id: &str,
        second: u64,
        tick: &VideoProgressTick,
    ) -> bool {
        let record = VideoProgressRecord {
            user_id: user_id.to_string(),
            course_id: course_id.to_string(),
            lesson_id: lesson_id.to_string(),
            current_second: second,
            total_duration: tick.total_secs(),
        };

        match self.backend.save_video_progress(&record).await {
            Ok(()) => {
                tracing::debug!(
                    "Progress saved: lesson {} - {}s of {}s ({:.0}%)",
                    lesson_id,
                    second,
                    record.total_duration,
                    tick.percent
                );
                true
            }
            Err(e) => {
                tracing::error!("Failed to save video progress for lesson {}: {:?}", lesson_id, e);
                false
            }
        }
    }

    /// Marks a lesson watched by saving its full length as the position.
    /// `fallback_total` is used when the catalog has no duration.
    pub async fn report_lesson_complete(
        &self,
        user_id: &str,
        course_id: &str,
        lesson: &Lesson,
        fallback_total: u64,
    ) -> bool {
        let total = match lesson.duration_seconds() {
            0 => fallback_total,
            secs => secs,
        };
        let record = VideoProgressRecord {
            user_id: user_id.to_string(),
            course_id: course_id.to_string(),
            lesson_id: lesson.id.clone(),
            current_second: total,
            total_duration: total,
        };

        match self.backend.save_video_progress(&record).await {
            Ok(()) => {
                tracing::info!("Lesson completed: {} (ID: {})", lesson.title, lesson.id);
                true
            }
            Err(e) => {
                tracing::error!("Failed to mark lesson {} as completed: {:?}", lesson.id, e);
                false
            }
        }
    }

    pub async fn report_attempt(&self, report: &AttemptReport) -> bool {
        match self.backend.submit_attempt(report).await {
            Ok(()) => {
                tracing::info!(
                    "Exam attempt recorded: exam {} user {} score {}% passed {}",
                    report.exam_id,
                    report.user_id,
                    report.score_percent,
                    report.passed
                );
                true
            }
            Err(e) => {
                tracing::error!(
                    "Failed to record exam attempt for exam {}: {:?}",
                    report.exam_id,
                    e
                );
                false
            }
        }
    }

    /// Submits the attempt on a background task so the caller can answer
    /// the learner immediately.
    pub fn spawn_attempt(&self, report: AttemptReport) -> JoinHandle<bool> {
        let reporter = self.clone();
        tokio::spawn(async move { reporter.report_attempt(&report).await })
    }
}
