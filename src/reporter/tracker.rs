// src/reporter/tracker.rs

use std::{collections::HashMap, sync::Arc};

use tokio::sync::Mutex;

use crate::{
    config::{LESSON_COMPLETE_PERCENT, PROGRESS_SAVE_INTERVAL_SECS},
    error::AppError,
    lessons::LessonPlan,
    models::progress::VideoProgressTick,
};

/// What to send to the backend for one playback sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickDecision {
    /// Persist progress at this whole second.
    pub save_at: Option<u64>,
    /// The lesson just crossed the completion threshold.
    pub complete: bool,
}

/// Throttle state for the lesson currently playing.
#[derive(Debug, Clone)]
pub struct LessonTracker {
    lesson_id: Option<String>,
    last_saved_sec: u64,
    last_total_sec: u64,
    completed: bool,
    interval_secs: u64,
}

impl Default for LessonTracker {
    fn default() -> Self {
        Self::new(PROGRESS_SAVE_INTERVAL_SECS)
    }
}

impl LessonTracker {
    pub fn new(interval_secs: u64) -> Self {
        Self {
            lesson_id: None,
            last_saved_sec: 0,
            last_total_sec: 0,
            completed: false,
            interval_secs,
        }
    }

    pub fn lesson_id(&self) -> Option<&str> {
        self.lesson_id.as_deref()
    }

    /// Makes `lesson_id` the active lesson. Switching resets the throttle
    /// so the first save of the new lesson is not suppressed.
    pub fn switch_to(&mut self, lesson_id: &str) {
        if self.lesson_id.as_deref() == Some(lesson_id) {
            return;
        }
        self.lesson_id = Some(lesson_id.to_string());
        self.last_saved_sec = 0;
        self.last_total_sec = 0;
        self.completed = false;
    }

    /// Saves at most once per `interval_secs` of playback, measured from
    /// the last saved second. Seeking backwards never triggers a save.
    pub fn observe(&mut self, tick: &VideoProgressTick) -> TickDecision {
        let mut decision = TickDecision::default();
        let sec = tick.elapsed_secs();
        if tick.total_secs() > 0 {
            self.last_total_sec = tick.total_secs();
        }

        if sec > 0 && sec.saturating_sub(self.last_saved_sec) >= self.interval_secs && sec > self.last_saved_sec {
            self.last_saved_sec = sec;
            decision.save_at = Some(sec);
        }

        if !self.completed && tick.percent >= LESSON_COMPLETE_PERCENT {
            self.completed = true;
            decision.complete = true;
        }

        decision
    }

    /// End of stream. Completion is reported again even if the threshold
    /// already fired; the backend upsert makes that harmless.
    pub fn ended(&mut self) {
        self.completed = true;
    }

    pub fn last_total_sec(&self) -> u64 {
        self.last_total_sec
    }
}

/// Playback state of one learner in one course.
#[derive(Debug, Clone, Default)]
pub struct CoursePlayback {
    pub plan: LessonPlan,
    pub tracker: LessonTracker,
}

/// Playback state keyed by (user, course).
#[derive(Clone, Default)]
pub struct PlaybackRegistry {
    inner: Arc<Mutex<HashMap<(String, String), CoursePlayback>>>,
}

impl PlaybackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the state for a freshly loaded course page.
    pub async fn reset(&self, user_id: &str, course_id: &str, plan: LessonPlan) {
        let mut map = self.inner.lock().await;
        map.insert(
            (user_id.to_string(), course_id.to_string()),
            CoursePlayback {
                plan,
                tracker: LessonTracker::default(),
            },
        );
    }

    pub async fn contains(&self, user_id: &str, course_id: &str) -> bool {
        let map = self.inner.lock().await;
        map.contains_key(&(user_id.to_string(), course_id.to_string()))
    }

    pub async fn with_playback<T, F>(&self, user_id: &str, course_id: &str, f: F) -> Result<T, AppError>
    where
        F: FnOnce(&mut CoursePlayback) -> Result<T, AppError>,
    {
        let mut map = self.inner.lock().await;
        match map.get_mut(&(user_id.to_string(), course_id.to_string())) {
            Some(playback) => f(playback),
            None => Err(AppError::NotFound("Course is not open".to_string())),
        }
    }
}
