// src/lessons.rs

use std::collections::{HashMap, HashSet};

use crate::models::course::{Course, CourseProgress, Lesson};

/// Flat, id-indexed view of a course's lessons plus the learner's
/// completion state.
#[derive(Debug, Clone, Default)]
pub struct LessonPlan {
    lessons: Vec<Lesson>,
    module_titles: Vec<String>,
    lesson_module: Vec<usize>,
    index: HashMap<String, usize>,
    completed: HashSet<String>,
}

impl LessonPlan {
    pub fn new(course: &Course, progress: Option<&CourseProgress>) -> Self {
        let mut plan = Self::default();

        for (module_idx, module) in course.modules.iter().enumerate() {
            plan.module_titles.push(module.title.clone());
            for lesson in &module.lessons {
                plan.index.entry(lesson.id.clone()).or_insert(plan.lessons.len());
                plan.lessons.push(lesson.clone());
                plan.lesson_module.push(module_idx);
            }
        }

        if let Some(progress) = progress {
            for id in progress.completed_lesson_ids() {
                plan.mark_completed(id);
            }
        }

        plan
    }

    pub fn lessons(&self) -> &[Lesson] {
        &self.lessons
    }

    pub fn len(&self) -> usize {
        self.lessons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lessons.is_empty()
    }

    pub fn index_of(&self, lesson_id: &str) -> Option<usize> {
        self.index.get(lesson_id).copied()
    }

    pub fn lesson(&self, lesson_id: &str) -> Option<&Lesson> {
        self.index_of(lesson_id).and_then(|i| self.lessons.get(i))
    }

    pub fn module_title_of(&self, lesson_id: &str) -> Option<&str> {
        let i = self.index_of(lesson_id)?;
        self.lesson_module
            .get(i)
            .and_then(|&m| self.module_titles.get(m))
            .map(String::as_str)
    }

    pub fn is_completed(&self, lesson_id: &str) -> bool {
        self.completed.contains(lesson_id)
    }

    /// Marks a lesson of this course as watched. Returns `true` the first
    /// time; unknown ids are ignored.
    pub fn mark_completed(&mut self, lesson_id: &str) -> bool {
        if !self.index.contains_key(lesson_id) {
            return false;
        }
        self.completed.insert(lesson_id.to_string())
    }

    pub fn completed_ids(&self) -> Vec<String> {
        self.lessons
            .iter()
            .filter(|l| self.completed.contains(&l.id))
            .map(|l| l.id.clone())
            .collect()
    }

    pub fn completed_count(&self) -> usize {
        self.completed.len()
    }

    /// Where playback resumes: the first lesson not yet completed, or the
    /// first lesson when everything has been watched.
    pub fn resume_index(&self) -> usize {
        self.lessons
            .iter()
            .position(|l| !self.completed.contains(&l.id))
            .unwrap_or(0)
    }

    pub fn progress_percent(&self) -> f64 {
        if self.lessons.is_empty() {
            return 0.0;
        }
        self.completed.len() as f64 / self.lessons.len() as f64 * 100.0
    }

    /// The quiz unlocks once every lesson has been watched.
    pub fn all_completed(&self) -> bool {
        self.lessons.iter().all(|l| self.completed.contains(&l.id))
    }

    pub fn next_index(&self, current: usize) -> Option<usize> {
        (current + 1 < self.lessons.len()).then_some(current + 1)
    }

    pub fn previous_index(&self, current: usize) -> Option<usize> {
        current.checked_sub(1).filter(|i| *i < self.lessons.len())
    }
}
