// src/quiz/session.rs

use std::{collections::HashMap, fmt, sync::Arc};

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;

use super::builder::{ShuffleOptions, presentation_order};
use crate::models::{
    exam::{AttemptReport, ExamDefinition},
    question::Question,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Welcome,
    InProgress,
    Completed,
}

/// Misuse of a session: a transition requested in the wrong phase.
/// None of these change the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    NotStarted,
    AlreadyCompleted,
    UnknownQuestion(String),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::NotStarted => write!(f, "Quiz has not been started"),
            SessionError::AlreadyCompleted => write!(f, "Quiz is already completed"),
            SessionError::UnknownQuestion(id) => write!(f, "Unknown question '{}'", id),
        }
    }
}

impl std::error::Error for SessionError {}

/// Final result of an attempt, fixed once the session completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub score: u32,
    pub passed: bool,
    pub correct: usize,
    pub scored: usize,
    pub completed_at: DateTime<Utc>,
}

/// What a call to [`QuizSession::next`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Current question is required and unanswered; nothing changed.
    Blocked,
    /// Moved to the given index.
    Moved(usize),
    /// Left the last question and fixed the outcome.
    Completed(Outcome),
}

/// Helper function to calculate score.
/// Returns (correct_count, scored_count, score_percentage).
///
/// Only questions with an answer key take part. The percentage is rounded
/// half up, and an exam with nothing to score yields 0.
pub fn calculate_score(
    questions: &[Question],
    answers: &HashMap<String, String>,
) -> (usize, usize, u32) {
    let mut correct = 0;
    let mut total = 0;

    for question in questions.iter().filter(|q| q.is_scored()) {
        total += 1;
        if answers
            .get(&question.id)
            .is_some_and(|submitted| question.accepts(submitted))
        {
            correct += 1;
        }
    }

    if total == 0 {
        return (0, 0, 0);
    }

    let score = (correct * 100 + total / 2) / total;
    (correct, total, score as u32)
}

pub fn is_passing(score: u32, min_score_percent: u32) -> bool {
    score >= min_score_percent
}

/// One learner attempt at an exam, kept in memory only.
///
/// The presentation order is drawn once at construction. A retake is a new
/// session built from the canonical definition, never a reset of this one.
#[derive(Debug, Clone)]
pub struct QuizSession {
    definition: Arc<ExamDefinition>,
    options: ShuffleOptions,
    order: Vec<Question>,
    current_index: usize,
    answers: HashMap<String, String>,
    phase: Phase,
    outcome: Option<Outcome>,
    reported: bool,
}

impl QuizSession {
    pub fn new(definition: Arc<ExamDefinition>, options: ShuffleOptions) -> Self {
        Self::with_rng(definition, options, &mut rand::rng())
    }

    pub fn with_rng<R: Rng>(
        definition: Arc<ExamDefinition>,
        options: ShuffleOptions,
        rng: &mut R,
    ) -> Self {
        let order = presentation_order(&definition, options, rng);
        let mut session = Self {
            definition,
            options,
            order,
            current_index: 0,
            answers: HashMap::new(),
            phase: Phase::Welcome,
            outcome: None,
            reported: false,
        };

        // Nothing to ask: the attempt is over before it starts.
        if session.order.is_empty() {
            session.complete();
        }
        session
    }

    /// A fresh attempt at the same canonical exam with a new shuffle.
    pub fn retake(&self) -> Self {
        Self::new(Arc::clone(&self.definition), self.options)
    }

    pub fn start(&mut self) -> Result<(), SessionError> {
        match self.phase {
            Phase::Welcome => {
                self.phase = Phase::InProgress;
                self.current_index = 0;
                Ok(())
            }
            Phase::InProgress => Ok(()),
            Phase::Completed => Err(SessionError::AlreadyCompleted),
        }
    }

    /// Records (or replaces) the answer for `question_id`. Does not move.
    pub fn answer(
        &mut self,
        question_id: &str,
        value: impl Into<String>,
    ) -> Result<(), SessionError> {
        self.ensure_in_progress()?;
        if !self.definition.contains(question_id) {
            return Err(SessionError::UnknownQuestion(question_id.to_string()));
        }

        self.answers.insert(question_id.to_string(), value.into());
        Ok(())
    }

    /// A required question needs a non-empty answer before moving on.
    pub fn can_proceed(&self) -> bool {
        if self.phase != Phase::InProgress {
            return false;
        }
        let Some(question) = self.current_question() else {
            return false;
        };
        !question.required || self.answer_for(&question.id).is_some_and(|a| !a.is_empty())
    }

    pub fn next(&mut self) -> Result<Advance, SessionError> {
        self.ensure_in_progress()?;
        if !self.can_proceed() {
            return Ok(Advance::Blocked);
        }

        if self.current_index + 1 < self.order.len() {
            self.current_index += 1;
            Ok(Advance::Moved(self.current_index))
        } else {
            Ok(Advance::Completed(self.complete()))
        }
    }

    /// Steps back one question. Returns whether the index moved.
    pub fn previous(&mut self) -> Result<bool, SessionError> {
        self.ensure_in_progress()?;
        if self.current_index == 0 {
            return Ok(false);
        }
        self.current_index -= 1;
        Ok(true)
    }

    /// Hands out the attempt report of a completed session, once.
    pub fn take_report(&mut self, user_id: &str) -> Option<AttemptReport> {
        if self.reported {
            return None;
        }
        let outcome = self.outcome?;
        self.reported = true;

        Some(AttemptReport {
            user_id: user_id.to_string(),
            exam_id: self.definition.id.clone(),
            answers: self.answers.clone(),
            score_percent: outcome.score,
            passed: outcome.passed,
        })
    }

    pub fn definition(&self) -> &Arc<ExamDefinition> {
        &self.definition
    }

    pub fn options(&self) -> ShuffleOptions {
        self.options
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn order(&self) -> &[Question] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.order.get(self.current_index)
    }

    pub fn answers(&self) -> &HashMap<String, String> {
        &self.answers
    }

    pub fn answer_for(&self, question_id: &str) -> Option<&str> {
        self.answers.get(question_id).map(String::as_str)
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    fn ensure_in_progress(&self) -> Result<(), SessionError> {
        match self.phase {
            Phase::Welcome => Err(SessionError::NotStarted),
            Phase::InProgress => Ok(()),
            Phase::Completed => Err(SessionError::AlreadyCompleted),
        }
    }

    fn complete(&mut self) -> Outcome {
        let (correct, scored, score) = calculate_score(&self.definition.questions, &self.answers);
        let outcome = Outcome {
            score,
            passed: is_passing(score, self.definition.min_score_percent),
            correct,
            scored,
            completed_at: Utc::now(),
        };

        self.phase = Phase::Completed;
        self.outcome = Some(outcome);
        outcome
    }
}
