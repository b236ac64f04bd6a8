// src/quiz/builder.rs

//! Turns the backend's nested exam payload into a flat [`ExamDefinition`]
//! and produces the randomized question order shown to a learner.

use rand::Rng;

use crate::{
    config::DEFAULT_MIN_SCORE_PERCENT,
    models::{
        exam::{ExamDefinition, ExamPayload},
        question::{Choice, Question, QuestionKind, RawQuestion},
    },
};

/// Which parts of an exam are randomized per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShuffleOptions {
    pub questions: bool,
    pub choices: bool,
}

impl Default for ShuffleOptions {
    fn default() -> Self {
        Self {
            questions: true,
            choices: true,
        }
    }
}

impl ShuffleOptions {
    pub fn none() -> Self {
        Self {
            questions: false,
            choices: false,
        }
    }
}

/// Flattens pages (then any top-level `preguntas`) into one ordered
/// sequence and normalizes every element. No schema validation happens
/// here; odd fields pass through as best they can.
pub fn build_definition(payload: ExamPayload) -> ExamDefinition {
    let ExamPayload {
        id,
        title,
        description,
        pages,
        preguntas,
        min_score,
        max_attempts,
        duration_minutes,
    } = payload;

    let questions: Vec<Question> = pages
        .into_iter()
        .flat_map(|page| page.elements)
        .chain(preguntas)
        .enumerate()
        .map(|(position, raw)| normalize_question(raw, position))
        .collect();

    // Scores are whole percents, so a fractional threshold rounds up.
    let min_score_percent = min_score
        .filter(|s| s.is_finite() && *s >= 0.0)
        .map(|s| s.ceil() as u32)
        .unwrap_or(DEFAULT_MIN_SCORE_PERCENT);

    let positive = |v: Option<f64>| v.filter(|v| v.is_finite() && *v > 0.0).map(|v| v as u32);

    tracing::debug!(
        "Built exam '{}' with {} questions (min score {}%)",
        id,
        questions.len(),
        min_score_percent
    );

    ExamDefinition::new(
        id,
        title.unwrap_or_default(),
        description.unwrap_or_default(),
        min_score_percent,
        questions,
    )
    .with_limits(positive(max_attempts), positive(duration_minutes))
}

fn normalize_question(raw: RawQuestion, position: usize) -> Question {
    let choices: Vec<Choice> = raw
        .choices
        .unwrap_or_default()
        .into_iter()
        .map(Choice::from)
        .collect();

    let kind = QuestionKind::from_raw(raw.question_type.as_deref().unwrap_or(""), !choices.is_empty());

    // Elements without a name still need a stable key for the answers map.
    let id = raw
        .name
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| format!("question{}", position + 1));

    Question {
        id,
        kind,
        prompt: raw.title.unwrap_or_default(),
        help_text: raw.description.filter(|d| !d.is_empty()),
        required: raw.required.unwrap_or(false),
        choices,
        correct_answer: raw.correct_answer,
    }
}

/// Fisher–Yates over a copy of `items`. The input is left untouched and
/// every call draws fresh randomness from `rng`.
pub fn shuffle<T: Clone, R: Rng>(items: &[T], rng: &mut R) -> Vec<T> {
    let mut out = items.to_vec();
    for i in (1..out.len()).rev() {
        let j = rng.random_range(0..=i);
        out.swap(i, j);
    }
    out
}

/// The per-session presentation order: questions shuffled once, then each
/// single-choice question's options shuffled independently.
pub fn presentation_order<R: Rng>(
    definition: &ExamDefinition,
    options: ShuffleOptions,
    rng: &mut R,
) -> Vec<Question> {
    let mut order = if options.questions {
        shuffle(&definition.questions, rng)
    } else {
        definition.questions.clone()
    };

    if options.choices {
        for question in order
            .iter_mut()
            .filter(|q| q.kind == QuestionKind::SingleChoice)
        {
            question.choices = shuffle(&question.choices, rng);
        }
    }

    order
}
