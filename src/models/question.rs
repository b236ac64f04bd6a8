// src/models/question.rs

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::lenient;

/// A selectable option. `value` and `label` coincide for plain-string choices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub value: String,
    pub label: String,
}

impl Choice {
    pub fn plain(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            value: text.clone(),
            label: text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    SingleChoice,
    FreeText,
}

impl QuestionKind {
    /// Maps the backend's element type. Unknown types are single-choice
    /// when they carry options, free-text otherwise.
    pub fn from_raw(raw: &str, has_choices: bool) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "radiogroup" | "single" | "dropdown" => QuestionKind::SingleChoice,
            "comment" | "text" => QuestionKind::FreeText,
            _ if has_choices => QuestionKind::SingleChoice,
            _ => QuestionKind::FreeText,
        }
    }
}

/// One evaluable unit of an exam, normalized at ingestion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Question {
    /// Stable key, unique within an exam. Answers are keyed by it.
    pub id: String,
    pub kind: QuestionKind,
    pub prompt: String,
    pub help_text: Option<String>,
    pub required: bool,
    pub choices: Vec<Choice>,
    pub correct_answer: Option<String>,
}

impl Question {
    /// Only questions with an answer key count towards the score.
    pub fn is_scored(&self) -> bool {
        self.correct_answer.is_some()
    }

    /// Whether `submitted` is the correct answer.
    ///
    /// The answer key may name a choice by its value or by its label, and
    /// learners may submit either form, so both are accepted for the
    /// choice the key identifies.
    pub fn accepts(&self, submitted: &str) -> bool {
        let Some(key) = self.correct_answer.as_deref() else {
            return false;
        };
        if submitted == key {
            return true;
        }

        self.choices
            .iter()
            .find(|c| c.value == key)
            .or_else(|| self.choices.iter().find(|c| c.label == key))
            .is_some_and(|c| c.value == submitted || c.label == submitted)
    }
}

/// Question-like element as the backend sends it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawQuestion {
    #[serde(default, alias = "nombre", deserialize_with = "lenient::text")]
    pub name: Option<String>,

    #[serde(default, alias = "titulo", deserialize_with = "lenient::text")]
    pub title: Option<String>,

    #[serde(default, alias = "descripcion", deserialize_with = "lenient::text")]
    pub description: Option<String>,

    /// Mapped from 'type' since `type` is a reserved keyword in Rust.
    #[serde(default, rename = "type", alias = "tipo")]
    pub question_type: Option<String>,

    #[serde(
        default,
        rename = "isRequired",
        alias = "es_requerida",
        alias = "requerida",
        deserialize_with = "lenient::optional_flag"
    )]
    pub required: Option<bool>,

    #[serde(default, alias = "opciones")]
    pub choices: Option<Vec<RawChoice>>,

    #[serde(
        default,
        rename = "correctAnswer",
        alias = "respuesta_correcta",
        deserialize_with = "lenient::text"
    )]
    pub correct_answer: Option<String>,
}

/// The loose choice shapes seen in exam payloads.
///
/// Any JSON object is a `Pair`. Either side may be missing or non-string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawChoice {
    Plain(String),
    Pair {
        #[serde(default, alias = "valor", deserialize_with = "lenient::text")]
        value: Option<String>,
        #[serde(
            default,
            alias = "texto",
            alias = "label",
            deserialize_with = "lenient::text"
        )]
        text: Option<String>,
    },
    Other(Value),
}

impl From<RawChoice> for Choice {
    fn from(raw: RawChoice) -> Self {
        match raw {
            RawChoice::Plain(text) => Choice::plain(text),
            RawChoice::Pair { value, text } => {
                let value = value.filter(|v| !v.is_empty());
                let text = text.filter(|t| !t.is_empty());
                match (value, text) {
                    (Some(value), Some(label)) => Choice { value, label },
                    (Some(one), None) | (None, Some(one)) => Choice::plain(one),
                    (None, None) => Choice::plain(""),
                }
            }
            RawChoice::Other(v) => Choice::plain(lenient::value_text(&v).unwrap_or_default()),
        }
    }
}

/// DTO for sending a question to the learner (excludes the answer key).
#[derive(Debug, Clone, Serialize)]
pub struct PublicQuestion {
    pub id: String,
    pub kind: QuestionKind,
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
    pub required: bool,
    pub choices: Vec<Choice>,
}

impl From<&Question> for PublicQuestion {
    fn from(q: &Question) -> Self {
        Self {
            id: q.id.clone(),
            kind: q.kind,
            prompt: q.prompt.clone(),
            help_text: q.help_text.clone(),
            required: q.required,
            choices: q.choices.clone(),
        }
    }
}
