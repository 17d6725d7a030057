use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::model::ids::QuestionId;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question prompt cannot be empty")]
    EmptyPrompt,

    #[error("multiple-choice question needs at least two choices, got {count}")]
    TooFewChoices { count: usize },

    #[error("correct choice {index} is out of range for {count} choices")]
    CorrectOutOfRange { index: usize, count: usize },
}

//
// ─── QUESTION ─────────────────────────────────────────────────────────────────
//

/// What kind of response a gate question expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionKind {
    MultipleChoice,
    /// Free text about what the passage stirred in the reader.
    Reflection,
    /// Free text about putting the passage into practice.
    Application,
}

impl QuestionKind {
    #[must_use]
    pub fn is_free_text(self) -> bool {
        matches!(self, Self::Reflection | Self::Application)
    }
}

/// A single gate question. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    id: QuestionId,
    kind: QuestionKind,
    prompt: String,
    choices: Vec<String>,
    correct: Option<usize>,
}

impl Question {
    /// Build a multiple-choice question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the prompt is blank, fewer than two choices are
    /// given, or `correct` does not index into `choices`.
    pub fn multiple_choice(
        id: QuestionId,
        prompt: impl Into<String>,
        choices: Vec<String>,
        correct: usize,
    ) -> Result<Self, QuestionError> {
        let prompt = normalize_prompt(prompt.into())?;
        if choices.len() < 2 {
            return Err(QuestionError::TooFewChoices {
                count: choices.len(),
            });
        }
        if correct >= choices.len() {
            return Err(QuestionError::CorrectOutOfRange {
                index: correct,
                count: choices.len(),
            });
        }
        Ok(Self {
            id,
            kind: QuestionKind::MultipleChoice,
            prompt,
            choices,
            correct: Some(correct),
        })
    }

    /// Build a reflection question (free text).
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::EmptyPrompt` if the prompt is blank.
    pub fn reflection(id: QuestionId, prompt: impl Into<String>) -> Result<Self, QuestionError> {
        Self::free_text(id, QuestionKind::Reflection, prompt.into())
    }

    /// Build an application question (free text).
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::EmptyPrompt` if the prompt is blank.
    pub fn application(id: QuestionId, prompt: impl Into<String>) -> Result<Self, QuestionError> {
        Self::free_text(id, QuestionKind::Application, prompt.into())
    }

    fn free_text(id: QuestionId, kind: QuestionKind, prompt: String) -> Result<Self, QuestionError> {
        Ok(Self {
            id,
            kind,
            prompt: normalize_prompt(prompt)?,
            choices: Vec::new(),
            correct: None,
        })
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn kind(&self) -> QuestionKind {
        self.kind
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn choices(&self) -> &[String] {
        &self.choices
    }

    #[must_use]
    pub fn correct(&self) -> Option<usize> {
        self.correct
    }
}

fn normalize_prompt(prompt: String) -> Result<String, QuestionError> {
    let trimmed = prompt.trim();
    if trimmed.is_empty() {
        return Err(QuestionError::EmptyPrompt);
    }
    Ok(trimmed.to_owned())
}

//
// ─── ANSWERS ──────────────────────────────────────────────────────────────────
//

/// A user's response to one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Answer {
    Choice(usize),
    Text(String),
}

impl Answer {
    /// True when the answer carries nothing the user actually entered.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Answer::Choice(_) => false,
            Answer::Text(text) => text.trim().is_empty(),
        }
    }
}

/// Answers collected during a gate session, keyed by question.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSet {
    answers: HashMap<QuestionId, Answer>,
}

impl AnswerSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record or replace the answer for a question.
    pub fn set(&mut self, question: QuestionId, answer: Answer) {
        self.answers.insert(question, answer);
    }

    pub fn clear(&mut self, question: QuestionId) {
        self.answers.remove(&question);
    }

    #[must_use]
    pub fn get(&self, question: QuestionId) -> Option<&Answer> {
        self.answers.get(&question)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.answers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    /// Questions that still have no usable answer, in question order.
    #[must_use]
    pub fn unanswered(&self, questions: &[Question]) -> Vec<QuestionId> {
        questions
            .iter()
            .filter(|q| self.get(q.id()).is_none_or(Answer::is_blank))
            .map(Question::id)
            .collect()
    }
}

impl FromIterator<(QuestionId, Answer)> for AnswerSet {
    fn from_iter<I: IntoIterator<Item = (QuestionId, Answer)>>(iter: I) -> Self {
        Self {
            answers: iter.into_iter().collect(),
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
