//! Gate scoring.
//!
//! Multiple-choice items are all-or-nothing. Free-text items earn half
//! credit when the written answer is long enough; there is no grading of
//! what the text actually says.

use serde::{Deserialize, Serialize};

use crate::model::{Answer, AnswerSet, Question, QuestionKind};

/// Minimum rounded percentage needed to pass a gate.
pub const PASS_THRESHOLD: u8 = 70;

/// Free-text answers must be strictly longer than this (trimmed, in chars).
pub const FREE_TEXT_MIN_CHARS: usize = 50;

/// Credit given to a free-text answer that clears the length bar.
pub const FREE_TEXT_CREDIT: f64 = 0.5;

/// Outcome of scoring one gate submission. Unrounded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    numerator: f64,
    denominator: u32,
    percentage: f64,
}

impl ScoreResult {
    #[must_use]
    pub fn numerator(&self) -> f64 {
        self.numerator
    }

    /// Number of questions that took part in scoring.
    #[must_use]
    pub fn denominator(&self) -> u32 {
        self.denominator
    }

    /// Raw percentage in `0.0..=100.0`.
    #[must_use]
    pub fn percentage(&self) -> f64 {
        self.percentage
    }

    /// Percentage rounded for display.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn rounded(&self) -> u8 {
        // percentage is always within 0..=100
        self.percentage.round().clamp(0.0, 100.0) as u8
    }

    /// Whether the displayed score clears [`PASS_THRESHOLD`].
    #[must_use]
    pub fn passed(&self) -> bool {
        self.rounded() >= PASS_THRESHOLD
    }
}

/// Score a set of answers against the gate's questions.
///
/// Questions with no scorable answer are skipped; an empty gate scores 0.
#[must_use]
pub fn score(questions: &[Question], answers: &AnswerSet) -> ScoreResult {
    let mut numerator = 0.0_f64;
    let mut denominator = 0_u32;

    for question in questions {
        let answer = answers.get(question.id());
        match question.kind() {
            QuestionKind::MultipleChoice => {
                denominator += 1;
                if let (Some(Answer::Choice(picked)), Some(correct)) = (answer, question.correct())
                {
                    if *picked == correct {
                        numerator += 1.0;
                    }
                }
            }
            QuestionKind::Reflection | QuestionKind::Application => {
                let Some(Answer::Text(text)) = answer else {
                    continue;
                };
                if text.is_empty() {
                    continue;
                }
                denominator += 1;
                if text.trim().chars().count() > FREE_TEXT_MIN_CHARS {
                    numerator += FREE_TEXT_CREDIT;
                }
            }
        }
    }

    let percentage = if denominator > 0 {
        numerator / f64::from(denominator) * 100.0
    } else {
        0.0
    };

    ScoreResult {
        numerator,
        denominator,
        percentage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuestionId;

    fn mc(id: u64, correct: usize) -> Question {
        Question::multiple_choice(
            QuestionId::new(id),
            format!("Question {id}"),
            vec!["a".into(), "b".into(), "c".into(), "d".into()],
            correct,
        )
        .unwrap()
    }

    fn reflection(id: u64) -> Question {
        Question::reflection(QuestionId::new(id), "What stood out?").unwrap()
    }

    fn text_of_len(n: usize) -> Answer {
        Answer::Text("x".repeat(n))
    }

    #[test]
    fn multiple_choice_only_is_fraction_correct() {
        let questions = vec![mc(1, 0), mc(2, 1), mc(3, 2), mc(4, 3)];
        let answers: AnswerSet = [
            (QuestionId::new(1), Answer::Choice(0)),
            (QuestionId::new(2), Answer::Choice(1)),
            (QuestionId::new(3), Answer::Choice(0)),
        ]
        .into_iter()
        .collect();

        let result = score(&questions, &answers);
        assert_eq!(result.denominator(), 4);
        assert!((result.percentage() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn no_scorable_questions_scores_zero() {
        let questions = vec![reflection(1)];
        let result = score(&questions, &AnswerSet::new());
        assert_eq!(result.denominator(), 0);
        assert_eq!(result.percentage(), 0.0);
        assert!(!result.passed());

        assert_eq!(score(&[], &AnswerSet::new()).percentage(), 0.0);
    }

    #[test]
    fn fifty_chars_earns_nothing_fifty_one_earns_half() {
        let questions = vec![reflection(1)];

        let at_limit: AnswerSet = [(QuestionId::new(1), text_of_len(50))].into_iter().collect();
        let result = score(&questions, &at_limit);
        assert_eq!(result.denominator(), 1);
        assert_eq!(result.numerator(), 0.0);

        let over: AnswerSet = [(QuestionId::new(1), text_of_len(51))].into_iter().collect();
        let result = score(&questions, &over);
        assert_eq!(result.numerator(), 0.5);
        assert!((result.percentage() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn surrounding_whitespace_does_not_count_toward_length() {
        let questions = vec![reflection(1)];
        let padded = format!("   {}   ", "y".repeat(50));
        let answers: AnswerSet = [(QuestionId::new(1), Answer::Text(padded))]
            .into_iter()
            .collect();
        assert_eq!(score(&questions, &answers).numerator(), 0.0);
    }

    #[test]
    fn whitespace_only_text_still_counts_in_denominator() {
        let questions = vec![mc(1, 0), reflection(2)];
        let answers: AnswerSet = [
            (QuestionId::new(1), Answer::Choice(0)),
            (QuestionId::new(2), Answer::Text("   ".into())),
        ]
        .into_iter()
        .collect();
        let result = score(&questions, &answers);
        assert_eq!(result.denominator(), 2);
        assert_eq!(result.rounded(), 50);
    }

    #[test]
    fn text_answer_to_multiple_choice_is_wrong() {
        let questions = vec![mc(1, 0)];
        let answers: AnswerSet = [(QuestionId::new(1), Answer::Text("a".into()))]
            .into_iter()
            .collect();
        let result = score(&questions, &answers);
        assert_eq!(result.denominator(), 1);
        assert_eq!(result.numerator(), 0.0);
    }

    #[test]
    fn two_correct_plus_long_reflection_passes_at_83() {
        let questions = vec![mc(1, 2), mc(2, 0), reflection(3)];
        let answers: AnswerSet = [
            (QuestionId::new(1), Answer::Choice(2)),
            (QuestionId::new(2), Answer::Choice(0)),
            (QuestionId::new(3), text_of_len(80)),
        ]
        .into_iter()
        .collect();

        let result = score(&questions, &answers);
        assert_eq!(result.numerator(), 2.5);
        assert_eq!(result.denominator(), 3);
        assert!((result.percentage() - 83.333_333).abs() < 1e-4);
        assert_eq!(result.rounded(), 83);
        assert!(result.passed());
    }

    #[test]
    fn sixty_nine_point_five_rounds_up_to_pass() {
        let result = ScoreResult {
            numerator: 0.0,
            denominator: 1,
            percentage: 69.5,
        };
        assert_eq!(result.rounded(), 70);
        assert!(result.passed());
    }
}
