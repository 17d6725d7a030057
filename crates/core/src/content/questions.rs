use crate::model::{PROGRAM_UNITS, Question, QuestionError, QuestionId, Track};

/// Source of gate questions for a (track, unit) pair.
pub trait QuestionBank: Send + Sync {
    /// Ordered questions for the gate at `unit`; empty when no gate exists.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if a stored question is malformed.
    fn questions(&self, track: Track, unit: u32) -> Result<Vec<Question>, QuestionError>;
}

struct ChoiceItem {
    prompt: &'static str,
    choices: [&'static str; 4],
    correct: usize,
}

const VISUAL: &[ChoiceItem] = &[
    ChoiceItem {
        prompt: "Which room asks you to picture a passage as a single frame?",
        choices: ["Story Room", "24FPS Room", "Gems Room", "Translation Room"],
        correct: 1,
    },
    ChoiceItem {
        prompt: "What object does the Translation Room turn a verse into?",
        choices: ["A sermon", "A picture", "A song", "A timeline"],
        correct: 1,
    },
    ChoiceItem {
        prompt: "In Genesis 22, what does Abraham see caught in a thicket?",
        choices: ["A lamb", "A goat", "A ram", "A dove"],
        correct: 2,
    },
];

const AUDITORY: &[ChoiceItem] = &[
    ChoiceItem {
        prompt: "Which psalm opens with 'The Lord is my shepherd'?",
        choices: ["Psalm 1", "Psalm 19", "Psalm 23", "Psalm 91"],
        correct: 2,
    },
    ChoiceItem {
        prompt: "In John 10, how do the sheep recognize their shepherd?",
        choices: ["By his staff", "By his voice", "By his robe", "By his lamp"],
        correct: 1,
    },
    ChoiceItem {
        prompt: "Which room retells a story in your own words aloud?",
        choices: ["Story Room", "Gems Room", "Fruit Room", "Concentration Room"],
        correct: 0,
    },
];

const KINESTHETIC: &[ChoiceItem] = &[
    ChoiceItem {
        prompt: "In Daniel 3, how many men were seen walking in the fire?",
        choices: ["Two", "Three", "Four", "Seven"],
        correct: 2,
    },
    ChoiceItem {
        prompt: "Which room asks you to step inside the scene with your senses?",
        choices: ["Imagination Room", "Observation Room", "Def-Com Room", "Gems Room"],
        correct: 0,
    },
    ChoiceItem {
        prompt: "Who carried the wood up Mount Moriah?",
        choices: ["Abraham", "A servant", "Isaac", "Nobody"],
        correct: 2,
    },
];

const READING_WRITING: &[ChoiceItem] = &[
    ChoiceItem {
        prompt: "Which room collects striking insights as you read?",
        choices: ["Gems Room", "Story Room", "Bible Rendered", "Symbols Room"],
        correct: 0,
    },
    ChoiceItem {
        prompt: "What does the Observation Room ask you to write down?",
        choices: ["Prayers", "Details you notice", "Sermon outlines", "Memory verses"],
        correct: 1,
    },
    ChoiceItem {
        prompt: "How many days did Abraham travel to Moriah?",
        choices: ["One", "Two", "Three", "Seven"],
        correct: 2,
    },
];

/// Built-in question tables, two multiple-choice items plus two free-text
/// prompts per gate.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticQuestionBank;

impl StaticQuestionBank {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn table(track: Track) -> &'static [ChoiceItem] {
        match track {
            Track::Visual => VISUAL,
            Track::Auditory => AUDITORY,
            Track::Kinesthetic => KINESTHETIC,
            Track::ReadingWriting => READING_WRITING,
        }
    }
}

impl QuestionBank for StaticQuestionBank {
    fn questions(&self, track: Track, unit: u32) -> Result<Vec<Question>, QuestionError> {
        if unit == 0 || unit > PROGRAM_UNITS {
            return Ok(Vec::new());
        }

        let table = Self::table(track);
        let base = usize::try_from(unit - 1).unwrap_or(0) * 2;
        let mut out = Vec::with_capacity(4);
        for (offset, slot) in (0..2).zip(1_u64..) {
            let item = &table[(base + offset) % table.len()];
            out.push(Question::multiple_choice(
                QuestionId::new(slot),
                item.prompt,
                item.choices.iter().map(|c| (*c).to_owned()).collect(),
                item.correct,
            )?);
        }
        out.push(Question::reflection(
            QuestionId::new(3),
            format!("Month {unit}: what did this month's rooms show you about God's character?"),
        )?);
        out.push(Question::application(
            QuestionId::new(4),
            format!("Month {unit}: how will you use this month's method in your own study?"),
        )?);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuestionKind;

    #[test]
    fn every_gate_has_two_choice_and_two_text_questions() {
        let bank = StaticQuestionBank::new();
        for track in Track::ALL {
            for unit in 1..=PROGRAM_UNITS {
                let questions = bank.questions(track, unit).unwrap();
                let kinds: Vec<_> = questions.iter().map(Question::kind).collect();
                assert_eq!(
                    kinds,
                    vec![
                        QuestionKind::MultipleChoice,
                        QuestionKind::MultipleChoice,
                        QuestionKind::Reflection,
                        QuestionKind::Application,
                    ]
                );
            }
        }
    }

    #[test]
    fn units_outside_the_program_have_no_gate() {
        let bank = StaticQuestionBank::new();
        assert!(bank.questions(Track::Visual, 0).unwrap().is_empty());
        assert!(bank.questions(Track::Visual, PROGRAM_UNITS + 1).unwrap().is_empty());
    }

    #[test]
    fn tracks_draw_from_different_tables() {
        let bank = StaticQuestionBank::new();
        let visual = bank.questions(Track::Visual, 1).unwrap();
        let auditory = bank.questions(Track::Auditory, 1).unwrap();
        assert_ne!(visual[0].prompt(), auditory[0].prompt());
    }
}
