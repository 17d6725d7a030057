mod ids;
mod progression;
mod question;

pub use ids::{BlockId, ParseIdError, ProgramId, QuestionId, RoomId, UserId};
pub use progression::{
    MONTHS_PER_QUARTER, PROGRAM_UNITS, ProgressionError, ProgressionState, QUARTERS_PER_YEAR,
    Track,
};
pub use question::{Answer, AnswerSet, Question, QuestionError, QuestionKind};

pub(crate) use progression::unit_of;
