use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use palace_core::assessment::{self, PASS_THRESHOLD, ScoreResult};
use palace_core::content::QuestionBank;
use palace_core::model::{
    Answer, AnswerSet, PROGRAM_UNITS, ProgramId, ProgressionState, Question, QuestionId, Track,
    UserId,
};
use palace_core::progression::{self, Advance};
use storage::repository::{
    ActiveProgram, CompletionRecord, CompletionRepository, GateAttempt, GateAttemptRepository,
    GateKey, NewProgramRecord, ProfileRepository, ProgramRepository, StorageError,
};
use tracing::{info, warn};

use crate::Clock;
use crate::context::SessionContext;
use crate::error::GateError;
use crate::notice::Notice;

//
// ─── OUTCOMES ──────────────────────────────────────────────────────────────────
//

/// What happened to the remote copy of a submission.
///
/// The in-memory result stands regardless; persistence is best-effort.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Persistence {
    Saved,
    SignedOut,
    Failed { reason: String },
}

impl Persistence {
    #[must_use]
    pub fn notice(&self) -> Option<Notice> {
        match self {
            Persistence::Saved => None,
            Persistence::SignedOut => Some(Notice::sign_in()),
            Persistence::Failed { reason } => Some(Notice::error(
                "Save failed",
                format!("Your result is shown but could not be saved: {reason}"),
            )),
        }
    }
}

/// Result of submitting a gate.
#[derive(Debug, Clone, PartialEq)]
pub struct GateOutcome {
    pub score: ScoreResult,
    pub passed: bool,
    pub advance: Advance,
    pub persistence: Persistence,
    pub notices: Vec<Notice>,
}

/// A submission whose writes have not all landed yet.
#[derive(Debug, Clone)]
struct PendingWrite {
    before: ProgressionState,
    advance: Advance,
    score: ScoreResult,
    passed: bool,
    elapsed_secs: u32,
    submitted_at: DateTime<Utc>,
    attempt_saved: bool,
    program_saved: bool,
    mastery_level: Option<u32>,
    completion_saved: bool,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// An open gate: the questions for the current unit and the answers so far.
pub struct GateSession {
    program_id: Option<ProgramId>,
    program_started_at: DateTime<Utc>,
    state: ProgressionState,
    questions: Vec<Question>,
    answers: AnswerSet,
    opened_at: DateTime<Utc>,
    /// Submissions with writes still to land, oldest first.
    pending: VecDeque<PendingWrite>,
}

impl GateSession {
    /// Stored program backing this session; `None` for local practice.
    #[must_use]
    pub fn program_id(&self) -> Option<ProgramId> {
        self.program_id
    }

    #[must_use]
    pub fn state(&self) -> ProgressionState {
        self.state
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn answers(&self) -> &AnswerSet {
        &self.answers
    }

    pub fn answer(&mut self, question: QuestionId, answer: Answer) {
        self.answers.set(question, answer);
    }

    pub fn set_answers(&mut self, answers: AnswerSet) {
        self.answers = answers;
    }

    /// True while any submission still has writes to retry.
    #[must_use]
    pub fn has_unsaved(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Number of submissions whose writes have not all landed.
    #[must_use]
    pub fn unsaved_count(&self) -> usize {
        self.pending.len()
    }
}

impl fmt::Debug for GateSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GateSession")
            .field("program_id", &self.program_id)
            .field("state", &self.state)
            .field("questions_len", &self.questions.len())
            .field("answers_len", &self.answers.len())
            .field("opened_at", &self.opened_at)
            .field("unsaved", &self.pending.len())
            .finish_non_exhaustive()
    }
}

//
// ─── SERVICE ───────────────────────────────────────────────────────────────────
//

/// Runs monthly gates: opening, scoring, advancing, and saving results.
#[derive(Clone)]
pub struct GateService {
    clock: Clock,
    bank: Arc<dyn QuestionBank>,
    programs: Arc<dyn ProgramRepository>,
    attempts: Arc<dyn GateAttemptRepository>,
    completions: Arc<dyn CompletionRepository>,
    profiles: Arc<dyn ProfileRepository>,
}

impl GateService {
    #[must_use]
    pub fn new(
        clock: Clock,
        bank: Arc<dyn QuestionBank>,
        programs: Arc<dyn ProgramRepository>,
        attempts: Arc<dyn GateAttemptRepository>,
        completions: Arc<dyn CompletionRepository>,
        profiles: Arc<dyn ProfileRepository>,
    ) -> Self {
        Self {
            clock,
            bank,
            programs,
            attempts,
            completions,
            profiles,
        }
    }

    /// Return the user's unfinished program on `track`, starting one if needed.
    ///
    /// # Errors
    ///
    /// Returns `GateError::SignedOut` without a user, or storage errors.
    pub async fn enroll(
        &self,
        ctx: &SessionContext,
        track: Track,
    ) -> Result<ActiveProgram, GateError> {
        let user = ctx.user().ok_or(GateError::SignedOut)?;
        if let Some(program) = self.programs.find_program(user, track).await? {
            if !program.state.completed() {
                return Ok(program);
            }
        }

        let now = self.clock.now();
        let state = ProgressionState::start(track);
        let id = self
            .programs
            .insert_program(NewProgramRecord {
                user,
                state,
                started_at: now,
            })
            .await?;
        info!(%user, %track, program = %id, "started program");

        Ok(ActiveProgram {
            id,
            user,
            state,
            started_at: now,
            updated_at: now,
        })
    }

    /// Open the current gate of a stored program.
    ///
    /// # Errors
    ///
    /// Returns `GateError::UnknownProgram` if the program does not belong to the
    /// user, `GateError::ProgramComplete` if it is finished, or storage errors.
    pub async fn open(
        &self,
        ctx: &SessionContext,
        program_id: ProgramId,
    ) -> Result<GateSession, GateError> {
        let user = ctx.user().ok_or(GateError::SignedOut)?;
        let program = self
            .programs
            .get_program(program_id)
            .await?
            .filter(|p| p.user == user)
            .ok_or(GateError::UnknownProgram(program_id))?;

        self.build_session(Some(program.id), program.state, program.started_at)
    }

    /// Open a gate that is not backed by a stored program.
    ///
    /// # Errors
    ///
    /// Returns `GateError::ProgramComplete` for a finished state.
    pub fn open_local(&self, state: ProgressionState) -> Result<GateSession, GateError> {
        self.build_session(None, state, self.clock.now())
    }

    fn build_session(
        &self,
        program_id: Option<ProgramId>,
        state: ProgressionState,
        program_started_at: DateTime<Utc>,
    ) -> Result<GateSession, GateError> {
        if state.completed() {
            return Err(GateError::ProgramComplete);
        }
        let questions = self.bank.questions(state.track(), state.unit())?;
        Ok(GateSession {
            program_id,
            program_started_at,
            state,
            questions,
            answers: AnswerSet::new(),
            opened_at: self.clock.now(),
            pending: VecDeque::new(),
        })
    }

    /// Score the session's answers, advance on a pass, then try to save.
    ///
    /// The scored and advanced state is kept on the session even when saving
    /// fails; use [`GateService::retry_persist`] to try the writes again.
    ///
    /// # Errors
    ///
    /// Returns `GateError::IncompleteAnswers` (nothing is scored) when any
    /// question is unanswered, or `GateError::ProgramComplete`.
    pub async fn submit(
        &self,
        ctx: &SessionContext,
        session: &mut GateSession,
    ) -> Result<GateOutcome, GateError> {
        let missing = session.answers.unanswered(&session.questions);
        if !missing.is_empty() {
            return Err(GateError::IncompleteAnswers { missing });
        }
        if session.state.completed() {
            return Err(GateError::ProgramComplete);
        }

        let score = assessment::score(&session.questions, &session.answers);
        let passed = score.passed();
        let before = session.state;
        let advance = progression::advance(&before, passed);
        let next_questions = if passed && !advance.just_completed {
            Some(self.bank.questions(before.track(), advance.next.unit())?)
        } else {
            None
        };

        let submitted_at = self.clock.now();
        let elapsed_secs = self.clock.seconds_since(session.opened_at);
        info!(
            user = ?ctx.user(),
            unit = before.unit(),
            score = score.percentage(),
            passed,
            completed = advance.just_completed,
            "gate submitted"
        );

        session.state = advance.next;
        if let Some(questions) = next_questions {
            session.questions = questions;
            session.answers = AnswerSet::new();
            session.opened_at = submitted_at;
        }
        session.pending.push_back(PendingWrite {
            before,
            advance,
            score,
            passed,
            elapsed_secs,
            submitted_at,
            attempt_saved: false,
            program_saved: false,
            mastery_level: None,
            completion_saved: false,
        });

        let mut notices = vec![result_notice(&score, &advance, passed, before.track())];
        let persistence = self.flush(ctx, session).await;
        notices.extend(persistence.notice());

        Ok(GateOutcome {
            score,
            passed,
            advance,
            persistence,
            notices,
        })
    }

    /// Re-attempt the writes of every submission that failed to save, oldest
    /// first.
    ///
    /// # Errors
    ///
    /// Returns `GateError::NothingToRetry` if every write already landed.
    pub async fn retry_persist(
        &self,
        ctx: &SessionContext,
        session: &mut GateSession,
    ) -> Result<Persistence, GateError> {
        if session.pending.is_empty() {
            return Err(GateError::NothingToRetry);
        }
        Ok(self.flush(ctx, session).await)
    }

    async fn flush(&self, ctx: &SessionContext, session: &mut GateSession) -> Persistence {
        let Some(user) = ctx.user() else {
            return Persistence::SignedOut;
        };
        let program_id = session.program_id;
        let program_started_at = session.program_started_at;

        while let Some(pending) = session.pending.front_mut() {
            let written = self
                .write_pending(user, program_id, program_started_at, pending)
                .await;
            if let Err(err) = written {
                warn!(
                    %user,
                    error = %err,
                    unsaved = session.pending.len(),
                    "could not save gate result; keeping local progress"
                );
                return Persistence::Failed {
                    reason: err.to_string(),
                };
            }
            session.pending.pop_front();
        }
        Persistence::Saved
    }

    async fn write_pending(
        &self,
        user: UserId,
        program_id: Option<ProgramId>,
        program_started_at: DateTime<Utc>,
        pending: &mut PendingWrite,
    ) -> Result<(), StorageError> {
        if !pending.attempt_saved {
            let key = GateKey::for_state(user, &pending.before);
            let previous = self.attempts.get_attempt(&key).await?;
            let (count, was_passed, completed_at) = previous.map_or((0, false, None), |a| {
                (a.attempt_count, a.passed, a.completed_at)
            });
            self.attempts
                .upsert_attempt(&GateAttempt {
                    key,
                    attempt_count: count.saturating_add(1),
                    passed: was_passed || pending.passed,
                    score: pending.score.percentage(),
                    elapsed_secs: pending.elapsed_secs,
                    completed_at: completed_at.or(pending.passed.then_some(pending.submitted_at)),
                })
                .await?;
            pending.attempt_saved = true;
        }

        if !pending.program_saved {
            if let Some(id) = program_id {
                self.programs
                    .update_program(&ActiveProgram {
                        id,
                        user,
                        state: pending.advance.next,
                        started_at: program_started_at,
                        updated_at: pending.submitted_at,
                    })
                    .await?;
            }
            pending.program_saved = true;
        }

        if pending.advance.just_completed && !pending.completion_saved {
            let level = match pending.mastery_level {
                Some(level) => level,
                None => {
                    let level = self.profiles.get_mastery_level(user).await?.saturating_add(1);
                    pending.mastery_level = Some(level);
                    level
                }
            };
            self.profiles.set_mastery_level(user, level).await?;
            self.completions
                .insert_completion(&CompletionRecord {
                    user,
                    track: pending.before.track(),
                    started_at: program_started_at,
                    completed_at: pending.submitted_at,
                    mastery_level: level,
                })
                .await?;
            pending.completion_saved = true;
            info!(%user, mastery_level = level, "program completed");
        }

        Ok(())
    }
}

fn result_notice(score: &ScoreResult, advance: &Advance, passed: bool, track: Track) -> Notice {
    if advance.just_completed {
        return Notice::success(
            "Program complete!",
            format!("You finished all {PROGRAM_UNITS} months of the {track} track."),
        );
    }
    if passed {
        let next = advance.next;
        return Notice::success(
            "Gate passed",
            format!(
                "You scored {}%. On to year {}, quarter {}, month {}.",
                score.rounded(),
                next.year(),
                next.quarter(),
                next.month()
            ),
        );
    }
    Notice::info(
        "Keep studying",
        format!(
            "You scored {}%. You need {PASS_THRESHOLD}% to pass.",
            score.rounded()
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use palace_core::content::StaticQuestionBank;
    use palace_core::time::fixed_now;
    use storage::repository::Storage;

    fn service() -> GateService {
        let storage = Storage::in_memory();
        GateService::new(
            Clock::fixed(fixed_now()),
            Arc::new(StaticQuestionBank::new()),
            storage.programs,
            storage.attempts,
            storage.completions,
            storage.profiles,
        )
    }

    #[test]
    fn local_session_refuses_completed_state() {
        let done = ProgressionState::new(Track::Visual, 2, 4, 3, true).unwrap();
        let err = service().open_local(done).unwrap_err();
        assert!(matches!(err, GateError::ProgramComplete));
    }

    #[tokio::test]
    async fn unanswered_questions_block_submission() {
        let svc = service();
        let mut session = svc
            .open_local(ProgressionState::start(Track::Visual))
            .unwrap();
        session.answer(QuestionId::new(1), Answer::Choice(0));

        let err = svc
            .submit(&SessionContext::anonymous(), &mut session)
            .await
            .unwrap_err();

        match err {
            GateError::IncompleteAnswers { ref missing } => assert_eq!(missing.len(), 3),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.notice().title, "Incomplete");
        assert_eq!(session.state(), ProgressionState::start(Track::Visual));
        assert!(!session.has_unsaved());
    }

    #[test]
    fn failing_notice_mentions_threshold() {
        let state = ProgressionState::start(Track::Visual);
        let advance = progression::advance(&state, false);
        let score = assessment::score(&[], &AnswerSet::new());
        let notice = result_notice(&score, &advance, false, Track::Visual);
        assert!(notice.message.contains("70%"));
    }
}
