//! The `palace gate` commands.

use std::path::PathBuf;

use anyhow::{Context, Result};
use palace_core::model::{AnswerSet, ProgressionState, Question, QuestionKind, Track};
use services::{GateError, GateService, GateSession, Persistence, SessionContext};
use tracing::{info, warn};

use super::print_notice;
use crate::config::Config;

pub async fn open(config: &Config, track: Track) -> Result<()> {
    let services = super::connect(config).await?;
    let ctx = config.context();
    let session = open_session(&services.gates(), &ctx, track).await?;
    print_session(&session);
    Ok(())
}

pub async fn submit(config: &Config, track: Track, answers: PathBuf) -> Result<()> {
    let raw = std::fs::read_to_string(&answers)
        .with_context(|| format!("reading {}", answers.display()))?;
    let answers: AnswerSet = serde_json::from_str(&raw)
        .with_context(|| format!("parsing {}", answers.display()))?;

    let services = super::connect(config).await?;
    let gates = services.gates();
    let ctx = config.context();
    let mut session = open_session(&gates, &ctx, track).await?;
    session.set_answers(answers);

    let outcome = match gates.submit(&ctx, &mut session).await {
        Ok(outcome) => outcome,
        Err(err) => {
            print_notice(&err.notice());
            return Err(err.into());
        }
    };
    match &outcome.persistence {
        Persistence::Saved => info!(%track, passed = outcome.passed, "submission saved"),
        Persistence::SignedOut => info!(%track, "submission not saved: no user"),
        Persistence::Failed { reason } => warn!(%track, %reason, "submission not saved"),
    }

    println!(
        "Score: {}% ({} of {})",
        outcome.score.rounded(),
        outcome.score.numerator(),
        outcome.score.denominator()
    );
    for notice in &outcome.notices {
        print_notice(notice);
    }
    if outcome.passed && !outcome.advance.just_completed {
        println!();
        print_session(&session);
    }
    Ok(())
}

/// Signed-in users get their stored program; anonymous users always start at
/// the first month.
async fn open_session(
    gates: &GateService,
    ctx: &SessionContext,
    track: Track,
) -> Result<GateSession, GateError> {
    if ctx.user().is_none() {
        return gates.open_local(ProgressionState::start(track));
    }
    let program = gates.enroll(ctx, track).await?;
    gates.open(ctx, program.id).await
}

fn print_session(session: &GateSession) {
    let state = session.state();
    println!(
        "{} track, year {} quarter {} month {} (unit {})",
        state.track(),
        state.year(),
        state.quarter(),
        state.month(),
        state.unit()
    );
    for question in session.questions() {
        print_question(question);
    }
}

fn print_question(question: &Question) {
    let label = match question.kind() {
        QuestionKind::MultipleChoice => "choice",
        QuestionKind::Reflection => "reflection",
        QuestionKind::Application => "application",
    };
    println!("  {} [{label}] {}", question.id(), question.prompt());
    for (index, choice) in question.choices().iter().enumerate() {
        println!("      {index}) {choice}");
    }
}
