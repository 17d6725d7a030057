use chrono::Duration;
use palace_core::model::{ProgressionState, Track, UserId};
use palace_core::time::fixed_now;
use storage::repository::{
    CompletionRecord, CompletionRepository, GateAttempt, GateAttemptRepository, GateKey,
    NewProgramRecord, ProfileRepository, ProgramRepository, SettingsRepository, StorageError,
};
use storage::sqlite::SqliteRepository;

async fn connect(name: &str) -> SqliteRepository {
    let repo = SqliteRepository::connect(&format!("sqlite:file:{name}?mode=memory&cache=shared"))
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

#[tokio::test]
async fn sqlite_program_roundtrip_and_update() {
    let repo = connect("memdb_programs").await;
    let user = UserId::random();

    let id = repo
        .insert_program(NewProgramRecord {
            user,
            state: ProgressionState::start(Track::Kinesthetic),
            started_at: fixed_now(),
        })
        .await
        .unwrap();

    let mut program = repo.get_program(id).await.unwrap().expect("program");
    assert_eq!(program.user, user);
    assert_eq!(program.state.unit(), 1);

    program.state = ProgressionState::new(Track::Kinesthetic, 2, 3, 1, false).unwrap();
    program.updated_at = fixed_now() + Duration::days(200);
    repo.update_program(&program).await.unwrap();

    let found = repo
        .find_program(user, Track::Kinesthetic)
        .await
        .unwrap()
        .expect("found");
    assert_eq!(found, program);
    assert!(
        repo.find_program(user, Track::Visual)
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn sqlite_update_of_unknown_program_is_not_found() {
    let repo = connect("memdb_program_missing").await;
    let program = storage::repository::ActiveProgram {
        id: palace_core::model::ProgramId::new(999),
        user: UserId::random(),
        state: ProgressionState::start(Track::Visual),
        started_at: fixed_now(),
        updated_at: fixed_now(),
    };
    let err = repo.update_program(&program).await.unwrap_err();
    assert!(matches!(err, StorageError::NotFound));
}

#[tokio::test]
async fn sqlite_gate_attempt_upsert_replaces_row() {
    let repo = connect("memdb_attempts").await;
    let key = GateKey {
        user: UserId::random(),
        track: Track::Auditory,
        year: 1,
        month: 4,
    };

    let mut attempt = GateAttempt {
        key,
        attempt_count: 1,
        passed: false,
        score: 41.5,
        elapsed_secs: 300,
        completed_at: None,
    };
    repo.upsert_attempt(&attempt).await.unwrap();

    attempt.attempt_count = 2;
    attempt.passed = true;
    attempt.score = 83.33;
    attempt.completed_at = Some(fixed_now());
    repo.upsert_attempt(&attempt).await.unwrap();

    let stored = repo.get_attempt(&key).await.unwrap().expect("attempt");
    assert_eq!(stored, attempt);
}

#[tokio::test]
async fn sqlite_completions_profiles_and_flags() {
    let repo = connect("memdb_completions").await;
    let user = UserId::random();

    assert_eq!(repo.get_mastery_level(user).await.unwrap(), 0);
    repo.set_mastery_level(user, 1).await.unwrap();
    repo.set_mastery_level(user, 2).await.unwrap();
    assert_eq!(repo.get_mastery_level(user).await.unwrap(), 2);

    let record = CompletionRecord {
        user,
        track: Track::ReadingWriting,
        started_at: fixed_now(),
        completed_at: fixed_now() + Duration::days(730),
        mastery_level: 2,
    };
    repo.insert_completion(&record).await.unwrap();
    assert_eq!(repo.list_completions(user).await.unwrap(), vec![record]);

    repo.set_flag(None, "intro-banner", "dismissed").await.unwrap();
    assert_eq!(
        repo.get_flag(None, "intro-banner").await.unwrap().as_deref(),
        Some("dismissed")
    );
    assert!(repo.get_flag(Some(user), "intro-banner").await.unwrap().is_none());
}
