use chrono::Duration;
use quiz_core::generation::GenerationRequest;
use quiz_core::model::{DashboardSettings, Difficulty, NotesDraft, UserId};
use quiz_core::time::fixed_now;
use services::{
    AdvanceOutcome, Clock, DashboardService, NotesService, QuizAttemptService, QuizDetails,
    QuizLibraryService,
};
use storage::repository::Storage;

const GENERATED: &str = r#"{"questions": [
    {"question": "Organelle for photosynthesis?", "options": ["Chloroplast", "Nucleus", "Vacuole", "Ribosome"], "correctAnswer": 0},
    {"question": "Gas released?", "options": ["CO2", "O2", "N2", "H2"], "correctAnswer": 1},
    {"question": "Pigment?", "options": ["Keratin", "Melanin", "Chlorophyll", "Hemoglobin"], "correctAnswer": 2}
]}"#;

#[tokio::test]
async fn notes_to_dashboard_round_trip() {
    let storage = Storage::in_memory();
    let user = UserId::new("student");
    let start = fixed_now();

    let notes = NotesService::new(Clock::fixed(start), storage.notes.clone())
        .save_notes(
            NotesDraft {
                title: Some("Photosynthesis".into()),
                subject: Some("Biology".into()),
                content: "Plants convert light into chemical energy.".into(),
            },
            user.clone(),
        )
        .await
        .unwrap();
    assert_eq!(storage.notes.get_notes(notes.id()).await.unwrap(), notes);
    let request = GenerationRequest::from_notes(&notes, Difficulty::Medium, 3).unwrap();

    let library = QuizLibraryService::new(Clock::fixed(start), storage.quizzes.clone());
    let quiz = library
        .create_generated_quiz(
            &request,
            GENERATED,
            QuizDetails {
                title: notes.title().to_owned(),
                description: notes.preview(),
                time_limit_minutes: None,
            },
            user.clone(),
        )
        .await
        .unwrap();

    let attempts = QuizAttemptService::new(
        Clock::fixed(start),
        storage.quizzes.clone(),
        storage.sessions.clone(),
    );
    let mut nav = attempts.start_attempt(quiz.id(), user.clone()).await.unwrap();

    // Answer 0 correctly, 1 wrongly, go back and fix it, then miss 2.
    let mut now = start;
    let mut step = |picks: u8, secs: i64| {
        now += Duration::seconds(secs);
        (picks, attempts.clone().with_clock(Clock::fixed(now)))
    };

    let (pick, svc) = step(0, 4);
    assert!(svc.select(&mut nav, pick));
    assert_eq!(
        svc.advance(&mut nav).await.unwrap().outcome,
        AdvanceOutcome::Moved { index: 1 }
    );

    let (pick, svc) = step(3, 6);
    svc.select(&mut nav, pick);
    svc.advance(&mut nav).await.unwrap();

    let (_, svc) = step(0, 2);
    assert!(svc.go_back(&mut nav));
    assert_eq!(nav.selected(), Some(3));

    let (pick, svc) = step(1, 5);
    svc.select(&mut nav, pick);
    svc.advance(&mut nav).await.unwrap();

    let (pick, svc) = step(0, 3);
    svc.select(&mut nav, pick);
    let done = svc.advance(&mut nav).await.unwrap();
    assert_eq!(done.outcome, AdvanceOutcome::Finished);
    let session_id = done.session_id.expect("session persisted");

    let stored = storage.sessions.get_session(session_id).await.unwrap();
    assert_eq!(stored.session.score(), 67);
    assert_eq!(stored.session.time_spent(), 20);
    let times: Vec<u64> = stored.session.answers().iter().map(|a| a.time_spent).collect();
    assert_eq!(times, vec![4, 5, 3]);

    let dashboard = DashboardService::new(storage.sessions.clone(), DashboardSettings::default());
    let stats = dashboard.stats(&user).await.unwrap();
    assert_eq!(stats.total_quizzes, 1);
    assert_eq!(stats.recent_performance, vec![67]);
    assert_eq!(stats.strongest_subjects, vec!["Biology"]);
    assert_eq!(stats.total_time_spent, 20);
}
