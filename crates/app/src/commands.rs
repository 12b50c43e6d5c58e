use std::error::Error;
use std::io::{self, BufRead, Write};
use std::path::Path;

use quiz_core::format::{ResultTier, format_clock, format_study_time, format_timestamp};
use quiz_core::model::{DashboardSettings, Quiz, UserId};
use serde_json::{Value, json};
use services::{AdvanceOutcome, Clock, DashboardService, QuizAttemptService, QuizNavigator};
use storage::record::{QuizRecord, QuizSessionRecord, sanitize_sessions};
use storage::repository::Storage;

/// Sessions listed under "recent" in the stats output.
const RECENT_LIST_SIZE: usize = 5;

/// Import an exported session file and print the user's dashboard as JSON.
pub async fn stats(
    storage: &Storage,
    settings: DashboardSettings,
    user: &UserId,
    path: &Path,
) -> Result<(), Box<dyn Error>> {
    let raw = std::fs::read_to_string(path)?;
    let values: Vec<Value> = serde_json::from_str(&raw)?;
    let total = values.len();
    let sessions = sanitize_sessions(values, Clock::default_clock().now());

    for session in &sessions {
        storage.sessions.append_session(session).await?;
    }
    tracing::info!(imported = sessions.len(), total, path = %path.display(), "imported sessions");

    let dashboard = DashboardService::new(storage.sessions.clone(), settings);
    let stats = dashboard.stats(user).await?;
    let subjects = dashboard.subject_breakdown(user).await?;
    let recent: Vec<_> = dashboard
        .recent_sessions(user, RECENT_LIST_SIZE)
        .await?
        .iter()
        .map(|row| {
            let session = &row.session;
            json!({
                "sessionId": row.id.to_string(),
                "title": session.quiz().map(Quiz::title),
                "subject": session.subject(),
                "score": session.score(),
                "result": ResultTier::from_score(session.score()).as_str(),
                "timeSpent": format_study_time(session.time_spent()),
                "completedAt": format_timestamp(session.completed_at()),
            })
        })
        .collect();

    let output = json!({
        "userId": user.as_str(),
        "stats": stats,
        "studyTime": format_study_time(stats.total_time_spent),
        "subjects": subjects,
        "recent": recent,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Run a quiz file interactively on the terminal.
///
/// On completion the session record is printed as a single JSON line so it can
/// be appended to a session export.
pub async fn take(storage: &Storage, user: UserId, path: &Path) -> Result<(), Box<dyn Error>> {
    let raw = std::fs::read_to_string(path)?;
    let quiz = serde_json::from_str::<QuizRecord>(&raw)?.into_quiz()?;
    storage.quizzes.save_quiz(&quiz).await?;

    let attempts = QuizAttemptService::new(
        Clock::default_clock(),
        storage.quizzes.clone(),
        storage.sessions.clone(),
    );
    let mut navigator = attempts.start_attempt(quiz.id(), user).await?;

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut stdout = io::stdout();

    println!("{} ({} questions)", quiz.title(), quiz.question_count());
    println!("Enter 1-4 to pick, n to continue, b to go back, q to quit.");

    while !navigator.is_complete() {
        attempts.sync_elapsed(&mut navigator);
        render_question(&navigator, &mut stdout)?;

        let Some(line) = lines.next() else {
            tracing::warn!(quiz_id = %quiz.id(), "input closed before the attempt finished");
            return Ok(());
        };
        let line = line?;

        match line.trim() {
            "q" => {
                println!("Attempt abandoned.");
                return Ok(());
            }
            "b" => {
                if !attempts.go_back(&mut navigator) {
                    println!("Already at the first question.");
                }
            }
            "n" | "" => {
                if attempts.advance(&mut navigator).await?.outcome == AdvanceOutcome::Ignored {
                    println!("Pick an option first.");
                }
            }
            other => match other.parse::<u8>() {
                Ok(choice) if choice >= 1 && attempts.select(&mut navigator, choice - 1) => {}
                _ => println!("Unknown input: {other}"),
            },
        }
    }

    print_results(&navigator);

    if let Some(session) = navigator.session() {
        let record = QuizSessionRecord::from_session(navigator.session_id(), session);
        println!("{}", serde_json::to_string(&record)?);
    }
    Ok(())
}

fn render_question(navigator: &QuizNavigator, out: &mut impl Write) -> io::Result<()> {
    let Some(question) = navigator.current_question() else {
        return Ok(());
    };
    let progress = navigator.progress();

    write!(
        out,
        "\nQuestion {}/{} ({}%)  {}",
        progress.current,
        progress.total,
        progress.percent,
        format_clock(navigator.elapsed_secs())
    )?;
    if let Some(left) = navigator.remaining_seconds() {
        write!(out, "  [{} left]", format_clock(left))?;
    }
    writeln!(out)?;
    writeln!(out, "{}", question.prompt())?;

    for (index, option) in question.options().iter().enumerate() {
        let marker = if navigator.selected() == u8::try_from(index).ok() {
            '*'
        } else {
            ' '
        };
        writeln!(out, " {marker} {}) {option}", index + 1)?;
    }
    write!(out, "> ")?;
    out.flush()
}

fn print_results(navigator: &QuizNavigator) {
    let Some(report) = navigator.report() else {
        return;
    };

    println!("\nQuiz completed!");
    println!(
        "Score: {}% ({})  Correct: {}/{}  Time: {}",
        report.score,
        report.tier().as_str(),
        report.correct_count,
        report.total_questions,
        format_clock(navigator.elapsed_secs())
    );

    for (index, review) in report.reviews.iter().enumerate() {
        let mark = if review.is_correct { "correct" } else { "wrong" };
        println!("\n{}. {} [{mark}]", index + 1, review.prompt);
        println!(
            "   Your answer: {}",
            review.selected_text.as_deref().unwrap_or("(none)")
        );
        if !review.is_correct {
            println!("   Correct answer: {}", review.correct_text);
        }
        if let Some(explanation) = &review.explanation {
            println!("   {explanation}");
        }
    }
}
