use tokio::io::{AsyncBufReadExt, BufReader};

use adaptive_quiz::config::AppConfig;
use adaptive_quiz::driver::{spawn_signal_pump, QuizCommand, QuizDriver, DEFAULT_TICK_PERIOD};
use adaptive_quiz::logging;
use adaptive_quiz::quiz::{AdaptiveQuizEngine, AnswerOutcome, QuestionBank, QuizSnapshot};
use adaptive_quiz::signal::SimulatedEmotionSource;

const HELP: &str = "commands: option number or letter selects, s submit, n next, r restart, q quit";

// Letters past 'm' would collide with the n/q/r/s commands.
const LETTER_LABELS: usize = 13;

#[derive(Debug, PartialEq, Eq)]
enum Input {
    Command(QuizCommand),
    Quit,
}

fn parse_input(line: &str) -> Option<Input> {
    let line = line.trim().to_lowercase();
    match line.as_str() {
        "q" | "quit" => return Some(Input::Quit),
        "s" | "submit" => return Some(Input::Command(QuizCommand::Submit)),
        "n" | "next" => return Some(Input::Command(QuizCommand::Advance)),
        "r" | "reset" | "restart" => return Some(Input::Command(QuizCommand::Reset)),
        _ => {}
    }
    if let Ok(number) = line.parse::<usize>() {
        return number
            .checked_sub(1)
            .map(|index| Input::Command(QuizCommand::SelectAnswer(index)));
    }
    let mut chars = line.chars();
    match (chars.next(), chars.next()) {
        (Some(letter @ 'a'..='m'), None) => Some(Input::Command(QuizCommand::SelectAnswer(
            letter as usize - 'a' as usize,
        ))),
        _ => None,
    }
}

/// `A`..`M` for the first options, the 1-based number after that.
fn option_label(index: usize) -> String {
    if index < LETTER_LABELS {
        char::from(b'A' + index as u8).to_string()
    } else {
        (index + 1).to_string()
    }
}

/// Terminal rendering of engine snapshots. Full redraws happen only when the
/// question or phase changes; countdown updates print a short status line.
#[derive(Default)]
struct View {
    last: Option<QuizSnapshot>,
}

impl View {
    fn show(&mut self, snap: &QuizSnapshot) {
        let redraw = match &self.last {
            None => true,
            Some(last) => {
                last.current_index != snap.current_index
                    || last.state != snap.state
                    || last.selected_answer != snap.selected_answer
            }
        };
        if redraw {
            render_full(snap);
        } else if let Some(last) = &self.last {
            let difficulty = |s: &QuizSnapshot| s.question.as_ref().map(|q| q.difficulty);
            if difficulty(last) != difficulty(snap) || last.hint_available != snap.hint_available {
                render_adaptation(snap);
            }
            if last.time_remaining_seconds != snap.time_remaining_seconds
                && (snap.time_remaining_seconds % 10 == 0 || snap.time_remaining_seconds <= 5)
            {
                println!("  ⏱ {}s left", snap.time_remaining_seconds);
            }
        }
        self.last = Some(snap.clone());
    }
}

fn render_full(snap: &QuizSnapshot) {
    println!();
    if snap.is_complete() {
        println!("Quiz complete!");
        println!(
            "  score {}/{}  accuracy {}%  points {}",
            snap.score, snap.total_questions, snap.accuracy_percent, snap.points_earned
        );
        println!("  r to restart, q to quit");
        return;
    }
    let Some(question) = &snap.question else {
        return;
    };

    println!(
        "Question {} of {}  [{}]  score {}/{}  streak {}  {}s  progress {}%",
        snap.current_index + 1,
        snap.total_questions,
        question.difficulty,
        snap.score,
        snap.total_questions,
        snap.streak,
        snap.time_remaining_seconds,
        snap.progress_percent,
    );
    println!("  {}", question.prompt);
    for (index, option) in question.options.iter().enumerate() {
        let marker = match (snap.revealed, index == question.correct_index, snap.selected_answer == Some(index)) {
            (true, true, _) => "✓",
            (true, false, true) => "✗",
            (_, _, true) => ">",
            _ => " ",
        };
        println!("  {marker} {}. {option}", option_label(index));
    }

    if snap.revealed {
        let verdict = match snap.last_outcome {
            Some(AnswerOutcome::Correct) => "Correct!",
            Some(AnswerOutcome::Incorrect) => "Incorrect",
            Some(AnswerOutcome::TimedOut) => "Time's up",
            None => "",
        };
        println!("  {verdict} {}", question.explanation);
        println!(
            "  points {}  accuracy {}%  (n to continue)",
            snap.points_earned, snap.accuracy_percent
        );
    } else if snap.hint_available {
        println!("  hint available: try simplifying the equation first");
    }
}

fn render_adaptation(snap: &QuizSnapshot) {
    if let Some(question) = &snap.question {
        println!(
            "  difficulty now {} (content {}){}",
            question.difficulty,
            snap.content_level.as_str(),
            if snap.hint_available { ", hint available" } else { "" }
        );
    }
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let config = AppConfig::from_env();
    let log_guard = logging::init_tracing(&config);

    let bank = match &config.bank_path {
        Some(path) => match QuestionBank::load(path) {
            Ok(bank) => bank,
            Err(err) => {
                tracing::error!(error = %err, path = %path.display(), "failed to load question bank");
                std::process::exit(1);
            }
        },
        None => QuestionBank::default(),
    };

    let engine = match AdaptiveQuizEngine::from_bank(bank, config.per_question_seconds) {
        Ok(engine) => engine,
        Err(err) => {
            tracing::error!(error = %err, "invalid quiz configuration");
            std::process::exit(1);
        }
    };
    tracing::info!(
        questions = engine.bank().len(),
        per_question_seconds = engine.per_question_seconds(),
        "starting adaptive quiz"
    );

    let (handle, driver_task) = QuizDriver::spawn(engine, DEFAULT_TICK_PERIOD);
    let source = match config.signal_seed {
        Some(seed) => SimulatedEmotionSource::with_seed(seed),
        None => SimulatedEmotionSource::new(),
    };
    let pump = spawn_signal_pump(source, config.signal_interval, handle.downgrade());

    println!("{HELP}");
    let mut view = View::default();
    let mut snapshots = handle.subscribe();
    view.show(&snapshots.borrow_and_update().clone());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snap = snapshots.borrow_and_update().clone();
                view.show(&snap);
            }
            line = lines.next_line() => {
                match line {
                    Ok(Some(line)) => match parse_input(&line) {
                        Some(Input::Quit) => break,
                        Some(Input::Command(command)) => {
                            if let Err(err) = handle.send(command).await {
                                println!("  ! {err}");
                            }
                        }
                        None => println!("{HELP}"),
                    },
                    Ok(None) => break,
                    Err(err) => {
                        tracing::error!(error = %err, "failed to read input");
                        break;
                    }
                }
            }
            _ = &mut shutdown => break,
        }
    }

    drop(snapshots);
    drop(handle);
    if let Ok(engine) = driver_task.await {
        let final_snap = engine.snapshot();
        tracing::info!(
            score = final_snap.score,
            answered = final_snap.answered_count,
            "quiz session closed"
        );
    }
    pump.abort();

    // A pending stdin read keeps a blocking thread alive past runtime shutdown.
    drop(log_guard);
    std::process::exit(0);
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use adaptive_quiz::quiz::{Difficulty, Question};

    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_input(" S "), Some(Input::Command(QuizCommand::Submit)));
        assert_eq!(parse_input("next"), Some(Input::Command(QuizCommand::Advance)));
        assert_eq!(parse_input("r"), Some(Input::Command(QuizCommand::Reset)));
        assert_eq!(parse_input("quit"), Some(Input::Quit));
    }

    #[test]
    fn test_parse_answer_selection() {
        assert_eq!(parse_input("1"), Some(Input::Command(QuizCommand::SelectAnswer(0))));
        assert_eq!(parse_input("C"), Some(Input::Command(QuizCommand::SelectAnswer(2))));
        assert_eq!(parse_input("0"), None);
        assert_eq!(parse_input("hello"), None);
        assert_eq!(parse_input("z"), None);
    }

    #[test]
    fn test_option_labels_stay_selectable() {
        assert_eq!(option_label(0), "A");
        assert_eq!(option_label(12), "M");
        assert_eq!(option_label(13), "14");
        assert_eq!(option_label(199), "200");

        for index in [0, 5, 12, 13, 25, 26, 190, 199] {
            assert_eq!(
                parse_input(&option_label(index)),
                Some(Input::Command(QuizCommand::SelectAnswer(index)))
            );
        }
    }

    #[test]
    fn test_render_question_with_many_options() {
        let question = Question {
            id: 1,
            prompt: "Pick the largest number".to_string(),
            options: (0..200).map(|i| i.to_string()).collect(),
            correct_index: 199,
            base_difficulty: Difficulty::Hard,
            explanation: "199 is the largest".to_string(),
        };
        let bank = QuestionBank::new(vec![question]).unwrap();
        let mut engine = AdaptiveQuizEngine::from_bank(bank, 30).unwrap();

        render_full(&engine.snapshot());
        engine.select_answer(199).unwrap();
        engine.submit().unwrap();
        render_full(&engine.snapshot());
        engine.advance().unwrap();
        render_full(&engine.snapshot());
    }
}
