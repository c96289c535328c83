//! # quiz-session
//!
//! A timed multiple-choice quiz: pick a category and difficulty, answer a
//! shuffled set of questions against a per-question countdown, and get a final
//! percentage that is checked against the stored best score.
//!
//! The session logic lives in [`QuizController`] and can be driven without a
//! terminal. [`Quiz`] wires it to a ratatui front end.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use quiz_session::{Quiz, QuizConfig, QuizError};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), QuizError> {
//!     let quiz = Quiz::from_config(&QuizConfig::default())?;
//!     quiz.run().await
//! }
//! ```

mod app;
pub mod config;
mod data;
mod error;
mod models;
pub mod score;
pub mod session;
pub mod shuffle;
pub mod terminal;
pub mod timer;
mod ui;

use std::path::PathBuf;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use tokio::sync::mpsc;

pub use app::{AnsweredQuestion, App, Feedback, QuizView};
pub use config::{ConfigError, QuizConfig, TimerConfig};
pub use data::{default_questions, load_questions_from_json, LoadError, QuestionBank};
pub use error::QuizError;
pub use models::{Answer, AppState, Difficulty, Question};
pub use score::{JsonFileStore, KeyValueStore, MemoryStore, ScoreKeeper, SessionOutcome};
pub use session::{AnswerOutcome, Phase, QuizController, SessionObserver, SessionState, Tone};
pub use shuffle::Shuffler;
pub use timer::{Countdown, ManualTimer, Timer, TimerEvent, TimerHandle};
pub use ui::Theme;

use terminal::TerminalSession;

/// Used when the platform has no data directory.
const FALLBACK_STORE_FILE: &str = ".quiz-session.json";

const INPUT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// A quiz wired to the terminal and a real countdown.
pub struct Quiz {
    app: App,
    timer_events: mpsc::UnboundedReceiver<TimerEvent>,
    sound: bool,
}

impl Quiz {
    /// Build a quiz from validated settings.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Config` for invalid timer settings and
    /// `QuizError::Load` if the question file cannot be read.
    pub fn from_config(config: &QuizConfig) -> Result<Self, QuizError> {
        config.validate()?;

        let questions = match &config.questions_path {
            Some(path) => load_questions_from_json(path)?,
            None => default_questions()?,
        };

        let store_path = config
            .store_path
            .clone()
            .or_else(JsonFileStore::default_path)
            .unwrap_or_else(|| PathBuf::from(FALLBACK_STORE_FILE));
        log::info!("High scores stored in {}", store_path.display());

        let (countdown, timer_events) = Countdown::channel();
        let controller = QuizController::new(
            QuestionBank::new(questions),
            countdown,
            config.timer,
            ScoreKeeper::new(JsonFileStore::new(store_path)),
            Shuffler::from_entropy(),
        );

        let mut app = App::new(controller);
        app.preselect(config.category.as_deref(), config.difficulty);

        Ok(Self {
            app,
            timer_events,
            sound: config.sound,
        })
    }

    /// Run the quiz in the terminal until the user quits.
    ///
    /// Must be awaited inside a tokio runtime; the countdown runs as a task.
    pub async fn run(mut self) -> Result<(), QuizError> {
        let mut session = TerminalSession::enter()?;

        loop {
            while let Ok(timer_event) = self.timer_events.try_recv() {
                self.app.on_timer_event(timer_event);
            }

            if let Some(tone) = self.app.take_tone() {
                log::debug!("Feedback tone {:?}", tone);
                if self.sound {
                    session.bell()?;
                }
            }

            session
                .terminal_mut()
                .draw(|frame| ui::render(frame, &self.app))?;

            if event::poll(INPUT_POLL_INTERVAL)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press && handle_input(&mut self.app, key.code) {
                        break;
                    }
                }
            }

            tokio::task::yield_now().await;
        }

        Ok(())
    }
}

/// Returns true if the app should exit.
pub fn handle_input<T: Timer, S: KeyValueStore>(app: &mut App<T, S>, key: KeyCode) -> bool {
    match key {
        KeyCode::Char('q') | KeyCode::Char('Q') => return true,
        KeyCode::Char('t') | KeyCode::Char('T') => {
            app.toggle_theme();
            return false;
        }
        _ => {}
    }

    match app.state {
        AppState::Setup => handle_setup_input(app, key),
        AppState::Quiz => handle_quiz_input(app, key),
        AppState::Result => handle_result_input(app, key),
    }
    false
}

fn handle_setup_input<T: Timer, S: KeyValueStore>(app: &mut App<T, S>, key: KeyCode) {
    match key {
        KeyCode::Left | KeyCode::Char('h') => app.select_previous_category(),
        KeyCode::Right | KeyCode::Char('l') => app.select_next_category(),
        KeyCode::Up | KeyCode::Char('k') => app.select_previous_difficulty(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next_difficulty(),
        KeyCode::Enter => app.start_quiz(),
        _ => {}
    }
}

fn handle_quiz_input<T: Timer, S: KeyValueStore>(app: &mut App<T, S>, key: KeyCode) {
    match key {
        KeyCode::Up | KeyCode::Char('k') => app.select_previous_option(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next_option(),
        KeyCode::Enter | KeyCode::Char(' ') => match app.phase() {
            Some(Phase::Revealed) => app.advance(),
            _ => app.submit_selected(),
        },
        KeyCode::Char('n') | KeyCode::Char('N') => app.advance(),
        KeyCode::Char(c @ '1'..='9') => {
            let index = c as usize - '1' as usize;
            app.submit_answer(index);
        }
        _ => {}
    }
}

fn handle_result_input<T: Timer, S: KeyValueStore>(app: &mut App<T, S>, key: KeyCode) {
    match key {
        KeyCode::Down | KeyCode::Char('j') => app.scroll_results_down(),
        KeyCode::Up | KeyCode::Char('k') => app.scroll_results_up(),
        KeyCode::Char('r') | KeyCode::Char('R') => app.restart(),
        KeyCode::Char('s') | KeyCode::Char('S') | KeyCode::Esc => app.back_to_setup(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app_with(questions: Vec<Question>) -> App<ManualTimer, MemoryStore> {
        App::new(QuizController::new(
            QuestionBank::new(questions),
            ManualTimer::new(),
            TimerConfig::default(),
            ScoreKeeper::new(MemoryStore::new()),
            Shuffler::seeded(8),
        ))
    }

    fn question(prompt: &str) -> Question {
        Question {
            category: "react".to_string(),
            difficulty: Difficulty::Beginner,
            prompt: prompt.to_string(),
            answers: vec![
                Answer::new("a", false),
                Answer::new("b", true),
                Answer::new("c", false),
            ],
            explanation: None,
        }
    }

    #[test]
    fn test_quit_from_any_screen() {
        let mut app = app_with(vec![question("one")]);
        assert!(handle_input(&mut app, KeyCode::Char('q')));
        handle_input(&mut app, KeyCode::Enter);
        assert!(handle_input(&mut app, KeyCode::Char('Q')));
    }

    #[test]
    fn test_theme_toggle() {
        let mut app = app_with(vec![question("one")]);
        assert_eq!(app.theme(), Theme::Dark);
        assert!(!handle_input(&mut app, KeyCode::Char('t')));
        assert_eq!(app.theme(), Theme::Light);
    }

    #[test]
    fn test_keyboard_session() {
        let mut app = app_with(vec![question("one"), question("two")]);
        handle_input(&mut app, KeyCode::Enter);
        assert_eq!(app.state, AppState::Quiz);

        let correct = app
            .session()
            .unwrap()
            .answers()
            .iter()
            .position(|a| a.is_correct)
            .unwrap();
        let digit = char::from(b'1' + correct as u8);
        handle_input(&mut app, KeyCode::Char(digit));
        assert_eq!(app.phase(), Some(Phase::Revealed));

        // Enter on a revealed question moves on.
        handle_input(&mut app, KeyCode::Enter);
        assert_eq!(app.phase(), Some(Phase::AwaitingAnswer));

        handle_input(&mut app, KeyCode::Enter);
        assert_eq!(app.state, AppState::Result);
        assert_eq!(app.outcome().unwrap().total, 2);

        handle_input(&mut app, KeyCode::Char('s'));
        assert_eq!(app.state, AppState::Setup);
    }

    #[test]
    fn test_digit_out_of_range_is_ignored() {
        let mut app = app_with(vec![question("one")]);
        handle_input(&mut app, KeyCode::Enter);
        handle_input(&mut app, KeyCode::Char('9'));
        assert_eq!(app.phase(), Some(Phase::AwaitingAnswer));
    }
}
