use crate::config::TimerConfig;
use crate::models::{Answer, AppState, Difficulty, Question};
use crate::score::{JsonFileStore, KeyValueStore, SessionOutcome};
use crate::session::{Phase, QuizController, SessionObserver, SessionState, Tone};
use crate::timer::{Countdown, Timer, TimerEvent};
use crate::ui::Theme;

/// What the reveal panel shows after a question ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub is_correct: bool,
    pub timed_out: bool,
    pub explanation: Option<String>,
}

impl Feedback {
    pub fn headline(&self) -> &'static str {
        if self.timed_out {
            "Time's up!"
        } else if self.is_correct {
            "Correct!"
        } else {
            "Incorrect."
        }
    }
}

/// One line of the results breakdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnsweredQuestion {
    pub prompt: String,
    pub is_correct: bool,
    pub timed_out: bool,
}

/// Presentation state fed by the session callbacks.
#[derive(Debug, Default)]
pub struct QuizView {
    selected_option: usize,
    current_prompt: String,
    feedback: Option<Feedback>,
    history: Vec<AnsweredQuestion>,
    outcome: Option<SessionOutcome>,
    pending_tone: Option<Tone>,
}

impl QuizView {
    fn reset(&mut self) {
        *self = Self::default();
    }

    fn record(&mut self, is_correct: bool, timed_out: bool) {
        self.history.push(AnsweredQuestion {
            prompt: self.current_prompt.clone(),
            is_correct,
            timed_out,
        });
    }
}

impl SessionObserver for QuizView {
    fn on_question_presented(&mut self, question: &Question, _answers: &[Answer]) {
        self.selected_option = 0;
        self.feedback = None;
        self.current_prompt = question.prompt.clone();
    }

    fn on_answer_result(&mut self, _selected: &Answer, is_correct: bool, explanation: Option<&str>) {
        self.feedback = Some(Feedback {
            is_correct,
            timed_out: false,
            explanation: explanation.map(str::to_string),
        });
        self.record(is_correct, false);
    }

    fn on_timeout(&mut self) {
        self.feedback = Some(Feedback {
            is_correct: false,
            timed_out: true,
            explanation: None,
        });
        self.record(false, true);
    }

    fn on_session_complete(&mut self, outcome: &SessionOutcome) {
        self.outcome = Some(*outcome);
    }

    fn play_tone(&mut self, tone: Tone) {
        self.pending_tone = Some(tone);
    }
}

/// Terminal front end: setup selection, the running session and the results.
pub struct App<T = Countdown, S = JsonFileStore> {
    pub state: AppState,
    controller: QuizController<T, S>,
    view: QuizView,
    categories: Vec<String>,
    category_index: usize,
    difficulty_index: usize,
    result_scroll: usize,
    theme: Theme,
    best_score: Option<u8>,
}

impl<T: Timer, S: KeyValueStore> App<T, S> {
    pub fn new(controller: QuizController<T, S>) -> Self {
        let categories = controller.bank().categories();
        let best_score = controller.scores().load_best();
        Self {
            state: AppState::Setup,
            controller,
            view: QuizView::default(),
            categories,
            category_index: 0,
            difficulty_index: 0,
            result_scroll: 0,
            theme: Theme::default(),
            best_score,
        }
    }

    /// Preselect a category and difficulty on the setup screen. Unknown
    /// categories are ignored.
    pub fn preselect(&mut self, category: Option<&str>, difficulty: Option<Difficulty>) {
        if let Some(index) = category.and_then(|c| self.categories.iter().position(|x| x == c)) {
            self.category_index = index;
        }
        if let Some(index) = difficulty.and_then(|d| Difficulty::ALL.iter().position(|x| *x == d)) {
            self.difficulty_index = index;
        }
    }

    pub fn controller(&self) -> &QuizController<T, S> {
        &self.controller
    }

    pub fn session(&self) -> Option<&SessionState> {
        self.controller.state()
    }

    pub fn timer_config(&self) -> &TimerConfig {
        self.controller.timer_config()
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
    }

    // Setup screen

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn selected_category(&self) -> Option<&str> {
        self.categories.get(self.category_index).map(String::as_str)
    }

    pub fn selected_difficulty(&self) -> Difficulty {
        Difficulty::ALL[self.difficulty_index]
    }

    /// Questions the current setup selection would draw.
    pub fn selection_size(&self) -> usize {
        self.selected_category()
            .map(|c| self.controller.bank().count(c, self.selected_difficulty()))
            .unwrap_or(0)
    }

    /// Best score as of startup or the last finished session.
    pub fn best_score(&self) -> Option<u8> {
        self.best_score
    }

    pub fn select_next_category(&mut self) {
        if !self.categories.is_empty() {
            self.category_index = (self.category_index + 1) % self.categories.len();
        }
    }

    pub fn select_previous_category(&mut self) {
        if !self.categories.is_empty() {
            let len = self.categories.len();
            self.category_index = (self.category_index + len - 1) % len;
        }
    }

    pub fn select_next_difficulty(&mut self) {
        self.difficulty_index = (self.difficulty_index + 1) % Difficulty::ALL.len();
    }

    pub fn select_previous_difficulty(&mut self) {
        let len = Difficulty::ALL.len();
        self.difficulty_index = (self.difficulty_index + len - 1) % len;
    }

    pub fn start_quiz(&mut self) {
        let category = self.selected_category().unwrap_or_default().to_string();
        let difficulty = self.selected_difficulty();
        self.controller.configure(&category, difficulty);
        self.begin();
    }

    /// Same category and difficulty again, freshly drawn.
    pub fn restart(&mut self) {
        if self.controller.restart() {
            self.begin();
        }
    }

    pub fn back_to_setup(&mut self) {
        self.state = AppState::Setup;
    }

    fn begin(&mut self) {
        self.view.reset();
        self.result_scroll = 0;
        self.state = AppState::Quiz;
        self.controller.start(&mut self.view);
        self.sync_state();
    }

    // Quiz screen

    pub fn phase(&self) -> Option<Phase> {
        self.controller.phase()
    }

    pub fn selected_option(&self) -> usize {
        self.view.selected_option
    }

    pub fn feedback(&self) -> Option<&Feedback> {
        self.view.feedback.as_ref()
    }

    pub fn select_next_option(&mut self) {
        let count = self.option_count();
        if count > 0 && self.phase() == Some(Phase::AwaitingAnswer) {
            self.view.selected_option = (self.view.selected_option + 1) % count;
        }
    }

    pub fn select_previous_option(&mut self) {
        let count = self.option_count();
        if count > 0 && self.phase() == Some(Phase::AwaitingAnswer) {
            self.view.selected_option = (self.view.selected_option + count - 1) % count;
        }
    }

    pub fn submit_selected(&mut self) {
        self.submit_answer(self.view.selected_option);
    }

    pub fn submit_answer(&mut self, index: usize) {
        if self.phase() == Some(Phase::AwaitingAnswer) && index < self.option_count() {
            self.view.selected_option = index;
        }
        self.controller.submit_answer(index, &mut self.view);
        self.sync_state();
    }

    pub fn advance(&mut self) {
        self.controller.advance(&mut self.view);
        self.sync_state();
    }

    pub fn on_timer_event(&mut self, event: TimerEvent) {
        self.controller.handle_timer_event(event, &mut self.view);
        self.sync_state();
    }

    /// Feedback tone requested since the last call.
    pub fn take_tone(&mut self) -> Option<Tone> {
        self.view.pending_tone.take()
    }

    fn option_count(&self) -> usize {
        self.session().map(|s| s.answers().len()).unwrap_or(0)
    }

    fn sync_state(&mut self) {
        if self.state == AppState::Quiz && self.phase() == Some(Phase::Complete) {
            self.state = AppState::Result;
            self.best_score = self.controller.scores().load_best();
        }
    }

    // Result screen

    pub fn outcome(&self) -> Option<&SessionOutcome> {
        self.view.outcome.as_ref()
    }

    pub fn history(&self) -> &[AnsweredQuestion] {
        &self.view.history
    }

    pub fn result_scroll(&self) -> usize {
        self.result_scroll
    }

    pub fn scroll_results_down(&mut self) {
        if self.result_scroll + 1 < self.view.history.len() {
            self.result_scroll += 1;
        }
    }

    pub fn scroll_results_up(&mut self) {
        self.result_scroll = self.result_scroll.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::QuestionBank;
    use crate::score::{MemoryStore, ScoreKeeper};
    use crate::shuffle::Shuffler;
    use crate::score::{StoreError, HIGH_SCORE_KEY};
    use crate::timer::ManualTimer;
    use std::cell::Cell;
    use std::rc::Rc;

    fn question(category: &str, prompt: &str) -> Question {
        Question {
            category: category.to_string(),
            difficulty: Difficulty::Beginner,
            prompt: prompt.to_string(),
            answers: vec![Answer::new("yes", true), Answer::new("no", false)],
            explanation: Some("it is".to_string()),
        }
    }

    fn app() -> App<ManualTimer, MemoryStore> {
        let bank = QuestionBank::new(vec![
            question("html", "h1"),
            question("html", "h2"),
            question("css", "c1"),
        ]);
        App::new(QuizController::new(
            bank,
            ManualTimer::new(),
            TimerConfig::default(),
            ScoreKeeper::new(MemoryStore::new()),
            Shuffler::seeded(4),
        ))
    }

    fn correct_index<S: KeyValueStore>(app: &App<ManualTimer, S>) -> usize {
        app.session()
            .unwrap()
            .answers()
            .iter()
            .position(|a| a.is_correct)
            .unwrap()
    }

    #[test]
    fn test_setup_selection_wraps() {
        let mut app = app();
        assert_eq!(app.selected_category(), Some("html"));
        assert_eq!(app.selection_size(), 2);

        app.select_previous_category();
        assert_eq!(app.selected_category(), Some("css"));
        app.select_next_category();
        assert_eq!(app.selected_category(), Some("html"));

        app.select_previous_difficulty();
        assert_eq!(app.selected_difficulty(), Difficulty::Advanced);
        assert_eq!(app.selection_size(), 0);
    }

    #[test]
    fn test_preselect() {
        let mut app = app();
        app.preselect(Some("css"), Some(Difficulty::Intermediate));
        assert_eq!(app.selected_category(), Some("css"));
        assert_eq!(app.selected_difficulty(), Difficulty::Intermediate);

        app.preselect(Some("cobol"), None);
        assert_eq!(app.selected_category(), Some("css"));
    }

    #[test]
    fn test_full_run_through_app() {
        let mut app = app();
        app.start_quiz();
        assert_eq!(app.state, AppState::Quiz);

        let correct = correct_index(&app);
        app.submit_answer(correct);
        assert_eq!(app.take_tone(), Some(Tone::Correct));
        assert_eq!(app.take_tone(), None);
        assert_eq!(app.feedback().unwrap().headline(), "Correct!");
        assert_eq!(app.feedback().unwrap().explanation.as_deref(), Some("it is"));

        app.advance();
        assert!(app.feedback().is_none());
        let events = app.controller.timer_mut().advance_secs(15);
        for event in events {
            app.on_timer_event(event);
        }

        assert_eq!(app.state, AppState::Result);
        let outcome = app.outcome().unwrap();
        assert_eq!((outcome.score, outcome.total, outcome.percentage), (1, 2, 50));
        assert_eq!(app.history().len(), 2);
        assert!(app.history()[1].timed_out);
        assert_eq!(app.best_score(), Some(50));
    }

    #[test]
    fn test_empty_selection_goes_to_results() {
        let mut app = app();
        app.preselect(None, Some(Difficulty::Advanced));
        app.start_quiz();
        assert_eq!(app.state, AppState::Result);
        assert_eq!(app.outcome().unwrap().percentage, 0);
    }

    #[test]
    fn test_option_navigation_locked_after_reveal() {
        let mut app = app();
        app.start_quiz();
        app.select_next_option();
        assert_eq!(app.selected_option(), 1);
        app.select_next_option();
        assert_eq!(app.selected_option(), 0);

        app.submit_selected();
        let selected = app.selected_option();
        app.select_next_option();
        assert_eq!(app.selected_option(), selected);
    }

    #[test]
    fn test_restart_and_back_to_setup() {
        let mut app = app();
        app.preselect(Some("css"), None);
        app.start_quiz();
        let correct = correct_index(&app);
        app.submit_answer(correct);
        assert_eq!(app.state, AppState::Result);

        app.restart();
        assert_eq!(app.state, AppState::Quiz);
        assert!(app.outcome().is_none());
        assert!(app.history().is_empty());

        app.back_to_setup();
        assert_eq!(app.state, AppState::Setup);
    }

    /// Counts reads so tests can tell how often the store is hit.
    struct CountingStore {
        inner: MemoryStore,
        reads: Rc<Cell<usize>>,
    }

    impl KeyValueStore for CountingStore {
        fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError> {
            self.reads.set(self.reads.get() + 1);
            self.inner.get(key)
        }

        fn set(&mut self, key: &str, value: serde_json::Value) -> Result<(), StoreError> {
            self.inner.set(key, value)
        }
    }

    #[test]
    fn test_best_score_is_cached_between_sessions() {
        let reads = Rc::new(Cell::new(0));
        let store = CountingStore {
            inner: MemoryStore::with_value(HIGH_SCORE_KEY, serde_json::Value::from(40)),
            reads: Rc::clone(&reads),
        };
        let mut app = App::new(QuizController::new(
            QuestionBank::new(vec![question("css", "c1")]),
            ManualTimer::new(),
            TimerConfig::default(),
            ScoreKeeper::new(store),
            Shuffler::seeded(4),
        ));
        assert_eq!(reads.get(), 1);

        // The setup screen redraws constantly; none of that touches the store.
        for _ in 0..100 {
            assert_eq!(app.best_score(), Some(40));
        }
        assert_eq!(reads.get(), 1);

        app.preselect(Some("css"), None);
        app.start_quiz();
        let correct = correct_index(&app);
        app.submit_answer(correct);
        assert_eq!(app.state, AppState::Result);
        assert_eq!(app.best_score(), Some(100));

        let after_session = reads.get();
        for _ in 0..100 {
            app.best_score();
        }
        app.advance();
        assert_eq!(reads.get(), after_session);
    }
}
