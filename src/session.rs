//! The quiz session state machine.
//!
//! A [`QuizController`] owns at most one [`SessionState`]. Every transition is
//! an explicit method call; calls that do not fit the current [`Phase`] are
//! ignored. Timer events are accepted only while their handle is the one the
//! current question started.

use rand::Rng;
use rand::rngs::StdRng;

use crate::config::TimerConfig;
use crate::data::QuestionBank;
use crate::models::{Answer, Difficulty, Question};
use crate::score::{percentage, KeyValueStore, ScoreKeeper, SessionOutcome};
use crate::shuffle::Shuffler;
use crate::timer::{Timer, TimerEvent, TimerHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Questions drawn, waiting for `start`.
    Setup,
    /// Transient: answers are being shuffled and the countdown started.
    Presenting,
    /// Waiting for an answer or for the countdown to expire.
    AwaitingAnswer,
    /// Current question answered or timed out; waiting for `advance`.
    Revealed,
    /// All questions done and the result recorded.
    Complete,
}

/// Feedback sound requested by the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Correct,
    Wrong,
}

/// How the current question ended. `selected` is `None` on timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub selected: Option<usize>,
    pub is_correct: bool,
}

/// Hooks for the presentation layer. Every method defaults to doing nothing.
pub trait SessionObserver {
    fn on_question_presented(&mut self, _question: &Question, _answers: &[Answer]) {}

    fn on_answer_result(&mut self, _selected: &Answer, _is_correct: bool, _explanation: Option<&str>) {}

    fn on_tick(&mut self, _seconds_remaining: u32) {}

    fn on_timeout(&mut self) {}

    fn on_session_complete(&mut self, _outcome: &SessionOutcome) {}

    fn play_tone(&mut self, _tone: Tone) {}
}

impl SessionObserver for () {}

/// State of one session, from setup to completion.
#[derive(Debug, Clone)]
pub struct SessionState {
    category: String,
    difficulty: Difficulty,
    questions: Vec<Question>,
    current_index: usize,
    score: usize,
    time_left: u32,
    phase: Phase,
    answers: Vec<Answer>,
    timer: Option<TimerHandle>,
    last_outcome: Option<AnswerOutcome>,
    best_score: Option<u8>,
    outcome: Option<SessionOutcome>,
}

impl SessionState {
    fn new(
        category: &str,
        difficulty: Difficulty,
        questions: Vec<Question>,
        best_score: Option<u8>,
    ) -> Self {
        Self {
            category: category.to_string(),
            difficulty,
            questions,
            current_index: 0,
            score: 0,
            time_left: 0,
            phase: Phase::Setup,
            answers: Vec::new(),
            timer: None,
            last_outcome: None,
            best_score,
            outcome: None,
        }
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn total(&self) -> usize {
        self.questions.len()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current_index)
    }

    /// Answers of the current question in display order.
    pub fn answers(&self) -> &[Answer] {
        &self.answers
    }

    pub fn score(&self) -> usize {
        self.score
    }

    /// Seconds left on the countdown. Only meaningful in `AwaitingAnswer`.
    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    pub fn active_timer(&self) -> Option<TimerHandle> {
        self.timer
    }

    pub fn last_outcome(&self) -> Option<AnswerOutcome> {
        self.last_outcome
    }

    /// Best percentage on record, as read at setup and updated on completion.
    pub fn best_score(&self) -> Option<u8> {
        self.best_score
    }

    pub fn outcome(&self) -> Option<&SessionOutcome> {
        self.outcome.as_ref()
    }

    pub fn is_last_question(&self) -> bool {
        self.current_index + 1 >= self.questions.len()
    }

    /// 1-based question number and total, for "Question 3 of 10".
    pub fn progress(&self) -> (usize, usize) {
        let total = self.questions.len();
        ((self.current_index + 1).min(total), total)
    }

    pub fn progress_ratio(&self) -> f64 {
        let (number, total) = self.progress();
        if total == 0 {
            0.0
        } else {
            number as f64 / total as f64
        }
    }
}

/// Drives quiz sessions over a question bank.
pub struct QuizController<T, S, R = StdRng> {
    bank: QuestionBank,
    timer: T,
    timer_config: TimerConfig,
    scores: ScoreKeeper<S>,
    shuffler: Shuffler<R>,
    state: Option<SessionState>,
}

impl<T: Timer, S: KeyValueStore, R: Rng> QuizController<T, S, R> {
    pub fn new(
        bank: QuestionBank,
        timer: T,
        timer_config: TimerConfig,
        scores: ScoreKeeper<S>,
        shuffler: Shuffler<R>,
    ) -> Self {
        Self {
            bank,
            timer,
            timer_config,
            scores,
            shuffler,
            state: None,
        }
    }

    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    pub fn timer_mut(&mut self) -> &mut T {
        &mut self.timer
    }

    pub fn timer_config(&self) -> &TimerConfig {
        &self.timer_config
    }

    pub fn scores(&self) -> &ScoreKeeper<S> {
        &self.scores
    }

    pub fn state(&self) -> Option<&SessionState> {
        self.state.as_ref()
    }

    pub fn phase(&self) -> Option<Phase> {
        self.state.as_ref().map(SessionState::phase)
    }

    /// Begin a brand-new session in `Setup`. Any running session is dropped
    /// and its countdown cancelled.
    pub fn configure(&mut self, category: &str, difficulty: Difficulty) {
        self.cancel_timer();

        let drawn = self.bank.select_questions(category, difficulty);
        let questions = self.shuffler.shuffle(drawn);
        let best_score = self.scores.load_best();

        log::info!(
            "Session configured: {}/{} with {} questions",
            category,
            difficulty,
            questions.len()
        );
        self.state = Some(SessionState::new(category, difficulty, questions, best_score));
    }

    /// Configure again with the previous category and difficulty.
    pub fn restart(&mut self) -> bool {
        let Some(state) = self.state.as_ref() else {
            return false;
        };
        let (category, difficulty) = (state.category.clone(), state.difficulty);
        self.configure(&category, difficulty);
        true
    }

    pub fn start(&mut self, observer: &mut dyn SessionObserver) {
        let Some(state) = self.state.as_ref() else {
            log::debug!("start ignored: no session configured");
            return;
        };
        if state.phase != Phase::Setup {
            log::debug!("start ignored in {:?}", state.phase);
            return;
        }

        if state.questions.is_empty() {
            self.complete(observer);
        } else {
            self.present(observer);
        }
    }

    /// Answer the current question with the answer at `index` in display order.
    pub fn submit_answer(&mut self, index: usize, observer: &mut dyn SessionObserver) {
        let Some(state) = self.state.as_mut() else {
            log::debug!("submit_answer ignored: no session configured");
            return;
        };
        if state.phase != Phase::AwaitingAnswer {
            log::debug!("submit_answer ignored in {:?}", state.phase);
            return;
        }
        let Some(answer) = state.answers.get(index) else {
            log::debug!("submit_answer ignored: no answer at index {}", index);
            return;
        };

        if let Some(handle) = state.timer.take() {
            self.timer.cancel(handle);
        }

        let is_correct = answer.is_correct;
        if is_correct {
            state.score += 1;
        }
        state.last_outcome = Some(AnswerOutcome {
            selected: Some(index),
            is_correct,
        });
        state.phase = Phase::Revealed;

        observer.play_tone(if is_correct { Tone::Correct } else { Tone::Wrong });
        let explanation = state.questions[state.current_index].explanation.as_deref();
        observer.on_answer_result(answer, is_correct, explanation);

        self.finish_if_exhausted(observer);
    }

    pub fn handle_timer_event(&mut self, event: TimerEvent, observer: &mut dyn SessionObserver) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        if state.phase != Phase::AwaitingAnswer || state.timer != Some(event.handle()) {
            log::debug!("Discarding stale timer event {:?}", event);
            return;
        }

        match event {
            TimerEvent::Tick { remaining, .. } => {
                state.time_left = remaining;
                observer.on_tick(remaining);
            }
            TimerEvent::Expired { .. } => {
                state.timer = None;
                state.time_left = 0;
                state.last_outcome = Some(AnswerOutcome {
                    selected: None,
                    is_correct: false,
                });
                state.phase = Phase::Revealed;

                observer.play_tone(Tone::Wrong);
                observer.on_timeout();

                self.finish_if_exhausted(observer);
            }
        }
    }

    /// Move from a revealed question to the next one.
    pub fn advance(&mut self, observer: &mut dyn SessionObserver) {
        let Some(state) = self.state.as_mut() else {
            log::debug!("advance ignored: no session configured");
            return;
        };
        if state.phase != Phase::Revealed || state.is_last_question() {
            log::debug!("advance ignored in {:?}", state.phase);
            return;
        }

        state.current_index += 1;
        self.present(observer);
    }

    fn present(&mut self, observer: &mut dyn SessionObserver) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        state.phase = Phase::Presenting;
        state.last_outcome = None;

        let question = &state.questions[state.current_index];
        state.answers = self.shuffler.shuffle(question.answers.clone());
        observer.on_question_presented(question, &state.answers);

        if self.timer_config.enabled {
            state.time_left = self.timer_config.duration_secs;
            state.timer = Some(self.timer.start(self.timer_config.duration_secs));
        } else {
            state.time_left = 0;
            state.timer = None;
        }
        state.phase = Phase::AwaitingAnswer;
    }

    fn finish_if_exhausted(&mut self, observer: &mut dyn SessionObserver) {
        if self.state.as_ref().is_some_and(SessionState::is_last_question) {
            self.complete(observer);
        }
    }

    fn complete(&mut self, observer: &mut dyn SessionObserver) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        if let Some(handle) = state.timer.take() {
            self.timer.cancel(handle);
        }

        let total = state.questions.len();
        let percentage = percentage(state.score, total);
        let is_new_record = self.scores.record_if_best(percentage);
        if is_new_record {
            state.best_score = Some(percentage);
        }

        let outcome = SessionOutcome {
            score: state.score,
            total,
            percentage,
            is_new_record,
        };
        state.current_index = total;
        state.phase = Phase::Complete;
        state.outcome = Some(outcome);

        log::info!(
            "Session complete: {}/{} ({}%){}",
            outcome.score,
            outcome.total,
            outcome.percentage,
            if is_new_record { ", new high score" } else { "" }
        );
        observer.on_session_complete(&outcome);
    }

    fn cancel_timer(&mut self) {
        if let Some(handle) = self.state.as_mut().and_then(|s| s.timer.take()) {
            self.timer.cancel(handle);
        }
    }
}
