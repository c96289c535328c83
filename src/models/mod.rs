mod question;

pub use question::{Answer, Difficulty, Question};

/// Which screen the terminal front end is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Setup,
    Quiz,
    Result,
}
