use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Difficulty tier of a question. Each tier caps how many questions a session draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [
        Difficulty::Beginner,
        Difficulty::Intermediate,
        Difficulty::Advanced,
    ];

    /// Maximum number of questions drawn for a session at this tier.
    pub fn question_cap(self) -> usize {
        match self {
            Difficulty::Beginner => 10,
            Difficulty::Intermediate => 7,
            Difficulty::Advanced => 5,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "beginner" => Ok(Difficulty::Beginner),
            "intermediate" => Ok(Difficulty::Intermediate),
            "advanced" => Ok(Difficulty::Advanced),
            other => Err(format!(
                "unknown difficulty '{}', expected beginner, intermediate or advanced",
                other
            )),
        }
    }
}

/// One selectable answer. Correctness lives on the answer itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub text: String,
    #[serde(rename = "correct", default)]
    pub is_correct: bool,
}

impl Answer {
    pub fn new(text: impl Into<String>, is_correct: bool) -> Self {
        Self {
            text: text.into(),
            is_correct,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub category: String,
    pub difficulty: Difficulty,
    #[serde(rename = "question")]
    pub prompt: String,
    pub answers: Vec<Answer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl Question {
    /// Whether any answer is flagged correct. Bank data always has one,
    /// but nothing downstream relies on it.
    pub fn has_correct_answer(&self) -> bool {
        self.answers.iter().any(|a| a.is_correct)
    }
}
