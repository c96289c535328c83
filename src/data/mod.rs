mod loader;
mod repository;

pub use loader::{default_questions, load_questions_from_json, LoadError};
pub use repository::QuestionBank;
