use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::models::Question;

const EMBEDDED_BANK: &str = include_str!("../../data/questions.json");

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Load a question bank from a JSON array on disk.
///
/// An empty array is a valid bank; every selection from it is simply empty.
pub fn load_questions_from_json<P: AsRef<Path>>(path: P) -> Result<Vec<Question>, LoadError> {
    let path = path.as_ref();

    let json_content = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let questions = parse_questions(&json_content, &path.display().to_string())?;
    log::info!("Loaded {} questions from {}", questions.len(), path.display());
    Ok(questions)
}

/// The bank compiled into the binary.
pub fn default_questions() -> Result<Vec<Question>, LoadError> {
    parse_questions(EMBEDDED_BANK, "embedded question bank")
}

fn parse_questions(json: &str, origin: &str) -> Result<Vec<Question>, LoadError> {
    serde_json::from_str(json).map_err(|source| LoadError::Parse {
        origin: origin.to_string(),
        source,
    })
}
