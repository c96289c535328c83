//! Final percentage and best-score persistence.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;

use serde_json::{Map, Value};
use thiserror::Error;

/// Key under which the best percentage is stored.
pub const HIGH_SCORE_KEY: &str = "quizHighScore";

/// Percentage at or above which a finished session is celebrated.
pub const CELEBRATION_THRESHOLD: u8 = 80;

/// `round(score / total * 100)`, rounding halves up. Zero when `total` is zero.
pub fn percentage(score: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let score = score.min(total) as u64;
    let total = total as u64;
    ((score * 200 + total) / (total * 2)) as u8
}

/// Result of a finished session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOutcome {
    pub score: usize,
    pub total: usize,
    pub percentage: u8,
    pub is_new_record: bool,
}

impl SessionOutcome {
    pub fn should_celebrate(&self) -> bool {
        self.percentage >= CELEBRATION_THRESHOLD || self.is_new_record
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{} does not contain a JSON object", path.display())]
    NotAnObject { path: PathBuf },
}

/// Minimal get/set-by-key persistence.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;
    fn set(&mut self, key: &str, value: Value) -> Result<(), StoreError>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: HashMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(key: &str, value: Value) -> Self {
        let mut store = Self::new();
        store.values.insert(key.to_string(), value);
        store
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}

/// Stores all keys in one JSON object file. A missing file reads as empty.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<data dir>/quiz-session/store.json`, if the platform has a data dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_dir().map(|dir| dir.join("quiz-session").join("store.json"))
    }

    fn read_all(&self) -> Result<Map<String, Value>, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        if content.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str(&content) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(StoreError::NotAnObject {
                path: self.path.clone(),
            }),
            Err(source) => Err(StoreError::Parse {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.read_all()?.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), StoreError> {
        let mut map = self.read_all()?;
        map.insert(key.to_string(), value);

        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }

        let json = serde_json::to_string_pretty(&Value::Object(map)).map_err(|source| {
            StoreError::Parse {
                path: self.path.clone(),
                source,
            }
        })?;
        fs::write(&self.path, json).map_err(io_err)
    }
}

/// Reads and updates the best percentage. Store failures never escape: high
/// scores are an extra, not something a session can fail over.
#[derive(Debug)]
pub struct ScoreKeeper<S> {
    store: S,
}

impl<S: KeyValueStore> ScoreKeeper<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The stored best percentage, or `None` if nothing usable is stored.
    pub fn load_best(&self) -> Option<u8> {
        match self.store.get(HIGH_SCORE_KEY) {
            Ok(value) => value.as_ref().and_then(parse_percentage),
            Err(e) => {
                log::warn!("High score unavailable: {}", e);
                None
            }
        }
    }

    /// Persist `percentage` if it beats the stored best (absent counts as 0).
    /// Returns whether the record changed.
    pub fn record_if_best(&mut self, percentage: u8) -> bool {
        let current = match self.store.get(HIGH_SCORE_KEY) {
            Ok(value) => value.as_ref().and_then(parse_percentage).unwrap_or(0),
            Err(e) => {
                log::warn!("High score unavailable, not recording {}%: {}", percentage, e);
                return false;
            }
        };

        if percentage <= current {
            return false;
        }

        match self.store.set(HIGH_SCORE_KEY, Value::from(percentage)) {
            Ok(()) => {
                log::info!("New high score {}% (was {}%)", percentage, current);
                true
            }
            Err(e) => {
                log::warn!("Failed to save high score {}%: {}", percentage, e);
                false
            }
        }
    }
}

/// Accepts numbers and numeric strings; fractions round to the nearest point.
fn parse_percentage(value: &Value) -> Option<u8> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !n.is_finite() || n < 0.0 {
        return None;
    }
    Some(n.round().min(100.0) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<Value>, StoreError> {
            Err(StoreError::NotAnObject {
                path: PathBuf::from("broken"),
            })
        }

        fn set(&mut self, _key: &str, _value: Value) -> Result<(), StoreError> {
            Err(StoreError::NotAnObject {
                path: PathBuf::from("broken"),
            })
        }
    }

    #[test]
    fn test_percentage() {
        assert_eq!(percentage(0, 0), 0);
        assert_eq!(percentage(0, 5), 0);
        assert_eq!(percentage(1, 1), 100);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(1, 8), 13);
        assert_eq!(percentage(7, 10), 70);
    }

    #[test]
    fn test_record_only_on_strict_improvement() {
        let mut keeper = ScoreKeeper::new(MemoryStore::with_value(HIGH_SCORE_KEY, Value::from(70)));
        assert_eq!(keeper.load_best(), Some(70));

        assert!(!keeper.record_if_best(65));
        assert_eq!(keeper.load_best(), Some(70));

        assert!(!keeper.record_if_best(70));

        assert!(keeper.record_if_best(85));
        assert_eq!(keeper.load_best(), Some(85));
    }

    #[test]
    fn test_absent_best_defaults_to_zero() {
        let mut keeper = ScoreKeeper::new(MemoryStore::new());
        assert_eq!(keeper.load_best(), None);
        assert!(!keeper.record_if_best(0));
        assert_eq!(keeper.load_best(), None);
        assert!(keeper.record_if_best(10));
        assert_eq!(keeper.load_best(), Some(10));
    }

    #[test]
    fn test_string_values_are_read() {
        let keeper = ScoreKeeper::new(MemoryStore::with_value(HIGH_SCORE_KEY, Value::from("90")));
        assert_eq!(keeper.load_best(), Some(90));

        let keeper = ScoreKeeper::new(MemoryStore::with_value(HIGH_SCORE_KEY, Value::from("abc")));
        assert_eq!(keeper.load_best(), None);
    }

    #[test]
    fn test_fractional_values_are_rounded() {
        let mut keeper = ScoreKeeper::new(MemoryStore::with_value(HIGH_SCORE_KEY, Value::from(85.5)));
        assert_eq!(keeper.load_best(), Some(86));
        // A lower score must not overwrite the fractional record.
        assert!(!keeper.record_if_best(80));
        assert_eq!(keeper.load_best(), Some(86));

        let keeper = ScoreKeeper::new(MemoryStore::with_value(HIGH_SCORE_KEY, Value::from("72.4")));
        assert_eq!(keeper.load_best(), Some(72));

        let keeper = ScoreKeeper::new(MemoryStore::with_value(HIGH_SCORE_KEY, Value::from(-3)));
        assert_eq!(keeper.load_best(), None);
    }

    #[test]
    fn test_unavailable_store_degrades() {
        let mut keeper = ScoreKeeper::new(BrokenStore);
        assert_eq!(keeper.load_best(), None);
        assert!(!keeper.record_if_best(100));
    }

    #[test]
    fn test_json_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("store.json");

        let mut keeper = ScoreKeeper::new(JsonFileStore::new(&path));
        assert_eq!(keeper.load_best(), None);
        assert!(keeper.record_if_best(60));

        let reopened = ScoreKeeper::new(JsonFileStore::new(&path));
        assert_eq!(reopened.load_best(), Some(60));

        let content = fs::read_to_string(&path).unwrap();
        let value: Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value[HIGH_SCORE_KEY], Value::from(60));
    }

    #[test]
    fn test_json_file_store_keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, r#"{"darkMode": "true"}"#).unwrap();

        let mut store = JsonFileStore::new(&path);
        store.set(HIGH_SCORE_KEY, Value::from(40)).unwrap();
        assert_eq!(store.get("darkMode").unwrap(), Some(Value::from("true")));
        assert_eq!(store.get(HIGH_SCORE_KEY).unwrap(), Some(Value::from(40)));
    }

    #[test]
    fn test_corrupt_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "[1, 2, 3]").unwrap();

        let mut keeper = ScoreKeeper::new(JsonFileStore::new(&path));
        assert_eq!(keeper.load_best(), None);
        assert!(!keeper.record_if_best(50));
        // The file is left alone.
        assert_eq!(fs::read_to_string(&path).unwrap(), "[1, 2, 3]");
    }

    #[test]
    fn test_should_celebrate() {
        let outcome = SessionOutcome {
            score: 4,
            total: 5,
            percentage: 80,
            is_new_record: false,
        };
        assert!(outcome.should_celebrate());
        assert!(!SessionOutcome { percentage: 60, ..outcome }.should_celebrate());
        assert!(SessionOutcome { percentage: 60, is_new_record: true, ..outcome }.should_celebrate());
    }
}
