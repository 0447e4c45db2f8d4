//! Gesture script loading and replay.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tapboard_core::{Board, BoardConfig, ConfigError, Intent, TouchEvent};
use thiserror::Error;

/// Replay errors.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid config {}: {source}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: ConfigError,
    },
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),
}

/// One script step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Touch(TouchEvent),
    Tick(u64),
    Intent(Intent),
}

impl Step {
    /// Feed this step into the board.
    pub fn apply(&self, board: &mut Board) {
        match self {
            Step::Touch(event) => board.handle_touch(*event),
            Step::Tick(time_ms) => board.tick(*time_ms),
            Step::Intent(intent) => board.apply_intent(intent.clone()),
        }
    }
}

/// A JSON array of steps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Script {
    pub steps: Vec<Step>,
}

impl Script {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Read and parse a script file.
    pub fn load(path: &Path) -> Result<Self, ReplayError> {
        let json = read(path)?;
        Self::from_json(&json).map_err(|source| ReplayError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Read and validate a board configuration file.
pub fn load_config(path: &Path) -> Result<BoardConfig, ReplayError> {
    let json = read(path)?;
    BoardConfig::from_json(&json).map_err(|source| ReplayError::Config {
        path: path.to_path_buf(),
        source,
    })
}

fn read(path: &Path) -> Result<String, ReplayError> {
    std::fs::read_to_string(path).map_err(|source| ReplayError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Run every step, calling `after_step` once each step has been applied.
pub fn replay<F>(board: &mut Board, script: &Script, mut after_step: F) -> Result<(), ReplayError>
where
    F: FnMut(usize, &Board) -> Result<(), ReplayError>,
{
    for (index, step) in script.steps.iter().enumerate() {
        log::trace!("Step {index}: {step:?}");
        step.apply(board);
        after_step(index, board)?;
    }
    Ok(())
}

/// Pretty JSON of the board's current snapshot.
pub fn snapshot_json(board: &Board) -> Result<String, ReplayError> {
    Ok(serde_json::to_string_pretty(&board.snapshot())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    const TAP_SCRIPT: &str = r#"[
        {"intent": {"type": "add_rectangle"}},
        {"intent": {"type": "add_ellipse"}},
        {"touch": {"pointer": 1, "phase": "down", "position": {"x": 110.0, "y": 190.0}, "time_ms": 0}},
        {"touch": {"pointer": 1, "phase": "up", "position": {"x": 110.0, "y": 190.0}, "time_ms": 40}},
        {"tick": 100}
    ]"#;

    #[test]
    fn test_parse_steps() {
        let script = Script::from_json(TAP_SCRIPT).unwrap();
        assert_eq!(script.len(), 5);
        assert_eq!(script.steps[0], Step::Intent(Intent::AddRectangle));
        assert_eq!(script.steps[4], Step::Tick(100));
        assert!(matches!(script.steps[2], Step::Touch(_)));
    }

    #[test]
    fn test_replay_tap_selects_rectangle() {
        let script = Script::from_json(TAP_SCRIPT).unwrap();
        let mut board = Board::default();
        let mut seen = 0;
        replay(&mut board, &script, |_, _| {
            seen += 1;
            Ok(())
        })
        .unwrap();
        assert_eq!(seen, 5);
        let snapshot = board.snapshot();
        assert_eq!(snapshot.selected_id, Some(snapshot.shapes[0].id()));
    }

    #[test]
    fn test_load_script_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("script.json");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(TAP_SCRIPT.as_bytes()).unwrap();

        let script = Script::load(&path).unwrap();
        assert_eq!(script.len(), 5);
    }

    #[test]
    fn test_missing_script() {
        let dir = tempdir().unwrap();
        let result = Script::load(&dir.path().join("nope.json"));
        assert!(matches!(result, Err(ReplayError::Io { .. })));
    }

    #[test]
    fn test_malformed_script() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"[{"swipe": 3}]"#).unwrap();
        let result = Script::load(&path);
        assert!(matches!(result, Err(ReplayError::Parse { .. })));
    }

    #[test]
    fn test_load_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"gestures": {"long_press_ms": 400}}"#).unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.gestures.long_press_ms, 400);

        std::fs::write(&path, r#"{"camera": {"min_zoom": -1.0}}"#).unwrap();
        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, ReplayError::Config { .. }));
        assert!(err.to_string().contains("config.json"));
    }

    #[test]
    fn test_snapshot_json() {
        let mut board = Board::default();
        board.apply_intent(Intent::AddText);
        let json = snapshot_json(&board).unwrap();
        assert!(json.contains("\"kind\": \"text\""));
        assert!(json.contains("\"select_mode\": false"));
    }
}
