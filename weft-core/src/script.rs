//! Event scripts: recorded parser output, one JSON event per line.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{BuildError, ScriptError};
use crate::event::{Event, replay};
use crate::model::CompilationUnit;

pub const SCRIPT_EXTENSION: &str = "events";

#[derive(Debug, Clone, PartialEq)]
pub struct EventScript {
    pub path: PathBuf,
    pub events: Vec<Event>,
}

impl EventScript {
    pub fn replay(&self) -> Result<CompilationUnit, BuildError> {
        replay(self.events.iter().cloned())
    }
}

/// Parses script text. Blank lines and lines starting with `#` are skipped;
/// line numbers in errors are 1-based.
pub fn parse_event_script(text: &str) -> Result<Vec<Event>, ScriptError> {
    let mut events = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let event = serde_json::from_str(line).map_err(|source| ScriptError::Malformed {
            path: None,
            line: index + 1,
            source,
        })?;
        events.push(event);
    }
    Ok(events)
}

pub fn load_event_script(path: impl AsRef<Path>) -> Result<EventScript, ScriptError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let events = parse_event_script(&text).map_err(|err| with_path(err, path))?;
    Ok(EventScript {
        path: path.to_path_buf(),
        events,
    })
}

/// Loads every `*.events` file under `root`, sorted by path. Reported
/// paths are relative to `root`.
pub fn load_event_scripts(root: impl AsRef<Path>) -> Result<Vec<EventScript>, ScriptError> {
    let root = root.as_ref();
    let mut scripts = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(std::io::Error::from)?;
        let path = entry.path();
        if !path.is_file() || path.extension().is_none_or(|ext| ext != SCRIPT_EXTENSION) {
            continue;
        }
        let relative = path.strip_prefix(root).unwrap_or(path).to_path_buf();
        let text = fs::read_to_string(path)?;
        let events = parse_event_script(&text).map_err(|err| with_path(err, &relative))?;
        scripts.push(EventScript {
            path: relative,
            events,
        });
    }
    Ok(scripts)
}

fn with_path(err: ScriptError, path: &Path) -> ScriptError {
    match err {
        ScriptError::Malformed { line, source, .. } => ScriptError::Malformed {
            path: Some(path.to_path_buf()),
            line,
            source,
        },
        other => other,
    }
}
