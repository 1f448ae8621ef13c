use std::path::PathBuf;

use thiserror::Error;

use crate::location::NodeLocation;

/// Fatal failure while folding events into a program tree.
///
/// The first error aborts the build; nothing built so far is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// The event stream or builder usage is inconsistent (stack underflow,
    /// list-count mismatch, unbalanced stacks). Never a user mistake.
    #[error("structural error: {message}{}", at_suffix(.location.as_ref()))]
    Structural {
        message: String,
        location: Option<NodeLocation>,
    },
    /// The program uses a construct this layer rejects.
    #[error("{message} in {location}")]
    Source {
        message: String,
        location: NodeLocation,
    },
}

impl BuildError {
    pub fn structural(message: impl Into<String>, location: Option<&NodeLocation>) -> Self {
        BuildError::Structural {
            message: message.into(),
            location: location.cloned(),
        }
    }

    pub fn source(message: impl Into<String>, location: &NodeLocation) -> Self {
        BuildError::Source {
            message: message.into(),
            location: location.clone(),
        }
    }

    pub fn is_structural(&self) -> bool {
        matches!(self, BuildError::Structural { .. })
    }

    pub fn location(&self) -> Option<&NodeLocation> {
        match self {
            BuildError::Structural { location, .. } => location.as_ref(),
            BuildError::Source { location, .. } => Some(location),
        }
    }
}

fn at_suffix(location: Option<&NodeLocation>) -> String {
    location.map(|l| format!(" at {l}")).unwrap_or_default()
}

/// Failure while loading or replaying an event script.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("failed to read event script: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed event on line {line}{}: {source}", in_suffix(.path.as_ref()))]
    Malformed {
        path: Option<PathBuf>,
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Build(#[from] BuildError),
}

fn in_suffix(path: Option<&PathBuf>) -> String {
    path.map(|p| format!(" of {}", p.display()))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structural_error_mentions_location_when_known() {
        let location = NodeLocation::new("main.bal", 3);
        let err = BuildError::structural("expression stack is empty", Some(&location));
        assert_eq!(
            err.to_string(),
            "structural error: expression stack is empty at main.bal:3"
        );
        assert!(err.is_structural());
    }

    #[test]
    fn structural_error_without_location() {
        let err = BuildError::structural("unbalanced build", None);
        assert_eq!(err.to_string(), "structural error: unbalanced build");
        assert!(err.location().is_none());
    }

    #[test]
    fn source_error_renders_file_and_line() {
        let location = NodeLocation::new("main.bal", 9);
        let err = BuildError::source("unsupported operator '%'", &location);
        assert_eq!(err.to_string(), "unsupported operator '%' in main.bal:9");
        assert!(!err.is_structural());
    }
}
