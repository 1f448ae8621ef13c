use std::fmt;

use serde::{Deserialize, Serialize};

/// Position of a node in the source file it was built from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeLocation {
    pub file: String,
    pub line: u32,
}

impl NodeLocation {
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        NodeLocation {
            file: file.into(),
            line,
        }
    }
}

impl fmt::Display for NodeLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}
