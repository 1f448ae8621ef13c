//! Literal tokens to typed values.

use serde::{Deserialize, Serialize};

use crate::error::BuildError;
use crate::location::NodeLocation;
use crate::types::Type;

/// An immutable literal value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Literal {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Boolean(bool),
    String(String),
}

impl Literal {
    pub fn ty(&self) -> Type {
        match self {
            Literal::Int(_) => Type::Int,
            Literal::Long(_) => Type::Long,
            Literal::Float(_) => Type::Float,
            Literal::Double(_) => Type::Double,
            Literal::Boolean(_) => Type::Boolean,
            Literal::String(_) => Type::String,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Literal::String(value) => Some(value),
            _ => None,
        }
    }
}

/// Lexical category of a literal token, as reported by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiteralKind {
    Int,
    Long,
    Float,
    Double,
    String,
    Boolean,
    Null,
}

/// Converts the raw token text of a literal into a value.
pub fn parse_literal(
    kind: LiteralKind,
    text: &str,
    location: &NodeLocation,
) -> Result<Literal, BuildError> {
    match kind {
        LiteralKind::Int => text
            .parse::<i32>()
            .map(Literal::Int)
            .map_err(|_| malformed("integer", text, location)),
        LiteralKind::Long => strip_suffix(text, 'l')
            .parse::<i64>()
            .map(Literal::Long)
            .map_err(|_| malformed("long", text, location)),
        LiteralKind::Float => strip_suffix(text, 'f')
            .parse::<f32>()
            .map(Literal::Float)
            .map_err(|_| malformed("float", text, location)),
        LiteralKind::Double => strip_suffix(text, 'd')
            .parse::<f64>()
            .map(Literal::Double)
            .map_err(|_| malformed("double", text, location)),
        LiteralKind::String => Ok(Literal::String(text.to_string())),
        LiteralKind::Boolean => Ok(Literal::Boolean(text.eq_ignore_ascii_case("true"))),
        LiteralKind::Null => Err(BuildError::source(
            "null values are not supported",
            location,
        )),
    }
}

/// Drops a one-letter type suffix such as the `L` in `10L`.
fn strip_suffix(text: &str, suffix: char) -> &str {
    text.strip_suffix(suffix)
        .or_else(|| text.strip_suffix(suffix.to_ascii_uppercase()))
        .unwrap_or(text)
}

fn malformed(what: &str, text: &str, location: &NodeLocation) -> BuildError {
    BuildError::source(format!("malformed {what} literal '{text}'"), location)
}

/// Returns the text between the first pair of backticks in `token`.
///
/// Nested backticks are not recognized.
pub fn template_text(token: &str) -> Option<&str> {
    let open = token.find('`')?;
    let rest = &token[open + 1..];
    let close = rest.find('`')?;
    Some(&rest[..close])
}
