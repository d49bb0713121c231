//! Type inference for free-form command arguments
//!
//! dwm commands take typed arguments (`view 4`, `setmfact -0.05`), but the
//! CLI only ever sees strings. Tokens that look like numbers are sent as
//! JSON numbers; everything else is sent verbatim as a JSON string.
//!
//! The rules work on ASCII characters only: no locale, no exponent notation,
//! no leading `+`.

use serde::Serialize;
use tracing::warn;

/// How a token will be transmitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentKind {
    Integer,
    Float,
    String,
}

/// Digits, optionally preceded by a single `-`
///
/// A bare `-` passes this check, as does the empty string; `classify`
/// handles both.
pub fn is_signed_integer(token: &str) -> bool {
    token
        .bytes()
        .enumerate()
        .all(|(i, b)| b.is_ascii_digit() || (i == 0 && b == b'-'))
}

/// Digits with at most one inner `.` and an optional leading `-`
///
/// The dot may not be the first or last character.
pub fn is_float(token: &str) -> bool {
    let last = token.len().saturating_sub(1);
    let mut dot_used = false;

    for (i, b) in token.bytes().enumerate() {
        match b {
            b'0'..=b'9' => {}
            b'.' if !dot_used && i != 0 && i != last => dot_used = true,
            b'-' if i == 0 => {}
            _ => return false,
        }
    }

    true
}

/// A non-empty run of ASCII digits, as required for window ids
pub fn is_unsigned_integer(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit())
}

/// Decide how `token` should be transmitted
///
/// Integer is checked before float, so `"12"` is always an integer.
pub fn classify(token: &str) -> ArgumentKind {
    if token.is_empty() {
        ArgumentKind::String
    } else if is_signed_integer(token) {
        ArgumentKind::Integer
    } else if is_float(token) {
        ArgumentKind::Float
    } else {
        ArgumentKind::String
    }
}

/// A command argument with its inferred JSON type
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Argument {
    Integer(i64),
    Float(f64),
    String(String),
}

impl Argument {
    /// Classify `token` and convert it to a typed argument
    ///
    /// Tokens classified as numbers but without a representable value (a
    /// bare `-`, an integer outside the `i64` range) are sent verbatim as
    /// strings.
    pub fn from_token(token: &str) -> Self {
        match classify(token) {
            ArgumentKind::Integer => match token.parse::<i64>() {
                Ok(n) => Self::Integer(n),
                Err(e) => {
                    warn!(
                        token,
                        error = %e,
                        "Integer-like argument out of range, sending as string"
                    );
                    Self::String(token.to_string())
                }
            },
            ArgumentKind::Float => match token.parse::<f64>() {
                Ok(f) if f.is_finite() => Self::Float(f),
                _ => {
                    warn!(token, "Float-like argument has no finite value, sending as string");
                    Self::String(token.to_string())
                }
            },
            ArgumentKind::String => Self::String(token.to_string()),
        }
    }

    #[cfg(test)]
    fn kind(&self) -> ArgumentKind {
        match self {
            Self::Integer(_) => ArgumentKind::Integer,
            Self::Float(_) => ArgumentKind::Float,
            Self::String(_) => ArgumentKind::String,
        }
    }
}

impl From<&str> for Argument {
    fn from(token: &str) -> Self {
        Self::from_token(token)
    }
}
