//! Render error types.

use std::fmt;

/// Fatal expansion failure: a directive referenced a variable that was never
/// assigned. Surfaced through `anyhow` and matched at the binary boundary
/// with `downcast_ref`.
#[derive(Debug)]
pub struct UndefinedVariableError {
    pub name: String,
}

impl fmt::Display for UndefinedVariableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "template references undefined variable '{}'", self.name)
    }
}

impl std::error::Error for UndefinedVariableError {}
