//! Rewrite stages for the PostgreSQL → MySQL port.
//!
//! Each stage takes whole-file text and returns a [`Rewritten`] outcome.
//! Stages are applied as an ordered list of passes, each a full traversal
//! of the source; none of them keeps state between files.

pub mod constraints;
pub mod enums;
pub mod returning;
pub mod schema;

/// Outcome of applying one rewrite stage to a source unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewritten {
    /// The rewritten file text.
    pub text: String,
    /// Number of rewrites performed.
    pub changes: usize,
}

impl Rewritten {
    /// An outcome that left the source untouched.
    pub fn unchanged(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            changes: 0,
        }
    }
}
