//! Structural representation of Drizzle mutation call sites.
//!
//! The returning-clause rewriter parses each candidate line into these
//! types and matches on their shape, instead of pattern-matching raw text.

use serde::{Deserialize, Serialize};

/// Which mutation a call site performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MutationKind {
    Insert,
    Update,
}

/// How the statement's result is bound at the call site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Binding {
    /// `const [user] = await ...`: first row destructured out of the result.
    Destructured(String),
    /// `const result = await ...`: whole result bound to a name.
    Named(String),
}

impl Binding {
    /// The bound identifier, whichever form the binding takes.
    pub fn name(&self) -> &str {
        match self {
            Binding::Destructured(name) | Binding::Named(name) => name,
        }
    }
}

/// One chained method call, e.g. `.values(data)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainCall {
    /// Method name.
    pub method: String,
    /// Raw argument text between the parens, untouched.
    pub args: String,
}

/// An `eq(<table>.<column>, <value>)` filter inside a `.where(...)` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EqFilter {
    /// Table the filtered column belongs to.
    pub table: String,
    /// Filtered column name.
    pub column: String,
    /// Right-hand side, verbatim (a variable name or literal).
    pub value: String,
}

/// A fully parsed single-line mutation statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutationStmt {
    /// Result binding on the left of the `=`.
    pub binding: Binding,
    /// Insert or update.
    pub kind: MutationKind,
    /// Target table identifier, verbatim.
    pub table: String,
    /// Chained calls after `db.insert(...)` / `db.update(...)`, in order.
    pub calls: Vec<ChainCall>,
    /// Equality filter extracted from the first `.where(eq(...))`, if any.
    pub filter: Option<EqFilter>,
}

impl MutationStmt {
    /// Whether the chain contains a call to `method`.
    pub fn has_call(&self, method: &str) -> bool {
        self.calls.iter().any(|c| c.method == method)
    }

    /// Whether the statement carries the `.returning()` clause.
    pub fn has_returning(&self) -> bool {
        self.has_call("returning")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binding_name() {
        assert_eq!(Binding::Destructured("user".to_string()).name(), "user");
        assert_eq!(Binding::Named("result".to_string()).name(), "result");
    }
}
