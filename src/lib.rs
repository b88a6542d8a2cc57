//! # pg2my — port a Drizzle ORM project from PostgreSQL to MySQL
//!
//! Rewrites a Drizzle project's schema and query code from PostgreSQL
//! idioms to their closest MySQL equivalents, stage by stage:
//!
//! | Stage | Rewrites |
//! |-------|----------|
//! | `schema` | pg-core import and type vocabulary → mysql-core |
//! | `enums` | `roleEnum("role")` use-sites → `roleEnum` |
//! | `returning` | `.returning()` call sites → mutation + follow-up select |
//! | `constraints` | over-length constraint names in generated DDL |
//!
//! Stages run in that order; each is a single read-rewrite-write pass
//! over whole-file text and is safe to re-run.
//!
//! ## Quick Example
//!
//! ```
//! use pg2my::prelude::*;
//!
//! let out = rewrite_schema(r#"export const users = pgTable("users", {});"#);
//! assert_eq!(out.text, r#"export const users = mysqlTable("users", {});"#);
//! assert_eq!(out.changes, 1);
//! ```

pub mod ast;
pub mod config;
pub mod engine;
pub mod error;
pub mod parser;
pub mod rewrite;

pub mod prelude {
    pub use crate::ast::*;
    pub use crate::config::{Config, FileSet, ResidualPolicy};
    pub use crate::engine::{run_batch, run_file, FileReport, RunOptions, RunStats, Stage};
    pub use crate::error::*;
    pub use crate::parser::{parse_eq_filter, parse_mutation_line, parse_return_first};
    pub use crate::rewrite::constraints::rewrite_constraints;
    pub use crate::rewrite::enums::rewrite_enum_refs;
    pub use crate::rewrite::returning::{rewrite_returning, ReturningOutcome};
    pub use crate::rewrite::schema::{rewrite_schema, SchemaMapper};
    pub use crate::rewrite::Rewritten;
}
