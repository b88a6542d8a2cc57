//! Returning-clause rewriter for data-access files.
//!
//! Drizzle's MySQL driver does not support `.returning()` on insert and
//! update statements. Each supported call-site shape is rewritten into the
//! same statement without the clause plus a follow-up select that reads
//! the affected row back out, so callers keep getting the row they need.
//!
//! The scan is line-by-line with one line of lookahead. Candidate lines
//! are parsed into [`MutationStmt`](crate::ast::MutationStmt) trees and
//! classified by shape; the bare-discard rule is the textual fallback for
//! statements the grammar does not cover. Detection order matters: first
//! match wins, and the scan resumes after the lines a rewrite consumed.
//! Call sites that fit no shape are left untouched; the pass reports them
//! through [`ReturningOutcome::residual`].

use crate::ast::{Binding, MutationKind};
use crate::parser::{parse_mutation_line, parse_return_first};

/// The unsupported clause, as it appears at call sites.
const RETURNING_CALL: &str = ".returning()";
/// Token counted by the residual check (catches argument-carrying forms too).
const RETURNING_TOKEN: &str = ".returning(";

/// Outcome of a returning-clause pass, including clauses left behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturningOutcome {
    /// The rewritten file text.
    pub text: String,
    /// Call sites rewritten.
    pub changes: usize,
    /// `.returning(` occurrences still present after the pass.
    pub residual: usize,
}

/// A classified call site: the shape plus everything the rewrite needs.
#[derive(Debug)]
enum CallSite {
    /// `const [user] = await db.insert(users).values(...).returning();`
    DestructuredInsert { name: String, table: String },
    /// `const result = await db.insert(...).returning();` + `return result[0];`
    NamedInsert {
        name: String,
        table: String,
        ret: String,
    },
    /// `const result = await db.update(t).set(...).where(eq(t.id, v)).returning();`
    /// + `return result[0];`
    ScopedUpdate {
        table: String,
        id_var: String,
        ret: String,
    },
    /// `.returning();` on a statement whose result is never bound.
    Discard,
}

/// Rewrite every supported `.returning()` call site in a source unit.
pub fn rewrite_returning(source: &str) -> ReturningOutcome {
    let lines: Vec<&str> = source.split_inclusive('\n').collect();
    let mut out = String::with_capacity(source.len() + 256);
    let mut changes = 0;
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        if !line.contains(RETURNING_CALL) {
            out.push_str(line);
            i += 1;
            continue;
        }
        let next = lines.get(i + 1).copied();
        match classify(line, next) {
            Some(CallSite::DestructuredInsert { name, table }) => {
                let indent = leading_indent(line);
                let stmt = rebind_to_result(&line.replace(RETURNING_CALL, ""));
                push_line(&mut out, &stmt);
                out.push_str(&format!(
                    "{indent}const insertId = Number(result.insertId);\n"
                ));
                out.push_str(&format!(
                    "{indent}const inserted = await db.select().from({table}).where(eq({table}.id, insertId)).limit(1);\n"
                ));
                out.push_str(&format!("{indent}const {name} = inserted[0];\n"));
                changes += 1;
                i += 1;
            }
            Some(CallSite::NamedInsert { name, table, ret }) => {
                let indent = leading_indent(line);
                push_line(&mut out, &line.replace(RETURNING_CALL, ""));
                out.push_str(&format!(
                    "{indent}const insertId = Number({name}.insertId);\n"
                ));
                out.push_str(&format!(
                    "{indent}const inserted = await db.select().from({table}).where(eq({table}.id, insertId)).limit(1);\n"
                ));
                out.push_str(&ret);
                changes += 1;
                i += 2;
            }
            Some(CallSite::ScopedUpdate {
                table,
                id_var,
                ret,
            }) => {
                let indent = leading_indent(line);
                push_line(&mut out, &line.replace(RETURNING_CALL, ""));
                out.push_str(&format!(
                    "{indent}const updated = await db.select().from({table}).where(eq({table}.id, {id_var})).limit(1);\n"
                ));
                out.push_str(&ret);
                changes += 1;
                i += 2;
            }
            Some(CallSite::Discard) => {
                out.push_str(&line.replace(RETURNING_CALL, ""));
                changes += 1;
                i += 1;
            }
            None => {
                out.push_str(line);
                i += 1;
            }
        }
    }

    let residual = out.matches(RETURNING_TOKEN).count();
    ReturningOutcome {
        text: out,
        changes,
        residual,
    }
}

/// Classify one candidate line (plus one line of lookahead) against the
/// supported call-site shapes. Detection order matters: first match wins.
fn classify(line: &str, next: Option<&str>) -> Option<CallSite> {
    if let Some(stmt) = parse_mutation_line(line) {
        if !stmt.has_returning() {
            return None;
        }
        return match (stmt.kind, &stmt.binding) {
            (MutationKind::Insert, Binding::Destructured(name)) if stmt.has_call("values") => {
                Some(CallSite::DestructuredInsert {
                    name: name.clone(),
                    table: stmt.table.clone(),
                })
            }
            (MutationKind::Insert, Binding::Named(name)) if stmt.has_call("values") => {
                let ret = patched_return(next, name, "inserted")?;
                Some(CallSite::NamedInsert {
                    name: name.clone(),
                    table: stmt.table.clone(),
                    ret,
                })
            }
            (MutationKind::Update, Binding::Named(name)) if stmt.has_call("set") => {
                // The re-select must reuse the update's own id filter; a
                // filter on another table or column is not a match.
                let filter = stmt.filter.as_ref()?;
                if filter.table != stmt.table || filter.column != "id" {
                    return None;
                }
                let ret = patched_return(next, name, "updated")?;
                Some(CallSite::ScopedUpdate {
                    table: stmt.table.clone(),
                    id_var: filter.value.clone(),
                    ret,
                })
            }
            _ => None,
        };
    }

    // Fallback: the statement never binds its result, so the clause can
    // simply be dropped. Only fires on full statements (`.returning();`).
    if line.contains(".returning();") && !line.contains("const") {
        return Some(CallSite::Discard);
    }
    None
}

/// Patch the lookahead `return <name>[0];` line to read from the
/// re-selected rows instead of the mutation result.
fn patched_return(next: Option<&str>, name: &str, rows: &str) -> Option<String> {
    let next = next?;
    let returned = parse_return_first(next)?;
    if returned != name {
        return None;
    }
    Some(next.replace(&format!("{name}[0]"), &format!("{rows}[0]")))
}

/// Replace the destructured binding at the start of the statement with a
/// plain `result` binding, preserving everything after it.
fn rebind_to_result(line: &str) -> String {
    match (line.find("const ["), line.find(']')) {
        (Some(start), Some(end)) if end > start => {
            format!("{}const result{}", &line[..start], &line[end + 1..])
        }
        _ => line.to_string(),
    }
}

/// The line's leading whitespace, reused for generated statements.
fn leading_indent(line: &str) -> &str {
    &line[..line.len() - line.trim_start().len()]
}

/// Append a line, making sure it ends with a newline so the follow-up
/// statements inserted after it stay on their own lines.
fn push_line(out: &mut String, line: &str) {
    out.push_str(line);
    if !line.ends_with('\n') {
        out.push('\n');
    }
}
