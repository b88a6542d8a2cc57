//! Schema dialect mapper: pg-core → mysql-core vocabulary.
//!
//! Rewrites a Drizzle schema file from PostgreSQL idioms to MySQL ones:
//! the import path, enum/table declaration calls, column type
//! constructors, and the identity-primary-key idiom. Rules run in a fixed
//! order: `integer(` → `int(` must precede the identity rewrite, and the
//! canonical import rewrite runs last so it sees the mysql-core path.

use regex::Regex;

use crate::rewrite::Rewritten;

/// Source-dialect import path, replaced wholesale.
const PG_IMPORT_PATH: &str = r#"from "drizzle-orm/pg-core""#;
/// Target-dialect import path.
const MYSQL_IMPORT_PATH: &str = r#"from "drizzle-orm/mysql-core""#;
/// Canonical mysql-core import emitted once the schema is converted.
/// Assumes the file carries at most one such import statement.
const MYSQL_IMPORT: &str = r#"import { boolean, int, json, decimal, mysqlEnum, mysqlTable, text, timestamp, varchar, date, time, float } from "drizzle-orm/mysql-core";"#;

/// Token-level mapper from pg-core to mysql-core vocabulary.
pub struct SchemaMapper {
    enum_decl: Regex,
    table_decl: Regex,
    integer_ty: Regex,
    identity_pk: Regex,
    identity_pk_rev: Regex,
    numeric_ty: Regex,
    real_ty: Regex,
    import_line: Regex,
}

impl Default for SchemaMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaMapper {
    /// Create a mapper with the full pg-core → mysql-core rule set.
    pub fn new() -> Self {
        Self {
            enum_decl: Regex::new(r"\bpgEnum\b").unwrap(),
            table_decl: Regex::new(r"\bpgTable\b").unwrap(),
            integer_ty: Regex::new(r"\binteger\(").unwrap(),
            identity_pk: Regex::new(
                r"int\(([^)]+)\)\.primaryKey\(\)\.generatedAlwaysAsIdentity\(\)",
            )
            .unwrap(),
            identity_pk_rev: Regex::new(
                r"int\(([^)]+)\)\.generatedAlwaysAsIdentity\(\)\.primaryKey\(\)",
            )
            .unwrap(),
            numeric_ty: Regex::new(r"\bnumeric\(").unwrap(),
            real_ty: Regex::new(r"\breal\(").unwrap(),
            import_line: Regex::new(r#"import \{[^}]+\} from "drizzle-orm/mysql-core";"#).unwrap(),
        }
    }

    /// Apply every mapping rule in order and return the rewritten unit.
    pub fn rewrite(&self, source: &str) -> Rewritten {
        let mut changes = 0;

        // Import path first, so the canonical import rule below matches.
        changes += source.matches(PG_IMPORT_PATH).count();
        let text = source.replace(PG_IMPORT_PATH, MYSQL_IMPORT_PATH);

        let text = apply(&self.enum_decl, "mysqlEnum", &text, &mut changes);
        let text = apply(&self.table_decl, "mysqlTable", &text, &mut changes);
        let text = apply(&self.integer_ty, "int(", &text, &mut changes);

        // Identity primary keys, both documented call orders. The output
        // no longer matches either pattern, so the rule cannot re-fire.
        let canonical = "int(${1}).autoincrement().primaryKey()";
        let text = apply(&self.identity_pk, canonical, &text, &mut changes);
        let text = apply(&self.identity_pk_rev, canonical, &text, &mut changes);

        let text = apply(&self.numeric_ty, "decimal(", &text, &mut changes);
        let text = apply(&self.real_ty, "float(", &text, &mut changes);

        // Replace the import list wholesale with the canonical set, unless
        // it is already canonical (keeps re-runs a no-op).
        let text = match self.import_line.find(&text) {
            Some(m) if m.as_str() != MYSQL_IMPORT => {
                changes += 1;
                self.import_line.replace(&text, MYSQL_IMPORT).into_owned()
            }
            _ => text,
        };

        Rewritten { text, changes }
    }
}

/// Rewrite a schema source unit with the default rule set.
pub fn rewrite_schema(source: &str) -> Rewritten {
    SchemaMapper::new().rewrite(source)
}

/// Apply one token rule as a full traversal, counting matches.
fn apply(pattern: &Regex, replacement: &str, source: &str, changes: &mut usize) -> String {
    *changes += pattern.find_iter(source).count();
    pattern.replace_all(source, replacement).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PG_SCHEMA: &str = r#"import { integer, numeric, pgEnum, pgTable, real, text } from "drizzle-orm/pg-core";

export const roleEnum = pgEnum("role", ["user", "admin"]);

export const users = pgTable("users", {
  id: integer("id").primaryKey().generatedAlwaysAsIdentity(),
  score: numeric("score"),
  ratio: real("ratio"),
});
"#;

    #[test]
    fn test_full_conversion_leaves_no_source_tokens() {
        let out = rewrite_schema(PG_SCHEMA);
        for token in ["pg-core", "pgEnum", "pgTable", "integer(", "numeric(", "real("] {
            assert!(!out.text.contains(token), "source token left: {token}");
        }
        assert!(out.text.contains("mysqlTable"));
        assert!(out.text.contains("mysqlEnum"));
        assert!(out.text.contains("decimal(\"score\")"));
        assert!(out.text.contains("float(\"ratio\")"));
        assert!(out.text.contains(MYSQL_IMPORT));
        // path(1) + pgEnum(2: import + decl) + pgTable(2) + integer(1)
        // + identity(1) + numeric(1) + real(1) + import list(1)
        assert_eq!(out.changes, 10);
    }

    #[test]
    fn test_identity_both_orders_map_to_canonical() {
        let a = rewrite_schema(r#"id: integer("id").primaryKey().generatedAlwaysAsIdentity(),"#);
        let b = rewrite_schema(r#"id: integer("id").generatedAlwaysAsIdentity().primaryKey(),"#);
        assert_eq!(a.text, r#"id: int("id").autoincrement().primaryKey(),"#);
        assert_eq!(a.text, b.text);
    }

    #[test]
    fn test_identity_rewrite_does_not_refire() {
        let converted = r#"id: int("id").autoincrement().primaryKey(),"#;
        let out = rewrite_schema(converted);
        assert_eq!(out.text, converted);
        assert_eq!(out.changes, 0);
    }

    #[test]
    fn test_second_run_is_a_noop() {
        let first = rewrite_schema(PG_SCHEMA);
        let second = rewrite_schema(&first.text);
        assert_eq!(second.text, first.text);
        assert_eq!(second.changes, 0);
    }

    #[test]
    fn test_word_boundaries_protect_longer_identifiers() {
        let source = "const integerish = pgTableish(realm); myreal(x); numericValue(1);";
        let out = rewrite_schema(source);
        assert_eq!(out.text, source);
        assert_eq!(out.changes, 0);
    }

    #[test]
    fn test_import_list_replaced_wholesale() {
        let source = r#"import { integer, pgTable } from "drizzle-orm/pg-core";"#;
        let out = rewrite_schema(source);
        assert_eq!(out.text, MYSQL_IMPORT);
    }

    #[test]
    fn test_canonical_import_not_counted_again() {
        let out = rewrite_schema(MYSQL_IMPORT);
        assert_eq!(out.text, MYSQL_IMPORT);
        assert_eq!(out.changes, 0);
    }
}
