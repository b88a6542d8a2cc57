//! Enum use-site normalizer.
//!
//! PostgreSQL column definitions restate the column name when applying an
//! enum: `role: roleEnum("role")`. With mysql-core the enum declaration
//! already carries identity, so the use-site is the bare identifier:
//! `role: roleEnum`. Any identifier ending in `Enum` followed by a single
//! double-quoted string argument is collapsed. Purely syntactic; an
//! identifier that merely happens to end in `Enum` is an accepted risk.

use regex::Regex;

use crate::rewrite::Rewritten;

/// Drop the string argument from enum invocations.
///
/// Declarations like `mysqlEnum("role", [...])` are not touched: the
/// closing paren must immediately follow the string argument.
pub fn rewrite_enum_refs(source: &str) -> Rewritten {
    let pattern = Regex::new(r#"\b(\w+Enum)\("[^"]+"\)"#).unwrap();
    let changes = pattern.find_iter(source).count();
    if changes == 0 {
        return Rewritten::unchanged(source);
    }
    Rewritten {
        text: pattern.replace_all(source, "${1}").into_owned(),
        changes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_enum_invocation_collapsed() {
        let out = rewrite_enum_refs(r#"  role: roleEnum("role").default("user"),"#);
        assert_eq!(out.text, r#"  role: roleEnum.default("user"),"#);
        assert_eq!(out.changes, 1);
    }

    #[test]
    fn test_non_enum_identifier_untouched() {
        let source = r#"  name: varchar("name", { length: 255 }),"#;
        let out = rewrite_enum_refs(source);
        assert_eq!(out.text, source);
        assert_eq!(out.changes, 0);
    }

    #[test]
    fn test_declaration_with_values_untouched() {
        let source = r#"export const roleEnum = mysqlEnum("role", ["user", "admin"]);"#;
        let out = rewrite_enum_refs(source);
        assert_eq!(out.text, source);
        assert_eq!(out.changes, 0);
    }

    #[test]
    fn test_idempotent_after_rewrite() {
        let first = rewrite_enum_refs(r#"  status: statusEnum("status"),"#);
        let second = rewrite_enum_refs(&first.text);
        assert_eq!(second.text, first.text);
        assert_eq!(second.changes, 0);
    }
}
