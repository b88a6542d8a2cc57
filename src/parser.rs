//! Line parser for Drizzle mutation statements, using nom.
//!
//! Parses single-line call sites such as
//!
//! ```text
//! const [user] = await db.insert(users).values(data).returning();
//! const result = await db.update(orgs).set(data).where(eq(orgs.id, orgId)).returning();
//! ```
//!
//! into [`MutationStmt`] values so the returning-clause rewriter can match
//! on statement shape instead of raw text.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{char, multispace0, multispace1},
    combinator::{map, value},
    error::{Error, ErrorKind},
    multi::many1,
    sequence::delimited,
    IResult,
};

use crate::ast::{Binding, ChainCall, EqFilter, MutationKind, MutationStmt};

/// Parse one source line into a mutation statement, if it is one.
///
/// Returns `None` for anything the grammar does not cover; callers treat
/// those lines as unmatched and leave them untouched.
pub fn parse_mutation_line(line: &str) -> Option<MutationStmt> {
    match mutation_stmt(line.trim()) {
        Ok((rest, stmt)) if rest.trim().is_empty() => Some(stmt),
        _ => None,
    }
}

/// Parse a `return <name>[0];` statement and yield the returned name.
pub fn parse_return_first(line: &str) -> Option<String> {
    match return_first(line.trim()) {
        Ok((rest, name)) if rest.trim().is_empty() => Some(name.to_string()),
        _ => None,
    }
}

/// Parse an `eq(<table>.<column>, <value>)` argument in full.
pub fn parse_eq_filter(args: &str) -> Option<EqFilter> {
    match eq_filter(args.trim()) {
        Ok((rest, filter)) if rest.trim().is_empty() => Some(filter),
        _ => None,
    }
}

/// Parse the complete mutation statement.
fn mutation_stmt(input: &str) -> IResult<&str, MutationStmt> {
    let (input, binding) = binding(input)?;
    let (input, _) = multispace0(input)?;
    let (input, _) = char('=')(input)?;
    let (input, _) = multispace0(input)?;
    let (input, _) = tag("await")(input)?;
    let (input, _) = multispace1(input)?;
    let (input, _) = tag("db.")(input)?;
    let (input, kind) = mutation_kind(input)?;
    let (input, table) = delimited(char('('), identifier, char(')'))(input)?;
    let (input, calls) = many1(chain_call)(input)?;
    let (input, _) = char(';')(input)?;

    let filter = calls
        .iter()
        .find(|c| c.method == "where")
        .and_then(|c| parse_eq_filter(&c.args));

    Ok((
        input,
        MutationStmt {
            binding,
            kind,
            table: table.to_string(),
            calls,
            filter,
        },
    ))
}

/// Parse the `const` binding on the left of the assignment.
fn binding(input: &str) -> IResult<&str, Binding> {
    let (input, _) = tag("const")(input)?;
    let (input, _) = multispace1(input)?;
    alt((
        map(
            delimited(
                char('['),
                delimited(multispace0, identifier, multispace0),
                char(']'),
            ),
            |name: &str| Binding::Destructured(name.to_string()),
        ),
        map(identifier, |name: &str| Binding::Named(name.to_string())),
    ))(input)
}

/// Parse the mutation kind (`insert` or `update`).
fn mutation_kind(input: &str) -> IResult<&str, MutationKind> {
    alt((
        value(MutationKind::Insert, tag("insert")),
        value(MutationKind::Update, tag("update")),
    ))(input)
}

/// Parse an identifier (variable or table name).
fn identifier(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphanumeric() || c == '_' || c == '$')(input)
}

/// Parse one chained call, e.g. `.values(data)`.
fn chain_call(input: &str) -> IResult<&str, ChainCall> {
    let (input, _) = char('.')(input)?;
    let (input, method) = identifier(input)?;
    let (input, args) = balanced_parens(input)?;
    Ok((
        input,
        ChainCall {
            method: method.to_string(),
            args: args.to_string(),
        },
    ))
}

/// Consume a parenthesized argument list, honoring nested parens and
/// string literals, and yield the text between the outer parens.
fn balanced_parens(input: &str) -> IResult<&str, &str> {
    let mut chars = input.char_indices();
    if !matches!(chars.next(), Some((_, '('))) {
        return Err(nom::Err::Error(Error::new(input, ErrorKind::Char)));
    }
    let mut depth = 1usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (i, c) in chars {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' | '`' => quote = Some(c),
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Ok((&input[i + 1..], &input[1..i]));
                }
            }
            _ => {}
        }
    }
    Err(nom::Err::Error(Error::new(input, ErrorKind::TakeUntil)))
}

/// Parse `return <name>[0];`.
fn return_first(input: &str) -> IResult<&str, &str> {
    let (input, _) = tag("return")(input)?;
    let (input, _) = multispace1(input)?;
    let (input, name) = identifier(input)?;
    let (input, _) = tag("[0]")(input)?;
    let (input, _) = char(';')(input)?;
    Ok((input, name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destructured_insert() {
        let stmt =
            parse_mutation_line("const [user] = await db.insert(users).values(data).returning();")
                .unwrap();
        assert_eq!(stmt.binding, Binding::Destructured("user".to_string()));
        assert_eq!(stmt.kind, MutationKind::Insert);
        assert_eq!(stmt.table, "users");
        assert!(stmt.has_call("values"));
        assert!(stmt.has_returning());
        assert_eq!(stmt.filter, None);
    }

    #[test]
    fn test_named_insert() {
        let stmt = parse_mutation_line(
            "  const result = await db.insert(orgs).values({ name, slug }).returning();",
        )
        .unwrap();
        assert_eq!(stmt.binding, Binding::Named("result".to_string()));
        assert_eq!(stmt.table, "orgs");
        assert!(stmt.has_returning());
    }

    #[test]
    fn test_update_with_filter() {
        let stmt = parse_mutation_line(
            "const result = await db.update(orgs).set(data).where(eq(orgs.id, orgId)).returning();",
        )
        .unwrap();
        assert_eq!(stmt.kind, MutationKind::Update);
        assert_eq!(stmt.table, "orgs");
        assert!(stmt.has_call("set"));
        let filter = stmt.filter.unwrap();
        assert_eq!(filter.table, "orgs");
        assert_eq!(filter.column, "id");
        assert_eq!(filter.value, "orgId");
    }

    #[test]
    fn test_non_eq_filter_is_dropped() {
        let stmt = parse_mutation_line(
            "const result = await db.update(orgs).set(data).where(and(eq(orgs.id, orgId), eq(orgs.active, flag))).returning();",
        )
        .unwrap();
        // The where clause is parsed as a chain call, but its argument is
        // not a bare eq() so no filter is extracted.
        assert!(stmt.has_call("where"));
        assert_eq!(stmt.filter, None);
    }

    #[test]
    fn test_nested_parens_and_strings_in_args() {
        let stmt = parse_mutation_line(
            r#"const [row] = await db.insert(logs).values({ msg: "a (nested) paren", at: now() }).returning();"#,
        )
        .unwrap();
        assert_eq!(stmt.table, "logs");
        assert_eq!(stmt.calls[0].method, "values");
        assert_eq!(
            stmt.calls[0].args,
            r#"{ msg: "a (nested) paren", at: now() }"#
        );
    }

    #[test]
    fn test_not_a_mutation() {
        assert_eq!(
            parse_mutation_line("const rows = await db.select().from(users);"),
            None
        );
        assert_eq!(parse_mutation_line("return result[0];"), None);
        assert_eq!(
            parse_mutation_line("const { org } = await db.insert(orgs).values(x).returning();"),
            None
        );
    }

    #[test]
    fn test_trailing_content_rejected() {
        assert_eq!(
            parse_mutation_line(
                "const [u] = await db.insert(users).values(d).returning(); // keep",
            ),
            None
        );
    }

    #[test]
    fn test_return_first() {
        assert_eq!(
            parse_return_first("  return result[0];"),
            Some("result".to_string())
        );
        assert_eq!(parse_return_first("return result[1];"), None);
        assert_eq!(parse_return_first("return result;"), None);
    }

    #[test]
    fn test_eq_filter() {
        let filter = parse_eq_filter("eq(users.id, insertId)").unwrap();
        assert_eq!(filter.table, "users");
        assert_eq!(filter.column, "id");
        assert_eq!(filter.value, "insertId");
        assert_eq!(parse_eq_filter("ne(users.id, insertId)"), None);
        assert_eq!(parse_eq_filter("eq(users.id, insertId), eq(a.b, c)"), None);
    }
}
