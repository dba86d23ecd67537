//! Statement assembly for the document dialect (AQL).

use super::Clauses;
use crate::ast::QueryKind;

pub(super) fn assemble(clauses: &Clauses<'_>, variable: &str, separator: &str) -> String {
    let mut parts = vec![format!("FOR {variable} IN {}", clauses.source)];

    if let Some(filter) = &clauses.filter {
        parts.push(format!("FILTER {filter}"));
    }
    if !clauses.order.is_empty() {
        parts.push(format!("SORT {}", clauses.order.join(", ")));
    }
    if let Some(limit) = clauses.limit {
        if clauses.offset > 0 {
            parts.push(format!("LIMIT {}, {limit}", clauses.offset));
        } else {
            parts.push(format!("LIMIT {limit}"));
        }
    }
    parts.push(format!("RETURN {variable}"));

    let body = parts.join(separator);
    match clauses.kind {
        QueryKind::Show => body,
        QueryKind::Count => format!("RETURN LENGTH(\n{body}\n)"),
    }
}
