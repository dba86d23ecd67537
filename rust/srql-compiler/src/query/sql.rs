//! Statement assembly for the SQL-shaped dialects.

use super::Clauses;
use crate::ast::QueryKind;

pub(super) fn assemble(clauses: &Clauses<'_>, count_projection: &str) -> String {
    let projection = match clauses.kind {
        QueryKind::Show => "*",
        QueryKind::Count => count_projection,
    };

    let mut sql = format!("SELECT {projection} FROM {}", clauses.source);
    if let Some(filter) = &clauses.filter {
        sql.push_str(" WHERE ");
        sql.push_str(filter);
    }
    if !clauses.order.is_empty() {
        sql.push_str(" ORDER BY ");
        sql.push_str(&clauses.order.join(", "));
    }
    if let Some(limit) = clauses.limit {
        sql.push_str(&format!(" LIMIT {limit}"));
    }
    if clauses.offset > 0 {
        sql.push_str(&format!(" OFFSET {}", clauses.offset));
    }
    sql
}
