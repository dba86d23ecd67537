use crate::{
    ast::{FieldRef, Query, QueryKind},
    schema::{self, ColumnType},
};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VizMeta {
    pub columns: Vec<ColumnMeta>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub suggestions: Vec<VizSuggestion>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnMeta {
    pub name: String,
    #[serde(rename = "type")]
    pub col_type: ColumnType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semantic: Option<ColumnSemantic>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnSemantic {
    Id,
    Time,
    Value,
    Label,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VizSuggestion {
    pub kind: VizKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VizKind {
    Stat,
    Table,
    Timeseries,
}

pub(super) fn meta_for(query: &Query) -> VizMeta {
    if query.kind == QueryKind::Count {
        return VizMeta {
            columns: vec![col("count", ColumnType::Int)],
            suggestions: vec![VizSuggestion {
                kind: VizKind::Stat,
                x: None,
                y: Some("count".to_string()),
            }],
        };
    }

    let columns: Vec<ColumnMeta> = schema::columns(query.entity)
        .iter()
        .map(|(name, ty)| col(name, *ty))
        .collect();

    let mut suggestions = vec![VizSuggestion {
        kind: VizKind::Table,
        x: None,
        y: None,
    }];

    // Ordered by time with a numeric value column: plottable as a series.
    let time_order = query.order_by.first().and_then(|clause| {
        let column = FieldRef::parse(&clause.field).column().to_ascii_lowercase();
        matches!(
            schema::column_type(query.entity, &column),
            Some(ColumnType::Timestamptz)
        )
        .then_some(column)
    });
    let value_column = columns
        .iter()
        .find(|meta| meta.semantic == Some(ColumnSemantic::Value));
    if let (Some(x), Some(value)) = (time_order, value_column) {
        suggestions.push(VizSuggestion {
            kind: VizKind::Timeseries,
            x: Some(x),
            y: Some(value.name.clone()),
        });
    }

    VizMeta {
        columns,
        suggestions,
    }
}

fn col(name: &str, col_type: ColumnType) -> ColumnMeta {
    ColumnMeta {
        name: name.to_string(),
        col_type,
        semantic: semantic_for(name, col_type),
    }
}

fn semantic_for(name: &str, col_type: ColumnType) -> Option<ColumnSemantic> {
    match (name, col_type) {
        (_, ColumnType::Timestamptz) => Some(ColumnSemantic::Time),
        ("count", _) | (_, ColumnType::Float) => Some(ColumnSemantic::Value),
        ("id", _) => Some(ColumnSemantic::Id),
        (name, _) if name.ends_with("_id") => Some(ColumnSemantic::Id),
        ("hostname" | "name" | "service_name" | "if_name", _) => Some(ColumnSemantic::Label),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser;

    #[test]
    fn count_queries_suggest_a_stat() {
        let meta = meta_for(&parser::parse("count devices").unwrap());
        assert_eq!(meta.columns.len(), 1);
        assert_eq!(meta.suggestions[0].kind, VizKind::Stat);
    }

    #[test]
    fn metrics_ordered_by_time_suggest_a_series() {
        let meta = meta_for(
            &parser::parse("show cpu_metrics order by timestamp desc limit 100").unwrap(),
        );
        let kinds: Vec<VizKind> = meta.suggestions.iter().map(|s| s.kind).collect();
        assert_eq!(kinds, vec![VizKind::Table, VizKind::Timeseries]);
        assert_eq!(meta.suggestions[1].y.as_deref(), Some("usage_percent"));
    }

    #[test]
    fn inventory_queries_suggest_a_table() {
        let meta = meta_for(&parser::parse("show devices order by last_seen").unwrap());
        let kinds: Vec<VizKind> = meta.suggestions.iter().map(|s| s.kind).collect();
        assert_eq!(kinds, vec![VizKind::Table]);
        let device_id = &meta.columns[0];
        assert_eq!(device_id.semantic, Some(ColumnSemantic::Id));
    }
}
