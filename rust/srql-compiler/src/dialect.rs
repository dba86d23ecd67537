//! Per-backend dialect tables.
//!
//! Each table is built once per process and never mutated, so translations on
//! any thread read the same data. Adding a backend means adding a table here.

use crate::ast::{DateKeyword, Entity, Operator};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Columnar SQL engine.
    ClickHouse,
    /// Streaming SQL engine; storage objects are read through `table(...)`.
    Proton,
    /// Graph/document engine queried with AQL.
    ArangoDb,
}

impl Backend {
    pub const ALL: [Backend; 3] = [Backend::ClickHouse, Backend::Proton, Backend::ArangoDb];

    pub fn as_str(self) -> &'static str {
        match self {
            Backend::ClickHouse => "clickhouse",
            Backend::Proton => "proton",
            Backend::ArangoDb => "arangodb",
        }
    }

    pub fn dialect(self) -> &'static DialectTable {
        match self {
            Backend::ClickHouse => &CLICKHOUSE,
            Backend::Proton => &PROTON,
            Backend::ArangoDb => &ARANGODB,
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "clickhouse" => Ok(Backend::ClickHouse),
            "proton" | "timeplus" => Ok(Backend::Proton),
            "arangodb" | "arango" => Ok(Backend::ArangoDb),
            other => Err(format!("unsupported backend '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementShape {
    /// `SELECT <projection> FROM <source> [WHERE] [ORDER BY] [LIMIT] [OFFSET]`
    Sql { count_projection: &'static str },
    /// `FOR <var> IN <source> [FILTER] [SORT] [LIMIT] RETURN <var>`, clauses joined by `separator`.
    Document {
        variable: &'static str,
        separator: &'static str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionRewrite {
    /// Rename the function and keep the call shape.
    Call(&'static str),
    /// No native date-of-timestamp: compare `function(field, start, len)`, a
    /// substring of the raw timestamp text, instead.
    DatePrefix {
        function: &'static str,
        start: usize,
        len: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateKeywordStyle {
    /// Emit the backend's own `today()`/`yesterday()` calls.
    Function {
        today: &'static str,
        yesterday: &'static str,
    },
    /// Resolve against the injected clock and emit a `YYYY-MM-DD` literal.
    Literal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderStyle {
    /// `$1`, `$2`, ...
    Dollar,
    /// `@p1`, `@p2`, ...
    At,
}

pub type Binary = fn(&str, &str) -> String;
pub type Ternary = fn(&str, &str, &str) -> String;
pub type Unary = fn(&str) -> String;

pub struct DialectTable {
    pub backend: Backend,
    pub shape: StatementShape,
    pub placeholder: PlaceholderStyle,
    pub date_keywords: DateKeywordStyle,
    /// Reject literals whose type disagrees with the catalogued column type.
    pub strict_types: bool,
    pub and_keyword: &'static str,
    pub or_keyword: &'static str,
    pub list_open: &'static str,
    pub list_close: &'static str,
    field_prefix: &'static str,
    entities: HashMap<Entity, String>,
    functions: HashMap<&'static str, FunctionRewrite>,
    comparisons: HashMap<Operator, &'static str>,
    pub like: Binary,
    pub contains: Binary,
    pub in_list: Binary,
    pub between: Ternary,
    pub is_null: Unary,
    pub is_not_null: Unary,
}

impl fmt::Debug for DialectTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DialectTable")
            .field("backend", &self.backend)
            .field("shape", &self.shape)
            .field("placeholder", &self.placeholder)
            .field("strict_types", &self.strict_types)
            .finish_non_exhaustive()
    }
}

impl DialectTable {
    pub fn storage_object(&self, entity: Entity) -> Option<&str> {
        self.entities.get(&entity).map(String::as_str)
    }

    pub fn function(&self, name: &str) -> Option<FunctionRewrite> {
        self.functions.get(name).copied()
    }

    pub fn comparison(&self, op: Operator) -> Option<&'static str> {
        self.comparisons.get(&op).copied()
    }

    /// Renders a lower-cased column reference.
    pub fn column(&self, name: &str) -> String {
        format!("{}{}", self.field_prefix, name.to_ascii_lowercase())
    }

    pub fn placeholder(&self, index: usize) -> String {
        match self.placeholder {
            PlaceholderStyle::Dollar => format!("${index}"),
            PlaceholderStyle::At => format!("@p{index}"),
        }
    }

    pub fn date_keyword(&self, keyword: DateKeyword) -> Option<&'static str> {
        match self.date_keywords {
            DateKeywordStyle::Function { today, yesterday } => Some(match keyword {
                DateKeyword::Today => today,
                DateKeyword::Yesterday => yesterday,
            }),
            DateKeywordStyle::Literal => None,
        }
    }

    pub fn quote_string(&self, raw: &str) -> String {
        let mut quoted = String::with_capacity(raw.len() + 2);
        quoted.push('\'');
        for ch in raw.chars() {
            match ch {
                '\\' => quoted.push_str("\\\\"),
                '\'' => quoted.push_str("\\'"),
                other => quoted.push(other),
            }
        }
        quoted.push('\'');
        quoted
    }
}

fn sql_comparisons() -> HashMap<Operator, &'static str> {
    HashMap::from([
        (Operator::Eq, "="),
        (Operator::Ne, "!="),
        (Operator::Gt, ">"),
        (Operator::Lt, "<"),
        (Operator::Ge, ">="),
        (Operator::Le, "<="),
    ])
}

fn sql_like(field: &str, value: &str) -> String {
    format!("{field} LIKE {value}")
}

fn sql_contains(field: &str, value: &str) -> String {
    format!("position({field}, {value}) > 0")
}

fn sql_in(field: &str, list: &str) -> String {
    format!("{field} IN {list}")
}

fn sql_between(field: &str, low: &str, high: &str) -> String {
    format!("{field} BETWEEN {low} AND {high}")
}

fn sql_is_null(field: &str) -> String {
    format!("{field} IS NULL")
}

fn sql_is_not_null(field: &str) -> String {
    format!("{field} IS NOT NULL")
}

fn sql_functions(date: &'static str) -> HashMap<&'static str, FunctionRewrite> {
    HashMap::from([
        ("date", FunctionRewrite::Call(date)),
        ("lower", FunctionRewrite::Call("lower")),
        ("upper", FunctionRewrite::Call("upper")),
    ])
}

static CLICKHOUSE: Lazy<DialectTable> = Lazy::new(|| DialectTable {
    backend: Backend::ClickHouse,
    shape: StatementShape::Sql {
        count_projection: "COUNT(*)",
    },
    placeholder: PlaceholderStyle::Dollar,
    date_keywords: DateKeywordStyle::Function {
        today: "today()",
        yesterday: "yesterday()",
    },
    strict_types: true,
    and_keyword: "AND",
    or_keyword: "OR",
    list_open: "(",
    list_close: ")",
    field_prefix: "",
    entities: Entity::ALL
        .iter()
        .map(|entity| (*entity, entity.as_str().to_string()))
        .collect(),
    functions: sql_functions("toDate"),
    comparisons: sql_comparisons(),
    like: sql_like,
    contains: sql_contains,
    in_list: sql_in,
    between: sql_between,
    is_null: sql_is_null,
    is_not_null: sql_is_not_null,
});

static PROTON: Lazy<DialectTable> = Lazy::new(|| DialectTable {
    backend: Backend::Proton,
    shape: StatementShape::Sql {
        count_projection: "COUNT(*)",
    },
    placeholder: PlaceholderStyle::Dollar,
    date_keywords: DateKeywordStyle::Function {
        today: "today()",
        yesterday: "yesterday()",
    },
    strict_types: true,
    and_keyword: "AND",
    or_keyword: "OR",
    list_open: "(",
    list_close: ")",
    field_prefix: "",
    entities: Entity::ALL
        .iter()
        .map(|entity| {
            let object = match entity {
                Entity::Devices => "unified_devices",
                other => other.as_str(),
            };
            (*entity, format!("table({object})"))
        })
        .collect(),
    functions: sql_functions("to_date"),
    comparisons: sql_comparisons(),
    like: sql_like,
    contains: sql_contains,
    in_list: sql_in,
    between: sql_between,
    is_null: sql_is_null,
    is_not_null: sql_is_not_null,
});

/// Collections held in the graph store; metrics and traces live only in the SQL engines.
const ARANGO_COLLECTIONS: [Entity; 12] = [
    Entity::Devices,
    Entity::Flows,
    Entity::Traps,
    Entity::Connections,
    Entity::Services,
    Entity::Interfaces,
    Entity::DeviceUpdates,
    Entity::IcmpResults,
    Entity::SnmpResults,
    Entity::SweepResults,
    Entity::Events,
    Entity::Pollers,
];

static ARANGODB: Lazy<DialectTable> = Lazy::new(|| DialectTable {
    backend: Backend::ArangoDb,
    shape: StatementShape::Document {
        variable: "doc",
        separator: "\n  ",
    },
    placeholder: PlaceholderStyle::At,
    date_keywords: DateKeywordStyle::Literal,
    strict_types: false,
    and_keyword: "AND",
    or_keyword: "OR",
    list_open: "[",
    list_close: "]",
    field_prefix: "doc.",
    entities: ARANGO_COLLECTIONS
        .iter()
        .map(|entity| (*entity, entity.as_str().to_string()))
        .collect(),
    functions: HashMap::from([
        (
            "date",
            FunctionRewrite::DatePrefix {
                function: "SUBSTRING",
                start: 0,
                len: 10,
            },
        ),
        ("lower", FunctionRewrite::Call("LOWER")),
        ("upper", FunctionRewrite::Call("UPPER")),
    ]),
    comparisons: HashMap::from([
        (Operator::Eq, "=="),
        (Operator::Ne, "!="),
        (Operator::Gt, ">"),
        (Operator::Lt, "<"),
        (Operator::Ge, ">="),
        (Operator::Le, "<="),
    ]),
    like: |field, value| format!("LIKE({field}, {value}, true)"),
    contains: |field, value| format!("CONTAINS({field}, {value})"),
    in_list: |field, list| format!("{field} IN {list}"),
    between: |field, low, high| format!("({field} >= {low} AND {field} <= {high})"),
    is_null: |field| format!("{field} == null"),
    is_not_null: |field| format!("{field} != null"),
});
