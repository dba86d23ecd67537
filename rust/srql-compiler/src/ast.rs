//! Backend-agnostic SRQL intermediate representation.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryKind {
    Show,
    Count,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Entity {
    Devices,
    Flows,
    Traps,
    Connections,
    Logs,
    Services,
    Interfaces,
    DeviceUpdates,
    IcmpResults,
    SnmpResults,
    SweepResults,
    Events,
    Pollers,
    CpuMetrics,
    DiskMetrics,
    MemoryMetrics,
    SnmpMetrics,
    OtelTraceSummaries,
    OtelSpansEnriched,
}

impl Entity {
    pub const ALL: [Entity; 19] = [
        Entity::Devices,
        Entity::Flows,
        Entity::Traps,
        Entity::Connections,
        Entity::Logs,
        Entity::Services,
        Entity::Interfaces,
        Entity::DeviceUpdates,
        Entity::IcmpResults,
        Entity::SnmpResults,
        Entity::SweepResults,
        Entity::Events,
        Entity::Pollers,
        Entity::CpuMetrics,
        Entity::DiskMetrics,
        Entity::MemoryMetrics,
        Entity::SnmpMetrics,
        Entity::OtelTraceSummaries,
        Entity::OtelSpansEnriched,
    ];

    /// Resolves entity text case-insensitively, including the short aliases.
    pub fn from_name(raw: &str) -> Option<Self> {
        let normalized = raw.to_ascii_lowercase();
        let entity = match normalized.as_str() {
            "devices" | "device" => Entity::Devices,
            "flows" | "flow" => Entity::Flows,
            "traps" => Entity::Traps,
            "connections" => Entity::Connections,
            "logs" => Entity::Logs,
            "services" | "service" => Entity::Services,
            "interfaces" | "interface" => Entity::Interfaces,
            "device_updates" | "updates" => Entity::DeviceUpdates,
            "icmp_results" => Entity::IcmpResults,
            "snmp_results" => Entity::SnmpResults,
            "sweep_results" | "sweeps" => Entity::SweepResults,
            "events" => Entity::Events,
            "pollers" | "poller" => Entity::Pollers,
            "cpu_metrics" | "cpu" => Entity::CpuMetrics,
            "disk_metrics" | "disk" => Entity::DiskMetrics,
            "memory_metrics" | "memory" => Entity::MemoryMetrics,
            "snmp_metrics" | "snmp" => Entity::SnmpMetrics,
            "otel_trace_summaries" | "trace_summaries" => Entity::OtelTraceSummaries,
            "otel_spans_enriched" | "spans" => Entity::OtelSpansEnriched,
            _ => return None,
        };
        Some(entity)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Entity::Devices => "devices",
            Entity::Flows => "flows",
            Entity::Traps => "traps",
            Entity::Connections => "connections",
            Entity::Logs => "logs",
            Entity::Services => "services",
            Entity::Interfaces => "interfaces",
            Entity::DeviceUpdates => "device_updates",
            Entity::IcmpResults => "icmp_results",
            Entity::SnmpResults => "snmp_results",
            Entity::SweepResults => "sweep_results",
            Entity::Events => "events",
            Entity::Pollers => "pollers",
            Entity::CpuMetrics => "cpu_metrics",
            Entity::DiskMetrics => "disk_metrics",
            Entity::MemoryMetrics => "memory_metrics",
            Entity::SnmpMetrics => "snmp_metrics",
            Entity::OtelTraceSummaries => "otel_trace_summaries",
            Entity::OtelSpansEnriched => "otel_spans_enriched",
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,
    Like,
    Contains,
    In,
    Between,
    IsNull,
    IsNotNull,
}

impl Operator {
    pub fn is_ordering(self) -> bool {
        matches!(
            self,
            Operator::Gt | Operator::Lt | Operator::Ge | Operator::Le | Operator::Between
        )
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::Gt => ">",
            Operator::Lt => "<",
            Operator::Ge => ">=",
            Operator::Le => "<=",
            Operator::Like => "LIKE",
            Operator::Contains => "CONTAINS",
            Operator::In => "IN",
            Operator::Between => "BETWEEN",
            Operator::IsNull => "IS NULL",
            Operator::IsNotNull => "IS NOT NULL",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DateKeyword {
    Today,
    Yesterday,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    String(String),
    Bool(bool),
    Int(i64),
    Float(f64),
    Keyword(DateKeyword),
    /// Operands of `IN` and `BETWEEN`.
    List(Vec<Value>),
    /// Operand of `IS [NOT] NULL`.
    Null,
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Keyword(_) => "keyword",
            Value::List(_) => "list",
            Value::Null => "null",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicalOp {
    None,
    And,
    Or,
}

/// One entry of a condition chain. `logical_op` joins it to the entry before
/// it and is `None` only on the first entry of each chain.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Condition {
    pub predicate: Predicate,
    pub logical_op: LogicalOp,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Predicate {
    Compare(Comparison),
    /// A parenthesised chain, rendered inside `( )`.
    Group { conditions: Vec<Condition> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    /// Field text exactly as written; function names are lower-cased.
    pub field: String,
    pub operator: Operator,
    pub value: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderClause {
    pub field: String,
    pub direction: OrderDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageDirection {
    #[default]
    Next,
    Prev,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub cursor: String,
    pub direction: PageDirection,
    pub mode: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Query {
    pub kind: QueryKind,
    pub entity: Entity,
    pub conditions: Vec<Condition>,
    pub order_by: Vec<OrderClause>,
    pub limit: Option<u64>,
    /// Set by a trailing `LATEST`. Carried for executors; statements are unchanged.
    pub latest: bool,
    pub pagination: Option<Pagination>,
}

/// A field split into its optional function wrapper and argument list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRef<'a> {
    pub function: Option<&'a str>,
    pub args: Vec<&'a str>,
}

impl<'a> FieldRef<'a> {
    pub fn parse(field: &'a str) -> Self {
        if let Some((name, rest)) = field.split_once('(') {
            if let Some(inner) = rest.strip_suffix(')') {
                let args = inner
                    .split(',')
                    .map(str::trim)
                    .filter(|arg| !arg.is_empty())
                    .collect();
                return Self {
                    function: Some(name.trim()),
                    args,
                };
            }
        }

        Self {
            function: None,
            args: vec![field],
        }
    }

    /// The column the field reads from, before any function is applied.
    pub fn column(&self) -> &'a str {
        self.args.first().copied().unwrap_or_default()
    }
}
