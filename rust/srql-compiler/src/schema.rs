//! Column catalog for every SRQL entity.
//!
//! The translator consults it to reject literals that disagree with a column's
//! type, and the binder uses it to pick a parameter tag. Columns missing from
//! the catalog are passed through untyped.

use crate::ast::Entity;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Text,
    TextArray,
    Bool,
    Int,
    IntArray,
    Float,
    Timestamptz,
    Date,
}

impl ColumnType {
    pub fn as_str(self) -> &'static str {
        match self {
            ColumnType::Text => "text",
            ColumnType::TextArray => "text_array",
            ColumnType::Bool => "bool",
            ColumnType::Int => "int",
            ColumnType::IntArray => "int_array",
            ColumnType::Float => "float",
            ColumnType::Timestamptz => "timestamptz",
            ColumnType::Date => "date",
        }
    }

    /// Element type used when an `IN` list is compared against this column.
    pub fn element(self) -> Self {
        match self {
            ColumnType::TextArray => ColumnType::Text,
            ColumnType::IntArray => ColumnType::Int,
            other => other,
        }
    }
}

use ColumnType::{Bool, Float, Int, Text, TextArray, Timestamptz};

type Columns = &'static [(&'static str, ColumnType)];

const DEVICES: Columns = &[
    ("device_id", Text),
    ("ip", Text),
    ("mac", Text),
    ("hostname", Text),
    ("poller_id", Text),
    ("agent_id", Text),
    ("discovery_sources", TextArray),
    ("is_available", Bool),
    ("first_seen", Timestamptz),
    ("last_seen", Timestamptz),
    ("device_type", Text),
];

const FLOWS: Columns = &[
    ("timestamp", Timestamptz),
    ("src_addr", Text),
    ("dst_addr", Text),
    ("src_port", Int),
    ("dst_port", Int),
    ("protocol", Int),
    ("bytes", Int),
    ("packets", Int),
    ("sampler_address", Text),
];

const TRAPS: Columns = &[
    ("timestamp", Timestamptz),
    ("agent_address", Text),
    ("oid", Text),
    ("severity", Text),
    ("message", Text),
];

const CONNECTIONS: Columns = &[
    ("timestamp", Timestamptz),
    ("src_ip", Text),
    ("dst_ip", Text),
    ("src_port", Int),
    ("dst_port", Int),
    ("protocol", Text),
    ("state", Text),
];

const LOGS: Columns = &[
    ("timestamp", Timestamptz),
    ("trace_id", Text),
    ("span_id", Text),
    ("severity_text", Text),
    ("severity_number", Int),
    ("body", Text),
    ("service_name", Text),
];

const SERVICES: Columns = &[
    ("timestamp", Timestamptz),
    ("poller_id", Text),
    ("agent_id", Text),
    ("service_name", Text),
    ("service_type", Text),
    ("available", Bool),
    ("message", Text),
    ("partition", Text),
];

const INTERFACES: Columns = &[
    ("timestamp", Timestamptz),
    ("device_id", Text),
    ("device_ip", Text),
    ("if_index", Int),
    ("if_name", Text),
    ("if_descr", Text),
    ("if_speed", Int),
    ("if_phys_address", Text),
    ("ip_addresses", TextArray),
    ("if_admin_status", Int),
    ("if_oper_status", Int),
];

const DEVICE_UPDATES: Columns = &[
    ("timestamp", Timestamptz),
    ("device_id", Text),
    ("ip", Text),
    ("mac", Text),
    ("hostname", Text),
    ("discovery_source", Text),
    ("agent_id", Text),
    ("poller_id", Text),
    ("available", Bool),
];

const ICMP_RESULTS: Columns = &[
    ("timestamp", Timestamptz),
    ("poller_id", Text),
    ("agent_id", Text),
    ("target", Text),
    ("response_time_ns", Int),
    ("packet_loss", Float),
    ("available", Bool),
];

const SNMP_RESULTS: Columns = &[
    ("timestamp", Timestamptz),
    ("poller_id", Text),
    ("agent_id", Text),
    ("target", Text),
    ("oid", Text),
    ("value", Text),
];

const SWEEP_RESULTS: Columns = &[
    ("timestamp", Timestamptz),
    ("ip", Text),
    ("mac", Text),
    ("hostname", Text),
    ("available", Bool),
    ("port", Int),
    ("poller_id", Text),
    ("agent_id", Text),
    ("partition", Text),
    ("discovery_source", Text),
];

const EVENTS: Columns = &[
    ("event_timestamp", Timestamptz),
    ("id", Text),
    ("event_type", Text),
    ("source", Text),
    ("subject", Text),
    ("severity", Text),
    ("short_message", Text),
];

const POLLERS: Columns = &[
    ("poller_id", Text),
    ("status", Text),
    ("first_seen", Timestamptz),
    ("last_seen", Timestamptz),
    ("is_healthy", Bool),
    ("agent_count", Int),
    ("checker_count", Int),
];

const CPU_METRICS: Columns = &[
    ("timestamp", Timestamptz),
    ("poller_id", Text),
    ("agent_id", Text),
    ("host_id", Text),
    ("core_id", Int),
    ("usage_percent", Float),
    ("frequency_hz", Float),
];

const DISK_METRICS: Columns = &[
    ("timestamp", Timestamptz),
    ("poller_id", Text),
    ("agent_id", Text),
    ("host_id", Text),
    ("mount_point", Text),
    ("device_name", Text),
    ("used_bytes", Int),
    ("total_bytes", Int),
    ("usage_percent", Float),
];

const MEMORY_METRICS: Columns = &[
    ("timestamp", Timestamptz),
    ("poller_id", Text),
    ("agent_id", Text),
    ("host_id", Text),
    ("used_bytes", Int),
    ("total_bytes", Int),
    ("usage_percent", Float),
];

const SNMP_METRICS: Columns = &[
    ("timestamp", Timestamptz),
    ("poller_id", Text),
    ("device_id", Text),
    ("metric_name", Text),
    ("metric_type", Text),
    ("value", Float),
    ("if_index", Int),
    ("partition", Text),
];

const OTEL_TRACE_SUMMARIES: Columns = &[
    ("timestamp", Timestamptz),
    ("trace_id", Text),
    ("root_span_id", Text),
    ("root_span_name", Text),
    ("root_service_name", Text),
    ("root_span_kind", Int),
    ("duration_ms", Float),
    ("status_code", Int),
    ("service_set", TextArray),
    ("span_count", Int),
    ("error_count", Int),
];

const OTEL_SPANS_ENRICHED: Columns = &[
    ("timestamp", Timestamptz),
    ("trace_id", Text),
    ("span_id", Text),
    ("parent_span_id", Text),
    ("name", Text),
    ("kind", Int),
    ("service_name", Text),
    ("duration_ms", Float),
    ("status_code", Int),
    ("is_root", Bool),
];

/// Catalogued columns of an entity, in display order.
pub fn columns(entity: Entity) -> Columns {
    match entity {
        Entity::Devices => DEVICES,
        Entity::Flows => FLOWS,
        Entity::Traps => TRAPS,
        Entity::Connections => CONNECTIONS,
        Entity::Logs => LOGS,
        Entity::Services => SERVICES,
        Entity::Interfaces => INTERFACES,
        Entity::DeviceUpdates => DEVICE_UPDATES,
        Entity::IcmpResults => ICMP_RESULTS,
        Entity::SnmpResults => SNMP_RESULTS,
        Entity::SweepResults => SWEEP_RESULTS,
        Entity::Events => EVENTS,
        Entity::Pollers => POLLERS,
        Entity::CpuMetrics => CPU_METRICS,
        Entity::DiskMetrics => DISK_METRICS,
        Entity::MemoryMetrics => MEMORY_METRICS,
        Entity::SnmpMetrics => SNMP_METRICS,
        Entity::OtelTraceSummaries => OTEL_TRACE_SUMMARIES,
        Entity::OtelSpansEnriched => OTEL_SPANS_ENRICHED,
    }
}

/// Looks up a column case-insensitively.
pub fn column_type(entity: Entity, column: &str) -> Option<ColumnType> {
    columns(entity)
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(column))
        .map(|(_, ty)| *ty)
}
