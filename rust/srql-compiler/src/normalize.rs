//! Response shaping contract for raw result rows.
//!
//! Generated statements keep stable column names; this layer only adds legacy
//! alias keys on top of them. Source keys are never renamed or removed.

use crate::ast::Entity;
use serde_json::{Map, Value};

pub trait RowNormalizer: Send + Sync {
    fn normalize(&self, entity: Entity, row: &mut Map<String, Value>);

    fn normalize_rows(&self, entity: Entity, rows: &mut [Map<String, Value>]) {
        for row in rows {
            self.normalize(entity, row);
        }
    }
}

/// Fixed per-entity alias table.
#[derive(Debug, Clone, Copy, Default)]
pub struct AliasNormalizer;

impl AliasNormalizer {
    pub fn aliases(entity: Entity) -> &'static [(&'static str, &'static str)] {
        match entity {
            Entity::Devices => &[
                ("device_id", "uid"),
                ("first_seen", "first_seen_time"),
                ("last_seen", "last_seen_time"),
            ],
            Entity::SweepResults => &[("available", "is_available")],
            Entity::DeviceUpdates => &[("available", "is_available")],
            _ => &[],
        }
    }
}

impl RowNormalizer for AliasNormalizer {
    fn normalize(&self, entity: Entity, row: &mut Map<String, Value>) {
        for (source, alias) in Self::aliases(entity) {
            if row.contains_key(*alias) {
                continue;
            }
            if let Some(value) = row.get(*source).cloned() {
                row.insert((*alias).to_string(), value);
            }
        }
    }
}
