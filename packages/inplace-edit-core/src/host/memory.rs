//! In-memory connector backing resources with JSON records.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;

use super::Connector;
use crate::error::HostError;
use crate::resource::{record_key, Column, ColumnType, Record, ResourceConfig};

/// Connector keeping every resource's records in memory.
///
/// Records are keyed by the canonical form of their primary key value
/// (see [`record_key`]), per resource id.
#[derive(Debug, Default)]
pub struct MemoryConnector {
    tables: RwLock<HashMap<String, BTreeMap<String, Record>>>,
}

impl MemoryConnector {
    /// Creates an empty connector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a record.
    ///
    /// A record whose primary key has the same [`record_key`] as a stored one
    /// replaces it, so `42` and `"42"` name the same record.
    ///
    /// # Errors
    /// `HostError::MissingPrimaryKey` if the resource declares no primary key
    /// or the record carries no value for it.
    pub fn insert(&self, resource: &ResourceConfig, record: Record) -> Result<(), HostError> {
        let primary_key = resource
            .primary_key()
            .map(|c| c.name.clone())
            .unwrap_or_default();
        let key = match record.get(&primary_key) {
            Some(value) if !value.is_null() => record_key(value),
            _ => {
                return Err(HostError::MissingPrimaryKey {
                    resource: resource.resource_id.clone(),
                    primary_key,
                })
            }
        };

        self.tables
            .write()
            .entry(resource.resource_id.clone())
            .or_default()
            .insert(key, record);
        Ok(())
    }

    /// Number of records stored for a resource.
    pub fn len(&self, resource_id: &str) -> usize {
        self.tables.read().get(resource_id).map_or(0, |t| t.len())
    }

    /// Whether no records are stored for a resource.
    pub fn is_empty(&self, resource_id: &str) -> bool {
        self.len(resource_id) == 0
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn get_record_by_primary_key(
        &self,
        resource: &ResourceConfig,
        record_id: &Value,
    ) -> Result<Option<Record>, HostError> {
        let tables = self.tables.read();
        Ok(tables
            .get(&resource.resource_id)
            .and_then(|t| t.get(&record_key(record_id)))
            .cloned())
    }

    async fn update_record(
        &self,
        resource: &ResourceConfig,
        record_id: &Value,
        changes: &Record,
    ) -> Result<(), HostError> {
        let mut tables = self.tables.write();
        let record = tables
            .get_mut(&resource.resource_id)
            .and_then(|t| t.get_mut(&record_key(record_id)))
            .ok_or_else(|| HostError::RecordNotFound {
                resource: resource.resource_id.clone(),
                record_id: record_key(record_id),
            })?;

        for (name, value) in changes {
            record.insert(name.clone(), value.clone());
        }
        Ok(())
    }

    /// Reports every column name seen in stored records, typed after the
    /// values stored under it.
    ///
    /// Integers widen to floats when both appear. Any other mix of kinds
    /// leaves the column untyped.
    async fn discover_columns(
        &self,
        resource: &ResourceConfig,
    ) -> Result<Vec<Column>, HostError> {
        let tables = self.tables.read();
        let Some(table) = tables.get(&resource.resource_id) else {
            return Ok(Vec::new());
        };

        let mut seen: BTreeMap<&str, Inferred> = BTreeMap::new();
        for record in table.values() {
            for (name, value) in record {
                let entry = seen.entry(name.as_str()).or_insert(Inferred::Unknown);
                *entry = entry.merge(infer_type(value));
            }
        }

        Ok(seen
            .into_iter()
            .map(|(name, inferred)| Column {
                column_type: inferred.column_type(),
                ..Column::new(name)
            })
            .collect())
    }
}

/// Column type accumulated over stored values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Inferred {
    Unknown,
    Typed(ColumnType),
    Mixed,
}

impl Inferred {
    fn merge(self, value_type: Option<ColumnType>) -> Self {
        let Some(value_type) = value_type else {
            return self;
        };
        match self {
            Inferred::Unknown => Inferred::Typed(value_type),
            Inferred::Typed(current) if current == value_type => self,
            Inferred::Typed(ColumnType::Integer) if value_type == ColumnType::Float => {
                Inferred::Typed(ColumnType::Float)
            }
            Inferred::Typed(ColumnType::Float) if value_type == ColumnType::Integer => self,
            Inferred::Typed(_) | Inferred::Mixed => Inferred::Mixed,
        }
    }

    fn column_type(self) -> Option<ColumnType> {
        match self {
            Inferred::Typed(column_type) => Some(column_type),
            Inferred::Unknown | Inferred::Mixed => None,
        }
    }
}

fn infer_type(value: &Value) -> Option<ColumnType> {
    match value {
        Value::Null => None,
        Value::Bool(_) => Some(ColumnType::Boolean),
        Value::Number(n) if n.is_f64() => Some(ColumnType::Float),
        Value::Number(_) => Some(ColumnType::Integer),
        Value::String(_) => Some(ColumnType::String),
        Value::Array(_) | Value::Object(_) => Some(ColumnType::Json),
    }
}
