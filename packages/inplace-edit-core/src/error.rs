//! Error types for configuration build, value coercion and field updates.

use thiserror::Error;

/// Configuration build errors.
///
/// All of these are fatal: the host must not start serving with a
/// configuration that produced one.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Targeted column already renders through another list component
    #[error("Column '{column}' of resource '{resource}' already has a list component defined; in-place edit cannot be used on columns that already have list components")]
    DuplicateListComponent { column: String, resource: String },

    /// Configured column missing from the resolved resource
    #[error("Column '{column}' specified in in-place edit plugin not found in resource '{resource_label}'")]
    UnknownColumn {
        column: String,
        resource_label: String,
    },

    /// Two resources share the same id
    #[error("Resource '{0}' is declared more than once")]
    DuplicateResource(String),

    /// Plugin attached to a resource that was never declared
    #[error("Plugin attached to unknown resource '{0}'")]
    UnknownResource(String),

    /// Two plugin instances resolve to the same instance id
    #[error("Plugin instance '{instance_id}' is attached to resource '{resource}' more than once")]
    DuplicatePluginInstance {
        instance_id: String,
        resource: String,
    },

    /// Resource has no primary key column
    #[error("Resource '{0}' has no primary key column")]
    MissingPrimaryKey(String),

    /// Resource references a data source with no registered connector
    #[error("Resource '{resource}' uses unknown data source '{data_source}'")]
    UnknownDataSource {
        resource: String,
        data_source: String,
    },

    /// Schema discovery failed
    #[error("Schema discovery failed for resource '{resource}': {message}")]
    Discovery { resource: String, message: String },

    /// Configuration file could not be parsed
    #[error("Configuration parse error: {0}")]
    Parse(String),

    /// Configuration file could not be read
    #[error("I/O error: {0}")]
    Io(String),
}

/// Value coercion errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// Null given for a required column
    #[error("value is required")]
    Required,

    /// JSON shape does not fit the column type
    #[error("expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },

    /// String could not be parsed as the column type
    #[error("cannot parse '{value}' as {expected}")]
    Unparsable { value: String, expected: String },

    /// Value outside the column's enumerated values
    #[error("value {0} is not one of the allowed values")]
    NotInEnum(String),
}

/// Errors reported by a data connector.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// Resource has no storage in this connector
    #[error("Resource '{0}' is not stored in this data source")]
    UnknownResource(String),

    /// Record to update does not exist
    #[error("Record {record_id} not found in resource '{resource}'")]
    RecordNotFound { resource: String, record_id: String },

    /// Record is missing its primary key
    #[error("Record for resource '{resource}' has no value for primary key '{primary_key}'")]
    MissingPrimaryKey {
        resource: String,
        primary_key: String,
    },

    /// Lock poisoned or storage unavailable
    #[error("Storage failure: {0}")]
    Storage(String),
}

/// Single-field update errors.
///
/// A failure reported by the host update operation is not one of these; it is
/// relayed to the caller as an `{ error }` payload.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UpdateFieldError {
    /// No plugin instance with this id
    #[error("Unknown plugin instance '{0}'")]
    UnknownPluginInstance(String),

    /// No resource with this id
    #[error("Unknown resource '{0}'")]
    UnknownResource(String),

    /// Field is not an in-place editable column of this plugin instance
    #[error("Field '{field}' is not editable in place on resource '{resource}'")]
    FieldNotEditable { resource: String, field: String },

    /// Submitted value does not fit the column
    #[error("Invalid value for field '{field}': {source}")]
    InvalidValue {
        field: String,
        #[source]
        source: ValueError,
    },

    /// Submitted record id does not fit the primary key column
    #[error("Invalid record id: {0}")]
    InvalidRecordId(#[source] ValueError),

    /// Record does not exist
    #[error("Record {record_id} not found in resource '{resource}'")]
    RecordNotFound { resource: String, record_id: String },

    /// Resource data source has no connector
    #[error("No connector registered for data source '{0}'")]
    UnknownDataSource(String),

    /// Connector failure while reading
    #[error("Data source error: {0}")]
    Host(#[from] HostError),
}
