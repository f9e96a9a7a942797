//! Column definition and per-view component bindings.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::value::ColumnType;
use crate::error::ValueError;

/// Column definition within a resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column name, unique within the resource
    pub name: String,
    /// Declared type; `None` until discovery fills it in
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub column_type: Option<ColumnType>,
    /// Whether this column is the primary key
    #[serde(default)]
    pub primary_key: bool,
    /// Whether null is rejected
    #[serde(default)]
    pub required: bool,
    /// Allowed values, if the column is enumerated
    #[serde(default, rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
    /// Custom presentation units per view
    #[serde(default)]
    pub components: ColumnComponents,
}

/// Custom presentation units bound to a column, one slot per view.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnComponents {
    /// List view renderer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list: Option<ComponentBinding>,
    /// Detail view renderer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show: Option<ComponentBinding>,
    /// Edit form input
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edit: Option<ComponentBinding>,
}

/// Reference to a client-side presentation unit plus the metadata it receives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentBinding {
    /// Component file reference resolved by the client bundle
    pub file: String,
    /// Opaque metadata passed to the component
    #[serde(default)]
    pub meta: Map<String, Value>,
}

impl Column {
    /// Creates an untyped, optional column.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            column_type: None,
            primary_key: false,
            required: false,
            enum_values: None,
            components: ColumnComponents::default(),
        }
    }

    /// Sets the declared type.
    pub fn typed(mut self, column_type: ColumnType) -> Self {
        self.column_type = Some(column_type);
        self
    }

    /// Marks the column as primary key (implies required).
    pub fn primary(mut self) -> Self {
        self.primary_key = true;
        self.required = true;
        self
    }

    /// Marks the column as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Restricts the column to the given values.
    pub fn with_enum(mut self, values: Vec<Value>) -> Self {
        self.enum_values = Some(values);
        self
    }

    /// Binds a list view component.
    pub fn with_list_component(mut self, binding: ComponentBinding) -> Self {
        self.components.list = Some(binding);
        self
    }

    /// Validates and coerces a submitted value against this column.
    ///
    /// Null passes only for non-required columns. Enumerated columns accept
    /// only their listed values, compared after coercion.
    pub fn coerce(&self, value: Value) -> Result<Value, ValueError> {
        if value.is_null() {
            return if self.required {
                Err(ValueError::Required)
            } else {
                Ok(Value::Null)
            };
        }

        let coerced = match self.column_type {
            Some(column_type) => column_type.coerce(value)?,
            None => value,
        };

        if let Some(allowed) = &self.enum_values {
            if !allowed.contains(&coerced) {
                return Err(ValueError::NotInEnum(coerced.to_string()));
            }
        }

        Ok(coerced)
    }
}

impl ComponentBinding {
    /// Creates a binding with empty metadata.
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            meta: Map::new(),
        }
    }
}
