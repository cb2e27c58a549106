//! Schema introspection data models.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A table or view listed from the backend's metadata catalog.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TableEntry {
    pub table_name: String,
    /// Catalog-native spelling, e.g. "BASE TABLE" or "VIEW"
    pub table_type: String,
}

/// A column described from the backend's metadata catalog.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ColumnDescriptor {
    pub name: String,
    /// Backend-native type spelling (e.g., "integer", "character varying")
    pub data_type: String,
    pub nullable: bool,
    /// Default expression as reported by the catalog
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<i64>,
    pub ordinal_position: i32,
}

impl ColumnDescriptor {
    /// Create a new column descriptor.
    pub fn new(
        name: impl Into<String>,
        data_type: impl Into<String>,
        nullable: bool,
        ordinal_position: i32,
    ) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            nullable,
            default_value: None,
            max_length: None,
            ordinal_position,
        }
    }

    /// Set the default expression.
    pub fn with_default(mut self, default_value: impl Into<String>) -> Self {
        self.default_value = Some(default_value.into());
        self
    }

    /// Set the maximum character length.
    pub fn with_max_length(mut self, max_length: i64) -> Self {
        self.max_length = Some(max_length);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_descriptor_builder() {
        let col = ColumnDescriptor::new("email", "character varying", true, 3)
            .with_default("''::character varying")
            .with_max_length(255);

        assert_eq!(col.name, "email");
        assert!(col.nullable);
        assert_eq!(col.max_length, Some(255));
        assert_eq!(col.ordinal_position, 3);
    }

    #[test]
    fn test_column_descriptor_omits_absent_optionals() {
        let col = ColumnDescriptor::new("id", "integer", false, 1);
        let json = serde_json::to_string(&col).unwrap();
        assert!(!json.contains("default_value"));
        assert!(!json.contains("max_length"));
        assert!(json.contains("\"ordinal_position\":1"));
    }
}
