use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::Document;

/// Store-level constraints for a collection. The store enforces these on
/// every insert and on the merged result of every update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionSchema {
    /// Name of the collection, used in validation messages.
    pub collection: String,
    /// Field definitions that carry constraints. Unlisted fields are free-form.
    pub fields: Vec<FieldDef>,
}

/// Single field definition within a schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Name of the field.
    pub name: String,
    /// Whether the field must be present (and non-null, non-blank) in every record.
    #[serde(default)]
    pub required: bool,
    /// Whether no two records may share a value for this field.
    #[serde(default)]
    pub unique: bool,
}

impl FieldDef {
    #[must_use]
    pub fn required(name: &str) -> Self {
        Self {
            name: name.to_string(),
            required: true,
            unique: false,
        }
    }

    #[must_use]
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }
}

/// Result of validating a document against a schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    /// The value conforms to the schema.
    Valid,
    /// The value violates one or more schema constraints.
    Invalid {
        /// Human-readable descriptions of each validation failure.
        errors: Vec<String>,
    },
}

impl ValidationResult {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

impl CollectionSchema {
    /// A schema with no constraints at all.
    #[must_use]
    pub fn unconstrained(collection: &str) -> Self {
        Self {
            collection: collection.to_string(),
            fields: Vec::new(),
        }
    }

    /// Default constraints for the bootcamps collection.
    #[must_use]
    pub fn bootcamps() -> Self {
        Self {
            collection: "bootcamps".to_string(),
            fields: vec![
                FieldDef::required("name").unique(),
                FieldDef::required("description"),
            ],
        }
    }

    /// Checks required fields. Uniqueness needs the rest of the collection
    /// and is enforced by the store.
    #[must_use]
    pub fn validate(&self, doc: &Document) -> ValidationResult {
        let errors: Vec<String> = self
            .fields
            .iter()
            .filter(|field| field.required && is_blank(doc.get(&field.name)))
            .map(|field| format!("Please add a {}", field.name))
            .collect();

        if errors.is_empty() {
            ValidationResult::Valid
        } else {
            ValidationResult::Invalid { errors }
        }
    }

    /// Fields whose values must be unique across the collection.
    pub fn unique_fields(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .filter(|field| field.unique)
            .map(|field| field.name.as_str())
    }
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}
