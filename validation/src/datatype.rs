//! Datatype definitions and the validator capability.
//!
//! A datatype pairs a [`DatatypeDefinition`] (identifier and display
//! metadata) with a [`DatatypeValidator`] that knows how to check schema
//! declarations and submitted values for that datatype. New datatypes plug
//! in by implementing the trait and registering an instance in a
//! [`DatatypeRegistry`](crate::DatatypeRegistry).

use std::fmt;

use form_schema_core::{DataRecord, Field, FormValidationError, FormValidationSchema, Subfield};
use serde::{Deserialize, Serialize};

/// Metadata describing a registered datatype.
///
/// # Examples
///
/// ```
/// use form_schema_validation::DatatypeDefinition;
///
/// let percent = DatatypeDefinition::new("@custom/percent", "percent")
///     .inherits_from("@default/int64");
/// assert_eq!(percent.inherits_from.as_deref(), Some("@default/int64"));
/// assert!(!percent.allows_subfields);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatatypeDefinition {
    /// Unique key used by schema elements in their `type`.
    pub identifier: String,
    /// Name shown to form authors.
    pub display_name: String,
    /// Whether fields of this datatype may declare subfields.
    #[serde(default)]
    pub allows_subfields: bool,
    /// Identifier of the parent datatype.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inherits_from: Option<String>,
}

impl DatatypeDefinition {
    /// Creates a definition without subfields or parent.
    pub fn new(identifier: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            display_name: display_name.into(),
            allows_subfields: false,
            inherits_from: None,
        }
    }

    /// Allows subfields on fields of this datatype.
    pub fn with_subfields(mut self) -> Self {
        self.allows_subfields = true;
        self
    }

    /// Declares a parent datatype.
    pub fn inherits_from(mut self, parent: impl Into<String>) -> Self {
        self.inherits_from = Some(parent.into());
        self
    }
}

/// Datatype-specific schema and data checks.
///
/// Implementations must report every failure they find rather than stopping
/// at the first one. They run on the caller's thread and must be shareable
/// across threads so a built registry can serve concurrent validations.
pub trait DatatypeValidator: Send + Sync {
    /// Checks the declaration of a field of this datatype.
    ///
    /// Implementations decode the field's dynamic constraint payload first;
    /// a payload that fails to decode yields one schema error and no further
    /// constraint checks for that element.
    fn validate_schema(&self, field: &Field) -> Vec<FormValidationError>;

    /// Checks the declaration of a subfield of this datatype.
    fn validate_subfield_schema(&self, _subfield: &Subfield) -> Vec<FormValidationError> {
        Vec::new()
    }

    /// Checks submitted values against the element's validation schema.
    ///
    /// Every value is checked independently. A value failing several
    /// constraints yields one error per constraint, each tagged with the
    /// value's index. A value that cannot be decoded yields one error and is
    /// skipped by the remaining checks.
    fn validate_data(
        &self,
        record: &DataRecord,
        schema: &FormValidationSchema,
    ) -> Vec<FormValidationError>;
}

/// A registered datatype: definition plus validator.
pub struct Datatype {
    definition: DatatypeDefinition,
    validator: Box<dyn DatatypeValidator>,
}

impl Datatype {
    /// Creates a datatype from its definition and validator.
    pub fn new(
        definition: DatatypeDefinition,
        validator: impl DatatypeValidator + 'static,
    ) -> Self {
        Self {
            definition,
            validator: Box::new(validator),
        }
    }

    /// Metadata of the datatype.
    pub fn definition(&self) -> &DatatypeDefinition {
        &self.definition
    }

    /// Identifier the datatype is registered under.
    pub fn identifier(&self) -> &str {
        &self.definition.identifier
    }

    /// Runs [`DatatypeValidator::validate_schema`].
    pub fn validate_schema(&self, field: &Field) -> Vec<FormValidationError> {
        self.validator.validate_schema(field)
    }

    /// Runs [`DatatypeValidator::validate_subfield_schema`].
    pub fn validate_subfield_schema(&self, subfield: &Subfield) -> Vec<FormValidationError> {
        self.validator.validate_subfield_schema(subfield)
    }

    /// Runs [`DatatypeValidator::validate_data`].
    pub fn validate_data(
        &self,
        record: &DataRecord,
        schema: &FormValidationSchema,
    ) -> Vec<FormValidationError> {
        self.validator.validate_data(record, schema)
    }
}

impl fmt::Debug for Datatype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Datatype")
            .field("definition", &self.definition)
            .finish_non_exhaustive()
    }
}

/// Rejects subfields on datatypes that do not allow them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllowsSubfields(pub bool);

impl AllowsSubfields {
    /// Returns one schema error when `field` declares forbidden subfields.
    pub fn validate(&self, field: &Field) -> Vec<FormValidationError> {
        if !self.0 && !field.subfields.is_empty() {
            return vec![
                FormValidationError::schema(
                    field.scalar.id,
                    "subfields are not allowed to be set in schema",
                )
                .with_constraint("subfields"),
            ];
        }
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allows_subfields() {
        let plain = Field::new("plain", "@default/int64");
        let table = Field::new("table", "@default/int64").with_subfield(Subfield::new("c", "x"));

        assert!(AllowsSubfields(false).validate(&plain).is_empty());
        assert!(AllowsSubfields(true).validate(&table).is_empty());

        let errors = AllowsSubfields(false).validate(&table);
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].message,
            "subfields are not allowed to be set in schema"
        );
    }

    #[test]
    fn test_definition_wire_format() {
        let definition = DatatypeDefinition::new("@custom/table", "table").with_subfields();
        let value = serde_json::to_value(&definition).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "identifier": "@custom/table",
                "displayName": "table",
                "allowsSubfields": true
            })
        );
    }
}
