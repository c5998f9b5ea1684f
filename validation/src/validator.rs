//! Whole-form schema and data validation.
//!
//! [`FormValidator`] combines the structural checks of
//! [`SchemaIndex`], the item-count checks of
//! [`BasicConstraintsValidator`] and the datatype checks looked up in a
//! [`DatatypeRegistry`]. Every call returns the complete list of findings;
//! an empty list means the schema or the data is valid.

use form_schema_core::{
    DataRecord, ElementId, Field, FormSchema, FormValidationError, LookupError, SCHEMA_INVALID_ID,
    SchemaIndex, Section,
};
use tracing::{debug, warn};

use crate::basic::BasicConstraintsValidator;
use crate::config::{DEFAULT_MAX_RECURSION, ValidatorConfig};
use crate::registry::DatatypeRegistry;

/// Validates form schemas and submitted data against a datatype registry.
///
/// The validator borrows the registry; any number of validators may share
/// one registry, including across threads.
///
/// # Examples
///
/// ```
/// use form_schema_core::*;
/// use form_schema_validation::*;
/// use serde_json::json;
///
/// let registry = DatatypeRegistry::with_default_datatypes().unwrap();
/// let validator = FormValidator::new(&registry, BasicConstraintsValidator::new(100));
///
/// let mut schema = FormSchema::new("Order").with_section(
///     Section::new("Items").with_field(
///         Field::new("Quantity", INT64_DATATYPE).with_validation_schema(
///             FormValidationSchema::new().with_dynamic_constraints(json!({ "gt": 0 })),
///         ),
///     ),
/// );
/// schema.generate_ids();
/// assert!(validator.validate_schema(&schema).is_empty());
///
/// let data = vec![DataRecord::new(2, vec![json!(3), json!(0)])];
/// let errors = validator.validate_data(&data, &schema);
/// assert_eq!(errors.len(), 1);
/// assert_eq!(errors[0].index_data, Some(1));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FormValidator<'r> {
    registry: &'r DatatypeRegistry,
    basic: BasicConstraintsValidator,
    max_recursion: usize,
}

impl<'r> FormValidator<'r> {
    /// Creates a validator with the default subsection limit.
    pub fn new(registry: &'r DatatypeRegistry, basic: BasicConstraintsValidator) -> Self {
        Self {
            registry,
            basic,
            max_recursion: DEFAULT_MAX_RECURSION,
        }
    }

    /// Creates a validator from a loaded configuration.
    pub fn from_config(registry: &'r DatatypeRegistry, config: &ValidatorConfig) -> Self {
        Self::new(registry, BasicConstraintsValidator::new(config.default_max_items))
            .with_max_recursion(config.max_recursion)
    }

    /// Sets how many subsection levels a root section may contain.
    pub fn with_max_recursion(mut self, max_recursion: usize) -> Self {
        self.max_recursion = max_recursion;
        self
    }

    /// Subsection limit in effect.
    pub fn max_recursion(&self) -> usize {
        self.max_recursion
    }

    /// Validates a schema declaration.
    ///
    /// Structural defects (duplicate IDs, nesting too deep) are returned on
    /// their own; datatype checks only run on a structurally sound schema.
    pub fn validate_schema(&self, schema: &FormSchema) -> Vec<FormValidationError> {
        let index = SchemaIndex::build(schema, self.max_recursion);
        if !index.is_valid() {
            warn!(
                errors = index.errors().len(),
                "form schema '{}' is structurally invalid", schema.title
            );
            return index.into_errors();
        }

        let mut errors = Vec::new();
        for section in &schema.sections {
            self.validate_section(section, &mut errors);
        }

        debug!(
            elements = index.len(),
            errors = errors.len(),
            "validated form schema '{}'",
            schema.title
        );
        errors
    }

    fn validate_section(&self, section: &Section, errors: &mut Vec<FormValidationError>) {
        for subsection in &section.subsections {
            self.validate_section(subsection, errors);
        }

        for field in &section.fields {
            self.validate_field(field, errors);
        }
    }

    fn validate_field(&self, field: &Field, errors: &mut Vec<FormValidationError>) {
        let Ok(datatype) = self.registry.get_datatype(&field.scalar.datatype) else {
            errors.push(unknown_datatype(field.scalar.id));
            return;
        };

        errors.extend(self.basic.validate_schema(field));
        errors.extend(datatype.validate_schema(field));

        for subfield in &field.subfields {
            match self.registry.get_datatype(&subfield.datatype) {
                Ok(datatype) => errors.extend(datatype.validate_subfield_schema(subfield)),
                Err(_) => errors.push(unknown_datatype(subfield.id)),
            }
        }
    }

    /// Validates submitted records against `schema`.
    ///
    /// A structurally invalid schema is refused: the result is a single
    /// `form schema is invalid` error (element ID
    /// [`SCHEMA_INVALID_ID`]) followed by the structural errors. Otherwise
    /// every record is checked independently and all findings are returned in
    /// record order.
    pub fn validate_data(
        &self,
        records: &[DataRecord],
        schema: &FormSchema,
    ) -> Vec<FormValidationError> {
        let index = match self.build_index(schema) {
            Ok(index) => index,
            Err(errors) => return errors,
        };

        let errors: Vec<_> = records
            .iter()
            .flat_map(|record| self.validate_record(&index, record))
            .collect();

        debug!(
            records = records.len(),
            errors = errors.len(),
            "validated form data for '{}'",
            schema.title
        );
        errors
    }

    /// Same as [`validate_data`](Self::validate_data), with records checked on
    /// the rayon thread pool. The output order matches the sequential call.
    #[cfg(feature = "parallel")]
    pub fn par_validate_data(
        &self,
        records: &[DataRecord],
        schema: &FormSchema,
    ) -> Vec<FormValidationError> {
        use rayon::prelude::*;

        let index = match self.build_index(schema) {
            Ok(index) => index,
            Err(errors) => return errors,
        };

        let errors: Vec<_> = records
            .par_iter()
            .flat_map_iter(|record| self.validate_record(&index, record))
            .collect();

        debug!(
            records = records.len(),
            errors = errors.len(),
            "validated form data for '{}' in parallel",
            schema.title
        );
        errors
    }

    fn build_index<'s>(
        &self,
        schema: &'s FormSchema,
    ) -> Result<SchemaIndex<'s>, Vec<FormValidationError>> {
        let index = SchemaIndex::build(schema, self.max_recursion);
        if index.is_valid() {
            return Ok(index);
        }

        warn!(
            errors = index.errors().len(),
            "refusing data for structurally invalid form schema '{}'", schema.title
        );
        let structural = index.into_errors();
        let mut errors = Vec::with_capacity(structural.len() + 1);
        errors.push(FormValidationError::schema(
            SCHEMA_INVALID_ID,
            "form schema is invalid",
        ));
        errors.extend(structural);
        Err(errors)
    }

    fn validate_record(
        &self,
        index: &SchemaIndex<'_>,
        record: &DataRecord,
    ) -> Vec<FormValidationError> {
        let id = record.schema_element_id;
        let element = match index.get_subfield(id) {
            Ok(element) => element,
            Err(LookupError::WrongElementType { .. }) => {
                return vec![FormValidationError::data(
                    id,
                    "element of schema id is not a (sub)field",
                )];
            }
            Err(LookupError::ElementNotFound(_)) => {
                return vec![FormValidationError::data(id, "schema id does not exist")];
            }
        };

        let Ok(datatype) = self.registry.get_datatype(&element.datatype) else {
            return vec![unknown_datatype(id)];
        };

        let mut errors = self
            .basic
            .validate_data(record, &element.validation_schema.basic);
        errors.extend(datatype.validate_data(record, &element.validation_schema));
        errors
    }
}

fn unknown_datatype(id: ElementId) -> FormValidationError {
    FormValidationError::schema(id, "datatype does not exist").with_constraint("datatype")
}
