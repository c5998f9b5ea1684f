//! Item-count constraints shared by every datatype.

use form_schema_core::{
    BasicConstraints, DataRecord, ElementErrors, ErrorKind, Field, FormValidationError,
};

/// Checks `minItems` / `maxItems` declarations and the number of submitted
/// values.
///
/// Elements that declare neither bound are capped at `default_max_items`.
///
/// # Examples
///
/// ```
/// use form_schema_core::{BasicConstraints, DataRecord};
/// use form_schema_validation::BasicConstraintsValidator;
/// use serde_json::json;
///
/// let record = DataRecord::new(1, vec![json!(1), json!(2), json!(3)]);
/// let errors = BasicConstraintsValidator::new(2)
///     .validate_data(&record, &BasicConstraints::default());
/// assert_eq!(errors[0].message, "amount of data too high, maximum allowed 2");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BasicConstraintsValidator {
    default_max_items: usize,
}

impl BasicConstraintsValidator {
    /// Creates a validator that caps undeclared elements at
    /// `default_max_items` values.
    pub fn new(default_max_items: usize) -> Self {
        Self { default_max_items }
    }

    /// Checks the bounds declared on a field and on each of its subfields.
    pub fn validate_schema(&self, field: &Field) -> Vec<FormValidationError> {
        std::iter::once(&field.scalar)
            .chain(&field.subfields)
            .flat_map(|element| {
                let mut errors = ElementErrors::new(ErrorKind::Schema, element.id);
                check_declared_bounds(&element.validation_schema.basic, &mut errors);
                errors.into_errors()
            })
            .collect()
    }

    /// Checks the number of values in `record`.
    pub fn validate_data(
        &self,
        record: &DataRecord,
        constraints: &BasicConstraints,
    ) -> Vec<FormValidationError> {
        let mut errors = ElementErrors::new(ErrorKind::Data, record.schema_element_id);
        let count = i64::try_from(record.len()).unwrap_or(i64::MAX);

        if let Some(min) = constraints.min_items {
            if count < min {
                errors.fail_with_config(
                    "minItems",
                    format!("amount of data too low, minimum allowed {min}"),
                    min,
                );
            }
        }

        let max_items = if constraints.is_declared() {
            constraints.max_items
        } else {
            Some(i64::try_from(self.default_max_items).unwrap_or(i64::MAX))
        };
        if let Some(max) = max_items {
            if count > max {
                errors.fail_with_config(
                    "maxItems",
                    format!("amount of data too high, maximum allowed {max}"),
                    max,
                );
            }
        }

        errors.into_errors()
    }
}

fn check_declared_bounds(constraints: &BasicConstraints, errors: &mut ElementErrors) {
    let Some(max) = constraints.max_items else {
        return;
    };
    if max <= 0 {
        errors.fail("maxItems", "max items must be greater than 0");
    }
    if constraints.min_items.is_some_and(|min| min > max) {
        errors.fail("minItems", "max items must be greater or equal to min items");
    }
}
