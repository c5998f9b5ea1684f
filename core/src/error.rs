//! Validation error model shared by every validator.
//!
//! Validators never fail with `Err`; they return lists of
//! [`FormValidationError`] values so a caller always gets the complete set of
//! findings for one validation call. [`ElementErrors`] is the collector a
//! validator uses while checking one schema element.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::{ElementId, ElementKind};

/// Element ID carried by errors that concern the schema as a whole.
pub const SCHEMA_INVALID_ID: ElementId = -1;

/// Whether an error concerns the schema declaration or the submitted data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// The schema itself is broken.
    #[serde(rename = "form schema error")]
    Schema,
    /// A submitted value violates the schema.
    #[serde(rename = "form data error")]
    Data,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Schema => write!(f, "form schema error"),
            ErrorKind::Data => write!(f, "form data error"),
        }
    }
}

/// One failed constraint for one schema element.
///
/// `index_data` points into the data array of the record when the failure
/// concerns a single submitted value.
///
/// # Examples
///
/// ```
/// use form_schema_core::{ErrorKind, FormValidationError};
///
/// let err = FormValidationError::data_with_index(4, 2, "must be less than")
///     .with_constraint("lt");
/// assert_eq!(err.kind, ErrorKind::Data);
/// assert_eq!(err.index_data, Some(2));
/// assert_eq!(err.to_string(), "form-validation: form data error 4 must be less than");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[error("form-validation: {kind} {schema_element_id} {message}")]
#[serde(rename_all = "camelCase")]
pub struct FormValidationError {
    /// Error category.
    #[serde(rename = "name")]
    pub kind: ErrorKind,
    /// Element the error is about.
    #[serde(rename = "schemaElementID")]
    pub schema_element_id: ElementId,
    /// Index into the record's data array, if a single value failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_data: Option<usize>,
    /// Name of the failed constraint (e.g. `lt`, `unique id`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraint: Option<String>,
    /// Configured bound that was violated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Value>,
    /// Human-readable message.
    pub message: String,
}

impl FormValidationError {
    fn new(kind: ErrorKind, schema_element_id: ElementId, message: impl Into<String>) -> Self {
        Self {
            kind,
            schema_element_id,
            index_data: None,
            constraint: None,
            config: None,
            message: message.into(),
        }
    }

    /// Creates a schema error for an element.
    pub fn schema(schema_element_id: ElementId, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Schema, schema_element_id, message)
    }

    /// Creates a data error for an element.
    pub fn data(schema_element_id: ElementId, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Data, schema_element_id, message)
    }

    /// Creates a data error pinned to a data index.
    pub fn data_with_index(
        schema_element_id: ElementId,
        index_data: usize,
        message: impl Into<String>,
    ) -> Self {
        Self::data(schema_element_id, message).with_index(index_data)
    }

    /// Sets the failed constraint name.
    pub fn with_constraint(mut self, constraint: &str) -> Self {
        self.constraint = Some(constraint.to_string());
        self
    }

    /// Sets the data index.
    pub fn with_index(mut self, index_data: usize) -> Self {
        self.index_data = Some(index_data);
        self
    }

    /// Attaches the violated bound.
    pub fn with_config(mut self, config: impl Serialize) -> Self {
        self.config = serde_json::to_value(config).ok();
        self
    }

    /// Returns `true` for schema errors.
    pub fn is_schema_error(&self) -> bool {
        self.kind == ErrorKind::Schema
    }

    /// Returns `true` for data errors.
    pub fn is_data_error(&self) -> bool {
        self.kind == ErrorKind::Data
    }
}

/// Collects failed constraints for a single schema element.
///
/// # Examples
///
/// ```
/// use form_schema_core::{ElementErrors, ErrorKind};
///
/// let mut errors = ElementErrors::new(ErrorKind::Data, 7);
/// errors.fail_at(0, "gt", "must be greater than", 1);
/// errors.fail_at(0, "minDigits", "must have at least 2 digits", 2);
/// assert_eq!(errors.len(), 2);
///
/// let errors = errors.into_errors();
/// assert!(errors.iter().all(|e| e.schema_element_id == 7 && e.index_data == Some(0)));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ElementErrors {
    kind: ErrorKind,
    schema_element_id: ElementId,
    errors: Vec<FormValidationError>,
}

impl ElementErrors {
    /// Creates an empty collector.
    pub fn new(kind: ErrorKind, schema_element_id: ElementId) -> Self {
        Self {
            kind,
            schema_element_id,
            errors: Vec::new(),
        }
    }

    /// Records a failed constraint for the element as a whole.
    pub fn fail(&mut self, constraint: &str, message: impl Into<String>) {
        let err = FormValidationError::new(self.kind, self.schema_element_id, message)
            .with_constraint(constraint);
        self.errors.push(err);
    }

    /// Records a failed constraint together with the violated bound.
    pub fn fail_with_config(
        &mut self,
        constraint: &str,
        message: impl Into<String>,
        config: impl Serialize,
    ) {
        let err = FormValidationError::new(self.kind, self.schema_element_id, message)
            .with_constraint(constraint)
            .with_config(config);
        self.errors.push(err);
    }

    /// Records a failed constraint for one value of the data array.
    pub fn fail_at(
        &mut self,
        index: usize,
        constraint: &str,
        message: impl Into<String>,
        config: impl Serialize,
    ) {
        let err = FormValidationError::new(self.kind, self.schema_element_id, message)
            .with_index(index)
            .with_constraint(constraint)
            .with_config(config);
        self.errors.push(err);
    }

    /// Records an already-built error (e.g. from a nested check).
    pub fn push(&mut self, err: FormValidationError) {
        self.errors.push(err);
    }

    /// Element the collector reports on.
    pub fn schema_element_id(&self) -> ElementId {
        self.schema_element_id
    }

    /// Returns `true` if nothing failed.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of failed constraints.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Consumes the collector.
    pub fn into_errors(self) -> Vec<FormValidationError> {
        self.errors
    }
}

/// Typed element lookup failures of [`SchemaIndex`](crate::SchemaIndex).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LookupError {
    /// No element carries the ID.
    #[error("form-schema: element not found: {0}")]
    ElementNotFound(ElementId),
    /// The ID belongs to an element of another kind.
    #[error("form-schema: wrong element type for {id}: expected {expected}, found {found}")]
    WrongElementType {
        id: ElementId,
        expected: ElementKind,
        found: ElementKind,
    },
}
