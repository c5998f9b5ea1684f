//! Datatype registry and validators for form schemas.
//!
//! This crate checks [`form_schema_core`] schemas and submitted data:
//!
//! - [`DatatypeRegistry`]: datatypes by identifier, with single-parent
//!   inheritance.
//! - [`DatatypeValidator`]: the capability every datatype implements.
//! - [`NumberValidator`]: range and digit-count checks for any [`Number`]
//!   kind; registered as [`INT64_DATATYPE`] and [`FLOAT64_DATATYPE`] by
//!   [`DatatypeRegistry::with_default_datatypes`].
//! - [`BasicConstraintsValidator`]: item-count bounds shared by all
//!   datatypes.
//! - [`FormValidator`]: runs the structural, item-count and datatype checks
//!   over a whole schema or a batch of records.
//!
//! Findings are returned as `Vec<FormValidationError>`; only registry and
//! configuration setup fail with `Err`.
//!
//! # Example
//!
//! ```
//! use form_schema_core::*;
//! use form_schema_validation::*;
//! use serde_json::json;
//!
//! let registry = DatatypeRegistry::with_default_datatypes().unwrap();
//! let validator = FormValidator::from_config(&registry, &ValidatorConfig::default());
//!
//! let mut schema = FormSchema::new("Measurements").with_section(
//!     Section::new("Sample").with_field(
//!         Field::new("Weight", FLOAT64_DATATYPE).with_validation_schema(
//!             FormValidationSchema::new()
//!                 .with_max_items(1)
//!                 .with_dynamic_constraints(json!({ "gt": 0.0, "maxDigits": 3 })),
//!         ),
//!     ),
//! );
//! schema.generate_ids();
//! assert!(validator.validate_schema(&schema).is_empty());
//!
//! let errors = validator.validate_data(&[DataRecord::new(2, vec![json!(1500.5)])], &schema);
//! assert_eq!(errors[0].constraint.as_deref(), Some("maxDigits"));
//! ```

mod basic;
mod config;
mod datatype;
mod error;
mod number;
mod registry;
mod validator;

pub use basic::BasicConstraintsValidator;
pub use config::{DEFAULT_MAX_ITEMS, DEFAULT_MAX_RECURSION, ValidatorConfig};
pub use datatype::{AllowsSubfields, Datatype, DatatypeDefinition, DatatypeValidator};
pub use error::{ConfigError, RegistryError, Result};
pub use number::{Number, NumberConstraints, NumberValidator};
pub use registry::{DatatypeRegistry, FLOAT64_DATATYPE, INT64_DATATYPE};
pub use validator::FormValidator;
