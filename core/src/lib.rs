//! Core form schema types and element indexing.
//!
//! This crate defines the document model for recursively nested web forms:
//!
//! - [`FormSchema`]: top-level schema, a list of root sections.
//! - [`Section`]: groups fields and nests further subsections.
//! - [`Field`]: an input element, optionally with [`Subfield`]s such as
//!   table columns.
//! - [`FormValidationSchema`]: basic item-count constraints plus an opaque
//!   datatype-specific payload.
//! - [`DataRecord`]: values submitted against one element ID.
//!
//! IDs are assigned by [`FormSchema::generate_ids`]. [`SchemaIndex`] maps
//! IDs back to elements and reports duplicate IDs and overly deep nesting.
//! Every finding is a [`FormValidationError`].
//!
//! # Example
//!
//! ```
//! use form_schema_core::*;
//!
//! let mut schema = FormSchema::new("Survey").with_section(
//!     Section::new("About you")
//!         .with_subsection(Section::new("Address"))
//!         .with_field(Field::new("Age", "@default/int64")),
//! );
//! schema.generate_ids();
//!
//! let index = SchemaIndex::build(&schema, 5);
//! assert!(index.is_valid());
//! assert_eq!(index.kind_of(2), Some(ElementKind::Section));
//! assert_eq!(index.get_field(3).unwrap().scalar.title, "Age");
//! ```

mod data;
mod error;
mod index;
mod types;

pub use data::DataRecord;
pub use error::{ElementErrors, ErrorKind, FormValidationError, LookupError, SCHEMA_INVALID_ID};
pub use index::{ElementKind, SchemaElement, SchemaIndex};
pub use types::*;
