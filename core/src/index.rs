//! Element index over an ID-assigned schema.
//!
//! [`SchemaIndex::build`] walks the schema once, records every element under
//! its ID and collects structural defects: duplicate IDs and subsections
//! nested deeper than the configured limit. Afterwards the index answers
//! typed lookups by ID.
//!
//! The index borrows the schema and is meant to be rebuilt for every
//! validation call.
//!
//! # Examples
//!
//! ```
//! use form_schema_core::*;
//!
//! let mut schema = FormSchema::new("Order").with_section(
//!     Section::new("Items").with_field(
//!         Field::new("Dimensions", "@custom/table")
//!             .with_subfield(Subfield::new("Width", "@default/int64")),
//!     ),
//! );
//! schema.generate_ids();
//!
//! let index = SchemaIndex::build(&schema, 5);
//! assert!(index.is_valid());
//! assert_eq!(index.get_section(1).unwrap().title, "Items");
//! assert_eq!(index.get_subfield(3).unwrap().title, "Width");
//! // a bare field stands in for a subfield
//! assert_eq!(index.get_subfield(2).unwrap().title, "Dimensions");
//! assert!(matches!(index.get_field(1), Err(LookupError::WrongElementType { .. })));
//! ```

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use crate::{
    ElementErrors, ElementId, ErrorKind, Field, FormSchema, FormValidationError, LookupError,
    Section, Subfield,
};

/// Structural kind of a schema element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// A (sub)section.
    Section,
    /// A field, possibly with subfields.
    Field,
    /// A subfield of a field.
    Subfield,
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementKind::Section => write!(f, "section"),
            ElementKind::Field => write!(f, "field"),
            ElementKind::Subfield => write!(f, "subfield"),
        }
    }
}

/// Borrowed reference to an indexed element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SchemaElement<'a> {
    Section(&'a Section),
    Field(&'a Field),
    Subfield(&'a Subfield),
}

impl<'a> SchemaElement<'a> {
    /// Structural kind of the element.
    pub fn kind(&self) -> ElementKind {
        match self {
            SchemaElement::Section(_) => ElementKind::Section,
            SchemaElement::Field(_) => ElementKind::Field,
            SchemaElement::Subfield(_) => ElementKind::Subfield,
        }
    }

    /// ID carried by the element.
    pub fn id(&self) -> ElementId {
        match self {
            SchemaElement::Section(section) => section.id,
            SchemaElement::Field(field) => field.scalar.id,
            SchemaElement::Subfield(subfield) => subfield.id,
        }
    }
}

/// ID → element lookup table with the structural errors found while building it.
#[derive(Debug, Clone)]
pub struct SchemaIndex<'a> {
    elements: HashMap<ElementId, SchemaElement<'a>>,
    errors: Vec<FormValidationError>,
    max_recursion: usize,
}

impl<'a> SchemaIndex<'a> {
    /// Indexes every element of `schema`.
    ///
    /// A root section may have subsections nested `max_recursion` levels
    /// deep. Each subsection beyond that yields one error on its parent
    /// section and is not descended into; sibling branches are still
    /// indexed.
    ///
    /// An ID seen a second time yields one duplicate error and the later
    /// element replaces the earlier one in the table.
    pub fn build(schema: &'a FormSchema, max_recursion: usize) -> Self {
        let mut index = Self {
            elements: HashMap::new(),
            errors: Vec::new(),
            max_recursion,
        };

        for section in &schema.sections {
            index.index_section(section, max_recursion);
        }

        debug!(
            elements = index.elements.len(),
            errors = index.errors.len(),
            "indexed form schema '{}'",
            schema.title
        );
        index
    }

    fn index_section(&mut self, section: &'a Section, remaining_depth: usize) {
        self.insert(SchemaElement::Section(section));

        for subsection in &section.subsections {
            if remaining_depth == 0 {
                let mut errors = ElementErrors::new(ErrorKind::Schema, section.id);
                errors.fail_with_config(
                    "subsections",
                    "too many subsection levels",
                    self.max_recursion,
                );
                self.errors.extend(errors.into_errors());
            } else {
                self.index_section(subsection, remaining_depth - 1);
            }
        }

        for field in &section.fields {
            self.insert(SchemaElement::Field(field));
            for subfield in &field.subfields {
                self.insert(SchemaElement::Subfield(subfield));
            }
        }
    }

    fn insert(&mut self, element: SchemaElement<'a>) {
        let id = element.id();
        if self.elements.insert(id, element).is_some() {
            self.errors.push(
                FormValidationError::schema(id, "id must be unique").with_constraint("unique id"),
            );
        }
    }

    /// Structural errors found while indexing.
    pub fn errors(&self) -> &[FormValidationError] {
        &self.errors
    }

    /// Consumes the index, keeping only its errors.
    pub fn into_errors(self) -> Vec<FormValidationError> {
        self.errors
    }

    /// Returns `true` if indexing found no structural errors.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of distinct IDs in the index.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns `true` if the schema has no elements.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Kind of the element registered under `id`.
    pub fn kind_of(&self, id: ElementId) -> Option<ElementKind> {
        self.elements.get(&id).map(SchemaElement::kind)
    }

    /// Untyped lookup.
    pub fn get(&self, id: ElementId) -> Option<SchemaElement<'a>> {
        self.elements.get(&id).copied()
    }

    fn get_element(
        &self,
        id: ElementId,
        kind: ElementKind,
    ) -> Result<SchemaElement<'a>, LookupError> {
        let element = self.get(id).ok_or(LookupError::ElementNotFound(id))?;
        if element.kind() != kind {
            return Err(LookupError::WrongElementType {
                id,
                expected: kind,
                found: element.kind(),
            });
        }
        Ok(element)
    }

    /// Looks up a section.
    ///
    /// # Errors
    ///
    /// [`LookupError::ElementNotFound`] for unknown IDs and
    /// [`LookupError::WrongElementType`] when the ID is not a section.
    pub fn get_section(&self, id: ElementId) -> Result<&'a Section, LookupError> {
        match self.get_element(id, ElementKind::Section)? {
            SchemaElement::Section(section) => Ok(section),
            other => Err(wrong_type(id, ElementKind::Section, other)),
        }
    }

    /// Looks up a field.
    ///
    /// # Errors
    ///
    /// [`LookupError::ElementNotFound`] for unknown IDs and
    /// [`LookupError::WrongElementType`] when the ID is not a field.
    pub fn get_field(&self, id: ElementId) -> Result<&'a Field, LookupError> {
        match self.get_element(id, ElementKind::Field)? {
            SchemaElement::Field(field) => Ok(field),
            other => Err(wrong_type(id, ElementKind::Field, other)),
        }
    }

    /// Looks up a subfield, accepting a field ID as well.
    ///
    /// For a field ID the field's scalar part is returned. This is the only
    /// lookup that crosses element kinds.
    ///
    /// # Errors
    ///
    /// [`LookupError::ElementNotFound`] for unknown IDs and
    /// [`LookupError::WrongElementType`] for section IDs.
    pub fn get_subfield(&self, id: ElementId) -> Result<&'a Subfield, LookupError> {
        match self.get(id).ok_or(LookupError::ElementNotFound(id))? {
            SchemaElement::Subfield(subfield) => Ok(subfield),
            SchemaElement::Field(field) => Ok(&field.scalar),
            other => Err(wrong_type(id, ElementKind::Subfield, other)),
        }
    }
}

fn wrong_type(id: ElementId, expected: ElementKind, found: SchemaElement<'_>) -> LookupError {
    LookupError::WrongElementType {
        id,
        expected,
        found: found.kind(),
    }
}
