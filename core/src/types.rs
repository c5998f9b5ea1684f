//! Form schema type definitions.
//!
//! A [`FormSchema`] is a forest of [`Section`]s. Sections nest through
//! `subsections` and hold [`Field`]s; a field may carry [`Subfield`]s (for
//! example the columns of a table). Every element has an integer
//! [`ElementId`] that submitted data uses to reference it. IDs are assigned
//! by [`FormSchema::generate_ids`], never by hand.
//!
//! The types are designed for serialization with [`serde`] and use camelCase
//! names on the wire.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identifier of a schema element (section, field or subfield).
pub type ElementId = i64;

/// First ID handed out by [`FormSchema::generate_ids`].
pub const FIRST_ELEMENT_ID: ElementId = 1;

/// Item-count bounds that apply to every datatype.
///
/// Both bounds are checked against the length of the submitted data array
/// of the element that declares them.
///
/// # Examples
///
/// ```
/// use form_schema_core::BasicConstraints;
///
/// let constraints = BasicConstraints { min_items: Some(1), max_items: Some(3) };
/// assert!(constraints.is_declared());
/// assert!(!BasicConstraints::default().is_declared());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicConstraints {
    /// Minimum number of submitted values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_items: Option<i64>,
    /// Maximum number of submitted values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_items: Option<i64>,
}

impl BasicConstraints {
    /// Returns `true` if at least one bound is set.
    pub fn is_declared(&self) -> bool {
        self.min_items.is_some() || self.max_items.is_some()
    }
}

/// Validation rules of a (sub)field.
///
/// Basic constraints are understood by every datatype. The dynamic
/// constraints are an opaque payload that only the element's datatype knows
/// how to decode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormValidationSchema {
    /// Item-count bounds.
    #[serde(flatten)]
    pub basic: BasicConstraints,
    /// Datatype-specific constraint payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dynamic_constraints: Option<Value>,
}

impl FormValidationSchema {
    /// Creates an empty validation schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the minimum item count.
    pub fn with_min_items(mut self, min_items: i64) -> Self {
        self.basic.min_items = Some(min_items);
        self
    }

    /// Sets the maximum item count.
    pub fn with_max_items(mut self, max_items: i64) -> Self {
        self.basic.max_items = Some(max_items);
        self
    }

    /// Sets the datatype-specific constraint payload.
    ///
    /// # Examples
    ///
    /// ```
    /// use form_schema_core::FormValidationSchema;
    /// use serde_json::json;
    ///
    /// let schema = FormValidationSchema::new()
    ///     .with_max_items(1)
    ///     .with_dynamic_constraints(json!({ "lt": 100 }));
    /// assert_eq!(schema.basic.max_items, Some(1));
    /// assert!(schema.dynamic_constraints.is_some());
    /// ```
    pub fn with_dynamic_constraints(mut self, constraints: Value) -> Self {
        self.dynamic_constraints = Some(constraints);
        self
    }
}

/// A single input element of a form.
///
/// Subfields are the columns of a composite field. A [`Field`] also embeds
/// one of these as its own scalar part.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subfield {
    /// Generated element ID.
    #[serde(default)]
    pub id: ElementId,
    /// Display title.
    #[serde(default)]
    pub title: String,
    /// Identifier of the registered datatype (e.g. `@default/int64`).
    #[serde(rename = "type")]
    pub datatype: String,
    /// Optional help text, passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Validation rules for submitted values.
    #[serde(default)]
    pub validation_schema: FormValidationSchema,
}

impl Subfield {
    /// Creates a subfield with the given title and datatype.
    pub fn new(title: impl Into<String>, datatype: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            datatype: datatype.into(),
            ..Default::default()
        }
    }

    /// Adds a description.
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Replaces the validation rules.
    pub fn with_validation_schema(mut self, schema: FormValidationSchema) -> Self {
        self.validation_schema = schema;
        self
    }

    /// Assigns `starting_number` to this subfield and returns the next free ID.
    pub fn generate_ids(&mut self, starting_number: ElementId) -> ElementId {
        self.id = starting_number;
        starting_number + 1
    }
}

/// A form field with optional subfields.
///
/// The field's own metadata lives in `scalar`, which is flattened on the
/// wire. Wherever a subfield is expected, a bare field can stand in with its
/// scalar part.
///
/// # Examples
///
/// ```
/// use form_schema_core::{Field, Subfield};
///
/// let mut table = Field::new("Measurements", "@custom/table")
///     .with_subfield(Subfield::new("Width", "@default/int64"))
///     .with_subfield(Subfield::new("Height", "@default/int64"));
///
/// assert_eq!(table.generate_ids(10), 13);
/// assert_eq!(table.scalar.id, 10);
/// assert_eq!(table.subfields[1].id, 12);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// The field's own scalar part.
    #[serde(flatten)]
    pub scalar: Subfield,
    /// Nested subfields (table columns etc.). Subfields cannot nest further.
    #[serde(default)]
    pub subfields: Vec<Subfield>,
}

impl Field {
    /// Creates a field with the given title and datatype.
    pub fn new(title: impl Into<String>, datatype: impl Into<String>) -> Self {
        Self {
            scalar: Subfield::new(title, datatype),
            subfields: Vec::new(),
        }
    }

    /// Adds a description.
    pub fn with_description(mut self, description: &str) -> Self {
        self.scalar.description = Some(description.to_string());
        self
    }

    /// Replaces the validation rules.
    pub fn with_validation_schema(mut self, schema: FormValidationSchema) -> Self {
        self.scalar.validation_schema = schema;
        self
    }

    /// Adds a subfield.
    pub fn with_subfield(mut self, subfield: Subfield) -> Self {
        self.subfields.push(subfield);
        self
    }

    /// Numbers the field first, then each subfield in order.
    pub fn generate_ids(&mut self, starting_number: ElementId) -> ElementId {
        let mut current = self.scalar.generate_ids(starting_number);
        for subfield in &mut self.subfields {
            current = subfield.generate_ids(current);
        }
        current
    }
}

impl From<Subfield> for Field {
    fn from(scalar: Subfield) -> Self {
        Self {
            scalar,
            subfields: Vec::new(),
        }
    }
}

/// A group of fields with optional nested subsections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    /// Generated element ID.
    #[serde(default)]
    pub id: ElementId,
    /// Display title.
    #[serde(default)]
    pub title: String,
    /// Optional help text, passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Nested sections.
    #[serde(default)]
    pub subsections: Vec<Section>,
    /// Fields of this section.
    #[serde(default)]
    pub fields: Vec<Field>,
}

impl Section {
    /// Creates an empty section.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Adds a description.
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Adds a nested section.
    pub fn with_subsection(mut self, subsection: Section) -> Self {
        self.subsections.push(subsection);
        self
    }

    /// Adds a field.
    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Numbers this section, then every subsection (recursively), then its
    /// fields. Returns the next free ID.
    ///
    /// # Examples
    ///
    /// ```
    /// use form_schema_core::Section;
    ///
    /// let mut section = Section::new("root")
    ///     .with_subsection(Section::new("a"))
    ///     .with_subsection(Section::new("b"));
    ///
    /// assert_eq!(section.generate_ids(0), 3);
    /// assert_eq!(section.subsections[1].id, 2);
    /// ```
    pub fn generate_ids(&mut self, starting_number: ElementId) -> ElementId {
        self.id = starting_number;
        let mut current = starting_number + 1;

        for subsection in &mut self.subsections {
            current = subsection.generate_ids(current);
        }

        for field in &mut self.fields {
            current = field.generate_ids(current);
        }

        current
    }

    fn element_count(&self) -> usize {
        1 + self
            .subsections
            .iter()
            .map(Section::element_count)
            .sum::<usize>()
            + self
                .fields
                .iter()
                .map(|field| 1 + field.subfields.len())
                .sum::<usize>()
    }
}

/// Top-level form schema.
///
/// # Examples
///
/// ```
/// use form_schema_core::*;
///
/// let mut schema = FormSchema::new("Survey")
///     .with_section(
///         Section::new("Personal")
///             .with_field(Field::new("Age", "@default/int64")),
///     )
///     .with_section(Section::new("Other"));
///
/// schema.generate_ids();
/// assert_eq!(schema.sections[0].id, 1);
/// assert_eq!(schema.sections[0].fields[0].scalar.id, 2);
/// assert_eq!(schema.sections[1].id, 3);
/// assert_eq!(schema.element_count(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSchema {
    /// Form title.
    #[serde(default)]
    pub title: String,
    /// Root sections.
    #[serde(default)]
    pub sections: Vec<Section>,
}

impl FormSchema {
    /// Creates an empty schema.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            sections: Vec::new(),
        }
    }

    /// Adds a root section.
    pub fn with_section(mut self, section: Section) -> Self {
        self.sections.push(section);
        self
    }

    /// Assigns IDs to every element, starting at [`FIRST_ELEMENT_ID`].
    ///
    /// The walk is depth-first pre-order: a section gets its ID before its
    /// subsections, all subsections are numbered before the section's
    /// fields, and each field is numbered before its subfields. Downstream
    /// consumers rely on this order. Running it again renumbers everything.
    pub fn generate_ids(&mut self) {
        let mut current = FIRST_ELEMENT_ID;
        for section in &mut self.sections {
            current = section.generate_ids(current);
        }
    }

    /// Number of sections, fields and subfields in the tree.
    pub fn element_count(&self) -> usize {
        self.sections.iter().map(Section::element_count).sum()
    }
}
