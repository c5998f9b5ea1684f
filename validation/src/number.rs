//! Numeric datatype validator, generic over the number kind.
//!
//! One implementation serves every integer and float datatype: the kind
//! only decides how constraint bounds and submitted values are decoded and
//! how digits are counted.
//!
//! Supported dynamic constraints:
//!
//! | Key | Fails when |
//! |---|---|
//! | `lt` | value ≥ `lt` |
//! | `gt` | value ≤ `gt` |
//! | `lte` | value > `lte` |
//! | `gte` | value < `gte` |
//! | `minDigits` | integer-part digits < `minDigits` |
//! | `maxDigits` | integer-part digits > `maxDigits` |
//!
//! # Example
//!
//! ```
//! use form_schema_core::{DataRecord, FormValidationSchema};
//! use form_schema_validation::{DatatypeValidator, NumberValidator};
//! use serde_json::json;
//!
//! let schema = FormValidationSchema::new()
//!     .with_dynamic_constraints(json!({ "lt": 100, "gt": 1 }));
//! let record = DataRecord::new(3, vec![json!(2), json!(1), json!(100)]);
//!
//! let errors = NumberValidator::<i64>::new().validate_data(&record, &schema);
//! let failed: Vec<_> = errors.iter().map(|e| e.index_data).collect();
//! assert_eq!(failed, vec![Some(1), Some(2)]);
//! ```

use std::fmt;
use std::marker::PhantomData;

use form_schema_core::{
    DataRecord, ElementErrors, ElementId, ErrorKind, Field, FormValidationError,
    FormValidationSchema, Subfield,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::datatype::{AllowsSubfields, DatatypeValidator};

/// A number kind the [`NumberValidator`] can work with.
pub trait Number:
    Copy
    + PartialOrd
    + fmt::Display
    + fmt::Debug
    + Serialize
    + DeserializeOwned
    + Send
    + Sync
    + 'static
{
    /// Short name used in error messages (e.g. `int64`).
    const KIND: &'static str;

    /// Decimal digits of the integer part of the absolute value.
    fn integer_digits(&self) -> usize;

    /// False for values a JSON number cannot represent, such as the infinity
    /// an out-of-range float decodes to.
    fn is_finite(&self) -> bool;
}

macro_rules! impl_integer {
    ($($ty:ty => $kind:literal),* $(,)?) => {
        $(
            impl Number for $ty {
                const KIND: &'static str = $kind;

                fn integer_digits(&self) -> usize {
                    self.unsigned_abs()
                        .checked_ilog10()
                        .map_or(1, |log| log as usize + 1)
                }

                fn is_finite(&self) -> bool {
                    true
                }
            }
        )*
    };
}

macro_rules! impl_float {
    ($($ty:ty => $kind:literal),* $(,)?) => {
        $(
            impl Number for $ty {
                const KIND: &'static str = $kind;

                fn integer_digits(&self) -> usize {
                    let integer_part = self.abs().trunc();
                    if !integer_part.is_finite() {
                        return 0;
                    }
                    format!("{integer_part:.0}").len()
                }

                fn is_finite(&self) -> bool {
                    <$ty>::is_finite(*self)
                }
            }
        )*
    };
}

impl_integer!(i32 => "int32", i64 => "int64");
impl_float!(f32 => "float32", f64 => "float64");

/// Dynamic constraints of a numeric (sub)field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumberConstraints<T> {
    /// Exclusive upper bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lt: Option<T>,
    /// Exclusive lower bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gt: Option<T>,
    /// Inclusive upper bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lte: Option<T>,
    /// Inclusive lower bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gte: Option<T>,
    /// Minimum digits of the integer part.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_digits: Option<i64>,
    /// Maximum digits of the integer part.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_digits: Option<i64>,
}

impl<T: Number> NumberConstraints<T> {
    /// Decodes the dynamic constraint payload. A missing payload is an empty
    /// constraint set.
    pub fn decode(payload: Option<&Value>) -> Result<Self, serde_json::Error> {
        match payload {
            None | Some(Value::Null) => Ok(Self {
                lt: None,
                gt: None,
                lte: None,
                gte: None,
                min_digits: None,
                max_digits: None,
            }),
            Some(value) => {
                let constraints = Self::deserialize(value)?;
                let bounds = [constraints.lt, constraints.gt, constraints.lte, constraints.gte];
                if bounds.iter().flatten().any(|bound| !bound.is_finite()) {
                    return Err(serde::de::Error::custom(format!(
                        "bound out of range for {}",
                        T::KIND
                    )));
                }
                Ok(constraints)
            }
        }
    }

    /// Reports bounds that contradict each other.
    pub fn check_consistency(&self, errors: &mut ElementErrors) {
        if let Some(lt) = self.lt {
            if self.gt.is_some_and(|gt| lt <= gt) {
                errors.fail("lt", "lt must be greater than gt");
            }
            if self.gte.is_some_and(|gte| lt <= gte) {
                errors.fail("lt", "lt must be greater than gte");
            }
        }

        if let Some(lte) = self.lte {
            if self.gt.is_some_and(|gt| lte <= gt) {
                errors.fail("lte", "lte must be greater than gt");
            }
            if self.gte.is_some_and(|gte| lte < gte) {
                errors.fail("lte", "lte must be greater than or equal to gte");
            }
        }

        if let (Some(min), Some(max)) = (self.min_digits, self.max_digits) {
            if min > max {
                errors.fail("minDigits", "minDigits must not be greater than maxDigits");
            }
        }

        if self.max_digits.is_some_and(|max| max <= 0) {
            errors.fail("maxDigits", "maxDigits must be greater than 0");
        }
    }

    /// Checks one decoded value against every configured bound.
    pub fn check_value(&self, index: usize, value: T, errors: &mut ElementErrors) {
        if let Some(lt) = self.lt {
            if value >= lt {
                errors.fail_at(index, "lt", format!("must be less than {lt}"), lt);
            }
        }

        if let Some(gt) = self.gt {
            if value <= gt {
                errors.fail_at(index, "gt", format!("must be greater than {gt}"), gt);
            }
        }

        if let Some(lte) = self.lte {
            if value > lte {
                errors.fail_at(index, "lte", format!("must be less than or equal to {lte}"), lte);
            }
        }

        if let Some(gte) = self.gte {
            if value < gte {
                errors.fail_at(
                    index,
                    "gte",
                    format!("must be greater than or equal to {gte}"),
                    gte,
                );
            }
        }

        let digits = i64::try_from(value.integer_digits()).unwrap_or(i64::MAX);
        if let Some(min) = self.min_digits {
            if digits < min {
                errors.fail_at(
                    index,
                    "minDigits",
                    format!("must have at least {min} digits"),
                    min,
                );
            }
        }

        if let Some(max) = self.max_digits {
            if digits > max {
                errors.fail_at(
                    index,
                    "maxDigits",
                    format!("must have at most {max} digits"),
                    max,
                );
            }
        }
    }
}

/// Validator for numeric datatypes of kind `T`.
///
/// Numeric datatypes never allow subfields.
#[derive(Debug, Clone, Copy)]
pub struct NumberValidator<T> {
    allows_subfields: AllowsSubfields,
    kind: PhantomData<T>,
}

impl<T: Number> NumberValidator<T> {
    /// Creates the validator.
    pub fn new() -> Self {
        Self {
            allows_subfields: AllowsSubfields(false),
            kind: PhantomData,
        }
    }

    fn check_declaration(
        &self,
        id: ElementId,
        schema: &FormValidationSchema,
    ) -> Vec<FormValidationError> {
        let mut errors = ElementErrors::new(ErrorKind::Schema, id);
        match NumberConstraints::<T>::decode(schema.dynamic_constraints.as_ref()) {
            Ok(constraints) => constraints.check_consistency(&mut errors),
            Err(err) => errors.fail(
                "dynamicConstraints",
                format!("invalid {} constraints: {err}", T::KIND),
            ),
        }
        errors.into_errors()
    }
}

impl<T: Number> Default for NumberValidator<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Number> DatatypeValidator for NumberValidator<T> {
    fn validate_schema(&self, field: &Field) -> Vec<FormValidationError> {
        let mut errors = self.allows_subfields.validate(field);
        errors.extend(self.check_declaration(field.scalar.id, &field.scalar.validation_schema));
        errors
    }

    fn validate_subfield_schema(&self, subfield: &Subfield) -> Vec<FormValidationError> {
        self.check_declaration(subfield.id, &subfield.validation_schema)
    }

    fn validate_data(
        &self,
        record: &DataRecord,
        schema: &FormValidationSchema,
    ) -> Vec<FormValidationError> {
        let id = record.schema_element_id;
        let constraints = match NumberConstraints::<T>::decode(schema.dynamic_constraints.as_ref())
        {
            Ok(constraints) => constraints,
            Err(err) => {
                return vec![
                    FormValidationError::schema(
                        id,
                        format!("invalid {} constraints: {err}", T::KIND),
                    )
                    .with_constraint("dynamicConstraints"),
                ];
            }
        };

        let mut errors = ElementErrors::new(ErrorKind::Data, id);
        for (index, raw) in record.data.iter().enumerate() {
            match T::deserialize(raw) {
                Ok(value) if value.is_finite() => {
                    constraints.check_value(index, value, &mut errors);
                }
                Ok(_) => errors.push(
                    FormValidationError::data_with_index(
                        id,
                        index,
                        format!("value is out of range for {}", T::KIND),
                    )
                    .with_constraint("datatype"),
                ),
                Err(err) => errors.push(
                    FormValidationError::data_with_index(
                        id,
                        index,
                        format!("value is not a valid {}: {err}", T::KIND),
                    )
                    .with_constraint("datatype"),
                ),
            }
        }
        errors.into_errors()
    }
}
