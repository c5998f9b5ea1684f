use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ElementId;

/// Values submitted for one schema element.
///
/// The values stay raw JSON until the element's datatype decodes them.
///
/// # Examples
///
/// ```
/// use form_schema_core::DataRecord;
/// use serde_json::json;
///
/// let record: DataRecord = serde_json::from_value(json!({
///     "schemaElementID": 4,
///     "data": [1, 2, 3]
/// }))
/// .unwrap();
/// assert_eq!(record.schema_element_id, 4);
/// assert_eq!(record.len(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataRecord {
    /// ID of the (sub)field the values belong to.
    #[serde(rename = "schemaElementID")]
    pub schema_element_id: ElementId,
    /// Submitted values, in order.
    #[serde(default)]
    pub data: Vec<Value>,
}

impl DataRecord {
    /// Creates a record for `schema_element_id`.
    pub fn new(schema_element_id: ElementId, data: Vec<Value>) -> Self {
        Self {
            schema_element_id,
            data,
        }
    }

    /// Number of submitted values.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if no values were submitted.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
