use std::sync::Arc;
use std::thread;

use form_schema_core::{
    DataRecord, ErrorKind, Field, FormSchema, FormValidationError, FormValidationSchema,
    SCHEMA_INVALID_ID,
};
use form_schema_validation::{
    AllowsSubfields, BasicConstraintsValidator, Datatype, DatatypeDefinition, DatatypeRegistry,
    DatatypeValidator, FormValidator, INT64_DATATYPE, NumberValidator, ValidatorConfig,
};
use serde_json::{Value, json};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Accepts any value; columns are checked through their own datatypes.
struct TableValidator;

impl DatatypeValidator for TableValidator {
    fn validate_schema(&self, field: &Field) -> Vec<FormValidationError> {
        AllowsSubfields(true).validate(field)
    }

    fn validate_data(
        &self,
        _record: &DataRecord,
        _schema: &FormValidationSchema,
    ) -> Vec<FormValidationError> {
        Vec::new()
    }
}

fn registry() -> DatatypeRegistry {
    let mut registry = DatatypeRegistry::with_default_datatypes().unwrap();
    registry
        .add_datatype(Datatype::new(
            DatatypeDefinition::new("@custom/table", "table").with_subfields(),
            TableValidator,
        ))
        .unwrap();
    registry
        .add_datatype(Datatype::new(
            DatatypeDefinition::new("@custom/year", "year").inherits_from(INT64_DATATYPE),
            NumberValidator::<i32>::new(),
        ))
        .unwrap();
    registry
}

/// Parses a schema document the way a client would submit it and assigns IDs.
fn parse_schema(document: Value) -> FormSchema {
    let mut schema: FormSchema = serde_json::from_value(document).unwrap();
    schema.generate_ids();
    schema
}

/// IDs: 1 "Person", 2 "Address", 3 "Zip", 4 "Age", 5 "Children",
/// 6 "Name", 7 "Born".
fn survey() -> FormSchema {
    parse_schema(json!({
        "title": "Survey",
        "sections": [{
            "title": "Person",
            "subsections": [{
                "title": "Address",
                "fields": [{
                    "title": "Zip",
                    "type": "@default/int64",
                    "validationSchema": {
                        "maxItems": 1,
                        "dynamicConstraints": { "minDigits": 5, "maxDigits": 5 }
                    }
                }]
            }],
            "fields": [
                {
                    "title": "Age",
                    "type": "@default/int64",
                    "validationSchema": {
                        "minItems": 1,
                        "maxItems": 1,
                        "dynamicConstraints": { "gte": 0, "lt": 150 }
                    }
                },
                {
                    "title": "Children",
                    "type": "@custom/table",
                    "subfields": [
                        { "title": "Name", "type": "@default/float64" },
                        {
                            "title": "Born",
                            "type": "@custom/year",
                            "validationSchema": {
                                "dynamicConstraints": { "gt": 1900 }
                            }
                        }
                    ]
                }
            ]
        }]
    }))
}

fn messages(errors: &[FormValidationError]) -> Vec<&str> {
    errors.iter().map(|e| e.message.as_str()).collect()
}

// ---------------------------------------------------------------------------
// Schema validation
// ---------------------------------------------------------------------------

#[test]
fn test_parsed_schema_ids_and_validity() {
    let schema = survey();
    assert_eq!(schema.element_count(), 7);
    assert_eq!(schema.sections[0].subsections[0].fields[0].scalar.id, 3);
    assert_eq!(schema.sections[0].fields[1].subfields[1].id, 7);

    let registry = registry();
    let validator = FormValidator::new(&registry, BasicConstraintsValidator::new(100));
    assert!(validator.validate_schema(&schema).is_empty());
}

#[test]
fn test_single_unknown_datatype() {
    let schema = parse_schema(json!({
        "title": "Broken",
        "sections": [{
            "title": "Only",
            "fields": [{ "title": "Mystery", "type": "@custom/unknown" }]
        }]
    }));

    let registry = registry();
    let validator = FormValidator::new(&registry, BasicConstraintsValidator::new(100));
    let errors = validator.validate_schema(&schema);

    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, ErrorKind::Schema);
    assert_eq!(errors[0].schema_element_id, 2);
    assert_eq!(errors[0].message, "datatype does not exist");
}

#[test]
fn test_schema_findings_across_layers() {
    let schema = parse_schema(json!({
        "title": "Broken",
        "sections": [{
            "title": "Only",
            "fields": [
                {
                    "title": "Count",
                    "type": "@default/int64",
                    "validationSchema": {
                        "minItems": 3,
                        "maxItems": 2,
                        "dynamicConstraints": { "lte": 1, "gte": 5 }
                    }
                },
                {
                    "title": "Ratio",
                    "type": "@default/float64",
                    "subfields": [{ "title": "Part", "type": "@default/float64" }]
                },
                {
                    "title": "Bad payload",
                    "type": "@default/int64",
                    "validationSchema": { "dynamicConstraints": { "lt": "high" } }
                }
            ]
        }]
    }));

    let registry = registry();
    let validator = FormValidator::new(&registry, BasicConstraintsValidator::new(100));
    let errors = validator.validate_schema(&schema);

    let ids: Vec<_> = errors.iter().map(|e| e.schema_element_id).collect();
    assert_eq!(ids, vec![2, 2, 3, 5]);
    assert_eq!(
        &messages(&errors)[..3],
        &[
            "max items must be greater or equal to min items",
            "lte must be greater than or equal to gte",
            "subfields are not allowed to be set in schema",
        ]
    );
    assert!(errors.iter().all(|e| e.is_schema_error()));
}

#[test]
fn test_schema_too_deep() {
    let mut section = json!({ "title": "leaf" });
    for _ in 0..6 {
        section = json!({ "title": "level", "subsections": [section] });
    }
    let schema = parse_schema(json!({ "title": "Deep", "sections": [section] }));

    let registry = registry();
    let strict = FormValidator::new(&registry, BasicConstraintsValidator::new(100));
    let errors = strict.validate_schema(&schema);
    assert_eq!(messages(&errors), vec!["too many subsection levels"]);
    assert_eq!(errors[0].schema_element_id, 6);

    let relaxed = strict.with_max_recursion(6);
    assert!(relaxed.validate_schema(&schema).is_empty());
}

// ---------------------------------------------------------------------------
// Data validation
// ---------------------------------------------------------------------------

#[test]
fn test_valid_submission() {
    let schema = survey();
    let records: Vec<DataRecord> = serde_json::from_value(json!([
        { "schemaElementID": 3, "data": [12345] },
        { "schemaElementID": 4, "data": [42] },
        { "schemaElementID": 6, "data": [1.5, 2] },
        { "schemaElementID": 7, "data": [1990, 2001] }
    ]))
    .unwrap();

    let registry = registry();
    let validator = FormValidator::new(&registry, BasicConstraintsValidator::new(100));
    assert!(validator.validate_data(&records, &schema).is_empty());
}

#[test]
fn test_invalid_submission_reports_everything() {
    let schema = survey();
    let records = vec![
        DataRecord::new(3, vec![json!(123), json!(99999)]),
        DataRecord::new(4, vec![]),
        DataRecord::new(7, vec![json!(1850), json!("1999"), json!(3_000_000_000i64)]),
        DataRecord::new(2, vec![json!(1)]),
        DataRecord::new(50, vec![json!(1)]),
    ];

    let registry = registry();
    let validator = FormValidator::new(&registry, BasicConstraintsValidator::new(100));
    let errors = validator.validate_data(&records, &schema);

    let summary: Vec<_> = errors
        .iter()
        .map(|e| (e.schema_element_id, e.index_data, e.constraint.as_deref()))
        .collect();
    assert_eq!(
        summary,
        vec![
            (3, None, Some("maxItems")),
            (3, Some(0), Some("minDigits")),
            (4, None, Some("minItems")),
            (7, Some(0), Some("gt")),
            (7, Some(1), Some("datatype")),
            (7, Some(2), Some("datatype")),
            (2, None, None),
            (50, None, None),
        ]
    );
    assert_eq!(
        &messages(&errors)[6..],
        &["element of schema id is not a (sub)field", "schema id does not exist"]
    );
    assert!(errors.iter().all(|e| e.is_data_error()));
}

#[test]
fn test_data_against_invalid_schema() {
    let mut schema = survey();
    schema.sections[0].fields[1].subfields[0].id = 3;

    let registry = registry();
    let validator = FormValidator::new(&registry, BasicConstraintsValidator::new(100));
    let errors = validator.validate_data(&[DataRecord::new(4, vec![json!(1)])], &schema);

    assert_eq!(
        messages(&errors),
        vec!["form schema is invalid", "id must be unique"]
    );
    assert_eq!(errors[0].schema_element_id, SCHEMA_INVALID_ID);
    assert_eq!(errors[1].schema_element_id, 3);
}

#[test]
fn test_errors_serialize_for_clients() {
    let schema = survey();
    let registry = registry();
    let validator = FormValidator::new(&registry, BasicConstraintsValidator::new(100));

    let errors = validator.validate_data(&[DataRecord::new(4, vec![json!(150)])], &schema);
    assert_eq!(
        serde_json::to_value(&errors).unwrap(),
        json!([{
            "name": "form data error",
            "schemaElementID": 4,
            "indexData": 0,
            "constraint": "lt",
            "config": 150,
            "message": "must be less than 150"
        }])
    );
}

// ---------------------------------------------------------------------------
// Configuration and sharing
// ---------------------------------------------------------------------------

#[test]
fn test_validator_from_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("validator.yml");
    std::fs::write(&path, "default_max_items: 1\n").unwrap();

    let config = ValidatorConfig::load(&path).unwrap();
    let registry = registry();
    let validator = FormValidator::from_config(&registry, &config);
    assert_eq!(validator.max_recursion(), 5);

    let errors = validator.validate_data(
        &[DataRecord::new(6, vec![json!(1.0), json!(2.0)])],
        &survey(),
    );
    assert_eq!(
        messages(&errors),
        vec!["amount of data too high, maximum allowed 1"]
    );
}

#[test]
fn test_shared_registry_across_threads() {
    let registry = Arc::new(registry());
    let schema = Arc::new(survey());

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let registry = Arc::clone(&registry);
            let schema = Arc::clone(&schema);
            thread::spawn(move || {
                let validator =
                    FormValidator::new(&registry, BasicConstraintsValidator::new(100));
                validator.validate_data(&[DataRecord::new(4, vec![json!(i * 100)])], &schema)
            })
        })
        .collect();

    let counts: Vec<usize> = handles
        .into_iter()
        .map(|h| h.join().unwrap().len())
        .collect();
    assert_eq!(counts, vec![0, 0, 1, 1]);
}
