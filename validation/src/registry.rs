//! Datatype registry with single-parent inheritance checks.
//!
//! The registry is an explicit value owned by the application and lent to
//! [`FormValidator`](crate::FormValidator)s by reference. Populate it during
//! setup and treat it as read-only afterwards; validation only ever takes
//! `&DatatypeRegistry`. Mutating it while validations run requires a lock
//! supplied by the caller (e.g. `RwLock<DatatypeRegistry>`).
//!
//! # Example
//!
//! ```
//! use form_schema_validation::*;
//!
//! let mut registry = DatatypeRegistry::with_default_datatypes().unwrap();
//! registry
//!     .add_datatype(Datatype::new(
//!         DatatypeDefinition::new("@custom/age", "age").inherits_from(INT64_DATATYPE),
//!         NumberValidator::<i64>::new(),
//!     ))
//!     .unwrap();
//!
//! assert!(registry.get_datatype("@custom/age").is_ok());
//! assert!(matches!(
//!     registry.delete_datatype(INT64_DATATYPE),
//!     Err(RegistryError::IsParent { .. })
//! ));
//! ```

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::datatype::{Datatype, DatatypeDefinition};
use crate::error::{RegistryError, Result};
use crate::number::NumberValidator;

/// Identifier of the built-in 64-bit integer datatype.
pub const INT64_DATATYPE: &str = "@default/int64";

/// Identifier of the built-in 64-bit float datatype.
pub const FLOAT64_DATATYPE: &str = "@default/float64";

/// Datatypes known to the application, keyed by identifier.
#[derive(Debug, Default)]
pub struct DatatypeRegistry {
    datatypes: HashMap<String, Datatype>,
}

impl DatatypeRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the built-in numeric datatypes
    /// ([`INT64_DATATYPE`] and [`FLOAT64_DATATYPE`]).
    ///
    /// # Errors
    ///
    /// Propagates [`add_datatype`](Self::add_datatype) failures.
    pub fn with_default_datatypes() -> Result<Self> {
        let mut registry = Self::new();
        registry.add_datatype(Datatype::new(
            DatatypeDefinition::new(INT64_DATATYPE, "int64"),
            NumberValidator::<i64>::new(),
        ))?;
        registry.add_datatype(Datatype::new(
            DatatypeDefinition::new(FLOAT64_DATATYPE, "float64"),
            NumberValidator::<f64>::new(),
        ))?;
        Ok(registry)
    }

    /// Registers a datatype.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::Duplicate`] if the identifier is taken.
    /// - [`RegistryError::InvalidParent`] if `inherits_from` names an
    ///   unknown datatype or one whose `allows_subfields` differs.
    pub fn add_datatype(&mut self, datatype: Datatype) -> Result<()> {
        let definition = datatype.definition();
        let identifier = definition.identifier.clone();

        if self.datatypes.contains_key(&identifier) {
            warn!(datatype = %identifier, "rejected duplicate datatype");
            return Err(RegistryError::Duplicate(identifier));
        }

        if let Some(parent_id) = &definition.inherits_from {
            let valid_parent = self.datatypes.get(parent_id).is_some_and(|parent| {
                parent.definition().allows_subfields == definition.allows_subfields
            });
            if !valid_parent {
                warn!(datatype = %identifier, parent = %parent_id, "rejected invalid parent");
                return Err(RegistryError::InvalidParent {
                    identifier,
                    parent: parent_id.clone(),
                });
            }
        }

        debug!(datatype = %identifier, "registered datatype");
        self.datatypes.insert(identifier, datatype);
        Ok(())
    }

    /// Looks up a datatype.
    ///
    /// # Errors
    ///
    /// [`RegistryError::NotFound`] if nothing is registered under `identifier`.
    pub fn get_datatype(&self, identifier: &str) -> Result<&Datatype> {
        self.datatypes
            .get(identifier)
            .ok_or_else(|| RegistryError::NotFound(identifier.to_string()))
    }

    /// Removes a datatype and returns it.
    ///
    /// Only direct children block the deletion; delete children first.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::NotFound`] if nothing is registered under `identifier`.
    /// - [`RegistryError::IsParent`] if another datatype inherits from it.
    pub fn delete_datatype(&mut self, identifier: &str) -> Result<Datatype> {
        if !self.datatypes.contains_key(identifier) {
            return Err(RegistryError::NotFound(identifier.to_string()));
        }

        if let Some(child) = self
            .datatypes
            .values()
            .find(|d| d.definition().inherits_from.as_deref() == Some(identifier))
        {
            warn!(
                datatype = %identifier,
                child = %child.identifier(),
                "refused to delete parent datatype"
            );
            return Err(RegistryError::IsParent {
                identifier: identifier.to_string(),
                child: child.identifier().to_string(),
            });
        }

        debug!(datatype = %identifier, "deleted datatype");
        self.datatypes
            .remove(identifier)
            .ok_or_else(|| RegistryError::NotFound(identifier.to_string()))
    }

    /// Snapshot of all definitions, in no particular order.
    pub fn datatype_definitions(&self) -> Vec<DatatypeDefinition> {
        self.datatypes
            .values()
            .map(|d| d.definition().clone())
            .collect()
    }

    /// Returns `true` if `identifier` is registered.
    pub fn contains(&self, identifier: &str) -> bool {
        self.datatypes.contains_key(identifier)
    }

    /// Number of registered datatypes.
    pub fn len(&self) -> usize {
        self.datatypes.len()
    }

    /// Returns `true` if no datatype is registered.
    pub fn is_empty(&self) -> bool {
        self.datatypes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_definitions() -> Vec<DatatypeDefinition> {
        vec![
            DatatypeDefinition::new("@test", "test"),
            DatatypeDefinition::new("@string", "string"),
        ]
    }

    fn datatype(definition: DatatypeDefinition) -> Datatype {
        Datatype::new(definition, NumberValidator::<i64>::new())
    }

    #[test]
    fn test_add_datatype_rejects_duplicates() {
        let mut registry = DatatypeRegistry::new();
        for definition in test_definitions() {
            registry.add_datatype(datatype(definition)).unwrap();
        }

        for definition in test_definitions() {
            let identifier = definition.identifier.clone();
            assert_eq!(
                registry.add_datatype(datatype(definition)).unwrap_err(),
                RegistryError::Duplicate(identifier)
            );
        }
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_add_datatype_checks_parent() {
        let mut registry = DatatypeRegistry::new();
        for definition in test_definitions() {
            registry.add_datatype(datatype(definition)).unwrap();
        }

        let orphan = DatatypeDefinition::new("inheriting", "test").inherits_from("@nonexistent");
        assert!(matches!(
            registry.add_datatype(datatype(orphan)),
            Err(RegistryError::InvalidParent { .. })
        ));

        let mismatched = DatatypeDefinition::new("inheriting", "test")
            .with_subfields()
            .inherits_from("@test");
        assert!(matches!(
            registry.add_datatype(datatype(mismatched)),
            Err(RegistryError::InvalidParent { .. })
        ));

        let child = DatatypeDefinition::new("inheriting", "test").inherits_from("@test");
        registry.add_datatype(datatype(child)).unwrap();
        assert!(registry.contains("inheriting"));
    }

    #[test]
    fn test_delete_datatype() {
        let mut registry = DatatypeRegistry::new();
        for definition in test_definitions() {
            assert_eq!(
                registry.delete_datatype(&definition.identifier).unwrap_err(),
                RegistryError::NotFound(definition.identifier.clone())
            );
        }

        for definition in test_definitions() {
            registry.add_datatype(datatype(definition)).unwrap();
        }
        for definition in test_definitions() {
            let removed = registry.delete_datatype(&definition.identifier).unwrap();
            assert_eq!(removed.definition(), &definition);
        }
        assert!(registry.is_empty());
    }

    #[test]
    fn test_delete_parent_blocked_until_child_removed() {
        let mut registry = DatatypeRegistry::new();
        for definition in test_definitions() {
            registry.add_datatype(datatype(definition)).unwrap();
        }
        let child = DatatypeDefinition::new("inheriting", "test").inherits_from("@string");
        registry.add_datatype(datatype(child)).unwrap();

        assert_eq!(
            registry.delete_datatype("@string").unwrap_err(),
            RegistryError::IsParent {
                identifier: "@string".into(),
                child: "inheriting".into(),
            }
        );

        registry.delete_datatype("inheriting").unwrap();
        registry.delete_datatype("@string").unwrap();
    }

    #[test]
    fn test_grandparent_only_blocked_by_direct_child() {
        let mut registry = DatatypeRegistry::new();
        registry
            .add_datatype(datatype(DatatypeDefinition::new("a", "a")))
            .unwrap();
        registry
            .add_datatype(datatype(DatatypeDefinition::new("b", "b").inherits_from("a")))
            .unwrap();
        registry
            .add_datatype(datatype(DatatypeDefinition::new("c", "c").inherits_from("b")))
            .unwrap();

        assert!(matches!(
            registry.delete_datatype("a"),
            Err(RegistryError::IsParent { .. })
        ));
        assert!(matches!(
            registry.delete_datatype("b"),
            Err(RegistryError::IsParent { .. })
        ));
        registry.delete_datatype("c").unwrap();
        registry.delete_datatype("b").unwrap();
        registry.delete_datatype("a").unwrap();
    }

    #[test]
    fn test_get_datatype() {
        let mut registry = DatatypeRegistry::new();
        for definition in test_definitions() {
            assert!(matches!(
                registry.get_datatype(&definition.identifier),
                Err(RegistryError::NotFound(_))
            ));
        }

        for definition in test_definitions() {
            registry.add_datatype(datatype(definition)).unwrap();
        }
        for definition in test_definitions() {
            let found = registry.get_datatype(&definition.identifier).unwrap();
            assert_eq!(found.definition(), &definition);
        }
    }

    #[test]
    fn test_datatype_definitions() {
        let mut registry = DatatypeRegistry::new();
        assert!(registry.datatype_definitions().is_empty());

        for definition in test_definitions() {
            registry.add_datatype(datatype(definition)).unwrap();
        }

        let mut identifiers: Vec<String> = registry
            .datatype_definitions()
            .into_iter()
            .map(|d| d.identifier)
            .collect();
        identifiers.sort();
        assert_eq!(identifiers, vec!["@string", "@test"]);
    }

    #[test]
    fn test_default_datatypes() {
        let registry = DatatypeRegistry::with_default_datatypes().unwrap();
        assert_eq!(registry.len(), 2);
        assert!(registry.contains(INT64_DATATYPE));
        assert!(registry.contains(FLOAT64_DATATYPE));
        assert!(
            registry
                .datatype_definitions()
                .iter()
                .all(|d| !d.allows_subfields)
        );
    }
}
