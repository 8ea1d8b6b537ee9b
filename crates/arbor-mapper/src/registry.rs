//! Per-mapper cache of validated type tables.
//!
//! Types are described lazily: the first time the mapper meets a type
//! (as a root object, a child, or a reference target) its descriptor table is
//! built and validated, then shared as `Arc<MappedType>` for the lifetime of
//! the registry.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::info;

use crate::descriptor::MappedType;
use crate::entity::{Mapped, TypeInfo};
use crate::error::{MapError, MapResult};

/// Registry of mapped types, keyed by type name.
///
/// Readers see either no entry or a fully built one. Two threads meeting the
/// same type for the first time may both build it, but only one table is
/// published and both callers receive it.
#[derive(Debug, Default)]
pub struct Registry {
    types: RwLock<HashMap<&'static str, Arc<MappedType>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `T` up front, surfacing configuration errors early.
    pub fn register<T: Mapped>(&self) -> MapResult<Arc<MappedType>> {
        self.get_or_build(TypeInfo::of::<T>())
    }

    /// The table for `info`, building it on first use.
    ///
    /// Fails if a different type already registered the same name.
    pub fn get_or_build(&self, info: TypeInfo) -> MapResult<Arc<MappedType>> {
        if let Some(mapped) = self.get(info.name())? {
            return same_type(mapped, info);
        }

        let built = Arc::new(MappedType::build(info)?);
        let mut types = self
            .types
            .write()
            .map_err(|e| MapError::LockPoisoned(e.to_string()))?;
        let mapped = types.entry(info.name()).or_insert_with(|| {
            info!(type_name = info.name(), fields = built.fields().len(), "mapped type registered");
            Arc::clone(&built)
        });
        same_type(Arc::clone(mapped), info)
    }

    /// Look up an already registered type by name.
    pub fn get(&self, name: &str) -> MapResult<Option<Arc<MappedType>>> {
        let types = self
            .types
            .read()
            .map_err(|e| MapError::LockPoisoned(e.to_string()))?;
        Ok(types.get(name).cloned())
    }

    /// Look up a registered type by name, failing if it is unknown.
    pub fn require(&self, name: &str) -> MapResult<Arc<MappedType>> {
        self.get(name)?
            .ok_or_else(|| MapError::UnknownType(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.types.read().map(|t| t.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Registered type names, sorted.
    pub fn type_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self
            .types
            .read()
            .map(|t| t.keys().copied().collect())
            .unwrap_or_default();
        names.sort_unstable();
        names
    }
}

fn same_type(mapped: Arc<MappedType>, info: TypeInfo) -> MapResult<Arc<MappedType>> {
    if mapped.info() != info {
        return Err(MapError::Configuration {
            type_name: info.name().to_string(),
            reason: "type name already registered by another type".to_string(),
        });
    }
    Ok(mapped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    use crate::descriptor::FieldDescriptor;
    use crate::entity::{FieldValue, Fields};

    #[derive(Debug, Default)]
    struct Page;

    impl Fields for Page {
        fn get_field(&self, _field: &str) -> FieldValue {
            FieldValue::Null
        }

        fn set_field(&mut self, field: &str, _value: FieldValue) -> MapResult<()> {
            Err(MapError::unknown_field("Page", field))
        }
    }

    impl Mapped for Page {
        const TYPE_NAME: &'static str = "Page";

        fn describe() -> Vec<FieldDescriptor> {
            vec![
                FieldDescriptor::name("name"),
                FieldDescriptor::property("title"),
            ]
        }
    }

    #[derive(Debug, Default)]
    struct Broken;

    impl Fields for Broken {
        fn get_field(&self, _field: &str) -> FieldValue {
            FieldValue::Null
        }

        fn set_field(&mut self, _field: &str, _value: FieldValue) -> MapResult<()> {
            Ok(())
        }
    }

    impl Mapped for Broken {
        const TYPE_NAME: &'static str = "Broken";

        fn describe() -> Vec<FieldDescriptor> {
            vec![FieldDescriptor::name("a"), FieldDescriptor::name("b")]
        }
    }

    mod other {
        use super::*;

        /// Claims the name of the outer `Page`.
        #[derive(Debug, Default)]
        pub struct Page;

        impl Fields for Page {
            fn get_field(&self, _field: &str) -> FieldValue {
                FieldValue::Null
            }

            fn set_field(&mut self, _field: &str, _value: FieldValue) -> MapResult<()> {
                Ok(())
            }
        }

        impl Mapped for Page {
            const TYPE_NAME: &'static str = "Page";

            fn describe() -> Vec<FieldDescriptor> {
                vec![FieldDescriptor::property("body")]
            }
        }
    }

    #[test]
    fn builds_once_and_shares() {
        let registry = Registry::new();
        assert!(registry.is_empty());
        let first = registry.register::<Page>().unwrap();
        let second = registry.get_or_build(TypeInfo::of::<Page>()).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.type_names(), vec!["Page"]);
    }

    #[test]
    fn invalid_types_are_not_published() {
        let registry = Registry::new();
        let err = registry.register::<Broken>().unwrap_err();
        assert!(matches!(err, MapError::Configuration { .. }));
        assert!(registry.get("Broken").unwrap().is_none());
    }

    #[test]
    fn clashing_type_names_are_rejected() {
        let registry = Registry::new();
        let page = registry.register::<Page>().unwrap();
        let err = registry.register::<other::Page>().unwrap_err();
        assert!(matches!(err, MapError::Configuration { ref type_name, .. } if type_name == "Page"));

        // The first registration stays in place.
        let again = registry.get("Page").unwrap().unwrap();
        assert!(Arc::ptr_eq(&page, &again));
        assert_eq!(again.fields().len(), 2);
    }

    #[test]
    fn require_reports_unknown_types() {
        let registry = Registry::new();
        let err = registry.require("Ghost").unwrap_err();
        assert!(matches!(err, MapError::UnknownType(name) if name == "Ghost"));
    }

    #[test]
    fn concurrent_first_use_publishes_one_table() {
        let registry = Arc::new(Registry::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || registry.register::<Page>().unwrap())
            })
            .collect();
        let tables: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for table in &tables[1..] {
            assert!(Arc::ptr_eq(&tables[0], table));
        }
        assert_eq!(registry.len(), 1);
    }
}
