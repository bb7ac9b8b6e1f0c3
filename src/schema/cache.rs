//! Process-wide memoization of derived schemas, one entry per resource type.

use crate::error::ConfigError;
use crate::model::{ResourceDefinition, ResourceFieldDescriptor};
use crate::schema::{derive_schema, DerivedSchema, RowParser};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Everything derived for one resource type.
#[derive(Debug)]
pub struct ResourceSchema {
    pub fields: Vec<ResourceFieldDescriptor>,
    pub derived: DerivedSchema,
    pub parser: RowParser,
}

impl ResourceSchema {
    pub fn derive(def: &ResourceDefinition) -> Result<Self, ConfigError> {
        let fields = def.fields();
        let derived = derive_schema(&fields)?;
        Ok(ResourceSchema {
            parser: RowParser::new(fields.clone()),
            fields,
            derived,
        })
    }
}

/// Compute-if-absent under a single lock, so concurrent first use derives once.
/// Keyed by type name and flattened field list: two definitions sharing a name but
/// declaring different fields get separate entries. Entries live for the process.
#[derive(Default)]
pub struct SchemaCache {
    entries: Mutex<HashMap<String, Vec<Arc<ResourceSchema>>>>,
}

impl SchemaCache {
    pub fn new() -> Self {
        SchemaCache::default()
    }

    pub fn get_or_derive(&self, def: &ResourceDefinition) -> Result<Arc<ResourceSchema>, ConfigError> {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let fields = def.fields();
        let variants = entries.entry(def.name.clone()).or_default();
        if let Some(schema) = variants.iter().find(|s| s.fields == fields) {
            return Ok(schema.clone());
        }
        if !variants.is_empty() {
            tracing::warn!(resource = %def.name, "same type name declared with different fields");
        }
        tracing::debug!(resource = %def.name, "deriving schema");
        let schema = Arc::new(ResourceSchema::derive(def)?);
        variants.push(schema.clone());
        Ok(schema)
    }

    pub fn len(&self) -> usize {
        let count = |e: &HashMap<String, Vec<Arc<ResourceSchema>>>| -> usize { e.values().map(Vec::len).sum() };
        self.entries
            .lock()
            .map(|e| count(&e))
            .unwrap_or_else(|poisoned| count(&poisoned.into_inner()))
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{database_list, ValueType};

    #[test]
    fn test_derives_once_per_type() {
        let cache = SchemaCache::new();
        let def = database_list("App\\ColorsList").build().unwrap();
        let a = cache.get_or_derive(&def).unwrap();
        let b = cache.get_or_derive(&def).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_same_name_different_fields_gets_own_schema() {
        let cache = SchemaCache::new();
        let plain = database_list("App\\TagsList").build().unwrap();
        let extended = database_list("App\\TagsList")
            .field("weight", ValueType::Integer, [])
            .build()
            .unwrap();
        let a = cache.get_or_derive(&plain).unwrap();
        let b = cache.get_or_derive(&extended).unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(b.fields.len(), a.fields.len() + 1);
        assert!(Arc::ptr_eq(&a, &cache.get_or_derive(&plain).unwrap()));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_concurrent_first_use() {
        let cache = Arc::new(SchemaCache::new());
        let def = Arc::new(database_list("App\\SizesList").build().unwrap());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = cache.clone();
                let def = def.clone();
                std::thread::spawn(move || cache.get_or_derive(&def).unwrap())
            })
            .collect();
        let schemas: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(schemas.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }
}
