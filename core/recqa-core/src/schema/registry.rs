use std::collections::BTreeMap;
use std::sync::Arc;

use super::validate::CompiledSchema;

pub const DEFAULT_COLLECTION: &str = "default";

/// Collection name to schema mapping with an explicit fallback to the
/// default schema.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    default: Arc<CompiledSchema>,
    collections: BTreeMap<String, Arc<CompiledSchema>>,
}

impl SchemaRegistry {
    pub fn new(default: CompiledSchema) -> Self {
        let default = Arc::new(default);
        let mut collections = BTreeMap::new();
        collections.insert(DEFAULT_COLLECTION.to_string(), Arc::clone(&default));
        Self { default, collections }
    }

    /// Install a dedicated schema for one collection.
    pub fn register(&mut self, collection: impl Into<String>, schema: CompiledSchema) {
        self.collections.insert(collection.into(), Arc::new(schema));
    }

    /// Make sure `collection` has an entry, aliasing the default schema if it
    /// has none. Empty names are not registered.
    pub fn observe(&mut self, collection: &str) {
        if collection.is_empty() || self.collections.contains_key(collection) {
            return;
        }
        self.collections
            .insert(collection.to_string(), Arc::clone(&self.default));
    }

    /// Schema for `collection`; unknown and empty names fall back to the default.
    pub fn resolve(&self, collection: &str) -> &CompiledSchema {
        match self.collections.get(collection) {
            Some(schema) => schema,
            None => &self.default,
        }
    }

    pub fn collections(&self) -> impl Iterator<Item = &str> {
        self.collections.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema(t: &str) -> CompiledSchema {
        CompiledSchema::new(&json!({"properties": {"id": {"type": t}}})).expect("compile")
    }

    #[test]
    fn observed_collections_alias_default() {
        let mut reg = SchemaRegistry::new(schema("string"));
        reg.observe("products");
        reg.observe("");
        reg.observe("products");
        assert_eq!(reg.collections().collect::<Vec<_>>(), vec!["default", "products"]);
        assert!(reg.resolve("products").validate(&json!({"id": 1})).len() == 1);
    }

    #[test]
    fn unknown_collections_fall_back_to_default() {
        let reg = SchemaRegistry::new(schema("string"));
        assert!(reg.resolve("nope").validate(&json!({"id": "x"})).is_empty());
        assert_eq!(reg.resolve("").validate(&json!({"id": 1})).len(), 1);
    }

    #[test]
    fn registered_schema_wins_over_default() {
        let mut reg = SchemaRegistry::new(schema("string"));
        reg.register("counts", schema("integer"));
        reg.observe("counts");
        assert!(reg.resolve("counts").validate(&json!({"id": 1})).is_empty());
        assert_eq!(reg.resolve("other").validate(&json!({"id": 1})).len(), 1);
    }
}
