use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

use anyhow::{bail, Result};
use bson::{Bson, Document};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn direction(self) -> i32 {
        match self {
            SortOrder::Ascending => 1,
            SortOrder::Descending => -1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSpec {
    pub keys: Vec<(String, SortOrder)>,
    pub unique: bool,
}

impl IndexSpec {
    pub fn new(keys: &[(&str, SortOrder)]) -> Self {
        IndexSpec {
            keys: keys
                .iter()
                .map(|(field, order)| (field.to_string(), *order))
                .collect(),
            unique: false,
        }
    }

    pub fn ascending(field: &str) -> Self {
        Self::new(&[(field, SortOrder::Ascending)])
    }

    pub fn descending(field: &str) -> Self {
        Self::new(&[(field, SortOrder::Descending)])
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Server-style index name, e.g. `symbol_1_openTime_-1`.
    pub fn name(&self) -> String {
        self.keys
            .iter()
            .map(|(field, order)| format!("{field}_{}", order.direction()))
            .collect::<Vec<_>>()
            .join("_")
    }

    fn key_of(&self, document: &Document) -> Vec<Bson> {
        self.keys
            .iter()
            .map(|(field, _)| document.get(field).cloned().unwrap_or(Bson::Null))
            .collect()
    }

    fn describe_key(&self, key: &[Bson]) -> String {
        let pairs: Vec<String> = self
            .keys
            .iter()
            .zip(key)
            .map(|((field, _), value)| format!("{field}: {value}"))
            .collect();
        format!("{{ {} }}", pairs.join(", "))
    }
}

/// Restricted login the backend services use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceAccount {
    pub user: String,
    pub password: String,
    pub role: String,
    pub database: String,
}

/// A unique index rejected an insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateKey {
    pub collection: String,
    pub key: String,
}

impl fmt::Display for DuplicateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Duplicate key in {}: {}", self.collection, self.key)
    }
}

impl std::error::Error for DuplicateKey {}

/// Administrative surface of the document database.
pub trait DocumentStore {
    /// Returns `false` when the account already existed.
    fn create_user(&self, account: &ServiceAccount) -> impl Future<Output = Result<bool>> + Send;

    /// Returns `false` when the collection already existed. The validator
    /// only applies to a collection this call creates.
    fn ensure_collection(
        &self,
        name: &str,
        validator: Option<&Document>,
    ) -> impl Future<Output = Result<bool>> + Send;

    fn create_index(
        &self,
        collection: &str,
        index: &IndexSpec,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Ordered insert: stops at the first rejected document, earlier ones
    /// stay inserted. A unique-index violation surfaces as [`DuplicateKey`].
    fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Document>,
    ) -> impl Future<Output = Result<usize>> + Send;
}

/// Checks `document` against a `{ $jsonSchema: ... }` validator, covering
/// `required` and per-property `bsonType`. Returns the first problem found.
fn schema_violation(validator: &Document, document: &Document) -> Option<String> {
    let schema = validator.get_document("$jsonSchema").ok()?;

    if let Ok(required) = schema.get_array("required") {
        for field in required.iter().filter_map(Bson::as_str) {
            if !document.contains_key(field) {
                return Some(format!("missing required field {field}"));
            }
        }
    }

    let properties = schema.get_document("properties").ok()?;
    for (field, rule) in properties {
        let (Some(value), Some(expected)) = (
            document.get(field),
            rule.as_document().and_then(|rule| rule.get_str("bsonType").ok()),
        ) else {
            continue;
        };
        if !matches_bson_type(value, expected) {
            return Some(format!("{field} is not of type {expected}"));
        }
    }
    None
}

fn matches_bson_type(value: &Bson, expected: &str) -> bool {
    match expected {
        "string" => matches!(value, Bson::String(_)),
        "date" => matches!(value, Bson::DateTime(_)),
        "double" => matches!(value, Bson::Double(_)),
        "int" => matches!(value, Bson::Int32(_)),
        "long" => matches!(value, Bson::Int64(_)),
        "number" => matches!(
            value,
            Bson::Double(_) | Bson::Int32(_) | Bson::Int64(_) | Bson::Decimal128(_)
        ),
        "object" => matches!(value, Bson::Document(_)),
        "array" => matches!(value, Bson::Array(_)),
        "bool" => matches!(value, Bson::Boolean(_)),
        _ => true,
    }
}

#[derive(Debug, Default)]
struct Collection {
    documents: Vec<Document>,
    indexes: Vec<IndexSpec>,
    validator: Option<Document>,
}

impl Collection {
    fn violation(&self, document: &Document) -> Option<(&IndexSpec, Vec<Bson>)> {
        self.indexes
            .iter()
            .filter(|index| index.unique)
            .find_map(|index| {
                let key = index.key_of(document);
                self.documents
                    .iter()
                    .any(|existing| index.key_of(existing) == key)
                    .then_some((index, key))
            })
    }
}

#[derive(Debug, Default)]
struct State {
    collections: BTreeMap<String, Collection>,
    users: Vec<ServiceAccount>,
}

/// Store kept in process memory. Enforces unique indexes and collection
/// validators the way the server does, which is all the seeding logic
/// relies on.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn documents(&self, collection: &str) -> Vec<Document> {
        self.state()
            .collections
            .get(collection)
            .map(|c| c.documents.clone())
            .unwrap_or_default()
    }

    pub fn indexes(&self, collection: &str) -> Vec<IndexSpec> {
        self.state()
            .collections
            .get(collection)
            .map(|c| c.indexes.clone())
            .unwrap_or_default()
    }

    pub fn validator(&self, collection: &str) -> Option<Document> {
        self.state()
            .collections
            .get(collection)
            .and_then(|c| c.validator.clone())
    }

    pub fn collection_names(&self) -> Vec<String> {
        self.state().collections.keys().cloned().collect()
    }

    pub fn users(&self) -> Vec<ServiceAccount> {
        self.state().users.clone()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DocumentStore for InMemoryStore {
    async fn create_user(&self, account: &ServiceAccount) -> Result<bool> {
        let mut state = self.state();
        if state.users.iter().any(|user| user.user == account.user) {
            return Ok(false);
        }
        state.users.push(account.clone());
        Ok(true)
    }

    async fn ensure_collection(&self, name: &str, validator: Option<&Document>) -> Result<bool> {
        let mut state = self.state();
        if state.collections.contains_key(name) {
            return Ok(false);
        }
        state.collections.insert(
            name.to_string(),
            Collection {
                validator: validator.cloned(),
                ..Collection::default()
            },
        );
        Ok(true)
    }

    async fn create_index(&self, collection: &str, index: &IndexSpec) -> Result<()> {
        let mut state = self.state();
        let target = state.collections.entry(collection.to_string()).or_default();

        if target.indexes.contains(index) {
            return Ok(());
        }
        if target.indexes.iter().any(|existing| existing.name() == index.name()) {
            bail!(
                "Index {} already exists on {collection} with different options",
                index.name()
            );
        }

        if index.unique {
            let mut seen = Vec::with_capacity(target.documents.len());
            for document in &target.documents {
                let key = index.key_of(document);
                if seen.contains(&key) {
                    bail!(DuplicateKey {
                        collection: collection.to_string(),
                        key: index.describe_key(&key),
                    });
                }
                seen.push(key);
            }
        }

        target.indexes.push(index.clone());
        Ok(())
    }

    async fn insert_many(&self, collection: &str, documents: Vec<Document>) -> Result<usize> {
        let mut state = self.state();
        let target = state.collections.entry(collection.to_string()).or_default();

        let mut inserted = 0;
        for document in documents {
            if let Some(reason) = target
                .validator
                .as_ref()
                .and_then(|validator| schema_violation(validator, &document))
            {
                bail!("Document failed validation in {collection}: {reason}");
            }
            if let Some((index, key)) = target.violation(&document) {
                bail!(DuplicateKey {
                    collection: collection.to_string(),
                    key: index.describe_key(&key),
                });
            }
            target.documents.push(document);
            inserted += 1;
        }
        Ok(inserted)
    }
}
