//! In-process document store.

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::model::{Bootcamp, BootcampFields, Checks};

use super::{BootcampStore, Document, StoreError, UpdateOptions};

/// Keys a client may send but never write.
const READ_ONLY_KEYS: [&str; 3] = ["id", "slug", "createdAt"];

/// A [`BootcampStore`] that keeps every document in memory.
///
/// Each operation takes the lock once, so a find, create, update or delete
/// is atomic with respect to the others. Documents are kept in insertion
/// order; `find_all` returns them that way.
#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: RwLock<Vec<Bootcamp>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-loaded with `bootcamps`, kept in the given order.
    pub fn with_bootcamps(bootcamps: Vec<Bootcamp>) -> Self {
        Self { docs: RwLock::new(bootcamps) }
    }
}

/// Only the lowercase hyphenated form ids are issued in is accepted, so a
/// found entity's `id` always equals the one asked for.
fn parse_id(id: &str) -> Result<Uuid, StoreError> {
    match Uuid::parse_str(id) {
        Ok(uuid) if uuid.hyphenated().to_string() == id => Ok(uuid),
        _ => Err(StoreError::InvalidId { value: id.to_owned() }),
    }
}

/// Names are unique; `except` skips the entity being updated.
fn ensure_unique_name(docs: &[Bootcamp], name: &str, except: Option<Uuid>) -> Result<(), StoreError> {
    let taken = docs.iter().any(|b| b.name == name && Some(b.id) != except);
    if taken {
        return Err(StoreError::Duplicate { field: "name", value: name.to_owned() });
    }
    Ok(())
}

#[async_trait]
impl BootcampStore for MemoryStore {
    async fn find_all(&self) -> Result<Vec<Bootcamp>, StoreError> {
        Ok(self.docs.read().await.clone())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Bootcamp>, StoreError> {
        let id = parse_id(id)?;
        Ok(self.docs.read().await.iter().find(|b| b.id == id).cloned())
    }

    async fn create(&self, payload: Document) -> Result<Bootcamp, StoreError> {
        let fields = BootcampFields::from_document(&payload, Checks::Full)
            .map_err(StoreError::Validation)?;

        let mut docs = self.docs.write().await;
        ensure_unique_name(&docs, &fields.name, None)?;

        let bootcamp = Bootcamp::new(fields);
        docs.push(bootcamp.clone());
        debug!(id = %bootcamp.id, name = %bootcamp.name, "bootcamp created");
        Ok(bootcamp)
    }

    async fn update_by_id(
        &self,
        id: &str,
        payload: Document,
        options: UpdateOptions,
    ) -> Result<Option<Bootcamp>, StoreError> {
        let id = parse_id(id)?;
        let mut docs = self.docs.write().await;
        let Some(index) = docs.iter().position(|b| b.id == id) else {
            return Ok(None);
        };

        let before = docs[index].clone();
        let mut merged = before.to_document();
        for (key, value) in payload {
            if !READ_ONLY_KEYS.contains(&key.as_str()) {
                merged.insert(key, value);
            }
        }

        let checks = if options.run_validators { Checks::Full } else { Checks::CastOnly };
        let fields = BootcampFields::from_document(&merged, checks).map_err(StoreError::Validation)?;
        ensure_unique_name(&docs, &fields.name, Some(id))?;

        let after = Bootcamp::with_id(before.id, before.created_at, fields);
        docs[index] = after.clone();
        debug!(%id, "bootcamp updated");

        Ok(Some(if options.return_updated { after } else { before }))
    }

    async fn delete_by_id(&self, id: &str) -> Result<Option<Bootcamp>, StoreError> {
        let id = parse_id(id)?;
        let mut docs = self.docs.write().await;
        let removed = docs.iter().position(|b| b.id == id).map(|index| docs.remove(index));
        if removed.is_some() {
            debug!(%id, "bootcamp deleted");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("test document must be an object"),
        }
    }

    const UPDATE: UpdateOptions = UpdateOptions { return_updated: true, run_validators: true };

    #[tokio::test]
    async fn create_assigns_id_and_keeps_fields() {
        let store = MemoryStore::new();
        let created = store
            .create(doc(json!({ "name": "Devworks", "housing": true, "isAdmin": true })))
            .await
            .unwrap();

        assert_eq!(created.name, "Devworks");
        assert!(created.housing);
        assert_eq!(store.find_by_id(&created.id.to_string()).await.unwrap(), Some(created));
    }

    #[tokio::test]
    async fn create_rejects_invalid_payload() {
        let store = MemoryStore::new();
        let err = store.create(doc(json!({ "phone": "1" }))).await.unwrap_err();

        assert!(matches!(err, StoreError::Validation(ref errors) if errors.len() == 1));
        assert!(store.find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_name_is_rejected() {
        let store = MemoryStore::new();
        store.create(doc(json!({ "name": "Foo" }))).await.unwrap();
        let err = store.create(doc(json!({ "name": "Foo" }))).await.unwrap_err();

        assert!(matches!(err, StoreError::Duplicate { field: "name", ref value } if value == "Foo"));
    }

    #[tokio::test]
    async fn find_all_keeps_insertion_order() {
        let store = MemoryStore::new();
        for name in ["a", "b", "c"] {
            store.create(doc(json!({ "name": name }))).await.unwrap();
        }

        let names: Vec<_> = store.find_all().await.unwrap().into_iter().map(|b| b.name).collect();
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[tokio::test]
    async fn malformed_id_is_invalid_everywhere() {
        let store = MemoryStore::new();

        assert!(matches!(store.find_by_id("123").await, Err(StoreError::InvalidId { .. })));
        assert!(matches!(
            store.update_by_id("123", Document::new(), UPDATE).await,
            Err(StoreError::InvalidId { .. })
        ));
        assert!(matches!(store.delete_by_id("123").await, Err(StoreError::InvalidId { .. })));
    }

    #[tokio::test]
    async fn non_canonical_id_forms_are_invalid() {
        let store = MemoryStore::new();
        let created = store.create(doc(json!({ "name": "Devworks" }))).await.unwrap();
        let id = created.id;

        for alias in [
            id.hyphenated().to_string().to_uppercase(),
            id.simple().to_string(),
            id.braced().to_string(),
            id.urn().to_string(),
        ] {
            assert!(
                matches!(store.find_by_id(&alias).await, Err(StoreError::InvalidId { .. })),
                "{alias} should not resolve"
            );
        }
        assert_eq!(store.find_by_id(&id.to_string()).await.unwrap(), Some(created));
    }

    #[tokio::test]
    async fn absent_id_is_none() {
        let store = MemoryStore::new();
        let id = Uuid::new_v4().to_string();

        assert_eq!(store.find_by_id(&id).await.unwrap(), None);
        assert_eq!(store.update_by_id(&id, Document::new(), UPDATE).await.unwrap(), None);
        assert_eq!(store.delete_by_id(&id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn update_changes_only_submitted_fields() {
        let store = MemoryStore::new();
        let created = store
            .create(doc(json!({ "name": "Foo", "phone": "555", "housing": true })))
            .await
            .unwrap();
        let id = created.id.to_string();

        let updated = store
            .update_by_id(&id, doc(json!({ "name": "Bar Camp", "id": "ignored" })), UPDATE)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(updated.name, "Bar Camp");
        assert_eq!(updated.slug, "bar-camp");
        assert_eq!(updated.phone.as_deref(), Some("555"));
        assert!(updated.housing);
    }

    #[tokio::test]
    async fn update_can_return_previous_state() {
        let store = MemoryStore::new();
        let created = store.create(doc(json!({ "name": "Foo" }))).await.unwrap();
        let options = UpdateOptions { return_updated: false, run_validators: true };

        let returned = store
            .update_by_id(&created.id.to_string(), doc(json!({ "name": "Bar" })), options)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(returned.name, "Foo");
        let stored = store.find_by_id(&created.id.to_string()).await.unwrap().unwrap();
        assert_eq!(stored.name, "Bar");
    }

    #[tokio::test]
    async fn update_validators_are_optional() {
        let store = MemoryStore::new();
        let created = store.create(doc(json!({ "name": "Foo" }))).await.unwrap();
        let id = created.id.to_string();
        let payload = || doc(json!({ "email": "not an email" }));

        let strict = store.update_by_id(&id, payload(), UPDATE).await.unwrap_err();
        assert!(matches!(strict, StoreError::Validation(_)));

        let lenient = UpdateOptions { return_updated: true, run_validators: false };
        let updated = store.update_by_id(&id, payload(), lenient).await.unwrap().unwrap();
        assert_eq!(updated.email.as_deref(), Some("not an email"));
    }

    #[tokio::test]
    async fn update_to_taken_name_is_duplicate() {
        let store = MemoryStore::new();
        store.create(doc(json!({ "name": "Foo" }))).await.unwrap();
        let bar = store.create(doc(json!({ "name": "Bar" }))).await.unwrap();

        let err = store
            .update_by_id(&bar.id.to_string(), doc(json!({ "name": "Foo" })), UPDATE)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { .. }));

        let renamed_to_self = store
            .update_by_id(&bar.id.to_string(), doc(json!({ "name": "Bar" })), UPDATE)
            .await
            .unwrap();
        assert!(renamed_to_self.is_some());
    }

    #[tokio::test]
    async fn delete_removes_and_returns() {
        let store = MemoryStore::new();
        let created = store.create(doc(json!({ "name": "Foo" }))).await.unwrap();
        let id = created.id.to_string();

        assert_eq!(store.delete_by_id(&id).await.unwrap(), Some(created));
        assert_eq!(store.find_by_id(&id).await.unwrap(), None);
    }
}
