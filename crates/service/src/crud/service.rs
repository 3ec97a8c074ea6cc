use std::{collections::BTreeMap, sync::Arc};

use serde_json::Value;
use tracing::debug;

use crate::errors::ServiceError;
use crate::storage::memory_map_store::MemoryMapStore;

use super::policy::{CreateMode, CreateShape, CrudPolicy, FieldCheck, IdSource, MissingPolicy, Resource, UpdateMode, Variant};
use super::record::{self, Record, RecordId};

/// How a write landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A new record was stored.
    Created,
    /// Fields were merged into an existing record.
    Updated,
    /// Lenient create hit an existing id; nothing changed.
    Existing,
}

/// Result of Create or Update.
#[derive(Debug, Clone, PartialEq)]
pub struct Written<K> {
    pub id: K,
    pub record: Record,
    pub outcome: Outcome,
}

/// Result of Delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    Deleted,
    /// The id did not exist and the policy tolerates that.
    Absent,
}

/// Create/read/update/delete over one record store, parameterised by a
/// [`CrudPolicy`].
pub struct CrudService<K> {
    store: Arc<MemoryMapStore<K, Record>>,
    policy: CrudPolicy,
    resource: Resource,
}

impl<K: RecordId> CrudService<K> {
    pub fn new(resource: Resource, policy: CrudPolicy, store: Arc<MemoryMapStore<K, Record>>) -> Self {
        Self { store, policy, resource }
    }

    pub fn for_variant(variant: Variant, store: Arc<MemoryMapStore<K, Record>>) -> Self {
        Self::new(variant.resource(), variant.policy(), store)
    }

    pub fn store(&self) -> &Arc<MemoryMapStore<K, Record>> {
        &self.store
    }

    pub fn policy(&self) -> &CrudPolicy {
        &self.policy
    }

    fn entity(&self) -> &'static str {
        self.resource.singular()
    }

    /// Store a new record.
    ///
    /// `path_id` is used when the policy reads ids from the path; otherwise the
    /// id comes out of the payload after validation.
    pub async fn create(&self, path_id: Option<K>, payload: Option<Record>) -> Result<Written<K>, ServiceError> {
        let entity = self.entity();
        if self.policy.lookup_first && self.policy.create == CreateMode::Strict {
            if let Some(id) = path_id.as_ref() {
                if self.store.contains(id).await {
                    return Err(ServiceError::already_exists(entity));
                }
            }
        }

        let data = check_fields(self.policy.create_fields, payload)?;
        let id = match self.policy.id_source {
            IdSource::Path => path_id.ok_or_else(|| ServiceError::Internal("path id missing".into()))?,
            IdSource::Body(field) => data
                .get(field)
                .and_then(K::from_value)
                .ok_or_else(|| ServiceError::bad_request(format!("Invalid field: {field}")))?,
        };
        let record = shape(self.policy.create_shape, &id, data);
        let mode = self.policy.create;

        let key = id.clone();
        let (record, outcome) = self
            .store
            .update_map(move |map| match map.get(&key) {
                Some(existing) => match mode {
                    CreateMode::Strict => Err(ServiceError::already_exists(entity)),
                    CreateMode::Lenient => Ok((existing.clone(), Outcome::Existing)),
                },
                None => {
                    map.insert(key, record.clone());
                    Ok((record, Outcome::Created))
                }
            })
            .await?;
        debug!(%id, ?outcome, "create");
        Ok(Written { id, record, outcome })
    }

    /// Fetch one record. `Ok(None)` only when the policy tolerates missing ids.
    pub async fn read(&self, id: &K) -> Result<Option<Record>, ServiceError> {
        match self.store.get(id).await {
            Some(record) => Ok(Some(record)),
            None => match self.policy.missing_read {
                MissingPolicy::Tolerate => Ok(None),
                MissingPolicy::Error => Err(ServiceError::not_found(self.entity())),
            },
        }
    }

    /// Every record, optionally narrowed to names containing `name`
    /// (case-insensitive). An empty filter means no filter.
    pub async fn list(&self, name: Option<&str>) -> BTreeMap<K, Record> {
        match name.filter(|n| !n.is_empty()) {
            Some(needle) => {
                let needle = needle.to_lowercase();
                self.store.filter(|_, rec| record::name_contains(rec, &needle)).await
            }
            None => self.store.list().await,
        }
    }

    /// Merge `payload` into the record, creating it when the policy upserts.
    pub async fn update(&self, id: K, payload: Option<Record>) -> Result<Written<K>, ServiceError> {
        let entity = self.entity();
        let mode = self.policy.update;
        if self.policy.lookup_first && mode == UpdateMode::Strict && !self.store.contains(&id).await {
            return Err(ServiceError::not_found(entity));
        }

        let fields = check_fields(self.policy.update_fields, payload)?;
        let key = id.clone();
        let (record, outcome) = self
            .store
            .update_map(move |map| {
                if let Some(existing) = map.get_mut(&key) {
                    record::merge(existing, fields);
                    return Ok((existing.clone(), Outcome::Updated));
                }
                match mode {
                    UpdateMode::Strict => Err(ServiceError::not_found(entity)),
                    UpdateMode::Upsert => {
                        map.insert(key, fields.clone());
                        Ok((fields, Outcome::Created))
                    }
                }
            })
            .await?;
        debug!(%id, ?outcome, "update");
        Ok(Written { id, record, outcome })
    }

    /// Remove a record.
    pub async fn delete(&self, id: &K) -> Result<Removal, ServiceError> {
        if self.store.remove(id).await {
            debug!(%id, "delete");
            return Ok(Removal::Deleted);
        }
        match self.policy.missing_delete {
            MissingPolicy::Tolerate => Ok(Removal::Absent),
            MissingPolicy::Error => Err(ServiceError::not_found(self.entity())),
        }
    }
}

/// Validate a payload against a field check. An empty object counts as absent.
fn check_fields(check: FieldCheck, payload: Option<Record>) -> Result<Record, ServiceError> {
    let data = payload.filter(|d| !d.is_empty());
    match check {
        FieldCheck::NonEmpty => data.ok_or_else(|| ServiceError::bad_request("Missing JSON data")),
        FieldCheck::Aggregate(fields) => data
            .filter(|d| fields.iter().all(|f| d.contains_key(*f)))
            .ok_or_else(|| ServiceError::bad_request("Missing required fields")),
        FieldCheck::PerField(fields) => {
            let data = data.ok_or_else(|| ServiceError::bad_request("Missing JSON data"))?;
            if let Some(missing) = fields.iter().find(|f| !data.contains_key(**f)) {
                return Err(ServiceError::bad_request(format!("Missing field: {missing}")));
            }
            Ok(data)
        }
    }
}

fn shape<K: RecordId>(shape: CreateShape, id: &K, data: Record) -> Record {
    match shape {
        CreateShape::AsSubmitted => data,
        CreateShape::Project { id_field, fields } => {
            let mut out = Record::new();
            out.insert(id_field.to_string(), Value::String(id.to_string()));
            for f in fields {
                if let Some(v) = data.get(*f) {
                    out.insert((*f).to_string(), v.clone());
                }
            }
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rec(v: Value) -> Record {
        v.as_object().cloned().unwrap_or_default()
    }

    fn items(variant: Variant) -> CrudService<i64> {
        CrudService::for_variant(variant, MemoryMapStore::new())
    }

    fn users(variant: Variant) -> CrudService<String> {
        CrudService::for_variant(variant, MemoryMapStore::new())
    }

    fn item(name: &str) -> Option<Record> {
        Some(rec(json!({"name": name, "description": ""})))
    }

    #[tokio::test]
    async fn create_then_read_round_trips() -> Result<(), anyhow::Error> {
        for v in [Variant::ItemsBasic, Variant::ItemsIntermediate, Variant::ItemsAdvanced] {
            let svc = items(v);
            let submitted = rec(json!({"name": "Item1", "description": "Desc1"}));
            let w = svc.create(Some(1), Some(submitted.clone())).await?;
            assert_eq!(w.outcome, Outcome::Created);
            assert_eq!(svc.read(&1).await?, Some(submitted));
        }
        Ok(())
    }

    #[tokio::test]
    async fn strict_create_twice_conflicts() -> Result<(), anyhow::Error> {
        let svc = items(Variant::ItemsIntermediate);
        svc.create(Some(2), item("Item2")).await?;
        let err = svc.create(Some(2), item("Item2")).await.unwrap_err();
        assert_eq!(err, ServiceError::Conflict("Item already exists".into()));
        assert_eq!(svc.store().len().await, 1);
        Ok(())
    }

    #[tokio::test]
    async fn lenient_create_returns_existing_unchanged() -> Result<(), anyhow::Error> {
        let svc = items(Variant::ItemsBasic);
        svc.create(Some(1), item("Item1")).await?;
        let w = svc.create(Some(1), item("Duplicate")).await?;
        assert_eq!(w.outcome, Outcome::Existing);
        assert_eq!(w.record["name"], "Item1");
        assert_eq!(svc.read(&1).await?.expect("stored")["name"], "Item1");
        Ok(())
    }

    #[tokio::test]
    async fn upsert_creates_then_merges() -> Result<(), anyhow::Error> {
        let svc = items(Variant::ItemsAdvanced);
        let w = svc.update(9, item("CreatedViaPut")).await?;
        assert_eq!(w.outcome, Outcome::Created);
        let w = svc.update(9, Some(rec(json!({"description": "later"})))).await?;
        assert_eq!(w.outcome, Outcome::Updated);
        assert_eq!(w.record["name"], "CreatedViaPut");
        assert_eq!(w.record["description"], "later");
        assert_eq!(svc.store().len().await, 1);
        Ok(())
    }

    #[tokio::test]
    async fn strict_update_of_missing_id_is_not_found() {
        let svc = users(Variant::UsersIntermediate);
        let err = svc.update("999".into(), Some(rec(json!({"name": "Ghost"})))).await.unwrap_err();
        assert_eq!(err, ServiceError::NotFound("User not found".into()));
        assert!(svc.store().is_empty().await);
    }

    #[tokio::test]
    async fn delete_then_read() -> Result<(), anyhow::Error> {
        let strict = items(Variant::ItemsIntermediate);
        strict.create(Some(5), item("Item5")).await?;
        assert_eq!(strict.delete(&5).await?, Removal::Deleted);
        assert!(matches!(strict.read(&5).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(strict.delete(&5).await, Err(ServiceError::NotFound(_))));

        let lenient = items(Variant::ItemsBasic);
        lenient.create(Some(5), item("Item5")).await?;
        assert_eq!(lenient.delete(&5).await?, Removal::Deleted);
        assert_eq!(lenient.read(&5).await?, None);
        assert_eq!(lenient.delete(&5).await?, Removal::Absent);
        Ok(())
    }

    #[tokio::test]
    async fn list_filters_by_name_case_insensitively() -> Result<(), anyhow::Error> {
        let svc = items(Variant::ItemsAdvanced);
        svc.create(Some(6), item("SpecialItem")).await?;
        svc.create(Some(7), item("OtherItem")).await?;

        let filtered = svc.list(Some("sPECIAL")).await;
        assert_eq!(filtered.keys().copied().collect::<Vec<_>>(), vec![6]);
        assert_eq!(svc.list(Some("")).await.len(), 2);
        assert_eq!(svc.list(None).await.len(), 2);
        assert_eq!(svc.store().len().await, 2);
        Ok(())
    }

    #[tokio::test]
    async fn users_body_id_and_aggregate_validation() -> Result<(), anyhow::Error> {
        let svc = users(Variant::UsersIntermediate);
        let err = svc.create(None, Some(rec(json!({"user_id": "4", "name": "Bob"})))).await.unwrap_err();
        assert_eq!(err, ServiceError::BadRequest("Missing required fields".into()));
        let err = svc.create(None, None).await.unwrap_err();
        assert_eq!(err.message(), "Missing required fields");

        let w = svc
            .create(None, Some(rec(json!({"user_id": "3", "name": "Alice", "email": "a@x.com", "age": 30}))))
            .await?;
        assert_eq!(w.id, "3");
        assert_eq!(w.record["age"], 30);
        Ok(())
    }

    #[tokio::test]
    async fn users_advanced_names_the_missing_field() {
        let svc = users(Variant::UsersAdvanced);
        let err = svc.create(None, Some(rec(json!({"name": "Bob"})))).await.unwrap_err();
        assert_eq!(err.message(), "Missing field: user_id");
        let err = svc.create(None, Some(Record::new())).await.unwrap_err();
        assert_eq!(err.message(), "Missing JSON data");
        let err = svc.update("1".into(), Some(rec(json!({"name": "No email"})))).await.unwrap_err();
        assert_eq!(err.message(), "Missing field: email");
    }

    #[tokio::test]
    async fn users_basic_projects_and_checks_existence_first() -> Result<(), anyhow::Error> {
        let svc = users(Variant::UsersBasic);
        let w = svc
            .create(Some("1".into()), Some(rec(json!({"name": "Alice", "email": "a@x.com", "extra": true}))))
            .await?;
        assert_eq!(w.record, rec(json!({"user_id": "1", "name": "Alice", "email": "a@x.com"})));

        // duplicate wins over a broken body
        let err = svc.create(Some("1".into()), None).await.unwrap_err();
        assert_eq!(err.message(), "User already exists");
        // absent id wins over a missing body
        let err = svc.update("2".into(), None).await.unwrap_err();
        assert_eq!(err.message(), "User not found");
        let err = svc.update("1".into(), None).await.unwrap_err();
        assert_eq!(err.message(), "Missing JSON data");
        Ok(())
    }

    #[tokio::test]
    async fn validation_failure_leaves_store_untouched() {
        let svc = users(Variant::UsersAdvanced);
        let _ = svc.create(None, Some(rec(json!({"user_id": "1", "name": "x"})))).await;
        assert!(svc.store().is_empty().await);
    }

    #[tokio::test]
    async fn concurrent_upserts_keep_one_record_per_id() -> Result<(), anyhow::Error> {
        let svc = Arc::new(items(Variant::ItemsIntermediate));
        let mut handles = Vec::new();
        for n in 0..16 {
            let svc = Arc::clone(&svc);
            handles.push(tokio::spawn(async move {
                svc.update(1, Some(rec(json!({"name": format!("n{n}"), format!("f{n}"): n})))).await
            }));
        }
        let mut created = 0;
        for h in handles {
            if h.await??.outcome == Outcome::Created {
                created += 1;
            }
        }
        assert_eq!(created, 1);
        let stored = svc.read(&1).await?.expect("stored");
        // every merge landed on the same record
        assert_eq!(stored.len(), 17);
        Ok(())
    }
}
