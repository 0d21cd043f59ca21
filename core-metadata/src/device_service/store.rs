//! In-memory device service store
//!
//! Reference implementation of the device service domain operations over
//! two `DashMap`s: records by id and a unique name index. Shard guards are
//! never held across an `.await`.

use chrono::Utc;
use dashmap::{mapref::entry::Entry, DashMap};
use uuid::Uuid;

use super::model::{DeviceService, DeviceServicePatch};
use super::DeviceServiceResource;
use crate::handlers::{ApiError, DomainOperations, ListQuery, RequestContext, Resource};

const ENTITY: &str = DeviceServiceResource::DISPLAY_NAME;

/// Device service store backed by concurrent hash maps
#[derive(Debug, Default)]
pub struct InMemoryDeviceServiceStore {
    records: DashMap<String, DeviceService>,
    names: DashMap<String, String>,
}

impl InMemoryDeviceServiceStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored device services
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn id_for_name(&self, name: &str) -> Result<String, ApiError> {
        self.names
            .get(name)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| ApiError::not_found(ENTITY, "name", name))
    }
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

impl DomainOperations<DeviceServiceResource> for InMemoryDeviceServiceStore {
    async fn create(&self, mut record: DeviceService, ctx: &RequestContext) -> Result<String, ApiError> {
        ctx.ensure_active()?;

        if record.id.is_empty() {
            record.id = Uuid::new_v4().to_string();
        }
        let now = now_millis();
        record.created = now;
        record.modified = now;

        let name_slot = match self.names.entry(record.name.clone()) {
            Entry::Occupied(_) => {
                return Err(ApiError::conflict(format!(
                    "{ENTITY} name {} already exists",
                    record.name
                )))
            }
            Entry::Vacant(slot) => slot,
        };
        let record_slot = match self.records.entry(record.id.clone()) {
            Entry::Occupied(_) => {
                return Err(ApiError::conflict(format!(
                    "{ENTITY} id {} already exists",
                    record.id
                )))
            }
            Entry::Vacant(slot) => slot,
        };

        let id = record.id.clone();
        name_slot.insert(id.clone());
        record_slot.insert(record);

        tracing::debug!(correlation_id = %ctx.correlation_id(), %id, "device service created");
        Ok(id)
    }

    async fn get_by_name(&self, name: &str, ctx: &RequestContext) -> Result<DeviceService, ApiError> {
        ctx.ensure_active()?;

        let id = self.id_for_name(name)?;
        self.records
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| ApiError::not_found(ENTITY, "name", name))
    }

    async fn patch(&self, patch: DeviceServicePatch, ctx: &RequestContext) -> Result<(), ApiError> {
        ctx.ensure_active()?;

        let id = match (&patch.id, &patch.name) {
            (Some(id), _) => id.clone(),
            (None, Some(name)) => self.id_for_name(name)?,
            (None, None) => {
                return Err(ApiError::validation(format!(
                    "{ENTITY} update must carry an id or a name"
                )))
            }
        };

        let mut record = self
            .records
            .get_mut(&id)
            .ok_or_else(|| ApiError::not_found(ENTITY, "id", &id))?;

        if let Some(ref name) = patch.name {
            if *name != record.name {
                return Err(ApiError::validation(format!(
                    "{ENTITY} name {name} does not match the name {} stored for id {id}",
                    record.name
                )));
            }
        }

        patch.apply(&mut record);
        record.modified = now_millis();

        tracing::debug!(correlation_id = %ctx.correlation_id(), %id, "device service patched");
        Ok(())
    }

    async fn delete_by_id(&self, id: &str, ctx: &RequestContext) -> Result<(), ApiError> {
        ctx.ensure_active()?;

        let (_, record) = self
            .records
            .remove(id)
            .ok_or_else(|| ApiError::not_found(ENTITY, "id", id))?;
        self.names.remove_if(&record.name, |_, owner| owner == id);

        tracing::debug!(correlation_id = %ctx.correlation_id(), %id, "device service deleted");
        Ok(())
    }

    async fn delete_by_name(&self, name: &str, ctx: &RequestContext) -> Result<(), ApiError> {
        ctx.ensure_active()?;

        let (_, id) = self
            .names
            .remove(name)
            .ok_or_else(|| ApiError::not_found(ENTITY, "name", name))?;
        self.records.remove(&id);

        tracing::debug!(correlation_id = %ctx.correlation_id(), %id, "device service deleted");
        Ok(())
    }

    async fn list(&self, query: &ListQuery, ctx: &RequestContext) -> Result<Vec<DeviceService>, ApiError> {
        ctx.ensure_active()?;

        let mut matches: Vec<DeviceService> = self
            .records
            .iter()
            .filter(|entry| query.labels.is_empty() || entry.has_any_label(&query.labels))
            .map(|entry| entry.value().clone())
            .collect();

        // Newest first
        matches.sort_by(|a, b| b.created.cmp(&a.created).then_with(|| a.name.cmp(&b.name)));

        Ok(matches
            .into_iter()
            .skip(query.skip())
            .take(query.take())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device_service::AdminState;
    use crate::handlers::ApiErrorKind;

    fn service(name: &str, labels: &[&str]) -> DeviceService {
        DeviceService {
            id: String::new(),
            name: name.to_string(),
            description: String::new(),
            labels: labels.iter().map(|l| l.to_string()).collect(),
            base_address: "http://localhost:59900".to_string(),
            admin_state: AdminState::Unlocked,
            created: 0,
            modified: 0,
        }
    }

    fn ctx() -> RequestContext {
        RequestContext::new("corr-test")
    }

    #[tokio::test]
    async fn test_create_assigns_uuid_and_timestamps() {
        let store = InMemoryDeviceServiceStore::new();
        let id = store.create(service("svc1", &[]), &ctx()).await.unwrap();

        assert!(Uuid::parse_str(&id).is_ok());
        let stored = store.get_by_name("svc1", &ctx()).await.unwrap();
        assert_eq!(stored.id, id);
        assert!(stored.created > 0);
        assert_eq!(stored.created, stored.modified);
    }

    #[tokio::test]
    async fn test_duplicate_name_conflicts() {
        let store = InMemoryDeviceServiceStore::new();
        store.create(service("svc1", &[]), &ctx()).await.unwrap();

        let err = store.create(service("svc1", &[]), &ctx()).await.unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::Conflict);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_get_unknown_name() {
        let store = InMemoryDeviceServiceStore::new();
        let err = store.get_by_name("nope", &ctx()).await.unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::EntityDoesNotExist);
    }

    #[tokio::test]
    async fn test_patch_by_name_keeps_labels() {
        let store = InMemoryDeviceServiceStore::new();
        store.create(service("svc1", &["keep"]), &ctx()).await.unwrap();

        let patch = DeviceServicePatch {
            name: Some("svc1".to_string()),
            description: Some("new".to_string()),
            ..Default::default()
        };
        store.patch(patch, &ctx()).await.unwrap();

        let stored = store.get_by_name("svc1", &ctx()).await.unwrap();
        assert_eq!(stored.description, "new");
        assert_eq!(stored.labels, vec!["keep".to_string()]);
    }

    #[tokio::test]
    async fn test_patch_by_id_with_mismatched_name() {
        let store = InMemoryDeviceServiceStore::new();
        let id = store.create(service("svc1", &[]), &ctx()).await.unwrap();

        let patch = DeviceServicePatch {
            id: Some(id),
            name: Some("other".to_string()),
            ..Default::default()
        };
        let err = store.patch(patch, &ctx()).await.unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::ValidationFailure);
    }

    #[tokio::test]
    async fn test_delete_by_id_frees_name() {
        let store = InMemoryDeviceServiceStore::new();
        let id = store.create(service("svc1", &[]), &ctx()).await.unwrap();

        store.delete_by_id(&id, &ctx()).await.unwrap();
        assert!(store.is_empty());
        assert!(store.create(service("svc1", &[]), &ctx()).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_missing() {
        let store = InMemoryDeviceServiceStore::new();
        let err = store.delete_by_name("ghost", &ctx()).await.unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::EntityDoesNotExist);
        let err = store.delete_by_id("ghost", &ctx()).await.unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::EntityDoesNotExist);
    }

    #[tokio::test]
    async fn test_list_filters_and_pages() {
        let store = InMemoryDeviceServiceStore::new();
        for (name, labels) in [("a", &["x"][..]), ("b", &["y"][..]), ("c", &["x", "y"][..]), ("d", &[][..])] {
            store.create(service(name, labels), &ctx()).await.unwrap();
        }

        let all = store
            .list(&ListQuery::default().with_limit(None), &ctx())
            .await
            .unwrap();
        assert_eq!(all.len(), 4);

        let labelled = store
            .list(&ListQuery::default().with_labels(["x"]), &ctx())
            .await
            .unwrap();
        let mut names: Vec<_> = labelled.iter().map(|s| s.name.as_str()).collect();
        names.sort_unstable();
        assert_eq!(names, ["a", "c"]);

        let page = store
            .list(&ListQuery::default().with_offset(1).with_limit(Some(2)), &ctx())
            .await
            .unwrap();
        assert_eq!(page.len(), 2);
        let past_end = store
            .list(&ListQuery::default().with_offset(10), &ctx())
            .await
            .unwrap();
        assert!(past_end.is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_context_is_unavailable() {
        let store = InMemoryDeviceServiceStore::new();
        let ctx = ctx();
        ctx.cancellation().cancel();

        let err = store.create(service("svc1", &[]), &ctx).await.unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::ServiceUnavailable);
        assert!(store.is_empty());
    }
}
