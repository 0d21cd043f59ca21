//! Domain dispatcher
//!
//! Invokes exactly one domain operation per item and captures the outcome.
//! Batch items run sequentially in input order, so `outcomes[i]` always
//! answers `items[i]`. Each call races the request's cancellation signal.

use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use super::context::RequestContext;
use super::error::{ApiError, ApiOperation};
use super::query::ListQuery;
use super::traits::{BatchItem, DomainOperations, Resource};

/// Outcome of one batch item
#[derive(Debug)]
pub struct ItemOutcome<T> {
    /// Request id of the originating item
    pub request_id: String,
    /// Name (or id) of the addressed record
    pub subject: String,
    /// What the domain operation returned
    pub result: Result<T, ApiError>,
}

/// Dispatches parsed requests to a [`DomainOperations`] implementation
pub struct Dispatcher<R, O> {
    operations: Arc<O>,
    _resource: PhantomData<fn() -> R>,
}

impl<R, O> Clone for Dispatcher<R, O> {
    fn clone(&self) -> Self {
        Self {
            operations: Arc::clone(&self.operations),
            _resource: PhantomData,
        }
    }
}

impl<R, O> Dispatcher<R, O>
where
    R: Resource,
    O: DomainOperations<R>,
{
    /// Create a dispatcher over `operations`
    pub fn new(operations: Arc<O>) -> Self {
        Self {
            operations,
            _resource: PhantomData,
        }
    }

    /// Create every item, one outcome per item
    pub async fn create_batch(
        &self,
        items: Vec<R::AddItem>,
        ctx: &RequestContext,
    ) -> Vec<ItemOutcome<String>> {
        let mut outcomes = Vec::with_capacity(items.len());
        for item in items {
            let request_id = item.request_id().to_string();
            let subject = item.subject().to_string();
            let result = guarded(
                ctx,
                ApiOperation::Add,
                self.operations.create(item.into_payload(), ctx),
            )
            .await;
            outcomes.push(ItemOutcome {
                request_id,
                subject,
                result,
            });
        }
        outcomes
    }

    /// Apply every partial update, one outcome per item
    pub async fn patch_batch(
        &self,
        items: Vec<R::UpdateItem>,
        ctx: &RequestContext,
    ) -> Vec<ItemOutcome<()>> {
        let mut outcomes = Vec::with_capacity(items.len());
        for item in items {
            let request_id = item.request_id().to_string();
            let subject = item.subject().to_string();
            let result = guarded(
                ctx,
                ApiOperation::Patch,
                self.operations.patch(item.into_payload(), ctx),
            )
            .await;
            outcomes.push(ItemOutcome {
                request_id,
                subject,
                result,
            });
        }
        outcomes
    }

    /// Read a record by name
    pub async fn get_by_name(&self, name: &str, ctx: &RequestContext) -> Result<R::Record, ApiError> {
        guarded(
            ctx,
            ApiOperation::GetByName,
            self.operations.get_by_name(name, ctx),
        )
        .await
    }

    /// Delete a record by id
    pub async fn delete_by_id(&self, id: &str, ctx: &RequestContext) -> Result<(), ApiError> {
        guarded(ctx, ApiOperation::DeleteById, self.operations.delete_by_id(id, ctx)).await
    }

    /// Delete a record by name
    pub async fn delete_by_name(&self, name: &str, ctx: &RequestContext) -> Result<(), ApiError> {
        guarded(
            ctx,
            ApiOperation::DeleteByName,
            self.operations.delete_by_name(name, ctx),
        )
        .await
    }

    /// List records
    pub async fn list(&self, query: &ListQuery, ctx: &RequestContext) -> Result<Vec<R::Record>, ApiError> {
        guarded(ctx, ApiOperation::List, self.operations.list(query, ctx)).await
    }
}

async fn guarded<T, F>(ctx: &RequestContext, operation: ApiOperation, call: F) -> Result<T, ApiError>
where
    F: Future<Output = Result<T, ApiError>>,
{
    tokio::select! {
        biased;
        () = ctx.cancelled() => Err(
            ApiError::unavailable("request was cancelled before the operation completed")
                .with_operation(operation),
        ),
        result = call => result.map_err(|err| err.with_operation(operation)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::ApiErrorKind;
    use serde::{Deserialize, Serialize};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use validator::Validate;

    #[derive(Debug, Clone, Serialize, PartialEq)]
    struct Widget {
        name: String,
    }

    #[derive(Debug, Deserialize, Validate)]
    struct WidgetItem {
        #[serde(default)]
        request_id: String,
        name: String,
    }

    impl BatchItem for WidgetItem {
        type Payload = Widget;

        fn request_id(&self) -> &str {
            &self.request_id
        }

        fn subject(&self) -> &str {
            &self.name
        }

        fn into_payload(self) -> Widget {
            Widget { name: self.name }
        }
    }

    struct WidgetResource;

    impl Resource for WidgetResource {
        type Record = Widget;
        type Patch = Widget;
        type AddItem = WidgetItem;
        type UpdateItem = WidgetItem;

        const DISPLAY_NAME: &'static str = "widget";
        const ROUTE: &'static str = "widget";
        const RECORD_KEY: &'static str = "widget";
        const COLLECTION_KEY: &'static str = "widgets";
    }

    /// Rejects names starting with `bad`, counts calls
    #[derive(Default)]
    struct MockOperations {
        calls: AtomicUsize,
    }

    impl DomainOperations<WidgetResource> for MockOperations {
        async fn create(&self, record: Widget, _ctx: &RequestContext) -> Result<String, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if record.name.starts_with("bad") {
                return Err(ApiError::conflict(format!("{} already exists", record.name)));
            }
            Ok(format!("id-{}", record.name))
        }

        async fn get_by_name(&self, name: &str, _ctx: &RequestContext) -> Result<Widget, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(ApiError::not_found("widget", "name", name))
        }

        async fn patch(&self, _patch: Widget, _ctx: &RequestContext) -> Result<(), ApiError> {
            Ok(())
        }

        async fn delete_by_id(&self, _id: &str, _ctx: &RequestContext) -> Result<(), ApiError> {
            Ok(())
        }

        async fn delete_by_name(&self, _name: &str, _ctx: &RequestContext) -> Result<(), ApiError> {
            Ok(())
        }

        async fn list(&self, _query: &ListQuery, _ctx: &RequestContext) -> Result<Vec<Widget>, ApiError> {
            Ok(Vec::new())
        }
    }

    fn item(request_id: &str, name: &str) -> WidgetItem {
        WidgetItem {
            request_id: request_id.to_string(),
            name: name.to_string(),
        }
    }

    #[tokio::test]
    async fn test_batch_outcomes_follow_input_order() {
        let dispatcher = Dispatcher::<WidgetResource, _>::new(Arc::new(MockOperations::default()));
        let ctx = RequestContext::new("corr");

        let outcomes = dispatcher
            .create_batch(
                vec![item("r1", "a"), item("r2", "bad-b"), item("r3", "c")],
                &ctx,
            )
            .await;

        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[0].request_id, "r1");
        assert_eq!(outcomes[0].result.as_ref().unwrap(), "id-a");
        let err = outcomes[1].result.as_ref().unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::Conflict);
        assert_eq!(err.operation, Some(ApiOperation::Add));
        assert_eq!(outcomes[1].subject, "bad-b");
        assert!(outcomes[2].result.is_ok());
    }

    #[tokio::test]
    async fn test_cancelled_request_skips_domain_call() {
        let operations = Arc::new(MockOperations::default());
        let dispatcher = Dispatcher::<WidgetResource, _>::new(Arc::clone(&operations));
        let ctx = RequestContext::new("corr");
        ctx.cancellation().cancel();

        let err = dispatcher.get_by_name("x", &ctx).await.unwrap_err();

        assert_eq!(err.kind, ApiErrorKind::ServiceUnavailable);
        assert_eq!(err.operation, Some(ApiOperation::GetByName));
        assert_eq!(operations.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_single_operation_error_is_tagged() {
        let dispatcher = Dispatcher::<WidgetResource, _>::new(Arc::new(MockOperations::default()));
        let err = dispatcher
            .get_by_name("missing", &RequestContext::new("corr"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::EntityDoesNotExist);
        assert_eq!(err.operation, Some(ApiOperation::GetByName));
    }
}
