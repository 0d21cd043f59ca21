//! Generic REST resource controller
//!
//! [`ResourceController`] wires the pipeline together for one resource:
//! request reader, query parser, dispatcher, error classifier and response
//! assembler. It is built from an explicit collaborator bundle (domain
//! operations, logger, query settings) and exposes an axum [`Router`].
//!
//! Routes, relative to `/api/v2/{Resource::ROUTE}`:
//!
//! | Method | Path | Operation |
//! |---|---|---|
//! | POST | `/` | batch add, `207` |
//! | PATCH | `/` | batch patch, `207` |
//! | GET | `/all` | list |
//! | GET | `/name/{name}` | read by name |
//! | DELETE | `/name/{name}` | delete by name |
//! | DELETE | `/id/{id}` | delete by id |

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{
        rejection::{BytesRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::Response,
    routing::{delete, get, post},
    Router,
};

use super::assembler::ResponseAssembler;
use super::classify::{ErrorClassifier, PipelineLogger};
use super::context::RequestContext;
use super::dispatch::Dispatcher;
use super::error::{ApiError, ApiErrorKind, ApiOperation};
use super::query::{ListQuery, QuerySettings};
use super::reader::read_batch;
use super::response::ResponseEnvelope;
use super::traits::{DomainOperations, Resource};
use crate::middleware::Correlation;

/// Base path of the versioned API
pub const API_BASE: &str = "/api/v2";

/// Pipeline for one resource type
pub struct ResourceController<R, O> {
    dispatcher: Dispatcher<R, O>,
    classifier: ErrorClassifier,
    assembler: ResponseAssembler,
    query_settings: QuerySettings,
}

impl<R, O> ResourceController<R, O>
where
    R: Resource,
    O: DomainOperations<R>,
{
    /// Create a controller from its collaborators
    pub fn new(
        operations: Arc<O>,
        logger: Arc<dyn PipelineLogger>,
        query_settings: QuerySettings,
    ) -> Self {
        Self {
            dispatcher: Dispatcher::new(operations),
            classifier: ErrorClassifier::new(Arc::clone(&logger)),
            assembler: ResponseAssembler::new(logger),
            query_settings,
        }
    }

    /// Batch create
    pub async fn add(&self, body: &[u8], ctx: &RequestContext) -> Response {
        let items = match read_batch::<R::AddItem>(body).and_then(require_items) {
            Ok(items) => items,
            Err(err) => return self.failure(err.with_operation(ApiOperation::Add), ctx),
        };

        let envelopes: Vec<ResponseEnvelope<R::Record>> = self
            .dispatcher
            .create_batch(items, ctx)
            .await
            .into_iter()
            .map(|outcome| match outcome.result {
                Ok(id) => ResponseEnvelope::new(
                    outcome.request_id,
                    format!("Add {} {} successfully", R::DISPLAY_NAME, outcome.subject),
                    StatusCode::CREATED,
                )
                .with_id(id),
                Err(err) => self
                    .classifier
                    .classify(&err, ctx.correlation_id())
                    .into_envelope(outcome.request_id),
            })
            .collect();

        self.assembler.multi_status(&envelopes, ctx.correlation_id())
    }

    /// Batch partial update
    pub async fn patch(&self, body: &[u8], ctx: &RequestContext) -> Response {
        let items = match read_batch::<R::UpdateItem>(body).and_then(require_items) {
            Ok(items) => items,
            Err(err) => return self.failure(err.with_operation(ApiOperation::Patch), ctx),
        };

        let envelopes: Vec<ResponseEnvelope> = self
            .dispatcher
            .patch_batch(items, ctx)
            .await
            .into_iter()
            .map(|outcome| match outcome.result {
                Ok(()) => ResponseEnvelope::new(outcome.request_id, "", StatusCode::OK),
                Err(err) => self
                    .classifier
                    .classify(&err, ctx.correlation_id())
                    .into_envelope(outcome.request_id),
            })
            .collect();

        self.assembler.multi_status(&envelopes, ctx.correlation_id())
    }

    /// Read one record by name
    pub async fn get_by_name(&self, name: &str, ctx: &RequestContext) -> Response {
        match self.dispatcher.get_by_name(name, ctx).await {
            Ok(record) => self.assembler.single(
                &ResponseEnvelope::new("", "", StatusCode::OK).with_record(R::RECORD_KEY, record),
                ctx.correlation_id(),
            ),
            Err(err) => self.failure(err, ctx),
        }
    }

    /// Delete one record by id
    pub async fn delete_by_id(&self, id: &str, ctx: &RequestContext) -> Response {
        let result = self.dispatcher.delete_by_id(id, ctx).await;
        self.deleted(result, ctx)
    }

    /// Delete one record by name
    pub async fn delete_by_name(&self, name: &str, ctx: &RequestContext) -> Response {
        let result = self.dispatcher.delete_by_name(name, ctx).await;
        self.deleted(result, ctx)
    }

    /// Paginated, label-filtered listing
    pub async fn list(&self, params: &HashMap<String, String>, ctx: &RequestContext) -> Response {
        let query = match ListQuery::from_params(params, &self.query_settings) {
            Ok(query) => query,
            Err(err) => return self.failure(err.with_operation(ApiOperation::List), ctx),
        };

        match self.dispatcher.list(&query, ctx).await {
            Ok(records) => self.assembler.single(
                &ResponseEnvelope::new("", "", StatusCode::OK)
                    .with_records(R::COLLECTION_KEY, records),
                ctx.correlation_id(),
            ),
            Err(err) => self.failure(err, ctx),
        }
    }

    /// Mount the controller's routes under `/api/v2/{R::ROUTE}`
    pub fn into_router(self) -> Router {
        let base = format!("{API_BASE}/{}", R::ROUTE);

        Router::new()
            .route(&base, post(add::<R, O>).patch(patch::<R, O>))
            .route(&format!("{base}/all"), get(list::<R, O>))
            .route(
                &format!("{base}/name/{{name}}"),
                get(get_by_name::<R, O>).delete(delete_by_name::<R, O>),
            )
            .route(&format!("{base}/id/{{id}}"), delete(delete_by_id::<R, O>))
            .with_state(Arc::new(self))
    }

    fn deleted(&self, result: Result<(), ApiError>, ctx: &RequestContext) -> Response {
        match result {
            Ok(()) => self.assembler.single(
                &ResponseEnvelope::<()>::new(
                    "",
                    format!("Delete {} successfully", R::DISPLAY_NAME),
                    StatusCode::OK,
                ),
                ctx.correlation_id(),
            ),
            Err(err) => self.failure(err, ctx),
        }
    }

    /// Single top-level error response
    fn failure(&self, err: ApiError, ctx: &RequestContext) -> Response {
        let envelope: ResponseEnvelope = self
            .classifier
            .classify(&err, ctx.correlation_id())
            .into_envelope("");
        self.assembler.single(&envelope, ctx.correlation_id())
    }
}

/// Body the extractor could not deliver (too large, unreadable)
fn body_rejected(rejection: BytesRejection, operation: ApiOperation) -> ApiError {
    ApiError::parsing(format!("failed to read request body: {}", rejection.body_text()))
        .with_debug_detail(format!("extractor status {}", rejection.status()))
        .with_operation(operation)
}

/// Path segment the extractor could not decode (e.g. invalid UTF-8)
fn path_rejected(rejection: PathRejection, operation: ApiOperation) -> ApiError {
    ApiError::parsing(format!("invalid path parameter: {}", rejection.body_text()))
        .with_debug_detail(format!("extractor status {}", rejection.status()))
        .with_operation(operation)
}

fn require_items<T>(items: Vec<T>) -> Result<Vec<T>, ApiError> {
    if items.is_empty() {
        return Err(ApiError::parsing("request body contains no items"));
    }
    Ok(items)
}

type SharedController<R, O> = State<Arc<ResourceController<R, O>>>;

async fn add<R, O>(
    State(controller): SharedController<R, O>,
    Correlation(correlation_id): Correlation,
    body: Result<Bytes, BytesRejection>,
) -> Response
where
    R: Resource,
    O: DomainOperations<R>,
{
    let (ctx, _cancel_on_drop) = RequestContext::scoped(correlation_id);
    match body {
        Ok(body) => controller.add(&body, &ctx).await,
        Err(rejection) => {
            controller.failure(body_rejected(rejection, ApiOperation::Add), &ctx)
        }
    }
}

async fn patch<R, O>(
    State(controller): SharedController<R, O>,
    Correlation(correlation_id): Correlation,
    body: Result<Bytes, BytesRejection>,
) -> Response
where
    R: Resource,
    O: DomainOperations<R>,
{
    let (ctx, _cancel_on_drop) = RequestContext::scoped(correlation_id);
    match body {
        Ok(body) => controller.patch(&body, &ctx).await,
        Err(rejection) => {
            controller.failure(body_rejected(rejection, ApiOperation::Patch), &ctx)
        }
    }
}

async fn get_by_name<R, O>(
    State(controller): SharedController<R, O>,
    Correlation(correlation_id): Correlation,
    name: Result<Path<String>, PathRejection>,
) -> Response
where
    R: Resource,
    O: DomainOperations<R>,
{
    let (ctx, _cancel_on_drop) = RequestContext::scoped(correlation_id);
    match name {
        Ok(Path(name)) => controller.get_by_name(&name, &ctx).await,
        Err(rejection) => {
            controller.failure(path_rejected(rejection, ApiOperation::GetByName), &ctx)
        }
    }
}

async fn delete_by_id<R, O>(
    State(controller): SharedController<R, O>,
    Correlation(correlation_id): Correlation,
    id: Result<Path<String>, PathRejection>,
) -> Response
where
    R: Resource,
    O: DomainOperations<R>,
{
    let (ctx, _cancel_on_drop) = RequestContext::scoped(correlation_id);
    match id {
        Ok(Path(id)) => controller.delete_by_id(&id, &ctx).await,
        Err(rejection) => {
            controller.failure(path_rejected(rejection, ApiOperation::DeleteById), &ctx)
        }
    }
}

async fn delete_by_name<R, O>(
    State(controller): SharedController<R, O>,
    Correlation(correlation_id): Correlation,
    name: Result<Path<String>, PathRejection>,
) -> Response
where
    R: Resource,
    O: DomainOperations<R>,
{
    let (ctx, _cancel_on_drop) = RequestContext::scoped(correlation_id);
    match name {
        Ok(Path(name)) => controller.delete_by_name(&name, &ctx).await,
        Err(rejection) => {
            controller.failure(path_rejected(rejection, ApiOperation::DeleteByName), &ctx)
        }
    }
}

async fn list<R, O>(
    State(controller): SharedController<R, O>,
    Correlation(correlation_id): Correlation,
    query: Result<Query<HashMap<String, String>>, QueryRejection>,
) -> Response
where
    R: Resource,
    O: DomainOperations<R>,
{
    let (ctx, _cancel_on_drop) = RequestContext::scoped(correlation_id);
    match query {
        Ok(Query(params)) => controller.list(&params, &ctx).await,
        Err(rejection) => controller.failure(
            ApiError::new(ApiErrorKind::InvalidQueryParam, rejection.body_text())
                .with_operation(ApiOperation::List),
            &ctx,
        ),
    }
}
