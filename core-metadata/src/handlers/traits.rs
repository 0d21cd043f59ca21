//! Resource and domain operation traits
//!
//! A resource controller is generic over two seams:
//!
//! - [`Resource`]: the per-entity binding (transfer objects, record type,
//!   route segment, JSON keys)
//! - [`DomainOperations`]: the domain capability set the controller
//!   dispatches to, using RPITIT for async methods without `async_trait`
//!
//! # Example
//!
//! ```rust,ignore
//! use core_metadata::handlers::{ApiError, DomainOperations, ListQuery, RequestContext};
//!
//! impl DomainOperations<DeviceServiceResource> for MyStore {
//!     async fn get_by_name(&self, name: &str, ctx: &RequestContext) -> Result<DeviceService, ApiError> {
//!         ctx.ensure_active()?;
//!         self.lookup(name)
//!             .ok_or_else(|| ApiError::not_found("device service", "name", name))
//!     }
//!
//!     // ... other methods
//! }
//! ```

use std::future::Future;

use serde::{de::DeserializeOwned, Serialize};
use validator::Validate;

use super::context::RequestContext;
use super::error::ApiError;
use super::query::ListQuery;

/// One element of a batch request body
pub trait BatchItem: DeserializeOwned + Validate + Send + 'static {
    /// Typed payload handed to the domain operation
    type Payload: Send + 'static;

    /// Client-supplied request id, echoed in the item's envelope
    fn request_id(&self) -> &str;

    /// Human-readable key of the addressed record (usually its name)
    fn subject(&self) -> &str;

    /// Consume the item into its domain payload
    fn into_payload(self) -> Self::Payload;
}

/// Per-entity binding of the generic resource controller
pub trait Resource: Send + Sync + 'static {
    /// Record returned by reads and lists
    type Record: Serialize + Send + Sync + 'static;

    /// Partial update applied by patches
    type Patch: Send + 'static;

    /// Batch element accepted by creates
    type AddItem: BatchItem<Payload = Self::Record>;

    /// Batch element accepted by patches
    type UpdateItem: BatchItem<Payload = Self::Patch>;

    /// Name used in messages, e.g. `device service`
    const DISPLAY_NAME: &'static str;

    /// Route segment under the API base, e.g. `deviceservice`
    const ROUTE: &'static str;

    /// JSON key of a single record
    const RECORD_KEY: &'static str;

    /// JSON key of a record sequence
    const COLLECTION_KEY: &'static str;
}

/// Domain capability set a resource controller dispatches to
///
/// Every method receives the request context and should give up with
/// `ServiceUnavailable` once it is cancelled.
pub trait DomainOperations<R: Resource>: Send + Sync + 'static {
    /// Create a record and return its assigned id
    fn create(
        &self,
        record: R::Record,
        ctx: &RequestContext,
    ) -> impl Future<Output = Result<String, ApiError>> + Send;

    /// Read a record by name
    ///
    /// # Errors
    ///
    /// `EntityDoesNotExist` when no record has this name.
    fn get_by_name(
        &self,
        name: &str,
        ctx: &RequestContext,
    ) -> impl Future<Output = Result<R::Record, ApiError>> + Send;

    /// Merge a partial update into an existing record
    fn patch(
        &self,
        patch: R::Patch,
        ctx: &RequestContext,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// Delete a record by id
    fn delete_by_id(
        &self,
        id: &str,
        ctx: &RequestContext,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// Delete a record by name
    fn delete_by_name(
        &self,
        name: &str,
        ctx: &RequestContext,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// List records matching `query`, in collaborator-defined order
    fn list(
        &self,
        query: &ListQuery,
        ctx: &RequestContext,
    ) -> impl Future<Output = Result<Vec<R::Record>, ApiError>> + Send;
}
