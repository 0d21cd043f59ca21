//! Device service resource
//!
//! Binds the generic resource controller to device service records:
//! transfer objects, domain model and the in-memory reference store.

pub mod dto;
pub mod model;
pub mod store;

pub use dto::{
    AddDeviceServiceRequest, DeviceServiceDto, UpdateDeviceServiceDto, UpdateDeviceServiceRequest,
};
pub use model::{AdminState, DeviceService, DeviceServicePatch};
pub use store::InMemoryDeviceServiceStore;

use crate::handlers::Resource;

/// Marker type for the device service resource
#[derive(Debug, Clone, Copy, Default)]
pub struct DeviceServiceResource;

impl Resource for DeviceServiceResource {
    type Record = DeviceService;
    type Patch = DeviceServicePatch;
    type AddItem = AddDeviceServiceRequest;
    type UpdateItem = UpdateDeviceServiceRequest;

    const DISPLAY_NAME: &'static str = "device service";
    const ROUTE: &'static str = "deviceservice";
    const RECORD_KEY: &'static str = "service";
    const COLLECTION_KEY: &'static str = "services";
}
