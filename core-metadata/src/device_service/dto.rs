//! Device service transfer objects
//!
//! Request bodies for add and patch, validated with `validator` before they
//! reach the store. A body that fails validation is rejected as a whole.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::model::{AdminState, DeviceService, DeviceServicePatch};
use crate::handlers::BatchItem;

/// One element of an add request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddDeviceServiceRequest {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub request_id: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_version: String,

    #[validate(nested)]
    pub service: DeviceServiceDto,
}

/// Device service as sent by clients on add
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DeviceServiceDto {
    /// Optional client-chosen id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_uuid", message = "id must be a UUID"))]
    pub id: Option<String>,

    #[validate(length(min = 1, message = "name is required"))]
    #[validate(custom(
        function = "validate_unreserved",
        message = "name may only contain unreserved URI characters"
    ))]
    pub name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,

    #[validate(url(message = "baseAddress must be a valid URI"))]
    pub base_address: String,

    pub admin_state: AdminState,
}

impl From<DeviceServiceDto> for DeviceService {
    fn from(dto: DeviceServiceDto) -> Self {
        Self {
            id: dto.id.unwrap_or_default(),
            name: dto.name,
            description: dto.description,
            labels: dto.labels,
            base_address: dto.base_address,
            admin_state: dto.admin_state,
            created: 0,
            modified: 0,
        }
    }
}

impl BatchItem for AddDeviceServiceRequest {
    type Payload = DeviceService;

    fn request_id(&self) -> &str {
        &self.request_id
    }

    fn subject(&self) -> &str {
        &self.service.name
    }

    fn into_payload(self) -> DeviceService {
        self.service.into()
    }
}

/// One element of a patch request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDeviceServiceRequest {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub request_id: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_version: String,

    #[validate(nested)]
    pub service: UpdateDeviceServiceDto,
}

/// Partial device service as sent by clients on patch
///
/// Identified by `id` or `name`; all other fields are optional and only
/// present ones are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_identity"))]
pub struct UpdateDeviceServiceDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_uuid", message = "id must be a UUID"))]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "name must not be empty"))]
    #[validate(custom(
        function = "validate_unreserved",
        message = "name may only contain unreserved URI characters"
    ))]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(url(message = "baseAddress must be a valid URI"))]
    pub base_address: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_state: Option<AdminState>,
}

impl From<UpdateDeviceServiceDto> for DeviceServicePatch {
    fn from(dto: UpdateDeviceServiceDto) -> Self {
        Self {
            id: dto.id,
            name: dto.name,
            description: dto.description,
            labels: dto.labels,
            base_address: dto.base_address,
            admin_state: dto.admin_state,
        }
    }
}

impl BatchItem for UpdateDeviceServiceRequest {
    type Payload = DeviceServicePatch;

    fn request_id(&self) -> &str {
        &self.request_id
    }

    fn subject(&self) -> &str {
        self.service
            .name
            .as_deref()
            .or(self.service.id.as_deref())
            .unwrap_or_default()
    }

    fn into_payload(self) -> DeviceServicePatch {
        self.service.into()
    }
}

/// RFC 3986 unreserved characters: ALPHA / DIGIT / "-" / "." / "_" / "~"
fn validate_unreserved(value: &str) -> Result<(), ValidationError> {
    let unreserved = |c: char| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '~');
    if value.chars().all(unreserved) {
        Ok(())
    } else {
        Err(ValidationError::new("unreserved_chars"))
    }
}

fn validate_uuid(value: &str) -> Result<(), ValidationError> {
    Uuid::parse_str(value)
        .map(|_| ())
        .map_err(|_| ValidationError::new("uuid"))
}

fn validate_identity(dto: &UpdateDeviceServiceDto) -> Result<(), ValidationError> {
    if dto.id.is_none() && dto.name.is_none() {
        let mut error = ValidationError::new("identity");
        error.message = Some("update must carry the device service id or name".into());
        return Err(error);
    }
    Ok(())
}
