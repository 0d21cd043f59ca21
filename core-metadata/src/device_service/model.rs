//! Device service domain model

use std::fmt;

use serde::{Deserialize, Serialize};

/// Administrative state of a device service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AdminState {
    /// Requests to the service's devices are refused
    Locked,
    /// Normal operation
    Unlocked,
}

impl fmt::Display for AdminState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Locked => write!(f, "LOCKED"),
            Self::Unlocked => write!(f, "UNLOCKED"),
        }
    }
}

/// Registration of an external device-integration endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceService {
    /// Store-assigned identifier (UUID)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    /// Unique name
    pub name: String,
    /// Free-form description
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Labels used to filter listings
    #[serde(default)]
    pub labels: Vec<String>,
    /// Address the service is reachable at
    pub base_address: String,
    /// Administrative state
    pub admin_state: AdminState,
    /// Creation time, milliseconds since the Unix epoch
    #[serde(default)]
    pub created: i64,
    /// Last modification time, milliseconds since the Unix epoch
    #[serde(default)]
    pub modified: i64,
}

impl DeviceService {
    /// Whether the service carries any of `labels`
    pub fn has_any_label(&self, labels: &[String]) -> bool {
        self.labels.iter().any(|label| labels.contains(label))
    }
}

/// Partial update of a device service
///
/// `id` or `name` identifies the record; every other present field
/// replaces the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceServicePatch {
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub labels: Option<Vec<String>>,
    pub base_address: Option<String>,
    pub admin_state: Option<AdminState>,
}

impl DeviceServicePatch {
    /// Merge the present mutable fields into `service`
    pub fn apply(self, service: &mut DeviceService) {
        if let Some(description) = self.description {
            service.description = description;
        }
        if let Some(labels) = self.labels {
            service.labels = labels;
        }
        if let Some(base_address) = self.base_address {
            service.base_address = base_address;
        }
        if let Some(admin_state) = self.admin_state {
            service.admin_state = admin_state;
        }
    }
}
