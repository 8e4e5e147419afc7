//! Devices registered to the authenticated user.
//!
//! | Method | API Path |
//! |--------|----------|
//! | [`DeviceModule::list`] | GET `/api/v1/devices` |
//! | [`DeviceModule::status`] | GET `/api/v1/devices/status` |
//!
//! Both require an access token and never mutate the session.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{Result, decode};
use crate::session::SessionStore;
use crate::transport::Transport;

pub(crate) const DEVICES_PATH: &str = "/api/v1/devices";
pub(crate) const DEVICE_STATUS_PATH: &str = "/api/v1/devices/status";

/// A device known to the identity service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    /// Service-assigned device identifier.
    pub id: String,

    /// Display name.
    #[serde(default)]
    pub name: String,

    /// Device class (e.g. `"desktop"`, `"mobile"`).
    #[serde(rename = "type", default)]
    pub device_type: String,

    /// Unix timestamp of the last contact, if the device ever checked in.
    #[serde(default)]
    pub last_seen: Option<i64>,

    /// Whether the user marked this device as trusted.
    #[serde(default)]
    pub trusted: bool,
}

/// Availability of the caller's current device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceStatus {
    /// Whether the device can currently be used as a factor.
    pub available: bool,

    /// The device record, when the service matched one.
    #[serde(default)]
    pub device: Option<DeviceInfo>,

    /// Unix timestamp of the last sync.
    #[serde(default)]
    pub last_sync: Option<i64>,
}

/// Read-only device queries.
#[derive(Clone)]
pub struct DeviceModule {
    transport: Arc<Transport>,
    session: Arc<SessionStore>,
}

impl DeviceModule {
    /// Builds the module over a shared transport and session store.
    pub fn new(transport: Arc<Transport>, session: Arc<SessionStore>) -> Self {
        DeviceModule { transport, session }
    }

    /// Lists the user's devices.
    pub async fn list(&self) -> Result<Vec<DeviceInfo>> {
        let token = self.session.require_access_token()?;
        let resp = self.transport.get(DEVICES_PATH, Some(token.as_str())).await?;
        decode(&resp, "device list")
    }

    /// Returns the status of the current device.
    pub async fn status(&self) -> Result<DeviceStatus> {
        let token = self.session.require_access_token()?;
        let resp = self.transport.get(DEVICE_STATUS_PATH, Some(token.as_str())).await?;
        decode(&resp, "device status")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_info_deserializes_minimal_record() {
        let device: DeviceInfo = serde_json::from_str(r#"{"id": "dev-1"}"#).unwrap();
        assert_eq!(device.id, "dev-1");
        assert!(device.name.is_empty());
        assert!(!device.trusted);
        assert!(device.last_seen.is_none());
    }

    #[test]
    fn device_status_deserializes_nested_device() {
        let json = r#"{
            "available": true,
            "device": {"id": "dev-2", "name": "laptop", "type": "desktop", "trusted": true},
            "lastSync": 1700000000
        }"#;
        let status: DeviceStatus = serde_json::from_str(json).unwrap();
        assert!(status.available);
        let device = status.device.unwrap();
        assert_eq!(device.device_type, "desktop");
        assert!(device.trusted);
        assert_eq!(status.last_sync, Some(1_700_000_000));
    }
}
