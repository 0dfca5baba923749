use serde::{Deserialize, Serialize};

use super::DeviceId;

/// Body of `POST /api/v1/devices`
#[derive(Debug, Clone, Serialize)]
pub struct RegisterBody<'a> {
    /// Requested device name
    pub devicename: &'a str,

    /// Requested device password
    pub password: &'a str,

    /// Group to register into
    pub group: &'a str,

    /// Previously assigned ID, omitted on first registration
    #[serde(rename = "deviceID", skip_serializing_if = "Option::is_none")]
    pub device_id: Option<u64>,
}

/// Body of `POST /authenticate_device`
#[derive(Debug, Clone, Serialize)]
pub struct AuthenticateBody<'a> {
    /// Device to authenticate as
    #[serde(rename = "deviceID")]
    pub device_id: u64,

    /// Device password
    pub password: &'a str,
}

/// Body of `POST /api/v1/devices/reregister`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReregisterBody<'a> {
    /// New device name
    pub new_name: &'a str,

    /// New group name
    pub new_group: &'a str,

    /// New device password
    pub new_password: &'a str,
}

/// Common envelope of backend responses
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiResponse {
    /// Whether the backend accepted the request
    #[serde(default)]
    pub success: bool,

    /// Device ID, present on registration responses
    #[serde(default)]
    pub id: Option<DeviceId>,

    /// Session token
    #[serde(default)]
    pub token: Option<String>,

    /// Single human-readable message
    #[serde(default)]
    pub message: Option<String>,

    /// Human-readable messages explaining the outcome
    #[serde(default)]
    pub messages: Vec<String>,
}

impl ApiResponse {
    /// All messages joined into one line
    #[must_use]
    pub fn joined_messages(&self) -> String {
        let mut parts: Vec<&str> = self.message.iter().map(String::as_str).collect();
        parts.extend(self.messages.iter().map(String::as_str));
        parts.join("; ")
    }
}
