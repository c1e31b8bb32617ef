//! Types that mirror the backend's JSON schema (HTTP replies and stream frames).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One `performance_data` payload exactly as the agent sends it. Cores are
/// keyed `core_<n>`; [`crate::sample::Sample`] is the validated form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireSample {
    pub timestamp: f64,
    pub fps: f64,
    pub cpu_freq: HashMap<String, f64>,
    pub gpu_freq: f64,
    pub cpu_load: HashMap<String, f64>,
    pub gpu_load: f64,
    pub current: f64,
    pub power: f64,
}

/// Envelope of every text frame on the stream socket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamFrame {
    pub event: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

pub const PERFORMANCE_DATA: &str = "performance_data";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub model: String,
    pub os_version: String,
    pub api_level: String,
}

// Generic `{success, message}` reply of the lifecycle endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct ApiReply {
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CapabilityReply {
    pub available: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeviceInfoReply {
    pub success: bool,
    #[serde(default)]
    pub device_info: Option<DeviceInfo>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConnectOptions {
    pub wireless: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
}

impl ConnectOptions {
    pub fn wired() -> Self {
        Self::default()
    }

    pub fn wireless(ip: impl Into<String>) -> Self {
        Self {
            wireless: true,
            ip: Some(ip.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StartMonitoringRequest {
    pub interval: f64,
}
