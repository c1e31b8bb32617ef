//! Wire types of the control API and the sample stream.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const PERFORMANCE_DATA: &str = "performance_data";

/// One streamed reading. Per-core maps are keyed `core_<index>`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Sample {
    pub timestamp: f64,
    pub fps: f64,
    pub cpu_freq: BTreeMap<String, f64>,
    pub gpu_freq: f64,
    pub cpu_load: BTreeMap<String, f64>,
    pub gpu_load: f64,
    pub current: f64,
    pub power: f64,
}

#[derive(Debug, Serialize, Clone)]
pub struct Frame<'a> {
    pub event: &'a str,
    pub data: &'a Sample,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ApiReply {
    pub success: bool,
    pub message: String,
}

impl ApiReply {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn refused(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize, Clone)]
pub struct CapabilityReply {
    pub available: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DeviceInfo {
    pub model: String,
    pub os_version: String,
    pub api_level: String,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct DeviceInfoReply {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_info: Option<DeviceInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ConnectRequest {
    #[serde(default)]
    pub wireless: bool,
    #[serde(default)]
    pub ip: Option<String>,
}

fn default_interval() -> f64 {
    1.0
}

#[derive(Debug, Deserialize, Clone)]
pub struct StartRequest {
    #[serde(default = "default_interval")]
    pub interval: f64,
}
