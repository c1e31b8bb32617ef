//! Scripted in-process backend shared by the controller tests.
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use droidmon::api::Backend;
use droidmon::error::{Result, SessionError};
use droidmon::types::{ApiReply, ConnectOptions, DeviceInfo, DeviceInfoReply, WireSample};
use tokio::sync::Notify;

pub type CallLog = Rc<RefCell<Vec<&'static str>>>;

#[derive(Default)]
pub struct FakeBackend {
    pub calls: CallLog,
    refused: HashSet<&'static str>,
    broken: HashSet<&'static str>,
    connect_gate: Option<Rc<Notify>>,
    pub available: bool,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            available: true,
            ..Default::default()
        }
    }

    /// `op` answers `success: false` with message "<op> refused".
    pub fn refuse(mut self, op: &'static str) -> Self {
        self.refused.insert(op);
        self
    }

    /// `op` fails at the transport level.
    pub fn break_transport(mut self, op: &'static str) -> Self {
        self.broken.insert(op);
        self
    }

    /// `connect` is recorded immediately but only answers once `gate` is notified.
    pub fn gate_connect(mut self, gate: Rc<Notify>) -> Self {
        self.connect_gate = Some(gate);
        self
    }

    pub fn log(&self) -> CallLog {
        self.calls.clone()
    }

    fn reply(&self, op: &'static str, ok_message: &str) -> Result<ApiReply> {
        self.calls.borrow_mut().push(op);
        self.answer(op, ok_message)
    }

    fn answer(&self, op: &'static str, ok_message: &str) -> Result<ApiReply> {
        if self.broken.contains(op) {
            return Err(SessionError::Transport(format!("{op}: connection refused")));
        }
        if self.refused.contains(op) {
            return Ok(ApiReply {
                success: false,
                message: format!("{op} refused"),
            });
        }
        Ok(ApiReply {
            success: true,
            message: ok_message.to_string(),
        })
    }
}

impl Backend for FakeBackend {
    async fn capability_check(&self) -> Result<bool> {
        self.calls.borrow_mut().push("capability_check");
        Ok(self.available)
    }

    async fn connect(&self, opts: &ConnectOptions) -> Result<ApiReply> {
        self.calls.borrow_mut().push("connect");
        if let Some(gate) = &self.connect_gate {
            gate.notified().await;
        }
        let message = match &opts.ip {
            Some(ip) => format!("connected to {ip}:5555"),
            None => "Connected to device: emulator-5554".to_string(),
        };
        self.answer("connect", &message)
    }

    async fn disconnect(&self) -> Result<ApiReply> {
        self.reply("disconnect", "device disconnected")
    }

    async fn start_monitoring(&self, _interval: f64) -> Result<ApiReply> {
        self.reply("start_monitoring", "monitoring started")
    }

    async fn stop_monitoring(&self) -> Result<ApiReply> {
        self.reply("stop_monitoring", "monitoring stopped")
    }

    async fn device_info(&self) -> Result<DeviceInfoReply> {
        let r = self.reply("device_info", "")?;
        Ok(DeviceInfoReply {
            success: r.success,
            device_info: r.success.then(|| DeviceInfo {
                model: "Google Pixel 7".into(),
                os_version: "14".into(),
                api_level: "34".into(),
            }),
            message: (!r.success).then_some(r.message),
        })
    }
}

pub fn wire(ts: f64, loads: &[f64]) -> WireSample {
    WireSample {
        timestamp: ts,
        fps: 58.0 + ts % 3.0,
        cpu_freq: (0..loads.len())
            .map(|i| (format!("core_{i}"), 1200.0 + 100.0 * i as f64))
            .collect(),
        gpu_freq: 585.0,
        cpu_load: loads
            .iter()
            .enumerate()
            .map(|(i, l)| (format!("core_{i}"), *l))
            .collect(),
        gpu_load: 30.0 + ts % 7.0,
        current: 320.0,
        power: 1200.0 + ts,
    }
}
