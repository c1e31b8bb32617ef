//! Simulated device: the connect/monitor state the control API mutates.

use std::time::Duration;

use crate::types::{ApiReply, ConnectRequest, DeviceInfo, DeviceInfoReply};

const WIRED_SERIAL: &str = "emulator-5554";
const ADB_TCP_PORT: u16 = 5555;

#[derive(Debug, Default)]
pub struct DeviceSim {
    serial: Option<String>,
    // (session id, sampling period) while monitoring
    monitoring: Option<(u64, Duration)>,
    sessions: u64,
}

impl DeviceSim {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn serial(&self) -> Option<&str> {
        self.serial.as_deref()
    }

    /// Id of the running monitoring session, if any.
    pub fn session(&self) -> Option<u64> {
        self.monitoring.map(|(id, _)| id)
    }

    pub fn connect(&mut self, req: &ConnectRequest) -> ApiReply {
        if req.wireless {
            let Some(ip) = req.ip.as_deref().map(str::trim).filter(|s| !s.is_empty()) else {
                return ApiReply::refused("device IP address required");
            };
            let serial = format!("{ip}:{ADB_TCP_PORT}");
            let message = format!("connected to {serial}");
            self.serial = Some(serial);
            ApiReply::ok(message)
        } else {
            self.serial = Some(WIRED_SERIAL.to_string());
            ApiReply::ok(format!("Connected to device: {WIRED_SERIAL}"))
        }
    }

    /// Always succeeds; a running session is stopped first.
    pub fn disconnect(&mut self) -> ApiReply {
        self.monitoring = None;
        self.serial = None;
        ApiReply::ok("device disconnected")
    }

    /// Returns the new session id and sampling period alongside the reply when
    /// monitoring starts. Nothing changes unless the reply is a success.
    pub fn start(&mut self, interval: f64) -> (ApiReply, Option<(u64, Duration)>) {
        if self.serial.is_none() {
            return (ApiReply::refused("no device connected"), None);
        }
        if self.monitoring.is_some() {
            return (ApiReply::refused("monitoring already running"), None);
        }
        let period = match Duration::try_from_secs_f64(interval) {
            Ok(p) if !p.is_zero() => p,
            _ => {
                return (
                    ApiReply::refused(format!("invalid sampling interval {interval}")),
                    None,
                )
            }
        };
        self.sessions += 1;
        self.monitoring = Some((self.sessions, period));
        (ApiReply::ok("monitoring started"), Some((self.sessions, period)))
    }

    pub fn stop(&mut self) -> ApiReply {
        match self.monitoring.take() {
            Some(_) => ApiReply::ok("monitoring stopped"),
            None => ApiReply::refused("monitoring not running"),
        }
    }

    pub fn info(&self) -> DeviceInfoReply {
        match &self.serial {
            Some(_) => DeviceInfoReply {
                success: true,
                device_info: Some(DeviceInfo {
                    model: "Android SDK built for x86_64".into(),
                    os_version: "14".into(),
                    api_level: "34".into(),
                }),
                message: None,
            },
            None => DeviceInfoReply {
                success: false,
                device_info: None,
                message: Some("no device connected".into()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wired() -> ConnectRequest {
        ConnectRequest::default()
    }

    #[test]
    fn wired_and_wireless_serials() {
        let mut sim = DeviceSim::new();
        let r = sim.connect(&wired());
        assert!(r.success);
        assert_eq!(r.message, "Connected to device: emulator-5554");

        let r = sim.connect(&ConnectRequest {
            wireless: true,
            ip: Some("192.168.1.20".into()),
        });
        assert!(r.success);
        assert_eq!(sim.serial(), Some("192.168.1.20:5555"));

        let r = sim.connect(&ConnectRequest {
            wireless: true,
            ip: Some(" ".into()),
        });
        assert!(!r.success);
        assert_eq!(sim.serial(), Some("192.168.1.20:5555"));
    }

    #[test]
    fn start_and_stop_are_guarded() {
        let mut sim = DeviceSim::new();
        assert!(!sim.start(1.0).0.success);
        assert!(!sim.stop().success);

        sim.connect(&wired());
        assert!(!sim.start(0.0).0.success);
        let (r, id) = sim.start(1.0);
        assert!(r.success);
        assert_eq!(id, Some((1, Duration::from_secs(1))));
        let (r, id) = sim.start(1.0);
        assert_eq!(r.message, "monitoring already running");
        assert_eq!(id, None);

        assert!(sim.stop().success);
        assert_eq!(sim.session(), None);
        assert_eq!(sim.start(2.0).1.map(|(id, _)| id), Some(2));
    }

    #[test]
    fn unrepresentable_interval_is_refused_without_state_change() {
        let mut sim = DeviceSim::new();
        sim.connect(&wired());
        for bad in [1e20, f64::INFINITY, f64::NAN, -1.0, 1e-12] {
            let (r, id) = sim.start(bad);
            assert!(!r.success, "{bad} accepted");
            assert_eq!(id, None);
            assert_eq!(sim.session(), None);
        }
        assert!(sim.start(0.5).0.success);
    }

    #[test]
    fn disconnect_ends_session_and_info() {
        let mut sim = DeviceSim::new();
        sim.connect(&wired());
        assert!(sim.info().success);
        sim.start(1.0);
        assert!(sim.disconnect().success);
        assert_eq!(sim.session(), None);
        let info = sim.info();
        assert!(!info.success && info.device_info.is_none());
    }
}
