//! Connection/monitoring state machine.

use crate::error::{Result, SessionError};
use crate::types::DeviceInfo;

#[derive(Debug, Clone, PartialEq)]
pub struct Device {
    pub id: String,
    // Filled in after connecting, best effort
    pub info: Option<DeviceInfo>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionState {
    #[default]
    Disconnected,
    Connected(Device),
    Monitoring { device: Device, interval: f64 },
}

/// Lifecycle calls the user can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Connect,
    Disconnect,
    StartMonitoring,
    StopMonitoring,
}

impl Lifecycle {
    pub fn name(self) -> &'static str {
        match self {
            Lifecycle::Connect => "connect",
            Lifecycle::Disconnect => "disconnect",
            Lifecycle::StartMonitoring => "start monitoring",
            Lifecycle::StopMonitoring => "stop monitoring",
        }
    }
}

/// Outcome of a lifecycle call the backend accepted.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    Connected { device_id: String },
    Disconnected,
    MonitoringStarted { interval: f64 },
    MonitoringStopped,
}

impl SessionState {
    pub fn label(&self) -> &'static str {
        match self {
            SessionState::Disconnected => "disconnected",
            SessionState::Connected(_) => "connected",
            SessionState::Monitoring { .. } => "monitoring",
        }
    }

    pub fn is_connected(&self) -> bool {
        !matches!(self, SessionState::Disconnected)
    }

    pub fn is_monitoring(&self) -> bool {
        matches!(self, SessionState::Monitoring { .. })
    }

    pub fn device(&self) -> Option<&Device> {
        match self {
            SessionState::Disconnected => None,
            SessionState::Connected(d) | SessionState::Monitoring { device: d, .. } => Some(d),
        }
    }

    pub fn interval(&self) -> Option<f64> {
        match self {
            SessionState::Monitoring { interval, .. } => Some(*interval),
            _ => None,
        }
    }

    pub fn permits(&self, op: Lifecycle) -> bool {
        matches!(
            (self, op),
            (SessionState::Disconnected, Lifecycle::Connect)
                | (SessionState::Connected(_), Lifecycle::Disconnect)
                | (SessionState::Connected(_), Lifecycle::StartMonitoring)
                | (SessionState::Monitoring { .. }, Lifecycle::StopMonitoring)
                | (SessionState::Monitoring { .. }, Lifecycle::Disconnect)
        )
    }

    /// Local gate checked before any backend call.
    pub fn require(&self, op: Lifecycle) -> Result<()> {
        if self.permits(op) {
            Ok(())
        } else {
            Err(SessionError::PreconditionFailed {
                op: op.name(),
                state: self.label(),
            })
        }
    }

    /// Applies an accepted transition. Pairs outside the transition table are
    /// rejected and leave the state as it was.
    pub fn apply(&mut self, t: Transition) -> Result<()> {
        let next = match (&*self, t) {
            (SessionState::Disconnected, Transition::Connected { device_id }) => {
                SessionState::Connected(Device {
                    id: device_id,
                    info: None,
                })
            }
            (SessionState::Connected(_), Transition::Disconnected)
            | (SessionState::Monitoring { .. }, Transition::Disconnected) => {
                SessionState::Disconnected
            }
            (SessionState::Connected(d), Transition::MonitoringStarted { interval }) => {
                SessionState::Monitoring {
                    device: d.clone(),
                    interval,
                }
            }
            (SessionState::Monitoring { device, .. }, Transition::MonitoringStopped) => {
                SessionState::Connected(device.clone())
            }
            (_, t) => {
                return Err(SessionError::PreconditionFailed {
                    op: transition_op(&t).name(),
                    state: self.label(),
                })
            }
        };
        *self = next;
        Ok(())
    }

    pub fn set_device_info(&mut self, info: DeviceInfo) {
        match self {
            SessionState::Connected(d) | SessionState::Monitoring { device: d, .. } => {
                d.info = Some(info)
            }
            SessionState::Disconnected => {}
        }
    }
}

fn transition_op(t: &Transition) -> Lifecycle {
    match t {
        Transition::Connected { .. } => Lifecycle::Connect,
        Transition::Disconnected => Lifecycle::Disconnect,
        Transition::MonitoringStarted { .. } => Lifecycle::StartMonitoring,
        Transition::MonitoringStopped => Lifecycle::StopMonitoring,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OPS: [Lifecycle; 4] = [
        Lifecycle::Connect,
        Lifecycle::Disconnect,
        Lifecycle::StartMonitoring,
        Lifecycle::StopMonitoring,
    ];

    fn success_of(op: Lifecycle) -> Transition {
        match op {
            Lifecycle::Connect => Transition::Connected {
                device_id: "emulator-5554".into(),
            },
            Lifecycle::Disconnect => Transition::Disconnected,
            Lifecycle::StartMonitoring => Transition::MonitoringStarted { interval: 1.0 },
            Lifecycle::StopMonitoring => Transition::MonitoringStopped,
        }
    }

    // Independent model of the transition table: (connected, monitoring)
    fn model(state: (bool, bool), op: Lifecycle) -> (bool, bool) {
        match (state, op) {
            ((false, _), Lifecycle::Connect) => (true, false),
            ((true, _), Lifecycle::Disconnect) => (false, false),
            ((true, false), Lifecycle::StartMonitoring) => (true, true),
            ((true, true), Lifecycle::StopMonitoring) => (true, false),
            (s, _) => s,
        }
    }

    fn observe(s: &SessionState) -> (bool, bool) {
        (s.is_connected(), s.is_monitoring())
    }

    #[test]
    fn every_sequence_matches_folded_transition_rules() {
        // all op sequences up to length 5
        let mut seqs: Vec<Vec<Lifecycle>> = vec![vec![]];
        let mut frontier = seqs.clone();
        for _ in 0..5 {
            frontier = frontier
                .iter()
                .flat_map(|s| {
                    OPS.iter().map(move |op| {
                        let mut v = s.clone();
                        v.push(*op);
                        v
                    })
                })
                .collect();
            seqs.extend(frontier.iter().cloned());
        }
        assert_eq!(seqs.len(), 1 + 4 + 16 + 64 + 256 + 1024);

        for seq in &seqs {
            let mut state = SessionState::default();
            let mut expected = (false, false);
            for op in seq {
                let before = state.clone();
                match state.require(*op) {
                    Ok(()) => state.apply(success_of(*op)).unwrap(),
                    Err(SessionError::PreconditionFailed { .. }) => assert_eq!(state, before),
                    Err(e) => panic!("unexpected {e}"),
                }
                expected = model(expected, *op);
                assert_eq!(observe(&state), expected, "sequence {seq:?}");
                assert_ne!(observe(&state), (false, true));
            }
        }
    }

    #[test]
    fn start_monitoring_requires_connection() {
        let s = SessionState::Disconnected;
        let err = s.require(Lifecycle::StartMonitoring).unwrap_err();
        assert!(matches!(
            err,
            SessionError::PreconditionFailed {
                op: "start monitoring",
                state: "disconnected"
            }
        ));
    }

    #[test]
    fn apply_rejects_transitions_outside_table() {
        let mut s = SessionState::Disconnected;
        assert!(s.apply(Transition::MonitoringStopped).is_err());
        assert_eq!(s, SessionState::Disconnected);

        s.apply(Transition::Connected {
            device_id: "x".into(),
        })
        .unwrap();
        assert!(s
            .apply(Transition::Connected {
                device_id: "y".into()
            })
            .is_err());
        assert_eq!(s.device().unwrap().id, "x");
    }

    #[test]
    fn device_survives_monitoring_round_trip() {
        let mut s = SessionState::Disconnected;
        s.apply(success_of(Lifecycle::Connect)).unwrap();
        s.set_device_info(DeviceInfo {
            model: "Pixel 7".into(),
            os_version: "14".into(),
            api_level: "34".into(),
        });
        s.apply(Transition::MonitoringStarted { interval: 0.5 }).unwrap();
        assert_eq!(s.interval(), Some(0.5));
        s.apply(Transition::MonitoringStopped).unwrap();
        let d = s.device().unwrap();
        assert_eq!(d.info.as_ref().unwrap().model, "Pixel 7");
        assert_eq!(s.interval(), None);
    }
}
