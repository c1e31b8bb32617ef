//! Control API handlers (`/api/*`).

use axum::{extract::State, Json};
use tracing::info;

use crate::sampler::spawn_sampler;
use crate::state::AppState;
use crate::types::{ApiReply, CapabilityReply, ConnectRequest, DeviceInfoReply, StartRequest};

// The simulated device is always reachable.
pub async fn capability_check() -> Json<CapabilityReply> {
    Json(CapabilityReply { available: true })
}

pub async fn connect(
    State(state): State<AppState>,
    Json(req): Json<ConnectRequest>,
) -> Json<ApiReply> {
    let mut dev = state.device.lock().await;
    let reply = dev.connect(&req);
    info!(success = reply.success, serial = ?dev.serial(), "connect");
    Json(reply)
}

pub async fn disconnect(State(state): State<AppState>) -> Json<ApiReply> {
    let reply = state.device.lock().await.disconnect();
    info!("disconnect");
    Json(reply)
}

pub async fn start_monitoring(
    State(state): State<AppState>,
    Json(req): Json<StartRequest>,
) -> Json<ApiReply> {
    let (reply, started) = state.device.lock().await.start(req.interval);
    if let Some((session, period)) = started {
        info!(session, interval = req.interval, "monitoring started");
        spawn_sampler(state.clone(), session, period);
    }
    Json(reply)
}

pub async fn stop_monitoring(State(state): State<AppState>) -> Json<ApiReply> {
    let reply = state.device.lock().await.stop();
    info!(success = reply.success, "stop monitoring");
    Json(reply)
}

pub async fn device_info(State(state): State<AppState>) -> Json<DeviceInfoReply> {
    Json(state.device.lock().await.info())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn huge_interval_is_refused_and_device_stays_usable() {
        let state = AppState::new(2);
        connect(State(state.clone()), Json(ConnectRequest::default())).await;

        let Json(reply) = start_monitoring(
            State(state.clone()),
            Json(StartRequest { interval: 1e20 }),
        )
        .await;
        assert!(!reply.success);
        assert_eq!(state.device.lock().await.session(), None);

        let Json(reply) =
            start_monitoring(State(state.clone()), Json(StartRequest { interval: 0.5 })).await;
        assert!(reply.success, "{}", reply.message);
        stop_monitoring(State(state)).await;
    }
}
