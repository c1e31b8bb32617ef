//! Shared agent state: the simulated device and the sample fan-out channel.

use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};

use crate::device::DeviceSim;

pub type SharedDevice = Arc<Mutex<DeviceSim>>;

// Frames queued per subscriber before it starts lagging
const FRAME_BACKLOG: usize = 64;

#[derive(Clone)]
pub struct AppState {
    pub device: SharedDevice,
    // Serialized `performance_data` frames, one per tick
    pub frames: broadcast::Sender<String>,
    pub cores: usize,
}

impl AppState {
    pub fn new(cores: usize) -> Self {
        let (frames, _) = broadcast::channel(FRAME_BACKLOG);
        Self {
            device: Arc::new(Mutex::new(DeviceSim::new())),
            frames,
            cores: cores.max(1),
        }
    }
}
