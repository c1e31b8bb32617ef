//! Background sampler: while a monitoring session runs, synthesizes one sample
//! per interval and broadcasts it to every stream subscriber.

use std::time::{SystemTime, UNIX_EPOCH};

use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info};

use crate::state::AppState;
use crate::types::{Frame, Sample, PERFORMANCE_DATA};

const MIN_PERIOD: Duration = Duration::from_millis(10);

fn now_secs() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

// Smooth pseudo-random wave in [0, 1] so the charts have something to show
fn wave(tick: u64, phase: f64) -> f64 {
    let t = tick as f64 * 0.35 + phase;
    0.5 + 0.35 * t.sin() + 0.15 * (t * 2.7 + phase).cos()
}

/// Deterministic synthetic reading for `tick` on a device with `cores` cores.
pub fn synth_sample(tick: u64, cores: usize, timestamp: f64) -> Sample {
    let mut cpu_freq = std::collections::BTreeMap::new();
    let mut cpu_load = std::collections::BTreeMap::new();
    for i in 0..cores {
        let key = format!("core_{i}");
        // big.LITTLE: upper half runs faster
        let base = if i < cores / 2 { 1100.0 } else { 1800.0 };
        let w = wave(tick, i as f64);
        cpu_freq.insert(key.clone(), (base + 900.0 * w).round());
        cpu_load.insert(key, (100.0 * w).clamp(0.0, 100.0).round());
    }
    let g = wave(tick, 7.5);
    let current = (250.0 + 300.0 * g).round();
    Sample {
        timestamp,
        fps: (45.0 + 15.0 * wave(tick, 3.0)).clamp(0.0, 60.0).round(),
        cpu_freq,
        gpu_freq: (315.0 + 270.0 * g).round(),
        cpu_load,
        gpu_load: (100.0 * g).clamp(0.0, 100.0).round(),
        current,
        // ~3.85 V nominal battery voltage
        power: (current * 3.85).round(),
    }
}

pub fn encode_frame(sample: &Sample) -> serde_json::Result<String> {
    serde_json::to_string(&Frame {
        event: PERFORMANCE_DATA,
        data: sample,
    })
}

/// Run until `session` is no longer the device's active monitoring session.
pub fn spawn_sampler(state: AppState, session: u64, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(period.max(MIN_PERIOD));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // first tick completes immediately; the first sample lands one period in
        ticker.tick().await;
        let mut tick = 0u64;
        loop {
            ticker.tick().await;
            if state.device.lock().await.session() != Some(session) {
                break;
            }
            let sample = synth_sample(tick, state.cores, now_secs());
            match encode_frame(&sample) {
                Ok(frame) => {
                    // Err only means nobody is subscribed right now
                    let receivers = state.frames.send(frame).unwrap_or(0);
                    debug!(tick, receivers, "sample broadcast");
                }
                Err(e) => tracing::warn!(error = %e, "could not encode sample"),
            }
            tick += 1;
        }
        info!(session, samples = tick, "sampler finished");
    })
}
