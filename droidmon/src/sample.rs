//! Validated telemetry samples and the per-metric scalar projections.

use std::collections::HashMap;

use chrono::{DateTime, Local};

use crate::error::{Result, SessionError};
use crate::types::WireSample;

const CORE_PREFIX: &str = "core_";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Core {
    pub index: u32,
    pub freq_mhz: f64,
    pub load_pct: f64,
}

/// One reading from the device. `cores` is kept sorted by index.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub timestamp: f64,
    pub fps: f64,
    pub cores: Vec<Core>,
    pub gpu_freq: f64,
    pub gpu_load: f64,
    pub current: f64,
    pub power: f64,
}

impl TryFrom<WireSample> for Sample {
    type Error = SessionError;

    fn try_from(w: WireSample) -> Result<Self> {
        if w.cpu_freq.len() != w.cpu_load.len() {
            return Err(SessionError::MalformedSample(format!(
                "cpu_freq has {} cores, cpu_load has {}",
                w.cpu_freq.len(),
                w.cpu_load.len()
            )));
        }
        if w.cpu_load.is_empty() {
            return Err(SessionError::MalformedSample("no cpu cores".into()));
        }

        let loads = index_by_core(&w.cpu_load)?;
        let mut cores = Vec::with_capacity(loads.len());
        for (key, freq) in &w.cpu_freq {
            let index = parse_core_key(key)?;
            let load = loads.get(&index).copied().ok_or_else(|| {
                SessionError::MalformedSample(format!("{key} has a frequency but no load"))
            })?;
            cores.push(Core {
                index,
                freq_mhz: *freq,
                load_pct: load,
            });
        }
        cores.sort_by_key(|c| c.index);

        Ok(Sample {
            timestamp: w.timestamp,
            fps: w.fps,
            cores,
            gpu_freq: w.gpu_freq,
            gpu_load: w.gpu_load,
            current: w.current,
            power: w.power,
        })
    }
}

fn index_by_core(map: &HashMap<String, f64>) -> Result<HashMap<u32, f64>> {
    map.iter()
        .map(|(k, v)| parse_core_key(k).map(|i| (i, *v)))
        .collect()
}

fn parse_core_key(key: &str) -> Result<u32> {
    key.strip_prefix(CORE_PREFIX)
        .and_then(|n| n.parse::<u32>().ok())
        .ok_or_else(|| SessionError::MalformedSample(format!("bad core id {key:?}")))
}

/// Which scalar series the chart shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Metric {
    #[default]
    Fps,
    Cpu,
    Gpu,
    Power,
}

impl Metric {
    pub const ALL: [Metric; 4] = [Metric::Fps, Metric::Cpu, Metric::Gpu, Metric::Power];

    pub fn key(self) -> &'static str {
        match self {
            Metric::Fps => "fps",
            Metric::Cpu => "cpu",
            Metric::Gpu => "gpu",
            Metric::Power => "power",
        }
    }

    pub fn from_key(s: &str) -> Option<Metric> {
        Metric::ALL
            .into_iter()
            .find(|m| m.key().eq_ignore_ascii_case(s.trim()))
    }

    pub fn label(self) -> &'static str {
        match self {
            Metric::Fps => "FPS",
            Metric::Cpu => "CPU load",
            Metric::Gpu => "GPU load",
            Metric::Power => "Power",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Metric::Fps => "frames/s",
            Metric::Cpu | Metric::Gpu => "%",
            Metric::Power => "mW",
        }
    }
}

/// Scalar value of `sample` under `metric`.
pub fn project(sample: &Sample, metric: Metric) -> Result<f64> {
    match metric {
        Metric::Fps => Ok(sample.fps),
        Metric::Cpu => mean_cpu_load(sample),
        Metric::Gpu => Ok(sample.gpu_load),
        Metric::Power => Ok(sample.power),
    }
}

pub fn mean_cpu_load(sample: &Sample) -> Result<f64> {
    mean(sample.cores.iter().map(|c| c.load_pct))
}

pub fn mean_cpu_freq(sample: &Sample) -> Result<f64> {
    mean(sample.cores.iter().map(|c| c.freq_mhz))
}

fn mean(values: impl ExactSizeIterator<Item = f64>) -> Result<f64> {
    let n = values.len();
    if n == 0 {
        return Err(SessionError::MalformedSample(
            "mean over an empty core set".into(),
        ));
    }
    Ok(values.sum::<f64>() / n as f64)
}

/// Ascending core indices of `sample`.
pub fn core_ids(sample: &Sample) -> Vec<u32> {
    let mut ids: Vec<u32> = sample.cores.iter().map(|c| c.index).collect();
    ids.sort_unstable();
    ids
}

fn local_time(ts: f64) -> Option<DateTime<Local>> {
    if !ts.is_finite() {
        return None;
    }
    DateTime::from_timestamp_millis((ts * 1000.0).round() as i64).map(|t| t.with_timezone(&Local))
}

// HH:MM:SS in local time, used for chart labels
pub fn clock_label(ts: f64) -> String {
    local_time(ts)
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "-".into())
}

pub fn datetime_label(ts: f64) -> String {
    local_time(ts)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".into())
}
