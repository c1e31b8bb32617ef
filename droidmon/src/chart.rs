//! Keeps a chart series in lockstep with the stream buffer for the selected metric.

use std::collections::VecDeque;

use crate::error::Result;
use crate::history::{StreamBuffer, WINDOW_CAP};
use crate::sample::{clock_label, project, Metric, Sample};

#[derive(Debug, Clone, PartialEq)]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
}

impl ChartPoint {
    fn from_sample(sample: &Sample, metric: Metric) -> Result<Self> {
        Ok(ChartPoint {
            label: clock_label(sample.timestamp),
            value: project(sample, metric)?,
        })
    }
}

/// Anything that can display a single time series.
pub trait ChartSink {
    /// Drop all points and retitle the chart for `metric`.
    fn reset(&mut self, metric: Metric);
    fn push(&mut self, point: ChartPoint);
    fn pop_front(&mut self);
}

/// In-memory sink; the TUI draws from it.
#[derive(Debug, Default, Clone)]
pub struct Series {
    pub metric: Metric,
    pub points: VecDeque<ChartPoint>,
}

impl Series {
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    /// (min, max) of the visible values, `None` when empty.
    pub fn bounds(&self) -> Option<(f64, f64)> {
        self.points.iter().map(|p| p.value).fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }
}

impl ChartSink for Series {
    fn reset(&mut self, metric: Metric) {
        self.metric = metric;
        self.points.clear();
    }

    fn push(&mut self, point: ChartPoint) {
        self.points.push_back(point);
    }

    fn pop_front(&mut self) {
        self.points.pop_front();
    }
}

#[derive(Debug, Default)]
pub struct ChartProjector {
    metric: Metric,
    shown: usize,
}

impl ChartProjector {
    pub fn new(metric: Metric) -> Self {
        Self { metric, shown: 0 }
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    /// Empty the sink, keeping the current metric.
    pub fn clear<S: ChartSink + ?Sized>(&mut self, sink: &mut S) {
        sink.reset(self.metric);
        self.shown = 0;
    }

    /// Switch metric and rebuild the series from the whole history; only the
    /// newest `WINDOW_CAP` points are kept. On error nothing changes.
    pub fn select<S: ChartSink + ?Sized>(
        &mut self,
        metric: Metric,
        buffer: &StreamBuffer,
        sink: &mut S,
    ) -> Result<()> {
        let mut points = buffer
            .full_history()
            .map(|s| ChartPoint::from_sample(s, metric))
            .collect::<Result<VecDeque<_>>>()?;
        while points.len() > WINDOW_CAP {
            points.pop_front();
        }

        self.metric = metric;
        sink.reset(metric);
        self.shown = points.len();
        for p in points {
            sink.push(p);
        }
        Ok(())
    }

    /// Project the newest rolling-window entry and append it.
    pub fn on_append<S: ChartSink + ?Sized>(
        &mut self,
        buffer: &StreamBuffer,
        sink: &mut S,
    ) -> Result<()> {
        let Some(newest) = buffer.rolling_window().next_back() else {
            return Ok(());
        };
        let point = ChartPoint::from_sample(newest, self.metric)?;
        if self.shown >= WINDOW_CAP {
            sink.pop_front();
            self.shown -= 1;
        }
        sink.push(point);
        self.shown += 1;
        Ok(())
    }
}
