//! Session controller: drives the lifecycle against the backend and owns the
//! session context (state, sample buffer, chart projection).
//!
//! Every lifecycle method checks the local state first, so an invalid request
//! never reaches the backend. A refused or failed call leaves the state as it
//! was. Lifecycle requests from the UI are queued as [`Command`]s and run one at
//! a time through [`SessionController::dispatch`] ([`SessionController::drain`]
//! for a whole queue), so a disconnect issued while a connect is in flight
//! waits for the connect to finish.

use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info, warn};

use crate::api::Backend;
use crate::chart::{ChartProjector, ChartSink, Series};
use crate::error::{Result, SessionError};
use crate::export;
use crate::history::StreamBuffer;
use crate::sample::{Metric, Sample};
use crate::session::{Lifecycle, SessionState, Transition};
use crate::types::{ApiReply, ConnectOptions, WireSample};
use crate::ws::StreamEvent;

/// Longest sampling interval accepted, in seconds.
pub const MAX_INTERVAL_SECS: f64 = 3600.0;

/// A user request queued for the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Connect(ConnectOptions),
    Disconnect,
    StartMonitoring { interval: f64 },
    StopMonitoring,
    SelectMetric(Metric),
}

pub struct SessionController<B, S = Series> {
    backend: B,
    state: SessionState,
    buffer: StreamBuffer,
    chart: ChartProjector,
    sink: S,
}

impl<B: Backend> SessionController<B> {
    pub fn new(backend: B) -> Self {
        Self::with_sink(backend, Series::default())
    }
}

impl<B: Backend, S: ChartSink> SessionController<B, S> {
    pub fn with_sink(backend: B, sink: S) -> Self {
        Self {
            backend,
            state: SessionState::default(),
            buffer: StreamBuffer::new(),
            chart: ChartProjector::default(),
            sink,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn buffer(&self) -> &StreamBuffer {
        &self.buffer
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn metric(&self) -> Metric {
        self.chart.metric()
    }

    pub async fn capability_check(&self) -> Result<bool> {
        self.backend.capability_check().await
    }

    pub async fn connect(&mut self, opts: ConnectOptions) -> Result<String> {
        let opts = validate_connect(opts)?;
        self.state.require(Lifecycle::Connect)?;

        let message = accepted(self.backend.connect(&opts).await?)?;
        let device_id = device_id_from(&message)
            .or(opts.ip.as_deref())
            .unwrap_or("unknown")
            .to_string();
        self.state.apply(Transition::Connected {
            device_id: device_id.clone(),
        })?;
        info!(device = %device_id, wireless = opts.wireless, "connected");

        // Metadata is cosmetic; a failure here keeps the connection.
        match self.backend.device_info().await {
            Ok(reply) if reply.success => {
                if let Some(info) = reply.device_info {
                    debug!(model = %info.model, "device info");
                    self.state.set_device_info(info);
                }
            }
            Ok(reply) => warn!(message = ?reply.message, "device info refused"),
            Err(e) => warn!(error = %e, "device info fetch failed"),
        }
        Ok(message)
    }

    pub async fn disconnect(&mut self) -> Result<String> {
        self.state.require(Lifecycle::Disconnect)?;

        if self.state.is_monitoring() {
            if let Err(e) = self.stop_monitoring().await {
                warn!(error = %e, "stop before disconnect failed; disconnecting anyway");
            }
        }

        let message = accepted(self.backend.disconnect().await?)?;
        self.state.apply(Transition::Disconnected)?;
        info!("disconnected");
        Ok(message)
    }

    pub async fn start_monitoring(&mut self, interval: f64) -> Result<String> {
        validate_interval(interval)?;
        self.state.require(Lifecycle::StartMonitoring)?;

        let message = accepted(self.backend.start_monitoring(interval).await?)?;
        self.state.apply(Transition::MonitoringStarted { interval })?;
        self.buffer.reset();
        self.chart.clear(&mut self.sink);
        info!(interval, "monitoring started");
        Ok(message)
    }

    /// History is kept so the session can still be exported.
    pub async fn stop_monitoring(&mut self) -> Result<String> {
        self.state.require(Lifecycle::StopMonitoring)?;

        let message = accepted(self.backend.stop_monitoring().await?)?;
        self.state.apply(Transition::MonitoringStopped)?;
        info!(samples = self.buffer.len(), "monitoring stopped");
        Ok(message)
    }

    /// Ingest one streamed sample. Returns `Ok(false)` when it arrived outside
    /// a monitoring session and was dropped.
    pub fn on_stream_event(&mut self, wire: WireSample) -> Result<bool> {
        if !self.state.is_monitoring() {
            debug!(ts = wire.timestamp, "dropping sample outside monitoring");
            return Ok(false);
        }
        let sample = Sample::try_from(wire)?;
        self.buffer.append(sample);
        self.chart.on_append(&self.buffer, &mut self.sink)?;
        Ok(true)
    }

    pub fn handle_stream(&mut self, ev: StreamEvent) -> Result<bool> {
        match ev {
            StreamEvent::Sample(s) => self.on_stream_event(s),
            StreamEvent::Malformed(m) if self.state.is_monitoring() => {
                Err(SessionError::MalformedSample(m))
            }
            StreamEvent::Malformed(m) => {
                debug!(%m, "ignoring malformed frame outside monitoring");
                Ok(false)
            }
            StreamEvent::Lost(reason) => Err(SessionError::Transport(format!(
                "sample stream lost: {reason}"
            ))),
        }
    }

    pub fn select_metric(&mut self, metric: Metric) -> Result<()> {
        self.chart.select(metric, &self.buffer, &mut self.sink)
    }

    pub fn export(&self) -> Result<Vec<u8>> {
        export::export(&self.buffer)
    }

    /// Run one command to completion. Returns a status line for the UI.
    pub async fn dispatch(&mut self, cmd: Command) -> Result<String> {
        match cmd {
            Command::Connect(opts) => self.connect(opts).await,
            Command::Disconnect => self.disconnect().await,
            Command::StartMonitoring { interval } => self.start_monitoring(interval).await,
            Command::StopMonitoring => self.stop_monitoring().await,
            Command::SelectMetric(m) => {
                self.select_metric(m)?;
                Ok(format!("chart: {}", m.label()))
            }
        }
    }

    /// Run every queued command, strictly in order, each awaited before the
    /// next is taken.
    pub async fn drain(&mut self, queue: &mut UnboundedReceiver<Command>) -> Vec<Result<String>> {
        let mut results = Vec::new();
        while let Ok(cmd) = queue.try_recv() {
            debug!(?cmd, "dispatch");
            results.push(self.dispatch(cmd).await);
        }
        results
    }
}

fn validate_connect(mut opts: ConnectOptions) -> Result<ConnectOptions> {
    opts.ip = opts
        .ip
        .map(|ip| ip.trim().to_string())
        .filter(|ip| !ip.is_empty());
    if opts.wireless && opts.ip.is_none() {
        return Err(SessionError::Validation(
            "wireless connection needs the device IP address".into(),
        ));
    }
    Ok(opts)
}

pub fn validate_interval(interval: f64) -> Result<()> {
    if interval.is_finite() && interval > 0.0 && interval <= MAX_INTERVAL_SECS {
        Ok(())
    } else {
        Err(SessionError::Validation(format!(
            "sampling interval must be between 0 and {MAX_INTERVAL_SECS} seconds, got {interval}"
        )))
    }
}

fn accepted(reply: ApiReply) -> Result<String> {
    if reply.success {
        Ok(reply.message)
    } else {
        Err(SessionError::BackendRejected(reply.message))
    }
}

/// The backend reports the device as `"<text>: <device id>"`.
fn device_id_from(message: &str) -> Option<&str> {
    message
        .split(": ")
        .nth(1)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}
