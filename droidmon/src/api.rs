//! Device-control backend: the request/response API the session controller drives.

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::error::{Result, SessionError};
use crate::types::{
    ApiReply, CapabilityReply, ConnectOptions, DeviceInfoReply, StartMonitoringRequest,
};

pub const DEFAULT_SERVER: &str = "http://127.0.0.1:5000";
const DEFAULT_TIMEOUT_SECONDS: u64 = 15;

/// Calls issued by [`crate::controller::SessionController`]. Transport
/// failures are `Err(Transport)`; a backend refusal is an `Ok` reply with
/// `success == false`.
#[allow(async_fn_in_trait)]
pub trait Backend {
    async fn capability_check(&self) -> Result<bool>;
    async fn connect(&self, opts: &ConnectOptions) -> Result<ApiReply>;
    async fn disconnect(&self) -> Result<ApiReply>;
    async fn start_monitoring(&self, interval: f64) -> Result<ApiReply>;
    async fn stop_monitoring(&self) -> Result<ApiReply>;
    async fn device_info(&self) -> Result<DeviceInfoReply>;
}

/// JSON-over-HTTP backend.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base: Url,
}

impl HttpBackend {
    pub fn new(server: &str) -> Result<Self> {
        Self::with_timeout(server, Duration::from_secs(DEFAULT_TIMEOUT_SECONDS))
    }

    pub fn with_timeout(server: &str, timeout: Duration) -> Result<Self> {
        let base = parse_server_url(server)?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(SessionError::from)?;
        Ok(Self { client, base })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base
            .join(&format!("api/{path}"))
            .map_err(|e| SessionError::Validation(format!("bad endpoint {path}: {e}")))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.endpoint(path)?;
        tracing::debug!(%url, "GET");
        let resp = self.client.get(url).send().await?.error_for_status()?;
        Ok(resp.json::<T>().await?)
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<&B>,
    ) -> Result<T> {
        let url = self.endpoint(path)?;
        tracing::debug!(%url, "POST");
        let mut req = self.client.post(url);
        if let Some(b) = body {
            req = req.json(b);
        }
        let resp = req.send().await?.error_for_status()?;
        Ok(resp.json::<T>().await?)
    }
}

impl Backend for HttpBackend {
    async fn capability_check(&self) -> Result<bool> {
        let reply: CapabilityReply = self.get("capability_check").await?;
        Ok(reply.available)
    }

    async fn connect(&self, opts: &ConnectOptions) -> Result<ApiReply> {
        self.post("connect", Some(opts)).await
    }

    async fn disconnect(&self) -> Result<ApiReply> {
        self.post::<(), _>("disconnect", None).await
    }

    async fn start_monitoring(&self, interval: f64) -> Result<ApiReply> {
        self.post("start_monitoring", Some(&StartMonitoringRequest { interval }))
            .await
    }

    async fn stop_monitoring(&self) -> Result<ApiReply> {
        self.post::<(), _>("stop_monitoring", None).await
    }

    async fn device_info(&self) -> Result<DeviceInfoReply> {
        self.get("device_info").await
    }
}

/// Accepts `host:port` or a full http(s) URL; the result always ends in `/`.
pub fn parse_server_url(server: &str) -> Result<Url> {
    let s = server.trim();
    let with_scheme = if s.contains("://") {
        s.to_string()
    } else {
        format!("http://{s}")
    };
    let mut url = Url::parse(&with_scheme)
        .map_err(|e| SessionError::Validation(format!("bad server url {server:?}: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(SessionError::Validation(format!(
            "server url must be http(s), got {}",
            url.scheme()
        )));
    }
    if !url.path().ends_with('/') {
        let p = format!("{}/", url.path());
        url.set_path(&p);
    }
    Ok(url)
}

/// WebSocket URL of the sample stream for a backend base URL.
pub fn stream_url(base: &Url) -> Result<Url> {
    let mut ws = base
        .join("ws")
        .map_err(|e| SessionError::Validation(e.to_string()))?;
    let scheme = if base.scheme() == "https" { "wss" } else { "ws" };
    ws.set_scheme(scheme)
        .map_err(|_| SessionError::Validation(format!("cannot derive stream url from {base}")))?;
    Ok(ws)
}
