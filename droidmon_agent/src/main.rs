//! droidmon_agent: demo backend for droidmon. Serves the control API and the
//! sample stream for a simulated Android device.

mod api;
mod device;
mod sampler;
mod state;
mod types;
mod ws;

use std::env;
use std::net::SocketAddr;

use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use tracing_subscriber::EnvFilter;

use crate::state::AppState;

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_CORES: usize = 8;

fn parse_port<I: IntoIterator<Item = String>>(args: I, default_port: u16) -> u16 {
    let mut it = args.into_iter();
    let _ = it.next(); // program name
    let mut long: Option<String> = None;
    let mut short: Option<String> = None;
    while let Some(a) = it.next() {
        match a.as_str() {
            "--port" => long = it.next(),
            "-p" => short = it.next(),
            _ if a.starts_with("--port=") => {
                if let Some((_, v)) = a.split_once('=') {
                    long = Some(v.to_string());
                }
            }
            _ => {}
        }
    }
    long.or(short)
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(default_port)
}

fn core_count() -> usize {
    env::var("DROIDMON_AGENT_CORES")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(DEFAULT_CORES)
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/capability_check", get(api::capability_check))
        .route("/api/connect", post(api::connect))
        .route("/api/disconnect", post(api::disconnect))
        .route("/api/start_monitoring", post(api::start_monitoring))
        .route("/api/stop_monitoring", post(api::stop_monitoring))
        .route("/api/device_info", get(api::device_info))
        .route("/ws", get(ws::ws_handler))
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if env::args().any(|a| a == "--help" || a == "-h") {
        println!("Usage: droidmon_agent [--port PORT|-p PORT]");
        return Ok(());
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let port = parse_port(env::args(), DEFAULT_PORT);
    let cores = core_count();
    let app = router(AppState::new(cores));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(%addr, cores, "demo agent listening");
    println!("droidmon demo agent running at http://{addr}");

    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(v: &[&str]) -> Vec<String> {
        std::iter::once("agent")
            .chain(v.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn port_long_short_and_assign() {
        assert_eq!(parse_port(args(&["--port", "9001"]), 5000), 9001);
        assert_eq!(parse_port(args(&["-p", "9002"]), 5000), 9002);
        assert_eq!(parse_port(args(&["--port=9003"]), 5000), 9003);
        assert_eq!(parse_port(args(&["--port", "nope"]), 5000), 5000);
        assert_eq!(parse_port(args(&[]), 5000), 5000);
    }
}
