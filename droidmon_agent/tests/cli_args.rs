//! Runs the agent binary and drives it with the droidmon client library.
use std::net::TcpListener;
use std::process::{Child, Command};
use std::time::Duration;

use droidmon::api::{stream_url, Backend, HttpBackend};
use droidmon::types::ConnectOptions;
use droidmon::ws::{connect, decode_frame, StreamEvent};
use futures_util::StreamExt;
use tokio_tungstenite::tungstenite::Message;

struct Agent(Child);

impl Drop for Agent {
    fn drop(&mut self) {
        let _ = self.0.kill();
        let _ = self.0.wait();
    }
}

fn free_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .and_then(|l| l.local_addr())
        .map(|a| a.port())
        .expect("free port")
}

fn spawn_agent(flag: &str, port: u16) -> Agent {
    let exe = env!("CARGO_BIN_EXE_droidmon_agent");
    let child = Command::new(exe)
        .args([flag, &port.to_string()])
        .env("DROIDMON_AGENT_CORES", "4")
        .spawn()
        .expect("spawn agent");
    Agent(child)
}

async fn ready(port: u16) -> HttpBackend {
    let backend = HttpBackend::new(&format!("127.0.0.1:{port}")).unwrap();
    for _ in 0..50 {
        if let Ok(available) = backend.capability_check().await {
            assert!(available);
            return backend;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    panic!("agent did not come up on port {port}");
}

#[test]
fn test_help() {
    let out = Command::new(env!("CARGO_BIN_EXE_droidmon_agent"))
        .arg("--help")
        .output()
        .expect("run agent");
    assert!(String::from_utf8_lossy(&out.stdout).contains("--port"));
}

#[tokio::test]
async fn test_short_port_flag_and_lifecycle() {
    let port = free_port();
    let _agent = spawn_agent("-p", port);
    let backend = ready(port).await;

    let refused = backend.start_monitoring(1.0).await.unwrap();
    assert!(!refused.success);

    let reply = backend.connect(&ConnectOptions::wired()).await.unwrap();
    assert!(reply.success);
    assert_eq!(reply.message, "Connected to device: emulator-5554");
    let info = backend.device_info().await.unwrap();
    assert!(info.success && info.device_info.is_some());

    assert!(backend.start_monitoring(0.5).await.unwrap().success);
    assert!(!backend.start_monitoring(0.5).await.unwrap().success);
    assert!(backend.stop_monitoring().await.unwrap().success);
    assert!(!backend.stop_monitoring().await.unwrap().success);
    assert!(backend.disconnect().await.unwrap().success);
}

#[tokio::test]
async fn test_long_port_flag_streams_samples() {
    let port = free_port();
    let _agent = spawn_agent("--port", port);
    let backend = ready(port).await;

    let mut ws = connect(stream_url(backend.base()).unwrap().as_str())
        .await
        .expect("subscribe");
    assert!(backend.connect(&ConnectOptions::wired()).await.unwrap().success);
    assert!(backend.start_monitoring(0.1).await.unwrap().success);

    let text = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            match ws.next().await {
                Some(Ok(Message::Text(text))) => break text,
                Some(Ok(_)) => continue,
                other => panic!("stream ended: {other:?}"),
            }
        }
    })
    .await
    .expect("a sample within 5s");

    match decode_frame(&text) {
        Some(StreamEvent::Sample(s)) => {
            assert_eq!(s.cpu_load.len(), 4);
            assert_eq!(s.cpu_freq.len(), 4);
        }
        other => panic!("unexpected frame {other:?}"),
    }
    assert!(backend.stop_monitoring().await.unwrap().success);
}
