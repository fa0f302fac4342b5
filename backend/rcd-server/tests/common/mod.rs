#![allow(dead_code)]

//! Test infrastructure for rcd-server integration tests

use rcd_config::Config;
use rcd_instance::LifecycleController;
use rcd_server::{Dispatcher, Listener, ShutdownCoordinator};

use std::net::{SocketAddr, TcpListener as StdTcpListener};
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;

pub const RECONFIGURING: &str = "kid1| Reconfiguring Squid Cache (version 0.0-stand-in)...";

/// A proxy stand-in: writes its PID file, logs an accepting line on start
/// and a reconfiguring plus an accepting line per SIGHUP, removes its PID
/// file on SIGTERM or SIGINT. With `hanging_one_shots` its `-z` and `-v`
/// runs never finish on their own.
fn stand_in(config: &Config, port: u16, hanging_one_shots: bool) -> String {
    let (on_z, on_v) = if hanging_one_shots {
        ("exec sleep 8", "exec sleep 8")
    } else {
        ("exit 0", "echo 'Squid Cache: Version 0.0-stand-in'; exit 0")
    };
    let accepting =
        format!("kid1| Accepting HTTP Socket connections at conn1 local=127.0.0.1:{port}");
    format!(
        r#"LOG='{log}'
PID_FILE='{pid}'
for arg in "$@"; do
  case "$arg" in
    -z) {on_z} ;;
    -v) {on_v} ;;
  esac
done
trap 'echo "{RECONFIGURING}" >> "$LOG"; echo "{accepting}" >> "$LOG"' HUP
trap 'rm -f "$PID_FILE"; exit 0' TERM INT
echo $$ > "$PID_FILE"
echo "{accepting}" >> "$LOG"
while :; do sleep 0.02; done
"#,
        log = config.main_log().display(),
        pid = config.pid_file().display(),
    )
}

fn write_script(dir: &Path, name: &str, body: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path.display().to_string()
}

pub struct DaemonOptions {
    pub watchdog: Duration,
    /// When false the proxy port stays closed, so starts never become ready
    pub hold_proxy_port: bool,
    pub hanging_one_shots: bool,
}

impl Default for DaemonOptions {
    fn default() -> Self {
        Self {
            watchdog: Duration::from_secs(60),
            hold_proxy_port: true,
            hanging_one_shots: false,
        }
    }
}

/// A running daemon bound to an ephemeral port, managing a stand-in proxy.
///
/// The proxy's listening port is held by the test itself so readiness
/// readiness checks succeed without a real proxy.
pub struct TestDaemon {
    _temp: TempDir,
    _proxy_port_holder: Option<StdTcpListener>,
    pub proxy_port: u16,
    pub addr: SocketAddr,
    pub config: Config,
    pub shutdown: ShutdownCoordinator,
    pub handle: JoinHandle<()>,
}

impl TestDaemon {
    pub async fn start() -> Self {
        Self::start_with(DaemonOptions::default()).await
    }

    pub async fn start_with(options: DaemonOptions) -> Self {
        let temp = TempDir::new().unwrap();
        let holder = StdTcpListener::bind("127.0.0.1:0").unwrap();
        let proxy_port = holder.local_addr().unwrap().port();
        let holder = options.hold_proxy_port.then_some(holder);

        let mut config = Config::load_from(temp.path()).unwrap();
        config.server.host = String::from("127.0.0.1");
        config.server.port = 0;
        config.readiness.poll_interval_ms = 20;
        config.readiness.empty_pid_grace_ms = 20;
        config.memory_checker.binary = String::from("rcd-test-no-such-memory-checker");
        config.proxy.default_ports = vec![proxy_port];
        config.proxy.binary = write_script(
            temp.path(),
            "proxy",
            &stand_in(&config, proxy_port, options.hanging_one_shots),
        );

        let controller = Arc::new(LifecycleController::new(config.clone()).unwrap());
        controller.boot().await.unwrap();

        let shutdown = ShutdownCoordinator::new();
        let listener = Listener::bind(
            &config.bind_addr(),
            Dispatcher::new(controller),
            options.watchdog,
            shutdown.clone(),
        )
        .await
        .unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move { listener.run().await.unwrap() });

        Self {
            _temp: temp,
            _proxy_port_holder: holder,
            proxy_port,
            addr,
            config,
            shutdown,
            handle,
        }
    }

    /// Send a raw request and return the status code and body.
    pub async fn send(&self, request: &str) -> (u16, String) {
        let mut stream = TcpStream::connect(self.addr).await.unwrap();
        stream.write_all(request.as_bytes()).await.unwrap();

        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();

        let (head, body) = response.split_once("\r\n\r\n").unwrap();
        let status = head
            .lines()
            .next()
            .and_then(|line| line.split_whitespace().nth(1))
            .and_then(|code| code.parse().ok())
            .unwrap();
        (status, body.to_string())
    }

    /// Send a versioned command with options and an optional body.
    pub async fn command(
        &self,
        method: &str,
        path: &str,
        options: &[(&str, &str)],
        body: Option<&str>,
    ) -> (u16, String) {
        let mut request = format!("{method} {path} HTTP/1.1\r\nX-Rcd-Version: 1\r\n");
        for (name, value) in options {
            request.push_str(&format!("X-Rcd-Option-{name}: {value}\r\n"));
        }
        if let Some(body) = body {
            request.push_str(&format!("Content-Length: {}\r\n", body.len()));
        }
        request.push_str("\r\n");
        request.push_str(body.unwrap_or(""));
        self.send(&request).await
    }

    pub async fn reset(&self) -> (u16, String) {
        let port = self.proxy_port.to_string();
        self.command(
            "POST",
            "/reset",
            &[("Listening-Ports", port.as_str())],
            Some("http_port 3128\n"),
        )
        .await
    }

    pub async fn stop(&self) -> (u16, String) {
        self.command("GET", "/stop", &[], None).await
    }

    pub fn running_pid(&self) -> Option<i32> {
        std::fs::read_to_string(self.config.pid_file())
            .ok()
            .and_then(|content| content.trim().parse().ok())
    }
}

pub fn json(body: &str) -> Value {
    serde_json::from_str(body).unwrap()
}
