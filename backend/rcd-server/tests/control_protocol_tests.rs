//! Integration tests driving the control listener over TCP
mod common;

use crate::common::{DaemonOptions, RECONFIGURING, TestDaemon, json};

use std::time::{Duration, Instant};

use serde_json::json;
use serial_test::serial;

#[tokio::test]
#[serial]
async fn given_request_without_version_when_sent_then_command_fails() {
    // Given
    let daemon = TestDaemon::start().await;

    // When
    let (status, body) = daemon.send("GET /check HTTP/1.1\r\n\r\n").await;

    // Then
    assert_eq!(status, 555);
    assert!(body.to_lowercase().contains("x-rcd-version"), "{body}");
}

#[tokio::test]
#[serial]
async fn given_unknown_command_when_sent_then_command_fails() {
    let daemon = TestDaemon::start().await;

    let (status, _) = daemon.command("GET", "/explode", &[], None).await;

    assert_eq!(status, 555);
}

#[tokio::test]
#[serial]
async fn given_option_outside_vocabulary_when_sent_then_command_fails() {
    let daemon = TestDaemon::start().await;

    let (status, body) = daemon
        .command("GET", "/restart", &[("Worker-Count", "2")], None)
        .await;

    assert_eq!(status, 555);
    assert!(body.contains("worker-count"), "{body}");
}

#[tokio::test]
#[serial]
async fn given_stopped_proxy_when_checked_then_health_is_clean() {
    // Given
    let daemon = TestDaemon::start().await;

    // When
    let (status, body) = daemon.command("GET", "/check", &[], None).await;

    // Then
    assert_eq!(status, 200);
    let body = json(&body);
    assert_eq!(body["health"]["problems"], json!([]));
    assert!(body.get("answer").is_none());
}

#[tokio::test]
#[serial]
async fn given_clean_reset_when_checked_then_proxy_runs_with_clean_health() {
    // Given
    let daemon = TestDaemon::start().await;

    // When
    let (status, body) = daemon.reset().await;

    // Then
    assert_eq!(status, 200, "{body}");
    assert!(daemon.running_pid().is_some());
    assert_eq!(
        std::fs::read_to_string(daemon.config.proxy_config_file()).unwrap(),
        "http_port 3128\n"
    );

    let (status, body) = daemon.command("GET", "/check", &[], None).await;
    assert_eq!(status, 200);
    assert_eq!(json(&body)["health"]["problems"], json!([]));

    // Cleanup
    assert_eq!(daemon.stop().await.0, 200);
}

#[tokio::test]
#[serial]
async fn given_running_proxy_when_restarted_then_runs_under_new_pid() {
    // Given
    let daemon = TestDaemon::start().await;
    assert_eq!(daemon.reset().await.0, 200);
    let before = daemon.running_pid().unwrap();

    // When
    let (status, body) = daemon.command("GET", "/restart", &[], None).await;

    // Then
    assert_eq!(status, 200, "{body}");
    let after = daemon.running_pid().unwrap();
    assert_ne!(before, after);

    // Cleanup
    assert_eq!(daemon.stop().await.0, 200);
}

#[tokio::test]
#[serial]
async fn given_running_proxy_when_reconfigured_then_proxy_logged_reconfiguration() {
    // Given
    let daemon = TestDaemon::start().await;
    assert_eq!(daemon.reset().await.0, 200);

    // When
    let (status, body) = daemon.command("GET", "/reconfigure", &[], None).await;

    // Then
    assert_eq!(status, 200, "{body}");
    let main_log = std::fs::read_to_string(daemon.config.main_log()).unwrap();
    assert_eq!(main_log.matches(RECONFIGURING).count(), 1);

    // Cleanup
    assert_eq!(daemon.stop().await.0, 200);
}

#[tokio::test]
#[serial]
async fn given_running_proxy_when_stopped_gracefully_then_pid_file_is_gone() {
    // Given
    let daemon = TestDaemon::start().await;
    assert_eq!(daemon.reset().await.0, 200);

    // When
    let (status, body) = daemon
        .command("GET", "/stop", &[("Shutdown-Manner", "gracefully")], None)
        .await;

    // Then
    assert_eq!(status, 200, "{body}");
    assert_eq!(daemon.running_pid(), None);
}

#[tokio::test]
#[serial]
async fn given_stopped_proxy_when_reconfigured_then_command_fails() {
    let daemon = TestDaemon::start().await;

    let (status, body) = daemon.command("GET", "/reconfigure", &[], None).await;

    assert_eq!(status, 555);
    assert!(body.contains("not running"), "{body}");
}

#[tokio::test]
#[serial]
async fn given_stand_in_proxy_when_asking_environment_then_answers_its_banner() {
    // Given
    let daemon = TestDaemon::start().await;

    // When
    let (status, body) = daemon
        .command("GET", "/executionEnvironment", &[], None)
        .await;

    // Then
    assert_eq!(status, 200, "{body}");
    let answer = &json(&body)["answer"];
    assert_eq!(answer["protocolVersion"], json!("1"));
    assert_eq!(
        answer["proxyVersion"],
        json!("Squid Cache: Version 0.0-stand-in")
    );
}

#[tokio::test]
#[serial]
async fn given_proxy_never_ready_when_watchdog_fires_then_reset_fails_cancelled() {
    // Given
    let daemon = TestDaemon::start_with(DaemonOptions {
        watchdog: Duration::from_millis(300),
        hold_proxy_port: false,
        ..DaemonOptions::default()
    })
    .await;

    // When
    let (status, body) = daemon.reset().await;

    // Then
    assert_eq!(status, 555);
    assert!(body.contains("Cancelled"), "{body}");

    // Cleanup
    assert_eq!(daemon.stop().await.0, 200);
}

#[tokio::test]
#[serial]
async fn given_shutdown_requested_when_listener_runs_then_it_stops_and_leaves_proxy() {
    // Given
    let mut daemon = TestDaemon::start().await;
    assert_eq!(daemon.reset().await.0, 200);
    let pid = daemon.running_pid().unwrap();

    // When
    daemon.shutdown.shutdown();

    // Then
    tokio::time::timeout(Duration::from_secs(5), &mut daemon.handle)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(daemon.running_pid(), Some(pid));

    // Cleanup
    kill_process_group(pid);
}

fn kill_process_group(pid: i32) {
    let _ = std::process::Command::new("kill")
        .args(["-KILL", "--", &format!("-{pid}")])
        .status();
}

#[tokio::test]
#[serial]
async fn given_hanging_cache_initialization_when_watchdog_fires_then_reset_fails_and_releases_controller() {
    // Given
    let daemon = TestDaemon::start_with(DaemonOptions {
        watchdog: Duration::from_millis(300),
        hanging_one_shots: true,
        ..DaemonOptions::default()
    })
    .await;

    // When
    let started = Instant::now();
    let (status, body) = daemon.reset().await;

    // Then
    assert_eq!(status, 555);
    assert!(body.contains("Cancelled"), "{body}");
    assert!(started.elapsed() < Duration::from_secs(3));

    let (status, body) = daemon.stop().await;
    assert_eq!(status, 200, "{body}");
}

#[tokio::test]
#[serial]
async fn given_handler_ignoring_cancellation_when_watchdog_fires_then_it_is_aborted_with_failure() {
    // Given
    let daemon = TestDaemon::start_with(DaemonOptions {
        watchdog: Duration::from_millis(300),
        hanging_one_shots: true,
        ..DaemonOptions::default()
    })
    .await;

    // When
    let started = Instant::now();
    let (status, body) = daemon
        .command("GET", "/executionEnvironment", &[], None)
        .await;

    // Then
    assert_eq!(status, 555);
    assert!(body.contains("aborted"), "{body}");
    assert!(started.elapsed() < Duration::from_secs(3));

    let (status, body) = daemon.command("GET", "/check", &[], None).await;
    assert_eq!(status, 200, "{body}");
}
