use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use std::process::{Child, Stdio};

fn bci() -> Command {
    let mut cmd = Command::cargo_bin("bci").unwrap();
    cmd.env_remove("BCI_CONFIG");
    cmd
}

/// A loopback address nothing is listening on right now.
fn free_udp_addr() -> String {
    let socket = std::net::UdpSocket::bind("127.0.0.1:0").unwrap();
    socket.local_addr().unwrap().to_string()
}

/// Background `bci send` targeting `addr`.
fn spawn_sender(addr: &str) -> Child {
    std::process::Command::new(assert_cmd::cargo::cargo_bin("bci"))
        .args(["send", "--target", addr, "--rate", "50", "--count", "500"])
        .env_remove("BCI_CONFIG")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .unwrap()
}

/// Background `bci send` posing as a two-class classifier, targeting `addr`.
fn spawn_classifier(addr: &str) -> Child {
    std::process::Command::new(assert_cmd::cargo::cargo_bin("bci"))
        .args([
            "send",
            "--name",
            "BCI_Classifier_Output",
            "--type",
            "Classifier",
            "--channels",
            "2",
            "--target",
            addr,
            "--rate",
            "50",
            "--count",
            "1000",
        ])
        .env_remove("BCI_CONFIG")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .unwrap()
}

/// Background `bci relay` reading classifier output on `listen` and
/// publishing the control stream to `publish`.
fn spawn_relay(listen: &str, publish: &str) -> Child {
    std::process::Command::new(assert_cmd::cargo::cargo_bin("bci"))
        .args(["relay", "--bind", listen, "--target", publish, "--wait", "5"])
        .env_remove("BCI_CONFIG")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .unwrap()
}

fn stop(mut children: Vec<Child>) {
    for child in children.iter_mut() {
        child.kill().ok();
        child.wait().ok();
    }
}

// =============================================================================
// GENERAL
// =============================================================================

#[test]
fn test_no_args_shows_help() {
    bci()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage:"));
}

#[test]
fn test_version_flag() {
    bci()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("bci"));
}

#[test]
fn test_help_lists_subcommands() {
    bci()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("ball"))
        .stdout(predicate::str::contains("coins"))
        .stdout(predicate::str::contains("relay"));
}

// =============================================================================
// STREAMS SUBCOMMAND
// =============================================================================

#[test]
fn test_streams_json_empty() {
    let output = bci()
        .args(["streams", "--bind", "127.0.0.1:0", "--wait", "0.1", "--json"])
        .assert()
        .success();

    let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed, serde_json::json!([]));
}

#[test]
fn test_streams_table_empty() {
    bci()
        .args(["streams", "--bind", "127.0.0.1:0", "--wait", "0.1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No streams found"));
}

// =============================================================================
// FEEDBACK VIEWS: STARTUP FAILURES
// =============================================================================

#[test]
fn test_ball_missing_stream_exits_with_hints() {
    bci()
        .args(["ball", "--bind", "127.0.0.1:0", "--wait", "0.1"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("'BCI_Control_Signal' not found"))
        .stderr(predicate::str::contains("Please check"));
}

#[test]
fn test_coins_missing_custom_stream() {
    bci()
        .args([
            "coins",
            "--bind",
            "127.0.0.1:0",
            "--wait",
            "0.1",
            "--stream",
            "MI_Output",
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("'MI_Output' not found"));
}

#[test]
fn test_invalid_alpha_is_input_error() {
    bci()
        .args(["ball", "--alpha", "1.5"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("alpha"));
}

#[test]
fn test_unparsable_config_is_input_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{{ not json").unwrap();

    bci()
        .arg("ball")
        .arg("--config")
        .arg(file.path())
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Cannot parse"));
}

#[test]
fn test_config_file_sets_stream_name() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"stream": {{"name": "From_Config", "bind_addr": "127.0.0.1:0", "wait_secs": 0.1}}}}"#
    )
    .unwrap();

    bci()
        .arg("coins")
        .arg("--config")
        .arg(file.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("'From_Config' not found"));
}

#[cfg(not(feature = "lsl-support"))]
#[test]
fn test_lsl_backend_unavailable() {
    bci()
        .args(["ball", "--backend", "lsl"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("lsl-support"));
}

#[test]
fn test_unknown_backend_rejected() {
    bci()
        .args(["ball", "--backend", "tcp"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("tcp"));
}

// =============================================================================
// PASSTHROUGH TOOLS
// =============================================================================

#[test]
fn test_send_fixed_count() {
    bci()
        .args([
            "send",
            "--target",
            "127.0.0.1:9",
            "--rate",
            "100",
            "--count",
            "3",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Now sending data"));
}

#[test]
fn test_send_rejects_zero_channels() {
    bci()
        .args(["send", "--channels", "0", "--count", "1"])
        .assert()
        .code(3);
}

#[test]
fn test_receive_prints_samples_from_sender() {
    let addr = free_udp_addr();
    let mut sender = spawn_sender(&addr);

    let result = bci()
        .args(["receive", "--bind", &addr, "--wait", "1", "--count", "2"])
        .timeout(std::time::Duration::from_secs(20))
        .assert();

    sender.kill().ok();
    sender.wait().ok();

    result
        .success()
        .stdout(predicate::str::contains("Connected to 'BCI_Control_Signal'"))
        .stdout(predicate::str::contains("Received data: ["));
}

#[test]
fn test_ball_runs_against_sender() {
    let addr = free_udp_addr();
    let mut sender = spawn_sender(&addr);

    let result = bci()
        .args([
            "ball",
            "--bind",
            &addr,
            "--wait",
            "1",
            "--max-frames",
            "30",
            "--json",
        ])
        .timeout(std::time::Duration::from_secs(20))
        .assert();

    sender.kill().ok();
    sender.wait().ok();

    let output = result.success();
    let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();
    let summary: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(summary["frames"], 30);
    assert_eq!(summary["exit"], "frame_limit");
    assert!(summary.get("score").is_none());
}

// =============================================================================
// RELAY CHAIN
// =============================================================================

#[test]
fn test_relay_publishes_right_minus_left() {
    let classifier_addr = free_udp_addr();
    let control_addr = free_udp_addr();
    let relay = spawn_relay(&classifier_addr, &control_addr);
    let sender = spawn_classifier(&classifier_addr);

    let result = bci()
        .args([
            "receive",
            "--bind",
            &control_addr,
            "--name",
            "BCI_Control_Signal",
            "--wait",
            "5",
            "--count",
            "4",
        ])
        .timeout(std::time::Duration::from_secs(30))
        .assert();

    stop(vec![sender, relay]);

    // classifier sends [i % 2, 1], so the control value alternates 1 and 0
    let output = result
        .success()
        .stdout(predicate::str::contains("Connected to 'BCI_Control_Signal'"));
    let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();
    let received: Vec<&str> = stdout
        .lines()
        .filter(|line| line.starts_with("Received data: "))
        .collect();
    assert_eq!(received.len(), 4);
    let pattern = predicate::str::is_match(r"^Received data: \[(0|1)\.000\] at time ").unwrap();
    assert!(received.iter().all(|line| pattern.eval(*line)), "{}", stdout);
}

#[test]
fn test_coins_runs_behind_relay() {
    let classifier_addr = free_udp_addr();
    let control_addr = free_udp_addr();
    let relay = spawn_relay(&classifier_addr, &control_addr);
    let sender = spawn_classifier(&classifier_addr);

    let result = bci()
        .args([
            "coins",
            "--bind",
            &control_addr,
            "--wait",
            "5",
            "--seed",
            "3",
            "--max-frames",
            "30",
            "--json",
        ])
        .timeout(std::time::Duration::from_secs(30))
        .assert();

    stop(vec![sender, relay]);

    let output = result.success();
    let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();
    let summary: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(summary["frames"], 30);
    assert_eq!(summary["exit"], "frame_limit");
    assert!(summary.get("score").is_some());
    assert!(summary["samples_consumed"].as_u64().unwrap() > 0);
}
