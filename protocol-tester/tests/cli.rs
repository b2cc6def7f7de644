use std::process::Command;

fn temp_path(label: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "protocol-cli-{label}-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ))
}

#[test]
fn cli_list_strategies_writes_output() {
    let exe = env!("CARGO_BIN_EXE_protocol-tester");
    let output_path = temp_path("list");
    let status = Command::new(exe)
        .args(["--list-strategies", "--output"])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());
    let content = std::fs::read_to_string(output_path).expect("read output");
    assert!(content.contains("Available strategies"));
    assert!(content.contains("reckless"));
}

#[test]
fn cli_runs_a_playthrough_with_json_report() {
    let exe = env!("CARGO_BIN_EXE_protocol-tester");
    let output_path = temp_path("run");
    let output = Command::new(exe)
        .args([
            "--strategies",
            "cautious",
            "--loadouts",
            "CICD_GHOST",
            "--seeds",
            "1",
            "--report",
            "json",
            "--output",
        ])
        .arg(&output_path)
        .output()
        .expect("run cli");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Birthday Protocol Automated Tester"));

    let content = std::fs::read_to_string(output_path).expect("read output");
    let records: serde_json::Value = serde_json::from_str(&content).expect("json report");
    let first = &records[0];
    assert_eq!(first["strategy"], "cautious");
    assert_eq!(first["outcome"], "GHOST");
    assert_eq!(first["finished"], true);
}

#[test]
fn cli_rejects_unknown_strategy() {
    let exe = env!("CARGO_BIN_EXE_protocol-tester");
    let output = Command::new(exe)
        .args(["--strategies", "berserk", "--report", "json"])
        .output()
        .expect("run cli");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("berserk"));
}

#[test]
fn cli_remote_briefing_without_key_falls_back() {
    let exe = env!("CARGO_BIN_EXE_protocol-tester");
    let output_path = temp_path("remote");
    let output = Command::new(exe)
        .env_remove("GEMINI_API_KEY")
        .env_remove("API_KEY")
        .args([
            "--strategies",
            "first-choice",
            "--loadouts",
            "SILENT_MERGE",
            "--briefing",
            "remote",
            "--report",
            "json",
            "--output",
        ])
        .arg(&output_path)
        .output()
        .expect("run cli");
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("using static briefings"));
    let content = std::fs::read_to_string(output_path).expect("read output");
    assert!(content.contains("\"provider\": \"static\""));
}
