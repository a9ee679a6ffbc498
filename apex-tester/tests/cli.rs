use std::process::Command;

fn temp_path(label: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "apex-cli-{label}-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ))
}

#[test]
fn cli_list_policies_writes_output() {
    let exe = env!("CARGO_BIN_EXE_apex-tester");
    let output_path = temp_path("list");
    let status = Command::new(exe)
        .args(["--list-policies", "--output"])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());
    let content = std::fs::read_to_string(output_path).expect("read output");
    assert!(content.contains("Available policies"));
    assert!(content.contains("conservative"));
}

#[test]
fn cli_runs_one_career_with_json_report() {
    let exe = env!("CARGO_BIN_EXE_apex-tester");
    let output_path = temp_path("run");
    let output = Command::new(exe)
        .args([
            "--policy",
            "balanced",
            "--seeds",
            "7",
            "--seasons",
            "1",
            "--report",
            "json",
            "--output",
        ])
        .arg(&output_path)
        .output()
        .expect("run cli");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Apex Career Tester"));

    let content = std::fs::read_to_string(output_path).expect("read output");
    let reports: serde_json::Value = serde_json::from_str(&content).expect("json report");
    let reports = reports.as_array().expect("array of careers");
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0]["seed"], 7);
    assert_eq!(reports[0]["races"], 24);
    assert_eq!(reports[0]["passed"], true);
}

#[test]
fn cli_rejects_bad_seed() {
    let exe = env!("CARGO_BIN_EXE_apex-tester");
    let output = Command::new(exe)
        .args(["--seeds", "not-a-seed", "--policy", "balanced"])
        .output()
        .expect("run cli");
    assert!(!output.status.success());
}
