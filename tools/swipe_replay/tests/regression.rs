use std::{path::PathBuf, process::Command};

fn repo_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .expect("missing tools dir")
        .parent()
        .expect("missing repo root")
        .to_path_buf()
}

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn replay(trace: &str, expect: &str, extra: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_swipe_replay"))
        .arg(fixture(trace))
        .arg("--config")
        .arg(repo_root().join("config/swipe.toml"))
        .arg("--expect")
        .arg(fixture(expect))
        .args(extra)
        .output()
        .expect("failed to run swipe_replay")
}

#[test]
fn fixtures_match_expected_statuses() {
    for (trace, expect) in [
        ("rightwards_swipe.csv", "rightwards_swipe.expect"),
        ("wrong_direction.csv", "wrong_direction.expect"),
        ("two_fingers.csv", "two_fingers.expect"),
    ] {
        let output = replay(trace, expect, &[]);
        assert!(
            output.status.success(),
            "{trace}: {}",
            String::from_utf8_lossy(&output.stderr)
        );
    }
}

#[test]
fn rejections_are_reported() {
    let output = replay("wrong_direction.csv", "wrong_direction.expect", &[]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("signal,16,reject,wrong_direction"), "{stdout}");

    let output = replay("two_fingers.csv", "two_fingers.expect", &[]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("signal,30,reject,multi_finger"), "{stdout}");
}

#[test]
fn direction_override_changes_outcome() {
    let output = replay(
        "wrong_direction.csv",
        "rightwards_swipe.expect",
        &["--direction", "horizontal"],
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
}

#[test]
fn mismatch_fails_with_both_sequences() {
    let output = replay("rightwards_swipe.csv", "wrong_direction.expect", &[]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("expected statuses: undecided,waiting_for_touch"));
    assert!(stderr.contains("actual statuses:   undecided,recognized,waiting_for_touch"));
}
