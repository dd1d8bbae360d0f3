use std::process::Command;

#[test]
fn init_creates_valid_toml() {
    let dir = tempfile::tempdir().unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_threadgate"))
        .arg("init")
        .current_dir(dir.path())
        .output()
        .unwrap();

    assert!(output.status.success(), "threadgate init failed: {}", String::from_utf8_lossy(&output.stderr));

    let config_path = dir.path().join(".threadgate.toml");
    assert!(config_path.exists(), ".threadgate.toml should exist");

    let content = std::fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("[reviewer]"));
    assert!(content.contains("[github]"));

    // Everything is commented out, so it must parse to the defaults
    let config = threadgate_core::ThreadgateConfig::from_toml(&content).unwrap();
    assert_eq!(config.reviewer.marker, threadgate_core::DEFAULT_MARKER);
    let _raw: toml::Table = toml::from_str(&content).unwrap();
}

#[test]
fn init_refuses_if_exists() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(".threadgate.toml"), "# existing").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_threadgate"))
        .arg("init")
        .current_dir(dir.path())
        .output()
        .unwrap();

    assert!(!output.status.success());
}

#[test]
fn init_ignores_broken_existing_config() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(".threadgate.toml"), "{{invalid").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_threadgate"))
        .arg("init")
        .current_dir(dir.path())
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("already exists"), "unexpected error: {stderr}");
}

#[test]
fn completions_ignore_broken_config() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(".threadgate.toml"), "{{invalid").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_threadgate"))
        .args(["completions", "bash"])
        .current_dir(dir.path())
        .output()
        .unwrap();

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(String::from_utf8_lossy(&output.stdout).contains("threadgate"));
}
