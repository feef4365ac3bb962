// tests/config_loading.rs

use std::error::Error;
use std::fs;
use std::path::PathBuf;

use shell_agent::config::{ConfigFile, ConfigOverrides, load_and_validate, load_from_path, resolve_config};
use shell_agent::errors::AgentError;
use shell_agent::types::ExecMode;
use shell_agent_test_utils::builders::ConfigFileBuilder;

type TestResult = Result<(), Box<dyn Error>>;

fn write_config(contents: &str) -> Result<(tempfile::TempDir, PathBuf), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("shell-agent.toml");
    fs::write(&path, contents)?;
    Ok((dir, path))
}

#[test]
fn empty_file_gives_defaults() -> TestResult {
    let (_dir, path) = write_config("")?;
    let cfg = load_and_validate(&path)?;

    assert_eq!(cfg.server.host, "127.0.0.1");
    assert_eq!(cfg.server.port, 52999);
    assert_eq!(cfg.server.backlog, 50);
    assert_eq!(cfg.log.level, None);
    assert!(cfg.log.path.ends_with("agent_debug.log"));
    assert_eq!(cfg.exec.mode, ExecMode::Shell);
    assert_eq!(cfg.exec.shell, None);
    Ok(())
}

#[test]
fn full_file_is_read() -> TestResult {
    let (_dir, path) = write_config(
        r#"
[server]
host = "localhost"
port = 40123
backlog = 8

[log]
path = "/tmp/custom.log"
level = "debug"

[exec]
mode = "direct"
shell = "/bin/bash"
"#,
    )?;
    let cfg = load_and_validate(&path)?;

    assert_eq!(cfg.server.host, "localhost");
    assert_eq!(cfg.server.port, 40123);
    assert_eq!(cfg.server.backlog, 8);
    assert_eq!(cfg.log.path, PathBuf::from("/tmp/custom.log"));
    assert_eq!(cfg.log.level.as_deref(), Some("debug"));
    assert_eq!(cfg.exec.mode, ExecMode::Direct);
    assert_eq!(cfg.exec.effective_shell(), "/bin/bash");
    Ok(())
}

#[test]
fn unknown_fields_are_rejected() -> TestResult {
    let (_dir, path) = write_config("[server]\nprot = 1234\n")?;
    match load_from_path(&path) {
        Err(AgentError::Toml(_)) => Ok(()),
        other => panic!("expected a TOML error, got {other:?}"),
    }
}

#[test]
fn unknown_exec_mode_is_rejected() -> TestResult {
    let (_dir, path) = write_config("[exec]\nmode = \"bash\"\n")?;
    assert!(matches!(load_from_path(&path), Err(AgentError::Toml(_))));
    Ok(())
}

#[test]
fn missing_explicit_file_is_an_io_error() {
    let err = load_and_validate("/definitely/not/here/shell-agent.toml").unwrap_err();
    assert!(matches!(err, AgentError::Io(_)), "got {err:?}");
}

#[test]
fn non_loopback_ip_is_rejected() {
    let raw = ConfigFileBuilder::new().host("192.168.1.10").raw();
    let err = ConfigFile::try_from(raw).unwrap_err();
    match err {
        AgentError::Config(msg) => assert!(msg.contains("loopback"), "got {msg}"),
        other => panic!("expected Config error, got {other:?}"),
    }
}

#[test]
fn ipv6_loopback_is_accepted() {
    let cfg = ConfigFileBuilder::new().host("::1").build();
    assert_eq!(cfg.server.host, "::1");
}

#[test]
fn zero_backlog_is_rejected() {
    let raw = ConfigFileBuilder::new().backlog(0).raw();
    assert!(matches!(ConfigFile::try_from(raw), Err(AgentError::Config(_))));
}

#[test]
fn unknown_log_level_is_rejected() {
    let raw = ConfigFileBuilder::new().log_level("loud").raw();
    let err = ConfigFile::try_from(raw).unwrap_err();
    assert!(err.to_string().contains("loud"), "got {err}");
}

#[test]
fn blank_shell_override_is_rejected() {
    let raw = ConfigFileBuilder::new().shell("  ").raw();
    assert!(matches!(ConfigFile::try_from(raw), Err(AgentError::Config(_))));
}

#[test]
fn overrides_replace_file_values() -> TestResult {
    let cfg = ConfigFileBuilder::new().port(1111).log_path("/tmp/a.log").build();

    let cfg = cfg.with_overrides(ConfigOverrides {
        host: Some("localhost".to_string()),
        port: Some(2222),
        log_file: None,
    })?;

    assert_eq!(cfg.server.host, "localhost");
    assert_eq!(cfg.server.port, 2222);
    assert_eq!(cfg.log.path, PathBuf::from("/tmp/a.log"));
    Ok(())
}

#[test]
fn overrides_are_validated_too() {
    let cfg = ConfigFileBuilder::new().build();
    let result = cfg.with_overrides(ConfigOverrides {
        host: Some("10.0.0.1".to_string()),
        ..ConfigOverrides::default()
    });
    assert!(matches!(result, Err(AgentError::Config(_))));
}

#[test]
fn explicit_path_wins_in_resolution() -> TestResult {
    let (_dir, path) = write_config("[server]\nport = 4000\n")?;
    let cfg = resolve_config(Some(&path))?;
    assert_eq!(cfg.server.port, 4000);
    Ok(())
}

#[test]
fn exec_mode_parses_from_strings() {
    assert_eq!("shell".parse::<ExecMode>(), Ok(ExecMode::Shell));
    assert_eq!(" Direct ".parse::<ExecMode>(), Ok(ExecMode::Direct));
    assert!("bash".parse::<ExecMode>().is_err());
}
