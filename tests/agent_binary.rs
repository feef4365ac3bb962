// tests/agent_binary.rs

//! Drives the real `shell-agent` binary over loopback.

use std::error::Error;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::process::{Child, Command};

use shell_agent::client::AgentClient;
use shell_agent::logging::LOG_ENV_VAR;
use shell_agent_test_utils::{init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

const AGENT_BIN: &str = env!("CARGO_BIN_EXE_shell-agent");

/// A port that was free a moment ago.
fn free_port() -> Result<u16, Box<dyn Error>> {
    let probe = std::net::TcpListener::bind("127.0.0.1:0")?;
    Ok(probe.local_addr()?.port())
}

fn agent_command(workdir: &Path) -> Command {
    let mut cmd = Command::new(AGENT_BIN);
    cmd.current_dir(workdir)
        .env_remove(LOG_ENV_VAR)
        .stdin(Stdio::null())
        .kill_on_drop(true);
    cmd
}

/// Start `shell-agent serve` and wait until it answers pings.
async fn start_agent(workdir: &Path, port: u16, log: &Path) -> Result<Child, Box<dyn Error>> {
    let child = agent_command(workdir)
        .arg("serve")
        .arg("--port")
        .arg(port.to_string())
        .arg("--log-file")
        .arg(log)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;

    let client = AgentClient::new(format!("127.0.0.1:{port}"));
    with_timeout(async {
        while !client.is_alive().await {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await;
    Ok(child)
}

#[tokio::test]
async fn agent_exit_terminates_the_process() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let log = dir.path().join("agent_debug.log");
    let port = free_port()?;
    let mut agent = start_agent(dir.path(), port, &log).await?;

    let client = AgentClient::new(format!("127.0.0.1:{port}"));
    assert_eq!(with_timeout(client.send_raw("AGENT_EXIT")).await?, vec!["BYE"]);

    let status = with_timeout(agent.wait()).await?;
    assert!(status.success(), "agent exited with {status:?}");

    assert!(TcpStream::connect(("127.0.0.1", port)).await.is_err());

    let contents = std::fs::read_to_string(&log)?;
    assert!(contents.contains("agent booting"), "log was:\n{contents}");
    assert!(contents.contains("listening"), "log was:\n{contents}");
    assert!(contents.contains("exiting on client request"), "log was:\n{contents}");
    Ok(())
}

#[cfg(unix)]
#[tokio::test]
async fn client_subcommands_talk_to_a_running_agent() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let log = dir.path().join("agent_debug.log");
    let port = free_port()?;
    let addr = format!("127.0.0.1:{port}");
    let mut agent = start_agent(dir.path(), port, &log).await?;

    let exec = with_timeout(
        agent_command(dir.path())
            .args(["exec", "--addr", &addr, "echo", "hi;", "echo", "oops", "1>&2;", "exit", "3"])
            .output(),
    )
    .await?;
    assert_eq!(String::from_utf8_lossy(&exec.stdout), "hi\n");
    assert!(String::from_utf8_lossy(&exec.stderr).contains("oops"));
    assert_eq!(exec.status.code(), Some(3));

    let ping = with_timeout(agent_command(dir.path()).args(["ping", "--addr", &addr]).output()).await?;
    assert!(ping.status.success());
    assert_eq!(String::from_utf8_lossy(&ping.stdout), "PONG\n");

    let stop = with_timeout(agent_command(dir.path()).args(["stop", "--addr", &addr]).output()).await?;
    assert!(stop.status.success());
    assert_eq!(String::from_utf8_lossy(&stop.stdout), "BYE\n");

    let status = with_timeout(agent.wait()).await?;
    assert!(status.success());

    let ping = with_timeout(agent_command(dir.path()).args(["ping", "--addr", &addr]).output()).await?;
    assert_eq!(ping.status.code(), Some(1));
    Ok(())
}
