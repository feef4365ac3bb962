// crates/test-utils/src/lib.rs

//! Shared helpers for the `shell-agent` integration tests.

pub mod builders;
pub mod fake_acceptor;
pub mod fake_runner;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Once};
use std::time::Duration;

use shell_agent::config::{ExecConfig, ServerConfig};
use shell_agent::exec::{CommandRunner, ShellRunner};
use shell_agent::logging::LOG_ENV_VAR;
use shell_agent::server::{AgentServer, ServeOutcome, ShutdownTrigger};
use tokio::task::JoinHandle;
use tracing_subscriber::{EnvFilter, fmt};

static INIT: Once = Once::new();

/// Upper bound for any single awaited step in a test.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Install a test-writer subscriber once per test binary.
///
/// Output shows up only for failing tests (or with `--nocapture`). The
/// filter comes from `SHELL_AGENT_LOG`, e.g. `SHELL_AGENT_LOG=debug`.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
            .unwrap_or_else(|_| EnvFilter::new("shell_agent=info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .init();
    });
}

/// Await `f`, panicking if it takes longer than [`TEST_TIMEOUT`].
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: Future<Output = T>,
{
    match tokio::time::timeout(TEST_TIMEOUT, f).await {
        Ok(value) => value,
        Err(_) => panic!("test step timed out after {TEST_TIMEOUT:?}"),
    }
}

/// Server config on an ephemeral loopback port.
pub fn ephemeral_server_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        ..ServerConfig::default()
    }
}

/// An agent serving in a background task.
pub struct TestServer {
    pub addr: SocketAddr,
    pub trigger: ShutdownTrigger,
    pub handle: JoinHandle<ServeOutcome>,
}

impl TestServer {
    pub fn addr_string(&self) -> String {
        self.addr.to_string()
    }
}

/// Bind on an ephemeral port and start serving with `runner`.
pub async fn spawn_server(runner: Arc<dyn CommandRunner>) -> anyhow::Result<TestServer> {
    let server = AgentServer::bind(&ephemeral_server_config(), runner).await?;
    let addr = server.local_addr()?;
    let trigger = server.shutdown_trigger();
    let handle = tokio::spawn(server.serve());
    Ok(TestServer {
        addr,
        trigger,
        handle,
    })
}

/// Start a server that runs commands for real.
pub async fn spawn_shell_server(exec: ExecConfig) -> anyhow::Result<TestServer> {
    spawn_server(Arc::new(ShellRunner::new(exec))).await
}
