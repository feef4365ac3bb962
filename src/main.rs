// src/main.rs

use std::process::ExitCode;

use shell_agent::{RunExit, cli, run};

#[tokio::main]
async fn main() -> ExitCode {
    let args = cli::parse();
    match run(args).await {
        Ok(RunExit::Code(code)) => ExitCode::from(code),
        // AGENT_EXIT: in-flight connections and children are not waited for.
        Ok(RunExit::Immediate) => std::process::exit(0),
        Err(err) => {
            let message = format!("{err:#}");
            tracing::error!(error = %message, "shell-agent failed");
            eprintln!("shell-agent error: {err:?}");
            ExitCode::from(1)
        }
    }
}
