use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use shell_agent::exec::CommandRunner;
use shell_agent::protocol::Response;
use tokio::sync::{Notify, mpsc};

/// A fake runner that:
/// - records every command it was asked to run
/// - optionally waits on a `Notify` before answering
/// - replies with a fixed script of responses.
pub struct ScriptedRunner {
    script: Vec<Response>,
    seen: Arc<Mutex<Vec<String>>>,
    gate: Option<Arc<Notify>>,
}

impl ScriptedRunner {
    pub fn new(script: Vec<Response>) -> Self {
        Self {
            script,
            seen: Arc::new(Mutex::new(Vec::new())),
            gate: None,
        }
    }

    /// Hold every command until `gate` is notified.
    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Shared list of received commands.
    pub fn seen(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.seen)
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(
        &self,
        command: String,
        out: mpsc::Sender<Response>,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(async move {
            {
                let mut guard = self.seen.lock().unwrap();
                guard.push(command);
            }

            if let Some(gate) = &self.gate {
                gate.notified().await;
            }

            for response in self.script.iter().cloned() {
                if out.send(response).await.is_err() {
                    return;
                }
            }
        })
    }
}
