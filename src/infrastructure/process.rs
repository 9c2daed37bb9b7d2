use crate::domain::config::ConfigMap;
use crate::domain::failure::Fault;
use crate::domain::ports::{ApplicationInitializer, ManagedResource, ResourceBox};
use crate::error::ResourceError;
use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::{Child, Command};
use tracing::{info, warn};

/// Configuration key listing the applications to start, separated by `;`.
pub const APPLICATIONS_KEY: &str = "applications";

/// An external application started by the run.
pub struct ChildProcess {
    name: String,
    child: Child,
}

impl ChildProcess {
    pub fn new(name: impl Into<String>, child: Child) -> Self {
        Self {
            name: name.into(),
            child,
        }
    }

    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }
}

#[async_trait]
impl ManagedResource for ChildProcess {
    fn name(&self) -> String {
        self.name.clone()
    }

    async fn stop(&mut self) -> Result<(), ResourceError> {
        let stop_failed = |source| ResourceError::StopFailed {
            name: self.name.clone(),
            source,
        };

        // Already exited on its own.
        if self.child.try_wait().map_err(stop_failed)?.is_some() {
            return Ok(());
        }
        self.child.start_kill().map_err(stop_failed)?;
        self.child.wait().await.map_err(stop_failed)?;
        Ok(())
    }
}

/// Starts every command listed under [`APPLICATIONS_KEY`].
#[derive(Default, Clone, Copy)]
pub struct CommandLauncher;

impl CommandLauncher {
    pub fn new() -> Self {
        Self
    }

    fn spawn(command_line: &str) -> std::io::Result<ChildProcess> {
        let mut parts = command_line.split_whitespace();
        let program = parts.next().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command")
        })?;
        let child = Command::new(program)
            .args(parts)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .spawn()?;
        Ok(ChildProcess::new(command_line, child))
    }
}

#[async_trait]
impl ApplicationInitializer for CommandLauncher {
    async fn start(&self, config: &ConfigMap) -> Result<Vec<ResourceBox>, Fault> {
        let Some(commands) = config.find(APPLICATIONS_KEY) else {
            return Ok(Vec::new());
        };
        let commands = commands.to_string();

        let mut started: Vec<ResourceBox> = Vec::new();
        for command_line in commands.split(';').map(str::trim).filter(|c| !c.is_empty()) {
            match Self::spawn(command_line) {
                Ok(process) => {
                    info!(application = %command_line, pid = ?process.id(), "application started");
                    started.push(Box::new(process));
                }
                Err(e) => {
                    for mut resource in started {
                        if let Err(stop_err) = resource.stop().await {
                            warn!(resource = %resource.name(), "cleanup failed: {}", stop_err);
                        }
                    }
                    return Err(Fault::system(format!(
                        "cannot start application '{command_line}': {e}"
                    )));
                }
            }
        }
        Ok(started)
    }
}
