//! Where the record stream comes from.

use crate::CliError;
use std::io::Read;
use std::process::{Command, Stdio};

pub(crate) const DEFAULT_RESOURCES: &str =
    "switches,servers,connections,externals,externalattachments";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Source {
    Stdin,
    File(String),
    Live(LiveSource),
}

impl Source {
    pub(crate) fn read(&self) -> Result<String, CliError> {
        match self {
            Source::Stdin => {
                let mut buf = String::new();
                std::io::stdin().read_to_string(&mut buf)?;
                Ok(buf)
            }
            Source::File(path) => Ok(std::fs::read_to_string(path)?),
            Source::Live(live) => live.read(),
        }
    }
}

/// `kubectl get <resources> -o yaml` against the current (or given) kubeconfig.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LiveSource {
    pub(crate) resources: String,
    pub(crate) kubeconfig: Option<String>,
}

impl Default for LiveSource {
    fn default() -> Self {
        Self {
            resources: DEFAULT_RESOURCES.to_string(),
            kubeconfig: None,
        }
    }
}

fn kubectl_program() -> String {
    std::env::var("FABDIAG_KUBECTL")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| "kubectl".to_string())
}

impl LiveSource {
    fn command(&self) -> Command {
        let mut cmd = Command::new(kubectl_program());
        cmd.arg("get").arg(&self.resources).args(["-o", "yaml"]);
        if let Some(path) = &self.kubeconfig {
            cmd.arg("--kubeconfig").arg(path);
        }
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }

    fn read(&self) -> Result<String, CliError> {
        let mut cmd = self.command();
        tracing::debug!(?cmd, "reading records from cluster");
        let output = cmd.output().map_err(|err| {
            CliError::Live(format!("failed to run {}: {err}", kubectl_program()))
        })?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CliError::Live(format!(
                "{} exited with {}: {}",
                kubectl_program(),
                output.status,
                stderr.trim()
            )));
        }
        String::from_utf8(output.stdout)
            .map_err(|_| CliError::Live("kubectl output is not valid UTF-8".to_string()))
    }
}
