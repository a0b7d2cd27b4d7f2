use std::io::{self, Write};
use std::process::{Command, Stdio};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("clipboard is not supported on this platform")]
    Unsupported,
    #[error("cannot run {program}: {source}")]
    Spawn {
        program: &'static str,
        #[source]
        source: io::Error,
    },
    #[error("{program} exited with {status}")]
    Failed {
        program: &'static str,
        status: std::process::ExitStatus,
    },
    #[error("clipboard task did not finish: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Blocking copy. The runtime calls it from `spawn_blocking`.
pub trait ClipboardSink: Send + Sync {
    fn copy(&self, text: &str) -> Result<(), ClipboardError>;
}

/// Pipes text into the platform clipboard tool.
#[derive(Debug, Default)]
pub struct SystemClipboard;

impl SystemClipboard {
    fn program() -> Option<(&'static str, &'static [&'static str])> {
        if cfg!(target_os = "macos") {
            Some(("pbcopy", &[]))
        } else if cfg!(target_os = "linux") {
            Some(("xclip", &["-selection", "clipboard"]))
        } else {
            None
        }
    }
}

impl ClipboardSink for SystemClipboard {
    fn copy(&self, text: &str) -> Result<(), ClipboardError> {
        let (program, args) = Self::program().ok_or(ClipboardError::Unsupported)?;
        let spawn_err = |source| ClipboardError::Spawn { program, source };
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(spawn_err)?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(text.as_bytes()).map_err(spawn_err)?;
        }
        let status = child.wait().map_err(spawn_err)?;
        if status.success() {
            Ok(())
        } else {
            Err(ClipboardError::Failed { program, status })
        }
    }
}
