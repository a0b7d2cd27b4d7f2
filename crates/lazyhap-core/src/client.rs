use std::{io, path::PathBuf};
use thiserror::Error;
#[cfg(unix)]
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::UnixStream,
};
use tracing::debug;

pub const DEFAULT_SOCKET_PATH: &str = "/var/run/haproxy/admin.sock";

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("cannot connect to {}: {source}", .path.display())]
    Connect {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("write to admin socket failed: {0}")]
    Write(#[source] io::Error),
    #[error("read from admin socket failed: {0}")]
    Read(#[source] io::Error),
    #[error("unix domain sockets are not supported on this platform")]
    Unsupported,
}

/// Sends one command per connection to the administrative socket.
///
/// The server answers with any number of lines and closes the stream when it
/// is done, so a request is complete once EOF is observed. Nothing is kept
/// between calls.
#[derive(Clone, Debug)]
pub struct AdminClient {
    socket_path: PathBuf,
}

impl AdminClient {
    pub fn new(socket_path: impl Into<PathBuf>) -> Self {
        Self {
            socket_path: socket_path.into(),
        }
    }

    #[cfg(not(unix))]
    pub async fn send(&self, _command: &str) -> Result<String, TransportError> {
        Err(TransportError::Unsupported)
    }

    #[cfg(unix)]
    pub async fn send(&self, command: &str) -> Result<String, TransportError> {
        let mut stream = UnixStream::connect(&self.socket_path)
            .await
            .map_err(|source| TransportError::Connect {
                path: self.socket_path.clone(),
                source,
            })?;

        let mut request = String::with_capacity(command.len() + 1);
        request.push_str(command);
        request.push('\n');
        stream
            .write_all(request.as_bytes())
            .await
            .map_err(TransportError::Write)?;
        stream.flush().await.map_err(TransportError::Write)?;

        let mut raw = Vec::new();
        stream
            .read_to_end(&mut raw)
            .await
            .map_err(TransportError::Read)?;

        debug!(
            event = "admin_command",
            command = command,
            bytes = raw.len()
        );
        Ok(join_lines(&String::from_utf8_lossy(&raw)))
    }
}

fn join_lines(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 1);
    for line in text.lines() {
        out.push_str(line);
        out.push('\n');
    }
    out
}
