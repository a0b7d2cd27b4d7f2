use clap::Parser;
use lazyhap_core::{DEFAULT_SOCKET_PATH, REFRESH_INTERVAL};
use std::{path::PathBuf, time::Duration};

pub const MESSAGE_TTL: Duration = Duration::from_secs(2);

#[derive(Parser, Debug)]
#[command(
    name = "lazyhap",
    version,
    about = "Terminal dashboard for the HAProxy admin socket"
)]
pub struct Cli {
    /// Path to the HAProxy administrative socket.
    #[arg(value_name = "SOCKET", default_value = DEFAULT_SOCKET_PATH)]
    pub socket: PathBuf,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub socket_path: PathBuf,
    pub refresh_interval: Duration,
    pub message_ttl: Duration,
}

impl Config {
    pub fn new(socket_path: impl Into<PathBuf>) -> Self {
        Self {
            socket_path: socket_path.into(),
            refresh_interval: REFRESH_INTERVAL,
            message_ttl: MESSAGE_TTL,
        }
    }
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        Self::new(cli.socket)
    }
}

pub fn load_config() -> Config {
    Cli::parse().into()
}
