use crate::stats::StatsRow;
use std::fmt;

/// Weight applied by the quick re-weight action.
pub const DEFAULT_WEIGHT: u16 = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerTarget {
    pub backend: String,
    pub server: String,
}

impl ServerTarget {
    /// Returns `None` for `FRONTEND`/`BACKEND` rows, which are not servers.
    pub fn from_row(row: &StatsRow) -> Option<Self> {
        if row.is_aggregate() {
            return None;
        }
        Some(Self {
            backend: row.proxy_name.clone(),
            server: row.service_name.clone(),
        })
    }
}

impl fmt::Display for ServerTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.backend, self.server)
    }
}

/// A state-changing admin command. Its `Display` form is the exact line
/// written to the socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerCommand {
    Disable(ServerTarget),
    Enable(ServerTarget),
    SetWeight { target: ServerTarget, weight: u16 },
}

impl fmt::Display for ServerCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disable(target) => write!(f, "disable server {target}"),
            Self::Enable(target) => write!(f, "enable server {target}"),
            Self::SetWeight { target, weight } => {
                write!(f, "set server {target} weight {weight}")
            }
        }
    }
}
