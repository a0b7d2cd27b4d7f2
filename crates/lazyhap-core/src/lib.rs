//! Building blocks for talking to an HAProxy administrative socket: the
//! one-shot request client, the response parsers for `show stat` and
//! `show info`, and the static panel registry the dashboard polls.

pub mod client;
pub mod command;
pub mod format;
pub mod info;
pub mod panel;
pub mod stats;

pub use client::{AdminClient, TransportError, DEFAULT_SOCKET_PATH};
pub use command::{ServerCommand, ServerTarget, DEFAULT_WEIGHT};
pub use format::{format_byte_count, format_bytes, parse_leading_int};
pub use info::{parse_info, InfoEntry};
pub use panel::{ContentKind, Panel, PanelId, TableFormat, PANELS, REFRESH_INTERVAL};
pub use stats::{parse_stat_lines, parse_stats, RowParse, ServerStatus, SkipReason, StatsRow};
