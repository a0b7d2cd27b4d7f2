use crate::format::{format_byte_count, parse_leading_int};
use std::fmt;

/// Minimum width of a `show stat` CSV line. Shorter lines come from
/// truncated reads or a schema this client does not understand.
pub const MIN_STAT_FIELDS: usize = 80;

pub const FRONTEND_SENTINEL: &str = "FRONTEND";
pub const BACKEND_SENTINEL: &str = "BACKEND";

/// Positions of the columns we read from the stats CSV. The header line is
/// never consulted; a schema change only has to touch this table.
pub mod field {
    pub const PROXY_NAME: usize = 0;
    pub const SERVICE_NAME: usize = 1;
    pub const CURRENT_SESSIONS: usize = 4;
    pub const MAX_SESSIONS: usize = 5;
    pub const TOTAL_SESSIONS: usize = 7;
    pub const BYTES_IN: usize = 8;
    pub const BYTES_OUT: usize = 9;
    pub const ERRORS: usize = 13;
    pub const STATUS: usize = 17;
    pub const WEIGHT: usize = 18;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerStatus {
    Up,
    Down,
    Open,
    Other(String),
}

impl ServerStatus {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "UP" => Self::Up,
            "DOWN" => Self::Down,
            "OPEN" => Self::Open,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Up => "UP",
            Self::Down => "DOWN",
            Self::Open => "OPEN",
            Self::Other(raw) => raw,
        }
    }
}

impl fmt::Display for ServerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsRow {
    pub proxy_name: String,
    pub service_name: String,
    pub status: ServerStatus,
    pub current_sessions: i64,
    pub max_sessions: i64,
    pub total_sessions: i64,
    pub bytes_in: i64,
    pub bytes_out: i64,
    pub error_count: i64,
    pub weight: Option<u16>,
}

impl StatsRow {
    fn from_fields(fields: &[&str]) -> Self {
        let at = |idx: usize| fields.get(idx).copied().unwrap_or_default();
        let count = |idx: usize| parse_leading_int(at(idx));
        let weight = at(field::WEIGHT).trim();
        Self {
            proxy_name: at(field::PROXY_NAME).to_string(),
            service_name: at(field::SERVICE_NAME).to_string(),
            status: ServerStatus::parse(at(field::STATUS)),
            current_sessions: count(field::CURRENT_SESSIONS),
            max_sessions: count(field::MAX_SESSIONS),
            total_sessions: count(field::TOTAL_SESSIONS),
            bytes_in: count(field::BYTES_IN),
            bytes_out: count(field::BYTES_OUT),
            error_count: count(field::ERRORS),
            weight: if weight.is_empty() {
                None
            } else {
                u16::try_from(parse_leading_int(weight)).ok()
            },
        }
    }

    /// Aggregate rows summarise a whole proxy and cannot be targeted by
    /// server commands.
    pub fn is_aggregate(&self) -> bool {
        self.service_name == FRONTEND_SENTINEL || self.service_name == BACKEND_SENTINEL
    }

    pub fn is_server(&self) -> bool {
        !self.is_aggregate()
    }

    pub fn bytes_in_display(&self) -> String {
        format_byte_count(self.bytes_in)
    }

    pub fn bytes_out_display(&self) -> String {
        format_byte_count(self.bytes_out)
    }

    pub fn weight_display(&self) -> String {
        self.weight.map(|w| w.to_string()).unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    TooFewFields { found: usize, line: usize },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooFewFields { found, line } => write!(
                f,
                "line {line}: {found} fields, expected at least {MIN_STAT_FIELDS}"
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowParse {
    Ok(StatsRow),
    Skipped(SkipReason),
}

/// Parses every data line of a `show stat` response, keeping skipped lines
/// as tagged results. The first non-blank line is always treated as the
/// header, whatever it contains.
pub fn parse_stat_lines(text: &str) -> Vec<RowParse> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.is_empty())
        .skip(1)
        .map(|(idx, line)| {
            let fields: Vec<&str> = line.split(',').collect();
            if fields.len() < MIN_STAT_FIELDS {
                RowParse::Skipped(SkipReason::TooFewFields {
                    found: fields.len(),
                    line: idx + 1,
                })
            } else {
                RowParse::Ok(StatsRow::from_fields(&fields))
            }
        })
        .collect()
}

pub fn parse_stats(text: &str) -> Vec<StatsRow> {
    parse_stat_lines(text)
        .into_iter()
        .filter_map(|parsed| match parsed {
            RowParse::Ok(row) => Some(row),
            RowParse::Skipped(_) => None,
        })
        .collect()
}
