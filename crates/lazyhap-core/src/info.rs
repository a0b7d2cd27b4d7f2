#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoEntry {
    pub key: String,
    pub value: String,
}

impl InfoEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// `show info desc` appends a description after another colon. Splits
    /// the value once more for display; values without a description come
    /// back with an empty second half.
    pub fn value_and_description(&self) -> (&str, &str) {
        match self.value.split_once(':') {
            Some((value, description)) => (value.trim(), description.trim()),
            None => (self.value.as_str(), ""),
        }
    }
}

/// Parses colon-delimited `key: value` lines in source order. Blank lines
/// and lines without a colon are ignored; duplicate keys are kept.
pub fn parse_info(text: &str) -> Vec<InfoEntry> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| line.split_once(':'))
        .map(|(key, value)| InfoEntry::new(key.trim(), value.trim()))
        .collect()
}
