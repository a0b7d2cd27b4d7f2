use std::time::Duration;

pub const REFRESH_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PanelId {
    Stats,
    Info,
    Errors,
    Pools,
    Sessions,
    Certs,
    Threads,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TableFormat {
    /// `show stat` CSV.
    Stats,
    /// `key: value` lines.
    KeyValue,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContentKind {
    Tabular(TableFormat),
    FreeText,
}

impl ContentKind {
    pub fn is_tabular(self) -> bool {
        matches!(self, ContentKind::Tabular(_))
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Panel {
    pub id: PanelId,
    pub label: &'static str,
    pub fetch_command: &'static str,
    pub refresh_interval: Duration,
    pub content_kind: ContentKind,
}

impl Panel {
    pub fn has_live_fetch(&self) -> bool {
        !self.fetch_command.is_empty()
    }
}

/// Every dashboard panel in tab order.
pub const PANELS: [Panel; 7] = [
    Panel {
        id: PanelId::Stats,
        label: "Stats",
        fetch_command: "show stat",
        refresh_interval: REFRESH_INTERVAL,
        content_kind: ContentKind::Tabular(TableFormat::Stats),
    },
    Panel {
        id: PanelId::Info,
        label: "Info",
        fetch_command: "show info desc",
        refresh_interval: REFRESH_INTERVAL,
        content_kind: ContentKind::Tabular(TableFormat::KeyValue),
    },
    Panel {
        id: PanelId::Errors,
        label: "Errors",
        fetch_command: "show errors",
        refresh_interval: REFRESH_INTERVAL,
        content_kind: ContentKind::FreeText,
    },
    Panel {
        id: PanelId::Pools,
        label: "Memory Pools",
        fetch_command: "show pools",
        refresh_interval: REFRESH_INTERVAL,
        content_kind: ContentKind::FreeText,
    },
    Panel {
        id: PanelId::Sessions,
        label: "Sessions",
        fetch_command: "show sess",
        refresh_interval: REFRESH_INTERVAL,
        content_kind: ContentKind::FreeText,
    },
    Panel {
        id: PanelId::Certs,
        label: "Certificates",
        fetch_command: "show ssl crt-list",
        refresh_interval: REFRESH_INTERVAL,
        content_kind: ContentKind::FreeText,
    },
    Panel {
        id: PanelId::Threads,
        label: "Threads",
        fetch_command: "show threads",
        refresh_interval: REFRESH_INTERVAL,
        content_kind: ContentKind::FreeText,
    },
];

impl PanelId {
    pub const ALL: [PanelId; 7] = [
        PanelId::Stats,
        PanelId::Info,
        PanelId::Errors,
        PanelId::Pools,
        PanelId::Sessions,
        PanelId::Certs,
        PanelId::Threads,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn panel(self) -> &'static Panel {
        &PANELS[self.index()]
    }

    pub fn label(self) -> &'static str {
        self.panel().label
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}
