use crate::clipboard::ClipboardError;
use crate::config::Config;
use chrono::{DateTime, Local};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use lazyhap_core::{
    parse_info, parse_stat_lines, ContentKind, InfoEntry, PanelId, RowParse, ServerCommand,
    ServerTarget, StatsRow, TableFormat, TransportError, DEFAULT_WEIGHT,
};
use std::time::Duration;
use tracing::{debug, info, warn};

pub const HEADER_HEIGHT: u16 = 4;
pub const FOOTER_HEIGHT: u16 = 2;
pub const COPIED_MESSAGE: &str = "✓ Copied to clipboard!";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchOrigin {
    /// Part of the panel's self-renewing timer chain.
    Poll,
    /// Out-of-band stats fetch after a tab switch or a server command.
    Refresh,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Lifecycle {
    #[default]
    Idle,
    Fetching,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PanelRows {
    #[default]
    None,
    Stats(Vec<StatsRow>),
    Info(Vec<InfoEntry>),
}

impl PanelRows {
    pub fn len(&self) -> usize {
        match self {
            PanelRows::None => 0,
            PanelRows::Stats(rows) => rows.len(),
            PanelRows::Info(rows) => rows.len(),
        }
    }
}

#[derive(Debug)]
pub enum PanelError {
    Transport(TransportError),
    Clipboard(ClipboardError),
}

impl std::fmt::Display for PanelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PanelError::Transport(err) => write!(f, "{err}"),
            PanelError::Clipboard(err) => write!(f, "clipboard: {err}"),
        }
    }
}

#[derive(Debug, Default)]
pub struct PanelState {
    pub raw_text: String,
    pub rows: PanelRows,
    pub last_fetched_at: Option<DateTime<Local>>,
    pub last_error: Option<PanelError>,
    pub lifecycle: Lifecycle,
    pub selected: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn content_height(self) -> u16 {
        self.height.saturating_sub(HEADER_HEIGHT + FOOTER_HEIGHT)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Quit,
    NextTab,
    PrevTab,
    Down,
    Up,
    Top,
    Bottom,
    PageDown,
    PageUp,
    DisableServer,
    EnableServer,
    SetWeight,
    Yank,
}

#[derive(Debug)]
pub enum Event {
    WindowResized {
        width: u16,
        height: u16,
    },
    FetchCompleted {
        panel: PanelId,
        origin: FetchOrigin,
        result: Result<String, TransportError>,
    },
    CommandCompleted {
        command: ServerCommand,
        result: Result<String, TransportError>,
    },
    KeyPressed {
        action: Action,
    },
    TimerFired {
        panel: PanelId,
    },
    MessageExpired {
        generation: u64,
    },
    ClipboardCompleted {
        result: Result<(), ClipboardError>,
    },
}

/// Work the runtime performs on behalf of the session. Completions come
/// back as [`Event`]s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Fetch { panel: PanelId, origin: FetchOrigin },
    ScheduleFetch { panel: PanelId, after: Duration },
    Dispatch(ServerCommand),
    CopyToClipboard(String),
    ExpireMessage { generation: u64, after: Duration },
    Quit,
}

/// All dashboard state. Owned by the event loop; background tasks only
/// ever see the immutable values carried by effects and events.
#[derive(Debug)]
pub struct UiSession {
    pub active_tab: PanelId,
    panels: Vec<PanelState>,
    pub transient_message: Option<String>,
    message_generation: u64,
    pub fatal_error: Option<String>,
    pub viewport: Viewport,
    pub scroll: u16,
    refresh_interval: Duration,
    message_ttl: Duration,
    should_quit: bool,
}

impl UiSession {
    pub fn new(config: &Config) -> Self {
        Self {
            active_tab: PanelId::Stats,
            panels: PanelId::ALL.iter().map(|_| PanelState::default()).collect(),
            transient_message: None,
            message_generation: 0,
            fatal_error: None,
            viewport: Viewport::default(),
            scroll: 0,
            refresh_interval: config.refresh_interval,
            message_ttl: config.message_ttl,
            should_quit: false,
        }
    }

    /// Kicks off one poll per panel at once.
    pub fn start(&mut self) -> Vec<Effect> {
        PanelId::ALL
            .iter()
            .filter(|id| id.panel().has_live_fetch())
            .filter_map(|&id| self.begin_poll(id))
            .collect()
    }

    pub fn handle(&mut self, event: Event) -> Vec<Effect> {
        match event {
            Event::WindowResized { width, height } => self.on_resize(width, height),
            Event::FetchCompleted {
                panel,
                origin,
                result,
            } => self.on_fetch_completed(panel, origin, result),
            Event::CommandCompleted { command, result } => {
                self.on_command_completed(command, result)
            }
            Event::KeyPressed { action } => self.on_action(action),
            Event::TimerFired { panel } => self.on_timer(panel),
            Event::MessageExpired { generation } => self.on_message_expired(generation),
            Event::ClipboardCompleted { result } => self.on_clipboard_completed(result),
        }
    }

    pub fn panel(&self, id: PanelId) -> &PanelState {
        &self.panels[id.index()]
    }

    fn panel_mut(&mut self, id: PanelId) -> &mut PanelState {
        &mut self.panels[id.index()]
    }

    pub fn active_panel(&self) -> &PanelState {
        self.panel(self.active_tab)
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// The highlighted stats row. Only defined while the Stats tab is shown.
    pub fn selection(&self) -> Option<&StatsRow> {
        if self.active_tab != PanelId::Stats {
            return None;
        }
        let state = self.panel(PanelId::Stats);
        match &state.rows {
            PanelRows::Stats(rows) => rows.get(state.selected),
            _ => None,
        }
    }

    pub fn selected_info_entry(&self) -> Option<&InfoEntry> {
        if self.active_tab != PanelId::Info {
            return None;
        }
        let state = self.panel(PanelId::Info);
        match &state.rows {
            PanelRows::Info(rows) => rows.get(state.selected),
            _ => None,
        }
    }

    fn begin_poll(&mut self, panel: PanelId) -> Option<Effect> {
        let state = self.panel_mut(panel);
        if state.lifecycle == Lifecycle::Fetching {
            return None;
        }
        state.lifecycle = Lifecycle::Fetching;
        Some(Effect::Fetch {
            panel,
            origin: FetchOrigin::Poll,
        })
    }

    /// Out-of-band stats fetch. Runs alongside any poll or earlier refresh
    /// that is still pending.
    fn stats_refresh() -> Effect {
        Effect::Fetch {
            panel: PanelId::Stats,
            origin: FetchOrigin::Refresh,
        }
    }

    fn on_resize(&mut self, width: u16, height: u16) -> Vec<Effect> {
        self.viewport = Viewport { width, height };
        Vec::new()
    }

    fn on_timer(&mut self, panel: PanelId) -> Vec<Effect> {
        self.begin_poll(panel).into_iter().collect()
    }

    fn on_fetch_completed(
        &mut self,
        panel: PanelId,
        origin: FetchOrigin,
        result: Result<String, TransportError>,
    ) -> Vec<Effect> {
        let mut effects = Vec::new();
        if origin == FetchOrigin::Poll {
            self.panel_mut(panel).lifecycle = Lifecycle::Idle;
            effects.push(Effect::ScheduleFetch {
                panel,
                after: self.refresh_interval,
            });
        }

        match result {
            Ok(text) => self.apply_fetch_success(panel, text),
            Err(err) => self.apply_fetch_failure(panel, err),
        }
        effects
    }

    fn apply_fetch_success(&mut self, panel: PanelId, text: String) {
        let kind = panel.panel().content_kind;
        let rows = match kind {
            ContentKind::Tabular(TableFormat::Stats) => {
                let mut rows = Vec::new();
                let mut skipped = 0usize;
                for parsed in parse_stat_lines(&text) {
                    match parsed {
                        RowParse::Ok(row) => rows.push(row),
                        RowParse::Skipped(reason) => {
                            skipped += 1;
                            debug!(event = "stat_row_skipped", reason = %reason);
                        }
                    }
                }
                if skipped > 0 {
                    debug!(event = "stat_rows_skipped", skipped, kept = rows.len());
                }
                PanelRows::Stats(rows)
            }
            other => derive_rows(other, &text),
        };

        let state = self.panel_mut(panel);
        state.raw_text = text;
        state.rows = rows;
        state.last_fetched_at = Some(Local::now());
        state.last_error = None;
        clamp_selection(state);
    }

    fn apply_fetch_failure(&mut self, panel: PanelId, err: TransportError) {
        let bootstrap_failed =
            panel == PanelId::Stats && self.panel(PanelId::Stats).last_fetched_at.is_none();
        if bootstrap_failed && self.fatal_error.is_none() {
            warn!(event = "stats_bootstrap_failed", error = %err);
            self.fatal_error = Some(err.to_string());
            return;
        }
        warn!(event = "fetch_failed", panel = panel.label(), error = %err);
        self.panel_mut(panel).last_error = Some(PanelError::Transport(err));
    }

    fn on_command_completed(
        &mut self,
        command: ServerCommand,
        result: Result<String, TransportError>,
    ) -> Vec<Effect> {
        // The reply text is not inspected; the refreshed stats show the outcome.
        match result {
            Ok(_) => info!(event = "server_command_sent", command = %command),
            Err(err) => warn!(event = "server_command_failed", command = %command, error = %err),
        }
        vec![Self::stats_refresh()]
    }

    fn on_action(&mut self, action: Action) -> Vec<Effect> {
        if action == Action::Quit {
            self.should_quit = true;
            return vec![Effect::Quit];
        }
        if self.fatal_error.is_some() {
            return Vec::new();
        }
        match action {
            Action::Quit => Vec::new(),
            Action::NextTab => self.switch_tab(self.active_tab.next()),
            Action::PrevTab => self.switch_tab(self.active_tab.prev()),
            Action::Down => self.move_cursor(1),
            Action::Up => self.move_cursor(-1),
            Action::PageDown => {
                self.move_cursor(i64::from(self.viewport.content_height().max(1)))
            }
            Action::PageUp => {
                self.move_cursor(-i64::from(self.viewport.content_height().max(1)))
            }
            Action::Top => self.move_cursor(i64::MIN / 2),
            Action::Bottom => self.move_cursor(i64::MAX / 2),
            Action::DisableServer => self.dispatch(ServerCommand::Disable),
            Action::EnableServer => self.dispatch(ServerCommand::Enable),
            Action::SetWeight => self.dispatch(|target| ServerCommand::SetWeight {
                target,
                weight: DEFAULT_WEIGHT,
            }),
            Action::Yank => self
                .selected_info_entry()
                .map(|entry| {
                    let (value, _) = entry.value_and_description();
                    vec![Effect::CopyToClipboard(value.to_string())]
                })
                .unwrap_or_default(),
        }
    }

    fn switch_tab(&mut self, next: PanelId) -> Vec<Effect> {
        let previous = self.active_tab;
        self.active_tab = next;
        self.scroll = 0;

        for id in PanelId::ALL {
            let kind = id.panel().content_kind;
            if !kind.is_tabular() {
                continue;
            }
            let state = self.panel_mut(id);
            state.rows = derive_rows(kind, &state.raw_text);
            clamp_selection(state);
        }

        if next == PanelId::Stats && previous != PanelId::Stats {
            return vec![Self::stats_refresh()];
        }
        Vec::new()
    }

    fn move_cursor(&mut self, delta: i64) -> Vec<Effect> {
        if self.active_tab.panel().content_kind.is_tabular() {
            let state = self.panel_mut(self.active_tab);
            let len = state.rows.len();
            state.selected = step(state.selected, delta, len);
        } else {
            let lines = self.active_panel().raw_text.lines().count();
            self.scroll = step(usize::from(self.scroll), delta, lines)
                .try_into()
                .unwrap_or(u16::MAX);
        }
        Vec::new()
    }

    fn dispatch(&self, build: impl FnOnce(ServerTarget) -> ServerCommand) -> Vec<Effect> {
        self.selection()
            .and_then(ServerTarget::from_row)
            .map(|target| vec![Effect::Dispatch(build(target))])
            .unwrap_or_default()
    }

    fn on_clipboard_completed(&mut self, result: Result<(), ClipboardError>) -> Vec<Effect> {
        match result {
            Ok(()) => {
                self.message_generation += 1;
                self.transient_message = Some(COPIED_MESSAGE.to_string());
                vec![Effect::ExpireMessage {
                    generation: self.message_generation,
                    after: self.message_ttl,
                }]
            }
            Err(err) => {
                warn!(event = "clipboard_failed", error = %err);
                self.panel_mut(PanelId::Info).last_error = Some(PanelError::Clipboard(err));
                Vec::new()
            }
        }
    }

    fn on_message_expired(&mut self, generation: u64) -> Vec<Effect> {
        if generation == self.message_generation {
            self.transient_message = None;
        }
        Vec::new()
    }
}

fn derive_rows(kind: ContentKind, raw: &str) -> PanelRows {
    match kind {
        ContentKind::Tabular(TableFormat::Stats) => PanelRows::Stats(
            parse_stat_lines(raw)
                .into_iter()
                .filter_map(|parsed| match parsed {
                    RowParse::Ok(row) => Some(row),
                    RowParse::Skipped(_) => None,
                })
                .collect(),
        ),
        ContentKind::Tabular(TableFormat::KeyValue) => PanelRows::Info(parse_info(raw)),
        ContentKind::FreeText => PanelRows::None,
    }
}

fn clamp_selection(state: &mut PanelState) {
    let len = state.rows.len();
    if state.selected >= len {
        state.selected = len.saturating_sub(1);
    }
}

fn step(current: usize, delta: i64, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let max = (len - 1) as i64;
    (current as i64).saturating_add(delta).clamp(0, max) as usize
}

pub fn action_for_key(key: KeyEvent) -> Option<Action> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(Action::Quit),
            _ => None,
        };
    }
    let action = match key.code {
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Tab | KeyCode::Right | KeyCode::Char('l') => Action::NextTab,
        KeyCode::BackTab | KeyCode::Left | KeyCode::Char('h') => Action::PrevTab,
        KeyCode::Down | KeyCode::Char('j') => Action::Down,
        KeyCode::Up | KeyCode::Char('k') => Action::Up,
        KeyCode::Home | KeyCode::Char('g') => Action::Top,
        KeyCode::End | KeyCode::Char('G') => Action::Bottom,
        KeyCode::PageDown => Action::PageDown,
        KeyCode::PageUp => Action::PageUp,
        KeyCode::Char('d') | KeyCode::Char('D') => Action::DisableServer,
        KeyCode::Char('e') => Action::EnableServer,
        KeyCode::Char('w') => Action::SetWeight,
        KeyCode::Char('y') => Action::Yank,
        _ => return None,
    };
    Some(action)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    fn test_config() -> Config {
        Config::new("/tmp/lazyhap-test.sock")
    }

    fn stat_line(proxy: &str, service: &str, status: &str) -> String {
        let mut fields = vec!["0".to_string(); 80];
        fields[0] = proxy.to_string();
        fields[1] = service.to_string();
        fields[17] = status.to_string();
        fields[18] = "1".to_string();
        fields.join(",")
    }

    fn stats_text() -> String {
        format!(
            "# pxname,svname\n{}\n{}\n{}\n",
            stat_line("web", "FRONTEND", "OPEN"),
            stat_line("bk1", "srv2", "UP"),
            stat_line("bk1", "BACKEND", "UP"),
        )
    }

    fn refused() -> TransportError {
        TransportError::Connect {
            path: "/tmp/lazyhap-test.sock".into(),
            source: io::Error::from(io::ErrorKind::ConnectionRefused),
        }
    }

    fn completed(panel: PanelId, origin: FetchOrigin, text: &str) -> Event {
        Event::FetchCompleted {
            panel,
            origin,
            result: Ok(text.to_string()),
        }
    }

    fn key(action: Action) -> Event {
        Event::KeyPressed { action }
    }

    fn started() -> UiSession {
        let mut app = UiSession::new(&test_config());
        app.start();
        app
    }

    fn with_stats() -> UiSession {
        let mut app = started();
        app.handle(completed(PanelId::Stats, FetchOrigin::Poll, &stats_text()));
        app
    }

    #[test]
    fn startup_polls_every_panel_at_once() {
        let mut app = UiSession::new(&test_config());
        let effects = app.start();
        assert_eq!(effects.len(), PanelId::ALL.len());
        for id in PanelId::ALL {
            assert!(effects.contains(&Effect::Fetch {
                panel: id,
                origin: FetchOrigin::Poll
            }));
            assert_eq!(app.panel(id).lifecycle, Lifecycle::Fetching);
        }
    }

    #[test]
    fn poll_success_stores_rows_and_reschedules() {
        let mut app = started();
        let effects = app.handle(completed(PanelId::Stats, FetchOrigin::Poll, &stats_text()));
        assert_eq!(
            effects,
            vec![Effect::ScheduleFetch {
                panel: PanelId::Stats,
                after: Duration::from_secs(5)
            }]
        );
        let state = app.panel(PanelId::Stats);
        assert_eq!(state.rows.len(), 3);
        assert!(state.last_fetched_at.is_some());
        assert!(state.last_error.is_none());
        assert_eq!(state.lifecycle, Lifecycle::Idle);
    }

    #[test]
    fn timer_starts_exactly_one_poll() {
        let mut app = with_stats();
        let effects = app.handle(Event::TimerFired {
            panel: PanelId::Stats,
        });
        assert_eq!(
            effects,
            vec![Effect::Fetch {
                panel: PanelId::Stats,
                origin: FetchOrigin::Poll
            }]
        );
        let again = app.handle(Event::TimerFired {
            panel: PanelId::Stats,
        });
        assert!(again.is_empty());
    }

    #[test]
    fn first_stats_failure_is_fatal() {
        let mut app = started();
        let effects = app.handle(Event::FetchCompleted {
            panel: PanelId::Stats,
            origin: FetchOrigin::Poll,
            result: Err(refused()),
        });
        assert!(app.fatal_error.is_some());
        assert_eq!(effects.len(), 1, "polling continues after a failure");
    }

    #[test]
    fn stats_failure_after_success_is_soft() {
        let mut app = with_stats();
        app.handle(Event::FetchCompleted {
            panel: PanelId::Stats,
            origin: FetchOrigin::Poll,
            result: Err(refused()),
        });
        assert!(app.fatal_error.is_none());
        let state = app.panel(PanelId::Stats);
        assert!(matches!(state.last_error, Some(PanelError::Transport(_))));
        assert_eq!(state.rows.len(), 3);
    }

    #[test]
    fn non_stats_failures_never_go_fatal() {
        let mut app = started();
        let effects = app.handle(Event::FetchCompleted {
            panel: PanelId::Errors,
            origin: FetchOrigin::Poll,
            result: Err(refused()),
        });
        assert!(app.fatal_error.is_none());
        assert!(app.panel(PanelId::Errors).last_error.is_some());
        assert_eq!(
            effects,
            vec![Effect::ScheduleFetch {
                panel: PanelId::Errors,
                after: Duration::from_secs(5)
            }]
        );
    }

    #[test]
    fn success_clears_previous_error() {
        let mut app = started();
        app.handle(Event::FetchCompleted {
            panel: PanelId::Pools,
            origin: FetchOrigin::Poll,
            result: Err(refused()),
        });
        app.handle(Event::TimerFired {
            panel: PanelId::Pools,
        });
        app.handle(completed(PanelId::Pools, FetchOrigin::Poll, "pool list\n"));
        let state = app.panel(PanelId::Pools);
        assert!(state.last_error.is_none());
        assert_eq!(state.raw_text, "pool list\n");
        assert_eq!(state.rows, PanelRows::None);
    }

    #[test]
    fn returning_to_stats_refreshes_but_keeps_rows() {
        let mut app = with_stats();
        assert!(app.handle(key(Action::NextTab)).is_empty());
        assert_eq!(app.active_tab, PanelId::Info);

        let effects = app.handle(key(Action::PrevTab));
        assert_eq!(app.active_tab, PanelId::Stats);
        assert_eq!(
            effects,
            vec![Effect::Fetch {
                panel: PanelId::Stats,
                origin: FetchOrigin::Refresh
            }]
        );
        assert_eq!(app.panel(PanelId::Stats).rows.len(), 3);
    }

    #[test]
    fn free_text_tabs_never_fetch_on_switch() {
        let mut app = with_stats();
        app.handle(key(Action::NextTab));
        for _ in 0..5 {
            assert!(app.handle(key(Action::NextTab)).is_empty());
        }
        assert_eq!(app.active_tab, PanelId::Threads);
    }

    #[test]
    fn info_rows_are_derived_on_tab_switch() {
        let mut app = started();
        app.handle(completed(
            PanelId::Info,
            FetchOrigin::Poll,
            "Name: HAProxy\nVersion : 2.8\n\nbadline\n",
        ));
        app.handle(key(Action::NextTab));
        assert_eq!(
            app.panel(PanelId::Info).rows,
            PanelRows::Info(vec![
                InfoEntry::new("Name", "HAProxy"),
                InfoEntry::new("Version", "2.8"),
            ])
        );
    }

    #[test]
    fn refresh_completion_does_not_fork_the_poll_chain() {
        let mut app = with_stats();
        app.handle(key(Action::NextTab));
        app.handle(key(Action::PrevTab));
        let effects = app.handle(completed(
            PanelId::Stats,
            FetchOrigin::Refresh,
            &stats_text(),
        ));
        assert!(effects.is_empty());
    }

    #[test]
    fn disable_targets_selected_server_and_refreshes() {
        let mut app = with_stats();
        app.handle(key(Action::Down));
        assert_eq!(app.selection().map(|r| r.service_name.as_str()), Some("srv2"));

        let effects = app.handle(key(Action::DisableServer));
        let Some(Effect::Dispatch(command)) = effects.first().cloned() else {
            panic!("expected dispatch, got {effects:?}");
        };
        assert_eq!(command.to_string(), "disable server bk1/srv2");

        let follow_up = app.handle(Event::CommandCompleted {
            command,
            result: Err(refused()),
        });
        assert_eq!(
            follow_up,
            vec![Effect::Fetch {
                panel: PanelId::Stats,
                origin: FetchOrigin::Refresh
            }]
        );
    }

    #[test]
    fn enable_and_weight_commands() {
        let mut app = with_stats();
        app.handle(key(Action::Down));
        assert_eq!(
            app.handle(key(Action::EnableServer)),
            vec![Effect::Dispatch(ServerCommand::Enable(ServerTarget {
                backend: "bk1".to_string(),
                server: "srv2".to_string(),
            }))]
        );
        let Some(Effect::Dispatch(weight)) = app.handle(key(Action::SetWeight)).pop() else {
            panic!("expected weight dispatch");
        };
        assert_eq!(weight.to_string(), "set server bk1/srv2 weight 100");
    }

    #[test]
    fn sentinel_rows_cannot_be_commanded() {
        let mut app = with_stats();
        assert_eq!(
            app.selection().map(|r| r.service_name.as_str()),
            Some("FRONTEND")
        );
        assert!(app.handle(key(Action::DisableServer)).is_empty());
        app.handle(key(Action::Bottom));
        assert_eq!(
            app.selection().map(|r| r.service_name.as_str()),
            Some("BACKEND")
        );
        assert!(app.handle(key(Action::EnableServer)).is_empty());
        assert!(app.handle(key(Action::SetWeight)).is_empty());
    }

    #[test]
    fn commands_only_work_on_the_stats_tab() {
        let mut app = with_stats();
        app.handle(key(Action::Down));
        app.handle(key(Action::NextTab));
        assert!(app.selection().is_none());
        assert!(app.handle(key(Action::DisableServer)).is_empty());
    }

    #[test]
    fn every_command_refreshes_even_with_a_refresh_pending() {
        let mut app = with_stats();
        app.handle(key(Action::NextTab));
        let reentry = app.handle(key(Action::PrevTab));
        assert_eq!(reentry, vec![UiSession::stats_refresh()]);

        app.handle(key(Action::Down));
        for _ in 0..3 {
            let effects = app.handle(key(Action::DisableServer));
            let [Effect::Dispatch(command)] = effects.as_slice() else {
                panic!("expected dispatch, got {effects:?}");
            };
            let follow_up = app.handle(Event::CommandCompleted {
                command: command.clone(),
                result: Ok(String::new()),
            });
            assert_eq!(follow_up, vec![UiSession::stats_refresh()]);
        }

        app.handle(key(Action::NextTab));
        assert_eq!(app.handle(key(Action::PrevTab)), vec![UiSession::stats_refresh()]);
    }

    #[test]
    fn fatal_state_only_allows_quit() {
        let mut app = started();
        app.handle(Event::FetchCompleted {
            panel: PanelId::Stats,
            origin: FetchOrigin::Poll,
            result: Err(refused()),
        });
        assert!(app.handle(key(Action::NextTab)).is_empty());
        assert_eq!(app.active_tab, PanelId::Stats);
        assert_eq!(app.handle(key(Action::Quit)), vec![Effect::Quit]);
        assert!(app.should_quit());
    }

    #[test]
    fn yank_copies_value_and_message_expires() {
        let mut app = started();
        app.handle(completed(
            PanelId::Info,
            FetchOrigin::Poll,
            "Name: HAProxy: Product name\nVersion: 2.8.3: Product version\n",
        ));
        app.handle(key(Action::NextTab));
        app.handle(key(Action::Down));

        assert_eq!(
            app.handle(key(Action::Yank)),
            vec![Effect::CopyToClipboard("2.8.3".to_string())]
        );
        assert!(app.transient_message.is_none());

        let pending = app.handle(Event::ClipboardCompleted { result: Ok(()) });
        assert_eq!(app.transient_message.as_deref(), Some(COPIED_MESSAGE));
        let [Effect::ExpireMessage { generation, after }] = pending.as_slice() else {
            panic!("expected expiry, got {pending:?}");
        };
        assert_eq!(*after, Duration::from_secs(2));

        app.handle(Event::MessageExpired {
            generation: *generation,
        });
        assert!(app.transient_message.is_none());
    }

    #[test]
    fn stale_expiry_keeps_newer_message() {
        let mut app = started();
        app.handle(Event::ClipboardCompleted { result: Ok(()) });
        app.handle(Event::ClipboardCompleted { result: Ok(()) });
        app.handle(Event::MessageExpired { generation: 1 });
        assert!(app.transient_message.is_some());
        app.handle(Event::MessageExpired { generation: 2 });
        assert!(app.transient_message.is_none());
    }

    #[test]
    fn clipboard_failure_is_a_soft_error() {
        let mut app = started();
        app.handle(completed(PanelId::Info, FetchOrigin::Poll, "Name: HAProxy\n"));
        app.handle(key(Action::NextTab));

        app.handle(key(Action::Yank));
        let pending = app.handle(Event::ClipboardCompleted {
            result: Err(ClipboardError::Unsupported),
        });
        assert!(pending.is_empty());
        assert!(app.transient_message.is_none());
        assert!(app.fatal_error.is_none());
        assert!(matches!(
            app.panel(PanelId::Info).last_error,
            Some(PanelError::Clipboard(_))
        ));
    }

    #[test]
    fn yank_outside_info_does_nothing() {
        let mut app = with_stats();
        assert!(app.handle(key(Action::Yank)).is_empty());
    }

    #[test]
    fn resize_updates_viewport_only() {
        let mut app = with_stats();
        let effects = app.handle(Event::WindowResized {
            width: 120,
            height: 40,
        });
        assert!(effects.is_empty());
        assert_eq!(app.viewport.content_height(), 34);
        assert_eq!(
            app.viewport,
            Viewport {
                width: 120,
                height: 40
            }
        );
        assert_eq!(app.panel(PanelId::Stats).rows.len(), 3);
    }

    #[test]
    fn free_text_scroll_is_bounded_by_content() {
        let mut app = started();
        app.handle(completed(PanelId::Errors, FetchOrigin::Poll, "a\nb\nc\n"));
        app.handle(key(Action::NextTab));
        app.handle(key(Action::NextTab));
        assert_eq!(app.active_tab, PanelId::Errors);
        for _ in 0..10 {
            app.handle(key(Action::Down));
        }
        assert_eq!(app.scroll, 2);
        app.handle(key(Action::Top));
        assert_eq!(app.scroll, 0);
    }

    #[test]
    fn selection_clamps_when_rows_shrink() {
        let mut app = with_stats();
        app.handle(key(Action::Bottom));
        app.handle(Event::TimerFired {
            panel: PanelId::Stats,
        });
        let shorter = format!("h\n{}\n", stat_line("bk1", "srv2", "DOWN"));
        app.handle(completed(PanelId::Stats, FetchOrigin::Poll, &shorter));
        assert_eq!(app.panel(PanelId::Stats).selected, 0);
        assert_eq!(
            app.selection().map(|r| r.status.as_str()),
            Some("DOWN")
        );
    }

    #[test]
    fn key_bindings() {
        let press = |code| KeyEvent::new(code, KeyModifiers::NONE);
        assert_eq!(action_for_key(press(KeyCode::Char('q'))), Some(Action::Quit));
        assert_eq!(action_for_key(press(KeyCode::Tab)), Some(Action::NextTab));
        assert_eq!(action_for_key(press(KeyCode::Char('h'))), Some(Action::PrevTab));
        assert_eq!(
            action_for_key(press(KeyCode::Char('D'))),
            Some(Action::DisableServer)
        );
        assert_eq!(action_for_key(press(KeyCode::Char('y'))), Some(Action::Yank));
        assert_eq!(
            action_for_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Action::Quit)
        );
        assert_eq!(action_for_key(press(KeyCode::Char('z'))), None);
    }
}
