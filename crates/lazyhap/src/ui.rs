use crate::state::{PanelRows, PanelState, UiSession, FOOTER_HEIGHT, HEADER_HEIGHT};
use crate::theme;
use lazyhap_core::{InfoEntry, PanelId, StatsRow, PANELS};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span, Text},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};

const STATS_COLUMNS: [(&str, u16); 10] = [
    ("Name", 40),
    ("Server", 25),
    ("Status", 8),
    ("Cur Sess", 10),
    ("Max Sess", 10),
    ("Tot Sess", 10),
    ("Bytes In", 12),
    ("Bytes Out", 12),
    ("Errors", 8),
    ("Weight", 8),
];

const STATS_HINT: &str = "Commands: (d)isable server, (e)nable server, set (w)eight to 100";
const INFO_HINT: &str = "Commands: (y) to yank value to clipboard";
const TEXT_HINT: &str = "j/k scroll, tab/shift+tab switch panel, q quit";

/// Draws the current session. Reads state only.
pub fn render(frame: &mut Frame, app: &UiSession) {
    let area = frame.size();
    if let Some(error) = app.fatal_error.as_deref() {
        render_fatal(frame, area, error);
        return;
    }

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(HEADER_HEIGHT),
            Constraint::Min(0),
            Constraint::Length(FOOTER_HEIGHT),
        ])
        .split(area);

    frame.render_widget(render_header(app), layout[0]);
    let body = horizontal_margin(layout[1]);
    let state = app.active_panel();
    match &state.rows {
        PanelRows::Stats(rows) => render_stats(frame, body, app, state, rows),
        PanelRows::Info(entries) => render_info(frame, body, app, state, entries),
        PanelRows::None => render_text(frame, body, app, state),
    }
    frame.render_widget(render_footer(app), layout[2]);
}

fn render_fatal(frame: &mut Frame, area: Rect, error: &str) {
    let text = Text::from(vec![
        Line::from(""),
        Line::from(Span::styled(format!("Error: {error}"), theme::ERROR_STYLE)),
        Line::from(""),
        Line::from("Press q to quit"),
    ]);
    frame.render_widget(Paragraph::new(text).wrap(Wrap { trim: false }), area);
}

fn horizontal_margin(area: Rect) -> Rect {
    Rect {
        x: area.x.saturating_add(2),
        width: area.width.saturating_sub(4),
        ..area
    }
}

fn render_header(app: &UiSession) -> Paragraph<'static> {
    let mut tabs = Vec::with_capacity(PANELS.len() * 2);
    for panel in PANELS.iter() {
        let style = if panel.id == app.active_tab {
            theme::ACTIVE_TAB_STYLE
        } else {
            theme::TAB_STYLE
        };
        tabs.push(Span::styled(format!(" {} ", panel.label), style));
        tabs.push(Span::raw(" "));
    }

    let updated = app
        .active_panel()
        .last_fetched_at
        .map(|at| at.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "--:--:--".to_string());

    Paragraph::new(Text::from(vec![
        Line::from(tabs),
        Line::from(""),
        Line::from(Span::styled(
            format!("  Last updated: {updated}"),
            theme::MUTED_STYLE,
        )),
    ]))
}

fn panel_block(title: &str, state: &PanelState) -> Block<'static> {
    let mut spans = vec![Span::raw(format!(" {title} "))];
    if let Some(err) = &state.last_error {
        spans.push(Span::styled(format!("[{err}] "), theme::ERROR_STYLE));
    }
    Block::default()
        .borders(Borders::ALL)
        .border_style(theme::BORDER_STYLE)
        .title(Line::from(spans))
}

fn render_stats(
    frame: &mut Frame,
    area: Rect,
    app: &UiSession,
    state: &PanelState,
    rows: &[StatsRow],
) {
    let table_rows: Vec<Row> = rows
        .iter()
        .enumerate()
        .map(|(idx, row)| {
            Row::new(vec![
                Cell::from(row.proxy_name.clone()),
                Cell::from(row.service_name.clone()),
                Cell::from(Span::styled(
                    row.status.to_string(),
                    Style::new().fg(theme::status_color(&row.status)),
                )),
                Cell::from(row.current_sessions.to_string()),
                Cell::from(row.max_sessions.to_string()),
                Cell::from(row.total_sessions.to_string()),
                Cell::from(row.bytes_in_display()),
                Cell::from(row.bytes_out_display()),
                Cell::from(row.error_count.to_string()),
                Cell::from(row.weight_display()),
            ])
            .style(theme::zebra_row_style(idx))
        })
        .collect();

    let widths = STATS_COLUMNS.map(|(_, width)| Constraint::Length(width));
    let header = Row::new(STATS_COLUMNS.map(|(title, _)| title)).style(theme::HEADER_STYLE);
    let table = Table::new(table_rows, widths)
        .header(header)
        .block(panel_block(app.active_tab.label(), state))
        .highlight_style(theme::SELECTED_STYLE);

    let mut table_state = TableState::default().with_selected(Some(state.selected));
    frame.render_stateful_widget(table, area, &mut table_state);
}

fn render_info(
    frame: &mut Frame,
    area: Rect,
    app: &UiSession,
    state: &PanelState,
    entries: &[InfoEntry],
) {
    let rows: Vec<Row> = entries
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            let (value, description) = entry.value_and_description();
            Row::new(vec![
                Cell::from(entry.key.clone()),
                Cell::from(value.to_string()),
                Cell::from(Span::styled(description.to_string(), theme::MUTED_STYLE)),
            ])
            .style(theme::zebra_row_style(idx))
        })
        .collect();

    let widths = [
        Constraint::Length(28),
        Constraint::Length(25),
        Constraint::Min(10),
    ];
    let table = Table::new(rows, widths)
        .header(Row::new(vec!["Name", "Value", "Description"]).style(theme::HEADER_STYLE))
        .block(panel_block(app.active_tab.label(), state))
        .highlight_style(theme::SELECTED_STYLE);

    let mut table_state = TableState::default().with_selected(Some(state.selected));
    frame.render_stateful_widget(table, area, &mut table_state);
}

fn render_text(frame: &mut Frame, area: Rect, app: &UiSession, state: &PanelState) {
    let content = if state.raw_text.is_empty() && state.last_fetched_at.is_none() {
        Text::from(Span::styled("Waiting for data...", theme::MUTED_STYLE))
    } else {
        Text::raw(state.raw_text.as_str())
    };
    let paragraph = Paragraph::new(content)
        .block(panel_block(app.active_tab.label(), state))
        .scroll((app.scroll, 0));
    frame.render_widget(paragraph, area);
}

fn render_footer(app: &UiSession) -> Paragraph<'static> {
    let line = match (&app.transient_message, app.active_tab) {
        (Some(message), _) => Span::styled(format!("  {message}"), theme::MESSAGE_STYLE),
        (None, PanelId::Stats) => Span::styled(format!("  {STATS_HINT}"), theme::MUTED_STYLE),
        (None, PanelId::Info) => Span::styled(format!("  {INFO_HINT}"), theme::MUTED_STYLE),
        (None, _) => Span::styled(format!("  {TEXT_HINT}"), theme::MUTED_STYLE),
    };
    Paragraph::new(Line::from(line))
}
