use lazyhap_core::ServerStatus;
use ratatui::style::{Color, Modifier, Style};

pub const HEADER_STYLE: Style = Style::new()
    .fg(Color::Indexed(205))
    .add_modifier(Modifier::BOLD);
pub const SELECTED_STYLE: Style = Style::new()
    .bg(Color::Indexed(57))
    .fg(Color::Indexed(229));
pub const ACTIVE_TAB_STYLE: Style = Style::new()
    .fg(Color::Indexed(205))
    .bg(Color::Indexed(57))
    .add_modifier(Modifier::BOLD);
pub const TAB_STYLE: Style = Style::new();
pub const BORDER_STYLE: Style = Style::new().fg(Color::Indexed(240));
pub const MUTED_STYLE: Style = Style::new().fg(Color::Indexed(241));
pub const MESSAGE_STYLE: Style = Style::new().fg(Color::Rgb(142, 192, 124));
pub const ERROR_STYLE: Style = Style::new()
    .fg(Color::Rgb(254, 128, 25))
    .add_modifier(Modifier::BOLD);

pub fn zebra_row_style(index: usize) -> Style {
    let bg = if index % 2 == 0 {
        Color::Rgb(18, 20, 26)
    } else {
        Color::Rgb(24, 27, 34)
    };
    Style::new().bg(bg)
}

pub fn status_color(status: &ServerStatus) -> Color {
    match status {
        ServerStatus::Up => Color::Indexed(10),
        ServerStatus::Down => Color::Indexed(9),
        ServerStatus::Open => Color::Rgb(131, 165, 152),
        ServerStatus::Other(raw) if raw.starts_with("MAINT") || raw.starts_with("DRAIN") => {
            Color::Rgb(250, 189, 47)
        }
        ServerStatus::Other(_) => Color::Rgb(146, 131, 116),
    }
}
