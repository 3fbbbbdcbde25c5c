use ratatui::style::{Color, Modifier, Style};
use sortbox_core::{Priority, Status};

pub const HEADER_STYLE: Style = Style::new()
    .fg(Color::Rgb(142, 192, 124))
    .add_modifier(Modifier::BOLD);
pub const SELECTED_STYLE: Style = Style::new()
    .bg(Color::Rgb(131, 165, 152))
    .fg(Color::Black)
    .add_modifier(Modifier::BOLD);
pub const ARMED_BORDER_STYLE: Style = Style::new().fg(Color::Red).add_modifier(Modifier::BOLD);
pub const WEIGHT_BORDER_STYLE: Style = Style::new().fg(Color::Rgb(146, 131, 116));

pub fn zebra_row_style(index: usize) -> Style {
    let bg = if index % 2 == 0 {
        Color::Rgb(18, 20, 26)
    } else {
        Color::Rgb(24, 27, 34)
    };
    Style::new().bg(bg)
}

pub mod icons {
    pub const ACTIONABLE: &str = "!";
    pub const ARMED: &str = "*";
}

pub fn status_color(status: Status) -> Color {
    match status.value() {
        1 => Color::Rgb(131, 165, 152),
        2 => Color::Rgb(184, 187, 38),
        _ => Color::Rgb(146, 131, 116),
    }
}

pub fn priority_color(priority: Priority) -> Color {
    match priority.value() {
        1 => Color::Rgb(254, 128, 25),
        2 => Color::Rgb(250, 189, 47),
        _ => Color::Rgb(131, 165, 152),
    }
}
