use crate::state::App;
use crate::theme::{self, icons};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap},
    Frame,
};
use sortbox_core::SortKey;

pub fn render(f: &mut Frame, app: &mut App) {
    let area = f.size();
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(1)])
        .split(area);
    let main = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(30), Constraint::Min(20)])
        .split(outer[0]);

    let weight_areas = render_control_panel(f, app, main[0]);
    if app.show_help {
        render_help(f, main[1]);
        app.update_layout(None, weight_areas);
    } else {
        render_notifications(f, app, main[1]);
        app.update_layout(Some(main[1]), weight_areas);
    }
    render_status_line(f, app, outer[1]);
}

fn render_control_panel(f: &mut Frame, app: &App, area: Rect) -> Vec<(SortKey, Rect)> {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Sorting Sandbox")
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Length(2),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .split(inner);

    let controls = vec![
        Line::from(vec![
            Span::styled("a", Color::Cyan),
            Span::raw("  Add notification"),
        ]),
        Line::from(vec![
            Span::styled("R", Color::Cyan),
            Span::raw("  Reset"),
        ]),
        Line::from(vec![
            Span::styled("x", Color::Cyan),
            Span::raw("  Change status to 2"),
        ]),
        Line::from(vec![
            Span::styled("?", Color::Cyan),
            Span::raw("  Help"),
        ]),
    ];
    f.render_widget(Paragraph::new(controls), sections[0]);
    f.render_widget(
        Paragraph::new(Line::from(Span::styled(
            "Adjust Weight Order:",
            Style::default().add_modifier(Modifier::BOLD),
        ))),
        sections[1],
    );

    let armed = app.sandbox.armed_key();
    let mut weight_areas = Vec::with_capacity(3);
    for (slot, key) in app.sandbox.weight_order().iter().enumerate() {
        let box_area = sections[2 + slot];
        let is_armed = armed == Some(key);
        let (border_style, title) = if is_armed {
            (
                theme::ARMED_BORDER_STYLE,
                format!("{} {}", slot + 1, icons::ARMED),
            )
        } else {
            (theme::WEIGHT_BORDER_STYLE, format!("{}", slot + 1))
        };
        let weight_box = Paragraph::new(key.as_str())
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(title)
                    .border_style(border_style),
            );
        f.render_widget(weight_box, box_area);
        weight_areas.push((key, box_area));
    }
    weight_areas
}

fn render_notifications(f: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Notifications")
        .border_style(Style::default().fg(Color::Cyan));

    if app.records().is_empty() {
        let inner = block.inner(area);
        f.render_widget(block, area);
        let p = Paragraph::new("No notifications. Press a to add one, R to reset.")
            .wrap(Wrap { trim: true });
        f.render_widget(p, inner);
        return;
    }

    let rows: Vec<Row> = app
        .records()
        .iter()
        .enumerate()
        .map(|(idx, record)| {
            let action = if record.status.is_actionable() {
                Span::styled(icons::ACTIONABLE, Color::Yellow)
            } else {
                Span::raw("")
            };
            Row::new(vec![
                Cell::from(action),
                Cell::from(Span::styled(
                    record.status.to_string(),
                    theme::status_color(record.status),
                )),
                Cell::from(Span::styled(
                    record.priority.to_string(),
                    theme::priority_color(record.priority),
                )),
                Cell::from(Span::raw(record.time.to_string())),
                Cell::from(Span::styled(
                    record.id.to_string(),
                    Style::default().fg(Color::DarkGray),
                )),
            ])
            .style(theme::zebra_row_style(idx))
        })
        .collect();

    let widths = [
        Constraint::Length(2),
        Constraint::Length(8),
        Constraint::Length(10),
        Constraint::Length(8),
        Constraint::Min(4),
    ];

    let table = Table::new(rows, widths)
        .header(
            Row::new(vec!["", "Status", "Priority", "Time", "Id"]).style(theme::HEADER_STYLE),
        )
        .block(block)
        .highlight_style(theme::SELECTED_STYLE);

    f.render_stateful_widget(table, area, &mut app.table_state);
}

fn render_help(f: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Help")
        .border_style(Style::default().fg(Color::Yellow));
    let inner_area = block.inner(area);
    f.render_widget(block, area);

    let text = vec![
        Line::from(Span::styled(
            "Keyboard Shortcuts",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("j / Down", Color::Cyan),
            Span::raw("   Next notification"),
        ]),
        Line::from(vec![
            Span::styled("k / Up", Color::Cyan),
            Span::raw("     Previous notification"),
        ]),
        Line::from(vec![
            Span::styled("a", Color::Cyan),
            Span::raw("          Add notification"),
        ]),
        Line::from(vec![
            Span::styled("x / Enter", Color::Cyan),
            Span::raw("  Change status 1 to 2"),
        ]),
        Line::from(vec![
            Span::styled("1 2 3", Color::Cyan),
            Span::raw("      Select weight slot; second pick swaps"),
        ]),
        Line::from(vec![
            Span::styled("R", Color::Cyan),
            Span::raw("          Reset notifications"),
        ]),
        Line::from(vec![
            Span::styled("y", Color::Cyan),
            Span::raw("          Export snapshot"),
        ]),
        Line::from(vec![
            Span::styled("?", Color::Cyan),
            Span::raw("          Toggle help"),
        ]),
        Line::from(vec![
            Span::styled("q / Esc", Color::Cyan),
            Span::raw("    Quit"),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "Mouse: click a weight box to select it, click the selected row to acknowledge.",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let p = Paragraph::new(text).wrap(Wrap { trim: true });
    f.render_widget(p, inner_area);
}

fn render_status_line(f: &mut Frame, app: &App, area: Rect) {
    let style = if app.last_error.is_some() {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    f.render_widget(
        Paragraph::new(Line::from(Span::styled(app.status_line(), style))),
        area,
    );
}
