use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Row, Table, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use hidrotrack_core::{DashboardData, LotReading};

use crate::tui::app::{App, InputMode, LoginField, Screen};

pub fn draw(f: &mut Frame, app: &mut App) {
    match app.screen {
        Screen::Login => draw_login(f, app),
        Screen::LotSelect => draw_lot_select(f, app),
        Screen::Records => draw_records(f, app),
        Screen::Dashboard => draw_dashboard(f, app),
    }
}

fn draw_login(f: &mut Frame, app: &App) {
    let area = centered_rect(44, 12, f.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Title
            Constraint::Length(3), // Username
            Constraint::Length(3), // Password
            Constraint::Length(1), // Error
            Constraint::Length(1), // Help
        ])
        .split(area);

    let title = Paragraph::new(Line::from(Span::styled(
        "HIDROTRACK — sign in",
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);

    let field = |label: &str, value: String, focused: bool| {
        Paragraph::new(value).block(
            Block::default()
                .title(format!(" {} ", label))
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(if focused {
                    Color::Cyan
                } else {
                    Color::DarkGray
                })),
        )
    };

    let username_focused = app.login_focus == LoginField::Username;
    let masked: String = "*".repeat(app.login_secret.chars().count());
    f.render_widget(
        field("Username", app.login_username.clone(), username_focused),
        chunks[1],
    );
    f.render_widget(field("Password", masked.clone(), !username_focused), chunks[2]);

    let cursor_area = if username_focused { chunks[1] } else { chunks[2] };
    let cursor_text = if username_focused {
        app.login_username.as_str()
    } else {
        masked.as_str()
    };
    f.set_cursor_position(Position::new(
        cursor_area.x + 1 + cursor_text.width() as u16,
        cursor_area.y + 1,
    ));

    if let Some(status) = &app.status {
        let error = Paragraph::new(status.as_str())
            .style(Style::default().fg(Color::Red))
            .alignment(Alignment::Center);
        f.render_widget(error, chunks[3]);
    }

    let help = Paragraph::new("Tab: switch field | Enter: sign in | Esc: quit")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    f.render_widget(help, chunks[4]);
}

fn draw_lot_select(f: &mut Frame, app: &App) {
    let area = centered_rect(44, 9, f.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Title
            Constraint::Length(3), // Input
            Constraint::Length(1), // Error
            Constraint::Length(1), // Help
        ])
        .split(area);

    let title = Paragraph::new(Line::from(Span::styled(
        "Select a lot",
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);

    let input = Paragraph::new(app.lot_input.as_str()).block(
        Block::default()
            .title(" Lot number ")
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Cyan)),
    );
    f.render_widget(input, chunks[1]);
    f.set_cursor_position(Position::new(
        chunks[1].x + 1 + app.lot_input.width() as u16,
        chunks[1].y + 1,
    ));

    if let Some(status) = &app.status {
        let error = Paragraph::new(status.as_str())
            .style(Style::default().fg(Color::Red))
            .alignment(Alignment::Center);
        f.render_widget(error, chunks[2]);
    }

    let help = if app.capabilities().can_view_dashboard {
        "Enter: open lot | g: dashboard | o: sign out | q: quit"
    } else {
        "Enter: open lot | o: sign out | q: quit"
    };
    let help = Paragraph::new(help)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    f.render_widget(help, chunks[3]);
}

fn draw_records(f: &mut Frame, app: &mut App) {
    let size = f.area();

    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(1),    // Table
            Constraint::Length(3), // Entry line
            Constraint::Length(1), // Status
            Constraint::Length(1), // Footer
        ])
        .split(size);

    let lot_label = app
        .selected_lot
        .as_ref()
        .map(|l| l.to_string())
        .unwrap_or_default();
    let who = app
        .session
        .as_ref()
        .map(|s| format!("{} ({})", s.username, format!("{:?}", s.role).to_lowercase()))
        .unwrap_or_default();
    let header = Paragraph::new(format!("LOT {}  —  {}", lot_label, who))
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).border_type(BorderType::Rounded));
    f.render_widget(header, main_chunks[0]);

    draw_record_table(f, app, main_chunks[1]);
    draw_entry_line(f, app, main_chunks[2]);

    if let Some(status) = &app.status {
        let status = Paragraph::new(status.as_str()).style(Style::default().fg(Color::Yellow));
        f.render_widget(status, main_chunks[3]);
    }

    let caps = app.capabilities();
    let mut hints = vec!["j/k: navigate", "a: add"];
    if caps.can_edit {
        hints.push("e: edit");
        hints.push("d: delete");
    }
    if caps.can_view_dashboard {
        hints.push("x: export");
        hints.push("g: dashboard");
    }
    hints.push("b: lots");
    hints.push("q: quit");
    let footer = Paragraph::new(hints.join(" | "))
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    f.render_widget(footer, main_chunks[4]);
}

fn draw_record_table(f: &mut Frame, app: &mut App, area: Rect) {
    if app.records.is_empty() {
        let empty = Paragraph::new("This lot has no records yet. Press 'a' to add the first one.")
            .style(Style::default().fg(Color::DarkGray))
            .wrap(Wrap { trim: true })
            .block(Block::default().title(" History ").borders(Borders::ALL).border_type(BorderType::Rounded));
        f.render_widget(empty, area);
        return;
    }

    let rows: Vec<Row> = app
        .records
        .iter()
        .map(|r| {
            let id_str = r.id.to_string();
            Row::new(vec![
                Span::raw(r.period.display_reversed()),
                Span::raw(format!("{:.2}", r.previous_reading)),
                Span::raw(format!("{:.2}", r.current_reading)),
                Span::styled(
                    format!("{:.2}", r.consumption),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw(format!("{:.0}", r.consumption_liters())),
                Span::raw(format!("{:.2}", r.tariff)),
                Span::raw(format!("{:.2}", r.cost)),
                Span::styled(id_str[..8].to_string(), Style::default().fg(Color::DarkGray)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(8),  // Period
            Constraint::Length(10), // Previous
            Constraint::Length(10), // Current
            Constraint::Length(8),  // m³
            Constraint::Length(8),  // Liters
            Constraint::Length(7),  // Tariff
            Constraint::Length(10), // Cost
            Constraint::Min(8),     // Id
        ],
    )
    .header(
        Row::new(vec![
            "Period", "Prev", "Current", "m³", "Liters", "Tariff", "Cost", "ID",
        ])
        .style(Style::default().fg(Color::Yellow)),
    )
    .block(Block::default().title(" History ").borders(Borders::ALL).border_type(BorderType::Rounded))
    .row_highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
    .highlight_symbol(">> ");

    f.render_stateful_widget(table, area, &mut app.table_state);
}

fn draw_entry_line(f: &mut Frame, app: &App, area: Rect) {
    let (title, border) = match app.input_mode {
        InputMode::Editing if app.editing.is_some() => (" Edit record ", Color::Cyan),
        InputMode::Editing => (" New entry ", Color::Cyan),
        InputMode::Normal => (" Entry (press a) ", Color::DarkGray),
    };

    let input = Paragraph::new(app.input.as_str()).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(border)),
    );
    f.render_widget(input, area);

    if matches!(app.input_mode, InputMode::Editing) {
        let prefix: String = app.input.chars().take(app.cursor_position).collect();
        f.set_cursor_position(Position::new(
            area.x + 1 + prefix.width() as u16,
            area.y + 1,
        ));
    }
}

fn draw_dashboard(f: &mut Frame, app: &mut App) {
    let size = f.area();

    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(1),    // Content
            Constraint::Length(1), // Status
            Constraint::Length(1), // Footer
        ])
        .split(size);

    let month = app
        .dashboard
        .as_ref()
        .and_then(|d| d.latest_period)
        .map(|p| p.display_reversed())
        .unwrap_or_else(|| "-".to_string());
    let header = Paragraph::new(format!("DASHBOARD  —  reference month {}", month))
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).border_type(BorderType::Rounded));
    f.render_widget(header, main_chunks[0]);

    let content = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(main_chunks[1]);

    draw_ranking(f, app, content[0]);

    let side = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(8), Constraint::Min(1)])
        .split(content[1]);
    if let Some(data) = &app.dashboard {
        draw_summary(f, data, side[0]);
        draw_anomalies(f, data, side[1]);
    }

    if let Some(status) = &app.status {
        let status = Paragraph::new(status.as_str()).style(Style::default().fg(Color::Yellow));
        f.render_widget(status, main_chunks[2]);
    }

    let footer =
        Paragraph::new("j/k: navigate | Enter: open lot | r: refresh | l: lots | o: sign out | q: quit")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    f.render_widget(footer, main_chunks[3]);
}

fn draw_ranking(f: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default()
        .title(" Ranking (highest first) ")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded);

    let Some(data) = &app.dashboard else {
        f.render_widget(block, area);
        return;
    };
    if data.ranking.is_empty() {
        let empty = Paragraph::new("No readings recorded yet.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(empty, area);
        return;
    }

    let rows: Vec<Row> = data
        .ranking
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            Row::new(vec![
                Span::raw(format!("{}", i + 1)),
                Span::styled(
                    format!("Lot {}", entry.lot),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw(format!("{:.2} m³", entry.record.consumption)),
                Span::raw(format!("R$ {:.2}", entry.record.cost)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(4),
            Constraint::Length(12),
            Constraint::Length(12),
            Constraint::Min(10),
        ],
    )
    .header(Row::new(vec!["#", "Lot", "m³", "Cost"]).style(Style::default().fg(Color::Yellow)))
    .block(block)
    .row_highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
    .highlight_symbol(">> ");

    f.render_stateful_widget(table, area, &mut app.ranking_state);
}

fn draw_summary(f: &mut Frame, data: &DashboardData, area: Rect) {
    let text = vec![
        Line::from(vec![
            Span::styled("Registered lots:   ", Style::default().fg(Color::DarkGray)),
            Span::raw(format!("{}", data.total_lots)),
        ]),
        Line::from(vec![
            Span::styled("Verified lots:     ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("{}", data.verified_count),
                Style::default().fg(Color::Green),
            ),
        ]),
        Line::from(vec![
            Span::styled("Total consumption: ", Style::default().fg(Color::DarkGray)),
            Span::raw(format!("{:.2} m³", data.total_consumption)),
        ]),
        Line::from(vec![
            Span::styled("Average per lot:   ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("{:.2} m³", data.average_consumption),
                Style::default().fg(Color::Yellow),
            ),
        ]),
    ];
    let summary = Paragraph::new(text).block(
        Block::default()
            .title(" Overview ")
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded),
    );
    f.render_widget(summary, area);
}

fn draw_anomalies(f: &mut Frame, data: &DashboardData, area: Rect) {
    let mut lines = Vec::new();
    let entry_line = |entry: &LotReading, color: Color| {
        Line::from(vec![
            Span::styled(format!("Lot {:<6}", entry.lot), Style::default().fg(color)),
            Span::raw(format!("{:.2} m³", entry.record.consumption)),
        ])
    };

    if data.high_anomalies.is_empty() && data.low_anomalies.is_empty() {
        lines.push(Line::from(Span::styled(
            "No anomalies detected.",
            Style::default().fg(Color::DarkGray),
        )));
    }
    if !data.high_anomalies.is_empty() {
        lines.push(Line::from(Span::styled(
            "High consumption (> 1.5x average)",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )));
        for entry in &data.high_anomalies {
            lines.push(entry_line(entry, Color::Red));
        }
        lines.push(Line::from(""));
    }
    if !data.low_anomalies.is_empty() {
        lines.push(Line::from(Span::styled(
            "Low consumption (< 0.5x average)",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
        for entry in &data.low_anomalies {
            lines.push(entry_line(entry, Color::Yellow));
        }
    }

    let panel = Paragraph::new(lines).wrap(Wrap { trim: true }).block(
        Block::default()
            .title(" Anomalies ")
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded),
    );
    f.render_widget(panel, area);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}
