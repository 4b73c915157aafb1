use std::{io, time::Duration};

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use hidrotrack_core::{chronological, consumption_trend, ConsumptionTrend, LotKey, ReadingRecord};
use ratatui::{
    prelude::*,
    widgets::{Bar, BarChart, BarGroup, Block, BorderType, Borders, Gauge, Padding, Paragraph},
};

// --- THEME ---
struct Theme {
    primary: Color,
    muted: Color,
    text: Color,
    bar: Color,
    up: Color,
    down: Color,
}

const THEME: Theme = Theme {
    primary: Color::Cyan,
    muted: Color::DarkGray,
    text: Color::White,
    bar: Color::Blue,
    up: Color::Red,
    down: Color::Green,
};

pub fn run(lot: &LotKey, records: Vec<ReadingRecord>) -> Result<()> {
    let records = chronological(&records);

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    loop {
        terminal.draw(|f| ui(f, lot, &records))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => break,
                        _ => {}
                    }
                }
            }
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    Ok(())
}

fn ui(frame: &mut Frame, lot: &LotKey, records: &[ReadingRecord]) {
    let size = frame.area();

    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(10),   // Chart + summary
            Constraint::Length(1), // Footer
        ])
        .split(size);

    let title = Paragraph::new(Span::styled(
        format!(" CONSUMPTION — LOT {} ", lot),
        Style::default().fg(THEME.primary).add_modifier(Modifier::BOLD),
    ))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(THEME.muted))
            .padding(Padding::new(0, 0, 1, 0)),
    );
    frame.render_widget(title, main_layout[0]);

    let content_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(72), // Chart area
            Constraint::Length(1),      // Gutter
            Constraint::Percentage(28), // Summary panel
        ])
        .split(main_layout[1]);

    draw_chart(frame, records, content_chunks[0]);
    draw_summary_panel(frame, records, content_chunks[2]);

    let help = Line::from(vec![
        Span::styled("QUIT: ", Style::default().fg(THEME.muted)),
        Span::styled("q", Style::default().fg(THEME.text)),
    ]);
    let footer = Paragraph::new(help)
        .alignment(Alignment::Center)
        .style(Style::default().fg(THEME.muted));
    frame.render_widget(footer, main_layout[2]);
}

fn draw_chart(frame: &mut Frame, records: &[ReadingRecord], area: Rect) {
    let bar_items: Vec<Bar> = records
        .iter()
        .map(|r| {
            let liters = r.consumption_liters();
            Bar::default()
                .label(format!(
                    "{:02}/{:02}",
                    r.period.month(),
                    r.period.year() % 100
                ))
                .value(liters as u64)
                .style(Style::default().fg(THEME.bar))
                .text_value(format!("{:.0}", liters))
        })
        .collect();

    let chart_block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(THEME.muted))
        .title(" Monthly consumption (liters) ");

    let chart = BarChart::default()
        .block(chart_block)
        .bar_width(9)
        .bar_gap(2)
        .data(BarGroup::default().bars(&bar_items));

    frame.render_widget(chart, area);
}

fn draw_summary_panel(frame: &mut Frame, records: &[ReadingRecord], area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(9), // Totals
            Constraint::Length(4), // Trend
            Constraint::Min(1),    // Gauge
        ])
        .split(area);

    let total: f64 = records.iter().map(|r| r.consumption).sum();
    let total_cost: f64 = records.iter().map(|r| r.cost).sum();
    let average = if records.is_empty() {
        0.0
    } else {
        total / records.len() as f64
    };

    let info_text = vec![
        Line::from(Span::styled(
            "Overview",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("Months:  ", Style::default().fg(THEME.muted)),
            Span::styled(
                format!("{}", records.len()),
                Style::default().fg(THEME.text),
            ),
        ]),
        Line::from(vec![
            Span::styled("Total:   ", Style::default().fg(THEME.muted)),
            Span::styled(
                format!("{:.2} m³", total),
                Style::default().fg(THEME.text).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            Span::styled("Average: ", Style::default().fg(THEME.muted)),
            Span::styled(format!("{:.2} m³", average), Style::default().fg(THEME.text)),
        ]),
        Line::from(vec![
            Span::styled("Cost:    ", Style::default().fg(THEME.muted)),
            Span::styled(
                format!("R$ {:.2}", total_cost),
                Style::default().fg(THEME.text),
            ),
        ]),
    ];
    let info_block = Paragraph::new(info_text).block(panel_block(" Summary "));
    frame.render_widget(info_block, chunks[0]);

    let (trend_line, trend_color) = match consumption_trend(records) {
        Some(ConsumptionTrend::FirstRecord { consumption }) => (
            format!("First record: {:.2} m³", consumption),
            THEME.text,
        ),
        Some(ConsumptionTrend::Increase { delta }) => (
            format!("Up {:.2} m³ ({:.0} L) vs last month", delta, delta * 1000.0),
            THEME.up,
        ),
        Some(ConsumptionTrend::Decrease { delta }) => (
            format!(
                "Saved {:.2} m³ ({:.0} L) vs last month",
                delta,
                delta * 1000.0
            ),
            THEME.down,
        ),
        Some(ConsumptionTrend::Stable { consumption }) => (
            format!("Stable at {:.2} m³", consumption),
            THEME.text,
        ),
        None => ("No data".to_string(), THEME.muted),
    };
    let trend = Paragraph::new(Line::from(Span::styled(
        trend_line,
        Style::default().fg(trend_color),
    )))
    .wrap(ratatui::widgets::Wrap { trim: true })
    .block(panel_block(" Last month "));
    frame.render_widget(trend, chunks[1]);

    // Latest month against the lot's own average.
    let latest = records.last().map(|r| r.consumption).unwrap_or(0.0);
    let ratio = if average > 0.0 { latest / average } else { 0.0 };
    let gauge = Gauge::default()
        .block(panel_block(" vs. lot average "))
        .gauge_style(Style::default().fg(if ratio > 1.1 { THEME.up } else { THEME.down }))
        .ratio(ratio.min(1.0))
        .label(format!("{:.0}%", ratio * 100.0));
    frame.render_widget(gauge, chunks[2]);
}

fn panel_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(THEME.muted))
        .title(title.to_string())
}
