//! Frame drawing
//!
//! Rich-style layout:
//! - Error frame: a red panel with the subsystem's message, centered
//! - Table frame: a blue "GPU Status" panel wrapping a green "GPU Monitor" table, with the
//!   driver version and timestamp on the bottom border
//!
//! Meter cells are two lines high, label on top and bar below.

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Cell, Paragraph, Row, Table, Widget, Wrap},
};

use super::frame::{DeviceRow, Footer, Frame, Meter, Severity, COLUMNS};
use crate::config::{BAR_WIDTH, STATUS_TITLE, TITLE};
use crate::sample::FanSpeed;

/// Palette
mod colors {
    use ratatui::style::Color;

    pub const TITLE: Color = Color::Yellow;
    pub const PANEL_BORDER: Color = Color::Blue;
    pub const TABLE_BORDER: Color = Color::Green;
    pub const ERROR: Color = Color::Red;
    pub const BAR_FILLED: Color = Color::Magenta;
    pub const BAR_TRACK: Color = Color::DarkGray;
}

const BAR_GLYPH: &str = "━";

fn title_style() -> Style {
    Style::default()
        .fg(colors::TITLE)
        .add_modifier(Modifier::BOLD)
}

fn severity_style(severity: Severity) -> Style {
    match severity {
        Severity::Critical => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        Severity::Warning => Style::default().fg(Color::Yellow),
        Severity::Normal => Style::default().fg(Color::Green),
    }
}

/// Horizontal bar, `ratio` of `width` cells filled
pub fn bar_line(ratio: f64, width: u16) -> Line<'static> {
    let width = width as usize;
    let filled = ((ratio.clamp(0.0, 1.0) * width as f64).round() as usize).min(width);
    Line::from(vec![
        Span::styled(
            BAR_GLYPH.repeat(filled),
            Style::default().fg(colors::BAR_FILLED),
        ),
        Span::styled(
            BAR_GLYPH.repeat(width - filled),
            Style::default().fg(colors::BAR_TRACK),
        ),
    ])
}

fn meter_cell(meter: &Meter) -> Cell<'static> {
    Cell::from(
        Text::from(vec![
            Line::from(meter.label.clone()),
            bar_line(meter.ratio(), BAR_WIDTH),
        ])
        .centered(),
    )
}

fn fan_cell(fan: FanSpeed) -> Cell<'static> {
    let line = match fan {
        FanSpeed::Percent(_) => Line::styled(fan.to_string(), Style::default().fg(Color::Green)),
        FanSpeed::Unsupported => Line::styled(
            fan.to_string(),
            Style::default().add_modifier(Modifier::DIM),
        ),
    };
    Cell::from(line.right_aligned())
}

fn device_row(row: &DeviceRow) -> Row<'static> {
    Row::new(vec![
        Cell::from(Line::from(row.id.clone()).right_aligned())
            .style(Style::default().fg(Color::Cyan)),
        Cell::from(row.name.clone()).style(Style::default().fg(Color::Magenta)),
        Cell::from(
            Line::styled(row.temperature.clone(), severity_style(row.severity)).right_aligned(),
        ),
        fan_cell(row.fan),
        meter_cell(&row.power),
        meter_cell(&row.memory),
        meter_cell(&row.utilization),
    ])
    .height(2)
}

fn render_error(message: &str, area: Rect, buf: &mut Buffer) {
    let block = Block::bordered()
        .title(Line::from(Span::styled(TITLE, title_style())))
        .border_style(Style::default().fg(colors::ERROR));

    Paragraph::new(Text::from(format!("NVIDIA Driver/SMI Error:\n{}", message)))
        .style(
            Style::default()
                .fg(colors::ERROR)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: false })
        .block(block)
        .render(area, buf);
}

fn render_table(rows: &[DeviceRow], footer: &Footer, area: Rect, buf: &mut Buffer) {
    let panel = Block::bordered()
        .title(Line::from(Span::styled(
            STATUS_TITLE,
            Style::default().add_modifier(Modifier::BOLD),
        )))
        .title_bottom(
            Line::from(Span::styled(
                footer.text(),
                Style::default().add_modifier(Modifier::DIM),
            ))
            .centered(),
        )
        .border_style(Style::default().fg(colors::PANEL_BORDER));
    let inner = panel.inner(area);
    panel.render(area, buf);

    let header = Row::new(COLUMNS.iter().map(|c| Cell::from(*c)))
        .style(Style::default().add_modifier(Modifier::BOLD));

    let meter_width = Constraint::Length(BAR_WIDTH + 2);
    let widths = [
        Constraint::Length(3),
        Constraint::Min(12),
        Constraint::Length(6),
        Constraint::Length(5),
        meter_width,
        meter_width,
        meter_width,
    ];

    Table::new(rows.iter().map(device_row), widths)
        .header(header)
        .column_spacing(1)
        .block(
            Block::bordered()
                .title(Line::from(Span::styled(TITLE, title_style())).centered())
                .border_style(Style::default().fg(colors::TABLE_BORDER)),
        )
        .render(inner, buf);
}

impl Widget for &Frame {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self {
            Frame::Error { message } => render_error(message, area, buf),
            Frame::Table { rows, footer } => render_table(rows, footer, area, buf),
        }
    }
}
