//! Schematic view rendering.
//!
//! Draws the selected dryer as a column with the grain entering at the top
//! and leaving at the bottom. Each panel metric gets a badge on the side of
//! the dryer where it is measured, bordered by its severity.

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::{Metric, MetricReading};
use crate::ui::panel::format_reading;

/// Where a badge sits around the dryer column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// Entry side, top to bottom.
    Entry(usize),
    /// Exit side, top to bottom.
    Exit(usize),
    /// Under the column, left to right.
    Burner(usize),
}

/// Badge placement of each panel metric.
pub fn slot(metric: Metric) -> Slot {
    match metric {
        Metric::UmidadeEntrada => Slot::Entry(0),
        Metric::TemperaturaEntrada => Slot::Entry(1),
        Metric::ToneladaEntrada | Metric::TcEntrada => Slot::Entry(2),
        Metric::UmidadeSaida => Slot::Exit(0),
        Metric::TemperaturaSaida => Slot::Exit(1),
        Metric::ToneladaSaida | Metric::TcSaida => Slot::Exit(2),
        Metric::TemperaturaQueimador => Slot::Burner(0),
        Metric::PressaoQueimador => Slot::Burner(1),
    }
}

const BADGE_HEIGHT: u16 = 4;

/// Render the Schematic view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(dryer) = app.selected_dryer() else {
        let msg = Paragraph::new("No dryer selected. Pick one in the Dryers view.")
            .alignment(Alignment::Center);
        frame.render_widget(msg, area);
        return;
    };

    let outer = Block::default()
        .title(format!(
            " {} · {} · {} ",
            dryer.name,
            dryer.unit,
            dryer.status.label()
        ))
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.severity_border(dryer.health)));
    let inner = outer.inner(area);
    frame.render_widget(outer, area);

    let columns = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Percentage(36),
        Constraint::Fill(1),
    ])
    .split(inner);

    let center = Layout::vertical([Constraint::Min(3), Constraint::Length(BADGE_HEIGHT)])
        .split(columns[1]);

    let side_rows = |area: Rect| {
        Layout::vertical([
            Constraint::Length(BADGE_HEIGHT),
            Constraint::Length(BADGE_HEIGHT),
            Constraint::Length(BADGE_HEIGHT),
            Constraint::Min(0),
        ])
        .split(area)
    };
    let entry = side_rows(columns[0]);
    let exit = side_rows(columns[2]);
    let burner = Layout::horizontal([Constraint::Fill(1), Constraint::Fill(1)]).split(center[1]);

    render_column(frame, app, center[0]);

    for reading in &dryer.metrics {
        let target = match slot(reading.metric) {
            Slot::Entry(i) => entry[i],
            Slot::Exit(i) => exit[i],
            Slot::Burner(i) => burner[i],
        };
        render_badge(frame, app, reading, target);
    }
}

fn render_column(frame: &mut Frame, app: &App, area: Rect) {
    let body_rows = area.height.saturating_sub(4) as usize;
    let mut lines = vec![
        Line::from(Span::styled("▼ grão úmido ▼", Style::default().add_modifier(Modifier::DIM))),
        Line::from("┌────────┐"),
    ];
    for i in 0..body_rows {
        lines.push(Line::from(if i % 2 == 0 { "│ ░░░░░░ │" } else { "│ ▒▒▒▒▒▒ │" }));
    }
    lines.push(Line::from("└───┬┬───┘"));
    lines.push(Line::from(Span::styled(
        "▼ grão seco ▼",
        Style::default().fg(app.theme.highlight),
    )));

    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), area);
}

fn render_badge(frame: &mut Frame, app: &App, reading: &MetricReading, area: Rect) {
    if area.height < 3 || area.width < 6 {
        return;
    }
    let style = app.theme.severity_style(reading.severity);
    let block = Block::default()
        .title(format!(" {} ", reading.metric.definition().short_label))
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.severity_border(reading.severity)));

    let line = Line::from(vec![
        Span::styled(format_reading(reading.metric, reading.value), style),
        Span::raw(" "),
        Span::styled(reading.severity.symbol(), style),
    ]);

    frame.render_widget(
        Paragraph::new(line).alignment(Alignment::Center).block(block),
        area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_panel_metrics_get_distinct_slots() {
        let slots: HashSet<Slot> = Metric::PANEL.iter().map(|&m| slot(m)).collect();
        assert_eq!(slots.len(), Metric::PANEL.len());
    }

    #[test]
    fn test_burner_metrics_sit_under_the_column() {
        assert_eq!(slot(Metric::TemperaturaQueimador), Slot::Burner(0));
        assert_eq!(slot(Metric::PressaoQueimador), Slot::Burner(1));
    }
}
