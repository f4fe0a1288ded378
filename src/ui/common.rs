//! Common UI components shared across views.
//!
//! This module contains the header bar, tab bar, status bar, and help overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame,
};

use crate::app::{App, View};
use crate::data::Severity;

/// Render the header bar with the fleet overview.
///
/// Displays: status indicator, dryer counts by health, CLP connectivity.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref data) = app.data else {
        let line = Line::from(vec![
            Span::styled(
                " SECADOR MONITOR ",
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("| Loading..."),
        ]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    };

    let (normal, warning, critical) = health_counts(data.dryers.iter().map(|d| d.health));
    let worst = data.dryers.iter().map(|d| d.health).max().unwrap_or_default();

    let clp = match data.clp_online {
        Some(true) => Span::styled("CLP online", Style::default().fg(app.theme.normal)),
        Some(false) => Span::styled(
            "CLP offline",
            Style::default().fg(app.theme.critical).add_modifier(Modifier::BOLD),
        ),
        None => Span::styled("CLP ?", Style::default().add_modifier(Modifier::DIM)),
    };

    let line = Line::from(vec![
        Span::styled(" ● ", app.theme.severity_style(worst)),
        Span::styled("SECADOR ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
        Span::styled(format!("{}", normal), Style::default().fg(app.theme.normal)),
        Span::raw(" ok "),
        if warning > 0 {
            Span::styled(format!("{}", warning), Style::default().fg(app.theme.warning))
        } else {
            Span::styled("0", Style::default().add_modifier(Modifier::DIM))
        },
        Span::raw(" warn "),
        if critical > 0 {
            Span::styled(
                format!("{}", critical),
                Style::default().fg(app.theme.critical).add_modifier(Modifier::BOLD),
            )
        } else {
            Span::styled("0", Style::default().add_modifier(Modifier::DIM))
        },
        Span::raw(" crit │ "),
        Span::styled(
            format!("{}", data.dryers.len()),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(" dryers │ "),
        clp,
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

/// Count severities as `(normal, warning, critical)`.
pub fn health_counts(severities: impl Iterator<Item = Severity>) -> (usize, usize, usize) {
    severities.fold((0, 0, 0), |(n, w, c), s| match s {
        Severity::Normal => (n + 1, w, c),
        Severity::Warning => (n, w + 1, c),
        Severity::Critical => (n, w, c + 1),
    })
}

/// Render the tab bar showing available views.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = vec![
        Line::from(" 1:Dryers "),
        Line::from(" 2:Schematic "),
        Line::from(" 3:History "),
    ];

    let selected = match app.current_view {
        View::Dryers => 0,
        View::Schematic => 1,
        View::History => 2,
    };

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .divider("|");

    frame.render_widget(tabs, area);
}

/// Render the status bar at the bottom.
///
/// Shows: data source, time since last update, available controls.
/// Also displays temporary status messages and errors.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    // A failing refresh keeps the last good data on screen
    if let (Some(_), Some(err)) = (&app.data, &app.load_error) {
        let text = format!(" {} | Error: {} | r:retry", app.source_description(), err);
        let paragraph = Paragraph::new(text).style(Style::default().fg(app.theme.warning));
        frame.render_widget(paragraph, area);
        return;
    }

    let status = if let Some(ref data) = app.data {
        let elapsed = data.last_updated.elapsed();

        let controls = if app.filter_active {
            "Type to search | Enter:apply Esc:cancel"
        } else {
            match app.current_view {
                View::Dryers => "/:search s:sort Enter:schematic Tab:switch ?:help q:quit",
                View::Schematic => "↑↓:dryer Esc:back Tab:switch ?:help q:quit",
                View::History => "↑↓:metric Space:toggle [ ] { }:dates e:export ?:help q:quit",
            }
        };

        format!(
            " {} | Updated {:.1}s ago | {}",
            app.source_description(),
            elapsed.as_secs_f64(),
            controls,
        )
    } else if let Some(ref err) = app.load_error {
        format!(" Error: {} | q:quit r:retry", err)
    } else {
        " Loading... | q:quit".to_string()
    };

    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));

    frame.render_widget(paragraph, area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current view.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let section = |title: &'static str| {
        Line::from(vec![Span::styled(
            title,
            Style::default().add_modifier(Modifier::BOLD),
        )])
    };

    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        section(" Navigation"),
        Line::from("  Tab 1-3 h/l   Switch views"),
        Line::from("  ↑/↓ j/k       Navigate list"),
        Line::from("  Home/End      Jump to first/last"),
        Line::from("  Enter         Open schematic"),
        Line::from("  Esc           Back to dryers"),
        Line::from(""),
        section(" Dryers"),
        Line::from("  /             Start filter/search"),
        Line::from("  c             Clear filter"),
        Line::from("  s / S         Sort column / direction"),
        Line::from(""),
        section(" History"),
        Line::from("  Space         Toggle metric"),
        Line::from("  [ / ]         Start date -1 / +1 day"),
        Line::from("  { / }         End date -1 / +1 day"),
        Line::from("  t / x         Today / all dates"),
        Line::from("  e             Export CSV report"),
        Line::from(""),
        section(" General"),
        Line::from("  r             Reload data"),
        Line::from("  q             Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    // Center the help overlay - responsive to terminal size
    let help_width = 46u16.min(area.width.saturating_sub(4));
    let help_height = 30u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    // Clear the area behind the help
    frame.render_widget(ratatui::widgets::Clear, help_area);
    frame.render_widget(paragraph, help_area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_counts() {
        let counts = health_counts(
            [
                Severity::Normal,
                Severity::Critical,
                Severity::Normal,
                Severity::Warning,
            ]
            .into_iter(),
        );
        assert_eq!(counts, (2, 1, 1));
        assert_eq!(health_counts(std::iter::empty()), (0, 0, 0));
    }
}
