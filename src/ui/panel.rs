//! Dryers view rendering.
//!
//! Displays a table of all dryers with status and health, next to the
//! classified live readings of the selected dryer.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::Span,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::data::{DryerReading, Metric};

/// Column to sort by in the Dryers view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortColumn {
    /// Sort by dryer name alphabetically.
    Name,
    /// Sort by unit (site) name.
    Unit,
    /// Sort by worst reading severity.
    #[default]
    Status,
}

impl SortColumn {
    /// Cycle to the next sort column.
    pub fn next(self) -> Self {
        match self {
            SortColumn::Name => SortColumn::Unit,
            SortColumn::Unit => SortColumn::Status,
            SortColumn::Status => SortColumn::Name,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortColumn::Name => "name",
            SortColumn::Unit => "unit",
            SortColumn::Status => "status",
        }
    }
}

/// Render the Dryers view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::horizontal([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    render_dryer_table(frame, app, chunks[0]);
    render_readings(frame, app, chunks[1]);
}

fn render_dryer_table(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref data) = app.data else {
        return;
    };
    let dryers = app.visible_dryers();

    let header = Row::new(vec![
        Cell::from(format_header("Dryer", SortColumn::Name, app)),
        Cell::from(format_header("Unit", SortColumn::Unit, app)),
        Cell::from("State"),
        Cell::from(format_header("Health", SortColumn::Status, app)),
    ])
    .height(1)
    .style(app.theme.header);

    let rows: Vec<Row> = dryers
        .iter()
        .map(|d| {
            Row::new(vec![
                Cell::from(d.name.clone()),
                Cell::from(d.unit.clone()),
                Cell::from(d.status.label()),
                Cell::from(d.health.symbol()).style(app.theme.severity_style(d.health)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Fill(3),
        Constraint::Fill(2),
        Constraint::Min(11),
        Constraint::Min(6),
    ];

    let selected = app.selected_dryer_index.min(dryers.len().saturating_sub(1));
    let sort_dir = if app.sort_ascending { "↑" } else { "↓" };

    let filter_info = if app.filter_active {
        format!(" /{}_", app.filter_text)
    } else if !app.filter_text.is_empty() {
        format!(" /{}/ [c:clear]", app.filter_text)
    } else {
        String::new()
    };

    let title = format!(
        " Dryers ({}/{}) [s:sort {}{}]{} ",
        dryers.len(),
        data.dryers.len(),
        app.sort_column.label(),
        sort_dir,
        filter_info
    );

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    state.select(Some(selected));

    frame.render_stateful_widget(table, area, &mut state);
}

fn render_readings(frame: &mut Frame, app: &App, area: Rect) {
    let Some(dryer) = app.selected_dryer() else {
        let empty = Paragraph::new(" No dryer selected").block(
            Block::default()
                .title(" Readings ")
                .borders(Borders::ALL)
                .border_type(app.theme.border_type),
        );
        frame.render_widget(empty, area);
        return;
    };

    let rows: Vec<Row> = dryer
        .metrics
        .iter()
        .map(|m| {
            let style = app.theme.severity_style(m.severity);
            Row::new(vec![
                Cell::from(m.metric.label()),
                Cell::from(format_reading(m.metric, m.value)).style(style),
                Cell::from(m.severity.symbol()).style(style),
            ])
        })
        .collect();

    let updated = dryer
        .updated_at
        .as_deref()
        .map(|t| format!(" @ {}", t))
        .unwrap_or_default();

    let table = Table::new(
        rows,
        [Constraint::Fill(3), Constraint::Fill(2), Constraint::Min(5)],
    )
    .header(Row::new(vec!["Metric", "Value", ""]).style(app.theme.header))
    .block(
        Block::default()
            .title(format!(" {}{} ", dryer.name, updated))
            .borders(Borders::ALL)
            .border_type(app.theme.border_type)
            .border_style(Style::default().fg(app.theme.severity_border(dryer.health))),
    );

    frame.render_widget(table, area);
}

fn format_header(name: &str, col: SortColumn, app: &App) -> Span<'static> {
    if app.sort_column == col {
        let arrow = if app.sort_ascending { "↑" } else { "↓" };
        Span::raw(format!("{}{}", name, arrow))
    } else {
        Span::raw(name.to_string())
    }
}

/// A reading with its unit, e.g. `18.4 %` or `-1.20 bar`.
pub fn format_reading(metric: Metric, value: f64) -> String {
    match metric {
        Metric::PressaoQueimador => format!("{:.2} {}", value, metric.unit()),
        _ => format!("{:.1} {}", value, metric.unit()),
    }
}

/// Sort dryers by the given column and direction.
pub fn sort_dryers_by(dryers: &mut [&DryerReading], column: SortColumn, ascending: bool) {
    dryers.sort_by(|a, b| {
        let primary = match column {
            SortColumn::Name => a.name.cmp(&b.name),
            SortColumn::Unit => a.unit.cmp(&b.unit),
            SortColumn::Status => a.health.cmp(&b.health),
        };

        let primary = if ascending {
            primary
        } else {
            primary.reverse()
        };

        // Secondary sort by name for stability when primary values are equal
        primary.then_with(|| a.name.cmp(&b.name))
    });
}
