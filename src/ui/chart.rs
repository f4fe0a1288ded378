//! History view rendering.
//!
//! A line chart of the selected metrics over the filtered history of the
//! selected dryer, next to the metric checklist and the active date range.

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::{Metric, SeriesPoint};

/// Render the History view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::horizontal([Constraint::Min(30), Constraint::Length(30)]).split(area);

    render_chart(frame, app, chunks[0]);
    render_sidebar(frame, app, chunks[1]);
}

fn render_chart(frame: &mut Frame, app: &App, area: Rect) {
    let dryer_name = app.selected_dryer().map(|d| d.name.clone()).unwrap_or_default();
    let block = Block::default()
        .title(format!(" {} · {} ", dryer_name, app.range.describe()))
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    let series = app.series();
    if series.is_empty() {
        let msg = Paragraph::new("No history for this period")
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(msg, area);
        return;
    }

    let lines = chart_lines(&series, app.selection.metrics());
    let datasets: Vec<Dataset> = lines
        .iter()
        .map(|(metric, points)| {
            Dataset::default()
                .name(metric.definition().short_label)
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(app.theme.metric_color(*metric)))
                .data(points)
        })
        .collect();

    let [y_min, y_max] = y_bounds(&lines);
    let x_max = (series.len().saturating_sub(1)).max(1) as f64;

    let x_labels: Vec<Span> = time_labels(&series)
        .into_iter()
        .map(Span::raw)
        .collect();
    let y_labels: Vec<Span> = [y_min, (y_min + y_max) / 2.0, y_max]
        .iter()
        .map(|v| Span::raw(format!("{:.1}", v)))
        .collect();

    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .style(Style::default().fg(app.theme.border))
                .bounds([0.0, x_max])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(app.theme.border))
                .bounds([y_min, y_max])
                .labels(y_labels),
        );

    frame.render_widget(chart, area);
}

fn render_sidebar(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines: Vec<Line> = Metric::SERIES
        .iter()
        .enumerate()
        .map(|(i, &metric)| {
            let checked = if app.selection.contains(metric) { "[x]" } else { "[ ]" };
            let cursor = if i == app.metric_cursor { "▶ " } else { "  " };
            let mut style = Style::default().fg(app.theme.metric_color(metric));
            if i == app.metric_cursor {
                style = style.add_modifier(Modifier::BOLD);
            }
            Line::from(vec![
                Span::raw(cursor),
                Span::raw(format!("{} ", checked)),
                Span::styled(metric.definition().short_label, style),
            ])
        })
        .collect();

    let bound = |d: Option<chrono::NaiveDate>| d.map_or_else(|| "-".to_string(), |d| d.to_string());
    lines.push(Line::from(""));
    lines.push(Line::from(vec![Span::styled("Period", app.theme.header)]));
    lines.push(Line::from(format!(" from {}", bound(app.range.start))));
    lines.push(Line::from(format!(" to   {}", bound(app.range.end))));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        " [ ] start  { } end",
        Style::default().add_modifier(Modifier::DIM),
    )));
    lines.push(Line::from(Span::styled(
        " t today  x all  e export",
        Style::default().add_modifier(Modifier::DIM),
    )));

    let sidebar = Paragraph::new(lines).block(
        Block::default()
            .title(" Metrics ")
            .borders(Borders::ALL)
            .border_type(app.theme.border_type)
            .border_style(Style::default().fg(app.theme.border)),
    );
    frame.render_widget(sidebar, area);
}

/// One line of `(point index, value)` pairs per selected metric.
///
/// Points without a value for a metric are left out of its line.
pub fn chart_lines(series: &[SeriesPoint], metrics: &[Metric]) -> Vec<(Metric, Vec<(f64, f64)>)> {
    metrics
        .iter()
        .map(|&metric| {
            let points = series
                .iter()
                .enumerate()
                .filter_map(|(i, p)| p.value(metric).map(|v| (i as f64, v)))
                .collect();
            (metric, points)
        })
        .collect()
}

/// Y axis bounds covering every plotted value with a small margin.
pub fn y_bounds(lines: &[(Metric, Vec<(f64, f64)>)]) -> [f64; 2] {
    let values = lines.iter().flat_map(|(_, points)| points.iter().map(|(_, y)| *y));
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });

    if !min.is_finite() || !max.is_finite() {
        return [0.0, 1.0];
    }
    let span = max - min;
    let margin = if span > 0.0 { span * 0.05 } else { min.abs().max(1.0) * 0.1 };
    [min - margin, max + margin]
}

/// First, middle and last time labels.
fn time_labels(series: &[SeriesPoint]) -> Vec<String> {
    match series.len() {
        0 => Vec::new(),
        1 => vec![series[0].time.clone()],
        n => vec![
            series[0].time.clone(),
            series[n / 2].time.clone(),
            series[n - 1].time.clone(),
        ],
    }
}
