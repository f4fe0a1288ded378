//! Application state and navigation logic.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use chrono::{Duration, Local, NaiveDate};

use crate::data::export::{export_report, report_filename};
use crate::data::{
    DashboardData, DateRange, DryerReading, Metric, MetricSelection, SeriesPoint, TelemetryRecord,
};
use crate::source::{DataSource, HistoryQuery};
use crate::ui::panel::{sort_dryers_by, SortColumn};
use crate::ui::Theme;

/// The current view/tab in the TUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Table of all dryers with their live readings.
    Dryers,
    /// Diagram of the selected dryer with a badge per metric.
    Schematic,
    /// Chart of the selected dryer's history.
    History,
}

impl View {
    /// Cycle to the next view.
    pub fn next(self) -> Self {
        match self {
            View::Dryers => View::Schematic,
            View::Schematic => View::History,
            View::History => View::Dryers,
        }
    }

    /// Cycle to the previous view.
    pub fn prev(self) -> Self {
        match self {
            View::Dryers => View::History,
            View::Schematic => View::Dryers,
            View::History => View::Schematic,
        }
    }

    /// Returns the display label for this view.
    pub fn label(&self) -> &'static str {
        match self {
            View::Dryers => "Dryers",
            View::Schematic => "Schematic",
            View::History => "History",
        }
    }
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub current_view: View,
    pub show_help: bool,

    // Data source
    source: Box<dyn DataSource>,
    pub data: Option<DashboardData>,
    pub load_error: Option<String>,

    // Navigation state (visual index into the filtered, sorted dryer list)
    pub selected_dryer_index: usize,

    // Sorting (Dryers view)
    pub sort_column: SortColumn,
    pub sort_ascending: bool,

    // Search/filter
    pub filter_text: String,
    pub filter_active: bool,

    // History view
    pub range: DateRange,
    pub selection: MetricSelection,
    /// Index into [`Metric::SERIES`] of the metric under the cursor.
    pub metric_cursor: usize,
    last_query: Option<HistoryQuery>,

    /// Directory CSV reports are written to.
    pub export_dir: PathBuf,

    // UI
    pub theme: Theme,

    // Status message (temporary feedback)
    pub status_message: Option<(String, std::time::Instant)>,
}

impl App {
    /// Create a new App with the given data source.
    pub fn new(source: Box<dyn DataSource>) -> Self {
        Self::with_theme(source, Theme::auto_detect())
    }

    /// Create a new App with an explicit theme.
    pub fn with_theme(source: Box<dyn DataSource>, theme: Theme) -> Self {
        Self {
            running: true,
            current_view: View::Dryers,
            show_help: false,
            source,
            data: None,
            load_error: None,
            selected_dryer_index: 0,
            sort_column: SortColumn::default(),
            sort_ascending: false, // Default descending (critical first)
            filter_text: String::new(),
            filter_active: false,
            range: DateRange::default(),
            selection: MetricSelection::default(),
            metric_cursor: 0,
            last_query: None,
            export_dir: PathBuf::from("."),
            theme,
            status_message: None,
        }
    }

    /// Returns a description of the current data source.
    pub fn source_description(&self) -> &str {
        self.source.description()
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, std::time::Instant::now()));
    }

    /// Get the current status message if it hasn't expired (3 seconds).
    pub fn get_status_message(&self) -> Option<&str> {
        if let Some((msg, time)) = &self.status_message {
            if time.elapsed() < std::time::Duration::from_secs(3) {
                return Some(msg);
            }
        }
        None
    }

    /// Poll the data source for new data.
    ///
    /// Returns true if new data was received. The selected dryer is kept
    /// across refreshes even when its position in the list changes.
    pub fn reload_data(&mut self) -> bool {
        let snapshot = self.source.poll();
        self.load_error = self.source.error().map(str::to_string);

        let Some(snapshot) = snapshot else {
            return false;
        };

        let selected_name = self.selected_dryer().map(|d| d.name.clone());
        self.data = Some(DashboardData::from_snapshot(snapshot));

        let visible: Vec<String> = self.visible_dryers().iter().map(|d| d.name.clone()).collect();
        self.selected_dryer_index = selected_name
            .and_then(|name| visible.iter().position(|n| *n == name))
            .unwrap_or(self.selected_dryer_index)
            .min(visible.len().saturating_sub(1));

        self.sync_history_query();
        true
    }

    /// Tell the source which history window the History view needs.
    ///
    /// Called after anything that can change the selected dryer or the range.
    /// Only sends a request when the dryer or range actually changed.
    pub fn sync_history_query(&mut self) {
        let query = HistoryQuery {
            dryer: self.selected_dryer().map(|d| d.name.clone()),
            range: self.range,
        };
        if self.last_query.as_ref() != Some(&query) {
            self.source.request_history(query.clone());
            self.last_query = Some(query);
        }
    }

    /// Dryers after filtering and sorting, in display order.
    pub fn visible_dryers(&self) -> Vec<&DryerReading> {
        let Some(ref data) = self.data else {
            return Vec::new();
        };
        let mut dryers: Vec<&DryerReading> =
            data.dryers.iter().filter(|d| self.matches_filter(d)).collect();
        sort_dryers_by(&mut dryers, self.sort_column, self.sort_ascending);
        dryers
    }

    /// The dryer under the cursor.
    pub fn selected_dryer(&self) -> Option<&DryerReading> {
        self.visible_dryers().get(self.selected_dryer_index).copied()
    }

    /// History of the selected dryer, unfiltered.
    pub fn selected_history(&self) -> Vec<TelemetryRecord> {
        match (&self.data, self.selected_dryer()) {
            (Some(data), Some(dryer)) => data.history_for(dryer.dryer_id),
            _ => Vec::new(),
        }
    }

    /// Chart points of the selected dryer for the current range and metrics.
    pub fn series(&self) -> Vec<SeriesPoint> {
        match (&self.data, self.selected_dryer()) {
            (Some(data), Some(dryer)) => {
                data.series_for(dryer.dryer_id, self.selection.metrics(), Some(&self.range))
            }
            _ => Vec::new(),
        }
    }

    /// Switch to the next view.
    pub fn next_view(&mut self) {
        self.current_view = self.current_view.next();
    }

    /// Switch to the previous view.
    pub fn prev_view(&mut self) {
        self.current_view = self.current_view.prev();
    }

    /// Switch to a specific view.
    pub fn set_view(&mut self, view: View) {
        self.current_view = view;
    }

    /// Move selection down by one item.
    pub fn select_next(&mut self) {
        self.select_next_n(1);
    }

    /// Move selection up by one item.
    pub fn select_prev(&mut self) {
        self.select_prev_n(1);
    }

    /// Move selection down by n items.
    ///
    /// The History view moves the metric cursor; the other views move
    /// the dryer selection.
    pub fn select_next_n(&mut self, n: usize) {
        match self.current_view {
            View::History => {
                let max = Metric::SERIES.len() - 1;
                self.metric_cursor = (self.metric_cursor + n).min(max);
            }
            View::Dryers | View::Schematic => {
                let max = self.visible_dryers().len().saturating_sub(1);
                self.selected_dryer_index = (self.selected_dryer_index + n).min(max);
                self.sync_history_query();
            }
        }
    }

    /// Move selection up by n items.
    pub fn select_prev_n(&mut self, n: usize) {
        match self.current_view {
            View::History => {
                self.metric_cursor = self.metric_cursor.saturating_sub(n);
            }
            View::Dryers | View::Schematic => {
                self.selected_dryer_index = self.selected_dryer_index.saturating_sub(n);
                self.sync_history_query();
            }
        }
    }

    /// Jump to the first item in the list.
    pub fn select_first(&mut self) {
        self.select_prev_n(usize::MAX);
    }

    /// Jump to the last item in the list.
    pub fn select_last(&mut self) {
        self.select_next_n(usize::MAX / 2);
    }

    /// Open the schematic of the selected dryer.
    pub fn enter_schematic(&mut self) {
        if self.current_view == View::Dryers && self.selected_dryer().is_some() {
            self.current_view = View::Schematic;
        }
    }

    /// Navigate back to the dryer list.
    pub fn go_back(&mut self) {
        self.current_view = View::Dryers;
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Cycle to the next sort column.
    pub fn cycle_sort(&mut self) {
        self.sort_column = self.sort_column.next();
        self.sync_history_query();
    }

    /// Toggle sort direction between ascending and descending.
    pub fn toggle_sort_direction(&mut self) {
        self.sort_ascending = !self.sort_ascending;
        self.sync_history_query();
    }

    /// Enter filter input mode (starts capturing keystrokes for search).
    pub fn start_filter(&mut self) {
        self.filter_active = true;
    }

    /// Exit filter input mode without clearing the filter text.
    pub fn cancel_filter(&mut self) {
        self.filter_active = false;
    }

    /// Clear the filter text and exit filter mode.
    pub fn clear_filter(&mut self) {
        self.filter_text.clear();
        self.filter_active = false;
        self.sync_history_query();
    }

    /// Append a character to the filter text.
    pub fn filter_push(&mut self, c: char) {
        self.filter_text.push(c);
        self.selected_dryer_index = 0;
        self.sync_history_query();
    }

    /// Remove the last character from the filter text.
    pub fn filter_pop(&mut self) {
        self.filter_text.pop();
        self.sync_history_query();
    }

    /// Check if a dryer matches the current filter (name or unit).
    pub fn matches_filter(&self, dryer: &DryerReading) -> bool {
        if self.filter_text.is_empty() {
            return true;
        }
        let search = self.filter_text.to_lowercase();
        dryer.name.to_lowercase().contains(&search) || dryer.unit.to_lowercase().contains(&search)
    }

    /// Toggle the metric under the cursor in the chart selection.
    pub fn toggle_metric(&mut self) {
        let metric = Metric::SERIES[self.metric_cursor.min(Metric::SERIES.len() - 1)];
        if !self.selection.toggle(metric) {
            self.set_status_message("At least one metric must stay selected".to_string());
        }
    }

    /// Move the start date by `days`, seeding it when unset.
    ///
    /// The end date is pushed along so the range never inverts.
    pub fn shift_start(&mut self, days: i64) {
        let start = self.range.start.unwrap_or_else(|| self.anchor_date()) + Duration::days(days);
        self.range.start = Some(start);
        if self.range.end.is_some_and(|end| end < start) {
            self.range.end = Some(start);
        }
        self.sync_history_query();
    }

    /// Move the end date by `days`, seeding it when unset.
    ///
    /// The start date is pulled along so the range never inverts.
    pub fn shift_end(&mut self, days: i64) {
        let end = self.range.end.unwrap_or_else(|| self.anchor_date()) + Duration::days(days);
        self.range.end = Some(end);
        if self.range.start.is_some_and(|start| start > end) {
            self.range.start = Some(end);
        }
        self.sync_history_query();
    }

    /// Show only today's records.
    pub fn set_today(&mut self) {
        self.range = DateRange::day(Local::now().date_naive());
        self.sync_history_query();
    }

    /// Remove both date bounds.
    pub fn clear_dates(&mut self) {
        self.range = DateRange::default();
        self.sync_history_query();
    }

    /// Starting point for an unset bound: the other bound, else the day of
    /// the newest record, else today.
    fn anchor_date(&self) -> NaiveDate {
        self.range
            .start
            .or(self.range.end)
            .or_else(|| self.selected_history().iter().map(|r| r.timestamp.date()).max())
            .unwrap_or_else(|| Local::now().date_naive())
    }

    /// Export the selected dryer's filtered history as a CSV report.
    ///
    /// Returns the path written.
    pub fn export_csv(&self) -> Result<PathBuf> {
        let Some(dryer) = self.selected_dryer() else {
            bail!("No dryer selected");
        };
        let path = self.export_dir.join(report_filename(&dryer.name, &self.range));
        export_report(&path, &self.selected_history(), Some(&self.range))?;
        Ok(path)
    }

    /// Export and report the outcome in the status bar.
    pub fn export_with_feedback(&mut self) {
        match self.export_csv() {
            Ok(path) => self.set_status_message(format!("Exported to {}", display(&path))),
            Err(e) => self.set_status_message(format!("Export failed: {}", e)),
        }
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }
}

fn display(path: &Path) -> String {
    path.strip_prefix(".").unwrap_or(path).display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Severity;
    use crate::source::{
        ChannelSource, DashboardSnapshot, RawValue, SerializedDryerCard, SerializedHistoryRow,
    };
    use std::sync::{Arc, Mutex};
    use tokio::sync::watch;

    /// Source that hands out one snapshot and remembers history requests.
    #[derive(Debug)]
    struct RecordingSource {
        pending: Option<DashboardSnapshot>,
        requests: Arc<Mutex<Vec<HistoryQuery>>>,
    }

    impl DataSource for RecordingSource {
        fn poll(&mut self) -> Option<DashboardSnapshot> {
            self.pending.take()
        }

        fn description(&self) -> &str {
            "recording"
        }

        fn error(&self) -> Option<&str> {
            None
        }

        fn request_history(&mut self, query: HistoryQuery) {
            self.requests.lock().unwrap().push(query);
        }
    }

    fn recording_app() -> (Arc<Mutex<Vec<HistoryQuery>>>, App) {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let source = RecordingSource {
            pending: Some(snapshot()),
            requests: Arc::clone(&requests),
        };
        let mut app = App::with_theme(Box::new(source), Theme::dark());
        assert!(app.reload_data());
        (requests, app)
    }

    fn last_requested(requests: &Mutex<Vec<HistoryQuery>>) -> Option<String> {
        requests.lock().unwrap().last().and_then(|q| q.dryer.clone())
    }

    fn card(id: u64, name: &str, temp_queimador: f64) -> SerializedDryerCard {
        SerializedDryerCard {
            id_secador: Some(RawValue::Number(id as f64)),
            status: Some(RawValue::Text("1".to_string())),
            unidade: Some("Penha".to_string()),
            secador: Some(name.to_string()),
            temp_queimador: Some(RawValue::Number(temp_queimador)),
            ..Default::default()
        }
    }

    fn row(id: u64, time: &str, umidade: f64) -> SerializedHistoryRow {
        SerializedHistoryRow {
            id_secador: Some(RawValue::Number(id as f64)),
            time_update: Some(time.to_string()),
            umidade_entrada: Some(RawValue::Number(umidade)),
            ..Default::default()
        }
    }

    fn snapshot() -> DashboardSnapshot {
        DashboardSnapshot {
            dryers: vec![card(1, "Secador A", 500.0), card(2, "Secador B", 720.0)],
            history: vec![
                row(1, "2024-01-01 08:00:00", 20.0),
                row(1, "2024-01-02 09:00:00", 19.0),
                row(2, "2024-01-02 10:00:00", 25.0),
            ],
            ..Default::default()
        }
    }

    fn app_with(snapshot: DashboardSnapshot) -> (watch::Sender<DashboardSnapshot>, App) {
        let (tx, source) = ChannelSource::create("test");
        tx.send(snapshot).unwrap();
        let mut app = App::with_theme(Box::new(source), Theme::dark());
        assert!(app.reload_data());
        (tx, app)
    }

    #[test]
    fn test_view_cycle() {
        assert_eq!(View::Dryers.next(), View::Schematic);
        assert_eq!(View::History.next(), View::Dryers);
        assert_eq!(View::Dryers.prev(), View::History);
        assert_eq!(View::Schematic.label(), "Schematic");
    }

    #[test]
    fn test_critical_dryer_listed_first() {
        let (_tx, app) = app_with(snapshot());
        let names: Vec<&str> = app.visible_dryers().iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Secador B", "Secador A"]);
        assert_eq!(app.selected_dryer().unwrap().health, Severity::Critical);
    }

    #[test]
    fn test_filter_matches_name() {
        let (_tx, mut app) = app_with(snapshot());
        for c in "dor a".chars() {
            app.filter_push(c);
        }
        let visible = app.visible_dryers();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].name, "Secador A");

        app.clear_filter();
        assert_eq!(app.visible_dryers().len(), 2);
    }

    #[test]
    fn test_filter_changes_request_history_of_selected_dryer() {
        let (requests, mut app) = recording_app();
        assert_eq!(last_requested(&requests).as_deref(), Some("Secador B"));

        app.filter_push(' ');
        app.filter_push('a');
        assert_eq!(app.selected_dryer().unwrap().name, "Secador A");
        assert_eq!(last_requested(&requests).as_deref(), Some("Secador A"));

        app.filter_pop();
        assert_eq!(app.selected_dryer().unwrap().name, "Secador B");
        assert_eq!(last_requested(&requests).as_deref(), Some("Secador B"));

        app.filter_push('a');
        assert_eq!(last_requested(&requests).as_deref(), Some("Secador A"));
        app.clear_filter();
        assert_eq!(last_requested(&requests).as_deref(), Some("Secador B"));
    }

    #[test]
    fn test_sort_changes_request_history_of_selected_dryer() {
        let (requests, mut app) = recording_app();
        assert_eq!(last_requested(&requests).as_deref(), Some("Secador B"));

        // Status ascending puts the normal dryer first
        app.toggle_sort_direction();
        assert_eq!(app.selected_dryer().unwrap().name, "Secador A");
        assert_eq!(last_requested(&requests).as_deref(), Some("Secador A"));

        app.toggle_sort_direction();
        assert_eq!(last_requested(&requests).as_deref(), Some("Secador B"));

        // Name descending keeps Secador B on top, no new request
        let sent = requests.lock().unwrap().len();
        app.cycle_sort();
        assert_eq!(requests.lock().unwrap().len(), sent);

        // Equal units fall back to name order
        app.cycle_sort();
        assert_eq!(app.sort_column, SortColumn::Unit);
        assert_eq!(last_requested(&requests).as_deref(), Some("Secador A"));
    }

    #[test]
    fn test_selection_follows_dryer_across_reloads() {
        let (tx, mut app) = app_with(snapshot());
        app.select_next();
        assert_eq!(app.selected_dryer().unwrap().name, "Secador A");

        // Secador A turns critical and moves to the top
        let mut next = snapshot();
        next.dryers[0] = card(1, "Secador A", 800.0);
        next.dryers[1] = card(2, "Secador B", 500.0);
        tx.send(next).unwrap();

        assert!(app.reload_data());
        assert_eq!(app.selected_dryer_index, 0);
        assert_eq!(app.selected_dryer().unwrap().name, "Secador A");
    }

    #[test]
    fn test_series_uses_selected_dryer_and_range() {
        let (_tx, mut app) = app_with(snapshot());
        app.select_next(); // Secador A
        assert_eq!(app.series().len(), 2);

        app.range = DateRange::new(NaiveDate::from_ymd_opt(2024, 1, 2), None);
        let series = app.series();
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].time, "09:00:00");
        assert_eq!(series[0].value(Metric::UmidadeEntrada), Some(19.0));
    }

    #[test]
    fn test_history_view_moves_metric_cursor() {
        let (_tx, mut app) = app_with(snapshot());
        app.set_view(View::History);
        app.select_next();
        app.toggle_metric();
        assert!(app.selection.contains(Metric::SERIES[1]));
        assert_eq!(app.selected_dryer_index, 0);

        app.select_last();
        assert_eq!(app.metric_cursor, Metric::SERIES.len() - 1);
        app.select_first();
        assert_eq!(app.metric_cursor, 0);
    }

    #[test]
    fn test_last_metric_cannot_be_removed() {
        let (_tx, mut app) = app_with(snapshot());
        app.set_view(View::History);
        app.toggle_metric();
        assert_eq!(app.selection.metrics(), &[Metric::UmidadeEntrada]);
        assert!(app.get_status_message().is_some());
    }

    #[test]
    fn test_date_shifts_keep_range_ordered() {
        let (_tx, mut app) = app_with(snapshot());
        app.select_next(); // Secador A, newest record on 2024-01-02

        app.shift_start(0);
        assert_eq!(app.range.start, NaiveDate::from_ymd_opt(2024, 1, 2));

        app.shift_end(-1);
        assert_eq!(app.range.end, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(app.range.start, NaiveDate::from_ymd_opt(2024, 1, 1));

        app.shift_start(2);
        assert_eq!(app.range.start, NaiveDate::from_ymd_opt(2024, 1, 3));
        assert_eq!(app.range.end, NaiveDate::from_ymd_opt(2024, 1, 3));

        app.clear_dates();
        assert!(app.range.is_unbounded());
    }

    #[test]
    fn test_export_csv_writes_report() {
        let dir = tempfile::tempdir().unwrap();
        let (_tx, mut app) = app_with(snapshot());
        app.export_dir = dir.path().to_path_buf();
        app.select_next(); // Secador A

        let path = app.export_csv().unwrap();
        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "Relatorio_Secador_A_todos_todos.csv"
        );
        let content = std::fs::read_to_string(path).unwrap();
        assert_eq!(content.lines().count(), 3);
    }

    #[test]
    fn test_export_without_data_fails() {
        let dir = tempfile::tempdir().unwrap();
        let (_tx, mut app) = app_with(snapshot());
        app.export_dir = dir.path().to_path_buf();
        app.range = DateRange::day(NaiveDate::from_ymd_opt(2023, 6, 1).unwrap());

        assert!(app.export_csv().is_err());
        app.export_with_feedback();
        assert!(app.get_status_message().unwrap().starts_with("Export failed"));
    }

    #[test]
    fn test_enter_schematic_and_back() {
        let (_tx, mut app) = app_with(snapshot());
        app.enter_schematic();
        assert_eq!(app.current_view, View::Schematic);
        app.go_back();
        assert_eq!(app.current_view, View::Dryers);
    }
}
