//! Ratatui-based terminal UI.
//!
//! The TUI shows the files that will be uploaded, the itemized receipts of the
//! last successful upload, and a bar chart of spending by date.

use std::io;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};

use crate::cli::TuiArgs;
use crate::cli::picker::{discover_receipt_files, pretty_path};
use crate::domain::{ChartSeries, ReceiptRecord, SERIES_CAPTION};
use crate::error::AppError;
use crate::report::fmt_money;
use crate::state::ViewState;
use crate::upload::UploadClient;

mod plotters_chart;

use plotters_chart::SpendingBarsChart;

/// Start the TUI.
pub fn run(args: TuiArgs) -> Result<(), AppError> {
    let client = UploadClient::from_env(args.endpoint.endpoint.as_deref())?;
    let files = if args.files.is_empty() {
        discover_receipt_files()
    } else {
        args.files
    };

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::terminal(format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(client, files);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::terminal(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::terminal(format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

type UploadResult = Result<Vec<ReceiptRecord>, AppError>;

struct App {
    client: UploadClient,
    state: ViewState,
    selected_receipt: usize,
    /// Result channel of the upload in flight, if any.
    inflight: Option<Receiver<UploadResult>>,
    status: String,
}

impl App {
    fn new(client: UploadClient, files: Vec<PathBuf>) -> Self {
        let mut state = ViewState::new();
        let status = format!("{} file(s) selected. Press u to upload.", files.len());
        state.select_files(files);
        Self {
            client,
            state,
            selected_receipt: 0,
            inflight: None,
            status,
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if self.poll_upload() {
                needs_redraw = true;
            }

            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::terminal(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::terminal(format!("Event poll error: {e}")))? {
                continue;
            }

            match event::read().map_err(|e| AppError::terminal(format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the app should exit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up => {
                self.selected_receipt = self.selected_receipt.saturating_sub(1);
            }
            KeyCode::Down => {
                if self.selected_receipt + 1 < self.state.records().len() {
                    self.selected_receipt += 1;
                }
            }
            KeyCode::Char('u') => {
                if self.inflight.is_some() {
                    self.status = "Upload still in progress. Press q to quit.".to_string();
                } else if self.state.selected_files().is_empty() {
                    self.status = "No files selected. Press o to rescan.".to_string();
                } else {
                    self.start_upload();
                }
            }
            KeyCode::Char('o') => {
                self.state.select_files(discover_receipt_files());
                self.status = format!("Rescanned: {} file(s) selected.", self.state.selected_files().len());
            }
            _ => {}
        }
        false
    }

    /// Send the current selection on a worker thread.
    ///
    /// The request has no deadline, so the event loop never waits on it; the
    /// result arrives through `inflight`.
    fn start_upload(&mut self) {
        let files = self.state.selected_files().to_vec();
        self.status = format!("Uploading {} file(s) to {}...", files.len(), self.client.endpoint());

        let (tx, rx) = mpsc::channel();
        let client = self.client.clone();
        thread::spawn(move || {
            // The receiver is gone when the app quit first.
            let _ = tx.send(client.upload(&files));
        });
        self.inflight = Some(rx);
    }

    /// Apply a finished upload, if there is one. Returns `true` when the view
    /// changed.
    fn poll_upload(&mut self) -> bool {
        let Some(rx) = &self.inflight else {
            return false;
        };
        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return false,
            Err(TryRecvError::Disconnected) => Err(AppError::transport("Upload worker exited without a result")),
        };
        self.inflight = None;

        match self.state.apply_upload(result) {
            Ok(()) => {
                self.selected_receipt = 0;
                self.status = format!(
                    "Parsed {} receipt(s) across {} date(s).",
                    self.state.records().len(),
                    self.state.series().map_or(0, ChartSeries::len)
                );
            }
            Err(err) => {
                // Previous results stay on screen.
                self.status = format!("Upload failed: {err}");
            }
        }
        true
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("receipts", Style::default().fg(Color::Cyan)),
            Span::raw(" | Receipt Analyzer"),
        ]));

        let uploaded = self
            .state
            .uploaded_at()
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string());

        let files = self
            .state
            .selected_files()
            .iter()
            .map(|p| pretty_path(p))
            .collect::<Vec<_>>()
            .join(", ");

        lines.push(Line::from(Span::styled(
            format!(
                "endpoint: {} | last upload: {uploaded} | files: {}",
                self.client.endpoint(),
                if files.is_empty() { "-".to_string() } else { files },
            ),
            Style::default().fg(Color::Gray),
        )));

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(area);

        self.draw_receipts(frame, chunks[0]);
        self.draw_chart(frame, chunks[1]);
    }

    fn draw_receipts(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Parsed Receipt Data").borders(Borders::ALL);

        if !self.state.has_results() {
            let msg = Paragraph::new("No receipts yet.")
                .style(Style::default().fg(Color::Yellow))
                .block(block);
            frame.render_widget(msg, area);
            return;
        }

        let items: Vec<ListItem> = self
            .state
            .records()
            .iter()
            .map(|record| {
                let mut lines = vec![Line::from(Span::styled(
                    format!("Date: {}", record.date_label()),
                    Style::default().add_modifier(Modifier::BOLD),
                ))];
                for line in record.line_items() {
                    lines.push(Line::from(format!("  {}: {}", line.item, fmt_money(line.price))));
                }
                lines.push(Line::from(Span::styled(
                    format!("Total: {}", fmt_money(record.effective_total())),
                    Style::default().fg(Color::Cyan),
                )));
                ListItem::new(Text::from(lines))
            })
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ListState::default();
        state.select(Some(self.selected_receipt));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Spending Trends").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(series) = self.state.series().filter(|_| self.state.has_chart()) else {
            let msg = Paragraph::new("Upload receipts to see spending by date.")
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default());
            frame.render_widget(msg, inner);
            return;
        };

        let y_max = chart_y_max(series);
        let (chart_rect, insets) = chart_layout(inner);
        let widget = SpendingBarsChart {
            values: &series.values,
            y_max,
        };

        frame.render_widget(widget, chart_rect);
        if let Some(insets) = insets {
            draw_axis_labels(frame, inner, chart_rect, insets, series, y_max);
        }
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "u upload  o rescan files  ↑/↓ scroll  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Y-axis top: the largest bar plus 10% headroom.
fn chart_y_max(series: &ChartSeries) -> f64 {
    match series.max_value() {
        Some(max) if max.is_finite() && max > 0.0 => max * 1.1,
        _ => 1.0,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct AxisInsets {
    left: u16,
    right: u16,
    top: u16,
    bottom: u16,
}

fn chart_layout(inner: Rect) -> (Rect, Option<AxisInsets>) {
    let insets = AxisInsets {
        left: 9,
        right: 1,
        top: 1,
        bottom: 2,
    };

    if inner.width <= insets.left + insets.right + 10
        || inner.height <= insets.top + insets.bottom + 4
    {
        return (inner, None);
    }

    let rect = Rect {
        x: inner.x + insets.left,
        y: inner.y + insets.top,
        width: inner.width - insets.left - insets.right,
        height: inner.height - insets.top - insets.bottom,
    };

    (rect, Some(insets))
}

/// Column and text for each date label under its bar.
///
/// Labels are truncated to their slot; when slots are narrower than three
/// cells only every k-th label is kept.
fn bar_labels(chart: Rect, labels: &[String]) -> Vec<(u16, String)> {
    let n = labels.len();
    if n == 0 || chart.width == 0 {
        return Vec::new();
    }

    let slot = chart.width as f64 / n as f64;
    let stride = if slot >= 3.0 { 1 } else { (3.0 / slot).ceil() as usize };
    let max_chars = ((slot * stride as f64) as usize).saturating_sub(1).max(1);

    labels
        .iter()
        .enumerate()
        .step_by(stride)
        .map(|(i, label)| {
            let text = truncate(label, max_chars);
            let center = chart.x as f64 + (i as f64 + 0.5) * slot;
            let start = (center - text.chars().count() as f64 / 2.0).floor().max(chart.x as f64) as u16;
            (start, text)
        })
        .collect()
}

fn draw_axis_labels(
    frame: &mut ratatui::Frame<'_>,
    inner: Rect,
    chart: Rect,
    insets: AxisInsets,
    series: &ChartSeries,
    y_max: f64,
) {
    let ticks = 5usize;
    let style = Style::default().fg(Color::Gray);

    let y = chart.y + chart.height;
    if y < inner.y + inner.height {
        for (x, label) in bar_labels(chart, &series.labels) {
            let width = (label.chars().count() as u16).min((inner.x + inner.width).saturating_sub(x));
            frame.render_widget(
                Paragraph::new(label).style(style),
                Rect { x, y, width, height: 1 },
            );
        }
    }

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let y_val = u * y_max;
        let y = chart.y + (chart.height - 1) - ((chart.height - 1) as f64 * u).round() as u16;
        let label = fmt_money(y_val);
        let label_len = label.len() as u16;
        let x = inner.x + insets.left.saturating_sub(1);
        let start = x.saturating_sub(label_len);
        if start < inner.x {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    let caption = Paragraph::new(SERIES_CAPTION)
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD));
    let caption_rect = Rect {
        x: chart.x,
        y: chart.y + chart.height + 1,
        width: chart.width,
        height: 1,
    };
    if caption_rect.y < inner.y + inner.height {
        frame.render_widget(caption, caption_rect);
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    use crate::upload::test_server::{refused_endpoint, serve_once, serve_silently, temp_receipt};

    /// Poll until the in-flight upload lands or `limit` passes.
    fn wait_for_upload(app: &mut App, limit: Duration) -> bool {
        let deadline = Instant::now() + limit;
        while Instant::now() < deadline {
            if app.poll_upload() {
                return true;
            }
            thread::sleep(Duration::from_millis(20));
        }
        false
    }

    #[test]
    fn hung_upload_keeps_keys_responsive() {
        let url = serve_silently();
        let file = temp_receipt("tui-hung.jpg", b"receipt");
        let mut app = App::new(UploadClient::new(&url).unwrap(), vec![file.clone()]);

        let started = Instant::now();
        assert!(!app.handle_key(KeyCode::Char('u')));
        assert!(app.inflight.is_some());
        assert!(app.status.starts_with("Uploading 1 file(s)"));

        assert!(!wait_for_upload(&mut app, Duration::from_millis(300)));
        assert!(app.inflight.is_some());
        assert!(!app.state.has_results());

        // A second upload is refused while one is pending.
        assert!(!app.handle_key(KeyCode::Char('u')));
        assert!(app.status.contains("still in progress"));

        assert!(!app.handle_key(KeyCode::Down));
        assert!(app.handle_key(KeyCode::Char('q')));
        assert!(started.elapsed() < Duration::from_secs(5));

        let _ = std::fs::remove_file(file);
    }

    #[test]
    fn finished_upload_replaces_receipts() {
        let body = r#"{"data":[
            {"Date":"2024-01-01","Items":["Coffee"],"Prices":[3.0],"Total":null},
            {"Date":"2024-01-01","Items":["Tea"],"Prices":[2.0],"Total":null},
            {"Date":null,"Items":["Snack"],"Prices":[1.0],"Total":1.0}
        ]}"#;
        let (url, server) = serve_once("200 OK", body);
        let file = temp_receipt("tui-ok.jpg", b"receipt");
        let mut app = App::new(UploadClient::new(&url).unwrap(), vec![file.clone()]);
        app.selected_receipt = 2;

        app.handle_key(KeyCode::Char('u'));
        assert!(wait_for_upload(&mut app, Duration::from_secs(10)));

        assert!(app.inflight.is_none());
        assert_eq!(app.state.records().len(), 3);
        assert_eq!(app.selected_receipt, 0);
        let series = app.state.series().unwrap();
        assert_eq!(series.labels, vec!["2024-01-01", "Unknown"]);
        assert_eq!(series.values, vec![5.0, 1.0]);
        assert_eq!(app.status, "Parsed 3 receipt(s) across 2 date(s).");

        server.join().unwrap();
        let _ = std::fs::remove_file(file);
    }

    #[test]
    fn failed_upload_keeps_previous_receipts() {
        let file = temp_receipt("tui-refused.jpg", b"receipt");
        let mut app = App::new(UploadClient::new(&refused_endpoint()).unwrap(), vec![file.clone()]);
        app.state.replace(vec![ReceiptRecord {
            date: Some("d1".to_string()),
            items: vec!["Milk".to_string()],
            prices: vec![2.0],
            total: None,
        }]);

        app.handle_key(KeyCode::Char('u'));
        assert!(wait_for_upload(&mut app, Duration::from_secs(10)));

        assert!(app.inflight.is_none());
        assert!(app.status.starts_with("Upload failed"));
        assert_eq!(app.state.records().len(), 1);
        assert_eq!(app.state.series().unwrap().labels, vec!["d1"]);

        let _ = std::fs::remove_file(file);
    }

    #[test]
    fn upload_without_files_is_not_started() {
        let mut app = App::new(UploadClient::new(&refused_endpoint()).unwrap(), Vec::new());
        assert!(!app.handle_key(KeyCode::Char('u')));
        assert!(app.inflight.is_none());
        assert!(app.status.starts_with("No files selected"));
    }

    fn labels(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn y_max_leaves_headroom() {
        let series = ChartSeries {
            labels: labels(&["a", "b"]),
            values: vec![5.0, 10.0],
        };
        assert!((chart_y_max(&series) - 11.0).abs() < 1e-9);
        assert_eq!(chart_y_max(&ChartSeries::default()), 1.0);
    }

    #[test]
    fn layout_falls_back_when_too_small() {
        let (rect, insets) = chart_layout(Rect::new(0, 0, 15, 5));
        assert_eq!(rect, Rect::new(0, 0, 15, 5));
        assert!(insets.is_none());

        let (rect, insets) = chart_layout(Rect::new(0, 0, 60, 20));
        assert_eq!(rect, Rect::new(9, 1, 50, 17));
        assert!(insets.is_some());
    }

    #[test]
    fn labels_are_centered_under_bars() {
        let chart = Rect::new(10, 0, 40, 10);
        let placed = bar_labels(chart, &labels(&["2024-01-01", "Unknown"]));
        assert_eq!(placed, vec![(15, "2024-01-01".to_string()), (36, "Unknown".to_string())]);
    }

    #[test]
    fn crowded_labels_are_thinned_and_truncated() {
        let chart = Rect::new(0, 0, 10, 10);
        let many: Vec<String> = (1..=10).map(|d| format!("2024-01-{d:02}")).collect();
        let placed = bar_labels(chart, &many);
        assert_eq!(placed.len(), 4);
        assert!(placed.iter().all(|(_, text)| text.chars().count() <= 2));
        assert!(bar_labels(chart, &[]).is_empty());
    }

    #[test]
    fn truncate_marks_cut_labels() {
        assert_eq!(truncate("Unknown", 10), "Unknown");
        assert_eq!(truncate("2024-01-01", 5), "2024.");
    }
}
