//! Ratatui-based terminal UI.
//!
//! The dashboard shows the census KPIs and cycles between three views:
//! an overview chart with the regime table, a live name search, and the
//! debris inventory.

use std::io;
use std::time::Duration;

use chrono::Utc;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Tabs},
    Terminal,
};
use tracing::{info, warn};

use crate::app::pipeline::{self, CensusRun};
use crate::config::Settings;
use crate::domain::{Category, OrbitRegime, RefreshPolicy};
use crate::error::AppError;
use crate::io::cache::SnapshotCache;
use crate::report::format::truncate;
use crate::report::{fmt_percent, search_by_name, target_report};

mod plotters_chart;

use plotters_chart::{y_upper_bound, CensusBarChart};

const DEBRIS_ROWS: usize = 100;

/// Start the TUI.
pub fn run(settings: Settings, refresh: RefreshPolicy) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::runtime(format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(settings, refresh);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::runtime(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::runtime(format!("Failed to enter alternate screen: {e}")));
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

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum View {
    Overview,
    Search,
    Debris,
}

impl View {
    const ALL: [View; 3] = [View::Overview, View::Search, View::Debris];

    fn title(self) -> &'static str {
        match self {
            View::Overview => "Overview",
            View::Search => "Search",
            View::Debris => "Debris",
        }
    }

    fn index(self) -> usize {
        match self {
            View::Overview => 0,
            View::Search => 1,
            View::Debris => 2,
        }
    }

    fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

struct App {
    settings: Settings,
    cache: SnapshotCache,
    run: Option<CensusRun>,
    view: View,
    search_input: String,
    editing_search: bool,
    /// Scroll offset for the list of the current view.
    offset: usize,
    /// Load to run after the next draw, so its status line is on screen while
    /// a blocking fetch is in progress.
    pending_load: Option<RefreshPolicy>,
    status: String,
}

impl App {
    /// The initial load with `refresh` runs after the first frame is drawn.
    fn new(settings: Settings, refresh: RefreshPolicy) -> Self {
        let cache = SnapshotCache::new(&settings.data_dir);
        Self {
            settings,
            cache,
            run: None,
            view: View::Overview,
            search_input: String::new(),
            editing_search: false,
            offset: 0,
            pending_load: Some(refresh),
            status: "Loading catalog...".to_string(),
        }
    }

    /// Load a snapshot with `policy`. Failures end up in the status line; the
    /// previous run (if any) stays on screen.
    fn load(&mut self, policy: RefreshPolicy) {
        let settings = &self.settings;
        let loaded = pipeline::load_run(&self.cache, policy, settings.cache_ttl, || {
            crate::data::source_for(settings)
        });

        match loaded {
            Ok(run) => {
                self.status = format!(
                    "Loaded {} active, {} debris from {}",
                    run.active.records.len(),
                    run.debris.records.len(),
                    run.stamp.provider.display_name(),
                );
                info!(objects = run.census.total_objects, "dashboard data loaded");
                self.run = Some(run);
                self.offset = 0;
            }
            Err(err) => {
                warn!(error = %err, "dashboard load failed");
                self.status = err.message().to_string();
            }
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::runtime(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if let Some(policy) = self.pending_load.take() {
                self.load(policy);
                needs_redraw = true;
                continue;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::runtime(format!("Event poll error: {e}")))? {
                continue;
            }

            match event::read().map_err(|e| AppError::runtime(format!("Event read error: {e}")))? {
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

    /// Returns `true` when the user asked to quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.editing_search {
            self.handle_search_edit(code);
            return false;
        }

        match code {
            KeyCode::Char('q') => return true,
            KeyCode::Tab => self.switch_view(self.view.next()),
            KeyCode::BackTab => self.switch_view(self.view.prev()),
            KeyCode::Char('/') => {
                self.switch_view(View::Search);
                self.editing_search = true;
                self.status = "Type a name. Enter or Esc to finish.".to_string();
            }
            KeyCode::Char('r') => {
                self.status = "Reloading cache...".to_string();
                self.load(RefreshPolicy::Never);
            }
            KeyCode::Char('f') => {
                self.status = format!("Fetching from {}...", self.settings.provider.display_name());
                self.pending_load = Some(RefreshPolicy::Always);
            }
            KeyCode::Up => self.offset = self.offset.saturating_sub(1),
            KeyCode::Down => self.offset = self.offset.saturating_add(1).min(self.scroll_limit()),
            KeyCode::PageUp => self.offset = self.offset.saturating_sub(10),
            KeyCode::PageDown => self.offset = self.offset.saturating_add(10).min(self.scroll_limit()),
            _ => {}
        }

        false
    }

    fn handle_search_edit(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc | KeyCode::Enter => {
                self.editing_search = false;
                self.status = format!("{} matches", self.match_count());
            }
            KeyCode::Backspace => {
                self.search_input.pop();
                self.offset = 0;
            }
            KeyCode::Char(c) => {
                self.search_input.push(c);
                self.offset = 0;
            }
            _ => {}
        }
    }

    fn switch_view(&mut self, view: View) {
        self.view = view;
        self.offset = 0;
    }

    fn match_count(&self) -> usize {
        self.run
            .as_ref()
            .map(|run| search_by_name(run.records(Category::Active), &self.search_input).len())
            .unwrap_or(0)
    }

    fn scroll_limit(&self) -> usize {
        let Some(run) = &self.run else {
            return 0;
        };
        match self.view {
            View::Overview => 0,
            View::Search => self.match_count().saturating_sub(1),
            View::Debris => run.records(Category::Debris).len().min(DEBRIS_ROWS).saturating_sub(1),
        }
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_kpis(frame, chunks[1]);
        self.draw_tabs(frame, chunks[2]);
        match self.view {
            View::Overview => self.draw_overview(frame, chunks[3]),
            View::Search => self.draw_search(frame, chunks[3]),
            View::Debris => self.draw_debris(frame, chunks[3]),
        }
        self.draw_footer(frame, chunks[4]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("orbit", Style::default().fg(Color::Cyan)),
            Span::raw(" - Space Debris Monitoring"),
        ]));

        match &self.run {
            Some(run) => {
                let mut spans = vec![Span::styled(
                    format!(
                        "Source: {} | Data last updated: {}",
                        run.stamp.provider.display_name(),
                        run.stamp.caption(),
                    ),
                    Style::default().fg(Color::Gray),
                )];
                if run.is_stale(Utc::now(), self.settings.cache_ttl) {
                    spans.push(Span::styled(
                        " (stale, press f to fetch)",
                        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                    ));
                }
                lines.push(Line::from(spans));
            }
            None => lines.push(Line::from(Span::styled(
                format!("No data in {}", self.cache.dir().display()),
                Style::default().fg(Color::Yellow),
            ))),
        }

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_kpis(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, 3); 3])
            .split(area);

        let (objects, active, debris) = match &self.run {
            Some(run) => {
                let c = &run.census;
                (
                    c.total_objects.to_string(),
                    c.total_active.to_string(),
                    format!("{} ({} of total)", c.total_debris, fmt_percent(c.debris_fraction())),
                )
            }
            None => ("-".to_string(), "-".to_string(), "-".to_string()),
        };

        let tiles = [
            ("Objects in orbit", objects, Color::White),
            ("Active satellites", active, Color::Cyan),
            ("Debris", debris, Color::Red),
        ];
        for ((title, value, color), rect) in tiles.into_iter().zip(chunks.iter()) {
            let p = Paragraph::new(Span::styled(value, Style::default().fg(color).add_modifier(Modifier::BOLD)))
                .alignment(Alignment::Center)
                .block(Block::default().title(title).borders(Borders::ALL));
            frame.render_widget(p, *rect);
        }
    }

    fn draw_tabs(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let titles: Vec<&str> = View::ALL.iter().map(|v| v.title()).collect();
        let tabs = Tabs::new(titles)
            .select(self.view.index())
            .block(Block::default().borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White));
        frame.render_widget(tabs, area);
    }

    fn draw_overview(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(area);

        self.draw_chart(frame, chunks[0]);
        self.draw_regime_table(frame, chunks[1]);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Objects by orbit regime").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(run) = &self.run else {
            let msg = Paragraph::new("No census loaded. Press f to fetch.")
                .style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, inner);
            return;
        };

        let groups = chart_groups(run);
        let legend_rows = 2;
        if inner.height <= legend_rows {
            return;
        }
        let chart_rect = Rect {
            height: inner.height - legend_rows,
            ..inner
        };
        let widget = CensusBarChart {
            groups: &groups,
            y_max: y_upper_bound(&groups),
            y_label: "objects",
        };
        frame.render_widget(widget, chart_rect);

        draw_group_labels(frame, inner, chart_rect);
    }

    fn draw_regime_table(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Regimes").borders(Borders::ALL);
        let Some(run) = &self.run else {
            frame.render_widget(block, area);
            return;
        };
        let c = &run.census;

        let mut rows: Vec<Row> = OrbitRegime::ALL
            .iter()
            .map(|&regime| {
                Row::new(vec![
                    Cell::from(regime.label()),
                    Cell::from(regime.altitude_band()),
                    Cell::from(c.count(regime, Category::Active).to_string()),
                    Cell::from(c.count(regime, Category::Debris).to_string()),
                    Cell::from(c.regime_total(regime).to_string()),
                ])
            })
            .collect();
        rows.push(
            Row::new(vec![
                Cell::from("all"),
                Cell::from(""),
                Cell::from(c.total_active.to_string()),
                Cell::from(c.total_debris.to_string()),
                Cell::from(c.total_objects.to_string()),
            ])
            .style(Style::default().add_modifier(Modifier::BOLD)),
        );

        let excluded = c.excluded.total();
        if excluded > 0 {
            rows.push(Row::new(vec![
                Cell::from("n/a"),
                Cell::from("no mean motion"),
                Cell::from(c.excluded.active.to_string()),
                Cell::from(c.excluded.debris.to_string()),
                Cell::from(excluded.to_string()),
            ])
            .style(Style::default().fg(Color::DarkGray)));
        }

        let table = Table::new(
            rows,
            [
                Constraint::Length(5),
                Constraint::Min(10),
                Constraint::Length(8),
                Constraint::Length(8),
                Constraint::Length(8),
            ],
        )
        .header(
            Row::new(vec!["orbit", "altitude", "active", "debris", "total"])
                .style(Style::default().fg(Color::Gray)),
        )
        .block(block);
        frame.render_widget(table, area);
    }

    fn draw_search(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Length(6), Constraint::Min(0)])
            .split(area);

        let input_style = if self.editing_search {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        let cursor = if self.editing_search { "_" } else { "" };
        let input = Paragraph::new(format!("{}{cursor}", self.search_input))
            .style(input_style)
            .block(Block::default().title("Search active satellites (/)").borders(Borders::ALL));
        frame.render_widget(input, chunks[0]);

        let Some(run) = &self.run else {
            return;
        };

        let report_lines = match target_report(run, &self.search_input) {
            None if self.search_input.trim().is_empty() => vec![Line::from("Type a name, e.g. ISS, STARLINK, NOAA.")],
            None => vec![Line::from(Span::styled(
                format!("No active object matches '{}'.", self.search_input.trim()),
                Style::default().fg(Color::Yellow),
            ))],
            Some(report) => {
                let t = report.target;
                let orbit = match (report.regime, report.debris_in_regime) {
                    (Some(regime), Some(debris)) => format!(
                        "Orbit: {} ({}) | debris in {}: {}",
                        regime.label(),
                        regime.altitude_band(),
                        regime.label(),
                        debris,
                    ),
                    _ => "Orbit: unknown (no mean motion)".to_string(),
                };
                vec![
                    Line::from(Span::styled(
                        t.display_name().to_string(),
                        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                    )),
                    Line::from(format!(
                        "Catalog ID: {} | Epoch: {}",
                        t.catalog_id.map(|id| id.to_string()).unwrap_or_else(|| "-".to_string()),
                        t.epoch.as_deref().unwrap_or("-"),
                    )),
                    Line::from(orbit),
                ]
            }
        };
        let report = Paragraph::new(Text::from(report_lines))
            .block(Block::default().title("Report").borders(Borders::ALL));
        frame.render_widget(report, chunks[1]);

        let matches = search_by_name(run.records(Category::Active), &self.search_input);
        let visible = chunks[2].height.saturating_sub(3) as usize;
        let rows: Vec<Row> = matches
            .iter()
            .skip(self.offset)
            .take(visible)
            .map(|r| {
                Row::new(vec![
                    Cell::from(truncate(r.display_name(), 32)),
                    Cell::from(r.catalog_id.map(|id| id.to_string()).unwrap_or_else(|| "-".to_string())),
                    Cell::from(regime_label(r.mean_motion)),
                ])
            })
            .collect();
        let table = Table::new(rows, [Constraint::Min(20), Constraint::Length(12), Constraint::Length(6)])
            .header(Row::new(vec!["name", "catalog id", "orbit"]).style(Style::default().fg(Color::Gray)))
            .block(Block::default().title(format!("Matches ({})", matches.len())).borders(Borders::ALL));
        frame.render_widget(table, chunks[2]);
    }

    fn draw_debris(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let Some(run) = &self.run else {
            frame.render_widget(Block::default().title("Debris").borders(Borders::ALL), area);
            return;
        };
        let records = run.records(Category::Debris);
        let shown = records.len().min(DEBRIS_ROWS);
        let visible = area.height.saturating_sub(3) as usize;

        let rows: Vec<Row> = records
            .iter()
            .take(shown)
            .skip(self.offset)
            .take(visible)
            .map(|r| {
                Row::new(vec![
                    Cell::from(truncate(r.display_name(), 32)),
                    Cell::from(r.catalog_id.map(|id| id.to_string()).unwrap_or_else(|| "-".to_string())),
                    Cell::from(regime_label(r.mean_motion)),
                ])
            })
            .collect();

        let table = Table::new(rows, [Constraint::Min(20), Constraint::Length(12), Constraint::Length(6)])
            .header(Row::new(vec!["OBJECT_NAME", "NORAD_CAT_ID", "orbit"]).style(Style::default().fg(Color::Gray)))
            .block(
                Block::default()
                    .title(format!("Debris inventory (first {shown} of {})", records.len()))
                    .borders(Borders::ALL),
            );
        frame.render_widget(table, area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "Tab view  / search  ↑/↓ scroll  r reload  f fetch  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// `(active, debris)` per regime in canonical order.
fn chart_groups(run: &CensusRun) -> Vec<(usize, usize)> {
    OrbitRegime::ALL
        .iter()
        .map(|&r| (run.census.count(r, Category::Active), run.census.count(r, Category::Debris)))
        .collect()
}

fn regime_label(mean_motion: Option<f64>) -> &'static str {
    crate::census::usable_mean_motion(mean_motion)
        .map(|mm| crate::census::classify(mm).label())
        .unwrap_or("-")
}

/// Regime names under each bar group, plus a one-line legend.
fn draw_group_labels(frame: &mut ratatui::Frame<'_>, inner: Rect, chart: Rect) {
    // Plotters reserves this many columns for the y labels (see the widget).
    let plot_left = chart.x + 9;
    let plot_width = chart.width.saturating_sub(10);
    let group_width = plot_width / OrbitRegime::ALL.len() as u16;
    let y = chart.y + chart.height;
    if group_width == 0 || y >= inner.y + inner.height {
        return;
    }

    for (i, regime) in OrbitRegime::ALL.iter().enumerate() {
        let rect = Rect {
            x: plot_left + group_width * i as u16,
            y,
            width: group_width,
            height: 1,
        };
        frame.render_widget(
            Paragraph::new(regime.label())
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD)),
            rect,
        );
    }

    let legend = Line::from(vec![
        Span::styled("■ active", Style::default().fg(Color::Cyan)),
        Span::raw("   "),
        Span::styled("■ debris", Style::default().fg(Color::Red)),
    ]);
    let legend_rect = Rect {
        x: inner.x,
        y: y + 1,
        width: inner.width,
        height: 1,
    };
    if legend_rect.y < inner.y + inner.height {
        frame.render_widget(Paragraph::new(legend).alignment(Alignment::Center), legend_rect);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn views_cycle_both_ways() {
        assert_eq!(View::Overview.next(), View::Search);
        assert_eq!(View::Debris.next(), View::Overview);
        assert_eq!(View::Overview.prev(), View::Debris);
        for v in View::ALL {
            assert_eq!(v.next().prev(), v);
        }
    }

    fn screen_text(app: &mut App) -> String {
        let mut terminal = Terminal::new(ratatui::backend::TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| app.draw(f)).unwrap();
        let buf = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buf.area.height {
            for x in 0..buf.area.width {
                text.push_str(buf[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    #[test]
    fn first_frame_is_drawn_before_loading() {
        let mut app = App::new(Settings::default(), RefreshPolicy::Never);
        assert_eq!(app.pending_load, Some(RefreshPolicy::Never));
        assert!(app.run.is_none());

        let screen = screen_text(&mut app);
        assert!(screen.contains("Loading catalog..."));
        assert!(screen.contains("Space Debris Monitoring"));
    }

    #[test]
    fn fetch_key_defers_the_fetch() {
        let mut app = App::new(Settings::default(), RefreshPolicy::Never);
        app.pending_load = None;

        assert!(!app.handle_key(KeyCode::Char('f')));
        assert_eq!(app.pending_load, Some(RefreshPolicy::Always));
        assert!(app.status.starts_with("Fetching from"));
        assert!(app.handle_key(KeyCode::Char('q')));
    }

    #[test]
    fn regime_label_skips_unusable_mean_motion() {
        assert_eq!(regime_label(Some(15.5)), "LEO");
        assert_eq!(regime_label(Some(1.0)), "GEO");
        assert_eq!(regime_label(None), "-");
        assert_eq!(regime_label(Some(f64::NAN)), "-");
    }
}
