//! Main application state and TUI event loop for the marketing dashboard.
//!
//! [`App`] owns the theme, view mode, the live [`FilterSpec`] and the last
//! received dataset snapshot. Every interaction (filter key, fresh snapshot)
//! re-runs the pure Filter → Aggregate query over the cached dataset, so the
//! screen always reflects a full pipeline pass.

use std::collections::BTreeSet;
use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Frame, Terminal};
use tokio::sync::mpsc;

use dash_core::models::{FilterSpec, Platform};
use dash_data::aggregator::MetricsAggregator;
use dash_data::pipeline::query;
use dash_runtime::orchestrator::DashboardData;

use crate::overview_view::{self, OverviewViewData};
use crate::table_view::{self, TableRowData, TableTotals};
use crate::themes::Theme;

// ── ViewMode ──────────────────────────────────────────────────────────────────

/// Which view the TUI is currently rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewMode {
    /// Live KPI overview with interactive filtering.
    Live,
    /// Per-channel aggregate table.
    Channels,
    /// Per-date aggregate table.
    Daily,
}

// ── App ───────────────────────────────────────────────────────────────────────

/// Root application state for the dashboard TUI.
pub struct App {
    /// Active colour theme.
    pub theme: Theme,
    /// Current view mode.
    pub view_mode: ViewMode,
    /// The active filter, mutated by key presses in the live view.
    pub filter: FilterSpec,
    /// Set to `true` to break out of the event loop on the next iteration.
    pub should_quit: bool,
    /// Most recent dataset snapshot, `None` until the first data arrives.
    pub last_data: Option<DashboardData>,
}

impl App {
    /// Construct a new application with the given configuration.
    pub fn new(theme_name: &str, view_mode: ViewMode, filter: FilterSpec) -> Self {
        Self {
            theme: Theme::from_name(theme_name),
            view_mode,
            filter,
            should_quit: false,
            last_data: None,
        }
    }

    // ── Public event loops ────────────────────────────────────────────────────

    /// Run the live dashboard TUI, receiving dataset snapshots from `rx`.
    ///
    /// Uses `crossterm::event::poll` (synchronous, with a 250 ms timeout) so
    /// that the terminal event loop stays on the current thread while data
    /// updates arrive on the async channel via `try_recv`.
    ///
    /// Keys: `q` / `Q` / `Ctrl+C` quit, `p` cycles the platform filter,
    /// `l` cycles the location filter, `c` clears all filters.
    pub async fn run_live(mut self, mut rx: mpsc::Receiver<DashboardData>) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let tick_rate = Duration::from_millis(250);

        let result = loop {
            terminal.draw(|frame| self.render(frame))?;

            // Handle keyboard events with a short timeout so we don't block.
            if event::poll(tick_rate)? {
                if let Event::Key(key) = event::read()? {
                    match key.code {
                        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                            break Ok(());
                        }
                        KeyCode::Char('q') | KeyCode::Char('Q') => break Ok(()),
                        KeyCode::Char('p') => self.cycle_platform_filter(),
                        KeyCode::Char('l') => self.cycle_location_filter(),
                        KeyCode::Char('c') => self.filter = FilterSpec::unrestricted(),
                        _ => {}
                    }
                }
            }

            // Drain any pending data updates (non-blocking).
            loop {
                match rx.try_recv() {
                    Ok(data) => self.update_from_snapshot(data),
                    Err(mpsc::error::TryRecvError::Empty) => break,
                    Err(mpsc::error::TryRecvError::Disconnected) => {
                        self.should_quit = true;
                        break;
                    }
                }
            }

            if self.should_quit {
                break Ok(());
            }
        };

        // Restore terminal state unconditionally.
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    /// Run a static table view (channels or daily), then wait for `q` / `Ctrl+C`.
    pub async fn run_table(self, rows: Vec<TableRowData>, totals: TableTotals) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let (title, key_header) = match self.view_mode {
            ViewMode::Channels => ("Channel Performance", "Channel"),
            ViewMode::Daily => ("Daily Trends", "Date"),
            ViewMode::Live => ("Performance", "Group"),
        };

        let tick_rate = Duration::from_millis(250);

        loop {
            terminal.draw(|frame| {
                let area = frame.area();
                if rows.is_empty() {
                    table_view::render_no_data(frame, area, &self.theme);
                } else {
                    table_view::render_table_view(
                        frame, area, title, key_header, &rows, &totals, &self.theme,
                    );
                }
            })?;

            if event::poll(tick_rate)? {
                if let Event::Key(key) = event::read()? {
                    match key.code {
                        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                            break;
                        }
                        KeyCode::Char('q') | KeyCode::Char('Q') => break,
                        _ => {}
                    }
                }
            }
        }

        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;
        Ok(())
    }

    // ── Snapshot handling ─────────────────────────────────────────────────────

    /// Store an incoming dataset snapshot.
    pub fn update_from_snapshot(&mut self, data: DashboardData) {
        self.last_data = Some(data);
    }

    // ── Filter interaction ────────────────────────────────────────────────────

    /// Cycle the platform filter: all → Facebook → Google → TikTok → all.
    pub fn cycle_platform_filter(&mut self) {
        let next = match self.single_platform() {
            None => Some(Platform::Facebook),
            Some(Platform::Facebook) => Some(Platform::Google),
            Some(Platform::Google) => Some(Platform::TikTok),
            Some(Platform::TikTok) => None,
        };
        self.filter.platforms = next.map(|p| BTreeSet::from([p]));
    }

    /// Cycle the location filter through the dataset's distinct locations,
    /// ending back at "all".
    pub fn cycle_location_filter(&mut self) {
        let locations = match &self.last_data {
            Some(data) => data.dataset.locations(),
            None => return,
        };
        if locations.is_empty() {
            self.filter.locations = None;
            return;
        }

        let next = match self.single_location() {
            None => Some(locations[0].clone()),
            Some(current) => match locations.iter().position(|l| *l == current) {
                Some(i) if i + 1 < locations.len() => Some(locations[i + 1].clone()),
                _ => None,
            },
        };
        self.filter.locations = next.map(|l| BTreeSet::from([l]));
    }

    /// Human-readable description of the active filter.
    pub fn filter_summary(&self) -> String {
        let dates = match (self.filter.date_from, self.filter.date_to) {
            (Some(from), Some(to)) => format!("{} → {}", from, to),
            (Some(from), None) => format!("from {}", from),
            (None, Some(to)) => format!("until {}", to),
            (None, None) => "all dates".to_string(),
        };
        let platforms = match &self.filter.platforms {
            None => "all platforms".to_string(),
            Some(set) => set
                .iter()
                .map(|p| p.name().to_lowercase())
                .collect::<Vec<_>>()
                .join("+"),
        };
        let locations = match &self.filter.locations {
            None => "all locations".to_string(),
            Some(set) => set.iter().cloned().collect::<Vec<_>>().join("+"),
        };
        format!("{} · {} · {}", dates, platforms, locations)
    }

    // ── Private helpers ───────────────────────────────────────────────────────

    /// The single selected platform, or `None` for "all" / multi selections.
    fn single_platform(&self) -> Option<Platform> {
        self.filter.platforms.as_ref().and_then(|set| {
            if set.len() == 1 {
                set.iter().next().copied()
            } else {
                None
            }
        })
    }

    /// The single selected location, or `None` for "all" / multi selections.
    fn single_location(&self) -> Option<String> {
        self.filter.locations.as_ref().and_then(|set| {
            if set.len() == 1 {
                set.iter().next().cloned()
            } else {
                None
            }
        })
    }

    /// Render the current application state into `frame`.
    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let Some(data) = &self.last_data else {
            overview_view::render_no_data(frame, area, &self.theme);
            return;
        };

        // Full Filter → Aggregate pass over the cached dataset.
        let result = query(&data.dataset, &self.filter);

        let business_revenue = if result.business.is_empty() {
            None
        } else {
            Some(result.business.iter().map(|b| b.total_revenue).sum())
        };

        let date_span = match (
            result.records.iter().map(|r| r.date).min(),
            result.records.iter().map(|r| r.date).max(),
        ) {
            (Some(first), Some(last)) => Some((first, last)),
            _ => None,
        };

        let view_data = OverviewViewData {
            view: "live".to_string(),
            data_dir: data.source_dir.display().to_string(),
            spend_share: MetricsAggregator::spend_share(&result.records),
            kpis: result.kpis,
            business_revenue,
            filter_summary: self.filter_summary(),
            date_span,
            rows_shown: result.records.len(),
            rows_loaded: data.dataset.campaigns.len(),
            rows_dropped: data.dataset.report.rows_dropped(),
            load_error: data.load_error.clone(),
        };

        overview_view::render_overview(frame, area, &view_data, &self.theme);
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
