//! Live overview screen for the marketing dashboard TUI.
//!
//! Renders the headline KPIs, the spend-share bar, the active filter and
//! row-coverage diagnostics as a single paragraph of styled lines.

use chrono::NaiveDate;
use ratatui::{
    layout::Rect,
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use dash_core::formatting;
use dash_core::metrics::KpiSet;
use dash_core::models::Platform;

use crate::components::header::Header;
use crate::components::indicators::{CoverageIndicator, RoasIndicator};
use crate::components::share_bar::SpendShareBar;
use crate::themes::Theme;

/// All data required to render the overview screen.
pub struct OverviewViewData {
    /// Active view name for the header.
    pub view: String,
    /// Data directory for the header.
    pub data_dir: String,
    /// Overall KPI set for the filtered records.
    pub kpis: KpiSet,
    /// Spend share per platform as `(platform, percentage)` pairs.
    pub spend_share: Vec<(Platform, f64)>,
    /// Total business revenue over the filtered date range, when business
    /// rows are present.
    pub business_revenue: Option<f64>,
    /// Human-readable description of the active filter.
    pub filter_summary: String,
    /// Date span of the filtered records.
    pub date_span: Option<(NaiveDate, NaiveDate)>,
    /// Rows matching the active filter.
    pub rows_shown: usize,
    /// Rows in the loaded dataset.
    pub rows_loaded: usize,
    /// Rows dropped by validation at load time.
    pub rows_dropped: usize,
    /// Last load error, when the runtime fell back to stale data.
    pub load_error: Option<String>,
}

// ── Row builders ──────────────────────────────────────────────────────────────

/// Pad an emoji + label to 22 display columns.
///
/// Emoji widths vary between terminals; measuring with `unicode-width`
/// keeps the value column aligned across rows.
fn pad_label(emoji: &str, label: &str) -> String {
    let content = format!("{} {}", emoji, label);
    let width = UnicodeWidthStr::width(content.as_str());
    let padding = if width < 22 { 22 - width } else { 1 };
    format!("{}{}", content, " ".repeat(padding))
}

/// Build a `<label> <value>` KPI row.
fn kpi_row<'a>(
    emoji: &str,
    label: &str,
    value: String,
    value_style: ratatui::style::Style,
    theme: &'a Theme,
) -> Line<'a> {
    Line::from(vec![
        Span::styled(pad_label(emoji, label), theme.label),
        Span::styled(value, value_style),
    ])
}

// ── Main render ───────────────────────────────────────────────────────────────

/// Render the overview screen into `area`.
pub fn render_overview(frame: &mut Frame, area: Rect, data: &OverviewViewData, theme: &Theme) {
    let lines = build_overview_lines(data, theme);
    let paragraph = Paragraph::new(Text::from(lines));
    frame.render_widget(paragraph, area);
}

/// Build the full `Vec<Line>` for the overview screen (extracted for
/// testability).
pub fn build_overview_lines<'a>(data: &'a OverviewViewData, theme: &'a Theme) -> Vec<Line<'a>> {
    let mut lines: Vec<Line<'a>> = Vec::with_capacity(24);

    // ── Header ────────────────────────────────────────────────────────────────
    lines.extend(Header::new(&data.view, &data.data_dir, theme).to_lines());

    // ── Headline totals ───────────────────────────────────────────────────────
    lines.push(kpi_row(
        "💰",
        "Marketing Spend:",
        formatting::format_currency(data.kpis.total_spend),
        theme.value,
        theme,
    ));
    lines.push(kpi_row(
        "📈",
        "Attributed Revenue:",
        formatting::format_currency(data.kpis.total_revenue),
        theme.value,
        theme,
    ));
    if let Some(revenue) = data.business_revenue {
        lines.push(kpi_row(
            "🏦",
            "Business Revenue:",
            formatting::format_currency(revenue),
            theme.value,
            theme,
        ));
    }
    lines.push(Line::from(""));

    // ── Ratio KPIs ────────────────────────────────────────────────────────────
    lines.push(RoasIndicator::new(data.kpis.roas, theme).to_line());
    lines.push(Line::from(vec![
        Span::styled("🖱 CTR: ", theme.label),
        Span::styled(formatting::format_rate(data.kpis.ctr), theme.value),
        Span::styled("   💵 CPC: ", theme.label),
        Span::styled(formatting::format_unit_cost(data.kpis.cpc), theme.value),
        Span::styled("   👤 CAC: ", theme.label),
        Span::styled(formatting::format_unit_cost(data.kpis.cac), theme.value),
    ]));
    lines.push(Line::from(""));

    // ── Spend share ───────────────────────────────────────────────────────────
    if !data.spend_share.is_empty() {
        lines.push(Line::from(Span::styled("Spend share", theme.label)));
        let bar = SpendShareBar::new(&data.spend_share, theme);
        lines.push(bar.to_line());
        lines.push(bar.legend_line());
        lines.push(Line::from(""));
    }

    // ── Filter and coverage ───────────────────────────────────────────────────
    let span_text = match data.date_span {
        Some((first, last)) if first == last => first.format("%Y-%m-%d").to_string(),
        Some((first, last)) => format!(
            "{} → {}",
            first.format("%Y-%m-%d"),
            last.format("%Y-%m-%d")
        ),
        None => "no data".to_string(),
    };
    lines.push(Line::from(vec![
        Span::styled("🔎 Filter: ", theme.label),
        Span::styled(data.filter_summary.clone(), theme.info),
        Span::styled(format!("  ({})", span_text), theme.dim),
    ]));
    lines.push(
        CoverageIndicator::new(
            data.rows_shown,
            data.rows_loaded,
            data.rows_dropped,
            theme,
        )
        .to_line(),
    );
    if let Some(err) = &data.load_error {
        lines.push(Line::from(Span::styled(
            format!("⚠ Using stale data: {}", err),
            theme.warning,
        )));
    }
    lines.push(Line::from(""));

    // ── Footer ────────────────────────────────────────────────────────────────
    lines.push(Line::from(Span::styled(
        "q quit · p cycle platform · l cycle location · c clear filters",
        theme.dim,
    )));

    lines
}

/// Render a "waiting for data" placeholder shown before the first snapshot
/// arrives or when the data directory has no usable sources.
pub fn render_no_data(frame: &mut Frame, area: Rect, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("No campaign data loaded", theme.warning)),
        Line::from(""),
        Line::from(Span::styled(
            "Expecting Facebook.csv, Google.csv, TikTok.csv and business.csv",
            theme.dim,
        )),
        Line::from(Span::styled("in the configured data directory.", theme.dim)),
        Line::from(Span::styled("Press 'q' or Ctrl+C to exit", theme.dim)),
    ];
    frame.render_widget(
        Paragraph::new(Text::from(text)).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Marketing Dashboard "),
        ),
        area,
    );
}

// ── Tests ─────────────────────────────────────────────────────────────────────
