//! Aggregate table views (channel / daily) for the marketing dashboard TUI.
//!
//! Renders a bordered [`ratatui::widgets::Table`] with one row per group
//! (platform or date) plus a highlighted totals row at the bottom.

use ratatui::{
    layout::{Constraint, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use dash_core::formatting;
use dash_core::metrics::KpiSet;

use crate::themes::Theme;

/// Data for a single row in the aggregate table.
#[derive(Debug, Clone)]
pub struct TableRowData {
    /// Group label, e.g. `"Facebook"` (channel) or `"2025-06-01"` (daily).
    pub label: String,
    /// KPI set for the group.
    pub kpis: KpiSet,
}

/// Aggregated totals across all rows in the table.
#[derive(Debug, Clone)]
pub struct TableTotals {
    /// Overall KPI set across all groups.
    pub kpis: KpiSet,
    /// Number of groups (rows) represented.
    pub group_count: u32,
}

/// Build the eight display cells shared by data rows and the totals row.
fn kpi_cells(kpis: &KpiSet) -> Vec<String> {
    vec![
        formatting::format_currency(kpis.total_spend),
        formatting::format_currency(kpis.total_revenue),
        formatting::format_ratio(kpis.roas),
        formatting::format_rate(kpis.ctr),
        formatting::format_unit_cost(kpis.cpc),
        formatting::format_unit_cost(kpis.cac),
        formatting::format_number(kpis.total_conversions as f64, 0),
    ]
}

/// Render the channel or daily aggregate table into `area`.
///
/// The table has one data row per [`TableRowData`] entry, followed by a
/// highlighted totals row, all within a bordered block titled `title`.
/// `key_header` names the first column ("Channel" or "Date").
pub fn render_table_view(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    key_header: &str,
    rows: &[TableRowData],
    totals: &TableTotals,
    theme: &Theme,
) {
    let header_labels = [
        key_header,
        "Spend",
        "Revenue",
        "ROAS",
        "CTR",
        "CPC",
        "CAC",
        "Conversions",
    ];
    let header_cells = header_labels
        .iter()
        .map(|h| Cell::from(*h).style(theme.table_header));
    let header = Row::new(header_cells).height(1);

    let data_rows: Vec<Row> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let style = if i % 2 == 0 {
                theme.table_row
            } else {
                theme.table_row_alt
            };
            let mut cells = vec![Cell::from(row.label.clone())];
            cells.extend(kpi_cells(&row.kpis).into_iter().map(Cell::from));
            Row::new(cells).style(style)
        })
        .collect();

    // Totals row – styled separately to stand out.
    let mut total_cells = vec![
        Cell::from("TOTAL").style(theme.table_total),
        Cell::from(formatting::format_currency(totals.kpis.total_spend)),
        Cell::from(formatting::format_currency(totals.kpis.total_revenue)),
        Cell::from(formatting::format_ratio(totals.kpis.roas)),
        Cell::from(formatting::format_rate(totals.kpis.ctr)),
        Cell::from(formatting::format_unit_cost(totals.kpis.cpc)),
        Cell::from(formatting::format_unit_cost(totals.kpis.cac)),
    ];
    total_cells.push(Cell::from(format!(
        "{} ({} groups)",
        formatting::format_number(totals.kpis.total_conversions as f64, 0),
        totals.group_count
    )));
    let total_row = Row::new(total_cells).style(theme.table_total);

    let mut all_rows = data_rows;
    all_rows.push(total_row);

    let widths = [
        Constraint::Length(12),
        Constraint::Length(14),
        Constraint::Length(14),
        Constraint::Length(8),
        Constraint::Length(8),
        Constraint::Length(10),
        Constraint::Length(10),
        Constraint::Length(16),
    ];

    let table = Table::new(all_rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", title)),
        )
        .style(theme.text);

    frame.render_widget(table, area);
}

/// Render a "no data" placeholder when the filtered set is empty.
pub fn render_no_data(frame: &mut Frame, area: Rect, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("No rows match the current filter", theme.warning)),
        Line::from(""),
        Line::from(Span::styled(
            "Widen the date range or clear the platform/location filters.",
            theme.dim,
        )),
        Line::from(Span::styled("Press 'q' or Ctrl+C to exit", theme.dim)),
    ];
    frame.render_widget(
        Paragraph::new(ratatui::text::Text::from(text)).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Marketing Dashboard "),
        ),
        area,
    );
}

// ── Tests ──────────────────────────────────────────────────────────────────────
