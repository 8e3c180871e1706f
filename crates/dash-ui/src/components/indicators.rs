use crate::themes::Theme;
use dash_core::formatting;
use ratatui::text::{Line, Span};

// ── RoasIndicator ────────────────────────────────────────────────────────────

/// Displays the overall ROAS with a tiered emoji and health colour.
///
/// | ROAS        | Emoji | Tier       |
/// |-------------|-------|------------|
/// | ≥ 3.0       | 🚀    | excellent  |
/// | ≥ 2.0       | 📈    | good       |
/// | ≥ 1.0       | ➡️    | break-even |
/// | < 1.0       | 📉    | losing     |
/// | undefined   | ◌     | no spend   |
pub struct RoasIndicator<'a> {
    /// Overall return on advertising spend, `None` when spend is zero.
    pub roas: Option<f64>,
    /// Theme providing colour styles.
    pub theme: &'a Theme,
}

impl<'a> RoasIndicator<'a> {
    /// Construct a new indicator.
    pub fn new(roas: Option<f64>, theme: &'a Theme) -> Self {
        Self { roas, theme }
    }

    /// Select the tier emoji for the current ROAS.
    pub fn emoji(&self) -> &'static str {
        match self.roas {
            Some(v) if v >= 3.0 => "🚀",
            Some(v) if v >= 2.0 => "📈",
            Some(v) if v >= 1.0 => "➡️",
            Some(_) => "📉",
            None => "◌",
        }
    }

    /// Render the indicator as a [`Line`].
    ///
    /// Format: `"🎯 ROAS: 2.33x 📈"`
    pub fn to_line(&self) -> Line<'a> {
        let style = self.theme.roas_style(self.roas);
        Line::from(vec![
            Span::styled("🎯 ROAS: ", self.theme.label),
            Span::styled(formatting::format_ratio(self.roas), style),
            Span::raw(" "),
            Span::raw(self.emoji()),
        ])
    }
}

// ── CoverageIndicator ────────────────────────────────────────────────────────

/// Displays how many loaded rows the current filter keeps, plus the number
/// of rows dropped by validation at load time.
pub struct CoverageIndicator<'a> {
    /// Rows matching the active filter.
    pub rows_shown: usize,
    /// Rows in the loaded dataset.
    pub rows_loaded: usize,
    /// Rows dropped by validation when the sources were read.
    pub rows_dropped: usize,
    /// Theme providing colour styles.
    pub theme: &'a Theme,
}

impl<'a> CoverageIndicator<'a> {
    /// Construct a new coverage indicator.
    pub fn new(shown: usize, loaded: usize, dropped: usize, theme: &'a Theme) -> Self {
        Self {
            rows_shown: shown,
            rows_loaded: loaded,
            rows_dropped: dropped,
            theme,
        }
    }

    /// Render the indicator as a [`Line`].
    ///
    /// Format: `"📋 Rows: 1,234 of 1,300 shown  (2 dropped at load)"`
    pub fn to_line(&self) -> Line<'a> {
        let mut spans = vec![
            Span::styled("📋 Rows: ", self.theme.label),
            Span::styled(
                formatting::format_number(self.rows_shown as f64, 0),
                self.theme.value,
            ),
            Span::styled(
                format!(
                    " of {} shown",
                    formatting::format_number(self.rows_loaded as f64, 0)
                ),
                self.theme.dim,
            ),
        ];

        if self.rows_dropped > 0 {
            spans.push(Span::styled(
                format!(
                    "  ({} dropped at load)",
                    formatting::format_number(self.rows_dropped as f64, 0)
                ),
                self.theme.warning,
            ));
        }

        Line::from(spans)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
