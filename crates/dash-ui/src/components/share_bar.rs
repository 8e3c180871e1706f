use crate::themes::Theme;
use dash_core::models::Platform;
use ratatui::text::{Line, Span};

/// Configuration controlling the visual appearance of a share bar.
pub struct ShareBarConfig {
    /// Total width in terminal columns of the bar portion (excluding label).
    pub width: u16,
    /// Character used for filled segments.
    pub filled_char: char,
    /// Character used for the unattributed remainder.
    pub empty_char: char,
}

impl Default for ShareBarConfig {
    fn default() -> Self {
        Self {
            width: 50,
            filled_char: '\u{2588}', // █  FULL BLOCK
            empty_char: '\u{2591}',  // ░  LIGHT SHADE
        }
    }
}

/// Horizontal stacked bar showing each platform's share of total spend.
///
/// Each platform renders as a run of filled cells in its theme colour,
/// proportional to its percentage; rounding drift is absorbed by the
/// remainder so the bar is always exactly `width` columns.
pub struct SpendShareBar<'a> {
    /// `(platform, percentage)` pairs in canonical platform order.
    pub shares: &'a [(Platform, f64)],
    /// Theme from which colour styles are taken.
    pub theme: &'a Theme,
    /// Visual configuration.
    pub config: ShareBarConfig,
}

impl<'a> SpendShareBar<'a> {
    /// Construct a new bar with the default configuration.
    pub fn new(shares: &'a [(Platform, f64)], theme: &'a Theme) -> Self {
        Self {
            shares,
            theme,
            config: ShareBarConfig::default(),
        }
    }

    /// Render the stacked bar as a [`Line`].
    pub fn to_line(&self) -> Line<'a> {
        let width = self.config.width as usize;
        let mut spans: Vec<Span> = Vec::with_capacity(self.shares.len() + 1);
        let mut used = 0usize;

        for (platform, pct) in self.shares {
            let cells = ((pct / 100.0) * width as f64).round() as usize;
            let cells = cells.min(width.saturating_sub(used));
            if cells == 0 {
                continue;
            }
            let segment: String = std::iter::repeat_n(self.config.filled_char, cells).collect();
            spans.push(Span::styled(segment, self.theme.platform_style(*platform)));
            used += cells;
        }

        if used < width {
            let remainder: String =
                std::iter::repeat_n(self.config.empty_char, width - used).collect();
            spans.push(Span::styled(remainder, self.theme.bar_empty));
        }

        Line::from(spans)
    }

    /// Render the legend as a [`Line`], e.g. `"Facebook 25.0% · Google 75.0%"`.
    pub fn legend_line(&self) -> Line<'a> {
        let mut spans: Vec<Span> = Vec::with_capacity(self.shares.len() * 2);
        for (i, (platform, pct)) in self.shares.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(" · ", self.theme.dim));
            }
            spans.push(Span::styled(
                platform.name(),
                self.theme.platform_style(*platform),
            ));
            spans.push(Span::styled(
                format!(" {:.1}%", pct),
                self.theme.bar_label,
            ));
        }
        Line::from(spans)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
