use serde::{Deserialize, Serialize};

use crate::models::CampaignRecord;

/// Interface for any row that contributes to KPI totals.
///
/// Keeps the aggregation math independent of the concrete record type so
/// tests and future sources can feed it directly.
pub trait MetricSource {
    /// Advertising spend in USD.
    fn spend(&self) -> f64;
    /// Revenue attributed to the campaign in USD.
    fn revenue(&self) -> f64;
    /// Number of ad clicks.
    fn clicks(&self) -> u64;
    /// Number of ad impressions.
    fn impressions(&self) -> u64;
    /// Number of attributed conversions.
    fn conversions(&self) -> u64;
}

impl MetricSource for CampaignRecord {
    fn spend(&self) -> f64 {
        self.spend
    }

    fn revenue(&self) -> f64 {
        self.revenue_attributed
    }

    fn clicks(&self) -> u64 {
        self.clicks
    }

    fn impressions(&self) -> u64 {
        self.impressions
    }

    fn conversions(&self) -> u64 {
        self.conversions
    }
}

// ── CampaignTotals ────────────────────────────────────────────────────────────

/// Raw sums accumulated across multiple campaign records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CampaignTotals {
    /// Accumulated spend in USD.
    pub spend: f64,
    /// Accumulated attributed revenue in USD.
    pub revenue: f64,
    /// Accumulated clicks.
    pub clicks: u64,
    /// Accumulated impressions.
    pub impressions: u64,
    /// Accumulated conversions.
    pub conversions: u64,
    /// Number of records accumulated.
    pub count: u32,
}

impl CampaignTotals {
    /// Add a single record's figures to the running totals.
    pub fn add_record<M: MetricSource>(&mut self, record: &M) {
        self.spend += record.spend();
        self.revenue += record.revenue();
        self.clicks += record.clicks();
        self.impressions += record.impressions();
        self.conversions += record.conversions();
        self.count += 1;
    }

    /// Sum every record in `records` into a fresh total.
    pub fn from_records<M: MetricSource>(records: &[M]) -> Self {
        let mut totals = Self::default();
        for record in records {
            totals.add_record(record);
        }
        totals
    }
}

// ── KpiSet ────────────────────────────────────────────────────────────────────

/// The derived KPIs for one group of campaign records.
///
/// Ratio metrics are `None` whenever their denominator is zero; an
/// undefined metric is a reportable state, never an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KpiSet {
    /// Total spend in USD.
    pub total_spend: f64,
    /// Total attributed revenue in USD.
    pub total_revenue: f64,
    /// Total clicks.
    pub total_clicks: u64,
    /// Total impressions.
    pub total_impressions: u64,
    /// Total conversions.
    pub total_conversions: u64,
    /// Return on advertising spend: revenue / spend.
    pub roas: Option<f64>,
    /// Click-through rate: clicks / impressions.
    pub ctr: Option<f64>,
    /// Cost per click: spend / clicks.
    pub cpc: Option<f64>,
    /// Customer acquisition cost: spend / conversions.
    pub cac: Option<f64>,
}

impl KpiSet {
    /// Derive the KPI set from accumulated totals.
    pub fn from_totals(totals: &CampaignTotals) -> Self {
        Self {
            total_spend: totals.spend,
            total_revenue: totals.revenue,
            total_clicks: totals.clicks,
            total_impressions: totals.impressions,
            total_conversions: totals.conversions,
            roas: safe_ratio(totals.revenue, totals.spend),
            ctr: safe_ratio(totals.clicks as f64, totals.impressions as f64),
            cpc: safe_ratio(totals.spend, totals.clicks as f64),
            cac: safe_ratio(totals.spend, totals.conversions as f64),
        }
    }

    /// Convenience: accumulate `records` and derive the KPI set in one step.
    pub fn from_records<M: MetricSource>(records: &[M]) -> Self {
        Self::from_totals(&CampaignTotals::from_records(records))
    }
}

/// `numerator / denominator`, or `None` when the denominator is zero.
pub fn safe_ratio(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator == 0.0 {
        None
    } else {
        Some(numerator / denominator)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
