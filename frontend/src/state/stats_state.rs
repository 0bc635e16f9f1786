//! Statistics view model and chart lifecycle.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use anyhow::Result;
use chrono::NaiveDate;
use log::{debug, warn};
use shared::aggregation::{
    monthly_average_by_group, total_amount, trailing_months, vendor_breakdown, GroupBy, VendorBreakdown,
    TRAILING_MONTHS,
};
use shared::Transaction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Line,
    Bar,
    Doughnut,
}

/// One chart's worth of data: parallel labels and values
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub title: String,
    pub kind: ChartKind,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

impl ChartSeries {
    fn from_pairs(title: &str, kind: ChartKind, pairs: Vec<(String, f64)>) -> Self {
        let (labels, values) = pairs.into_iter().unzip();
        Self {
            title: title.to_string(),
            kind,
            labels,
            values,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatisticsView {
    pub total_amount: f64,
    pub monthly_trend: ChartSeries,
    pub vendor_average: ChartSeries,
    pub category_average: ChartSeries,
    pub vendor_breakdown: Vec<VendorBreakdown>,
}

impl StatisticsView {
    pub fn build(transactions: &[Transaction], today: NaiveDate) -> Self {
        let trend = trailing_months(transactions, TRAILING_MONTHS, today)
            .into_iter()
            .map(|bucket| (bucket.label, bucket.total))
            .collect();

        Self {
            total_amount: total_amount(transactions),
            monthly_trend: ChartSeries::from_pairs("Monthly spending", ChartKind::Line, trend),
            vendor_average: ChartSeries::from_pairs(
                "Average per month by vendor",
                ChartKind::Bar,
                largest_first(monthly_average_by_group(transactions, GroupBy::Merchant)),
            ),
            category_average: ChartSeries::from_pairs(
                "Average per month by category",
                ChartKind::Doughnut,
                largest_first(monthly_average_by_group(transactions, GroupBy::Category)),
            ),
            vendor_breakdown: vendor_breakdown(transactions),
        }
    }

    pub fn charts(&self) -> [&ChartSeries; 3] {
        [&self.monthly_trend, &self.vendor_average, &self.category_average]
    }
}

fn largest_first(averages: BTreeMap<String, f64>) -> Vec<(String, f64)> {
    let mut pairs: Vec<(String, f64)> = averages.into_iter().collect();
    pairs.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal).then_with(|| a.0.cmp(&b.0)));
    pairs
}

/// Whatever actually draws charts. Handles must be destroyed before the
/// surface reuses their canvas.
pub trait ChartSurface {
    type Handle;

    fn draw(&mut self, series: &ChartSeries) -> Result<Self::Handle>;

    fn destroy(&mut self, handle: Self::Handle);
}

/// Owns the live chart handles for the statistics screen
pub struct StatsPanel<S: ChartSurface> {
    surface: S,
    handles: Vec<S::Handle>,
}

impl<S: ChartSurface> StatsPanel<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            handles: Vec::new(),
        }
    }

    /// Replace every chart. Old handles are all destroyed before the first new
    /// one is drawn; if a draw fails the panel is left empty.
    pub fn render(&mut self, view: &StatisticsView) -> Result<()> {
        self.clear();

        for series in view.charts() {
            match self.surface.draw(series) {
                Ok(handle) => self.handles.push(handle),
                Err(e) => {
                    warn!("Failed to draw {}: {}", series.title, e);
                    self.clear();
                    return Err(e);
                }
            }
        }
        debug!("Rendered {} charts", self.handles.len());
        Ok(())
    }

    pub fn clear(&mut self) {
        for handle in self.handles.drain(..) {
            self.surface.destroy(handle);
        }
    }

    pub fn live_charts(&self) -> usize {
        self.handles.len()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }
}
