// 📈 Trend Charts
// Per-suburb metric series drawn from the unfiltered dataset.
// The x axis is the row position in the source file; there is no date column.

use crate::dataset::{Dataset, Field};
use serde::Serialize;

pub const LINE_COLOR: &str = "hotpink";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TrendMetric {
    MedianPriceGrowth,
    DaysOnMarket,
    RentalGrowth,
    SalesTurnover,
}

impl TrendMetric {
    pub const ALL: [TrendMetric; 4] = [
        TrendMetric::MedianPriceGrowth,
        TrendMetric::DaysOnMarket,
        TrendMetric::RentalGrowth,
        TrendMetric::SalesTurnover,
    ];

    pub fn field(&self) -> Field {
        match self {
            TrendMetric::MedianPriceGrowth => Field::MedianPriceGrowth,
            TrendMetric::DaysOnMarket => Field::DaysOnMarket,
            TrendMetric::RentalGrowth => Field::RentalGrowth,
            TrendMetric::SalesTurnover => Field::SalesTurnover,
        }
    }

    pub fn label(&self) -> &'static str {
        self.field().label()
    }

    pub fn title(&self) -> String {
        format!("{} Trend", self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub row: usize,
    /// None leaves a gap in the line
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendSeries {
    pub metric: TrendMetric,
    pub title: String,
    pub y_label: String,
    pub points: Vec<TrendPoint>,
}

impl TrendSeries {
    /// (min, max) over non-null values
    pub fn value_bounds(&self) -> Option<(f64, f64)> {
        self.points.iter().filter_map(|p| p.value).fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }

    /// Consecutive runs of non-null points
    pub fn segments(&self) -> Vec<Vec<(usize, f64)>> {
        let mut segments = Vec::new();
        let mut current = Vec::new();
        for point in &self.points {
            match point.value {
                Some(v) => current.push((point.row, v)),
                None if !current.is_empty() => segments.push(std::mem::take(&mut current)),
                None => {}
            }
        }
        if !current.is_empty() {
            segments.push(current);
        }
        segments
    }
}

/// One series per metric column present, over every row of `suburb` in the
/// full dataset. Metrics whose column is absent are skipped.
pub fn trends_for(dataset: &Dataset, suburb: &str) -> Vec<TrendSeries> {
    let rows = dataset.rows_for_suburb(suburb);

    TrendMetric::ALL
        .iter()
        .filter(|metric| dataset.has_field(metric.field()))
        .map(|metric| TrendSeries {
            metric: *metric,
            title: metric.title(),
            y_label: metric.label().to_string(),
            points: rows
                .iter()
                .map(|(row, record)| TrendPoint {
                    row: *row,
                    value: record.number(metric.field()),
                })
                .collect(),
        })
        .collect()
}
