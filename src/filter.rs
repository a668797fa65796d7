// 🎛️ Filter Panel
// Multi-select and lower-bound slider filters combined into a filtered view

use crate::dataset::{Dataset, Field, SuburbRecord};
use serde::{Deserialize, Serialize};

// ============================================================================
// CRITERIA
// ============================================================================

/// Conjunction of categorical memberships and numeric lower bounds.
/// An empty selection or a `None` threshold does not constrain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub states: Vec<String>,
    pub regions: Vec<String>,
    pub sub_regions: Vec<String>,
    pub property_types: Vec<String>,
    pub min_yield: Option<f64>,
    pub min_score: Option<f64>,
    pub min_growth: Option<f64>,
}

impl FilterCriteria {
    pub fn matches(&self, record: &SuburbRecord) -> bool {
        is_member(&self.states, record.state.as_deref())
            && is_member(&self.regions, record.region.as_deref())
            && is_member(&self.sub_regions, record.sub_region.as_deref())
            && is_member(&self.property_types, record.property_type.as_deref())
            && at_least(self.min_score, record.investor_score)
            && at_least(self.min_growth, record.growth_12m)
            && at_least(self.min_yield, record.yield_pct)
    }
}

fn is_member(selected: &[String], value: Option<&str>) -> bool {
    if selected.is_empty() {
        return true;
    }
    value.map_or(false, |v| selected.iter().any(|s| s == v))
}

// null >= t is false
fn at_least(threshold: Option<f64>, value: Option<f64>) -> bool {
    match threshold {
        None => true,
        Some(t) => value.map_or(false, |v| v >= t),
    }
}

// ============================================================================
// FILTERED VIEW
// ============================================================================

/// Rows of a dataset that satisfy a criteria, as positions in original order
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    dataset: &'a Dataset,
    indices: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    pub fn apply(dataset: &'a Dataset, criteria: &FilterCriteria) -> Self {
        let indices = dataset
            .rows()
            .iter()
            .enumerate()
            .filter(|(_, record)| criteria.matches(record))
            .map(|(i, _)| i)
            .collect();

        FilteredView { dataset, indices }
    }

    pub fn dataset(&self) -> &'a Dataset {
        self.dataset
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// (dataset position, record) pairs
    pub fn rows(&self) -> impl Iterator<Item = (usize, &'a SuburbRecord)> + '_ {
        let dataset = self.dataset;
        self.indices.iter().map(move |&i| (i, &dataset.rows()[i]))
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

// ============================================================================
// WIDGETS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SliderRange {
    pub min: f64,
    pub max: f64,
    pub default: f64,
    pub step: f64,
}

impl SliderRange {
    fn new(min: f64, max: f64, default: f64, step: f64) -> Self {
        let mut range = SliderRange { min, max, default, step };
        range.default = range.clamp(default);
        range
    }

    /// Keep a value inside the slider, snapping integer sliders to whole numbers
    pub fn clamp(&self, value: f64) -> f64 {
        let value = if self.step >= 1.0 { value.round() } else { value };
        value.max(self.min).min(self.max)
    }
}

/// Raw widget values for one render pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterInput {
    pub states: Vec<String>,
    pub regions: Vec<String>,
    pub sub_regions: Vec<String>,
    pub property_types: Vec<String>,
    pub min_yield: Option<f64>,
    pub min_score: Option<f64>,
    pub min_growth: Option<f64>,
}

/// Choices and slider bounds derived from the full dataset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterOptions {
    pub states: Vec<String>,
    pub regions: Vec<String>,
    pub sub_regions: Vec<String>,
    /// Empty when the dataset has no Property Type column
    pub property_types: Vec<String>,
    pub yield_range: SliderRange,
    pub score_range: SliderRange,
    pub growth_range: SliderRange,
}

impl FilterOptions {
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let yields = dataset.numbers(Field::Yield);
        let growth = dataset.numbers(Field::Growth12m);

        let yield_range = match min_max_mean(&yields) {
            Some((min, max, mean)) => SliderRange::new(min, max, mean, 0.01),
            None => SliderRange::new(0.0, 0.0, 0.0, 0.01),
        };

        let growth_range = match min_max_mean(&growth) {
            Some((min, max, _)) => SliderRange::new(min.trunc(), max.trunc(), 0.0, 1.0),
            None => SliderRange::new(0.0, 0.0, 0.0, 1.0),
        };

        FilterOptions {
            states: dataset.distinct(Field::State),
            regions: dataset.distinct(Field::Region),
            sub_regions: dataset.distinct(Field::SubRegion),
            property_types: dataset.distinct(Field::PropertyType),
            yield_range,
            score_range: SliderRange::new(0.0, 100.0, 50.0, 1.0),
            growth_range,
        }
    }

    /// Turn widget input into criteria: selections outside the listed options
    /// are dropped and thresholds fall back to slider defaults.
    pub fn resolve(&self, input: &FilterInput) -> FilterCriteria {
        FilterCriteria {
            states: keep_listed(&input.states, &self.states),
            regions: keep_listed(&input.regions, &self.regions),
            sub_regions: keep_listed(&input.sub_regions, &self.sub_regions),
            property_types: keep_listed(&input.property_types, &self.property_types),
            min_yield: Some(slider_value(&self.yield_range, input.min_yield)),
            min_score: Some(slider_value(&self.score_range, input.min_score)),
            min_growth: Some(slider_value(&self.growth_range, input.min_growth)),
        }
    }
}

fn keep_listed(selected: &[String], options: &[String]) -> Vec<String> {
    let mut kept: Vec<String> = Vec::new();
    for value in selected {
        if options.contains(value) && !kept.contains(value) {
            kept.push(value.clone());
        }
    }
    kept
}

fn slider_value(range: &SliderRange, value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_finite() => range.clamp(v),
        _ => range.default,
    }
}

pub fn min_max_mean(values: &[f64]) -> Option<(f64, f64, f64)> {
    if values.is_empty() {
        return None;
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    Some((min, max, mean))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Cell;

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    fn num(n: f64) -> Cell {
        Cell::Number(n)
    }

    fn dataset() -> Dataset {
        let columns = ["State", "Region\n(SA4)", "Sub Region\n(SA3)", "Suburb", "Yield", "Investor Score (Out Of 100)", "12m Growth (%)"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let rows = vec![
            vec![text("NSW"), text("Inner West"), text("Leichhardt"), text("Annandale"), num(3.0), num(55.0), num(7.4)],
            vec![text("NSW"), text("Blacktown"), text("Blacktown"), text("Blacktown"), num(4.5), num(70.0), num(-2.6)],
            vec![text("VIC"), text("West"), text("Brimbank"), text("Sunshine"), num(5.0), num(45.0), num(3.0)],
            vec![text("QLD"), text("South"), text("Mt Gravatt"), text("Mansfield"), Cell::Empty, num(90.0), num(11.0)],
        ];
        Dataset::from_table(columns, rows).unwrap()
    }

    #[test]
    fn test_empty_criteria_is_identity() {
        let dataset = dataset();
        let view = FilteredView::apply(&dataset, &FilterCriteria::default());
        assert_eq!(view.indices(), &[0, 1, 2, 3]);
    }

    #[test]
    fn test_categorical_membership() {
        let dataset = dataset();
        let criteria = FilterCriteria {
            states: vec!["NSW".to_string(), "QLD".to_string()],
            ..Default::default()
        };
        let view = FilteredView::apply(&dataset, &criteria);
        assert_eq!(view.indices(), &[0, 1, 3]);
    }

    #[test]
    fn test_thresholds_are_inclusive_lower_bounds() {
        let dataset = dataset();
        let criteria = FilterCriteria {
            min_yield: Some(4.5),
            min_score: Some(45.0),
            min_growth: Some(-3.0),
            ..Default::default()
        };
        let view = FilteredView::apply(&dataset, &criteria);
        assert_eq!(view.indices(), &[1, 2]);

        for (_, record) in view.rows() {
            assert!(record.yield_pct.unwrap() >= 4.5);
            assert!(record.investor_score.unwrap() >= 45.0);
            assert!(record.growth_12m.unwrap() >= -3.0);
        }
    }

    #[test]
    fn test_null_fails_active_threshold() {
        let dataset = dataset();
        let criteria = FilterCriteria {
            min_yield: Some(f64::MIN),
            ..Default::default()
        };
        let view = FilteredView::apply(&dataset, &criteria);
        assert!(!view.indices().contains(&3));
    }

    #[test]
    fn test_slider_ranges() {
        let options = FilterOptions::from_dataset(&dataset());

        assert_eq!(options.yield_range.min, 3.0);
        assert_eq!(options.yield_range.max, 5.0);
        assert!((options.yield_range.default - 12.5 / 3.0).abs() < 1e-9);

        assert_eq!(options.score_range.min, 0.0);
        assert_eq!(options.score_range.max, 100.0);
        assert_eq!(options.score_range.default, 50.0);

        // trunc(-2.6) = -2, trunc(11.0) = 11
        assert_eq!(options.growth_range.min, -2.0);
        assert_eq!(options.growth_range.max, 11.0);
        assert_eq!(options.growth_range.default, 0.0);
    }

    #[test]
    fn test_growth_default_clamped_into_range() {
        let columns = ["State", "Region\n(SA4)", "Sub Region\n(SA3)", "Suburb", "Yield", "Investor Score (Out Of 100)", "12m Growth (%)"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let rows = vec![vec![text("NSW"), text("R"), text("S"), text("A"), num(4.0), num(50.0), num(6.0)]];
        let dataset = Dataset::from_table(columns, rows).unwrap();

        let options = FilterOptions::from_dataset(&dataset);
        assert_eq!(options.growth_range.default, 6.0);
    }

    #[test]
    fn test_resolve_uses_defaults_and_clamps() {
        let options = FilterOptions::from_dataset(&dataset());
        let criteria = options.resolve(&FilterInput {
            states: vec!["NSW".to_string(), "WA".to_string(), "NSW".to_string()],
            min_score: Some(140.0),
            min_growth: Some(2.4),
            ..Default::default()
        });

        assert_eq!(criteria.states, vec!["NSW"]);
        assert_eq!(criteria.min_score, Some(100.0));
        assert_eq!(criteria.min_growth, Some(2.0));
        assert_eq!(criteria.min_yield, Some(options.yield_range.default));
        assert!(criteria.property_types.is_empty());
    }

    #[test]
    fn test_missing_property_type_column_lists_nothing() {
        let options = FilterOptions::from_dataset(&dataset());
        assert!(options.property_types.is_empty());

        let criteria = options.resolve(&FilterInput {
            property_types: vec!["House".to_string()],
            ..Default::default()
        });
        assert!(criteria.property_types.is_empty());
    }
}
