// 🗺️ Map View
// Scatter points for filtered rows with coordinates, the initial view state
// and the suburb selector feeding the trend charts.

use crate::dataset::{distinct_in, format_number, Field, SuburbRecord};
use crate::filter::FilteredView;
use serde::Serialize;

pub const MAP_ZOOM: f64 = 6.0;
pub const MAP_PITCH: f64 = 0.0;
pub const POINT_COLOR: [u8; 4] = [255, 20, 147, 160];
pub const POINT_RADIUS: u32 = 1000;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapPoint {
    /// Position in the full dataset
    pub row: usize,
    pub suburb: Option<String>,
    pub growth_12m: Option<f64>,
    pub latitude: f64,
    pub longitude: f64,
}

impl MapPoint {
    pub fn tooltip(&self) -> String {
        format!(
            "{}\n12m Growth: {}%",
            self.suburb.as_deref().unwrap_or(""),
            self.growth_12m.map(format_number).unwrap_or_else(|| "nan".to_string())
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ViewState {
    pub latitude: f64,
    pub longitude: f64,
    pub zoom: f64,
    pub pitch: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    pub points: Vec<MapPoint>,
    /// None when no filtered row has coordinates
    pub view_state: Option<ViewState>,
    /// Distinct suburb names of the plotted rows, first-occurrence order
    pub suburbs: Vec<String>,
    pub color: [u8; 4],
    pub radius: u32,
}

impl MapView {
    /// None when the dataset lacks a Latitude or Longitude column
    pub fn build(view: &FilteredView<'_>) -> Option<MapView> {
        let dataset = view.dataset();
        if !dataset.has_field(Field::Latitude) || !dataset.has_field(Field::Longitude) {
            return None;
        }

        let located: Vec<(usize, &SuburbRecord)> = view
            .rows()
            .filter(|(_, r)| r.latitude.is_some() && r.longitude.is_some())
            .collect();

        let points: Vec<MapPoint> = located
            .iter()
            .filter_map(|(row, r)| {
                Some(MapPoint {
                    row: *row,
                    suburb: r.suburb.clone(),
                    growth_12m: r.growth_12m,
                    latitude: r.latitude?,
                    longitude: r.longitude?,
                })
            })
            .collect();

        let view_state = center(&points).map(|(latitude, longitude)| ViewState {
            latitude,
            longitude,
            zoom: MAP_ZOOM,
            pitch: MAP_PITCH,
        });

        let suburbs = distinct_in(located.iter().map(|(_, r)| *r), Field::Suburb);

        Some(MapView {
            points,
            view_state,
            suburbs,
            color: POINT_COLOR,
            radius: POINT_RADIUS,
        })
    }

    /// The suburb a select box would show: the requested one if listed,
    /// otherwise the first listed name.
    pub fn select(&self, requested: Option<&str>) -> Option<String> {
        requested
            .filter(|name| self.suburbs.iter().any(|s| s == name))
            .map(str::to_string)
            .or_else(|| self.suburbs.first().cloned())
    }
}

fn center(points: &[MapPoint]) -> Option<(f64, f64)> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as f64;
    let lat = points.iter().map(|p| p.latitude).sum::<f64>() / n;
    let lon = points.iter().map(|p| p.longitude).sum::<f64>() / n;
    Some((lat, lon))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{Cell, Dataset};
    use crate::filter::FilterCriteria;

    fn row(state: &str, suburb: &str, growth: f64, lat: Option<f64>, lon: Option<f64>) -> Vec<Cell> {
        let coord = |v: Option<f64>| v.map(Cell::Number).unwrap_or(Cell::Empty);
        vec![
            Cell::Text(state.to_string()),
            Cell::Text("R".to_string()),
            Cell::Text("S".to_string()),
            Cell::Text(suburb.to_string()),
            Cell::Number(4.0),
            Cell::Number(60.0),
            Cell::Number(growth),
            coord(lat),
            coord(lon),
        ]
    }

    fn columns(with_coords: bool) -> Vec<String> {
        let mut cols = vec!["State", "Region\n(SA4)", "Sub Region\n(SA3)", "Suburb", "Yield", "Investor Score (Out Of 100)", "12m Growth (%)"];
        if with_coords {
            cols.extend(["Latitude", "Longitude"]);
        }
        cols.into_iter().map(str::to_string).collect()
    }

    fn dataset() -> Dataset {
        Dataset::from_table(
            columns(true),
            vec![
                row("NSW", "Parramatta", 9.0, Some(-33.81), Some(151.0)),
                row("NSW", "Penrith", 4.0, None, Some(150.7)),
                row("VIC", "Geelong", -1.0, Some(-38.15), Some(144.36)),
                row("NSW", "Parramatta", 7.0, Some(-33.81), Some(151.0)),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_drops_rows_without_coordinates() {
        let dataset = dataset();
        let view = FilteredView::apply(&dataset, &FilterCriteria::default());
        let map = MapView::build(&view).unwrap();

        let rows: Vec<usize> = map.points.iter().map(|p| p.row).collect();
        assert_eq!(rows, vec![0, 2, 3]);
        assert_eq!(map.suburbs, vec!["Parramatta", "Geelong"]);
    }

    #[test]
    fn test_center_is_mean_of_plotted_points() {
        let dataset = dataset();
        let view = FilteredView::apply(&dataset, &FilterCriteria::default());
        let state = MapView::build(&view).unwrap().view_state.unwrap();

        assert!((state.latitude - (-33.81 - 38.15 - 33.81) / 3.0).abs() < 1e-9);
        assert!((state.longitude - (151.0 + 144.36 + 151.0) / 3.0).abs() < 1e-9);
        assert_eq!(state.zoom, 6.0);
        assert_eq!(state.pitch, 0.0);
    }

    #[test]
    fn test_center_follows_filters() {
        let dataset = dataset();
        let criteria = FilterCriteria {
            states: vec!["VIC".to_string()],
            ..Default::default()
        };
        let view = FilteredView::apply(&dataset, &criteria);
        let state = MapView::build(&view).unwrap().view_state.unwrap();
        assert_eq!(state.latitude, -38.15);
        assert_eq!(state.longitude, 144.36);
    }

    #[test]
    fn test_no_points_means_no_center() {
        let dataset = dataset();
        let criteria = FilterCriteria {
            states: vec!["QLD".to_string()],
            ..Default::default()
        };
        let view = FilteredView::apply(&dataset, &criteria);
        let map = MapView::build(&view).unwrap();
        assert!(map.points.is_empty());
        assert!(map.view_state.is_none());
        assert_eq!(map.select(None), None);
    }

    #[test]
    fn test_inactive_without_coordinate_columns() {
        let dataset = Dataset::from_table(columns(false), vec![row("NSW", "A", 1.0, None, None)[..7].to_vec()]).unwrap();
        let view = FilteredView::apply(&dataset, &FilterCriteria::default());
        assert!(MapView::build(&view).is_none());
    }

    #[test]
    fn test_select_falls_back_to_first_listed() {
        let dataset = dataset();
        let view = FilteredView::apply(&dataset, &FilterCriteria::default());
        let map = MapView::build(&view).unwrap();

        assert_eq!(map.select(Some("Geelong")).as_deref(), Some("Geelong"));
        assert_eq!(map.select(Some("Penrith")).as_deref(), Some("Parramatta"));
        assert_eq!(map.select(None).as_deref(), Some("Parramatta"));
    }

    #[test]
    fn test_tooltip_text() {
        let point = MapPoint {
            row: 0,
            suburb: Some("Parramatta".to_string()),
            growth_12m: Some(9.5),
            latitude: -33.81,
            longitude: 151.0,
        };
        assert_eq!(point.tooltip(), "Parramatta\n12m Growth: 9.5%");
    }
}
