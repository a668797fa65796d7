// End-to-end: three suburbs through login, filters, map and trends

use propwealth_dashboard::{
    load_dataset, Dashboard, DashboardConfig, FilterCriteria, FilterInput, FilteredView, MapView, Page, Session,
    WidgetState, trends_for,
};
use std::io::Write;

const HEADER: &str = "State,\"Region\n(SA4)\",\"Sub Region\n(SA3)\",Suburb,Yield,Investor Score (Out Of 100),12m Growth (%),Latitude,Longitude,Median Price Growth,Days on Market,Rental Growth,Sales Turnover";

const ROWS: [&str; 4] = [
    "NSW,Sydney,Parramatta,A,5,60,10,-33.8,151.2,4.0,30,2.0,1.1",
    "VIC,Melbourne,Brimbank,B,2,40,-5,,,1.0,55,0.5,0.7",
    "NSW,Sydney,Parramatta,C,6,80,15,-37.8,144.9,6.0,21,3.0,1.4",
    "NSW,Sydney,Parramatta,A,5.5,61,11,-33.8,151.2,4.5,28,2.2,1.2",
];

fn scenario_file(rows: &[&str]) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    writeln!(file, "{}", HEADER).unwrap();
    for row in rows {
        writeln!(file, "{}", row).unwrap();
    }
    file
}

#[test]
fn state_and_score_filter_then_map_center() {
    let file = scenario_file(&ROWS[..3]);
    let dataset = load_dataset(file.path(), "Sheet1").unwrap();
    assert_eq!(dataset.len(), 3);

    let criteria = FilterCriteria {
        states: vec!["NSW".to_string()],
        min_score: Some(50.0),
        ..Default::default()
    };
    let view = FilteredView::apply(&dataset, &criteria);
    let suburbs: Vec<_> = view.rows().map(|(_, r)| r.suburb.clone().unwrap()).collect();
    assert_eq!(suburbs, vec!["A", "C"]);

    let map = MapView::build(&view).unwrap();
    assert_eq!(map.points.len(), 2);
    let center = map.view_state.unwrap();
    assert!((center.latitude - -35.8).abs() < 1e-9);
    assert!((center.longitude - 148.05).abs() < 1e-9);
}

#[test]
fn trends_ignore_active_filters() {
    let file = scenario_file(&ROWS);
    let dataset = load_dataset(file.path(), "Sheet1").unwrap();

    let criteria = FilterCriteria {
        states: vec!["VIC".to_string()],
        ..Default::default()
    };
    let view = FilteredView::apply(&dataset, &criteria);
    assert!(view.rows().all(|(_, r)| r.suburb.as_deref() != Some("A")));

    let series = trends_for(&dataset, "A");
    assert_eq!(series.len(), 4);
    for s in &series {
        let rows: Vec<usize> = s.points.iter().map(|p| p.row).collect();
        assert_eq!(rows, vec![0, 3]);
    }
}

#[test]
fn full_render_pass_behind_login() {
    let file = scenario_file(&ROWS);
    let dashboard = Dashboard::new(DashboardConfig {
        data_path: file.path().to_path_buf(),
        ..Default::default()
    });

    let mut session = Session::new();
    let widgets = WidgetState {
        filters: FilterInput {
            states: vec!["NSW".to_string()],
            min_yield: Some(2.0),
            min_score: Some(50.0),
            min_growth: Some(-5.0),
            ..Default::default()
        },
        suburb: Some("C".to_string()),
    };

    assert!(matches!(dashboard.render(&session, &widgets, None).unwrap(), Page::Login { .. }));
    assert!(!dashboard.attempt_login(&mut session, "propwealth", "INVEST2025"));
    assert!(dashboard.attempt_login(&mut session, "propwealth", "invest2025"));

    let view = match dashboard.render(&session, &widgets, None).unwrap() {
        Page::Dashboard(view) => view,
        Page::Login { .. } => panic!("gate should be open"),
    };

    let rows: Vec<usize> = view.table.iter().map(|r| r.row).collect();
    assert_eq!(rows, vec![0, 2, 3]);
    assert_eq!(view.columns.len(), 13);
    assert_eq!(view.map.as_ref().unwrap().suburbs, vec!["A", "C"]);
    assert_eq!(view.selected_suburb.as_deref(), Some("C"));
    assert_eq!(view.trends.len(), 4);
    assert_eq!(view.trends[1].title, "Days on Market Trend");
    assert_eq!(view.trends[1].points[0].value, Some(21.0));
}
