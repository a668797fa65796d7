// 🖼️ HTML Page Rendering
// Self-contained pages with inline CSS. The map and trend charts are inline SVG
// rendered on the server; the only script is the inline handlers that resubmit
// the filter form and echo slider values.

use crate::dashboard::{DashboardView, Header, TableRow};
use crate::dataset::format_number;
use crate::filter::{FilterCriteria, FilterOptions, SliderRange};
use crate::map::MapView;
use crate::trends::{TrendSeries, LINE_COLOR};

const MAP_WIDTH: f64 = 800.0;
const MAP_HEIGHT: f64 = 480.0;
const POINT_PIXEL_RADIUS: f64 = 5.0;

const CHART_WIDTH: f64 = 640.0;
const CHART_HEIGHT: f64 = 300.0;
const CHART_MARGIN: f64 = 48.0;

/// Login form only; nothing below the gate is rendered
pub fn render_login_page(error: Option<&str>) -> String {
    let error_html = error
        .map(|e| format!(r#"<div class="error">{}</div>"#, html_escape(e)))
        .unwrap_or_default();

    page(
        "Login",
        &format!(
            r#"<aside class="sidebar">
    <h2>Login</h2>
    <form method="post" action="/login">
        <label>Username <input type="text" name="username" autocomplete="username"></label>
        <label>Password <input type="password" name="password" autocomplete="current-password"></label>
        <button type="submit">Login</button>
    </form>
    {error}
</aside>
<main></main>"#,
            error = error_html,
        ),
    )
}

/// Fatal render-pass failure (e.g. the data file could not be read)
pub fn render_error_page(message: &str) -> String {
    page(
        "Error",
        &format!(
            r#"<main><div class="error"><h2>Dashboard failed to load</h2><pre>{}</pre></div></main>"#,
            html_escape(message)
        ),
    )
}

pub fn render_dashboard_page(view: &DashboardView) -> String {
    let body = format!(
        r#"<aside class="sidebar">
    {sidebar}
    <form method="post" action="/logout"><button type="submit">Logout</button></form>
</aside>
<main>
    {header}
    <h3>📋 Full Suburb Data</h3>
    {table}
    {map}
    {trends}
    <hr>
    <footer>{footer}</footer>
</main>"#,
        sidebar = render_filters(&view.options, &view.criteria),
        header = render_header(&view.header),
        table = render_table(&view.columns, &view.table),
        map = view
            .map
            .as_ref()
            .map(|m| render_map_section(m, view.selected_suburb.as_deref()))
            .unwrap_or_default(),
        trends = render_trends(view.selected_suburb.as_deref(), &view.trends),
        footer = html_escape(&view.footer),
    );

    page("Investment Dashboard", &body)
}

fn page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>PropwealthNext - {title}</title>
    <style>{css}</style>
</head>
<body>
<div class="layout">
{body}
</div>
</body>
</html>"#,
        title = html_escape(title),
        css = inline_css(),
        body = body,
    )
}

fn render_header(header: &Header) -> String {
    let logo = if header.logo_available {
        format!(r#"<img src="/logo" width="{}" alt="PropWealth logo">"#, header.logo_width)
    } else {
        format!(
            r#"<div class="logo-missing" style="width:{}px">Logo unavailable</div>"#,
            header.logo_width
        )
    };
    format!("{}\n<h1>{}</h1>", logo, html_escape(&header.title))
}

// ============================================================================
// Sidebar
// ============================================================================

fn render_filters(options: &FilterOptions, criteria: &FilterCriteria) -> String {
    format!(
        r#"<h2>🎛️ Filter Suburbs</h2>
    <form id="filters" method="get" action="/">
        {states}
        {regions}
        {sa3s}
        {property}
        {min_yield}
        {min_score}
        {min_growth}
        <button type="submit">Apply</button>
    </form>"#,
        states = multiselect("State", "state", &options.states, &criteria.states),
        regions = multiselect("Region (SA4)", "region", &options.regions, &criteria.regions),
        sa3s = multiselect("Sub Region (SA3)", "sa3", &options.sub_regions, &criteria.sub_regions),
        property = multiselect("Property Type", "property", &options.property_types, &criteria.property_types),
        min_yield = slider("Min Yield (%)", "min_yield", &options.yield_range, criteria.min_yield),
        min_score = slider("Min Investor Score", "min_score", &options.score_range, criteria.min_score),
        min_growth = slider("Min 12m Growth %", "min_growth", &options.growth_range, criteria.min_growth),
    )
}

fn multiselect(label: &str, name: &str, options: &[String], selected: &[String]) -> String {
    let items: String = options
        .iter()
        .map(|o| {
            let mark = if selected.contains(o) { " selected" } else { "" };
            format!(r#"<option value="{v}"{mark}>{v}</option>"#, v = html_escape(o), mark = mark)
        })
        .collect();

    format!(
        r#"<label>{label}<select name="{name}" multiple size="4">{items}</select></label>"#,
        label = html_escape(label),
        name = name,
        items = items,
    )
}

fn slider(label: &str, name: &str, range: &SliderRange, value: Option<f64>) -> String {
    let value = value.unwrap_or(range.default);
    format!(
        r#"<label>{label} <output>{shown}</output><input type="range" name="{name}" min="{min}" max="{max}" step="{step}" value="{value}" oninput="this.previousElementSibling.value=this.value"></label>"#,
        label = html_escape(label),
        shown = format_number(value),
        name = name,
        min = range.min,
        max = range.max,
        step = range.step,
        value = value,
    )
}

// ============================================================================
// Table
// ============================================================================

fn render_table(columns: &[String], rows: &[TableRow]) -> String {
    let head: String = std::iter::once("<th></th>".to_string())
        .chain(columns.iter().map(|c| format!("<th>{}</th>", html_escape(c))))
        .collect();

    let body: String = rows
        .iter()
        .map(|row| {
            let cells: String = row
                .cells
                .iter()
                .map(|c| format!("<td>{}</td>", html_escape(&c.to_string())))
                .collect();
            format!(r#"<tr><th class="index">{}</th>{}</tr>"#, row.row, cells)
        })
        .collect();

    format!(
        r#"<div class="table-wrap"><table><thead><tr>{}</tr></thead><tbody>{}</tbody></table></div>
    <p class="muted">{} rows</p>"#,
        head,
        body,
        rows.len()
    )
}

// ============================================================================
// Map
// ============================================================================

fn render_map_section(map: &MapView, selected: Option<&str>) -> String {
    let choices: String = map
        .suburbs
        .iter()
        .map(|s| {
            let mark = if Some(s.as_str()) == selected { " selected" } else { "" };
            format!(r#"<option value="{v}"{mark}>{v}</option>"#, v = html_escape(s), mark = mark)
        })
        .collect();

    format!(
        r#"<h3>🗺️ 12-Month Growth Map</h3>
    <label>Select a Suburb for Trends <select name="suburb" form="filters" onchange="this.form.submit()">{choices}</select></label>
    {svg}"#,
        choices = choices,
        svg = render_map_svg(map),
    )
}

/// Equirectangular projection around the view center. Pixels per degree
/// follow the zoom level, shrunk only as far as needed to fit every point.
pub fn render_map_svg(map: &MapView) -> String {
    let Some(center) = map.view_state else {
        return format!(
            r#"<svg class="map" width="{w}" height="{h}" viewBox="0 0 {w} {h}"><rect width="100%" height="100%" class="map-bg"/><text x="50%" y="50%" text-anchor="middle">No suburbs with coordinates</text></svg>"#,
            w = MAP_WIDTH,
            h = MAP_HEIGHT
        );
    };

    let zoom_scale = 256.0 * 2f64.powf(center.zoom) / 360.0;
    let max_dlon = map.points.iter().map(|p| (p.longitude - center.longitude).abs()).fold(0.0, f64::max);
    let max_dlat = map.points.iter().map(|p| (p.latitude - center.latitude).abs()).fold(0.0, f64::max);
    let mut scale = zoom_scale;
    if max_dlon > 0.0 {
        scale = scale.min(MAP_WIDTH * 0.45 / max_dlon);
    }
    if max_dlat > 0.0 {
        scale = scale.min(MAP_HEIGHT * 0.45 / max_dlat);
    }

    let [r, g, b, a] = map.color;
    let fill = format!("rgba({},{},{},{:.3})", r, g, b, a as f64 / 255.0);

    let points: String = map
        .points
        .iter()
        .map(|p| {
            let x = MAP_WIDTH / 2.0 + (p.longitude - center.longitude) * scale;
            let y = MAP_HEIGHT / 2.0 - (p.latitude - center.latitude) * scale;
            format!(
                r#"<circle cx="{:.1}" cy="{:.1}" r="{}" fill="{}"><title>{}</title></circle>"#,
                x,
                y,
                POINT_PIXEL_RADIUS,
                fill,
                html_escape(&p.tooltip())
            )
        })
        .collect();

    format!(
        r#"<svg class="map" width="{w}" height="{h}" viewBox="0 0 {w} {h}" data-lat="{lat}" data-lon="{lon}" data-zoom="{zoom}" data-pitch="{pitch}"><rect width="100%" height="100%" class="map-bg"/>{points}</svg>"#,
        w = MAP_WIDTH,
        h = MAP_HEIGHT,
        lat = center.latitude,
        lon = center.longitude,
        zoom = center.zoom,
        pitch = center.pitch,
        points = points,
    )
}

// ============================================================================
// Trends
// ============================================================================

fn render_trends(selected: Option<&str>, trends: &[TrendSeries]) -> String {
    let Some(suburb) = selected else {
        return String::new();
    };

    let charts: String = trends
        .iter()
        .map(|t| format!("<p>{}</p>{}", html_escape(&t.title), render_chart_svg(t)))
        .collect();

    format!("<h3>📈 Trends for {}</h3>{}", html_escape(suburb), charts)
}

/// Line chart with point markers; the x axis is the dataset row position
pub fn render_chart_svg(series: &TrendSeries) -> String {
    let plot_w = CHART_WIDTH - 2.0 * CHART_MARGIN;
    let plot_h = CHART_HEIGHT - 2.0 * CHART_MARGIN;

    let (x_min, x_max) = match (series.points.first(), series.points.last()) {
        (Some(first), Some(last)) => (first.row as f64, last.row as f64),
        _ => (0.0, 1.0),
    };
    let (y_min, y_max) = series.value_bounds().unwrap_or((0.0, 1.0));

    // Single-valued axes get a unit span so the point sits mid-plot
    let span = |lo: f64, hi: f64| if hi > lo { (lo, hi) } else { (lo - 0.5, hi + 0.5) };
    let (x_lo, x_hi) = span(x_min, x_max);
    let (y_lo, y_hi) = span(y_min, y_max);

    let px = |x: f64| CHART_MARGIN + (x - x_lo) / (x_hi - x_lo) * plot_w;
    let py = |y: f64| CHART_HEIGHT - CHART_MARGIN - (y - y_lo) / (y_hi - y_lo) * plot_h;

    let mut shapes = String::new();
    for segment in series.segments() {
        let coords: Vec<String> = segment
            .iter()
            .map(|(row, v)| format!("{:.1},{:.1}", px(*row as f64), py(*v)))
            .collect();
        shapes.push_str(&format!(
            r#"<polyline fill="none" stroke="{}" stroke-width="2" points="{}"/>"#,
            LINE_COLOR,
            coords.join(" ")
        ));
        for (row, v) in &segment {
            shapes.push_str(&format!(
                r#"<circle cx="{:.1}" cy="{:.1}" r="3.5" fill="{}"><title>{}: {}</title></circle>"#,
                px(*row as f64),
                py(*v),
                LINE_COLOR,
                row,
                format_number(*v)
            ));
        }
    }

    let bottom = CHART_HEIGHT - CHART_MARGIN;
    let right = CHART_WIDTH - CHART_MARGIN;

    format!(
        r#"<svg class="chart" width="{w}" height="{h}" viewBox="0 0 {w} {h}">
<line x1="{m}" y1="{bottom}" x2="{right}" y2="{bottom}" class="axis"/>
<line x1="{m}" y1="{m}" x2="{m}" y2="{bottom}" class="axis"/>
<text x="{m}" y="{xl}" text-anchor="middle">{x_lo_label}</text>
<text x="{right}" y="{xl}" text-anchor="middle">{x_hi_label}</text>
<text x="{yt}" y="{bottom}" text-anchor="end">{y_lo_label}</text>
<text x="{yt}" y="{m}" text-anchor="end">{y_hi_label}</text>
<text transform="translate(12,{mid}) rotate(-90)" text-anchor="middle">{y_label}</text>
{shapes}
</svg>"#,
        w = CHART_WIDTH,
        h = CHART_HEIGHT,
        m = CHART_MARGIN,
        bottom = bottom,
        right = right,
        xl = bottom + 16.0,
        yt = CHART_MARGIN - 4.0,
        mid = CHART_HEIGHT / 2.0,
        x_lo_label = format_number(x_min),
        x_hi_label = format_number(x_max),
        y_lo_label = format_number(y_min),
        y_hi_label = format_number(y_max),
        y_label = html_escape(&series.y_label),
        shapes = shapes,
    )
}

fn inline_css() -> &'static str {
    r#"
* { box-sizing: border-box; }
body { margin: 0; font-family: system-ui, -apple-system, 'Segoe UI', sans-serif; color: black; background-color: #fff0f5; }
.layout { display: flex; min-height: 100vh; }
.sidebar { width: 300px; padding: 1.5rem; background: #fde4ee; }
.sidebar label { display: block; margin: 0.75rem 0; font-size: 0.9rem; }
.sidebar select, .sidebar input { width: 100%; }
main { flex: 1; padding: 2rem; overflow-x: auto; }
.error { color: #b00020; background: #fde8ec; padding: 0.75rem; border-radius: 4px; }
.logo-missing { border: 1px dashed #999; padding: 1rem; color: #666; text-align: center; }
.table-wrap { max-height: 420px; overflow: auto; border: 1px solid #e5c6d3; }
table { border-collapse: collapse; font-size: 0.85rem; }
th, td { padding: 0.3rem 0.6rem; border-bottom: 1px solid #f0d5e0; white-space: pre-line; text-align: left; }
th.index { color: #888; font-weight: normal; }
.muted { color: #777; font-size: 0.8rem; }
.map-bg { fill: #f6f6f6; }
.axis { stroke: #444; }
svg text { font-size: 11px; }
"#
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
