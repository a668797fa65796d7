// PropwealthNext - Web Front End
// Axum router: cookie sessions, HTML dashboard and a small JSON API

use crate::auth::{Session, SessionRegistry, INVALID_CREDENTIALS};
use crate::dashboard::{Dashboard, DashboardView, Page, TableRow, WidgetState};
use crate::dataset::DatasetError;
use crate::filter::FilterInput;
use crate::html::{render_dashboard_page, render_error_page, render_login_page};
use crate::trends::trends_for;
use axum::{
    extract::{Path, RawQuery, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_cookies::cookie::SameSite;
use tower_cookies::{Cookie, CookieManagerLayer, Cookies};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeFile;
use tower_http::trace::TraceLayer;
use tracing::error;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "propwealth_session";

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub dashboard: Arc<Dashboard>,
    pub sessions: Arc<SessionRegistry>,
}

impl AppState {
    pub fn new(dashboard: Dashboard) -> Self {
        AppState {
            dashboard: Arc::new(dashboard),
            sessions: Arc::new(SessionRegistry::new()),
        }
    }
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Deserialize)]
struct LoginForm {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

// ============================================================================
// Sessions & query parsing
// ============================================================================

/// Live session id behind the request cookie, if any
fn current_session(state: &AppState, cookies: &Cookies) -> Option<Uuid> {
    let cookie = cookies.get(SESSION_COOKIE);
    state.sessions.lookup(cookie.as_ref().map(|c| c.value()))
}

/// Snapshot for a render pass; anonymous callers get a closed gate
fn session_for(state: &AppState, cookies: &Cookies) -> Session {
    current_session(state, cookies)
        .and_then(|id| state.sessions.get(&id))
        .unwrap_or_default()
}

fn issue_cookie(cookies: &Cookies, id: Uuid) {
    let mut cookie = Cookie::new(SESSION_COOKIE, id.to_string());
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookies.add(cookie);
}

fn clear_cookie(cookies: &Cookies) {
    let mut cookie = Cookie::from(SESSION_COOKIE);
    cookie.set_path("/");
    cookies.remove(cookie);
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|s| s.into_owned())
        .unwrap_or(spaced)
}

/// Widget state from a query string. Multi-selects repeat their key;
/// unparseable numbers count as unset.
pub fn parse_widgets(query: &str) -> WidgetState {
    let mut filters = FilterInput::default();
    let mut suburb = None;

    for pair in query.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        let value = decode_component(value);

        match decode_component(key).as_str() {
            "state" => filters.states.push(value),
            "region" => filters.regions.push(value),
            "sa3" => filters.sub_regions.push(value),
            "property" => filters.property_types.push(value),
            "min_yield" => filters.min_yield = parse_number(&value),
            "min_score" => filters.min_score = parse_number(&value),
            "min_growth" => filters.min_growth = parse_number(&value),
            "suburb" if !value.is_empty() => suburb = Some(value),
            _ => {}
        }
    }

    WidgetState { filters, suburb }
}

fn parse_number(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Run dataset work on the blocking pool; a cold cache reads the workbook from disk
async fn off_runtime<T, F>(work: F) -> Result<T, String>
where
    F: FnOnce() -> Result<T, DatasetError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| format!("render task failed: {}", e))?
        .map_err(|e| e.to_string())
}

async fn render_pass(state: &AppState, session: Session, widgets: WidgetState) -> Result<Page, String> {
    let dashboard = Arc::clone(&state.dashboard);
    off_runtime(move || dashboard.render(&session, &widgets, None)).await
}

fn page_failure(message: &str) -> Response {
    error!("render pass failed: {}", message);
    (StatusCode::INTERNAL_SERVER_ERROR, Html(render_error_page(message))).into_response()
}

fn api_failure(message: &str) -> Response {
    error!("api request failed: {}", message);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::<()>::err(message)),
    )
        .into_response()
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, Json(ApiResponse::<()>::err("login required"))).into_response()
}

// ============================================================================
// Page Handlers
// ============================================================================

/// GET / - Dashboard (login form while the gate is closed)
async fn index(State(state): State<AppState>, cookies: Cookies, RawQuery(query): RawQuery) -> Response {
    let session = session_for(&state, &cookies);
    let widgets = parse_widgets(query.as_deref().unwrap_or(""));

    match render_pass(&state, session, widgets).await {
        Ok(Page::Login { error }) => Html(render_login_page(error.as_deref())).into_response(),
        Ok(Page::Dashboard(view)) => Html(render_dashboard_page(&view)).into_response(),
        Err(message) => page_failure(&message),
    }
}

/// POST /login - Check credentials; a session exists only after success
async fn login(State(state): State<AppState>, cookies: Cookies, Form(form): Form<LoginForm>) -> Response {
    let previous = current_session(&state, &cookies);
    let credentials = state.dashboard.credentials();

    match state.sessions.login(previous, credentials, &form.username, &form.password) {
        Some(id) => {
            issue_cookie(&cookies, id);
            Redirect::to("/").into_response()
        }
        None => Html(render_login_page(Some(INVALID_CREDENTIALS))).into_response(),
    }
}

/// POST /logout - Close the gate again
async fn logout(State(state): State<AppState>, cookies: Cookies) -> Response {
    if let Some(id) = current_session(&state, &cookies) {
        state.sessions.logout(&id);
    }
    clear_cookie(&cookies);
    Redirect::to("/").into_response()
}

// ============================================================================
// API Handlers
// ============================================================================

#[derive(Serialize)]
struct SuburbsResponse {
    columns: Vec<String>,
    total_rows: usize,
    rows: Vec<TableRow>,
}

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// Run one render pass for an authenticated API caller
async fn api_render(state: &AppState, cookies: &Cookies, query: Option<String>) -> Result<DashboardView, Response> {
    let session = session_for(state, cookies);
    if !session.logged_in {
        return Err(unauthorized());
    }
    let widgets = parse_widgets(query.as_deref().unwrap_or(""));

    match render_pass(state, session, widgets).await {
        Ok(Page::Dashboard(view)) => Ok(*view),
        Ok(Page::Login { .. }) => Err(unauthorized()),
        Err(message) => Err(api_failure(&message)),
    }
}

/// GET /api/suburbs - Filtered rows
async fn get_suburbs(State(state): State<AppState>, cookies: Cookies, RawQuery(query): RawQuery) -> Response {
    match api_render(&state, &cookies, query).await {
        Ok(view) => Json(ApiResponse::ok(SuburbsResponse {
            columns: view.columns,
            total_rows: view.total_rows,
            rows: view.table,
        }))
        .into_response(),
        Err(response) => response,
    }
}

/// GET /api/map - Map points and initial view state
async fn get_map(State(state): State<AppState>, cookies: Cookies, RawQuery(query): RawQuery) -> Response {
    match api_render(&state, &cookies, query).await {
        Ok(view) => Json(ApiResponse::ok(view.map)).into_response(),
        Err(response) => response,
    }
}

/// GET /api/trends/:suburb - Trend series from the unfiltered dataset
async fn get_trends(State(state): State<AppState>, cookies: Cookies, Path(suburb): Path<String>) -> Response {
    if !session_for(&state, &cookies).logged_in {
        return unauthorized();
    }

    let dashboard = Arc::clone(&state.dashboard);
    match off_runtime(move || dashboard.dataset()).await {
        Ok(dataset) => Json(ApiResponse::ok(trends_for(&dataset, &suburb))).into_response(),
        Err(message) => api_failure(&message),
    }
}

// ============================================================================
// Router
// ============================================================================

pub fn router(state: AppState) -> Router {
    let logo = ServeFile::new(&state.dashboard.config().logo_path);

    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/suburbs", get(get_suburbs))
        .route("/map", get(get_map))
        .route("/trends/:suburb", get(get_trends));

    Router::new()
        .route("/", get(index))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route_service("/logo", logo)
        .nest("/api", api_routes)
        .with_state(state)
        .layer(CookieManagerLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DashboardConfig;
    use crate::dataset::tests::{write_csv, SAMPLE_CSV};
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use tower::ServiceExt;

    fn state(data: &std::path::Path) -> AppState {
        let config = DashboardConfig {
            data_path: data.to_path_buf(),
            logo_path: "/no/such/logo.png".into(),
            ..Default::default()
        };
        AppState::new(Dashboard::new(config))
    }

    fn app(data: &std::path::Path) -> Router {
        router(state(data))
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn cookie_of(response: &Response) -> Option<String> {
        response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(str::to_string)
    }

    async fn login_cookie(app: &Router, password: &str) -> (StatusCode, Option<String>, String) {
        let response = app
            .clone()
            .oneshot(
                Request::post("/login")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from(format!("username=admin&password={}", password)))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let cookie = cookie_of(&response);
        (status, cookie, body_text(response).await)
    }

    #[test]
    fn test_parse_widgets() {
        let widgets = parse_widgets("state=NSW&state=VIC&region=Sydney+-+Blacktown&min_score=55&min_yield=abc&suburb=Glen%20Iris");
        assert_eq!(widgets.filters.states, vec!["NSW", "VIC"]);
        assert_eq!(widgets.filters.regions, vec!["Sydney - Blacktown"]);
        assert_eq!(widgets.filters.min_score, Some(55.0));
        assert_eq!(widgets.filters.min_yield, None);
        assert_eq!(widgets.suburb.as_deref(), Some("Glen Iris"));
    }

    #[tokio::test]
    async fn test_anonymous_requests_create_no_sessions() {
        let file = write_csv(SAMPLE_CSV);
        let state = state(file.path());
        let app = router(state.clone());

        for path in ["/api/suburbs", "/api/map", "/api/trends/Blacktown", "/"] {
            for _ in 0..25 {
                let response = app
                    .clone()
                    .oneshot(
                        Request::get(path)
                            .header(header::COOKIE, format!("{}={}", SESSION_COOKIE, Uuid::new_v4()))
                            .body(Body::empty())
                            .unwrap(),
                    )
                    .await
                    .unwrap();
                assert!(cookie_of(&response).is_none());
            }
        }
        assert!(state.sessions.is_empty());

        let (_, cookie, _) = login_cookie(&app, "wrong").await;
        assert!(cookie.is_none());
        assert!(state.sessions.is_empty());

        let (_, cookie, _) = login_cookie(&app, "pass123").await;
        assert!(cookie.unwrap().starts_with("propwealth_session="));
        assert_eq!(state.sessions.len(), 1);
    }

    #[tokio::test]
    async fn test_health() {
        let response = app(std::path::Path::new("/missing.csv"))
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains(r#""data":"OK""#));
    }

    #[tokio::test]
    async fn test_login_gate() {
        let file = write_csv(SAMPLE_CSV);
        let app = app(file.path());

        let response = app.clone().oneshot(Request::get("/").body(Body::empty()).unwrap()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(cookie_of(&response).is_none());
        let html = body_text(response).await;
        assert!(html.contains(r#"action="/login""#));
        assert!(!html.contains("Full Suburb Data"));

        let (status, _, html) = login_cookie(&app, "wrong").await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains(INVALID_CREDENTIALS));
    }

    #[tokio::test]
    async fn test_dashboard_after_login() {
        let file = write_csv(SAMPLE_CSV);
        let app = app(file.path());

        let (status, cookie, _) = login_cookie(&app, "pass123").await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        let cookie = cookie.unwrap();

        let response = app
            .clone()
            .oneshot(
                Request::get("/?state=NSW&min_yield=0&min_growth=-5&suburb=Blacktown")
                    .header(header::COOKIE, &cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("Full Suburb Data"));
        assert!(html.contains("12-Month Growth Map"));
        assert!(html.contains("Trends for Blacktown"));
        assert!(html.contains("Median Price Growth Trend"));
        assert!(html.contains("Logo unavailable"));
        assert!(html.contains("Built with"));
    }

    #[tokio::test]
    async fn test_api_requires_login() {
        let file = write_csv(SAMPLE_CSV);
        let response = app(file.path())
            .oneshot(Request::get("/api/suburbs").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_api_suburbs_and_trends() {
        let file = write_csv(SAMPLE_CSV);
        let app = app(file.path());
        let cookie = login_cookie(&app, "pass123").await.1.unwrap();

        let response = app
            .clone()
            .oneshot(
                Request::get("/api/suburbs?state=QLD&min_yield=0")
                    .header(header::COOKIE, &cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(json["data"]["total_rows"], 4);
        assert_eq!(json["data"]["rows"].as_array().unwrap().len(), 1);
        assert_eq!(json["data"]["rows"][0]["row"], 3);

        let response = app
            .oneshot(
                Request::get("/api/trends/Blacktown")
                    .header(header::COOKIE, &cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        let series = json["data"].as_array().unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series[0]["points"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_missing_data_is_server_error() {
        let app = app(std::path::Path::new("/missing/Book2.xlsx"));
        let cookie = login_cookie(&app, "pass123").await.1.unwrap();

        let response = app
            .oneshot(Request::get("/").header(header::COOKIE, &cookie).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body_text(response).await.contains("data file not found"));
    }

    #[tokio::test]
    async fn test_logout_closes_gate() {
        let file = write_csv(SAMPLE_CSV);
        let app = app(file.path());
        let cookie = login_cookie(&app, "pass123").await.1.unwrap();

        let response = app
            .clone()
            .oneshot(Request::post("/logout").header(header::COOKIE, &cookie).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert!(cookie_of(&response).unwrap().starts_with("propwealth_session="));

        let response = app
            .oneshot(Request::get("/").header(header::COOKIE, &cookie).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(body_text(response).await.contains(r#"action="/login""#));
    }
}
