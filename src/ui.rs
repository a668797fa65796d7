use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use propwealth_dashboard::auth::INVALID_CREDENTIALS;
use propwealth_dashboard::dataset::format_number;
use propwealth_dashboard::{Dashboard, DashboardView, Page as RenderedPage, Session, SliderRange, TrendSeries, WidgetState};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Map, MapResolution, Points},
        Axis, Block, Borders, Cell, Chart, Dataset, GraphType, Paragraph, Row, Table, TableState,
    },
    Frame, Terminal,
};
use std::io;

const PINK: Color = Color::Rgb(255, 20, 147);
const HOT_PINK: Color = Color::Rgb(255, 105, 180);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Table,
    Map,
    Trends,
}

impl Page {
    pub fn next(&self) -> Self {
        match self {
            Page::Table => Page::Map,
            Page::Map => Page::Trends,
            Page::Trends => Page::Table,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Page::Table => Page::Trends,
            Page::Map => Page::Table,
            Page::Trends => Page::Map,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Page::Table => "📋 Full Suburb Data",
            Page::Map => "🗺️ 12-Month Growth Map",
            Page::Trends => "📈 Trends",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Sidebar,
    Content,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginField {
    Username,
    Password,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Group {
    State,
    Region,
    SubRegion,
    PropertyType,
}

impl Group {
    const ALL: [Group; 4] = [Group::State, Group::Region, Group::SubRegion, Group::PropertyType];

    fn title(&self) -> &str {
        match self {
            Group::State => "State",
            Group::Region => "Region (SA4)",
            Group::SubRegion => "Sub Region (SA3)",
            Group::PropertyType => "Property Type",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slider {
    Yield,
    Score,
    Growth,
}

impl Slider {
    const ALL: [Slider; 3] = [Slider::Yield, Slider::Score, Slider::Growth];

    fn title(&self) -> &str {
        match self {
            Slider::Yield => "Min Yield (%)",
            Slider::Score => "Min Investor Score",
            Slider::Growth => "Min 12m Growth %",
        }
    }
}

/// One selectable line of the filter sidebar
#[derive(Debug, Clone, PartialEq)]
pub enum SidebarItem {
    Choice { group: Group, value: String, selected: bool },
    Slider { slider: Slider, value: f64, range: SliderRange },
}

pub struct App {
    dashboard: Dashboard,
    pub session: Session,
    pub widgets: WidgetState,
    pub view: Option<DashboardView>,
    pub login_error: Option<String>,
    pub username: String,
    pub password: String,
    pub login_field: LoginField,
    pub current_page: Page,
    pub focus: Focus,
    pub sidebar_cursor: usize,
    pub table_state: TableState,
    pub should_quit: bool,
}

impl App {
    pub fn new(dashboard: Dashboard) -> Self {
        Self {
            dashboard,
            session: Session::new(),
            widgets: WidgetState::default(),
            view: None,
            login_error: None,
            username: String::new(),
            password: String::new(),
            login_field: LoginField::Username,
            current_page: Page::Table,
            focus: Focus::Sidebar,
            sidebar_cursor: 0,
            table_state: TableState::default(),
            should_quit: false,
        }
    }

    /// Run one render pass with the current widgets. Dataset errors are fatal.
    pub fn refresh(&mut self) -> Result<()> {
        match self.dashboard.render(&self.session, &self.widgets, self.login_error.clone())? {
            RenderedPage::Login { .. } => self.view = None,
            RenderedPage::Dashboard(view) => {
                // Pin sliders to the values actually applied
                self.widgets.filters.min_yield = view.criteria.min_yield;
                self.widgets.filters.min_score = view.criteria.min_score;
                self.widgets.filters.min_growth = view.criteria.min_growth;
                self.widgets.suburb = view.selected_suburb.clone();

                self.table_state.select(if view.table.is_empty() { None } else { Some(0) });
                self.view = Some(*view);
            }
        }
        Ok(())
    }

    pub fn submit_login(&mut self) -> Result<()> {
        if self.dashboard.attempt_login(&mut self.session, &self.username, &self.password) {
            self.login_error = None;
            self.password.clear();
            self.refresh()
        } else {
            self.login_error = Some(INVALID_CREDENTIALS.to_string());
            Ok(())
        }
    }

    /// Close the gate; widget selections survive for the next login
    pub fn logout(&mut self) {
        self.session.logout();
        self.view = None;
        self.username.clear();
        self.login_field = LoginField::Username;
        self.focus = Focus::Sidebar;
    }

    pub fn sidebar_items(&self) -> Vec<SidebarItem> {
        let Some(view) = &self.view else {
            return Vec::new();
        };

        let mut items = Vec::new();
        for group in Group::ALL {
            let (options, selected) = match group {
                Group::State => (&view.options.states, &view.criteria.states),
                Group::Region => (&view.options.regions, &view.criteria.regions),
                Group::SubRegion => (&view.options.sub_regions, &view.criteria.sub_regions),
                Group::PropertyType => (&view.options.property_types, &view.criteria.property_types),
            };
            for value in options {
                items.push(SidebarItem::Choice {
                    group,
                    value: value.clone(),
                    selected: selected.contains(value),
                });
            }
        }

        for slider in Slider::ALL {
            let (range, value) = match slider {
                Slider::Yield => (view.options.yield_range, view.criteria.min_yield),
                Slider::Score => (view.options.score_range, view.criteria.min_score),
                Slider::Growth => (view.options.growth_range, view.criteria.min_growth),
            };
            items.push(SidebarItem::Slider {
                slider,
                value: value.unwrap_or(range.default),
                range,
            });
        }

        items
    }

    fn selection_mut(&mut self, group: Group) -> &mut Vec<String> {
        let filters = &mut self.widgets.filters;
        match group {
            Group::State => &mut filters.states,
            Group::Region => &mut filters.regions,
            Group::SubRegion => &mut filters.sub_regions,
            Group::PropertyType => &mut filters.property_types,
        }
    }

    /// Space on a choice: add or remove it from its multi-select
    pub fn toggle_current(&mut self) -> Result<()> {
        let items = self.sidebar_items();
        if let Some(SidebarItem::Choice { group, value, selected }) = items.get(self.sidebar_cursor).cloned() {
            let selection = self.selection_mut(group);
            if selected {
                selection.retain(|v| v != &value);
            } else {
                selection.push(value);
            }
            self.refresh()?;
        }
        Ok(())
    }

    /// Left/Right on a slider: move by one step (yield moves by at least 0.1)
    pub fn nudge_current(&mut self, direction: f64) -> Result<()> {
        let items = self.sidebar_items();
        if let Some(SidebarItem::Slider { slider, value, range }) = items.get(self.sidebar_cursor).cloned() {
            let next = range.clamp(value + direction * range.step.max(0.1));
            let filters = &mut self.widgets.filters;
            match slider {
                Slider::Yield => filters.min_yield = Some(next),
                Slider::Score => filters.min_score = Some(next),
                Slider::Growth => filters.min_growth = Some(next),
            }
            self.refresh()?;
        }
        Ok(())
    }

    /// `[` / `]`: step through the suburbs listed under the map
    pub fn cycle_suburb(&mut self, forward: bool) -> Result<()> {
        let Some(map) = self.view.as_ref().and_then(|v| v.map.as_ref()) else {
            return Ok(());
        };
        if map.suburbs.is_empty() {
            return Ok(());
        }

        let len = map.suburbs.len();
        let current = self
            .widgets
            .suburb
            .as_ref()
            .and_then(|s| map.suburbs.iter().position(|x| x == s))
            .unwrap_or(0);
        let next = if forward { (current + 1) % len } else { (current + len - 1) % len };

        self.widgets.suburb = Some(map.suburbs[next].clone());
        self.refresh()
    }

    pub fn cursor_down(&mut self) {
        let len = self.sidebar_items().len();
        if len > 0 {
            self.sidebar_cursor = (self.sidebar_cursor + 1) % len;
        }
    }

    pub fn cursor_up(&mut self) {
        let len = self.sidebar_items().len();
        if len > 0 {
            self.sidebar_cursor = (self.sidebar_cursor + len - 1) % len;
        }
    }

    pub fn next_row(&mut self) {
        let len = self.view.as_ref().map(|v| v.table.len()).unwrap_or(0);
        if len == 0 {
            return;
        }
        let i = match self.table_state.selected() {
            Some(i) if i >= len - 1 => 0,
            Some(i) => i + 1,
            None => 0,
        };
        self.table_state.select(Some(i));
    }

    pub fn previous_row(&mut self) {
        let len = self.view.as_ref().map(|v| v.table.len()).unwrap_or(0);
        if len == 0 {
            return;
        }
        let i = match self.table_state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.table_state.select(Some(i));
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        if !self.session.logged_in {
            return self.handle_login_key(key);
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab => {
                self.focus = match self.focus {
                    Focus::Sidebar => Focus::Content,
                    Focus::Content => Focus::Sidebar,
                }
            }
            KeyCode::Char('o') => self.logout(),
            KeyCode::Char('[') => self.cycle_suburb(false)?,
            KeyCode::Char(']') => self.cycle_suburb(true)?,
            code => match self.focus {
                Focus::Sidebar => match code {
                    KeyCode::Down | KeyCode::Char('j') => self.cursor_down(),
                    KeyCode::Up | KeyCode::Char('k') => self.cursor_up(),
                    KeyCode::Char(' ') | KeyCode::Enter => self.toggle_current()?,
                    KeyCode::Left | KeyCode::Char('h') => self.nudge_current(-1.0)?,
                    KeyCode::Right | KeyCode::Char('l') => self.nudge_current(1.0)?,
                    _ => {}
                },
                Focus::Content => match code {
                    KeyCode::Down | KeyCode::Char('j') => self.next_row(),
                    KeyCode::Up | KeyCode::Char('k') => self.previous_row(),
                    KeyCode::Right | KeyCode::Char('l') => self.current_page = self.current_page.next(),
                    KeyCode::Left | KeyCode::Char('h') => self.current_page = self.current_page.previous(),
                    _ => {}
                },
            },
        }
        Ok(())
    }

    fn handle_login_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab | KeyCode::Down | KeyCode::Up => {
                self.login_field = match self.login_field {
                    LoginField::Username => LoginField::Password,
                    LoginField::Password => LoginField::Username,
                }
            }
            KeyCode::Enter => self.submit_login()?,
            KeyCode::Backspace => {
                self.active_login_field().pop();
            }
            KeyCode::Char(c) => self.active_login_field().push(c),
            _ => {}
        }
        Ok(())
    }

    fn active_login_field(&mut self) -> &mut String {
        match self.login_field {
            LoginField::Username => &mut self.username,
            LoginField::Password => &mut self.password,
        }
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            app.handle_key(key)?;
            if app.should_quit {
                return Ok(());
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    if !app.session.logged_in {
        render_login(f, f.size(), app);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with title and page tabs
            Constraint::Min(0),    // Sidebar + content
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(36), Constraint::Min(0)])
        .split(chunks[1]);

    render_header(f, chunks[0], app);
    render_sidebar(f, body[0], app);
    match app.current_page {
        Page::Table => render_table(f, body[1], app),
        Page::Map => render_map(f, body[1], app),
        Page::Trends => render_trends(f, body[1], app),
    }
    render_status_bar(f, chunks[2], app);
}

fn render_login(f: &mut Frame, area: Rect, app: &App) {
    let field_style = |field: LoginField| {
        if app.login_field == field {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        }
    };

    let mut lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("Username: ", field_style(LoginField::Username)),
            Span::raw(app.username.clone()),
        ]),
        Line::from(vec![
            Span::styled("Password: ", field_style(LoginField::Password)),
            Span::raw("*".repeat(app.password.chars().count())),
        ]),
        Line::from(""),
        Line::from(Span::styled("Enter login  |  Tab switch field  |  Esc quit", Style::default().fg(Color::DarkGray))),
    ];

    if let Some(error) = &app.login_error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(error.clone(), Style::default().fg(Color::Red))));
    }

    let width = 50.min(area.width);
    let height = 11.min(area.height);
    let popup = Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    };

    let login = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(PINK))
            .title(" Login "),
    );
    f.render_widget(login, popup);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let Some(view) = &app.view else { return };

    let logo = if view.header.logo_available {
        format!("[{}]", view.header.logo_path.display())
    } else {
        "[logo unavailable]".to_string()
    };

    let mut spans = vec![
        Span::styled(logo, Style::default().fg(Color::DarkGray)),
        Span::raw(" "),
        Span::styled(view.header.title.clone(), Style::default().fg(PINK).add_modifier(Modifier::BOLD)),
        Span::raw("  |  "),
    ];

    for (i, page) in [Page::Table, Page::Map, Page::Trends].iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw(" │ "));
        }
        let style = if *page == app.current_page {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(page.title().to_string(), style));
    }

    spans.push(Span::raw("  |  "));
    spans.push(Span::styled(
        format!("{}/{} rows", view.table.len(), view.total_rows),
        Style::default().fg(Color::White),
    ));

    let header = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));
    f.render_widget(header, area);
}

fn render_sidebar(f: &mut Frame, area: Rect, app: &App) {
    let items = app.sidebar_items();
    let mut lines = Vec::new();
    let mut last_group = None;

    for (i, item) in items.iter().enumerate() {
        let cursor = app.focus == Focus::Sidebar && i == app.sidebar_cursor;
        let marker = if cursor { "→ " } else { "  " };

        match item {
            SidebarItem::Choice { group, value, selected } => {
                if last_group != Some(*group) {
                    lines.push(Line::from(Span::styled(group.title().to_string(), Style::default().fg(Color::Cyan))));
                    last_group = Some(*group);
                }
                let check = if *selected { "[x] " } else { "[ ] " };
                let style = if *selected { Style::default().fg(Color::Green) } else { Style::default() };
                lines.push(Line::from(vec![
                    Span::raw(marker),
                    Span::styled(format!("{}{}", check, truncate(value, 26)), style),
                ]));
            }
            SidebarItem::Slider { slider, value, range } => {
                lines.push(Line::from(Span::styled(slider.title().to_string(), Style::default().fg(Color::Cyan))));
                lines.push(Line::from(vec![
                    Span::raw(marker),
                    Span::styled(
                        format!("◀ {} ▶  [{} .. {}]", format_number(*value), format_number(range.min), format_number(range.max)),
                        Style::default().fg(Color::Yellow),
                    ),
                ]));
            }
        }
    }

    // Keep the cursor visible in long option lists
    let cursor_line = lines
        .iter()
        .position(|l| l.spans.first().map(|s| s.content == "→ ").unwrap_or(false))
        .unwrap_or(0);
    let visible = area.height.saturating_sub(2) as usize;
    let scroll = cursor_line.saturating_sub(visible.saturating_sub(1)) as u16;

    let border = if app.focus == Focus::Sidebar { Color::Yellow } else { Color::White };
    let sidebar = Paragraph::new(lines).scroll((scroll, 0)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(" 🎛️ Filter Suburbs "),
    );
    f.render_widget(sidebar, area);
}

fn render_table(f: &mut Frame, area: Rect, app: &mut App) {
    let Some(view) = &app.view else { return };

    let widths: Vec<Constraint> = view
        .columns
        .iter()
        .map(|c| Constraint::Length(c.chars().count().clamp(6, 22) as u16))
        .collect();

    let header_cells = view.columns.iter().map(|h| {
        Cell::from(h.replace('\n', " ")).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
    });
    let header = Row::new(header_cells).style(Style::default().bg(Color::DarkGray)).height(1);

    let rows = view.table.iter().map(|row| {
        let cells = row.cells.iter().map(|c| Cell::from(truncate(&c.to_string(), 22)));
        Row::new(cells).height(1)
    });

    let border = if app.focus == Focus::Content { Color::Yellow } else { Color::White };
    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border))
                .title(" 📋 Full Suburb Data "),
        )
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.table_state);
}

fn render_map(f: &mut Frame, area: Rect, app: &App) {
    let Some(view) = &app.view else { return };

    let Some(map) = &view.map else {
        let text = Paragraph::new("No Latitude/Longitude columns in the data; map unavailable.")
            .block(Block::default().borders(Borders::ALL).title(" 🗺️ 12-Month Growth Map "));
        f.render_widget(text, area);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    render_suburb_selector(f, chunks[0], view);

    let coords: Vec<(f64, f64)> = map.points.iter().map(|p| (p.longitude, p.latitude)).collect();
    let (lon, lat) = map
        .view_state
        .map(|v| (v.longitude, v.latitude))
        .unwrap_or((134.0, -28.0));

    // Half-width in degrees at the configured zoom, widened to fit every point
    let zoom_span = 360.0 / 2f64.powf(map.view_state.map(|v| v.zoom).unwrap_or(4.0));
    let span = coords
        .iter()
        .map(|(x, y)| (x - lon).abs().max((y - lat).abs()))
        .fold(zoom_span, f64::max)
        * 1.1;

    let [r, g, b, _] = map.color;
    let canvas = Canvas::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" 🗺️ 12-Month Growth Map ({} points) ", coords.len())),
        )
        .x_bounds([lon - span, lon + span])
        .y_bounds([lat - span / 2.0, lat + span / 2.0])
        .paint(|ctx| {
            ctx.draw(&Map {
                resolution: MapResolution::High,
                color: Color::DarkGray,
            });
            ctx.layer();
            ctx.draw(&Points {
                coords: &coords,
                color: Color::Rgb(r, g, b),
            });
        });

    f.render_widget(canvas, chunks[1]);
}

fn render_suburb_selector(f: &mut Frame, area: Rect, view: &DashboardView) {
    let selected = view.selected_suburb.clone().unwrap_or_else(|| "-".to_string());
    let line = Line::from(vec![
        Span::raw("Select a Suburb for Trends: "),
        Span::styled("[ ", Style::default().fg(Color::Yellow)),
        Span::styled(selected, Style::default().fg(PINK).add_modifier(Modifier::BOLD)),
        Span::styled(" ]", Style::default().fg(Color::Yellow)),
    ]);
    f.render_widget(Paragraph::new(line).block(Block::default().borders(Borders::ALL)), area);
}

fn render_trends(f: &mut Frame, area: Rect, app: &App) {
    let Some(view) = &app.view else { return };

    let Some(suburb) = &view.selected_suburb else {
        let text = Paragraph::new("Select a suburb on the map page to see its trends.")
            .block(Block::default().borders(Borders::ALL).title(" 📈 Trends "));
        f.render_widget(text, area);
        return;
    };

    if view.trends.is_empty() {
        let text = Paragraph::new("No trend columns in the data.")
            .block(Block::default().borders(Borders::ALL).title(format!(" 📈 Trends for {} ", suburb)));
        f.render_widget(text, area);
        return;
    }

    let constraints: Vec<Constraint> = view
        .trends
        .iter()
        .map(|_| Constraint::Ratio(1, view.trends.len() as u32))
        .collect();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    for (series, chunk) in view.trends.iter().zip(chunks.iter()) {
        render_trend_chart(f, *chunk, suburb, series);
    }
}

fn render_trend_chart(f: &mut Frame, area: Rect, suburb: &str, series: &TrendSeries) {
    let segments: Vec<Vec<(f64, f64)>> = series
        .segments()
        .into_iter()
        .map(|seg| seg.into_iter().map(|(row, v)| (row as f64, v)).collect())
        .collect();
    let markers: Vec<(f64, f64)> = segments.iter().flatten().copied().collect();

    let (x_lo, x_hi) = match (series.points.first(), series.points.last()) {
        (Some(a), Some(b)) if b.row > a.row => (a.row as f64, b.row as f64),
        (Some(a), _) => (a.row as f64 - 0.5, a.row as f64 + 0.5),
        _ => (0.0, 1.0),
    };
    let (y_lo, y_hi) = match series.value_bounds() {
        Some((lo, hi)) if hi > lo => (lo, hi),
        Some((lo, hi)) => (lo - 0.5, hi + 0.5),
        None => (0.0, 1.0),
    };

    let mut datasets: Vec<Dataset> = segments
        .iter()
        .map(|seg| {
            Dataset::default()
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(HOT_PINK))
                .data(seg)
        })
        .collect();
    datasets.push(
        Dataset::default()
            .marker(symbols::Marker::Dot)
            .graph_type(GraphType::Scatter)
            .style(Style::default().fg(HOT_PINK))
            .data(&markers),
    );

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} - {} ", series.title, suburb))
                .title_alignment(Alignment::Left),
        )
        .x_axis(
            Axis::default()
                .title("Row")
                .style(Style::default().fg(Color::DarkGray))
                .bounds([x_lo, x_hi])
                .labels(vec![Span::raw(format_number(x_lo)), Span::raw(format_number(x_hi))]),
        )
        .y_axis(
            Axis::default()
                .title(series.y_label.clone())
                .style(Style::default().fg(Color::DarkGray))
                .bounds([y_lo, y_hi])
                .labels(vec![Span::raw(format_number(y_lo)), Span::raw(format_number(y_hi))]),
        );

    f.render_widget(chart, area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let selected = app.table_state.selected().map(|i| i + 1).unwrap_or(0);
    let total = app.view.as_ref().map(|v| v.table.len()).unwrap_or(0);
    let footer = app.view.as_ref().map(|v| v.footer.clone()).unwrap_or_default();

    let key = |k: &'static str| Span::styled(k, Style::default().fg(Color::Yellow));
    let status = Line::from(vec![
        Span::styled(format!(" Row: {}/{} ", selected, total), Style::default().fg(Color::Cyan)),
        Span::raw(" | "),
        key("Tab"),
        Span::raw(" Focus | "),
        key("Space"),
        Span::raw(" Toggle | "),
        key("←/→"),
        Span::raw(" Slider/Page | "),
        key("[/]"),
        Span::raw(" Suburb | "),
        key("o"),
        Span::raw(" Logout | "),
        Span::styled("q", Style::default().fg(Color::Red)),
        Span::raw(" Quit | "),
        Span::styled(footer, Style::default().fg(PINK)),
    ]);

    let status_bar = Paragraph::new(status).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );
    f.render_widget(status_bar, area);
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
