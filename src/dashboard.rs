// 🧭 Dashboard Render Pass
// One evaluation of the page: session gate, cached dataset, filters, table,
// map, suburb selection and trend charts. Shared by the web and terminal front ends.

use crate::auth::{CredentialStore, Session};
use crate::config::DashboardConfig;
use crate::dataset::{Cell, Dataset, DatasetCache, DatasetError};
use crate::filter::{FilterCriteria, FilterInput, FilterOptions, FilteredView};
use crate::map::MapView;
use crate::trends::{trends_for, TrendSeries};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};

pub const TITLE: &str = "PropwealthNext: Investment Dashboard";
pub const FOOTER: &str = "Built with ❤️ by PropwealthNext";

/// Widget values submitted with one interaction
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WidgetState {
    pub filters: FilterInput,
    pub suburb: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Header {
    pub title: String,
    pub logo_path: PathBuf,
    pub logo_width: u32,
    /// False renders a placeholder instead of the image
    pub logo_available: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub row: usize,
    pub cells: Vec<Cell>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub header: Header,
    pub options: FilterOptions,
    pub criteria: FilterCriteria,
    pub columns: Vec<String>,
    pub table: Vec<TableRow>,
    pub total_rows: usize,
    /// None when the dataset has no coordinate columns
    pub map: Option<MapView>,
    pub selected_suburb: Option<String>,
    pub trends: Vec<TrendSeries>,
    pub footer: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Page {
    Login { error: Option<String> },
    Dashboard(Box<DashboardView>),
}

pub struct Dashboard {
    config: DashboardConfig,
    credentials: CredentialStore,
    cache: Arc<DatasetCache>,
}

impl Dashboard {
    pub fn new(config: DashboardConfig) -> Self {
        Self::with_cache(config, Arc::new(DatasetCache::new()))
    }

    pub fn with_cache(config: DashboardConfig, cache: Arc<DatasetCache>) -> Self {
        let credentials = CredentialStore::new(config.users.clone());
        Dashboard {
            config,
            credentials,
            cache,
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    pub fn cache(&self) -> &Arc<DatasetCache> {
        &self.cache
    }

    /// The configured dataset, loaded once per process
    pub fn dataset(&self) -> Result<Arc<Dataset>, DatasetError> {
        self.cache.get_or_load(&self.config.data_path, &self.config.sheet_name)
    }

    pub fn attempt_login(&self, session: &mut Session, username: &str, password: &str) -> bool {
        session.attempt_login(&self.credentials, username, password)
    }

    /// Evaluate the page. A closed gate returns the login form without touching
    /// the dataset; a dataset failure fails the whole pass.
    pub fn render(&self, session: &Session, widgets: &WidgetState, login_error: Option<String>) -> Result<Page, DatasetError> {
        if !session.logged_in {
            return Ok(Page::Login { error: login_error });
        }

        let dataset = self.dataset()?;

        let options = FilterOptions::from_dataset(&dataset);
        let criteria = options.resolve(&widgets.filters);
        let view = FilteredView::apply(&dataset, &criteria);

        let table = view
            .rows()
            .map(|(row, record)| TableRow {
                row,
                cells: record.cells.clone(),
            })
            .collect();

        let map = MapView::build(&view);
        let selected_suburb = map
            .as_ref()
            .and_then(|m| m.select(widgets.suburb.as_deref()));
        let trends = selected_suburb
            .as_deref()
            .map(|suburb| trends_for(&dataset, suburb))
            .unwrap_or_default();

        debug!(
            total = dataset.len(),
            filtered = view.len(),
            suburb = selected_suburb.as_deref().unwrap_or("-"),
            "render pass"
        );

        Ok(Page::Dashboard(Box::new(DashboardView {
            header: self.header(),
            options,
            criteria,
            columns: dataset.columns().to_vec(),
            table,
            total_rows: dataset.len(),
            map,
            selected_suburb,
            trends,
            footer: FOOTER.to_string(),
        })))
    }

    fn header(&self) -> Header {
        let logo_available = self.config.logo_path.is_file();
        if !logo_available {
            warn!(path = %self.config.logo_path.display(), "logo not found, showing placeholder");
        }
        Header {
            title: TITLE.to_string(),
            logo_path: self.config.logo_path.clone(),
            logo_width: self.config.logo_width,
            logo_available,
        }
    }
}
