// PropwealthNext Investment Dashboard - Core Library
// Exposes all modules for use in the terminal UI, the web server, and tests

pub mod config;
pub mod auth;       // Credential store + session gate
pub mod dataset;    // Spreadsheet loader + process-wide cache
pub mod filter;     // Sidebar filters
pub mod map;        // Scatter map + suburb selector
pub mod trends;     // Per-suburb trend series
pub mod dashboard;  // One render pass over all of the above
pub mod html;

#[cfg(feature = "server")]
pub mod web;

// Re-export commonly used types
pub use config::DashboardConfig;
pub use auth::{CredentialStore, Session, SessionRegistry};
pub use dataset::{
    Cell, Dataset, DatasetCache, DatasetError, Field, SuburbRecord,
    load_dataset, load_csv, load_workbook,
};
pub use filter::{FilterCriteria, FilterInput, FilterOptions, FilteredView, SliderRange};
pub use map::{MapPoint, MapView, ViewState};
pub use trends::{trends_for, TrendMetric, TrendPoint, TrendSeries};
pub use dashboard::{Dashboard, DashboardView, Page, WidgetState};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
