//! Data layer for the SkyCast dashboard: cached calls to the weather gateway, the
//! all-or-nothing location loader, dashboard state, recent searches and derived insights.

pub mod api_client;
pub mod cache;
pub mod config;
pub mod dashboard;
pub mod history;
pub mod insights;
pub mod service;
pub mod summary;

pub use dashboard::{Dashboard, DashboardState, LoadOutcome};
pub use service::{LocationSnapshot, WeatherService};
