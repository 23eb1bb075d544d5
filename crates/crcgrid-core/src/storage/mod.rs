//! Storage for the JSON configuration record and row report export

mod config;
mod report;

pub use config::{SavedConfig, parse_config, parse_config_content, write_config, write_config_content};
pub use report::{ReportFormat, write_report, write_report_content};
