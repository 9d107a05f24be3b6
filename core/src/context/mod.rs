mod config;
mod error;

pub use config::{
    AnalysisConfig, AppConfig, AppConfigExt, ExportFormat, GroupingRule, TimeFormat,
    load_analysis_preset, save_analysis_preset,
};
pub use error::ConfigError;
