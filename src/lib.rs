pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;
pub use crate::config::{cli::LocalStorage, toml_config::TomlConfig};

pub use crate::core::{
    etl::{BurndownEngine, RunOutcome},
    pipeline::BurndownPipeline,
    report::{compute_burndown, compute_burndown_concurrent},
};
pub use crate::domain::model::{
    BurndownReport, DailyPoint, DateField, MonthlyPoint, RawRow, RiskRecord, SummaryStats,
    YearMonth,
};
pub use crate::utils::error::{BurndownError, Result};
