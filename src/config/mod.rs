pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::core::ConfigProvider;
#[cfg(feature = "cli")]
use crate::domain::ports::ColumnMapping;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "risk-burndown")]
#[command(about = "Compute expected vs. actual risk burndown from a risk register export")]
pub struct CliConfig {
    #[arg(long, help = "Risk register exported as CSV or TSV")]
    pub input: String,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, value_delimiter = ',', default_value = "csv,json")]
    pub formats: Vec<String>,

    #[arg(long, help = "Bundle all outputs into this zip archive")]
    pub zip: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log CPU and memory usage per stage")]
    pub monitor: bool,

    #[arg(skip)]
    pub columns: ColumnMapping,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn input_file(&self) -> &str {
        &self.input
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn output_formats(&self) -> &[String] {
        &self.formats
    }

    fn archive_name(&self) -> Option<&str> {
        self.zip.as_deref()
    }

    fn columns(&self) -> &ColumnMapping {
        &self.columns
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("input", &self.input)?;
        validation::validate_file_extensions(
            "input",
            std::slice::from_ref(&self.input),
            &validation::SUPPORTED_INPUT_EXTENSIONS,
        )?;
        validation::validate_path("output_path", &self.output_path)?;
        validation::validate_output_formats("formats", &self.formats)?;
        validation::validate_archive_name("zip", self.zip.as_deref())?;
        validation::validate_columns("columns", &self.columns)
    }
}
