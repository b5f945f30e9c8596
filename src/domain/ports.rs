use crate::domain::model::{RawRow, TransformResult};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub const OPEN_DATE_COLUMN: &str = "Risk Open Date";
pub const EXPECTED_CLOSE_COLUMN: &str = "Expected End Date (DD-MMM-YY)";
pub const ACTUAL_CLOSE_COLUMN: &str = "Closure Date (DD-MMM-YY)";

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// 三個日期欄位在輸入檔中的表頭名稱
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    #[serde(default = "default_open_column")]
    pub open_date: String,
    #[serde(default = "default_expected_column")]
    pub expected_close_date: String,
    #[serde(default = "default_actual_column")]
    pub actual_close_date: String,
}

fn default_open_column() -> String {
    OPEN_DATE_COLUMN.to_string()
}

fn default_expected_column() -> String {
    EXPECTED_CLOSE_COLUMN.to_string()
}

fn default_actual_column() -> String {
    ACTUAL_CLOSE_COLUMN.to_string()
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            open_date: default_open_column(),
            expected_close_date: default_expected_column(),
            actual_close_date: default_actual_column(),
        }
    }
}

impl ColumnMapping {
    pub fn required(&self) -> [&str; 3] {
        [
            self.open_date.as_str(),
            self.expected_close_date.as_str(),
            self.actual_close_date.as_str(),
        ]
    }
}

pub trait ConfigProvider: Send + Sync {
    fn input_file(&self) -> &str;
    fn output_path(&self) -> &str;
    fn output_formats(&self) -> &[String];
    fn archive_name(&self) -> Option<&str>;
    fn columns(&self) -> &ColumnMapping;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<RawRow>>;
    async fn transform(&self, data: Vec<RawRow>) -> Result<TransformResult>;
    async fn load(&self, result: &TransformResult) -> Result<String>;
}
