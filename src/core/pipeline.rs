use crate::core::normalizer::DATE_FORMAT;
use crate::core::report::burndown_from_rows;
use crate::core::{ConfigProvider, Pipeline, RawRow, Storage, TransformResult};
use crate::domain::model::{BurndownReport, DailyPoint, MonthlyPoint, NormalizationStats};
use crate::utils::error::{BurndownError, Result};
use serde::Serialize;
use std::collections::HashSet;
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

pub const DAILY_FILE_STEM: &str = "daily_burndown";
pub const MONTHLY_FILE_STEM: &str = "monthly_metrics";
pub const REPORT_FILE: &str = "burndown_report.json";

#[derive(Serialize)]
struct ReportDocument<'a> {
    #[serde(flatten)]
    report: &'a BurndownReport,
    average_monthly_opened_display: String,
    normalization: &'a NormalizationStats,
}

pub struct BurndownPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> BurndownPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }

    fn input_delimiter(&self) -> u8 {
        if self.config.input_file().to_ascii_lowercase().ends_with(".tsv") {
            b'\t'
        } else {
            b','
        }
    }

    /// 依設定的輸出格式產生 (檔名, 內容)
    fn render_outputs(&self, result: &TransformResult) -> Result<Vec<(String, Vec<u8>)>> {
        let mut files = Vec::new();
        let mut rendered = HashSet::new();

        for format in self.config.output_formats() {
            if !rendered.insert(format.as_str()) {
                tracing::debug!("Skipping repeated output format: {}", format);
                continue;
            }
            match format.as_str() {
                "csv" | "tsv" => {
                    let delimiter = if format == "csv" { b',' } else { b'\t' };
                    files.push((
                        format!("{}.{}", DAILY_FILE_STEM, format),
                        render_daily_table(&result.report.daily, delimiter)?,
                    ));
                    files.push((
                        format!("{}.{}", MONTHLY_FILE_STEM, format),
                        render_monthly_table(&result.report.monthly, delimiter)?,
                    ));
                }
                "json" => {
                    let document = ReportDocument {
                        report: &result.report,
                        average_monthly_opened_display: result
                            .report
                            .average_monthly_opened_display(),
                        normalization: &result.normalization,
                    };
                    files.push((REPORT_FILE.to_string(), serde_json::to_vec_pretty(&document)?));
                }
                other => {
                    return Err(BurndownError::InvalidConfigValueError {
                        field: "output_formats".to_string(),
                        value: other.to_string(),
                        reason: "Unsupported format. Valid formats: csv, tsv, json".to_string(),
                    })
                }
            }
        }

        Ok(files)
    }
}

pub fn parse_rows(data: &[u8], delimiter: u8, required: &[&str]) -> Result<Vec<RawRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(data);

    let headers: Vec<String> = reader.byte_headers()?.iter().map(lossy).collect();
    for column in required {
        if !headers.iter().any(|h| h == column) {
            return Err(BurndownError::MissingColumnError {
                column: column.to_string(),
            });
        }
    }

    // 非 UTF-8 的儲存格以替代字元保留，交給正規化逐欄判斷
    let mut rows = Vec::new();
    for record in reader.byte_records() {
        let record = record?;
        rows.push(
            headers
                .iter()
                .zip(record.iter())
                .map(|(header, field)| (header.as_str(), lossy(field)))
                .collect::<RawRow>(),
        );
    }

    Ok(rows)
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

fn finish_table(writer: csv::Writer<Vec<u8>>) -> Result<Vec<u8>> {
    writer
        .into_inner()
        .map_err(|e| BurndownError::IoError(e.into_error()))
}

pub fn render_daily_table(points: &[DailyPoint], delimiter: u8) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());

    writer.write_record(["date", "expected_open", "actual_open"])?;
    for point in points {
        writer.write_record([
            point.date.format(DATE_FORMAT).to_string(),
            point.expected_open_count.to_string(),
            point.actual_open_count.to_string(),
        ])?;
    }

    finish_table(writer)
}

pub fn render_monthly_table(points: &[MonthlyPoint], delimiter: u8) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());

    writer.write_record(["year_month", "opened", "expected_open", "actual_open"])?;
    for point in points {
        writer.write_record([
            point.year_month.to_string(),
            point.opened_count.to_string(),
            point.expected_open_count.to_string(),
            point.actual_open_count.to_string(),
        ])?;
    }

    finish_table(writer)
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for BurndownPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<RawRow>> {
        tracing::debug!("Reading risk register from: {}", self.config.input_file());
        let data = self.storage.read_file(self.config.input_file()).await?;

        let rows = parse_rows(&data, self.input_delimiter(), &self.config.columns().required())?;
        tracing::debug!("Parsed {} rows", rows.len());

        Ok(rows)
    }

    async fn transform(&self, data: Vec<RawRow>) -> Result<TransformResult> {
        burndown_from_rows(&data, self.config.columns()).await
    }

    async fn load(&self, result: &TransformResult) -> Result<String> {
        let files = self.render_outputs(result)?;
        let output_path = self.config.output_path();

        if let Some(archive_name) = self.config.archive_name() {
            tracing::debug!("Creating ZIP file with {} files", files.len());

            let zip_data = {
                let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
                for (name, content) in &files {
                    zip.start_file::<_, ()>(name.as_str(), FileOptions::default())?;
                    zip.write_all(content)?;
                }
                zip.finish()?.into_inner()
            };

            let target = format!("{}/{}", output_path, archive_name);
            tracing::debug!("Writing ZIP file ({} bytes) to {}", zip_data.len(), target);
            self.storage.write_file(&target, &zip_data).await?;
            return Ok(target);
        }

        for (name, content) in &files {
            let target = format!("{}/{}", output_path, name);
            tracing::debug!("Writing {} ({} bytes)", target, content.len());
            self.storage.write_file(&target, content).await?;
        }

        Ok(output_path.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{ColumnMapping, ACTUAL_CLOSE_COLUMN, OPEN_DATE_COLUMN};
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    const REGISTER: &str = "\
Risk ID,Risk Open Date,Expected End Date (DD-MMM-YY),Closure Date (DD-MMM-YY),Owner
R-1,01-Jan-24,15-Jan-24,10-Jan-24,Ana
R-2,03-Jan-24,,,Ben
R-3,,20-Jan-24,,Cy
";

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn with_file(path: &str, data: &[u8]) -> Self {
            let mut files = HashMap::new();
            files.insert(path.to_string(), data.to_vec());
            Self {
                files: Arc::new(Mutex::new(files)),
            }
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                BurndownError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    struct MockConfig {
        input_file: String,
        output_path: String,
        output_formats: Vec<String>,
        archive_name: Option<String>,
        columns: ColumnMapping,
    }

    impl MockConfig {
        fn new(formats: &[&str]) -> Self {
            Self {
                input_file: "risks.csv".to_string(),
                output_path: "test_output".to_string(),
                output_formats: formats.iter().map(|f| f.to_string()).collect(),
                archive_name: None,
                columns: ColumnMapping::default(),
            }
        }
    }

    impl ConfigProvider for MockConfig {
        fn input_file(&self) -> &str {
            &self.input_file
        }

        fn output_path(&self) -> &str {
            &self.output_path
        }

        fn output_formats(&self) -> &[String] {
            &self.output_formats
        }

        fn archive_name(&self) -> Option<&str> {
            self.archive_name.as_deref()
        }

        fn columns(&self) -> &ColumnMapping {
            &self.columns
        }
    }

    #[tokio::test]
    async fn test_extract_reads_all_rows() {
        let storage = MockStorage::with_file("risks.csv", REGISTER.as_bytes());
        let pipeline = BurndownPipeline::new(storage, MockConfig::new(&["csv"]));

        let rows = pipeline.extract().await.unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].get(OPEN_DATE_COLUMN), Some("01-Jan-24"));
        assert_eq!(rows[1].get(ACTUAL_CLOSE_COLUMN), Some(""));
        assert_eq!(rows[2].get("Owner"), Some("Cy"));
    }

    #[tokio::test]
    async fn test_extract_missing_column() {
        let storage = MockStorage::with_file("risks.csv", b"Risk Open Date,Owner\n01-Jan-24,Ana\n");
        let pipeline = BurndownPipeline::new(storage, MockConfig::new(&["csv"]));

        match pipeline.extract().await {
            Err(BurndownError::MissingColumnError { column }) => {
                assert_eq!(column, "Expected End Date (DD-MMM-YY)")
            }
            other => panic!("expected MissingColumnError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_extract_tsv_input() {
        let tsv = REGISTER.replace(',', "\t");
        let storage = MockStorage::with_file("risks.tsv", tsv.as_bytes());
        let mut config = MockConfig::new(&["csv"]);
        config.input_file = "risks.tsv".to_string();
        let pipeline = BurndownPipeline::new(storage, config);

        let rows = pipeline.extract().await.unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].get(OPEN_DATE_COLUMN), Some("03-Jan-24"));
    }

    #[tokio::test]
    async fn test_extract_tolerates_non_utf8_cells() {
        // Windows-1252 "Café" in the Owner column, and a stray 0xE9 in one close date
        let mut register = b"Risk ID,Risk Open Date,Expected End Date (DD-MMM-YY),Closure Date (DD-MMM-YY),Owner\n".to_vec();
        register.extend_from_slice(b"R-1,01-Jan-24,15-Jan-24,10-Jan-24,Caf\xE9\n");
        register.extend_from_slice(b"R-2,03-Jan-24,20-Jan-24,1\xE9-Jan-24,Ben\n");
        let storage = MockStorage::with_file("risks.csv", &register);
        let pipeline = BurndownPipeline::new(storage, MockConfig::new(&["csv"]));

        let rows = pipeline.extract().await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("Owner"), Some("Caf\u{FFFD}"));
        assert_eq!(rows[0].get(OPEN_DATE_COLUMN), Some("01-Jan-24"));

        let result = pipeline.transform(rows).await.unwrap();
        assert_eq!(result.normalization.rows_excluded, 0);
        assert_eq!(result.normalization.unknown_actual_close, 1);
        assert_eq!(result.report.summary.total, 2);
        assert_eq!(result.report.summary.closed, 1);
    }

    #[tokio::test]
    async fn test_load_writes_repeated_format_once() {
        let storage = MockStorage::with_file("risks.csv", REGISTER.as_bytes());
        let mut config = MockConfig::new(&["csv", "csv", "json"]);
        config.archive_name = Some("burndown.zip".to_string());
        let pipeline = BurndownPipeline::new(storage.clone(), config);

        let rows = pipeline.extract().await.unwrap();
        let result = pipeline.transform(rows).await.unwrap();
        pipeline.load(&result).await.unwrap();

        let zip_bytes = storage.get_file("test_output/burndown.zip").await.unwrap();
        let archive = zip::ZipArchive::new(std::io::Cursor::new(zip_bytes)).unwrap();
        assert_eq!(archive.len(), 3);
    }

    #[tokio::test]
    async fn test_transform_excludes_rows_without_open_date() {
        let storage = MockStorage::with_file("risks.csv", REGISTER.as_bytes());
        let pipeline = BurndownPipeline::new(storage, MockConfig::new(&["csv"]));

        let rows = pipeline.extract().await.unwrap();
        let result = pipeline.transform(rows).await.unwrap();

        assert_eq!(result.normalization.rows_read, 3);
        assert_eq!(result.normalization.rows_excluded, 1);
        assert_eq!(result.report.summary.total, 2);
        assert_eq!(result.report.summary.closed, 1);
        assert_eq!(result.report.daily.len(), 15);
    }

    #[tokio::test]
    async fn test_load_writes_tables() {
        let storage = MockStorage::with_file("risks.csv", REGISTER.as_bytes());
        let pipeline = BurndownPipeline::new(storage.clone(), MockConfig::new(&["csv", "json"]));

        let rows = pipeline.extract().await.unwrap();
        let result = pipeline.transform(rows).await.unwrap();
        let output = pipeline.load(&result).await.unwrap();
        assert_eq!(output, "test_output");

        let daily = storage.get_file("test_output/daily_burndown.csv").await.unwrap();
        let daily = String::from_utf8(daily).unwrap();
        let lines: Vec<&str> = daily.lines().collect();
        assert_eq!(lines[0], "date,expected_open,actual_open");
        assert_eq!(lines[1], "01-Jan-24,1,1");
        assert_eq!(lines[3], "03-Jan-24,1,2");
        assert_eq!(lines[15], "15-Jan-24,0,1");

        let monthly = storage.get_file("test_output/monthly_metrics.csv").await.unwrap();
        assert_eq!(
            String::from_utf8(monthly).unwrap(),
            "year_month,opened,expected_open,actual_open\n2024-01,2,0,1\n"
        );

        let json = storage.get_file("test_output/burndown_report.json").await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&json).unwrap();
        assert_eq!(value["average_monthly_opened_display"], "2.00");
        assert_eq!(value["normalization"]["rows_excluded"], 1);
        assert_eq!(value["summary"]["open"], 1);
    }

    #[tokio::test]
    async fn test_load_into_archive() {
        let storage = MockStorage::with_file("risks.csv", REGISTER.as_bytes());
        let mut config = MockConfig::new(&["tsv", "json"]);
        config.archive_name = Some("burndown.zip".to_string());
        let pipeline = BurndownPipeline::new(storage.clone(), config);

        let rows = pipeline.extract().await.unwrap();
        let result = pipeline.transform(rows).await.unwrap();
        let output = pipeline.load(&result).await.unwrap();
        assert_eq!(output, "test_output/burndown.zip");

        let zip_bytes = storage.get_file("test_output/burndown.zip").await.unwrap();
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(zip_bytes)).unwrap();

        let mut file_names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        file_names.sort();
        assert_eq!(
            file_names,
            vec!["burndown_report.json", "daily_burndown.tsv", "monthly_metrics.tsv"]
        );

        let mut monthly = archive.by_name("monthly_metrics.tsv").unwrap();
        let mut content = String::new();
        std::io::Read::read_to_string(&mut monthly, &mut content).unwrap();
        assert!(content.starts_with("year_month\topened\texpected_open\tactual_open"));
    }
}
