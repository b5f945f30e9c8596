use crate::core::Pipeline;
use crate::domain::model::SummaryStats;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

/// 一次執行的結果摘要
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub output_path: String,
    pub summary: SummaryStats,
    pub average_monthly_opened: f64,
    pub daily_points: usize,
    pub monthly_points: usize,
    pub data_quality_issues: usize,
}

pub struct BurndownEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> BurndownEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<RunOutcome> {
        tracing::info!("Starting burndown run...");

        // Extract
        let raw_rows = self.pipeline.extract().await?;
        tracing::info!("Extracted {} rows", raw_rows.len());
        self.monitor.log_stats("Extract");

        // Transform
        let result = self.pipeline.transform(raw_rows).await?;
        let report = &result.report;
        tracing::info!(
            "Computed {} daily and {} monthly points (total: {}, open: {}, closed: {})",
            report.daily.len(),
            report.monthly.len(),
            report.summary.total,
            report.summary.open,
            report.summary.closed
        );
        if !report.data_quality.is_empty() {
            tracing::warn!(
                "⚠️ {} data-quality issues: close dates earlier than the open date",
                report.data_quality.len()
            );
        }
        self.monitor.log_stats("Transform");

        // Load
        let output_path = self.pipeline.load(&result).await?;
        tracing::info!("Output saved to: {}", output_path);
        self.monitor.log_stats("Load");
        self.monitor.log_final_stats();

        Ok(RunOutcome {
            output_path,
            summary: report.summary,
            average_monthly_opened: report.average_monthly_opened,
            daily_points: report.daily.len(),
            monthly_points: report.monthly.len(),
            data_quality_issues: report.data_quality.len(),
        })
    }
}
