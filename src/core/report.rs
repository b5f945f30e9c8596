use crate::core::daily::aggregate_daily;
use crate::core::monthly::aggregate_monthly;
use crate::core::normalizer::normalize;
use crate::core::summary::{flag_data_quality, summarize};
use crate::core::timeline::{observed_range, DailyTimeline, MonthlyTimeline};
use crate::domain::model::{BurndownReport, RawRow, RiskRecord, TransformResult};
use crate::domain::ports::ColumnMapping;
use crate::utils::error::{BurndownError, Result};
use std::sync::Arc;

/// 純函式：同樣的紀錄永遠得到同樣的報表
pub fn compute_burndown(records: &[RiskRecord]) -> Result<BurndownReport> {
    let range = observed_range(records)?;
    let daily_timeline = DailyTimeline::from_range(range);
    let monthly_timeline = MonthlyTimeline::from_range(range)?;

    let daily = aggregate_daily(records, &daily_timeline);
    let monthly = aggregate_monthly(records, &monthly_timeline);

    Ok(BurndownReport {
        daily,
        monthly: monthly.points,
        average_monthly_opened: monthly.average_monthly_opened,
        summary: summarize(records),
        data_quality: flag_data_quality(records),
    })
}

/// Same output as [`compute_burndown`], with the daily, monthly and summary
/// passes running on the blocking pool.
pub async fn compute_burndown_concurrent(records: Arc<[RiskRecord]>) -> Result<BurndownReport> {
    let range = observed_range(&records)?;
    let daily_timeline = DailyTimeline::from_range(range);
    let monthly_timeline = MonthlyTimeline::from_range(range)?;

    let daily_task = {
        let records = Arc::clone(&records);
        tokio::task::spawn_blocking(move || aggregate_daily(&records, &daily_timeline))
    };
    let monthly_task = {
        let records = Arc::clone(&records);
        tokio::task::spawn_blocking(move || aggregate_monthly(&records, &monthly_timeline))
    };
    let summary_task = {
        let records = Arc::clone(&records);
        tokio::task::spawn_blocking(move || (summarize(&records), flag_data_quality(&records)))
    };

    let (daily, monthly, (summary, data_quality)) =
        tokio::try_join!(daily_task, monthly_task, summary_task).map_err(|e| {
            BurndownError::ProcessingError {
                message: format!("aggregation task failed: {}", e),
            }
        })?;

    Ok(BurndownReport {
        daily,
        monthly: monthly.points,
        average_monthly_opened: monthly.average_monthly_opened,
        summary,
        data_quality,
    })
}

/// 原始列 -> 正規化 -> 報表
pub async fn burndown_from_rows(rows: &[RawRow], columns: &ColumnMapping) -> Result<TransformResult> {
    let normalized = normalize(rows, columns);
    tracing::debug!(
        "Normalized {} of {} rows",
        normalized.records.len(),
        normalized.stats.rows_read
    );

    let report = compute_burndown_concurrent(normalized.records.into()).await?;

    Ok(TransformResult {
        report,
        normalization: normalized.stats,
    })
}
