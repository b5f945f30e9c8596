use crate::domain::model::{DataQualityIssue, DataQualityKind, RiskRecord, SummaryStats};

pub fn summarize(records: &[RiskRecord]) -> SummaryStats {
    let total = records.len();
    let closed = records
        .iter()
        .filter(|r| r.actual_close_date.is_known())
        .count();

    SummaryStats {
        total,
        open: total - closed,
        closed,
    }
}

/// 標記結案日早於開啟日的紀錄。只做標記，不影響任何計數。
pub fn flag_data_quality(records: &[RiskRecord]) -> Vec<DataQualityIssue> {
    let mut issues = Vec::new();

    for record in records {
        let checks = [
            (record.actual_close_date.known(), DataQualityKind::ClosedBeforeOpen),
            (record.expected_close_date.known(), DataQualityKind::ExpectedBeforeOpen),
        ];
        for (close, kind) in checks {
            if let Some(close_date) = close.filter(|c| *c < record.open_date) {
                issues.push(DataQualityIssue {
                    row: record.row,
                    kind,
                    open_date: record.open_date,
                    close_date,
                });
            }
        }
    }

    issues
}
