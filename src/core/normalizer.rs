use crate::domain::model::{DateField, NormalizationStats, RawRow, RiskRecord};
use crate::domain::ports::ColumnMapping;
use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

/// 日期格式：兩位數日-三字母月份-兩位數年，例如 `05-Mar-24`
pub const DATE_FORMAT: &str = "%d-%b-%y";

static DATE_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{2}-[A-Za-z]{3}-\d{2}$").expect("date shape pattern"));

/// 單一欄位解析失敗；由正規化器就地吸收，不會中止整批
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldParseError {
    #[error("field is blank")]
    Blank,

    #[error("'{0}' does not match DD-MMM-YY")]
    Malformed(String),

    #[error("'{0}' is not a valid calendar date")]
    InvalidDate(String),
}

pub fn parse_date(text: &str) -> Result<NaiveDate, FieldParseError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(FieldParseError::Blank);
    }
    if !DATE_SHAPE.is_match(trimmed) {
        return Err(FieldParseError::Malformed(trimmed.to_string()));
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map_err(|_| FieldParseError::InvalidDate(trimmed.to_string()))
}

fn parse_close_date(row: &RawRow, column: &str, index: usize) -> DateField {
    match parse_date(row.get(column).unwrap_or_default()) {
        Ok(date) => DateField::Known(date),
        Err(FieldParseError::Blank) => DateField::Unknown,
        Err(e) => {
            tracing::debug!("Row {}: '{}' treated as unknown ({})", index, column, e);
            DateField::Unknown
        }
    }
}

/// 將一列轉為 `RiskRecord`；開啟日無法解析時回傳錯誤，該列會被排除
pub fn normalize_row(
    row: &RawRow,
    index: usize,
    columns: &ColumnMapping,
) -> Result<RiskRecord, FieldParseError> {
    let open_date = parse_date(row.get(&columns.open_date).unwrap_or_default())?;

    Ok(RiskRecord {
        row: index,
        open_date,
        expected_close_date: parse_close_date(row, &columns.expected_close_date, index),
        actual_close_date: parse_close_date(row, &columns.actual_close_date, index),
    })
}

#[derive(Debug, Clone, Default)]
pub struct NormalizedRecords {
    pub records: Vec<RiskRecord>,
    pub stats: NormalizationStats,
}

pub fn normalize(rows: &[RawRow], columns: &ColumnMapping) -> NormalizedRecords {
    let mut normalized = NormalizedRecords {
        records: Vec::with_capacity(rows.len()),
        stats: NormalizationStats {
            rows_read: rows.len(),
            ..Default::default()
        },
    };

    for (index, row) in rows.iter().enumerate() {
        match normalize_row(row, index, columns) {
            Ok(record) => {
                if !record.expected_close_date.is_known() {
                    normalized.stats.unknown_expected_close += 1;
                }
                if !record.actual_close_date.is_known() {
                    normalized.stats.unknown_actual_close += 1;
                }
                normalized.records.push(record);
            }
            Err(e) => {
                tracing::debug!("Row {} excluded: open date {}", index, e);
                normalized.stats.rows_excluded += 1;
            }
        }
    }

    if normalized.stats.rows_excluded > 0 {
        tracing::warn!(
            "⚠️ {} of {} rows excluded (unparseable '{}')",
            normalized.stats.rows_excluded,
            normalized.stats.rows_read,
            columns.open_date
        );
    }

    normalized
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{ACTUAL_CLOSE_COLUMN, EXPECTED_CLOSE_COLUMN, OPEN_DATE_COLUMN};

    fn row(open: &str, expected: &str, actual: &str) -> RawRow {
        [
            (OPEN_DATE_COLUMN, open),
            (EXPECTED_CLOSE_COLUMN, expected),
            (ACTUAL_CLOSE_COLUMN, actual),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_parse_date_accepts_exact_format() {
        assert_eq!(
            parse_date("05-Mar-24"),
            Ok(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap())
        );
        assert_eq!(
            parse_date(" 31-Dec-99 "),
            Ok(NaiveDate::from_ymd_opt(1999, 12, 31).unwrap())
        );
    }

    #[test]
    fn test_parse_date_rejects_deviations() {
        assert_eq!(parse_date(""), Err(FieldParseError::Blank));
        assert_eq!(parse_date("   "), Err(FieldParseError::Blank));
        assert!(matches!(parse_date("5-Mar-24"), Err(FieldParseError::Malformed(_))));
        assert!(matches!(parse_date("05-March-24"), Err(FieldParseError::Malformed(_))));
        assert!(matches!(parse_date("2024-03-05"), Err(FieldParseError::Malformed(_))));
        assert!(matches!(parse_date("05-Mar-2024"), Err(FieldParseError::Malformed(_))));
        assert!(matches!(parse_date("30-Feb-24"), Err(FieldParseError::InvalidDate(_))));
        assert!(matches!(parse_date("05-Xyz-24"), Err(FieldParseError::InvalidDate(_))));
    }

    #[test]
    fn test_normalize_row_unknown_close_dates() {
        let columns = ColumnMapping::default();
        let record = normalize_row(&row("01-Jan-24", "", "garbage"), 3, &columns).unwrap();
        assert_eq!(record.row, 3);
        assert_eq!(record.expected_close_date, DateField::Unknown);
        assert_eq!(record.actual_close_date, DateField::Unknown);
    }

    #[test]
    fn test_normalize_excludes_unparseable_open_dates() {
        let columns = ColumnMapping::default();
        let rows = vec![
            row("01-Jan-24", "15-Jan-24", ""),
            row("", "15-Jan-24", "10-Jan-24"),
            row("Jan 1 2024", "", ""),
            row("02-Jan-24", "", "05-Jan-24"),
        ];

        let normalized = normalize(&rows, &columns);

        assert_eq!(normalized.records.len(), 2);
        assert_eq!(normalized.records[1].row, 3);
        assert_eq!(
            normalized.stats,
            NormalizationStats {
                rows_read: 4,
                rows_excluded: 2,
                unknown_expected_close: 1,
                unknown_actual_close: 1,
            }
        );
    }

    #[test]
    fn test_normalize_missing_columns_are_blank() {
        let columns = ColumnMapping::default();
        let rows: Vec<RawRow> = vec![[(OPEN_DATE_COLUMN, "01-Jan-24")].into_iter().collect()];
        let normalized = normalize(&rows, &columns);
        assert_eq!(normalized.records.len(), 1);
        assert_eq!(normalized.records[0].actual_close_date, DateField::Unknown);
    }
}
