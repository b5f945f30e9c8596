use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// 一列原始輸入：欄位名稱 -> 原始文字
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawRow {
    pub fields: HashMap<String, String>,
}

impl RawRow {
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Close dates are either known or explicitly unknown; never a sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "date", rename_all = "snake_case")]
pub enum DateField {
    Known(NaiveDate),
    Unknown,
}

impl DateField {
    pub fn known(&self) -> Option<NaiveDate> {
        match self {
            DateField::Known(date) => Some(*date),
            DateField::Unknown => None,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, DateField::Known(_))
    }

    /// Known and strictly after `day`.
    pub fn is_after(&self, day: NaiveDate) -> bool {
        matches!(self, DateField::Known(date) if *date > day)
    }
}

impl From<Option<NaiveDate>> for DateField {
    fn from(value: Option<NaiveDate>) -> Self {
        value.map_or(DateField::Unknown, DateField::Known)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskRecord {
    /// 在輸入中的列號（從 0 起算，不含表頭）
    pub row: usize,
    pub open_date: NaiveDate,
    pub expected_close_date: DateField,
    pub actual_close_date: DateField,
}

impl RiskRecord {
    pub fn new(open_date: NaiveDate, expected: DateField, actual: DateField) -> Self {
        Self {
            row: 0,
            open_date,
            expected_close_date: expected,
            actual_close_date: actual,
        }
    }

    /// 預期仍開啟：已開啟，且有預期結案日並晚於 `day`
    pub fn is_expected_open(&self, day: NaiveDate) -> bool {
        self.open_date <= day && self.expected_close_date.is_after(day)
    }

    /// 實際仍開啟：已開啟，且尚無結案日或結案日晚於 `day`
    pub fn is_actually_open(&self, day: NaiveDate) -> bool {
        self.open_date <= day
            && match self.actual_close_date {
                DateField::Unknown => true,
                DateField::Known(closed) => closed > day,
            }
    }
}

/// 年月期間，顯示為 `YYYY-MM`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn succ(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    pub fn first_day(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    pub fn last_day(self) -> Option<NaiveDate> {
        self.succ().first_day()?.pred_opt()
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for YearMonth {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for YearMonth {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        let (year, month) = text
            .split_once('-')
            .and_then(|(y, m)| Some((y.parse::<i32>().ok()?, m.parse::<u32>().ok()?)))
            .filter(|(_, m)| (1..=12).contains(m))
            .ok_or_else(|| serde::de::Error::custom(format!("invalid year-month: {}", text)))?;
        Ok(Self { year, month })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub expected_open_count: usize,
    pub actual_open_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyPoint {
    pub year_month: YearMonth,
    pub opened_count: usize,
    pub expected_open_count: usize,
    pub actual_open_count: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub total: usize,
    pub open: usize,
    pub closed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataQualityKind {
    ClosedBeforeOpen,
    ExpectedBeforeOpen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataQualityIssue {
    pub row: usize,
    pub kind: DataQualityKind,
    pub open_date: NaiveDate,
    pub close_date: NaiveDate,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizationStats {
    pub rows_read: usize,
    pub rows_excluded: usize,
    pub unknown_expected_close: usize,
    pub unknown_actual_close: usize,
}

/// 引擎的完整輸出
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BurndownReport {
    pub daily: Vec<DailyPoint>,
    pub monthly: Vec<MonthlyPoint>,
    pub average_monthly_opened: f64,
    pub summary: SummaryStats,
    pub data_quality: Vec<DataQualityIssue>,
}

impl BurndownReport {
    pub fn average_monthly_opened_display(&self) -> String {
        format!("{:.2}", self.average_monthly_opened)
    }
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub report: BurndownReport,
    pub normalization: NormalizationStats,
}
