use crate::domain::model::{RiskRecord, YearMonth};
use crate::utils::error::{BurndownError, Result};
use chrono::NaiveDate;

/// 觀察區間 `[start, end]`（含兩端）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// start = 最早開啟日；end = 已知預期/實際結案日中的最晚者，皆未知時 end = start
pub fn observed_range(records: &[RiskRecord]) -> Result<DateRange> {
    let start = records
        .iter()
        .map(|r| r.open_date)
        .min()
        .ok_or(BurndownError::EmptyTimeline)?;

    let end = records
        .iter()
        .flat_map(|r| [r.expected_close_date.known(), r.actual_close_date.known()])
        .flatten()
        .max()
        .unwrap_or(start);

    if end < start {
        return Err(BurndownError::InvalidRange { start, end });
    }

    Ok(DateRange { start, end })
}

/// Gapless, ascending, one entry per calendar day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyTimeline {
    days: Vec<NaiveDate>,
}

impl DailyTimeline {
    pub fn from_range(range: DateRange) -> Self {
        Self {
            days: range.start.iter_days().take_while(|d| *d <= range.end).collect(),
        }
    }

    pub fn days(&self) -> &[NaiveDate] {
        &self.days
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthSpan {
    pub month: YearMonth,
    pub first_day: NaiveDate,
    pub last_day: NaiveDate,
}

impl MonthSpan {
    fn new(month: YearMonth) -> Result<Self> {
        match (month.first_day(), month.last_day()) {
            (Some(first_day), Some(last_day)) => Ok(Self {
                month,
                first_day,
                last_day,
            }),
            _ => Err(BurndownError::ProcessingError {
                message: format!("month {} is outside the supported calendar", month),
            }),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.first_day <= date && date <= self.last_day
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlyTimeline {
    months: Vec<MonthSpan>,
}

impl MonthlyTimeline {
    pub fn from_range(range: DateRange) -> Result<Self> {
        let last = YearMonth::of(range.end);
        let mut month = YearMonth::of(range.start);
        let mut months = Vec::new();

        while month <= last {
            months.push(MonthSpan::new(month)?);
            month = month.succ();
        }

        Ok(Self { months })
    }

    pub fn months(&self) -> &[MonthSpan] {
        &self.months
    }
}

pub fn build_daily_timeline(records: &[RiskRecord]) -> Result<DailyTimeline> {
    observed_range(records).map(DailyTimeline::from_range)
}

pub fn build_monthly_timeline(records: &[RiskRecord]) -> Result<MonthlyTimeline> {
    observed_range(records).and_then(MonthlyTimeline::from_range)
}
