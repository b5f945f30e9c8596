use crate::core::timeline::DailyTimeline;
use crate::domain::model::{DailyPoint, RiskRecord};
use chrono::NaiveDate;

/// 直接定義：每一天掃過全部紀錄，O(days × records)
pub fn aggregate_daily(records: &[RiskRecord], timeline: &DailyTimeline) -> Vec<DailyPoint> {
    timeline
        .days()
        .iter()
        .map(|&day| DailyPoint {
            date: day,
            expected_open_count: records.iter().filter(|r| r.is_expected_open(day)).count(),
            actual_open_count: records.iter().filter(|r| r.is_actually_open(day)).count(),
        })
        .collect()
}

/// Running count of sorted dates `<= day`; `day` must be non-decreasing across calls.
struct Cursor {
    dates: Vec<NaiveDate>,
    position: usize,
}

impl Cursor {
    fn new(mut dates: Vec<NaiveDate>) -> Self {
        dates.sort_unstable();
        Self { dates, position: 0 }
    }

    fn advance_to(&mut self, day: NaiveDate) -> usize {
        while self.position < self.dates.len() && self.dates[self.position] <= day {
            self.position += 1;
        }
        self.position
    }
}

/// 掃描線版本，輸出必須與 [`aggregate_daily`] 完全相同。
///
/// 紀錄在 `day` 之前「已結束」的條件是 `max(open, close) <= day`，
/// 因此結案日早於開啟日的髒資料也會得到相同結果。
pub fn aggregate_daily_sweep(records: &[RiskRecord], timeline: &DailyTimeline) -> Vec<DailyPoint> {
    let mut opened = Cursor::new(records.iter().map(|r| r.open_date).collect());

    let mut expected_opened = Cursor::new(
        records
            .iter()
            .filter(|r| r.expected_close_date.is_known())
            .map(|r| r.open_date)
            .collect(),
    );
    let mut expected_ended = Cursor::new(
        records
            .iter()
            .filter_map(|r| r.expected_close_date.known().map(|c| c.max(r.open_date)))
            .collect(),
    );
    let mut actual_ended = Cursor::new(
        records
            .iter()
            .filter_map(|r| r.actual_close_date.known().map(|c| c.max(r.open_date)))
            .collect(),
    );

    timeline
        .days()
        .iter()
        .map(|&day| DailyPoint {
            date: day,
            expected_open_count: expected_opened.advance_to(day) - expected_ended.advance_to(day),
            actual_open_count: opened.advance_to(day) - actual_ended.advance_to(day),
        })
        .collect()
}
