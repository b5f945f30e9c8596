use crate::core::timeline::MonthlyTimeline;
use crate::domain::model::{MonthlyPoint, RiskRecord};

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlySeries {
    pub points: Vec<MonthlyPoint>,
    pub average_monthly_opened: f64,
}

/// 每月開啟數，以及月底當天的預期/實際開啟數快照
pub fn aggregate_monthly(records: &[RiskRecord], timeline: &MonthlyTimeline) -> MonthlySeries {
    let points: Vec<MonthlyPoint> = timeline
        .months()
        .iter()
        .map(|span| {
            let month_end = span.last_day;
            MonthlyPoint {
                year_month: span.month,
                opened_count: records.iter().filter(|r| span.contains(r.open_date)).count(),
                expected_open_count: records
                    .iter()
                    .filter(|r| r.is_expected_open(month_end))
                    .count(),
                actual_open_count: records
                    .iter()
                    .filter(|r| r.is_actually_open(month_end))
                    .count(),
            }
        })
        .collect();

    let average_monthly_opened = average_opened(&points);

    MonthlySeries {
        points,
        average_monthly_opened,
    }
}

/// 母體平均：除以時間軸上的月份數（含零開啟的月份）
pub fn average_opened(points: &[MonthlyPoint]) -> f64 {
    if points.is_empty() {
        return 0.0;
    }
    let total: usize = points.iter().map(|p| p.opened_count).sum();
    total as f64 / points.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::timeline::build_monthly_timeline;
    use crate::domain::model::DateField;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_opened_counts_include_zero_months() {
        let records = vec![
            RiskRecord::new(
                date(2024, 1, 10),
                DateField::Known(date(2024, 4, 15)),
                DateField::Unknown,
            ),
            RiskRecord::new(
                date(2024, 3, 2),
                DateField::Unknown,
                DateField::Known(date(2024, 3, 20)),
            ),
        ];
        let timeline = build_monthly_timeline(&records).unwrap();
        let series = aggregate_monthly(&records, &timeline);

        let opened: Vec<usize> = series.points.iter().map(|p| p.opened_count).collect();
        assert_eq!(opened, vec![1, 0, 1, 0]);
        assert!((series.average_monthly_opened - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_month_end_snapshot() {
        let records = vec![
            // 月中結案，月底快照時已不算開啟
            RiskRecord::new(
                date(2024, 1, 2),
                DateField::Known(date(2024, 1, 31)),
                DateField::Known(date(2024, 1, 15)),
            ),
            // 結案日在隔月一日，月底仍開啟
            RiskRecord::new(
                date(2024, 1, 20),
                DateField::Known(date(2024, 2, 1)),
                DateField::Known(date(2024, 2, 1)),
            ),
        ];
        let timeline = build_monthly_timeline(&records).unwrap();
        let series = aggregate_monthly(&records, &timeline);

        assert_eq!(series.points.len(), 2);
        let jan = series.points[0];
        assert_eq!(jan.year_month.to_string(), "2024-01");
        assert_eq!(jan.opened_count, 2);
        assert_eq!(jan.expected_open_count, 1);
        assert_eq!(jan.actual_open_count, 1);

        let feb = series.points[1];
        assert_eq!(feb.opened_count, 0);
        assert_eq!(feb.expected_open_count, 0);
        assert_eq!(feb.actual_open_count, 0);
    }

    #[test]
    fn test_opens_on_month_boundaries() {
        let records = vec![
            RiskRecord::new(date(2024, 1, 31), DateField::Unknown, DateField::Unknown),
            RiskRecord::new(
                date(2024, 2, 1),
                DateField::Known(date(2024, 2, 29)),
                DateField::Unknown,
            ),
            RiskRecord::new(date(2024, 2, 29), DateField::Unknown, DateField::Unknown),
        ];
        let timeline = build_monthly_timeline(&records).unwrap();
        let series = aggregate_monthly(&records, &timeline);

        let opened: Vec<usize> = series.points.iter().map(|p| p.opened_count).collect();
        assert_eq!(opened, vec![1, 2]);
    }

    #[test]
    fn test_average_of_no_months_is_zero() {
        assert_eq!(average_opened(&[]), 0.0);
    }
}
