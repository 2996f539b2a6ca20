use crate::types::{DateRange, MonthBucket};
use chrono::{Datelike, Duration, NaiveDate};
use serde::Deserialize;

/// How months that straddle the requested range are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryMonths {
    /// Query partial months with their bounds clipped to the range.
    #[default]
    Clip,
    /// Only query months lying entirely inside the range.
    FullOnly,
}

/// Every calendar year touched by the range, ascending.
pub fn years_in(range: &DateRange) -> Vec<i32> {
    (range.start.year()..=range.end.year()).collect()
}

/// Month windows covering `range`.
pub fn month_buckets(range: &DateRange, boundary: BoundaryMonths) -> Vec<MonthBucket> {
    years_in(range)
        .into_iter()
        .flat_map(|year| (1..=12).filter_map(move |month| calendar_month(year, month)))
        .filter_map(|month| match boundary {
            BoundaryMonths::FullOnly => {
                (month.start >= range.start && month.end <= range.end).then_some(month)
            }
            BoundaryMonths::Clip => {
                if month.end < range.start || month.start > range.end {
                    None
                } else {
                    Some(MonthBucket {
                        start: month.start.max(range.start),
                        end: month.end.min(range.end),
                    })
                }
            }
        })
        .collect()
}

fn calendar_month(year: i32, month: u32) -> Option<MonthBucket> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some(MonthBucket {
        start,
        end: next - Duration::days(1),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn range(start: NaiveDate, end: NaiveDate) -> DateRange {
        DateRange::new(start, end).unwrap()
    }

    #[test]
    fn test_years_in() {
        assert_eq!(years_in(&range(date(2023, 6, 1), date(2025, 2, 1))), vec![2023, 2024, 2025]);
        assert_eq!(years_in(&range(date(2024, 1, 1), date(2024, 1, 1))), vec![2024]);
    }

    #[test]
    fn test_full_year_has_twelve_months() {
        let buckets = month_buckets(&range(date(2024, 1, 1), date(2024, 12, 31)), BoundaryMonths::Clip);
        assert_eq!(buckets.len(), 12);
        assert_eq!(buckets[1], MonthBucket { start: date(2024, 2, 1), end: date(2024, 2, 29) });
        assert_eq!(buckets[11], MonthBucket { start: date(2024, 12, 1), end: date(2024, 12, 31) });
    }

    #[test]
    fn test_partial_months_are_clipped() {
        let buckets = month_buckets(&range(date(2024, 1, 15), date(2024, 3, 10)), BoundaryMonths::Clip);
        assert_eq!(
            buckets,
            vec![
                MonthBucket { start: date(2024, 1, 15), end: date(2024, 1, 31) },
                MonthBucket { start: date(2024, 2, 1), end: date(2024, 2, 29) },
                MonthBucket { start: date(2024, 3, 1), end: date(2024, 3, 10) },
            ]
        );
    }

    #[test]
    fn test_full_only_drops_partial_months() {
        let buckets = month_buckets(&range(date(2024, 1, 15), date(2024, 3, 10)), BoundaryMonths::FullOnly);
        assert_eq!(buckets, vec![MonthBucket { start: date(2024, 2, 1), end: date(2024, 2, 29) }]);

        let single_partial = month_buckets(&range(date(2024, 1, 2), date(2024, 1, 30)), BoundaryMonths::FullOnly);
        assert!(single_partial.is_empty());
    }

    #[test]
    fn test_buckets_span_year_boundary() {
        let buckets = month_buckets(&range(date(2023, 12, 20), date(2024, 1, 5)), BoundaryMonths::Clip);
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].start, date(2023, 12, 20));
        assert_eq!(buckets[1].end, date(2024, 1, 5));
    }
}
