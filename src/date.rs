use chrono::{Duration, NaiveDate};

/// Return the date `days` later (or earlier for negative values) without
/// touching the input.
pub fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    date + Duration::days(days)
}

/// Whole-day difference `to - from`.
pub fn diff_days(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn add_days_round_trips() {
        let d = date(2016, 8, 15);
        for n in [-400, -31, -1, 0, 1, 31, 366] {
            assert_eq!(add_days(add_days(d, n), -n), d);
        }
    }

    #[test]
    fn diff_days_is_signed() {
        let a = date(2016, 8, 15);
        let b = date(2016, 9, 15);
        assert_eq!(diff_days(a, b), 31);
        assert_eq!(diff_days(b, a), -31);
        assert_eq!(diff_days(a, a), 0);
    }

    #[test]
    fn diff_days_crosses_year_boundary() {
        assert_eq!(diff_days(date(2016, 12, 25), date(2017, 1, 5)), 11);
    }
}
