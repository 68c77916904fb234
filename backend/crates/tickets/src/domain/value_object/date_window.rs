use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use kernel::query::{Field, Filter};

/// Inclusive calendar-day range, evaluated in UTC
///
/// `from` maps to `>= from 00:00`, `to` maps to `< (to + 1 day) 00:00`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateWindow {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateWindow {
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        Self { from, to }
    }

    pub fn start(&self) -> Option<DateTime<Utc>> {
        self.from.map(start_of_day)
    }

    /// Exclusive upper bound; `None` when open or past the calendar's end
    pub fn end(&self) -> Option<DateTime<Utc>> {
        self.to.and_then(|to| to.succ_opt()).map(start_of_day)
    }

    /// Add the window bounds on `field` to `filter`
    pub fn restrict<F: Field>(&self, filter: Filter<F>, field: F) -> Filter<F> {
        let filter = match self.start() {
            Some(start) => filter.gte(field, start),
            None => filter,
        };
        match self.end() {
            Some(end) => filter.lt(field, end),
            None => filter,
        }
    }
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_bounds() {
        let window = DateWindow::new(Some(day(2025, 8, 16)), Some(day(2025, 8, 16)));

        assert_eq!(
            window.start(),
            Some(Utc.with_ymd_and_hms(2025, 8, 16, 0, 0, 0).unwrap())
        );
        assert_eq!(
            window.end(),
            Some(Utc.with_ymd_and_hms(2025, 8, 17, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_open_window() {
        let window = DateWindow::default();
        assert!(window.start().is_none());
        assert!(window.end().is_none());
    }

    #[test]
    fn test_end_crosses_month() {
        let window = DateWindow::new(None, Some(day(2024, 2, 29)));
        assert_eq!(
            window.end(),
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap())
        );
    }
}
