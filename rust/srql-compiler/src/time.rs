//! Clock injection and date keyword resolution.

use crate::ast::DateKeyword;
use chrono::{DateTime, NaiveDate, Utc};

/// Source of "now" for resolving `TODAY`/`YESTERDAY`.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to a single instant, used wherever output must be reproducible.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    pub fn at_date(date: NaiveDate) -> Self {
        let midnight = date.and_time(chrono::NaiveTime::MIN);
        Self(DateTime::<Utc>::from_naive_utc_and_offset(midnight, Utc))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

impl DateKeyword {
    pub fn resolve(self, now: DateTime<Utc>) -> NaiveDate {
        let today = now.date_naive();
        match self {
            DateKeyword::Today => today,
            DateKeyword::Yesterday => today.pred_opt().unwrap_or(today),
        }
    }
}

/// Renders a date keyword as the `YYYY-MM-DD` string used by literal-date backends.
pub fn keyword_date_string(keyword: DateKeyword, clock: &dyn Clock) -> String {
    keyword.resolve(clock.now()).format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clock(raw: &str) -> FixedClock {
        FixedClock(
            DateTime::parse_from_rfc3339(raw)
                .unwrap()
                .with_timezone(&Utc),
        )
    }

    #[test]
    fn today_uses_clock_date() {
        let clock = clock("2025-03-01T23:59:59Z");
        assert_eq!(keyword_date_string(DateKeyword::Today, &clock), "2025-03-01");
    }

    #[test]
    fn yesterday_crosses_month_boundary() {
        let clock = clock("2025-03-01T00:00:01Z");
        assert_eq!(
            keyword_date_string(DateKeyword::Yesterday, &clock),
            "2025-02-28"
        );
    }

    #[test]
    fn fixed_clock_at_date_is_midnight_utc() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let clock = FixedClock::at_date(date);
        assert_eq!(clock.now().to_rfc3339(), "2024-02-29T00:00:00+00:00");
        assert_eq!(DateKeyword::Yesterday.resolve(clock.now()).to_string(), "2024-02-28");
    }
}
