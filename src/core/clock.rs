use chrono::{NaiveDate, Utc};

/// Source of the date ages are computed against
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Current UTC date
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}

/// Always the same date
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
