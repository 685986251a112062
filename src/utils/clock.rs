use chrono::{DateTime, Utc};

/// Represents an entity responsible for providing the current instant across the application. This
/// allows it to be replaced in tests.
#[cfg_attr(test, mockall::automock)]
pub trait Clock: Send + 'static {
    fn time(&self) -> DateTime<Utc>;
}

pub struct DefaultClock;

impl Clock for DefaultClock {
    fn time(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
