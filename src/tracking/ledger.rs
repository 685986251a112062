use std::{collections::HashMap, fmt::Display};

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::format::format_calendar_date;

/// Tracked time of a single calendar day.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
pub struct DayTotal {
    /// Computed once from `representative_instant` and the zone in use when the day was first
    /// recorded. Never recomputed.
    pub date_key: String,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub representative_instant: DateTime<Utc>,
    #[serde(with = "duration_ser")]
    pub total_duration: Duration,
}

/// Tracked time grouped by calendar day. Entries are only ever added or grown.
#[derive(PartialEq, Eq, Debug, Clone, Default)]
pub struct DailyLedger {
    days: HashMap<String, DayTotal>,
}

impl DailyLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds a finished interval into the day its start belongs to. Negative intervals contribute
    /// nothing.
    pub fn record_interval<Tz: TimeZone>(
        self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        zone: &Tz,
    ) -> Self
    where
        Tz::Offset: Display,
    {
        self.record_duration(start, end - start, zone)
    }

    /// Adds `duration` to the day of `anchor`. A fresh day remembers `anchor` as its
    /// representative instant.
    pub fn record_duration<Tz: TimeZone>(
        mut self,
        anchor: DateTime<Utc>,
        duration: Duration,
        zone: &Tz,
    ) -> Self
    where
        Tz::Offset: Display,
    {
        let duration = duration.max(Duration::zero());
        let date_key = format_calendar_date(anchor, zone);
        debug!("Recording {duration} for {date_key}");

        self.days
            .entry(date_key.clone())
            .and_modify(|day| day.total_duration += duration)
            .or_insert_with(|| DayTotal {
                date_key,
                representative_instant: anchor,
                total_duration: duration,
            });
        self
    }

    pub fn get(&self, date_key: &str) -> Option<&DayTotal> {
        self.days.get(date_key)
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DayTotal> {
        self.days.values()
    }

    /// Sum over all days.
    pub fn total(&self) -> Duration {
        self.iter()
            .fold(Duration::zero(), |acc, day| acc + day.total_duration)
    }

    /// Days ordered from the most recent one.
    pub fn sorted_days(&self) -> Vec<&DayTotal> {
        let mut days = self.iter().collect::<Vec<_>>();
        days.sort_by(|a, b| b.representative_instant.cmp(&a.representative_instant));
        days
    }
}

mod duration_ser {
    use chrono::Duration;
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i64(duration.num_seconds())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = i64::deserialize(deserializer)?;
        Ok(Duration::seconds(s))
    }
}
