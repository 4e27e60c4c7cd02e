//! Bucket granularity and timestamp normalization.
//!
//! Hour and day buckets are fixed-width slices of the epoch timeline. Month
//! and year buckets follow the local calendar because their lengths vary.

use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Datelike, Local, NaiveDate, TimeDelta, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

const SECONDS_PER_HOUR: i64 = 60 * 60;
const SECONDS_PER_DAY: i64 = 24 * SECONDS_PER_HOUR;

/// Granularity of the histogram's time buckets.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Interval {
    /// One bucket per hour.
    Hour,
    /// One bucket per day.
    #[default]
    Day,
    /// One bucket per local calendar month.
    Month,
    /// One bucket per local calendar year.
    Year,
}

impl Interval {
    /// Map a timestamp (epoch seconds) to the start of its bucket.
    pub fn normalize(self, timestamp: i64) -> i64 {
        match self {
            Interval::Hour => floor_to(timestamp, SECONDS_PER_HOUR),
            Interval::Day => floor_to(timestamp, SECONDS_PER_DAY),
            Interval::Month => local_calendar_start(timestamp, |date| date.with_day(1)),
            Interval::Year => {
                local_calendar_start(timestamp, |date| NaiveDate::from_ymd_opt(date.year(), 1, 1))
            }
        }
    }

    /// `strftime` pattern used to label a bucket of this interval.
    pub fn label_format(self) -> &'static str {
        match self {
            Interval::Hour => "%Y-%m-%d %H:00",
            Interval::Day => "%Y-%m-%d",
            Interval::Month => "%Y-%m",
            Interval::Year => "%Y",
        }
    }

    /// Human-readable label for a bucket starting at `start`.
    ///
    /// Hour and day keys are aligned to UTC, so they are labelled in UTC;
    /// month and year keys are local midnights and are labelled locally.
    pub fn label(self, start: i64) -> String {
        let Some(utc) = DateTime::<Utc>::from_timestamp(start, 0) else {
            return "unknown".to_string();
        };
        match self {
            Interval::Hour | Interval::Day => utc.format(self.label_format()).to_string(),
            Interval::Month | Interval::Year => utc
                .with_timezone(&Local)
                .format(self.label_format())
                .to_string(),
        }
    }
}

/// Convert a [`SystemTime`] to whole epoch seconds, flooring pre-epoch times.
pub fn epoch_seconds(time: SystemTime) -> i64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(after) => i64::try_from(after.as_secs()).unwrap_or(i64::MAX),
        Err(before) => {
            let before = before.duration();
            let secs = i64::try_from(before.as_secs()).unwrap_or(i64::MAX);
            if before.subsec_nanos() > 0 {
                -secs - 1
            } else {
                -secs
            }
        }
    }
}

/// Floors toward negative infinity, clamping to `i64::MIN` at the bottom of the range.
fn floor_to(timestamp: i64, width: i64) -> i64 {
    timestamp.div_euclid(width).saturating_mul(width)
}

fn local_calendar_start(
    timestamp: i64,
    truncate: impl FnOnce(NaiveDate) -> Option<NaiveDate>,
) -> i64 {
    let Some(utc) = DateTime::<Utc>::from_timestamp(timestamp, 0) else {
        return timestamp;
    };
    truncate(utc.with_timezone(&Local).date_naive())
        .and_then(local_midnight)
        .unwrap_or(timestamp)
}

/// First instant of `date` in the local zone.
///
/// Ambiguous midnights resolve to the earlier instant. A midnight that falls
/// in a DST gap resolves to the first valid hour after it.
fn local_midnight(date: NaiveDate) -> Option<i64> {
    let midnight = date.and_hms_opt(0, 0, 0)?;
    (0..=24)
        .filter_map(|hours| midnight.checked_add_signed(TimeDelta::hours(hours)))
        .find_map(|candidate| Local.from_local_datetime(&candidate).earliest())
        .map(|instant| instant.timestamp())
}
