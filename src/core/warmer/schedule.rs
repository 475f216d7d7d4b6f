//! Typed warming schedules

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Timelike, Utc, Weekday};
use serde::{Deserialize, Serialize};

/// When a warming job runs. All times are UTC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Schedule {
    /// Fixed period from the previous run
    Interval { every_secs: u64 },
    /// Every hour at `minute`
    Hourly { minute: u32 },
    Daily { hour: u32, minute: u32 },
    Weekly {
        weekday: Weekday,
        hour: u32,
        minute: u32,
    },
}

fn at(date: NaiveDate, hour: u32, minute: u32) -> DateTime<Utc> {
    let time = NaiveTime::from_hms_opt(hour.min(23), minute.min(59), 0).unwrap_or_default();
    date.and_time(time).and_utc()
}

impl Schedule {
    pub fn every(period: std::time::Duration) -> Self {
        Schedule::Interval {
            every_secs: period.as_secs().max(1),
        }
    }

    /// First run strictly after `reference`
    pub fn next_run_after(&self, reference: DateTime<Utc>) -> DateTime<Utc> {
        match *self {
            Schedule::Interval { every_secs } => {
                reference + Duration::seconds(every_secs.max(1) as i64)
            }
            Schedule::Hourly { minute } => {
                let candidate =
                    at(reference.date_naive(), reference.hour(), minute);
                if candidate > reference {
                    candidate
                } else {
                    candidate + Duration::hours(1)
                }
            }
            Schedule::Daily { hour, minute } => {
                let candidate = at(reference.date_naive(), hour, minute);
                if candidate > reference {
                    candidate
                } else {
                    candidate + Duration::days(1)
                }
            }
            Schedule::Weekly {
                weekday,
                hour,
                minute,
            } => {
                let days_ahead = (weekday.num_days_from_monday() + 7
                    - reference.weekday().num_days_from_monday())
                    % 7;
                let date = reference.date_naive() + Duration::days(days_ahead as i64);
                let candidate = at(date, hour, minute);
                if candidate > reference {
                    candidate
                } else {
                    candidate + Duration::weeks(1)
                }
            }
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        let check_time = |hour: u32, minute: u32| {
            if hour > 23 {
                return Err(format!("hour {} is out of range (0-23)", hour));
            }
            if minute > 59 {
                return Err(format!("minute {} is out of range (0-59)", minute));
            }
            Ok(())
        };

        match *self {
            Schedule::Interval { every_secs: 0 } => {
                Err("interval must be at least one second".to_string())
            }
            Schedule::Interval { .. } => Ok(()),
            Schedule::Hourly { minute } => check_time(0, minute),
            Schedule::Daily { hour, minute } | Schedule::Weekly { hour, minute, .. } => {
                check_time(hour, minute)
            }
        }
    }
}
