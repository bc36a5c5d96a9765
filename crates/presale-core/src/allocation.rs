//! Scheduled fundraising progress.
//!
//! The progress figure is a function of wall-clock time only: it starts at
//! `start_percent`, ramps linearly over `duration_seconds`, and holds at
//! `max_percent` afterwards. It is not backed by sales data. The model holds no
//! timer and no mutable state, so snapshots can be taken from any task.

use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{UtcDateTime, ValidationError};

const SECONDS_PER_HOUR: i64 = 60 * 60;
const SECONDS_PER_DAY: i64 = 24 * SECONDS_PER_HOUR;

/// Campaign parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllocationModel {
    pub start_time: UtcDateTime,
    pub duration_seconds: u64,
    pub start_percent: f64,
    pub max_percent: f64,
    pub total_units: u64,
}

impl Default for AllocationModel {
    fn default() -> Self {
        Self {
            // 2026-01-15T00:00:00Z
            start_time: UtcDateTime::from_unix_timestamp(1_768_435_200)
                .unwrap_or_else(|_| UtcDateTime::now()),
            duration_seconds: 45 * SECONDS_PER_DAY as u64,
            start_percent: 45.0,
            max_percent: 95.0,
            total_units: 100_000,
        }
    }
}

impl AllocationModel {
    pub fn new(
        start_time: UtcDateTime,
        duration_seconds: u64,
        start_percent: f64,
        max_percent: f64,
        total_units: u64,
    ) -> Result<Self, ValidationError> {
        let model = Self {
            start_time,
            duration_seconds,
            start_percent,
            max_percent,
            total_units,
        };
        model.validate()?;
        Ok(model)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.duration_seconds == 0 {
            return Err(ValidationError::EmptyDuration);
        }
        if self.checked_end_time().is_none() {
            return Err(ValidationError::DurationOutOfRange {
                seconds: self.duration_seconds,
            });
        }
        if self.total_units == 0 {
            return Err(ValidationError::EmptySupply);
        }
        validate_percent("start_percent", self.start_percent)?;
        validate_percent("max_percent", self.max_percent)?;
        if self.max_percent < self.start_percent {
            return Err(ValidationError::PercentRangeInverted {
                start: self.start_percent,
                max: self.max_percent,
            });
        }
        Ok(())
    }

    /// Instant the ramp reaches `max_percent`. Never before `start_time`, even
    /// for an unvalidated model.
    pub fn end_time(&self) -> UtcDateTime {
        self.checked_end_time()
            .unwrap_or_else(|| self.start_time.saturating_add(Duration::seconds(i64::MAX)))
    }

    fn checked_end_time(&self) -> Option<UtcDateTime> {
        let seconds = i64::try_from(self.duration_seconds).ok()?;
        self.start_time.checked_add(Duration::seconds(seconds))
    }

    /// Progress percent at `now`, non-decreasing in `now`.
    pub fn percent_at(&self, now: UtcDateTime) -> f64 {
        if now < self.start_time {
            return self.start_percent;
        }
        if now >= self.end_time() {
            return self.max_percent;
        }

        let elapsed = now.since(self.start_time).as_seconds_f64();
        let fraction = elapsed / self.duration_seconds as f64;
        let percent = self.start_percent + fraction * (self.max_percent - self.start_percent);
        percent.min(self.max_percent)
    }

    pub fn snapshot(&self, now: UtcDateTime) -> AllocationSnapshot {
        let percent = self.percent_at(now);
        let sold = (percent / 100.0 * self.total_units as f64).floor();
        let sold_units = (sold.max(0.0) as u64).min(self.total_units);

        AllocationSnapshot {
            percent,
            sold_units,
            remaining_units: self.total_units - sold_units,
        }
    }

    pub fn time_remaining(&self, now: UtcDateTime) -> CampaignCountdown {
        let remaining = self.end_time().since(now).whole_seconds();
        if remaining <= 0 {
            return CampaignCountdown::Completed;
        }

        CampaignCountdown::Remaining {
            days: remaining / SECONDS_PER_DAY,
            hours: (remaining % SECONDS_PER_DAY) / SECONDS_PER_HOUR,
        }
    }
}

/// Progress at one instant. `sold_units + remaining_units` is always the model's total.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AllocationSnapshot {
    pub percent: f64,
    pub sold_units: u64,
    pub remaining_units: u64,
}

impl AllocationSnapshot {
    pub fn total_units(&self) -> u64 {
        self.sold_units + self.remaining_units
    }
}

/// Time left until the ramp reaches its cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CampaignCountdown {
    Remaining { days: i64, hours: i64 },
    Completed,
}

impl std::fmt::Display for CampaignCountdown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Completed => f.write_str("Campaign completed"),
            Self::Remaining { days, hours } => write!(f, "{days}d {hours}h remaining"),
        }
    }
}

/// Compact unit count: `70000` -> `70.0k`, `950` -> `950`.
pub fn format_token_count(count: u64) -> String {
    if count >= 1000 {
        return format!("{:.1}k", count as f64 / 1000.0);
    }
    count.to_string()
}

fn validate_percent(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    if !(0.0..=100.0).contains(&value) {
        return Err(ValidationError::PercentOutOfRange { field, value });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start() -> UtcDateTime {
        UtcDateTime::parse("2026-01-15T00:00:00Z").expect("timestamp")
    }

    #[test]
    fn default_model_starts_mid_january() {
        let model = AllocationModel::default();
        assert_eq!(model.start_time, start());
        assert!(model.validate().is_ok());
    }

    #[test]
    fn halfway_through_ramp_is_seventy_percent() {
        let model = AllocationModel::default();
        let now = start().saturating_add(Duration::hours(22 * 24 + 12));
        let snapshot = model.snapshot(now);
        assert!((snapshot.percent - 70.0).abs() < 1e-9);
        assert_eq!(snapshot.sold_units, 70_000);
        assert_eq!(snapshot.remaining_units, 30_000);
    }

    #[test]
    fn countdown_splits_days_and_hours() {
        let model = AllocationModel::default();
        let now = start().saturating_add(Duration::hours(24 * 40 + 5));
        assert_eq!(
            model.time_remaining(now),
            CampaignCountdown::Remaining { days: 4, hours: 19 }
        );
        assert_eq!(model.time_remaining(now).to_string(), "4d 19h remaining");
        assert_eq!(
            model.time_remaining(model.end_time()),
            CampaignCountdown::Completed
        );
    }

    #[test]
    fn formats_token_counts() {
        assert_eq!(format_token_count(70_000), "70.0k");
        assert_eq!(format_token_count(1_000), "1.0k");
        assert_eq!(format_token_count(999), "999");
    }

    #[test]
    fn rejects_inverted_percent_range() {
        let err = AllocationModel::new(start(), 60, 80.0, 50.0, 10).expect_err("must fail");
        assert!(matches!(err, ValidationError::PercentRangeInverted { .. }));
    }

    #[test]
    fn rejects_durations_past_the_calendar() {
        for seconds in [u64::MAX, i64::MAX as u64, 400 * 365 * SECONDS_PER_DAY as u64 * 100] {
            let err = AllocationModel::new(start(), seconds, 45.0, 95.0, 100).expect_err("must fail");
            assert_eq!(err, ValidationError::DurationOutOfRange { seconds });
        }
    }

    #[test]
    fn long_valid_ramp_still_starts_at_start_percent() {
        let seconds = 3_000 * 365 * SECONDS_PER_DAY as u64;
        let model = AllocationModel::new(start(), seconds, 45.0, 95.0, 100).expect("valid model");

        assert!(model.end_time() > model.start_time);
        assert_eq!(model.end_time().since(model.start_time).whole_seconds(), seconds as i64);
        assert_eq!(model.percent_at(model.start_time), 45.0);
    }

    #[test]
    fn unvalidated_overflowing_model_never_ends_before_it_starts() {
        let model = AllocationModel {
            duration_seconds: u64::MAX,
            ..AllocationModel::default()
        };
        assert!(model.end_time() >= model.start_time);
        assert_eq!(model.percent_at(model.start_time), model.start_percent);
    }

    #[test]
    fn sold_units_take_percent_share_then_floor() {
        let model = AllocationModel {
            start_percent: 57.0,
            max_percent: 57.0,
            total_units: 100,
            ..AllocationModel::default()
        };
        let snapshot = model.snapshot(start());
        assert_eq!(snapshot.sold_units, (57.0_f64 / 100.0 * 100.0).floor() as u64);
        assert_eq!(snapshot.sold_units + snapshot.remaining_units, 100);
    }
}
