use serde::{Deserialize, Serialize};

use crate::{Symbol, UtcDateTime, ValidationError};

/// Snapshot of one tracked asset: current price and the previous reference close.
///
/// Quotes are immutable once published and are superseded wholesale by the
/// next one for the same symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub symbol: Symbol,
    pub current_price: f64,
    pub previous_close: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_high: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_low: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_close: Option<f64>,
    pub as_of: UtcDateTime,
}

impl PriceQuote {
    pub fn new(
        symbol: Symbol,
        current_price: f64,
        previous_close: f64,
        as_of: UtcDateTime,
    ) -> Result<Self, ValidationError> {
        validate_positive("current_price", current_price)?;
        validate_positive("previous_close", previous_close)?;

        Ok(Self {
            symbol,
            current_price,
            previous_close,
            day_high: None,
            day_low: None,
            day_close: None,
            as_of,
        })
    }

    /// Attach the latest session candle. Absent values stay absent.
    pub fn with_session(
        mut self,
        high: Option<f64>,
        low: Option<f64>,
        close: Option<f64>,
    ) -> Result<Self, ValidationError> {
        validate_optional_non_negative("day_high", high)?;
        validate_optional_non_negative("day_low", low)?;
        validate_optional_non_negative("day_close", close)?;
        self.day_high = high;
        self.day_low = low;
        self.day_close = close;
        Ok(self)
    }

    pub fn change(&self) -> f64 {
        self.current_price - self.previous_close
    }

    pub fn change_percent(&self) -> f64 {
        self.change() / self.previous_close * 100.0
    }

    pub fn direction(&self) -> PriceDirection {
        if self.change_percent() >= 0.0 {
            PriceDirection::Up
        } else {
            PriceDirection::Down
        }
    }
}

/// Sign of the move against the previous close. A flat session counts as up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceDirection {
    Up,
    Down,
}

impl PriceDirection {
    pub const fn arrow(self) -> &'static str {
        match self {
            Self::Up => "↑",
            Self::Down => "↓",
        }
    }
}

fn validate_positive(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    if value <= 0.0 {
        return Err(ValidationError::NonPositiveValue { field });
    }
    Ok(())
}

fn validate_optional_non_negative(
    field: &'static str,
    value: Option<f64>,
) -> Result<(), ValidationError> {
    if let Some(value) = value {
        if !value.is_finite() {
            return Err(ValidationError::NonFiniteValue { field });
        }
        if value < 0.0 {
            return Err(ValidationError::NegativeValue { field });
        }
    }
    Ok(())
}
