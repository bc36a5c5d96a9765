//! Discounted source-to-target conversion.
//!
//! A buyer pays in the source asset (SOL) and receives target units (TSLA
//! shares) priced at `target_price * discount_factor`. The USD value of what
//! the buyer receives is reported at the undiscounted market price; the spread
//! between the two is the discount being granted.
//!
//! Every function here is pure. A [`ConversionState`] is rebuilt from the
//! latest quotes and the entered amount on every recomputation.

use serde::{Deserialize, Serialize};

use crate::poller::PriceBoard;
use crate::ValidationError;

/// Tunable purchase terms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionConfig {
    /// Multiplier applied to the target market price, within `(0, 1]`.
    pub discount_factor: f64,
    /// Smallest purchasable amount of the target asset.
    pub min_target_units: f64,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            discount_factor: 0.5,
            min_target_units: 0.5,
        }
    }
}

impl ConversionConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let discount = self.discount_factor;
        if !discount.is_finite() || discount <= 0.0 || discount > 1.0 {
            return Err(ValidationError::DiscountOutOfRange { value: discount });
        }
        if !self.min_target_units.is_finite() {
            return Err(ValidationError::NonFiniteValue {
                field: "min_target_units",
            });
        }
        if self.min_target_units <= 0.0 {
            return Err(ValidationError::NonPositiveValue {
                field: "min_target_units",
            });
        }
        Ok(())
    }
}

/// Inputs to one conversion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConversionState {
    pub source_price: f64,
    pub target_price: f64,
    pub discount_factor: f64,
    pub min_target_units: f64,
    pub source_amount: f64,
}

impl ConversionState {
    pub fn new(
        config: &ConversionConfig,
        source_price: f64,
        target_price: f64,
        source_amount: f64,
    ) -> Self {
        Self {
            source_price,
            target_price,
            discount_factor: config.discount_factor,
            min_target_units: config.min_target_units,
            source_amount,
        }
    }

    /// Build from the latest published prices. A feed that has not reported
    /// yet contributes a zero price, which yields the degenerate all-zero result.
    pub fn from_board(config: &ConversionConfig, board: &PriceBoard, source_amount: f64) -> Self {
        Self::new(
            config,
            board.source.price().unwrap_or(0.0),
            board.target.price().unwrap_or(0.0),
            source_amount,
        )
    }

    pub fn discounted_target_price(&self) -> f64 {
        self.target_price * self.discount_factor
    }

    pub fn with_amount(self, source_amount: f64) -> Self {
        Self {
            source_amount,
            ..self
        }
    }

    /// Copy a wallet balance into the amount. Non-positive or unreadable
    /// balances leave the amount untouched.
    pub fn with_max_amount(self, balance: f64) -> Self {
        if !balance.is_finite() || balance <= 0.0 {
            return self;
        }
        self.with_amount(round_to(balance, 4))
    }

    pub fn rate(&self) -> Option<f64> {
        conversion_rate(self.source_price, self.discounted_target_price())
    }
}

/// Minimum source amount needed to reach the purchase threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "amount", rename_all = "snake_case")]
pub enum MinimumRequired {
    /// The purchase meets the threshold, or there is nothing to purchase.
    NotApplicable,
    Amount(f64),
    /// Below the threshold but the source price is zero.
    NotComputable,
}

impl MinimumRequired {
    pub fn amount(self) -> Option<f64> {
        match self {
            Self::Amount(value) => Some(value),
            Self::NotApplicable | Self::NotComputable => None,
        }
    }
}

/// Output of [`compute_conversion`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConversionResult {
    pub target_units: f64,
    pub source_usd_value: f64,
    pub target_usd_value: f64,
    pub below_minimum: bool,
    pub minimum_source_required: MinimumRequired,
}

impl ConversionResult {
    pub const fn zero() -> Self {
        Self {
            target_units: 0.0,
            source_usd_value: 0.0,
            target_usd_value: 0.0,
            below_minimum: false,
            minimum_source_required: MinimumRequired::NotApplicable,
        }
    }
}

pub fn compute_conversion(state: &ConversionState) -> ConversionResult {
    let amount = state.source_amount;
    if !amount.is_finite() || amount <= 0.0 {
        return ConversionResult::zero();
    }

    let source_usd_value = amount * state.source_price;

    let discounted = state.discounted_target_price();
    if !discounted.is_finite() || discounted <= 0.0 {
        return ConversionResult::zero();
    }

    let target_units = source_usd_value / discounted;
    let below_minimum = target_units > 0.0 && target_units < state.min_target_units;

    let minimum_source_required = if !below_minimum {
        MinimumRequired::NotApplicable
    } else if state.source_price > 0.0 {
        MinimumRequired::Amount(state.min_target_units * discounted / state.source_price)
    } else {
        MinimumRequired::NotComputable
    };

    ConversionResult {
        target_units,
        source_usd_value,
        target_usd_value: target_units * state.target_price,
        below_minimum,
        minimum_source_required,
    }
}

/// Recompute with the wallet balance as the amount.
pub fn max_amount(state: &ConversionState, balance: f64) -> (ConversionState, ConversionResult) {
    let state = state.with_max_amount(balance);
    let result = compute_conversion(&state);
    (state, result)
}

/// Target units bought per source unit; `None` when either price is zero.
pub fn conversion_rate(source_price: f64, discounted_target_price: f64) -> Option<f64> {
    if source_price <= 0.0 || discounted_target_price <= 0.0 {
        return None;
    }
    Some(source_price / discounted_target_price)
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10_f64.powi(decimals);
    (value * scale).round() / scale
}
