//! Named display slots and the renderers that fill them.
//!
//! Renderers only ever write text. The single read-back is the wallet balance
//! slot, which the "max amount" action copies into the conversion amount.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::allocation::{format_token_count, AllocationModel};
use crate::conversion::{ConversionResult, ConversionState, MinimumRequired};
use crate::poller::{PriceBoard, TrackedPair};
use crate::wallet::{BalanceDisplay, WalletSession};
use crate::{PriceQuote, UtcDateTime};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplaySlot {
    ConversionRate,
    TargetOutput,
    SourceUsdValue,
    TargetUsdValue,
    ValidationMessage,
    ProgressPercent,
    SoldUnits,
    RemainingUnits,
    TotalUnits,
    CampaignCountdown,
    SourcePrice,
    SourceChange,
    TargetPrice,
    TargetChange,
    TargetHighLow,
    DiscountedPrice,
    WalletAddress,
    WalletBalance,
}

impl DisplaySlot {
    pub const fn name(self) -> &'static str {
        match self {
            Self::ConversionRate => "conversion_rate",
            Self::TargetOutput => "target_output",
            Self::SourceUsdValue => "source_usd_value",
            Self::TargetUsdValue => "target_usd_value",
            Self::ValidationMessage => "validation_message",
            Self::ProgressPercent => "progress_percent",
            Self::SoldUnits => "sold_units",
            Self::RemainingUnits => "remaining_units",
            Self::TotalUnits => "total_units",
            Self::CampaignCountdown => "campaign_countdown",
            Self::SourcePrice => "source_price",
            Self::SourceChange => "source_change",
            Self::TargetPrice => "target_price",
            Self::TargetChange => "target_change",
            Self::TargetHighLow => "target_high_low",
            Self::DiscountedPrice => "discounted_price",
            Self::WalletAddress => "wallet_address",
            Self::WalletBalance => "wallet_balance",
        }
    }
}

/// Where rendered text ends up.
pub trait DisplaySurface {
    fn write(&mut self, slot: DisplaySlot, text: String);

    fn read(&self, slot: DisplaySlot) -> Option<&str>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MemorySurface {
    slots: BTreeMap<DisplaySlot, String>,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (DisplaySlot, &str)> {
        self.slots.iter().map(|(slot, text)| (*slot, text.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl DisplaySurface for MemorySurface {
    fn write(&mut self, slot: DisplaySlot, text: String) {
        self.slots.insert(slot, text);
    }

    fn read(&self, slot: DisplaySlot) -> Option<&str> {
        self.slots.get(&slot).map(String::as_str)
    }
}

pub fn render_conversion(
    surface: &mut dyn DisplaySurface,
    pair: &TrackedPair,
    state: &ConversionState,
    result: &ConversionResult,
) {
    let source = pair.source.asset_label();
    let target = pair.target.asset_label();

    // An undefined rate leaves whatever was shown before.
    if let Some(rate) = state.rate() {
        surface.write(
            DisplaySlot::ConversionRate,
            format!("1 {source} = {rate:.4} {target}"),
        );
    }

    let output = if result.target_units > 0.0 {
        format!("{:.4}", result.target_units)
    } else {
        String::from("0.00")
    };
    surface.write(DisplaySlot::TargetOutput, output);
    surface.write(DisplaySlot::SourceUsdValue, usd_estimate(result.source_usd_value));
    surface.write(DisplaySlot::TargetUsdValue, usd_estimate(result.target_usd_value));

    let message = match (result.below_minimum, result.minimum_source_required) {
        (false, _) => String::new(),
        (true, MinimumRequired::Amount(required)) => format!(
            "Minimum purchase: {} {target} (≈ {required:.4} {source} required)",
            state.min_target_units
        ),
        (true, _) => format!("Minimum purchase: {} {target}", state.min_target_units),
    };
    surface.write(DisplaySlot::ValidationMessage, message);
}

pub fn render_allocation(surface: &mut dyn DisplaySurface, model: &AllocationModel, now: UtcDateTime) {
    let snapshot = model.snapshot(now);

    surface.write(DisplaySlot::ProgressPercent, format!("{:.1}%", snapshot.percent));
    surface.write(DisplaySlot::SoldUnits, format_token_count(snapshot.sold_units));
    surface.write(
        DisplaySlot::RemainingUnits,
        format_token_count(snapshot.remaining_units),
    );
    surface.write(DisplaySlot::TotalUnits, format_token_count(model.total_units));
    surface.write(
        DisplaySlot::CampaignCountdown,
        model.time_remaining(now).to_string(),
    );
}

/// Write price slots for every feed that has a reading; absent feeds are left alone.
pub fn render_prices(surface: &mut dyn DisplaySurface, board: &PriceBoard, discount_factor: f64) {
    if let Some(quote) = board.source.quote() {
        surface.write(DisplaySlot::SourcePrice, dollars(quote.current_price));
        surface.write(
            DisplaySlot::SourceChange,
            format!("{} (24h)", change_text(quote)),
        );
    }

    if let Some(quote) = board.target.quote() {
        surface.write(DisplaySlot::TargetPrice, dollars(quote.current_price));
        surface.write(DisplaySlot::TargetChange, change_text(quote));
        surface.write(
            DisplaySlot::DiscountedPrice,
            dollars(quote.current_price * discount_factor),
        );
        if let (Some(high), Some(low)) = (quote.day_high, quote.day_low) {
            surface.write(
                DisplaySlot::TargetHighLow,
                format!("{} / {}", dollars(high), dollars(low)),
            );
        }
    }
}

pub fn render_wallet(surface: &mut dyn DisplaySurface, session: &WalletSession, balance: BalanceDisplay) {
    if let Some(address) = session.display_address() {
        surface.write(DisplaySlot::WalletAddress, address);
    }
    surface.write(DisplaySlot::WalletBalance, balance.render());
}

/// Balance as last shown, for the "max amount" action.
pub fn displayed_balance(surface: &dyn DisplaySurface) -> Option<f64> {
    surface
        .read(DisplaySlot::WalletBalance)
        .and_then(|text| text.trim().parse::<f64>().ok())
}

fn dollars(value: f64) -> String {
    format!("${value:.2}")
}

fn usd_estimate(value: f64) -> String {
    format!("≈ ${value:.2}")
}

fn change_text(quote: &PriceQuote) -> String {
    format!(
        "{} {:.2}%",
        quote.direction().arrow(),
        quote.change_percent().abs()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversion::{compute_conversion, ConversionConfig};
    use crate::poller::PriceReading;
    use crate::Symbol;

    fn pair() -> TrackedPair {
        TrackedPair {
            source: Symbol::parse("SOL-USD").expect("valid symbol"),
            target: Symbol::parse("TSLA").expect("valid symbol"),
        }
    }

    #[test]
    fn conversion_slots_use_page_formats() {
        let state = ConversionState::new(&ConversionConfig::default(), 100.0, 200.0, 1.0);
        let result = compute_conversion(&state);
        let mut surface = MemorySurface::new();

        render_conversion(&mut surface, &pair(), &state, &result);

        assert_eq!(surface.read(DisplaySlot::ConversionRate), Some("1 SOL = 1.0000 TSLA"));
        assert_eq!(surface.read(DisplaySlot::TargetOutput), Some("1.0000"));
        assert_eq!(surface.read(DisplaySlot::SourceUsdValue), Some("≈ $100.00"));
        assert_eq!(surface.read(DisplaySlot::TargetUsdValue), Some("≈ $200.00"));
        assert_eq!(surface.read(DisplaySlot::ValidationMessage), Some(""));
    }

    #[test]
    fn below_minimum_shows_required_amount() {
        let state = ConversionState::new(&ConversionConfig::default(), 100.0, 200.0, 0.1);
        let result = compute_conversion(&state);
        let mut surface = MemorySurface::new();

        render_conversion(&mut surface, &pair(), &state, &result);

        assert_eq!(
            surface.read(DisplaySlot::ValidationMessage),
            Some("Minimum purchase: 0.5 TSLA (≈ 0.5000 SOL required)")
        );
    }

    #[test]
    fn zero_prices_leave_rate_untouched() {
        let state = ConversionState::new(&ConversionConfig::default(), 0.0, 0.0, 1.0);
        let result = compute_conversion(&state);
        let mut surface = MemorySurface::new();
        surface.write(DisplaySlot::ConversionRate, String::from("1 SOL = 0.7500 TSLA"));

        render_conversion(&mut surface, &pair(), &state, &result);

        assert_eq!(surface.read(DisplaySlot::ConversionRate), Some("1 SOL = 0.7500 TSLA"));
        assert_eq!(surface.read(DisplaySlot::TargetOutput), Some("0.00"));
    }

    #[test]
    fn price_slots_skip_absent_feeds() {
        let target = PriceQuote::new(
            Symbol::parse("TSLA").expect("valid symbol"),
            240.0,
            250.0,
            UtcDateTime::now(),
        )
        .expect("valid quote")
        .with_session(Some(255.5), Some(238.25), None)
        .expect("valid session");
        let board = PriceBoard {
            source: PriceReading::Absent,
            target: PriceReading::Stale(target),
        };
        let mut surface = MemorySurface::new();

        render_prices(&mut surface, &board, 0.5);

        assert_eq!(surface.read(DisplaySlot::SourcePrice), None);
        assert_eq!(surface.read(DisplaySlot::TargetPrice), Some("$240.00"));
        assert_eq!(surface.read(DisplaySlot::TargetChange), Some("↓ 4.00%"));
        assert_eq!(surface.read(DisplaySlot::TargetHighLow), Some("$255.50 / $238.25"));
        assert_eq!(surface.read(DisplaySlot::DiscountedPrice), Some("$120.00"));
    }

    #[test]
    fn balance_slot_reads_back() {
        let mut surface = MemorySurface::new();
        render_wallet(&mut surface, &WalletSession::default(), BalanceDisplay::Available(1.23456));

        assert_eq!(surface.read(DisplaySlot::WalletAddress), None);
        assert_eq!(displayed_balance(&surface), Some(1.2346));
    }

    #[test]
    fn source_change_is_labelled_as_daily() {
        let source = PriceQuote::new(
            Symbol::parse("SOL-USD").expect("valid symbol"),
            153.0,
            150.0,
            UtcDateTime::now(),
        )
        .expect("valid quote");
        let board = PriceBoard {
            source: PriceReading::Fresh(source),
            target: PriceReading::Absent,
        };
        let mut surface = MemorySurface::new();

        render_prices(&mut surface, &board, 0.5);

        assert_eq!(surface.read(DisplaySlot::SourcePrice), Some("$153.00"));
        assert_eq!(surface.read(DisplaySlot::SourceChange), Some("↑ 2.00% (24h)"));
        assert_eq!(surface.read(DisplaySlot::TargetChange), None);
    }
}
