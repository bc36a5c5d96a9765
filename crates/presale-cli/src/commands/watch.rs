use serde::Serialize;
use tokio::time::MissedTickBehavior;

use presale_core::display::{render_allocation, render_conversion, render_prices};
use presale_core::{
    compute_conversion, wait_for_live_prices, AllocationSnapshot, ConversionResult,
    ConversionState, MemorySurface, PriceBoard, PriceReading, TrackedPair, UtcDateTime,
};

use crate::cli::WatchArgs;
use crate::error::CliError;

use super::{missing_prices_warning, CommandResult, Emit, Runtime};

#[derive(Debug, Serialize)]
struct WatchFrameData<'a> {
    at: UtcDateTime,
    price_updates: u64,
    prices: &'a PriceBoard,
    conversion: ConversionResult,
    allocation: AllocationSnapshot,
}

pub async fn run(
    args: &WatchArgs,
    runtime: &Runtime,
    emit: &mut Emit<'_>,
) -> Result<CommandResult, CliError> {
    if !args.amount.is_finite() || args.amount < 0.0 {
        return Err(CliError::Command(format!(
            "amount must be a non-negative number, got {}",
            args.amount
        )));
    }

    let config = &runtime.config;
    let poller = runtime.poller();
    let pair = poller.pair().clone();
    let mut prices = poller.subscribe();
    let poll_task = poller.spawn();

    let mut warnings = Vec::new();
    let mut updates = match wait_for_live_prices(&mut prices, config.bootstrap_timeout()).await {
        Ok(_) => 1,
        Err(error) => {
            tracing::warn!("{error}; continuing with whatever the poller publishes");
            warnings.push(error.to_string());
            0
        }
    };

    let mut allocation_ticker = tokio::time::interval(config.allocation_refresh());
    allocation_ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        if args.cycles.is_some_and(|limit| updates >= limit) {
            break;
        }

        tokio::select! {
            changed = prices.changed() => {
                if changed.is_err() {
                    warnings.push(String::from("price poller stopped"));
                    break;
                }
                updates += 1;
                let board = prices.borrow_and_update().clone();
                emit(&frame(runtime, &pair, &board, args.amount, updates)?)?;
            }
            _ = allocation_ticker.tick() => {
                let board = prices.borrow().clone();
                emit(&frame(runtime, &pair, &board, args.amount, updates)?)?;
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::debug!("interrupted");
                break;
            }
        }
    }

    poll_task.abort();

    let board = prices.borrow().clone();
    let mut summary = frame(runtime, &pair, &board, args.amount, updates)?;
    summary.command = "watch summary";
    for warning in warnings {
        summary = summary.with_warning(warning);
    }
    Ok(summary)
}

fn frame(
    runtime: &Runtime,
    pair: &TrackedPair,
    board: &PriceBoard,
    amount: f64,
    price_updates: u64,
) -> Result<CommandResult, CliError> {
    let config = &runtime.config;
    let at = UtcDateTime::now();
    let mut display = MemorySurface::new();

    render_prices(&mut display, board, config.conversion.discount_factor);
    let state = ConversionState::from_board(&config.conversion, board, amount);
    let conversion = compute_conversion(&state);
    render_conversion(&mut display, pair, &state, &conversion);
    render_allocation(&mut display, &config.allocation.model, at);

    let data = serde_json::to_value(WatchFrameData {
        at,
        price_updates,
        prices: board,
        conversion,
        allocation: config.allocation.model.snapshot(at),
    })?;

    let mut result = CommandResult::new("watch", data, display);
    result.warnings.extend(missing_prices_warning(board));
    for (symbol, reading) in [(&pair.source, &board.source), (&pair.target, &board.target)] {
        if matches!(reading, PriceReading::Stale(_)) {
            result = result.with_warning(format!("{symbol} quote is stale; last fetch failed"));
        }
    }
    Ok(result)
}
