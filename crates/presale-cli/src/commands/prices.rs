use serde::Serialize;

use presale_core::display::render_prices;
use presale_core::{MemorySurface, PollReport, PriceBoard, TrackedPair};

use crate::error::CliError;

use super::{CommandResult, Runtime};

#[derive(Debug, Serialize)]
struct PricesResponseData {
    pair: TrackedPair,
    report: PollReport,
    prices: PriceBoard,
    discounted_target_price: Option<f64>,
}

pub async fn run(runtime: &Runtime) -> Result<CommandResult, CliError> {
    let poller = runtime.poller();
    let report = poller.poll_once().await;
    let board = poller.board();
    let discount = runtime.config.conversion.discount_factor;

    let mut display = MemorySurface::new();
    render_prices(&mut display, &board, discount);

    let mut result = CommandResult::new(
        "prices",
        serde_json::to_value(PricesResponseData {
            pair: poller.pair().clone(),
            report,
            discounted_target_price: board.target.price().map(|price| price * discount),
            prices: board,
        })?,
        display,
    );

    if !report.source_updated {
        result = result.with_warning(format!("no quote for {}", poller.pair().source));
    }
    if !report.target_updated {
        result = result.with_warning(format!("no quote for {}", poller.pair().target));
    }
    Ok(result)
}
