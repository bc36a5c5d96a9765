use serde::Serialize;

use presale_core::display::{displayed_balance, render_conversion, render_prices, render_wallet};
use presale_core::{
    compute_conversion, max_amount, BalanceDisplay, ConversionResult, ConversionState,
    MemorySurface, PriceBoard, WalletSession,
};

use crate::cli::ConvertArgs;
use crate::error::CliError;

use super::{missing_prices_warning, CommandResult, Runtime};

#[derive(Debug, Serialize)]
struct ConvertResponseData {
    state: ConversionState,
    result: ConversionResult,
    rate: Option<f64>,
    prices: PriceBoard,
    #[serde(skip_serializing_if = "Option::is_none")]
    balance: Option<BalanceDisplay>,
}

pub async fn run(args: &ConvertArgs, runtime: &Runtime) -> Result<CommandResult, CliError> {
    if let Some(amount) = args.amount {
        if !amount.is_finite() || amount < 0.0 {
            return Err(CliError::Command(format!(
                "amount must be a non-negative number, got {amount}"
            )));
        }
    }

    let poller = runtime.poller();
    poller.poll_once().await;
    let board = poller.board();

    let mut display = MemorySurface::new();
    render_prices(&mut display, &board, runtime.config.conversion.discount_factor);

    let state = ConversionState::from_board(
        &runtime.config.conversion,
        &board,
        args.amount.unwrap_or(0.0),
    );

    let mut warnings = Vec::new();
    let (state, result, balance) = if args.max {
        let session = WalletSession::restore(&runtime.session_store);
        let balance = session.load_balance(&runtime.wallet_provider()).await;
        render_wallet(&mut display, &session, balance);

        match displayed_balance(&display).filter(|_| balance.amount().is_some()) {
            Some(shown) => {
                let (state, result) = max_amount(&state, shown);
                (state, result, Some(balance))
            }
            None => {
                warnings.push(String::from(
                    "wallet balance unavailable; amount left unchanged",
                ));
                (state, compute_conversion(&state), Some(balance))
            }
        }
    } else {
        (state, compute_conversion(&state), None)
    };

    render_conversion(&mut display, poller.pair(), &state, &result);
    warnings.extend(missing_prices_warning(&board));

    let data = serde_json::to_value(ConvertResponseData {
        rate: state.rate(),
        state,
        result,
        prices: board,
        balance,
    })?;

    let mut command_result = CommandResult::new("convert", data, display);
    for warning in warnings {
        command_result = command_result.with_warning(warning);
    }
    Ok(command_result)
}
