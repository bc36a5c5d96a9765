use serde::Serialize;

use presale_core::display::render_wallet;
use presale_core::{BalanceDisplay, MemorySurface, WalletError, WalletSession};

use crate::cli::{WalletArgs, WalletCommand};
use crate::error::CliError;

use super::{CommandResult, Runtime};

#[derive(Debug, Serialize)]
struct WalletResponseData {
    connected: bool,
    address: Option<String>,
    short_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    balance: Option<BalanceDisplay>,
}

impl WalletResponseData {
    fn from_session(session: &WalletSession, balance: Option<BalanceDisplay>) -> Self {
        Self {
            connected: session.is_connected(),
            address: session.address().map(ToString::to_string),
            short_address: session.display_address(),
            balance,
        }
    }
}

pub async fn run(args: &WalletArgs, runtime: &Runtime) -> Result<CommandResult, CliError> {
    let provider = runtime.wallet_provider();
    let mut session = WalletSession::restore(&runtime.session_store);
    let mut display = MemorySurface::new();

    let (name, balance) = match args.command {
        WalletCommand::Connect => {
            session.connect(&provider, &runtime.session_store).await?;
            let balance = session.load_balance(&provider).await;
            render_wallet(&mut display, &session, balance);
            ("wallet connect", Some(balance))
        }
        WalletCommand::Status => ("wallet status", None),
        WalletCommand::Balance => {
            if !session.is_connected() {
                return Err(WalletError::WalletUnavailable.into());
            }
            let balance = session.load_balance(&provider).await;
            render_wallet(&mut display, &session, balance);
            ("wallet balance", Some(balance))
        }
    };

    let data = serde_json::to_value(WalletResponseData::from_session(&session, balance))?;
    let mut result = CommandResult::new(name, data, display);
    if balance == Some(BalanceDisplay::Unavailable) {
        result = result.with_warning("balance lookup failed; showing placeholder");
    }
    Ok(result)
}
