mod convert;
mod prices;
mod progress;
mod wallet;
mod watch;

use std::sync::Arc;

use serde_json::Value;

use presale_core::config::default_session_store;
use presale_core::{
    FileSessionStore, HttpClient, MemorySurface, PresaleConfig, PricePoller, ReqwestHttpClient,
    RpcWalletProvider,
};

use crate::cli::{Cli, Command};
use crate::error::CliError;

/// Sink for intermediate results of long-running commands.
pub type Emit<'a> = dyn FnMut(&CommandResult) -> Result<(), CliError> + 'a;

pub struct CommandResult {
    pub command: &'static str,
    pub data: Value,
    pub display: MemorySurface,
    pub warnings: Vec<String>,
}

impl CommandResult {
    pub fn new(command: &'static str, data: Value, display: MemorySurface) -> Self {
        Self {
            command,
            data,
            display,
            warnings: Vec::new(),
        }
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }
}

/// Configuration and collaborators shared by every command.
pub struct Runtime {
    pub config: PresaleConfig,
    http_client: Arc<dyn HttpClient>,
    pub session_store: FileSessionStore,
}

impl Runtime {
    pub fn load() -> Result<Self, CliError> {
        let config = PresaleConfig::load().map_err(CliError::Config)?;
        Ok(Self {
            config,
            http_client: Arc::new(ReqwestHttpClient::new()),
            session_store: default_session_store(),
        })
    }

    pub fn poller(&self) -> PricePoller {
        let feed = self.config.price_feed(Arc::clone(&self.http_client));
        PricePoller::new(
            Arc::new(feed),
            self.config.tracked_pair(),
            self.config.poll_interval(),
        )
    }

    pub fn wallet_provider(&self) -> RpcWalletProvider {
        self.config.wallet_provider(Arc::clone(&self.http_client))
    }
}

pub async fn run(cli: &Cli, emit: &mut Emit<'_>) -> Result<CommandResult, CliError> {
    let runtime = Runtime::load()?;

    match &cli.command {
        Command::Convert(args) => convert::run(args, &runtime).await,
        Command::Progress(args) => progress::run(args, &runtime),
        Command::Prices => prices::run(&runtime).await,
        Command::Wallet(args) => wallet::run(args, &runtime).await,
        Command::Watch(args) => watch::run(args, &runtime, emit).await,
    }
}

/// Warning attached when a command had to work without both prices.
fn missing_prices_warning(board: &presale_core::PriceBoard) -> Option<String> {
    if board.has_live_prices() {
        return None;
    }
    Some(String::from(
        "live prices unavailable; conversion figures fall back to zero",
    ))
}
