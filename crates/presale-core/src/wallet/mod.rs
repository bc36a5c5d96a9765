//! Wallet connection, balance lookup and the persisted session.
//!
//! The core only needs two things from a wallet: an address to show in
//! shortened form and a balance to copy into the conversion amount. Both
//! arrive through [`WalletProvider`]; the connected address is persisted
//! through a [`SessionStore`] under a single well-known key.

mod rpc;
mod session;

use std::future::Future;
use std::pin::Pin;

use serde::Serialize;
use thiserror::Error;

use crate::WalletAddress;

pub use rpc::{RpcWalletProvider, DEFAULT_RPC_URL, LAMPORTS_PER_SOL};
pub use session::{FileSessionStore, MemorySessionStore, SessionStore, SESSION_KEY};

/// Wallet failures. None of them is fatal; each degrades one display region.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WalletError {
    #[error("no wallet available; configure a public key to connect")]
    WalletUnavailable,
    #[error("connection rejected: {reason}")]
    ConnectionRejected { reason: String },
    #[error("balance lookup failed: {reason}")]
    BalanceFetch { reason: String },
}

impl WalletError {
    pub const fn code(&self) -> &'static str {
        match self {
            Self::WalletUnavailable => "wallet.unavailable",
            Self::ConnectionRejected { .. } => "wallet.connection_rejected",
            Self::BalanceFetch { .. } => "wallet.balance_fetch",
        }
    }
}

/// Source of the connected address and its balance.
pub trait WalletProvider: Send + Sync {
    fn connect<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<WalletAddress, WalletError>> + Send + 'a>>;

    /// Balance in whole units of the source asset.
    fn balance<'a>(
        &'a self,
        address: &'a WalletAddress,
    ) -> Pin<Box<dyn Future<Output = Result<f64, WalletError>> + Send + 'a>>;
}

/// What the balance slot should show.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "state", content = "amount", rename_all = "snake_case")]
pub enum BalanceDisplay {
    NotConnected,
    Available(f64),
    /// Lookup failed; rendered as a zero placeholder.
    Unavailable,
}

impl BalanceDisplay {
    pub fn amount(self) -> Option<f64> {
        match self {
            Self::Available(amount) => Some(amount),
            Self::NotConnected | Self::Unavailable => None,
        }
    }

    pub fn render(self) -> String {
        match self {
            Self::Available(amount) => format!("{amount:.4}"),
            Self::NotConnected | Self::Unavailable => String::from("0.00"),
        }
    }
}

/// Connected wallet, restored once at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalletSession {
    address: Option<WalletAddress>,
}

impl WalletSession {
    /// Read the persisted address. An unreadable store counts as "not connected".
    pub fn restore(store: &dyn SessionStore) -> Self {
        match store.load() {
            Ok(address) => Self { address },
            Err(error) => {
                tracing::warn!("could not read wallet session: {error}");
                Self::default()
            }
        }
    }

    pub fn address(&self) -> Option<&WalletAddress> {
        self.address.as_ref()
    }

    pub fn is_connected(&self) -> bool {
        self.address.is_some()
    }

    pub fn display_address(&self) -> Option<String> {
        self.address.as_ref().map(WalletAddress::short)
    }

    /// Connect through the provider and persist the address.
    pub async fn connect(
        &mut self,
        provider: &dyn WalletProvider,
        store: &dyn SessionStore,
    ) -> Result<WalletAddress, WalletError> {
        let address = provider.connect().await?;

        if let Err(error) = store.save(&address) {
            tracing::warn!("wallet connected but session was not persisted: {error}");
        }

        tracing::info!(address = %address.short(), "wallet connected");
        self.address = Some(address.clone());
        Ok(address)
    }

    pub async fn load_balance(&self, provider: &dyn WalletProvider) -> BalanceDisplay {
        let Some(address) = &self.address else {
            return BalanceDisplay::NotConnected;
        };

        match provider.balance(address).await {
            Ok(amount) => BalanceDisplay::Available(amount),
            Err(error) => {
                tracing::warn!(address = %address.short(), "{error}");
                BalanceDisplay::Unavailable
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn balance_renders_four_places_or_placeholder() {
        assert_eq!(BalanceDisplay::Available(2.5).render(), "2.5000");
        assert_eq!(BalanceDisplay::Unavailable.render(), "0.00");
        assert_eq!(BalanceDisplay::Unavailable.amount(), None);
    }

    #[test]
    fn error_codes_are_stable() {
        assert_eq!(WalletError::WalletUnavailable.code(), "wallet.unavailable");
        assert_eq!(
            WalletError::BalanceFetch {
                reason: String::from("x")
            }
            .code(),
            "wallet.balance_fetch"
        );
    }
}
