//! # Presale Core
//!
//! Compute core and thin collaborators for a discounted token presale page.
//!
//! ## Overview
//!
//! - **Conversion engine**: source amount to discounted target units, USD
//!   equivalents and the minimum-purchase check
//! - **Allocation model**: time-scheduled progress percent with sold and
//!   remaining unit counts
//! - **Price poller**: periodic quotes for the source and target assets,
//!   published over a `tokio::sync::watch` channel
//! - **Wallet session**: connected address, balance lookup and the persisted
//!   `walletPublicKey` entry
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`allocation`] | Time-based progress model |
//! | [`config`] | `config.json` loading and environment overrides |
//! | [`conversion`] | Discounted conversion math |
//! | [`display`] | Named display slots and renderers |
//! | [`domain`] | Symbols, quotes, timestamps, wallet addresses |
//! | [`error`] | Core error types |
//! | [`feed`] | Price feed trait and the Yahoo chart adapter |
//! | [`http_client`] | HTTP client abstraction |
//! | [`poller`] | Poll loop, price board and bootstrap wait |
//! | [`throttling`] | Request budget for the poller |
//! | [`wallet`] | Wallet provider, RPC balance lookup, session store |
//!
//! ## Quick Start
//!
//! ```rust
//! use presale_core::{compute_conversion, ConversionConfig, ConversionState};
//!
//! let state = ConversionState::new(&ConversionConfig::default(), 100.0, 200.0, 1.0);
//! let result = compute_conversion(&state);
//! assert_eq!(result.target_units, 1.0);
//! assert_eq!(result.target_usd_value, 200.0);
//! ```
//!
//! ## Failure model
//!
//! Nothing here is fatal. Feed failures leave the previous quote in place as
//! [`PriceReading::Stale`], wallet failures degrade to a placeholder balance,
//! and a purchase below the minimum is a flag on [`ConversionResult`].

pub mod allocation;
pub mod config;
pub mod conversion;
pub mod display;
pub mod domain;
pub mod error;
pub mod feed;
pub mod http_client;
pub mod poller;
pub mod throttling;
pub mod wallet;

// Allocation
pub use allocation::{format_token_count, AllocationModel, AllocationSnapshot, CampaignCountdown};

// Configuration
pub use config::{resolve_presale_home, AllocationConfig, FeedConfig, PresaleConfig, WalletConfig};

// Conversion
pub use conversion::{
    compute_conversion, conversion_rate, max_amount, ConversionConfig, ConversionResult,
    ConversionState, MinimumRequired,
};

// Display
pub use display::{DisplaySlot, DisplaySurface, MemorySurface};

// Domain models
pub use domain::{format_address, PriceDirection, PriceQuote, Symbol, UtcDateTime, WalletAddress};

// Error types
pub use error::{CoreError, ValidationError};

// Price feeds
pub use feed::{FeedError, FeedErrorKind, PriceFeed, YahooChartFeed};

// HTTP client types
pub use http_client::{HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse, ReqwestHttpClient};

// Polling
pub use poller::{
    wait_for_live_prices, BootstrapError, PollReport, PriceBoard, PricePoller, PriceReading,
    TrackedPair,
};

// Throttling
pub use throttling::FetchThrottle;

// Wallet
pub use wallet::{
    BalanceDisplay, FileSessionStore, MemorySessionStore, RpcWalletProvider, SessionStore,
    WalletError, WalletProvider, WalletSession,
};
