//! Market-data sources for the price poller.
//!
//! A [`PriceFeed`] turns a [`Symbol`] into a [`PriceQuote`]. Failures are
//! reported as [`FeedError`]; the poller downgrades them to stale readings
//! and never forwards them to the conversion engine.

mod yahoo;

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use crate::{PriceQuote, Symbol};

pub use yahoo::{YahooChartFeed, DEFAULT_BASE_URL};

/// Feed failure classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedErrorKind {
    /// Transport failure or non-success status.
    Unavailable,
    /// Upstream asked us to slow down.
    RateLimited,
    /// Response arrived but did not carry a usable price.
    MalformedPayload,
}

/// Structured feed error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedError {
    kind: FeedErrorKind,
    message: String,
}

impl FeedError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: FeedErrorKind::Unavailable,
            message: message.into(),
        }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self {
            kind: FeedErrorKind::RateLimited,
            message: message.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self {
            kind: FeedErrorKind::MalformedPayload,
            message: message.into(),
        }
    }

    pub const fn kind(&self) -> FeedErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            FeedErrorKind::Unavailable => "feed.unavailable",
            FeedErrorKind::RateLimited => "feed.rate_limited",
            FeedErrorKind::MalformedPayload => "feed.malformed_payload",
        }
    }
}

impl Display for FeedError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for FeedError {}

/// Source of current price and previous close for a single symbol.
///
/// Implementations must be `Send + Sync`; the poller fetches both tracked
/// assets concurrently from the same feed.
pub trait PriceFeed: Send + Sync {
    fn name(&self) -> &'static str;

    fn fetch_quote<'a>(
        &'a self,
        symbol: &'a Symbol,
    ) -> Pin<Box<dyn Future<Output = Result<PriceQuote, FeedError>> + Send + 'a>>;
}
