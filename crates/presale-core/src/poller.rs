//! Periodic price polling for the two tracked assets.
//!
//! The poller owns the publishing side of a [`watch`] channel carrying a
//! [`PriceBoard`]. Each cycle fetches both assets concurrently and publishes
//! once both fetches have finished. A failed fetch keeps the previous quote
//! as [`PriceReading::Stale`]; nothing is forwarded to consumers as an error.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::feed::{FeedError, PriceFeed};
use crate::throttling::FetchThrottle;
use crate::{PriceQuote, Symbol};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);
pub const DEFAULT_BOOTSTRAP_TIMEOUT: Duration = Duration::from_secs(30);

/// Latest known state of one feed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", content = "quote", rename_all = "snake_case")]
pub enum PriceReading {
    /// Nothing received yet.
    #[default]
    Absent,
    /// Updated in the most recent cycle.
    Fresh(PriceQuote),
    /// The most recent cycle failed; this is the last good quote.
    Stale(PriceQuote),
}

impl PriceReading {
    pub fn quote(&self) -> Option<&PriceQuote> {
        match self {
            Self::Absent => None,
            Self::Fresh(quote) | Self::Stale(quote) => Some(quote),
        }
    }

    pub fn price(&self) -> Option<f64> {
        self.quote().map(|quote| quote.current_price)
    }

    pub fn is_fresh(&self) -> bool {
        matches!(self, Self::Fresh(_))
    }

    fn refresh(&self, outcome: Result<PriceQuote, FeedError>) -> Self {
        match (outcome, self) {
            (Ok(quote), _) => Self::Fresh(quote),
            (Err(_), Self::Absent) => Self::Absent,
            (Err(_), Self::Fresh(quote) | Self::Stale(quote)) => Self::Stale(quote.clone()),
        }
    }
}

/// Published prices for the source (payment) and target (purchased) assets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceBoard {
    pub source: PriceReading,
    pub target: PriceReading,
}

impl PriceBoard {
    /// Both feeds hold a positive price.
    pub fn has_live_prices(&self) -> bool {
        let live = |reading: &PriceReading| reading.price().is_some_and(|price| price > 0.0);
        live(&self.source) && live(&self.target)
    }
}

/// Symbols polled each cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedPair {
    pub source: Symbol,
    pub target: Symbol,
}

/// Outcome of one poll cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PollReport {
    pub source_updated: bool,
    pub target_updated: bool,
    /// The cycle was skipped because the request budget was spent.
    pub throttled: bool,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BootstrapError {
    #[error("no live prices within {timeout:?}")]
    TimedOut { timeout: Duration },
    #[error("price poller stopped before publishing live prices")]
    PollerStopped,
}

pub struct PricePoller {
    feed: Arc<dyn PriceFeed>,
    pair: TrackedPair,
    interval: Duration,
    throttle: FetchThrottle,
    sender: watch::Sender<PriceBoard>,
}

impl PricePoller {
    pub fn new(feed: Arc<dyn PriceFeed>, pair: TrackedPair, interval: Duration) -> Self {
        let (sender, _) = watch::channel(PriceBoard::default());
        Self {
            feed,
            pair,
            interval,
            throttle: FetchThrottle::per_window(interval),
            sender,
        }
    }

    pub fn pair(&self) -> &TrackedPair {
        &self.pair
    }

    pub fn subscribe(&self) -> watch::Receiver<PriceBoard> {
        self.sender.subscribe()
    }

    pub fn board(&self) -> PriceBoard {
        self.sender.borrow().clone()
    }

    /// Run one cycle now, unless a cycle already ran inside the current interval.
    pub async fn poll_once(&self) -> PollReport {
        if !self.throttle.try_acquire() {
            tracing::debug!(interval = ?self.interval, "poll skipped, request budget spent");
            return PollReport {
                throttled: true,
                ..PollReport::default()
            };
        }
        self.fetch_cycle().await
    }

    /// Poll on a fixed cadence for as long as the task lives. Subscribers may
    /// come and go; abort the handle returned by [`spawn`](Self::spawn) to stop.
    pub async fn run(self) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            // The cadence already paces the loop; taking the permit keeps a
            // manual poll right after a scheduled one from doubling up.
            let _ = self.throttle.try_acquire();
            let report = self.fetch_cycle().await;
            tracing::debug!(
                subscribers = self.sender.receiver_count(),
                source_updated = report.source_updated,
                target_updated = report.target_updated,
                "scheduled poll finished"
            );
        }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn fetch_cycle(&self) -> PollReport {
        let (source, target) = tokio::join!(
            self.feed.fetch_quote(&self.pair.source),
            self.feed.fetch_quote(&self.pair.target),
        );

        let report = PollReport {
            source_updated: source.is_ok(),
            target_updated: target.is_ok(),
            throttled: false,
        };

        for (symbol, outcome) in [(&self.pair.source, &source), (&self.pair.target, &target)] {
            if let Err(error) = outcome {
                tracing::warn!(
                    feed = self.feed.name(),
                    %symbol,
                    code = error.code(),
                    "price fetch failed, keeping previous reading: {}",
                    error.message()
                );
            }
        }

        self.sender.send_modify(|board| {
            board.source = board.source.refresh(source);
            board.target = board.target.refresh(target);
        });

        report
    }
}

/// Resolve with the first board carrying live prices for both assets, or fail
/// once `timeout` has elapsed.
pub async fn wait_for_live_prices(
    receiver: &mut watch::Receiver<PriceBoard>,
    timeout: Duration,
) -> Result<PriceBoard, BootstrapError> {
    match tokio::time::timeout(timeout, receiver.wait_for(PriceBoard::has_live_prices)).await {
        Ok(Ok(board)) => {
            tracing::info!("live prices observed");
            Ok(PriceBoard::clone(&board))
        }
        Ok(Err(_)) => Err(BootstrapError::PollerStopped),
        Err(_) => Err(BootstrapError::TimedOut { timeout }),
    }
}
