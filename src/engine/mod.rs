//! Relay engine — per-bot pollers driven by a fixed-interval scheduler.
//!
//! Each sweep polls every active bot sequentially: fetch updates, advance
//! the cursor, filter and authorize senders, forward text and media. A slow
//! or erroring bot delays, but never aborts, the sweep.

mod media;
mod poller;
mod recovery;
mod routing;


pub use routing::{authorize, send_direct, AuthDecision, DirectSendOutcome};

use courier_core::config::{PollConfig, RewriteConfig};
use courier_core::traits::{CursorStore, Directory};
use courier_telegram::api::BotApi;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

/// The relay engine: owns the set of active bots and re-polls each on a
/// fixed interval, forever.
pub struct Engine {
    pub(crate) api: Arc<dyn BotApi>,
    pub(crate) directory: Arc<dyn Directory>,
    pub(crate) cursors: Arc<dyn CursorStore>,
    pub(crate) poll: PollConfig,
    pub(crate) rewrite: RewriteConfig,
}

impl Engine {
    pub fn new(
        api: Arc<dyn BotApi>,
        directory: Arc<dyn Directory>,
        cursors: Arc<dyn CursorStore>,
        poll: PollConfig,
        rewrite: RewriteConfig,
    ) -> Self {
        Self {
            api,
            directory,
            cursors,
            poll,
            rewrite,
        }
    }

    /// Run the polling sweep forever.
    pub async fn run(&self) {
        info!(
            "Courier engine running | interval: {}s | private_only: {} | rewrite: {}",
            self.poll.interval_secs, self.poll.private_only, self.rewrite.enabled,
        );

        loop {
            self.sweep().await;
            tokio::time::sleep(Duration::from_secs(self.poll.interval_secs)).await;
        }
    }

    /// One sequential pass over all active bots.
    ///
    /// Every poller failure is caught and logged here; nothing escapes to
    /// the caller.
    pub async fn sweep(&self) {
        let bots = match self.directory.list_active_bots().await {
            Ok(bots) => bots,
            Err(e) => {
                error!("failed to list active bots: {e}");
                return;
            }
        };

        let bots: Vec<_> = bots
            .into_iter()
            .filter(|bot| !self.poll.exclude_bots.contains(&bot.name))
            .collect();

        if bots.is_empty() {
            debug!("no active bots to poll");
            return;
        }

        for bot in &bots {
            if let Err(e) = self.poll_bot(bot).await {
                error!("poll cycle failed for bot {}: {e}", bot.name);
            }
        }
    }
}
