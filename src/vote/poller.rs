//! Mood Poller
//!
//! Periodically refreshes a [`MoodBoard`] from a [`MoodSource`]. The loop
//! runs until its handle is cancelled or dropped and publishes every
//! applied refresh on a watch channel.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;

use super::board::{BoardSnapshot, FetchTicket, MoodBoard};
use super::service::{CommunityMoods, VoteError, VoteService};

/// Anything that can produce the current community tallies
#[async_trait]
pub trait MoodSource: Send + Sync {
    async fn fetch_moods(&self) -> Result<CommunityMoods, VoteError>;
}

#[async_trait]
impl MoodSource for VoteService {
    async fn fetch_moods(&self) -> Result<CommunityMoods, VoteError> {
        self.fetch_community_moods().await
    }
}

/// Published after every refresh that reached the board
#[derive(Debug, Clone, Serialize)]
pub struct PollUpdate {
    pub tick: u64,
    pub at: DateTime<Utc>,
    pub board: BoardSnapshot,
}

/// Run one fetch against the board.
///
/// The board lock is not held while fetching. Returns `false` when a newer
/// fetch was started meanwhile and this result was dropped. If the returned
/// future is dropped before it completes, the fetch is abandoned on the board.
pub async fn refresh_board(source: &dyn MoodSource, board: &Arc<RwLock<MoodBoard>>) -> bool {
    let ticket = board.write().await.begin_fetch();
    let mut guard = FetchGuard {
        board: Arc::clone(board),
        ticket: Some(ticket),
    };

    let result = source.fetch_moods().await;
    let applied = board.write().await.finish_fetch(ticket, result);
    guard.ticket = None;
    applied
}

/// Abandons an unfinished fetch when dropped
struct FetchGuard {
    board: Arc<RwLock<MoodBoard>>,
    ticket: Option<FetchTicket>,
}

impl Drop for FetchGuard {
    fn drop(&mut self) {
        let Some(ticket) = self.ticket.take() else {
            return;
        };

        match self.board.try_write() {
            Ok(mut board) => {
                board.abandon_fetch(ticket);
            }
            Err(_) => {
                // Lock is busy; finish the cleanup on the runtime
                if let Ok(runtime) = tokio::runtime::Handle::try_current() {
                    let board = Arc::clone(&self.board);
                    runtime.spawn(async move {
                        board.write().await.abandon_fetch(ticket);
                    });
                }
            }
        }
    }
}

pub struct MoodPoller;

impl MoodPoller {
    /// Start polling. The first refresh runs immediately.
    pub fn spawn(
        source: Arc<dyn MoodSource>,
        board: Arc<RwLock<MoodBoard>>,
        interval: Duration,
    ) -> PollerHandle {
        let (cancel_tx, mut cancel_rx) = watch::channel(false);
        let (update_tx, update_rx) = watch::channel(None);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            let mut tick = 0u64;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    _ = cancel_rx.changed() => break,
                }

                tick += 1;
                let applied = tokio::select! {
                    applied = refresh_board(source.as_ref(), &board) => applied,
                    _ = cancel_rx.changed() => break,
                };

                if applied {
                    let snapshot = board.read().await.snapshot();
                    tracing::debug!(tick, source = ?snapshot.chart.source, "Mood board refreshed");
                    let _ = update_tx.send(Some(PollUpdate {
                        tick,
                        at: Utc::now(),
                        board: snapshot,
                    }));
                }
            }

            tracing::info!("Mood poller stopped");
        });

        tracing::info!(interval_secs = interval.as_secs(), "Mood poller started");

        PollerHandle {
            cancel: cancel_tx,
            updates: update_rx,
            task,
        }
    }
}

/// Owns a running poll loop
pub struct PollerHandle {
    cancel: watch::Sender<bool>,
    updates: watch::Receiver<Option<PollUpdate>>,
    task: JoinHandle<()>,
}

impl PollerHandle {
    /// Stop the loop; an in-flight fetch is abandoned
    pub fn cancel(&self) {
        let _ = self.cancel.send(true);
    }

    /// Latest update, `None` until the first refresh lands
    pub fn subscribe(&self) -> watch::Receiver<Option<PollUpdate>> {
        self.updates.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Cancel and wait for the loop to exit
    pub async fn stop(mut self) {
        self.cancel();
        if let Err(e) = (&mut self.task).await {
            tracing::warn!(error = %e, "Mood poller task failed");
        }
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        let _ = self.cancel.send(true);
    }
}
