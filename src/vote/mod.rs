//! Mood Votes
//!
//! The vote pipeline, from a selected mood to the live chart:
//!
//! - **memo**: `(emoji, mood name)` to and from the 28-byte text memo
//! - **catalog**: selectable moods and their chart colors
//! - **aggregate**: counts, percentages and headline numbers
//! - **service**: vote submission and community tally over a [`LedgerApi`]
//! - **board**: owned chart state with latest-fetch-wins updates
//! - **poller**: periodic board refresh with cancellation
//!
//! [`LedgerApi`]: crate::ledger::LedgerApi

mod aggregate;
pub mod catalog;
mod board;
mod memo;
mod poller;
mod service;

pub use aggregate::{aggregate, aggregate_memos, MoodTally, MoodVote, TallyBuilder, TallySummary};
pub use board::{BoardSnapshot, ChartData, ChartSource, FetchTicket, MoodBoard};
pub use catalog::{Mood, DEFAULT_COLOR, MOODS};
pub use memo::{MemoCodec, MemoError, MoodMemo, DEFAULT_MEMO_PREFIX};
pub use poller::{refresh_board, MoodPoller, MoodSource, PollUpdate, PollerHandle};
pub use service::{
    CommunityMoods, VoteConfig, VoteError, VoteReceipt, VoteService, MAX_HISTORY_LIMIT,
};

#[cfg(test)]
pub(crate) use service::tests::{test_config, FakeLedger};
