//! Mood Board
//!
//! Owned state behind the live chart: the selected mood, placeholder votes
//! shown before the ledger answers, the latest ledger tallies and the fetch
//! generation that decides which fetch result is current.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;

use super::aggregate::{aggregate, MoodTally, MoodVote, TallySummary};
use super::catalog::{self, Mood, MOODS};
use super::service::{CommunityMoods, VoteError, VoteReceipt};

/// Identifies one fetch; only the most recently issued ticket may update the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FetchTicket(u64);

impl FetchTicket {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

/// Where the chart data came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartSource {
    Ledger,
    Local,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartData {
    pub source: ChartSource,
    pub tallies: Vec<MoodTally>,
}

/// Serializable view of the whole board
#[derive(Debug, Clone, Serialize)]
pub struct BoardSnapshot {
    pub chart: ChartData,
    pub summary: TallySummary,
    pub selected: Option<Mood>,
    pub loading: bool,
    pub last_error: Option<String>,
    pub last_tx_hash: Option<String>,
    pub last_updated: Option<DateTime<Utc>>,
    /// The last scan hit its page limit
    pub truncated: bool,
}

#[derive(Debug, Default)]
pub struct MoodBoard {
    local_votes: Vec<MoodVote>,
    selected: Option<&'static Mood>,
    ledger_tallies: Vec<MoodTally>,
    loading: bool,
    last_error: Option<String>,
    last_tx_hash: Option<String>,
    last_updated: Option<DateTime<Utc>>,
    truncated: bool,
    generation: u64,
}

impl MoodBoard {
    /// Board without any votes
    pub fn new() -> Self {
        Self::default()
    }

    /// Board seeded with 5..15 placeholder votes per catalog mood
    pub fn with_placeholder_votes(rng: &mut impl Rng) -> Self {
        let mut board = Self::new();
        for mood in MOODS {
            let n = rng.gen_range(5..15);
            board
                .local_votes
                .extend(std::iter::repeat_with(|| vote_for(mood)).take(n));
        }
        board
    }

    /// Select a mood by glyph or name; unknown input leaves the selection as is
    pub fn select(&mut self, input: &str) -> Option<&'static Mood> {
        let mood = catalog::resolve(input)?;
        self.selected = Some(mood);
        Some(mood)
    }

    pub fn selected(&self) -> Option<&'static Mood> {
        self.selected
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Add the selected mood to the local votes. Without a selection nothing happens.
    pub fn record_local_vote(&mut self) -> Option<MoodVote> {
        let vote = vote_for(self.selected?);
        self.local_votes.push(vote.clone());
        Some(vote)
    }

    /// Remember a submitted vote and count it locally
    pub fn record_submission(&mut self, receipt: &VoteReceipt) {
        self.last_tx_hash = Some(receipt.hash.clone());
        self.record_local_vote();
    }

    pub fn local_vote_count(&self) -> usize {
        self.local_votes.len()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn last_tx_hash(&self) -> Option<&str> {
        self.last_tx_hash.as_deref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Start a fetch; any ticket issued earlier becomes stale
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.generation += 1;
        self.loading = true;
        FetchTicket(self.generation)
    }

    /// Apply a fetch result if `ticket` is still the latest one.
    ///
    /// Returns `false` when the result was stale and dropped. A failed fetch
    /// keeps the previous ledger tallies.
    pub fn finish_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<CommunityMoods, VoteError>,
    ) -> bool {
        if ticket.0 != self.generation {
            tracing::debug!(
                ticket = ticket.0,
                current = self.generation,
                "Dropping stale fetch result"
            );
            return false;
        }

        self.loading = false;
        match result {
            Ok(moods) => {
                self.ledger_tallies = moods.tallies;
                self.truncated = moods.page_full;
                self.last_error = None;
                self.last_updated = Some(Utc::now());
            }
            Err(e) => {
                tracing::warn!(error = %e, "Fetching community moods failed");
                self.last_error = Some(e.to_string());
            }
        }
        true
    }

    /// Give up on a fetch whose result will never arrive.
    ///
    /// Clears `loading` only when `ticket` is still the latest one.
    pub fn abandon_fetch(&mut self, ticket: FetchTicket) -> bool {
        if ticket.0 != self.generation {
            return false;
        }
        tracing::debug!(ticket = ticket.0, "Fetch abandoned");
        self.loading = false;
        true
    }

    /// Ledger tallies when there are any, the local placeholder tallies otherwise
    pub fn chart_data(&self) -> ChartData {
        if self.ledger_tallies.is_empty() {
            ChartData {
                source: ChartSource::Local,
                tallies: aggregate(self.local_votes.iter().cloned()),
            }
        } else {
            ChartData {
                source: ChartSource::Ledger,
                tallies: self.ledger_tallies.clone(),
            }
        }
    }

    pub fn summary(&self) -> TallySummary {
        TallySummary::from_tallies(&self.chart_data().tallies)
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        let chart = self.chart_data();
        BoardSnapshot {
            summary: TallySummary::from_tallies(&chart.tallies),
            chart,
            selected: self.selected.copied(),
            loading: self.loading,
            last_error: self.last_error.clone(),
            last_tx_hash: self.last_tx_hash.clone(),
            last_updated: self.last_updated,
            truncated: self.truncated,
        }
    }
}

fn vote_for(mood: &Mood) -> MoodVote {
    MoodVote {
        emoji: mood.emoji.to_string(),
        mood_name: mood.name.to_string(),
        color: mood.color.to_string(),
    }
}
