//! Vote aggregation
//!
//! Folds parsed vote records into per-emoji counts and percentages.
//! Entries keep the order in which each emoji was first seen.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::catalog;
use super::memo::{MemoCodec, MoodMemo};

/// One vote reconstructed from a ledger memo
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoodVote {
    pub emoji: String,
    pub mood_name: String,
    pub color: String,
}

impl From<MoodMemo> for MoodVote {
    fn from(memo: MoodMemo) -> Self {
        let color = catalog::color_for(&memo.name).to_string();
        Self {
            emoji: memo.emoji,
            mood_name: memo.name,
            color,
        }
    }
}

impl MoodVote {
    /// Parse a memo into a vote, `None` when it is not one
    pub fn from_memo(codec: &MemoCodec, memo: &str) -> Option<Self> {
        codec.parse(memo).map(Self::from)
    }
}

/// Count and share of one emoji
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodTally {
    pub emoji: String,
    pub name: String,
    pub count: u64,
    pub color: String,
    /// Share of all counted votes, 0..=100
    pub percentage: f64,
}

/// Running per-emoji counter
#[derive(Debug, Default)]
pub struct TallyBuilder {
    entries: Vec<MoodTally>,
    index: HashMap<String, usize>,
    total: u64,
}

impl TallyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, vote: MoodVote) {
        self.add_many(vote, 1);
    }

    pub fn add_many(&mut self, vote: MoodVote, count: u64) {
        if count == 0 {
            return;
        }
        self.total += count;

        match self.index.get(&vote.emoji) {
            Some(&i) => self.entries[i].count += count,
            None => {
                self.index.insert(vote.emoji.clone(), self.entries.len());
                self.entries.push(MoodTally {
                    emoji: vote.emoji,
                    name: vote.mood_name,
                    count,
                    color: vote.color,
                    percentage: 0.0,
                });
            }
        }
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Compute percentages and return the entries
    pub fn finish(mut self) -> Vec<MoodTally> {
        if self.total > 0 {
            let total = self.total as f64;
            for entry in &mut self.entries {
                entry.percentage = entry.count as f64 / total * 100.0;
            }
        }
        self.entries
    }
}

impl FromIterator<MoodVote> for TallyBuilder {
    fn from_iter<I: IntoIterator<Item = MoodVote>>(iter: I) -> Self {
        let mut builder = TallyBuilder::new();
        for vote in iter {
            builder.add(vote);
        }
        builder
    }
}

/// Aggregate votes into tallies
pub fn aggregate(votes: impl IntoIterator<Item = MoodVote>) -> Vec<MoodTally> {
    votes.into_iter().collect::<TallyBuilder>().finish()
}

/// Parse memos and aggregate the ones that are votes
pub fn aggregate_memos<'a>(
    codec: &MemoCodec,
    memos: impl IntoIterator<Item = &'a str>,
) -> Vec<MoodTally> {
    aggregate(memos.into_iter().filter_map(|memo| MoodVote::from_memo(codec, memo)))
}

/// Headline numbers of a set of tallies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TallySummary {
    pub total_votes: u64,
    pub most_popular: Option<String>,
    pub top_three: Vec<MoodTally>,
}

impl TallySummary {
    pub fn from_tallies(tallies: &[MoodTally]) -> Self {
        let total_votes = tallies.iter().map(|t| t.count).sum();

        // Stable sort keeps first-seen order among equal counts
        let mut ranked = tallies.to_vec();
        ranked.sort_by(|a, b| b.count.cmp(&a.count));
        ranked.truncate(3);

        // Among equal counts the most popular is the one seen last
        let most_popular = tallies.iter().max_by_key(|t| t.count).map(|t| t.emoji.clone());

        Self {
            total_votes,
            most_popular,
            top_three: ranked,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memos(list: &[(&'static str, usize)]) -> Vec<&'static str> {
        list.iter()
            .flat_map(|(memo, n)| std::iter::repeat(*memo).take(*n))
            .collect()
    }

    #[test]
    fn test_happy_sad_example() {
        let codec = MemoCodec::default();
        let input = memos(&[
            ("MoodPulse: 😀 - Happy", 3),
            ("MoodPulse: 😢 - Sad", 1),
            ("Payment#0", 1),
        ]);

        let tallies = aggregate_memos(&codec, input);

        assert_eq!(tallies.len(), 2);
        assert_eq!(tallies[0].emoji, "😀");
        assert_eq!(tallies[0].count, 3);
        assert_eq!(tallies[0].percentage, 75.0);
        assert_eq!(tallies[0].color, "#FFB400");
        assert_eq!(tallies[1].emoji, "😢");
        assert_eq!(tallies[1].count, 1);
        assert_eq!(tallies[1].percentage, 25.0);
    }

    #[test]
    fn test_counts_and_percentages_sum() {
        let codec = MemoCodec::default();
        let input = memos(&[
            ("MoodPulse: 😀 - Happy", 4),
            ("MoodPulse: 😴 - Tired", 3),
            ("MoodPulse: 🦀 - Rusty", 2),
            ("gm", 5),
            ("MoodPulse: broken", 2),
        ]);

        let tallies = aggregate_memos(&codec, input);
        let count: u64 = tallies.iter().map(|t| t.count).sum();
        let pct: f64 = tallies.iter().map(|t| t.percentage).sum();

        assert_eq!(count, 9);
        assert!((pct - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_votes() {
        let codec = MemoCodec::default();
        let tallies = aggregate_memos(&codec, vec!["hello", "world"]);
        assert!(tallies.is_empty());

        let summary = TallySummary::from_tallies(&tallies);
        assert_eq!(summary.total_votes, 0);
        assert!(summary.most_popular.is_none());
    }

    #[test]
    fn test_unknown_mood_gets_default_color() {
        let codec = MemoCodec::default();
        let tallies = aggregate_memos(&codec, vec!["MoodPulse: 🦀 - Rusty"]);
        assert_eq!(tallies[0].color, catalog::DEFAULT_COLOR);
        assert_eq!(tallies[0].percentage, 100.0);
    }

    #[test]
    fn test_summary_ranking() {
        let mut builder = TallyBuilder::new();
        for (emoji, name, n) in [("😀", "Happy", 2), ("😢", "Sad", 5), ("😡", "Angry", 2), ("😎", "Cool", 1)] {
            builder.add_many(
                MoodVote {
                    emoji: emoji.into(),
                    mood_name: name.into(),
                    color: catalog::color_for(name).into(),
                },
                n,
            );
        }
        let summary = TallySummary::from_tallies(&builder.finish());

        assert_eq!(summary.total_votes, 10);
        assert_eq!(summary.most_popular.as_deref(), Some("😢"));
        let order: Vec<_> = summary.top_three.iter().map(|t| t.emoji.as_str()).collect();
        assert_eq!(order, vec!["😢", "😀", "😡"]);
    }

    #[test]
    fn test_tied_most_popular_is_last_seen() {
        let codec = MemoCodec::default();
        let tallies = aggregate_memos(
            &codec,
            memos(&[("MoodPulse: 😀 - Happy", 3), ("MoodPulse: 😴 - Tired", 3), ("MoodPulse: 😢 - Sad", 1)]),
        );
        let summary = TallySummary::from_tallies(&tallies);

        assert_eq!(summary.most_popular.as_deref(), Some("😴"));
        let order: Vec<_> = summary.top_three.iter().map(|t| t.emoji.as_str()).collect();
        assert_eq!(order, vec!["😀", "😴", "😢"]);
    }
}
