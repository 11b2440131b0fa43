//! Cumulative leaderboard built from per-contest results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

/// One participant's result in a single contest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContestRanking {
    pub rank: u32,
    pub name: String,
    pub score: i64,
}

/// Snapshot of the most recently processed contest. Overwritten on every run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestResult {
    pub results: Vec<ContestRanking>,
    pub update_time: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub name: String,
    pub score: i64,
    /// Number of contests the participant appeared in.
    pub consistency: u32,
    /// 1-based position after the last merge; 0 until the entry is first ranked.
    #[serde(default)]
    pub rank: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Leaderboard {
    #[serde(default)]
    pub rankings: Vec<LeaderboardEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_contest_code: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The contest was already merged; nothing changed.
    UpToDate,
    Merged { added: usize, updated: usize },
}

impl Leaderboard {
    pub fn is_up_to_date(&self, contest_id: &str) -> bool {
        self.last_contest_code
            .as_deref()
            .map(|code| same_contest(code, contest_id))
            .unwrap_or(false)
    }

    /// Fold one contest into the leaderboard and re-rank every entry.
    ///
    /// Merging the contest recorded in `last_contest_code` again is a no-op.
    pub fn merge(
        &mut self,
        contest_id: &str,
        results: &[ContestRanking],
        now: DateTime<Utc>,
    ) -> MergeOutcome {
        if self.is_up_to_date(contest_id) {
            return MergeOutcome::UpToDate;
        }

        let mut index: HashMap<String, usize> = self
            .rankings
            .iter()
            .enumerate()
            .map(|(i, entry)| (entry.name.clone(), i))
            .collect();
        let (mut added, mut updated) = (0, 0);

        for result in results {
            match index.get(&result.name) {
                Some(&i) => {
                    let entry = &mut self.rankings[i];
                    entry.score += result.score;
                    entry.consistency += 1;
                    updated += 1;
                }
                None => {
                    index.insert(result.name.clone(), self.rankings.len());
                    self.rankings.push(LeaderboardEntry {
                        name: result.name.clone(),
                        score: result.score,
                        consistency: 1,
                        rank: 0,
                    });
                    added += 1;
                }
            }
        }

        self.rankings.sort_by(compare_entries);
        for (i, entry) in self.rankings.iter_mut().enumerate() {
            entry.rank = i as u32 + 1;
        }

        self.updated_at = Some(now);
        self.last_contest_code = Some(contest_id.to_string());

        tracing::info!(
            "merged contest {}: {} new entries, {} updated, {} total",
            contest_id,
            added,
            updated,
            self.rankings.len()
        );

        MergeOutcome::Merged { added, updated }
    }
}

/// Score desc, then consistency desc, then previous rank asc.
fn compare_entries(a: &LeaderboardEntry, b: &LeaderboardEntry) -> Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| b.consistency.cmp(&a.consistency))
        .then_with(|| a.rank.cmp(&b.rank))
}

/// Contest ids compare as numbers when both are numeric.
fn same_contest(a: &str, b: &str) -> bool {
    let (a, b) = (a.trim(), b.trim());
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
