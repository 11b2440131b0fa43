//! Structured views of the VJudge contest list and contest standings pages.

pub mod contest_detail;
pub mod contest_list;
pub mod rules;

pub use contest_detail::parse_contest_data;
pub use contest_list::{latest_contest_id, parse_vjudge_contests};

use crate::leaderboard::ContestRanking;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One row of the contest list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContestSummary {
    pub id: String,
    pub title: String,
    pub begin_time: String,
    pub length: String,
    pub owner: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    pub id: String,
    pub origin: String,
    pub title: String,
    pub solved: u32,
    pub attempted: u32,
}

/// An accepted problem: submission time and wrong attempts before acceptance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub time: String,
    pub attempts: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub rank: u32,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub score: i64,
    pub penalty: String,
    pub solved_problems: BTreeMap<String, Submission>,
    pub failed_problems: BTreeMap<String, u32>,
}

impl Participant {
    /// Username with markdown backslash escapes removed, used as the leaderboard key.
    pub fn plain_username(&self) -> String {
        self.username.replace('\\', "")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContestDetail {
    pub id: String,
    pub title: String,
    pub begin_time: String,
    pub end_time: String,
    pub duration: String,
    pub status: String,
    pub problems: Vec<Problem>,
    pub participants: Vec<Participant>,
}

impl ContestDetail {
    /// Per-contest results in standings order.
    ///
    /// The rank is the position in the parsed list, not the rank cell of the page.
    pub fn rankings(&self) -> Vec<ContestRanking> {
        self.participants
            .iter()
            .enumerate()
            .map(|(index, participant)| ContestRanking {
                rank: index as u32 + 1,
                name: participant.plain_username(),
                score: participant.score,
            })
            .collect()
    }
}
