pub mod crawler;
pub mod leaderboard;
pub mod markdown;
pub mod refresh;
pub mod store;
pub mod vjudge;

pub use leaderboard::{ContestRanking, LatestResult, Leaderboard, LeaderboardEntry, MergeOutcome};
pub use refresh::{HustleData, LeaderboardRefresher, RefreshError, RefreshOutcome, RefreshSettings};
pub use vjudge::{parse_contest_data, parse_vjudge_contests, ContestDetail, ContestSummary};
