use super::{rules, ContestSummary};
use crate::markdown::{non_empty_cells, normalize, strip_link, table_rows};

/// Parse the contest list page into summaries, in document order.
///
/// Rows with fewer than six non-empty columns are skipped.
pub fn parse_vjudge_contests(markdown: &str) -> Vec<ContestSummary> {
    if markdown.trim().is_empty() {
        tracing::warn!("no markdown content provided to parse");
        return Vec::new();
    }

    let markdown = normalize(markdown);
    let mut contests = Vec::new();

    for row in table_rows(&markdown, &rules::CONTEST_ROW) {
        let columns = non_empty_cells(row);
        if columns.len() < 6 {
            tracing::warn!("skipping contest row with insufficient columns: {}", row);
            continue;
        }

        let begin_time = rules::DATE_TIME
            .find(columns[4])
            .map(|m| m.as_str())
            .unwrap_or(columns[4]);
        let owner = columns.get(6).map(|cell| strip_link(cell)).unwrap_or("");

        contests.push(ContestSummary {
            id: columns[0].to_string(),
            title: strip_link(columns[2]).to_string(),
            begin_time: begin_time.to_string(),
            length: columns[5].to_string(),
            owner: owner.to_string(),
        });
    }

    if contests.is_empty() {
        tracing::warn!("no contest rows found in the markdown");
    }

    contests
}

/// Id of the newest contest. The crawler lists contests newest first.
pub fn latest_contest_id(contests: &[ContestSummary]) -> Option<&str> {
    contests.first().map(|contest| contest.id.as_str())
}
