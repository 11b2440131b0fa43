use super::{rules, ContestDetail, Participant, Problem, Submission};
use crate::markdown::{normalize, split_cells, table_rows};
use regex::Regex;
use std::collections::BTreeMap;

/// Cells before the problem columns: rank, user, score, penalty.
const LEADING_COLUMNS: usize = 4;

/// Problem columns are lettered `A` to `Z`.
const MAX_PROBLEMS: usize = 26;

/// Parse a contest standings page.
///
/// Missing header fields become empty strings and malformed rows are skipped,
/// so garbage input yields an empty [`ContestDetail`].
pub fn parse_contest_data(markdown: &str) -> ContestDetail {
    let markdown = normalize(markdown);
    let markdown: &str = &markdown;

    let problems = parse_problems(markdown);
    let participants = parse_participants(markdown, problem_columns(&problems));

    ContestDetail {
        id: capture(&rules::CONTEST_ID, markdown),
        title: capture(&rules::TITLE, markdown),
        begin_time: capture(&rules::BEGIN, markdown),
        end_time: capture(&rules::END, markdown),
        duration: capture(&rules::DURATION, markdown),
        status: capture(&rules::STATUS, markdown),
        problems,
        participants,
    }
}

fn capture(rule: &Regex, text: &str) -> String {
    rule.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}

fn parse_problems(markdown: &str) -> Vec<Problem> {
    rules::PROBLEM_ROW
        .captures_iter(markdown)
        .map(|caps| Problem {
            solved: caps[1].parse().unwrap_or_default(),
            attempted: caps[2].parse().unwrap_or_default(),
            id: caps[3].to_string(),
            origin: caps[4].trim().to_string(),
            title: caps[5].trim().to_string(),
        })
        .collect()
}

/// Number of problem columns in the standings: up to the highest letter of the
/// problem table, or every column when the table is missing.
fn problem_columns(problems: &[Problem]) -> usize {
    problems
        .iter()
        .filter_map(|problem| problem.id.bytes().next())
        .filter(u8::is_ascii_uppercase)
        .map(|letter| usize::from(letter - b'A') + 1)
        .max()
        .unwrap_or(MAX_PROBLEMS)
}

fn parse_participants(markdown: &str, columns: usize) -> Vec<Participant> {
    table_rows(markdown, &rules::PARTICIPANT_ROW)
        .filter_map(|row| {
            let participant = parse_participant(row, columns);
            if participant.is_none() {
                tracing::warn!("skipping malformed standings row: {}", row);
            }
            participant
        })
        .collect()
}

fn parse_participant(row: &str, columns: usize) -> Option<Participant> {
    let cells = split_cells(row);
    if cells.len() < LEADING_COLUMNS {
        return None;
    }

    let rank: u32 = cells[0].parse().ok().filter(|rank| *rank > 0)?;
    let (username, display_name) = parse_user_cell(cells[1]);
    let score: i64 = cells[2].parse().unwrap_or_else(|_| {
        tracing::warn!("failed to parse score {:?} of rank {}", cells[2], rank);
        0
    });
    let penalty = cells[3].to_string();

    let mut solved_problems = BTreeMap::new();
    let mut failed_problems = BTreeMap::new();
    let problem_cells = cells[LEADING_COLUMNS..].iter().take(columns);
    for (index, cell) in problem_cells.enumerate() {
        let letter = problem_letter(index);
        match classify_cell(cell) {
            CellResult::Solved(submission) => {
                solved_problems.insert(letter, submission);
            }
            CellResult::Failed(attempts) => {
                failed_problems.insert(letter, attempts);
            }
            CellResult::Untouched => {}
        }
    }

    Some(Participant {
        rank,
        username,
        display_name,
        score,
        penalty,
        solved_problems,
        failed_problems,
    })
}

/// The n-th problem column is problem `A` + n, whether or not its row in the
/// problem table could be parsed.
fn problem_letter(index: usize) -> String {
    char::from(b'A' + index as u8).to_string()
}

/// Extract `(username, display name)` from the user cell.
///
/// The visible link text is either `Username (DisplayName)` or `Username`.
pub fn parse_user_cell(cell: &str) -> (String, Option<String>) {
    if let Some(caps) = rules::AVATAR_USER.captures(cell) {
        let username = caps[1].trim().to_string();
        let display_name = caps.get(2).map(|m| m.as_str().trim().to_string());
        return (username, display_name);
    }

    // Username and display name are looked up independently; either may be missing.
    let visible = rules::IMAGE.replace_all(cell, "");
    let visible = rules::LINK_TARGET.replace_all(&visible, "]");
    let username = rules::FALLBACK_USER
        .captures(&visible)
        .map(|caps| caps[1].trim().to_string())
        .unwrap_or_default();
    let display_name = rules::FALLBACK_DISPLAY_NAME
        .captures(&visible)
        .map(|caps| caps[1].trim().to_string())
        .filter(|name| !name.is_empty());

    (username, display_name)
}

#[derive(Debug, PartialEq, Eq)]
pub enum CellResult {
    Solved(Submission),
    Failed(u32),
    Untouched,
}

/// Classify a problem cell of the standings table.
pub fn classify_cell(cell: &str) -> CellResult {
    if let Some(caps) = rules::SOLVED_CELL.captures(cell) {
        let attempts = caps
            .get(2)
            .and_then(|m| m.as_str().parse::<i64>().ok())
            .map(|n| n.unsigned_abs() as u32)
            .unwrap_or(0);
        return CellResult::Solved(Submission {
            time: caps[1].to_string(),
            attempts,
        });
    }

    match rules::FAILED_CELL
        .captures(cell)
        .and_then(|caps| caps[1].parse::<i64>().ok())
    {
        Some(n) => CellResult::Failed(n.unsigned_abs() as u32),
        None => CellResult::Untouched,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const CONTEST_DETAIL: &str = r#"
[Contest](https://vjudge.net/contest/701245#overview)

### PB Hustle #12

**Begin:** 2025-03-01 20:00:00

**End:** 2025-03-01 22:00:00

2:00:00

Ended

- [Overview](https://vjudge.net/contest/701245#overview)
- [Problem](https://vjudge.net/contest/701245#problem)
- [Rank](https://vjudge.net/contest/701245#rank)

| Stat | Solved | # | Origin | Title |
| --- | --- | --- | --- | --- |
| ✓ | [12](https://vjudge.net/status/A) / [30](https://vjudge.net/status/A) | A | [CodeForces 4A](https://codeforces.com/4A) | [Watermelon](https://vjudge.net/contest/701245#problem/A) |
| | [3](https://vjudge.net/status/B) / [9](https://vjudge.net/status/B) | B | [AtCoder abc300_c](https://atcoder.jp/c) | [Cross](https://vjudge.net/contest/701245#problem/B) |

| Rank | Team | Score | Penalty | A | B |
| --- | --- | --- | --- | --- | --- |
| 1 | ![avatar](https://cravatar.cn/avatar/1)[alice (Alice A.)](https://vjudge.net/user/alice "alice Alice A.") | 2 | 1:35:10 | 0:05:00 | 1:10:10<br>(-2) |
| 2 | ![avatar](https://cravatar.cn/avatar/2)[bob\_99](https://vjudge.net/user/bob_99 "bob_99") | 1 | 0:20:00 | 0:20:00 | (-3) |
| 3 | [carol] | 0 | 0:00:00 |  |  |
"#;

    #[test]
    fn parse_header() {
        let detail = parse_contest_data(CONTEST_DETAIL);

        assert_eq!(detail.id, "701245");
        assert_eq!(detail.title, "PB Hustle #12");
        assert_eq!(detail.begin_time, "2025-03-01 20:00:00");
        assert_eq!(detail.end_time, "2025-03-01 22:00:00");
        assert_eq!(detail.duration, "2:00:00");
        assert_eq!(detail.status, "Ended");
    }

    #[test]
    fn parse_problem_table() {
        let detail = parse_contest_data(CONTEST_DETAIL);

        assert_eq!(
            detail.problems,
            vec![
                Problem {
                    id: String::from("A"),
                    origin: String::from("CodeForces 4A"),
                    title: String::from("Watermelon"),
                    solved: 12,
                    attempted: 30,
                },
                Problem {
                    id: String::from("B"),
                    origin: String::from("AtCoder abc300_c"),
                    title: String::from("Cross"),
                    solved: 3,
                    attempted: 9,
                },
            ]
        );
    }

    #[test]
    fn parse_standings() {
        let detail = parse_contest_data(CONTEST_DETAIL);
        let participants = &detail.participants;

        assert_eq!(participants.len(), 3);

        let alice = &participants[0];
        assert_eq!(alice.rank, 1);
        assert_eq!(alice.username, "alice");
        assert_eq!(alice.display_name.as_deref(), Some("Alice A."));
        assert_eq!(alice.score, 2);
        assert_eq!(alice.penalty, "1:35:10");
        assert_eq!(
            alice.solved_problems.get("B"),
            Some(&Submission {
                time: String::from("1:10:10"),
                attempts: 2
            })
        );
        assert!(alice.failed_problems.is_empty());

        let bob = &participants[1];
        assert_eq!(bob.username, r"bob\_99");
        assert_eq!(bob.plain_username(), "bob_99");
        assert_eq!(bob.display_name, None);
        assert_eq!(bob.failed_problems.get("B"), Some(&3));
        assert_eq!(bob.solved_problems.len(), 1);

        let carol = &participants[2];
        assert_eq!(carol.username, "carol");
        assert!(carol.solved_problems.is_empty());
        assert!(carol.failed_problems.is_empty());
    }

    #[test]
    fn rankings_use_position_and_plain_names() {
        let detail = parse_contest_data(CONTEST_DETAIL);
        let rankings = detail.rankings();

        assert_eq!(rankings.len(), 3);
        assert_eq!(rankings[1].rank, 2);
        assert_eq!(rankings[1].name, "bob_99");
        assert_eq!(rankings[1].score, 1);
    }

    #[test]
    fn classify_problem_cells() {
        assert_eq!(
            classify_cell("1:23:45"),
            CellResult::Solved(Submission {
                time: String::from("1:23:45"),
                attempts: 0
            })
        );
        assert_eq!(
            classify_cell("1:23:45<br>(-2)"),
            CellResult::Solved(Submission {
                time: String::from("1:23:45"),
                attempts: 2
            })
        );
        assert_eq!(classify_cell("(-3)"), CellResult::Failed(3));
        assert_eq!(classify_cell(""), CellResult::Untouched);
        assert_eq!(classify_cell("-"), CellResult::Untouched);
    }

    #[test]
    fn user_cell_variants() {
        assert_eq!(
            parse_user_cell("![avatar](u)[alice (Alice A.)](p)"),
            (String::from("alice"), Some(String::from("Alice A.")))
        );
        assert_eq!(parse_user_cell("[bob]"), (String::from("bob"), None));
        assert_eq!(
            parse_user_cell("[dave (Dave D.)](https://vjudge.net/user/dave)"),
            (String::from("dave"), Some(String::from("Dave D.")))
        );
        assert_eq!(parse_user_cell(""), (String::new(), None));
    }

    #[test]
    fn problem_columns_without_problem_table() {
        let markdown = "| 1 | [eve] | 6 | 3:00:00 | 0:01:00 | 0:02:00 | 0:03:00 | 0:04:00 | 0:05:00 | 0:06:00 |";
        let detail = parse_contest_data(markdown);
        let eve = &detail.participants[0];

        let letters: Vec<&str> = eve.solved_problems.keys().map(String::as_str).collect();
        assert_eq!(letters, vec!["A", "B", "C", "D", "E", "F"]);
    }

    #[test]
    fn problem_columns_survive_unparsable_problem_row() {
        let markdown = r#"
| Stat | Solved | # | Origin | Title |
| --- | --- | --- | --- | --- |
| | [5](s) / [8](s) | A | [CodeForces 1A](a) | [Alpha](p) |
| | [2](s) / [4](s) | B | [CodeForces 1B](b) | [\[Easy\] Beta](p) |
| | [1](s) / [3](s) | C | [CodeForces 1C](c) | [Gamma](p) |

| 1 | [eve] | 1 | 0:10:00 |  |  | 0:10:00 |
| 2 | [frank] | 1 | 0:20:00 |  | 0:20:00 | (-1) |
"#;
        let detail = parse_contest_data(markdown);

        let ids: Vec<&str> = detail.problems.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["A", "C"]);

        let eve = &detail.participants[0];
        let solved: Vec<&str> = eve.solved_problems.keys().map(String::as_str).collect();
        assert_eq!(solved, vec!["C"]);

        let frank = &detail.participants[1];
        assert!(frank.solved_problems.contains_key("B"));
        assert_eq!(frank.failed_problems.get("C"), Some(&1));
    }

    #[test]
    fn problem_columns_stop_at_last_problem() {
        let markdown = "| | [1](s) / [1](s) | A | [CF 1A](a) | [Alpha](p) |\n| | [1](s) / [1](s) | B | [CF 1B](b) | [Beta](p) |\n| 1 | [eve] | 2 | 0:20:00 | 0:10:00 | 0:10:00 | 0:30:00 |";
        let detail = parse_contest_data(markdown);

        let solved: Vec<&str> = detail.participants[0]
            .solved_problems
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(solved, vec!["A", "B"]);
    }

    #[test]
    fn header_fields_are_independent() {
        let without_tabs = CONTEST_DETAIL.replace(
            "- [Overview](https://vjudge.net/contest/701245#overview)\n",
            "",
        );
        let detail = parse_contest_data(&without_tabs);
        assert_eq!(detail.status, "");
        assert_eq!(detail.id, "701245");
        assert_eq!(detail.title, "PB Hustle #12");
        assert_eq!(detail.begin_time, "2025-03-01 20:00:00");
        assert_eq!(detail.end_time, "2025-03-01 22:00:00");
        assert_eq!(detail.duration, "2:00:00");
        assert_eq!(detail.participants.len(), 3);

        let without_begin = CONTEST_DETAIL.replace("**Begin:** 2025-03-01 20:00:00\n", "");
        let detail = parse_contest_data(&without_begin);
        assert_eq!(detail.begin_time, "");
        assert_eq!(detail.title, "PB Hustle #12");
        assert_eq!(detail.end_time, "2025-03-01 22:00:00");
        assert_eq!(detail.duration, "2:00:00");
        assert_eq!(detail.status, "Ended");
    }

    #[test]
    fn malformed_rows_are_skipped() {
        let markdown = "| 0 | [zero] | 1 | 0:00:00 |\n| 1 | [short] |\n| 2 | [ok] | 1 | 0:10:00 |";
        let detail = parse_contest_data(markdown);

        assert_eq!(detail.participants.len(), 1);
        assert_eq!(detail.participants[0].username, "ok");
    }

    #[test]
    fn empty_or_garbage_markdown() {
        assert_eq!(parse_contest_data(""), ContestDetail::default());
        assert_eq!(
            parse_contest_data("lorem ipsum\n| not | a | table |"),
            ContestDetail::default()
        );
    }
}
