//! Every pattern used to read VJudge pages, in one place.
//!
//! The crawler output is a third party format. When it drifts, only this table
//! should need to change.

use once_cell::sync::Lazy;
use regex::Regex;

/// A contest list row: `| <id> | ... |`.
pub static CONTEST_ROW: Lazy<Regex> = Lazy::new(|| Regex::new(r"\|\s*\d+\s*\|.*\|").unwrap());

/// A date-time literal embedded in the contest list begin cell.
pub static DATE_TIME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}").unwrap());

/// A standings row: a line starting with `| <rank> |`.
pub static PARTICIPANT_ROW: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\|\s*\d+\s*\|.*$").unwrap());

/// A problem row, captured in one pass.
///
/// Groups: solved count, attempted count, letter, origin text, title text.
pub static PROBLEM_ROW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"\|[^|\n]*\|[ \t]*\[(\d+)\]\([^)\n]*\)[ \t]*/[ \t]*\[(\d+)\]\([^)\n]*\)[ \t]*",
        r"\|[ \t]*([A-Z])[ \t]*",
        r"\|[ \t]*\[([^\]\n]*)\]\([^)\n]*\)[ \t]*",
        r"\|[ \t]*\[([^\]\n]*)\]\(",
    ))
    .unwrap()
});

pub static TITLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^###[ \t]+(.+)$").unwrap());
pub static BEGIN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*Begin:\*\*[ \t]*([^\n]+)").unwrap());
pub static END: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*End:\*\*[ \t]*([^\n]+)").unwrap());

/// The unlabeled line right after the end time, optionally separated by one blank line.
pub static DURATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*End:\*\*[^\n]*\n(?:[ \t]*\n)?([^\n]+)").unwrap());

/// The line before the `- [Overview]` tab link.
pub static STATUS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^([^\n]+)\n(?:[ \t]*\n)?[-*][ \t]+\[Overview\]").unwrap());

pub static CONTEST_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"/contest/(\d+)#").unwrap());

/// `![avatar](url)[Username (DisplayName)](url)`, display name optional.
pub static AVATAR_USER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"!\[[^\]]*\]\([^)]*\)\[([^\]]+?)(?:\s\(([^)]+)\))?\]\([^)]*\)").unwrap()
});

pub static IMAGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"!\[[^\]]*\]\([^)]*\)").unwrap());
pub static LINK_TARGET: Lazy<Regex> = Lazy::new(|| Regex::new(r"\]\([^)]*\)").unwrap());
pub static FALLBACK_USER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([^\[\]()]+)").unwrap());
pub static FALLBACK_DISPLAY_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(([^)]+)\)").unwrap());

/// `H:MM:SS`, optionally followed by `<br>(-n)` wrong attempts.
pub static SOLVED_CELL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d+:\d+:\d+)(?:[ \t]*(?:<br[ \t]*/?>)?[ \t]*\((-\d+)\))?").unwrap()
});

pub static FAILED_CELL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\((-\d+)\)").unwrap());
