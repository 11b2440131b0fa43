//! Helpers for the pipe-delimited tables a markdown crawler produces.
//!
//! Nothing here fails: a document without matching rows simply yields no rows.

use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;

static LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[(.*?)\](?:\(.*?\))?").unwrap());

/// Replace Windows line endings so anchored searches see `\n` only.
pub fn normalize(markdown: &str) -> Cow<'_, str> {
    if markdown.contains('\r') {
        Cow::Owned(markdown.replace("\r\n", "\n"))
    } else {
        Cow::Borrowed(markdown)
    }
}

/// Yield the part of every line that matches `shape`, in document order.
///
/// `shape` is applied line by line, so a pattern like `\|\s*\d+\s*\|.*\|` never
/// spans two rows.
pub fn table_rows<'a>(markdown: &'a str, shape: &'a Regex) -> impl Iterator<Item = &'a str> + 'a {
    markdown
        .lines()
        .filter_map(move |line| shape.find(line).map(|m| m.as_str()))
}

/// Split a table row into trimmed cells.
///
/// Only the boundary pipes are removed; empty cells between them are kept so
/// positional columns stay aligned.
pub fn split_cells(row: &str) -> Vec<&str> {
    let row = row.trim();
    let row = row.strip_prefix('|').unwrap_or(row);
    let row = row.strip_suffix('|').unwrap_or(row);
    if row.trim().is_empty() {
        return Vec::new();
    }

    row.split('|').map(str::trim).collect()
}

/// Like [`split_cells`] but drops every empty cell.
pub fn non_empty_cells(row: &str) -> Vec<&str> {
    split_cells(row)
        .into_iter()
        .filter(|cell| !cell.is_empty())
        .collect()
}

/// Return the text of the first `[text](url)` or `[text]` in `text`, or `text` itself.
pub fn strip_link(text: &str) -> &str {
    LINK.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or(text)
}
