//! Structured sub-elements inside editable text: checklist items, Markdown
//! tables, inline `#tags`, and `[[wiki links]]`.
//!
//! All parse functions are pure and total: malformed constructs are plain
//! text, never errors. Tags and links are derived on demand from the
//! current text and never stored; a sigil inside a placeholder token is
//! never extracted.

use crate::error::{NotemarkError, Result};
use crate::mergeable::codec;
use once_cell::sync::Lazy;
use regex::Regex;

static CHECKLIST_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\s*)- \[( |x|X)\] (.*)$").unwrap());
static TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"#([A-Za-z0-9_][A-Za-z0-9_/-]*)").unwrap());
static LINK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[\[([^\[\]\n]+)\]\]").unwrap());
static TABLE_SEPARATOR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*\|?[\s:|\-]+\|?\s*$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecklistItem {
    pub done: bool,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// All checklist lines in order of appearance.
pub fn parse_checklist(text: &str) -> Vec<ChecklistItem> {
    text.lines()
        .filter_map(|line| {
            CHECKLIST_RE.captures(line).map(|caps| ChecklistItem {
                done: &caps[2] != " ",
                text: caps[3].to_string(),
            })
        })
        .collect()
}

/// Exact inverse of [`parse_checklist`] for structurally valid input.
pub fn render_checklist(items: &[ChecklistItem]) -> String {
    items
        .iter()
        .map(|item| format!("- [{}] {}", if item.done { 'x' } else { ' ' }, item.text))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Set the completion marker of the `item_number`-th checklist line
/// (1-based). Only the marker byte of the addressed line changes; every
/// other byte of the text is preserved.
pub fn set_checklist_item(text: &str, item_number: usize, done: bool) -> Result<String> {
    let mut seen = 0;
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        let bare = line.strip_suffix('\n').unwrap_or(line);
        if let Some(caps) = CHECKLIST_RE.captures(bare) {
            seen += 1;
            if seen == item_number {
                let marker = caps.get(2).unwrap();
                let at = offset + marker.start();
                let mut out = text.to_string();
                out.replace_range(at..at + 1, if done { "x" } else { " " });
                return Ok(out);
            }
        }
        offset += line.len();
    }
    Err(NotemarkError::ChecklistOutOfRange {
        requested: item_number,
        count: seen,
    })
}

/// Parse the `index`-th Markdown table in the text (1-based by occurrence).
pub fn parse_table(text: &str, index: usize) -> Result<Table> {
    let mut seen = 0;
    let lines: Vec<&str> = text.lines().collect();
    let mut i = 0;
    while i < lines.len() {
        if !is_table_row(lines[i]) {
            i += 1;
            continue;
        }
        let start = i;
        while i < lines.len() && is_table_row(lines[i]) {
            i += 1;
        }
        let block = &lines[start..i];
        // Header + separator at minimum, or it is plain text.
        if block.len() < 2 || !TABLE_SEPARATOR_RE.is_match(block[1]) || !block[1].contains('-') {
            continue;
        }
        seen += 1;
        if seen == index {
            return Ok(Table {
                header: split_row(block[0]),
                rows: block[2..].iter().map(|row| split_row(row)).collect(),
            });
        }
    }
    Err(NotemarkError::TableNotFound(index))
}

/// Count the Markdown tables in the text.
pub fn table_count(text: &str) -> usize {
    let mut count = 0;
    while parse_table(text, count + 1).is_ok() {
        count += 1;
    }
    count
}

fn is_table_row(line: &str) -> bool {
    line.trim_start().starts_with('|')
}

fn split_row(line: &str) -> Vec<String> {
    let trimmed = line.trim().trim_start_matches('|').trim_end_matches('|');
    trimmed.split('|').map(|cell| cell.trim().to_string()).collect()
}

/// Inline tags, deduplicated in order of first appearance. Sigils inside
/// placeholder tokens are skipped.
pub fn extract_tags(text: &str) -> Vec<String> {
    outside_placeholders(text, &TAG_RE)
}

/// `[[Title]]` link targets, deduplicated in order of first appearance.
pub fn extract_links(text: &str) -> Vec<String> {
    outside_placeholders(text, &LINK_RE)
}

fn outside_placeholders(text: &str, re: &Regex) -> Vec<String> {
    let spans = codec::token_spans(text);
    let mut seen = Vec::new();
    for caps in re.captures_iter(text) {
        let start = caps.get(0).unwrap().start();
        if spans.iter().any(|&(s, e)| s <= start && start < e) {
            continue;
        }
        let value = caps[1].to_string();
        if !seen.contains(&value) {
            seen.push(value);
        }
    }
    seen
}
