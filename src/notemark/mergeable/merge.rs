//! Three-way merge over token streams.
//!
//! Both sides are diffed against the common ancestor; hunks touching
//! disjoint ancestor regions apply cleanly, identical changes collapse, and
//! overlapping differing changes become a conflict. A conflict resolves to
//! the committed side in the merged text and carries the losing hunk so the
//! caller can surface it instead of silently dropping it.

use super::diff::{diff_hunks, tokenize, Hunk};

/// A contiguous piece of merged output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Resolved(String),
    Conflict { ours: String, theirs: String },
}

/// Result of a three-way merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Merged {
    pub segments: Vec<Segment>,
}

impl Merged {
    pub fn is_clean(&self) -> bool {
        self.conflict_count() == 0
    }

    pub fn conflict_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::Conflict { .. }))
            .count()
    }

    /// Merged text with conflicts resolved to the committed side.
    pub fn resolved_text(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Resolved(text) => out.push_str(text),
                Segment::Conflict { ours, .. } => out.push_str(ours),
            }
        }
        out
    }

    /// Merged text with git-style conflict markers around each conflict.
    pub fn annotated_text(&self, ours_label: &str, theirs_label: &str) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Resolved(text) => out.push_str(text),
                Segment::Conflict { ours, theirs } => {
                    if !out.is_empty() && !out.ends_with('\n') {
                        out.push('\n');
                    }
                    out.push_str(&format!("<<<<<<< {}\n", ours_label));
                    out.push_str(ours);
                    if !ours.is_empty() && !ours.ends_with('\n') {
                        out.push('\n');
                    }
                    out.push_str("=======\n");
                    out.push_str(theirs);
                    if !theirs.is_empty() && !theirs.ends_with('\n') {
                        out.push('\n');
                    }
                    out.push_str(&format!(">>>>>>> {}\n", theirs_label));
                }
            }
        }
        out
    }

    /// The losing hunks, for reporting.
    pub fn conflicts(&self) -> Vec<(&str, &str)> {
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Conflict { ours, theirs } => Some((ours.as_str(), theirs.as_str())),
                _ => None,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Ours,
    Theirs,
}

/// Merge `ours` and `theirs` against their common `ancestor`. `ours` is the
/// committed side: it wins overlapping regions.
pub fn merge3(ancestor: &str, ours: &str, theirs: &str) -> Merged {
    let anc_tokens = tokenize(ancestor);
    let our_tokens = tokenize(ours);
    let their_tokens = tokenize(theirs);

    let our_hunks = diff_hunks(&anc_tokens, &our_tokens);
    let their_hunks = diff_hunks(&anc_tokens, &their_tokens);

    // Sweep both hunk lists in ancestor order, coalescing overlapping hunks
    // into one region.
    let mut tagged: Vec<(Side, &Hunk)> = our_hunks
        .iter()
        .map(|h| (Side::Ours, h))
        .chain(their_hunks.iter().map(|h| (Side::Theirs, h)))
        .collect();
    tagged.sort_by_key(|(_, h)| (h.a_start, h.a_end));

    let mut segments = Vec::new();
    let mut anc_pos = 0;
    let mut i = 0;
    while i < tagged.len() {
        let start = tagged[i].1.a_start;
        let mut end = tagged[i].1.a_end;
        let mut j = i + 1;
        while j < tagged.len() && touches(start, end, tagged[j].1) {
            end = end.max(tagged[j].1.a_end);
            j += 1;
        }

        if start > anc_pos {
            segments.push(Segment::Resolved(anc_tokens[anc_pos..start].concat()));
        }

        let ours_in: Vec<&Hunk> = tagged[i..j]
            .iter()
            .filter(|(s, _)| *s == Side::Ours)
            .map(|(_, h)| *h)
            .collect();
        let theirs_in: Vec<&Hunk> = tagged[i..j]
            .iter()
            .filter(|(s, _)| *s == Side::Theirs)
            .map(|(_, h)| *h)
            .collect();

        let our_text = side_text(&ours_in, start, end, &anc_tokens, &our_tokens);
        let their_text = side_text(&theirs_in, start, end, &anc_tokens, &their_tokens);

        let segment = if theirs_in.is_empty() {
            Segment::Resolved(our_text)
        } else if ours_in.is_empty() {
            Segment::Resolved(their_text)
        } else if our_text == their_text {
            Segment::Resolved(our_text)
        } else {
            Segment::Conflict {
                ours: our_text,
                theirs: their_text,
            }
        };
        segments.push(segment);

        anc_pos = end;
        i = j;
    }
    if anc_pos < anc_tokens.len() {
        segments.push(Segment::Resolved(anc_tokens[anc_pos..].concat()));
    }

    Merged { segments }
}

/// Does `hunk` belong to the region `[start, end)`? Pure insertions attach
/// to a region they touch; otherwise strict overlap.
fn touches(start: usize, end: usize, hunk: &Hunk) -> bool {
    if hunk.is_insert() {
        if start == end {
            return hunk.a_start == start;
        }
        return start <= hunk.a_start && hunk.a_start <= end;
    }
    if start == end {
        return hunk.a_start <= start && start <= hunk.a_end;
    }
    hunk.a_start < end && start < hunk.a_end
}

/// Render one side's content for the ancestor region `[start, end)`:
/// replaced stretches come from the side, untouched stretches from the
/// ancestor.
fn side_text(hunks: &[&Hunk], start: usize, end: usize, anc: &[&str], side: &[&str]) -> String {
    let mut out = String::new();
    let mut pos = start;
    for h in hunks {
        if h.a_start > pos {
            out.push_str(&anc[pos..h.a_start].concat());
        }
        out.push_str(&side[h.b_start..h.b_end].concat());
        pos = h.a_end;
    }
    if pos < end {
        out.push_str(&anc[pos..end].concat());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disjoint_word_edits_merge_clean() {
        let merged = merge3("A B C", "A X C", "A B Y");
        assert!(merged.is_clean());
        assert_eq!(merged.resolved_text(), "A X Y");
    }

    #[test]
    fn test_identical_edits_collapse() {
        let merged = merge3("A B C", "A X C", "A X C");
        assert!(merged.is_clean());
        assert_eq!(merged.resolved_text(), "A X C");
    }

    #[test]
    fn test_one_sided_edit_applies() {
        let merged = merge3("A B C", "A B C", "A B C D");
        assert!(merged.is_clean());
        assert_eq!(merged.resolved_text(), "A B C D");
    }

    #[test]
    fn test_overlapping_inserts_conflict() {
        let merged = merge3("hello", "hello world", "hello there");
        assert_eq!(merged.conflict_count(), 1);
        assert_eq!(merged.resolved_text(), "hello world");
        let conflicts = merged.conflicts();
        assert_eq!(conflicts[0].0, " world");
        assert_eq!(conflicts[0].1, " there");
    }

    #[test]
    fn test_conflict_markers_carry_both_hunks() {
        let merged = merge3("hello", "hello world", "hello there");
        let annotated = merged.annotated_text("notes", "file");
        assert!(annotated.contains("<<<<<<< notes"));
        assert!(annotated.contains(" world"));
        assert!(annotated.contains("======="));
        assert!(annotated.contains(" there"));
        assert!(annotated.contains(">>>>>>> file"));
    }

    #[test]
    fn test_delete_vs_edit_same_region_conflicts() {
        let merged = merge3("keep this line", "keep line", "keep that line");
        assert_eq!(merged.conflict_count(), 1);
        // Committed side wins in the resolved text.
        assert_eq!(merged.resolved_text(), "keep line");
    }

    #[test]
    fn test_multiline_disjoint_edits() {
        let ancestor = "one\ntwo\nthree\n";
        let ours = "one\n2\nthree\n";
        let theirs = "one\ntwo\n3\n";
        let merged = merge3(ancestor, ours, theirs);
        assert!(merged.is_clean());
        assert_eq!(merged.resolved_text(), "one\n2\n3\n");
    }

    #[test]
    fn test_placeholder_token_never_split() {
        let ancestor = "intro ⟦attachment-0:map.png⟧ outro";
        let ours = "intro ⟦attachment-0:map.png⟧ changed";
        let theirs = "renamed ⟦attachment-0:map.png⟧ outro";
        let merged = merge3(ancestor, ours, theirs);
        assert!(merged.is_clean());
        assert_eq!(
            merged.resolved_text(),
            "renamed ⟦attachment-0:map.png⟧ changed"
        );
    }

    #[test]
    fn test_no_changes_round_trips_ancestor() {
        let merged = merge3("same\ntext", "same\ntext", "same\ntext");
        assert!(merged.is_clean());
        assert_eq!(merged.resolved_text(), "same\ntext");
    }
}
