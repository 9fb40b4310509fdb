//! Token-level diff for editable text.
//!
//! Diffing operates over opaque tokens, not bytes: a placeholder token is a
//! single indivisible element and is never split, the rest of the text is
//! split into newlines, whitespace runs, and word runs. Myers' O(ND)
//! algorithm over the token slices yields the minimal edit script; common
//! prefix/suffix trimming keeps the middle small. Ties resolve to the
//! earliest position, which is the order Myers emits after trimming.

use super::codec;

/// Split editable text into diff tokens. Placeholder tokens stay whole.
pub fn tokenize(text: &str) -> Vec<&str> {
    let spans = codec::token_spans(text);
    let mut tokens = Vec::new();
    let mut span_iter = spans.iter().peekable();
    let mut pos = 0;

    while pos < text.len() {
        if let Some(&&(start, end)) = span_iter.peek() {
            if start == pos {
                tokens.push(&text[start..end]);
                pos = end;
                span_iter.next();
                continue;
            }
        }
        let limit = span_iter.peek().map(|&&(start, _)| start).unwrap_or(text.len());
        let rest = &text[pos..limit];
        let first = rest.chars().next().unwrap();
        let token_len = if first == '\n' {
            1
        } else if first.is_whitespace() {
            rest.find(|c: char| c == '\n' || !c.is_whitespace())
                .unwrap_or(rest.len())
        } else {
            rest.find(|c: char| c.is_whitespace()).unwrap_or(rest.len())
        };
        tokens.push(&text[pos..pos + token_len]);
        pos += token_len;
    }
    tokens
}

/// One aligned replacement: `a[a_start..a_end]` becomes `b[b_start..b_end]`.
/// Equal stretches are implicit between hunks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk {
    pub a_start: usize,
    pub a_end: usize,
    pub b_start: usize,
    pub b_end: usize,
}

impl Hunk {
    pub fn is_insert(&self) -> bool {
        self.a_start == self.a_end
    }
}

/// Diff two token slices into replacement hunks, ordered by position in `a`.
pub fn diff_hunks(a: &[&str], b: &[&str]) -> Vec<Hunk> {
    // Trim the common prefix and suffix before running Myers.
    let mut prefix = 0;
    while prefix < a.len() && prefix < b.len() && a[prefix] == b[prefix] {
        prefix += 1;
    }
    let mut suffix = 0;
    while suffix < a.len() - prefix && suffix < b.len() - prefix
        && a[a.len() - 1 - suffix] == b[b.len() - 1 - suffix]
    {
        suffix += 1;
    }

    let mid_a = &a[prefix..a.len() - suffix];
    let mid_b = &b[prefix..b.len() - suffix];
    let ops = match myers(mid_a, mid_b) {
        Some(ops) => ops,
        // Degenerate input: fall back to one coarse replacement.
        None => {
            if mid_a.is_empty() && mid_b.is_empty() {
                return Vec::new();
            }
            return vec![Hunk {
                a_start: prefix,
                a_end: a.len() - suffix,
                b_start: prefix,
                b_end: b.len() - suffix,
            }];
        }
    };

    let mut hunks = Vec::new();
    let mut x = 0;
    let mut y = 0;
    let mut open: Option<Hunk> = None;
    for op in ops {
        match op {
            Op::Equal => {
                if let Some(h) = open.take() {
                    hunks.push(h);
                }
                x += 1;
                y += 1;
            }
            Op::Delete => {
                let h = open.get_or_insert(Hunk {
                    a_start: x,
                    a_end: x,
                    b_start: y,
                    b_end: y,
                });
                h.a_end += 1;
                x += 1;
            }
            Op::Insert => {
                let h = open.get_or_insert(Hunk {
                    a_start: x,
                    a_end: x,
                    b_start: y,
                    b_end: y,
                });
                h.b_end += 1;
                y += 1;
            }
        }
    }
    if let Some(h) = open.take() {
        hunks.push(h);
    }

    for h in &mut hunks {
        h.a_start += prefix;
        h.a_end += prefix;
        h.b_start += prefix;
        h.b_end += prefix;
    }
    hunks
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Equal,
    Delete,
    Insert,
}

// The trace grows O(D * (N + M)); beyond these bounds a diff is no longer
// worth being minimal and the caller coarsens instead.
const TOKEN_LIMIT: usize = 10_000;
const DEPTH_LIMIT: isize = 1_000;

/// Myers' greedy shortest-edit-script search with a full trace for
/// backtracking. Returns `None` when the input exceeds the search bounds.
fn myers(a: &[&str], b: &[&str]) -> Option<Vec<Op>> {
    if a.len() + b.len() > TOKEN_LIMIT {
        return None;
    }
    let n = a.len() as isize;
    let m = b.len() as isize;
    let max = n + m;
    if max == 0 {
        return Some(Vec::new());
    }

    let width = (2 * max + 1) as usize;
    let mut v = vec![0isize; width];
    let mut trace: Vec<Vec<isize>> = Vec::new();
    let mut found = false;

    'search: for d in 0..=max.min(DEPTH_LIMIT) {
        trace.push(v.clone());
        let mut k = -d;
        while k <= d {
            let i = (k + max) as usize;
            let mut x = if k == -d || (k != d && v[i - 1] < v[i + 1]) {
                v[i + 1]
            } else {
                v[i - 1] + 1
            };
            let mut y = x - k;
            while x < n && y < m && a[x as usize] == b[y as usize] {
                x += 1;
                y += 1;
            }
            v[i] = x;
            if x >= n && y >= m {
                found = true;
                break 'search;
            }
            k += 2;
        }
    }
    if !found {
        return None;
    }

    // Walk the trace backwards from (n, m) to (0, 0).
    let mut ops = Vec::new();
    let mut x = n;
    let mut y = m;
    for (d, v) in trace.iter().enumerate().rev() {
        let d = d as isize;
        let k = x - y;
        let i = (k + max) as usize;
        let prev_k = if k == -d || (k != d && v[i - 1] < v[i + 1]) {
            k + 1
        } else {
            k - 1
        };
        let prev_x = v[(prev_k + max) as usize];
        let prev_y = prev_x - prev_k;

        while x > prev_x && y > prev_y {
            ops.push(Op::Equal);
            x -= 1;
            y -= 1;
        }
        if d > 0 {
            if x == prev_x {
                ops.push(Op::Insert);
                y -= 1;
            } else {
                ops.push(Op::Delete);
                x -= 1;
            }
        }
        x = prev_x;
        y = prev_y;
    }
    ops.reverse();
    Some(ops)
}
