//! Placeholder codec between raw unit sequences and editable text.
//!
//! Every non-character unit is projected to a token like
//! `⟦attachment-0:photo.jpg⟧`: the kind label, a monotonically-incrementing
//! decode ordinal, and the display name. The ordinal makes tokens unique
//! within one text and is the key back into the decode table, so encode
//! survives the user deleting, duplicating, or reordering tokens. A token
//! with an unparsable ordinal is not an error: it stays plain text.

use super::unit::{normalize, ObjectKind, ObjectRef, Unit};
use once_cell::sync::Lazy;
use regex::Regex;

static PLACEHOLDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"⟦([a-z]+)-(\d+):([^⟧\n]*)⟧").unwrap());

/// Render a placeholder token for an object at a given decode ordinal.
pub fn placeholder(obj: &ObjectRef, ordinal: usize) -> String {
    // The closing bracket may not appear in the name or the token would
    // terminate early on re-parse.
    let name: String = obj
        .name
        .chars()
        .filter(|c| *c != '⟦' && *c != '⟧' && *c != '\n')
        .collect();
    format!("⟦{}-{}:{}⟧", obj.kind.label(), ordinal, name)
}

/// Project a unit sequence to editable text plus the ordered decode table.
/// Tokens appear in the same relative order as the source units.
pub fn decode(units: &[Unit]) -> (String, Vec<ObjectRef>) {
    let mut text = String::new();
    let mut table = Vec::new();
    for unit in units {
        match unit {
            Unit::Run(run) => text.push_str(run),
            Unit::Object(obj) => {
                text.push_str(&placeholder(obj, table.len()));
                table.push(obj.clone());
            }
        }
    }
    (text, table)
}

/// Rebuild a unit sequence from edited text, resolving placeholder tokens
/// against the decode table by ordinal. Deleted tokens drop the unit,
/// reordered tokens reorder the units, and duplicated tokens duplicate the
/// reference. Unresolvable tokens are kept as literal text.
pub fn encode(text: &str, table: &[ObjectRef]) -> Vec<Unit> {
    let mut units = Vec::new();
    let mut cursor = 0;
    for caps in PLACEHOLDER_RE.captures_iter(text) {
        let whole = caps.get(0).unwrap();
        let resolved = ObjectKind::from_label(&caps[1])
            .and_then(|kind| {
                let ordinal: usize = caps[2].parse().ok()?;
                table.get(ordinal).filter(|obj| obj.kind == kind)
            })
            .cloned();

        // Unresolvable tokens fail open: left in place as ordinary text.
        let Some(obj) = resolved else { continue };

        if whole.start() > cursor {
            units.push(Unit::Run(text[cursor..whole.start()].to_string()));
        }
        units.push(Unit::Object(obj));
        cursor = whole.end();
    }
    if cursor < text.len() {
        units.push(Unit::Run(text[cursor..].to_string()));
    }
    normalize(units)
}

/// Byte spans of resolvable placeholder tokens in editable text. Used by the
/// structure parser to keep tags and links from matching inside a token.
pub fn token_spans(text: &str) -> Vec<(usize, usize)> {
    PLACEHOLDER_RE
        .captures_iter(text)
        .filter(|caps| caps[2].parse::<usize>().is_ok())
        .map(|caps| {
            let whole = caps.get(0).unwrap();
            (whole.start(), whole.end())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_units() -> Vec<Unit> {
        vec![
            Unit::Run("Trip plan\n".into()),
            Unit::Object(ObjectRef::attachment("a-1", "map.png")),
            Unit::Run("\nPack light.\n".into()),
            Unit::Object(ObjectRef::attachment("a-2", "tickets.pdf")),
        ]
    }

    #[test]
    fn test_decode_orders_and_numbers_tokens() {
        let (text, table) = decode(&sample_units());
        assert_eq!(
            text,
            "Trip plan\n⟦attachment-0:map.png⟧\nPack light.\n⟦attachment-1:tickets.pdf⟧"
        );
        assert_eq!(table.len(), 2);
        assert_eq!(table[0].id, "a-1");
        assert_eq!(table[1].id, "a-2");
    }

    #[test]
    fn test_round_trip_preserves_identity_and_order() {
        let units = sample_units();
        let (text, table) = decode(&units);
        let rebuilt = encode(&text, &table);
        let (text2, table2) = decode(&rebuilt);
        assert_eq!(text, text2);
        assert_eq!(table, table2);
    }

    #[test]
    fn test_encode_tolerates_deletion() {
        let (text, table) = decode(&sample_units());
        let edited = text.replace("⟦attachment-0:map.png⟧", "");
        let rebuilt = encode(&edited, &table);
        let objects: Vec<_> = rebuilt.iter().filter_map(Unit::as_object).collect();
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].id, "a-2");
    }

    #[test]
    fn test_encode_tolerates_reordering() {
        let (text, table) = decode(&sample_units());
        let a = "⟦attachment-0:map.png⟧";
        let b = "⟦attachment-1:tickets.pdf⟧";
        let swapped = text.replace(a, "@@").replace(b, a).replace("@@", b);
        let rebuilt = encode(&swapped, &table);
        let objects: Vec<_> = rebuilt.iter().filter_map(Unit::as_object).collect();
        assert_eq!(objects[0].id, "a-2");
        assert_eq!(objects[1].id, "a-1");
    }

    #[test]
    fn test_encode_tolerates_duplication() {
        let (text, table) = decode(&sample_units());
        let doubled = format!("{}\n⟦attachment-0:map.png⟧", text);
        let rebuilt = encode(&doubled, &table);
        let objects: Vec<_> = rebuilt.iter().filter_map(Unit::as_object).collect();
        assert_eq!(objects.len(), 3);
        assert_eq!(objects[2].id, "a-1");
    }

    #[test]
    fn test_malformed_ordinal_fails_open() {
        let table = vec![ObjectRef::attachment("a-1", "map.png")];
        let text = "before ⟦attachment-99:map.png⟧ after";
        let units = encode(text, &table);
        assert_eq!(units, vec![Unit::Run(text.to_string())]);
    }

    #[test]
    fn test_unknown_kind_fails_open() {
        let table = vec![ObjectRef::attachment("a-1", "map.png")];
        let text = "⟦drawing-0:sketch⟧";
        let units = encode(text, &table);
        assert_eq!(units, vec![Unit::Run(text.to_string())]);
    }

    #[test]
    fn test_placeholder_strips_brackets_from_name() {
        let obj = ObjectRef::attachment("a-1", "we⟧ird⟦.png");
        assert_eq!(placeholder(&obj, 3), "⟦attachment-3:weird.png⟧");
    }

    #[test]
    fn test_token_spans_skip_unparsable() {
        let text = "⟦attachment-0:a.png⟧ mid ⟦attachment-x:b.png⟧";
        let spans = token_spans(text);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].0, 0);
    }
}
