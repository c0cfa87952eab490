//! Batching and the marker wire protocol
//!
//! Items are greedily packed into batches bounded by item count and a
//! character budget. A batch travels to the backend as
//!
//! ```text
//! |||0||| first text
//! |||1||| second text
//! ```
//!
//! and the response is expected to carry the same markers.

use std::sync::OnceLock;

use regex::Regex;

use crate::extract::TextItem;
use crate::prompt::{clean_response, clean_translation};

/// Characters charged per item on top of its text for the marker
pub const MARKER_OVERHEAD: usize = 10;

fn marker_regex() -> &'static Regex {
    static MARKER_RE: OnceLock<Regex> = OnceLock::new();
    MARKER_RE.get_or_init(|| Regex::new(r"\|\|\|(\d+)\|\|\|").expect("marker pattern is valid"))
}

/// Budget cost of one item
pub fn item_cost(item: &TextItem) -> usize {
    item.text.len() + MARKER_OVERHEAD
}

/// A group of items sent in one backend request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Batch {
    pub items: Vec<TextItem>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total budget cost of the batch
    pub fn cost(&self) -> usize {
        self.items.iter().map(item_cost).sum()
    }

    /// Serialize to the marker protocol
    pub fn to_batched_text(&self) -> String {
        self.items
            .iter()
            .enumerate()
            .map(|(i, item)| format!("|||{}||| {}", i, item.text))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Parse a backend response for this batch
    ///
    /// Each slot is cleaned against its source item, so sending the batch's
    /// own text back recovers every item unchanged.
    pub fn parse_response(&self, response: &str) -> Vec<String> {
        split_slots(response, self.items.len())
            .into_iter()
            .zip(&self.items)
            .map(|(raw, item)| clean_translation(&item.text, raw))
            .collect()
    }

    /// Short description for logs
    pub fn summary(&self) -> String {
        format!("{} items, {} chars", self.items.len(), self.cost())
    }
}

/// Greedily pack items into batches
///
/// A batch is closed when adding the next item would exceed `max_items`
/// or `max_chars`. An item that alone exceeds `max_chars` gets a batch of
/// its own.
pub fn create_batches(items: Vec<TextItem>, max_items: usize, max_chars: usize) -> Vec<Batch> {
    let max_items = max_items.max(1);
    let total = items.len();

    let mut batches = Vec::new();
    let mut current = Batch::default();
    let mut current_chars = 0;

    for item in items {
        let cost = item_cost(&item);
        if !current.is_empty()
            && (current.len() >= max_items || current_chars + cost > max_chars)
        {
            batches.push(std::mem::take(&mut current));
            current_chars = 0;
        }
        current_chars += cost;
        current.items.push(item);
    }
    if !current.is_empty() {
        batches.push(current);
    }

    tracing::debug!("Created {} batches from {} items", batches.len(), total);
    batches
}

/// Split a marker-delimited response into `expected` cleaned slots
///
/// Slot `N` holds the text after `|||N|||` up to the next marker. Missing
/// slots are filled with an empty string. A response without markers is
/// taken whole when exactly one item was sent.
pub fn parse_response(response: &str, expected: usize) -> Vec<String> {
    split_slots(response, expected)
        .into_iter()
        .map(clean_response)
        .collect()
}

/// Raw slot text, before any cleanup
fn split_slots(response: &str, expected: usize) -> Vec<&str> {
    let mut slots = vec![""; expected];
    if response.trim().is_empty() {
        tracing::warn!("Empty response for {} items", expected);
        return slots;
    }

    let markers: Vec<(usize, usize, usize)> = marker_regex()
        .captures_iter(response)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let index = caps.get(1)?.as_str().parse().ok()?;
            Some((index, whole.start(), whole.end()))
        })
        .collect();

    if markers.is_empty() {
        if expected > 1 {
            tracing::warn!(
                "No markers in response, expected {} items: {:.100}",
                expected,
                response
            );
        }
        if let Some(first) = slots.first_mut() {
            *first = response;
        }
        return slots;
    }

    for (n, &(index, _, text_start)) in markers.iter().enumerate() {
        let text_end = markers
            .get(n + 1)
            .map(|&(_, next_start, _)| next_start)
            .unwrap_or(response.len());
        match slots.get_mut(index) {
            Some(slot) => *slot = &response[text_start..text_end],
            None => tracing::debug!("Ignoring out-of-range marker {}", index),
        }
    }

    let missing: Vec<usize> = slots
        .iter()
        .enumerate()
        .filter(|(_, s)| s.trim().is_empty())
        .map(|(i, _)| i)
        .collect();
    if !missing.is_empty() {
        tracing::warn!("Missing translations for indices {:?}", missing);
    }

    slots
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::TextPath;

    fn items(texts: &[&str]) -> Vec<TextItem> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| TextItem::new(TextPath::section(i), *t))
            .collect()
    }

    #[test]
    fn test_batches_respect_item_limit() {
        let batches = create_batches(items(&["a"; 12]), 5, 10_000);
        let sizes: Vec<usize> = batches.iter().map(Batch::len).collect();
        assert_eq!(sizes, vec![5, 5, 2]);
    }

    #[test]
    fn test_batches_respect_char_budget() {
        // Each item costs 30 + 10
        let text = "x".repeat(30);
        let batches = create_batches(items(&[text.as_str(); 5]), 50, 100);
        for batch in &batches {
            assert!(batch.cost() <= 100);
        }
        let sizes: Vec<usize> = batches.iter().map(Batch::len).collect();
        assert_eq!(sizes, vec![2, 2, 1]);
    }

    #[test]
    fn test_oversized_item_travels_alone() {
        let big = "y".repeat(500);
        let batches = create_batches(items(&["a", big.as_str(), "b"]), 5, 100);
        let sizes: Vec<usize> = batches.iter().map(Batch::len).collect();
        assert_eq!(sizes, vec![1, 1, 1]);
        assert_eq!(batches[1].items[0].text, big);
    }

    #[test]
    fn test_batching_preserves_order() {
        let input = items(&["one", "two", "three", "four"]);
        let batches = create_batches(input.clone(), 3, 1000);
        let flat: Vec<TextItem> = batches.into_iter().flat_map(|b| b.items).collect();
        assert_eq!(flat, input);
    }

    #[test]
    fn test_batched_text_format() {
        let batch = Batch {
            items: items(&["Hello", "Good bye"]),
        };
        assert_eq!(batch.to_batched_text(), "|||0||| Hello\n|||1||| Good bye");
    }

    #[test]
    fn test_protocol_recovers_items() {
        let batch = Batch {
            items: items(&["Hello", "Take two tablets daily.", "Visit 3"]),
        };
        let parsed = batch.parse_response(&batch.to_batched_text());
        assert_eq!(parsed, vec!["Hello", "Take two tablets daily.", "Visit 3"]);
    }

    #[test]
    fn test_protocol_recovers_untidy_items() {
        let texts = [
            "  indented",
            "Dose (Note: twice daily)",
            "```code```",
            "Fasting required.\n",
            "Translation: see appendix",
        ];
        let batch = Batch {
            items: items(&texts),
        };
        assert_eq!(batch.parse_response(&batch.to_batched_text()), texts);
    }

    #[test]
    fn test_batch_cleanup_still_strips_model_notes() {
        let batch = Batch {
            items: items(&["Dose", "  Visit"]),
        };
        let parsed = batch.parse_response("|||0||| Dosis (Note: unit kept)\n|||1||| Translation: Visita");
        assert_eq!(parsed, vec!["Dosis", "  Visita"]);
    }

    #[test]
    fn test_out_of_order_and_missing_markers() {
        let parsed = parse_response("|||2||| tres\n|||0||| uno", 3);
        assert_eq!(parsed, vec!["uno", "", "tres"]);
    }

    #[test]
    fn test_single_item_without_markers() {
        assert_eq!(parse_response("Translation: Hola", 1), vec!["Hola"]);
    }

    #[test]
    fn test_unmarked_response_for_many_items() {
        assert_eq!(parse_response("  Hola  ", 3), vec!["Hola", "", ""]);
    }

    #[test]
    fn test_empty_response() {
        assert_eq!(parse_response("   ", 2), vec!["", ""]);
    }

    #[test]
    fn test_out_of_range_marker_ignored() {
        assert_eq!(parse_response("|||0||| a |||7||| b", 1), vec!["a"]);
    }
}
