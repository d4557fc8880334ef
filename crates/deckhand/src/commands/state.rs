use std::path::Path;

use anyhow::{Context, Result};

use crate::deck::{self, Deck, MarkdownDeck};
use crate::presenter::payload::SyncPayload;

pub fn run(file: &Path, index: Option<usize>) -> Result<()> {
    let deck = MarkdownDeck::load(file)?;
    println!("{}", payload_json(&deck, index)?);
    Ok(())
}

/// The payload the presenter would receive: full state, or an update for
/// `index` (which must name an existing slide).
fn payload_json(deck: &MarkdownDeck, index: Option<usize>) -> Result<String> {
    let slides = deck::slide_summaries(deck.slides());
    let payload = match index {
        Some(index) => {
            if index >= slides.len() {
                anyhow::bail!(
                    "Slide index {index} is out of range (deck has {} slides)",
                    slides.len()
                );
            }
            SyncPayload::Update { slides, index }
        }
        None => SyncPayload::State {
            slides,
            index: deck::resolve_current_index(deck),
        },
    };
    payload.to_message().context("failed to encode payload")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};

    fn deck() -> MarkdownDeck {
        MarkdownDeck::parse("# One\n\n---\n\n# Two\nNote: say hi\n\n---\n\nplain").unwrap()
    }

    #[test]
    fn state_payload_for_a_deck() {
        let json: Value = serde_json::from_str(&payload_json(&deck(), None).unwrap()).unwrap();
        assert_eq!(
            json,
            json!({
                "type": "state",
                "index": 0,
                "slides": [
                    {"index": 0, "title": "One", "notes": ""},
                    {"index": 1, "title": "Two", "notes": "say hi"},
                    {"index": 2, "title": "Slide 3", "notes": ""}
                ]
            })
        );
    }

    #[test]
    fn update_payload_for_an_index() {
        let json: Value = serde_json::from_str(&payload_json(&deck(), Some(1)).unwrap()).unwrap();
        assert_eq!(json["type"], "update");
        assert_eq!(json["index"], 1);
    }

    #[test]
    fn out_of_range_index_is_an_error() {
        assert!(payload_json(&deck(), Some(3)).is_err());
    }
}
