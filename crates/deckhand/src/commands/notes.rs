use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use crate::deck::{self, Deck, MarkdownDeck};
use crate::presenter::view::plain_text;

pub fn run(file: &Path) -> Result<()> {
    let deck = MarkdownDeck::load(file)?;
    if let Some(title) = &deck.meta.title {
        println!("{}\n", title.bold());
    }
    for (heading, notes) in render(&deck) {
        println!("{}", heading.cyan().bold());
        match notes {
            Some(notes) => println!("{notes}\n"),
            None => println!("{}\n", "(no notes)".dimmed()),
        }
    }
    Ok(())
}

/// `(heading, notes)` per slide, notes reduced to plain text.
fn render(deck: &MarkdownDeck) -> Vec<(String, Option<String>)> {
    deck::slide_summaries(deck.slides())
        .into_iter()
        .map(|s| {
            let notes = plain_text(&s.notes);
            let heading = format!("{:>3}. {}", s.index + 1, s.title);
            (heading, (!notes.is_empty()).then_some(notes))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn lists_titles_and_notes() {
        let deck = MarkdownDeck::parse(
            "# Intro\n<aside class=\"notes\"><p>Welcome &amp; thanks</p></aside>\n\n---\n\n## Plan",
        )
        .unwrap();
        assert_eq!(
            render(&deck),
            vec![
                ("  1. Intro".to_string(), Some("Welcome & thanks".to_string())),
                ("  2. Plan".to_string(), None),
            ]
        );
    }
}
