use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::SlideMarkup;

static HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^ {0,3}#{1,3}[ \t]+(.+?)[ \t#]*$").expect("heading pattern is valid")
});

static ASIDE_NOTES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<aside\s+class="notes"\s*>(.*?)</aside>"#).expect("notes pattern is valid")
});

/// Lightweight per-slide summary sent to the presenter surface.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideSummary {
    pub index: usize,
    pub title: String,
    pub notes: String,
}

/// Build the ordered slide summaries for a deck. Computed fresh on every call.
pub fn slide_summaries(slides: &[SlideMarkup]) -> Vec<SlideSummary> {
    slides
        .iter()
        .enumerate()
        .map(|(index, slide)| {
            let (body, notes) = split_notes(&slide.source);
            SlideSummary {
                index,
                title: slide_title(&body, index),
                notes: notes.unwrap_or_default(),
            }
        })
        .collect()
}

/// First `#`, `##` or `###` heading of a slide body, or `Slide N` (1-based).
pub fn slide_title(body: &str, index: usize) -> String {
    HEADING
        .captures(body)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| format!("Slide {}", index + 1))
}

/// Separate speaker notes from slide content.
///
/// Notes are either an `<aside class="notes">` block or everything after a
/// line starting with `Note:`/`Notes:`. Returns the remaining body and the
/// notes markup, if any.
pub fn split_notes(source: &str) -> (String, Option<String>) {
    if let Some(caps) = ASIDE_NOTES.captures(source) {
        let whole = caps.get(0).map_or(0..0, |m| m.range());
        let notes = caps.get(1).map_or("", |m| m.as_str()).trim().to_string();
        let mut body = String::with_capacity(source.len());
        body.push_str(&source[..whole.start]);
        body.push_str(&source[whole.end..]);
        return (body.trim().to_string(), Some(notes));
    }

    let mut body = Vec::new();
    let mut notes: Option<Vec<&str>> = None;
    for line in source.lines() {
        if let Some(notes) = notes.as_mut() {
            notes.push(line);
            continue;
        }
        let trimmed = line.trim_start();
        let marker = trimmed
            .strip_prefix("Notes:")
            .or_else(|| trimmed.strip_prefix("Note:"));
        match marker {
            Some(rest) => {
                let rest = rest.trim();
                notes = Some(if rest.is_empty() { Vec::new() } else { vec![rest] });
            }
            None => body.push(line),
        }
    }

    let body = body.join("\n").trim().to_string();
    (body, notes.map(|n| n.join("\n").trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn markup(source: &str) -> SlideMarkup {
        SlideMarkup::new(source)
    }

    #[test]
    fn title_from_first_heading() {
        assert_eq!(slide_title("Intro\n## Overview\n# Later", 0), "Overview");
    }

    #[test]
    fn title_ignores_deep_headings() {
        assert_eq!(slide_title("#### Too deep", 3), "Slide 4");
    }

    #[test]
    fn title_falls_back_to_slide_number() {
        assert_eq!(slide_title("just text", 1), "Slide 2");
    }

    #[test]
    fn note_marker_splits_body() {
        let (body, notes) = split_notes("# Title\nBody\nNote: say hello\nand wave");
        assert_eq!(body, "# Title\nBody");
        assert_eq!(notes.as_deref(), Some("say hello\nand wave"));
    }

    #[test]
    fn aside_notes_are_extracted() {
        let (body, notes) =
            split_notes("# Title\n<aside class=\"notes\">\n<p>Speak <b>slowly</b></p>\n</aside>\nAfter");
        assert_eq!(body, "# Title\n\nAfter");
        assert_eq!(notes.as_deref(), Some("<p>Speak <b>slowly</b></p>"));
    }

    #[test]
    fn no_notes() {
        let (_, notes) = split_notes("# Title\nBody");
        assert!(notes.is_none());
    }

    #[test]
    fn summaries_are_indexed_in_order() {
        let slides = vec![markup("# A\nNote: first"), markup("plain"), markup("### C")];
        let summaries = slide_summaries(&slides);
        assert_eq!(summaries.len(), 3);
        assert_eq!(summaries[0].title, "A");
        assert_eq!(summaries[0].notes, "first");
        assert_eq!(summaries[1].title, "Slide 2");
        assert_eq!(summaries[1].notes, "");
        assert_eq!(summaries[2].index, 2);
        assert_eq!(summaries[2].title, "C");
    }

    #[test]
    fn heading_inside_notes_is_not_the_title() {
        let summaries = slide_summaries(&[markup("text\nNote:\n# Secret")]);
        assert_eq!(summaries[0].title, "Slide 1");
        assert_eq!(summaries[0].notes, "# Secret");
    }
}
