use super::{DeckError, DeckMeta};

/// Split leading YAML frontmatter (delimited by `---` lines) from the deck body.
///
/// A document that does not open with `---` has no frontmatter. An opening
/// delimiter without a closing one is treated as ordinary content.
pub fn extract(content: &str) -> Result<(DeckMeta, String), DeckError> {
    let content = content.trim_start_matches('\u{feff}');
    let mut lines = content.lines();

    if lines.next().map(str::trim_end) != Some("---") {
        return Ok((DeckMeta::default(), content.to_string()));
    }

    let mut yaml = Vec::new();
    let mut closed = false;
    for line in lines.by_ref() {
        if line.trim_end() == "---" {
            closed = true;
            break;
        }
        yaml.push(line);
    }

    if !closed {
        return Ok((DeckMeta::default(), content.to_string()));
    }

    let yaml = yaml.join("\n");
    let meta = if yaml.trim().is_empty() {
        DeckMeta::default()
    } else {
        serde_yaml::from_str(&yaml)?
    };
    let body: Vec<&str> = lines.collect();
    Ok((meta, body.join("\n")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_frontmatter() {
        let (meta, body) = extract("# Hello").unwrap();
        assert!(meta.title.is_none());
        assert_eq!(body, "# Hello");
    }

    #[test]
    fn reads_title_and_theme() {
        let (meta, body) = extract("---\ntitle: Demo\ntheme: dark\n---\n# One").unwrap();
        assert_eq!(meta.title.as_deref(), Some("Demo"));
        assert_eq!(meta.theme.as_deref(), Some("dark"));
        assert_eq!(body, "# One");
    }

    #[test]
    fn unclosed_frontmatter_is_content() {
        let (meta, body) = extract("---\n# One").unwrap();
        assert!(meta.title.is_none());
        assert_eq!(body, "---\n# One");
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        assert!(extract("---\ntitle: [unclosed\n---\n# One").is_err());
    }
}
