/// Split a deck body (after frontmatter extraction) into raw slide strings.
///
/// Two mechanisms create slide breaks:
/// 1. a `---` line with blank lines (or the document edge) on both sides
/// 2. a `# ` heading when the current slide already has content
///
/// Lines inside fenced code blocks never break a slide.
pub fn split(body: &str) -> Vec<String> {
    let body = body.replace("\r\n", "\n");
    let lines: Vec<&str> = body.split('\n').collect();

    let mut slides = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut fence: Option<(char, usize)> = None;

    for (i, line) in lines.iter().enumerate() {
        let trimmed = line.trim();

        if let Some((ch, len)) = fence {
            if closes_fence(trimmed, ch, len) {
                fence = None;
            }
            current.push(line);
            continue;
        }
        if let Some(opened) = opens_fence(trimmed) {
            fence = Some(opened);
            current.push(line);
            continue;
        }

        if is_dash_separator(trimmed) {
            let prev_blank = current.last().is_none_or(|l| l.trim().is_empty());
            let next_blank = lines.get(i + 1).is_none_or(|l| l.trim().is_empty());
            if prev_blank && next_blank {
                flush(&mut current, &mut slides);
                continue;
            }
        }

        if trimmed.starts_with("# ") && has_content(&current) {
            flush(&mut current, &mut slides);
        }

        current.push(line);
    }
    flush(&mut current, &mut slides);

    slides
}

fn flush(current: &mut Vec<&str>, slides: &mut Vec<String>) {
    let chunk = current.join("\n");
    current.clear();
    let chunk = chunk.trim();
    if !chunk.is_empty() {
        slides.push(chunk.to_string());
    }
}

fn has_content(lines: &[&str]) -> bool {
    lines.iter().any(|l| !l.trim().is_empty())
}

fn is_dash_separator(trimmed: &str) -> bool {
    trimmed.len() >= 3 && trimmed.chars().all(|c| c == '-')
}

fn opens_fence(trimmed: &str) -> Option<(char, usize)> {
    let ch = trimmed.chars().next()?;
    if ch != '`' && ch != '~' {
        return None;
    }
    let len = trimmed.chars().take_while(|&c| c == ch).count();
    (len >= 3).then_some((ch, len))
}

fn closes_fence(trimmed: &str, ch: char, len: usize) -> bool {
    let count = trimmed.chars().take_while(|&c| c == ch).count();
    count >= len && trimmed.chars().skip(count).all(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_dash_separator() {
        let slides = split("# One\n\nBody\n\n---\n\n# Two");
        assert_eq!(slides, vec!["# One\n\nBody", "# Two"]);
    }

    #[test]
    fn dashes_without_blank_lines_are_content() {
        let slides = split("## Setext\n---\ntext");
        assert_eq!(slides.len(), 1);
    }

    #[test]
    fn h1_after_content_starts_a_new_slide() {
        let slides = split("# One\nText\n# Two\nMore");
        assert_eq!(slides, vec!["# One\nText", "# Two\nMore"]);
    }

    #[test]
    fn headings_inside_code_fences_are_ignored() {
        let slides = split("# Code\n\n```sh\n# not a heading\n---\n```\n");
        assert_eq!(slides.len(), 1);
        assert!(slides[0].contains("# not a heading"));
    }

    #[test]
    fn empty_chunks_are_dropped() {
        let slides = split("\n\n---\n\n---\n\n# Only\n");
        assert_eq!(slides, vec!["# Only"]);
    }
}
