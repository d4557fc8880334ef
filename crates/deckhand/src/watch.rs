use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::time::Duration;

use notify_debouncer_mini::notify::{RecommendedWatcher, RecursiveMode, Watcher};
use notify_debouncer_mini::{DebounceEventResult, Debouncer, new_debouncer};

const DEBOUNCE: Duration = Duration::from_millis(250);

/// Watches the deck file for edits.
///
/// The parent directory is watched rather than the file itself so editors
/// that save by renaming a temporary file are still picked up.
pub struct DeckWatcher {
    _debouncer: Debouncer<RecommendedWatcher>,
    rx: Receiver<()>,
}

impl DeckWatcher {
    /// Start watching `file`. `on_change` runs on the watcher thread after
    /// each debounced change, e.g. to wake the UI.
    pub fn start(file: &Path, on_change: impl Fn() + Send + 'static) -> anyhow::Result<Self> {
        let target = file.canonicalize().unwrap_or_else(|_| file.to_path_buf());
        let dir = target
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let (tx, rx) = mpsc::channel();

        let watched = target.clone();
        let mut debouncer =
            new_debouncer(DEBOUNCE, move |result: DebounceEventResult| match result {
                Ok(events) => {
                    let paths = events.iter().map(|e| e.path.as_path());
                    if touches(paths, &watched) && tx.send(()).is_ok() {
                        on_change();
                    }
                }
                Err(e) => tracing::warn!("deck watcher error: {e}"),
            })?;
        debouncer
            .watcher()
            .watch(&dir, RecursiveMode::NonRecursive)?;
        tracing::debug!("watching {}", target.display());

        Ok(Self {
            _debouncer: debouncer,
            rx,
        })
    }

    /// Whether the deck changed since the last call.
    pub fn changed(&self) -> bool {
        self.rx.try_iter().count() > 0
    }
}

/// Only the watched file's own directory is observed, so a matching file
/// name is a match.
fn touches<'a>(paths: impl IntoIterator<Item = &'a Path>, target: &Path) -> bool {
    let Some(name) = target.file_name() else {
        return false;
    };
    paths.into_iter().any(|p| p.file_name() == Some(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_on_file_name() {
        let target = Path::new("/talks/deck.md");
        assert!(touches([Path::new("/talks/deck.md")], target));
        assert!(touches(
            [Path::new("/talks/.deck.md.swp"), Path::new("/talks/deck.md")],
            target
        ));
        assert!(!touches([Path::new("/talks/other.md")], target));
        assert!(!touches(std::iter::empty(), target));
    }

    #[test]
    fn starts_on_an_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("deck.md");
        std::fs::write(&file, "# One").unwrap();
        let watcher = DeckWatcher::start(&file, || {}).unwrap();
        assert!(!watcher.changed());
    }
}
