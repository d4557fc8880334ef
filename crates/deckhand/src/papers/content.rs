use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LoadError {
    #[error("failed to extract text from {}: {message}", .path.display())]
    Pdf { path: PathBuf, message: String },
    #[error("chart backend unavailable: {0}")]
    Chart(String),
    #[error("could not start loader: {0}")]
    Spawn(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadState<T> {
    Pending,
    Ready(T),
    Failed(LoadError),
}

/// A value produced on a background thread, polled without blocking.
#[derive(Debug)]
pub struct Deferred<T> {
    state: LoadState<T>,
    rx: Option<Receiver<Result<T, LoadError>>>,
}

impl<T: Send + 'static> Deferred<T> {
    pub fn spawn<F>(name: &str, job: F) -> Self
    where
        F: FnOnce() -> Result<T, LoadError> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let spawned = std::thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                // Receiver may be gone if the page was dropped.
                let _ = tx.send(job());
            });
        match spawned {
            Ok(_) => Self {
                state: LoadState::Pending,
                rx: Some(rx),
            },
            Err(e) => Self {
                state: LoadState::Failed(LoadError::Spawn(e.to_string())),
                rx: None,
            },
        }
    }
}

impl<T> Deferred<T> {
    pub fn state(&self) -> &LoadState<T> {
        &self.state
    }

    /// Whether a background job may still deliver a result.
    pub fn is_waiting(&self) -> bool {
        self.rx.is_some()
    }

    /// Pick up a finished result, if any. Returns the current state.
    pub fn poll(&mut self) -> &LoadState<T> {
        if let Some(rx) = &self.rx {
            match rx.try_recv() {
                Ok(Ok(value)) => {
                    self.state = LoadState::Ready(value);
                    self.rx = None;
                }
                Ok(Err(e)) => {
                    tracing::warn!("{e}");
                    self.state = LoadState::Failed(e);
                    self.rx = None;
                }
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Disconnected) => {
                    tracing::debug!("loader exited without a result");
                    self.rx = None;
                }
            }
        }
        &self.state
    }
}

/// Embedded document viewer for a paper's PDF.
#[derive(Debug)]
pub struct PdfViewer {
    pub src: String,
    pub title: &'static str,
    pub text: Deferred<String>,
}

pub const PDF_VIEWER_TITLE: &str = "Paper PDF preview";

impl PdfViewer {
    /// Create the viewer and start extracting the document's text.
    pub fn open(path: &Path) -> Self {
        let owned = path.to_path_buf();
        let text = Deferred::spawn("pdf-extract", move || {
            pdf_extract::extract_text(&owned).map_err(|e| LoadError::Pdf {
                path: owned.clone(),
                message: e.to_string(),
            })
        });
        Self {
            src: format!("{}#view=FitH", path.display()),
            title: PDF_VIEWER_TITLE,
            text,
        }
    }
}

/// How a chart series is drawn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartMode {
    Lines,
    Markers,
    #[default]
    #[serde(rename = "lines+markers")]
    LinesMarkers,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub mode: ChartMode,
}

impl ChartData {
    pub fn demo() -> Self {
        Self {
            x: vec![1.0, 2.0, 3.0, 4.0],
            y: vec![2.0, 6.0, 3.0, 8.0],
            mode: ChartMode::LinesMarkers,
        }
    }

    /// Min and max over both axes, as `([x_min, y_min], [x_max, y_max])`.
    pub fn bounds(&self) -> Option<([f64; 2], [f64; 2])> {
        let fold = |values: &[f64]| {
            values.iter().fold(None, |acc: Option<(f64, f64)>, &v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
        };
        let (x_min, x_max) = fold(&self.x)?;
        let (y_min, y_max) = fold(&self.y)?;
        Some(([x_min, y_min], [x_max, y_max]))
    }
}

pub const CHART_FAILED: &str = "Chart failed to load";

/// Readies the plotting backend before a chart can render.
pub trait ChartLoader: Send + Sync {
    fn load(&self) -> Result<(), LoadError>;
}

/// The painter-based plotter needs no setup.
#[derive(Debug, Default)]
pub struct BuiltinPlotter;

impl ChartLoader for BuiltinPlotter {
    fn load(&self) -> Result<(), LoadError> {
        Ok(())
    }
}

#[derive(Debug)]
pub struct DemoChart {
    pub data: Deferred<ChartData>,
}

impl DemoChart {
    pub fn start(loader: Arc<dyn ChartLoader>, mode: ChartMode) -> Self {
        let data = Deferred::spawn("chart-loader", move || {
            loader.load()?;
            Ok(ChartData {
                mode,
                ..ChartData::demo()
            })
        });
        Self { data }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn settle<T>(deferred: &mut Deferred<T>) -> &LoadState<T> {
        let deadline = Instant::now() + Duration::from_secs(5);
        while matches!(deferred.poll(), LoadState::Pending) && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }
        deferred.state()
    }

    struct Broken;

    impl ChartLoader for Broken {
        fn load(&self) -> Result<(), LoadError> {
            Err(LoadError::Chart("offline".into()))
        }
    }

    #[test]
    fn demo_chart_resolves_to_fixed_dataset() {
        let mut chart = DemoChart::start(Arc::new(BuiltinPlotter), ChartMode::default());
        assert_eq!(settle(&mut chart.data), &LoadState::Ready(ChartData::demo()));
    }

    #[test]
    fn failing_loader_reports_failure() {
        let mut chart = DemoChart::start(Arc::new(Broken), ChartMode::Lines);
        assert_eq!(
            settle(&mut chart.data),
            &LoadState::Failed(LoadError::Chart("offline".into()))
        );
    }

    #[test]
    fn unresolved_load_stays_pending() {
        let (gate, wait) = mpsc::channel::<()>();
        let mut deferred = Deferred::spawn("stalled", move || {
            let _ = wait.recv();
            Ok(ChartData::demo())
        });
        std::thread::sleep(Duration::from_millis(20));
        assert!(matches!(deferred.poll(), LoadState::Pending));
        assert!(deferred.is_waiting());

        drop(gate);
        assert_eq!(settle(&mut deferred), &LoadState::Ready(ChartData::demo()));
    }

    #[test]
    fn chart_mode_parses_from_yaml() {
        let mode: ChartMode = serde_yaml::from_str("lines+markers").unwrap();
        assert_eq!(mode, ChartMode::LinesMarkers);
        let mode: ChartMode = serde_yaml::from_str("markers").unwrap();
        assert_eq!(mode, ChartMode::Markers);
    }

    #[test]
    fn pdf_viewer_source_and_title() {
        let viewer = PdfViewer::open(Path::new("papers/a.pdf"));
        assert_eq!(viewer.src, "papers/a.pdf#view=FitH");
        assert_eq!(viewer.title, "Paper PDF preview");
    }

    #[test]
    fn missing_pdf_fails_to_extract() {
        let mut viewer = PdfViewer::open(Path::new("/definitely/not/here.pdf"));
        assert!(matches!(
            settle(&mut viewer.text),
            LoadState::Failed(LoadError::Pdf { .. })
        ));
    }

    #[test]
    fn demo_bounds() {
        assert_eq!(ChartData::demo().bounds(), Some(([1.0, 2.0], [4.0, 8.0])));
        let empty = ChartData {
            x: vec![],
            y: vec![],
            mode: ChartMode::Lines,
        };
        assert_eq!(empty.bounds(), None);
    }
}
