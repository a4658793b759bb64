//! The upload control: drag/drop and picker handling plus simulated progress.

use std::fmt;
use std::ops::ControlFlow;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;

use super::file::{CandidateFile, FileDescriptor};
use super::sink::{UploadSink, fire_and_forget};
use crate::config::UploadConfig;
use crate::scheduler::{StateCell, TaskScope};

/// Progress value at which the simulated sequence stops.
pub const PROGRESS_DONE: u8 = 100;

/// Immutable snapshot of the upload control.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UploadState {
    selected_file: Option<FileDescriptor>,
    progress: u8,
    is_dragging: bool,
    accepted_files: u64,
    revision: u64,
}

impl UploadState {
    #[must_use]
    pub fn selected_file(&self) -> Option<&FileDescriptor> {
        self.selected_file.as_ref()
    }

    #[must_use]
    pub fn progress(&self) -> u8 {
        self.progress
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.is_dragging
    }

    /// Number of files accepted so far. Also identifies the live progress run.
    #[must_use]
    pub fn accepted_files(&self) -> u64 {
        self.accepted_files
    }

    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.selected_file.is_some() && self.progress >= PROGRESS_DONE
    }

    fn with_dragging(&self, is_dragging: bool) -> Option<Self> {
        (self.is_dragging != is_dragging).then(|| Self {
            is_dragging,
            revision: self.revision + 1,
            ..self.clone()
        })
    }

    fn with_selected(&self, file: FileDescriptor) -> Self {
        Self {
            selected_file: Some(file),
            progress: 0,
            accepted_files: self.accepted_files + 1,
            revision: self.revision + 1,
            ..self.clone()
        }
    }

    fn with_progress_step(&self, step: u8) -> Self {
        Self {
            progress: self.progress.saturating_add(step).min(PROGRESS_DONE),
            revision: self.revision + 1,
            ..self.clone()
        }
    }
}

/// Why a candidate file was not accepted. Never shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The file is not a PDF.
    NotPdf { mime_type: String },
    /// The event carried no file.
    NoFile,
    /// The owning page session was torn down.
    Disposed,
}

impl IgnoreReason {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotPdf { .. } => "not_pdf",
            Self::NoFile => "no_file",
            Self::Disposed => "disposed",
        }
    }
}

/// Result of handing a file to the control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Accepted(FileDescriptor),
    Ignored(IgnoreReason),
}

impl UploadOutcome {
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }
}

/// Callback through which the control reports an accepted file upward.
pub type FileSelectListener = Arc<dyn Fn(&FileDescriptor) + Send + Sync>;

/// Owns the upload state of one page session.
#[derive(Clone)]
pub struct UploadControl {
    inner: Arc<ControlInner>,
}

struct ControlInner {
    state: Arc<StateCell<UploadState>>,
    scope: TaskScope,
    sink: Arc<dyn UploadSink>,
    config: UploadConfig,
    on_select: FileSelectListener,
}

impl fmt::Debug for UploadControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadControl")
            .field("state", &self.inner.state.get())
            .field("sink", &self.inner.sink)
            .finish_non_exhaustive()
    }
}

impl UploadControl {
    #[must_use]
    pub fn new(
        config: UploadConfig,
        sink: Arc<dyn UploadSink>,
        scope: &TaskScope,
        on_select: FileSelectListener,
    ) -> Self {
        Self {
            inner: Arc::new(ControlInner {
                state: Arc::new(StateCell::new(UploadState::default(), scope)),
                scope: scope.clone(),
                sink,
                config,
                on_select,
            }),
        }
    }

    /// Largest file the server accepts, in bytes.
    #[must_use]
    pub fn max_file_size(&self) -> usize {
        self.inner.config.max_file_size
    }

    #[must_use]
    pub fn snapshot(&self) -> Arc<UploadState> {
        self.inner.state.get()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Arc<UploadState>> {
        self.inner.state.subscribe()
    }

    /// `dragover`: highlight the drop zone.
    pub fn drag_over(&self) {
        self.inner.state.update(|s| s.with_dragging(true));
    }

    /// `dragleave`: clear the highlight.
    pub fn drag_leave(&self) {
        self.inner.state.update(|s| s.with_dragging(false));
    }

    /// `drop`: clear the highlight and consider the first file only.
    pub fn drop_files(&self, files: Vec<CandidateFile>) -> UploadOutcome {
        self.inner.state.update(|s| s.with_dragging(false));

        let discarded = files.len().saturating_sub(1);
        if discarded > 0 {
            tracing::debug!(discarded, "Extra dropped files discarded");
        }
        match files.into_iter().next() {
            Some(file) => self.accept(file),
            None => UploadOutcome::Ignored(IgnoreReason::NoFile),
        }
    }

    /// File picker selection.
    pub fn pick(&self, file: CandidateFile) -> UploadOutcome {
        self.accept(file)
    }

    pub(crate) fn seal(&self) {
        self.inner.state.seal();
    }

    fn accept(&self, file: CandidateFile) -> UploadOutcome {
        let descriptor = file.descriptor().clone();
        if !descriptor.is_pdf() {
            // Invalid types are dropped without feedback. Known gap, kept as is.
            tracing::info!(
                name: "upload.ignored",
                file = %descriptor.name(),
                mime_type = %descriptor.mime_type(),
                "Ignored non-PDF file"
            );
            return UploadOutcome::Ignored(IgnoreReason::NotPdf {
                mime_type: descriptor.mime_type().to_string(),
            });
        }

        let Some(state) = self
            .inner
            .state
            .update(|s| Some(s.with_selected(descriptor.clone())))
        else {
            return UploadOutcome::Ignored(IgnoreReason::Disposed);
        };

        tracing::info!(
            name: "upload.accepted",
            file = %descriptor.name(),
            size = descriptor.size(),
            "Accepted PDF"
        );

        (self.inner.on_select)(&descriptor);
        self.start_progress(state.accepted_files());
        fire_and_forget(&self.inner.sink, file);

        UploadOutcome::Accepted(descriptor)
    }

    /// Tick the simulated progress for upload number `run` until it hits 100.
    ///
    /// A newer accepted file bumps the run number, which stops older tickers
    /// on their next tick.
    fn start_progress(&self, run: u64) {
        let state = Arc::clone(&self.inner.state);
        let step = self.inner.config.progress_step;
        self.inner
            .scope
            .schedule_every(self.inner.config.progress_interval(), move || {
                let mut finished = true;
                state.update(|s| {
                    if s.accepted_files() != run || s.progress() >= PROGRESS_DONE {
                        return None;
                    }
                    let next = s.with_progress_step(step);
                    finished = next.progress() >= PROGRESS_DONE;
                    Some(next)
                });
                if finished {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upload::sink::DisabledSink;
    use axum::body::Bytes;
    use std::sync::Mutex;
    use std::time::Duration;

    fn control() -> (UploadControl, Arc<Mutex<Vec<String>>>, TaskScope) {
        let scope = TaskScope::new();
        let selected = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&selected);
        let control = UploadControl::new(
            UploadConfig::default(),
            Arc::new(DisabledSink),
            &scope,
            Arc::new(move |d: &FileDescriptor| seen.lock().unwrap().push(d.name().to_string())),
        );
        (control, selected, scope)
    }

    fn pdf(name: &str) -> CandidateFile {
        CandidateFile::new(name, Some("application/pdf"), Bytes::from_static(b"%PDF-1.7"))
    }

    #[tokio::test(start_paused = true)]
    async fn test_progress_reaches_100_in_fixed_steps() {
        let (control, selected, _scope) = control();
        let mut rx = control.subscribe();
        rx.borrow_and_update();

        assert!(control.pick(pdf("report.pdf")).is_accepted());
        assert_eq!(control.snapshot().progress(), 0);
        assert_eq!(*selected.lock().unwrap(), vec!["report.pdf".to_string()]);

        let mut seen = vec![];
        while rx.changed().await.is_ok() {
            let progress = rx.borrow_and_update().progress();
            seen.push(progress);
            if progress == PROGRESS_DONE {
                break;
            }
        }
        assert_eq!(seen.first(), Some(&0));
        assert_eq!(&seen[1..], &[10, 20, 30, 40, 50, 60, 70, 80, 90, 100]);

        tokio::time::sleep(Duration::from_secs(2)).await;
        let snap = control.snapshot();
        assert_eq!(snap.progress(), 100);
        assert!(snap.is_complete());
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_pdf_is_ignored() {
        let (control, selected, scope) = control();
        let png = CandidateFile::new("image.png", Some("image/png"), Bytes::new());

        let outcome = control.drop_files(vec![png]);
        assert_eq!(
            outcome,
            UploadOutcome::Ignored(IgnoreReason::NotPdf {
                mime_type: "image/png".to_string()
            })
        );
        assert!(control.snapshot().selected_file().is_none());
        assert!(selected.lock().unwrap().is_empty());
        assert_eq!(scope.pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drag_state() {
        let (control, _selected, _scope) = control();
        control.drag_over();
        assert!(control.snapshot().is_dragging());
        let revision = control.snapshot().revision();
        control.drag_over();
        assert_eq!(control.snapshot().revision(), revision);

        control.drag_leave();
        assert!(!control.snapshot().is_dragging());

        control.drag_over();
        control.drop_files(vec![CandidateFile::new("a.txt", None, Bytes::new())]);
        assert!(!control.snapshot().is_dragging());
    }

    #[tokio::test(start_paused = true)]
    async fn test_only_first_dropped_file_counts() {
        let (control, selected, _scope) = control();
        let outcome = control.drop_files(vec![pdf("one.pdf"), pdf("two.pdf")]);
        assert!(outcome.is_accepted());
        assert_eq!(*selected.lock().unwrap(), vec!["one.pdf".to_string()]);
        assert_eq!(control.snapshot().accepted_files(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_file_restarts_progress() {
        let (control, _selected, _scope) = control();
        control.pick(pdf("first.pdf"));
        tokio::time::sleep(Duration::from_millis(550)).await;
        assert_eq!(control.snapshot().progress(), 50);

        control.pick(pdf("second.pdf"));
        let snap = control.snapshot();
        assert_eq!(snap.progress(), 0);
        assert_eq!(snap.selected_file().unwrap().name(), "second.pdf");

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(control.snapshot().progress(), 10);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(control.snapshot().progress(), 100);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispose_freezes_progress() {
        let (control, _selected, scope) = control();
        control.pick(pdf("report.pdf"));
        tokio::time::sleep(Duration::from_millis(350)).await;

        scope.dispose();
        control.seal();
        let frozen = control.snapshot();

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(control.snapshot(), frozen);
        assert_eq!(frozen.progress(), 30);
        assert_eq!(
            control.pick(pdf("late.pdf")),
            UploadOutcome::Ignored(IgnoreReason::Disposed)
        );
    }
}
