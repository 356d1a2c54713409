use std::time::Duration;

use crate::coordinator::{SubmissionCoordinator, SubmissionError};
use crate::progress::{PacingConfig, ProgressOrchestrator};
use crate::results::ResultsView;
use crate::view_model::{self, AppViewModel};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    pub(crate) query: String,
    pub(crate) product: String,
    pub(crate) form_error: Option<SubmissionError>,
    pub(crate) now: Duration,
    pub(crate) coordinator: SubmissionCoordinator,
    pub(crate) progress: ProgressOrchestrator,
    pub(crate) results: ResultsView,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pacing(pacing: PacingConfig) -> Self {
        Self {
            progress: ProgressOrchestrator::new(pacing),
            ..Self::default()
        }
    }

    pub fn view(&self) -> AppViewModel {
        view_model::build(self, self.dirty)
    }

    pub fn results(&self) -> &ResultsView {
        &self.results
    }

    pub fn progress(&self) -> &ProgressOrchestrator {
        &self.progress
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    /// True when nothing is left to wait for: the submission settled and the
    /// simulated run reached its end or was abandoned.
    pub fn is_settled(&self) -> bool {
        self.coordinator.in_flight().is_none() && !self.progress.is_running()
    }

    /// Returns whether a render is due and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}
