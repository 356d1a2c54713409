use std::collections::BTreeMap;

use thiserror::Error;

/// Raw per-stage texts keyed by the service's stage names.
pub type StageTexts = BTreeMap<String, String>;

/// How a submission's single analysis request settled.
pub type AnalysisOutcome = Result<StageTexts, SubmissionFailure>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubmissionId(pub u64);

/// Terminal failure of a submission. The user has to resubmit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionFailure {
    /// The request never completed.
    #[error("network failure: {0}")]
    Network(String),
    /// The service answered but reported `success: false`.
    #[error("analysis failed: {0}")]
    Application(String),
}

/// One-shot message from the submission coordinator to the results view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferPacket {
    pub submission_id: SubmissionId,
    pub query: String,
    pub product: String,
    pub is_loading: bool,
    pub results: Option<StageTexts>,
    pub error: Option<SubmissionFailure>,
}

impl TransferPacket {
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}
