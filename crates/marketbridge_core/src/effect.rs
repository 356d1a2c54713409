#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Issue the submission's one and only analysis request.
    RequestAnalysis {
        submission_id: crate::SubmissionId,
        query: String,
        product: String,
    },
}
