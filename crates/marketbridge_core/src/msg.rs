use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User edited the campaign description.
    QueryChanged(String),
    /// User edited the product field.
    ProductChanged(String),
    /// User submitted the form.
    SubmitClicked,
    /// Virtual clock advanced; `now` is measured from app start.
    Tick { now: Duration },
    /// The analysis request for a submission finished.
    AnalysisSettled {
        submission_id: crate::SubmissionId,
        outcome: crate::AnalysisOutcome,
    },
    /// User clicked a stage card.
    CardToggled(crate::StageName),
    /// User navigated away from the analysis page.
    ResultsClosed,
    /// Fallback for placeholder wiring.
    NoOp,
}
