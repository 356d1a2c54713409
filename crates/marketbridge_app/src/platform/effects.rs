use marketbridge_core::{Effect, Msg, SubmissionFailure, SubmissionId};
use marketbridge_engine::{AnalysisError, AnalysisSettings, EngineEvent, EngineHandle};
use marketbridge_logging::{bridge_debug, bridge_info, bridge_warn};

/// Executes effects against the engine and turns engine events back into
/// messages for the dispatch loop.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(settings: AnalysisSettings) -> Self {
        Self {
            engine: EngineHandle::new(settings),
        }
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::RequestAnalysis {
                    submission_id,
                    query,
                    product,
                } => {
                    bridge_info!(
                        "RequestAnalysis submission={} query_len={} product_len={}",
                        submission_id.0,
                        query.len(),
                        product.len()
                    );
                    self.engine.analyze(submission_id.0, query, product);
                }
            }
        }
    }

    /// Drains every engine event that has arrived since the last poll.
    pub fn poll(&self) -> Vec<Msg> {
        std::iter::from_fn(|| self.engine.try_recv())
            .filter_map(map_event)
            .collect()
    }
}

/// Only campaign results feed the state machine.
fn map_event(event: EngineEvent) -> Option<Msg> {
    match event {
        EngineEvent::AnalysisCompleted {
            submission_id,
            result,
        } => Some(Msg::AnalysisSettled {
            submission_id: SubmissionId(submission_id),
            outcome: result.map_err(|err| {
                bridge_warn!("Submission {} failed: {}", submission_id, err);
                map_failure(err)
            }),
        }),
        other => {
            bridge_debug!("ignoring engine event outside the campaign flow: {:?}", other);
            None
        }
    }
}

fn map_failure(err: AnalysisError) -> SubmissionFailure {
    if err.is_application() {
        SubmissionFailure::Application(err.message)
    } else {
        SubmissionFailure::Network(err.to_string())
    }
}
