use std::sync::{mpsc, Arc};
use std::thread;

use marketbridge_logging::bridge_error;

use crate::client::{AnalysisClient, AnalysisSettings, ReqwestAnalysisClient};
use crate::{
    AnalysisError, AnalysisRequest, EngineEvent, FailureKind, SentimentRequest, SubmissionId,
    WhatIfRequest,
};

enum EngineCommand {
    Analyze {
        submission_id: SubmissionId,
        request: AnalysisRequest,
    },
    WhatIf(WhatIfRequest),
    Sentiment(SentimentRequest),
}

/// Runs analysis requests on a background tokio runtime and hands results
/// back through a channel the dispatch loop polls.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(settings: AnalysisSettings) -> Self {
        Self::with_client(Arc::new(ReqwestAnalysisClient::new(settings)))
    }

    pub fn with_client(client: Arc<dyn AnalysisClient>) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime,
                Err(err) => {
                    bridge_error!("engine runtime failed to start: {}", err);
                    reject_all(cmd_rx, event_tx, err.to_string());
                    return;
                }
            };
            while let Ok(command) = cmd_rx.recv() {
                let client = client.clone();
                let event_tx = event_tx.clone();
                runtime.spawn(async move {
                    handle_command(client.as_ref(), command, event_tx).await;
                });
            }
        });

        Self { cmd_tx, event_rx }
    }

    pub fn analyze(
        &self,
        submission_id: SubmissionId,
        query: impl Into<String>,
        product: impl Into<String>,
    ) {
        let _ = self.cmd_tx.send(EngineCommand::Analyze {
            submission_id,
            request: AnalysisRequest {
                query: query.into(),
                product: product.into(),
            },
        });
    }

    pub fn what_if(&self, request: WhatIfRequest) {
        let _ = self.cmd_tx.send(EngineCommand::WhatIf(request));
    }

    pub fn sentiment(&self, request: SentimentRequest) {
        let _ = self.cmd_tx.send(EngineCommand::Sentiment(request));
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Blocks until the next event. `None` once the engine thread is gone.
    pub fn recv(&self) -> Option<EngineEvent> {
        self.event_rx.recv().ok()
    }
}

async fn handle_command(
    client: &dyn AnalysisClient,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    match command {
        EngineCommand::Analyze {
            submission_id,
            request,
        } => {
            let result = client.analyze(&request).await;
            let _ = event_tx.send(EngineEvent::AnalysisCompleted {
                submission_id,
                result,
            });
        }
        EngineCommand::WhatIf(request) => {
            let result = client.what_if(&request).await;
            let _ = event_tx.send(EngineEvent::ScenariosReady { result });
        }
        EngineCommand::Sentiment(request) => {
            let result = client.sentiment(&request).await;
            let _ = event_tx.send(EngineEvent::SentimentReady { result });
        }
    }
}

// Without a runtime every request still settles, as a network failure.
fn reject_all(
    cmd_rx: mpsc::Receiver<EngineCommand>,
    event_tx: mpsc::Sender<EngineEvent>,
    reason: String,
) {
    while let Ok(command) = cmd_rx.recv() {
        let err = AnalysisError::new(FailureKind::Network, reason.clone());
        let event = match command {
            EngineCommand::Analyze { submission_id, .. } => EngineEvent::AnalysisCompleted {
                submission_id,
                result: Err(err),
            },
            EngineCommand::WhatIf(_) => EngineEvent::ScenariosReady { result: Err(err) },
            EngineCommand::Sentiment(_) => EngineEvent::SentimentReady { result: Err(err) },
        };
        let _ = event_tx.send(event);
    }
}
