use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use marketbridge_engine::{
    AnalysisClient, AnalysisError, AnalysisRequest, AnalysisSettings, EngineEvent, EngineHandle,
    FailureKind, Scenario, SentimentReport, SentimentRequest, StageTexts, WhatIfRequest,
};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn next_event(engine: &EngineHandle) -> EngineEvent {
    for _ in 0..250 {
        if let Some(event) = engine.try_recv() {
            return event;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("engine produced no event");
}

#[derive(Default)]
struct CountingClient {
    calls: AtomicUsize,
}

#[async_trait::async_trait]
impl AnalysisClient for CountingClient {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<StageTexts, AnalysisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(BTreeMap::from([(
            "Creative".to_string(),
            format!("🎨 {}", request.product),
        )]))
    }

    async fn what_if(&self, request: &WhatIfRequest) -> Result<Vec<Scenario>, AnalysisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![Scenario {
            name: "Balanced".to_string(),
            discount: request.discount,
            roi: 150.0,
            probability: "70%".to_string(),
            conversion_rate: 3.5,
            risk_level: "Medium".to_string(),
        }])
    }

    async fn sentiment(
        &self,
        request: &SentimentRequest,
    ) -> Result<SentimentReport, AnalysisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut report = SentimentReport::default();
        report.ai_insights.push(format!("{} reads well", request.product));
        Ok(report)
    }
}

#[tokio::test]
async fn engine_reports_each_submission_once() {
    let client = Arc::new(CountingClient::default());
    let engine = EngineHandle::with_client(client.clone());

    engine.analyze(7, "Summer launch", "Sneakers");
    let EngineEvent::AnalysisCompleted {
        submission_id,
        result,
    } = next_event(&engine).await
    else {
        panic!("expected an analysis event");
    };

    assert_eq!(submission_id, 7);
    assert_eq!(result.unwrap()["Creative"], "🎨 Sneakers");
    assert_eq!(client.calls.load(Ordering::SeqCst), 1);

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(engine.try_recv().is_none());
}

#[tokio::test]
async fn engine_runs_requests_against_the_service() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/run_campaign"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "error": "agents unavailable"
        })))
        .mount(&server)
        .await;

    let engine = EngineHandle::new(AnalysisSettings {
        base_url: server.uri(),
        ..AnalysisSettings::default()
    });
    engine.analyze(1, "Winter promo", "Boots");

    let EngineEvent::AnalysisCompleted {
        submission_id,
        result,
    } = next_event(&engine).await
    else {
        panic!("expected an analysis event");
    };
    assert_eq!(submission_id, 1);
    let err = result.unwrap_err();
    assert_eq!(err.kind, FailureKind::Application);
    assert_eq!(err.message, "agents unavailable");
}

#[test]
fn insight_requests_come_back_as_their_own_events() {
    let client = Arc::new(CountingClient::default());
    let engine = EngineHandle::with_client(client.clone());

    engine.what_if(WhatIfRequest {
        discount: 35.0,
        ..WhatIfRequest::default()
    });
    let Some(EngineEvent::ScenariosReady { result }) = engine.recv() else {
        panic!("expected scenarios");
    };
    let scenarios = result.unwrap();
    assert_eq!(scenarios.len(), 1);
    assert_eq!(scenarios[0].discount, 35.0);

    engine.sentiment(SentimentRequest {
        product: "Sneakers".to_string(),
        campaign_text: "Run further this summer".to_string(),
        keywords: vec!["running".to_string()],
    });
    let Some(EngineEvent::SentimentReady { result }) = engine.recv() else {
        panic!("expected a sentiment report");
    };
    assert_eq!(result.unwrap().ai_insights, vec!["Sneakers reads well"]);
    assert_eq!(client.calls.load(Ordering::SeqCst), 2);
}
