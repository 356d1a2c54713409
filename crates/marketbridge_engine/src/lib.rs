//! MarketBridge engine: the analysis-service client and the background
//! runtime that executes it.
mod client;
mod engine;
mod insights;
mod types;

pub use client::{
    endpoint_url, AnalysisClient, AnalysisSettings, ReqwestAnalysisClient, RUN_CAMPAIGN_PATH,
    SENTIMENT_PATH, WHAT_IF_PATH,
};
pub use engine::EngineHandle;
pub use insights::{
    KeywordTrend, Scenario, SentimentReport, SentimentRequest, SentimentResponse,
    SentimentSummary, TrendSummary, WhatIfRequest, WhatIfResponse,
};
pub use types::{
    AnalysisError, AnalysisRequest, AnalysisResponse, EngineEvent, FailureKind, ServiceResponse,
    StageTexts, SubmissionId,
};
