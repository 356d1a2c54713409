//! Wire types for the two auxiliary endpoints: what-if scenario generation
//! and sentiment/trend analysis.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{AnalysisError, FailureKind, ServiceResponse};

/// Campaign parameters fed to the scenario generator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WhatIfRequest {
    /// Discount in percent.
    pub discount: f64,
    /// Campaign length in days.
    pub duration: u32,
    pub target_size: u32,
    /// Budget in dollars.
    pub budget: u32,
}

impl Default for WhatIfRequest {
    fn default() -> Self {
        Self {
            discount: 20.0,
            duration: 30,
            target_size: 5_000,
            budget: 50_000,
        }
    }
}

/// One projected outcome, e.g. the "Balanced" strategy.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub discount: f64,
    /// Projected ROI in percent.
    pub roi: f64,
    /// Preformatted by the service, e.g. `"70%"`.
    pub probability: String,
    pub conversion_rate: f64,
    pub risk_level: String,
}

/// Body of an `api/what_if` response. Unlike the other endpoints it is not
/// wrapped in the `{success, data}` envelope on success.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WhatIfResponse {
    pub scenarios: Option<Vec<Scenario>>,
    pub error: Option<String>,
}

impl WhatIfResponse {
    pub fn into_result(self) -> Result<Vec<Scenario>, AnalysisError> {
        if let Some(scenarios) = self.scenarios {
            return Ok(scenarios);
        }
        match self.error.filter(|message| !message.trim().is_empty()) {
            Some(message) => Err(AnalysisError::new(FailureKind::Application, message)),
            None => Err(AnalysisError::new(
                FailureKind::InvalidResponse,
                "response without scenarios",
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SentimentRequest {
    pub product: String,
    pub campaign_text: String,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct SentimentReport {
    pub sentiment_analysis: SentimentSummary,
    pub trend_analysis: TrendSummary,
    pub ai_insights: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct SentimentSummary {
    /// `positive`, `negative` or `neutral`.
    pub overall_sentiment: String,
    /// 0.0 to 1.0.
    pub confidence: f64,
    /// Emotion name to score in 0.0 to 1.0.
    pub emotions: BTreeMap<String, f64>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct TrendSummary {
    pub keywords: Vec<KeywordTrend>,
    /// e.g. `strongly_positive`.
    pub overall_trend: String,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct KeywordTrend {
    pub keyword: String,
    pub trend_score: f64,
    /// Week-over-week volume change in percent.
    pub volume_change: f64,
    pub sentiment_trend: String,
}

/// Body of an `api/sentiment_analysis` response.
pub type SentimentResponse = ServiceResponse<SentimentReport>;

impl SentimentResponse {
    pub fn into_result(self) -> Result<SentimentReport, AnalysisError> {
        self.into_result_or("Analysis failed")
    }
}
