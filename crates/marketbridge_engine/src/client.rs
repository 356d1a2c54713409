use std::time::Duration;

use marketbridge_logging::{bridge_info, bridge_warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::{
    AnalysisError, AnalysisRequest, AnalysisResponse, FailureKind, Scenario, SentimentReport,
    SentimentRequest, SentimentResponse, StageTexts, WhatIfRequest, WhatIfResponse,
};

pub const RUN_CAMPAIGN_PATH: &str = "run_campaign";
pub const WHAT_IF_PATH: &str = "api/what_if";
pub const SENTIMENT_PATH: &str = "api/sentiment_analysis";

#[derive(Debug, Clone)]
pub struct AnalysisSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            connect_timeout: Duration::from_secs(10),
            // Four model calls run back to back on the service side.
            request_timeout: Duration::from_secs(120),
        }
    }
}

/// Calls into the analysis service.
///
/// Implementations make exactly one attempt per call; there is no retry.
#[async_trait::async_trait]
pub trait AnalysisClient: Send + Sync {
    /// Runs the four agents over one campaign description.
    async fn analyze(&self, request: &AnalysisRequest) -> Result<StageTexts, AnalysisError>;

    /// Projects outcomes for a set of campaign parameters.
    async fn what_if(&self, request: &WhatIfRequest) -> Result<Vec<Scenario>, AnalysisError>;

    async fn sentiment(&self, request: &SentimentRequest)
        -> Result<SentimentReport, AnalysisError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestAnalysisClient {
    settings: AnalysisSettings,
}

impl ReqwestAnalysisClient {
    pub fn new(settings: AnalysisSettings) -> Self {
        Self { settings }
    }

    fn build_client(&self) -> Result<reqwest::Client, AnalysisError> {
        reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .timeout(self.settings.request_timeout)
            .build()
            .map_err(|err| AnalysisError::new(FailureKind::Network, err.to_string()))
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, AnalysisError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let endpoint = endpoint_url(&self.settings.base_url, path)?;
        let client = self.build_client()?;

        let response = client
            .post(endpoint)
            .json(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            bridge_warn!("analysis service answered {} on {}", status, path);
            return Err(AnalysisError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        response.json().await.map_err(|err| {
            if err.is_decode() {
                AnalysisError::new(FailureKind::InvalidResponse, err.to_string())
            } else {
                map_reqwest_error(err)
            }
        })
    }
}

#[async_trait::async_trait]
impl AnalysisClient for ReqwestAnalysisClient {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<StageTexts, AnalysisError> {
        bridge_info!(
            "POST {} query_len={} product_len={}",
            RUN_CAMPAIGN_PATH,
            request.query.len(),
            request.product.len()
        );
        let body: AnalysisResponse = self.post_json(RUN_CAMPAIGN_PATH, request).await?;

        let result = body.into_result();
        match &result {
            Ok(texts) => bridge_info!("analysis returned {} stage texts", texts.len()),
            Err(err) => bridge_warn!("analysis rejected: {}", err),
        }
        result
    }

    async fn what_if(&self, request: &WhatIfRequest) -> Result<Vec<Scenario>, AnalysisError> {
        bridge_info!(
            "POST {} discount={} duration={} target_size={} budget={}",
            WHAT_IF_PATH,
            request.discount,
            request.duration,
            request.target_size,
            request.budget
        );
        let body: WhatIfResponse = self.post_json(WHAT_IF_PATH, request).await?;
        body.into_result()
    }

    async fn sentiment(
        &self,
        request: &SentimentRequest,
    ) -> Result<SentimentReport, AnalysisError> {
        bridge_info!(
            "POST {} text_len={} keywords={}",
            SENTIMENT_PATH,
            request.campaign_text.len(),
            request.keywords.len()
        );
        let body: SentimentResponse = self.post_json(SENTIMENT_PATH, request).await?;
        body.into_result()
    }
}

/// Resolves `path` under the configured base URL, keeping any path prefix
/// the base already has.
pub fn endpoint_url(base_url: &str, path: &str) -> Result<Url, AnalysisError> {
    let mut base = Url::parse(base_url.trim())
        .map_err(|err| AnalysisError::new(FailureKind::InvalidEndpoint, err.to_string()))?;
    if !matches!(base.scheme(), "http" | "https") {
        return Err(AnalysisError::new(
            FailureKind::InvalidEndpoint,
            format!("unsupported scheme {}", base.scheme()),
        ));
    }
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(path)
        .map_err(|err| AnalysisError::new(FailureKind::InvalidEndpoint, err.to_string()))
}

fn map_reqwest_error(err: reqwest::Error) -> AnalysisError {
    if err.is_timeout() {
        return AnalysisError::new(FailureKind::Timeout, err.to_string());
    }
    AnalysisError::new(FailureKind::Network, err.to_string())
}
