use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::insights::{Scenario, SentimentReport};

pub type SubmissionId = u64;

/// Raw per-stage texts keyed by the service's stage names.
pub type StageTexts = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisRequest {
    pub query: String,
    pub product: String,
}

/// Envelope the service wraps its payloads in: `{success, data, error}`.
///
/// Missing `data` or `error` fields read as `None`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServiceResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

/// Body of a `run_campaign` response.
pub type AnalysisResponse = ServiceResponse<StageTexts>;

impl<T> ServiceResponse<T> {
    /// Unwraps the payload. A `success: false` body becomes an application
    /// failure carrying the service's message, or `fallback` when it sent
    /// none.
    pub fn into_result_or(self, fallback: &str) -> Result<T, AnalysisError> {
        if !self.success {
            let message = self
                .error
                .filter(|message| !message.trim().is_empty())
                .unwrap_or_else(|| fallback.to_string());
            return Err(AnalysisError::new(FailureKind::Application, message));
        }
        self.data.ok_or_else(|| {
            AnalysisError::new(FailureKind::InvalidResponse, "success response without data")
        })
    }
}

impl AnalysisResponse {
    pub fn into_result(self) -> Result<StageTexts, AnalysisError> {
        self.into_result_or("Campaign failed")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    AnalysisCompleted {
        submission_id: SubmissionId,
        result: Result<StageTexts, AnalysisError>,
    },
    ScenariosReady {
        result: Result<Vec<Scenario>, AnalysisError>,
    },
    SentimentReady {
        result: Result<SentimentReport, AnalysisError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct AnalysisError {
    pub kind: FailureKind,
    pub message: String,
}

impl AnalysisError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// True when the service answered and reported the failure itself.
    pub fn is_application(&self) -> bool {
        self.kind == FailureKind::Application
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FailureKind {
    #[error("invalid endpoint")]
    InvalidEndpoint,
    #[error("http status {0}")]
    HttpStatus(u16),
    #[error("timeout")]
    Timeout,
    #[error("invalid response")]
    InvalidResponse,
    #[error("analysis failed")]
    Application,
    #[error("network error")]
    Network,
}

#[cfg(test)]
mod tests {
    use super::{AnalysisResponse, FailureKind};

    #[test]
    fn failure_without_message_gets_default() {
        let response: AnalysisResponse =
            serde_json::from_str(r#"{"success": false, "error": ""}"#).unwrap();
        let err = response.into_result().unwrap_err();
        assert_eq!(err.kind, FailureKind::Application);
        assert_eq!(err.message, "Campaign failed");
    }

    #[test]
    fn success_without_data_is_invalid() {
        let response: AnalysisResponse = serde_json::from_str(r#"{"success": true}"#).unwrap();
        assert_eq!(
            response.into_result().unwrap_err().kind,
            FailureKind::InvalidResponse
        );
    }

    #[test]
    fn error_display_includes_kind() {
        let response: AnalysisResponse =
            serde_json::from_str(r#"{"success": false, "error": "quota exceeded"}"#).unwrap();
        let err = response.into_result().unwrap_err();
        assert_eq!(err.to_string(), "analysis failed: quota exceeded");
    }
}
