use marketbridge_logging::{bridge_debug, bridge_info};
use thiserror::Error;

use crate::packet::{AnalysisOutcome, SubmissionId, TransferPacket};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmissionError {
    #[error("Please fill in all required fields.")]
    MissingFields,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct InFlight {
    id: SubmissionId,
    query: String,
    product: String,
}

/// Sole writer of [`TransferPacket`]s: one loading packet when a submission
/// starts, one settled packet when its request finishes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubmissionCoordinator {
    last_id: u64,
    in_flight: Option<InFlight>,
}

impl SubmissionCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates the inputs and opens a new submission, superseding any
    /// submission still waiting for its response.
    pub fn submit(&mut self, query: &str, product: &str) -> Result<TransferPacket, SubmissionError> {
        let query = query.trim();
        let product = product.trim();
        if query.is_empty() || product.is_empty() {
            return Err(SubmissionError::MissingFields);
        }

        if let Some(previous) = self.in_flight.take() {
            bridge_debug!("submission {:?} superseded before settling", previous.id);
        }

        self.last_id += 1;
        let id = SubmissionId(self.last_id);
        self.in_flight = Some(InFlight {
            id,
            query: query.to_string(),
            product: product.to_string(),
        });
        bridge_info!("submission {:?} started for product_len={}", id, product.len());

        Ok(TransferPacket {
            submission_id: id,
            query: query.to_string(),
            product: product.to_string(),
            is_loading: true,
            results: None,
            error: None,
        })
    }

    /// Closes the submission `id` with its outcome. Returns `None` for a
    /// superseded or already settled submission.
    pub fn settle(&mut self, id: SubmissionId, outcome: AnalysisOutcome) -> Option<TransferPacket> {
        if self.in_flight.as_ref().map(|s| s.id) != Some(id) {
            bridge_debug!("ignoring stale settlement for {:?}", id);
            return None;
        }
        let submission = self.in_flight.take()?;

        let (results, error) = match outcome {
            Ok(texts) => (Some(texts), None),
            Err(failure) => (None, Some(failure)),
        };

        Some(TransferPacket {
            submission_id: submission.id,
            query: submission.query,
            product: submission.product,
            is_loading: false,
            results,
            error,
        })
    }

    pub fn in_flight(&self) -> Option<SubmissionId> {
        self.in_flight.as_ref().map(|s| s.id)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::{SubmissionCoordinator, SubmissionError};
    use crate::packet::{SubmissionFailure, SubmissionId};

    #[test]
    fn blank_fields_are_rejected() {
        let mut coordinator = SubmissionCoordinator::new();
        assert_eq!(
            coordinator.submit("  ", "Sneakers"),
            Err(SubmissionError::MissingFields)
        );
        assert_eq!(
            coordinator.submit("Summer launch", "\n"),
            Err(SubmissionError::MissingFields)
        );
        assert_eq!(coordinator.in_flight(), None);
    }

    #[test]
    fn settles_exactly_once() {
        let mut coordinator = SubmissionCoordinator::new();
        let packet = coordinator.submit(" Summer launch ", "Sneakers").unwrap();
        assert!(packet.is_loading);
        assert_eq!(packet.query, "Summer launch");

        let settled = coordinator
            .settle(packet.submission_id, Ok(BTreeMap::new()))
            .unwrap();
        assert!(!settled.is_loading);
        assert_eq!(settled.results, Some(BTreeMap::new()));

        let again = coordinator.settle(
            packet.submission_id,
            Err(SubmissionFailure::Network("late".into())),
        );
        assert_eq!(again, None);
    }

    #[test]
    fn superseded_submission_cannot_settle() {
        let mut coordinator = SubmissionCoordinator::new();
        let first = coordinator.submit("a", "b").unwrap();
        let second = coordinator.submit("c", "d").unwrap();
        assert_eq!(second.submission_id, SubmissionId(2));

        assert_eq!(coordinator.settle(first.submission_id, Ok(BTreeMap::new())), None);
        assert!(coordinator
            .settle(second.submission_id, Ok(BTreeMap::new()))
            .is_some());
    }
}
