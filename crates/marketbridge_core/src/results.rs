use std::collections::{BTreeMap, BTreeSet};

use marketbridge_logging::bridge_debug;

use crate::packet::{SubmissionFailure, SubmissionId, TransferPacket};
use crate::parser::{parse_blocks, ContentBlock};
use crate::progress::ProgressState;
use crate::stage::{StageName, StageResult, FINAL_PLAN_KEY};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResultsPhase {
    #[default]
    Empty,
    Loading,
    Completed,
    Failed,
}

/// The analysis page: sole reader of transfer packets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultsView {
    mounted: bool,
    phase: ResultsPhase,
    submission: Option<SubmissionId>,
    query: String,
    product: String,
    stages: Vec<StageResult>,
    final_plan: Option<String>,
    failure: Option<SubmissionFailure>,
    expanded: BTreeSet<StageName>,
    parsed: BTreeMap<StageName, Vec<ContentBlock>>,
}

impl Default for ResultsView {
    fn default() -> Self {
        Self {
            mounted: false,
            phase: ResultsPhase::Empty,
            submission: None,
            query: String::new(),
            product: String::new(),
            stages: StageName::ALL.into_iter().map(StageResult::pending).collect(),
            final_plan: None,
            failure: None,
            expanded: BTreeSet::new(),
            parsed: BTreeMap::new(),
        }
    }
}

impl ResultsView {
    /// Takes ownership of a packet. A loading packet mounts and resets the
    /// page for a new submission; a settled packet applies results or the
    /// failure. Returns whether the page changed.
    ///
    /// Settled packets are dropped once the page has been closed.
    pub fn receive(&mut self, packet: TransferPacket) -> bool {
        if packet.is_loading {
            *self = Self {
                mounted: true,
                phase: ResultsPhase::Loading,
                submission: Some(packet.submission_id),
                query: packet.query,
                product: packet.product,
                ..Self::default()
            };
            return true;
        }

        if !self.mounted {
            bridge_debug!(
                "results packet for {:?} arrived after the page closed",
                packet.submission_id
            );
            return false;
        }

        if self.submission != Some(packet.submission_id) {
            bridge_debug!(
                "results packet for {:?} does not match page {:?}",
                packet.submission_id,
                self.submission
            );
            return false;
        }

        if let Some(failure) = packet.error {
            for stage in &mut self.stages {
                stage.fail();
            }
            self.failure = Some(failure);
            self.phase = ResultsPhase::Failed;
            return true;
        }

        let texts = packet.results.unwrap_or_default();
        for stage in &mut self.stages {
            let text = texts.get(stage.name.wire_key()).or_else(|| {
                stage
                    .name
                    .fallback_key()
                    .and_then(|key| texts.get(key))
            });
            match text {
                Some(text) => {
                    stage.complete(text.clone());
                }
                None => {
                    stage.fail();
                }
            }
        }
        self.final_plan = texts.get(FINAL_PLAN_KEY).cloned();
        self.phase = ResultsPhase::Completed;
        true
    }

    /// Marks every stage up to the simulated current one as running.
    pub fn apply_progress(&mut self, progress: ProgressState) -> bool {
        let mut changed = false;
        for stage in self
            .stages
            .iter_mut()
            .take(progress.current_stage_index + 1)
        {
            changed |= stage.mark_running();
        }
        changed
    }

    /// Expands or collapses a card. Only cards with results can expand; the
    /// stage text is parsed the first time its card opens.
    pub fn toggle(&mut self, name: StageName) -> bool {
        if self.expanded.remove(&name) {
            return true;
        }
        if !self.parsed.contains_key(&name) {
            let Some(text) = self
                .stage(name)
                .filter(|stage| stage.has_results())
                .and_then(|stage| stage.raw_text.as_deref())
            else {
                return false;
            };
            let blocks = parse_blocks(text);
            self.parsed.insert(name, blocks);
        }
        self.expanded.insert(name);
        true
    }

    pub fn close(&mut self) {
        self.mounted = false;
        self.expanded.clear();
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn phase(&self) -> ResultsPhase {
        self.phase
    }

    pub fn submission(&self) -> Option<SubmissionId> {
        self.submission
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn product(&self) -> &str {
        &self.product
    }

    pub fn stages(&self) -> &[StageResult] {
        &self.stages
    }

    pub fn stage(&self, name: StageName) -> Option<&StageResult> {
        self.stages.iter().find(|stage| stage.name == name)
    }

    pub fn final_plan(&self) -> Option<&str> {
        self.final_plan.as_deref()
    }

    pub fn failure(&self) -> Option<&SubmissionFailure> {
        self.failure.as_ref()
    }

    pub fn is_expanded(&self, name: StageName) -> bool {
        self.expanded.contains(&name)
    }

    /// Parsed blocks of an expanded card.
    pub fn blocks(&self, name: StageName) -> Option<&[ContentBlock]> {
        if !self.is_expanded(name) {
            return None;
        }
        self.parsed.get(&name).map(Vec::as_slice)
    }
}
