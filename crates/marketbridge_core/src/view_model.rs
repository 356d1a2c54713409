use crate::parser::ContentBlock;
use crate::plan::{summarize_plan, PlanSummary};
use crate::results::ResultsPhase;
use crate::stage::{StageName, StageStatus};
use crate::AppState;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub query: String,
    pub product: String,
    pub form_error: Option<String>,
    pub phase: ResultsPhase,
    pub headline: String,
    pub progress: Option<ProgressView>,
    pub cards: Vec<StageCardView>,
    pub failure: Option<String>,
    pub plan: Option<PlanSummary>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressView {
    pub percent: u8,
    pub stage: StageName,
    pub status_line: String,
    pub finished: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageCardView {
    pub stage: StageName,
    pub label: &'static str,
    pub glyph: &'static str,
    pub status: StageStatus,
    pub has_results: bool,
    pub expanded: bool,
    pub blocks: Vec<ContentBlock>,
}

pub(crate) fn build(state: &AppState, dirty: bool) -> AppViewModel {
    let results = &state.results;
    let phase = results.phase();

    let headline = match phase {
        ResultsPhase::Empty => String::new(),
        ResultsPhase::Loading => format!(
            "Analyzing \"{}\" for {}",
            results.query(),
            results.product()
        ),
        ResultsPhase::Completed => format!(
            "Campaign analysis completed for \"{}\" targeting \"{}\"",
            results.query(),
            results.product()
        ),
        ResultsPhase::Failed => format!(
            "Campaign analysis failed for \"{}\"",
            results.query()
        ),
    };

    let progress = state
        .progress
        .state()
        .filter(|_| results.is_mounted())
        .map(|progress| {
            let stage = StageName::from_index(progress.current_stage_index)
                .unwrap_or(StageName::Lead);
            let finished = state.progress.is_finished();
            let status_line = match phase {
                ResultsPhase::Failed => "Campaign failed".to_string(),
                ResultsPhase::Completed if finished => "Campaign analysis complete!".to_string(),
                _ => format!("Running {}...", stage.label()),
            };
            ProgressView {
                percent: progress.percent_complete,
                stage,
                status_line,
                finished,
            }
        });

    let cards = results
        .stages()
        .iter()
        .map(|stage| StageCardView {
            stage: stage.name,
            label: stage.name.label(),
            glyph: stage.name.glyph(),
            status: stage.status,
            has_results: stage.has_results(),
            expanded: results.is_expanded(stage.name),
            blocks: results
                .blocks(stage.name)
                .map(<[ContentBlock]>::to_vec)
                .unwrap_or_default(),
        })
        .collect();

    AppViewModel {
        query: state.query.clone(),
        product: state.product.clone(),
        form_error: state.form_error.map(|err| err.to_string()),
        phase,
        headline,
        progress,
        cards,
        failure: results.failure().map(ToString::to_string),
        plan: results.final_plan().map(summarize_plan),
        dirty,
    }
}
