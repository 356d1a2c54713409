use std::collections::BTreeMap;
use std::sync::Once;
use std::time::Duration;

use marketbridge_core::{
    update, AppState, ContentBlock, Effect, Msg, PlanVerdict, ResultsPhase, StageName,
    StageStatus, StageTexts, SubmissionFailure, SubmissionId,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(marketbridge_logging::initialize_for_tests);
}

fn submit(state: AppState, query: &str, product: &str) -> (AppState, Vec<Effect>) {
    let (state, _) = update(state, Msg::QueryChanged(query.to_string()));
    let (state, _) = update(state, Msg::ProductChanged(product.to_string()));
    update(state, Msg::SubmitClicked)
}

fn tick(state: AppState, ms: u64) -> AppState {
    update(
        state,
        Msg::Tick {
            now: Duration::from_millis(ms),
        },
    )
    .0
}

fn settle(state: AppState, id: u64, outcome: Result<StageTexts, SubmissionFailure>) -> AppState {
    update(
        state,
        Msg::AnalysisSettled {
            submission_id: SubmissionId(id),
            outcome,
        },
    )
    .0
}

fn statuses(state: &AppState) -> Vec<StageStatus> {
    state.view().cards.iter().map(|card| card.status).collect()
}

fn agent_texts() -> StageTexts {
    BTreeMap::from([
        (
            "Creative".to_string(),
            "🎨 CREATIVE STRATEGY\n• Theme: Summer Vibes\n• Reach: 45,000".to_string(),
        ),
        (
            "Finance".to_string(),
            "💰 **FINANCIAL ANALYSIS**\n\nBudget of $15,000 approved.".to_string(),
        ),
        (
            "Inventory".to_string(),
            "📦 **INVENTORY STATUS**\n\nStock sufficient for campaign.".to_string(),
        ),
        (
            "Lead".to_string(),
            "🎯 **LEAD AGENT - COORDINATION**\n\n🟢 APPROVED FOR LAUNCH".to_string(),
        ),
        (
            "Final Plan".to_string(),
            "✅ APPROVED - Summer launch\n\n💰 Budget: $15,000\n📊 Expected ROI: 3.2x in 3-4 months"
                .to_string(),
        ),
    ])
}

#[test]
fn submit_emits_one_request_and_shows_loading() {
    init_logging();
    let (state, effects) = submit(AppState::new(), "Summer launch", "Sneakers");

    assert_eq!(
        effects,
        vec![Effect::RequestAnalysis {
            submission_id: SubmissionId(1),
            query: "Summer launch".to_string(),
            product: "Sneakers".to_string(),
        }]
    );

    let view = state.view();
    assert_eq!(view.phase, ResultsPhase::Loading);
    assert_eq!(view.headline, "Analyzing \"Summer launch\" for Sneakers");
    assert!(view.dirty);
    let progress = view.progress.unwrap();
    assert_eq!(progress.percent, 0);
    assert_eq!(progress.stage, StageName::Creative);
    assert_eq!(progress.status_line, "Running Creative Agent...");
    assert_eq!(
        statuses(&state),
        vec![
            StageStatus::Running,
            StageStatus::Pending,
            StageStatus::Pending,
            StageStatus::Pending,
        ]
    );
}

#[test]
fn blank_fields_block_submission_until_edited() {
    init_logging();
    let (state, effects) = submit(AppState::new(), "   ", "Sneakers");

    assert!(effects.is_empty());
    let view = state.view();
    assert_eq!(
        view.form_error.as_deref(),
        Some("Please fill in all required fields.")
    );
    assert_eq!(view.phase, ResultsPhase::Empty);
    assert!(view.progress.is_none());

    let (state, _) = update(state, Msg::QueryChanged("Summer launch".to_string()));
    assert_eq!(state.view().form_error, None);
}

#[test]
fn stages_start_running_on_the_simulated_schedule() {
    init_logging();
    let (state, _) = submit(AppState::new(), "Summer launch", "Sneakers");

    let state = tick(state, 1_999);
    assert_eq!(statuses(&state)[1], StageStatus::Pending);

    let state = tick(state, 2_000);
    assert_eq!(statuses(&state)[1], StageStatus::Running);

    let state = tick(state, 6_000);
    assert!(statuses(&state)
        .iter()
        .all(|status| *status == StageStatus::Running));
    let progress = state.view().progress.unwrap();
    assert_eq!(progress.percent, 100);
    assert_eq!(progress.stage, StageName::Lead);
    assert!(progress.finished);
}

#[test]
fn results_complete_every_stage_and_never_revert() {
    init_logging();
    let (state, _) = submit(AppState::new(), "Summer launch", "Sneakers");
    let state = tick(state, 500);
    let state = settle(state, 1, Ok(agent_texts()));

    let view = state.view();
    assert_eq!(view.phase, ResultsPhase::Completed);
    assert_eq!(
        view.headline,
        "Campaign analysis completed for \"Summer launch\" targeting \"Sneakers\""
    );
    assert_eq!(view.progress.unwrap().status_line, "Running Creative Agent...");
    assert!(view.cards.iter().all(|card| card.has_results));

    let state = tick(state, 8_000);
    assert!(statuses(&state)
        .iter()
        .all(|status| *status == StageStatus::Completed));
    assert_eq!(
        state.view().progress.unwrap().status_line,
        "Campaign analysis complete!"
    );
    assert!(state.is_settled());

    let plan = state.view().plan.unwrap();
    assert_eq!(plan.verdict, PlanVerdict::ReadyToLaunch);
    assert_eq!(plan.budget, "$15,000");
    assert_eq!(plan.roi, "3.2x");
}

#[test]
fn failed_response_shows_failure_while_progress_finishes() {
    init_logging();
    let (state, _) = submit(AppState::new(), "Summer launch", "Sneakers");
    let state = tick(state, 1_000);
    let state = settle(
        state,
        1,
        Err(SubmissionFailure::Application("quota exceeded".to_string())),
    );

    let view = state.view();
    assert_eq!(view.phase, ResultsPhase::Failed);
    assert_eq!(
        view.failure.as_deref(),
        Some("analysis failed: quota exceeded")
    );
    assert!(view.cards.iter().all(|card| !card.has_results));

    let (state, _) = update(state, Msg::CardToggled(StageName::Creative));
    assert!(!state.view().cards[0].expanded);

    let state = tick(state, 10_000);
    let view = state.view();
    let progress = view.progress.unwrap();
    assert_eq!(progress.percent, 100);
    assert_eq!(progress.status_line, "Campaign failed");
    assert!(view
        .cards
        .iter()
        .all(|card| card.status == StageStatus::Failed && card.blocks.is_empty()));
}

#[test]
fn resubmitting_abandons_the_first_submission() {
    init_logging();
    let (state, _) = submit(AppState::new(), "Summer launch", "Sneakers");
    let state = tick(state, 1_000);
    let first_run = state.progress().active_run();
    assert_eq!(state.view().progress.unwrap().percent, 20);

    let (state, effects) = submit(state, "Winter promo", "Boots");
    assert_eq!(
        effects,
        vec![Effect::RequestAnalysis {
            submission_id: SubmissionId(2),
            query: "Winter promo".to_string(),
            product: "Boots".to_string(),
        }]
    );
    assert_ne!(state.progress().active_run(), first_run);
    assert_eq!(state.view().progress.unwrap().percent, 0);

    // The second run started at 1s, so at 3s it is 2s in.
    let state = tick(state, 3_000);
    let progress = state.view().progress.unwrap();
    assert_eq!(progress.percent, 40);
    assert_eq!(progress.stage, StageName::Finance);

    let state = settle(state, 1, Ok(agent_texts()));
    assert_eq!(state.view().phase, ResultsPhase::Loading);

    let state = settle(state, 2, Ok(agent_texts()));
    let view = state.view();
    assert_eq!(view.phase, ResultsPhase::Completed);
    assert!(view.headline.contains("Winter promo"));
}

#[test]
fn expanding_a_card_parses_its_text() {
    init_logging();
    let (state, _) = submit(AppState::new(), "Summer launch", "Sneakers");
    let state = settle(state, 1, Ok(agent_texts()));
    assert!(state.view().cards[0].blocks.is_empty());

    let (mut state, _) = update(state, Msg::CardToggled(StageName::Creative));
    assert!(state.consume_dirty());
    let card = state.view().cards[0].clone();
    assert!(card.expanded);
    assert_eq!(
        card.blocks,
        vec![
            ContentBlock::Header("🎨 CREATIVE STRATEGY".to_string()),
            ContentBlock::Bullet("Theme: Summer Vibes".to_string()),
            ContentBlock::Bullet("Reach: 45,000".to_string()),
        ]
    );

    let (state, _) = update(state, Msg::CardToggled(StageName::Creative));
    let view = state.view();
    let card = &view.cards[0];
    assert!(!card.expanded);
    assert!(card.blocks.is_empty());
}

#[test]
fn lead_falls_back_to_final_plan_and_missing_stages_fail() {
    init_logging();
    let mut texts = agent_texts();
    texts.remove("Lead");
    texts.remove("Inventory");

    let (state, _) = submit(AppState::new(), "Summer launch", "Sneakers");
    let state = settle(state, 1, Ok(texts));

    let results = state.results();
    let lead = results.stage(StageName::Lead).unwrap();
    assert_eq!(lead.status, StageStatus::Completed);
    assert!(lead.raw_text.as_deref().unwrap().starts_with("✅ APPROVED"));
    assert_eq!(
        results.stage(StageName::Inventory).unwrap().status,
        StageStatus::Failed
    );
}

#[test]
fn closing_the_results_view_cancels_pacing() {
    init_logging();
    let (state, _) = submit(AppState::new(), "Summer launch", "Sneakers");
    let state = tick(state, 1_000);
    let (mut state, _) = update(state, Msg::ResultsClosed);
    assert!(state.consume_dirty());
    assert_eq!(state.progress().active_run(), None);
    assert!(state.view().progress.is_none());

    let mut state = tick(state, 30_000);
    assert!(!state.consume_dirty());
    assert_eq!(statuses(&state)[1], StageStatus::Pending);
    assert!(!state.is_settled());

    let mut state = settle(state, 1, Ok(agent_texts()));
    assert!(state.is_settled());
    assert!(!state.consume_dirty());
    assert!(!state.results().is_mounted());
    assert_eq!(state.results().phase(), ResultsPhase::Loading);
    assert!(state.view().cards.iter().all(|card| !card.has_results));
}

#[test]
fn late_failure_does_not_reopen_a_closed_page() {
    init_logging();
    let (state, _) = submit(AppState::new(), "Summer launch", "Sneakers");
    let (state, _) = update(state, Msg::ResultsClosed);

    let state = settle(
        state,
        1,
        Err(SubmissionFailure::Network("connection reset".to_string())),
    );
    assert!(state.is_settled());
    assert!(!state.results().is_mounted());
    assert_eq!(state.results().failure(), None);
    assert_eq!(state.view().failure, None);

    let (state, effects) = submit(state, "Winter promo", "Boots");
    assert_eq!(effects.len(), 1);
    assert!(state.results().is_mounted());
    assert_eq!(state.results().phase(), ResultsPhase::Loading);
}
