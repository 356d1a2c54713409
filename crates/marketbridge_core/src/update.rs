use marketbridge_logging::{bridge_debug, bridge_warn};

use crate::{AppState, Effect, Msg, StageName};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::QueryChanged(text) => {
            state.query = text;
            state.form_error = None;
            state.mark_dirty();
            Vec::new()
        }
        Msg::ProductChanged(text) => {
            state.product = text;
            state.form_error = None;
            state.mark_dirty();
            Vec::new()
        }
        Msg::SubmitClicked => {
            let packet = match state.coordinator.submit(&state.query, &state.product) {
                Ok(packet) => packet,
                Err(err) => {
                    bridge_warn!("submission rejected: {}", err);
                    state.form_error = Some(err);
                    state.mark_dirty();
                    return (state, Vec::new());
                }
            };

            let effect = Effect::RequestAnalysis {
                submission_id: packet.submission_id,
                query: packet.query.clone(),
                product: packet.product.clone(),
            };
            let initial = state.progress.start(
                StageName::ALL.into_iter().map(StageName::wire_key),
                state.now,
            );
            state.results.receive(packet);
            state.results.apply_progress(initial.state);
            state.form_error = None;
            state.mark_dirty();
            vec![effect]
        }
        Msg::Tick { now } => {
            state.now = state.now.max(now);
            let updates = state.progress.advance_to(state.now);
            if !updates.is_empty() {
                for update in &updates {
                    state.results.apply_progress(update.state);
                }
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::AnalysisSettled {
            submission_id,
            outcome,
        } => {
            match state.coordinator.settle(submission_id, outcome) {
                Some(packet) => {
                    if state.results.receive(packet) {
                        state.mark_dirty();
                    }
                }
                None => bridge_debug!("dropped settlement for {:?}", submission_id),
            }
            Vec::new()
        }
        Msg::CardToggled(stage) => {
            if state.results.toggle(stage) {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::ResultsClosed => {
            state.progress.cancel();
            state.results.close();
            state.mark_dirty();
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}
