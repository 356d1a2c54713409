//! Simulated pipeline progress.
//!
//! The analysis service answers with a single response, so the stage
//! timeline shown while waiting is paced locally: stage `k` starts running at
//! `k * stage_interval` and the percentage climbs by `percent_step` every
//! `percent_interval`. The real response never alters this timing.

use std::time::Duration;

use marketbridge_logging::bridge_debug;

use crate::scheduler::{CancelToken, TimerId, TimerQueue};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacingConfig {
    pub stage_interval: Duration,
    pub percent_interval: Duration,
    pub percent_step: u8,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            stage_interval: Duration::from_millis(2_000),
            percent_interval: Duration::from_millis(100),
            percent_step: 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProgressState {
    pub current_stage_index: usize,
    pub percent_complete: u8,
}

/// One observed change of a run's progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub run: CancelToken,
    pub at: Duration,
    pub state: ProgressState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pace {
    Percent,
    Stage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ActiveRun {
    token: CancelToken,
    stage_names: Vec<String>,
    state: ProgressState,
    percent_timer: Option<TimerId>,
    stage_timer: Option<TimerId>,
}

impl ActiveRun {
    fn last_stage_index(&self) -> usize {
        self.stage_names.len().saturating_sub(1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProgressOrchestrator {
    pacing: PacingConfig,
    timers: TimerQueue<Pace>,
    run: Option<ActiveRun>,
}

impl ProgressOrchestrator {
    pub fn new(pacing: PacingConfig) -> Self {
        Self {
            pacing,
            timers: TimerQueue::new(),
            run: None,
        }
    }

    pub fn pacing(&self) -> PacingConfig {
        self.pacing
    }

    /// Starts a new run at `now`, superseding any previous one, and returns
    /// the run's initial state. Later states are delivered by `advance_to`.
    pub fn start<I, S>(&mut self, stage_names: I, now: Duration) -> ProgressUpdate
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cancel();
        self.timers.advance_to(now);

        let token = self.timers.issue_token();
        let stage_names: Vec<String> = stage_names.into_iter().map(Into::into).collect();
        let percent_timer = Some(self.timers.schedule_repeating(
            token,
            self.pacing.percent_interval,
            Pace::Percent,
        ));
        let stage_timer = (stage_names.len() > 1).then(|| {
            self.timers
                .schedule_repeating(token, self.pacing.stage_interval, Pace::Stage)
        });

        let state = ProgressState::default();
        self.run = Some(ActiveRun {
            token,
            stage_names,
            state,
            percent_timer,
            stage_timer,
        });

        ProgressUpdate {
            run: token,
            at: self.timers.now(),
            state,
        }
    }

    /// Abandons the active run. No update for it is ever emitted again.
    pub fn cancel(&mut self) -> bool {
        let Some(run) = self.run.take() else {
            return false;
        };
        let dropped = self.timers.cancel(run.token);
        bridge_debug!(
            "progress run {:?} cancelled with {} pending timers",
            run.token,
            dropped
        );
        true
    }

    /// Advances the virtual clock and returns every state change that became
    /// due, in firing order.
    pub fn advance_to(&mut self, now: Duration) -> Vec<ProgressUpdate> {
        let mut updates = Vec::new();
        while let Some(fired) = self.timers.pop_due(now) {
            let percent_step = self.pacing.percent_step.max(1);
            let Some(run) = self.run.as_mut().filter(|run| run.token == fired.token) else {
                continue;
            };

            let before = run.state;
            match fired.payload {
                Pace::Percent => {
                    run.state.percent_complete = run
                        .state
                        .percent_complete
                        .saturating_add(percent_step)
                        .min(100);
                    if run.state.percent_complete == 100 {
                        if let Some(id) = run.percent_timer.take() {
                            self.timers.cancel_timer(id);
                        }
                    }
                }
                Pace::Stage => {
                    let last = run.last_stage_index();
                    run.state.current_stage_index = (run.state.current_stage_index + 1).min(last);
                    if run.state.current_stage_index == last {
                        if let Some(id) = run.stage_timer.take() {
                            self.timers.cancel_timer(id);
                        }
                    }
                }
            }

            if run.state != before {
                updates.push(ProgressUpdate {
                    run: run.token,
                    at: fired.at,
                    state: run.state,
                });
            }
        }
        self.timers.advance_to(now);
        updates
    }

    pub fn active_run(&self) -> Option<CancelToken> {
        self.run.as_ref().map(|run| run.token)
    }

    pub fn state(&self) -> Option<ProgressState> {
        self.run.as_ref().map(|run| run.state)
    }

    pub fn current_stage_name(&self) -> Option<&str> {
        let run = self.run.as_ref()?;
        run.stage_names
            .get(run.state.current_stage_index)
            .map(String::as_str)
    }

    /// True once the active run has reached its final state.
    pub fn is_finished(&self) -> bool {
        self.run
            .as_ref()
            .is_some_and(|run| self.timers.pending(run.token) == 0)
    }

    pub fn is_running(&self) -> bool {
        self.run.is_some() && !self.is_finished()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{PacingConfig, ProgressOrchestrator};

    const STAGES: [&str; 4] = ["Creative", "Finance", "Inventory", "Lead"];

    #[test]
    fn start_reports_initial_state() {
        let mut progress = ProgressOrchestrator::default();
        let update = progress.start(STAGES, Duration::from_millis(500));

        assert_eq!(update.at, Duration::from_millis(500));
        assert_eq!(update.state.percent_complete, 0);
        assert_eq!(update.state.current_stage_index, 0);
        assert_eq!(progress.current_stage_name(), Some("Creative"));
        assert!(progress.is_running());
    }

    #[test]
    fn single_stage_run_only_paces_percent() {
        let mut progress = ProgressOrchestrator::new(PacingConfig {
            percent_step: 50,
            ..PacingConfig::default()
        });
        progress.start(["Only"], Duration::ZERO);

        let updates = progress.advance_to(Duration::from_secs(10));
        assert_eq!(updates.len(), 2);
        assert!(updates.iter().all(|u| u.state.current_stage_index == 0));
        assert!(progress.is_finished());
    }

    #[test]
    fn zero_step_still_makes_progress() {
        let mut progress = ProgressOrchestrator::new(PacingConfig {
            percent_step: 0,
            ..PacingConfig::default()
        });
        progress.start(STAGES, Duration::ZERO);

        let updates = progress.advance_to(Duration::from_millis(100));
        assert_eq!(updates[0].state.percent_complete, 1);
    }
}
