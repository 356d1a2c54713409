//! Virtual-clock timer queue.
//!
//! Timers are `(delay, payload)` pairs owned by a cancellation token. Nothing
//! runs on its own: the owner advances the clock and pops due timers one at a
//! time, so a handler can cancel timers that would otherwise fire later in the
//! same advance.

use std::time::Duration;

const MIN_PERIOD: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CancelToken(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
struct Timer<T> {
    id: TimerId,
    token: CancelToken,
    due: Duration,
    period: Option<Duration>,
    payload: T,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fired<T> {
    pub id: TimerId,
    pub token: CancelToken,
    pub at: Duration,
    pub payload: T,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerQueue<T> {
    now: Duration,
    next_id: u64,
    next_token: u64,
    timers: Vec<Timer<T>>,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 1,
            next_token: 1,
            timers: Vec::new(),
        }
    }
}

impl<T: Clone> TimerQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    /// Moves the clock forward. The clock never goes backwards.
    pub fn advance_to(&mut self, now: Duration) {
        self.now = self.now.max(now);
    }

    pub fn issue_token(&mut self) -> CancelToken {
        let token = CancelToken(self.next_token);
        self.next_token += 1;
        token
    }

    pub fn schedule_once(&mut self, token: CancelToken, delay: Duration, payload: T) -> TimerId {
        self.push(token, self.now + delay, None, payload)
    }

    /// Schedules a timer that first fires after `period` and then every
    /// `period` until cancelled.
    pub fn schedule_repeating(
        &mut self,
        token: CancelToken,
        period: Duration,
        payload: T,
    ) -> TimerId {
        let period = period.max(MIN_PERIOD);
        self.push(token, self.now + period, Some(period), payload)
    }

    pub fn cancel_timer(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|timer| timer.id != id);
        self.timers.len() != before
    }

    /// Drops every timer owned by `token`, returning how many were pending.
    pub fn cancel(&mut self, token: CancelToken) -> usize {
        let before = self.timers.len();
        self.timers.retain(|timer| timer.token != token);
        before - self.timers.len()
    }

    pub fn pending(&self, token: CancelToken) -> usize {
        self.timers.iter().filter(|timer| timer.token == token).count()
    }

    pub fn is_idle(&self) -> bool {
        self.timers.is_empty()
    }

    /// Pops the earliest timer due at or before `until`, moving the clock to
    /// its due time. Ties fire in scheduling order. Repeating timers are
    /// re-armed before returning.
    pub fn pop_due(&mut self, until: Duration) -> Option<Fired<T>> {
        let index = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, timer)| timer.due <= until)
            .min_by_key(|(_, timer)| (timer.due, timer.id))
            .map(|(index, _)| index)?;

        let fired = match self.timers[index].period {
            Some(period) => {
                let timer = &mut self.timers[index];
                let fired = Fired {
                    id: timer.id,
                    token: timer.token,
                    at: timer.due,
                    payload: timer.payload.clone(),
                };
                timer.due += period;
                fired
            }
            None => {
                let timer = self.timers.swap_remove(index);
                Fired {
                    id: timer.id,
                    token: timer.token,
                    at: timer.due,
                    payload: timer.payload,
                }
            }
        };
        self.advance_to(fired.at);
        Some(fired)
    }

    fn push(
        &mut self,
        token: CancelToken,
        due: Duration,
        period: Option<Duration>,
        payload: T,
    ) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.timers.push(Timer {
            id,
            token,
            due,
            period,
            payload,
        });
        id
    }
}
