//! Virtual round timer with scripted events.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use call_core::RoundTimer;

type Action = Box<dyn FnOnce() + Send>;

#[derive(Default)]
struct TimerState {
    ticks: usize,
    elapsed: Duration,
    scheduled: BTreeMap<usize, Vec<Action>>,
}

/// A [`RoundTimer`] that returns immediately and tracks virtual time.
///
/// Actions registered with [`ScriptedTimer::on_tick`] run during the
/// matching wait, i.e. between two rounds, before the next round starts.
#[derive(Default)]
pub struct ScriptedTimer {
    state: Mutex<TimerState>,
}

impl ScriptedTimer {
    /// Create a timer with no scripted events.
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, TimerState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Run `action` during the `tick`-th wait (1-based).
    pub fn on_tick(&self, tick: usize, action: impl FnOnce() + Send + 'static) {
        self.state()
            .scheduled
            .entry(tick)
            .or_default()
            .push(Box::new(action));
    }

    /// Number of waits performed.
    pub fn ticks(&self) -> usize {
        self.state().ticks
    }

    /// Total virtual time waited.
    pub fn elapsed(&self) -> Duration {
        self.state().elapsed
    }
}

#[async_trait]
impl RoundTimer for ScriptedTimer {
    async fn wait(&self, duration: Duration) {
        let actions = {
            let mut state = self.state();
            state.ticks += 1;
            state.elapsed += duration;
            let tick = state.ticks;
            state.scheduled.remove(&tick).unwrap_or_default()
        };

        for action in actions {
            action();
        }
    }
}
