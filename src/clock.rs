//! Per-call fault shielding and time accounting around agent callbacks.
//! In-process agents run unbounded by default; a budget is only applied
//! when a caller supplies one, which matters for the remote-agent case
//! this crate does not implement but leaves room for.

use crate::error::AgentFault;
use std::time::{Duration, Instant};

/// Tracks, per player, how long their callbacks have taken — for logging
/// and for tests asserting no agent monopolizes the turn loop. Does not by
/// itself enforce a budget; see `call_with_fault_shield`.
pub struct Clock {
    elapsed: Vec<Duration>,
    start: Option<Instant>,
    current: Option<usize>,
}

impl Clock {
    pub fn new(num_players: usize) -> Self {
        Clock {
            elapsed: vec![Duration::ZERO; num_players],
            start: None,
            current: None,
        }
    }

    pub fn begin(&mut self, player: usize) {
        self.start = Some(Instant::now());
        self.current = Some(player);
    }

    pub fn end(&mut self) {
        if let (Some(start), Some(player)) = (self.start.take(), self.current.take()) {
            self.elapsed[player] += start.elapsed();
        }
    }

    pub fn total_for(&self, player: usize) -> Duration {
        self.elapsed[player]
    }
}

/// Calls `f`, catching a panic as `AgentFault::CallbackPanicked` and — when
/// `budget` is `Some` — a deadline overrun as `AgentFault::TimedOut`.
/// Default (remote-agent) budget is 1 second; in-process callers pass
/// `None` for unbounded execution.
pub async fn call_with_fault_shield<F, T>(budget: Option<Duration>, f: F) -> Result<T, AgentFault>
where
    F: FnOnce() -> T,
{
    let call = async { std::panic::catch_unwind(std::panic::AssertUnwindSafe(f)) };

    let outcome = match budget {
        Some(duration) => match tokio::time::timeout(duration, call).await {
            Ok(result) => result,
            Err(_) => return Err(AgentFault::TimedOut),
        },
        None => call.await,
    };

    outcome.map_err(|_| AgentFault::CallbackPanicked)
}

pub const DEFAULT_REMOTE_BUDGET: Duration = Duration::from_secs(1);

#[cfg(test)]
mod tests {
    use super::*;

    // Testing strategy:
    // - a clean call succeeds
    // - a panicking call is caught and reported as CallbackPanicked

    #[tokio::test]
    async fn clean_call_succeeds() {
        let result = call_with_fault_shield(None, || 42).await;
        assert_eq!(result, Ok(42));
    }

    #[tokio::test]
    async fn panicking_call_is_caught() {
        let result: Result<(), AgentFault> =
            call_with_fault_shield(None, || panic!("boom")).await;
        assert_eq!(result, Err(AgentFault::CallbackPanicked));
    }
}
