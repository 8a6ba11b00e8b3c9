//! Shared poll loop used by both orchestrators
//!
//! One small state machine: check, then either stop (satisfied, out of
//! budget, or cancelled) or sleep one poll interval and check again. The
//! apply path and the delete path differ only in what a check does, so they
//! inject it as a closure and share everything else.

use std::future::Future;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use belay_core::WaitPolicy;

/// Terminal state of one poll loop run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome<T> {
    /// The condition was observed true; carries what the check produced
    Satisfied(T),
    /// The budget elapsed without the condition becoming true
    TimedOut,
    /// The caller cancelled the wait
    Cancelled,
}

/// Run `check` until it yields a value, the policy's budget elapses, or
/// `cancel` fires.
///
/// Cancellation is checked at the top of every iteration, including before
/// the first (no check is issued for an already-cancelled token), and raced
/// against both the in-flight check and the inter-poll sleep so a mid-sleep
/// or mid-read cancel aborts promptly. A zero timeout runs exactly one check
/// with no sleep. The sleep between checks is always a full poll interval;
/// when the remaining budget is shorter than one interval, the last check
/// still happens, at or after the deadline.
pub async fn wait_until<T, F, Fut>(
    policy: &WaitPolicy,
    cancel: &CancellationToken,
    mut check: F,
) -> PollOutcome<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Option<T>>,
{
    let started = Instant::now();

    loop {
        if cancel.is_cancelled() {
            return PollOutcome::Cancelled;
        }

        tokio::select! {
            _ = cancel.cancelled() => return PollOutcome::Cancelled,
            checked = check() => {
                if let Some(value) = checked {
                    return PollOutcome::Satisfied(value);
                }
            }
        }

        if policy.is_one_shot() || started.elapsed() >= policy.timeout {
            return PollOutcome::TimedOut;
        }

        tokio::select! {
            _ = cancel.cancelled() => return PollOutcome::Cancelled,
            _ = tokio::time::sleep(policy.poll_interval) => {}
        }
    }
}
