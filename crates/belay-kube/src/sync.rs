//! Apply/delete orchestration against a remote object store
//!
//! [`SyncEngine`] drives the two operations every dynamically-typed resource
//! delegates to: make remote state match a desired document (server-side
//! apply, then optionally wait for reconciliation conditions), and remove an
//! object (idempotent delete, then optionally wait for absence).

use serde_json::Value;
use tokio_util::sync::CancellationToken;

use belay_core::{ResourceCoordinate, WaitCondition, WaitPolicy};

use crate::client::{ApplyOptions, DeletePropagation, RemoteClient};
use crate::error::{ApplyError, ClientError, DeleteError};
use crate::waiter::{self, PollOutcome};

/// Apply/delete engine, generic over the remote client capability.
///
/// Holds nothing but the shared client: independent invocations on different
/// coordinates may run concurrently at the caller's discretion without any
/// engine-side locking.
pub struct SyncEngine<C: RemoteClient> {
    client: C,
}

impl<C: RemoteClient> SyncEngine<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// The underlying client
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Apply `desired` at `at` with server-side-apply semantics, then wait
    /// for every condition, in declaration order, each under its own policy.
    ///
    /// The desired document must already carry `apiVersion` and `kind`; the
    /// engine serializes it verbatim. The patch is issued once and never
    /// retried here. A wait timeout does not roll the apply back - the
    /// remote object stays as applied, possibly still reconciling, and the
    /// error names the condition that did not become true.
    ///
    /// Returns the server's resulting object, or the last fetched state when
    /// conditions were polled.
    pub async fn apply_and_wait(
        &self,
        at: &ResourceCoordinate,
        desired: &Value,
        options: &ApplyOptions,
        conditions: &[WaitCondition],
        cancel: &CancellationToken,
    ) -> Result<Value, ApplyError> {
        // Compile every condition before touching the cluster: a malformed
        // path is a configuration error, not a poll-time surprise.
        let compiled = conditions
            .iter()
            .map(WaitCondition::compile)
            .collect::<Result<Vec<_>, _>>()?;

        let body = serde_json::to_vec(desired)
            .map_err(|e| ApplyError::PatchFailed(ClientError::Serialization(e.to_string())))?;

        let mut current = self
            .client
            .apply_patch(at, &body, options)
            .await
            .map_err(ApplyError::PatchFailed)?;

        // Conditions reflect controller reconciliation that happens after
        // the patch, so each check re-fetches the live object instead of
        // re-reading the apply response.
        for condition in &compiled {
            let outcome = waiter::wait_until(condition.policy(), cancel, || async move {
                match self.client.get(at).await {
                    Ok(doc) if condition.is_satisfied(&doc) => Some(doc),
                    // Not yet satisfied, or an inconclusive read failure;
                    // the deadline bounds both.
                    _ => None,
                }
            })
            .await;

            match outcome {
                PollOutcome::Satisfied(doc) => current = doc,
                PollOutcome::TimedOut => {
                    return Err(ApplyError::WaitTimeout {
                        path: condition.path().to_string(),
                        timeout: condition.policy().timeout,
                    });
                }
                PollOutcome::Cancelled => return Err(ApplyError::Cancelled),
            }
        }

        Ok(current)
    }

    /// Delete the object at `at`, then optionally wait until it is gone.
    ///
    /// Not-found on the delete call is success - the desired end state
    /// already holds - and skips the wait entirely. A wait policy with a
    /// zero timeout performs a single existence check and returns success
    /// regardless of what it sees: "don't wait" is an explicit opt-out, not
    /// a failure condition.
    pub async fn delete_and_wait(
        &self,
        at: &ResourceCoordinate,
        propagation: Option<DeletePropagation>,
        wait: Option<&WaitPolicy>,
        cancel: &CancellationToken,
    ) -> Result<(), DeleteError> {
        match self.client.delete(at, propagation).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => return Ok(()),
            Err(e) => return Err(DeleteError::DeleteFailed(e)),
        }

        let Some(policy) = wait else {
            return Ok(());
        };

        let outcome = waiter::wait_until(policy, cancel, || async move {
            match self.client.get(at).await {
                Err(e) if e.is_not_found() => Some(()),
                // Still present, or an inconclusive failure; keep polling
                // until the budget runs out.
                _ => None,
            }
        })
        .await;

        match outcome {
            PollOutcome::Satisfied(()) => Ok(()),
            PollOutcome::TimedOut if policy.is_one_shot() => Ok(()),
            PollOutcome::TimedOut => Err(DeleteError::WaitTimeoutExceeded {
                timeout: policy.timeout,
            }),
            PollOutcome::Cancelled => Err(DeleteError::Cancelled),
        }
    }
}
