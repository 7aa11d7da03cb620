//! Join-all over pending completions.
//!
//! Resolves once every completion succeeded, or as soon as the first one
//! fails. Failing never cancels the others: whatever is still running is
//! moved onto the runtime and driven to the end in the background.

use futures::stream::{FuturesUnordered, StreamExt};

use crate::action::PendingCompletion;
use crate::error::ActionError;

/// Await all `pending` completions, failing fast on the first error.
pub async fn join_pending(pending: Vec<PendingCompletion>) -> Result<(), ActionError> {
    let mut running: FuturesUnordered<PendingCompletion> = pending.into_iter().collect();

    while let Some(result) = running.next().await {
        if let Err(err) = result {
            detach(running);
            return Err(err);
        }
    }

    Ok(())
}

/// Keep driving the remaining completions without anyone awaiting them.
fn detach(running: FuturesUnordered<PendingCompletion>) {
    if running.is_empty() {
        return;
    }

    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            handle.spawn(async move {
                let outcomes: Vec<_> = running.collect().await;
                let failed = outcomes.iter().filter(|r| r.is_err()).count();
                if failed > 0 {
                    tracing::debug!(failed, "Detached completions failed after the join settled");
                }
            });
        }
        Err(_) => {
            tracing::warn!(
                remaining = running.len(),
                "No runtime available, dropping pending completions"
            );
        }
    }
}
