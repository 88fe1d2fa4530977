//! Bounded-concurrency execution of independent async units.
//!
//! Every unit is spawned onto the tokio runtime so units genuinely run in
//! parallel, but spawning is driven through `buffer_unordered(limit)`: a new
//! unit is only spawned once fewer than `limit` spawned units are unfinished.
//! A unit that panics fails its own slot and nothing else.

use std::future::Future;

use futures::StreamExt;
use futures::stream;
use tokio::task::JoinError;

use crate::error::{Error, Result};

/// Why a unit produced no value.
#[derive(Debug, thiserror::Error)]
pub enum UnitFailure {
    #[error("unit panicked: {0}")]
    Panicked(String),

    #[error("unit was cancelled")]
    Cancelled,
}

impl From<JoinError> for UnitFailure {
    fn from(err: JoinError) -> Self {
        if err.is_cancelled() {
            return Self::Cancelled;
        }
        let payload = err.into_panic();
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic payload".to_string());
        Self::Panicked(message)
    }
}

/// Outcome of one unit.
pub type UnitResult<T> = std::result::Result<T, UnitFailure>;

/// Run every unit with at most `limit` in flight and wait for all of them.
///
/// Results come back in the order the units were given, whatever order they
/// finished in. `limit == 0` is rejected before anything runs.
///
/// Must be called from within a multi-threaded tokio runtime for the units
/// to execute in parallel; on a current-thread runtime they interleave.
pub async fn run_bounded<I, F, Fut, T>(units: I, limit: usize) -> Result<Vec<UnitResult<T>>>
where
    I: IntoIterator<Item = F>,
    F: FnOnce() -> Fut,
    Fut: Future<Output = T> + Send + 'static,
    T: Send + 'static,
{
    if limit == 0 {
        return Err(Error::config("concurrency must be at least 1"));
    }

    let mut finished: Vec<(usize, UnitResult<T>)> = stream::iter(units.into_iter().enumerate())
        .map(|(index, unit)| {
            let handle = tokio::spawn(unit());
            async move { (index, handle.await.map_err(UnitFailure::from)) }
        })
        .buffer_unordered(limit)
        .inspect(|(index, result)| {
            if let Err(e) = result {
                tracing::error!(target: "batch::runner", unit = index, error = %e, "Unit failed");
            }
        })
        .collect()
        .await;

    finished.sort_by_key(|(index, _)| *index);
    tracing::debug!(target: "batch::runner", units = finished.len(), limit, "All units finished");
    Ok(finished.into_iter().map(|(_, result)| result).collect())
}


/// Property-based tests using proptest
#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        /// All units complete and the in-flight count never passes the limit
        #[test]
        fn completes_all_within_limit(count in 0usize..40, limit in 1usize..8) {
            let rt = tokio::runtime::Builder::new_multi_thread()
                .worker_threads(4)
                .enable_all()
                .build()
                .unwrap();

            let running = Arc::new(AtomicUsize::new(0));
            let peak = Arc::new(AtomicUsize::new(0));
            let done = Arc::new(AtomicUsize::new(0));

            let units: Vec<_> = (0..count)
                .map(|_| {
                    let (running, peak, done) = (running.clone(), peak.clone(), done.clone());
                    move || async move {
                        let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                        peak.fetch_max(now, Ordering::SeqCst);
                        tokio::task::yield_now().await;
                        running.fetch_sub(1, Ordering::SeqCst);
                        done.fetch_add(1, Ordering::SeqCst);
                    }
                })
                .collect();

            let results = rt.block_on(run_bounded(units, limit)).unwrap();

            prop_assert_eq!(results.len(), count);
            prop_assert_eq!(done.load(Ordering::SeqCst), count);
            prop_assert!(peak.load(Ordering::SeqCst) <= limit);
            prop_assert_eq!(running.load(Ordering::SeqCst), 0);
        }
    }
}
