//! Common utilities

use rayon::prelude::*;
use std::num::NonZeroUsize;
use std::thread;
use tracing::warn;

/// Upper bound on in-flight units of work for the concurrent stages.
///
/// Passed explicitly into the scanner and metrics stages so they never read
/// host state on their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Concurrency(NonZeroUsize);

impl Concurrency {
    /// Exactly `n` workers (minimum one)
    pub fn new(n: usize) -> Self {
        Self(NonZeroUsize::new(n).unwrap_or(NonZeroUsize::MIN))
    }

    /// Host CPU count minus one, minimum one
    pub fn from_host() -> Self {
        let cpus = thread::available_parallelism()
            .map(|p| p.get())
            .unwrap_or(1);
        Self::new(cpus.saturating_sub(1))
    }

    pub fn get(&self) -> usize {
        self.0.get()
    }
}

impl Default for Concurrency {
    fn default() -> Self {
        Self::from_host()
    }
}

/// Map `f` over `items` with at most `concurrency` workers.
///
/// Each result lands in the slot of its input index, so the output order
/// matches the input order no matter which unit finishes first.
pub fn map_bounded<T, R, F>(items: &[T], concurrency: Concurrency, f: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(usize, &T) -> R + Sync + Send,
{
    if concurrency.get() == 1 || items.len() <= 1 {
        return items.iter().enumerate().map(|(i, item)| f(i, item)).collect();
    }

    match rayon::ThreadPoolBuilder::new()
        .num_threads(concurrency.get())
        .build()
    {
        Ok(pool) => pool.install(|| {
            items
                .par_iter()
                .enumerate()
                .map(|(i, item)| f(i, item))
                .collect()
        }),
        Err(e) => {
            warn!(error = %e, "cannot build worker pool, running sequentially");
            items.iter().enumerate().map(|(i, item)| f(i, item)).collect()
        }
    }
}

/// Local timestamp used in the output header
pub fn now_rfc3339() -> String {
    chrono::Local::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, false)
}
