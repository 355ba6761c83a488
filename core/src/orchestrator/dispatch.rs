use std::sync::Arc;

use futures::stream::FuturesUnordered;
use futures::StreamExt;
use tokio::sync::Semaphore;

/// Dispatches one wave of named units concurrently, bounded by
/// `max_concurrency`.
///
/// The returned vector is in completion order, which within a wave is
/// unspecified; callers must only rely on set/aggregate properties.
pub(crate) async fn run_wave<T, F, Fut>(names: &[String], max_concurrency: usize, run_fn: F) -> Vec<T>
where
    F: Fn(String) -> Fut + Clone,
    Fut: std::future::Future<Output = T>,
{
    let sem = Arc::new(Semaphore::new(max_concurrency.max(1)));
    let mut futs: FuturesUnordered<_> = FuturesUnordered::new();

    for name in names {
        let name = name.clone();
        let sem = sem.clone();
        let run = run_fn.clone();

        futs.push(async move {
            // The semaphore lives for the whole wave; acquisition cannot fail.
            let _permit = sem.acquire_owned().await.ok();
            run(name).await
        });
    }

    let mut results = Vec::with_capacity(names.len());
    while let Some(res) = futs.next().await {
        results.push(res);
    }
    results
}
