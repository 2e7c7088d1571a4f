use crate::mode::Strategy;
use anyhow::Result;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, error};

/// Run `task` once per item under the given strategy and wait for all of them.
pub async fn run<T, F, Fut>(strategy: Strategy, items: Vec<T>, task: F) -> Result<()>
where
    T: Send + 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    match strategy {
        Strategy::BoundedFanout { limit } => run_bounded(items, limit, task).await,
        Strategy::WorkerPool { workers } => run_pool(items, workers, task).await,
    }
}

/// Spawn one task per item, admitting at most `limit` at a time.
///
/// A permit is taken before each spawn and held until that task completes.
pub async fn run_bounded<T, F, Fut>(items: Vec<T>, limit: usize, task: F) -> Result<()>
where
    T: Send + 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let sem = Arc::new(Semaphore::new(limit.clamp(1, Semaphore::MAX_PERMITS)));
    let task = Arc::new(task);
    let mut set = JoinSet::new();

    for item in items {
        let permit = sem.clone().acquire_owned().await?;
        let task = task.clone();
        set.spawn(async move {
            let _permit = permit; // keep permit until task completes
            task(item).await;
        });
    }

    drain(&mut set).await;
    Ok(())
}

/// Feed items through a bounded queue to `workers` long-lived consumers.
pub async fn run_pool<T, F, Fut>(items: Vec<T>, workers: usize, task: F) -> Result<()>
where
    T: Send + 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let workers = workers.max(1);
    let (tx, rx) = mpsc::channel::<T>(workers);
    let rx = Arc::new(Mutex::new(rx));
    let task = Arc::new(task);
    let mut set = JoinSet::new();

    for id in 0..workers {
        let rx = rx.clone();
        let task = task.clone();
        set.spawn(async move {
            let mut handled = 0usize;
            loop {
                // Only one idle worker waits on the queue at a time.
                let next = rx.lock().await.recv().await;
                let Some(item) = next else { break };
                task(item).await;
                handled += 1;
            }
            debug!("worker {id} finished after {handled} jobs");
        });
    }

    for item in items {
        if tx.send(item).await.is_err() {
            error!("all workers exited before the queue was drained");
            break;
        }
    }
    drop(tx);

    drain(&mut set).await;
    Ok(())
}

async fn drain(set: &mut JoinSet<()>) {
    while let Some(res) = set.join_next().await {
        if let Err(e) = res {
            error!("task failed: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct Gauge {
        current: AtomicUsize,
        peak: AtomicUsize,
        done: AtomicUsize,
    }

    impl Gauge {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                current: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
                done: AtomicUsize::new(0),
            })
        }

        async fn work(&self) {
            let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(5)).await;
            self.current.fetch_sub(1, Ordering::SeqCst);
            self.done.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn bounded_respects_limit_and_runs_everything() {
        let gauge = Gauge::new();
        let g = gauge.clone();
        run_bounded((0..40).collect(), 3, move |_: u32| {
            let g = g.clone();
            async move { g.work().await }
        })
        .await
        .unwrap();
        assert_eq!(gauge.done.load(Ordering::SeqCst), 40);
        assert!(gauge.peak.load(Ordering::SeqCst) <= 3);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn pool_respects_worker_count_and_runs_everything() {
        let gauge = Gauge::new();
        let g = gauge.clone();
        run_pool((0..40).collect(), 4, move |_: u32| {
            let g = g.clone();
            async move { g.work().await }
        })
        .await
        .unwrap();
        assert_eq!(gauge.done.load(Ordering::SeqCst), 40);
        assert!(gauge.peak.load(Ordering::SeqCst) <= 4);
    }

    #[tokio::test]
    async fn empty_input_completes() {
        run(Strategy::WorkerPool { workers: 8 }, Vec::<u8>::new(), |_| async {})
            .await
            .unwrap();
        run(Strategy::BoundedFanout { limit: 8 }, Vec::<u8>::new(), |_| async {})
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn zero_limit_still_makes_progress() {
        let done = Arc::new(AtomicUsize::new(0));
        let d = done.clone();
        run_bounded(vec![1, 2, 3], 0, move |_: u8| {
            let d = d.clone();
            async move {
                d.fetch_add(1, Ordering::SeqCst);
            }
        })
        .await
        .unwrap();
        assert_eq!(done.load(Ordering::SeqCst), 3);
    }
}
