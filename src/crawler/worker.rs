//! Fixed-size pool of fetch workers
//!
//! Workers are stateless loops: take a job, run the shared [`Fetcher`], send
//! the outcome back. Jobs and outcomes travel over two bounded channels sized
//! at twice the worker count. The dispatcher never has more than that many
//! jobs outstanding, so neither channel can fill up and submission never
//! blocks in practice.

use crate::config::MAX_CONCURRENCY;
use crate::crawler::fetcher::{FetchedPage, Fetcher};
use crate::FetchError;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::instrument::WithSubscriber;

/// A URL handed to a worker
#[derive(Debug, Clone)]
pub struct FetchJob {
    pub url: String,
}

/// The result of one job, returned to the dispatcher
#[derive(Debug)]
pub struct FetchOutcome {
    /// The URL as it was submitted
    pub url: String,

    /// The fetched page, or why it could not be fetched
    pub result: Result<FetchedPage, FetchError>,
}

/// Handle to the running workers
pub struct WorkerPool {
    jobs: mpsc::Sender<FetchJob>,
    results: mpsc::Receiver<FetchOutcome>,
    workers: JoinSet<()>,
    capacity: usize,
}

impl WorkerPool {
    /// Spawns `size` workers sharing `fetcher`
    ///
    /// `size` is clamped to `1..=MAX_CONCURRENCY`. Must be called from within
    /// a tokio runtime. Workers inherit the caller's tracing subscriber.
    pub fn spawn(size: usize, fetcher: Arc<Fetcher>, cancel: CancellationToken) -> Self {
        let size = size.clamp(1, MAX_CONCURRENCY);
        let capacity = size * 2;

        let (jobs_tx, jobs_rx) = mpsc::channel(capacity);
        let (results_tx, results_rx) = mpsc::channel(capacity);
        let jobs_rx = Arc::new(Mutex::new(jobs_rx));

        let mut workers = JoinSet::new();
        for id in 0..size {
            workers.spawn(
                run_worker(
                    id,
                    Arc::clone(&jobs_rx),
                    results_tx.clone(),
                    Arc::clone(&fetcher),
                    cancel.clone(),
                )
                .with_current_subscriber(),
            );
        }

        Self {
            jobs: jobs_tx,
            results: results_rx,
            workers,
            capacity,
        }
    }

    /// Maximum number of jobs that may be outstanding at once
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Hands a job to the workers
    ///
    /// Returns the job back if every worker has stopped.
    pub async fn submit(&self, job: FetchJob) -> Result<(), FetchJob> {
        self.jobs.send(job).await.map_err(|e| e.0)
    }

    /// Waits for the next finished job
    ///
    /// Returns `None` once every worker has stopped.
    pub async fn next_outcome(&mut self) -> Option<FetchOutcome> {
        self.results.recv().await
    }

    /// Stops accepting jobs and waits for all workers to exit
    pub async fn shutdown(self) {
        let Self {
            jobs,
            results,
            mut workers,
            ..
        } = self;
        drop(jobs);
        drop(results);

        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                tracing::error!(error = %e, "fetch worker panicked");
            }
        }
    }
}

async fn run_worker(
    id: usize,
    jobs: Arc<Mutex<mpsc::Receiver<FetchJob>>>,
    results: mpsc::Sender<FetchOutcome>,
    fetcher: Arc<Fetcher>,
    cancel: CancellationToken,
) {
    loop {
        let job = jobs.lock().await.recv().await;
        let Some(job) = job else {
            break;
        };

        let result = fetcher.fetch(&cancel, &job.url).await;
        if results
            .send(FetchOutcome {
                url: job.url,
                result,
            })
            .await
            .is_err()
        {
            break;
        }
    }

    tracing::trace!(worker = id, "fetch worker stopped");
}
