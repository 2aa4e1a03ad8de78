//! Bounded worker pool with a caller-runs saturation policy.
//!
//! A fixed set of worker tasks each drain their own bounded queue of boxed
//! jobs; dispatch is round-robin. When every queue is full, the submitting
//! caller executes the job itself instead of failing or queueing without
//! bound — memory stays bounded and no submission is ever dropped. This is
//! the only backpressure mechanism on outbound generator calls, so every
//! fan-out goes through here.

use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_util::sync::CancellationToken;

type Job = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

pub struct WorkerPool {
    queues: Vec<mpsc::Sender<Job>>,
    next: AtomicUsize,
    shutdown: CancellationToken,
}

impl WorkerPool {
    /// Spawn `workers` worker tasks, each with a queue of `queue_depth` jobs.
    pub fn new(workers: usize, queue_depth: usize) -> Self {
        assert!(workers > 0, "worker pool needs at least one worker");
        assert!(queue_depth > 0, "worker queues need capacity");

        let shutdown = CancellationToken::new();
        let mut queues = Vec::with_capacity(workers);
        for worker_id in 0..workers {
            let (tx, rx) = mpsc::channel::<Job>(queue_depth);
            queues.push(tx);
            tokio::spawn(worker_loop(worker_id, rx, shutdown.clone()));
        }

        Self {
            queues,
            next: AtomicUsize::new(0),
            shutdown,
        }
    }

    /// Submit a job. Tries each worker queue once starting from the
    /// round-robin cursor; if all are full (or the pool is shutting down)
    /// the caller runs the job inline.
    pub async fn dispatch<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut job: Job = Box::pin(fut);

        if !self.shutdown.is_cancelled() {
            let start = self.next.fetch_add(1, Ordering::Relaxed);
            for offset in 0..self.queues.len() {
                let queue = &self.queues[(start + offset) % self.queues.len()];
                match queue.try_send(job) {
                    Ok(()) => return,
                    Err(TrySendError::Full(returned)) | Err(TrySendError::Closed(returned)) => {
                        job = returned;
                    }
                }
            }
            tracing::debug!("worker pool saturated, running job on caller");
        }

        job.await;
    }

    /// Stop accepting queued work. Workers finish their current job, drain
    /// what was already queued, and exit; later dispatches run on the caller.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}

async fn worker_loop(worker_id: usize, mut rx: mpsc::Receiver<Job>, shutdown: CancellationToken) {
    tracing::trace!(worker_id, "pool worker started");

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            job = rx.recv() => match job {
                Some(job) => job.await,
                None => break,
            },
        }
    }

    // Drain anything accepted before the shutdown signal.
    while let Ok(job) = rx.try_recv() {
        job.await;
    }

    tracing::trace!(worker_id, "pool worker stopped");
}
