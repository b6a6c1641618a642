use std::panic::{catch_unwind, AssertUnwindSafe};
use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender, TrySendError};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    #[error("inference queue is full")]
    Saturated,
    #[error("inference pool is shut down")]
    Closed,
    #[error("worker panicked while running the job")]
    WorkerLost,
}

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Result slot for one submitted job.
pub struct JobHandle<T> {
    result_rx: Receiver<Result<T, PoolError>>,
}

impl<T> JobHandle<T> {
    /// Block until the job finishes.
    pub fn wait(self) -> Result<T, PoolError> {
        self.result_rx.recv().unwrap_or(Err(PoolError::WorkerLost))
    }
}

/// Fixed set of worker threads fed by a bounded queue.
///
/// `submit` rejects work when the queue is full so callers can shed load;
/// `submit_blocking` waits for room instead. Dropping the pool drains the
/// queue and joins the workers.
pub struct InferencePool {
    job_tx: Option<Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
}

impl InferencePool {
    pub fn new(workers: usize, queue_capacity: usize) -> std::io::Result<Self> {
        let (job_tx, job_rx) = crossbeam_channel::bounded::<Job>(queue_capacity.max(1));
        let workers = (0..workers.max(1))
            .map(|i| spawn_worker(i, job_rx.clone()))
            .collect::<std::io::Result<Vec<_>>>()?;
        Ok(Self {
            job_tx: Some(job_tx),
            workers,
        })
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    pub fn submit<T, F>(&self, job: F) -> Result<JobHandle<T>, PoolError>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let (wrapped, handle) = wrap(job);
        let tx = self.job_tx.as_ref().ok_or(PoolError::Closed)?;
        match tx.try_send(wrapped) {
            Ok(()) => Ok(handle),
            Err(TrySendError::Full(_)) => Err(PoolError::Saturated),
            Err(TrySendError::Disconnected(_)) => Err(PoolError::Closed),
        }
    }

    pub fn submit_blocking<T, F>(&self, job: F) -> Result<JobHandle<T>, PoolError>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let (wrapped, handle) = wrap(job);
        let tx = self.job_tx.as_ref().ok_or(PoolError::Closed)?;
        tx.send(wrapped).map_err(|_| PoolError::Closed)?;
        Ok(handle)
    }
}

impl Drop for InferencePool {
    fn drop(&mut self) {
        drop(self.job_tx.take());
        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                log::warn!("Inference worker exited abnormally");
            }
        }
    }
}

fn wrap<T, F>(job: F) -> (Job, JobHandle<T>)
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let (result_tx, result_rx) = crossbeam_channel::bounded(1);
    let wrapped: Job = Box::new(move || {
        let result = catch_unwind(AssertUnwindSafe(job)).map_err(|_| PoolError::WorkerLost);
        let _ = result_tx.send(result);
    });
    (wrapped, JobHandle { result_rx })
}

fn spawn_worker(index: usize, job_rx: Receiver<Job>) -> std::io::Result<JoinHandle<()>> {
    std::thread::Builder::new()
        .name(format!("inference-{index}"))
        .spawn(move || {
            for job in job_rx {
                job();
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Barrier};
    use std::time::Duration;

    #[test]
    fn test_jobs_return_results() {
        let pool = InferencePool::new(2, 4).unwrap();
        let handles: Vec<_> = (0..4)
            .map(|i| pool.submit_blocking(move || i * 10).unwrap())
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.wait().unwrap()).collect();
        assert_eq!(results, vec![0, 10, 20, 30]);
        assert_eq!(pool.worker_count(), 2);
    }

    #[test]
    fn test_full_queue_rejects() {
        let pool = InferencePool::new(1, 1).unwrap();
        let gate = Arc::new(Barrier::new(2));

        let blocker = gate.clone();
        let running = pool.submit(move || {
            blocker.wait();
        });
        assert!(running.is_ok());

        // Wait until the worker has taken the first job off the queue.
        let mut queued = None;
        for _ in 0..100 {
            match pool.submit(|| ()) {
                Ok(handle) => {
                    queued = Some(handle);
                    break;
                }
                Err(PoolError::Saturated) => std::thread::sleep(Duration::from_millis(5)),
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
        assert!(queued.is_some());
        assert_eq!(pool.submit(|| ()).err(), Some(PoolError::Saturated));

        gate.wait();
        running.unwrap().wait().unwrap();
        queued.unwrap().wait().unwrap();
    }

    #[test]
    fn test_panicking_job_reports_worker_lost_and_pool_survives() {
        let pool = InferencePool::new(1, 2).unwrap();
        let bad = pool.submit_blocking(|| -> u32 { panic!("boom") }).unwrap();
        assert_eq!(bad.wait(), Err(PoolError::WorkerLost));
        let good = pool.submit_blocking(|| 7u32).unwrap();
        assert_eq!(good.wait(), Ok(7));
    }
}
