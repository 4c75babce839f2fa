use crossbeam_channel::{Receiver, RecvError, Sender};
use std::{
    panic::AssertUnwindSafe,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Condvar, Mutex,
    },
    thread::JoinHandle,
};

#[derive(Debug, thiserror::Error)]
pub enum JobQueueError {
    #[error("job queue has been shut down")]
    Disconnected,
}

struct Worker(usize, JoinHandle<()>);

impl Worker {
    // Join the worker thread with the foreground. The job channel must already
    // be disconnected, or this blocks forever.
    fn join(self) {
        if let Err(args) = self.1.join() {
            error!("Background worker #{} stop panic: {:?}", self.0, args);
        }
    }
}

/// Internal struct used to wrap job data.
struct Job {
    work: Box<dyn FnOnce() + Send>,
    completion: Arc<AtomicBool>,
}

impl Job {
    /// Consumes the job and executes the contained function.
    fn execute(self, worker_num: usize) {
        if let Err(args) = std::panic::catch_unwind(AssertUnwindSafe(self.work)) {
            error!("Background worker #{} job panicked: {:?}", worker_num, args);
        }

        self.completion.store(true, Ordering::Release);
    }
}

/// Wrapper type representing the completion of a successfully queued job.
#[derive(Clone)]
pub struct JobCompletion(Arc<AtomicBool>);

impl JobCompletion {
    /// Returns true if the job's function has been executed; otherwise, false.
    pub fn is_complete(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Count of queued-but-unfinished jobs, with a signal for when it hits zero.
#[derive(Default)]
struct Outstanding {
    count: Mutex<usize>,
    drained: Condvar,
}

impl Outstanding {
    fn increment(&self) {
        *self.lock() += 1;
    }

    fn decrement(&self) {
        let mut count = self.lock();
        *count -= 1;

        if *count == 0 {
            self.drained.notify_all();
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, usize> {
        self.count
            .lock()
            .expect("Job queue outstanding mutex has been poisoned!")
    }
}

/// Fixed pool of background workers fed from a single unbounded channel.
///
/// Jobs must not touch simulation state; they hand results back through
/// their own channels.
pub struct JobQueue {
    workers: Vec<Worker>,
    sender: Option<Sender<Job>>,
    outstanding: Arc<Outstanding>,
}

impl JobQueue {
    /// Spawns `worker_count` workers, or one per logical CPU when zero.
    pub fn new(worker_count: usize) -> Self {
        let worker_count = if worker_count == 0 {
            num_cpus::get()
        } else {
            worker_count
        };

        let (sender, receiver) = crossbeam_channel::unbounded::<Job>();
        let outstanding = Arc::new(Outstanding::default());

        let workers = (0..worker_count)
            .map(|worker_num| {
                let job_receiver: Receiver<Job> = receiver.clone();
                let outstanding = Arc::clone(&outstanding);

                Worker(
                    worker_num,
                    std::thread::Builder::new()
                        .name(format!("voxel-worker-{}", worker_num))
                        .spawn(move || {
                            debug!("Background worker #{} spawned.", worker_num);

                            loop {
                                match job_receiver.recv() {
                                    Ok(job) => {
                                        job.execute(worker_num);
                                        outstanding.decrement();
                                    }
                                    Err(RecvError) => break,
                                }
                            }

                            debug!("Background worker #{} killed.", worker_num);
                        })
                        .expect("Failed to spawn background worker thread"),
                )
            })
            .collect();

        Self {
            workers,
            sender: Some(sender),
            outstanding,
        }
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Queues work onto the pool, returning a completion.
    pub fn queue<F>(&self, work: F) -> Result<JobCompletion, JobQueueError>
    where
        F: FnOnce() + Send + 'static,
    {
        let sender = self.sender.as_ref().ok_or(JobQueueError::Disconnected)?;
        let completion = Arc::new(AtomicBool::new(false));

        self.outstanding.increment();
        let job = Job {
            work: Box::new(work),
            completion: Arc::clone(&completion),
        };

        if sender.send(job).is_err() {
            self.outstanding.decrement();
            return Err(JobQueueError::Disconnected);
        }

        Ok(JobCompletion(completion))
    }

    /// Number of jobs queued or running.
    pub fn outstanding(&self) -> usize {
        *self.outstanding.lock()
    }

    /// Blocks until every queued job has finished.
    pub fn wait_idle(&self) {
        let mut count = self.outstanding.lock();

        while *count > 0 {
            count = self
                .outstanding
                .drained
                .wait(count)
                .expect("Job queue outstanding mutex has been poisoned!");
        }
    }

    /// Disconnects the channel and joins every worker. Jobs already queued
    /// still run; new ones are rejected.
    pub fn shutdown(&mut self) {
        // Dropping the only sender disconnects the channel, so workers stop
        // waiting once the backlog is empty.
        self.sender = None;
        self.workers.drain(..).for_each(Worker::join);
    }
}

impl Drop for JobQueue {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn wait_idle_observes_every_job() {
        let jobs = JobQueue::new(4);
        let counter = Arc::new(AtomicUsize::new(0));

        let completions: Vec<_> = (0..64)
            .map(|_| {
                let counter = Arc::clone(&counter);
                jobs.queue(move || {
                    counter.fetch_add(1, Ordering::Relaxed);
                })
                .unwrap()
            })
            .collect();

        jobs.wait_idle();
        assert_eq!(counter.load(Ordering::Relaxed), 64);
        assert_eq!(jobs.outstanding(), 0);
        assert!(completions.iter().all(JobCompletion::is_complete));
    }

    #[test]
    fn panicking_job_does_not_stall_the_queue() {
        let jobs = JobQueue::new(1);

        jobs.queue(|| panic!("job failure")).unwrap();
        let after = jobs.queue(|| {}).unwrap();

        jobs.wait_idle();
        assert!(after.is_complete());
    }

    #[test]
    fn rejects_work_after_shutdown() {
        let mut jobs = JobQueue::new(2);
        jobs.shutdown();

        assert_eq!(jobs.worker_count(), 0);
        assert!(matches!(jobs.queue(|| {}), Err(JobQueueError::Disconnected)));
    }
}
