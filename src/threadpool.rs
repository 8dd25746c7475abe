//! A bounded FIFO thread pool (spec §4.6, §9), built from `std::thread` and
//! `std::sync` only — no async runtime, no work-stealing — mirroring the
//! dependency-light concurrency style `original_source`'s `ThreadPool`/
//! `WorkItem` collaborator uses (not itself in the retrieval pack, but
//! named by `main.cpp`).

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;

type Job = Box<dyn FnOnce() + Send + 'static>;

struct Shared {
    queue: Mutex<VecDeque<Job>>,
    queue_cv: Condvar,
    in_flight: Mutex<usize>,
    idle_cv: Condvar,
    shutdown: Mutex<bool>,
}

/// A fixed-size pool of worker threads draining a FIFO job queue.
pub struct ThreadPool {
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
}

impl ThreadPool {
    pub fn new(num_threads: usize) -> Self {
        let num_threads = num_threads.max(1);
        let shared = Arc::new(Shared {
            queue: Mutex::new(VecDeque::new()),
            queue_cv: Condvar::new(),
            in_flight: Mutex::new(0),
            idle_cv: Condvar::new(),
            shutdown: Mutex::new(false),
        });

        let workers = (0..num_threads)
            .map(|_| {
                let shared = Arc::clone(&shared);
                std::thread::spawn(move || worker_loop(shared))
            })
            .collect();

        Self { shared, workers }
    }

    /// Enqueues `job`, to be picked up by the next free worker (FIFO).
    pub fn submit(&self, job: impl FnOnce() + Send + 'static) {
        *self.shared.in_flight.lock().unwrap() += 1;
        self.shared.queue.lock().unwrap().push_back(Box::new(job));
        self.shared.queue_cv.notify_one();
    }

    /// Blocks until every submitted job has completed and the queue is
    /// empty.
    pub fn wait(&self) {
        let guard = self.shared.in_flight.lock().unwrap();
        let _unused = self
            .shared
            .idle_cv
            .wait_while(guard, |n| *n > 0)
            .unwrap();
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        *self.shared.shutdown.lock().unwrap() = true;
        self.shared.queue_cv.notify_all();
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
    }
}

fn worker_loop(shared: Arc<Shared>) {
    loop {
        let job = {
            let mut queue = shared.queue.lock().unwrap();
            loop {
                if let Some(job) = queue.pop_front() {
                    break Some(job);
                }
                if *shared.shutdown.lock().unwrap() {
                    break None;
                }
                queue = shared.queue_cv.wait(queue).unwrap();
            }
        };
        let Some(job) = job else {
            return;
        };
        job();
        let mut in_flight = shared.in_flight.lock().unwrap();
        *in_flight -= 1;
        if *in_flight == 0 {
            shared.idle_cv.notify_all();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn all_submitted_jobs_run_before_wait_returns() {
        let pool = ThreadPool::new(4);
        let counter = Arc::new(AtomicUsize::new(0));
        for _ in 0..200 {
            let counter = Arc::clone(&counter);
            pool.submit(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }
        pool.wait();
        assert_eq!(counter.load(Ordering::SeqCst), 200);
    }

    #[test]
    fn pool_can_be_reused_across_multiple_waits() {
        let pool = ThreadPool::new(2);
        let counter = Arc::new(AtomicUsize::new(0));
        for round in 0..3 {
            for _ in 0..10 {
                let counter = Arc::clone(&counter);
                pool.submit(move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                });
            }
            pool.wait();
            assert_eq!(counter.load(Ordering::SeqCst), 10 * (round + 1));
        }
    }
}
