//! Blocking worker threads
//!
//! bcrypt hashing takes tens of milliseconds of CPU time, so it runs on a
//! small set of dedicated threads instead of the async runtime. Jobs are
//! served in submission order.

use flume::{Receiver, Sender};
use futures::channel::oneshot;
use std::{future::Future, thread};

use crate::prelude::*;

type Job = Box<dyn FnOnce() + Send>;

#[derive(Debug)]
pub struct WorkerPool {
	jobs: Sender<Job>,
}

impl WorkerPool {
	/// Starts `threads` worker threads (at least one)
	pub fn new(threads: usize) -> Self {
		let (jobs, queue) = flume::unbounded::<Job>();

		for n in 0..threads.max(1) {
			let queue = queue.clone();
			let spawned =
				thread::Builder::new().name(format!("parlay-worker-{}", n)).spawn(move || run_jobs(&queue));
			if let Err(err) = spawned {
				error!("Failed to start worker thread {}: {}", n, err);
			}
		}

		Self { jobs }
	}

	/// Runs `f` on a worker thread and waits for its result
	pub fn run<F, T>(&self, f: F) -> impl Future<Output = ClResult<T>>
	where
		F: FnOnce() -> T + Send + 'static,
		T: Send + 'static,
	{
		let (tx, rx) = oneshot::channel();
		let job: Job = Box::new(move || {
			let _ignore = tx.send(f());
		});
		if self.jobs.send(job).is_err() {
			error!("Worker queue is closed");
		}

		async move { rx.await.map_err(|_| Error::Internal("worker job failed".into())) }
	}

	/// Like `run` for jobs that return a `ClResult` themselves
	pub fn try_run<F, T>(&self, f: F) -> impl Future<Output = ClResult<T>>
	where
		F: FnOnce() -> ClResult<T> + Send + 'static,
		T: Send + 'static,
	{
		let res = self.run(f);
		async move { res.await? }
	}
}

fn run_jobs(queue: &Receiver<Job>) {
	// Ends when the pool, and with it the sender, is dropped
	while let Ok(job) = queue.recv() {
		if let Err(panic) = std::panic::catch_unwind(std::panic::AssertUnwindSafe(job)) {
			error!("Worker job panicked: {:?}", panic);
		}
	}
}


// vim: ts=4
