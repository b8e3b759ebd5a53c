//! # Task Management System
//!
//! This module provides the worker pool that runs chunk mesh builds off the
//! coordinating thread.
//!
//! ## Architecture Overview
//!
//! The task management system consists of several key components:
//! - `TaskManager`: Central coordinator for task distribution and worker management
//! - `Task`: A unit of work that can be executed asynchronously
//! - `TaskHandle`: The publisher's side of a task, polled for its output
//! - `TaskChannel`: Communication channel between the coordinating thread and a worker
//!
//! ## Task Lifecycle
//! 1. Tasks are created and published via `TaskManager::publish_task()`
//! 2. The manager distributes tasks to available worker channels using round-robin,
//!    or queues them when every worker is busy
//! 3. Workers process tasks and send the output over the task's own channel
//! 4. `process_completed_tasks()` frees up worker slots
//! 5. `process_queued_tasks()` hands queued tasks to the freed workers
//! 6. The publisher polls its `TaskHandle` until the output arrives
//!
//! ## Example Usage
//! ```ignore
//! let mut task_manager = TaskManager::new(4);
//! let handle = task_manager.publish_task(MyTask::new(...));
//!
//! // In the main loop:
//! task_manager.process_completed_tasks();
//! task_manager.process_queued_tasks();
//! if let TaskPoll::Ready(output) = handle.poll() { ... }
//! ```

pub mod task;

use log::{debug, error, info};
use std::collections::VecDeque;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use task::{Task, TaskHandle};

/// A type-erased task, ready to run on a worker.
type Job = Box<dyn FnOnce() + Send + 'static>;

/// A job waiting for a free worker, with the cancel flag of its handle.
struct QueuedJob {
    cancelled: Arc<AtomicBool>,
    job: Job,
}

/// A communication channel between the coordinating thread and a worker thread.
///
/// # Fields
/// - `task_sender`: Sends jobs from the coordinating thread to the worker
/// - `completion_receiver`: Receives one notice per finished job
/// - `num_tasks_in_flight`: Tracks number of jobs currently handed to the worker
/// - `_worker`: Handle to the worker thread
///
/// Outputs do not travel over this channel; each task has its own.
#[derive(Debug)]
pub struct TaskChannel {
    task_sender: Sender<Job>,
    completion_receiver: Receiver<()>,
    num_tasks_in_flight: usize,
    _worker: JoinHandle<()>,
}

/// Manages a pool of worker threads and coordinates task execution.
///
/// The `TaskManager` is responsible for:
/// - Creating and managing worker threads
/// - Distributing tasks across available workers
/// - Queuing tasks when all workers are busy
///
/// # Implementation Notes
/// - Drop-safe: dropping the manager closes every channel and the workers exit
/// - Panic-safe: a panicking task is logged and its handle reports `Lost`;
///   the worker keeps serving
pub struct TaskManager {
    channels: Vec<TaskChannel>,
    queued_tasks: VecDeque<QueuedJob>,
    current_channel: usize,
}

/// Maximum number of tasks that can be in flight per worker channel.
///
/// Kept at 1 so a long build on one worker never holds up tasks that another,
/// idle worker could take.
pub const MAX_TASKS_IN_FLIGHT: usize = 1;

impl TaskManager {
    /// Creates a new `TaskManager` with the specified number of worker threads.
    ///
    /// # Arguments
    /// * `num_workers` - Number of worker threads to create
    ///
    /// # Panics
    /// Panics if the underlying thread creation fails.
    pub fn new(num_workers: usize) -> Self {
        let mut channels = Vec::with_capacity(num_workers);

        info!(
            "Starting {} workers, available parallelism: {:?}",
            num_workers,
            thread::available_parallelism()
        );

        for worker_index in 0..num_workers {
            let (task_tx, task_rx) = channel::<Job>();
            let (completion_tx, completion_rx) = channel::<()>();

            let worker_closure = move || {
                while let Ok(job) = task_rx.recv() {
                    if catch_unwind(AssertUnwindSafe(job)).is_err() {
                        error!("Task panicked on worker {}", worker_index);
                    }
                    if completion_tx.send(()).is_err() {
                        break;
                    }
                }
            };

            let worker = thread::Builder::new()
                .name(format!("chunk-worker-{}", worker_index))
                .spawn(worker_closure)
                .unwrap_or_else(|e| panic!("failed to spawn worker {}: {}", worker_index, e));

            channels.push(TaskChannel {
                task_sender: task_tx,
                completion_receiver: completion_rx,
                num_tasks_in_flight: 0,
                _worker: worker,
            });
        }

        TaskManager {
            channels,
            queued_tasks: VecDeque::new(),
            current_channel: 0,
        }
    }

    /// Attempts to send a job to a specific worker channel.
    ///
    /// # Returns
    /// - `Ok(())` if the job was handed to the worker
    /// - `Err(job)` if the worker has disconnected, allowing for requeueing
    fn try_send_task(&mut self, job: Job, channel_idx: usize) -> Result<(), Job> {
        match self.channels[channel_idx].task_sender.send(job) {
            Ok(_) => {
                self.channels[channel_idx].num_tasks_in_flight += 1;
                Ok(())
            }
            Err(job) => Err(job.0),
        }
    }

    /// Finds an available worker channel that can accept a new task.
    ///
    /// Round-robin starting from the channel after the last one used, skipping
    /// channels that have reached `MAX_TASKS_IN_FLIGHT`.
    fn find_available_channel(&self) -> Option<usize> {
        if self.channels.is_empty() {
            return None;
        }

        let start_channel = self.current_channel;
        let mut current = start_channel;

        loop {
            if self.channels[current].num_tasks_in_flight < MAX_TASKS_IN_FLIGHT {
                return Some(current);
            }
            current = (current + 1) % self.channels.len();
            if current == start_channel {
                return None;
            }
        }
    }

    /// Publishes a new task for execution.
    ///
    /// The task is handed to a worker immediately if one is free and queued
    /// otherwise. Never blocks.
    ///
    /// # Arguments
    /// * `task` - The task to be executed
    ///
    /// # Returns
    /// The handle through which the task's output is collected or the task is
    /// cancelled.
    pub fn publish_task<T: Task>(&mut self, task: T) -> TaskHandle<T::Output> {
        let (output_tx, output_rx) = channel::<T::Output>();
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = cancelled.clone();

        let job: Job = Box::new(move || {
            if flag.load(Ordering::Acquire) {
                return;
            }
            let output = task.process();
            // The handle may be gone already; the output is then discarded.
            let _ = output_tx.send(output);
        });

        self.dispatch(QueuedJob {
            cancelled: cancelled.clone(),
            job,
        });
        TaskHandle::new(output_rx, cancelled)
    }

    fn dispatch(&mut self, queued: QueuedJob) {
        let QueuedJob { cancelled, job } = queued;
        match self.find_available_channel() {
            Some(channel_idx) => match self.try_send_task(job, channel_idx) {
                Ok(_) => {
                    self.current_channel = (channel_idx + 1) % self.channels.len();
                }
                Err(job) => {
                    self.queued_tasks.push_back(QueuedJob { cancelled, job });
                }
            },
            None => {
                self.queued_tasks.push_back(QueuedJob { cancelled, job });
            }
        }
    }

    /// Processes any queued tasks if workers are available.
    ///
    /// Tasks are taken in FIFO order until the queue is empty or every worker
    /// is busy. Cancelled tasks are dropped here and never occupy a worker.
    /// Call once per tick, after `process_completed_tasks`.
    pub fn process_queued_tasks(&mut self) {
        self.discard_cancelled();

        while !self.queued_tasks.is_empty() {
            let Some(channel_idx) = self.find_available_channel() else {
                break;
            };
            let Some(QueuedJob { cancelled, job }) = self.queued_tasks.pop_front() else {
                break;
            };
            if cancelled.load(Ordering::Acquire) {
                continue;
            }
            match self.try_send_task(job, channel_idx) {
                Ok(_) => {
                    self.current_channel = (channel_idx + 1) % self.channels.len();
                }
                Err(job) => {
                    // Channel is disconnected, put the job back and stop
                    self.queued_tasks.push_front(QueuedJob { cancelled, job });
                    break;
                }
            }
        }
    }

    /// Drops every queued task whose handle was cancelled.
    fn discard_cancelled(&mut self) {
        let before = self.queued_tasks.len();
        self.queued_tasks
            .retain(|queued| !queued.cancelled.load(Ordering::Acquire));
        let dropped = before - self.queued_tasks.len();
        if dropped > 0 {
            debug!("Dropped {} cancelled tasks from the queue", dropped);
        }
    }

    /// Drains completion notices from every worker, freeing their slots.
    ///
    /// # Returns
    /// The number of tasks that finished since the last call.
    pub fn process_completed_tasks(&mut self) -> usize {
        let mut completed = 0;
        for channel in &mut self.channels {
            while channel.completion_receiver.try_recv().is_ok() {
                channel.num_tasks_in_flight = channel.num_tasks_in_flight.saturating_sub(1);
                completed += 1;
            }
        }
        completed
    }

    /// Number of tasks waiting for a free worker.
    pub fn queued_count(&self) -> usize {
        self.queued_tasks.len()
    }

    /// Number of tasks currently handed to workers.
    pub fn in_flight_count(&self) -> usize {
        self.channels.iter().map(|c| c.num_tasks_in_flight).sum()
    }

    /// Number of worker threads.
    pub fn worker_count(&self) -> usize {
        self.channels.len()
    }
}
