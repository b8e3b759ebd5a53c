//! # Task System Core Types
//!
//! This module defines the fundamental building blocks of the task system,
//! which executes work asynchronously across a pool of worker threads.
//!
//! ## Core Components
//! - `Task`: Represents a unit of work that can be executed asynchronously
//! - `TaskHandle`: The caller's side of a published task, polled for its output
//! - `TaskPoll`: The outcome of a single non-blocking poll
//!
//! ## Task Lifecycle
//! 1. A `Task` is created and scheduled via `TaskManager::publish_task()`
//! 2. The caller keeps the returned `TaskHandle`
//! 3. The task's `process()` method is called on a worker thread, unless the
//!    handle was cancelled before a worker picked it up
//! 4. The output travels back over the handle's private channel
//! 5. The coordinating thread polls the handle once per tick
//!
//! ## Thread Safety
//! - `Task` must be `Send` to be transferred between threads
//! - `Task::Output` must be `Send` to be transferred back
//! - Shared inputs must be immutable (typically behind an `Arc`)

use std::sync::{
    atomic::{AtomicBool, Ordering},
    mpsc::{Receiver, TryRecvError},
    Arc,
};

/// A trait representing a unit of work that can be executed asynchronously.
///
/// Tasks are the primary mechanism for offloading work from the coordinating
/// thread to background workers. They should be self-contained and own (or
/// share immutably) all the data they need.
///
/// # Implementation Guidelines
/// - Must be `Send + 'static` to be transferred between threads
/// - Should be relatively coarse-grained to amortize scheduling overhead
/// - Should report failures through `Output` rather than panicking
pub trait Task: Send + 'static {
    /// The value produced by the task.
    type Output: Send + 'static;

    /// Processes the task and returns its output.
    ///
    /// Runs on a worker thread. Must not touch thread-local state.
    fn process(&self) -> Self::Output;
}

/// The result of polling a [`TaskHandle`].
#[derive(Debug, PartialEq, Eq)]
pub enum TaskPoll<T> {
    /// The task has not finished yet.
    Pending,
    /// The task finished with this output.
    Ready(T),
    /// The task will never deliver: it was skipped after cancellation, or its
    /// worker panicked or shut down.
    Lost,
}

/// The caller's side of a published task.
///
/// Dropping the handle does not stop a running task; its output is simply
/// discarded when the worker tries to deliver it.
#[derive(Debug)]
pub struct TaskHandle<T> {
    receiver: Receiver<T>,
    cancelled: Arc<AtomicBool>,
}

impl<T> TaskHandle<T> {
    pub(super) fn new(receiver: Receiver<T>, cancelled: Arc<AtomicBool>) -> Self {
        TaskHandle {
            receiver,
            cancelled,
        }
    }

    /// Checks for the task's output without blocking.
    ///
    /// Returns `Ready` at most once. Polling again afterwards yields `Lost`,
    /// because the delivering side has hung up.
    pub fn poll(&self) -> TaskPoll<T> {
        match self.receiver.try_recv() {
            Ok(output) => TaskPoll::Ready(output),
            Err(TryRecvError::Empty) => TaskPoll::Pending,
            Err(TryRecvError::Disconnected) => TaskPoll::Lost,
        }
    }

    /// Marks the task as cancelled.
    ///
    /// A task that no worker has started yet will be skipped. A task that is
    /// already running completes, but its output should be ignored.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Returns `true` once [`TaskHandle::cancel`] has been called.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc::channel;

    use super::*;

    #[test]
    fn poll_reports_each_channel_state() {
        let (sender, receiver) = channel();
        let handle = TaskHandle::new(receiver, Arc::new(AtomicBool::new(false)));

        assert_eq!(handle.poll(), TaskPoll::Pending);
        sender.send(11).unwrap();
        drop(sender);
        assert_eq!(handle.poll(), TaskPoll::Ready(11));
        assert_eq!(handle.poll(), TaskPoll::Lost);
    }

    #[test]
    fn cancel_is_visible_through_the_shared_flag() {
        let (_sender, receiver) = channel::<()>();
        let flag = Arc::new(AtomicBool::new(false));
        let handle = TaskHandle::new(receiver, flag.clone());

        assert!(!handle.is_cancelled());
        handle.cancel();
        assert!(handle.is_cancelled());
        assert!(flag.load(Ordering::Acquire));
    }
}
