//! Main-thread task queue
//!
//! Callbacks that arrive on producer threads often have to touch state that
//! belongs to the main loop. Instead of a process-wide dispatcher, the main
//! loop owns a [`TaskQueue`] and hands cloned [`TaskSender`]s to whoever needs
//! to schedule work on it. Queued tasks run, in order, when the owner calls
//! [`TaskQueue::drain`].

use std::sync::mpsc::{self, Receiver, Sender};

use thiserror::Error;

use crate::foundation::logging::trace;

type Task<C> = Box<dyn FnOnce(&mut C) + Send>;

/// The owning queue was dropped before the task could be scheduled
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("task queue has been dropped")]
pub struct TaskQueueClosed;

/// Queue of deferred tasks run against a context of type `C`
pub struct TaskQueue<C> {
    sender: Sender<Task<C>>,
    receiver: Receiver<Task<C>>,
}

impl<C> TaskQueue<C> {
    /// Create an empty queue
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self { sender, receiver }
    }

    /// Handle for scheduling tasks from any thread
    pub fn sender(&self) -> TaskSender<C> {
        TaskSender {
            sender: self.sender.clone(),
        }
    }

    /// Run every task queued so far against `context`
    ///
    /// Tasks queued while draining run in the same call. Returns how many ran.
    pub fn drain(&self, context: &mut C) -> usize {
        let mut count = 0;
        while let Ok(task) = self.receiver.try_recv() {
            task(context);
            count += 1;
        }
        if count > 0 {
            trace!("Ran {count} queued tasks");
        }
        count
    }
}

impl<C> Default for TaskQueue<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> std::fmt::Debug for TaskQueue<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskQueue").finish_non_exhaustive()
    }
}

/// Cloneable handle that schedules tasks on a [`TaskQueue`]
pub struct TaskSender<C> {
    sender: Sender<Task<C>>,
}

impl<C> TaskSender<C> {
    /// Schedule `task` to run on the queue's owner
    pub fn send(&self, task: impl FnOnce(&mut C) + Send + 'static) -> Result<(), TaskQueueClosed> {
        self.sender.send(Box::new(task)).map_err(|_| TaskQueueClosed)
    }
}

impl<C> Clone for TaskSender<C> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<C> std::fmt::Debug for TaskSender<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskSender").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tasks_run_in_order_on_drain() {
        let queue = TaskQueue::<Vec<u32>>::new();
        let sender = queue.sender();

        sender.send(|log| log.push(1)).expect("send");
        sender.send(|log| log.push(2)).expect("send");

        let mut log = Vec::new();
        assert_eq!(queue.drain(&mut log), 2);
        assert_eq!(log, vec![1, 2]);
        assert_eq!(queue.drain(&mut log), 0);
    }

    #[test]
    fn test_senders_work_across_threads() {
        let queue = TaskQueue::<u32>::new();
        let sender = queue.sender();

        let workers: Vec<_> = (0..4)
            .map(|_| {
                let sender = sender.clone();
                std::thread::spawn(move || sender.send(|total| *total += 1))
            })
            .collect();
        for worker in workers {
            worker.join().expect("thread").expect("send");
        }

        let mut total = 0;
        queue.drain(&mut total);
        assert_eq!(total, 4);
    }

    #[test]
    fn test_send_after_drop_fails() {
        let queue = TaskQueue::<()>::new();
        let sender = queue.sender();
        drop(queue);

        assert_eq!(sender.send(|_| {}), Err(TaskQueueClosed));
    }
}
