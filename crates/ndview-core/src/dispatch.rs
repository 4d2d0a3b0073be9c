//! Blocking hand-off of work from a producer thread to the UI thread.
//!
//! The UI thread owns a [`UiQueue`] and pumps it from its event loop. Any
//! other thread holding a [`UiDispatcher`] can submit a task and block until
//! the UI thread has run it, receiving the task's result (or the reason it
//! could not run) in return.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc;
use std::thread::{self, ThreadId};
use std::time::Duration;

use crate::error::{Result, ViewerError};

type Task = Box<dyn FnOnce() + Send + 'static>;

/// Create a task queue bound to the calling thread, which becomes the UI
/// thread: tasks submitted through the dispatcher run wherever the queue is
/// pumped, and calls made from this thread itself run inline.
pub fn ui_channel() -> (UiDispatcher, UiQueue) {
    let (tx, rx) = mpsc::channel();
    let ui_thread = thread::current().id();
    (UiDispatcher { tx, ui_thread }, UiQueue { rx, ui_thread })
}

/// Producer-side handle for submitting tasks to the UI thread.
#[derive(Clone, Debug)]
pub struct UiDispatcher {
    tx: mpsc::Sender<Task>,
    ui_thread: ThreadId,
}

impl UiDispatcher {
    pub fn is_ui_thread(&self) -> bool {
        thread::current().id() == self.ui_thread
    }

    /// Run `task` on the UI thread and wait for it to finish.
    ///
    /// There is no timeout. Fails with [`ViewerError::UiThreadUnavailable`] if
    /// the queue is dropped before the task runs, and with
    /// [`ViewerError::UiTaskPanicked`] if the task panics. Called from the UI
    /// thread itself the task runs immediately.
    pub fn invoke_and_wait<T, F>(&self, task: F) -> Result<T>
    where
        F: FnOnce() -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        if self.is_ui_thread() {
            return run_guarded(task);
        }

        let (reply_tx, reply_rx) = mpsc::sync_channel(1);
        let job: Task = Box::new(move || {
            // The producer only goes away if it was itself torn down.
            let _ = reply_tx.send(run_guarded(task));
        });
        self.tx
            .send(job)
            .map_err(|_| ViewerError::UiThreadUnavailable)?;
        reply_rx
            .recv()
            .map_err(|_| ViewerError::UiThreadUnavailable)?
    }
}

/// UI-side end of the queue. Pump it from the UI thread's event loop.
#[derive(Debug)]
pub struct UiQueue {
    rx: mpsc::Receiver<Task>,
    ui_thread: ThreadId,
}

impl UiQueue {
    /// Run every task already queued without blocking. Returns how many ran.
    pub fn run_pending(&self) -> usize {
        self.debug_check_thread();
        let mut ran = 0;
        while let Ok(task) = self.rx.try_recv() {
            task();
            ran += 1;
        }
        ran
    }

    /// Wait up to `timeout` for one task and run it. Returns whether a task ran.
    pub fn run_next_timeout(&self, timeout: Duration) -> bool {
        self.debug_check_thread();
        match self.rx.recv_timeout(timeout) {
            Ok(task) => {
                task();
                true
            }
            Err(_) => false,
        }
    }

    /// Run tasks until every dispatcher has been dropped.
    pub fn run_until_disconnected(&self) {
        self.debug_check_thread();
        while let Ok(task) = self.rx.recv() {
            task();
        }
    }

    fn debug_check_thread(&self) {
        debug_assert_eq!(
            thread::current().id(),
            self.ui_thread,
            "UiQueue pumped from a thread other than the one that created it"
        );
    }
}

fn run_guarded<T>(task: impl FnOnce() -> Result<T>) -> Result<T> {
    panic::catch_unwind(AssertUnwindSafe(task))
        .map_err(|payload| ViewerError::UiTaskPanicked(panic_message(payload.as_ref())))?
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_owned()
    }
}
