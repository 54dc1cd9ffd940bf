//! Deferred actions: a multi-producer, single-consumer FIFO
//!
//! Any thread may enqueue through a [`DeferredSender`]; only the owner of
//! the [`DeferredQueue`] drains it. Nothing is ever cancelled: an enqueued
//! action always runs on a later drain.

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::core::error::Result;

/// A mutation run against the target on the tick thread
pub type DeferredAction<T> = Box<dyn FnOnce(&mut T) -> Result<()> + Send>;

pub struct DeferredQueue<T> {
    tx: Sender<DeferredAction<T>>,
    rx: Receiver<DeferredAction<T>>,
}

impl<T> DeferredQueue<T> {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    /// A cloneable handle for other threads
    pub fn sender(&self) -> DeferredSender<T> {
        DeferredSender { tx: self.tx.clone() }
    }

    pub fn push(&self, action: DeferredAction<T>) {
        // The queue owns a receiver, so the channel cannot be disconnected here
        let _ = self.tx.send(action);
    }

    /// Everything queued so far, in FIFO order.
    ///
    /// Actions enqueued while the batch runs wait for the next drain.
    pub fn drain(&self) -> Vec<DeferredAction<T>> {
        self.rx.try_iter().collect()
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

impl<T> Default for DeferredQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Enqueue handle; cheap to clone and `Send`
pub struct DeferredSender<T> {
    tx: Sender<DeferredAction<T>>,
}

impl<T> Clone for DeferredSender<T> {
    fn clone(&self) -> Self {
        Self { tx: self.tx.clone() }
    }
}

impl<T> DeferredSender<T> {
    /// Returns false when the queue has been dropped
    pub fn send(&self, action: impl FnOnce(&mut T) -> Result<()> + Send + 'static) -> bool {
        self.tx.send(Box::new(action)).is_ok()
    }
}
