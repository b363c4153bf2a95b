//! Push/pull bridge between an eager producer and an async consumer.
//!
//! The producer side calls [`BridgeQueue::enqueue`] and [`BridgeQueue::flush`]
//! and never blocks. The consumer side calls [`BridgeQueue::next`] (or polls
//! a [`QueueStream`]) and suspends until an item or the end marker arrives.
//!
//! Internally the queue holds an explicit [`QueueState`], a FIFO of pending
//! items and a FIFO of pending pulls. Every state-changing call ends with one
//! settle pass that pairs pulls with items; each iteration of that pass
//! resolves and removes one pending pull, so it always terminates.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll, Waker};

use futures_core::Stream;
use log::{trace, warn};

use crate::error::CodecError;

/// Lifecycle of a [`BridgeQueue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueState {
    /// Accepting items.
    Open,
    /// The end marker is queued; no more items are accepted.
    Flushed,
    /// Terminal. Every pull resolves with [`Step::End`] immediately.
    Done,
}

/// Result of a resolved pull.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step<T> {
    /// The next queued item.
    Item(T),
    /// End of stream, optionally carrying the value passed to
    /// [`BridgeQueue::force_terminate`].
    End(Option<T>),
}

impl<T> Step<T> {
    /// Returns true for [`Step::End`].
    pub fn is_end(&self) -> bool {
        matches!(self, Step::End(_))
    }

    /// Returns the item of a non-terminal step.
    pub fn into_item(self) -> Option<T> {
        match self {
            Step::Item(item) => Some(item),
            Step::End(_) => None,
        }
    }
}

enum Entry<T> {
    Item(T),
    FlushMark,
    RejectMark(String),
}

type Outcome<T> = Result<Step<T>, CodecError>;

struct Inner<T> {
    state: QueueState,
    items: VecDeque<Entry<T>>,
    pulls: VecDeque<u64>,
    resolved: HashMap<u64, Outcome<T>>,
    wakers: HashMap<u64, Waker>,
    rejection: Option<String>,
    next_pull: u64,
}

impl<T> Inner<T> {
    /// Pairs pending pulls with queued items until one side runs dry.
    ///
    /// Returns the wakers of resolved pulls; they are woken after the lock
    /// is released.
    fn settle(&mut self) -> Vec<Waker> {
        let mut woken = Vec::new();

        while let Some(&id) = self.pulls.front() {
            let outcome = if self.state == QueueState::Done {
                match self.rejection.take() {
                    Some(reason) => Err(CodecError::Rejected(reason)),
                    None => Ok(Step::End(None)),
                }
            } else {
                match self.items.pop_front() {
                    Some(Entry::FlushMark) => {
                        self.state = QueueState::Done;
                        Ok(Step::End(None))
                    }
                    Some(Entry::RejectMark(reason)) => {
                        self.state = QueueState::Done;
                        Err(CodecError::Rejected(reason))
                    }
                    Some(Entry::Item(item)) => Ok(Step::Item(item)),
                    None => break,
                }
            };

            self.pulls.pop_front();
            self.resolved.insert(id, outcome);
            if let Some(waker) = self.wakers.remove(&id) {
                woken.push(waker);
            }
        }

        woken
    }
}

/// An unbounded FIFO that turns pushed items into awaitable pulls.
///
/// Cloning yields another handle to the same queue, so one handle can live
/// with the producer and one with the consumer task.
///
/// # Example
///
/// ```
/// use tgapng::{BridgeQueue, Step};
///
/// # tokio_test::block_on(async {
/// let queue = BridgeQueue::new();
/// queue.enqueue(1)?;
/// queue.enqueue(2)?;
/// queue.flush();
///
/// assert_eq!(queue.next().await?, Step::Item(1));
/// assert_eq!(queue.next().await?, Step::Item(2));
/// assert_eq!(queue.next().await?, Step::End(None));
/// assert_eq!(queue.next().await?, Step::End(None));
/// # Ok::<(), tgapng::CodecError>(())
/// # }).unwrap();
/// ```
pub struct BridgeQueue<T> {
    inner: Arc<Mutex<Inner<T>>>,
}

impl<T> BridgeQueue<T> {
    /// Creates an open, empty queue.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                state: QueueState::Open,
                items: VecDeque::new(),
                pulls: VecDeque::new(),
                resolved: HashMap::new(),
                wakers: HashMap::new(),
                rejection: None,
                next_pull: 0,
            })),
        }
    }

    /// Returns the current lifecycle state.
    pub fn state(&self) -> QueueState {
        self.lock().state
    }

    /// Returns true once the end marker was queued or the queue terminated.
    pub fn is_flushed(&self) -> bool {
        self.state() != QueueState::Open
    }

    /// Returns true once the queue reached its terminal state.
    pub fn is_done(&self) -> bool {
        self.state() == QueueState::Done
    }

    /// Returns the number of queued entries, the end marker included.
    pub fn pending_items(&self) -> usize {
        self.lock().items.len()
    }

    /// Returns the number of pulls waiting for an item.
    pub fn pending_pulls(&self) -> usize {
        self.lock().pulls.len()
    }

    /// Appends an item.
    ///
    /// Fails with [`CodecError::AlreadyFlushed`] once the queue is flushed
    /// or done.
    pub fn enqueue(&self, item: T) -> Result<(), CodecError> {
        self.update(|inner| {
            if inner.state != QueueState::Open {
                return Err(CodecError::AlreadyFlushed);
            }
            inner.items.push_back(Entry::Item(item));
            Ok(())
        })
    }

    /// Queues the end marker. Calling it again has no further effect.
    pub fn flush(&self) {
        self.update(|inner| {
            if inner.state == QueueState::Open {
                inner.state = QueueState::Flushed;
                inner.items.push_back(Entry::FlushMark);
                trace!("queue flushed with {} pending items", inner.items.len() - 1);
            }
        })
    }

    /// Registers a pull and returns a future resolving to the next step.
    ///
    /// Pulls resolve in registration order.
    pub fn next(&self) -> Next<T> {
        let id = self.update(|inner| {
            let id = inner.next_pull;
            inner.next_pull += 1;
            inner.pulls.push_back(id);
            id
        });
        Next {
            inner: Arc::clone(&self.inner),
            id,
            completed: false,
        }
    }

    /// Terminates the queue immediately, discarding queued items.
    ///
    /// Returns a terminal step carrying `value`. Pending and future pulls
    /// resolve with [`Step::End`] without suspending.
    pub fn force_terminate(&self, value: Option<T>) -> Step<T> {
        self.update(|inner| {
            if inner.state != QueueState::Done {
                warn!(
                    "queue terminated with {} unconsumed items",
                    inner.items.len()
                );
            }
            inner.state = QueueState::Done;
            inner.items.clear();
        });
        Step::End(value)
    }

    /// Fails the queue with [`CodecError::Rejected`].
    ///
    /// Items already queued are still delivered; the pull that would have
    /// seen the end marker fails instead, and the queue is then done. A
    /// queue that is already done fails its next pull once.
    pub fn reject(&self, reason: impl Into<String>) {
        let reason = reason.into();
        warn!("queue rejected: {}", reason);
        self.update(|inner| match inner.state {
            QueueState::Done => inner.rejection = Some(reason),
            QueueState::Open | QueueState::Flushed => {
                inner.items.retain(|entry| matches!(entry, Entry::Item(_)));
                inner.items.push_back(Entry::RejectMark(reason));
                inner.state = QueueState::Flushed;
            }
        })
    }

    /// Returns a [`Stream`] over this queue's items.
    pub fn stream(&self) -> QueueStream<T> {
        QueueStream {
            queue: self.clone(),
            pending: None,
            finished: false,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<T>> {
        lock_inner(&self.inner)
    }

    fn update<R>(&self, f: impl FnOnce(&mut Inner<T>) -> R) -> R {
        let (result, woken) = {
            let mut inner = self.lock();
            let result = f(&mut inner);
            (result, inner.settle())
        };
        for waker in woken {
            waker.wake();
        }
        result
    }
}

fn lock_inner<T>(inner: &Mutex<Inner<T>>) -> MutexGuard<'_, Inner<T>> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<T> Clone for BridgeQueue<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for BridgeQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for BridgeQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.lock();
        f.debug_struct("BridgeQueue")
            .field("state", &inner.state)
            .field("items", &inner.items.len())
            .field("pulls", &inner.pulls.len())
            .finish()
    }
}

/// Future returned by [`BridgeQueue::next`].
pub struct Next<T> {
    inner: Arc<Mutex<Inner<T>>>,
    id: u64,
    completed: bool,
}

impl<T> Future for Next<T> {
    type Output = Result<Step<T>, CodecError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = &mut *self;
        let mut inner = lock_inner(&this.inner);

        match inner.resolved.remove(&this.id) {
            Some(outcome) => {
                this.completed = true;
                Poll::Ready(outcome)
            }
            None => {
                inner.wakers.insert(this.id, cx.waker().clone());
                Poll::Pending
            }
        }
    }
}

impl<T> Drop for Next<T> {
    fn drop(&mut self) {
        if self.completed {
            return;
        }
        let woken = {
            let mut inner = lock_inner(&self.inner);
            inner.pulls.retain(|&id| id != self.id);
            inner.wakers.remove(&self.id);
            // A resolved outcome nobody observed goes back to the queue.
            match inner.resolved.remove(&self.id) {
                Some(Ok(Step::Item(item))) if inner.state != QueueState::Done => {
                    inner.items.push_front(Entry::Item(item));
                }
                Some(Err(CodecError::Rejected(reason))) => inner.rejection = Some(reason),
                _ => {}
            }
            inner.settle()
        };
        for waker in woken {
            waker.wake();
        }
    }
}

/// A [`Stream`] of the items of a [`BridgeQueue`].
///
/// Ends after the end marker or termination. A rejection is yielded once as
/// an error, after which the stream ends.
pub struct QueueStream<T> {
    queue: BridgeQueue<T>,
    pending: Option<Next<T>>,
    finished: bool,
}

impl<T> QueueStream<T> {
    /// Returns the queue this stream pulls from.
    pub fn queue(&self) -> &BridgeQueue<T> {
        &self.queue
    }
}

impl<T> Stream for QueueStream<T> {
    type Item = Result<T, CodecError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;

        if this.finished {
            return Poll::Ready(None);
        }

        let queue = &this.queue;
        let next = this.pending.get_or_insert_with(|| queue.next());
        let outcome = match Pin::new(next).poll(cx) {
            Poll::Pending => return Poll::Pending,
            Poll::Ready(outcome) => outcome,
        };
        this.pending = None;

        match outcome {
            Ok(Step::Item(item)) => Poll::Ready(Some(Ok(item))),
            Ok(Step::End(_)) => {
                this.finished = true;
                Poll::Ready(None)
            }
            Err(e) => {
                this.finished = true;
                Poll::Ready(Some(Err(e)))
            }
        }
    }
}
