//! Push/pull decoupling queue.
//!
//! - [`BridgeQueue`] - Unbounded FIFO with an explicit end-of-stream protocol
//! - [`QueueStream`] - [`futures_core::Stream`] view of a queue's items
//! - [`Step`] - What a single pull resolved to

mod bridge;

pub use bridge::{BridgeQueue, Next, QueueState, QueueStream, Step};
