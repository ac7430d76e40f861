//! FIFO work queues.
//!
//! Each queue is one JSON array stored at `<queue_root>/<name>`. Sends append
//! to the tail; receives pop from the head and persist the remainder in the
//! same locked cycle, so a received task is gone from storage before it is
//! returned. There is no visibility timeout and no redelivery.

mod store;
mod task;

pub use store::QueueStore;
pub use task::{BatchResponse, FailedTask, ReceiveOptions, Task};
