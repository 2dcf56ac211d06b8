//! Review queue adapters

mod in_process;

pub use in_process::{InProcessQueue, InProcessQueueConfig};
