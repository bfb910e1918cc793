pub mod queue;

pub use queue::{EventQueue, QueuedEvent};
