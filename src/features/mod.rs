//! # Features
//!
//! - `matching`: trigger resolution, argument extraction, access gate
//! - `dispatch`: the local and payload dispatchers and their shared loop
//! - `queue`: hand-off between the tiers, in process or over a byte stream
//! - `lookup`: entity metadata resolved through another process

pub mod dispatch;
pub mod lookup;
pub mod matching;
pub mod queue;

pub use dispatch::{Listener, Processor, TaskStats};
pub use lookup::{BusLookup, RemoteLookup, RequestBus};
pub use queue::{QueueForwarder, WorkRequest};
