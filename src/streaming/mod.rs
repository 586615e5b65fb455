//! Region streaming around a moving viewer

pub mod config;
pub mod priority;
pub mod inbox;
pub mod worker_pool;
pub mod world_streamer;

pub use config::StreamingConfig;
pub use priority::{GenerationQueue, WorkItem};
pub use inbox::CompletedInbox;
pub use worker_pool::GenerationPool;
pub use world_streamer::{LoadedRegion, StreamingStats, WorldStreamer};
