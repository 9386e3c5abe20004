//! Concurrency plumbing: sensor mailboxes and the fixed-rate fusion loop.

mod fusion_loop;
mod hub;
mod slot;

pub use fusion_loop::{
    FusionLoop, FusionLoopConfig, LoopStats, SkipReason, TickOutcome, TickReport,
};
pub use hub::SensorHub;
pub use slot::LatestSlot;
