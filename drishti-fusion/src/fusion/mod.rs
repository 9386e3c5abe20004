//! Scanner/camera fusion.

mod associate;

pub use associate::{FusionAssociator, FusionOutput, MountingConfig};
