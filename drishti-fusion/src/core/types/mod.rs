//! Core data types for the fusion pipeline.

mod detection;
mod frame;
mod geometry;
mod pose;
mod scan;
mod timestamped;

pub use detection::{Detection, FusionMatch, VcsPoint};
pub use frame::CameraFrame;
pub use geometry::{BoundingBox, ImagePoint, Point2D, Point3D};
pub use pose::ExtrinsicPose;
pub use scan::LaserScan;
pub use timestamped::Timestamped;
