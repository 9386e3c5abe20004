//! Camera frame source replaying still images from a directory.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

use drishti_fusion::{CameraFrame, SensorHub, Timestamped};
use tracing::{info, warn};

use crate::error::{NodeError, Result};
use crate::sources::epoch_micros;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp"];

/// Replays a directory of images as a camera stream.
///
/// Files are published in lexicographic order and the sequence wraps
/// around, so a short recording loops forever.
pub struct FrameSource {
    files: Vec<PathBuf>,
    period: Duration,
}

impl FrameSource {
    /// Scans `dir` for image files. Fails if the directory cannot be read
    /// or contains no images.
    pub fn new(dir: &Path, rate_hz: f32) -> Result<Self> {
        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            let is_image = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()));
            if is_image {
                files.push(path);
            }
        }
        files.sort();

        if files.is_empty() {
            return Err(NodeError::Config(format!(
                "no image files in {}",
                dir.display()
            )));
        }

        Ok(Self {
            files,
            period: Duration::from_secs_f32(1.0 / rate_hz.max(0.1)),
        })
    }

    pub fn frame_count(&self) -> usize {
        self.files.len()
    }

    /// Starts the replay thread. Runs until `shutdown` is set.
    pub fn spawn(self, hub: Arc<SensorHub>, shutdown: Arc<AtomicBool>) -> JoinHandle<()> {
        std::thread::spawn(move || {
            info!(
                "Frame source started: {} files at {:.1} Hz",
                self.files.len(),
                1.0 / self.period.as_secs_f32()
            );

            let mut index = 0;
            while !shutdown.load(Ordering::Relaxed) {
                let path = &self.files[index % self.files.len()];
                index += 1;

                match image::open(path) {
                    Ok(img) => {
                        let rgb = img.to_rgb8();
                        let (width, height) = rgb.dimensions();
                        let frame = CameraFrame::new(width, height, rgb.into_raw());
                        hub.publish_frame(Timestamped::new(frame, epoch_micros()));
                    }
                    Err(e) => {
                        warn!("Skipping unreadable frame {}: {}", path.display(), e);
                    }
                }

                std::thread::sleep(self.period);
            }

            info!("Frame source stopped");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_test_image(dir: &Path, name: &str) {
        let img = image::RgbImage::new(4, 4);
        img.save(dir.join(name)).unwrap();
    }

    #[test]
    fn test_empty_directory_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let result = FrameSource::new(dir.path(), 10.0);
        assert!(matches!(result, Err(NodeError::Config(_))));
    }

    #[test]
    fn test_counts_image_files() {
        let dir = tempfile::tempdir().unwrap();
        write_test_image(dir.path(), "frame_000.png");
        write_test_image(dir.path(), "frame_001.png");

        let source = FrameSource::new(dir.path(), 10.0).unwrap();
        assert_eq!(source.frame_count(), 2);
    }

    #[test]
    fn test_non_image_files_ignored() {
        let dir = tempfile::tempdir().unwrap();
        write_test_image(dir.path(), "frame_000.png");
        std::fs::write(dir.path().join("notes.txt"), "not an image").unwrap();

        let source = FrameSource::new(dir.path(), 10.0).unwrap();
        assert_eq!(source.frame_count(), 1);
    }

    #[test]
    fn test_spawn_publishes_frames() {
        let dir = tempfile::tempdir().unwrap();
        write_test_image(dir.path(), "frame_000.png");

        let source = FrameSource::new(dir.path(), 1000.0).unwrap();
        let hub = Arc::new(SensorHub::new());
        let shutdown = Arc::new(AtomicBool::new(false));

        let handle = source.spawn(hub.clone(), shutdown.clone());
        std::thread::sleep(Duration::from_millis(50));
        shutdown.store(true, Ordering::Relaxed);
        handle.join().unwrap();

        let frame = hub.latest_frame();
        assert!(frame.is_some());
        assert_eq!(frame.unwrap().data.width, 4);
    }
}
