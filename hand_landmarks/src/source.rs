//! The landmark-source boundary.
//!
//! The pipeline never cares whether hands come from a webcam model, a
//! LeapMotion controller or the mouse; it only calls [`LandmarkSource`].

use std::time::Instant;

use thiserror::Error;

use crate::DetectionResult;

/// Errors raised by a landmark source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The camera or the detector could not be brought up.
    #[error("failed to acquire {what}: {reason}")]
    Acquire { what: &'static str, reason: String },

    /// The detector stopped producing frames.
    #[error("landmark source disconnected")]
    Disconnected,

    /// A frame could not be decoded.
    #[error("malformed detection: {0}")]
    Malformed(String),

    /// Releasing the camera or detector failed.
    #[error("failed to release {what}: {reason}")]
    Release { what: &'static str, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Anything that can deliver a [`DetectionResult`] per frame.
///
/// `release_camera` and `close` are separate so a failure in one does not
/// keep the other from running.  Both must be safe to call more than once.
pub trait LandmarkSource {
    /// Short human-readable name for logs and the status bar.
    fn name(&self) -> &str;

    /// Produce the hands visible at `timestamp`.  Completes before the
    /// pipeline runs for this frame.
    fn detect(&mut self, timestamp: Instant) -> Result<DetectionResult, SourceError>;

    /// Release the camera feeding this source.
    fn release_camera(&mut self) -> Result<(), SourceError> { Ok(()) }

    /// Release the detector's own resources.
    fn close(&mut self) -> Result<(), SourceError> { Ok(()) }
}

impl<S: LandmarkSource + ?Sized> LandmarkSource for Box<S> {
    fn name(&self) -> &str { (**self).name() }

    fn detect(&mut self, timestamp: Instant) -> Result<DetectionResult, SourceError> {
        (**self).detect(timestamp)
    }

    fn release_camera(&mut self) -> Result<(), SourceError> { (**self).release_camera() }

    fn close(&mut self) -> Result<(), SourceError> { (**self).close() }
}
