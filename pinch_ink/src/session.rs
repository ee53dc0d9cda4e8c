//! Detection session: `Idle ⇄ Detecting`.
//!
//! Starting acquires a [`LandmarkSource`]; stopping releases its camera and
//! its detector, each step best-effort and independent.  The session also
//! stops itself when dropped, so leaving the frame loop early still releases
//! everything.

use std::time::Instant;

use hand_landmarks::{LandmarkSource, SourceError};
use thiserror::Error;
use tracing::{info, warn};

use crate::controller::{FrameOutcome, Pipeline};
use crate::stroke::InkSurface;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("detection is already running")]
    AlreadyDetecting,

    /// Camera or detector could not be started.  Nothing was left running.
    #[error("could not start detection: {0}")]
    Acquire(#[source] SourceError),

    /// The source failed mid-session; the session has been stopped.
    #[error("detection stopped: {0}")]
    Detect(#[source] SourceError),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Detecting,
}

pub struct Session {
    pipeline: Pipeline,
    source:   Option<Box<dyn LandmarkSource>>,
    frames:   u64,
}

impl Session {
    pub fn new(pipeline: Pipeline) -> Self {
        Session { pipeline, source: None, frames: 0 }
    }

    pub fn state(&self) -> SessionState {
        if self.source.is_some() { SessionState::Detecting } else { SessionState::Idle }
    }

    pub fn is_detecting(&self) -> bool { self.source.is_some() }

    /// Name of the running source, if any.
    pub fn source_name(&self) -> Option<&str> { self.source.as_deref().map(|s| s.name()) }

    pub fn frames(&self) -> u64 { self.frames }

    pub fn pipeline(&self) -> &Pipeline { &self.pipeline }

    pub fn pipeline_mut(&mut self) -> &mut Pipeline { &mut self.pipeline }

    /// `Idle → Detecting`.  `open` acquires the camera and detector.
    pub fn start<F>(&mut self, open: F) -> Result<(), SessionError>
    where
        F: FnOnce() -> Result<Box<dyn LandmarkSource>, SourceError>,
    {
        if self.source.is_some() {
            return Err(SessionError::AlreadyDetecting);
        }
        let source = open().map_err(SessionError::Acquire)?;
        info!(source = source.name(), "detection started");
        self.source = Some(source);
        self.frames = 0;
        Ok(())
    }

    /// `Detecting → Idle`.  Returns false when already idle.
    pub fn stop(&mut self) -> bool {
        let Some(mut source) = self.source.take() else { return false };

        if let Err(e) = source.release_camera() {
            warn!(source = source.name(), error = %e, "camera release failed");
        }
        if let Err(e) = source.close() {
            warn!(source = source.name(), error = %e, "detector close failed");
        }
        self.pipeline.end_session();
        info!(source = source.name(), frames = self.frames, "detection stopped");
        true
    }

    /// Process one frame.  `Ok(None)` while idle.
    ///
    /// A detection error stops the session before it is returned.
    pub fn frame<S: InkSurface + ?Sized>(
        &mut self,
        now:     Instant,
        surface: &mut S,
    ) -> Result<Option<FrameOutcome>, SessionError> {
        let Some(source) = self.source.as_mut() else { return Ok(None) };

        match source.detect(now) {
            Ok(detection) => {
                self.frames += 1;
                Ok(Some(self.pipeline.process_frame(&detection, now, surface)))
            }
            Err(e) => {
                self.stop();
                Err(SessionError::Detect(e))
            }
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) { self.stop(); }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
