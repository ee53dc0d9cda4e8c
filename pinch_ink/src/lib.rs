//! # pinch_ink
//!
//! Turns a stream of hand-landmark detections into ink.
//!
//! ## Per-frame chain
//!
//! ```text
//! LandmarkSource ─► PinchDetector ─► (tool on?) ─► PointSmoother ─► StrokeRenderer ─► InkSurface
//!                                                              └─► drag position
//! ```
//!
//! | Stage | Module | State it owns |
//! |---|---|---|
//! | Pinch-to-toggle | [`pinch`] | pinched flag, last toggle instant |
//! | Smoothing | [`smoother`] | bounded window of raw fingertips |
//! | Stroke | [`stroke`] | stroke path, previous point |
//! | Ink raster | [`raster`] | ARGB overlay |
//! | Tool/mode | [`controller`] | tool, mode, drag position |
//! | Start/stop | [`session`] | the running landmark source |
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::time::Instant;
//! use pinch_ink::{Pipeline, PipelineConfig, InkLayer, Brush};
//! use hand_landmarks::DetectionResult;
//!
//! let cfg = PipelineConfig::default();
//! let mut ink = InkLayer::new(cfg.canvas_width, cfg.canvas_height, Brush::default());
//! let mut pipeline = Pipeline::new(cfg);
//!
//! let detection = DetectionResult::empty(); // from a LandmarkSource
//! let outcome = pipeline.process_frame(&detection, Instant::now(), &mut ink);
//! for event in outcome.events { println!("{event:?}"); }
//! ```

pub mod config;
pub mod controller;
pub mod pinch;
pub mod raster;
pub mod session;
pub mod smoother;
pub mod stroke;

pub use config::{ConfigError, PipelineConfig};
pub use controller::{AppMode, FrameOutcome, ModeEvent, Pipeline, Tool};
pub use pinch::{PinchDetector, PinchReading, PinchState};
pub use raster::{Brush, InkLayer};
pub use session::{Session, SessionError, SessionState};
pub use smoother::PointSmoother;
pub use stroke::{InkSurface, QuadSegment, StrokePath, StrokeRenderer};
