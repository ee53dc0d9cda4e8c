//! # pinch_paint
//!
//! Draw in the air: a pinch of thumb and index finger toggles a pen that
//! follows the fingertip, or grabs an image and drags it across the canvas.
//!
//! ## Pinch → Action mapping
//!
//! | Mode | Pinch | Fingertip while on |
//! |---|---|---|
//! | Draw | pen on / off (300 ms cooldown) | smoothed curve on the canvas |
//! | Drag | drag on / off (600 ms cooldown) | image centre |
//!
//! ## Landmark sources
//!
//! * (default) **Simulation**: the mouse is the index fingertip; hold the
//!   left button or `Space` to pinch.
//! * **External detector**: a child process owning the webcam prints
//!   JSON-lines landmarks (`--detector "python3 hand_detect.py"`).
//! * `leap` feature: a LeapMotion controller via LeapC (`--leap`).
//!
//! ### Keys
//!
//! | Key | Action |
//! |---|---|
//! | `S` | Start / stop detection |
//! | `M` | Switch draw ⇄ drag (clears the canvas) |
//! | `C` | Clear the canvas |
//! | `H` | Hide / show the simulated hand |
//! | `Q` / `Escape` | Quit |

pub mod app;
pub mod args;
pub mod detector;
#[cfg(feature = "leap")]
pub mod leap;
pub mod sim;
pub mod sprite;
pub mod visualizer;
