//! High-level facade crate for the `stronghold-*` workspace.
//!
//! This crate provides:
//! - re-exports of the core geometry, vision pipeline and camera-server client
//! - file-level helpers used by the `stronghold` CLI (load frames and
//!   configs, write reports, overlays and stage dumps)
//!
//! ## Quickstart
//!
//! ```no_run
//! use stronghold::detect;
//! use stronghold::vision::{TargetPipeline, VisionConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let frame = detect::load_frame("frame.png")?;
//! let est = TargetPipeline::goal(&VisionConfig::default()).estimate(&frame);
//! match est {
//!     Some(est) => println!("goal at {:.1} in", est.distance),
//!     None => println!("no goal"),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `stronghold::core`: contours, moments, the distance score, trajectories, logging.
//! - `stronghold::vision`: preprocessing, contour scoring, range and bearing.
//! - `stronghold::camserver`: WPILib CameraServer client.
//! - `stronghold::detect`: file helpers for the CLI.

pub use stronghold_camserver as camserver;
pub use stronghold_core as core;
pub use stronghold_vision as vision;

pub use stronghold_core::{Contour, ScoredContour, Trajectory, TrajectoryPoint};
pub use stronghold_vision::{
    goal_pipeline_full, TargetEstimate, TargetPipeline, TargetShape, VisionConfig,
};

pub mod detect;
