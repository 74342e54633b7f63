//! Core geometry for the stronghold vision pipeline.
//!
//! This crate is deliberately free of image types: it works on integer
//! contours and plain numbers so the vision crate, the camera-server client
//! and tests can share it without pulling in an image stack.
//!
//! - [`Contour`], [`BoundingRect`], [`Size`], [`ScoredContour`]: contour data model.
//! - [`Moments`]: spatial, central and normalized polygon moments.
//! - [`score_distance_from_target`]: the triangular fitness score used by every rule.
//! - [`Trajectory`]: sampled ballistic trajectories and their apex.

mod contour;
mod logger;
mod moments;
mod score;
mod trajectory;

pub use contour::{BoundingRect, Contour, ScoredContour, Size};
pub use moments::Moments;
pub use score::score_distance_from_target;
pub use trajectory::{Trajectory, TrajectoryPoint};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init_from_env, init_with_level, LOG_ENV_VAR};
