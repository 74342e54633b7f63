//! Sampled ballistic trajectories.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// One sample of a trajectory: time stamp plus position, `y` being height.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryPoint {
    pub time: f64,
    pub position: Point2<f64>,
}

impl TrajectoryPoint {
    pub fn new(time: f64, x: f64, y: f64) -> Self {
        Self {
            time,
            position: Point2::new(x, y),
        }
    }

    pub fn height(&self) -> f64 {
        self.position.y
    }
}

/// Ordered, immutable list of trajectory samples.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Trajectory {
    points: Vec<TrajectoryPoint>,
}

impl Trajectory {
    pub fn new(points: Vec<TrajectoryPoint>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[TrajectoryPoint] {
        &self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The highest sample; on ties the earliest one wins.
    ///
    /// Returns `None` for an empty trajectory.
    pub fn max_height(&self) -> Option<&TrajectoryPoint> {
        self.points
            .iter()
            .reduce(|best, p| if best.height() < p.height() { p } else { best })
    }
}

impl From<Vec<TrajectoryPoint>> for Trajectory {
    fn from(points: Vec<TrajectoryPoint>) -> Self {
        Self::new(points)
    }
}
