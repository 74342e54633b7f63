//! Contour scoring against target-shape profiles.
//!
//! A [`ShapeProfile`] is a table of [`ScoreRule`]s plus an area threshold.
//! Each rule maps a contour's measurements to a score, and a contour's total
//! is the mean over the profile's rules. The best-scoring contour wins.
//!
//! Adding a target shape means adding a profile row, not new branching.

use std::fmt;
use std::str::FromStr;

use image::GrayImage;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use stronghold_core::{score_distance_from_target, Contour, ScoredContour};

use crate::contours::{extract_contours, ContourMeasurements};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// The field elements the pipeline knows how to find.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetShape {
    /// U-shaped retro-reflective outline around the high goal.
    #[default]
    Goal,
    /// The ball.
    Boulder,
}

impl TargetShape {
    pub fn name(&self) -> &'static str {
        match self {
            TargetShape::Goal => "goal",
            TargetShape::Boulder => "boulder",
        }
    }
}

impl fmt::Display for TargetShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown target shape {0:?} (expected \"goal\" or \"boulder\")")]
pub struct UnknownShape(pub String);

impl FromStr for TargetShape {
    type Err = UnknownShape;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "goal" => Ok(TargetShape::Goal),
            "boulder" => Ok(TargetShape::Boulder),
            _ => Err(UnknownShape(s.to_string())),
        }
    }
}

/// One named scoring heuristic.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum ScoreRule {
    /// Contour area over bounding-rectangle area.
    CoverageArea { target: f64 },
    /// Bounding-rectangle width over height.
    AspectRatio { target: f64 },
    /// Normalized central moment `nu02`.
    Moment02 { target: f64 },
    /// `(90 - |theta|) + 10` with `theta` the principal-axis angle in
    /// degrees. Not clamped: an upright contour scores 100.
    Orientation,
    /// Contour area against the disk inscribed in the bounding width.
    Circularity,
}

impl ScoreRule {
    pub fn name(&self) -> &'static str {
        match self {
            ScoreRule::CoverageArea { .. } => "coverage_area",
            ScoreRule::AspectRatio { .. } => "aspect_ratio",
            ScoreRule::Moment02 { .. } => "moment_02",
            ScoreRule::Orientation => "orientation",
            ScoreRule::Circularity => "circularity",
        }
    }

    /// The raw quantity this rule looks at.
    pub fn measure(&self, m: &ContourMeasurements) -> f64 {
        match self {
            ScoreRule::CoverageArea { .. } => m.coverage(),
            ScoreRule::AspectRatio { .. } => m.bounds.aspect_ratio(),
            ScoreRule::Moment02 { .. } => m.moments.nu02,
            ScoreRule::Orientation => m.moments.orientation_deg(),
            ScoreRule::Circularity => m.area,
        }
    }

    pub fn score(&self, m: &ContourMeasurements) -> f64 {
        let value = self.measure(m);
        match *self {
            ScoreRule::CoverageArea { target }
            | ScoreRule::AspectRatio { target }
            | ScoreRule::Moment02 { target } => score_distance_from_target(target, value),
            ScoreRule::Orientation => (90.0 - value.abs()) + 10.0,
            ScoreRule::Circularity => {
                let radius = m.bounds.width as f64 / 2.0;
                let ideal_area = std::f64::consts::PI * radius * radius;
                score_distance_from_target(ideal_area, value)
            }
        }
    }
}

/// Expected geometry of one target shape.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShapeProfile {
    /// Contours enclosing less area than this (px²) are noise.
    pub area_threshold: f64,
    pub rules: Vec<ScoreRule>,
}

impl ShapeProfile {
    /// The goal outline covers 80 of the 240 in² of its 20×12 in bounding box.
    pub fn goal() -> Self {
        Self {
            area_threshold: 1000.0,
            rules: vec![
                ScoreRule::CoverageArea {
                    target: 80.0 / 240.0,
                },
                ScoreRule::AspectRatio {
                    target: 20.0 / 12.0,
                },
                ScoreRule::Moment02 { target: 0.28 },
                ScoreRule::Orientation,
            ],
        }
    }

    pub fn boulder() -> Self {
        Self {
            area_threshold: 500.0,
            rules: vec![
                ScoreRule::Circularity,
                ScoreRule::AspectRatio { target: 1.0 },
            ],
        }
    }

    pub fn for_shape(shape: TargetShape) -> Self {
        match shape {
            TargetShape::Goal => Self::goal(),
            TargetShape::Boulder => Self::boulder(),
        }
    }

    /// Mean of the rule scores; 0 for a profile without rules.
    pub fn total_score(&self, m: &ContourMeasurements) -> f64 {
        if self.rules.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.rules.iter().map(|r| r.score(m)).sum();
        sum / self.rules.len() as f64
    }
}

/// Extract contours from an edge map and return the best one.
///
/// Returns [`ScoredContour::none`] when no contour reaches the profile's area
/// threshold. `diagnostics` only controls logging.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(edges, profile), fields(width = edges.width(), height = edges.height()))
)]
pub fn score_contours(edges: &GrayImage, profile: &ShapeProfile, diagnostics: bool) -> ScoredContour {
    score_candidates(extract_contours(edges), profile, diagnostics)
}

/// Score already-extracted contours and return the best one.
pub fn score_candidates(
    contours: Vec<Contour>,
    profile: &ShapeProfile,
    diagnostics: bool,
) -> ScoredContour {
    debug!("found {} contours", contours.len());

    let mut scored: Vec<ScoredContour> = Vec::with_capacity(contours.len());
    for contour in contours {
        let Some(m) = ContourMeasurements::of(&contour) else {
            continue;
        };
        if m.area < profile.area_threshold {
            continue;
        }

        let total = profile.total_score(&m);
        if diagnostics {
            log_candidate(scored.len(), &m, profile, total);
        }
        scored.push(ScoredContour::new(total, contour));
    }

    // stable: among equal scores the later contour wins
    scored.sort_by(|a, b| {
        a.score
            .partial_cmp(&b.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    scored.pop().unwrap_or_else(ScoredContour::none)
}

fn log_candidate(idx: usize, m: &ContourMeasurements, profile: &ShapeProfile, total: f64) {
    info!(
        "contour {idx}: area {:.1}, perimeter {:.1}, bounds {}x{}@({},{})",
        m.area, m.perimeter, m.bounds.width, m.bounds.height, m.bounds.x, m.bounds.y
    );
    for rule in &profile.rules {
        info!(
            "  {:<14} value {:>10.4}  score {:>6.2}",
            rule.name(),
            rule.measure(m),
            rule.score(m)
        );
    }
    info!("  total score {total:.2}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Point2;
    use stronghold_core::{BoundingRect, Moments};

    fn rect_contour(x0: i32, y0: i32, w: i32, h: i32) -> Contour {
        Contour::new(vec![
            Point2::new(x0, y0),
            Point2::new(x0 + w, y0),
            Point2::new(x0 + w, y0 + h),
            Point2::new(x0, y0 + h),
        ])
    }

    fn measurements(area: f64, width: i32, height: i32, moments: Moments) -> ContourMeasurements {
        ContourMeasurements {
            area,
            perimeter: 0.0,
            bounds: BoundingRect {
                x: 0,
                y: 0,
                width,
                height,
            },
            moments,
        }
    }

    #[test]
    fn shape_names_round_trip() {
        for shape in [TargetShape::Goal, TargetShape::Boulder] {
            assert_eq!(shape.to_string().parse::<TargetShape>(), Ok(shape));
        }
        assert_eq!(" Boulder ".parse::<TargetShape>(), Ok(TargetShape::Boulder));
        assert!("hoop".parse::<TargetShape>().is_err());
    }

    #[test]
    fn orientation_rule_is_not_clamped() {
        let m = measurements(
            100.0,
            10,
            10,
            Moments {
                mu20: 4.0,
                mu02: 1.0,
                ..Moments::default()
            },
        );
        assert_relative_eq!(ScoreRule::Orientation.score(&m), 100.0);
    }

    #[test]
    fn circularity_peaks_for_inscribed_disk() {
        let ideal = std::f64::consts::PI * 20.0 * 20.0;
        let m = measurements(ideal, 40, 40, Moments::default());
        assert_relative_eq!(ScoreRule::Circularity.score(&m), 100.0, epsilon = 1e-9);
        assert_relative_eq!(
            ShapeProfile::boulder().total_score(&m),
            100.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn goal_total_is_the_mean_of_four_rules() {
        // coverage 0.5, aspect 2.0, nu02 0.14, axis tilted by atan2(0.5, 1) / 2
        let m = measurements(
            3600.0,
            120,
            60,
            Moments {
                mu20: 2.0,
                mu11: 0.5,
                mu02: 1.0,
                nu02: 0.14,
                ..Moments::default()
            },
        );
        let tilt = 0.5f64.atan2(1.0).to_degrees() / 2.0;
        let expected = [50.0, 80.0, 50.0, 100.0 - tilt];

        let profile = ShapeProfile::goal();
        for (rule, want) in profile.rules.iter().zip(expected) {
            assert_relative_eq!(rule.score(&m), want, epsilon = 1e-9);
        }
        assert_relative_eq!(
            profile.total_score(&m),
            expected.iter().sum::<f64>() / 4.0,
            epsilon = 1e-9
        );
        assert_relative_eq!(profile.total_score(&m), 66.68, epsilon = 0.01);
    }

    #[test]
    fn boulder_total_is_the_mean_of_two_rules() {
        // 40x50 box: aspect 0.8, area three quarters of the inscribed disk
        let ideal = std::f64::consts::PI * 20.0 * 20.0;
        let m = measurements(0.75 * ideal, 40, 50, Moments::default());
        assert_relative_eq!(ScoreRule::Circularity.score(&m), 75.0, epsilon = 1e-9);
        assert_relative_eq!(
            ScoreRule::AspectRatio { target: 1.0 }.score(&m),
            80.0,
            epsilon = 1e-9
        );
        assert_relative_eq!(
            ShapeProfile::boulder().total_score(&m),
            77.5,
            epsilon = 1e-9
        );
    }

    #[test]
    fn profile_without_rules_scores_zero() {
        let profile = ShapeProfile {
            area_threshold: 0.0,
            rules: Vec::new(),
        };
        let m = measurements(100.0, 10, 10, Moments::default());
        assert_eq!(profile.total_score(&m), 0.0);
    }

    #[test]
    fn small_contours_are_filtered() {
        let out = score_candidates(
            vec![rect_contour(0, 0, 10, 10), Contour::default()],
            &ShapeProfile::goal(),
            true,
        );
        assert_eq!(out, ScoredContour::none());
    }

    #[test]
    fn best_candidate_wins() {
        // a 40x40 square matches the boulder aspect ratio, 80x20 does not
        let square = rect_contour(0, 0, 40, 40);
        let strip = rect_contour(100, 0, 80, 20);
        let out = score_candidates(
            vec![strip.clone(), square.clone()],
            &ShapeProfile::boulder(),
            false,
        );
        assert_eq!(out.contour, square);
        assert!(out.score > 0.0);

        let reversed = score_candidates(vec![square.clone(), strip], &ShapeProfile::boulder(), false);
        assert_eq!(reversed.contour, square);
    }

    #[test]
    fn diagnostics_do_not_change_the_result() {
        let candidates = vec![rect_contour(0, 0, 60, 36), rect_contour(5, 5, 50, 50)];
        let quiet = score_candidates(candidates.clone(), &ShapeProfile::goal(), false);
        let loud = score_candidates(candidates, &ShapeProfile::goal(), true);
        assert_eq!(quiet, loud);
    }

    #[test]
    fn empty_edge_map_returns_sentinel() {
        let out = score_contours(&GrayImage::new(64, 48), &ShapeProfile::goal(), false);
        assert_eq!(out.score, 0.0);
        assert!(out.contour.is_empty());
    }

    #[test]
    fn profiles_serialize_as_rule_tables() {
        let json = serde_json::to_value(ShapeProfile::boulder()).expect("serialize");
        assert_eq!(json["area_threshold"], 500.0);
        assert_eq!(json["rules"][0]["rule"], "circularity");
        assert_eq!(json["rules"][1]["rule"], "aspect_ratio");
        assert_eq!(json["rules"][1]["target"], 1.0);
    }
}
