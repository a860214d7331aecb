//! RQ wheel geometry.
//!
//! One radial segment per category: equal angular slices, radius equal to
//! the point score and fill opacity scaled by that score.

use crate::models::{Category, DashboardSnapshot};
use serde::Serialize;
use std::f64::consts::TAU;

const BASE_ALPHA: f64 = 0.25;
const ALPHA_RANGE: f64 = 0.55;

/// A single wheel slice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WheelSegment {
    pub category: Category,
    /// Radians, clockwise from the top.
    pub start_angle: f64,
    pub end_angle: f64,
    /// Point score, 0-100.
    pub radius: f64,
    pub fill_alpha: f64,
    pub color: &'static str,
}

/// Build wheel segments from a snapshot's category points.
pub fn wheel_segments(snapshot: &DashboardSnapshot) -> Vec<WheelSegment> {
    let step = TAU / Category::ALL.len() as f64;

    Category::ALL
        .iter()
        .enumerate()
        .map(|(i, category)| {
            let score = snapshot.category(*category).point.clamp(0.0, 100.0);
            WheelSegment {
                category: *category,
                start_angle: step * i as f64,
                end_angle: step * (i + 1) as f64,
                radius: score,
                fill_alpha: BASE_ALPHA + ALPHA_RANGE * (score / 100.0),
                color: category.color(),
            }
        })
        .collect()
}
