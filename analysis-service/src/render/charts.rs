//! SVG geometry for the two summary charts.
//!
//! Everything is precomputed here so the templates only interpolate strings.

use crate::models::{LevelCounts, RiskLevel};
use std::f64::consts::PI;

pub const BAR_CHART_WIDTH: u32 = 300;
pub const BAR_CHART_HEIGHT: u32 = 190;
const BAR_WIDTH: f64 = 56.0;
const BAR_SPACING: f64 = 90.0;
const BAR_LEFT: f64 = 32.0;
const PLOT_TOP: f64 = 20.0;
const PLOT_HEIGHT: f64 = 130.0;

pub const DONUT_SIZE: u32 = 180;
pub const DONUT_RADIUS: f64 = 60.0;
pub const DONUT_STROKE: f64 = 26.0;

pub fn level_color(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::High => "#dc2626",
        RiskLevel::Medium => "#f59e0b",
        RiskLevel::Low => "#16a34a",
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: String,
    pub value: usize,
    pub color: &'static str,
    pub x: String,
    pub y: String,
    pub width: String,
    pub height: String,
    pub label_x: String,
    pub value_y: String,
}

/// Risk factors per level, high → medium → low.
#[derive(Debug, Clone, PartialEq)]
pub struct BarChart {
    pub values: [usize; 3],
    /// Comma-separated values, exposed as a `data-values` attribute.
    pub data_values: String,
    pub bars: Vec<Bar>,
    pub width: u32,
    pub height: u32,
    pub baseline_y: String,
    pub label_y: String,
}

impl BarChart {
    pub fn from_counts(counts: LevelCounts, label_suffix: &str) -> Self {
        let values = counts.as_array();
        let max = values.iter().copied().max().unwrap_or(0).max(1) as f64;

        let bars = RiskLevel::DESCENDING
            .iter()
            .zip(values)
            .enumerate()
            .map(|(i, (level, value))| {
                let height = value as f64 / max * PLOT_HEIGHT;
                let x = BAR_LEFT + i as f64 * BAR_SPACING;
                let y = PLOT_TOP + PLOT_HEIGHT - height;
                Bar {
                    label: format!("{} {}", capitalize(level.as_str()), label_suffix),
                    value,
                    color: level_color(*level),
                    x: fmt_coord(x),
                    y: fmt_coord(y),
                    width: fmt_coord(BAR_WIDTH),
                    height: fmt_coord(height),
                    label_x: fmt_coord(x + BAR_WIDTH / 2.0),
                    value_y: fmt_coord(y - 6.0),
                }
            })
            .collect();

        Self {
            values,
            data_values: join_values(&values),
            bars,
            width: BAR_CHART_WIDTH,
            height: BAR_CHART_HEIGHT,
            baseline_y: fmt_coord(PLOT_TOP + PLOT_HEIGHT),
            label_y: fmt_coord(PLOT_TOP + PLOT_HEIGHT + 20.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DonutSegment {
    pub label: String,
    pub value: usize,
    pub color: &'static str,
    pub percent: u32,
    pub dash_array: String,
    pub dash_offset: String,
}

/// Action items per priority, high → medium → low.
#[derive(Debug, Clone, PartialEq)]
pub struct DonutChart {
    pub values: [usize; 3],
    pub data_values: String,
    pub total: usize,
    pub segments: Vec<DonutSegment>,
    pub size: u32,
    pub center: String,
    pub radius: String,
    pub stroke_width: String,
}

impl DonutChart {
    pub fn from_counts(counts: LevelCounts, label_suffix: &str) -> Self {
        let values = counts.as_array();
        let total = counts.total();
        let circumference = 2.0 * PI * DONUT_RADIUS;

        let mut offset = 0.0;
        let segments = RiskLevel::DESCENDING
            .iter()
            .zip(values)
            .filter(|(_, value)| *value > 0)
            .map(|(level, value)| {
                let fraction = value as f64 / total as f64;
                let dash = fraction * circumference;
                let segment = DonutSegment {
                    label: format!("{} {}", capitalize(level.as_str()), label_suffix),
                    value,
                    color: level_color(*level),
                    percent: (fraction * 100.0).round() as u32,
                    dash_array: format!("{} {}", fmt_coord(dash), fmt_coord(circumference - dash)),
                    dash_offset: fmt_coord(-offset),
                };
                offset += dash;
                segment
            })
            .collect();

        Self {
            values,
            data_values: join_values(&values),
            total,
            segments,
            size: DONUT_SIZE,
            center: fmt_coord(DONUT_SIZE as f64 / 2.0),
            radius: fmt_coord(DONUT_RADIUS),
            stroke_width: fmt_coord(DONUT_STROKE),
        }
    }
}

fn join_values(values: &[usize; 3]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

fn fmt_coord(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded == 0.0 {
        // Avoid "-0" in the markup
        "0".to_string()
    } else {
        format!("{}", rounded)
    }
}

pub(crate) fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
