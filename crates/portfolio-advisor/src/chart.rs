//! Allocation Pie Chart
//!
//! Slice colors and SVG path geometry for the allocation chart. Paths are in
//! a unit-circle viewBox (`-1 -1 2 2`), starting at 3 o'clock.

use std::f64::consts::TAU;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;

use crate::model::Allocation;

const EQUITY_COLORS: [&str; 4] = ["#10B981", "#34D399", "#6EE7B7", "#A7F3D0"];
const COMMODITY_COLORS: [&str; 3] = ["#F59E0B", "#FBBF24", "#FCD34D"];
const DEBT_COLORS: [&str; 3] = ["#6B7280", "#9CA3AF", "#D1D5DB"];

/// Path drawing a whole disc, used when one slice covers everything
const FULL_DISC: &str = "M 1 0 A 1 1 0 1 1 -1 0 A 1 1 0 1 1 1 0 Z";

/// One chart slice
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChartSlice {
    pub name: String,
    pub value: Decimal,
    pub color: &'static str,
}

/// SVG path for a slice
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PiePath {
    pub d: String,
    pub color: &'static str,
}

/// Pick a slice color from the asset name and its position
pub fn slice_color(name: &str, index: usize) -> &'static str {
    let lower = name.to_lowercase();
    if lower.contains("gold") || lower.contains("commodity") {
        COMMODITY_COLORS[index % COMMODITY_COLORS.len()]
    } else if lower.contains("debt") || lower.contains("bond") || lower.contains("fd") {
        DEBT_COLORS[index % DEBT_COLORS.len()]
    } else {
        EQUITY_COLORS[index % EQUITY_COLORS.len()]
    }
}

/// Chart slices for an allocation set, in allocation order
pub fn chart_slices(allocations: &[Allocation]) -> Vec<ChartSlice> {
    allocations
        .iter()
        .enumerate()
        .map(|(i, a)| ChartSlice {
            name: a.name.clone(),
            value: a.percentage,
            color: slice_color(&a.name, i),
        })
        .collect()
}

/// Arc paths for the slices; nothing to draw when the values sum to zero
pub fn pie_paths(slices: &[ChartSlice]) -> Vec<PiePath> {
    let values: Vec<f64> = slices
        .iter()
        .map(|s| s.value.to_f64().unwrap_or(0.0).max(0.0))
        .collect();
    let total: f64 = values.iter().sum();
    if total <= 0.0 {
        return Vec::new();
    }

    let mut cumulative = 0.0;
    slices
        .iter()
        .zip(values)
        .filter(|(_, value)| *value > 0.0)
        .map(|(slice, value)| {
            let fraction = value / total;
            let d = if fraction >= 1.0 {
                FULL_DISC.to_owned()
            } else {
                let (sx, sy) = point_at(cumulative);
                cumulative += fraction;
                let (ex, ey) = point_at(cumulative);
                let large_arc = u8::from(fraction > 0.5);
                format!("M {sx:.4} {sy:.4} A 1 1 0 {large_arc} 1 {ex:.4} {ey:.4} L 0 0")
            };
            PiePath { d, color: slice.color }
        })
        .collect()
}

fn point_at(fraction: f64) -> (f64, f64) {
    let angle = TAU * fraction;
    (angle.cos(), angle.sin())
}
