//! 好帶指數: how easy the first year of care is expected to be, month by month.

use serde::{Deserialize, Serialize};

use crate::cycle::Element;
use crate::scoring::{ElementalProfile, Strength};

const MIN_INDEX: f64 = 1.0;
const MAX_INDEX: f64 = 10.0;
const LAST_MONTH: u32 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CareabilityPoint {
    pub month: u32,
    pub index: f64,
}

/// Starting index before any month adjustment
pub fn base_careability_index(element: Element, strength: Strength) -> f64 {
    let base = match element {
        Element::Wood => 6.0,
        Element::Fire => 4.0,
        Element::Earth => 7.0,
        Element::Metal => 5.0,
        Element::Water => 6.0,
    };
    match strength {
        Strength::Strong => base - 1.0,
        Strength::Weak => base + 0.5,
        Strength::Medium => base,
    }
}

/// Months 0-2
fn newborn_adjustment(element: Element, month: u32) -> f64 {
    let [m0, m1, m2] = match element {
        Element::Wood => [-1.0, -0.5, 0.0],
        Element::Fire => [-1.5, -1.0, -0.5],
        Element::Earth => [0.0, 0.5, 1.0],
        Element::Metal | Element::Water => [-0.5, 0.0, 0.5],
    };
    match month {
        0 => m0,
        1 => m1,
        _ => m2,
    }
}

/// Months 3-6, `step` counts 1..=4
fn infant_adjustment(element: Element, step: u32) -> f64 {
    let step_f = step as f64;
    match element {
        Element::Wood => step_f * 0.3,
        Element::Fire => match step {
            0 => -1.0,
            1 => -0.5,
            _ => 0.0,
        },
        Element::Earth => step_f * 0.2,
        Element::Metal => {
            if step >= 2 {
                0.5
            } else {
                0.0
            }
        }
        Element::Water => step_f * 0.25,
    }
}

/// Months 7-12, `step` counts 1..=6
fn toddler_adjustment(element: Element, step: u32) -> f64 {
    match element {
        Element::Wood => match step {
            0..=3 => 0.5,
            4 => 0.0,
            _ => -0.5,
        },
        Element::Fire => {
            if step >= 3 {
                -1.0
            } else {
                -0.5
            }
        }
        Element::Earth => {
            if step <= 2 {
                0.5
            } else {
                0.0
            }
        }
        Element::Metal => {
            if step >= 4 {
                -0.5
            } else {
                0.0
            }
        }
        Element::Water => {
            if step <= 4 {
                0.3
            } else {
                0.0
            }
        }
    }
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Index for months 0 through 12, clamped to 1..=10 and rounded to 0.1.
pub fn careability_index(profile: &ElementalProfile) -> Vec<CareabilityPoint> {
    let element = profile.day_element;
    let base = base_careability_index(element, profile.strength);

    (0..=LAST_MONTH)
        .map(|month| {
            let adjustment = match month {
                0..=2 => newborn_adjustment(element, month),
                3..=6 => infant_adjustment(element, month - 2),
                _ => toddler_adjustment(element, month - 6),
            };
            CareabilityPoint {
                month,
                index: round_tenth((base + adjustment).clamp(MIN_INDEX, MAX_INDEX)),
            }
        })
        .collect()
}
