//! Derived anthropometric metrics.
//!
//! Pure functions over raw form inputs. Every result is independently
//! nullable: a non-positive or missing input empties that metric and only
//! that metric. The outputs are projections — recomputed on every save,
//! never treated as authoritative data in their own right.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::general_info::{HistoricalWeights, Sex};

/// Weight-loss percentages per look-back horizon.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct WeightLossPercents {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub one_month: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub two_month: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub three_month: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub six_month: Option<f64>,
}

/// The full derived-metric bundle for one set of raw inputs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DerivedMetrics {
    pub bmi: Option<f64>,
    pub ideal_weight: Option<f64>,
    pub adjusted_weight: Option<f64>,
    pub weight_loss: WeightLossPercents,
}

impl DerivedMetrics {
    pub fn compute(
        weight: Option<f64>,
        height: Option<f64>,
        sex: Option<Sex>,
        historical: Option<&HistoricalWeights>,
    ) -> Self {
        let bmi_value = match (weight, height) {
            (Some(w), Some(h)) => bmi(w, h),
            _ => None,
        };
        let ideal = match (height, sex) {
            (Some(h), Some(s)) => ideal_weight(h, s),
            _ => None,
        };
        let adjusted = match (weight, ideal) {
            (Some(w), Some(i)) => adjusted_weight(w, i),
            _ => None,
        };
        let loss_at = |past: Option<f64>| match (past, weight) {
            (Some(p), Some(c)) => weight_loss_percent(p, c),
            _ => None,
        };
        let h = historical.copied().unwrap_or_default();
        DerivedMetrics {
            bmi: bmi_value,
            ideal_weight: ideal,
            adjusted_weight: adjusted,
            weight_loss: WeightLossPercents {
                one_month: loss_at(h.one_month),
                two_month: loss_at(h.two_month),
                three_month: loss_at(h.three_month),
                six_month: loss_at(h.six_month),
            },
        }
    }
}

/// Body mass index, kg/m², rounded to 2 decimals.
pub fn bmi(weight_kg: f64, height_cm: f64) -> Option<f64> {
    if weight_kg <= 0.0 || height_cm <= 0.0 {
        return None;
    }
    let meters = height_cm / 100.0;
    Some(round2(weight_kg / (meters * meters)))
}

/// Broca-derived ideal weight, kg. A negative result (very short heights)
/// is treated as invalid.
pub fn ideal_weight(height_cm: f64, sex: Sex) -> Option<f64> {
    if height_cm <= 0.0 {
        return None;
    }
    let divisor = match sex {
        Sex::Male => 4.0,
        Sex::Female => 2.5,
    };
    let ideal = height_cm - 100.0 - (height_cm - 150.0) / divisor;
    (ideal > 0.0).then(|| round2(ideal))
}

/// Adjusted body weight for dosing/needs calculations: actual weight unless
/// it exceeds 120% of ideal, in which case `ideal + 0.4 × (actual − ideal)`.
pub fn adjusted_weight(actual_kg: f64, ideal_kg: f64) -> Option<f64> {
    if actual_kg <= 0.0 || ideal_kg <= 0.0 {
        return None;
    }
    if actual_kg > ideal_kg * 1.2 {
        Some(round2(ideal_kg + 0.4 * (actual_kg - ideal_kg)))
    } else {
        Some(round2(actual_kg))
    }
}

/// Loss between a past weight and the current one, as a percentage of the
/// past weight. Only actual loss is reported: when the patient gained or
/// held weight the result is empty. (The follow-up weight comparison is the
/// place that reports gain; this screening metric deliberately does not.)
pub fn weight_loss_percent(past_kg: f64, current_kg: f64) -> Option<f64> {
    if past_kg <= 0.0 || current_kg <= 0.0 || past_kg <= current_kg {
        return None;
    }
    Some(round2((past_kg - current_kg) / past_kg * 100.0))
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
