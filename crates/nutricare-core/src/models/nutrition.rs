use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;

/// How nutrition reaches the patient. Only enteral/parenteral (and their
/// mix) have metered intake; oral routes report no computed macro totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "kebab-case")]
#[ts(export)]
pub enum NutritionRoute {
    Oral,
    OralWithSupplements,
    Enteral,
    Parenteral,
    Mixed,
    Undetermined,
}

/// The canonical unified goal field written by current-generation saves.
/// Older records carry the same values under various legacy aliases; the
/// objective resolver knows where to look.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NutritionalNeeds {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub calorie_goal: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub protein_goal: Option<f64>,
}

/// Protein axis of a nutritional recalculation. Writers have stored this as
/// a number (`totalGrams`, `targetValue`) or as display text (`summary`,
/// e.g. `"98 g/day"`); readers must cope with all three.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProteinTarget {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub grams_per_kg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub total_grams: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub target_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub summary: Option<String>,
}

/// A follow-up-time recomputation of nutritional needs from updated weight
/// and clinical state. `adjustedGet` takes precedence over `get` when both
/// are present.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NutritionalRecalculation {
    /// Total energy expenditure, kcal/day.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub get: Option<f64>,
    /// Stress/activity-adjusted energy expenditure, kcal/day.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub adjusted_get: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub protein: Option<ProteinTarget>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub weight_used: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub method: Option<String>,
    #[serde(flatten)]
    #[ts(skip)]
    pub extra: serde_json::Map<String, Value>,
}
