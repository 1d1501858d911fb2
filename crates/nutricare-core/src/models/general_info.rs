use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;

use crate::metrics::WeightLossPercents;
use crate::models::nutrition::NutritionRoute;

/// Patient sex. Drives the Broca ideal-weight variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Sex {
    Male,
    Female,
}

/// Historical weights (kg) for the loss-percent horizons.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct HistoricalWeights {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub one_month: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub two_month: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub three_month: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub six_month: Option<f64>,
}

/// Patient identity, anthropometrics, and clinical state as entered on the
/// assessment form.
///
/// `patientName` and `documentNumber` are the only hard-required fields; the
/// pair `(ownerId, documentNumber)` identifies a patient's timeline. The
/// derived fields (`bmi`, `idealWeight`, `adjustedWeight`, `weightLoss`) are
/// projections recomputed from the raw inputs on every save. `extra` keeps
/// whatever legacy fields older frontends wrote.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct GeneralInfo {
    #[serde(default)]
    pub patient_name: String,
    #[serde(default)]
    pub document_number: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub sex: Option<Sex>,
    /// Current weight in kg. On a follow-up this is always the new
    /// measurement; the parent's weight lives in `previousWeight`.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub weight: Option<f64>,
    /// Height in cm.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub height: Option<f64>,
    /// Form-entered date; format is not guaranteed across writers.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub assessment_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub clinical_condition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub nutrition_route: Option<NutritionRoute>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub previous_weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub historical_weights: Option<HistoricalWeights>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub bmi: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub ideal_weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub adjusted_weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub weight_loss: Option<WeightLossPercents>,
    // Goal aliases kept for readers that only look at generalInfo.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub calorie_goal: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub protein_goal: Option<f64>,
    #[serde(flatten)]
    #[ts(skip)]
    pub extra: serde_json::Map<String, Value>,
}
