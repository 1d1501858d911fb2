//! Non-nutritional calorie load from IV infusions.
//!
//! Sedation vehicles and dextrose-bearing fluids contribute real calories
//! that must be counted against the nutritional goal even though they are
//! not feeding. Pure arithmetic; a missing or unparsable sub-input simply
//! contributes zero.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;

use crate::models::assessment::numeric;

/// Propofol emulsion energy density.
pub const PROPOFOL_KCAL_PER_ML: f64 = 1.1;
/// Dextrose energy density.
pub const DEXTROSE_KCAL_PER_G: f64 = 3.4;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PropofolInfusion {
    #[serde(default)]
    pub enabled: bool,
    /// Infusion rate, mL/h.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub rate_ml_per_hour: Option<f64>,
    /// Hours infused per day.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub hours_per_day: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DextroseInfusion {
    #[serde(default)]
    pub enabled: bool,
    /// Concentration, % w/v.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub concentration_pct: Option<f64>,
    /// Volume infused per day, mL.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub volume_ml_per_day: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NonNutritionalInfusions {
    #[serde(default)]
    pub propofol: PropofolInfusion,
    #[serde(default)]
    pub dextrose: DextroseInfusion,
}

impl NonNutritionalInfusions {
    pub fn propofol_kcal(&self) -> f64 {
        if !self.propofol.enabled {
            return 0.0;
        }
        let rate = self.propofol.rate_ml_per_hour.unwrap_or(0.0);
        let hours = self.propofol.hours_per_day.unwrap_or(0.0);
        rate * hours * PROPOFOL_KCAL_PER_ML
    }

    pub fn dextrose_kcal(&self) -> f64 {
        if !self.dextrose.enabled {
            return 0.0;
        }
        let concentration = self.dextrose.concentration_pct.unwrap_or(0.0);
        let volume = self.dextrose.volume_ml_per_day.unwrap_or(0.0);
        (concentration / 100.0) * volume * DEXTROSE_KCAL_PER_G
    }

    /// Total non-nutritional load, kcal/day.
    pub fn total_kcal(&self) -> f64 {
        self.propofol_kcal() + self.dextrose_kcal()
    }

    /// Tolerant constructor for the raw form bag, where numbers may arrive
    /// as strings. Accepts the current field names and their short legacy
    /// aliases.
    pub fn from_value(value: &Value) -> Self {
        let read = |section: &str, primary: &str, legacy: &str| -> Option<f64> {
            let obj = value.get(section)?;
            obj.get(primary)
                .or_else(|| obj.get(legacy))
                .and_then(numeric)
        };
        let enabled = |section: &str| -> bool {
            value
                .get(section)
                .and_then(|o| o.get("enabled"))
                .and_then(Value::as_bool)
                .unwrap_or(false)
        };
        NonNutritionalInfusions {
            propofol: PropofolInfusion {
                enabled: enabled("propofol"),
                rate_ml_per_hour: read("propofol", "rateMlPerHour", "rate"),
                hours_per_day: read("propofol", "hoursPerDay", "hours"),
            },
            dextrose: DextroseInfusion {
                enabled: enabled("dextrose"),
                concentration_pct: read("dextrose", "concentrationPct", "concentration"),
                volume_ml_per_day: read("dextrose", "volumeMlPerDay", "volume"),
            },
        }
    }
}
