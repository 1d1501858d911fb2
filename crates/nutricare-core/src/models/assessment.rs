use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;

use crate::followup::RouteIntake;
use crate::infusions::NonNutritionalInfusions;
use crate::models::general_info::{GeneralInfo, Sex};
use crate::models::nutrition::NutritionalNeeds;

/// Discriminates the two record variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum AssessmentKind {
    #[serde(rename = "initial")]
    Initial,
    #[serde(rename = "follow-up")]
    FollowUp,
}

/// A persisted assessment document of unknown schema vintage.
///
/// Stored records span several writer generations: fields are optional,
/// renamed, and nested at different depths, so no single typed struct can
/// describe them all. Reads go through these tolerant accessors, which
/// return `Option`s and never fail.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct StoredAssessment {
    pub id: String,
    pub doc: Value,
}

impl StoredAssessment {
    pub fn new(id: impl Into<String>, doc: Value) -> Self {
        Self { id: id.into(), doc }
    }

    /// Records written before the type marker existed are initials.
    pub fn kind(&self) -> AssessmentKind {
        match self.doc.get("assessmentType").and_then(Value::as_str) {
            Some("follow-up") => AssessmentKind::FollowUp,
            _ => AssessmentKind::Initial,
        }
    }

    pub fn is_follow_up(&self) -> bool {
        self.kind() == AssessmentKind::FollowUp
    }

    pub fn patient_name(&self) -> Option<&str> {
        lookup_path(&self.doc, "generalInfo.patientName")
            .or_else(|| self.doc.get("patientName"))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Document numbers were stored both as strings and as bare numbers.
    pub fn document_number(&self) -> Option<String> {
        let raw = lookup_path(&self.doc, "generalInfo.documentNumber")
            .or_else(|| self.doc.get("documentNumber"))?;
        match raw {
            Value::String(s) => {
                let s = s.trim();
                (!s.is_empty()).then(|| s.to_string())
            }
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn weight(&self) -> Option<f64> {
        lookup_path(&self.doc, "generalInfo.weight").and_then(numeric)
    }

    pub fn height(&self) -> Option<f64> {
        lookup_path(&self.doc, "generalInfo.height").and_then(numeric)
    }

    pub fn age(&self) -> Option<u32> {
        lookup_path(&self.doc, "generalInfo.age")
            .and_then(numeric)
            .filter(|a| *a >= 0.0)
            .map(|a| a as u32)
    }

    pub fn sex(&self) -> Option<Sex> {
        let raw = lookup_path(&self.doc, "generalInfo.sex")?;
        serde_json::from_value(raw.clone()).ok()
    }

    /// Typed view of `generalInfo`, when it parses at all.
    pub fn general_info(&self) -> Option<GeneralInfo> {
        let raw = self.doc.get("generalInfo")?;
        serde_json::from_value(raw.clone()).ok()
    }

    pub fn diagnosis(&self) -> Option<&str> {
        self.doc.get("diagnosis").and_then(Value::as_str)
    }

    pub fn plan(&self) -> Option<&str> {
        self.doc.get("plan").and_then(Value::as_str)
    }
}

/// Working state of the initial-assessment form, as posted by the frontend.
/// The calculator bags are opaque: risk scores are computed elsewhere and
/// only their output shape matters here.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct InitialDraft {
    #[serde(default)]
    pub general_info: GeneralInfo,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub calculator_data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub calculator_results: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub nutritional_needs: Option<NutritionalNeeds>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub diagnosis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub plan: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub next_assessment_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub next_assessment_time: Option<String>,
}

/// Working state of the follow-up form. Identity fields are absent on
/// purpose: they are inherited from the parent assessment, never re-entered.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct FollowUpDraft {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub follow_up_date: Option<String>,
    /// The new weight measurement, kg.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub current_weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub clinical_condition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub intake: Option<RouteIntake>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub infusions: Option<NonNutritionalInfusions>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub calculator_results: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub diagnosis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub plan: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub next_assessment_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub next_assessment_time: Option<String>,
}

/// Ownership and timing metadata stamped onto every persisted record.
/// Passed in by the caller so the normalizer stays pure.
#[derive(Debug, Clone)]
pub struct SaveContext {
    pub owner_id: String,
    pub owner_email: Option<String>,
    pub saved_at: jiff::Timestamp,
}

/// Follow a dotted path (`"generalInfo.documentNumber"`) into a document.
pub fn lookup_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = value;
    for segment in path.split('.') {
        current = current.get(segment)?;
    }
    Some(current)
}

/// Read a number out of a value that may be a JSON number or the numeric
/// string a form widget produced (decimal comma tolerated).
pub fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let cleaned = s.trim().replace(',', ".");
            cleaned.parse::<f64>().ok()
        }
        _ => None,
    }
}
