//! Record normalization for persistence.
//!
//! Turns a raw in-memory working state into the canonical stored shape:
//! identity validation, metadata stamping, derived-metric recomputation,
//! goal alias fan-out, and null scrubbing. Identity failures block the
//! write; everything else degrades to advisory warnings returned to the
//! caller for logging.

use serde_json::{Map, Value, json};

use crate::error::CoreError;
use crate::metrics::{DerivedMetrics, WeightLossPercents};
use crate::models::assessment::{AssessmentKind, InitialDraft, SaveContext};
use crate::models::general_info::GeneralInfo;
use crate::sort_date::parse_date_value;

/// Marker written into every new record. Bumped when the persisted shape
/// changes; readers never require it.
pub const SCHEMA_VERSION: u32 = 3;

/// A document ready to hand to the store, plus advisory findings.
#[derive(Debug, Clone)]
pub struct PreparedDocument {
    pub doc: Value,
    pub warnings: Vec<String>,
}

/// Normalize an initial-assessment draft into its stored shape.
pub fn prepare_initial(
    draft: &InitialDraft,
    ctx: &SaveContext,
) -> Result<PreparedDocument, CoreError> {
    let mut info = draft.general_info.clone();
    validate_identity(&info)?;

    let metrics = DerivedMetrics::compute(
        info.weight,
        info.height,
        info.sex,
        info.historical_weights.as_ref(),
    );
    apply_metrics(&mut info, &metrics);
    let warnings = advisory_warnings(&info);

    let mut root = Map::new();
    root.insert("generalInfo".to_string(), serde_json::to_value(&info)?);
    if let Some(v) = &draft.calculator_data {
        root.insert("calculatorData".to_string(), v.clone());
    }
    if let Some(v) = &draft.calculator_results {
        root.insert("calculatorResults".to_string(), v.clone());
    }
    if let Some(needs) = &draft.nutritional_needs {
        root.insert("nutritionalNeeds".to_string(), serde_json::to_value(needs)?);
    }
    if let Some(s) = &draft.diagnosis {
        root.insert("diagnosis".to_string(), json!(s));
    }
    if let Some(s) = &draft.plan {
        root.insert("plan".to_string(), json!(s));
    }
    if let Some(s) = &draft.next_assessment_date {
        root.insert("nextAssessmentDate".to_string(), json!(s));
    }
    if let Some(s) = &draft.next_assessment_time {
        root.insert("nextAssessmentTime".to_string(), json!(s));
    }

    let mut doc = Value::Object(root);
    stamp_metadata(&mut doc, AssessmentKind::Initial, ctx)?;
    if let Some(needs) = &draft.nutritional_needs {
        fan_out_goal_aliases(&mut doc, needs.calorie_goal, needs.protein_goal);
    }
    scrub(&mut doc);

    Ok(PreparedDocument { doc, warnings })
}

/// Missing identity is the one hard validation failure: it is raised before
/// any write is attempted and never defaulted.
pub fn validate_identity(info: &GeneralInfo) -> Result<(), CoreError> {
    if info.patient_name.trim().is_empty() {
        return Err(CoreError::MissingField("generalInfo.patientName".to_string()));
    }
    if info.document_number.trim().is_empty() {
        return Err(CoreError::MissingField(
            "generalInfo.documentNumber".to_string(),
        ));
    }
    Ok(())
}

/// Derived fields are projections of the raw inputs; overwrite whatever the
/// form carried with freshly computed values.
pub(crate) fn apply_metrics(info: &mut GeneralInfo, metrics: &DerivedMetrics) {
    info.bmi = metrics.bmi;
    info.ideal_weight = metrics.ideal_weight;
    info.adjusted_weight = metrics.adjusted_weight;
    info.weight_loss = (metrics.weight_loss != WeightLossPercents::default())
        .then_some(metrics.weight_loss);
}

/// Stamp required ownership/versioning metadata onto the document root.
pub fn stamp_metadata(
    doc: &mut Value,
    kind: AssessmentKind,
    ctx: &SaveContext,
) -> Result<(), CoreError> {
    let Some(root) = doc.as_object_mut() else {
        return Err(CoreError::MissingField("document root".to_string()));
    };
    root.insert("assessmentType".to_string(), serde_json::to_value(kind)?);
    root.insert("schemaVersion".to_string(), json!(SCHEMA_VERSION));
    root.insert("ownerId".to_string(), json!(ctx.owner_id));
    if let Some(email) = &ctx.owner_email {
        root.insert("ownerEmail".to_string(), json!(email));
    }
    root.insert("savedAt".to_string(), json!(ctx.saved_at.to_string()));
    Ok(())
}

/// Fan a resolved calorie/protein goal out to every historically-used alias
/// location, so any reader using any prior resolution order still finds the
/// value. The redundancy is deliberate: old records are never migrated, new
/// records are written readable-by-everyone.
pub fn fan_out_goal_aliases(
    doc: &mut Value,
    calorie_goal: Option<f64>,
    protein_goal: Option<f64>,
) {
    if calorie_goal.is_none() && protein_goal.is_none() {
        return;
    }
    let Some(root) = doc.as_object_mut() else {
        return;
    };
    set_nested(root, "nutritionalNeeds", "calorieGoal", calorie_goal);
    set_nested(root, "nutritionalNeeds", "proteinGoal", protein_goal);
    set_nested(root, "calories", "goal", calorie_goal);
    set_nested(root, "protein", "goal", protein_goal);
    set_nested(root, "calculatorData", "calorieGoal", calorie_goal);
    set_nested(root, "calculatorData", "proteinGoal", protein_goal);
    set_nested(root, "generalInfo", "calorieGoal", calorie_goal);
    set_nested(root, "generalInfo", "proteinGoal", protein_goal);
}

fn set_nested(root: &mut Map<String, Value>, section: &str, key: &str, value: Option<f64>) {
    let Some(value) = value else {
        return;
    };
    let entry = root
        .entry(section.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !entry.is_object() {
        *entry = Value::Object(Map::new());
    }
    if let Some(map) = entry.as_object_mut() {
        map.insert(key.to_string(), json!(value));
    }
}

/// Recursively drop null-valued entries from objects and arrays. Form
/// widgets emit `null` for fields the user never touched; the store keeps
/// explicitly-cleared values through their typed representation instead.
/// Already-clean input passes through unchanged.
pub fn scrub(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.retain(|_, v| !v.is_null());
            for child in map.values_mut() {
                scrub(child);
            }
        }
        Value::Array(items) => {
            items.retain(|v| !v.is_null());
            for child in items.iter_mut() {
                scrub(child);
            }
        }
        _ => {}
    }
}

/// Non-identity structural checks. Findings never block a write; the caller
/// logs them.
pub(crate) fn advisory_warnings(info: &GeneralInfo) -> Vec<String> {
    let mut warnings = Vec::new();
    if let Some(w) = info.weight
        && w <= 0.0
    {
        warnings.push(format!("weight is non-positive: {w}"));
    }
    if let Some(h) = info.height
        && h <= 0.0
    {
        warnings.push(format!("height is non-positive: {h}"));
    }
    if let Some(age) = info.age
        && age > 130
    {
        warnings.push(format!("age is implausible: {age}"));
    }
    if let Some(date) = &info.assessment_date
        && !date.trim().is_empty()
        && parse_date_value(date).is_none()
    {
        warnings.push(format!("assessment date is not parseable: {date}"));
    }
    warnings
}
