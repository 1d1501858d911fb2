//! Record summary builder.
//!
//! Flattens an assessment record into the structured plain-text block the
//! narrative prompts consume. Absent fields are skipped and empty sections
//! are omitted entirely, so the model never sees placeholder noise.

use serde_json::Value;

use nutricare_core::models::{StoredAssessment, lookup_path, numeric};
use nutricare_core::objective;

/// Build the model input for a record. Pure; safe on any document shape.
pub fn record_summary(record: &StoredAssessment) -> String {
    let mut out = String::new();

    push_section(&mut out, "Patient", &patient_lines(record));
    push_section(&mut out, "Anthropometrics", &anthropometric_lines(record));
    push_section(&mut out, "Clinical state", &clinical_lines(record));
    push_section(&mut out, "Nutritional objective", &objective_lines(record));
    if record.is_follow_up() {
        push_section(&mut out, "Follow-up", &followup_lines(record));
    }

    out.trim_end().to_string()
}

fn push_section(out: &mut String, title: &str, lines: &[String]) {
    if lines.is_empty() {
        return;
    }
    out.push_str(&format!("## {title}\n"));
    for line in lines {
        out.push_str(line);
        out.push('\n');
    }
    out.push('\n');
}

fn patient_lines(record: &StoredAssessment) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(name) = record.patient_name() {
        lines.push(format!("- Name: {name}"));
    }
    if let Some(document) = record.document_number() {
        lines.push(format!("- Document: {document}"));
    }
    if let Some(age) = record.age() {
        lines.push(format!("- Age: {age}"));
    }
    if let Some(sex) = lookup_path(&record.doc, "generalInfo.sex").and_then(Value::as_str) {
        lines.push(format!("- Sex: {sex}"));
    }
    lines
}

fn anthropometric_lines(record: &StoredAssessment) -> Vec<String> {
    let mut lines = Vec::new();
    let mut push_metric = |label: &str, path: &str, unit: &str| {
        if let Some(v) = lookup_path(&record.doc, path).and_then(numeric) {
            lines.push(format!("- {label}: {v} {unit}"));
        }
    };
    push_metric("Weight", "generalInfo.weight", "kg");
    push_metric("Previous weight", "generalInfo.previousWeight", "kg");
    push_metric("Height", "generalInfo.height", "cm");
    push_metric("BMI", "generalInfo.bmi", "kg/m2");
    push_metric("Ideal weight", "generalInfo.idealWeight", "kg");
    push_metric("Adjusted weight", "generalInfo.adjustedWeight", "kg");
    lines
}

fn clinical_lines(record: &StoredAssessment) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(condition) =
        lookup_path(&record.doc, "generalInfo.clinicalCondition").and_then(Value::as_str)
        && !condition.trim().is_empty()
    {
        lines.push(format!("- Condition: {}", condition.trim()));
    }
    if let Some(route) =
        lookup_path(&record.doc, "generalInfo.nutritionRoute").and_then(Value::as_str)
    {
        lines.push(format!("- Nutrition route: {route}"));
    }
    lines
}

fn objective_lines(record: &StoredAssessment) -> Vec<String> {
    let Some(objective) = objective::resolve(record) else {
        return Vec::new();
    };
    let mut lines = Vec::new();
    if let Some(calories) = objective.calorie_goal {
        lines.push(format!("- Calorie goal: {calories} kcal/day"));
    }
    if let Some(protein) = objective.protein_goal {
        lines.push(format!("- Protein goal: {protein} g/day"));
    }
    lines.push(format!("- As of: {}", objective.assessment_date));
    lines
}

fn followup_lines(record: &StoredAssessment) -> Vec<String> {
    let mut lines = Vec::new();
    let doc = &record.doc;
    if let Some(delta) = lookup_path(doc, "followUpDetails.weightComparison.delta").and_then(numeric)
        && let Some(pct) =
            lookup_path(doc, "followUpDetails.weightComparison.percentChange").and_then(numeric)
    {
        lines.push(format!("- Weight change: {delta} kg ({pct}%)"));
    }
    if let Some(status) =
        lookup_path(doc, "followUpDetails.objectiveAttainment.status").and_then(Value::as_str)
    {
        lines.push(format!("- Objective attainment: {status}"));
    }
    if let Some(total) =
        lookup_path(doc, "followUpDetails.intakeTotals.totalCalories").and_then(numeric)
    {
        lines.push(format!("- Total intake: {total} kcal/day"));
    }
    if let Some(non_nutritional) =
        lookup_path(doc, "followUpDetails.nonNutritionalCalories").and_then(numeric)
        && non_nutritional > 0.0
    {
        lines.push(format!(
            "- Non-nutritional calories: {non_nutritional} kcal/day"
        ));
    }
    lines
}
