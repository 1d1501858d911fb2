use serde_json::json;

use nutricare_bedrock::summary::record_summary;
use nutricare_core::models::StoredAssessment;

#[test]
fn empty_record_produces_empty_summary() {
    let record = StoredAssessment::new("r", json!({}));
    assert_eq!(record_summary(&record), "");
}

#[test]
fn patient_and_anthropometrics_are_included() {
    let record = StoredAssessment::new(
        "r",
        json!({
            "generalInfo": {
                "patientName": "Ana Torres",
                "documentNumber": "100",
                "age": 64,
                "sex": "female",
                "weight": 70.0,
                "height": 160.0,
                "bmi": 27.34
            }
        }),
    );

    let summary = record_summary(&record);
    assert!(summary.contains("## Patient"));
    assert!(summary.contains("- Name: Ana Torres"));
    assert!(summary.contains("- Document: 100"));
    assert!(summary.contains("## Anthropometrics"));
    assert!(summary.contains("- Weight: 70 kg"));
    assert!(summary.contains("- BMI: 27.34 kg/m2"));
}

#[test]
fn absent_sections_are_omitted() {
    let record = StoredAssessment::new(
        "r",
        json!({
            "generalInfo": { "patientName": "Ana Torres" }
        }),
    );

    let summary = record_summary(&record);
    assert!(summary.contains("## Patient"));
    assert!(!summary.contains("## Anthropometrics"));
    assert!(!summary.contains("## Clinical state"));
    assert!(!summary.contains("## Follow-up"));
}

#[test]
fn resolved_objective_is_included() {
    let record = StoredAssessment::new(
        "r",
        json!({
            "generalInfo": { "patientName": "Ana Torres", "assessmentDate": "2026-07-01" },
            "nutritionalNeeds": { "calorieGoal": 1800.0, "proteinGoal": 90.0 }
        }),
    );

    let summary = record_summary(&record);
    assert!(summary.contains("## Nutritional objective"));
    assert!(summary.contains("- Calorie goal: 1800 kcal/day"));
    assert!(summary.contains("- Protein goal: 90 g/day"));
    assert!(summary.contains("- As of: 2026-07-01"));
}

#[test]
fn follow_up_section_only_for_follow_ups() {
    let doc = json!({
        "assessmentType": "follow-up",
        "generalInfo": { "patientName": "Ana Torres" },
        "followUpDetails": {
            "weightComparison": { "delta": -5.0, "percentChange": -6.67 },
            "objectiveAttainment": { "status": "met" },
            "intakeTotals": { "totalCalories": 1800.0 },
            "nonNutritionalCalories": 264.0
        }
    });
    let followup = StoredAssessment::new("r", doc.clone());
    let summary = record_summary(&followup);
    assert!(summary.contains("## Follow-up"));
    assert!(summary.contains("- Weight change: -5 kg (-6.67%)"));
    assert!(summary.contains("- Objective attainment: met"));
    assert!(summary.contains("- Total intake: 1800 kcal/day"));
    assert!(summary.contains("- Non-nutritional calories: 264 kcal/day"));

    let mut initial_doc = doc;
    initial_doc["assessmentType"] = json!("initial");
    let initial = StoredAssessment::new("r", initial_doc);
    assert!(!record_summary(&initial).contains("## Follow-up"));
}
