use jiff::Timestamp;
use serde_json::json;

use nutricare_core::error::CoreError;
use nutricare_core::models::{
    GeneralInfo, InitialDraft, NutritionalNeeds, SaveContext, Sex, StoredAssessment,
};
use nutricare_core::normalize::{self, SCHEMA_VERSION};
use nutricare_core::objective::{self, ObjectiveSource};

fn ctx() -> SaveContext {
    SaveContext {
        owner_id: "user-1".to_string(),
        owner_email: Some("clinician@example.com".to_string()),
        saved_at: "2026-08-05T10:00:00Z".parse::<Timestamp>().expect("timestamp"),
    }
}

fn draft(name: &str, document: &str) -> InitialDraft {
    InitialDraft {
        general_info: GeneralInfo {
            patient_name: name.to_string(),
            document_number: document.to_string(),
            age: Some(64),
            sex: Some(Sex::Male),
            weight: Some(70.0),
            height: Some(175.0),
            assessment_date: Some("2026-08-01".to_string()),
            ..Default::default()
        },
        ..Default::default()
    }
}

#[test]
fn missing_identity_blocks_the_save() {
    let missing_name = normalize::prepare_initial(&draft("", "100"), &ctx());
    assert!(matches!(missing_name, Err(CoreError::MissingField(f)) if f.contains("patientName")));

    let missing_document = normalize::prepare_initial(&draft("Ana", "  "), &ctx());
    assert!(
        matches!(missing_document, Err(CoreError::MissingField(f)) if f.contains("documentNumber"))
    );
}

#[test]
fn metadata_is_stamped() {
    let prepared = normalize::prepare_initial(&draft("Ana", "100"), &ctx()).expect("prepared");
    let doc = &prepared.doc;

    assert_eq!(doc["assessmentType"], json!("initial"));
    assert_eq!(doc["schemaVersion"], json!(SCHEMA_VERSION));
    assert_eq!(doc["ownerId"], json!("user-1"));
    assert_eq!(doc["ownerEmail"], json!("clinician@example.com"));
    assert_eq!(doc["savedAt"], json!("2026-08-05T10:00:00Z"));
}

#[test]
fn derived_metrics_are_recomputed_on_save() {
    let mut stale = draft("Ana", "100");
    // Whatever the form carried is overwritten by the recomputation.
    stale.general_info.bmi = Some(99.0);
    stale.general_info.ideal_weight = Some(1.0);

    let prepared = normalize::prepare_initial(&stale, &ctx()).expect("prepared");
    assert_eq!(prepared.doc["generalInfo"]["bmi"], json!(22.86));
    assert_eq!(prepared.doc["generalInfo"]["idealWeight"], json!(68.75));
    assert_eq!(prepared.doc["generalInfo"]["adjustedWeight"], json!(70.0));
}

#[test]
fn goal_aliases_fan_out_to_every_location() {
    let mut with_needs = draft("Ana", "100");
    with_needs.nutritional_needs = Some(NutritionalNeeds {
        calorie_goal: Some(1800.0),
        protein_goal: Some(90.0),
    });

    let prepared = normalize::prepare_initial(&with_needs, &ctx()).expect("prepared");
    let doc = &prepared.doc;

    assert_eq!(doc["nutritionalNeeds"]["calorieGoal"], json!(1800.0));
    assert_eq!(doc["nutritionalNeeds"]["proteinGoal"], json!(90.0));
    assert_eq!(doc["calories"]["goal"], json!(1800.0));
    assert_eq!(doc["protein"]["goal"], json!(90.0));
    assert_eq!(doc["calculatorData"]["calorieGoal"], json!(1800.0));
    assert_eq!(doc["calculatorData"]["proteinGoal"], json!(90.0));
    assert_eq!(doc["generalInfo"]["calorieGoal"], json!(1800.0));
    assert_eq!(doc["generalInfo"]["proteinGoal"], json!(90.0));
}

#[test]
fn any_single_alias_is_enough_for_resolution() {
    let aliases = [
        json!({ "nutritionalNeeds": { "calorieGoal": 1800.0 } }),
        json!({ "calories": { "goal": 1800.0 } }),
        json!({ "calculatorData": { "calorieGoal": 1800.0 } }),
        json!({ "generalInfo": { "calorieGoal": 1800.0 } }),
    ];
    for doc in aliases {
        let record = StoredAssessment::new("r", doc.clone());
        let objective = objective::resolve(&record)
            .unwrap_or_else(|| panic!("no objective resolved from {doc}"));
        assert_eq!(objective.calorie_goal, Some(1800.0), "from {doc}");
    }
}

#[test]
fn prepared_document_resolves_as_unified() {
    let mut with_needs = draft("Ana", "100");
    with_needs.nutritional_needs = Some(NutritionalNeeds {
        calorie_goal: Some(1800.0),
        protein_goal: Some(90.0),
    });

    let prepared = normalize::prepare_initial(&with_needs, &ctx()).expect("prepared");
    let record = StoredAssessment::new("r", prepared.doc);
    let objective = objective::resolve(&record).expect("objective");
    assert_eq!(objective.source, ObjectiveSource::UnifiedNeeds);
    assert_eq!(objective.calorie_goal, Some(1800.0));
    assert_eq!(objective.assessment_date, "2026-08-01");
}

#[test]
fn scrub_is_a_no_op_on_clean_objects() {
    let mut clean = json!({
        "generalInfo": { "patientName": "Ana", "weight": 70.0 },
        "tags": ["a", "b"],
        "count": 0
    });
    let before = clean.clone();
    normalize::scrub(&mut clean);
    assert_eq!(clean, before);
}

#[test]
fn scrub_drops_null_entries_recursively() {
    let mut dirty = json!({
        "keep": 1,
        "drop": null,
        "nested": { "alsoDrop": null, "keep": "x" },
        "list": [1, null, { "inner": null, "keep": 2 }]
    });
    normalize::scrub(&mut dirty);
    assert_eq!(
        dirty,
        json!({
            "keep": 1,
            "nested": { "keep": "x" },
            "list": [1, { "keep": 2 }]
        })
    );
}

#[test]
fn untyped_bags_are_scrubbed_before_persistence() {
    let mut with_bag = draft("Ana", "100");
    with_bag.calculator_results = Some(json!({
        "nrs": 3,
        "untouchedWidget": null
    }));

    let prepared = normalize::prepare_initial(&with_bag, &ctx()).expect("prepared");
    assert_eq!(prepared.doc["calculatorResults"], json!({ "nrs": 3 }));
}

#[test]
fn advisory_findings_do_not_block_the_write() {
    let mut odd = draft("Ana", "100");
    odd.general_info.weight = Some(-4.0);
    odd.general_info.assessment_date = Some("someday".to_string());

    let prepared = normalize::prepare_initial(&odd, &ctx()).expect("prepared");
    assert_eq!(prepared.warnings.len(), 2);
}
