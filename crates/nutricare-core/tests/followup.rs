use jiff::Timestamp;
use serde_json::json;

use nutricare_core::followup::{
    AttainmentStatus, FollowUpError, FollowUpSession, InfusionIntake, RouteIntake, SessionPhase,
    WeightTrend, assess_attainment, compare_weight, intake_totals,
};
use nutricare_core::infusions::{NonNutritionalInfusions, PropofolInfusion};
use nutricare_core::models::{
    FollowUpDraft, NutritionRoute, NutritionalRecalculation, ProteinTarget, SaveContext,
    StoredAssessment,
};

// ── Weight comparison ────────────────────────────────────────────────────────

#[test]
fn weight_trend_boundaries() {
    let stable = compare_weight(70.0, 70.0).expect("comparison");
    assert_eq!(stable.trend, WeightTrend::Stable);
    assert_eq!(stable.delta, 0.0);

    let increase = compare_weight(70.0, 70.01).expect("comparison");
    assert_eq!(increase.trend, WeightTrend::Increase);

    let loss = compare_weight(70.0, 69.99).expect("comparison");
    assert_eq!(loss.trend, WeightTrend::Loss);
}

#[test]
fn weight_change_significance_threshold() {
    // 70 → 66.5 is exactly -5%
    let significant = compare_weight(70.0, 66.5).expect("comparison");
    assert!(significant.clinically_significant);
    assert_eq!(significant.percent_change, -5.0);

    let minor = compare_weight(70.0, 67.0).expect("comparison");
    assert!(!minor.clinically_significant);

    // Gain is reported here, unlike the screening loss metric.
    let gain = compare_weight(70.0, 77.0).expect("comparison");
    assert_eq!(gain.trend, WeightTrend::Increase);
    assert!(gain.clinically_significant);
}

#[test]
fn weight_comparison_requires_positive_weights() {
    assert!(compare_weight(0.0, 70.0).is_none());
    assert!(compare_weight(70.0, 0.0).is_none());
    assert!(compare_weight(-70.0, 70.0).is_none());
}

// ── Objective attainment ─────────────────────────────────────────────────────

#[test]
fn attainment_band_boundaries() {
    let goal = Some(2000.0);
    let status = |actual: f64| assess_attainment(actual, goal).status;

    assert_eq!(status(1800.0), AttainmentStatus::Met); // exactly 90%
    assert_eq!(status(1798.0), AttainmentStatus::Low); // 89.9%
    assert_eq!(status(2200.0), AttainmentStatus::Met); // exactly 110%
    assert_eq!(status(2202.0), AttainmentStatus::High); // 110.1%
    assert_eq!(status(2400.0), AttainmentStatus::High); // exactly 120%
    assert_eq!(status(2420.0), AttainmentStatus::Excessive); // 121%
    assert_eq!(status(1600.0), AttainmentStatus::Low); // exactly 80%
    assert_eq!(status(1598.0), AttainmentStatus::Deficient); // 79.9%
}

#[test]
fn attainment_percentage_is_reported() {
    let attainment = assess_attainment(1800.0, Some(2000.0));
    assert_eq!(attainment.percentage, Some(90.0));
    assert_eq!(attainment.status, AttainmentStatus::Met);
}

#[test]
fn absent_or_zero_goal_means_no_objective() {
    assert_eq!(
        assess_attainment(1800.0, None).status,
        AttainmentStatus::NoObjective
    );
    assert_eq!(
        assess_attainment(1800.0, Some(0.0)).status,
        AttainmentStatus::NoObjective
    );
    assert_eq!(assess_attainment(1800.0, None).percentage, None);
}

// ── Route intake totals ──────────────────────────────────────────────────────

fn enteral_intake() -> InfusionIntake {
    InfusionIntake {
        volume_ml: 1500.0,
        kcal_per_ml: 1.2,
        protein_per_ml: 0.04,
    }
}

fn parenteral_intake() -> InfusionIntake {
    InfusionIntake {
        volume_ml: 1000.0,
        kcal_per_ml: 0.8,
        protein_per_ml: 0.05,
    }
}

#[test]
fn enteral_route_counts_only_enteral() {
    let intake = RouteIntake {
        route: NutritionRoute::Enteral,
        enteral: Some(enteral_intake()),
        parenteral: Some(parenteral_intake()),
    };
    let totals = intake_totals(&intake, 0.0);
    assert_eq!(totals.enteral_calories, 1800.0);
    assert_eq!(totals.enteral_protein, 60.0);
    assert_eq!(totals.parenteral_calories, 0.0);
    assert_eq!(totals.route_calories, 1800.0);
    assert_eq!(totals.total_calories, 1800.0);
}

#[test]
fn mixed_route_sums_both_components() {
    let intake = RouteIntake {
        route: NutritionRoute::Mixed,
        enteral: Some(enteral_intake()),
        parenteral: Some(parenteral_intake()),
    };
    let totals = intake_totals(&intake, 0.0);
    assert_eq!(totals.enteral_calories, 1800.0);
    assert_eq!(totals.parenteral_calories, 800.0);
    assert_eq!(totals.route_calories, 2600.0);
    assert_eq!(totals.route_protein, 110.0);
}

#[test]
fn oral_routes_report_zero_macro_totals() {
    for route in [
        NutritionRoute::Oral,
        NutritionRoute::OralWithSupplements,
        NutritionRoute::Undetermined,
    ] {
        let intake = RouteIntake {
            route,
            enteral: Some(enteral_intake()),
            parenteral: None,
        };
        let totals = intake_totals(&intake, 434.0);
        assert_eq!(totals.route_calories, 0.0);
        assert_eq!(totals.route_protein, 0.0);
        // The non-nutritional load still counts.
        assert_eq!(totals.total_calories, 434.0);
    }
}

#[test]
fn non_nutritional_calories_add_to_the_total() {
    let intake = RouteIntake {
        route: NutritionRoute::Enteral,
        enteral: Some(InfusionIntake {
            volume_ml: 1500.0,
            kcal_per_ml: 1.0,
            protein_per_ml: 0.04,
        }),
        parenteral: None,
    };
    let totals = intake_totals(&intake, 300.0);
    assert_eq!(totals.route_calories, 1500.0);
    assert_eq!(totals.non_nutritional_calories, 300.0);
    assert_eq!(totals.total_calories, 1800.0);
}

// ── Session state machine ────────────────────────────────────────────────────

fn parent() -> StoredAssessment {
    StoredAssessment::new(
        "parent-1",
        json!({
            "assessmentType": "initial",
            "generalInfo": {
                "patientName": "Ana Torres",
                "documentNumber": "100",
                "age": 64,
                "sex": "female",
                "weight": 75.0,
                "height": 160.0
            },
            "nutritionalNeeds": { "calorieGoal": 2000.0, "proteinGoal": 100.0 },
            "savedAt": "2026-07-01T10:00:00Z"
        }),
    )
}

fn recalculation() -> NutritionalRecalculation {
    NutritionalRecalculation {
        get: Some(2000.0),
        protein: Some(ProteinTarget {
            total_grams: Some(100.0),
            ..Default::default()
        }),
        weight_used: Some(70.0),
        ..Default::default()
    }
}

fn ctx() -> SaveContext {
    SaveContext {
        owner_id: "user-1".to_string(),
        owner_email: None,
        saved_at: "2026-08-05T10:00:00Z".parse::<Timestamp>().expect("timestamp"),
    }
}

#[test]
fn session_refuses_to_start_without_a_parent() {
    assert!(matches!(
        FollowUpSession::start(None),
        Err(FollowUpError::NoParentAssessment)
    ));
}

#[test]
fn session_resolves_the_parent_objective_on_start() {
    let session = FollowUpSession::start(Some(parent())).expect("session");
    assert_eq!(session.phase(), SessionPhase::Collecting);
    let objective = session.objective().expect("objective");
    assert_eq!(objective.calorie_goal, Some(2000.0));
}

#[test]
fn save_without_recalculation_is_refused() {
    let session = FollowUpSession::start(Some(parent())).expect("session");
    let result = session.build_record(&FollowUpDraft::default(), &ctx());
    assert!(matches!(result, Err(FollowUpError::RecalculationMissing)));
}

#[test]
fn last_completed_recalculation_wins() {
    let mut session = FollowUpSession::start(Some(parent())).expect("session");

    session.begin_recalculation().expect("begin");
    session
        .complete_recalculation(NutritionalRecalculation {
            get: Some(1900.0),
            ..Default::default()
        })
        .expect("first");

    session.begin_recalculation().expect("begin again");
    session
        .complete_recalculation(NutritionalRecalculation {
            get: Some(2050.0),
            ..Default::default()
        })
        .expect("second");

    assert_eq!(session.phase(), SessionPhase::ReadyToSave);
    assert_eq!(
        session.recalculation().and_then(|r| r.get),
        Some(2050.0)
    );
}

#[test]
fn cancel_keeps_an_earlier_result() {
    let mut session = FollowUpSession::start(Some(parent())).expect("session");

    session.begin_recalculation().expect("begin");
    session.cancel_recalculation().expect("cancel");
    assert_eq!(session.phase(), SessionPhase::Collecting);

    session.begin_recalculation().expect("begin");
    session.complete_recalculation(recalculation()).expect("complete");
    session.begin_recalculation().expect("begin again");
    session.cancel_recalculation().expect("cancel again");
    assert_eq!(session.phase(), SessionPhase::ReadyToSave);
    assert!(session.recalculation().is_some());
}

#[test]
fn saved_is_terminal() {
    let mut session = FollowUpSession::start(Some(parent())).expect("session");
    session.begin_recalculation().expect("begin");
    session.complete_recalculation(recalculation()).expect("complete");
    session.mark_saved().expect("saved");

    assert!(matches!(
        session.begin_recalculation(),
        Err(FollowUpError::AlreadySaved)
    ));
    assert!(matches!(
        session.complete_recalculation(recalculation()),
        Err(FollowUpError::AlreadySaved)
    ));
    assert!(matches!(
        session.build_record(&FollowUpDraft::default(), &ctx()),
        Err(FollowUpError::AlreadySaved)
    ));
    assert!(matches!(
        session.mark_saved(),
        Err(FollowUpError::AlreadySaved)
    ));
}

#[test]
fn mark_saved_requires_a_recalculation() {
    let mut session = FollowUpSession::start(Some(parent())).expect("session");
    assert!(matches!(
        session.mark_saved(),
        Err(FollowUpError::RecalculationMissing)
    ));
}

// ── Record building ──────────────────────────────────────────────────────────

fn full_draft() -> FollowUpDraft {
    FollowUpDraft {
        follow_up_date: Some("2026-08-05".to_string()),
        current_weight: Some(70.0),
        temperature: Some(36.8),
        clinical_condition: Some("estable".to_string()),
        intake: Some(RouteIntake {
            route: NutritionRoute::Enteral,
            enteral: Some(InfusionIntake {
                volume_ml: 1500.0,
                kcal_per_ml: 1.2,
                protein_per_ml: 0.04,
            }),
            parenteral: None,
        }),
        infusions: Some(NonNutritionalInfusions {
            propofol: PropofolInfusion {
                enabled: false,
                ..Default::default()
            },
            ..Default::default()
        }),
        ..Default::default()
    }
}

#[test]
fn identity_is_inherited_and_weight_is_fresh() {
    let mut session = FollowUpSession::start(Some(parent())).expect("session");
    session.begin_recalculation().expect("begin");
    session.complete_recalculation(recalculation()).expect("complete");

    let prepared = session.build_record(&full_draft(), &ctx()).expect("record");
    let info = &prepared.doc["generalInfo"];

    assert_eq!(info["patientName"], json!("Ana Torres"));
    assert_eq!(info["documentNumber"], json!("100"));
    assert_eq!(info["age"], json!(64));
    assert_eq!(info["sex"], json!("female"));
    assert_eq!(info["height"], json!(160.0));
    // Fresh measurement; the parent's weight is preserved separately.
    assert_eq!(info["weight"], json!(70.0));
    assert_eq!(info["previousWeight"], json!(75.0));
    assert_eq!(prepared.doc["assessmentType"], json!("follow-up"));
}

#[test]
fn comparison_attainment_and_totals_are_reconciled() {
    let mut session = FollowUpSession::start(Some(parent())).expect("session");
    session.begin_recalculation().expect("begin");
    session.complete_recalculation(recalculation()).expect("complete");

    let prepared = session.build_record(&full_draft(), &ctx()).expect("record");
    let details = &prepared.doc["followUpDetails"];

    // 75 → 70 is -6.67%, clinically significant.
    assert_eq!(details["weightComparison"]["delta"], json!(-5.0));
    assert_eq!(details["weightComparison"]["percentChange"], json!(-6.67));
    assert_eq!(details["weightComparison"]["trend"], json!("loss"));
    assert_eq!(details["weightComparison"]["clinicallySignificant"], json!(true));

    // 1800 kcal against the 2000 kcal goal: 90%, met.
    assert_eq!(details["intakeTotals"]["totalCalories"], json!(1800.0));
    assert_eq!(details["objectiveAttainment"]["percentage"], json!(90.0));
    assert_eq!(details["objectiveAttainment"]["status"], json!("met"));

    // Provenance copy of the parent's resolved objective.
    assert_eq!(
        details["nutritionalObjectives"]["calorieGoal"],
        json!(2000.0)
    );
    assert_eq!(
        details["nutritionalObjectives"]["source"],
        json!("unified-needs")
    );
}

#[test]
fn recalculation_is_aliased_and_fanned_out() {
    let mut session = FollowUpSession::start(Some(parent())).expect("session");
    session.begin_recalculation().expect("begin");
    session.complete_recalculation(recalculation()).expect("complete");

    let prepared = session.build_record(&full_draft(), &ctx()).expect("record");
    let doc = &prepared.doc;

    assert_eq!(doc["nutritionalRecalculationResults"]["get"], json!(2000.0));
    assert_eq!(
        doc["followUpDetails"]["nutritionalRecalculationResults"]["get"],
        json!(2000.0)
    );
    // Alias fan-out from the recalculation values.
    assert_eq!(doc["nutritionalNeeds"]["calorieGoal"], json!(2000.0));
    assert_eq!(doc["nutritionalNeeds"]["proteinGoal"], json!(100.0));
    assert_eq!(doc["calculatorData"]["calorieGoal"], json!(2000.0));
    assert_eq!(doc["generalInfo"]["calorieGoal"], json!(2000.0));
    assert_eq!(doc["calories"]["goal"], json!(2000.0));
    assert_eq!(doc["protein"]["goal"], json!(100.0));
}

#[test]
fn missing_parent_identity_blocks_the_save() {
    let orphan = StoredAssessment::new(
        "parent-2",
        json!({
            "generalInfo": { "weight": 75.0 }
        }),
    );
    let mut session = FollowUpSession::start(Some(orphan)).expect("session");
    session.begin_recalculation().expect("begin");
    session.complete_recalculation(recalculation()).expect("complete");

    let result = session.build_record(&full_draft(), &ctx());
    assert!(matches!(result, Err(FollowUpError::Core(_))));
}
