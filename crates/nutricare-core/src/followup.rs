//! Follow-up reconciliation.
//!
//! A follow-up session merges a new follow-up's working data with its parent
//! assessment: identity is inherited, the weight delta and objective
//! attainment are computed against the parent, and intake totals are
//! adjusted for non-nutritional calories. The session is a small state
//! machine; its one hard rule is that a follow-up cannot be saved without a
//! captured recalculation result.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use thiserror::Error;
use ts_rs::TS;

use crate::error::CoreError;
use crate::metrics::{DerivedMetrics, round2};
use crate::models::assessment::{AssessmentKind, FollowUpDraft, SaveContext, StoredAssessment};
use crate::models::general_info::GeneralInfo;
use crate::models::nutrition::{NutritionRoute, NutritionalRecalculation};
use crate::normalize::{
    PreparedDocument, advisory_warnings, apply_metrics, fan_out_goal_aliases, scrub,
    stamp_metadata, validate_identity,
};
use crate::objective::{NutritionalObjective, recalculation_goals, resolve};

/// A weight change of at least this percentage (either direction) is
/// flagged clinically significant.
pub const SIGNIFICANT_WEIGHT_CHANGE_PCT: f64 = 5.0;

#[derive(Debug, Error)]
pub enum FollowUpError {
    #[error("no parent assessment selected; a follow-up requires one")]
    NoParentAssessment,

    #[error(
        "the nutritional recalculation has not been captured; redo the recalculation step before saving"
    )]
    RecalculationMissing,

    #[error("this follow-up session was already saved")]
    AlreadySaved,

    #[error(transparent)]
    Core(#[from] CoreError),
}

// ── Weight comparison ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum WeightTrend {
    Increase,
    Loss,
    Stable,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct WeightComparison {
    pub previous_weight: f64,
    pub current_weight: f64,
    pub delta: f64,
    pub percent_change: f64,
    pub trend: WeightTrend,
    pub clinically_significant: bool,
}

/// Compare the new measurement against the parent's weight. Unlike the
/// screening loss-percent metric, this reports gain as well as loss.
pub fn compare_weight(previous_kg: f64, current_kg: f64) -> Option<WeightComparison> {
    if previous_kg <= 0.0 || current_kg <= 0.0 {
        return None;
    }
    let delta = current_kg - previous_kg;
    let percent_change = round2(delta / previous_kg * 100.0);
    let trend = if delta > 0.0 {
        WeightTrend::Increase
    } else if delta < 0.0 {
        WeightTrend::Loss
    } else {
        WeightTrend::Stable
    };
    Some(WeightComparison {
        previous_weight: previous_kg,
        current_weight: current_kg,
        delta: round2(delta),
        percent_change,
        trend,
        clinically_significant: percent_change.abs() >= SIGNIFICANT_WEIGHT_CHANGE_PCT,
    })
}

// ── Objective attainment ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "kebab-case")]
#[ts(export)]
pub enum AttainmentStatus {
    Met,
    Low,
    High,
    Deficient,
    Excessive,
    NoObjective,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ObjectiveAttainment {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub percentage: Option<f64>,
    pub status: AttainmentStatus,
}

/// Band an actual intake against its goal. 90 and 110 are inclusive: hitting
/// the band edge counts as meeting the objective.
pub fn assess_attainment(actual: f64, goal: Option<f64>) -> ObjectiveAttainment {
    let Some(goal) = goal.filter(|g| *g > 0.0) else {
        return ObjectiveAttainment {
            percentage: None,
            status: AttainmentStatus::NoObjective,
        };
    };
    let percentage = round2(actual / goal * 100.0);
    let status = if percentage < 80.0 {
        AttainmentStatus::Deficient
    } else if percentage < 90.0 {
        AttainmentStatus::Low
    } else if percentage <= 110.0 {
        AttainmentStatus::Met
    } else if percentage <= 120.0 {
        AttainmentStatus::High
    } else {
        AttainmentStatus::Excessive
    };
    ObjectiveAttainment {
        percentage: Some(percentage),
        status,
    }
}

// ── Route intake totals ──────────────────────────────────────────────────────

/// One metered feeding component (a day's enteral or parenteral infusion).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct InfusionIntake {
    /// Volume per day, mL.
    pub volume_ml: f64,
    pub kcal_per_ml: f64,
    pub protein_per_ml: f64,
}

impl InfusionIntake {
    fn calories(&self) -> f64 {
        round2(self.volume_ml * self.kcal_per_ml)
    }

    fn protein(&self) -> f64 {
        round2(self.volume_ml * self.protein_per_ml)
    }
}

/// Intake as entered on the follow-up form.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RouteIntake {
    pub route: NutritionRoute,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub enteral: Option<InfusionIntake>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub parenteral: Option<InfusionIntake>,
}

/// Computed intake, broken down per component for display. Oral and
/// undetermined routes are not metered and report zero macro totals; the
/// non-nutritional load still counts toward `totalCalories`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct IntakeTotals {
    pub route: NutritionRoute,
    pub enteral_calories: f64,
    pub enteral_protein: f64,
    pub parenteral_calories: f64,
    pub parenteral_protein: f64,
    pub route_calories: f64,
    pub route_protein: f64,
    pub non_nutritional_calories: f64,
    pub total_calories: f64,
}

pub fn intake_totals(intake: &RouteIntake, non_nutritional_kcal: f64) -> IntakeTotals {
    let enteral = intake.enteral.unwrap_or_default();
    let parenteral = intake.parenteral.unwrap_or_default();
    let (enteral_counted, parenteral_counted) = match intake.route {
        NutritionRoute::Enteral => (true, false),
        NutritionRoute::Parenteral => (false, true),
        NutritionRoute::Mixed => (true, true),
        NutritionRoute::Oral
        | NutritionRoute::OralWithSupplements
        | NutritionRoute::Undetermined => (false, false),
    };
    let enteral_calories = if enteral_counted { enteral.calories() } else { 0.0 };
    let enteral_protein = if enteral_counted { enteral.protein() } else { 0.0 };
    let parenteral_calories = if parenteral_counted {
        parenteral.calories()
    } else {
        0.0
    };
    let parenteral_protein = if parenteral_counted {
        parenteral.protein()
    } else {
        0.0
    };
    let route_calories = round2(enteral_calories + parenteral_calories);
    let route_protein = round2(enteral_protein + parenteral_protein);
    IntakeTotals {
        route: intake.route,
        enteral_calories,
        enteral_protein,
        parenteral_calories,
        parenteral_protein,
        route_calories,
        route_protein,
        non_nutritional_calories: round2(non_nutritional_kcal),
        total_calories: round2(route_calories + non_nutritional_kcal),
    }
}

// ── Session ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "kebab-case")]
#[ts(export)]
pub enum SessionPhase {
    Collecting,
    Recalculating,
    ReadyToSave,
    Saved,
}

/// The in-memory state of one active follow-up form. There is exactly one
/// writer per session; the recalculation result is committed synchronously
/// by [`FollowUpSession::complete_recalculation`] and read synchronously at
/// save time, so a completed recalculation can never be lost in between.
#[derive(Debug, Clone)]
pub struct FollowUpSession {
    parent: StoredAssessment,
    objective: Option<NutritionalObjective>,
    recalculation: Option<NutritionalRecalculation>,
    phase: SessionPhase,
}

impl FollowUpSession {
    /// Start a session. Refuses to proceed without a parent assessment —
    /// there is nothing to reconcile a follow-up against.
    pub fn start(parent: Option<StoredAssessment>) -> Result<Self, FollowUpError> {
        let parent = parent.ok_or(FollowUpError::NoParentAssessment)?;
        let objective = resolve(&parent);
        Ok(Self {
            parent,
            objective,
            recalculation: None,
            phase: SessionPhase::Collecting,
        })
    }

    pub fn parent(&self) -> &StoredAssessment {
        &self.parent
    }

    /// The parent's resolved objective, retained for display provenance.
    pub fn objective(&self) -> Option<&NutritionalObjective> {
        self.objective.as_ref()
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn recalculation(&self) -> Option<&NutritionalRecalculation> {
        self.recalculation.as_ref()
    }

    pub fn begin_recalculation(&mut self) -> Result<(), FollowUpError> {
        self.ensure_not_saved()?;
        self.phase = SessionPhase::Recalculating;
        Ok(())
    }

    /// Commit a completed recalculation. Last write wins; the committed
    /// result is the one persisted.
    pub fn complete_recalculation(
        &mut self,
        result: NutritionalRecalculation,
    ) -> Result<(), FollowUpError> {
        self.ensure_not_saved()?;
        self.recalculation = Some(result);
        self.phase = SessionPhase::ReadyToSave;
        Ok(())
    }

    /// Leave the recalculation step without a result. An earlier committed
    /// result, if any, is kept.
    pub fn cancel_recalculation(&mut self) -> Result<(), FollowUpError> {
        self.ensure_not_saved()?;
        self.phase = if self.recalculation.is_some() {
            SessionPhase::ReadyToSave
        } else {
            SessionPhase::Collecting
        };
        Ok(())
    }

    /// Build the follow-up record for persistence. Fails when no
    /// recalculation was captured — the record would otherwise be saved
    /// with silently absent nutritional targets.
    pub fn build_record(
        &self,
        draft: &FollowUpDraft,
        ctx: &SaveContext,
    ) -> Result<PreparedDocument, FollowUpError> {
        self.ensure_not_saved()?;
        let recalculation = self
            .recalculation
            .as_ref()
            .ok_or(FollowUpError::RecalculationMissing)?;

        // Identity is inherited unchanged from the parent; the follow-up
        // form only supplies the new measurement and clinical state.
        let mut info = GeneralInfo {
            patient_name: self.parent.patient_name().unwrap_or_default().to_string(),
            document_number: self.parent.document_number().unwrap_or_default(),
            age: self.parent.age(),
            sex: self.parent.sex(),
            height: self.parent.height(),
            weight: draft.current_weight,
            previous_weight: self.parent.weight(),
            assessment_date: draft.follow_up_date.clone(),
            clinical_condition: draft.clinical_condition.clone(),
            nutrition_route: draft.intake.as_ref().map(|i| i.route),
            ..Default::default()
        };
        validate_identity(&info).map_err(FollowUpError::Core)?;

        let metrics = DerivedMetrics::compute(info.weight, info.height, info.sex, None);
        apply_metrics(&mut info, &metrics);
        let warnings = advisory_warnings(&info);

        let comparison = match (self.parent.weight(), draft.current_weight) {
            (Some(previous), Some(current)) => compare_weight(previous, current),
            _ => None,
        };
        let non_nutritional = draft
            .infusions
            .as_ref()
            .map(|i| i.total_kcal())
            .unwrap_or(0.0);
        let totals = draft
            .intake
            .as_ref()
            .map(|intake| intake_totals(intake, non_nutritional));
        let calorie_goal = self.objective.as_ref().and_then(|o| o.calorie_goal);
        let attainment = totals
            .as_ref()
            .map(|t| assess_attainment(t.total_calories, calorie_goal));

        let recalculation_value = serde_json::to_value(recalculation).map_err(CoreError::from)?;

        let mut details = Map::new();
        if let Some(date) = &draft.follow_up_date {
            details.insert("followUpDate".to_string(), json!(date));
        }
        details.insert(
            "previousAssessmentId".to_string(),
            json!(self.parent.id.clone()),
        );
        if let Some(w) = draft.current_weight {
            details.insert("currentWeight".to_string(), json!(w));
        }
        if let Some(t) = draft.temperature {
            details.insert("temperature".to_string(), json!(t));
        }
        if let Some(c) = &draft.clinical_condition {
            details.insert("clinicalCondition".to_string(), json!(c));
        }
        if let Some(intake) = &draft.intake {
            details.insert(
                "intake".to_string(),
                serde_json::to_value(intake).map_err(CoreError::from)?,
            );
        }
        if let Some(t) = &totals {
            details.insert(
                "intakeTotals".to_string(),
                serde_json::to_value(t).map_err(CoreError::from)?,
            );
        }
        if let Some(infusions) = &draft.infusions {
            details.insert(
                "infusions".to_string(),
                serde_json::to_value(infusions).map_err(CoreError::from)?,
            );
        }
        details.insert(
            "nonNutritionalCalories".to_string(),
            json!(round2(non_nutritional)),
        );
        if let Some(c) = &comparison {
            details.insert(
                "weightComparison".to_string(),
                serde_json::to_value(c).map_err(CoreError::from)?,
            );
        }
        if let Some(a) = &attainment {
            details.insert(
                "objectiveAttainment".to_string(),
                serde_json::to_value(a).map_err(CoreError::from)?,
            );
        }
        if let Some(objective) = &self.objective {
            details.insert(
                "nutritionalObjectives".to_string(),
                serde_json::to_value(objective).map_err(CoreError::from)?,
            );
        }
        details.insert(
            "nutritionalRecalculationResults".to_string(),
            recalculation_value.clone(),
        );

        let mut root = Map::new();
        root.insert(
            "generalInfo".to_string(),
            serde_json::to_value(&info).map_err(CoreError::from)?,
        );
        root.insert("followUpDetails".to_string(), Value::Object(details));
        // Top-level alias kept for readers that never look inside
        // followUpDetails.
        root.insert(
            "nutritionalRecalculationResults".to_string(),
            recalculation_value.clone(),
        );
        if let Some(v) = &draft.calculator_results {
            root.insert("calculatorResults".to_string(), v.clone());
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
        stamp_metadata(&mut doc, AssessmentKind::FollowUp, ctx).map_err(FollowUpError::Core)?;
        let (goal_calories, goal_protein) = recalculation_goals(&recalculation_value);
        fan_out_goal_aliases(&mut doc, goal_calories, goal_protein);
        scrub(&mut doc);

        Ok(PreparedDocument { doc, warnings })
    }

    /// Terminal transition; every later mutation fails with `AlreadySaved`.
    pub fn mark_saved(&mut self) -> Result<(), FollowUpError> {
        self.ensure_not_saved()?;
        if self.recalculation.is_none() {
            return Err(FollowUpError::RecalculationMissing);
        }
        self.phase = SessionPhase::Saved;
        Ok(())
    }

    fn ensure_not_saved(&self) -> Result<(), FollowUpError> {
        if self.phase == SessionPhase::Saved {
            return Err(FollowUpError::AlreadySaved);
        }
        Ok(())
    }
}
