//! Nutritional objective resolution.
//!
//! Assessment records were written by several frontend generations, so the
//! calorie/protein goal can live in any of half a dozen places. The resolver
//! walks an ordered candidate list and stops at the first structurally valid
//! hit — later, lower-priority sources never override or merge into an
//! earlier one. Narrative text is only consulted for non-follow-up records.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;

use crate::models::assessment::{AssessmentKind, StoredAssessment, lookup_path, numeric};

/// Plausible clinical range for a daily calorie goal (exclusive bounds).
/// Candidates outside it are discarded, never clamped.
pub const CALORIE_GOAL_MIN: f64 = 500.0;
pub const CALORIE_GOAL_MAX: f64 = 10_000.0;

/// Plausible clinical range for a daily protein goal in grams (exclusive).
pub const PROTEIN_GOAL_MIN: f64 = 10.0;
pub const PROTEIN_GOAL_MAX: f64 = 500.0;

/// Bounds for numbers pulled out of narrative text. Heuristic guards against
/// picking up lab values or dates, not authoritative clinical limits.
pub const NARRATIVE_CALORIE_MIN: f64 = 800.0;
pub const NARRATIVE_CALORIE_MAX: f64 = 5000.0;
pub const NARRATIVE_PROTEIN_MIN: f64 = 20.0;
pub const NARRATIVE_PROTEIN_MAX: f64 = 200.0;

/// Key-name search never descends more than this many levels.
const SCAN_DEPTH_LIMIT: usize = 5;

/// Placeholder when no date field resolves.
pub const UNKNOWN_DATE: &str = "unknown";

/// Which resolver step produced an objective. Persisted alongside the
/// values for provenance and debugging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "kebab-case")]
#[ts(export)]
pub enum ObjectiveSource {
    UnifiedNeeds,
    Recalculation,
    CalculatorResults,
    CalculatorData,
    FollowUpDetails,
    NarrativeText,
    DeepScan,
}

/// The resolved calorie/protein goal for a record. Each axis is nullable on
/// its own: an out-of-range candidate empties that axis, not the objective.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NutritionalObjective {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub calorie_goal: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub protein_goal: Option<f64>,
    pub assessment_date: String,
    pub source: ObjectiveSource,
    pub assessment_type: AssessmentKind,
}

/// Resolve a record's nutritional objective, or `None` when nothing in the
/// document yields a value in range. Never panics.
pub fn resolve(record: &StoredAssessment) -> Option<NutritionalObjective> {
    let doc = &record.doc;
    let kind = record.kind();
    let (goals, source) = locate_goals(doc, kind)?;
    Some(NutritionalObjective {
        calorie_goal: goals.calories,
        protein_goal: goals.protein,
        assessment_date: assessment_date(doc),
        source,
        assessment_type: kind,
    })
}

/// Read the goal values out of a recalculation payload. Calorie value is
/// `adjustedGet ?? get`; protein has been stored as a number, a target
/// field, or display text like `"98 g/day"`. Both axes are range-validated.
pub fn recalculation_goals(payload: &Value) -> (Option<f64>, Option<f64>) {
    let calories = payload
        .get("adjustedGet")
        .and_then(numeric)
        .or_else(|| payload.get("get").and_then(numeric))
        .filter(|v| plausible_calories(*v));
    let protein_field = payload.get("protein");
    let protein = protein_field
        .and_then(|p| p.get("totalGrams"))
        .and_then(numeric)
        .or_else(|| protein_field.and_then(|p| p.get("targetValue")).and_then(numeric))
        .or_else(|| {
            protein_field
                .and_then(|p| p.get("summary"))
                .and_then(Value::as_str)
                .and_then(first_number)
        })
        .or_else(|| protein_field.and_then(Value::as_str).and_then(first_number))
        .filter(|v| plausible_protein(*v));
    (calories, protein)
}

#[derive(Debug, Clone, Copy, Default)]
struct GoalPair {
    calories: Option<f64>,
    protein: Option<f64>,
}

impl GoalPair {
    fn complete(&self) -> bool {
        self.calories.is_some() && self.protein.is_some()
    }

    /// A step hits when at least one axis survived range validation.
    fn validated(self) -> Option<GoalPair> {
        (self.calories.is_some() || self.protein.is_some()).then_some(self)
    }
}

fn locate_goals(doc: &Value, kind: AssessmentKind) -> Option<(GoalPair, ObjectiveSource)> {
    if let Some(goals) = unified_needs(doc) {
        return Some((goals, ObjectiveSource::UnifiedNeeds));
    }
    if let Some(goals) = recalculation_search(doc) {
        return Some((goals, ObjectiveSource::Recalculation));
    }
    if let Some(goals) = doc
        .get("calculatorResults")
        .and_then(|v| key_scan(v, SCAN_DEPTH_LIMIT))
    {
        return Some((goals, ObjectiveSource::CalculatorResults));
    }
    if let Some(goals) = doc
        .get("calculatorData")
        .and_then(|v| key_scan(v, SCAN_DEPTH_LIMIT))
    {
        return Some((goals, ObjectiveSource::CalculatorData));
    }
    if let Some(goals) = doc
        .get("followUpDetails")
        .and_then(|v| key_scan(v, SCAN_DEPTH_LIMIT))
    {
        return Some((goals, ObjectiveSource::FollowUpDetails));
    }
    // Narrative numbers are too noisy to trust once a record has structured
    // recalculation data anywhere in it; follow-ups always do.
    if kind != AssessmentKind::FollowUp
        && let Some(goals) = narrative_goals(doc)
    {
        return Some((goals, ObjectiveSource::NarrativeText));
    }
    key_scan(doc, usize::MAX).map(|goals| (goals, ObjectiveSource::DeepScan))
}

fn unified_needs(doc: &Value) -> Option<GoalPair> {
    if let Some(needs) = doc.get("nutritionalNeeds")
        && let Some(pair) = (GoalPair {
            calories: needs
                .get("calorieGoal")
                .and_then(numeric)
                .filter(|v| plausible_calories(*v)),
            protein: needs
                .get("proteinGoal")
                .and_then(numeric)
                .filter(|v| plausible_protein(*v)),
        })
        .validated()
    {
        return Some(pair);
    }
    // The `calories.goal` / `protein.goal` sub-objects are written alongside
    // the unified field by the alias fan-out and count as the same source.
    GoalPair {
        calories: lookup_path(doc, "calories.goal")
            .and_then(numeric)
            .filter(|v| plausible_calories(*v)),
        protein: lookup_path(doc, "protein.goal")
            .and_then(numeric)
            .filter(|v| plausible_protein(*v)),
    }
    .validated()
}

/// Every location a recalculation payload has ever been written to, highest
/// priority first.
const RECALCULATION_PATHS: [&str; 4] = [
    "nutritionalRecalculationResults",
    "followUpDetails.nutritionalRecalculationResults",
    "calculatorResults.nutritionalRecalculationResults",
    "calculatorData.nutritionalRecalculationResults",
];

fn recalculation_search(doc: &Value) -> Option<GoalPair> {
    RECALCULATION_PATHS.iter().find_map(|path| {
        let payload = lookup_path(doc, path)?;
        let (calories, protein) = recalculation_goals(payload);
        GoalPair { calories, protein }.validated()
    })
}

const CALORIE_KEY_HINTS: [&str; 5] = ["calori", "kcal", "energ", "get", "adjusted"];
const PROTEIN_KEY_HINTS: [&str; 3] = ["protein", "totalgrams", "targetvalue"];

/// Recursive key-name search: the first in-range value under a calorie-ish
/// or protein-ish key wins that axis. Serde's object maps iterate in sorted
/// key order, so the walk is deterministic.
fn key_scan(value: &Value, max_depth: usize) -> Option<GoalPair> {
    let mut pair = GoalPair::default();
    scan_value(value, max_depth, &mut pair);
    pair.validated()
}

fn scan_value(value: &Value, depth_left: usize, pair: &mut GoalPair) {
    if depth_left == 0 || pair.complete() {
        return;
    }
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let lower = key.to_ascii_lowercase();
                if pair.calories.is_none()
                    && CALORIE_KEY_HINTS.iter().any(|h| lower.contains(h))
                    && let Some(v) = numeric(child).filter(|v| plausible_calories(*v))
                {
                    pair.calories = Some(v);
                }
                if pair.protein.is_none()
                    && PROTEIN_KEY_HINTS.iter().any(|h| lower.contains(h))
                    && let Some(v) = numeric(child).filter(|v| plausible_protein(*v))
                {
                    pair.protein = Some(v);
                }
                if pair.complete() {
                    return;
                }
                scan_value(child, depth_left - 1, pair);
            }
        }
        Value::Array(items) => {
            for child in items {
                scan_value(child, depth_left - 1, pair);
                if pair.complete() {
                    return;
                }
            }
        }
        _ => {}
    }
}

static RE_OBJECTIVE_KCAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)objetivo\D{0,60}?(\d{3,4}(?:[.,]\d+)?)\s*kcal").unwrap()
});
static RE_OBJECTIVE_PROTEIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)prote[ií]na\D{0,40}?(\d{1,3}(?:[.,]\d+)?)\s*g\b").unwrap()
});
static RE_FIRST_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:[.,]\d+)?").unwrap());

fn narrative_goals(doc: &Value) -> Option<GoalPair> {
    let mut text = String::new();
    for field in ["diagnosis", "plan"] {
        if let Some(s) = doc.get(field).and_then(Value::as_str) {
            text.push_str(s);
            text.push('\n');
        }
    }
    if text.trim().is_empty() {
        return None;
    }
    let calories = RE_OBJECTIVE_KCAL
        .captures(&text)
        .and_then(|c| parse_number(c.get(1)?.as_str()))
        .filter(|v| (NARRATIVE_CALORIE_MIN..=NARRATIVE_CALORIE_MAX).contains(v));
    let protein = RE_OBJECTIVE_PROTEIN
        .captures(&text)
        .and_then(|c| parse_number(c.get(1)?.as_str()))
        .filter(|v| (NARRATIVE_PROTEIN_MIN..=NARRATIVE_PROTEIN_MAX).contains(v));
    GoalPair { calories, protein }.validated()
}

fn assessment_date(doc: &Value) -> String {
    for path in ["generalInfo.assessmentDate", "followUpDetails.followUpDate"] {
        if let Some(s) = lookup_path(doc, path).and_then(Value::as_str)
            && !s.trim().is_empty()
        {
            return s.trim().to_string();
        }
    }
    if let Some(s) = doc.get("savedAt").and_then(Value::as_str)
        && let Some(date) = s.split('T').next()
        && !date.is_empty()
    {
        return date.to_string();
    }
    UNKNOWN_DATE.to_string()
}

fn plausible_calories(value: f64) -> bool {
    value > CALORIE_GOAL_MIN && value < CALORIE_GOAL_MAX
}

fn plausible_protein(value: f64) -> bool {
    value > PROTEIN_GOAL_MIN && value < PROTEIN_GOAL_MAX
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.replace(',', ".").parse().ok()
}

fn first_number(text: &str) -> Option<f64> {
    RE_FIRST_NUMBER
        .find(text)
        .and_then(|m| parse_number(m.as_str()))
}
