//! Assessment history grouping.
//!
//! Loaded records are sorted by their resolved sort timestamp and grouped
//! into per-patient timelines keyed by document number. Groups are rebuilt
//! on every load and after every delete; they are never persisted.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::assessment::StoredAssessment;
use crate::sort_date::sort_timestamp;

/// One patient's timeline: every assessment sharing a document number,
/// newest first. `mostRecentAssessment` duplicates `assessments[0]` so the
/// frontend can render group summaries without indexing.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PatientGroup {
    pub document_number: String,
    pub patient_name: String,
    pub assessments: Vec<StoredAssessment>,
    pub most_recent_assessment: StoredAssessment,
}

/// Everything the history screen needs from one load.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct HistoryView {
    /// All records, newest first. Records with no resolvable document
    /// number appear here but in no group.
    pub records: Vec<StoredAssessment>,
    /// Groups ordered by their most recent record, newest group first.
    pub groups: Vec<PatientGroup>,
}

pub fn build_history(mut records: Vec<StoredAssessment>) -> HistoryView {
    records.sort_by(|a, b| sort_timestamp(&b.doc).cmp(&sort_timestamp(&a.doc)));

    let mut groups: Vec<(String, Vec<StoredAssessment>)> = Vec::new();
    for record in &records {
        let Some(document_number) = record.document_number() else {
            continue;
        };
        match groups.iter_mut().find(|(key, _)| *key == document_number) {
            Some((_, members)) => members.push(record.clone()),
            None => groups.push((document_number, vec![record.clone()])),
        }
    }

    let groups = groups
        .into_iter()
        .map(|(document_number, assessments)| {
            let patient_name = assessments
                .iter()
                .find_map(|a| a.patient_name().map(str::to_string))
                .unwrap_or_default();
            PatientGroup {
                document_number,
                patient_name,
                most_recent_assessment: assessments[0].clone(),
                assessments,
            }
        })
        .collect();

    HistoryView { records, groups }
}
