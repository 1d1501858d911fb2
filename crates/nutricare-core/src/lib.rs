//! nutricare-core
//!
//! Pure domain types and the assessment derivation layer: derived metrics,
//! the nutritional objective resolver, record normalization, follow-up
//! reconciliation, and history grouping. No AWS dependency — this is the
//! shared vocabulary of the nutricare system.

pub mod doc_keys;
pub mod error;
pub mod followup;
pub mod history;
pub mod infusions;
pub mod metrics;
pub mod models;
pub mod normalize;
pub mod objective;
pub mod sort_date;
