//! Document key/path conventions.
//!
//! Pure string functions — no AWS dependency. These define the canonical
//! layout of assessment documents in the nutricare bucket. The
//! `(namespace, user_id)` pair is the ownership boundary: every key a user
//! can reach lives under their own prefix.

pub fn assessments_prefix(namespace: &str, user_id: &str) -> String {
    format!("{namespace}/users/{user_id}/assessments/")
}

pub fn assessment_file(prefix: &str, id: &str) -> String {
    format!("{prefix}{id}.json")
}
