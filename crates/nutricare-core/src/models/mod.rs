pub mod assessment;
pub mod general_info;
pub mod nutrition;

pub use assessment::{
    AssessmentKind, FollowUpDraft, InitialDraft, SaveContext, StoredAssessment, lookup_path,
    numeric,
};
pub use general_info::{GeneralInfo, HistoricalWeights, Sex};
pub use nutrition::{
    NutritionRoute, NutritionalNeeds, NutritionalRecalculation, ProteinTarget,
};
