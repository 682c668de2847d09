//! Candidate classifier training, selection and explanation for the
//! ExecKPI engine.

pub mod coerce;
pub mod explain;
mod hash;
pub mod metrics;
pub mod model;
pub mod split;
mod trainer;

pub use coerce::{coerce_cell, coerce_columns, coerce_or_zero, CoercionReport};
pub use explain::{explain, ExplainOpts, FeatureContribution};
pub use hash::{stable_hash_string, to_canonical_json_bytes};
pub use model::{Classifier, TrainedModel};
pub use trainer::{
    select_best, train, CandidateResult, ChosenSummary, MetricsReport, TrainOpts, TrainOutcome,
    TrainedArtifactBundle,
};
