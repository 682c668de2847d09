#![deny(missing_docs)]
#![doc = "Core types for the ExecKPI experiment analysis and model selection engine."]

pub mod errors;
mod outcome;
pub mod provenance;
pub mod rng;
mod table;

pub use errors::{ErrorInfo, KpiError};
pub use outcome::{ExperimentSample, GroupOutcome};
pub use provenance::{RunProvenance, SchemaVersion};
pub use rng::{derive_substream_seed, RngHandle};
pub use table::{FeatureTable, DEFAULT_ID_COLUMN};
