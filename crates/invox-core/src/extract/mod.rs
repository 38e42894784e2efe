//! Field extraction: rules, gating, AI pass, reconciliation, pipeline.

pub mod ai;
pub mod gate;
pub mod merge;
pub mod pipeline;
pub mod rules;

pub use ai::AiExtractor;
pub use gate::ConfidenceGate;
pub use merge::ResultMerger;
pub use pipeline::Pipeline;
pub use rules::RuleExtractor;
