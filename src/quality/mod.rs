//! Quality metrics derived from hypergraph structure.

pub mod coherence;

pub use coherence::{coherence, coherence_score, CoherenceOutcome};
