//! Reasoning-pipeline integrations built on the analytics engine.

pub mod structural;

pub use structural::{BoostProvenance, StructuralBoost, StructuralBoostPass};
