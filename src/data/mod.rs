//! Reference data module.
//!
//! This module handles:
//! - Data contracts for skills, effects, sets, CP stars and builds
//! - Fresh-per-call file loading from the repository root

pub mod store;
pub mod types;

pub use store::{
    build_path, sanitize_build_id, Collection, DataRoot, BUILDS_DIR, PERMAFROST_MARSHAL_ID,
};
pub use types::{
    ArmorWeight, BarSlot, Build, BuildBars, CpSlotted, CpStar, CpTree, Effect, EffectLink,
    GearPiece, GearSlot, SetBonus, SetItem, Skill, SkillEffectRef, SlotKey,
};
