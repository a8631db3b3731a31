//! Reference data contracts: skills, effects, sets, CP stars and builds.
//!
//! These shapes describe what the checked-in JSON files are expected to hold.
//! The HTTP server serves files verbatim and never checks them against these
//! types; they back the validators and the OpenAPI document.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;

/// Reference from a skill to an effect it applies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SkillEffectRef {
    /// Referenced effect id.
    #[serde(alias = "effectid")]
    pub effect_id: String,
    /// When the effect applies (e.g. "on_cast").
    pub timing: String,
    /// Who receives the effect (e.g. "self", "enemy").
    pub target: String,
    /// Duration in seconds, when timed.
    #[serde(default)]
    pub duration_seconds: Option<f64>,
}

/// A player-activatable ability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Skill {
    pub id: String,
    pub name: String,
    pub line: String,
    pub role: String,
    pub cost_type: String,
    pub tooltip: String,
    #[serde(default)]
    pub effects: Vec<SkillEffectRef>,
}

/// An atomic gameplay modifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Effect {
    pub id: String,
    pub name: String,
    pub stat: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub magnitude: f64,
    pub unit: String,
    #[serde(default)]
    pub stacks_with: Option<Vec<String>>,
    pub description: String,
}

/// Effect reference used by set bonuses and CP stars.
///
/// Data files use either a bare id string or an `{ "effect_id": ... }` object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum EffectLink {
    /// Bare effect id.
    Id(String),
    /// Object form, optionally carrying when and on whom it applies.
    Ref {
        #[serde(alias = "effectid")]
        effect_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timing: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target: Option<String>,
        #[serde(default, alias = "durationseconds", skip_serializing_if = "Option::is_none")]
        duration_seconds: Option<f64>,
    },
}

impl EffectLink {
    /// Referenced effect id.
    pub fn effect_id(&self) -> &str {
        match self {
            EffectLink::Id(id) => id,
            EffectLink::Ref { effect_id, .. } => effect_id,
        }
    }
}

/// Bonus granted at a piece-count threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SetBonus {
    pub pieces: u8,
    #[serde(default)]
    pub effects: Vec<EffectLink>,
}

/// An equippable item set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SetItem {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub mythic: bool,
    #[serde(default)]
    pub bonuses: Vec<SetBonus>,
}

/// A Champion Point passive node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CpStar {
    pub id: String,
    pub tree: String,
    pub name: String,
    pub slot_type: String,
    pub tooltip: String,
    #[serde(default)]
    pub effects: Vec<EffectLink>,
}

impl CpStar {
    /// Slot type of stars that may appear in a build's slotted CP.
    pub const SLOTTABLE: &'static str = "slottable";

    /// Whether this star can be slotted.
    pub fn is_slottable(&self) -> bool {
        self.slot_type == Self::SLOTTABLE
    }
}

/// Champion Point tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CpTree {
    Warfare,
    Fitness,
    Craft,
}

impl CpTree {
    /// All trees in display order.
    pub const ALL: [CpTree; 3] = [CpTree::Warfare, CpTree::Fitness, CpTree::Craft];

    /// Maximum number of slotted stars per tree.
    pub const MAX_SLOTTED: usize = 4;
}

/// Armor weight class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ArmorWeight {
    Light,
    Medium,
    Heavy,
}

/// Equipment slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum GearSlot {
    Head,
    Shoulder,
    Chest,
    Hands,
    Waist,
    Legs,
    Feet,
    Neck,
    Ring1,
    Ring2,
    FrontWeapon,
    BackWeapon,
}

impl GearSlot {
    /// Every slot a complete build fills.
    pub const ALL: [GearSlot; 12] = [
        GearSlot::Head,
        GearSlot::Shoulder,
        GearSlot::Chest,
        GearSlot::Hands,
        GearSlot::Waist,
        GearSlot::Legs,
        GearSlot::Feet,
        GearSlot::Neck,
        GearSlot::Ring1,
        GearSlot::Ring2,
        GearSlot::FrontWeapon,
        GearSlot::BackWeapon,
    ];

    /// Whether the slot takes an armor weight.
    pub fn is_armor(&self) -> bool {
        matches!(
            self,
            GearSlot::Head
                | GearSlot::Shoulder
                | GearSlot::Chest
                | GearSlot::Hands
                | GearSlot::Waist
                | GearSlot::Legs
                | GearSlot::Feet
        )
    }
}

/// Skill bar slot key: `1`..`5` or `"ULT"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum SlotKey {
    /// Numbered ability slot.
    Index(i64),
    /// Named slot (only "ULT" is valid).
    Named(String),
}

impl SlotKey {
    /// Name of the ultimate slot.
    pub const ULTIMATE: &'static str = "ULT";

    /// The six slots every bar must hold.
    pub fn required() -> [SlotKey; 6] {
        [
            SlotKey::Index(1),
            SlotKey::Index(2),
            SlotKey::Index(3),
            SlotKey::Index(4),
            SlotKey::Index(5),
            SlotKey::Named(Self::ULTIMATE.to_string()),
        ]
    }

    /// Whether this key is one of the six bar slots.
    pub fn is_valid(&self) -> bool {
        match self {
            SlotKey::Index(n) => (1..=5).contains(n),
            SlotKey::Named(name) => name == Self::ULTIMATE,
        }
    }
}

impl std::fmt::Display for SlotKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SlotKey::Index(n) => write!(f, "{n}"),
            SlotKey::Named(name) => f.write_str(name),
        }
    }
}

/// One slot on a skill bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BarSlot {
    pub slot: SlotKey,
    #[serde(default)]
    pub skill_id: Option<String>,
}

/// Front and back skill bars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BuildBars {
    pub front: Vec<BarSlot>,
    pub back: Vec<BarSlot>,
}

impl BuildBars {
    /// Bars paired with their names.
    pub fn named(&self) -> [(&'static str, &[BarSlot]); 2] {
        [("front", &self.front), ("back", &self.back)]
    }
}

/// One equipped piece of gear.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GearPiece {
    pub slot: String,
    #[serde(default)]
    pub set_id: Option<String>,
    #[serde(default)]
    pub weight: Option<String>,
    #[serde(default, rename = "trait", skip_serializing_if = "Option::is_none")]
    pub trait_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enchant: Option<String>,
}

/// Slotted CP stars per tree, each an ordered list of nullable star ids.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CpSlotted {
    #[serde(default)]
    pub warfare: Vec<Option<String>>,
    #[serde(default)]
    pub fitness: Vec<Option<String>>,
    #[serde(default)]
    pub craft: Vec<Option<String>>,
}

impl CpSlotted {
    /// Slotted ids for one tree.
    pub fn tree(&self, tree: CpTree) -> &[Option<String>] {
        match tree {
            CpTree::Warfare => &self.warfare,
            CpTree::Fitness => &self.fitness,
            CpTree::Craft => &self.craft,
        }
    }
}

/// A saved character configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Build {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub class: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    pub bars: BuildBars,
    #[serde(default)]
    pub gear: Vec<GearPiece>,
    #[serde(default)]
    pub cp_slotted: CpSlotted,
}
