//! Validation of a single build document against the reference data.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::str::FromStr;

use serde::Serialize;
use tracing::{info, instrument};

use super::Status;
use crate::data::{
    build_path, ArmorWeight, Build, Collection, CpStar, CpTree, DataRoot, GearSlot, SetItem,
    Skill, SlotKey,
};
use crate::error::DataError;

/// Result of [`check_build`].
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_name: Option<String>,
    pub build_path: String,
    pub status: Status,
    pub error_count: usize,
    pub errors: Vec<String>,
}

impl BuildReport {
    fn new(build: Option<&Build>, path: String, errors: Vec<String>) -> Self {
        Self {
            build_id: build.map(|b| b.id.clone()),
            build_name: build.map(|b| b.name.clone()),
            build_path: path,
            status: Status::from_errors(&errors),
            error_count: errors.len(),
            errors,
        }
    }
}

/// Reference tables a build is checked against.
#[derive(Debug, Default)]
pub struct BuildContext {
    skills: HashMap<String, Skill>,
    sets: HashMap<String, SetItem>,
    cp_stars: HashMap<String, CpStar>,
}

impl BuildContext {
    /// Index loaded collections by id.
    pub fn new(skills: Vec<Skill>, sets: Vec<SetItem>, cp_stars: Vec<CpStar>) -> Self {
        Self {
            skills: skills.into_iter().map(|s| (s.id.clone(), s)).collect(),
            sets: sets.into_iter().map(|s| (s.id.clone(), s)).collect(),
            cp_stars: cp_stars.into_iter().map(|c| (c.id.clone(), c)).collect(),
        }
    }

    /// Load skills, sets and CP stars. Every failing file is reported.
    pub async fn load(store: &DataRoot) -> Result<Self, Vec<String>> {
        let skills = store.load_typed::<Skill>(Collection::Skills).await;
        let sets = store.load_typed::<SetItem>(Collection::Sets).await;
        let cp_stars = store.load_typed::<CpStar>(Collection::CpStars).await;

        match (skills, sets, cp_stars) {
            (Ok(skills), Ok(sets), Ok(cp_stars)) => Ok(Self::new(skills, sets, cp_stars)),
            (skills, sets, cp_stars) => Err([skills.err(), sets.err(), cp_stars.err()]
                .into_iter()
                .flatten()
                .map(|e: DataError| e.to_string())
                .collect()),
        }
    }

    pub fn skill(&self, id: &str) -> Option<&Skill> {
        self.skills.get(id)
    }

    pub fn set(&self, id: &str) -> Option<&SetItem> {
        self.sets.get(id)
    }

    pub fn cp_star(&self, id: &str) -> Option<&CpStar> {
        self.cp_stars.get(id)
    }
}

/// Validate `builds/<id>.json` under `store`. `id` must already be sanitized.
#[instrument(skip(store))]
pub async fn check_build(store: &DataRoot, id: &str) -> BuildReport {
    let path = store.root().join(build_path(id)).display().to_string();

    let context = match BuildContext::load(store).await {
        Ok(context) => context,
        Err(errors) => return BuildReport::new(None, path, errors),
    };

    let build = match store.load_build(id).await {
        Ok(build) => build,
        Err(e) => return BuildReport::new(None, path, vec![e.to_string()]),
    };

    let report = BuildReport::new(Some(&build), path, validate_build(&build, &context));
    info!(errors = report.error_count, "Build check finished");
    report
}

/// Structural and reference checks on a decoded build.
pub fn validate_build(build: &Build, context: &BuildContext) -> Vec<String> {
    let mut errors = validate_structure(build);
    errors.extend(validate_references(build, context));
    errors
}

fn validate_structure(build: &Build) -> Vec<String> {
    let mut errors = Vec::new();

    // Bars
    for (bar_name, slots) in build.bars.named() {
        let mut seen = BTreeSet::new();
        for entry in slots {
            if !entry.slot.is_valid() {
                errors.push(format!("Bar '{bar_name}' has invalid slot value: {}", entry.slot));
            }
            if !seen.insert(entry.slot.clone()) {
                errors.push(format!("Bar '{bar_name}' has duplicate slot: {}", entry.slot));
            }
        }

        let missing: Vec<String> = SlotKey::required()
            .into_iter()
            .filter(|slot| !seen.contains(slot))
            .map(|slot| slot.to_string())
            .collect();
        if !missing.is_empty() {
            errors.push(format!(
                "Bar '{bar_name}' missing required slots: {}",
                missing.join(", ")
            ));
        }
    }

    // Gear
    let mut present = BTreeSet::new();
    let mut unexpected = BTreeSet::new();
    for item in &build.gear {
        let Ok(slot) = GearSlot::from_str(&item.slot) else {
            unexpected.insert(item.slot.as_str());
            continue;
        };
        present.insert(slot);

        if slot.is_armor() {
            if let Some(weight) = &item.weight {
                if ArmorWeight::from_str(weight).is_err() {
                    errors.push(format!(
                        "Gear slot '{slot}' has invalid weight '{weight}', expected 'light'|'medium'|'heavy' or null"
                    ));
                }
            }
        }
    }

    let missing: Vec<String> = GearSlot::ALL
        .iter()
        .filter(|slot| !present.contains(*slot))
        .map(ToString::to_string)
        .collect();
    if !missing.is_empty() {
        errors.push(format!("gear missing required slots: {}", missing.join(", ")));
    }
    if !unexpected.is_empty() {
        let extra: Vec<&str> = unexpected.into_iter().collect();
        errors.push(format!("gear has unexpected slots: {}", extra.join(", ")));
    }

    // CP layout
    for tree in CpTree::ALL {
        if build.cp_slotted.tree(tree).len() > CpTree::MAX_SLOTTED {
            errors.push(format!(
                "cp_slotted.{tree} has more than {} entries",
                CpTree::MAX_SLOTTED
            ));
        }
    }

    errors
}

fn validate_references(build: &Build, context: &BuildContext) -> Vec<String> {
    let mut errors = Vec::new();

    // Bars -> skills
    for (bar_name, slots) in build.bars.named() {
        for entry in slots {
            if let Some(skill_id) = &entry.skill_id {
                if !context.skills.contains_key(skill_id) {
                    errors.push(format!(
                        "Bar '{bar_name}' slot {} references unknown skill_id: {skill_id}",
                        entry.slot
                    ));
                }
            }
        }
    }

    // Gear -> sets, at most one mythic piece
    let mut mythic_pieces = 0;
    for item in &build.gear {
        let Some(set_id) = &item.set_id else {
            continue;
        };
        match context.sets.get(set_id) {
            Some(set) if set.mythic => mythic_pieces += 1,
            Some(_) => {}
            None => errors.push(format!(
                "Gear slot '{}' references unknown set_id: {set_id}",
                item.slot
            )),
        }
    }
    if mythic_pieces > 1 {
        errors.push("More than one mythic set detected in gear (max 1 allowed)".to_string());
    }

    // CP -> cp stars, slottable only, no duplicates per tree
    for tree in CpTree::ALL {
        let mut seen = HashSet::new();
        for star_id in build.cp_slotted.tree(tree).iter().flatten() {
            let Some(star) = context.cp_stars.get(star_id) else {
                errors.push(format!(
                    "CP tree '{tree}' references unknown cp_star id: {star_id}"
                ));
                continue;
            };
            if !star.is_slottable() {
                errors.push(format!(
                    "CP tree '{tree}' id '{star_id}' has slot_type '{}', only '{}' may appear in cp_slotted",
                    star.slot_type,
                    CpStar::SLOTTABLE
                ));
                continue;
            }
            if !seen.insert(star_id.as_str()) {
                errors.push(format!(
                    "CP tree '{tree}' has duplicate slotted cp_star id: {star_id}"
                ));
            }
        }
    }

    errors
}
