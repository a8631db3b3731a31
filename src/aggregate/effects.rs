//! Effect aggregation: skills on the bars, set bonuses reached by the gear,
//! and slotted CP stars.

use serde::Serialize;

use crate::data::{Build, CpTree, EffectLink};
use crate::validate::build::BuildContext;

/// One effect a build applies, tagged with the id of what grants it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectInstance {
    pub effect_id: String,
    /// Skill, set or CP star id.
    pub source: String,
    pub timing: Option<String>,
    pub target: Option<String>,
    pub duration_seconds: Option<f64>,
}

impl EffectInstance {
    fn from_link(link: &EffectLink, source: &str) -> Self {
        match link {
            EffectLink::Id(effect_id) => Self {
                effect_id: effect_id.clone(),
                source: source.to_string(),
                timing: None,
                target: None,
                duration_seconds: None,
            },
            EffectLink::Ref {
                effect_id,
                timing,
                target,
                duration_seconds,
            } => Self {
                effect_id: effect_id.clone(),
                source: source.to_string(),
                timing: timing.clone(),
                target: target.clone(),
                duration_seconds: *duration_seconds,
            },
        }
    }
}

/// Every effect instance `build` applies, in bar, gear, CP order.
///
/// Unknown skill, set and star ids contribute nothing; reporting them is the
/// build validator's job.
pub fn aggregate_effects(build: &Build, context: &BuildContext) -> Vec<EffectInstance> {
    let mut effects = skill_effects(build, context);
    effects.extend(set_effects(build, context));
    effects.extend(cp_effects(build, context));
    effects
}

fn skill_effects(build: &Build, context: &BuildContext) -> Vec<EffectInstance> {
    let mut out = Vec::new();
    for (_, slots) in build.bars.named() {
        for skill_id in slots.iter().filter_map(|s| s.skill_id.as_deref()) {
            let Some(skill) = context.skill(skill_id) else {
                continue;
            };
            out.extend(skill.effects.iter().map(|e| EffectInstance {
                effect_id: e.effect_id.clone(),
                source: skill_id.to_string(),
                timing: Some(e.timing.clone()),
                target: Some(e.target.clone()),
                duration_seconds: e.duration_seconds,
            }));
        }
    }
    out
}

/// Pieces worn per set, in order of first appearance.
fn set_piece_counts(build: &Build) -> Vec<(&str, u8)> {
    let mut counts: Vec<(&str, u8)> = Vec::new();
    for set_id in build.gear.iter().filter_map(|g| g.set_id.as_deref()) {
        match counts.iter_mut().find(|(id, _)| *id == set_id) {
            Some((_, n)) => *n += 1,
            None => counts.push((set_id, 1)),
        }
    }
    counts
}

fn set_effects(build: &Build, context: &BuildContext) -> Vec<EffectInstance> {
    let mut out = Vec::new();
    for (set_id, worn) in set_piece_counts(build) {
        let Some(set) = context.set(set_id) else {
            continue;
        };
        for bonus in set.bonuses.iter().filter(|b| b.pieces <= worn) {
            out.extend(bonus.effects.iter().map(|l| EffectInstance::from_link(l, set_id)));
        }
    }
    out
}

fn cp_effects(build: &Build, context: &BuildContext) -> Vec<EffectInstance> {
    let mut out = Vec::new();
    for tree in CpTree::ALL {
        for star_id in build.cp_slotted.tree(tree).iter().flatten() {
            let Some(star) = context.cp_star(star_id) else {
                continue;
            };
            out.extend(star.effects.iter().map(|l| EffectInstance::from_link(l, star_id)));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{CpStar, SetItem, Skill};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn context() -> BuildContext {
        let skills: Vec<Skill> = serde_json::from_value(json!([{
            "id": "skill.frozen_gate", "name": "Frozen Gate", "line": "Winter's Embrace",
            "role": "control", "cost_type": "magicka", "tooltip": "Roots.",
            "effects": [{ "effect_id": "debuff.root", "timing": "on_trigger", "target": "enemy", "duration_seconds": 3 }]
        }]))
        .unwrap();
        let sets: Vec<SetItem> = serde_json::from_value(json!([{
            "id": "set.pearlescent_ward", "name": "Pearlescent Ward", "type": "dungeon",
            "bonuses": [
                { "pieces": 2, "effects": ["buff.max_health"] },
                { "pieces": 5, "effects": [{ "effect_id": "buff.minor_protection", "target": "group" }] }
            ]
        }]))
        .unwrap();
        let cp_stars: Vec<CpStar> = serde_json::from_value(json!([{
            "id": "cp.ironclad", "tree": "fitness", "name": "Ironclad", "slot_type": "slottable",
            "tooltip": "", "effects": ["buff.minor_protection"]
        }]))
        .unwrap();
        BuildContext::new(skills, sets, cp_stars)
    }

    fn build(pearlescent_pieces: usize) -> Build {
        let gear: Vec<_> = ["head", "shoulder", "chest", "hands", "waist"]
            .iter()
            .enumerate()
            .map(|(i, slot)| {
                let set_id = (i < pearlescent_pieces).then_some("set.pearlescent_ward");
                json!({ "slot": slot, "set_id": set_id, "weight": "heavy" })
            })
            .collect();
        serde_json::from_value(json!({
            "id": "frost-tank",
            "name": "Frost Tank",
            "bars": {
                "front": [{ "slot": 1, "skill_id": "skill.frozen_gate" }, { "slot": 2, "skill_id": "skill.missing" }],
                "back": [{ "slot": "ULT", "skill_id": null }]
            },
            "gear": gear,
            "cp_slotted": { "fitness": ["cp.ironclad", null, "cp.unknown"] }
        }))
        .unwrap()
    }

    fn instance(effect_id: &str, source: &str) -> EffectInstance {
        EffectInstance {
            effect_id: effect_id.to_string(),
            source: source.to_string(),
            timing: None,
            target: None,
            duration_seconds: None,
        }
    }

    #[test]
    fn collects_skill_set_and_cp_effects_in_order() {
        let effects = aggregate_effects(&build(5), &context());

        assert_eq!(
            effects,
            vec![
                EffectInstance {
                    timing: Some("on_trigger".to_string()),
                    target: Some("enemy".to_string()),
                    duration_seconds: Some(3.0),
                    ..instance("debuff.root", "skill.frozen_gate")
                },
                instance("buff.max_health", "set.pearlescent_ward"),
                EffectInstance {
                    target: Some("group".to_string()),
                    ..instance("buff.minor_protection", "set.pearlescent_ward")
                },
                instance("buff.minor_protection", "cp.ironclad"),
            ]
        );
    }

    #[test]
    fn set_bonus_needs_enough_pieces() {
        let sources: Vec<String> = aggregate_effects(&build(4), &context())
            .into_iter()
            .filter(|e| e.source == "set.pearlescent_ward")
            .map(|e| e.effect_id)
            .collect();
        assert_eq!(sources, vec!["buff.max_health".to_string()]);

        assert!(aggregate_effects(&build(1), &context())
            .iter()
            .all(|e| e.source != "set.pearlescent_ward"));
    }

    #[test]
    fn missing_values_serialize_as_null() {
        let value = serde_json::to_value(instance("buff.max_health", "set.a")).unwrap();
        assert_eq!(
            value,
            json!({
                "effect_id": "buff.max_health",
                "source": "set.a",
                "timing": null,
                "target": null,
                "duration_seconds": null
            })
        );
    }
}
