//! Data-wide integrity checks across skills, effects, sets and CP stars.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{info, instrument, warn};

use super::Status;
use crate::data::{Collection, CpStar, DataRoot, Effect, SetItem, Skill};

/// Allowed id prefixes per collection.
const SKILL_PREFIXES: &[&str] = &["skill."];
const EFFECT_PREFIXES: &[&str] = &["buff.", "debuff.", "shield.", "hot."];
const SET_PREFIXES: &[&str] = &["set."];
const CP_PREFIXES: &[&str] = &["cp."];

/// One integrity problem, located by a field path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Location, e.g. `skills[3].effects[0].effect_id`.
    pub field: String,
    /// What is wrong.
    pub message: String,
}

impl FieldError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Result of [`check_data`].
#[derive(Debug, Clone, Serialize)]
pub struct IntegrityReport {
    pub status: Status,
    pub error_count: usize,
    pub errors: Vec<FieldError>,
}

impl IntegrityReport {
    fn from_errors(errors: Vec<FieldError>) -> Self {
        Self {
            status: Status::from_errors(&errors),
            error_count: errors.len(),
            errors,
        }
    }
}

/// Run every integrity check against the files under `store`.
#[instrument(skip(store), fields(root = %store.root().display()))]
pub async fn check_data(store: &DataRoot) -> IntegrityReport {
    let skills = store.load_typed::<Skill>(Collection::Skills).await;
    let effects = store.load_typed::<Effect>(Collection::Effects).await;
    let sets = store.load_typed::<SetItem>(Collection::Sets).await;
    let cp_stars = store.load_typed::<CpStar>(Collection::CpStars).await;

    let (skills, effects, sets, cp_stars) = match (skills, effects, sets, cp_stars) {
        (Ok(skills), Ok(effects), Ok(sets), Ok(cp_stars)) => (skills, effects, sets, cp_stars),
        (skills, effects, sets, cp_stars) => {
            let errors = [
                (Collection::Skills, skills.err()),
                (Collection::Effects, effects.err()),
                (Collection::Sets, sets.err()),
                (Collection::CpStars, cp_stars.err()),
            ]
            .into_iter()
            .filter_map(|(collection, err)| {
                err.map(|e| FieldError::new(collection.path(), e.to_string()))
            })
            .collect();
            warn!("Data files failed to load");
            return IntegrityReport::from_errors(errors);
        }
    };

    let report = IntegrityReport::from_errors(validate_all(&skills, &effects, &sets, &cp_stars));
    info!(errors = report.error_count, "Integrity check finished");
    report
}

/// Check already-loaded collections.
pub fn validate_all(
    skills: &[Skill],
    effects: &[Effect],
    sets: &[SetItem],
    cp_stars: &[CpStar],
) -> Vec<FieldError> {
    let effect_ids: HashSet<&str> = effects.iter().map(|e| e.id.as_str()).collect();

    let mut errors = Vec::new();
    errors.extend(validate_skills(skills, &effect_ids));
    errors.extend(validate_effects(effects));
    errors.extend(validate_sets(sets, &effect_ids));
    errors.extend(validate_cp_stars(cp_stars, &effect_ids));
    errors
}

fn check_ids<'a>(
    ids: impl Iterator<Item = &'a str>,
    prefixes: &[&str],
    collection: &str,
) -> Vec<FieldError> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for (idx, id) in ids.enumerate() {
        let field = format!("{collection}[{idx}].id");
        if !seen.insert(id) {
            errors.push(FieldError::new(&field, format!("Duplicate id '{id}'")));
        }
        if !prefixes.iter().any(|p| id.starts_with(p)) {
            errors.push(FieldError::new(
                &field,
                format!("ID '{id}' does not start with any allowed prefix {prefixes:?}"),
            ));
        }
    }

    errors
}

fn unknown_effect(field: String, effect_id: &str) -> FieldError {
    FieldError::new(
        field,
        format!("Unknown effect_id '{effect_id}' (not found in effects.json)"),
    )
}

fn validate_skills(skills: &[Skill], effect_ids: &HashSet<&str>) -> Vec<FieldError> {
    let mut errors = check_ids(skills.iter().map(|s| s.id.as_str()), SKILL_PREFIXES, "skills");

    for (s_idx, skill) in skills.iter().enumerate() {
        for (e_idx, effect) in skill.effects.iter().enumerate() {
            if !effect_ids.contains(effect.effect_id.as_str()) {
                errors.push(unknown_effect(
                    format!("skills[{s_idx}].effects[{e_idx}].effect_id"),
                    &effect.effect_id,
                ));
            }
        }
    }

    errors
}

fn validate_effects(effects: &[Effect]) -> Vec<FieldError> {
    check_ids(effects.iter().map(|e| e.id.as_str()), EFFECT_PREFIXES, "effects")
}

fn validate_sets(sets: &[SetItem], effect_ids: &HashSet<&str>) -> Vec<FieldError> {
    let mut errors = check_ids(sets.iter().map(|s| s.id.as_str()), SET_PREFIXES, "sets");

    for (s_idx, set) in sets.iter().enumerate() {
        for (b_idx, bonus) in set.bonuses.iter().enumerate() {
            for (e_idx, link) in bonus.effects.iter().enumerate() {
                if !effect_ids.contains(link.effect_id()) {
                    errors.push(unknown_effect(
                        format!("sets[{s_idx}].bonuses[{b_idx}].effects[{e_idx}]"),
                        link.effect_id(),
                    ));
                }
            }
        }
    }

    errors
}

fn validate_cp_stars(cp_stars: &[CpStar], effect_ids: &HashSet<&str>) -> Vec<FieldError> {
    let mut errors = check_ids(cp_stars.iter().map(|c| c.id.as_str()), CP_PREFIXES, "cpstars");

    for (c_idx, star) in cp_stars.iter().enumerate() {
        for (e_idx, link) in star.effects.iter().enumerate() {
            if !effect_ids.contains(link.effect_id()) {
                errors.push(unknown_effect(
                    format!("cpstars[{c_idx}].effects[{e_idx}]"),
                    link.effect_id(),
                ));
            }
        }
    }

    errors
}
