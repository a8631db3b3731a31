//! Markdown grid of a build: skill bars, gear and slotted CP.

use std::fmt::Write;

use crate::data::{BarSlot, Build, CpTree, GearSlot, SlotKey};
use crate::validate::build::BuildContext;

/// Render `build` as Markdown, resolving ids to names through `context`.
///
/// Ids missing from the reference data are shown as-is with no tooltip.
pub fn render_build_md(build: &Build, context: &BuildContext) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {}\n", build.name);

    let _ = writeln!(out, "## Bars\n");
    for (bar_name, slots) in build.bars.named() {
        render_bar(&mut out, bar_name, slots, context);
    }

    render_gear(&mut out, build, context);

    let _ = writeln!(out, "## Champion Points\n");
    for tree in CpTree::ALL {
        let _ = writeln!(out, "### {}\n", capitalize(&tree.to_string()));
        table_header(&mut out, &["Slot", "Star", "Tooltip"]);
        for (i, star_id) in build.cp_slotted.tree(tree).iter().enumerate() {
            let (name, tooltip) = match star_id {
                Some(id) => match context.cp_star(id) {
                    Some(star) => (star.name.as_str(), star.tooltip.as_str()),
                    None => (id.as_str(), ""),
                },
                None => ("", ""),
            };
            table_row(&mut out, &[&(i + 1).to_string(), name, tooltip]);
        }
        out.push('\n');
    }

    out.truncate(out.trim_end().len());
    out.push('\n');
    out
}

fn render_bar(out: &mut String, bar_name: &str, slots: &[BarSlot], context: &BuildContext) {
    let _ = writeln!(out, "### {} Bar\n", capitalize(bar_name));
    table_header(out, &["Slot", "Skill", "Tooltip"]);

    for key in SlotKey::required() {
        let skill_id = slots
            .iter()
            .find(|s| s.slot == key)
            .and_then(|s| s.skill_id.as_deref());
        let (label, tooltip) = match skill_id {
            Some(id) => match context.skill(id) {
                Some(skill) => (skill.name.as_str(), skill.tooltip.as_str()),
                None => (id, ""),
            },
            None => ("", ""),
        };
        table_row(out, &[&key.to_string(), label, tooltip]);
    }
    out.push('\n');
}

fn render_gear(out: &mut String, build: &Build, context: &BuildContext) {
    let _ = writeln!(out, "## Gear\n");
    table_header(out, &["Slot", "Set", "Weight", "Trait", "Enchant"]);

    for slot in GearSlot::ALL {
        let slot_name = slot.to_string();
        let piece = build.gear.iter().find(|g| g.slot == slot_name);
        let set_label = piece
            .and_then(|p| p.set_id.as_deref())
            .map(|id| context.set(id).map_or(id, |set| set.name.as_str()))
            .unwrap_or_default();
        let weight = piece.and_then(|p| p.weight.as_deref()).unwrap_or_default();
        let trait_name = piece.and_then(|p| p.trait_name.as_deref()).unwrap_or_default();
        let enchant = piece.and_then(|p| p.enchant.as_deref()).unwrap_or_default();
        table_row(out, &[&slot_name, set_label, weight, trait_name, enchant]);
    }
    out.push('\n');
}

fn table_header(out: &mut String, columns: &[&str]) {
    let _ = writeln!(out, "| {} |", columns.join(" | "));
    let _ = writeln!(out, "|{}", " --- |".repeat(columns.len()));
}

fn table_row(out: &mut String, cells: &[&str]) {
    let cells: Vec<String> = cells.iter().map(|c| c.replace('|', "\\|")).collect();
    let _ = writeln!(out, "| {} |", cells.join(" | "));
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
