//! Display state and rendering.

use std::fmt::Write;

use serde::{Deserialize, Deserializer};

/// Per-fetch state. `Loaded` and `Failed` are terminal.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchState<T> {
    /// Request not yet settled.
    Pending,
    /// Request succeeded.
    Loaded(T),
    /// Request failed with a message.
    Failed(String),
}

impl<T> Default for FetchState<T> {
    fn default() -> Self {
        FetchState::Pending
    }
}

impl<T> FetchState<T> {
    /// Move out of `Pending`. Settled states never change again.
    pub fn settle(&mut self, next: FetchState<T>) {
        if matches!(self, FetchState::Pending) {
            *self = next;
        }
    }

    /// Whether the fetch has settled.
    pub fn is_settled(&self) -> bool {
        !matches!(self, FetchState::Pending)
    }
}

/// Health endpoint payload.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HealthInfo {
    pub status: String,
    pub service: String,
}

/// Decode `null` as the type's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Base attribute allocation.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Attributes {
    pub health: Option<i64>,
    pub magicka: Option<i64>,
    pub stamina: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ResistPillar {
    pub targetresistshown: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SpeedPillar {
    pub profile: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct HealthPillar {
    pub focus: Option<String>,
}

/// Pillar summary shown on the page.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Pillars {
    #[serde(deserialize_with = "null_as_default")]
    pub resist: ResistPillar,
    #[serde(deserialize_with = "null_as_default")]
    pub speed: SpeedPillar,
    #[serde(deserialize_with = "null_as_default")]
    pub health: HealthPillar,
}

/// The fields of a build document the page shows. Everything is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct BuildView {
    pub id: Option<String>,
    pub name: Option<String>,
    pub classcore: Option<String>,
    pub class: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub subclasses: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub roletags: Vec<String>,
    pub role: Option<String>,
    pub cptotal: Option<u32>,
    pub attributes: Option<Attributes>,
    pub pillars: Option<Pillars>,
}

impl BuildView {
    fn class_core(&self) -> &str {
        self.classcore
            .as_deref()
            .or(self.class.as_deref())
            .unwrap_or("-")
    }

    fn role_tags(&self) -> String {
        if self.roletags.is_empty() {
            self.role.clone().unwrap_or_else(|| "-".to_string())
        } else {
            self.roletags.join(", ")
        }
    }
}

/// The two independent views.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayPage {
    pub health: FetchState<HealthInfo>,
    pub build: FetchState<BuildView>,
}

impl DisplayPage {
    /// Render the page as plain text.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str("The Elder Elemental - ESO Build Engine UI\n\n");

        out.push_str("Backend health\n");
        match &self.health {
            FetchState::Loaded(health) => {
                let _ = writeln!(out, "  Status: {} (service: {})", health.status, health.service);
            }
            FetchState::Failed(message) => {
                let _ = writeln!(out, "  Failed to reach backend health: {message}");
            }
            FetchState::Pending => out.push_str("  Checking backend health...\n"),
        }

        out.push_str("\nPermafrost Marshal (read-only)\n");
        match &self.build {
            FetchState::Loaded(build) => render_build(&mut out, build),
            FetchState::Failed(message) => {
                let _ = writeln!(out, "  Failed to load Permafrost Marshal build: {message}");
            }
            FetchState::Pending => out.push_str("  Loading build...\n"),
        }

        out
    }
}

fn render_build(out: &mut String, build: &BuildView) {
    let _ = writeln!(out, "  Name: {}", build.name.as_deref().unwrap_or("-"));
    let _ = writeln!(out, "  Class core: {}", build.class_core());
    if !build.subclasses.is_empty() {
        let _ = writeln!(out, "  Subclasses: {}", build.subclasses.join(", "));
    }
    let _ = writeln!(out, "  Role tags: {}", build.role_tags());
    if let Some(cp) = build.cptotal {
        let _ = writeln!(out, "  CP total: {cp}");
    }
    if let Some(attrs) = &build.attributes {
        let _ = writeln!(
            out,
            "  Attributes: {} Health / {} Magicka / {} Stamina",
            or_dash(attrs.health),
            or_dash(attrs.magicka),
            or_dash(attrs.stamina)
        );
    }
    if let Some(pillars) = &build.pillars {
        let _ = writeln!(
            out,
            "  Pillars: resist target {}, speed profile {}, health focus {}",
            or_dash(pillars.resist.targetresistshown),
            pillars.speed.profile.as_deref().unwrap_or("-"),
            pillars.health.focus.as_deref().unwrap_or("-")
        );
    }
}

fn or_dash(value: Option<i64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn settled_state_is_terminal() {
        let mut state: FetchState<u8> = FetchState::Pending;
        assert!(!state.is_settled());

        state.settle(FetchState::Failed("Health request failed with 500".to_string()));
        state.settle(FetchState::Loaded(1));
        assert_eq!(state, FetchState::Failed("Health request failed with 500".to_string()));
    }

    #[test]
    fn pending_page_shows_placeholders() {
        let text = DisplayPage::default().render();
        assert!(text.contains("Checking backend health..."));
        assert!(text.contains("Loading build..."));
    }

    #[test]
    fn failures_are_independent() {
        let page = DisplayPage {
            health: FetchState::Loaded(HealthInfo {
                status: "ok".to_string(),
                service: "eso-build-engine-backend".to_string(),
            }),
            build: FetchState::Failed("Build request failed with 500".to_string()),
        };
        let text = page.render();
        assert!(text.contains("Status: ok (service: eso-build-engine-backend)"));
        assert!(text.contains("Failed to load Permafrost Marshal build: Build request failed with 500"));
    }

    #[test]
    fn build_view_renders_display_fields() {
        let build: BuildView = serde_json::from_value(json!({
            "id": "permafrost-marshal",
            "name": "Permafrost Marshal",
            "classcore": "Warden",
            "subclasses": ["Winter's Embrace", "Assault"],
            "roletags": ["tank", "support"],
            "cptotal": 2100,
            "attributes": { "health": 64, "magicka": 0, "stamina": 0 },
            "pillars": {
                "resist": { "targetresistshown": 33000 },
                "speed": { "profile": "major_expedition" },
                "health": { "focus": "max_health" }
            },
            "bars": { "front": [], "back": [] }
        }))
        .unwrap();

        let mut out = String::new();
        render_build(&mut out, &build);
        assert_eq!(
            out,
            "  Name: Permafrost Marshal\n\
             \x20 Class core: Warden\n\
             \x20 Subclasses: Winter's Embrace, Assault\n\
             \x20 Role tags: tank, support\n\
             \x20 CP total: 2100\n\
             \x20 Attributes: 64 Health / 0 Magicka / 0 Stamina\n\
             \x20 Pillars: resist target 33000, speed profile major_expedition, health focus max_health\n"
        );
    }

    #[test]
    fn build_view_falls_back_to_class_and_role() {
        let build: BuildView =
            serde_json::from_value(json!({ "name": "Frost Tank", "class": "Warden", "role": "tank" }))
                .unwrap();
        let mut out = String::new();
        render_build(&mut out, &build);
        assert_eq!(out, "  Name: Frost Tank\n  Class core: Warden\n  Role tags: tank\n");
    }

    #[test]
    fn partial_and_null_fields_still_decode() {
        let build: BuildView = serde_json::from_value(json!({
            "id": "x",
            "name": "X",
            "roletags": null,
            "subclasses": null,
            "attributes": { "health": 64, "magicka": null },
            "pillars": { "resist": null, "speed": { "profile": null } }
        }))
        .unwrap();

        assert!(build.roletags.is_empty());
        assert_eq!(
            build.attributes,
            Some(Attributes {
                health: Some(64),
                magicka: None,
                stamina: None
            })
        );

        let mut out = String::new();
        render_build(&mut out, &build);
        assert_eq!(
            out,
            "  Name: X\n\
             \x20 Class core: -\n\
             \x20 Role tags: -\n\
             \x20 Attributes: 64 Health / - Magicka / - Stamina\n\
             \x20 Pillars: resist target -, speed profile -, health focus -\n"
        );
    }
}
