//! Core `Profile` struct, the arena that owns every profile record, and
//! parent-chain inheritance finalization.
//!
//! Profiles from every origin (built-in, generated, fragment, user) live in
//! one [`ProfileArena`]; parent links are arena indices, never owning
//! references, so chains across origins cannot form ownership cycles.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::setting::Setting;

/// Where a profile definition came from, in increasing precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OriginTag {
    /// The built-in defaults document shipped with the application.
    InBox,
    /// A dynamic profile generator.
    Generated,
    /// A third-party fragment extension.
    Fragment,
    /// The anonymous `profiles.defaults` slot.
    ProfilesDefaults,
    /// The user's own settings file.
    #[default]
    User,
}

/// Cursor rendering style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CursorShape {
    Bar,
    Vintage,
    Underscore,
    FilledBox,
    EmptyBox,
    DoubleUnderscore,
}

/// What happens to the pane when the child process exits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CloseOnExitMode {
    Never,
    Graceful,
    Always,
}

/// The inheritable settings bag of a profile. Every field is tri-state so
/// chain lookup can distinguish "not declared" from "explicitly cleared".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSettings {
    #[serde(default, skip_serializing_if = "Setting::is_unset")]
    pub commandline: Setting<String>,

    #[serde(default, skip_serializing_if = "Setting::is_unset")]
    pub starting_directory: Setting<String>,

    #[serde(default, skip_serializing_if = "Setting::is_unset")]
    pub tab_title: Setting<String>,

    #[serde(default, skip_serializing_if = "Setting::is_unset")]
    pub icon: Setting<String>,

    #[serde(default, skip_serializing_if = "Setting::is_unset")]
    pub font_face: Setting<String>,

    #[serde(default, skip_serializing_if = "Setting::is_unset")]
    pub font_size: Setting<f32>,

    #[serde(default, skip_serializing_if = "Setting::is_unset")]
    pub color_scheme: Setting<String>,

    #[serde(default, skip_serializing_if = "Setting::is_unset")]
    pub cursor_shape: Setting<CursorShape>,

    #[serde(default, skip_serializing_if = "Setting::is_unset")]
    pub background_image: Setting<String>,

    #[serde(default, skip_serializing_if = "Setting::is_unset")]
    pub background_image_opacity: Setting<f64>,

    #[serde(default, skip_serializing_if = "Setting::is_unset")]
    pub history_size: Setting<i32>,

    #[serde(default, skip_serializing_if = "Setting::is_unset")]
    pub snap_on_input: Setting<bool>,

    #[serde(default, skip_serializing_if = "Setting::is_unset")]
    pub close_on_exit: Setting<CloseOnExitMode>,

    #[serde(default, skip_serializing_if = "Setting::is_unset")]
    pub padding: Setting<String>,

    #[serde(default, skip_serializing_if = "Setting::is_unset")]
    pub use_acrylic: Setting<bool>,
}

impl ProfileSettings {
    /// Adopts the parent's state for every field this bag leaves unset.
    pub fn layer_from(&mut self, parent: &ProfileSettings) {
        self.commandline.layer(&parent.commandline);
        self.starting_directory.layer(&parent.starting_directory);
        self.tab_title.layer(&parent.tab_title);
        self.icon.layer(&parent.icon);
        self.font_face.layer(&parent.font_face);
        self.font_size.layer(&parent.font_size);
        self.color_scheme.layer(&parent.color_scheme);
        self.cursor_shape.layer(&parent.cursor_shape);
        self.background_image.layer(&parent.background_image);
        self.background_image_opacity
            .layer(&parent.background_image_opacity);
        self.history_size.layer(&parent.history_size);
        self.snap_on_input.layer(&parent.snap_on_input);
        self.close_on_exit.layer(&parent.close_on_exit);
        self.padding.layer(&parent.padding);
        self.use_acrylic.layer(&parent.use_acrylic);
    }

    /// Collapses every `Cleared` field to `Unset`, yielding the observable
    /// effective state.
    pub fn normalized(&self) -> ProfileSettings {
        ProfileSettings {
            commandline: self.commandline.normalized(),
            starting_directory: self.starting_directory.normalized(),
            tab_title: self.tab_title.normalized(),
            icon: self.icon.normalized(),
            font_face: self.font_face.normalized(),
            font_size: self.font_size.normalized(),
            color_scheme: self.color_scheme.normalized(),
            cursor_shape: self.cursor_shape.normalized(),
            background_image: self.background_image.normalized(),
            background_image_opacity: self.background_image_opacity.normalized(),
            history_size: self.history_size.normalized(),
            snap_on_input: self.snap_on_input.normalized(),
            close_on_exit: self.close_on_exit.normalized(),
            padding: self.padding.normalized(),
            use_acrylic: self.use_acrylic.normalized(),
        }
    }
}

/// The resolved view of a profile after its parent chain has been walked.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EffectiveProfile {
    pub name: String,
    pub hidden: bool,
    pub settings: ProfileSettings,
}

/// A terminal profile: identity attributes plus an inheritable settings bag.
///
/// Runtime-only fields (`origin`, `deleted`, `parents`, `effective`) are
/// never serialized; the JSON form carries exactly what the user declared.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Stable identity. Present on every standalone profile once parsing
    /// and identity assignment have run.
    #[serde(
        default,
        with = "crate::guid::serde_braced_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub guid: Option<Uuid>,

    /// Human label. Absent only on the anonymous `profiles.defaults` slot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Namespace of the generator or fragment publisher that produced this
    /// profile. Absent for user-declared profiles.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Marks a fragment entry as an overlay onto the profile with this GUID
    /// rather than a standalone profile.
    #[serde(
        default,
        with = "crate::guid::serde_braced_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub updates: Option<Uuid>,

    /// Excluded from the active list but still serialized.
    #[serde(default, skip_serializing_if = "Setting::is_unset")]
    pub hidden: Setting<bool>,

    #[serde(flatten)]
    pub settings: ProfileSettings,

    /// Provenance tag, set by the parser.
    #[serde(skip)]
    pub origin: OriginTag,

    /// A generated entry the user removed from their file. Never
    /// reserialized; implies hidden.
    #[serde(skip)]
    pub deleted: bool,

    /// Ordered inheritance chain; lookup scans front to back.
    #[serde(skip)]
    pub parents: Vec<ProfileIndex>,

    /// Resolved values, populated by [`ProfileArena::finalize_inheritance`].
    #[serde(skip)]
    pub effective: EffectiveProfile,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            guid: None,
            name: None,
            source: None,
            updates: None,
            hidden: Setting::Unset,
            settings: ProfileSettings::default(),
            origin: OriginTag::default(),
            deleted: false,
            parents: Vec::new(),
            effective: EffectiveProfile::default(),
        }
    }
}

impl Profile {
    /// Creates an empty profile with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Creates a reproduction of a candidate profile: a new empty record
    /// that copies the candidate's identifying attributes and is meant to
    /// take the candidate as its sole parent. User edits layer into the
    /// reproduction; the candidate record itself stays immutable.
    pub fn reproduce_from(candidate: &Profile) -> Self {
        Self {
            guid: candidate.guid,
            name: candidate.name.clone(),
            source: candidate.source.clone(),
            hidden: candidate.hidden,
            origin: candidate.origin,
            ..Self::default()
        }
    }

    /// The resolved hidden flag. Only meaningful after finalization.
    pub fn is_hidden(&self) -> bool {
        self.effective.hidden
    }
}

/// Handle to a profile stored in a [`ProfileArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProfileIndex(pub(crate) usize);

/// Owns every profile record created during one load. Parent links between
/// profiles are [`ProfileIndex`] values into this arena.
#[derive(Debug, Default)]
pub struct ProfileArena {
    nodes: Vec<Profile>,
}

impl ProfileArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a profile and returns its handle.
    pub fn alloc(&mut self, profile: Profile) -> ProfileIndex {
        let index = ProfileIndex(self.nodes.len());
        self.nodes.push(profile);
        index
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Walks the profile's parent chain once (depth-first, left to right,
    /// first declaration wins) and caches the resolved values on the
    /// profile.
    ///
    /// Cycles indicate a corrupt file; the walk stops at the repeat and a
    /// warning is logged. Shared ancestors are absorbed once, silently.
    pub fn finalize_inheritance(&mut self, index: ProfileIndex) {
        let mut acc = InheritanceAccumulator::default();
        let mut path = Vec::new();
        let mut seen = Vec::new();
        self.absorb(index, &mut acc, &mut path, &mut seen);

        self.nodes[index.0].effective = EffectiveProfile {
            name: acc.name.unwrap_or_else(|| "Default".to_string()),
            hidden: acc.hidden.effective().copied().unwrap_or(false),
            settings: acc.settings.normalized(),
        };
    }

    fn absorb(
        &self,
        index: ProfileIndex,
        acc: &mut InheritanceAccumulator,
        path: &mut Vec<ProfileIndex>,
        seen: &mut Vec<ProfileIndex>,
    ) {
        if path.contains(&index) {
            log::warn!(
                "circular profile inheritance detected at {:?}; breaking the chain",
                self.nodes[index.0].guid
            );
            return;
        }
        if seen.contains(&index) {
            return;
        }
        seen.push(index);
        path.push(index);

        let node = &self.nodes[index.0];
        if acc.name.is_none() {
            acc.name = node.name.clone();
        }
        acc.hidden.layer(&node.hidden);
        acc.settings.layer_from(&node.settings);

        for &parent in &node.parents {
            self.absorb(parent, acc, path, seen);
        }
        path.pop();
    }
}

impl std::ops::Index<ProfileIndex> for ProfileArena {
    type Output = Profile;

    fn index(&self, index: ProfileIndex) -> &Profile {
        &self.nodes[index.0]
    }
}

impl std::ops::IndexMut<ProfileIndex> for ProfileArena {
    fn index_mut(&mut self, index: ProfileIndex) -> &mut Profile {
        &mut self.nodes[index.0]
    }
}

#[derive(Default)]
struct InheritanceAccumulator {
    name: Option<String>,
    hidden: Setting<bool>,
    settings: ProfileSettings,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile_with(name: &str, commandline: Setting<String>) -> Profile {
        let mut profile = Profile::new(name);
        profile.settings.commandline = commandline;
        profile
    }

    #[test]
    fn test_child_value_wins_over_parent() {
        let mut arena = ProfileArena::new();
        let parent = arena.alloc(profile_with("parent", Setting::Set("zsh".into())));
        let child = arena.alloc(profile_with("child", Setting::Set("bash".into())));
        arena[child].parents.push(parent);

        arena.finalize_inheritance(child);
        assert_eq!(
            arena[child].effective.settings.commandline.effective(),
            Some(&"bash".to_string())
        );
    }

    #[test]
    fn test_unset_falls_through_to_parent() {
        let mut arena = ProfileArena::new();
        let parent = arena.alloc(profile_with("parent", Setting::Set("zsh".into())));
        let child = arena.alloc(profile_with("child", Setting::Unset));
        arena[child].parents.push(parent);

        arena.finalize_inheritance(child);
        assert_eq!(
            arena[child].effective.settings.commandline.effective(),
            Some(&"zsh".to_string())
        );
    }

    #[test]
    fn test_cleared_shadows_parent() {
        let mut arena = ProfileArena::new();
        let parent = arena.alloc(profile_with("parent", Setting::Set("zsh".into())));
        let child = arena.alloc(profile_with("child", Setting::Cleared));
        arena[child].parents.push(parent);

        arena.finalize_inheritance(child);
        assert_eq!(
            arena[child].effective.settings.commandline.effective(),
            None
        );
    }

    #[test]
    fn test_parents_scanned_front_to_back() {
        let mut arena = ProfileArena::new();
        let first = arena.alloc(profile_with("first", Setting::Set("fish".into())));
        let second = arena.alloc(profile_with("second", Setting::Set("zsh".into())));
        let child = arena.alloc(profile_with("child", Setting::Unset));
        arena[child].parents.extend([first, second]);

        arena.finalize_inheritance(child);
        assert_eq!(
            arena[child].effective.settings.commandline.effective(),
            Some(&"fish".to_string())
        );
    }

    #[test]
    fn test_deep_chain_resolves_through_grandparent() {
        let mut arena = ProfileArena::new();
        let grandparent = arena.alloc(profile_with("grandparent", Setting::Set("sh".into())));
        let parent = arena.alloc(profile_with("parent", Setting::Unset));
        let child = arena.alloc(profile_with("child", Setting::Unset));
        arena[parent].parents.push(grandparent);
        arena[child].parents.push(parent);

        arena.finalize_inheritance(child);
        assert_eq!(
            arena[child].effective.settings.commandline.effective(),
            Some(&"sh".to_string())
        );
    }

    #[test]
    fn test_cycle_is_broken() {
        let mut arena = ProfileArena::new();
        let a = arena.alloc(profile_with("a", Setting::Unset));
        let b = arena.alloc(profile_with("b", Setting::Set("zsh".into())));
        arena[a].parents.push(b);
        arena[b].parents.push(a);

        arena.finalize_inheritance(a);
        assert_eq!(
            arena[a].effective.settings.commandline.effective(),
            Some(&"zsh".to_string())
        );
        assert_eq!(arena[a].effective.name, "a");
    }

    #[test]
    fn test_hidden_inherited_with_false_fallback() {
        let mut arena = ProfileArena::new();
        let mut generated = Profile::new("gen");
        generated.hidden = Setting::Set(true);
        let parent = arena.alloc(generated);
        let child = arena.alloc(Profile::new("child"));
        arena[child].parents.push(parent);

        arena.finalize_inheritance(child);
        assert!(arena[child].is_hidden());

        let lone = arena.alloc(Profile::new("lone"));
        arena.finalize_inheritance(lone);
        assert!(!arena[lone].is_hidden());
    }

    #[test]
    fn test_reproduction_copies_identity_only() {
        let mut candidate = Profile::new("Ubuntu");
        candidate.guid = Some(crate::guid::synthesize_profile_guid(
            Some("Oxterm.Wsl"),
            "Ubuntu",
        ));
        candidate.source = Some("Oxterm.Wsl".to_string());
        candidate.origin = OriginTag::Generated;
        candidate.settings.commandline = Setting::Set("wsl -d Ubuntu".into());

        let reproduction = Profile::reproduce_from(&candidate);
        assert_eq!(reproduction.guid, candidate.guid);
        assert_eq!(reproduction.name, candidate.name);
        assert_eq!(reproduction.source, candidate.source);
        assert_eq!(reproduction.origin, OriginTag::Generated);
        assert!(reproduction.settings.commandline.is_unset());
        assert!(reproduction.parents.is_empty());
    }

    #[test]
    fn test_profile_json_roundtrip_keeps_declared_content_only() {
        let json = r#"{
            "guid": "{6f87c1a0-1111-5222-9333-abcdefabcdef}",
            "name": "Cmd",
            "fontFace": "Cascadia Mono",
            "cursorShape": "vintage",
            "colorScheme": null
        }"#;
        let profile: Profile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.name.as_deref(), Some("Cmd"));
        assert_eq!(
            profile.settings.cursor_shape,
            Setting::Set(CursorShape::Vintage)
        );
        assert!(profile.settings.color_scheme.is_cleared());
        assert!(profile.settings.commandline.is_unset());

        let out = serde_json::to_value(&profile).unwrap();
        assert_eq!(out["fontFace"], "Cascadia Mono");
        assert_eq!(out["colorScheme"], serde_json::Value::Null);
        assert!(out.get("commandline").is_none());
        assert!(out.get("parents").is_none());
        assert!(out.get("origin").is_none());
    }
}
