//! Application-wide settings and their parent-chain inheritance.
//!
//! User globals inherit from the built-in globals the same way profiles
//! inherit from their parents: first declaration wins. Declared and
//! effective state are kept separate so that serialization writes back only
//! what the user declared.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SettingsLoadWarning;
use crate::keybindings::Command;
use crate::scheme::ColorScheme;
use crate::setting::Setting;

/// Application-wide settings from one document.
///
/// `color_schemes` and `commands` are populated by the parser from the
/// top-level `schemes` and `actions` members; `actions` itself is kept as
/// raw JSON so the user's entries round-trip untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalSettings {
    /// GUID or profile name; resolved to a concrete GUID by validation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_profile: Option<String>,

    /// Generator and fragment-publisher namespaces the user opted out of.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub disabled_profile_sources: Vec<String>,

    #[serde(default, skip_serializing_if = "Setting::is_unset")]
    pub copy_on_select: Setting<bool>,

    #[serde(default, skip_serializing_if = "Setting::is_unset")]
    pub initial_rows: Setting<i32>,

    #[serde(default, skip_serializing_if = "Setting::is_unset")]
    pub initial_cols: Setting<i32>,

    #[serde(default, skip_serializing_if = "Setting::is_unset")]
    pub theme: Setting<String>,

    /// Raw key-binding entries, round-tripped verbatim.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<Value>,

    /// Color schemes declared by this document, keyed by name.
    #[serde(skip)]
    pub color_schemes: BTreeMap<String, ColorScheme>,

    /// Parsed view of `actions`.
    #[serde(skip)]
    pub commands: Vec<Command>,

    /// Warnings produced while parsing `actions`.
    #[serde(skip)]
    pub keybinding_warnings: Vec<SettingsLoadWarning>,

    #[serde(skip)]
    parents: Vec<GlobalSettings>,

    /// Resolved values, populated by [`GlobalSettings::finalize_inheritance`].
    #[serde(skip)]
    pub effective: EffectiveGlobals,
}

/// The resolved view of the globals after the parent chain has been walked.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EffectiveGlobals {
    /// The raw `defaultProfile` string found first along the chain.
    pub default_profile_raw: Option<String>,
    /// The resolved default profile, filled in by validation.
    pub default_profile: Option<uuid::Uuid>,
    pub copy_on_select: bool,
    pub initial_rows: i32,
    pub initial_cols: i32,
    pub theme: String,
    /// Schemes visible to every profile: the user's plus everything the
    /// chain contributes under names the user did not take.
    pub color_schemes: BTreeMap<String, ColorScheme>,
    /// Commands merged along the chain; entries earlier in the chain win.
    pub commands: Vec<Command>,
}

impl GlobalSettings {
    /// Appends a parent to the inheritance chain.
    pub fn insert_parent(&mut self, parent: GlobalSettings) {
        self.parents.push(parent);
    }

    /// Walks the chain once (self first, then parents in order) and caches
    /// the resolved values.
    pub fn finalize_inheritance(&mut self) {
        let mut acc = GlobalsAccumulator::default();
        self.absorb(&mut acc);

        self.effective = EffectiveGlobals {
            default_profile_raw: acc.default_profile,
            default_profile: None,
            copy_on_select: acc.copy_on_select.effective().copied().unwrap_or(false),
            initial_rows: acc.initial_rows.effective().copied().unwrap_or(30),
            initial_cols: acc.initial_cols.effective().copied().unwrap_or(120),
            theme: acc
                .theme
                .effective()
                .cloned()
                .unwrap_or_else(|| "system".to_string()),
            color_schemes: acc.color_schemes,
            commands: acc.commands,
        };
    }

    fn absorb(&self, acc: &mut GlobalsAccumulator) {
        if acc.default_profile.is_none() {
            acc.default_profile = self
                .default_profile
                .as_ref()
                .filter(|raw| !raw.is_empty())
                .cloned();
        }
        acc.copy_on_select.layer(&self.copy_on_select);
        acc.initial_rows.layer(&self.initial_rows);
        acc.initial_cols.layer(&self.initial_cols);
        acc.theme.layer(&self.theme);

        for (name, scheme) in &self.color_schemes {
            acc.color_schemes
                .entry(name.clone())
                .or_insert_with(|| scheme.clone());
        }
        for command in &self.commands {
            let key = command.merge_key();
            if !acc.command_keys.contains(&key) {
                acc.command_keys.push(key);
                acc.commands.push(command.clone());
            }
        }

        for parent in &self.parents {
            parent.absorb(acc);
        }
    }
}

#[derive(Default)]
struct GlobalsAccumulator {
    default_profile: Option<String>,
    copy_on_select: Setting<bool>,
    initial_rows: Setting<i32>,
    initial_cols: Setting<i32>,
    theme: Setting<String>,
    color_schemes: BTreeMap<String, ColorScheme>,
    commands: Vec<Command>,
    command_keys: Vec<String>,
}
