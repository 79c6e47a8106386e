//! The assembled settings value and the loader that produces it.
//!
//! [`SettingsLoader`] wires together the parser, generators, fragment
//! loader, merge engine, inheritance finalizer, validator, and persister.
//! A load either completes with a fully resolved [`TerminalSettings`] or
//! returns one carrying a load error, mirroring how the application falls
//! back to built-in defaults.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use serde_json::Value;
use uuid::Uuid;

use crate::catalog::ParsedSettings;
use crate::defaults;
use crate::error::{SettingsError, SettingsLoadError, SettingsLoadWarning};
use crate::fragments::{self, ExtensionCatalog};
use crate::generator::{DynamicProfileGenerator, PREFERRED_POWERSHELL_PROFILE_NAME, run_generators};
use crate::globals::GlobalSettings;
use crate::layering::{attach_profile_defaults, layer_candidates};
use crate::parser::SettingsParser;
use crate::persistence;
use crate::profile::{OriginTag, Profile, ProfileArena, ProfileIndex};
use crate::state::ApplicationState;

/// Builder for a full settings load. The defaults correspond to the
/// production file layout; tests point every path into a temp directory and
/// swap in `Custom` generators.
pub struct SettingsLoader {
    settings_path: PathBuf,
    state_path: PathBuf,
    defaults_json: Option<String>,
    fragment_roots: Vec<PathBuf>,
    extension_catalog: Option<Arc<dyn ExtensionCatalog>>,
    generators: Vec<DynamicProfileGenerator>,
}

impl Default for SettingsLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsLoader {
    pub fn new() -> Self {
        Self {
            settings_path: persistence::settings_path(),
            state_path: persistence::state_path(),
            defaults_json: None,
            fragment_roots: fragments::default_fragment_roots(),
            extension_catalog: None,
            generators: DynamicProfileGenerator::default_set(),
        }
    }

    /// Builder method to override the settings file location.
    pub fn with_settings_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.settings_path = path.into();
        self
    }

    /// Builder method to override the sidecar state file location.
    pub fn with_state_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.state_path = path.into();
        self
    }

    /// Builder method to substitute the built-in defaults document.
    pub fn with_defaults_json(mut self, json: impl Into<String>) -> Self {
        self.defaults_json = Some(json.into());
        self
    }

    /// Builder method to override the fragment roots.
    pub fn with_fragment_roots(mut self, roots: Vec<PathBuf>) -> Self {
        self.fragment_roots = roots;
        self
    }

    /// Builder method to attach an extension catalog.
    pub fn with_extension_catalog(mut self, catalog: Arc<dyn ExtensionCatalog>) -> Self {
        self.extension_catalog = Some(catalog);
        self
    }

    /// Builder method to replace the generator registration list.
    pub fn with_generators(mut self, generators: Vec<DynamicProfileGenerator>) -> Self {
        self.generators = generators;
        self
    }

    /// Runs the full load. Never panics and never returns `Err`: fatal
    /// conditions are carried on the returned value so the caller can fall
    /// back to built-in defaults.
    pub fn load(&self) -> TerminalSettings {
        match self.load_inner() {
            Ok(settings) => settings,
            Err(SettingsError::Load(error)) => TerminalSettings::with_load_error(error),
            Err(error) => TerminalSettings::with_deserialization_error(error.to_string()),
        }
    }

    fn load_inner(&self) -> Result<TerminalSettings, SettingsError> {
        let mut arena = ProfileArena::new();
        let mut warnings = Vec::new();
        let mut state = ApplicationState::load(&self.state_path);

        // The user's file. Missing means first run; any other read failure
        // on the main user file is fatal.
        let disk_content = match std::fs::read_to_string(&self.settings_path) {
            Ok(content) => Some(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };
        let need_to_write_file = disk_content.is_none();
        let user_content =
            disk_content.unwrap_or_else(|| defaults::USER_SETTINGS_TEMPLATE.to_string());

        // The built-in layer. A broken defaults.json is a broken
        // installation, so its errors propagate as-is.
        let defaults_content = self.defaults_content()?;
        let default_settings = SettingsParser::new(&mut arena, &mut warnings)
            .parse(OriginTag::InBox, &defaults_content)?;
        let mut user_settings =
            SettingsParser::new(&mut arena, &mut warnings).parse(OriginTag::User, &user_content)?;

        let disabled: HashSet<String> = user_settings
            .globals
            .disabled_profile_sources
            .iter()
            .cloned()
            .collect();
        let user_profile_count = user_settings.catalog.len();

        // Layer the built-in profiles onto the user's, then the generated
        // ones, then the fragments.
        layer_candidates(
            &mut arena,
            &mut user_settings,
            default_settings.catalog.as_slice(),
            &mut warnings,
        );
        run_generators(
            &mut arena,
            &self.generators,
            &disabled,
            &mut user_settings,
            &mut warnings,
        );

        if need_to_write_file {
            fill_blanks_for_new_file(&arena, &mut user_settings, user_profile_count);
        }

        fragments::load_fragments(
            &mut arena,
            &mut user_settings,
            &self.fragment_roots,
            self.extension_catalog.as_ref(),
            &disabled,
            &mut warnings,
        );

        attach_profile_defaults(&mut arena, &user_settings);

        // Re-hide generated profiles this installation has already shown
        // and the user has since removed from their file. The reproduction
        // is the user-side child, so hiding it suppresses the profile
        // without destroying the generated record.
        for &index in &user_settings.catalog.as_slice()[user_profile_count..] {
            if arena[index].origin != OriginTag::Generated {
                continue;
            }
            let Some(guid) = arena[index].guid else {
                continue;
            };
            if !state.note_generated(guid) {
                let profile = &mut arena[index];
                profile.hidden = crate::setting::Setting::Set(true);
                profile.deleted = true;
            }
        }

        // Inheritance finalization: globals, the defaults slot, then every
        // user-visible profile.
        let mut globals = user_settings.globals;
        globals.insert_parent(default_settings.globals);
        globals.finalize_inheritance();

        arena[user_settings.profile_defaults]
            .parents
            .push(default_settings.profile_defaults);
        arena.finalize_inheritance(user_settings.profile_defaults);

        for &index in user_settings.catalog.as_slice() {
            arena.finalize_inheritance(index);
        }

        let mut settings = TerminalSettings {
            arena,
            globals,
            profile_defaults: user_settings.profile_defaults,
            all_profiles: user_settings.catalog.as_slice().to_vec(),
            active_profiles: Vec::new(),
            warnings,
            load_error: None,
            deserialization_error: None,
        };
        settings.validate()?;

        if need_to_write_file || state.is_dirty() {
            if let Err(e) = settings.write_settings_to_disk(&self.settings_path) {
                log::error!("failed to write settings file: {e:#}");
                settings
                    .warnings
                    .push(SettingsLoadWarning::FailedToWriteToSettings);
            }
        }
        if state.is_dirty()
            && let Err(e) = state.save(&self.state_path)
        {
            log::warn!("failed to persist application state: {e:#}");
        }

        Ok(settings)
    }

    fn defaults_content(&self) -> Result<String, SettingsError> {
        if let Some(json) = &self.defaults_json {
            return Ok(json.clone());
        }
        if let Some(path) = persistence::default_settings_path()
            && path.is_file()
        {
            return Ok(std::fs::read_to_string(&path)?);
        }
        Ok(defaults::DEFAULT_SETTINGS_JSON.to_string())
    }
}

/// A brand-new settings file gets its `defaultProfile` pointed at the
/// preferred generated shell when one was produced, falling back to the
/// built-in first profile.
fn fill_blanks_for_new_file(
    arena: &ProfileArena,
    user_settings: &mut ParsedSettings,
    user_profile_count: usize,
) {
    let mut guid = defaults::DEFAULT_BASH_GUID;
    for &index in &user_settings.catalog.as_slice()[user_profile_count..] {
        let profile = &arena[index];
        if profile.origin == OriginTag::Generated
            && profile.name.as_deref() == Some(PREFERRED_POWERSHELL_PROFILE_NAME)
            && let Some(generated_guid) = profile.guid
        {
            guid = generated_guid;
            break;
        }
    }
    user_settings.globals.default_profile = Some(crate::guid::format_braced(&guid));
}

/// The fully resolved settings: globals, the defaults slot, the complete
/// and active profile lists, and the diagnostics gathered along the way.
pub struct TerminalSettings {
    pub(crate) arena: ProfileArena,
    pub(crate) globals: GlobalSettings,
    pub(crate) profile_defaults: ProfileIndex,
    pub(crate) all_profiles: Vec<ProfileIndex>,
    pub(crate) active_profiles: Vec<ProfileIndex>,
    pub(crate) warnings: Vec<SettingsLoadWarning>,
    pub(crate) load_error: Option<SettingsLoadError>,
    pub(crate) deserialization_error: Option<String>,
}

impl TerminalSettings {
    /// Loads everything from the production locations: built-in defaults,
    /// the user's file, generators, fragments, and the sidecar state.
    pub fn load_all() -> TerminalSettings {
        SettingsLoader::new().load()
    }

    /// Resolves the embedded defaults document alone. Used as the fallback
    /// when [`TerminalSettings::load_all`] reports a fatal error.
    pub fn load_defaults() -> TerminalSettings {
        let mut arena = ProfileArena::new();
        let mut warnings = Vec::new();
        let parsed = match SettingsParser::new(&mut arena, &mut warnings)
            .parse(OriginTag::InBox, defaults::DEFAULT_SETTINGS_JSON)
        {
            Ok(parsed) => parsed,
            Err(error) => {
                log::error!("embedded defaults failed to parse: {error}");
                return Self::with_deserialization_error(error.to_string());
            }
        };

        attach_profile_defaults(&mut arena, &parsed);
        let mut globals = parsed.globals;
        globals.finalize_inheritance();
        arena.finalize_inheritance(parsed.profile_defaults);
        for &index in parsed.catalog.as_slice() {
            arena.finalize_inheritance(index);
        }

        let mut settings = TerminalSettings {
            arena,
            globals,
            profile_defaults: parsed.profile_defaults,
            all_profiles: parsed.catalog.as_slice().to_vec(),
            active_profiles: Vec::new(),
            warnings,
            load_error: None,
            deserialization_error: None,
        };
        if let Err(error) = settings.validate() {
            settings.load_error = Some(error);
        }
        settings
    }

    pub(crate) fn with_load_error(error: SettingsLoadError) -> TerminalSettings {
        let mut settings = Self::empty();
        settings.load_error = Some(error);
        settings
    }

    pub(crate) fn with_deserialization_error(message: String) -> TerminalSettings {
        let mut settings = Self::empty();
        settings.deserialization_error = Some(message);
        settings
    }

    fn empty() -> TerminalSettings {
        let mut arena = ProfileArena::new();
        let profile_defaults = arena.alloc(Profile {
            origin: OriginTag::ProfilesDefaults,
            ..Profile::default()
        });
        TerminalSettings {
            arena,
            globals: GlobalSettings::default(),
            profile_defaults,
            all_profiles: Vec::new(),
            active_profiles: Vec::new(),
            warnings: Vec::new(),
            load_error: None,
            deserialization_error: None,
        }
    }

    // ── Read-side accessors ─────────────────────────────────────────────

    /// Every resolved profile, hidden ones included, in display order.
    pub fn all_profiles(&self) -> impl Iterator<Item = &Profile> {
        self.all_profiles.iter().map(|&index| &self.arena[index])
    }

    /// The non-hidden profiles shown to the user, in display order.
    pub fn active_profiles(&self) -> impl Iterator<Item = &Profile> {
        self.active_profiles.iter().map(|&index| &self.arena[index])
    }

    /// Finds a profile by GUID.
    pub fn find_profile(&self, guid: &Uuid) -> Option<&Profile> {
        self.all_profiles
            .iter()
            .map(|&index| &self.arena[index])
            .find(|profile| profile.guid.as_ref() == Some(guid))
    }

    /// The resolved default profile, when one exists.
    pub fn default_profile(&self) -> Option<&Profile> {
        self.globals
            .effective
            .default_profile
            .and_then(|guid| self.find_profile(&guid))
    }

    /// The application-wide settings.
    pub fn global_settings(&self) -> &GlobalSettings {
        &self.globals
    }

    /// The anonymous `profiles.defaults` record.
    pub fn profile_defaults(&self) -> &Profile {
        &self.arena[self.profile_defaults]
    }

    /// Warnings accumulated during the load.
    pub fn warnings(&self) -> &[SettingsLoadWarning] {
        &self.warnings
    }

    /// The fatal error, when resolution failed.
    pub fn load_error(&self) -> Option<SettingsLoadError> {
        self.load_error
    }

    /// The formatted parse/extraction failure, when the user's document was
    /// unreadable.
    pub fn deserialization_error_message(&self) -> Option<&str> {
        self.deserialization_error.as_deref()
    }

    /// Looks up the color scheme a profile resolves to.
    pub fn color_scheme_for_profile(&self, profile: &Profile) -> Option<&crate::scheme::ColorScheme> {
        let name = profile.effective.settings.color_scheme.effective()?;
        self.globals.effective.color_schemes.get(name)
    }

    /// Resolves a string that is either a braced GUID or a profile name to
    /// the GUID of a known profile.
    pub fn profile_guid_by_name(&self, name: &str) -> Option<Uuid> {
        if name.is_empty() {
            return None;
        }
        // A braced GUID string is 38 characters; anything else cannot be
        // one, so skip straight to the name lookup.
        if name.len() == 38
            && name.starts_with('{')
            && let Some(guid) = crate::guid::parse_guid(name)
            && self.find_profile(&guid).is_some()
        {
            return Some(guid);
        }
        self.all_profiles
            .iter()
            .map(|&index| &self.arena[index])
            .find(|profile| profile.effective.name == name)
            .and_then(|profile| profile.guid)
    }

    /// Creates a new profile as a child of the defaults slot, with a unique
    /// name and a freshly minted random GUID, and publishes it.
    pub fn create_new_profile(&mut self) -> &Profile {
        let count = self.all_profiles.len() + 1;
        let mut name = format!("Profile {count}");
        for candidate_index in 0..count {
            let candidate = format!("Profile {}", count + candidate_index);
            let taken = self
                .all_profiles
                .iter()
                .any(|&index| self.arena[index].effective.name == candidate);
            if !taken {
                name = candidate;
                break;
            }
        }

        let mut profile = Profile::new(name);
        // Deterministic identity matters for generated profiles; profiles
        // created interactively get a truly unique one instead.
        profile.guid = Some(Uuid::new_v4());
        profile.parents.push(self.profile_defaults);
        let index = self.arena.alloc(profile);
        self.arena.finalize_inheritance(index);
        self.all_profiles.push(index);
        self.active_profiles.push(index);
        &self.arena[index]
    }

    // ── Persistence ─────────────────────────────────────────────────────

    /// Serializes the user-visible state: globals, the defaults slot, every
    /// non-deleted profile's declared content, and the user's schemes.
    pub fn to_json(&self) -> anyhow::Result<Value> {
        let mut json =
            serde_json::to_value(&self.globals).context("failed to serialize globals")?;
        let Value::Object(map) = &mut json else {
            anyhow::bail!("globals did not serialize to an object");
        };

        let defaults_json = serde_json::to_value(&self.arena[self.profile_defaults])
            .context("failed to serialize profiles.defaults")?;
        let list = self
            .all_profiles
            .iter()
            .filter(|&&index| !self.arena[index].deleted)
            .map(|&index| serde_json::to_value(&self.arena[index]))
            .collect::<Result<Vec<_>, _>>()
            .context("failed to serialize profiles")?;
        map.insert(
            "profiles".to_string(),
            serde_json::json!({ "defaults": defaults_json, "list": list }),
        );

        let schemes = self
            .globals
            .color_schemes
            .values()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()
            .context("failed to serialize schemes")?;
        map.insert("schemes".to_string(), Value::Array(schemes));

        Ok(json)
    }

    /// Backs up the current file, then atomically writes the serialized
    /// settings with 4-space indentation.
    pub fn write_settings_to_disk(&self, path: &Path) -> anyhow::Result<()> {
        persistence::backup_settings_file(path);
        let json = self.to_json()?;
        let text = persistence::to_pretty_json(&json)?;
        persistence::write_atomic(path, &text)
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }
}
