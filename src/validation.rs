//! Post-finalization consistency pass.
//!
//! Checks run in a fixed order: missing profiles and an all-hidden catalog
//! are fatal; everything afterwards accumulates warnings and patches the
//! effective state so the application can keep running. Declared (user)
//! values are never touched here, so the settings file round-trips
//! unchanged.

use url::Url;

use crate::error::{SettingsLoadError, SettingsLoadWarning};
use crate::keybindings::{IterateOn, ShortcutAction};
use crate::persistence::expand_home_dir;
use crate::setting::Setting;
use crate::settings::TerminalSettings;

impl TerminalSettings {
    /// Runs every check. The caller records the returned fatal error as
    /// the load error; warnings land in [`TerminalSettings::warnings`].
    pub(crate) fn validate(&mut self) -> Result<(), SettingsLoadError> {
        self.validate_profiles_exist()?;
        self.update_active_profiles()?;
        self.resolve_default_profile();
        self.validate_all_schemes_exist();
        self.validate_media_resources();
        self.validate_keybindings();
        self.validate_color_schemes_in_commands();
        Ok(())
    }

    /// Without a single profile there is nothing the application could
    /// show; the caller falls back to built-in defaults.
    fn validate_profiles_exist(&self) -> Result<(), SettingsLoadError> {
        if self.all_profiles.is_empty() {
            return Err(SettingsLoadError::NoProfiles);
        }
        Ok(())
    }

    /// Rebuilds the active list from the resolved hidden flags.
    fn update_active_profiles(&mut self) -> Result<(), SettingsLoadError> {
        self.active_profiles = self
            .all_profiles
            .iter()
            .copied()
            .filter(|&index| !self.arena[index].is_hidden())
            .collect();
        if self.active_profiles.is_empty() {
            return Err(SettingsLoadError::AllProfilesHidden);
        }
        Ok(())
    }

    /// Resolves `defaultProfile` (a GUID or a profile name) to a concrete
    /// GUID. When it is unset or matches nothing, the first profile stands
    /// in and a warning is recorded.
    fn resolve_default_profile(&mut self) {
        let raw = self.globals.effective.default_profile_raw.clone();
        let resolved = raw.as_deref().and_then(|raw| self.profile_guid_by_name(raw));
        match resolved {
            Some(guid) => self.globals.effective.default_profile = Some(guid),
            None => {
                self.warnings.push(SettingsLoadWarning::MissingDefaultProfile);
                self.globals.effective.default_profile = self
                    .all_profiles
                    .first()
                    .and_then(|&index| self.arena[index].guid);
            }
        }
    }

    /// Clears any effective color-scheme reference that names a scheme the
    /// globals do not carry.
    fn validate_all_schemes_exist(&mut self) {
        let mut found_invalid_scheme = false;
        for &index in &self.all_profiles {
            let profile = &mut self.arena[index];
            let unknown = profile
                .effective
                .settings
                .color_scheme
                .effective()
                .is_some_and(|name| !self.globals.effective.color_schemes.contains_key(name));
            if unknown {
                profile.effective.settings.color_scheme = Setting::Unset;
                found_invalid_scheme = true;
            }
        }
        if found_invalid_scheme {
            self.warnings.push(SettingsLoadWarning::UnknownColorScheme);
        }
    }

    /// Background images and icons must be a parseable URI, an absolute
    /// path, or a short symbol such as an emoji; anything else is cleared.
    fn validate_media_resources(&mut self) {
        let mut invalid_background = false;
        let mut invalid_icon = false;

        for &index in &self.all_profiles {
            let profile = &mut self.arena[index];

            let bad_background = profile
                .effective
                .settings
                .background_image
                .effective()
                .is_some_and(|path| !is_valid_media_path(path));
            if bad_background {
                profile.effective.settings.background_image = Setting::Unset;
                invalid_background = true;
            }

            let bad_icon = profile
                .effective
                .settings
                .icon
                .effective()
                .is_some_and(|path| !is_valid_media_path(path));
            if bad_icon {
                profile.effective.settings.icon = Setting::Unset;
                invalid_icon = true;
            }
        }

        if invalid_background {
            self.warnings
                .push(SettingsLoadWarning::InvalidBackgroundImage);
        }
        if invalid_icon {
            self.warnings.push(SettingsLoadWarning::InvalidIcon);
        }
    }

    /// Surfaces key-binding parse warnings behind a single header warning.
    fn validate_keybindings(&mut self) {
        if self.globals.keybinding_warnings.is_empty() {
            return;
        }
        self.warnings
            .push(SettingsLoadWarning::AtLeastOneKeybindingWarning);
        let keybinding_warnings = self.globals.keybinding_warnings.clone();
        self.warnings.extend(keybinding_warnings);
    }

    /// Every `setColorScheme` action must reference an existing scheme.
    /// Iteration-expanding commands are skipped; they expand to concrete
    /// scheme names later.
    fn validate_color_schemes_in_commands(&mut self) {
        let found_invalid_scheme = self.globals.effective.commands.iter().any(|command| {
            if command.iterate_on == Some(IterateOn::ColorSchemes) {
                return false;
            }
            match &command.action {
                ShortcutAction::SetColorScheme { scheme } => {
                    !self.globals.effective.color_schemes.contains_key(scheme)
                }
                _ => false,
            }
        });
        if found_invalid_scheme {
            self.warnings
                .push(SettingsLoadWarning::InvalidColorSchemeInCmd);
        }
    }
}

/// A media reference is acceptable when it is a short symbol (at most two
/// UTF-16 code units, covering emoji), a parseable URL, or an absolute
/// filesystem path after `~` expansion.
fn is_valid_media_path(path: &str) -> bool {
    if path.encode_utf16().count() <= 2 {
        return true;
    }
    let expanded = expand_home_dir(path);
    if Url::parse(&expanded).is_ok() {
        return true;
    }
    let path = std::path::Path::new(&expanded);
    path.is_absolute() && Url::from_file_path(path).is_ok()
}
