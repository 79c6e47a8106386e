//! Typed error and warning surface for settings resolution.
//!
//! Three severities exist: fatal errors abort the load and make the caller
//! fall back to built-in defaults, warnings accumulate on the loaded
//! settings, and silent recoveries (generator failures, broken fragment
//! files, invalid scheme objects) are only logged.

use std::fmt;
use thiserror::Error;

/// Fatal conditions detected after resolution.
///
/// These surface through [`crate::TerminalSettings::load_error`]; the
/// application is expected to discard the result and run on built-in
/// defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SettingsLoadError {
    /// No settings source contributed a single profile.
    #[error("no profiles were found in any settings source")]
    NoProfiles,

    /// Every resolved profile is hidden, leaving nothing to display.
    #[error("all profiles are hidden; at least one profile must be visible")]
    AllProfilesHidden,
}

/// Non-fatal problems found while loading; resolution continues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsLoadWarning {
    /// `defaultProfile` was unset or did not match any profile.
    MissingDefaultProfile,
    /// Two profiles shared a GUID; only the first was kept.
    DuplicateProfile,
    /// A profile referenced a color scheme that does not exist.
    UnknownColorScheme,
    /// A background image path was not a parseable URI or short symbol.
    InvalidBackgroundImage,
    /// An icon path was not a parseable URI or short symbol.
    InvalidIcon,
    /// Header warning emitted once before any key-binding warnings.
    AtLeastOneKeybindingWarning,
    /// A key binding declared more key chords than are supported.
    TooManyKeysForChord,
    /// An action was missing a required argument.
    MissingRequiredParameter,
    /// A command entry could not be parsed at all.
    FailedToParseCommandJson,
    /// A `setColorScheme` action referenced a scheme that does not exist.
    InvalidColorSchemeInCmd,
    /// The resolved settings could not be written back to disk.
    FailedToWriteToSettings,
}

impl fmt::Display for SettingsLoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SettingsLoadWarning::MissingDefaultProfile => {
                "the default profile could not be found; using the first profile instead"
            }
            SettingsLoadWarning::DuplicateProfile => {
                "a profile with the same GUID was declared more than once"
            }
            SettingsLoadWarning::UnknownColorScheme => {
                "a profile referenced a color scheme that does not exist"
            }
            SettingsLoadWarning::InvalidBackgroundImage => {
                "a background image path could not be parsed"
            }
            SettingsLoadWarning::InvalidIcon => "an icon path could not be parsed",
            SettingsLoadWarning::AtLeastOneKeybindingWarning => {
                "problems were found in the key bindings"
            }
            SettingsLoadWarning::TooManyKeysForChord => {
                "a key binding declared too many key chords"
            }
            SettingsLoadWarning::MissingRequiredParameter => {
                "an action was missing a required argument"
            }
            SettingsLoadWarning::FailedToParseCommandJson => {
                "a command entry could not be parsed"
            }
            SettingsLoadWarning::InvalidColorSchemeInCmd => {
                "a setColorScheme action referenced a scheme that does not exist"
            }
            SettingsLoadWarning::FailedToWriteToSettings => {
                "the settings file could not be written"
            }
        };
        f.write_str(text)
    }
}

/// A typed extraction failure produced while turning parsed JSON into the
/// settings model. Carries enough context to point the user at the problem.
#[derive(Debug)]
pub struct DeserializationError {
    /// The profile name or GUID (or field key) nearest the failure, if known.
    pub key: Option<String>,
    /// Human-readable description of what was expected.
    pub expected: String,
    /// Compact rendering of the offending JSON value.
    pub value: String,
    /// Byte offset of the failure in the source document, if it could be
    /// located.
    pub offset: Option<usize>,
}

/// Errors produced while loading or persisting settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The settings file could not be read or written.
    #[error("I/O error on settings file: {0}")]
    Io(#[from] std::io::Error),

    /// The document is not syntactically valid JSON.
    #[error("JSON parse error at line {line}, column {column}: {message}")]
    JsonParse {
        line: usize,
        column: usize,
        message: String,
    },

    /// The document is valid JSON but a value had the wrong shape. The
    /// message already carries line/column and key context.
    #[error("{0}")]
    TypedDeserialization(String),

    /// A fatal post-resolution condition.
    #[error(transparent)]
    Load(#[from] SettingsLoadError),
}
