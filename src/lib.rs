//! Settings model for the oxterm terminal emulator.
//!
//! This crate assembles the final, validated collection of terminal
//! profiles and global settings from several layered JSON sources:
//!
//! - The built-in defaults document
//! - The user's `settings.json`
//! - Dynamic profile generators (discovered shells)
//! - Third-party fragment extensions
//!
//! Each profile is the root of an ordered parent chain across those
//! origins; values resolve to the first participant in the chain that
//! declares them, with explicit `null` markers shadowing parents. The
//! resolver also persists user-visible adjustments back to disk and tracks
//! previously generated profiles so that entries the user removed stay
//! hidden.

pub mod catalog;
pub mod defaults;
pub mod error;
pub mod fragments;
pub mod generator;
pub mod globals;
pub mod guid;
pub mod keybindings;
pub mod layering;
pub mod parser;
pub mod persistence;
pub mod profile;
pub mod scheme;
pub mod setting;
pub mod settings;
pub mod state;
mod validation;

// Re-export the main types for convenience
pub use catalog::{ParsedSettings, ProfileCatalog};
pub use error::{SettingsError, SettingsLoadError, SettingsLoadWarning};
pub use fragments::{ExtensionCatalog, ExtensionPackage};
pub use generator::DynamicProfileGenerator;
pub use globals::GlobalSettings;
pub use keybindings::{Command, IterateOn, ShortcutAction};
pub use profile::{
    CloseOnExitMode, CursorShape, OriginTag, Profile, ProfileArena, ProfileIndex, ProfileSettings,
};
pub use scheme::{Color, ColorScheme};
pub use setting::Setting;
pub use settings::{SettingsLoader, TerminalSettings};
pub use state::ApplicationState;
