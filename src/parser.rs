//! Turns a JSON document into a [`ParsedSettings`] value.
//!
//! Accepts both the legacy plain-array `profiles` form and the modern
//! `{defaults, list}` object form. Invalid color schemes are skipped
//! silently; profile objects carrying neither `name`, `guid`, nor `updates`
//! are dropped so malformed empty objects cannot become ghost "Default"
//! profiles. Syntax errors and typed extraction failures are fatal and carry
//! line/column information.

use serde_json::Value;

use crate::catalog::{AppendOutcome, ParsedSettings, ProfileCatalog};
use crate::error::{DeserializationError, SettingsError, SettingsLoadWarning};
use crate::globals::GlobalSettings;
use crate::guid::synthesize_profile_guid;
use crate::keybindings::parse_commands;
use crate::profile::{OriginTag, Profile, ProfileArena};
use crate::scheme::{ColorScheme, validate_scheme};

/// Parses settings documents into a shared arena, accumulating warnings.
pub struct SettingsParser<'a> {
    arena: &'a mut ProfileArena,
    warnings: &'a mut Vec<SettingsLoadWarning>,
}

impl<'a> SettingsParser<'a> {
    pub fn new(
        arena: &'a mut ProfileArena,
        warnings: &'a mut Vec<SettingsLoadWarning>,
    ) -> Self {
        Self { arena, warnings }
    }

    /// Parses one document with the given origin tag.
    pub fn parse(
        &mut self,
        origin: OriginTag,
        content: &str,
    ) -> Result<ParsedSettings, SettingsError> {
        self.parse_with_source(origin, content, None)
    }

    /// Parses one document, stamping `source` (a generator or publisher
    /// namespace) onto every profile before identity assignment. Fragment
    /// files are parsed this way so their synthesized GUIDs are namespaced
    /// by publisher.
    pub fn parse_with_source(
        &mut self,
        origin: OriginTag,
        content: &str,
        source: Option<&str>,
    ) -> Result<ParsedSettings, SettingsError> {
        let json = parse_json(content)?;

        let globals = self.parse_globals(&json, content)?;

        let profiles_object = json_value(&json, "profiles");
        let defaults_object = profiles_object.and_then(|p| json_value(p, "defaults"));
        let list = match profiles_object {
            Some(Value::Array(entries)) => entries.as_slice(),
            Some(object) => json_value(object, "list")
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or(&[]),
            None => &[],
        };

        let profile_defaults = self.parse_profile_defaults(defaults_object, content)?;

        let mut parsed = ParsedSettings {
            globals,
            profile_defaults,
            catalog: ProfileCatalog::new(),
        };
        for entry in list {
            self.parse_profile_entry(entry, origin, source, content, &mut parsed)?;
        }
        Ok(parsed)
    }

    fn parse_globals(
        &mut self,
        json: &Value,
        content: &str,
    ) -> Result<GlobalSettings, SettingsError> {
        let mut globals: GlobalSettings =
            serde_json::from_value(json.clone()).map_err(|e| {
                rethrow_with_location(
                    DeserializationError {
                        key: None,
                        expected: e.to_string(),
                        value: "global settings object".to_string(),
                        offset: None,
                    },
                    content,
                )
            })?;

        if let Some(schemes) = json_value(json, "schemes").and_then(Value::as_array) {
            for scheme_json in schemes {
                if !validate_scheme(scheme_json) {
                    log::debug!("skipping invalid color scheme object");
                    continue;
                }
                if let Ok(scheme) = serde_json::from_value::<ColorScheme>(scheme_json.clone()) {
                    globals.color_schemes.insert(scheme.name.clone(), scheme);
                }
            }
        }

        globals.commands = parse_commands(&globals.actions, &mut globals.keybinding_warnings);
        Ok(globals)
    }

    fn parse_profile_defaults(
        &mut self,
        defaults_object: Option<&Value>,
        content: &str,
    ) -> Result<crate::profile::ProfileIndex, SettingsError> {
        let mut defaults = match defaults_object {
            Some(object) if object.is_object() => serde_json::from_value::<Profile>(
                object.clone(),
            )
            .map_err(|e| {
                rethrow_with_location(
                    DeserializationError {
                        key: Some("profiles.defaults".to_string()),
                        expected: e.to_string(),
                        value: render_compact(object),
                        offset: None,
                    },
                    content,
                )
            })?,
            _ => Profile::default(),
        };

        // A guid on the defaults slot would make it claim an identity in
        // every lookup; strip it even if present.
        defaults.guid = None;
        defaults.origin = OriginTag::ProfilesDefaults;
        Ok(self.arena.alloc(defaults))
    }

    fn parse_profile_entry(
        &mut self,
        entry: &Value,
        origin: OriginTag,
        source: Option<&str>,
        content: &str,
        parsed: &mut ParsedSettings,
    ) -> Result<(), SettingsError> {
        if !is_valid_profile_object(entry) {
            log::debug!("skipping profile object without name, guid, or updates");
            return Ok(());
        }

        let mut profile: Profile = serde_json::from_value(entry.clone()).map_err(|e| {
            let key = profile_key(entry);
            let offset = key.as_deref().and_then(|k| find_literal_offset(content, k));
            rethrow_with_location(
                DeserializationError {
                    key,
                    expected: e.to_string(),
                    value: render_compact(entry),
                    offset,
                },
                content,
            )
        })?;

        profile.origin = origin;
        if let Some(source) = source {
            profile.source = Some(source.to_string());
        }
        if profile.guid.is_none()
            && let Some(name) = profile.name.as_deref()
        {
            profile.guid = Some(synthesize_profile_guid(profile.source.as_deref(), name));
        }

        let index = self.arena.alloc(profile);
        if parsed.catalog.append(self.arena, index) == AppendOutcome::DuplicateGuid {
            self.warnings.push(SettingsLoadWarning::DuplicateProfile);
        }
        Ok(())
    }
}

/// Parses raw JSON; syntax errors are fatal and carry the position reported
/// by the JSON library.
pub fn parse_json(content: &str) -> Result<Value, SettingsError> {
    serde_json::from_str(content).map_err(|e| SettingsError::JsonParse {
        line: e.line(),
        column: e.column(),
        message: e.to_string(),
    })
}

/// Member lookup that treats non-objects as empty.
fn json_value<'v>(json: &'v Value, key: &str) -> Option<&'v Value> {
    json.as_object().and_then(|object| object.get(key))
}

/// A profile object must identify itself: by name (a GUID can be derived),
/// by an explicit guid, or as an overlay via `updates`.
fn is_valid_profile_object(value: &Value) -> bool {
    value.as_object().is_some_and(|object| {
        object.contains_key("name") || object.contains_key("guid") || object.contains_key("updates")
    })
}

fn profile_key(entry: &Value) -> Option<String> {
    entry
        .get("name")
        .or_else(|| entry.get("guid"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn render_compact(value: &Value) -> String {
    let mut text = value.to_string();
    if text.len() > 80 {
        text.truncate(77);
        text.push_str("...");
    }
    text
}

/// Finds the byte offset of a quoted string literal in the source document.
fn find_literal_offset(content: &str, literal: &str) -> Option<usize> {
    content.find(&format!("\"{literal}\""))
}

/// Computes a 1-based line and column from a byte offset by counting line
/// feeds.
pub fn line_and_column_from_position(content: &str, position: usize) -> (usize, usize) {
    let mut line = 1;
    let mut line_start = 0;
    for (index, byte) in content.bytes().enumerate() {
        if index >= position {
            break;
        }
        if byte == b'\n' {
            line += 1;
            line_start = index + 1;
        }
    }
    (line, position - line_start + 1)
}

/// Formats a typed extraction failure into the fatal, human-readable error
/// surfaced to the caller.
fn rethrow_with_location(error: DeserializationError, content: &str) -> SettingsError {
    let body = format!("  Have: {}\n  Expected: {}", error.value, error.expected);
    let message = match (error.offset, &error.key) {
        (Some(offset), Some(key)) => {
            let (line, column) = line_and_column_from_position(content, offset);
            format!("* Line {line}, Column {column} ({key})\n{body}")
        }
        (Some(offset), None) => {
            let (line, column) = line_and_column_from_position(content, offset);
            format!("* Line {line}, Column {column}\n{body}")
        }
        (None, Some(key)) => format!("* ({key})\n{body}"),
        (None, None) => body,
    };
    SettingsError::TypedDeserialization(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setting::Setting;

    fn parse_user(content: &str) -> (ProfileArena, ParsedSettings, Vec<SettingsLoadWarning>) {
        let mut arena = ProfileArena::new();
        let mut warnings = Vec::new();
        let parsed = SettingsParser::new(&mut arena, &mut warnings)
            .parse(OriginTag::User, content)
            .expect("parse");
        (arena, parsed, warnings)
    }

    #[test]
    fn test_legacy_array_form() {
        let (arena, parsed, _) = parse_user(r#"{"profiles": [{"name": "One"}, {"name": "Two"}]}"#);
        assert_eq!(parsed.catalog.len(), 2);
        let first = parsed.catalog.as_slice()[0];
        assert_eq!(arena[first].name.as_deref(), Some("One"));
        assert_eq!(arena[first].origin, OriginTag::User);
        assert!(arena[first].guid.is_some());
    }

    #[test]
    fn test_modern_object_form_with_defaults() {
        let (arena, parsed, _) = parse_user(
            r#"{
                "profiles": {
                    "defaults": {"fontFace": "Cascadia Mono", "guid": "{11111111-1111-1111-1111-111111111111}"},
                    "list": [{"name": "One"}]
                }
            }"#,
        );
        assert_eq!(parsed.catalog.len(), 1);
        let defaults = &arena[parsed.profile_defaults];
        assert_eq!(defaults.guid, None);
        assert_eq!(defaults.origin, OriginTag::ProfilesDefaults);
        assert_eq!(
            defaults.settings.font_face,
            Setting::Set("Cascadia Mono".to_string())
        );
    }

    #[test]
    fn test_ghost_profile_objects_are_dropped() {
        let (_, parsed, warnings) =
            parse_user(r#"{"profiles": [{}, {"fontFace": "X"}, {"name": "Kept"}]}"#);
        assert_eq!(parsed.catalog.len(), 1);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_duplicate_guid_warns_and_keeps_first() {
        let (arena, parsed, warnings) = parse_user(
            r#"{"profiles": [
                {"name": "First", "guid": "{22222222-2222-2222-2222-222222222222}"},
                {"name": "Second", "guid": "{22222222-2222-2222-2222-222222222222}"}
            ]}"#,
        );
        assert_eq!(parsed.catalog.len(), 1);
        assert_eq!(warnings, vec![SettingsLoadWarning::DuplicateProfile]);
        let kept = parsed.catalog.as_slice()[0];
        assert_eq!(arena[kept].name.as_deref(), Some("First"));
    }

    #[test]
    fn test_invalid_schemes_skipped_silently() {
        let (_, parsed, warnings) = parse_user(
            r##"{
                "profiles": [{"name": "One"}],
                "schemes": [
                    {"name": "Good", "background": "#101010"},
                    {"background": "#101010"},
                    {"name": "Bad", "red": "nope"},
                    "not an object"
                ]
            }"##,
        );
        assert_eq!(parsed.globals.color_schemes.len(), 1);
        assert!(parsed.globals.color_schemes.contains_key("Good"));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_syntax_error_is_fatal_with_position() {
        let mut arena = ProfileArena::new();
        let mut warnings = Vec::new();
        let error = SettingsParser::new(&mut arena, &mut warnings)
            .parse(OriginTag::User, "{\n  \"profiles\": [,]\n}")
            .unwrap_err();
        match error {
            SettingsError::JsonParse { line, .. } => assert_eq!(line, 2),
            other => panic!("expected JsonParse, got {other:?}"),
        }
    }

    #[test]
    fn test_typed_error_carries_key_and_location() {
        let mut arena = ProfileArena::new();
        let mut warnings = Vec::new();
        let content = "{\n  \"profiles\": [\n    {\"name\": \"Broken\", \"historySize\": \"lots\"}\n  ]\n}";
        let error = SettingsParser::new(&mut arena, &mut warnings)
            .parse(OriginTag::User, content)
            .unwrap_err();
        match error {
            SettingsError::TypedDeserialization(message) => {
                assert!(message.contains("Line 3"), "{message}");
                assert!(message.contains("Broken"), "{message}");
                assert!(message.contains("Expected:"), "{message}");
            }
            other => panic!("expected TypedDeserialization, got {other:?}"),
        }
    }

    #[test]
    fn test_line_and_column_from_position() {
        let text = "ab\ncd\nef";
        assert_eq!(line_and_column_from_position(text, 0), (1, 1));
        assert_eq!(line_and_column_from_position(text, 1), (1, 2));
        assert_eq!(line_and_column_from_position(text, 3), (2, 1));
        assert_eq!(line_and_column_from_position(text, 7), (3, 2));
    }

    #[test]
    fn test_fragment_source_stamped_before_identity() {
        let mut arena = ProfileArena::new();
        let mut warnings = Vec::new();
        let parsed = SettingsParser::new(&mut arena, &mut warnings)
            .parse_with_source(
                OriginTag::Fragment,
                r#"{"profiles": [{"name": "Git Bash"}]}"#,
                Some("Publisher.Git"),
            )
            .expect("parse");
        let index = parsed.catalog.as_slice()[0];
        assert_eq!(arena[index].source.as_deref(), Some("Publisher.Git"));
        assert_eq!(
            arena[index].guid,
            Some(synthesize_profile_guid(Some("Publisher.Git"), "Git Bash"))
        );
    }

    #[test]
    fn test_updates_only_fragment_entry_is_kept() {
        let mut arena = ProfileArena::new();
        let mut warnings = Vec::new();
        let parsed = SettingsParser::new(&mut arena, &mut warnings)
            .parse_with_source(
                OriginTag::Fragment,
                r#"{"profiles": [{"updates": "{33333333-3333-3333-3333-333333333333}", "fontFace": "Hack"}]}"#,
                Some("Publisher.Git"),
            )
            .expect("parse");
        assert_eq!(parsed.catalog.len(), 1);
        let index = parsed.catalog.as_slice()[0];
        assert!(arena[index].updates.is_some());
        assert!(arena[index].guid.is_none());
    }
}
