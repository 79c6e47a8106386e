//! Key-binding command model and the lenient parser that accumulates
//! warnings instead of failing the load.
//!
//! The raw `actions` array from the user's file is kept verbatim for
//! round-trip serialization; this module only produces the parsed view used
//! by validation and by the application.

use serde_json::Value;

use crate::error::SettingsLoadWarning;

/// Maximum number of key chords a single binding may declare.
const MAX_KEY_CHORDS: usize = 2;

/// What an iterable command expands over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IterateOn {
    Profiles,
    ColorSchemes,
}

impl IterateOn {
    fn from_json(value: &Value) -> Option<Self> {
        match value.as_str()? {
            "profiles" => Some(IterateOn::Profiles),
            "colorSchemes" => Some(IterateOn::ColorSchemes),
            _ => None,
        }
    }
}

/// The closed set of actions a key binding can invoke.
#[derive(Debug, Clone, PartialEq)]
pub enum ShortcutAction {
    Copy,
    Paste,
    Find,
    NewTab,
    ClosePane,
    ToggleFullscreen,
    SendInput { input: String },
    SetColorScheme { scheme: String },
}

/// One entry of the `actions` array: an action plus the key chords bound to
/// it, and an optional name and iteration marker.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub name: Option<String>,
    pub action: ShortcutAction,
    pub keys: Vec<String>,
    pub iterate_on: Option<IterateOn>,
}

impl Command {
    /// Key used when merging parent command lists: the explicit name when
    /// present, otherwise the action identity.
    pub(crate) fn merge_key(&self) -> String {
        match &self.name {
            Some(name) => format!("name:{name}"),
            None => format!("action:{:?}", self.action),
        }
    }
}

/// Parses the raw `actions` array. Every malformed entry is skipped and
/// recorded as a warning; a broken binding never aborts the load.
pub fn parse_commands(raw: &[Value], warnings: &mut Vec<SettingsLoadWarning>) -> Vec<Command> {
    let mut commands = Vec::with_capacity(raw.len());
    for entry in raw {
        match parse_command(entry, warnings) {
            Some(command) => commands.push(command),
            None => log::debug!("skipping unparseable command entry"),
        }
    }
    commands
}

fn parse_command(entry: &Value, warnings: &mut Vec<SettingsLoadWarning>) -> Option<Command> {
    let object = entry.as_object().or_else(|| {
        warnings.push(SettingsLoadWarning::FailedToParseCommandJson);
        None
    })?;

    let action = parse_action(object.get("command"), warnings)?;
    let keys = parse_keys(object.get("keys"), warnings);
    let name = object
        .get("name")
        .and_then(Value::as_str)
        .map(str::to_string);
    let iterate_on = object.get("iterateOn").and_then(IterateOn::from_json);

    Some(Command {
        name,
        action,
        keys,
        iterate_on,
    })
}

fn parse_action(
    command: Option<&Value>,
    warnings: &mut Vec<SettingsLoadWarning>,
) -> Option<ShortcutAction> {
    let command = command.or_else(|| {
        warnings.push(SettingsLoadWarning::FailedToParseCommandJson);
        None
    })?;

    // A command is either a bare action string or an object with an
    // `action` member plus action-specific arguments.
    let (action_name, args) = match command {
        Value::String(name) => (name.as_str(), None),
        Value::Object(object) => {
            let Some(name) = object.get("action").and_then(Value::as_str) else {
                warnings.push(SettingsLoadWarning::FailedToParseCommandJson);
                return None;
            };
            (name, Some(object))
        }
        _ => {
            warnings.push(SettingsLoadWarning::FailedToParseCommandJson);
            return None;
        }
    };

    match action_name {
        "copy" => Some(ShortcutAction::Copy),
        "paste" => Some(ShortcutAction::Paste),
        "find" => Some(ShortcutAction::Find),
        "newTab" => Some(ShortcutAction::NewTab),
        "closePane" => Some(ShortcutAction::ClosePane),
        "toggleFullscreen" => Some(ShortcutAction::ToggleFullscreen),
        "sendInput" => {
            let input = args
                .and_then(|o| o.get("input"))
                .and_then(Value::as_str)
                .map(str::to_string);
            match input {
                Some(input) => Some(ShortcutAction::SendInput { input }),
                None => {
                    warnings.push(SettingsLoadWarning::MissingRequiredParameter);
                    None
                }
            }
        }
        "setColorScheme" => {
            let scheme = args
                .and_then(|o| o.get("colorScheme"))
                .and_then(Value::as_str)
                .map(str::to_string);
            match scheme {
                Some(scheme) => Some(ShortcutAction::SetColorScheme { scheme }),
                None => {
                    warnings.push(SettingsLoadWarning::MissingRequiredParameter);
                    None
                }
            }
        }
        _ => {
            warnings.push(SettingsLoadWarning::FailedToParseCommandJson);
            None
        }
    }
}

fn parse_keys(keys: Option<&Value>, warnings: &mut Vec<SettingsLoadWarning>) -> Vec<String> {
    let mut chords = match keys {
        None => Vec::new(),
        Some(Value::String(chord)) => vec![chord.clone()],
        Some(Value::Array(entries)) => entries
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        Some(_) => Vec::new(),
    };
    if chords.len() > MAX_KEY_CHORDS {
        warnings.push(SettingsLoadWarning::TooManyKeysForChord);
        chords.truncate(MAX_KEY_CHORDS);
    }
    chords
}
