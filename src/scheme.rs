//! Color scheme definitions and the validation gate applied during parsing.

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use serde_json::Value;

/// A color in RGB format, stored in JSON as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses a `#rrggbb` hex string.
    pub fn from_hex(text: &str) -> Option<Self> {
        let hex = text.strip_prefix('#')?;
        if hex.len() != 6 {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some(Self { r, g, b })
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Color::from_hex(&text)
            .ok_or_else(|| de::Error::custom(format!("invalid color: {text:?}")))
    }
}

/// A named terminal color scheme: foreground/background/cursor/selection
/// plus the 16 ANSI colors. Every color is optional; missing entries fall
/// back to the renderer's built-in palette.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorScheme {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreground: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor_color: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection_background: Option<Color>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub black: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub red: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub green: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yellow: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blue: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub magenta: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cyan: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub white: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bright_black: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bright_red: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bright_green: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bright_yellow: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bright_blue: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bright_magenta: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bright_cyan: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bright_white: Option<Color>,
}

/// The JSON keys of [`ColorScheme`] that hold colors.
const COLOR_KEYS: &[&str] = &[
    "foreground",
    "background",
    "cursorColor",
    "selectionBackground",
    "black",
    "red",
    "green",
    "yellow",
    "blue",
    "magenta",
    "cyan",
    "white",
    "brightBlack",
    "brightRed",
    "brightGreen",
    "brightYellow",
    "brightBlue",
    "brightMagenta",
    "brightCyan",
    "brightWhite",
];

/// Gate applied to every scheme object before it is accepted: it must be an
/// object with a non-empty string `name`, and every declared color key must
/// hold a parseable `#rrggbb` string. Invalid schemes are skipped silently
/// by the parser.
pub fn validate_scheme(value: &Value) -> bool {
    let Some(object) = value.as_object() else {
        return false;
    };
    let Some(name) = object.get("name").and_then(Value::as_str) else {
        return false;
    };
    if name.trim().is_empty() {
        return false;
    }
    COLOR_KEYS.iter().all(|key| match object.get(*key) {
        None => true,
        Some(color) => color
            .as_str()
            .is_some_and(|text| Color::from_hex(text).is_some()),
    })
}
