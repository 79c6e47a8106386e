//! The built-in defaults document and the template used to seed a fresh
//! user settings file.

use uuid::{Uuid, uuid};

/// GUID of the built-in Bash profile. Must match `DEFAULT_SETTINGS_JSON`.
pub const DEFAULT_BASH_GUID: Uuid = uuid!("9a0b5724-ab44-5c95-a358-6f3c0e7ed5c9");

/// GUID of the built-in PowerShell profile. Must match
/// `DEFAULT_SETTINGS_JSON`.
pub const DEFAULT_POWERSHELL_GUID: Uuid = uuid!("574e775e-4f2a-5b96-ac1e-a2962a402336");

/// The built-in defaults, used when no `defaults.json` ships beside the
/// executable. Every profile here is layered into the user's settings with
/// origin `InBox`.
pub const DEFAULT_SETTINGS_JSON: &str = r##"{
    "defaultProfile": "{9a0b5724-ab44-5c95-a358-6f3c0e7ed5c9}",
    "copyOnSelect": false,
    "initialRows": 30,
    "initialCols": 120,
    "theme": "system",
    "profiles": {
        "defaults": {},
        "list": [
            {
                "guid": "{9a0b5724-ab44-5c95-a358-6f3c0e7ed5c9}",
                "name": "Bash",
                "commandline": "bash",
                "colorScheme": "Campbell",
                "cursorShape": "bar",
                "historySize": 9001,
                "snapOnInput": true,
                "closeOnExit": "graceful",
                "padding": "8, 8, 8, 8"
            },
            {
                "guid": "{574e775e-4f2a-5b96-ac1e-a2962a402336}",
                "name": "PowerShell",
                "commandline": "pwsh",
                "colorScheme": "Campbell",
                "cursorShape": "bar",
                "historySize": 9001,
                "snapOnInput": true,
                "closeOnExit": "graceful",
                "padding": "8, 8, 8, 8"
            }
        ]
    },
    "schemes": [
        {
            "name": "Campbell",
            "foreground": "#cccccc",
            "background": "#0c0c0c",
            "cursorColor": "#ffffff",
            "selectionBackground": "#ffffff",
            "black": "#0c0c0c",
            "red": "#c50f1f",
            "green": "#13a10e",
            "yellow": "#c19c00",
            "blue": "#0037da",
            "magenta": "#881798",
            "cyan": "#3a96dd",
            "white": "#cccccc",
            "brightBlack": "#767676",
            "brightRed": "#e74856",
            "brightGreen": "#16c60c",
            "brightYellow": "#f9f1a5",
            "brightBlue": "#3b78ff",
            "brightMagenta": "#b4009e",
            "brightCyan": "#61d6d6",
            "brightWhite": "#f2f2f2"
        },
        {
            "name": "One Half Dark",
            "foreground": "#dcdfe4",
            "background": "#282c34",
            "cursorColor": "#a3b3cc",
            "selectionBackground": "#474e5d",
            "black": "#282c34",
            "red": "#e06c75",
            "green": "#98c379",
            "yellow": "#e5c07b",
            "blue": "#61afef",
            "magenta": "#c678dd",
            "cyan": "#56b6c2",
            "white": "#dcdfe4",
            "brightBlack": "#5a6374",
            "brightRed": "#e06c75",
            "brightGreen": "#98c379",
            "brightYellow": "#e5c07b",
            "brightBlue": "#61afef",
            "brightMagenta": "#c678dd",
            "brightCyan": "#56b6c2",
            "brightWhite": "#dcdfe4"
        }
    ],
    "actions": [
        { "command": "copy", "keys": "ctrl+shift+c" },
        { "command": "paste", "keys": "ctrl+shift+v" },
        { "command": "find", "keys": "ctrl+shift+f" },
        { "command": "newTab", "keys": "ctrl+shift+t" },
        { "command": "closePane", "keys": "ctrl+shift+w" },
        { "command": "toggleFullscreen", "keys": "f11" }
    ]
}
"##;

/// Starting content for a settings file that does not exist yet. The blanks
/// (notably `defaultProfile`) are filled in during the first load before
/// the file is written.
pub const USER_SETTINGS_TEMPLATE: &str = r#"{
    "profiles": {
        "defaults": {},
        "list": []
    },
    "schemes": [],
    "actions": []
}
"#;
