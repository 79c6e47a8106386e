//! Shared integration test helpers.
//!
//! Provides a [`TestContext`] that isolates every test in its own temp
//! directory (settings file, sidecar state, fragment root) and a compact
//! defaults document so assertions stay readable.
//!
//! Note: Rust integration tests use `mod common;` (not `use`) to bring in
//! helpers from `tests/common/mod.rs`. The `#[allow(dead_code)]` attribute
//! suppresses warnings when only a subset of helpers are used per file.

#![allow(dead_code)]

use std::path::PathBuf;

use oxterm_settings::{DynamicProfileGenerator, Profile, SettingsLoader};
use tempfile::TempDir;

/// A compact built-in layer: one visible profile, one scheme, one action,
/// and a `profiles.defaults` slot that sets `cursorShape` for everyone.
pub const TEST_DEFAULTS: &str = r##"{
    "defaultProfile": "{aaaaaaaa-aaaa-aaaa-aaaa-aaaaaaaaaaaa}",
    "initialRows": 30,
    "initialCols": 120,
    "profiles": {
        "defaults": { "cursorShape": "bar", "historySize": 9001 },
        "list": [
            {
                "guid": "{aaaaaaaa-aaaa-aaaa-aaaa-aaaaaaaaaaaa}",
                "name": "Base",
                "commandline": "bash",
                "colorScheme": "Campbell"
            }
        ]
    },
    "schemes": [
        { "name": "Campbell", "foreground": "#cccccc", "background": "#0c0c0c" }
    ],
    "actions": [
        { "command": "copy", "keys": "ctrl+shift+c" }
    ]
}
"##;

/// A built-in layer with no profiles at all, for the fatal-error scenarios.
pub const EMPTY_DEFAULTS: &str = r#"{
    "profiles": { "defaults": {}, "list": [] },
    "schemes": [],
    "actions": []
}
"#;

pub struct TestContext {
    temp: TempDir,
}

impl TestContext {
    pub fn new() -> Self {
        Self {
            temp: TempDir::new().expect("failed to create temp dir"),
        }
    }

    pub fn settings_path(&self) -> PathBuf {
        self.temp.path().join("settings.json")
    }

    pub fn state_path(&self) -> PathBuf {
        self.temp.path().join("state.json")
    }

    pub fn fragments_root(&self) -> PathBuf {
        self.temp.path().join("fragments")
    }

    pub fn write_settings(&self, content: &str) {
        std::fs::write(self.settings_path(), content).expect("failed to write settings file");
    }

    pub fn read_settings(&self) -> String {
        std::fs::read_to_string(self.settings_path()).expect("failed to read settings file")
    }

    pub fn write_fragment(&self, publisher: &str, file: &str, content: &str) {
        let dir = self.fragments_root().join(publisher);
        std::fs::create_dir_all(&dir).expect("failed to create fragment dir");
        std::fs::write(dir.join(file), content).expect("failed to write fragment file");
    }

    /// A loader isolated to this context: compact defaults, no generators,
    /// no extension catalog. Tests stack generators on top as needed.
    pub fn loader(&self) -> SettingsLoader {
        SettingsLoader::new()
            .with_settings_path(self.settings_path())
            .with_state_path(self.state_path())
            .with_defaults_json(TEST_DEFAULTS)
            .with_fragment_roots(vec![self.fragments_root()])
            .with_generators(Vec::new())
    }
}

/// Wraps a plain function into a `Custom` generator under the given
/// namespace.
pub fn test_generator(
    namespace: &str,
    generate: fn(&mut Vec<Profile>) -> anyhow::Result<()>,
) -> DynamicProfileGenerator {
    DynamicProfileGenerator::Custom {
        namespace: namespace.to_string(),
        generate,
    }
}
