//! End-to-end validator coverage: media resources, key-binding warnings,
//! command scheme references, and the final ordering guarantee.

mod common;

use common::{TestContext, test_generator};
use oxterm_settings::{Profile, SettingsLoadWarning};

fn emit_generated_shell(out: &mut Vec<Profile>) -> anyhow::Result<()> {
    out.push(Profile::new("Generated X"));
    Ok(())
}

#[test]
fn test_invalid_media_paths_cleared_with_warnings() {
    let context = TestContext::new();
    context.write_settings(
        r#"{"profiles": [
            {"name": "A", "backgroundImage": "not a uri at all", "icon": "relative/icon.png"},
            {"name": "B", "backgroundImage": "/opt/bg.png", "icon": "🦀"}
        ]}"#,
    );

    let settings = context.loader().load();
    let warnings = settings.warnings();
    assert!(warnings.contains(&SettingsLoadWarning::InvalidBackgroundImage));
    assert!(warnings.contains(&SettingsLoadWarning::InvalidIcon));

    let a = settings
        .all_profiles()
        .find(|profile| profile.effective.name == "A")
        .unwrap();
    assert_eq!(a.effective.settings.background_image.effective(), None);
    assert_eq!(a.effective.settings.icon.effective(), None);

    let b = settings
        .all_profiles()
        .find(|profile| profile.effective.name == "B")
        .unwrap();
    assert_eq!(
        b.effective.settings.background_image.effective(),
        Some(&"/opt/bg.png".to_string())
    );
    assert_eq!(b.effective.settings.icon.effective(), Some(&"🦀".to_string()));
}

#[test]
fn test_keybinding_warnings_surface_behind_header() {
    let context = TestContext::new();
    context.write_settings(
        r#"{
            "profiles": [{"name": "Mine"}],
            "actions": [
                { "command": {"action": "sendInput"}, "keys": "ctrl+k" },
                { "command": "paste", "keys": "ctrl+shift+v" }
            ]
        }"#,
    );

    let settings = context.loader().load();
    let warnings = settings.warnings();
    let header_position = warnings
        .iter()
        .position(|w| *w == SettingsLoadWarning::AtLeastOneKeybindingWarning)
        .expect("header warning present");
    let detail_position = warnings
        .iter()
        .position(|w| *w == SettingsLoadWarning::MissingRequiredParameter)
        .expect("detail warning present");
    assert!(header_position < detail_position);
}

#[test]
fn test_well_formed_keybindings_produce_no_warnings() {
    let context = TestContext::new();
    context.write_settings(
        r#"{
            "profiles": [{"name": "Mine"}],
            "actions": [
                { "command": {"action": "setColorScheme", "colorScheme": "Campbell"}, "keys": "ctrl+1" }
            ]
        }"#,
    );

    let settings = context.loader().load();
    assert!(settings.warnings().is_empty());
}

#[test]
fn test_set_color_scheme_command_with_unknown_scheme_warns() {
    let context = TestContext::new();
    context.write_settings(
        r#"{
            "profiles": [{"name": "Mine"}],
            "actions": [
                { "command": {"action": "setColorScheme", "colorScheme": "Nope"}, "keys": "ctrl+1" }
            ]
        }"#,
    );

    let settings = context.loader().load();
    assert!(
        settings
            .warnings()
            .contains(&SettingsLoadWarning::InvalidColorSchemeInCmd)
    );
}

#[test]
fn test_iteration_expanding_commands_are_not_checked() {
    let context = TestContext::new();
    context.write_settings(
        r#"{
            "profiles": [{"name": "Mine"}],
            "actions": [
                {
                    "command": {"action": "setColorScheme", "colorScheme": "${scheme.name}"},
                    "iterateOn": "colorSchemes"
                }
            ]
        }"#,
    );

    let settings = context.loader().load();
    assert!(
        !settings
            .warnings()
            .contains(&SettingsLoadWarning::InvalidColorSchemeInCmd)
    );
}

#[test]
fn test_final_order_is_user_then_generated_then_fragment() {
    let context = TestContext::new();
    context.write_settings(r#"{"profiles": [{"name": "Mine"}]}"#);
    context.write_fragment(
        "Publisher.Git",
        "git.json",
        r#"{"profiles": [{"name": "Git Bash"}]}"#,
    );

    let settings = context
        .loader()
        .with_generators(vec![test_generator("Test.Gen", emit_generated_shell)])
        .load();

    let names: Vec<String> = settings
        .all_profiles()
        .map(|profile| profile.effective.name.clone())
        .collect();
    // User-declared first, then the built-in layer's reproduction, then
    // generator output, then fragment output.
    assert_eq!(names, vec!["Mine", "Base", "Generated X", "Git Bash"]);
}
