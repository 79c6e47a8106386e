//! Write-side tests: what the persister serializes, what it withholds, and
//! how the file is protected on disk.

mod common;

use common::{TestContext, test_generator};
use oxterm_settings::Profile;

fn emit_generated_shell(out: &mut Vec<Profile>) -> anyhow::Result<()> {
    out.push(Profile::new("Generated X"));
    Ok(())
}

#[test]
fn test_serialized_form_uses_modern_profiles_object() {
    let context = TestContext::new();
    context.write_settings(r#"{"profiles": [{"name": "Mine", "fontFace": "Hack"}]}"#);

    let settings = context.loader().load();
    let json = settings.to_json().expect("serialize");

    assert!(json["profiles"]["defaults"].is_object());
    let list = json["profiles"]["list"].as_array().expect("list");
    assert!(
        list.iter()
            .any(|entry| entry["name"] == "Mine" && entry["fontFace"] == "Hack")
    );
}

#[test]
fn test_serialization_withholds_inherited_and_runtime_values() {
    let context = TestContext::new();
    context.write_settings(r#"{"profiles": [{"name": "Mine"}]}"#);

    let settings = context.loader().load();
    let json = settings.to_json().expect("serialize");
    let list = json["profiles"]["list"].as_array().expect("list");
    let mine = list
        .iter()
        .find(|entry| entry["name"] == "Mine")
        .expect("Mine serialized");

    // "Mine" resolves a cursor shape through profiles.defaults, but only
    // declared content may be written back.
    assert!(mine.get("cursorShape").is_none());
    assert!(mine.get("origin").is_none());
    assert!(mine.get("parents").is_none());
    assert!(mine["guid"].is_string());
}

#[test]
fn test_cleared_marker_roundtrips_as_null() {
    let context = TestContext::new();
    context.write_settings(r#"{"profiles": [{"name": "Mine", "colorScheme": null}]}"#);

    let settings = context.loader().load();
    let json = settings.to_json().expect("serialize");
    let list = json["profiles"]["list"].as_array().expect("list");
    let mine = list
        .iter()
        .find(|entry| entry["name"] == "Mine")
        .expect("Mine serialized");
    assert!(mine["colorScheme"].is_null());
}

#[test]
fn test_deleted_profiles_are_not_serialized() {
    let context = TestContext::new();
    let generators = vec![test_generator("Test.Gen", emit_generated_shell)];

    context.write_settings(r#"{"profiles": [{"name": "Mine"}]}"#);
    context.loader().with_generators(generators.clone()).load();

    // Remove the generated entry, then resolve again: the record comes back
    // deleted and must stay out of the serialized form.
    context.write_settings(r#"{"profiles": [{"name": "Mine"}]}"#);
    let settings = context.loader().with_generators(generators).load();
    assert!(
        settings
            .all_profiles()
            .any(|profile| profile.effective.name == "Generated X" && profile.deleted)
    );

    let json = settings.to_json().expect("serialize");
    let list = json["profiles"]["list"].as_array().expect("list");
    assert!(list.iter().all(|entry| entry["name"] != "Generated X"));
}

#[test]
fn test_user_schemes_roundtrip_but_builtin_schemes_do_not_leak() {
    let context = TestContext::new();
    context.write_settings(
        r##"{
            "profiles": [{"name": "Mine"}],
            "schemes": [{"name": "My Scheme", "background": "#123456"}]
        }"##,
    );

    let settings = context.loader().load();
    let json = settings.to_json().expect("serialize");
    let schemes = json["schemes"].as_array().expect("schemes");

    assert!(schemes.iter().any(|scheme| scheme["name"] == "My Scheme"));
    // "Campbell" comes from the built-in layer; it is visible to profiles
    // but is not user-declared content.
    assert!(schemes.iter().all(|scheme| scheme["name"] != "Campbell"));
    assert!(
        settings
            .global_settings()
            .effective
            .color_schemes
            .contains_key("Campbell")
    );
}

#[test]
fn test_write_back_creates_timestamped_backup() {
    let context = TestContext::new();
    context.write_settings(r#"{"profiles": [{"name": "Mine"}]}"#);

    let settings = context.loader().load();
    settings
        .write_settings_to_disk(&context.settings_path())
        .expect("write settings");

    let parent = context.settings_path().parent().unwrap().to_path_buf();
    let backups: Vec<_> = std::fs::read_dir(parent)
        .unwrap()
        .flatten()
        .map(|entry| entry.file_name().to_string_lossy().to_string())
        .filter(|name| name.starts_with("settings.json.") && name.ends_with(".backup"))
        .collect();
    assert_eq!(backups.len(), 1);
}

#[test]
fn test_written_file_uses_four_space_indent_and_parses_back() {
    let context = TestContext::new();
    context.write_settings(r#"{"profiles": [{"name": "Mine"}]}"#);

    let settings = context.loader().load();
    settings
        .write_settings_to_disk(&context.settings_path())
        .expect("write settings");

    let written = context.read_settings();
    assert!(written.contains("\n    \"profiles\""));

    // A rewritten file must load cleanly.
    let reloaded = context.loader().load();
    assert_eq!(reloaded.load_error(), None);
    assert!(reloaded.deserialization_error_message().is_none());
    assert!(
        reloaded
            .all_profiles()
            .any(|profile| profile.effective.name == "Mine")
    );
}
