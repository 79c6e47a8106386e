//! Dynamic profile generators and the runner that invokes them.
//!
//! Generators are a closed set of variants rather than trait objects; the
//! `Custom` variant carries a plain function pointer so tests can substitute
//! arbitrary namespaces and outputs. A faulty generator is logged and
//! skipped — it must never abort loading.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::catalog::ParsedSettings;
use crate::error::SettingsLoadWarning;
use crate::guid::synthesize_profile_guid;
use crate::layering::layer_candidates;
use crate::profile::{OriginTag, Profile, ProfileArena};
use crate::setting::Setting;

/// Display name of the profile emitted by the PowerShell generator; a fresh
/// settings file prefers this profile as its default.
pub const PREFERRED_POWERSHELL_PROFILE_NAME: &str = "PowerShell";

/// Signature of a `Custom` generator body.
pub type GenerateFn = fn(&mut Vec<Profile>) -> anyhow::Result<()>;

/// The closed set of dynamic profile generators.
#[derive(Debug, Clone)]
pub enum DynamicProfileGenerator {
    /// Discovers a PowerShell Core installation on the PATH.
    PowershellCore,
    /// Enumerates installed WSL distributions (Windows only).
    WslDistro,
    /// Offers an Azure Cloud Shell profile when the Azure CLI is installed.
    AzureCloudShell,
    /// An arbitrary namespace and generation function, for tests.
    Custom {
        namespace: String,
        generate: GenerateFn,
    },
}

impl DynamicProfileGenerator {
    /// The namespace used for the disabled-sources match and stamped onto
    /// every emitted profile as `source`.
    pub fn namespace(&self) -> &str {
        match self {
            DynamicProfileGenerator::PowershellCore => "Oxterm.PowershellCore",
            DynamicProfileGenerator::WslDistro => "Oxterm.Wsl",
            DynamicProfileGenerator::AzureCloudShell => "Oxterm.Azure",
            DynamicProfileGenerator::Custom { namespace, .. } => namespace,
        }
    }

    /// Appends candidate profiles to `out`.
    pub fn generate(&self, out: &mut Vec<Profile>) -> anyhow::Result<()> {
        match self {
            DynamicProfileGenerator::PowershellCore => generate_powershell(out),
            DynamicProfileGenerator::WslDistro => generate_wsl(out),
            DynamicProfileGenerator::AzureCloudShell => generate_azure(out),
            DynamicProfileGenerator::Custom { generate, .. } => generate(out),
        }
    }

    /// The generators registered by default, in invocation order.
    pub fn default_set() -> Vec<DynamicProfileGenerator> {
        vec![
            DynamicProfileGenerator::PowershellCore,
            DynamicProfileGenerator::WslDistro,
            DynamicProfileGenerator::AzureCloudShell,
        ]
    }
}

/// Invokes each generator in registration order and layers its output onto
/// the user settings. Disabled namespaces are skipped entirely; generator
/// errors are logged with the namespace and discarded.
///
/// Candidates are stamped with `origin = Generated` and their generator's
/// namespace; a candidate without a GUID gets a deterministic v5 GUID
/// synthesized from `(namespace, name)` on the generator's behalf.
pub fn run_generators(
    arena: &mut ProfileArena,
    generators: &[DynamicProfileGenerator],
    disabled: &HashSet<String>,
    user: &mut ParsedSettings,
    warnings: &mut Vec<SettingsLoadWarning>,
) {
    for generator in generators {
        let namespace = generator.namespace();
        if disabled.contains(namespace) {
            log::debug!("dynamic profile namespace {namespace:?} is disabled; skipping");
            continue;
        }

        let mut candidates = Vec::new();
        if let Err(e) = generator.generate(&mut candidates) {
            log::warn!("dynamic profile generator {namespace:?} failed: {e:#}");
            continue;
        }

        let mut indices = Vec::with_capacity(candidates.len());
        for mut profile in candidates {
            profile.origin = OriginTag::Generated;
            profile.source = Some(namespace.to_string());
            if profile.guid.is_none() {
                match profile.name.as_deref() {
                    Some(name) => {
                        profile.guid = Some(synthesize_profile_guid(Some(namespace), name));
                    }
                    None => {
                        log::warn!(
                            "generator {namespace:?} emitted a profile without name or guid; skipping it"
                        );
                        continue;
                    }
                }
            }
            indices.push(arena.alloc(profile));
        }
        layer_candidates(arena, user, &indices, warnings);
    }
}

// ── Built-in generators ─────────────────────────────────────────────────

fn generate_powershell(out: &mut Vec<Profile>) -> anyhow::Result<()> {
    let executable = if cfg!(windows) { "pwsh.exe" } else { "pwsh" };
    let Some(path) = find_in_path(executable) else {
        return Ok(());
    };

    let mut profile = Profile::new(PREFERRED_POWERSHELL_PROFILE_NAME);
    profile.settings.commandline = Setting::Set(path.to_string_lossy().to_string());
    profile.settings.starting_directory = Setting::Set("~".to_string());
    out.push(profile);
    Ok(())
}

fn generate_wsl(out: &mut Vec<Profile>) -> anyhow::Result<()> {
    if !cfg!(windows) {
        return Ok(());
    }
    // Each share under \\wsl$\ is an installed distribution.
    let root = Path::new(r"\\wsl$\");
    let Ok(entries) = std::fs::read_dir(root) else {
        return Ok(());
    };
    for entry in entries.flatten() {
        let distro = entry.file_name().to_string_lossy().to_string();
        if distro.is_empty() {
            continue;
        }
        let mut profile = Profile::new(&distro);
        profile.settings.commandline = Setting::Set(format!("wsl.exe -d {distro}"));
        profile.settings.starting_directory = Setting::Set("~".to_string());
        out.push(profile);
    }
    Ok(())
}

fn generate_azure(out: &mut Vec<Profile>) -> anyhow::Result<()> {
    let executable = if cfg!(windows) { "az.cmd" } else { "az" };
    if find_in_path(executable).is_none() {
        return Ok(());
    }

    let mut profile = Profile::new("Azure Cloud Shell");
    profile.settings.commandline = Setting::Set(format!("{executable} interactive"));
    out.push(profile);
    Ok(())
}

/// Walks PATH for an executable. The environment PATH may be incomplete when
/// the application is launched from a desktop shell, so callers should treat
/// a miss as "not installed" rather than an error.
fn find_in_path(executable: &str) -> Option<PathBuf> {
    let path_env = std::env::var_os("PATH")?;
    for dir in std::env::split_paths(&path_env) {
        let candidate = dir.join(executable);
        if candidate.is_file() {
            return Some(candidate);
        }
    }
    None
}
