//! Fragment extensions: JSON snippets contributed by third-party
//! publishers, discovered in well-known directories and through the OS
//! extension catalog.
//!
//! A broken fragment file is logged and skipped; it never fails sibling
//! loads. Fragment globals are ignored except for their color schemes.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;

use crate::catalog::ParsedSettings;
use crate::error::SettingsLoadWarning;
use crate::layering::layer_candidates;
use crate::parser::SettingsParser;
use crate::persistence;
use crate::profile::{OriginTag, ProfileArena};

/// Subdirectory of an extension's public folder that holds fragment files.
pub const FRAGMENTS_SUBDIR: &str = "fragments";

/// An installed extension package advertised by the OS catalog.
#[derive(Debug, Clone)]
pub struct ExtensionPackage {
    /// Publisher namespace, matched against the disabled-sources set.
    pub family_name: String,
    /// The package's public folder; fragments live in its
    /// [`FRAGMENTS_SUBDIR`].
    pub public_folder: PathBuf,
}

/// The OS extension catalog, named by interface only. Lookups may be backed
/// by an asynchronous OS facility; [`load_fragments`] drives them behind a
/// synchronous gate.
pub trait ExtensionCatalog: Send + Sync {
    fn find_all(&self) -> anyhow::Result<Vec<ExtensionPackage>>;
}

/// The fragment roots scanned by default: the per-user settings directory
/// and the machine-wide one.
pub fn default_fragment_roots() -> Vec<PathBuf> {
    let mut roots = vec![persistence::settings_dir().join(FRAGMENTS_SUBDIR)];
    #[cfg(not(target_os = "windows"))]
    roots.push(PathBuf::from("/etc/oxterm").join(FRAGMENTS_SUBDIR));
    #[cfg(target_os = "windows")]
    if let Some(program_data) = std::env::var_os("ProgramData") {
        roots.push(PathBuf::from(program_data).join("oxterm").join(FRAGMENTS_SUBDIR));
    }
    roots
}

/// Enumerates fragment directories and the extension catalog, layering
/// every parsed fragment onto the user settings.
///
/// Directory layout: `<root>/<publisher-namespace>/*.json`. A namespace in
/// the disabled set is skipped entirely.
pub fn load_fragments(
    arena: &mut ProfileArena,
    user: &mut ParsedSettings,
    roots: &[PathBuf],
    catalog: Option<&Arc<dyn ExtensionCatalog>>,
    disabled: &HashSet<String>,
    warnings: &mut Vec<SettingsLoadWarning>,
) {
    for root in roots {
        let entries = match std::fs::read_dir(root) {
            Ok(entries) => entries,
            Err(_) => continue,
        };
        let mut publishers: Vec<PathBuf> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.is_dir())
            .collect();
        publishers.sort();

        for publisher_dir in publishers {
            let Some(source) = publisher_dir
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
            else {
                continue;
            };
            if disabled.contains(&source) {
                log::debug!("fragment namespace {source:?} is disabled; skipping");
                continue;
            }
            layer_fragment_dir(arena, user, warnings, &publisher_dir, &source);
        }
    }

    if let Some(catalog) = catalog {
        match query_extension_catalog(Arc::clone(catalog)) {
            Ok(extensions) => {
                for extension in extensions {
                    if disabled.contains(&extension.family_name) {
                        continue;
                    }
                    let path = extension.public_folder.join(FRAGMENTS_SUBDIR);
                    if path.is_dir() {
                        layer_fragment_dir(arena, user, warnings, &path, &extension.family_name);
                    }
                }
            }
            Err(e) => log::warn!("extension catalog lookup failed: {e:#}"),
        }
    }
}

/// Parses and layers every `.json` file in one publisher directory.
fn layer_fragment_dir(
    arena: &mut ProfileArena,
    user: &mut ParsedSettings,
    warnings: &mut Vec<SettingsLoadWarning>,
    dir: &Path,
    source: &str,
) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            log::warn!("cannot enumerate fragment directory {dir:?}: {e}");
            return;
        }
    };
    let mut files: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();

    for file in files {
        if let Err(e) = layer_fragment_file(arena, user, warnings, &file, source) {
            log::warn!("failed to load fragment {file:?} from {source:?}: {e:#}");
        }
    }
}

fn layer_fragment_file(
    arena: &mut ProfileArena,
    user: &mut ParsedSettings,
    warnings: &mut Vec<SettingsLoadWarning>,
    file: &Path,
    source: &str,
) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;

    let fragment = SettingsParser::new(arena, warnings)
        .parse_with_source(OriginTag::Fragment, &content, Some(source))
        .with_context(|| format!("failed to parse {}", file.display()))?;

    layer_candidates(arena, user, fragment.catalog.as_slice(), warnings);

    // Fragment globals are ignored except for their color schemes, which
    // never override a scheme the user already defined.
    for (name, scheme) in fragment.globals.color_schemes {
        user.globals.color_schemes.entry(name).or_insert(scheme);
    }
    Ok(())
}

/// Extracts the catalog result without letting the caller's thread re-enter
/// the resolver: the lookup runs on a private runtime and this thread
/// blocks until it completes.
fn query_extension_catalog(
    catalog: Arc<dyn ExtensionCatalog>,
) -> anyhow::Result<Vec<ExtensionPackage>> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .thread_name("oxterm-extension-catalog")
        .build()
        .context("failed to start the extension catalog runtime")?;

    runtime.block_on(async move {
        tokio::task::spawn_blocking(move || catalog.find_all())
            .await
            .context("extension catalog task panicked")?
    })
}
