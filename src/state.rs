//! Sidecar application state: the GUIDs of every generated profile this
//! installation has ever shown.
//!
//! The set is loaded before resolution and rewritten only when it grew.
//! Membership is what lets a removed generated profile stay hidden: if a
//! generator re-emits a GUID the user has already seen, and the user's file
//! no longer declares it, the entry is re-hidden instead of reappearing.

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::persistence::write_atomic;

/// Persistent per-installation state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationState {
    /// Every generated-profile GUID ever emitted on this installation.
    #[serde(default, with = "crate::guid::serde_braced_set")]
    pub generated_profiles: BTreeSet<Uuid>,

    #[serde(skip)]
    dirty: bool,
}

impl ApplicationState {
    /// Loads the state file, treating a missing or unreadable file as an
    /// empty state. A corrupt state file only costs the user one round of
    /// re-shown generated profiles, so it is not worth failing the load.
    pub fn load(path: &Path) -> ApplicationState {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Self::default(),
            Err(e) => {
                log::warn!("failed to read state file {path:?}: {e}");
                return Self::default();
            }
        };
        match serde_json::from_str(&content) {
            Ok(state) => state,
            Err(e) => {
                log::warn!("failed to parse state file {path:?}: {e}");
                Self::default()
            }
        }
    }

    /// Records a generated profile. Returns true when the GUID is new to
    /// this installation, marking the state dirty.
    pub fn note_generated(&mut self, guid: Uuid) -> bool {
        let inserted = self.generated_profiles.insert(guid);
        if inserted {
            self.dirty = true;
        }
        inserted
    }

    /// True when the set grew since it was loaded.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Writes the state file atomically.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)
            .context("failed to serialize application state")?;
        write_atomic(path, &json)
            .with_context(|| format!("failed to write state file {}", path.display()))?;
        Ok(())
    }
}
