//! The core merge engine: attaches candidate profiles from other origins to
//! the user-visible catalog.
//!
//! A candidate either overlays an existing profile (fragment `updates`),
//! layers underneath an existing profile with the same GUID, or is
//! published as a reproduction — a new user-side record whose sole parent
//! is the immutable candidate.

use crate::catalog::{AppendOutcome, ParsedSettings};
use crate::error::SettingsLoadWarning;
use crate::profile::{Profile, ProfileArena, ProfileIndex};

/// Merges a batch of candidates into the user settings, in order.
///
/// Rules, per candidate:
/// 1. `updates` names an existing profile: the candidate is *prepended* as
///    a parent of that profile. Prepending puts the overlay ahead of the
///    candidate's other parents in lookup order while the target's own
///    declared values still win. The candidate is not made visible.
/// 2. The candidate's GUID already exists: the candidate is *appended* as a
///    parent of the existing entry, supplying fallback values only.
/// 3. Otherwise: a reproduction of the candidate is appended to the
///    catalog, so later user edits layer into the reproduction instead of
///    mutating the candidate record.
pub fn layer_candidates(
    arena: &mut ProfileArena,
    user: &mut ParsedSettings,
    candidates: &[ProfileIndex],
    warnings: &mut Vec<SettingsLoadWarning>,
) {
    for &candidate in candidates {
        let (updates, guid) = {
            let profile = &arena[candidate];
            (profile.updates, profile.guid)
        };

        if let Some(target_guid) = updates {
            match user.catalog.find(&target_guid) {
                Some(target) => arena[target].parents.insert(0, candidate),
                None => log::debug!(
                    "fragment overlay targets unknown profile {target_guid}; ignoring it"
                ),
            }
            continue;
        }

        if let Some(guid) = guid
            && let Some(existing) = user.catalog.find(&guid)
        {
            arena[existing].parents.push(candidate);
            continue;
        }

        let mut reproduction = Profile::reproduce_from(&arena[candidate]);
        reproduction.parents.push(candidate);
        let index = arena.alloc(reproduction);
        if user.catalog.append(arena, index) == AppendOutcome::DuplicateGuid {
            warnings.push(SettingsLoadWarning::DuplicateProfile);
        }
    }
}

/// Attaches the `profiles.defaults` record as the front-most parent of
/// every user-visible profile, so defaults apply everywhere but yield to
/// each profile's own declared values.
pub fn attach_profile_defaults(arena: &mut ProfileArena, user: &ParsedSettings) {
    let defaults = user.profile_defaults;
    for &profile in user.catalog.as_slice() {
        arena[profile].parents.insert(0, defaults);
    }
}
