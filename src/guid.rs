//! Profile identity: braced GUID formatting and deterministic v5 synthesis.
//!
//! Settings files use the braced `{xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx}`
//! form. Profiles that declare a `guid` keep it verbatim; profiles that only
//! declare a `name` get a namespaced UUID v5 so the same generated profile
//! reappears with the same identity on every run.

use uuid::{Uuid, uuid};

/// Root namespace for all GUIDs minted by this application.
pub const APP_NAMESPACE: Uuid = uuid!("7c63a3a4-8f08-4a8b-b2a4-16e52f43aa81");

/// Namespace for user-declared profiles that carry a name but no `guid` and
/// no `source`.
pub const USER_NAMESPACE: Uuid = uuid!("c1b5aefd-dd2a-4e3f-8a14-7b1c0e39a7d5");

/// Deterministically derives a profile GUID from its generator or publisher
/// namespace and its display name.
///
/// The same `(source, name)` pair always produces the same GUID, which is
/// the cornerstone of re-hiding generated profiles the user has removed
/// from their settings file.
pub fn synthesize_profile_guid(source: Option<&str>, name: &str) -> Uuid {
    let namespace = match source {
        Some(ns) => Uuid::new_v5(&APP_NAMESPACE, ns.as_bytes()),
        None => USER_NAMESPACE,
    };
    Uuid::new_v5(&namespace, name.as_bytes())
}

/// Formats a GUID in the braced form used by settings files.
pub fn format_braced(guid: &Uuid) -> String {
    guid.braced().to_string()
}

/// Parses a GUID from braced, hyphenated, or simple form.
pub fn parse_guid(text: &str) -> Option<Uuid> {
    Uuid::parse_str(text.trim()).ok()
}

/// Serde adapter for `Option<Uuid>` fields stored in braced form.
pub mod serde_braced_option {
    use serde::{Deserialize, Deserializer, Serializer, de};
    use uuid::Uuid;

    pub fn serialize<S: Serializer>(
        value: &Option<Uuid>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(guid) => serializer.serialize_str(&super::format_braced(guid)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Uuid>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(text) => super::parse_guid(&text)
                .map(Some)
                .ok_or_else(|| de::Error::custom(format!("invalid GUID: {text:?}"))),
        }
    }
}

/// Serde adapter for GUID sets stored as arrays of braced strings.
pub mod serde_braced_set {
    use serde::{Deserialize, Deserializer, Serializer, de};
    use std::collections::BTreeSet;
    use uuid::Uuid;

    pub fn serialize<S: Serializer>(
        value: &BTreeSet<Uuid>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(value.iter().map(super::format_braced))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeSet<Uuid>, D::Error> {
        let entries = Vec::<String>::deserialize(deserializer)?;
        entries
            .iter()
            .map(|text| {
                super::parse_guid(text)
                    .ok_or_else(|| de::Error::custom(format!("invalid GUID: {text:?}")))
            })
            .collect()
    }
}
