//! Tri-state setting values used throughout the profile model.
//!
//! Every inheritable setting is `Unset`, `Cleared`, or `Set(value)`. The
//! distinction between `Unset` and `Cleared` is what makes layered lookup
//! work: an unset field defers to the parent chain, while a cleared field
//! (JSON `null`) shadows every parent and resolves to "no value".

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A single inheritable setting slot.
///
/// JSON mapping: an absent key is `Unset`, an explicit `null` is `Cleared`,
/// and any other value is `Set`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Setting<T> {
    /// The key was not declared; lookup continues along the parent chain.
    #[default]
    Unset,
    /// The key was declared as `null`; lookup stops with no value.
    Cleared,
    /// The key was declared with a concrete value.
    Set(T),
}

impl<T> Setting<T> {
    /// Returns true if the setting was not declared at all.
    pub fn is_unset(&self) -> bool {
        matches!(self, Setting::Unset)
    }

    /// Returns true if the setting was explicitly cleared.
    pub fn is_cleared(&self) -> bool {
        matches!(self, Setting::Cleared)
    }

    /// Returns true if the setting holds a concrete value.
    pub fn is_set(&self) -> bool {
        matches!(self, Setting::Set(_))
    }

    /// The concrete value, if one was declared.
    pub fn value(&self) -> Option<&T> {
        match self {
            Setting::Set(v) => Some(v),
            _ => None,
        }
    }

    /// The effective value after resolution: `Set` yields the value,
    /// `Unset` and `Cleared` both yield nothing.
    pub fn effective(&self) -> Option<&T> {
        self.value()
    }

    /// Converts into an `Option`, discarding the unset/cleared distinction.
    pub fn into_option(self) -> Option<T> {
        match self {
            Setting::Set(v) => Some(v),
            _ => None,
        }
    }
}

impl<T: Clone> Setting<T> {
    /// Adopts the parent's state if this slot is still undeclared.
    ///
    /// A `Cleared` parent is adopted as `Cleared`, so an explicit null in
    /// the middle of a chain keeps shadowing everything behind it.
    pub fn layer(&mut self, parent: &Setting<T>) {
        if self.is_unset() {
            *self = parent.clone();
        }
    }

    /// Collapses `Cleared` to `Unset`, producing the observable effective
    /// state once a chain walk has finished.
    pub fn normalized(&self) -> Setting<T> {
        match self {
            Setting::Cleared => Setting::Unset,
            other => other.clone(),
        }
    }
}

impl<T> From<Option<T>> for Setting<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Setting::Set(v),
            None => Setting::Cleared,
        }
    }
}

impl<T: Serialize> Serialize for Setting<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Setting::Set(v) => v.serialize(serializer),
            // `Unset` fields are skipped by the containing struct; anything
            // that still reaches here serializes as null.
            _ => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Setting<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Option::<T>::deserialize(deserializer)?.into())
    }
}
