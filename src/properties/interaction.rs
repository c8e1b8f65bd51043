//! Property interactions: how a pass relates to one program property.

use rustc_hash::{FxHashMap, FxHashSet};

/// The name of a program property.
///
/// Property names are opaque strings; the registry is the single source of
/// truth for which names are enabled, initial, and final in a given run.
pub type PropertyName = String;

/// A pass's declared relationship to one property.
///
/// The three booleans are independent; *destroys* is the derived fourth
/// state `!establishes && !preserves`. The default interaction — used for
/// every property a pass does not mention — is "no opinion, preserves".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyInteraction {
    /// The pass guarantees the property holds on exit.
    pub establishes: bool,
    /// The pass needs the property to hold on entry.
    pub requires: bool,
    /// The pass keeps the property intact across its run.
    pub preserves: bool,
}

impl Default for PropertyInteraction {
    fn default() -> Self {
        Self {
            establishes: false,
            requires: false,
            preserves: true,
        }
    }
}

impl PropertyInteraction {
    /// Creates an interaction from its three components.
    #[must_use]
    pub fn new(establishes: bool, requires: bool, preserves: bool) -> Self {
        Self {
            establishes,
            requires,
            preserves,
        }
    }

    /// An interaction that establishes the property.
    #[must_use]
    pub fn establishes() -> Self {
        Self::new(true, false, false)
    }

    /// An interaction that requires and preserves the property.
    #[must_use]
    pub fn requires() -> Self {
        Self::new(false, true, true)
    }

    /// An interaction that destroys the property.
    #[must_use]
    pub fn destroys() -> Self {
        Self::new(false, false, false)
    }

    /// Returns true if the pass destroys the property.
    #[must_use]
    pub fn is_destructive(&self) -> bool {
        !self.establishes && !self.preserves
    }

    /// Returns false for the self-contradictory declaration
    /// `requires && establishes && !preserves`.
    ///
    /// Such a declaration asks for the property, guarantees it on exit, yet
    /// claims not to preserve it. It is rejected when pass declarations are
    /// loaded.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !(self.requires && self.establishes && !self.preserves)
    }
}

/// A pass's declared interactions, keyed by property name.
///
/// The map is sparse: absent keys default to
/// [`PropertyInteraction::default`] (preserve, no opinion). The verifier
/// never depends on the iteration order of this map — ordered traversal is
/// over passes, not properties.
pub type PassInteractions = FxHashMap<PropertyName, PropertyInteraction>;

/// The properties an interaction record requires on entry.
#[must_use]
pub fn get_required(interactions: &PassInteractions) -> FxHashSet<PropertyName> {
    interactions
        .iter()
        .filter(|(_, i)| i.requires)
        .map(|(name, _)| name.clone())
        .collect()
}

/// Applies an interaction record to a set of established properties.
///
/// The result is `(established ∩ preserved) ∪ newly-established`, where
/// `preserved` includes every property absent from the record.
#[must_use]
pub fn apply(
    established: FxHashSet<PropertyName>,
    interactions: &PassInteractions,
) -> FxHashSet<PropertyName> {
    let mut next: FxHashSet<PropertyName> = established
        .into_iter()
        .filter(|name| interactions.get(name).is_none_or(|i| i.preserves))
        .collect();
    for (name, interaction) in interactions {
        if interaction.establishes {
            next.insert(name.clone());
        }
    }
    next
}
