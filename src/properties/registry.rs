//! The property registry: enablement and initial/final set resolution.
//!
//! Properties are process-wide abstract assertions about the program state,
//! identified by opaque names. The registry resolves, for a given
//! configuration, which names are active in this run, which hold on the
//! input program, and which must hold on the output. Passes attach no
//! semantics to the strings themselves.

use rustc_hash::FxHashSet;

use crate::{
    config::OptimizerConfig,
    properties::interaction::{PassInteractions, PropertyName},
};

/// Well-known property names.
///
/// These are the properties the built-in passes declare. The set is open:
/// configurations and external passes may introduce further names.
pub mod names {
    /// No `init-class` pseudo-instructions remain in any method body.
    pub const NO_INIT_CLASS_INSTRUCTIONS: &str = "NoInitClassInstructions";
    /// Stand-in for fixing up passes.
    pub const NEEDS_EVERYTHING_PUBLIC: &str = "NeedsEverythingPublic";
    /// Source-block markers are present in method bodies.
    pub const HAS_SOURCE_BLOCKS: &str = "HasSourceBlocks";
}

/// Returns true if the named property is active in this run.
#[must_use]
pub fn is_enabled(name: &str, config: &OptimizerConfig) -> bool {
    config.enabled_properties.contains(name)
}

/// The properties the input program is assumed to satisfy.
///
/// Disabled names are dropped: the pipeline never reasons about them.
#[must_use]
pub fn initial_set(config: &OptimizerConfig) -> FxHashSet<PropertyName> {
    config
        .initial_properties
        .iter()
        .filter(|name| is_enabled(name, config))
        .cloned()
        .collect()
}

/// The properties the output program must satisfy.
///
/// Disabled names are dropped: the pipeline never reasons about them.
#[must_use]
pub fn final_set(config: &OptimizerConfig) -> FxHashSet<PropertyName> {
    config
        .final_properties
        .iter()
        .filter(|name| is_enabled(name, config))
        .cloned()
        .collect()
}

/// Drops disabled properties from an interaction record.
#[must_use]
pub fn filter_enabled(interactions: &PassInteractions, config: &OptimizerConfig) -> PassInteractions {
    interactions
        .iter()
        .filter(|(name, _)| is_enabled(name, config))
        .map(|(name, interaction)| (name.clone(), *interaction))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::interaction::PropertyInteraction;

    #[test]
    fn test_enablement_comes_from_config() {
        let config = OptimizerConfig::new().enable_property(names::HAS_SOURCE_BLOCKS);
        assert!(is_enabled(names::HAS_SOURCE_BLOCKS, &config));
        assert!(!is_enabled(names::NEEDS_EVERYTHING_PUBLIC, &config));
    }

    #[test]
    fn test_initial_and_final_filter_disabled() {
        let config = OptimizerConfig::new()
            .enable_property("A")
            .assume_initial("A")
            .assume_initial("B")
            .require_final("A")
            .require_final("B");
        let initial = initial_set(&config);
        let finals = final_set(&config);
        assert!(initial.contains("A") && !initial.contains("B"));
        assert!(finals.contains("A") && !finals.contains("B"));
    }

    #[test]
    fn test_filter_enabled_drops_disabled_keys() {
        let config = OptimizerConfig::new().enable_property("A");
        let mut interactions = PassInteractions::default();
        interactions.insert("A".to_string(), PropertyInteraction::requires());
        interactions.insert("B".to_string(), PropertyInteraction::destroys());
        let filtered = filter_enabled(&interactions, &config);
        assert!(filtered.contains_key("A"));
        assert!(!filtered.contains_key("B"));
    }
}
