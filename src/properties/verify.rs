//! The schedule verifier: proves a pass order sound before anything runs.
//!
//! The verifier walks the declared pass order once, tracking the set of
//! established properties, and reports the first rule violation as a
//! human-readable diagnosis. It is pure — it never touches the program
//! store — so the driver can decide to abort before mutating anything.

use rustc_hash::FxHashSet;

use crate::{
    config::OptimizerConfig,
    properties::{
        interaction::{apply, PassInteractions, PropertyName},
        registry::{filter_enabled, final_set, initial_set},
    },
};

fn smallest<'a>(names: impl Iterator<Item = &'a str>) -> Option<&'a str> {
    names.min()
}

/// Verifies an ordered pass schedule against the configuration.
///
/// Walks the schedule with a working set `E` of established properties,
/// initialized to the configured initial set:
///
/// 1. Disabled properties are dropped from each interaction record.
/// 2. A pass whose required properties are not all in `E` fails the
///    schedule.
/// 3. Ill-formed interactions fail the schedule (defensive — they are
///    already rejected when declarations are collected).
/// 4. `E` steps to `(E ∩ preserved) ∪ established`.
///
/// After the walk, every configured final property must be in `E`.
///
/// Returns `None` on success, or `Some(diagnosis)` naming the pass index,
/// pass name, property, and the rule violated. When several properties
/// violate the same rule the lexicographically smallest is named, keeping
/// the diagnosis independent of map iteration order.
#[must_use]
pub fn verify_pass_interactions(
    pass_interactions: &[(String, PassInteractions)],
    config: &OptimizerConfig,
) -> Option<String> {
    let mut established = initial_set(config);

    for (index, (pass_name, interactions)) in pass_interactions.iter().enumerate() {
        let interactions = filter_enabled(interactions, config);

        if let Some(missing) = smallest(
            interactions
                .iter()
                .filter(|(name, i)| i.requires && !established.contains(*name))
                .map(|(name, _)| name.as_str()),
        ) {
            return Some(format!(
                "pass {index}=`{pass_name}` requires property `{missing}` which is not established"
            ));
        }

        if let Some(invalid) = smallest(
            interactions
                .iter()
                .filter(|(_, i)| !i.is_valid())
                .map(|(name, _)| name.as_str()),
        ) {
            return Some(format!(
                "pass {index}=`{pass_name}` declares an ill-formed interaction for property `{invalid}`"
            ));
        }

        established = apply(established, &interactions);
    }

    let finals = final_set(config);
    let missing: FxHashSet<&PropertyName> = finals.difference(&established).collect();
    if let Some(name) = smallest(missing.iter().map(|name| name.as_str())) {
        return Some(format!(
            "final property `{name}` not established by pipeline"
        ));
    }

    None
}
