//! Program properties, pass interactions, and schedule verification.
//!
//! Every pass declares, per named program property, whether it *requires*
//! the property on entry, *establishes* it on exit, *preserves* it, or —
//! derived from the last two — *destroys* it. This module holds:
//!
//! - [`PropertyInteraction`] / [`PassInteractions`] — the declaration model
//!   with sparse preserve-by-default semantics
//! - [`registry`] — enablement and initial/final-set resolution against the
//!   run configuration
//! - [`verify_pass_interactions`] — the pure schedule verifier consulted by
//!   the pass manager before anything runs
//!
//! Properties are binary and process-wide: either the program currently
//! satisfies a property or it does not. Transitions happen only between
//! passes, by applying a pass's interaction record with [`apply`].

mod interaction;
pub mod registry;
mod verify;

pub use interaction::{apply, get_required, PassInteractions, PropertyInteraction, PropertyName};
pub use registry::names;
pub use verify::verify_pass_interactions;
