//! Pass trait and per-run pass context.
//!
//! This module defines the `Pass` trait that all transformation passes
//! implement, and the context the manager hands each pass for the duration
//! of its run.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use rustc_hash::FxHashSet;

use crate::{
    config::OptimizerConfig,
    optimizer::events::EventLog,
    program::ProgramStore,
    properties::{PassInteractions, PropertyName},
    Result,
};

/// Shared state a pass sees while it runs.
///
/// The context is thread-safe: per-method workers inside a pass record
/// events and poll cancellation through shared references.
#[derive(Debug)]
pub struct PassContext {
    /// Event log for this pass's run. Merged into the manager's log when
    /// the pass completes.
    pub events: EventLog,
    cancel: Arc<AtomicBool>,
    established: FxHashSet<PropertyName>,
}

impl PassContext {
    /// Creates a context with the given cancel flag and the property set
    /// established on pass entry.
    #[must_use]
    pub fn new(cancel: Arc<AtomicBool>, established: FxHashSet<PropertyName>) -> Self {
        Self {
            events: EventLog::new(),
            cancel,
            established,
        }
    }

    /// Returns true if the run has been cancelled.
    ///
    /// Per-method workers check this at block-group boundaries; the manager
    /// checks it between passes. Cancellation is best-effort.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    /// The properties established when this pass was entered.
    #[must_use]
    pub fn established(&self) -> &FxHashSet<PropertyName> {
        &self.established
    }
}

/// A transformation pass over the program store.
///
/// All passes must be thread-safe (`Send + Sync`); the manager runs passes
/// strictly sequentially, but a pass is free to fan out over methods
/// internally (see
/// [`ProgramStore::par_try_for_each_method`](crate::program::ProgramStore::par_try_for_each_method)).
///
/// # Property declarations
///
/// The manager calls [`interactions`](Self::interactions) for every
/// registered pass before any [`run`](Self::run), feeds the declarations to
/// the schedule verifier, and only executes the pipeline if the whole
/// schedule is sound. The default declaration is empty: no requirements,
/// nothing established, everything preserved.
pub trait Pass: Send + Sync {
    /// Unique name for diagnostics and scheduling.
    fn name(&self) -> &'static str;

    /// Get a description of what this pass does.
    fn description(&self) -> &'static str {
        "No description available"
    }

    /// The pass's declared property interactions under this configuration.
    fn interactions(&self, _config: &OptimizerConfig) -> PassInteractions {
        PassInteractions::default()
    }

    /// Runs the pass against the program store.
    ///
    /// # Errors
    ///
    /// Returns an error on a fatal pass-internal invariant violation or
    /// when the run is cancelled. Any error aborts the whole pipeline.
    fn run(
        &self,
        store: &mut ProgramStore,
        config: &OptimizerConfig,
        ctx: &PassContext,
    ) -> Result<()>;
}
