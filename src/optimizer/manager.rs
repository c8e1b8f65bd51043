//! The pass manager: verified, sequential pipeline execution.

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};

use rustc_hash::FxHashSet;

use crate::{
    config::OptimizerConfig,
    optimizer::{
        events::{EventKind, EventLog},
        pass::{Pass, PassContext},
    },
    program::ProgramStore,
    properties::{apply, registry, verify_pass_interactions, PassInteractions, PropertyName},
    Error, Result,
};

/// Per-pass execution metrics.
///
/// Collected only outside testing mode; this is the optional side channel
/// testing mode suppresses.
#[derive(Debug, Clone)]
pub struct PassMetrics {
    /// The pass name.
    pub pass: &'static str,
    /// Number of transformation events the pass recorded.
    pub transformations: usize,
    /// Wall-clock duration of the pass.
    pub duration: Duration,
}

/// Drives a configured sequence of passes over the program store.
///
/// The manager owns the ordered pass list, the testing-mode flag, and the
/// running set of established properties. `run` consults the schedule
/// verifier before executing anything: an invalid schedule aborts the run
/// with a diagnosis and the program untouched. Passes then execute strictly
/// sequentially — the property-state transition between passes would
/// otherwise be undefined — while each pass is free to fan out over methods
/// internally.
///
/// # Examples
///
/// ```rust
/// use dexscope::{OptimizerConfig, PassManager, ProgramStore};
/// use dexscope::optimizer::DedupBlocksPass;
///
/// let mut manager = PassManager::new();
/// manager.register_pass(Box::new(DedupBlocksPass::new()));
/// manager.set_testing_mode();
///
/// let mut store = ProgramStore::empty();
/// manager.run(&mut store, &OptimizerConfig::default()).unwrap();
/// ```
#[derive(Default)]
pub struct PassManager {
    passes: Vec<Box<dyn Pass>>,
    testing_mode: bool,
    cancel: Arc<AtomicBool>,
    established: FxHashSet<PropertyName>,
    events: EventLog,
    metrics: Vec<PassMetrics>,
}

impl PassManager {
    /// Creates a manager with no passes registered.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a manager over an ordered pass list.
    #[must_use]
    pub fn with_passes(passes: Vec<Box<dyn Pass>>) -> Self {
        Self {
            passes,
            ..Self::default()
        }
    }

    /// Appends a pass to the pipeline.
    pub fn register_pass(&mut self, pass: Box<dyn Pass>) {
        self.passes.push(pass);
    }

    /// Number of registered passes.
    #[must_use]
    pub fn pass_count(&self) -> usize {
        self.passes.len()
    }

    /// Enables testing mode.
    ///
    /// Testing mode suppresses optional side channels (per-pass metrics)
    /// but does *not* relax schedule verification.
    pub fn set_testing_mode(&mut self) {
        self.testing_mode = true;
    }

    /// A best-effort cancel hook.
    ///
    /// Storing `true` cancels the run at the next check point: between
    /// passes, or at block-group boundaries inside per-method workers. A
    /// cancelled run produces no output.
    #[must_use]
    pub fn cancel_hook(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// The properties established after the last completed pass.
    #[must_use]
    pub fn established_properties(&self) -> &FxHashSet<PropertyName> {
        &self.established
    }

    /// The accumulated event log.
    #[must_use]
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Per-pass metrics. Empty in testing mode.
    #[must_use]
    pub fn metrics(&self) -> &[PassMetrics] {
        &self.metrics
    }

    /// Collects declarations, rejecting self-contradictory interactions.
    ///
    /// Declarations are validated unfiltered: a contradictory interaction
    /// is a programmer error even when the property is disabled.
    fn collect_schedule(
        &self,
        config: &OptimizerConfig,
    ) -> Result<Vec<(String, PassInteractions)>> {
        let mut schedule = Vec::with_capacity(self.passes.len());
        for pass in &self.passes {
            let interactions = pass.interactions(config);
            let mut names: Vec<&String> = interactions.keys().collect();
            names.sort();
            for name in names {
                if interactions.get(name).is_some_and(|i| !i.is_valid()) {
                    return Err(Error::IllFormedInteraction {
                        pass: pass.name().to_string(),
                        property: name.clone(),
                    });
                }
            }
            schedule.push((pass.name().to_string(), interactions));
        }
        Ok(schedule)
    }

    /// Runs the configured pipeline over the store.
    ///
    /// 1. Collects interaction declarations from every registered pass.
    /// 2. Invokes the schedule verifier; on failure, surfaces the diagnosis
    ///    and aborts without calling any pass.
    /// 3. Runs each pass with a snapshot of the established set, then steps
    ///    the set exactly as the verifier did.
    ///
    /// # Errors
    ///
    /// - [`Error::IllFormedInteraction`] for contradictory declarations
    /// - [`Error::ScheduleViolation`] when the verifier rejects the order
    /// - [`Error::Cancelled`] when the cancel hook fired
    /// - any fatal error a pass returns
    pub fn run(&mut self, store: &mut ProgramStore, config: &OptimizerConfig) -> Result<()> {
        let testing = self.testing_mode || config.testing_mode;

        let schedule = self.collect_schedule(config)?;

        if let Some(diagnosis) = verify_pass_interactions(&schedule, config) {
            self.events
                .record(EventKind::ScheduleRejected)
                .message(diagnosis.as_str());
            return Err(Error::ScheduleViolation(diagnosis));
        }

        self.established = registry::initial_set(config);

        for (pass, (name, interactions)) in self.passes.iter().zip(&schedule) {
            if self.cancel.load(Ordering::Relaxed) {
                return Err(Error::Cancelled);
            }

            let ctx = PassContext::new(Arc::clone(&self.cancel), self.established.clone());
            self.events
                .record(EventKind::PassStarted)
                .pass(name.as_str());

            let start = Instant::now();
            pass.run(store, config, &ctx)?;
            let duration = start.elapsed();

            let summary = ctx.events.summary();
            let transformations = ctx.events.transformation_count();
            self.events.merge(&ctx.events);
            self.events
                .record(EventKind::PassCompleted)
                .pass(name.as_str())
                .message(format!("{name}: {summary}"));

            if !testing {
                self.metrics.push(PassMetrics {
                    pass: pass.name(),
                    transformations,
                    duration,
                });
            }

            let enabled = registry::filter_enabled(interactions, config);
            self.established = apply(std::mem::take(&mut self.established), &enabled);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::PropertyInteraction;

    struct DeclaredPass {
        name: &'static str,
        declarations: Vec<(&'static str, PropertyInteraction)>,
        ran: Arc<AtomicBool>,
    }

    impl DeclaredPass {
        fn new(
            name: &'static str,
            declarations: Vec<(&'static str, PropertyInteraction)>,
        ) -> (Self, Arc<AtomicBool>) {
            let ran = Arc::new(AtomicBool::new(false));
            (
                Self {
                    name,
                    declarations,
                    ran: Arc::clone(&ran),
                },
                ran,
            )
        }
    }

    impl Pass for DeclaredPass {
        fn name(&self) -> &'static str {
            self.name
        }

        fn interactions(&self, _config: &OptimizerConfig) -> PassInteractions {
            self.declarations
                .iter()
                .map(|(name, i)| ((*name).to_string(), *i))
                .collect()
        }

        fn run(
            &self,
            _store: &mut ProgramStore,
            _config: &OptimizerConfig,
            _ctx: &PassContext,
        ) -> Result<()> {
            self.ran.store(true, Ordering::Relaxed);
            Ok(())
        }
    }

    #[test]
    fn test_empty_pipeline_runs() {
        let mut manager = PassManager::new();
        let mut store = ProgramStore::empty();
        manager.run(&mut store, &OptimizerConfig::default()).unwrap();
    }

    #[test]
    fn test_schedule_violation_aborts_before_any_pass() {
        let config = OptimizerConfig::testing().enable_property("P");
        let (user, user_ran) =
            DeclaredPass::new("user", vec![("P", PropertyInteraction::requires())]);
        let (maker, maker_ran) =
            DeclaredPass::new("maker", vec![("P", PropertyInteraction::establishes())]);

        // Wrong order: the consumer comes first.
        let mut manager = PassManager::with_passes(vec![Box::new(user), Box::new(maker)]);
        let mut store = ProgramStore::empty();
        let result = manager.run(&mut store, &config);

        assert!(matches!(result, Err(Error::ScheduleViolation(_))));
        assert!(!user_ran.load(Ordering::Relaxed));
        assert!(!maker_ran.load(Ordering::Relaxed));
        assert!(manager.events().has(EventKind::ScheduleRejected));
    }

    #[test]
    fn test_valid_schedule_runs_all_passes() {
        let config = OptimizerConfig::testing().enable_property("P").require_final("P");
        let (maker, maker_ran) =
            DeclaredPass::new("maker", vec![("P", PropertyInteraction::establishes())]);
        let (user, user_ran) =
            DeclaredPass::new("user", vec![("P", PropertyInteraction::requires())]);

        let mut manager = PassManager::with_passes(vec![Box::new(maker), Box::new(user)]);
        let mut store = ProgramStore::empty();
        manager.run(&mut store, &config).unwrap();

        assert!(maker_ran.load(Ordering::Relaxed));
        assert!(user_ran.load(Ordering::Relaxed));
        assert!(manager.established_properties().contains("P"));
    }

    #[test]
    fn test_ill_formed_interaction_rejected_at_load() {
        let config = OptimizerConfig::testing();
        let (broken, ran) = DeclaredPass::new(
            "broken",
            vec![("P", PropertyInteraction::new(true, true, false))],
        );

        let mut manager = PassManager::with_passes(vec![Box::new(broken)]);
        let mut store = ProgramStore::empty();
        let result = manager.run(&mut store, &config);

        assert!(matches!(
            result,
            Err(Error::IllFormedInteraction { ref pass, ref property })
                if pass == "broken" && property == "P"
        ));
        assert!(!ran.load(Ordering::Relaxed));
    }

    #[test]
    fn test_cancellation_between_passes() {
        let config = OptimizerConfig::testing();
        let (pass, ran) = DeclaredPass::new("only", vec![]);
        let mut manager = PassManager::with_passes(vec![Box::new(pass)]);
        manager.cancel_hook().store(true, Ordering::Relaxed);

        let mut store = ProgramStore::empty();
        let result = manager.run(&mut store, &config);
        assert!(matches!(result, Err(Error::Cancelled)));
        assert!(!ran.load(Ordering::Relaxed));
    }

    #[test]
    fn test_metrics_suppressed_in_testing_mode() {
        let (pass, _) = DeclaredPass::new("only", vec![]);
        let mut manager = PassManager::with_passes(vec![Box::new(pass)]);
        manager.set_testing_mode();
        let mut store = ProgramStore::empty();
        manager.run(&mut store, &OptimizerConfig::default()).unwrap();
        assert!(manager.metrics().is_empty());

        let (pass, _) = DeclaredPass::new("only", vec![]);
        let mut manager = PassManager::with_passes(vec![Box::new(pass)]);
        let mut store = ProgramStore::empty();
        manager.run(&mut store, &OptimizerConfig::default()).unwrap();
        assert_eq!(manager.metrics().len(), 1);
    }

    #[test]
    fn test_established_set_steps_like_verifier() {
        let config = OptimizerConfig::testing().enable_property("P").enable_property("Q");
        let (a, _) = DeclaredPass::new(
            "a",
            vec![
                ("P", PropertyInteraction::establishes()),
                ("Q", PropertyInteraction::establishes()),
            ],
        );
        let (b, _) = DeclaredPass::new("b", vec![("Q", PropertyInteraction::destroys())]);

        let mut manager = PassManager::with_passes(vec![Box::new(a), Box::new(b)]);
        let mut store = ProgramStore::empty();
        manager.run(&mut store, &config).unwrap();

        assert!(manager.established_properties().contains("P"));
        assert!(!manager.established_properties().contains("Q"));
    }
}
