//! Configuration for the optimization pipeline.
//!
//! This module provides the configuration surface recognized by the
//! pass-orchestration core: which properties are active, which are assumed
//! on the input program, which are required of the output, and the testing
//! switch used by harnesses.

use rustc_hash::FxHashSet;

/// Configuration for an optimization run.
///
/// Properties outside [`enabled_properties`](Self::enabled_properties) are
/// silently dropped from every interaction record before verification —
/// running with a property disabled is semantically equivalent to no pass
/// declaring it.
#[derive(Debug, Clone, Default)]
pub struct OptimizerConfig {
    /// Property names explicitly turned on for this run.
    pub enabled_properties: FxHashSet<String>,

    /// Properties the input program is assumed to satisfy.
    pub initial_properties: FxHashSet<String>,

    /// Properties the output program must satisfy.
    pub final_properties: FxHashSet<String>,

    /// When true, the manager suppresses optional diagnostic side channels
    /// (per-pass metrics) but performs full schedule verification.
    pub testing_mode: bool,
}

impl OptimizerConfig {
    /// Creates a configuration with nothing enabled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration for test harnesses.
    ///
    /// Equivalent to [`new`](Self::new) with `testing_mode` set.
    #[must_use]
    pub fn testing() -> Self {
        Self {
            testing_mode: true,
            ..Self::default()
        }
    }

    /// Enables a property for this run.
    #[must_use]
    pub fn enable_property(mut self, name: &str) -> Self {
        self.enabled_properties.insert(name.to_string());
        self
    }

    /// Asserts a property of the input program.
    ///
    /// The property must also be enabled to take effect.
    #[must_use]
    pub fn assume_initial(mut self, name: &str) -> Self {
        self.initial_properties.insert(name.to_string());
        self
    }

    /// Requires a property of the output program.
    ///
    /// The property must also be enabled to take effect.
    #[must_use]
    pub fn require_final(mut self, name: &str) -> Self {
        self.final_properties.insert(name.to_string());
        self
    }
}
