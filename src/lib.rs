// Copyright 2025-2026 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![allow(dead_code)]

//! # dexscope
//!
//! The pass-orchestration and invariant-tracking core of a whole-program
//! bytecode optimizer for stack-based, class-file-oriented virtual machines.
//! `dexscope` loads a collection of compiled classes into an in-memory
//! store, runs a configured sequence of transformation passes over them,
//! and hands the result back — with the guarantee that the schedule was
//! proven sound *before* anything was mutated.
//!
//! # Architecture
//!
//! The library is organized into layers that mirror the data flow of an
//! optimization run:
//!
//! - **IR Layer** ([`crate::ir`]): register-machine instructions with total
//!   structural equality, linear labeled method bodies, and concurrent
//!   symbol interning
//! - **Program Layer** ([`crate::program`]): the store owning classes,
//!   methods, and bodies, with parallel per-method mutation handles
//! - **Analysis Layer** ([`crate::analysis`]): basic-block control-flow
//!   graphs with build/flatten round-tripping and fixpoint structural
//!   hashing
//! - **Property Layer** ([`crate::properties`]): named program properties,
//!   per-pass interaction declarations, and the pure schedule verifier
//! - **Optimizer Layer** ([`crate::optimizer`]): the pass manager, the pass
//!   trait, event logging, and the built-in passes
//!
//! # The property system
//!
//! Every pass declares, per named property, whether it *requires* the
//! property on entry, *establishes* it on exit, *preserves* it, or destroys
//! it. Before running anything, the [`PassManager`] feeds the declared
//! schedule to the verifier, which walks the pass order with the configured
//! initial property set and rejects the pipeline if any requirement is
//! unmet or any configured final property would not hold at the end. A
//! rejected schedule aborts the run with a one-line diagnosis and the
//! program untouched.
//!
//! # Usage Example
//!
//! ```rust
//! use dexscope::prelude::*;
//! use std::sync::Arc;
//!
//! // Build a method with two identical blocks.
//! let symbols = Arc::new(SymbolTable::new());
//! let ty = symbols.intern_type("LtestClass;");
//! let body = MethodBuilder::new(&symbols).build_with(|m| {
//!     m.const_(0, 0);
//!     m.if_eqz(0, "d");
//!     m.add(0, 0, 0);
//!     m.goto_("e");
//!     m.label("d");
//!     m.add(0, 0, 0);
//!     m.goto_("e");
//!     m.label("e");
//!     m.ret_void();
//! });
//!
//! let mut class = Class::new(ty, ClassAccessFlags::PUBLIC);
//! class.add_method(Method::new(
//!     ty,
//!     symbols.intern_string("run"),
//!     MethodAccessFlags::PUBLIC | MethodAccessFlags::STATIC,
//!     body,
//! ));
//! let mut store = ProgramStore::new(symbols);
//! store.add_class(class);
//!
//! // Run the dedup pass through the manager.
//! let mut manager = PassManager::new();
//! manager.register_pass(Box::new(DedupBlocksPass::new()));
//! manager.set_testing_mode();
//! manager.run(&mut store, &OptimizerConfig::default())?;
//!
//! assert!(manager.events().has(EventKind::BlockDeduplicated));
//! # Ok::<(), dexscope::Error>(())
//! ```
//!
//! # Error Handling
//!
//! A run either completes successfully or produces no output. There is no
//! retry and no partial commit: schedule problems are reported before any
//! pass runs, and a structural invariant violation discovered mid-pass
//! aborts the whole run — see [`Error`].
//!
//! # Thread Safety
//!
//! Pass execution is strictly sequential; within a pass, methods are
//! processed in parallel with each worker owning one method's IR. Shared
//! tables (symbols) are written only at load time and are immutable during
//! passes. All public types are [`Send`] and [`Sync`] unless documented
//! otherwise.

#[macro_use]
pub(crate) mod error;

/// Convenient re-exports of the most commonly used types and traits.
pub mod prelude;

/// Program analysis: control-flow graphs and structural hashing.
pub mod analysis;

/// Configuration surface of the optimization pipeline.
pub mod config;

/// Intermediate representation: instructions, bodies, and symbols.
pub mod ir;

/// Pass orchestration: manager, pass trait, events, and built-in passes.
pub mod optimizer;

/// The program store: classes, methods, and IR ownership.
pub mod program;

/// Program properties, interactions, and schedule verification.
pub mod properties;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

pub use config::OptimizerConfig;
pub use error::Error;
pub use optimizer::{DedupBlocksPass, Pass, PassManager};
pub use program::ProgramStore;
