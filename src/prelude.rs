//! Convenient re-exports of the most commonly used types and traits.
//!
//! ```rust
//! use dexscope::prelude::*;
//!
//! let mut manager = PassManager::new();
//! manager.register_pass(Box::new(DedupBlocksPass::new()));
//! let mut store = ProgramStore::empty();
//! manager.run(&mut store, &OptimizerConfig::testing())?;
//! # Ok::<(), dexscope::Error>(())
//! ```

pub use crate::{
    analysis::{BasicBlock, ControlFlowGraph},
    config::OptimizerConfig,
    ir::{Instruction, IrBody, MethodBuilder, Op, SymbolTable},
    optimizer::{DedupBlocksPass, EventKind, EventLog, Pass, PassContext, PassManager},
    program::{Class, ClassAccessFlags, Method, MethodAccessFlags, ProgramStore},
    properties::{PassInteractions, PropertyInteraction},
    Error, Result,
};
