//! Program analysis: control-flow graphs and structural hashing.
//!
//! Analyses in this module are derived views over the IR owned by the
//! program store. They exist only while a pass holds them — a CFG is built
//! from a method's linear IR on pass entry and flattened back on exit.

pub mod cfg;

pub use cfg::{structural_partition, BasicBlock, ControlFlowGraph};
