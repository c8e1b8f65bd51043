//! Intermediate representation: instructions, linear bodies, and symbols.
//!
//! This module defines the register-machine IR that the program store owns
//! and that passes transform:
//!
//! - [`Instruction`] / [`Op`] — operations with named operand fields and
//!   total structural equality
//! - [`IrBody`] — the linear, labeled instruction stream stored per method
//! - [`SymbolTable`] — concurrent interning of type/field/method/string
//!   references
//! - [`MethodBuilder`] — closure-based body construction for tests and
//!   tooling
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                       IR Layer                            │
//! ├───────────────────────────────────────────────────────────┤
//! │                                                           │
//! │  SymbolTable            type#/field#/method#/string# ids  │
//! │      ▲                                                    │
//! │      │ referenced by                                      │
//! │  Instruction (Op)       structural eq over opcode +       │
//! │      ▲                  operands + symbol ids             │
//! │      │ carried in                                         │
//! │  IrBody                 labels + instructions + targets   │
//! │      ▲                                                    │
//! │      │ lifted/flattened by                                │
//! │  analysis::ControlFlowGraph                               │
//! │                                                           │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! Branch targets are never embedded in instructions: linear bodies attach
//! label lists to branching entries, CFGs attach successor lists to blocks.
//! This keeps instruction equality purely structural, which the block
//! deduplication pass relies on.

mod body;
mod builder;
mod instruction;
mod opcode;
mod symbols;

pub use body::{IrBody, IrEntry, IrInstr, LabelId};
pub use builder::MethodBuilder;
pub use instruction::{Instruction, Op};
pub use opcode::{BinaryOp, IfCond, InvokeKind, OpcodeCategory};
pub use symbols::{
    FieldId, FieldRef, MethodRef, MethodRefId, StringId, SymbolTable, TypeId, CONSTRUCTOR_NAME,
};
