//! Register-machine instructions with structural equality.
//!
//! An [`Instruction`] wraps an [`Op`] — an operation with named operand
//! fields. Control-flow operations carry **no embedded targets**: in the
//! linear IR, branch targets live on the surrounding [`IrInstr`](crate::ir::IrInstr)
//! as label references; in CFG form they live on the block's successor list.
//! Keeping targets out of the instruction makes structural equality a total
//! derived equality over opcode, operand registers, and referenced symbols.

use std::fmt;

use crate::ir::{
    opcode::{BinaryOp, IfCond, InvokeKind, OpcodeCategory},
    symbols::{FieldId, MethodRefId, StringId, TypeId},
};

/// A single operation with named operands.
///
/// Registers are plain `u32` indices (`v0`, `v1`, …). Symbol operands are ids
/// into the program's [`SymbolTable`](crate::ir::SymbolTable).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Op {
    /// No operation.
    Nop,

    /// Load a numeric constant: `dest = value`
    Const {
        /// Destination register.
        dest: u32,
        /// The constant value.
        value: i64,
    },

    /// Load a string constant: `dest = string`
    ConstString {
        /// Destination register.
        dest: u32,
        /// The interned string.
        string: StringId,
    },

    /// Register move: `dest = src`
    Move {
        /// Destination register.
        dest: u32,
        /// Source register.
        src: u32,
    },

    /// Binary arithmetic: `dest = src1 <op> src2`
    Binary {
        /// The operator.
        op: BinaryOp,
        /// Destination register.
        dest: u32,
        /// First operand register.
        src1: u32,
        /// Second operand register.
        src2: u32,
    },

    /// Allocate an instance of a class.
    ///
    /// The freshly allocated reference is delivered by the immediately
    /// following [`Op::MoveResultPseudo`].
    NewInstance {
        /// The class to instantiate.
        class: TypeId,
    },

    /// Capture the result of the preceding allocation: `dest = <result>`
    MoveResultPseudo {
        /// Destination register.
        dest: u32,
    },

    /// Capture the result of the preceding invocation: `dest = <result>`
    MoveResult {
        /// Destination register.
        dest: u32,
    },

    /// Invoke a method.
    ///
    /// For instance dispatch, `args[0]` is the receiver.
    Invoke {
        /// Dispatch kind.
        kind: InvokeKind,
        /// The invoked method.
        method: MethodRefId,
        /// Argument registers (receiver first for instance dispatch).
        args: Vec<u32>,
    },

    /// Read a field: `dest = object.field` (or a static field when `object` is `None`).
    FieldGet {
        /// Destination register.
        dest: u32,
        /// Receiver register, `None` for static fields.
        object: Option<u32>,
        /// The accessed field.
        field: FieldId,
    },

    /// Write a field: `object.field = src` (or a static field when `object` is `None`).
    FieldPut {
        /// Source register.
        src: u32,
        /// Receiver register, `None` for static fields.
        object: Option<u32>,
        /// The accessed field.
        field: FieldId,
    },

    /// Acquire the monitor of the object in `src`.
    MonitorEnter {
        /// Object register.
        src: u32,
    },

    /// Release the monitor of the object in `src`.
    MonitorExit {
        /// Object register.
        src: u32,
    },

    /// Unconditional jump. One target.
    Goto,

    /// Conditional branch. One explicit (taken) target plus fallthrough.
    If {
        /// Branch condition.
        cond: IfCond,
        /// First (or only) compared register.
        src1: u32,
        /// Second compared register for binary conditions.
        src2: Option<u32>,
    },

    /// Multi-way dispatch on `src`. Case targets plus fallthrough.
    Switch {
        /// Dispatched register.
        src: u32,
    },

    /// Return from the method, optionally with a value.
    Return {
        /// Returned register, `None` for `void`.
        src: Option<u32>,
    },

    /// Throw the object in `src`. No successors.
    Throw {
        /// Exception register.
        src: u32,
    },
}

/// A single instruction.
///
/// Value-equal under total structural equality over opcode, operand
/// registers, and referenced symbol ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Instruction {
    op: Op,
}

impl Instruction {
    /// Creates an instruction from an operation.
    #[must_use]
    pub fn new(op: Op) -> Self {
        Self { op }
    }

    /// Returns the operation.
    #[must_use]
    pub fn op(&self) -> &Op {
        &self.op
    }

    /// Returns a mutable reference to the operation.
    pub fn op_mut(&mut self) -> &mut Op {
        &mut self.op
    }

    /// Returns the opcode category of this instruction.
    #[must_use]
    pub fn category(&self) -> OpcodeCategory {
        match &self.op {
            Op::Nop => OpcodeCategory::Nop,
            Op::Const { .. } | Op::ConstString { .. } => OpcodeCategory::Const,
            Op::Move { .. } | Op::MoveResult { .. } => OpcodeCategory::Move,
            Op::Binary { .. } => OpcodeCategory::Arithmetic,
            Op::NewInstance { .. } => OpcodeCategory::Allocation,
            Op::Invoke { .. } => OpcodeCategory::Invocation,
            Op::FieldGet { .. } | Op::FieldPut { .. } => OpcodeCategory::FieldAccess,
            Op::MoveResultPseudo { .. } => OpcodeCategory::MoveResultPseudo,
            Op::MonitorEnter { .. } | Op::MonitorExit { .. } => OpcodeCategory::Monitor,
            Op::Goto | Op::If { .. } | Op::Switch { .. } => OpcodeCategory::ControlFlow,
            Op::Return { .. } => OpcodeCategory::Return,
            Op::Throw { .. } => OpcodeCategory::Throw,
        }
    }

    /// Returns true if this instruction ends a basic block.
    #[must_use]
    pub fn is_terminator(&self) -> bool {
        matches!(
            self.op,
            Op::Goto | Op::If { .. } | Op::Switch { .. } | Op::Return { .. } | Op::Throw { .. }
        )
    }

    /// Returns true if control can fall through past this terminator.
    ///
    /// Only meaningful for terminators: conditional branches and switches
    /// fall through when not taken, the rest transfer control unconditionally.
    #[must_use]
    pub fn has_fallthrough(&self) -> bool {
        matches!(self.op, Op::If { .. } | Op::Switch { .. })
    }

    /// Number of explicit label targets this instruction requires in linear IR.
    ///
    /// `None` means any positive number (switch).
    #[must_use]
    pub fn expected_targets(&self) -> Option<usize> {
        match self.op {
            Op::Goto | Op::If { .. } => Some(1),
            Op::Switch { .. } => None,
            _ => Some(0),
        }
    }

    /// Returns the register written by this instruction, if any.
    #[must_use]
    pub fn def(&self) -> Option<u32> {
        match &self.op {
            Op::Const { dest, .. }
            | Op::ConstString { dest, .. }
            | Op::Move { dest, .. }
            | Op::Binary { dest, .. }
            | Op::MoveResultPseudo { dest }
            | Op::MoveResult { dest }
            | Op::FieldGet { dest, .. } => Some(*dest),
            _ => None,
        }
    }

    /// Returns the registers read by this instruction.
    #[must_use]
    pub fn uses(&self) -> Vec<u32> {
        match &self.op {
            Op::Move { src, .. } => vec![*src],
            Op::Binary { src1, src2, .. } => vec![*src1, *src2],
            Op::Invoke { args, .. } => args.clone(),
            Op::FieldGet { object, .. } => object.iter().copied().collect(),
            Op::FieldPut { src, object, .. } => {
                let mut uses = vec![*src];
                uses.extend(object.iter().copied());
                uses
            }
            Op::MonitorEnter { src }
            | Op::MonitorExit { src }
            | Op::Switch { src }
            | Op::Throw { src } => vec![*src],
            Op::If { src1, src2, .. } => {
                let mut uses = vec![*src1];
                uses.extend(src2.iter().copied());
                uses
            }
            Op::Return { src } => src.iter().copied().collect(),
            _ => Vec::new(),
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.op {
            Op::Nop => write!(f, "nop"),
            Op::Const { dest, value } => write!(f, "const v{dest}, {value}"),
            Op::ConstString { dest, string } => {
                write!(f, "const-string v{dest}, string#{}", string.0)
            }
            Op::Move { dest, src } => write!(f, "move v{dest}, v{src}"),
            Op::Binary {
                op,
                dest,
                src1,
                src2,
            } => write!(f, "{op} v{dest}, v{src1}, v{src2}"),
            Op::NewInstance { class } => write!(f, "new-instance type#{}", class.0),
            Op::MoveResultPseudo { dest } => write!(f, "move-result-pseudo-object v{dest}"),
            Op::MoveResult { dest } => write!(f, "move-result v{dest}"),
            Op::Invoke { kind, method, args } => {
                write!(f, "{kind} method#{} (", method.0)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "v{arg}")?;
                }
                write!(f, ")")
            }
            Op::FieldGet {
                dest,
                object: Some(obj),
                field,
            } => write!(f, "iget v{dest}, v{obj}, field#{}", field.0),
            Op::FieldGet {
                dest,
                object: None,
                field,
            } => write!(f, "sget v{dest}, field#{}", field.0),
            Op::FieldPut {
                src,
                object: Some(obj),
                field,
            } => write!(f, "iput v{src}, v{obj}, field#{}", field.0),
            Op::FieldPut {
                src,
                object: None,
                field,
            } => write!(f, "sput v{src}, field#{}", field.0),
            Op::MonitorEnter { src } => write!(f, "monitor-enter v{src}"),
            Op::MonitorExit { src } => write!(f, "monitor-exit v{src}"),
            Op::Goto => write!(f, "goto"),
            Op::If { cond, src1, src2 } => match src2 {
                Some(src2) => write!(f, "{cond} v{src1}, v{src2}"),
                None => write!(f, "{cond} v{src1}"),
            },
            Op::Switch { src } => write!(f, "packed-switch v{src}"),
            Op::Return { src: Some(src) } => write!(f, "return v{src}"),
            Op::Return { src: None } => write!(f, "return-void"),
            Op::Throw { src } => write!(f, "throw v{src}"),
        }
    }
}
