//! Linear method bodies: labeled instruction streams.
//!
//! The linear IR is the at-rest representation owned by the program store.
//! It is an ordered sequence of entries, each either a label definition or an
//! instruction with its branch-target labels. Passes lift a body into a
//! [`ControlFlowGraph`](crate::analysis::ControlFlowGraph) on entry and
//! flatten it back on exit; a pass may not retain CFG references across pass
//! boundaries.

use std::fmt;

use crate::ir::instruction::Instruction;

/// A label in a linear method body.
///
/// Labels are method-local; branch instructions reference them as targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LabelId(pub u32);

impl fmt::Display for LabelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ":L{}", self.0)
    }
}

/// An instruction in linear form, with its branch-target labels.
///
/// `targets` is non-empty only for `goto`, conditional branches, and
/// switches. For branches the single entry is the taken target; for switches
/// the entries are the case targets in table order. Fallthrough is implicit:
/// the next entry in the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IrInstr {
    /// The instruction itself.
    pub insn: Instruction,
    /// Branch-target labels, empty for non-branching instructions.
    pub targets: Vec<LabelId>,
}

/// One entry of a linear method body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IrEntry {
    /// Defines a label at this position.
    Label(LabelId),
    /// An instruction.
    Instr(IrInstr),
}

/// A linear method body.
///
/// # Examples
///
/// ```rust
/// use dexscope::ir::{IrBody, Instruction, LabelId, Op};
///
/// let mut body = IrBody::new();
/// body.push(Instruction::new(Op::Const { dest: 0, value: 1 }));
/// body.push_branch(Instruction::new(Op::Goto), vec![LabelId(0)]);
/// body.push_label(LabelId(0));
/// body.push(Instruction::new(Op::Return { src: None }));
/// assert_eq!(body.instruction_count(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IrBody {
    entries: Vec<IrEntry>,
}

impl IrBody {
    /// Creates an empty body.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the entries in order.
    #[must_use]
    pub fn entries(&self) -> &[IrEntry] {
        &self.entries
    }

    /// Returns true if the body has no entries.
    ///
    /// Abstract and native methods carry empty bodies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the number of entries (labels included).
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns the number of instruction entries.
    #[must_use]
    pub fn instruction_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e, IrEntry::Instr(_)))
            .count()
    }

    /// Appends a label definition.
    pub fn push_label(&mut self, label: LabelId) {
        self.entries.push(IrEntry::Label(label));
    }

    /// Appends a non-branching instruction.
    pub fn push(&mut self, insn: Instruction) {
        self.entries.push(IrEntry::Instr(IrInstr {
            insn,
            targets: Vec::new(),
        }));
    }

    /// Appends a branching instruction with its target labels.
    pub fn push_branch(&mut self, insn: Instruction, targets: Vec<LabelId>) {
        self.entries.push(IrEntry::Instr(IrInstr { insn, targets }));
    }

    /// Iterates over the instructions, skipping labels.
    pub fn instructions(&self) -> impl Iterator<Item = &Instruction> {
        self.entries.iter().filter_map(|e| match e {
            IrEntry::Instr(i) => Some(&i.insn),
            IrEntry::Label(_) => None,
        })
    }
}

impl fmt::Display for IrBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            match entry {
                IrEntry::Label(label) => writeln!(f, "{label}")?,
                IrEntry::Instr(ir) => {
                    write!(f, "  {}", ir.insn)?;
                    for (i, target) in ir.targets.iter().enumerate() {
                        if i == 0 {
                            write!(f, " -> ")?;
                        } else {
                            write!(f, ", ")?;
                        }
                        write!(f, "{target}")?;
                    }
                    writeln!(f)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Op;

    #[test]
    fn test_empty_body() {
        let body = IrBody::new();
        assert!(body.is_empty());
        assert_eq!(body.instruction_count(), 0);
    }

    #[test]
    fn test_push_and_count() {
        let mut body = IrBody::new();
        body.push(Instruction::new(Op::Const { dest: 0, value: 0 }));
        body.push_label(LabelId(0));
        body.push(Instruction::new(Op::Return { src: Some(0) }));

        assert_eq!(body.len(), 3);
        assert_eq!(body.instruction_count(), 2);
        assert_eq!(body.instructions().count(), 2);
    }

    #[test]
    fn test_display_with_targets() {
        let mut body = IrBody::new();
        body.push_branch(
            Instruction::new(Op::If {
                cond: crate::ir::IfCond::Eqz,
                src1: 0,
                src2: None,
            }),
            vec![LabelId(2)],
        );
        body.push_label(LabelId(2));
        body.push(Instruction::new(Op::Return { src: None }));

        let rendered = body.to_string();
        assert!(rendered.contains("if-eqz v0 -> :L2"));
        assert!(rendered.contains(":L2"));
        assert!(rendered.contains("return-void"));
    }
}
