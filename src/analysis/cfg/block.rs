//! Basic blocks: straight-line instruction runs with explicit successors.

use std::fmt;

use crate::ir::Instruction;

/// A basic block in a method's control-flow graph.
///
/// A block is a maximal straight-line run of instructions ending in exactly
/// one terminator. The terminator is always materialized as the last
/// instruction — fallthroughs become explicit `goto`s during CFG
/// construction, and flattening elides them again where layout permits.
///
/// Successor order is significant:
///
/// - `goto` — `[target]`
/// - conditional branch — `[taken, fallthrough]`
/// - switch — `[fallthrough, case₀, case₁, …]`
/// - `return` / `throw` — `[]`
///
/// The predecessor list carries one entry per incoming edge (a predecessor
/// branching here twice appears twice).
#[derive(Debug, Clone)]
pub struct BasicBlock {
    id: usize,
    instructions: Vec<Instruction>,
    succs: Vec<usize>,
    preds: Vec<usize>,
}

impl BasicBlock {
    /// Creates an empty block with the given id.
    #[must_use]
    pub fn new(id: usize) -> Self {
        Self {
            id,
            instructions: Vec::new(),
            succs: Vec::new(),
            preds: Vec::new(),
        }
    }

    /// Returns the block id.
    ///
    /// Ids are assigned in first-encounter order during CFG construction and
    /// stay stable for the lifetime of the graph, so iterating blocks in id
    /// order is deterministic.
    #[must_use]
    pub fn id(&self) -> usize {
        self.id
    }

    /// The instructions, terminator last.
    #[must_use]
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Mutable access to the instructions.
    pub fn instructions_mut(&mut self) -> &mut Vec<Instruction> {
        &mut self.instructions
    }

    /// Appends an instruction.
    pub fn push_instruction(&mut self, insn: Instruction) {
        self.instructions.push(insn);
    }

    /// Number of instructions (terminator included).
    #[must_use]
    pub fn instruction_count(&self) -> usize {
        self.instructions.len()
    }

    /// The terminator instruction (last in the block).
    #[must_use]
    pub fn terminator(&self) -> Option<&Instruction> {
        self.instructions.last()
    }

    /// The ordered successor list.
    #[must_use]
    pub fn successors(&self) -> &[usize] {
        &self.succs
    }

    /// The predecessor list, one entry per incoming edge.
    #[must_use]
    pub fn predecessors(&self) -> &[usize] {
        &self.preds
    }

    /// The successor *set*: sorted, duplicates removed.
    ///
    /// Block equivalence for deduplication compares successor sets, not
    /// sequences — two branches with swapped arms merge only when both arms
    /// name the same block.
    #[must_use]
    pub fn successor_set(&self) -> Vec<usize> {
        let mut set = self.succs.clone();
        set.sort_unstable();
        set.dedup();
        set
    }

    pub(crate) fn successors_mut(&mut self) -> &mut Vec<usize> {
        &mut self.succs
    }

    pub(crate) fn predecessors_mut(&mut self) -> &mut Vec<usize> {
        &mut self.preds
    }

    /// Replaces every occurrence of `old` in the successor list with `new`.
    ///
    /// Returns the number of edges redirected.
    pub(crate) fn redirect_successor(&mut self, old: usize, new: usize) -> usize {
        let mut redirected = 0;
        for succ in &mut self.succs {
            if *succ == old {
                *succ = new;
                redirected += 1;
            }
        }
        redirected
    }

    /// Structural equivalence: instruction sequences compare equal
    /// element-wise (terminators included) and the successor sets are equal.
    #[must_use]
    pub fn structurally_equal(&self, other: &BasicBlock) -> bool {
        self.instructions == other.instructions && self.successor_set() == other.successor_set()
    }
}

impl fmt::Display for BasicBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "B{}:", self.id)?;
        if !self.succs.is_empty() {
            write!(f, "  ; succs:")?;
            for succ in &self.succs {
                write!(f, " B{succ}")?;
            }
        }
        writeln!(f)?;
        for insn in &self.instructions {
            writeln!(f, "  {insn}")?;
        }
        Ok(())
    }
}
