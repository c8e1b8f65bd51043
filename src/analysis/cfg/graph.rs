//! Control Flow Graph implementation.
//!
//! This module provides the [`ControlFlowGraph`] structure that lifts a
//! linear method body into basic blocks and flattens it back, plus the
//! block-level mutation primitives passes use to rewrite control flow.

use std::fmt;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::{
    analysis::cfg::block::BasicBlock,
    ir::{Instruction, IrBody, IrEntry, IrInstr, LabelId, Op},
    Error, Result,
};

fn resolve_label(labels: &FxHashMap<LabelId, usize>, label: LabelId) -> Result<usize> {
    labels
        .get(&label)
        .copied()
        .ok_or_else(|| Error::MalformedBody(format!("undefined label {label}")))
}

/// A control-flow graph over one method's instructions.
///
/// Blocks live in id-indexed slots; removing a block empties its slot but
/// never renumbers the survivors, so block ids are stable from construction
/// and every deterministic traversal is keyed on them. The designated entry
/// block is the block opening the method body.
///
/// # Construction and lifetime
///
/// A CFG is derived from the linear IR when a pass starts working on a
/// method ([`build`](Self::build)) and serialized back when it is done
/// ([`flatten`](Self::flatten)). A pass may not retain a CFG across pass
/// boundaries.
///
/// # Construction normalizations
///
/// - Fallthrough block endings are materialized as explicit `goto`s.
/// - Conditional branches get `[taken, fallthrough]` successor lists;
///   switches get `[fallthrough, case₀, case₁, …]`.
/// - Blocks unreachable from the entry are dropped.
///
/// `flatten` reverses these: it lays blocks out greedily along fallthrough
/// chains (then remaining blocks in id order), elides `goto`s to the next
/// emitted block, and emits labels only for branch-target blocks. Building
/// the flattened body again preserves path semantics exactly;
/// single-predecessor fallthrough chains may coalesce, after which
/// `flatten ∘ build` is a fixpoint.
#[derive(Debug, Clone)]
pub struct ControlFlowGraph {
    blocks: Vec<Option<BasicBlock>>,
    entry: usize,
}

impl ControlFlowGraph {
    /// Lifts a linear method body into a control-flow graph.
    ///
    /// Block ids are assigned in first-encounter order over the entry
    /// stream. Consecutive labels alias one block.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedBody`] if the body is empty, a label is
    /// defined twice or never defined, a branch carries the wrong number of
    /// targets, or control falls off the end of the body.
    pub fn build(body: &IrBody) -> Result<Self> {
        if body.is_empty() {
            return Err(Error::MalformedBody("empty method body".to_string()));
        }

        // Carve the entry stream into leader-delimited instruction runs.
        let mut drafts: Vec<Vec<IrInstr>> = Vec::new();
        let mut labels: FxHashMap<LabelId, usize> = FxHashMap::default();
        let mut current: Option<usize> = None;

        for entry in body.entries() {
            match entry {
                IrEntry::Label(label) => {
                    let id = match current {
                        Some(id) if drafts[id].is_empty() => id,
                        _ => {
                            drafts.push(Vec::new());
                            drafts.len() - 1
                        }
                    };
                    if labels.insert(*label, id).is_some() {
                        return Err(Error::MalformedBody(format!(
                            "label {label} defined more than once"
                        )));
                    }
                    current = Some(id);
                }
                IrEntry::Instr(ir) => {
                    let id = match current {
                        Some(id) => id,
                        None => {
                            drafts.push(Vec::new());
                            drafts.len() - 1
                        }
                    };
                    match ir.insn.expected_targets() {
                        Some(expected) if ir.targets.len() != expected => {
                            return Err(Error::MalformedBody(format!(
                                "`{}` expects {} target(s), found {}",
                                ir.insn,
                                expected,
                                ir.targets.len()
                            )));
                        }
                        None if ir.targets.is_empty() => {
                            return Err(Error::MalformedBody(format!(
                                "`{}` expects at least one target",
                                ir.insn
                            )));
                        }
                        _ => {}
                    }
                    drafts[id].push(ir.clone());
                    current = if ir.insn.is_terminator() { None } else { Some(id) };
                }
            }
        }

        // Materialize blocks: resolve labels, normalize fallthroughs.
        let draft_count = drafts.len();
        let next_draft = |id: usize| -> Result<usize> {
            if id + 1 < draft_count {
                Ok(id + 1)
            } else {
                Err(Error::MalformedBody(
                    "method body falls off the end".to_string(),
                ))
            }
        };

        let mut blocks: Vec<Option<BasicBlock>> = Vec::with_capacity(draft_count);
        for (id, draft) in drafts.iter().enumerate() {
            let Some((tail, head)) = draft.split_last() else {
                return Err(Error::MalformedBody(
                    "label at end of body with no instructions".to_string(),
                ));
            };

            let mut block = BasicBlock::new(id);
            for ir in head {
                block.push_instruction(ir.insn.clone());
            }

            let mut succs: Vec<usize> = Vec::new();
            if tail.insn.is_terminator() {
                block.push_instruction(tail.insn.clone());
                match tail.insn.op() {
                    Op::Goto => succs.push(resolve_label(&labels, tail.targets[0])?),
                    Op::If { .. } => {
                        succs.push(resolve_label(&labels, tail.targets[0])?);
                        succs.push(next_draft(id)?);
                    }
                    Op::Switch { .. } => {
                        succs.push(next_draft(id)?);
                        for target in &tail.targets {
                            succs.push(resolve_label(&labels, *target)?);
                        }
                    }
                    _ => {}
                }
            } else {
                // Run closed by a label or the end of the body: make the
                // fallthrough explicit.
                block.push_instruction(tail.insn.clone());
                block.push_instruction(Instruction::new(Op::Goto));
                succs.push(next_draft(id)?);
            }

            *block.successors_mut() = succs;
            blocks.push(Some(block));
        }

        let mut cfg = Self { blocks, entry: 0 };
        cfg.drop_unreachable();
        cfg.recompute_predecessors();
        Ok(cfg)
    }

    fn drop_unreachable(&mut self) {
        let mut reachable = vec![false; self.blocks.len()];
        let mut work = vec![self.entry];
        reachable[self.entry] = true;
        while let Some(id) = work.pop() {
            let succs: Vec<usize> = self
                .block(id)
                .map(|b| b.successors().to_vec())
                .unwrap_or_default();
            for succ in succs {
                if !reachable[succ] {
                    reachable[succ] = true;
                    work.push(succ);
                }
            }
        }
        for (id, slot) in self.blocks.iter_mut().enumerate() {
            if !reachable[id] {
                *slot = None;
            }
        }
    }

    fn recompute_predecessors(&mut self) {
        let edges: Vec<(usize, usize)> = self
            .blocks
            .iter()
            .flatten()
            .flat_map(|b| {
                let id = b.id();
                b.successors().iter().map(move |&s| (id, s))
            })
            .collect();
        for block in self.blocks.iter_mut().flatten() {
            block.predecessors_mut().clear();
        }
        for (from, to) in edges {
            if let Some(block) = self.blocks.get_mut(to).and_then(Option::as_mut) {
                block.predecessors_mut().push(from);
            }
        }
    }

    /// The entry block id.
    #[must_use]
    pub fn entry(&self) -> usize {
        self.entry
    }

    /// Looks up a live block by id.
    #[must_use]
    pub fn block(&self, id: usize) -> Option<&BasicBlock> {
        self.blocks.get(id).and_then(Option::as_ref)
    }

    /// Mutable lookup of a live block by id.
    pub fn block_mut(&mut self, id: usize) -> Option<&mut BasicBlock> {
        self.blocks.get_mut(id).and_then(Option::as_mut)
    }

    /// Iterates live blocks in ascending id order.
    pub fn blocks(&self) -> impl Iterator<Item = &BasicBlock> {
        self.blocks.iter().flatten()
    }

    /// The ids of live blocks in ascending order.
    #[must_use]
    pub fn block_ids(&self) -> Vec<usize> {
        self.blocks
            .iter()
            .enumerate()
            .filter_map(|(id, slot)| slot.as_ref().map(|_| id))
            .collect()
    }

    /// Number of live blocks.
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.blocks.iter().flatten().count()
    }

    /// Adds a new block with the given instructions and successor list,
    /// returning its id.
    ///
    /// # Errors
    ///
    /// Returns an invariant violation if a named successor does not exist.
    pub fn add_block(
        &mut self,
        instructions: Vec<Instruction>,
        succs: Vec<usize>,
    ) -> Result<usize> {
        for &succ in &succs {
            if self.block(succ).is_none() {
                return Err(invariant_error!("successor B{succ} does not exist"));
            }
        }
        let id = self.blocks.len();
        let mut block = BasicBlock::new(id);
        for insn in instructions {
            block.push_instruction(insn);
        }
        *block.successors_mut() = succs.clone();
        self.blocks.push(Some(block));
        for succ in succs {
            if let Some(block) = self.blocks.get_mut(succ).and_then(Option::as_mut) {
                block.predecessors_mut().push(id);
            }
        }
        Ok(id)
    }

    /// Redirects every `pred → old` edge to `pred → new`.
    ///
    /// Returns the number of edges redirected (a switch may carry several).
    /// Predecessor lists of `old` and `new` are kept in sync.
    ///
    /// # Errors
    ///
    /// Returns an invariant violation if any of the three blocks is missing.
    pub fn retarget_edge(&mut self, pred: usize, old: usize, new: usize) -> Result<usize> {
        if self.block(pred).is_none() || self.block(old).is_none() || self.block(new).is_none() {
            return Err(invariant_error!(
                "retarget references a missing block (pred B{pred}, old B{old}, new B{new})"
            ));
        }
        let redirected = match self.blocks.get_mut(pred).and_then(Option::as_mut) {
            Some(block) => block.redirect_successor(old, new),
            None => 0,
        };
        if redirected == 0 {
            return Ok(0);
        }
        if let Some(block) = self.blocks.get_mut(old).and_then(Option::as_mut) {
            let mut remaining = redirected;
            block.predecessors_mut().retain(|&p| {
                if p == pred && remaining > 0 {
                    remaining -= 1;
                    false
                } else {
                    true
                }
            });
        }
        if let Some(block) = self.blocks.get_mut(new).and_then(Option::as_mut) {
            for _ in 0..redirected {
                block.predecessors_mut().push(pred);
            }
        }
        Ok(redirected)
    }

    /// Removes a block that no longer has predecessors.
    ///
    /// # Errors
    ///
    /// Returns an invariant violation if the block is the entry, does not
    /// exist, or still has incoming edges.
    pub fn remove_block(&mut self, id: usize) -> Result<()> {
        if id == self.entry {
            return Err(invariant_error!("cannot remove the entry block B{id}"));
        }
        match self.block(id) {
            None => return Err(invariant_error!("block B{id} does not exist")),
            Some(block) if !block.predecessors().is_empty() => {
                return Err(invariant_error!(
                    "cannot remove block B{id}: it still has predecessors"
                ));
            }
            Some(_) => {}
        }
        let removed = self.blocks.get_mut(id).and_then(Option::take);
        if let Some(block) = removed {
            for &succ in block.successors() {
                if let Some(sblock) = self.blocks.get_mut(succ).and_then(Option::as_mut) {
                    if let Some(pos) = sblock.predecessors().iter().position(|&p| p == id) {
                        sblock.predecessors_mut().remove(pos);
                    }
                }
            }
        }
        Ok(())
    }

    /// Replaces a block's terminator and successor list in one step.
    ///
    /// # Errors
    ///
    /// Returns an invariant violation if the block or a successor is
    /// missing, or if `terminator` is not a terminator instruction.
    pub fn replace_terminator(
        &mut self,
        id: usize,
        terminator: Instruction,
        succs: Vec<usize>,
    ) -> Result<()> {
        if !terminator.is_terminator() {
            return Err(invariant_error!(
                "`{terminator}` is not a terminator instruction"
            ));
        }
        if self.block(id).is_none() {
            return Err(invariant_error!("block B{id} does not exist"));
        }
        for &succ in &succs {
            if self.block(succ).is_none() {
                return Err(invariant_error!("successor B{succ} does not exist"));
            }
        }

        let old_succs = self
            .block(id)
            .map(|b| b.successors().to_vec())
            .unwrap_or_default();
        for &succ in &old_succs {
            if let Some(block) = self.blocks.get_mut(succ).and_then(Option::as_mut) {
                if let Some(pos) = block.predecessors().iter().position(|&p| p == id) {
                    block.predecessors_mut().remove(pos);
                }
            }
        }
        if let Some(block) = self.blocks.get_mut(id).and_then(Option::as_mut) {
            if block.terminator().is_some_and(Instruction::is_terminator) {
                block.instructions_mut().pop();
            }
            block.push_instruction(terminator);
            *block.successors_mut() = succs.clone();
        }
        for &succ in &succs {
            if let Some(block) = self.blocks.get_mut(succ).and_then(Option::as_mut) {
                block.predecessors_mut().push(id);
            }
        }
        Ok(())
    }

    /// Checks the structural invariants of the graph.
    ///
    /// A violation here is a fatal pass-internal error — a compiler must not
    /// emit silently-wrong code.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvariantViolation`] on a dangling edge, a missing
    /// or misplaced terminator, an out-of-sync predecessor list, or a
    /// predecessor-less non-entry block.
    pub fn validate(&self) -> Result<()> {
        if self.block(self.entry).is_none() {
            return Err(invariant_error!("entry block B{} is missing", self.entry));
        }
        for block in self.blocks() {
            for &succ in block.successors() {
                if self.block(succ).is_none() {
                    return Err(invariant_error!(
                        "dangling edge B{} -> B{succ}",
                        block.id()
                    ));
                }
            }
            match block.terminator() {
                Some(t) if t.is_terminator() => {}
                _ => {
                    return Err(invariant_error!(
                        "block B{} does not end in a terminator",
                        block.id()
                    ));
                }
            }
            let body_len = block.instruction_count().saturating_sub(1);
            if block.instructions()[..body_len]
                .iter()
                .any(Instruction::is_terminator)
            {
                return Err(invariant_error!(
                    "block B{} has a terminator before its last instruction",
                    block.id()
                ));
            }
        }

        let mut incoming: FxHashMap<usize, Vec<usize>> = FxHashMap::default();
        for block in self.blocks() {
            for &succ in block.successors() {
                incoming.entry(succ).or_default().push(block.id());
            }
        }
        for block in self.blocks() {
            let mut expected = incoming.remove(&block.id()).unwrap_or_default();
            expected.sort_unstable();
            let mut actual = block.predecessors().to_vec();
            actual.sort_unstable();
            if expected != actual {
                return Err(invariant_error!(
                    "predecessor list of B{} is out of sync with the edge set",
                    block.id()
                ));
            }
            if block.id() != self.entry && actual.is_empty() {
                return Err(invariant_error!(
                    "non-entry block B{} has no predecessors",
                    block.id()
                ));
            }
        }
        Ok(())
    }

    fn layout_order(&self) -> Vec<usize> {
        let live = self.block_ids();
        let mut placed: FxHashSet<usize> = FxHashSet::default();
        let mut order = Vec::with_capacity(live.len());
        let mut cursor = Some(self.entry);
        loop {
            let cur = match cursor.take() {
                Some(c) if !placed.contains(&c) => c,
                _ => match live.iter().copied().find(|id| !placed.contains(id)) {
                    Some(id) => id,
                    None => break,
                },
            };
            placed.insert(cur);
            order.push(cur);
            cursor = self.block(cur).and_then(|b| match b.terminator().map(Instruction::op) {
                Some(Op::If { .. }) => b.successors().get(1).copied(),
                Some(Op::Switch { .. } | Op::Goto) => b.successors().first().copied(),
                _ => None,
            });
        }
        order
    }

    /// Serializes the graph back into a linear method body.
    ///
    /// The layout is canonical and deterministic: greedy fallthrough chains
    /// starting from the entry, remaining blocks in ascending id order.
    /// `goto`s to the immediately following block are elided; labels are
    /// emitted only for blocks that remain branch targets and are numbered
    /// sequentially in emission order, so identical graphs flatten to
    /// byte-identical bodies.
    #[must_use]
    pub fn flatten(&self) -> IrBody {
        let order = self.layout_order();

        let mut needs_label: FxHashSet<usize> = FxHashSet::default();
        for (pos, &id) in order.iter().enumerate() {
            let next = order.get(pos + 1).copied();
            let Some(block) = self.block(id) else { continue };
            let succs = block.successors();
            match block.terminator().map(Instruction::op) {
                Some(Op::Goto) => {
                    if next != succs.first().copied() {
                        needs_label.insert(succs[0]);
                    }
                }
                Some(Op::If { .. }) => {
                    needs_label.insert(succs[0]);
                    if next != succs.get(1).copied() {
                        needs_label.insert(succs[1]);
                    }
                }
                Some(Op::Switch { .. }) => {
                    for &case in &succs[1..] {
                        needs_label.insert(case);
                    }
                    if next != succs.first().copied() {
                        needs_label.insert(succs[0]);
                    }
                }
                _ => {}
            }
        }

        // Number labels in emission order for a canonical result.
        let mut label_map: FxHashMap<usize, LabelId> = FxHashMap::default();
        for &id in &order {
            if needs_label.contains(&id) {
                let label = LabelId(u32::try_from(label_map.len()).unwrap_or(u32::MAX));
                label_map.insert(id, label);
            }
        }
        let label_of = |id: usize| -> LabelId {
            label_map.get(&id).copied().unwrap_or(LabelId(u32::MAX))
        };

        let mut body = IrBody::new();
        for (pos, &id) in order.iter().enumerate() {
            let next = order.get(pos + 1).copied();
            let Some(block) = self.block(id) else { continue };
            if needs_label.contains(&id) {
                body.push_label(label_of(id));
            }
            let body_len = block.instruction_count().saturating_sub(1);
            for insn in &block.instructions()[..body_len] {
                body.push(insn.clone());
            }
            let Some(term) = block.terminator() else { continue };
            let succs = block.successors();
            match term.op() {
                Op::Goto => {
                    if next != succs.first().copied() {
                        body.push_branch(term.clone(), vec![label_of(succs[0])]);
                    }
                }
                Op::If { .. } => {
                    body.push_branch(term.clone(), vec![label_of(succs[0])]);
                    if next != succs.get(1).copied() {
                        body.push_branch(Instruction::new(Op::Goto), vec![label_of(succs[1])]);
                    }
                }
                Op::Switch { .. } => {
                    body.push_branch(
                        term.clone(),
                        succs[1..].iter().map(|&case| label_of(case)).collect(),
                    );
                    if next != succs.first().copied() {
                        body.push_branch(Instruction::new(Op::Goto), vec![label_of(succs[0])]);
                    }
                }
                _ => body.push(term.clone()),
            }
        }
        body
    }
}

impl fmt::Display for ControlFlowGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "CFG (entry B{}, {} blocks)", self.entry, self.block_count())?;
        for block in self.blocks() {
            write!(f, "{block}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{MethodBuilder, SymbolTable};

    fn build_from(f: impl FnOnce(&mut MethodBuilder<'_>)) -> ControlFlowGraph {
        let symbols = SymbolTable::new();
        let body = MethodBuilder::new(&symbols).build_with(f);
        ControlFlowGraph::build(&body).unwrap()
    }

    #[test]
    fn test_build_straight_line() {
        let cfg = build_from(|m| {
            m.const_(0, 1);
            m.add(0, 0, 0);
            m.ret(0);
        });
        assert_eq!(cfg.block_count(), 1);
        assert_eq!(cfg.entry(), 0);
        let entry = cfg.block(0).unwrap();
        assert_eq!(entry.instruction_count(), 3);
        assert!(entry.successors().is_empty());
    }

    #[test]
    fn test_build_branch_successor_order() {
        let cfg = build_from(|m| {
            m.const_(0, 0);
            m.if_eqz(0, "taken");
            m.const_(1, 1);
            m.label("taken");
            m.ret_void();
        });
        // B0 = entry, B1 = fallthrough, B2 = taken target.
        let entry = cfg.block(0).unwrap();
        assert_eq!(entry.successors(), &[2, 1]);
        assert_eq!(cfg.block(2).unwrap().predecessors().len(), 2);
    }

    #[test]
    fn test_build_materializes_fallthrough_goto() {
        let cfg = build_from(|m| {
            m.const_(0, 0);
            m.label("next");
            m.ret_void();
        });
        // The label split forces an explicit goto at the end of the entry.
        let entry = cfg.block(0).unwrap();
        assert_eq!(entry.terminator().unwrap().op(), &Op::Goto);
        assert_eq!(entry.successors(), &[1]);
    }

    #[test]
    fn test_build_switch_successors() {
        let cfg = build_from(|m| {
            m.const_(0, 0);
            m.switch(0, &["a", "b"]);
            m.ret_void();
            m.label("a");
            m.ret(0);
            m.label("b");
            m.ret(0);
        });
        let entry = cfg.block(0).unwrap();
        // [fallthrough, case a, case b]
        assert_eq!(entry.successors(), &[1, 2, 3]);
    }

    #[test]
    fn test_build_drops_unreachable_blocks() {
        let cfg = build_from(|m| {
            m.const_(0, 0);
            m.ret(0);
            // Unlabeled, unreachable tail.
            m.const_(1, 1);
            m.ret(1);
        });
        assert_eq!(cfg.block_count(), 1);
    }

    #[test]
    fn test_build_rejects_undefined_label() {
        let mut body = IrBody::new();
        body.push_branch(Instruction::new(Op::Goto), vec![LabelId(99)]);
        assert!(matches!(
            ControlFlowGraph::build(&body),
            Err(Error::MalformedBody(_))
        ));
    }

    #[test]
    fn test_build_rejects_fall_off_end() {
        let mut body = IrBody::new();
        body.push(Instruction::new(Op::Const { dest: 0, value: 0 }));
        assert!(matches!(
            ControlFlowGraph::build(&body),
            Err(Error::MalformedBody(_))
        ));
    }

    #[test]
    fn test_retarget_edge_updates_predecessors() {
        let mut cfg = build_from(|m| {
            m.const_(0, 0);
            m.if_eqz(0, "a");
            m.ret_void();
            m.label("a");
            m.ret(0);
        });
        // entry=B0, fallthrough=B1, taken=B2
        let redirected = cfg.retarget_edge(0, 2, 1).unwrap();
        assert_eq!(redirected, 1);
        assert_eq!(cfg.block(0).unwrap().successors(), &[1, 1]);
        assert!(cfg.block(2).unwrap().predecessors().is_empty());
        assert_eq!(cfg.block(1).unwrap().predecessors().len(), 2);
    }

    #[test]
    fn test_remove_block_requires_no_predecessors() {
        let mut cfg = build_from(|m| {
            m.const_(0, 0);
            m.if_eqz(0, "a");
            m.ret_void();
            m.label("a");
            m.ret(0);
        });
        assert!(cfg.remove_block(2).is_err());
        cfg.retarget_edge(0, 2, 1).unwrap();
        cfg.remove_block(2).unwrap();
        assert_eq!(cfg.block_count(), 2);
        cfg.validate().unwrap();
    }

    #[test]
    fn test_validate_detects_dangling_edge() {
        let mut cfg = build_from(|m| {
            m.const_(0, 0);
            m.goto_("a");
            m.label("a");
            m.ret(0);
        });
        // Corrupt the graph directly.
        cfg.block_mut(0)
            .unwrap()
            .successors_mut()
            .push(42);
        assert!(matches!(
            cfg.validate(),
            Err(Error::InvariantViolation { .. })
        ));
    }

    #[test]
    fn test_flatten_roundtrip_is_stable() {
        let cfg = build_from(|m| {
            m.const_(0, 0);
            m.if_eqz(0, "d");
            m.mul(0, 0, 0);
            m.goto_("c");
            m.label("e");
            m.ret_void();
            m.label("c");
            m.add(0, 0, 0);
            m.goto_("e");
            m.label("d");
            m.add(0, 0, 0);
            m.goto_("e");
        });
        let flat = cfg.flatten();
        let rebuilt = ControlFlowGraph::build(&flat).unwrap();
        rebuilt.validate().unwrap();
        // The flattened form is a fixpoint of flatten ∘ build.
        assert_eq!(rebuilt.flatten(), flat);
    }

    #[test]
    fn test_flatten_elides_fallthrough_goto() {
        let cfg = build_from(|m| {
            m.const_(0, 0);
            m.goto_("a");
            m.label("a");
            m.ret(0);
        });
        let flat = cfg.flatten();
        // goto to the next block is elided, label dropped.
        assert!(flat.instructions().all(|i| i.op() != &Op::Goto));
        assert_eq!(flat.len(), 2);
    }

    #[test]
    fn test_flatten_loop_emits_entry_label() {
        let cfg = build_from(|m| {
            m.label("top");
            m.add(0, 0, 0);
            m.if_nez(0, "top");
            m.ret_void();
        });
        let flat = cfg.flatten();
        let rebuilt = ControlFlowGraph::build(&flat).unwrap();
        rebuilt.validate().unwrap();
        assert_eq!(rebuilt.block_count(), cfg.block_count());
    }
}
