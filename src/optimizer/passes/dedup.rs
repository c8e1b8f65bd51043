//! Block deduplication: merge structurally identical basic blocks.
//!
//! Over each method's control-flow graph, the pass finds blocks whose
//! instruction sequences, terminators, and successor *sets* coincide, picks
//! the smallest-id member of each equivalence class as representative,
//! retargets every incoming edge of the other members to it, and deletes
//! the now-unreachable copies.
//!
//! # Example
//!
//! Before:
//! ```text
//! B0: if-eqz v0 -> B4       B3: add-int v0, v0, v0 ; goto B2
//! B1: mul-int v0, v0, v0    B4: add-int v0, v0, v0 ; goto B2
//! B2: return-void
//! ```
//!
//! After (B4 merged into B3):
//! ```text
//! B0: if-eqz v0 -> B3
//! B1: mul-int v0, v0, v0
//! B2: return-void
//! B3: add-int v0, v0, v0 ; goto B2
//! ```
//!
//! # Object identity
//!
//! Merging must not conflate distinct objects. A `new-instance` /
//! `move-result-pseudo` / `invoke-direct <init>` sequence designates the
//! construction of one specific object; collapsing two copies is safe only
//! when each copy allocates for itself. A block whose constructor call (or
//! `throw`, or monitor operation) consumes a register defined in a
//! *predecessor* is therefore never merged: the two copies would construct
//! (or throw, or lock) objects produced by distinct predecessors.
//!
//! # Convergence
//!
//! Merging runs to fixpoint per method: blocks that differ only in a
//! trailing `goto` whose targets are themselves equivalent merge one round
//! after their targets do.

use rustc_hash::FxHashSet;

use crate::{
    analysis::cfg::{structural_partition, BasicBlock, ControlFlowGraph},
    config::OptimizerConfig,
    ir::{InvokeKind, Op, SymbolTable},
    optimizer::{
        events::EventKind,
        pass::{Pass, PassContext},
    },
    program::{Method, ProgramStore},
    Error, Result,
};

/// Block deduplication pass.
///
/// Method-local and embarrassingly parallel: methods are processed on a
/// worker pool, each worker owning one method's CFG at a time. The pass
/// declares no property requirements and preserves everything by default.
pub struct DedupBlocksPass;

impl Default for DedupBlocksPass {
    fn default() -> Self {
        Self::new()
    }
}

impl DedupBlocksPass {
    /// Creates a new block deduplication pass.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Checks the object-identity constraint for one block.
    ///
    /// Every register consumed by an identity-sensitive instruction
    /// (`invoke-direct` of `<init>`, `throw`, `monitor-enter`/`exit`) must
    /// be defined earlier in the same block. Blocks in one structural
    /// equivalence class have element-wise identical instructions, so an
    /// in-block definition is automatically the same across the class.
    fn is_identity_safe(block: &BasicBlock, symbols: &SymbolTable) -> bool {
        let mut defined: FxHashSet<u32> = FxHashSet::default();
        for insn in block.instructions() {
            match insn.op() {
                Op::Invoke {
                    kind: InvokeKind::Direct,
                    method,
                    args,
                } if symbols.is_constructor(*method) => {
                    if let Some(receiver) = args.first() {
                        if !defined.contains(receiver) {
                            return false;
                        }
                    }
                }
                Op::Throw { src } | Op::MonitorEnter { src } | Op::MonitorExit { src } => {
                    if !defined.contains(src) {
                        return false;
                    }
                }
                _ => {}
            }
            if let Some(dest) = insn.def() {
                defined.insert(dest);
            }
        }
        true
    }

    /// Refines a hash group into classes of pairwise structural equality.
    ///
    /// Hash groups are candidates only: collisions and successor-sequence
    /// versus successor-set differences are resolved here.
    fn equality_classes(cfg: &ControlFlowGraph, group: &[usize]) -> Vec<Vec<usize>> {
        let mut classes: Vec<Vec<usize>> = Vec::new();
        for &id in group {
            let Some(block) = cfg.block(id) else { continue };
            let found = classes.iter_mut().find(|class| {
                class
                    .first()
                    .and_then(|&rep| cfg.block(rep))
                    .is_some_and(|rep| rep.structurally_equal(block))
            });
            match found {
                Some(class) => class.push(id),
                None => classes.push(vec![id]),
            }
        }
        classes
    }

    /// Runs one merge round over a method's CFG.
    ///
    /// Returns the number of blocks merged away.
    fn merge_round(
        cfg: &mut ControlFlowGraph,
        symbols: &SymbolTable,
        ctx: &PassContext,
        method_name: &str,
    ) -> Result<usize> {
        let partition = structural_partition(cfg);
        let mut merged = 0;

        for group in &partition {
            if ctx.is_cancelled() {
                return Err(Error::Cancelled);
            }
            if group.len() < 2 {
                continue;
            }

            for class in Self::equality_classes(cfg, group) {
                if class.len() < 2 {
                    continue;
                }

                // The entry block is never merged; blocks violating the
                // object-identity constraint drop out of the class.
                let mut eligible: Vec<usize> = Vec::with_capacity(class.len());
                for &id in &class {
                    if id == cfg.entry() {
                        continue;
                    }
                    let Some(block) = cfg.block(id) else { continue };
                    if Self::is_identity_safe(block, symbols) {
                        eligible.push(id);
                    } else {
                        ctx.events
                            .record(EventKind::CandidateSkipped)
                            .method(method_name)
                            .location(id)
                            .message(format!(
                                "B{id} uses an object defined in a predecessor"
                            ));
                    }
                }
                if eligible.len() < 2 {
                    continue;
                }

                // Deterministic representative: the smallest block id.
                let representative = eligible[0];
                for &duplicate in &eligible[1..] {
                    let preds: Vec<usize> = cfg
                        .block(duplicate)
                        .map(|b| b.predecessors().to_vec())
                        .unwrap_or_default();
                    let mut seen: FxHashSet<usize> = FxHashSet::default();
                    for pred in preds {
                        if seen.insert(pred) {
                            cfg.retarget_edge(pred, duplicate, representative)?;
                        }
                    }
                    let orphaned = cfg
                        .block(duplicate)
                        .is_some_and(|b| b.predecessors().is_empty());
                    if orphaned {
                        cfg.remove_block(duplicate)?;
                        ctx.events
                            .record(EventKind::BlockDeduplicated)
                            .method(method_name)
                            .location(duplicate)
                            .message(format!("merged B{duplicate} into B{representative}"));
                        merged += 1;
                    }
                }
            }
        }

        Ok(merged)
    }

    /// Deduplicates one method. Returns true if the body changed.
    fn dedup_method(
        method: &mut Method,
        symbols: &SymbolTable,
        ctx: &PassContext,
    ) -> Result<bool> {
        if method.is_bodyless() {
            return Ok(false);
        }
        let method_name = method.qualified_name(symbols);
        let mut cfg = ControlFlowGraph::build(method.body())?;
        cfg.validate()?;

        let mut changed = false;
        loop {
            let merged = Self::merge_round(&mut cfg, symbols, ctx, &method_name)?;
            if merged == 0 {
                break;
            }
            changed = true;
            cfg.validate()?;
        }

        if changed {
            method.set_body(cfg.flatten());
        }
        Ok(changed)
    }
}

impl Pass for DedupBlocksPass {
    fn name(&self) -> &'static str {
        "dedup-blocks"
    }

    fn description(&self) -> &'static str {
        "Merges structurally identical basic blocks within each method"
    }

    fn run(
        &self,
        store: &mut ProgramStore,
        _config: &OptimizerConfig,
        ctx: &PassContext,
    ) -> Result<()> {
        let symbols = store.symbols_arc();
        store.par_try_for_each_method(|method| {
            if ctx.is_cancelled() {
                return Err(Error::Cancelled);
            }
            Self::dedup_method(method, &symbols, ctx)?;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{atomic::AtomicBool, Arc};

    use rustc_hash::FxHashSet as PropertySet;

    use super::*;
    use crate::ir::{MethodBuilder, SymbolTable};

    fn test_context() -> PassContext {
        PassContext::new(Arc::new(AtomicBool::new(false)), PropertySet::default())
    }

    fn cfg_from(symbols: &SymbolTable, f: impl FnOnce(&mut MethodBuilder<'_>)) -> ControlFlowGraph {
        let body = MethodBuilder::new(symbols).build_with(f);
        ControlFlowGraph::build(&body).unwrap()
    }

    #[test]
    fn test_merge_round_merges_identical_blocks() {
        let symbols = SymbolTable::new();
        let mut cfg = cfg_from(&symbols, |m| {
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
        let ctx = test_context();

        let before = cfg.block_count();
        let merged =
            DedupBlocksPass::merge_round(&mut cfg, &symbols, &ctx, "LtestClass;.m").unwrap();
        assert_eq!(merged, 1);
        assert_eq!(cfg.block_count(), before - 1);
        cfg.validate().unwrap();

        // The branch edge that pointed at B4 now points at B3.
        assert_eq!(cfg.block(0).unwrap().successors(), &[3, 1]);
        assert!(cfg.block(4).is_none());
    }

    #[test]
    fn test_entry_block_never_merges() {
        let symbols = SymbolTable::new();
        // Entry and :copy have identical code and the same successor.
        let mut cfg = cfg_from(&symbols, |m| {
            m.add(0, 0, 0);
            m.goto_("exit");
            m.label("copy");
            m.add(0, 0, 0);
            m.goto_("exit");
            m.label("exit");
            m.if_nez(0, "copy");
            m.ret_void();
        });
        let ctx = test_context();
        let _ = DedupBlocksPass::merge_round(&mut cfg, &symbols, &ctx, "LtestClass;.m").unwrap();
        // The entry survives; the copy had a predecessor and stays live
        // only if something still reaches it — either way the entry must
        // still exist and remain the entry.
        assert!(cfg.block(cfg.entry()).is_some());
        cfg.validate().unwrap();
    }

    #[test]
    fn test_identity_safe_allocation_in_block() {
        let symbols = SymbolTable::new();
        let cfg = cfg_from(&symbols, |m| {
            m.new_instance("LtestClass;");
            m.move_result_pseudo(0);
            m.invoke_direct("LtestClass;", "<init>", &[0]);
            m.throw(0);
        });
        let block = cfg.block(0).unwrap();
        assert!(DedupBlocksPass::is_identity_safe(block, &symbols));
    }

    #[test]
    fn test_identity_unsafe_constructor_from_predecessor() {
        let symbols = SymbolTable::new();
        let cfg = cfg_from(&symbols, |m| {
            m.new_instance("LtestClass;");
            m.move_result_pseudo(0);
            m.if_eqz(0, "c");
            m.invoke_direct("LtestClass;", "<init>", &[0]);
            m.throw(0);
            m.label("c");
            m.invoke_direct("LtestClass;", "<init>", &[0]);
            m.throw(0);
        });
        // B1 and B2 invoke <init> on a register defined in B0.
        assert!(!DedupBlocksPass::is_identity_safe(
            cfg.block(1).unwrap(),
            &symbols
        ));
        assert!(!DedupBlocksPass::is_identity_safe(
            cfg.block(2).unwrap(),
            &symbols
        ));
    }

    #[test]
    fn test_identity_unsafe_throw_of_foreign_register() {
        let symbols = SymbolTable::new();
        let cfg = cfg_from(&symbols, |m| {
            m.const_(0, 0);
            m.if_eqz(0, "t");
            m.ret_void();
            m.label("t");
            m.throw(0);
        });
        assert!(!DedupBlocksPass::is_identity_safe(
            cfg.block(2).unwrap(),
            &symbols
        ));
    }

    #[test]
    fn test_goto_chain_converges_in_two_rounds() {
        let symbols = SymbolTable::new();
        // Two gotos to two equivalent return blocks: the returns merge in
        // round one, the gotos in round two.
        let mut cfg = cfg_from(&symbols, |m| {
            m.const_(0, 0);
            m.if_eqz(0, "b");
            m.goto_("x");
            m.label("b");
            m.goto_("y");
            m.label("x");
            m.ret(0);
            m.label("y");
            m.ret(0);
        });
        let ctx = test_context();

        let first =
            DedupBlocksPass::merge_round(&mut cfg, &symbols, &ctx, "LtestClass;.m").unwrap();
        let second =
            DedupBlocksPass::merge_round(&mut cfg, &symbols, &ctx, "LtestClass;.m").unwrap();
        let third =
            DedupBlocksPass::merge_round(&mut cfg, &symbols, &ctx, "LtestClass;.m").unwrap();

        assert_eq!(first, 1);
        assert_eq!(second, 1);
        assert_eq!(third, 0);
        assert_eq!(cfg.block_count(), 3);
        cfg.validate().unwrap();
    }

    #[test]
    fn test_cancellation_checked_at_group_boundaries() {
        let symbols = SymbolTable::new();
        let mut cfg = cfg_from(&symbols, |m| {
            m.const_(0, 0);
            m.ret(0);
        });
        let cancel = Arc::new(AtomicBool::new(true));
        let ctx = PassContext::new(cancel, PropertySet::default());
        let result = DedupBlocksPass::merge_round(&mut cfg, &symbols, &ctx, "LtestClass;.m");
        assert!(matches!(result, Err(Error::Cancelled)));
    }
}
