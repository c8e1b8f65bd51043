//! Builder pattern for programmatic method-body construction.
//!
//! This module provides a fluent API for building linear method bodies
//! without the boilerplate of manual label and symbol-id management. It's
//! useful for:
//!
//! - Writing unit tests for CFG transforms and passes
//! - Programmatic IR construction in tooling
//! - Creating fixtures for schedule and store tests
//!
//! # Design
//!
//! The builder uses a closure-based API where the whole body is emitted
//! within a single expression, making the control-flow structure visually
//! clear. Labels are named strings, interned on first use:
//!
//! ```rust
//! use dexscope::ir::{MethodBuilder, SymbolTable};
//!
//! let symbols = SymbolTable::new();
//! let body = MethodBuilder::new(&symbols).build_with(|m| {
//!     m.const_(0, 0);
//!     m.if_eqz(0, "done");
//!     m.add(0, 0, 0);
//!     m.label("done");
//!     m.ret(0);
//! });
//! assert_eq!(body.instruction_count(), 4);
//! ```

use rustc_hash::FxHashMap;

use crate::ir::{
    body::{IrBody, LabelId},
    instruction::{Instruction, Op},
    opcode::{BinaryOp, IfCond, InvokeKind},
    symbols::SymbolTable,
};

/// Builder for constructing linear method bodies programmatically.
///
/// Labels are referenced by name; a name may be used as a branch target
/// before its [`label`](Self::label) definition is emitted. Symbol operands
/// (types, methods, fields, strings) are interned through the shared
/// [`SymbolTable`] as they are referenced.
#[derive(Debug)]
pub struct MethodBuilder<'a> {
    symbols: &'a SymbolTable,
    body: IrBody,
    labels: FxHashMap<String, LabelId>,
    next_label: u32,
}

impl<'a> MethodBuilder<'a> {
    /// Creates a new builder that interns symbols into `symbols`.
    #[must_use]
    pub fn new(symbols: &'a SymbolTable) -> Self {
        Self {
            symbols,
            body: IrBody::new(),
            labels: FxHashMap::default(),
            next_label: 0,
        }
    }

    /// Builds the body using a closure that emits all entries.
    ///
    /// This is the primary API - the whole body is emitted within the
    /// closure, making the control-flow structure visually apparent.
    #[must_use]
    pub fn build_with<F>(mut self, f: F) -> IrBody
    where
        F: FnOnce(&mut Self),
    {
        f(&mut self);
        self.body
    }

    fn label_id(&mut self, name: &str) -> LabelId {
        if let Some(&id) = self.labels.get(name) {
            return id;
        }
        let id = LabelId(self.next_label);
        self.next_label += 1;
        self.labels.insert(name.to_string(), id);
        id
    }

    /// Defines the named label at the current position.
    pub fn label(&mut self, name: &str) {
        let id = self.label_id(name);
        self.body.push_label(id);
    }

    /// Emits `nop`.
    pub fn nop(&mut self) {
        self.body.push(Instruction::new(Op::Nop));
    }

    /// Emits `const vdest, value`.
    pub fn const_(&mut self, dest: u32, value: i64) {
        self.body.push(Instruction::new(Op::Const { dest, value }));
    }

    /// Emits `const-string vdest, "value"`.
    pub fn const_string(&mut self, dest: u32, value: &str) {
        let string = self.symbols.intern_string(value);
        self.body
            .push(Instruction::new(Op::ConstString { dest, string }));
    }

    /// Emits `move vdest, vsrc`.
    pub fn move_(&mut self, dest: u32, src: u32) {
        self.body.push(Instruction::new(Op::Move { dest, src }));
    }

    /// Emits a binary operation.
    pub fn binary(&mut self, op: BinaryOp, dest: u32, src1: u32, src2: u32) {
        self.body.push(Instruction::new(Op::Binary {
            op,
            dest,
            src1,
            src2,
        }));
    }

    /// Emits `add-int vdest, vsrc1, vsrc2`.
    pub fn add(&mut self, dest: u32, src1: u32, src2: u32) {
        self.binary(BinaryOp::Add, dest, src1, src2);
    }

    /// Emits `mul-int vdest, vsrc1, vsrc2`.
    pub fn mul(&mut self, dest: u32, src1: u32, src2: u32) {
        self.binary(BinaryOp::Mul, dest, src1, src2);
    }

    /// Emits `new-instance type`.
    pub fn new_instance(&mut self, descriptor: &str) {
        let class = self.symbols.intern_type(descriptor);
        self.body.push(Instruction::new(Op::NewInstance { class }));
    }

    /// Emits `move-result-pseudo-object vdest`.
    pub fn move_result_pseudo(&mut self, dest: u32) {
        self.body
            .push(Instruction::new(Op::MoveResultPseudo { dest }));
    }

    /// Emits `move-result vdest`.
    pub fn move_result(&mut self, dest: u32) {
        self.body.push(Instruction::new(Op::MoveResult { dest }));
    }

    /// Emits an invocation of `owner.name` with the given argument registers.
    pub fn invoke(&mut self, kind: InvokeKind, owner: &str, name: &str, args: &[u32]) {
        let owner = self.symbols.intern_type(owner);
        let method = self.symbols.intern_method(owner, name);
        self.body.push(Instruction::new(Op::Invoke {
            kind,
            method,
            args: args.to_vec(),
        }));
    }

    /// Emits `invoke-direct owner.name (args…)`.
    pub fn invoke_direct(&mut self, owner: &str, name: &str, args: &[u32]) {
        self.invoke(InvokeKind::Direct, owner, name, args);
    }

    /// Emits `invoke-static owner.name (args…)`.
    pub fn invoke_static(&mut self, owner: &str, name: &str, args: &[u32]) {
        self.invoke(InvokeKind::Static, owner, name, args);
    }

    /// Emits `iget vdest, vobj, owner.name`.
    pub fn iget(&mut self, dest: u32, object: u32, owner: &str, name: &str) {
        let owner = self.symbols.intern_type(owner);
        let field = self.symbols.intern_field(owner, name);
        self.body.push(Instruction::new(Op::FieldGet {
            dest,
            object: Some(object),
            field,
        }));
    }

    /// Emits `iput vsrc, vobj, owner.name`.
    pub fn iput(&mut self, src: u32, object: u32, owner: &str, name: &str) {
        let owner = self.symbols.intern_type(owner);
        let field = self.symbols.intern_field(owner, name);
        self.body.push(Instruction::new(Op::FieldPut {
            src,
            object: Some(object),
            field,
        }));
    }

    /// Emits `monitor-enter vsrc`.
    pub fn monitor_enter(&mut self, src: u32) {
        self.body.push(Instruction::new(Op::MonitorEnter { src }));
    }

    /// Emits `monitor-exit vsrc`.
    pub fn monitor_exit(&mut self, src: u32) {
        self.body.push(Instruction::new(Op::MonitorExit { src }));
    }

    /// Emits `goto :target`.
    pub fn goto_(&mut self, target: &str) {
        let target = self.label_id(target);
        self.body
            .push_branch(Instruction::new(Op::Goto), vec![target]);
    }

    /// Emits a conditional branch with the given condition.
    pub fn if_(&mut self, cond: IfCond, src1: u32, src2: Option<u32>, target: &str) {
        let target = self.label_id(target);
        self.body
            .push_branch(Instruction::new(Op::If { cond, src1, src2 }), vec![target]);
    }

    /// Emits `if-eqz vsrc -> :target`.
    pub fn if_eqz(&mut self, src: u32, target: &str) {
        self.if_(IfCond::Eqz, src, None, target);
    }

    /// Emits `if-nez vsrc -> :target`.
    pub fn if_nez(&mut self, src: u32, target: &str) {
        self.if_(IfCond::Nez, src, None, target);
    }

    /// Emits `if-eq vsrc1, vsrc2 -> :target`.
    pub fn if_eq(&mut self, src1: u32, src2: u32, target: &str) {
        self.if_(IfCond::Eq, src1, Some(src2), target);
    }

    /// Emits `packed-switch vsrc` with the given case targets in table order.
    pub fn switch(&mut self, src: u32, targets: &[&str]) {
        let targets = targets.iter().map(|t| self.label_id(t)).collect();
        self.body
            .push_branch(Instruction::new(Op::Switch { src }), targets);
    }

    /// Emits `return vsrc`.
    pub fn ret(&mut self, src: u32) {
        self.body
            .push(Instruction::new(Op::Return { src: Some(src) }));
    }

    /// Emits `return-void`.
    pub fn ret_void(&mut self) {
        self.body.push(Instruction::new(Op::Return { src: None }));
    }

    /// Emits `throw vsrc`.
    pub fn throw(&mut self, src: u32) {
        self.body.push(Instruction::new(Op::Throw { src }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::body::IrEntry;

    #[test]
    fn test_forward_label_reference() {
        let symbols = SymbolTable::new();
        let body = MethodBuilder::new(&symbols).build_with(|m| {
            m.const_(0, 0);
            m.if_eqz(0, "exit");
            m.add(0, 0, 0);
            m.label("exit");
            m.ret_void();
        });

        // The branch target and the label definition resolve to the same id.
        let branch_target = body
            .entries()
            .iter()
            .find_map(|e| match e {
                IrEntry::Instr(i) if !i.targets.is_empty() => Some(i.targets[0]),
                _ => None,
            })
            .unwrap();
        let label_def = body
            .entries()
            .iter()
            .find_map(|e| match e {
                IrEntry::Label(l) => Some(*l),
                _ => None,
            })
            .unwrap();
        assert_eq!(branch_target, label_def);
    }

    #[test]
    fn test_symbols_interned_once() {
        let symbols = SymbolTable::new();
        let _ = MethodBuilder::new(&symbols).build_with(|m| {
            m.new_instance("LtestClass;");
            m.move_result_pseudo(0);
            m.invoke_direct("LtestClass;", "<init>", &[0]);
            m.throw(0);
        });
        assert_eq!(symbols.type_count(), 1);
    }

    #[test]
    fn test_switch_targets_in_table_order() {
        let symbols = SymbolTable::new();
        let body = MethodBuilder::new(&symbols).build_with(|m| {
            m.const_(0, 0);
            m.switch(0, &["a", "b", "c"]);
            m.ret_void();
            m.label("a");
            m.ret(0);
            m.label("b");
            m.ret(0);
            m.label("c");
            m.ret(0);
        });

        let targets = body
            .entries()
            .iter()
            .find_map(|e| match e {
                IrEntry::Instr(i) if i.targets.len() == 3 => Some(i.targets.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(targets.len(), 3);
        assert_ne!(targets[0], targets[1]);
        assert_ne!(targets[1], targets[2]);
    }
}
