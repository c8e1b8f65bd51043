//! Opcode categories and operation sub-kinds.
//!
//! Every instruction belongs to exactly one [`OpcodeCategory`]. The category
//! drives generic queries (is this a terminator? does it write a register?)
//! without matching on the full operation shape.

use std::fmt;

use strum::EnumIter;

/// Coarse classification of instruction kinds.
///
/// The set is fixed; passes match on categories when the exact operation does
/// not matter (e.g. terminator detection, register-def scans).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum OpcodeCategory {
    /// No operation.
    Nop,
    /// Constant loads (numeric or string).
    Const,
    /// Register-to-register moves, including `move-result` variants.
    Move,
    /// Arithmetic and bitwise operations.
    Arithmetic,
    /// Object allocation (`new-instance`).
    Allocation,
    /// Method invocation.
    Invocation,
    /// Instance and static field access.
    FieldAccess,
    /// The pseudo-move that captures an allocation result.
    MoveResultPseudo,
    /// Monitor enter/exit.
    Monitor,
    /// Intra-method control flow (`goto`, conditional branch, switch).
    ControlFlow,
    /// Method return.
    Return,
    /// Exception throw.
    Throw,
}

/// Binary arithmetic and bitwise operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    /// `dest = src1 + src2`
    Add,
    /// `dest = src1 - src2`
    Sub,
    /// `dest = src1 * src2`
    Mul,
    /// `dest = src1 / src2`
    Div,
    /// `dest = src1 % src2`
    Rem,
    /// `dest = src1 & src2`
    And,
    /// `dest = src1 | src2`
    Or,
    /// `dest = src1 ^ src2`
    Xor,
    /// `dest = src1 << src2`
    Shl,
    /// `dest = src1 >> src2`
    Shr,
}

impl BinaryOp {
    /// Returns the textual mnemonic.
    #[must_use]
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Self::Add => "add-int",
            Self::Sub => "sub-int",
            Self::Mul => "mul-int",
            Self::Div => "div-int",
            Self::Rem => "rem-int",
            Self::And => "and-int",
            Self::Or => "or-int",
            Self::Xor => "xor-int",
            Self::Shl => "shl-int",
            Self::Shr => "shr-int",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// Conditions of conditional branches.
///
/// Single-register forms compare against zero; two-register forms compare
/// two registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IfCond {
    /// Taken if the register is zero.
    Eqz,
    /// Taken if the register is non-zero.
    Nez,
    /// Taken if the two registers are equal.
    Eq,
    /// Taken if the two registers are not equal.
    Ne,
    /// Taken if the first register is less than the second.
    Lt,
    /// Taken if the first register is greater than or equal to the second.
    Ge,
}

impl IfCond {
    /// Returns the textual mnemonic.
    #[must_use]
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Self::Eqz => "if-eqz",
            Self::Nez => "if-nez",
            Self::Eq => "if-eq",
            Self::Ne => "if-ne",
            Self::Lt => "if-lt",
            Self::Ge => "if-ge",
        }
    }

    /// Returns true if the condition reads a single register.
    #[must_use]
    pub fn is_unary(&self) -> bool {
        matches!(self, Self::Eqz | Self::Nez)
    }
}

impl fmt::Display for IfCond {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// Dispatch kinds of method invocations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvokeKind {
    /// Non-virtual dispatch to a specific method (constructors, private methods).
    Direct,
    /// Virtual dispatch through the receiver's class.
    Virtual,
    /// Static dispatch, no receiver.
    Static,
}

impl InvokeKind {
    /// Returns the textual mnemonic.
    #[must_use]
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Self::Direct => "invoke-direct",
            Self::Virtual => "invoke-virtual",
            Self::Static => "invoke-static",
        }
    }
}

impl fmt::Display for InvokeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn test_category_set_is_fixed() {
        // The category enum is the contract surface for generic queries;
        // growing it means auditing every category match in the crate.
        assert_eq!(OpcodeCategory::iter().count(), 12);
    }

    #[test]
    fn test_if_cond_arity() {
        assert!(IfCond::Eqz.is_unary());
        assert!(IfCond::Nez.is_unary());
        assert!(!IfCond::Eq.is_unary());
        assert!(!IfCond::Lt.is_unary());
    }

    #[test]
    fn test_mnemonics() {
        assert_eq!(BinaryOp::Add.to_string(), "add-int");
        assert_eq!(IfCond::Eqz.to_string(), "if-eqz");
        assert_eq!(InvokeKind::Direct.to_string(), "invoke-direct");
    }
}
