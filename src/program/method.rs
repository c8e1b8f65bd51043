//! Methods and their access flags.

use bitflags::bitflags;

use crate::ir::{IrBody, StringId, SymbolTable, TypeId};

bitflags! {
    /// Access and property flags of a method.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MethodAccessFlags: u32 {
        /// Publicly accessible.
        const PUBLIC = 0x0001;
        /// Accessible only within the declaring class.
        const PRIVATE = 0x0002;
        /// Accessible within the package and subclasses.
        const PROTECTED = 0x0004;
        /// No receiver.
        const STATIC = 0x0008;
        /// Not overridable.
        const FINAL = 0x0010;
        /// Holds the declaring object's monitor while executing.
        const SYNCHRONIZED = 0x0020;
        /// No body; implemented by subclasses.
        const ABSTRACT = 0x0400;
        /// No bytecode body; implemented natively.
        const NATIVE = 0x0100;
        /// Instance constructor.
        const CONSTRUCTOR = 0x1_0000;
    }
}

/// A method: name, declaring class, access flags, and its linear IR body.
///
/// The body is empty for abstract and native methods. Passes obtain the body
/// through [`body`](Self::body)/[`body_mut`](Self::body_mut) or replace it
/// wholesale with [`set_body`](Self::set_body) after flattening a rewritten
/// CFG.
#[derive(Debug, Clone)]
pub struct Method {
    class: TypeId,
    name: StringId,
    access: MethodAccessFlags,
    body: IrBody,
}

impl Method {
    /// Creates a method with the given body.
    #[must_use]
    pub fn new(class: TypeId, name: StringId, access: MethodAccessFlags, body: IrBody) -> Self {
        Self {
            class,
            name,
            access,
            body,
        }
    }

    /// The declaring class.
    #[must_use]
    pub fn class(&self) -> TypeId {
        self.class
    }

    /// The method name.
    #[must_use]
    pub fn name(&self) -> StringId {
        self.name
    }

    /// The access flags.
    #[must_use]
    pub fn access(&self) -> MethodAccessFlags {
        self.access
    }

    /// The linear IR body.
    #[must_use]
    pub fn body(&self) -> &IrBody {
        &self.body
    }

    /// Mutable access to the linear IR body.
    pub fn body_mut(&mut self) -> &mut IrBody {
        &mut self.body
    }

    /// Replaces the body, e.g. after flattening a rewritten CFG.
    pub fn set_body(&mut self, body: IrBody) {
        self.body = body;
    }

    /// Returns true if the method has no bytecode body.
    #[must_use]
    pub fn is_bodyless(&self) -> bool {
        self.access
            .intersects(MethodAccessFlags::ABSTRACT | MethodAccessFlags::NATIVE)
            || self.body.is_empty()
    }

    /// Renders `Type.name` for diagnostics.
    #[must_use]
    pub fn qualified_name(&self, symbols: &SymbolTable) -> String {
        symbols.display_method(self.class, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::MethodBuilder;

    #[test]
    fn test_bodyless_detection() {
        let symbols = SymbolTable::new();
        let class = symbols.intern_type("LtestClass;");
        let name = symbols.intern_string("run");

        let abstract_method = Method::new(
            class,
            name,
            MethodAccessFlags::PUBLIC | MethodAccessFlags::ABSTRACT,
            IrBody::new(),
        );
        assert!(abstract_method.is_bodyless());

        let body = MethodBuilder::new(&symbols).build_with(|m| m.ret_void());
        let concrete = Method::new(class, name, MethodAccessFlags::PUBLIC, body);
        assert!(!concrete.is_bodyless());
    }

    #[test]
    fn test_qualified_name() {
        let symbols = SymbolTable::new();
        let class = symbols.intern_type("LtestClass;");
        let name = symbols.intern_string("run");
        let method = Method::new(class, name, MethodAccessFlags::PUBLIC, IrBody::new());
        assert_eq!(method.qualified_name(&symbols), "LtestClass;.run");
    }
}
