//! Classes and their access flags.

use bitflags::bitflags;

use crate::{ir::TypeId, program::method::Method};

bitflags! {
    /// Access and property flags of a class.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ClassAccessFlags: u32 {
        /// Publicly accessible.
        const PUBLIC = 0x0001;
        /// Not subclassable.
        const FINAL = 0x0010;
        /// An interface.
        const INTERFACE = 0x0200;
        /// Not instantiable.
        const ABSTRACT = 0x0400;
    }
}

/// A loaded class: its type, access flags, and methods.
#[derive(Debug, Clone)]
pub struct Class {
    ty: TypeId,
    access: ClassAccessFlags,
    methods: Vec<Method>,
}

impl Class {
    /// Creates an empty class.
    #[must_use]
    pub fn new(ty: TypeId, access: ClassAccessFlags) -> Self {
        Self {
            ty,
            access,
            methods: Vec::new(),
        }
    }

    /// The class type.
    #[must_use]
    pub fn ty(&self) -> TypeId {
        self.ty
    }

    /// The access flags.
    #[must_use]
    pub fn access(&self) -> ClassAccessFlags {
        self.access
    }

    /// Adds a method to the class.
    pub fn add_method(&mut self, method: Method) {
        self.methods.push(method);
    }

    /// The methods in declaration order.
    #[must_use]
    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    /// Mutable access to the methods.
    pub fn methods_mut(&mut self) -> &mut [Method] {
        &mut self.methods
    }

    /// Number of methods.
    #[must_use]
    pub fn method_count(&self) -> usize {
        self.methods.len()
    }
}
