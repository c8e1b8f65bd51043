//! Interned symbol references for types, fields, methods, and strings.
//!
//! Instructions never embed symbol text; they carry compact ids into a shared
//! [`SymbolTable`]. The table is populated while the program is loaded and is
//! read-only for the duration of a pass pipeline, so it can be shared freely
//! across per-method workers.
//!
//! # Thread Safety
//!
//! Interning is concurrent: the id maps are sharded ([`dashmap`]) and the
//! id → value storage is append-only ([`boxcar`]). Lookups by id never block.

use dashmap::DashMap;

/// Name of instance constructors in class-file VMs.
pub const CONSTRUCTOR_NAME: &str = "<init>";

/// Identifier of an interned string literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StringId(pub u32);

/// Identifier of an interned type descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub u32);

/// Identifier of an interned field reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldId(pub u32);

/// Identifier of an interned method reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MethodRefId(pub u32);

/// A resolved field reference: owning type plus field name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldRef {
    /// The type that declares the field.
    pub owner: TypeId,
    /// The field name.
    pub name: StringId,
}

/// A resolved method reference: owning type, method name, and whether the
/// name designates an instance constructor.
///
/// The constructor flag is computed once at intern time so that
/// object-identity checks in passes do not need string comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MethodRef {
    /// The type that declares the method.
    pub owner: TypeId,
    /// The method name.
    pub name: StringId,
    /// True if the method name is `<init>`.
    pub is_init: bool,
}

/// Concurrent interning table for all symbol kinds referenced by instructions.
///
/// Written only while the program is loaded; immutable during pass execution.
///
/// # Examples
///
/// ```rust
/// use dexscope::ir::SymbolTable;
///
/// let symbols = SymbolTable::new();
/// let ty = symbols.intern_type("Lcom/example/Foo;");
/// let ctor = symbols.intern_method(ty, "<init>");
/// assert!(symbols.method_ref(ctor).is_some_and(|m| m.is_init));
/// ```
#[derive(Debug, Default)]
pub struct SymbolTable {
    string_ids: DashMap<String, u32>,
    strings: boxcar::Vec<String>,
    type_ids: DashMap<String, u32>,
    types: boxcar::Vec<String>,
    field_ids: DashMap<(TypeId, StringId), u32>,
    fields: boxcar::Vec<FieldRef>,
    method_ids: DashMap<(TypeId, StringId), u32>,
    methods: boxcar::Vec<MethodRef>,
}

impl SymbolTable {
    /// Creates an empty symbol table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns a string literal and returns its id.
    pub fn intern_string(&self, value: &str) -> StringId {
        if let Some(id) = self.string_ids.get(value) {
            return StringId(*id);
        }
        let id = *self
            .string_ids
            .entry(value.to_string())
            .or_insert_with(|| u32::try_from(self.strings.push(value.to_string())).unwrap_or(u32::MAX));
        StringId(id)
    }

    /// Interns a type descriptor and returns its id.
    pub fn intern_type(&self, descriptor: &str) -> TypeId {
        if let Some(id) = self.type_ids.get(descriptor) {
            return TypeId(*id);
        }
        let id = *self
            .type_ids
            .entry(descriptor.to_string())
            .or_insert_with(|| u32::try_from(self.types.push(descriptor.to_string())).unwrap_or(u32::MAX));
        TypeId(id)
    }

    /// Interns a field reference and returns its id.
    pub fn intern_field(&self, owner: TypeId, name: &str) -> FieldId {
        let name = self.intern_string(name);
        let id = *self
            .field_ids
            .entry((owner, name))
            .or_insert_with(|| u32::try_from(self.fields.push(FieldRef { owner, name })).unwrap_or(u32::MAX));
        FieldId(id)
    }

    /// Interns a method reference and returns its id.
    ///
    /// The `<init>` constructor flag is derived from `name` at intern time.
    pub fn intern_method(&self, owner: TypeId, name: &str) -> MethodRefId {
        let is_init = name == CONSTRUCTOR_NAME;
        let name = self.intern_string(name);
        let id = *self.method_ids.entry((owner, name)).or_insert_with(|| {
            u32::try_from(self.methods.push(MethodRef {
                owner,
                name,
                is_init,
            }))
            .unwrap_or(u32::MAX)
        });
        MethodRefId(id)
    }

    /// Looks up an interned string by id.
    #[must_use]
    pub fn string(&self, id: StringId) -> Option<&str> {
        self.strings.get(id.0 as usize).map(String::as_str)
    }

    /// Looks up an interned type descriptor by id.
    #[must_use]
    pub fn type_descriptor(&self, id: TypeId) -> Option<&str> {
        self.types.get(id.0 as usize).map(String::as_str)
    }

    /// Looks up an interned field reference by id.
    #[must_use]
    pub fn field_ref(&self, id: FieldId) -> Option<FieldRef> {
        self.fields.get(id.0 as usize).copied()
    }

    /// Looks up an interned method reference by id.
    #[must_use]
    pub fn method_ref(&self, id: MethodRefId) -> Option<MethodRef> {
        self.methods.get(id.0 as usize).copied()
    }

    /// Returns true if the method id names an instance constructor.
    #[must_use]
    pub fn is_constructor(&self, id: MethodRefId) -> bool {
        self.method_ref(id).is_some_and(|m| m.is_init)
    }

    /// Renders a method reference as `Type.name` for diagnostics.
    #[must_use]
    pub fn display_method(&self, owner: TypeId, name: StringId) -> String {
        let owner = self.type_descriptor(owner).unwrap_or("?");
        let name = self.string(name).unwrap_or("?");
        format!("{owner}.{name}")
    }

    /// Number of interned strings.
    #[must_use]
    pub fn string_count(&self) -> usize {
        self.strings.count()
    }

    /// Number of interned type descriptors.
    #[must_use]
    pub fn type_count(&self) -> usize {
        self.types.count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_string_dedup() {
        let symbols = SymbolTable::new();
        let a = symbols.intern_string("hello");
        let b = symbols.intern_string("hello");
        let c = symbols.intern_string("world");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(symbols.string(a), Some("hello"));
        assert_eq!(symbols.string_count(), 2);
    }

    #[test]
    fn test_intern_method_constructor_flag() {
        let symbols = SymbolTable::new();
        let ty = symbols.intern_type("LtestClass;");
        let ctor = symbols.intern_method(ty, "<init>");
        let other = symbols.intern_method(ty, "toString");

        assert!(symbols.is_constructor(ctor));
        assert!(!symbols.is_constructor(other));
    }

    #[test]
    fn test_intern_field_roundtrip() {
        let symbols = SymbolTable::new();
        let ty = symbols.intern_type("LtestClass;");
        let field = symbols.intern_field(ty, "count");

        let resolved = symbols.field_ref(field).unwrap();
        assert_eq!(resolved.owner, ty);
        assert_eq!(symbols.string(resolved.name), Some("count"));
    }

    #[test]
    fn test_display_method() {
        let symbols = SymbolTable::new();
        let ty = symbols.intern_type("LtestClass;");
        let m = symbols.intern_method(ty, "run");
        let mref = symbols.method_ref(m).unwrap();
        assert_eq!(symbols.display_method(mref.owner, mref.name), "LtestClass;.run");
    }
}
