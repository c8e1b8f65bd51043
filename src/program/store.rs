//! The program store: in-memory ownership of all loaded classes.

use std::sync::Arc;

use rayon::prelude::*;

use crate::{
    ir::SymbolTable,
    program::{class::Class, method::Method},
    Result,
};

/// Owns the in-memory classes, methods, and their IR bodies for the lifetime
/// of an optimization run.
///
/// The store pairs the owned class tree with a shared [`SymbolTable`]. The
/// symbol table is written only at program load; during passes it is
/// immutable and may be freely shared across per-method workers. Passes see
/// the class tree mutably; the pass manager sequences them, never
/// interleaves.
///
/// # Examples
///
/// ```rust
/// use dexscope::ir::{MethodBuilder, SymbolTable};
/// use dexscope::program::{Class, ClassAccessFlags, Method, MethodAccessFlags, ProgramStore};
/// use std::sync::Arc;
///
/// let symbols = Arc::new(SymbolTable::new());
/// let ty = symbols.intern_type("LtestClass;");
/// let body = MethodBuilder::new(&symbols).build_with(|m| m.ret_void());
///
/// let mut class = Class::new(ty, ClassAccessFlags::PUBLIC);
/// class.add_method(Method::new(
///     ty,
///     symbols.intern_string("run"),
///     MethodAccessFlags::PUBLIC | MethodAccessFlags::STATIC,
///     body,
/// ));
///
/// let mut store = ProgramStore::new(symbols);
/// store.add_class(class);
/// assert_eq!(store.method_count(), 1);
/// ```
#[derive(Debug)]
pub struct ProgramStore {
    symbols: Arc<SymbolTable>,
    classes: Vec<Class>,
}

impl ProgramStore {
    /// Creates an empty store over the given symbol table.
    #[must_use]
    pub fn new(symbols: Arc<SymbolTable>) -> Self {
        Self {
            symbols,
            classes: Vec::new(),
        }
    }

    /// Creates an empty store with a fresh symbol table.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(Arc::new(SymbolTable::new()))
    }

    /// The shared symbol table.
    #[must_use]
    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// A shareable handle to the symbol table.
    #[must_use]
    pub fn symbols_arc(&self) -> Arc<SymbolTable> {
        Arc::clone(&self.symbols)
    }

    /// Adds a class to the store.
    pub fn add_class(&mut self, class: Class) {
        self.classes.push(class);
    }

    /// The loaded classes in load order.
    #[must_use]
    pub fn classes(&self) -> &[Class] {
        &self.classes
    }

    /// Mutable access to the loaded classes.
    pub fn classes_mut(&mut self) -> &mut [Class] {
        &mut self.classes
    }

    /// Number of loaded classes.
    #[must_use]
    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    /// Total number of methods across all classes.
    #[must_use]
    pub fn method_count(&self) -> usize {
        self.classes.iter().map(Class::method_count).sum()
    }

    /// Iterates over all methods.
    pub fn methods(&self) -> impl Iterator<Item = &Method> {
        self.classes.iter().flat_map(|c| c.methods().iter())
    }

    /// Runs `f` over every method in parallel, stopping at the first error.
    ///
    /// Each worker owns exactly one method at a time; the symbol table and
    /// any captured state are shared read-only. This is the within-pass
    /// parallelism primitive — across methods no ordering is observable.
    ///
    /// # Errors
    ///
    /// Returns the first error produced by `f`. Which method's error is
    /// returned is unspecified when several fail concurrently.
    pub fn par_try_for_each_method<F>(&mut self, f: F) -> Result<()>
    where
        F: Fn(&mut Method) -> Result<()> + Send + Sync,
    {
        self.classes.par_iter_mut().try_for_each(|class| {
            class.methods_mut().par_iter_mut().try_for_each(&f)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ir::MethodBuilder,
        program::{class::ClassAccessFlags, method::MethodAccessFlags},
    };

    fn store_with_methods(count: usize) -> ProgramStore {
        let symbols = Arc::new(SymbolTable::new());
        let ty = symbols.intern_type("LtestClass;");
        let mut class = Class::new(ty, ClassAccessFlags::PUBLIC);
        for i in 0..count {
            let body = MethodBuilder::new(&symbols).build_with(|m| {
                m.const_(0, i64::try_from(i).unwrap_or(0));
                m.ret(0);
            });
            class.add_method(Method::new(
                ty,
                symbols.intern_string(&format!("m{i}")),
                MethodAccessFlags::PUBLIC | MethodAccessFlags::STATIC,
                body,
            ));
        }
        let mut store = ProgramStore::new(symbols);
        store.add_class(class);
        store
    }

    #[test]
    fn test_counts() {
        let store = store_with_methods(3);
        assert_eq!(store.class_count(), 1);
        assert_eq!(store.method_count(), 3);
        assert_eq!(store.methods().count(), 3);
    }

    #[test]
    fn test_par_for_each_method_visits_all() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let mut store = store_with_methods(16);
        let visited = AtomicUsize::new(0);
        store
            .par_try_for_each_method(|_| {
                visited.fetch_add(1, Ordering::Relaxed);
                Ok(())
            })
            .unwrap();
        assert_eq!(visited.load(Ordering::Relaxed), 16);
    }

    #[test]
    fn test_par_for_each_method_propagates_error() {
        let mut store = store_with_methods(4);
        let result = store.par_try_for_each_method(|_| Err(crate::Error::Cancelled));
        assert!(matches!(result, Err(crate::Error::Cancelled)));
    }
}
