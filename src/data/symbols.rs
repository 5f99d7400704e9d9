//! Symbol table.
//!
//! Symbol names are interned once and referred to by a small copyable handle.
//! The table is owned by the [`Environment`](super::Environment), so any holder of
//! an environment can resolve the symbols in the values it contains.
//!
//! Unlike many Lisps, symbols are case-sensitive: `Foo` and `foo` are distinct.

use string_interner::{DefaultStringInterner, DefaultSymbol};

/// An interned symbol name.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Sym(DefaultSymbol);

#[derive(Default)]
pub struct Symbols {
    interner: DefaultStringInterner,
}

impl Symbols {
    /// Intern the name, returning the existing handle if it is already known.
    pub fn intern(&mut self, name: &str) -> Sym {
        Sym(self.interner.get_or_intern(name))
    }

    /// Find the handle for the name without interning it.
    pub fn get(&self, name: &str) -> Option<Sym> {
        self.interner.get(name).map(Sym)
    }

    /// Retrieve the name of an interned symbol.
    pub fn resolve(&self, sym: Sym) -> &str {
        // Handles are only minted by this table, so resolution cannot miss
        // unless a handle from a different table is used.
        self.interner.resolve(sym.0).unwrap_or("<foreign symbol>")
    }

    pub fn len(&self) -> usize {
        self.interner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interner.is_empty()
    }
}

impl std::fmt::Debug for Symbols {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries((&self.interner).into_iter().map(|(_, name)| name))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::Symbols;

    #[test]
    fn intern_is_stable() {
        let mut symbols = Symbols::default();
        let a = symbols.intern("make-adder");
        let b = symbols.intern("x");
        let again = symbols.intern("make-adder");

        assert_eq!(a, again);
        assert_ne!(a, b);
        assert_eq!(symbols.len(), 2);
        assert_eq!(symbols.resolve(a), "make-adder");
    }

    #[test]
    fn case_sensitive() {
        let mut symbols = Symbols::default();
        let lower = symbols.intern("hello");
        let upper = symbols.intern("HELLO");
        assert_ne!(lower, upper);
        assert_eq!(symbols.get("hello"), Some(lower));
        assert_eq!(symbols.get("hElLo"), None);
    }

    #[test]
    fn debug_lists_names() {
        let mut symbols = Symbols::default();
        symbols.intern("car");
        symbols.intern("cdr");
        assert_eq!(format!("{symbols:?}"), r#"["car", "cdr"]"#);
    }
}
