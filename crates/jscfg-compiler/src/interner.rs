//! String interning for identifiers and literals
//!
//! Every name, property key and string literal the lowering pass emits is
//! stored once in the module's interner and referred to by a `Symbol`.

use rustc_hash::FxHashMap;
use std::num::NonZeroU32;

/// An interned string symbol (32-bit index).
///
/// Symbols are small (4 bytes) and can be copied cheaply.
/// Use `Interner::resolve()` to get the actual string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(NonZeroU32);

impl Symbol {
    #[inline]
    fn from_raw(raw: u32) -> Self {
        Symbol(NonZeroU32::MIN.saturating_add(raw))
    }

    #[inline]
    fn to_raw(self) -> usize {
        (self.0.get() - 1) as usize
    }

    /// Raw index of the symbol inside its interner
    pub fn index(self) -> usize {
        self.to_raw()
    }
}

/// String interner that deduplicates strings.
#[derive(Debug, Clone, Default)]
pub struct Interner {
    /// Map from string to symbol index
    map: FxHashMap<String, Symbol>,

    /// Vec of interned strings (indexed by symbol)
    strings: Vec<String>,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            map: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            strings: Vec::with_capacity(capacity),
        }
    }

    /// Intern a string, returning its symbol.
    pub fn intern(&mut self, s: &str) -> Symbol {
        if let Some(&sym) = self.map.get(s) {
            return sym;
        }

        let sym = Symbol::from_raw(self.strings.len() as u32);
        self.strings.push(s.to_string());
        self.map.insert(s.to_string(), sym);
        sym
    }

    /// Look a string up without interning it.
    pub fn get(&self, s: &str) -> Option<Symbol> {
        self.map.get(s).copied()
    }

    /// Resolve a symbol back to its string.
    ///
    /// Symbols from another interner resolve to the empty string.
    #[inline]
    pub fn resolve(&self, sym: Symbol) -> &str {
        self.strings.get(sym.to_raw()).map(String::as_str).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// Interned strings in symbol order
    pub fn iter(&self) -> impl Iterator<Item = (Symbol, &str)> {
        self.strings
            .iter()
            .enumerate()
            .map(|(i, s)| (Symbol::from_raw(i as u32), s.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_deduplicates() {
        let mut interner = Interner::new();

        let sym1 = interner.intern("defineArray");
        let sym2 = interner.intern("popScope");
        let sym3 = interner.intern("defineArray");

        assert_eq!(sym1, sym3);
        assert_ne!(sym1, sym2);
        assert_eq!(interner.len(), 2);
    }

    #[test]
    fn test_resolve_and_get() {
        let mut interner = Interner::new();
        let sym = interner.intern("arguments");
        assert_eq!(interner.resolve(sym), "arguments");
        assert_eq!(interner.get("arguments"), Some(sym));
        assert_eq!(interner.get("eval"), None);
    }

    #[test]
    fn test_foreign_symbol_resolves_empty() {
        let mut big = Interner::new();
        big.intern("a");
        let b = big.intern("b");
        let small = Interner::new();
        assert_eq!(small.resolve(b), "");
    }

    #[test]
    fn test_iter_in_symbol_order() {
        let mut interner = Interner::new();
        interner.intern("x");
        interner.intern("y");
        let names: Vec<_> = interner.iter().map(|(_, s)| s).collect();
        assert_eq!(names, vec!["x", "y"]);
    }
}
