//! Content-addressed interning of generated sub-tables.
//!
//! Structurally identical tables must be emitted once and referenced by
//! index. Tables are keyed by their serialized body: the first occurrence
//! gets the next sequential index, later identical occurrences reuse it.
//! Pure memoization with stable, insertion-ordered indices; no eviction.

use indexmap::IndexMap;

/// Maps serialized table bodies to sequential indices.
#[derive(Debug, Default)]
pub struct Interner {
    entries: IndexMap<String, usize>,
}

impl Interner {
    /// Creates an empty interner.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the index for a serialized body, allocating the next
    /// sequential index on first occurrence.
    pub fn intern(&mut self, body: String) -> usize {
        let next = self.entries.len();
        *self.entries.entry(body).or_insert(next)
    }

    /// Iterates the interned bodies in index order.
    pub fn bodies(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of distinct interned bodies.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when nothing has been interned.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interning_is_idempotent() {
        let mut interner = Interner::new();
        let a = interner.intern("{ 0x0: 0x1e, };\n".to_string());
        let b = interner.intern("{ 0x1: 0x1e, };\n".to_string());
        let c = interner.intern("{ 0x0: 0x1e, };\n".to_string());
        assert_eq!(a, 0);
        assert_eq!(b, 1);
        assert_eq!(a, c);
        assert_eq!(interner.len(), 2);
    }

    #[test]
    fn test_bodies_preserve_insertion_order() {
        let mut interner = Interner::new();
        interner.intern("b".to_string());
        interner.intern("a".to_string());
        let bodies: Vec<&str> = interner.bodies().collect();
        assert_eq!(bodies, ["b", "a"]);
    }
}
