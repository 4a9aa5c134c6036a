//! A small interner for method selectors.
//!
//! Interning replaces selector strings with ids that are cheap to move,
//! copy and compare, which is what the selector-to-offset table keys on.

use std::collections::HashMap;

/// An interned method selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Selector(pub u32);

/// The selector interner.
#[derive(Debug, Default)]
pub struct Interner {
    map: HashMap<String, u32>,
    names: Vec<String>,
}

impl Interner {
    /// Intern a selector string.
    pub fn intern(&mut self, name: &str) -> Selector {
        if let Some(&id) = self.map.get(name) {
            return Selector(id);
        }
        let id = self.names.len() as u32;
        self.map.insert(name.to_string(), id);
        self.names.push(name.to_string());
        Selector(id)
    }

    /// Get the string for an interned selector.
    pub fn lookup(&self, selector: Selector) -> &str {
        &self.names[selector.0 as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_is_stable() {
        let mut interner = Interner::default();
        let foo = interner.intern("foo");
        let bar = interner.intern("bar");
        assert_ne!(foo, bar);
        assert_eq!(interner.intern("foo"), foo);
        assert_eq!(interner.lookup(bar), "bar");
    }
}
