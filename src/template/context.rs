//! Recursion state of the template compiler
//!
//! A [`RenderContext`] is never mutated: entering a type, a child element or
//! a deeper indentation level yields a new context, so sibling branches can
//! not see each other's visited types.

use std::collections::HashSet;

/// Recursion state threaded through one compilation branch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderContext {
    visited: HashSet<String>,
    depth: usize,
    hint: String,
}

impl RenderContext {
    /// Context for a global element at `depth`
    pub fn root(hint: impl Into<String>, depth: usize) -> Self {
        Self {
            visited: HashSet::new(),
            depth,
            hint: hint.into(),
        }
    }

    /// Element name in effect
    pub fn hint(&self) -> &str {
        &self.hint
    }

    /// Indentation depth
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Whether `key` is already on this recursion chain
    pub fn has_visited(&self, key: &str) -> bool {
        self.visited.contains(key)
    }

    /// The same position with `key` added to the chain
    pub fn entering(&self, key: impl Into<String>) -> Self {
        let mut visited = self.visited.clone();
        visited.insert(key.into());
        Self {
            visited,
            depth: self.depth,
            hint: self.hint.clone(),
        }
    }

    /// Context for a sibling at the same depth under a new hint
    pub fn renamed(&self, hint: impl Into<String>) -> Self {
        Self {
            visited: self.visited.clone(),
            depth: self.depth,
            hint: hint.into(),
        }
    }

    /// One level deeper, same hint
    pub fn deeper(&self) -> Self {
        Self {
            visited: self.visited.clone(),
            depth: self.depth + 1,
            hint: self.hint.clone(),
        }
    }

    /// Leading whitespace for this depth
    pub fn indent(&self, unit: &str) -> String {
        unit.repeat(self.depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entering_does_not_touch_parent() {
        let root = RenderContext::root("Person", 1);
        let inner = root.entering("PersonType");
        assert!(inner.has_visited("PersonType"));
        assert!(!root.has_visited("PersonType"));
        assert_eq!(inner.hint(), "Person");
    }

    #[test]
    fn test_renamed_deeper_keeps_chain() {
        let ctx = RenderContext::root("Person", 1).entering("PersonType");
        let child = ctx.deeper().renamed("firstName");
        assert!(child.has_visited("PersonType"));
        assert_eq!(child.depth(), 2);
        assert_eq!(child.hint(), "firstName");
        assert_eq!(child.indent("  "), "    ");
    }

    #[test]
    fn test_renamed_and_deeper() {
        let ctx = RenderContext::root("a", 0);
        assert_eq!(ctx.renamed("b").depth(), 0);
        assert_eq!(ctx.deeper().hint(), "a");
        assert_eq!(ctx.deeper().depth(), 1);
    }
}
