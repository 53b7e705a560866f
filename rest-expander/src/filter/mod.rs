//! Expansion / fields filter DSL
//!
//! A filter names fields, optionally with a parenthesized list of nested
//! fields: `name,group(name),addresses(city(name))`. The whole input `*`
//! means "everything, recursively" and is carried as a flag rather than a
//! node.

mod parser;

pub use parser::{FilterError, MAX_DEPTH};

use crate::diagnostics::Diagnostic;

static EMPTY_TREE: FilterTree = FilterTree { nodes: Vec::new() };

/// A single named entry in a filter tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterNode {
    pub name: String,
    pub children: FilterTree,
}

impl FilterNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: FilterTree::default(),
        }
    }

    pub fn with_children(name: impl Into<String>, children: Vec<FilterNode>) -> Self {
        Self {
            name: name.into(),
            children: FilterTree::from(children),
        }
    }
}

/// Ordered list of filter nodes at one level
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterTree {
    nodes: Vec<FilterNode>,
}

impl FilterTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes(&self) -> &[FilterNode] {
        &self.nodes
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FilterNode> {
        self.nodes.iter()
    }

    /// True if the tree places no restriction (empty) or names `name` directly.
    ///
    /// This is the projection test: an empty fields filter keeps everything.
    pub fn contains(&self, name: &str) -> bool {
        self.is_empty() || self.names(name)
    }

    /// True only if a direct child is called `name`.
    ///
    /// Expansion uses this so that an empty expansion filter follows nothing.
    pub fn names(&self, name: &str) -> bool {
        self.nodes.iter().any(|n| n.name == name)
    }

    /// Children of the node called `name`, or an empty tree
    pub fn get(&self, name: &str) -> &FilterTree {
        self.nodes
            .iter()
            .find(|n| n.name == name)
            .map(|n| &n.children)
            .unwrap_or(&EMPTY_TREE)
    }
}

impl From<Vec<FilterNode>> for FilterTree {
    fn from(nodes: Vec<FilterNode>) -> Self {
        Self { nodes }
    }
}

impl<'a> IntoIterator for &'a FilterTree {
    type Item = &'a FilterNode;
    type IntoIter = std::slice::Iter<'a, FilterNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

impl std::fmt::Display for FilterTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, node) in self.nodes.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", node.name)?;
            if !node.children.is_empty() {
                write!(f, "({})", node.children)?;
            }
        }
        Ok(())
    }
}

/// A parsed DSL string: the tree plus the `*` flag
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    pub tree: FilterTree,
    pub recursive: bool,
}

impl FilterSpec {
    /// Spec that follows every reference
    pub fn recursive() -> Self {
        Self {
            tree: FilterTree::default(),
            recursive: true,
        }
    }

    /// Parse a DSL string, rejecting unbalanced brackets and unnamed groups
    pub fn parse(input: &str) -> Result<Self, FilterError> {
        let stripped: String = input.chars().filter(|c| !c.is_whitespace()).collect();

        if stripped == "*" {
            return Ok(Self::recursive());
        }

        Ok(Self {
            tree: parser::parse_tree(&stripped)?,
            recursive: false,
        })
    }

    /// Parse a DSL string, falling back to an empty filter on syntax errors.
    ///
    /// The failure is logged and recorded in `diagnostics`; it never aborts the call.
    pub fn parse_lenient(input: &str, diagnostics: &mut Vec<Diagnostic>) -> Self {
        match Self::parse(input) {
            Ok(spec) => spec,
            Err(error) => {
                log::warn!("Ignoring filter '{}': {}", input, error);
                diagnostics.push(Diagnostic::FilterSyntax {
                    input: input.to_string(),
                    error,
                });
                Self::default()
            }
        }
    }
}

impl std::fmt::Display for FilterSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.recursive {
            write!(f, "*")
        } else {
            write!(f, "{}", self.tree)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(tree: &FilterTree) -> Vec<&str> {
        tree.iter().map(|n| n.name.as_str()).collect()
    }

    #[test]
    fn test_wildcard_sets_recursive() {
        let spec = FilterSpec::parse("*").unwrap();
        assert!(spec.recursive);
        assert!(spec.tree.is_empty());

        let spec = FilterSpec::parse(" * ").unwrap();
        assert!(spec.recursive);
    }

    #[test]
    fn test_empty_input() {
        let spec = FilterSpec::parse("").unwrap();
        assert!(!spec.recursive);
        assert!(spec.tree.is_empty());
    }

    #[test]
    fn test_flat_list() {
        let spec = FilterSpec::parse("a,b").unwrap();
        assert_eq!(names(&spec.tree), vec!["a", "b"]);

        let spec = FilterSpec::parse("A, B").unwrap();
        assert_eq!(names(&spec.tree), vec!["A", "B"]);
    }

    #[test]
    fn test_nested_between_siblings() {
        let spec = FilterSpec::parse("a,b(c,d),e").unwrap();
        assert_eq!(names(&spec.tree), vec!["a", "b", "e"]);
        assert_eq!(names(spec.tree.get("b")), vec!["c", "d"]);
        assert!(spec.tree.get("a").is_empty());
        assert!(spec.tree.get("e").is_empty());
    }

    #[test]
    fn test_deep_nesting() {
        let spec = FilterSpec::parse("a(b(c(d))),e").unwrap();
        assert_eq!(names(&spec.tree), vec!["a", "e"]);

        let b = spec.tree.get("a");
        assert_eq!(names(b), vec!["b"]);
        let c = b.get("b");
        assert_eq!(names(c), vec!["c"]);
        assert_eq!(names(c.get("c")), vec!["d"]);
    }

    #[test]
    fn test_nested_groups_with_trailing_sibling() {
        let spec = FilterSpec::parse("A, B(C(D, E), F), G").unwrap();
        assert_eq!(names(&spec.tree), vec!["A", "B", "G"]);
        assert_eq!(names(spec.tree.get("B")), vec!["C", "F"]);
        assert_eq!(names(spec.tree.get("B").get("C")), vec!["D", "E"]);
    }

    #[test]
    fn test_only_nested() {
        let spec = FilterSpec::parse("A(B(C))").unwrap();
        assert_eq!(names(&spec.tree), vec!["A"]);
        assert_eq!(names(spec.tree.get("A").get("B")), vec!["C"]);
    }

    #[test]
    fn test_unbalanced_rejected() {
        assert!(matches!(
            FilterSpec::parse("a(b"),
            Err(FilterError::Unbalanced { .. })
        ));
        assert!(matches!(
            FilterSpec::parse("a)b("),
            Err(FilterError::Unbalanced { .. })
        ));
    }

    #[test]
    fn test_lenient_falls_back_to_empty() {
        let mut diagnostics = Vec::new();
        let spec = FilterSpec::parse_lenient("a(b", &mut diagnostics);

        assert!(spec.tree.is_empty());
        assert!(!spec.recursive);
        assert_eq!(diagnostics.len(), 1);
        assert!(matches!(diagnostics[0], Diagnostic::FilterSyntax { .. }));
    }

    #[test]
    fn test_lenient_rejects_deep_nesting() {
        let depth = 10_000;
        let input = format!("{}b{}", "a(".repeat(depth), ")".repeat(depth));
        let mut diagnostics = Vec::new();
        let spec = FilterSpec::parse_lenient(&input, &mut diagnostics);

        assert!(spec.tree.is_empty());
        assert_eq!(diagnostics.len(), 1);
        assert!(matches!(
            diagnostics[0],
            Diagnostic::FilterSyntax {
                error: FilterError::TooDeep { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_contains_vs_names() {
        let empty = FilterTree::new();
        assert!(empty.contains("anything"));
        assert!(!empty.names("anything"));

        let spec = FilterSpec::parse("a,b(c)").unwrap();
        assert!(spec.tree.contains("a"));
        assert!(spec.tree.names("b"));
        assert!(!spec.tree.contains("c"));
        assert!(!spec.tree.names("c"));
    }

    #[test]
    fn test_get_missing_is_empty() {
        let spec = FilterSpec::parse("a(b)").unwrap();
        assert!(spec.tree.get("zzz").is_empty());
    }

    #[test]
    fn test_display_canonical() {
        let spec = FilterSpec::parse("a , b( c,d ),e").unwrap();
        assert_eq!(spec.to_string(), "a,b(c,d),e");
        assert_eq!(FilterSpec::recursive().to_string(), "*");
    }
}
