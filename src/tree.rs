// ABOUTME: Generic labeled tree used for the parser's raw AST and the standardizer's output

use std::fmt;

/// A node with a string label, an optional leaf value, and ordered children.
///
/// Internal nodes carry no value; leaves (`identifier`, `integer`, `string`,
/// `true`, `false`, `nil`, `dummy`, `()`) carry one. A node owns its children
/// outright — dropping a `Tree` recursively drops the whole subtree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tree {
    pub label: String,
    pub value: Option<String>,
    pub children: Vec<Tree>,
}

impl Tree {
    pub fn leaf(label: impl Into<String>, value: impl Into<String>) -> Self {
        Tree {
            label: label.into(),
            value: Some(value.into()),
            children: Vec::new(),
        }
    }

    pub fn node(label: impl Into<String>, children: Vec<Tree>) -> Self {
        Tree {
            label: label.into(),
            value: None,
            children,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Renders the tree as the textual indented dump `-ast` prints before
    /// (or instead of) evaluation: one line per node, children indented two
    /// dots deeper than their parent.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        self.write_text(&mut out, 0);
        out
    }

    fn write_text(&self, out: &mut String, depth: usize) {
        for _ in 0..depth {
            out.push_str(". ");
        }
        out.push_str(&self.label);
        if let Some(v) = &self.value {
            out.push('(');
            out.push_str(v);
            out.push(')');
        }
        out.push('\n');
        for child in &self.children {
            child.write_text(out, depth + 1);
        }
    }
}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaf_has_no_children() {
        let leaf = Tree::leaf("integer", "5");
        assert!(leaf.is_leaf());
        assert_eq!(leaf.value.as_deref(), Some("5"));
    }

    #[test]
    fn text_dump_indents_children() {
        let tree = Tree::node(
            "gamma",
            vec![Tree::leaf("identifier", "Print"), Tree::leaf("integer", "5")],
        );
        let text = tree.to_text();
        assert_eq!(text, "gamma\n. identifier(Print)\n. integer(5)\n");
    }
}
