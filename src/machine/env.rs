// ABOUTME: Append-only environment table keyed by integer index (§3.4, §9)

use super::node::Node;
use std::collections::HashMap;

/// One frame of the environment tree. Frames are never mutated after the
/// bindings passed to `EnvTable::push` are installed.
#[derive(Debug)]
struct Frame {
    bindings: HashMap<String, Node>,
    parent: Option<usize>,
}

#[derive(Debug, Default)]
pub struct EnvTable {
    frames: Vec<Frame>,
}

impl EnvTable {
    pub fn new() -> Self {
        EnvTable { frames: Vec::new() }
    }

    /// Creates `E0`, the empty root frame. Must be called exactly once,
    /// before any other frame is pushed.
    pub fn push_root(&mut self) -> usize {
        self.frames.push(Frame {
            bindings: HashMap::new(),
            parent: None,
        });
        self.frames.len() - 1
    }

    /// Creates a new frame with the given bindings and parent, returning its index.
    pub fn push(&mut self, parent: usize, bindings: HashMap<String, Node>) -> usize {
        self.frames.push(Frame { bindings, parent });
        self.frames.len() - 1
    }

    /// Hierarchical lookup: the frame at `index`, then its ancestors.
    pub fn lookup(&self, index: usize, name: &str) -> Option<&Node> {
        let mut current = Some(index);
        while let Some(idx) = current {
            let frame = &self.frames[idx];
            if let Some(value) = frame.bindings.get(name) {
                return Some(value);
            }
            current = frame.parent;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_lookup_fails_on_empty_table() {
        let mut table = EnvTable::new();
        let root = table.push_root();
        assert!(table.lookup(root, "x").is_none());
    }

    #[test]
    fn child_sees_parent_binding() {
        let mut table = EnvTable::new();
        let root = table.push_root();
        let mut bindings = HashMap::new();
        bindings.insert("x".to_string(), Node::Integer("5".to_string()));
        let child = table.push(root, bindings);
        assert_eq!(table.lookup(child, "x"), Some(&Node::Integer("5".to_string())));
    }

    #[test]
    fn child_binding_shadows_parent() {
        let mut table = EnvTable::new();
        let root = table.push_root();
        let mut root_bindings = HashMap::new();
        root_bindings.insert("x".to_string(), Node::Integer("1".to_string()));
        let parent = table.push(root, root_bindings);
        let mut child_bindings = HashMap::new();
        child_bindings.insert("x".to_string(), Node::Integer("2".to_string()));
        let child = table.push(parent, child_bindings);
        assert_eq!(table.lookup(child, "x"), Some(&Node::Integer("2".to_string())));
    }
}
