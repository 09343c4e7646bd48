// ABOUTME: Depth-first flattener producing the indexed control structure table (§4.2)

use crate::error::RpalError;
use crate::machine::node::{BoundVars, Node};
use crate::tree::Tree;

/// The full program: an immutable mapping from control-structure index to
/// its flat sequence of machine nodes. `CS0` is always index 0.
#[derive(Debug, Clone)]
pub struct Program {
    structures: Vec<Vec<Node>>,
}

impl Program {
    pub fn get(&self, index: usize) -> &[Node] {
        &self.structures[index]
    }

    pub fn len(&self) -> usize {
        self.structures.len()
    }
}

struct Flattener {
    structures: Vec<Vec<Node>>,
    next_cs: usize,
}

/// Flattens a standardized tree into a `Program` rooted at `CS0`.
pub fn flatten(tree: &Tree) -> Result<Program, RpalError> {
    let mut flattener = Flattener {
        structures: vec![Vec::new()],
        next_cs: 1,
    };
    flattener.flatten_into(tree, 0)?;
    Ok(Program {
        structures: flattener.structures,
    })
}

impl Flattener {
    fn allocate(&mut self) -> usize {
        let k = self.next_cs;
        self.next_cs += 1;
        self.structures.push(Vec::new());
        k
    }

    fn emit(&mut self, cs: usize, node: Node) {
        self.structures[cs].push(node);
    }

    fn flatten_into(&mut self, tree: &Tree, cs: usize) -> Result<(), RpalError> {
        match tree.label.as_str() {
            "identifier" => {
                let name = leaf_value(tree, "identifier")?;
                self.emit(cs, Node::Identifier(name));
            }
            "integer" => {
                let v = leaf_value(tree, "integer")?;
                self.emit(cs, Node::Integer(v));
            }
            "string" => {
                let v = leaf_value(tree, "string")?;
                self.emit(cs, Node::Str(v));
            }
            "true" => self.emit(cs, Node::Boolean(true)),
            "false" => self.emit(cs, Node::Boolean(false)),
            "nil" => self.emit(cs, Node::Identifier("nil".to_string())),
            "dummy" => self.emit(cs, Node::Identifier("dummy".to_string())),
            "lambda" => self.flatten_lambda(tree, cs)?,
            "->" => self.flatten_conditional(tree, cs)?,
            "tau" => {
                self.emit(cs, Node::Tau(tree.children.len()));
                for child in &tree.children {
                    self.flatten_into(child, cs)?;
                }
            }
            "gamma" => {
                self.emit(cs, Node::Gamma);
                for child in &tree.children {
                    self.flatten_into(child, cs)?;
                }
            }
            op if is_operator(op) => {
                self.emit(cs, Node::Operator(op.to_string()));
                for child in &tree.children {
                    self.flatten_into(child, cs)?;
                }
            }
            other => {
                return Err(RpalError::StandardizationError(format!(
                    "unexpected standardized node label: {}",
                    other
                )))
            }
        }
        Ok(())
    }

    fn flatten_lambda(&mut self, tree: &Tree, cs: usize) -> Result<(), RpalError> {
        if tree.children.len() != 2 {
            return Err(RpalError::StandardizationError(
                "lambda must have exactly two children".to_string(),
            ));
        }
        let vars = bound_vars(&tree.children[0])?;
        let k = self.allocate();
        self.emit(
            cs,
            Node::Lambda {
                k,
                vars,
                env: None,
            },
        );
        self.flatten_into(&tree.children[1], k)
    }

    fn flatten_conditional(&mut self, tree: &Tree, cs: usize) -> Result<(), RpalError> {
        if tree.children.len() != 3 {
            return Err(RpalError::StandardizationError(
                "'->' must have exactly three children".to_string(),
            ));
        }
        let t = self.allocate();
        let e = self.allocate();
        self.emit(cs, Node::Delta(t));
        self.emit(cs, Node::Delta(e));
        self.emit(cs, Node::Beta);
        self.flatten_into(&tree.children[1], t)?;
        self.flatten_into(&tree.children[2], e)?;
        self.flatten_into(&tree.children[0], cs)
    }
}

fn leaf_value(tree: &Tree, label: &str) -> Result<String, RpalError> {
    tree.value.clone().ok_or_else(|| {
        RpalError::StandardizationError(format!("'{}' leaf missing a value", label))
    })
}

fn is_operator(label: &str) -> bool {
    matches!(
        label,
        "+" | "-"
            | "*"
            | "/"
            | "**"
            | "neg"
            | "not"
            | "or"
            | "&"
            | "eq"
            | "ne"
            | "gr"
            | "ge"
            | "ls"
            | "le"
            | "aug"
    )
}

fn bound_vars(spec: &Tree) -> Result<BoundVars, RpalError> {
    match spec.label.as_str() {
        "identifier" => Ok(BoundVars::Single(leaf_value(spec, "identifier")?)),
        "()" => Ok(BoundVars::Single("()".to_string())),
        "," => {
            let mut names = Vec::with_capacity(spec.children.len());
            for child in &spec.children {
                names.push(leaf_value(child, "identifier")?);
            }
            Ok(BoundVars::Multiple(names))
        }
        other => Err(RpalError::StandardizationError(format!(
            "invalid lambda bound-variable specification: {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_emits_single_node() {
        let tree = Tree::leaf("integer", "5");
        let program = flatten(&tree).unwrap();
        assert_eq!(program.len(), 1);
        assert_eq!(program.get(0), &[Node::Integer("5".to_string())]);
    }

    #[test]
    fn lambda_allocates_new_structure() {
        let tree = Tree::node(
            "lambda",
            vec![Tree::leaf("identifier", "x"), Tree::leaf("identifier", "x")],
        );
        let program = flatten(&tree).unwrap();
        assert_eq!(program.len(), 2);
        match &program.get(0)[0] {
            Node::Lambda { k, vars, env } => {
                assert_eq!(*k, 1);
                assert_eq!(*vars, BoundVars::Single("x".to_string()));
                assert_eq!(*env, None);
            }
            other => panic!("expected Lambda, got {:?}", other),
        }
        assert_eq!(program.get(1), &[Node::Identifier("x".to_string())]);
    }

    #[test]
    fn conditional_allocates_two_structures_and_emits_delta_delta_beta() {
        let tree = Tree::node(
            "->",
            vec![
                Tree::leaf("integer", "1"),
                Tree::leaf("integer", "2"),
                Tree::leaf("integer", "3"),
            ],
        );
        let program = flatten(&tree).unwrap();
        assert_eq!(program.len(), 3);
        assert_eq!(
            program.get(0),
            &[
                Node::Delta(1),
                Node::Delta(2),
                Node::Beta,
                Node::Integer("1".to_string())
            ]
        );
        assert_eq!(program.get(1), &[Node::Integer("2".to_string())]);
        assert_eq!(program.get(2), &[Node::Integer("3".to_string())]);
    }

    #[test]
    fn gamma_emits_marker_before_operands() {
        let tree = Tree::node(
            "gamma",
            vec![Tree::leaf("identifier", "Print"), Tree::leaf("integer", "5")],
        );
        let program = flatten(&tree).unwrap();
        assert_eq!(
            program.get(0),
            &[
                Node::Gamma,
                Node::Identifier("Print".to_string()),
                Node::Integer("5".to_string())
            ]
        );
    }
}
