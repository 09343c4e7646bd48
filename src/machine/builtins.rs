// ABOUTME: The fixed built-in function table, dispatched by the GAMMA rule
// when the rator is an unbound identifier matching a name in `config::BUILTIN_FUNCTIONS`

use super::node::{BoundVars, Node};
use crate::error::RpalError;
use std::io::Write;

/// Applies a built-in named `name` against `stack`, writing any `Print`/
/// `print` output to `writer`. Most built-ins pop one argument and push one
/// result; `Print`/`print` pop and write without pushing; `Conc` additionally
/// discards one pending control node, mirroring the curried two-argument
/// application it collapses into a single step.
pub fn dispatch(
    name: &str,
    stack: &mut Vec<Node>,
    control: &mut Vec<Node>,
    writer: &mut impl Write,
) -> Result<(), RpalError> {
    match name {
        "Print" | "print" => {
            let value = pop(stack, name)?;
            write!(writer, "{}", format_value(&value))
                .map_err(|e| RpalError::IoError(e.to_string()))?;
            Ok(())
        }
        "Isinteger" => unary_predicate(stack, name, |v| matches!(v, Node::Integer(_))),
        "Isstring" => unary_predicate(stack, name, |v| matches!(v, Node::Str(_))),
        "Istuple" => unary_predicate(stack, name, |v| matches!(v, Node::Tuple(_))),
        "Isempty" => {
            let value = pop(stack, name)?;
            match value {
                Node::Tuple(elements) => {
                    stack.push(Node::Boolean(elements.is_empty()));
                    Ok(())
                }
                other => Err(RpalError::type_error(
                    name,
                    format!("expected a tuple, got {}", other.type_name()),
                )),
            }
        }
        "Order" => {
            let value = pop(stack, name)?;
            match value {
                Node::Tuple(elements) => {
                    stack.push(Node::Integer(elements.len().to_string()));
                    Ok(())
                }
                other => Err(RpalError::type_error(
                    name,
                    format!("expected a tuple, got {}", other.type_name()),
                )),
            }
        }
        "Conc" => {
            let first = pop(stack, name)?;
            let second = pop(stack, name)?;
            // The second application's GAMMA never fires as a separate step;
            // one pending control node belongs to it and is discarded here.
            control.pop();
            match (first, second) {
                (Node::Str(a), Node::Str(b)) => {
                    stack.push(Node::Str(a + &b));
                    Ok(())
                }
                (Node::Str(a), Node::Integer(b)) => {
                    stack.push(Node::Str(a + &b));
                    Ok(())
                }
                (first, _) => Err(RpalError::type_error(
                    name,
                    format!("expected a string first argument, got {}", first.type_name()),
                )),
            }
        }
        "Stem" => {
            let value = pop(stack, name)?;
            match value {
                Node::Str(s) => {
                    stack.push(Node::Str(s.chars().next().map(String::from).unwrap_or_default()));
                    Ok(())
                }
                other => Err(RpalError::type_error(
                    name,
                    format!("expected a string, got {}", other.type_name()),
                )),
            }
        }
        "Stern" => {
            let value = pop(stack, name)?;
            match value {
                Node::Str(s) => {
                    stack.push(Node::Str(s.chars().skip(1).collect()));
                    Ok(())
                }
                other => Err(RpalError::type_error(
                    name,
                    format!("expected a string, got {}", other.type_name()),
                )),
            }
        }
        "Y*" => {
            let value = pop(stack, name)?;
            match value {
                Node::Lambda { k, vars, env: Some(env) } => {
                    stack.push(Node::Eeta { k, vars, env });
                    Ok(())
                }
                other => Err(RpalError::type_error(
                    name,
                    format!("expected a lambda, got {}", other.type_name()),
                )),
            }
        }
        "ItoS" => {
            let value = pop(stack, name)?;
            match value {
                Node::Integer(s) => {
                    stack.push(Node::Str(s));
                    Ok(())
                }
                other => Err(RpalError::type_error(
                    name,
                    format!("expected an integer, got {}", other.type_name()),
                )),
            }
        }
        other => Err(RpalError::InvalidApplication(format!(
            "'{}' is not a built-in function",
            other
        ))),
    }
}

fn pop(stack: &mut Vec<Node>, name: &str) -> Result<Node, RpalError> {
    stack
        .pop()
        .ok_or_else(|| RpalError::type_error(name, "missing argument"))
}

fn unary_predicate(stack: &mut Vec<Node>, name: &str, predicate: impl Fn(&Node) -> bool) -> Result<(), RpalError> {
    let value = pop(stack, name)?;
    stack.push(Node::Boolean(predicate(&value)));
    Ok(())
}

/// Renders a value the way `Print` writes it to stdout (§4.3.3): tuples as a
/// parenthesized, comma-separated, recursively-bracketed list; `dummy` as the
/// literal word; closures as `[lambda closure: <name>: <csIndex>]`; anything
/// else by its own textual value.
fn format_value(node: &Node) -> String {
    match node {
        Node::Integer(s) | Node::Str(s) => s.clone(),
        Node::Boolean(b) => Node::boolean_text(*b).to_string(),
        Node::Identifier(name) if name == "dummy" => "dummy".to_string(),
        Node::Identifier(name) => name.clone(),
        Node::Tuple(elements) => {
            let body = elements
                .iter()
                .map(format_value)
                .collect::<Vec<_>>()
                .join(", ");
            format!("({})", body)
        }
        Node::Lambda { k, vars, .. } | Node::Eeta { k, vars, .. } => {
            format!("[lambda closure: {}: {}]", bound_var_text(vars), k)
        }
        other => other.type_name().to_string(),
    }
}

fn bound_var_text(vars: &BoundVars) -> String {
    match vars {
        BoundVars::Single(name) => name.clone(),
        BoundVars::Multiple(names) => names.join(","),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_counts_tuple_elements() {
        let mut stack = vec![Node::Tuple(vec![Node::Integer("1".to_string()), Node::Integer("2".to_string())])];
        let mut control = Vec::new();
        let mut out = Vec::new();
        dispatch("Order", &mut stack, &mut control, &mut out).unwrap();
        assert_eq!(stack.pop(), Some(Node::Integer("2".to_string())));
    }

    #[test]
    fn conc_joins_strings_and_drops_a_control_node() {
        let mut stack = vec![
            Node::Str("cd".to_string()),
            Node::Str("ab".to_string()),
        ];
        let mut control = vec![Node::Gamma];
        let mut out = Vec::new();
        dispatch("Conc", &mut stack, &mut control, &mut out).unwrap();
        assert_eq!(stack.pop(), Some(Node::Str("abcd".to_string())));
        assert!(control.is_empty());
    }

    #[test]
    fn isempty_rejects_non_tuple() {
        let mut stack = vec![Node::Integer("1".to_string())];
        let mut control = Vec::new();
        let mut out = Vec::new();
        let err = dispatch("Isempty", &mut stack, &mut control, &mut out).unwrap_err();
        assert!(matches!(err, RpalError::TypeError { .. }));
    }

    #[test]
    fn print_writes_formatted_tuple() {
        let mut stack = vec![Node::Tuple(vec![
            Node::Integer("1".to_string()),
            Node::Tuple(vec![Node::Integer("2".to_string()), Node::Integer("3".to_string())]),
            Node::Integer("4".to_string()),
        ])];
        let mut control = Vec::new();
        let mut out = Vec::new();
        dispatch("Print", &mut stack, &mut control, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "(1, (2, 3), 4)");
    }
}
