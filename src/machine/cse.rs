// ABOUTME: The control-stack-environment driver loop (§4.3): startup,
// per-node dispatch, GAMMA application, BETA selection, and environment exit

use super::builtins;
use super::env::EnvTable;
use super::node::{BoundVars, Node};
use crate::config::is_builtin;
use crate::error::RpalError;
use crate::flatten::Program;
use std::collections::HashMap;
use std::io::Write;

/// Owns the three machine registers plus the environment table and drives
/// them to completion against a flattened `Program`, writing `Print`/`print`
/// output through `writer`.
pub struct Cse<'p, W: Write> {
    control: Vec<Node>,
    stack: Vec<Node>,
    env_stack: Vec<usize>,
    envs: EnvTable,
    program: &'p Program,
    writer: &'p mut W,
}

/// Runs `program` to completion against real stdout.
pub fn run(program: &Program) -> Result<(), RpalError> {
    run_with_writer(program, &mut std::io::stdout())
}

/// Runs `program` to completion, writing any `Print`/`print` output to
/// `writer` instead of stdout. Used directly by tests that need to assert
/// on the machine's printed output.
pub fn run_with_writer<W: Write>(program: &Program, writer: &mut W) -> Result<(), RpalError> {
    let mut machine = Cse::new(program, writer);
    machine.evaluate()
}

impl<'p, W: Write> Cse<'p, W> {
    fn new(program: &'p Program, writer: &'p mut W) -> Self {
        let mut envs = EnvTable::new();
        let root = envs.push_root();
        let mut control = vec![Node::Env(root)];
        control.extend(program.get(0).iter().cloned());
        let stack = vec![Node::Env(root)];
        Cse {
            control,
            stack,
            env_stack: vec![root],
            envs,
            program,
            writer,
        }
    }

    fn evaluate(&mut self) -> Result<(), RpalError> {
        loop {
            let top = self
                .control
                .pop()
                .ok_or_else(|| RpalError::InvalidControl("control exhausted before E0 closed".to_string()))?;
            if matches!(top, Node::Env(0)) {
                return Ok(());
            }
            self.step(top)?;
        }
    }

    fn current_env(&self) -> usize {
        *self.env_stack.last().expect("env_stack is never empty mid-run")
    }

    fn step(&mut self, top: Node) -> Result<(), RpalError> {
        match top {
            Node::Integer(_) | Node::Str(_) | Node::Boolean(_) | Node::Tuple(_) => {
                self.stack.push(top);
            }
            Node::Identifier(name) => self.step_identifier(name)?,
            Node::Lambda { k, vars, .. } => {
                self.stack.push(Node::Lambda {
                    k,
                    vars,
                    env: Some(self.current_env()),
                });
            }
            Node::Gamma => self.step_gamma()?,
            Node::Operator(op) => self.step_operator(&op)?,
            Node::Tau(n) => self.step_tau(n)?,
            Node::Beta => self.step_beta()?,
            Node::Env(_) => self.step_env_exit()?,
            Node::Eeta { .. } | Node::Delta(_) => {
                return Err(RpalError::InvalidControl(format!(
                    "{} cannot appear as a bare control node",
                    top.type_name()
                )))
            }
        }
        Ok(())
    }

    fn step_identifier(&mut self, name: String) -> Result<(), RpalError> {
        if let Some(value) = self.envs.lookup(self.current_env(), &name) {
            self.stack.push(value.clone());
        } else if is_builtin(&name) {
            self.stack.push(Node::Identifier(name));
        } else if name == "nil" {
            self.stack.push(Node::Tuple(Vec::new()));
        } else if name == "dummy" {
            self.stack.push(Node::Identifier(name));
        } else {
            return Err(RpalError::UnboundIdentifier(name));
        }
        Ok(())
    }

    fn step_gamma(&mut self) -> Result<(), RpalError> {
        let rator = self
            .stack
            .pop()
            .ok_or_else(|| RpalError::InvalidControl("gamma with empty stack".to_string()))?;
        match rator {
            Node::Lambda { k, vars, env } => self.apply_lambda(k, vars, env.ok_or_else(|| {
                RpalError::InvalidControl("lambda applied before entering control".to_string())
            })?),
            Node::Eeta { k, vars, env } => {
                self.stack.push(Node::Eeta {
                    k,
                    vars: vars.clone(),
                    env,
                });
                self.stack.push(Node::Lambda {
                    k,
                    vars,
                    env: Some(env),
                });
                self.control.push(Node::Gamma);
                self.control.push(Node::Gamma);
                Ok(())
            }
            Node::Tuple(elements) => self.apply_index(&elements),
            Node::Identifier(name) => {
                builtins::dispatch(&name, &mut self.stack, &mut self.control, self.writer)
            }
            other => Err(RpalError::InvalidApplication(format!(
                "cannot apply a value of type {}",
                other.type_name()
            ))),
        }
    }

    fn apply_lambda(&mut self, k: usize, vars: BoundVars, parent: usize) -> Result<(), RpalError> {
        let rand = self
            .stack
            .pop()
            .ok_or_else(|| RpalError::InvalidControl("gamma rand missing".to_string()))?;
        let bindings = bind(&vars, rand)?;
        let new_env = self.envs.push(parent, bindings);
        self.env_stack.push(new_env);
        self.control.push(Node::Env(new_env));
        self.stack.push(Node::Env(new_env));
        self.control.extend(self.program.get(k).iter().cloned());
        Ok(())
    }

    fn apply_index(&mut self, elements: &[Node]) -> Result<(), RpalError> {
        let index_node = self
            .stack
            .pop()
            .ok_or_else(|| RpalError::InvalidControl("tuple index missing".to_string()))?;
        let Node::Integer(text) = index_node else {
            return Err(RpalError::type_error(
                "tuple indexing",
                "index must be an integer",
            ));
        };
        let index: usize = text
            .parse()
            .map_err(|_| RpalError::type_error("tuple indexing", format!("not an integer: {}", text)))?;
        if index == 0 || index > elements.len() {
            return Err(RpalError::IndexError(format!(
                "index {} out of range for tuple of length {}",
                index,
                elements.len()
            )));
        }
        self.stack.push(elements[index - 1].clone());
        Ok(())
    }

    fn step_tau(&mut self, n: usize) -> Result<(), RpalError> {
        let mut elements = Vec::with_capacity(n);
        for _ in 0..n {
            elements.push(
                self.stack
                    .pop()
                    .ok_or_else(|| RpalError::InvalidControl("tau with too few stack values".to_string()))?,
            );
        }
        self.stack.push(Node::Tuple(elements));
        Ok(())
    }

    fn step_beta(&mut self) -> Result<(), RpalError> {
        let condition = self
            .stack
            .pop()
            .ok_or_else(|| RpalError::InvalidControl("beta with empty stack".to_string()))?;
        let truthy = match condition {
            Node::Boolean(b) => b,
            other => {
                return Err(RpalError::type_error(
                    "conditional",
                    format!("condition must be boolean, got {}", other.type_name()),
                ))
            }
        };
        // Both DELTA markers sit at the end of control as [..., Delta(t), Delta(e)],
        // so Delta(e) pops first. Both are always consumed: TRUE discards the
        // first pop (Delta(e)) and uses the second (Delta(t)); FALSE uses the
        // first pop (Delta(e)) and discards the second (Delta(t)).
        let selected = if truthy {
            let _delta_e = self.control.pop();
            self.control.pop()
        } else {
            let delta_e = self.control.pop();
            let _delta_t = self.control.pop();
            delta_e
        };
        match selected {
            Some(Node::Delta(k)) => {
                self.control.extend(self.program.get(k).iter().cloned());
                Ok(())
            }
            other => Err(RpalError::InvalidControl(format!(
                "beta expected a delta marker, found {:?}",
                other
            ))),
        }
    }

    fn step_env_exit(&mut self) -> Result<(), RpalError> {
        let mut buf = Vec::new();
        loop {
            let node = self
                .stack
                .pop()
                .ok_or_else(|| RpalError::InvalidControl("env exit without matching marker".to_string()))?;
            if matches!(node, Node::Env(_)) {
                break;
            }
            buf.push(node);
        }
        for node in buf.into_iter().rev() {
            self.stack.push(node);
        }
        self.env_stack.pop();
        Ok(())
    }

    fn step_operator(&mut self, op: &str) -> Result<(), RpalError> {
        let val1 = self
            .stack
            .pop()
            .ok_or_else(|| RpalError::InvalidControl("operator with empty stack".to_string()))?;
        let val2 = self
            .stack
            .pop()
            .ok_or_else(|| RpalError::InvalidControl("operator missing second operand".to_string()))?;
        match op {
            "+" | "-" | "*" | "/" | "**" => {
                let a = int_of(&val1, op)?;
                let b = int_of(&val2, op)?;
                let result = match op {
                    "+" => a + b,
                    "-" => a - b,
                    "*" => a * b,
                    "/" => {
                        if b == 0 {
                            return Err(RpalError::DivByZero);
                        }
                        a / b
                    }
                    "**" => a.pow(u32::try_from(b).map_err(|_| {
                        RpalError::type_error("**", "negative exponent")
                    })?),
                    _ => unreachable!(),
                };
                self.stack.push(Node::Integer(result.to_string()));
            }
            "neg" => {
                let a = int_of(&val1, op)?;
                self.stack.push(val2);
                self.stack.push(Node::Integer((-a).to_string()));
            }
            "not" => {
                let a = bool_of(&val1, op)?;
                self.stack.push(val2);
                self.stack.push(Node::Boolean(!a));
            }
            "eq" | "ne" | "gr" | "ge" | "ls" | "le" => {
                let a = int_of(&val1, op)?;
                let b = int_of(&val2, op)?;
                let result = match op {
                    "eq" => a == b,
                    "ne" => a != b,
                    "gr" => a > b,
                    "ge" => a >= b,
                    "ls" => a < b,
                    "le" => a <= b,
                    _ => unreachable!(),
                };
                self.stack.push(Node::Boolean(result));
            }
            "or" | "&" => {
                let a = bool_of(&val1, op)?;
                let b = bool_of(&val2, op)?;
                let result = if op == "or" { a || b } else { a && b };
                self.stack.push(Node::Boolean(result));
            }
            "aug" => self.step_aug(val1, val2)?,
            other => {
                return Err(RpalError::InvalidControl(format!("unknown operator: {}", other)))
            }
        }
        Ok(())
    }

    fn step_aug(&mut self, val1: Node, val2: Node) -> Result<(), RpalError> {
        let Node::Tuple(mut elements) = val1 else {
            return Err(RpalError::type_error("aug", "left operand must be a tuple"));
        };
        match val2 {
            Node::Integer(_) | Node::Str(_) | Node::Boolean(_) | Node::Tuple(_) => {
                elements.push(val2);
                self.stack.push(Node::Tuple(elements));
                Ok(())
            }
            other => Err(RpalError::type_error(
                "aug",
                format!("cannot augment with a value of type {}", other.type_name()),
            )),
        }
    }
}

fn int_of(node: &Node, op: &str) -> Result<i64, RpalError> {
    match node {
        Node::Integer(text) => text
            .parse()
            .map_err(|_| RpalError::type_error(op, format!("not an integer: {}", text))),
        other => Err(RpalError::type_error(
            op,
            format!("expected integer, got {}", other.type_name()),
        )),
    }
}

fn bool_of(node: &Node, op: &str) -> Result<bool, RpalError> {
    match node {
        Node::Boolean(b) => Ok(*b),
        other => Err(RpalError::type_error(
            op,
            format!("expected boolean, got {}", other.type_name()),
        )),
    }
}

/// Binds a lambda's parameter spec to an applied value (§4.3.3). A `Multiple`
/// spec destructures a `Tuple` element-by-element; a nested `Tuple` element
/// binds its variable to that nested tuple directly.
fn bind(vars: &BoundVars, value: Node) -> Result<HashMap<String, Node>, RpalError> {
    match vars {
        BoundVars::Single(name) => {
            let mut bindings = HashMap::with_capacity(1);
            bindings.insert(name.clone(), value);
            Ok(bindings)
        }
        BoundVars::Multiple(names) => match value {
            Node::Tuple(elements) => {
                if elements.len() != names.len() {
                    return Err(RpalError::arity_mismatch(
                        "lambda application",
                        names.len(),
                        elements.len(),
                    ));
                }
                let mut bindings = HashMap::with_capacity(names.len());
                for (name, element) in names.iter().zip(elements.into_iter()) {
                    bindings.insert(name.to_string(), element);
                }
                Ok(bindings)
            }
            other => Err(RpalError::type_error(
                "lambda application",
                format!("expected a tuple to destructure, got {}", other.type_name()),
            )),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten::flatten;
    use crate::lexer::tokenize;
    use crate::parser::parse;
    use crate::standardize::standardize;

    fn run_source(source: &str) -> Result<(), RpalError> {
        let tokens = tokenize(source)?;
        let tree = parse(&tokens)?;
        let standardized = standardize(tree)?;
        let program = flatten(&standardized)?;
        run(&program)
    }

    #[test]
    fn let_binding_evaluates() {
        assert!(run_source("let x = 5 in Print x").is_ok());
    }

    #[test]
    fn arithmetic_and_conditional() {
        assert!(run_source("Print((1 + 2) gr 2 -> 'big' | 'small')").is_ok());
    }

    #[test]
    fn recursive_function_via_rec() {
        assert!(run_source("let rec F N = N eq 1 -> 1 | N * F(N-1) in Print(F 5)").is_ok());
    }

    #[test]
    fn unbound_identifier_fails() {
        let err = run_source("Print(doesNotExist)").unwrap_err();
        assert!(matches!(err, RpalError::UnboundIdentifier(_)));
    }

    #[test]
    fn division_by_zero_fails() {
        let err = run_source("Print(1 / 0)").unwrap_err();
        assert!(matches!(err, RpalError::DivByZero));
    }
}
