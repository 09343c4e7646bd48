// ABOUTME: The tagged machine node used uniformly as both control-structure
// items and stack values (§3.3)

/// Distinguishes single-variable lambdas from comma-list (destructuring)
/// lambdas without a boolean flag (§9 design note).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoundVars {
    Single(String),
    Multiple(Vec<String>),
}

impl BoundVars {
    pub fn len(&self) -> usize {
        match self {
            BoundVars::Single(_) => 1,
            BoundVars::Multiple(vars) => vars.len(),
        }
    }

    pub fn names(&self) -> Vec<&str> {
        match self {
            BoundVars::Single(name) => vec![name.as_str()],
            BoundVars::Multiple(names) => names.iter().map(|s| s.as_str()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Integer(String),
    Str(String),
    Boolean(bool),
    Identifier(String),
    Operator(String),
    Gamma,
    Lambda {
        k: usize,
        vars: BoundVars,
        env: Option<usize>,
    },
    Eeta {
        k: usize,
        vars: BoundVars,
        env: usize,
    },
    Delta(usize),
    Beta,
    Tau(usize),
    Env(usize),
    Tuple(Vec<Node>),
}

impl Node {
    pub fn type_name(&self) -> &'static str {
        match self {
            Node::Integer(_) => "integer",
            Node::Str(_) => "string",
            Node::Boolean(_) => "boolean",
            Node::Identifier(_) => "identifier",
            Node::Operator(_) => "operator",
            Node::Gamma => "gamma",
            Node::Lambda { .. } => "lambda",
            Node::Eeta { .. } => "eta",
            Node::Delta(_) => "delta",
            Node::Beta => "beta",
            Node::Tau(_) => "tau",
            Node::Env(_) => "env",
            Node::Tuple(_) => "tuple",
        }
    }

    pub fn boolean_text(value: bool) -> &'static str {
        if value {
            "true"
        } else {
            "false"
        }
    }
}
