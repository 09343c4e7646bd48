// ABOUTME: Library surface exposing the pipeline stages for integration tests

pub mod config;
pub mod dot;
pub mod error;
pub mod flatten;
pub mod lexer;
pub mod machine;
pub mod parser;
pub mod standardize;
pub mod tree;

use error::RpalError;

/// Runs the full pipeline (lex, parse, standardize, flatten, evaluate)
/// against `source`, performing any `Print`/`print` side effects.
pub fn interpret(source: &str) -> Result<(), RpalError> {
    interpret_to(source, &mut std::io::stdout())
}

/// Runs the full pipeline against `source`, writing any `Print`/`print`
/// output to `writer` instead of stdout. Used by tests that assert on the
/// machine's printed output.
pub fn interpret_to(source: &str, writer: &mut impl std::io::Write) -> Result<(), RpalError> {
    let tokens = lexer::tokenize(source)?;
    let tree = parser::parse(&tokens)?;
    let standardized = standardize::standardize(tree)?;
    let program = flatten::flatten(&standardized)?;
    machine::run_with_writer(&program, writer)
}
