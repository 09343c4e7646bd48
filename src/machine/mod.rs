// ABOUTME: The control-stack-environment evaluator: node model, environment
// table, built-in dispatch, and the machine driver itself

pub mod builtins;
pub mod cse;
pub mod env;
pub mod node;

pub use cse::{run, run_with_writer, Cse};
pub use node::{BoundVars, Node};
