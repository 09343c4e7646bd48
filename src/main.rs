mod config;
mod dot;
mod error;
mod flatten;
mod lexer;
mod machine;
mod parser;
mod standardize;
mod tree;

use clap::Parser as ClapParser;
use lexer::tokenize;
use std::path::PathBuf;
use std::process::ExitCode;

/// Standardizer, control-structure flattener, and CSE machine for the RPAL
/// applicative language
#[derive(ClapParser, Debug)]
#[command(name = "rpal-cse")]
#[command(version = config::VERSION)]
#[command(about = "Evaluates an RPAL source file via standardization and the CSE machine")]
struct CliArgs {
    /// RPAL source file to evaluate
    #[arg(value_name = "FILE")]
    source: PathBuf,
}

/// Pulls the single-dash `-ast` token out of `args` in place, returning
/// whether it was present. Clap's derive `long` only ever produces a
/// double-dash flag, so this one is matched by hand, the same way the
/// original CLI scans argv for the literal `-ast` token, before the rest of
/// the arguments reach clap.
fn extract_ast_flag(args: &mut Vec<String>) -> bool {
    match args.iter().position(|a| a == "-ast") {
        Some(i) => {
            args.remove(i);
            true
        }
        None => false,
    }
}

fn main() -> ExitCode {
    let mut raw_args: Vec<String> = std::env::args().collect();
    let ast = extract_ast_flag(&mut raw_args);

    let args = match CliArgs::try_parse_from(&raw_args) {
        Ok(args) => args,
        Err(e) => e.exit(),
    };

    let source = match std::fs::read_to_string(&args.source) {
        Ok(contents) => contents,
        Err(e) => {
            eprintln!("Error: cannot read {}: {}", args.source.display(), e);
            return ExitCode::FAILURE;
        }
    };

    match run(&source, ast) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(source: &str, visualize_ast: bool) -> Result<(), error::RpalError> {
    let tokens = tokenize(source)?;
    let tree = parser::parse(&tokens)?;

    if visualize_ast {
        let dot_path = PathBuf::from("ast.dot");
        let png_path = PathBuf::from("ast.png");
        if let Err(e) = dot::write_visualization(&tree, &dot_path, &png_path) {
            eprintln!("Warning: failed to write {}: {}", dot_path.display(), e);
        } else {
            println!(
                "Wrote {} (and {} if graphviz's `dot` is installed).",
                dot_path.display(),
                png_path.display()
            );
        }
        println!("Abstract Syntax Tree:");
        print!("{}", tree.to_text());
        return Ok(());
    }

    let standardized = standardize::standardize(tree)?;
    let program = flatten::flatten(&standardized)?;
    println!("Output of the above program is:");
    machine::run(&program)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evaluates_simple_source() {
        assert!(run("let x = 5 in Print x", false).is_ok());
    }

    #[test]
    fn ast_mode_does_not_evaluate() {
        assert!(run("let x = 1 / 0 in Print x", true).is_ok());
    }

    #[test]
    fn propagates_lex_errors() {
        assert!(run("Print(`)", false).is_err());
    }

    #[test]
    fn extract_ast_flag_strips_single_dash_token() {
        let mut args = vec!["rpal-cse".to_string(), "-ast".to_string(), "prog.rpal".to_string()];
        assert!(extract_ast_flag(&mut args));
        assert_eq!(args, vec!["rpal-cse".to_string(), "prog.rpal".to_string()]);
    }

    #[test]
    fn extract_ast_flag_absent_leaves_args_untouched() {
        let mut args = vec!["rpal-cse".to_string(), "prog.rpal".to_string()];
        assert!(!extract_ast_flag(&mut args));
        assert_eq!(args, vec!["rpal-cse".to_string(), "prog.rpal".to_string()]);
    }

    #[test]
    fn cli_args_parses_source_after_ast_flag_removed() {
        let mut args = vec!["rpal-cse".to_string(), "-ast".to_string(), "prog.rpal".to_string()];
        let ast = extract_ast_flag(&mut args);
        let parsed = CliArgs::try_parse_from(&args).expect("remaining args should parse");
        assert!(ast);
        assert_eq!(parsed.source, PathBuf::from("prog.rpal"));
    }
}
