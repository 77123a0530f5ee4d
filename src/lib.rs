//! Monkey: a tree-walking interpreter with lexical closures and a
//! quote/unquote macro system.

pub mod ast;
pub mod builtins;
pub mod config;
pub mod env;
pub mod error;
pub mod eval;
pub mod lexer;
pub mod macros;
pub mod parser;
pub mod value;

use env::Environment;
use lexer::Tokens;
use parser::Parser;
use value::EvalResult;

/// The result of running a program: one rendered string per top-level
/// statement, and the parser's error list (empty on a clean parse).
pub struct InterpretOutcome {
    pub results: Vec<String>,
    pub parse_errors: Vec<String>,
}

/// Lexes, parses, macro-expands, and evaluates `source` against a fresh
/// global environment. If parsing produces any errors, evaluation is
/// skipped entirely and `results` is empty — matching spec.md's "a single
/// bad statement never hides errors later" parser contract, inverted at the
/// program level: a malformed program never partially evaluates.
pub fn run(source: &str) -> InterpretOutcome {
    let toks = Tokens::lex(source);
    let (program, parse_errors) = Parser::parse(&toks);

    if !parse_errors.is_empty() {
        return InterpretOutcome {
            results: Vec::new(),
            parse_errors,
        };
    }

    let macro_env = Environment::new();
    let program = macros::define_macros(program, &macro_env, &toks);
    let program = macros::expand_macros(&program, &macro_env, &toks);

    let env = Environment::new();
    let results = eval::eval_program(&program, &env, &toks)
        .iter()
        .map(|result| result.render(&toks))
        .collect();

    InterpretOutcome {
        results,
        parse_errors: Vec::new(),
    }
}

/// Evaluates one line against an existing environment, for the REPL: state
/// persists across calls the way a script's top-level scope would within a
/// single `run`.
pub fn run_line(source: &str, env: &std::rc::Rc<Environment>, macro_env: &std::rc::Rc<Environment>) -> InterpretOutcome {
    let toks = Tokens::lex(source);
    let (program, parse_errors) = Parser::parse(&toks);

    if !parse_errors.is_empty() {
        return InterpretOutcome {
            results: Vec::new(),
            parse_errors,
        };
    }

    let program = macros::define_macros(program, macro_env, &toks);
    let program = macros::expand_macros(&program, macro_env, &toks);

    let results: Vec<String> = eval::eval_program(&program, env, &toks)
        .iter()
        .map(|result: &EvalResult| result.render(&toks))
        .collect();

    InterpretOutcome {
        results,
        parse_errors: Vec::new(),
    }
}
