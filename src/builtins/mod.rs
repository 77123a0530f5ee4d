//! Built-in functions: `len`, `first`, `last`, `rest`, `push`, `puts`.
//!
//! Builtins are not bound in any `Environment` — `eval::eval_identifier` falls
//! back to `lookup` only after the environment chain misses, and a call site
//! dispatches a resolved name through `call`. `quote` is not here: it is
//! special-cased directly in the Call evaluator since it needs the calling
//! environment and `Tokens` view, not just its evaluated arguments.

mod console;
mod lists;

use crate::error::EvalError;
use crate::lexer::Tokens;
use crate::value::EvalResult;

const NAMES: &[&str] = &["len", "first", "last", "rest", "push", "puts"];

/// Resolves a bare identifier to a builtin's canonical name, if it is one.
pub fn lookup(name: &str) -> Option<&'static str> {
    NAMES.iter().find(|&&n| n == name).copied()
}

/// Dispatches a resolved builtin name to its implementation. `toks` is only
/// used by `puts`, to render arguments with the same rules a final result
/// would use.
pub fn call(name: &'static str, args: Vec<EvalResult>, toks: &Tokens) -> Result<EvalResult, EvalError> {
    match name {
        "len" => lists::len(&args),
        "first" => lists::first(&args),
        "last" => lists::last(&args),
        "rest" => lists::rest(&args),
        "push" => lists::push(&args),
        "puts" => console::puts(&args, toks),
        _ => unreachable!("call dispatched with a name lookup() never returns"),
    }
}

fn require_one(args: &[EvalResult]) -> Result<&EvalResult, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::WrongArgumentCount {
            got: args.len(),
            want: 1,
        });
    }
    Ok(&args[0])
}
