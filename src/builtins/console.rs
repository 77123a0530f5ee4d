//! `puts` — prints each argument's final-result form on its own line.

use crate::error::EvalError;
use crate::lexer::Tokens;
use crate::value::EvalResult;

/// Reuses `EvalResult::render`, the same rules a script driver uses to print
/// a final result, so `puts(5)` and a bare `5;` print identically.
pub fn puts(args: &[EvalResult], toks: &Tokens) -> Result<EvalResult, EvalError> {
    for arg in args {
        println!("{}", arg.render(toks));
    }
    Ok(EvalResult::Unit)
}
