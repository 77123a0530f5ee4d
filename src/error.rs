//! Typed failure modes for built-ins and the macro pass.
//!
//! Builtin errors are recoverable: the evaluator converts any `Err` a
//! built-in returns into an ordinary `EvalResult::Error` value (see
//! `value.rs`) rather than unwinding. `MacroError` is different — each of
//! its variants names one of the interpreter-contract violations the macro
//! pass treats as fatal, and is turned into a panic at the expansion
//! boundary instead of a program-visible error value.

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum EvalError {
    #[error("Wrong number of arguments. Got {got} arguments, want {want} argument{}", if *want == 1 { "" } else { "s" })]
    WrongArgumentCount { got: usize, want: usize },

    #[error("`{name}` not supported for argument")]
    NotSupportedForArgument { name: &'static str },

    #[error("argument to `push` must be array")]
    PushNotArray,
}

#[derive(Error, Debug, Clone)]
pub enum MacroError {
    #[error("macro body must evaluate to a quote")]
    BodyNotQuote,

    #[error("unquote produced a value with no AST form")]
    UnquoteHasNoNode,
}
