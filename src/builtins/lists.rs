//! `len`, `first`, `last`, `rest`, `push` — array and string inspection.

use super::require_one;
use crate::error::EvalError;
use crate::value::EvalResult;

pub fn len(args: &[EvalResult]) -> Result<EvalResult, EvalError> {
    match require_one(args)? {
        EvalResult::String(s) => Ok(EvalResult::Int(s.len() as i64)),
        EvalResult::Array(items) => Ok(EvalResult::Int(items.len() as i64)),
        _ => Err(EvalError::NotSupportedForArgument { name: "len" }),
    }
}

pub fn first(args: &[EvalResult]) -> Result<EvalResult, EvalError> {
    match require_one(args)? {
        EvalResult::Array(items) => Ok(items.first().cloned().unwrap_or(EvalResult::Unit)),
        EvalResult::String(s) => match s.as_bytes().first() {
            Some(&b) => Ok(EvalResult::Character(b)),
            None => Ok(EvalResult::Character(0)),
        },
        _ => Err(EvalError::NotSupportedForArgument { name: "first" }),
    }
}

pub fn last(args: &[EvalResult]) -> Result<EvalResult, EvalError> {
    match require_one(args)? {
        EvalResult::Array(items) => Ok(items.last().cloned().unwrap_or(EvalResult::Unit)),
        EvalResult::String(s) => match s.as_bytes().last() {
            Some(&b) => Ok(EvalResult::Character(b)),
            None => Ok(EvalResult::Character(0)),
        },
        _ => Err(EvalError::NotSupportedForArgument { name: "last" }),
    }
}

pub fn rest(args: &[EvalResult]) -> Result<EvalResult, EvalError> {
    match require_one(args)? {
        EvalResult::Array(items) => {
            if items.is_empty() {
                Ok(EvalResult::Array(vec![]))
            } else {
                Ok(EvalResult::Array(items[1..].to_vec()))
            }
        }
        EvalResult::String(s) => {
            if s.len() > 1 {
                let first_char_len = s.chars().next().map(char::len_utf8).unwrap_or(0);
                Ok(EvalResult::String(s[first_char_len..].to_string()))
            } else {
                Ok(EvalResult::Character(0))
            }
        }
        _ => Err(EvalError::NotSupportedForArgument { name: "rest" }),
    }
}

pub fn push(args: &[EvalResult]) -> Result<EvalResult, EvalError> {
    if args.len() != 2 {
        return Err(EvalError::WrongArgumentCount {
            got: args.len(),
            want: 2,
        });
    }
    match &args[0] {
        EvalResult::Array(items) => {
            let mut extended = items.clone();
            extended.push(args[1].clone());
            Ok(EvalResult::Array(extended))
        }
        _ => Err(EvalError::PushNotArray),
    }
}
