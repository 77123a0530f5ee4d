//! Tree-walking evaluator: turns AST nodes into `EvalResult` values.
//!
//! Every evaluation function takes the `Environment` it runs in and the
//! `Tokens` view its AST was parsed from (needed to recover identifier names
//! and literal text from `main_idx`). Errors are values, not unwinds: an
//! `Err` from a builtin is converted to `EvalResult::Error` at the call site,
//! and an `EvalResult::Error` produced anywhere propagates by ordinary return,
//! short-circuiting whatever evaluation was in progress.

use crate::ast::{Expr, Program, Stmt};
use crate::builtins;
use crate::env::Environment;
use crate::lexer::{TokenTag, Tokens};
use crate::macros;
use crate::value::{EvalResult, HashKey};
use std::collections::HashMap;
use std::rc::Rc;

/// Evaluates every top-level statement in order, collecting one result per
/// statement. A `Return` or `Error` at top level halts the loop; its result
/// is still appended, so callers always see it as the last entry.
pub fn eval_program(program: &Program, env: &Rc<Environment>, toks: &Tokens) -> Vec<EvalResult> {
    let mut results = Vec::with_capacity(program.statements.len());
    for stmt in &program.statements {
        let result = eval_statement(stmt, env, toks);
        let halts = matches!(result, EvalResult::Return(_) | EvalResult::Error(_));
        results.push(result);
        if halts {
            break;
        }
    }
    results
}

pub fn eval_statement(stmt: &Rc<Stmt>, env: &Rc<Environment>, toks: &Tokens) -> EvalResult {
    match stmt.as_ref() {
        Stmt::Expression { expr, .. } => eval_expression(expr, env, toks),
        Stmt::Let { name_idx, value, .. } => {
            let evaluated = eval_expression(value, env, toks);
            if matches!(evaluated, EvalResult::Error(_)) {
                return evaluated;
            }
            let name = toks.repr(*name_idx).to_string();
            if env.contains_local(&name) {
                return EvalResult::Error(format!("Symbol already defined: {name}"));
            }
            env.define(name, evaluated);
            EvalResult::Unit
        }
        Stmt::Return { value, .. } => {
            let evaluated = match value {
                Some(expr) => eval_expression(expr, env, toks),
                None => EvalResult::Unit,
            };
            if matches!(evaluated, EvalResult::Error(_)) {
                return evaluated;
            }
            EvalResult::Return(Box::new(evaluated))
        }
        Stmt::Block { statements, .. } => eval_block(statements, env, toks),
    }
}

fn eval_block(statements: &[Rc<Stmt>], env: &Rc<Environment>, toks: &Tokens) -> EvalResult {
    let mut result = EvalResult::Unit;
    for stmt in statements {
        result = eval_statement(stmt, env, toks);
        if matches!(result, EvalResult::Return(_) | EvalResult::Error(_)) {
            return result;
        }
    }
    result
}

pub fn eval_expression(expr: &Rc<Expr>, env: &Rc<Environment>, toks: &Tokens) -> EvalResult {
    match expr.as_ref() {
        Expr::Int { main_idx } => match toks.repr(*main_idx).parse() {
            Ok(n) => EvalResult::Int(n),
            Err(_) => EvalResult::Error(format!("Invalid integer literal: {}", toks.repr(*main_idx))),
        },
        Expr::String { main_idx } => EvalResult::String(string_literal_value(toks.repr(*main_idx))),
        Expr::Boolean { main_idx } => EvalResult::Bool(toks.repr(*main_idx) == "true"),
        Expr::IntResult(n) => EvalResult::Int(*n),
        Expr::StringResult(s) => EvalResult::String(s.clone()),
        Expr::BooleanResult(b) => EvalResult::Bool(*b),
        Expr::Identifier { main_idx } => eval_identifier(toks.repr(*main_idx), env),
        Expr::Prefix { op, right, .. } => {
            let value = eval_expression(right, env, toks);
            if matches!(value, EvalResult::Error(_)) {
                return value;
            }
            eval_prefix(*op, value)
        }
        Expr::Infix { op, left, right, .. } => {
            let lhs = eval_expression(left, env, toks);
            if matches!(lhs, EvalResult::Error(_)) {
                return lhs;
            }
            let rhs = eval_expression(right, env, toks);
            if matches!(rhs, EvalResult::Error(_)) {
                return rhs;
            }
            eval_infix(*op, lhs, rhs)
        }
        Expr::If {
            condition,
            consequence,
            alternative,
            ..
        } => {
            let cond = eval_expression(condition, env, toks);
            if matches!(cond, EvalResult::Error(_)) {
                return cond;
            }
            if cond.is_truthy() {
                eval_statement(consequence, env, toks)
            } else if let Some(alt) = alternative {
                eval_statement(alt, env, toks)
            } else {
                EvalResult::Unit
            }
        }
        Expr::FunctionLiteral { params, body, .. } => EvalResult::Function {
            params: Rc::clone(params),
            body: Rc::clone(body),
            env: Rc::clone(env),
        },
        Expr::MacroLiteral { params, body, .. } => EvalResult::Macro {
            params: Rc::clone(params),
            body: Rc::clone(body),
            env: Rc::clone(env),
        },
        Expr::ArrayLiteral { elements, .. } => {
            let mut values = Vec::with_capacity(elements.len());
            for elem in elements {
                let value = eval_expression(elem, env, toks);
                if matches!(value, EvalResult::Error(_)) {
                    return value;
                }
                values.push(value);
            }
            EvalResult::Array(values)
        }
        Expr::HashLiteral { pairs, .. } => eval_hash_literal(pairs, env, toks),
        Expr::Index { left, index, .. } => {
            let left_value = eval_expression(left, env, toks);
            if matches!(left_value, EvalResult::Error(_)) {
                return left_value;
            }
            let index_value = eval_expression(index, env, toks);
            if matches!(index_value, EvalResult::Error(_)) {
                return index_value;
            }
            eval_index(left_value, index_value)
        }
        Expr::Call {
            function,
            arguments,
            ..
        } => eval_call(function, arguments, env, toks),
    }
}

fn string_literal_value(repr: &str) -> String {
    repr.trim_matches('"').to_string()
}

fn eval_identifier(name: &str, env: &Rc<Environment>) -> EvalResult {
    if let Some(value) = env.get(name) {
        return value;
    }
    if let Some(canonical) = builtins::lookup(name) {
        return EvalResult::BuiltinKey(canonical);
    }
    EvalResult::Error(format!("Unknown symbol: {name}"))
}

fn op_repr(op: TokenTag) -> &'static str {
    match op {
        TokenTag::Plus => "+",
        TokenTag::Minus => "-",
        TokenTag::Asterisk => "*",
        TokenTag::Slash => "/",
        TokenTag::Bang => "!",
        TokenTag::Eq => "==",
        TokenTag::NotEq => "!=",
        TokenTag::Lt => "<",
        TokenTag::Gt => ">",
        _ => "?",
    }
}

/// `-` is only defined on integers, `!` only on booleans (matching
/// `Prefix Minus Int`/`Prefix Bang Bool`). Any other pairing falls through
/// to the same `Unknown operator: <op><TYPE>` shape the infix rules use,
/// with the actual operator symbol rather than a fixed one.
fn eval_prefix(op: TokenTag, value: EvalResult) -> EvalResult {
    match (op, &value) {
        (TokenTag::Minus, EvalResult::Int(n)) => EvalResult::Int(-n),
        (TokenTag::Bang, EvalResult::Bool(b)) => EvalResult::Bool(!b),
        _ => EvalResult::Error(format!("Unknown operator: {}{}", op_repr(op), value.type_name())),
    }
}

fn eval_infix(op: TokenTag, left: EvalResult, right: EvalResult) -> EvalResult {
    match (&left, &right) {
        (EvalResult::Int(l), EvalResult::Int(r)) => eval_int_infix(op, *l, *r),
        (EvalResult::Bool(l), EvalResult::Bool(r)) => eval_bool_infix(op, *l, *r),
        (EvalResult::String(l), EvalResult::String(r)) => eval_string_infix(op, l, r),
        _ if left.type_name() != right.type_name() => EvalResult::Error(format!(
            "Type mismatch in expression: {} {} {}",
            left.type_name(),
            op_repr(op),
            right.type_name()
        )),
        _ => EvalResult::Error(format!(
            "Unknown operator: {} {} {}",
            left.type_name(),
            op_repr(op),
            right.type_name()
        )),
    }
}

fn eval_int_infix(op: TokenTag, l: i64, r: i64) -> EvalResult {
    match op {
        TokenTag::Plus => EvalResult::Int(l + r),
        TokenTag::Minus => EvalResult::Int(l - r),
        TokenTag::Asterisk => EvalResult::Int(l * r),
        TokenTag::Slash => match l.checked_div(r) {
            Some(v) => EvalResult::Int(v),
            None if r == 0 => EvalResult::Error("Division by zero".to_string()),
            None => EvalResult::Error(format!("Integer overflow: {l} / {r}")),
        },
        TokenTag::Eq => EvalResult::Bool(l == r),
        TokenTag::NotEq => EvalResult::Bool(l != r),
        TokenTag::Lt => EvalResult::Bool(l < r),
        TokenTag::Gt => EvalResult::Bool(l > r),
        _ => EvalResult::Error(format!("Unknown operator: INTEGER {} INTEGER", op_repr(op))),
    }
}

fn eval_bool_infix(op: TokenTag, l: bool, r: bool) -> EvalResult {
    match op {
        TokenTag::Eq => EvalResult::Bool(l == r),
        TokenTag::NotEq => EvalResult::Bool(l != r),
        _ => EvalResult::Error(format!("Unknown operator: BOOLEAN {} BOOLEAN", op_repr(op))),
    }
}

fn eval_string_infix(op: TokenTag, l: &str, r: &str) -> EvalResult {
    match op {
        TokenTag::Plus => EvalResult::String(format!("{l}{r}")),
        TokenTag::Eq => EvalResult::Bool(l == r),
        TokenTag::NotEq => EvalResult::Bool(l != r),
        _ => EvalResult::Error(format!("Unknown operator: STRING {} STRING", op_repr(op))),
    }
}

fn eval_hash_literal(pairs: &[(Rc<Expr>, Rc<Expr>)], env: &Rc<Environment>, toks: &Tokens) -> EvalResult {
    let mut map = HashMap::with_capacity(pairs.len());
    for (key_expr, value_expr) in pairs {
        let key_value = eval_expression(key_expr, env, toks);
        if matches!(key_value, EvalResult::Error(_)) {
            return key_value;
        }
        let value = eval_expression(value_expr, env, toks);
        if matches!(value, EvalResult::Error(_)) {
            return value;
        }
        let key = match HashKey::from_eval(&key_value) {
            Some(key) => key,
            None => return EvalResult::Error("Unusable hash key".to_string()),
        };
        map.insert(key, (key_value, value));
    }
    EvalResult::Map(map)
}

fn eval_index(left: EvalResult, index: EvalResult) -> EvalResult {
    match (&left, &index) {
        (EvalResult::Array(items), EvalResult::Int(i)) => {
            if *i < 0 || *i as usize >= items.len() {
                EvalResult::Unit
            } else {
                items[*i as usize].clone()
            }
        }
        (EvalResult::Map(map), _) => match HashKey::from_eval(&index) {
            Some(key) => map.get(&key).map(|(_, v)| v.clone()).unwrap_or(EvalResult::Unit),
            None => EvalResult::Error("Unusable hash key".to_string()),
        },
        _ => EvalResult::Error(format!("Index operator not supported: {}", left.type_name())),
    }
}

fn eval_call(function: &Rc<Expr>, arguments: &[Rc<Expr>], env: &Rc<Environment>, toks: &Tokens) -> EvalResult {
    if is_quote_call(function, toks) {
        if arguments.len() != 1 {
            return EvalResult::Error(format!(
                "Wrong number of arguments. Got {} arguments, want 1 argument",
                arguments.len()
            ));
        }
        let quoted = macros::eval_quote(&arguments[0], env, toks);
        return EvalResult::Quote(quoted);
    }

    let callee = eval_expression(function, env, toks);
    if matches!(callee, EvalResult::Error(_)) {
        return callee;
    }

    let mut args = Vec::with_capacity(arguments.len());
    for arg in arguments {
        let value = eval_expression(arg, env, toks);
        if matches!(value, EvalResult::Error(_)) {
            return value;
        }
        args.push(value);
    }

    apply_call(callee, args, toks)
}

fn is_quote_call(function: &Rc<Expr>, toks: &Tokens) -> bool {
    matches!(function.as_ref(), Expr::Identifier { main_idx } if toks.repr(*main_idx) == "quote")
}

fn apply_call(callee: EvalResult, args: Vec<EvalResult>, toks: &Tokens) -> EvalResult {
    match callee {
        EvalResult::BuiltinKey(name) => match builtins::call(name, args, toks) {
            Ok(value) => value,
            Err(err) => EvalResult::Error(err.to_string()),
        },
        EvalResult::Function { params, body, env } => {
            let call_env = Environment::with_outer(env);
            for (i, param) in params.iter().enumerate() {
                if let Expr::Identifier { main_idx } = param {
                    let value = args.get(i).cloned().unwrap_or(EvalResult::Unit);
                    call_env.define(toks.repr(*main_idx).to_string(), value);
                }
            }
            match eval_statement(&body, &call_env, toks) {
                EvalResult::Return(inner) => *inner,
                other => other,
            }
        }
        other => EvalResult::Error(format!("not a function: {}", other.type_name())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    fn run_to_final(src: &str) -> EvalResult {
        let toks = Tokens::lex(src);
        let (program, errors) = Parser::parse(&toks);
        assert!(errors.is_empty(), "unexpected parse errors: {errors:?}");

        let macro_env = Environment::new();
        let program = macros::define_macros(program, &macro_env, &toks);
        let program = macros::expand_macros(&program, &macro_env, &toks);

        let env = Environment::new();
        eval_program(&program, &env, &toks)
            .pop()
            .unwrap_or(EvalResult::Unit)
    }

    fn run_to_final_string(src: &str) -> String {
        let toks = Tokens::lex(src);
        run_to_final(src).render(&toks)
    }

    #[test]
    fn evaluates_arithmetic_precedence() {
        assert_eq!(run_to_final_string("5 + 5 + 5 + 5 - 10;"), "10");
        assert_eq!(run_to_final_string("2 * (5 + 10);"), "30");
    }

    #[test]
    fn division_by_zero_is_an_error_value_not_a_panic() {
        assert_eq!(run_to_final_string("5 / 0;"), "Division by zero");
    }

    #[test]
    fn if_else_picks_branch_by_truthiness() {
        assert_eq!(run_to_final_string("if (1 < 2) { 10 } else { 20 };"), "10");
        assert_eq!(run_to_final_string("if (0) { 10 };"), "10");
    }

    #[test]
    fn closures_capture_their_defining_environment() {
        let src = r#"
            let newAdder = fn(x) { fn(y) { x + y }; };
            let addTwo = newAdder(2);
            addTwo(2);
        "#;
        assert_eq!(run_to_final_string(src), "4");
    }

    #[test]
    fn recursive_closure_counter_terminates() {
        let src = r#"
            let counter = fn(x) { if (x > 100) { return true; } else { counter(x + 1); } };
            counter(0);
        "#;
        assert_eq!(run_to_final_string(src), "true");
    }

    #[test]
    fn quote_unquote_splices_evaluated_values_into_the_ast() {
        let src = "quote(unquote(4 + 4) + unquote(quote(4 + 4)));";
        assert_eq!(run_to_final_string(src), "(8 + (4 + 4))");
    }

    #[test]
    fn unless_macro_inverts_the_condition() {
        let src = r#"
            let unless = macro(condition, consequence, alternative) {
                quote(if (!(unquote(condition))) { unquote(consequence) } else { unquote(alternative) });
            };
            unless(10 > 5, "not greater", "yep");
        "#;
        assert_eq!(run_to_final_string(src), "yep");
    }

    #[test]
    fn type_mismatch_reports_both_type_names() {
        assert_eq!(
            run_to_final_string("5 + true;"),
            "Type mismatch in expression: INTEGER + BOOLEAN"
        );
    }

    #[test]
    fn unknown_identifier_reports_its_name() {
        assert_eq!(run_to_final_string("foobar;"), "Unknown symbol: foobar");
    }

    #[test]
    fn let_rejects_redefinition_in_the_same_scope() {
        assert_eq!(
            run_to_final_string("let x = 1; let x = 2;"),
            "Symbol already defined: x"
        );
    }

    #[test]
    fn error_at_top_level_halts_remaining_statements() {
        let toks = Tokens::lex("5 + true; 999;");
        let (program, errors) = Parser::parse(&toks);
        assert!(errors.is_empty());
        let env = Environment::new();
        let results = eval_program(&program, &env, &toks);
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn array_and_index_out_of_range_yields_unit() {
        assert_eq!(run_to_final_string("[1, 2, 3][10];"), "");
        assert_eq!(run_to_final_string("[1, 2, 3][1];"), "2");
    }

    #[test]
    fn hash_literal_supports_int_bool_and_string_keys() {
        let src = r#"{"one": 1, true: 2, 3: "three"}[3];"#;
        assert_eq!(run_to_final_string(src), "three");
    }

    #[test]
    fn missing_call_arguments_bind_to_unit_without_panicking() {
        assert_eq!(run_to_final_string("let f = fn(a, b) { a }; f(1);"), "1");
    }
}
