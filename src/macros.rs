//! The two-phase macro pass: collect `macro(...)` definitions out of the
//! top-level statement list (phase A), then expand macro call sites using
//! `quote`/`unquote` substitution (phase B). Also hosts the generic
//! post-order `modify` AST rewrite both phases — and `quote`'s own
//! `unquote` rewriting in `eval.rs` — are built on.

use crate::ast::{Expr, Program, Stmt};
use crate::env::Environment;
use crate::error::MacroError;
use crate::lexer::Tokens;
use crate::value::EvalResult;
use std::rc::Rc;

/// Post-order rewrite over an expression tree: children are rewritten first,
/// then `f` is applied to the reconstructed node. Leaves with no children
/// (identifiers, literals, the evaluator's result-literals) pass straight to
/// `f`.
pub fn modify_expr(expr: &Rc<Expr>, f: &dyn Fn(Rc<Expr>) -> Rc<Expr>) -> Rc<Expr> {
    let rebuilt = match expr.as_ref() {
        Expr::Prefix {
            main_idx,
            op,
            right,
        } => Rc::new(Expr::Prefix {
            main_idx: *main_idx,
            op: *op,
            right: modify_expr(right, f),
        }),
        Expr::Infix {
            main_idx,
            op,
            left,
            right,
        } => Rc::new(Expr::Infix {
            main_idx: *main_idx,
            op: *op,
            left: modify_expr(left, f),
            right: modify_expr(right, f),
        }),
        Expr::If {
            main_idx,
            condition,
            consequence,
            alternative,
        } => Rc::new(Expr::If {
            main_idx: *main_idx,
            condition: modify_expr(condition, f),
            consequence: modify_stmt(consequence, f),
            alternative: alternative.as_ref().map(|alt| modify_stmt(alt, f)),
        }),
        Expr::FunctionLiteral {
            main_idx,
            params,
            body,
        } => Rc::new(Expr::FunctionLiteral {
            main_idx: *main_idx,
            params: Rc::clone(params),
            body: modify_stmt(body, f),
        }),
        Expr::MacroLiteral {
            main_idx,
            params,
            body,
        } => Rc::new(Expr::MacroLiteral {
            main_idx: *main_idx,
            params: Rc::clone(params),
            body: modify_stmt(body, f),
        }),
        Expr::Call {
            main_idx,
            function,
            arguments,
        } => Rc::new(Expr::Call {
            main_idx: *main_idx,
            function: modify_expr(function, f),
            arguments: arguments.iter().map(|a| modify_expr(a, f)).collect(),
        }),
        Expr::ArrayLiteral { main_idx, elements } => Rc::new(Expr::ArrayLiteral {
            main_idx: *main_idx,
            elements: elements.iter().map(|e| modify_expr(e, f)).collect(),
        }),
        Expr::HashLiteral { main_idx, pairs } => Rc::new(Expr::HashLiteral {
            main_idx: *main_idx,
            pairs: pairs
                .iter()
                .map(|(k, v)| (modify_expr(k, f), modify_expr(v, f)))
                .collect(),
        }),
        Expr::Index {
            main_idx,
            left,
            index,
        } => Rc::new(Expr::Index {
            main_idx: *main_idx,
            left: modify_expr(left, f),
            index: modify_expr(index, f),
        }),
        Expr::Identifier { .. }
        | Expr::Int { .. }
        | Expr::String { .. }
        | Expr::Boolean { .. }
        | Expr::IntResult(_)
        | Expr::StringResult(_)
        | Expr::BooleanResult(_) => Rc::clone(expr),
    };
    f(rebuilt)
}

/// Post-order rewrite over a statement tree; only the expression children
/// are handed to `f`, statements themselves are reconstructed but never
/// replaced.
pub fn modify_stmt(stmt: &Rc<Stmt>, f: &dyn Fn(Rc<Expr>) -> Rc<Expr>) -> Rc<Stmt> {
    match stmt.as_ref() {
        Stmt::Let {
            main_idx,
            name_idx,
            value,
        } => Rc::new(Stmt::Let {
            main_idx: *main_idx,
            name_idx: *name_idx,
            value: modify_expr(value, f),
        }),
        Stmt::Return { main_idx, value } => Rc::new(Stmt::Return {
            main_idx: *main_idx,
            value: value.as_ref().map(|v| modify_expr(v, f)),
        }),
        Stmt::Expression { main_idx, expr } => Rc::new(Stmt::Expression {
            main_idx: *main_idx,
            expr: modify_expr(expr, f),
        }),
        Stmt::Block {
            main_idx,
            statements,
        } => Rc::new(Stmt::Block {
            main_idx: *main_idx,
            statements: statements.iter().map(|s| modify_stmt(s, f)).collect(),
        }),
    }
}

/// Phase A: pulls every top-level `let NAME = macro(...) { ... }` out of the
/// program into `macro_env`, returning the program with those statements
/// removed. After this runs, no top-level macro definition remains.
pub fn define_macros(program: Program, macro_env: &Rc<Environment>, toks: &Tokens) -> Program {
    let mut remaining = Vec::with_capacity(program.statements.len());
    for stmt in program.statements {
        match extract_macro_definition(&stmt, toks) {
            Some((name, params, body)) => {
                macro_env.define(
                    name,
                    EvalResult::Macro {
                        params,
                        body,
                        env: Rc::clone(macro_env),
                    },
                );
            }
            None => remaining.push(stmt),
        }
    }
    Program {
        statements: remaining,
    }
}

fn extract_macro_definition(
    stmt: &Rc<Stmt>,
    toks: &Tokens,
) -> Option<(String, Rc<Vec<Expr>>, Rc<Stmt>)> {
    if let Stmt::Let { name_idx, value, .. } = stmt.as_ref() {
        if let Expr::MacroLiteral { params, body, .. } = value.as_ref() {
            return Some((toks.repr(*name_idx).to_string(), Rc::clone(params), Rc::clone(body)));
        }
    }
    None
}

/// Phase B: rewrites every remaining top-level statement, replacing macro
/// call sites with the AST their expansion produces.
pub fn expand_macros(program: &Program, macro_env: &Rc<Environment>, toks: &Tokens) -> Program {
    let statements = program
        .statements
        .iter()
        .map(|stmt| modify_stmt(stmt, &|expr| expand_call_if_macro(expr, macro_env, toks)))
        .collect();
    Program { statements }
}

fn expand_call_if_macro(expr: Rc<Expr>, macro_env: &Rc<Environment>, toks: &Tokens) -> Rc<Expr> {
    if let Expr::Call {
        function,
        arguments,
        ..
    } = expr.as_ref()
    {
        if let Expr::Identifier { main_idx } = function.as_ref() {
            if let Some(EvalResult::Macro { params, body, env }) =
                macro_env.get(toks.repr(*main_idx))
            {
                return expand_macro_call(&params, &body, &env, arguments, toks);
            }
        }
    }
    expr
}

fn expand_macro_call(
    params: &Rc<Vec<Expr>>,
    body: &Rc<Stmt>,
    env: &Rc<Environment>,
    arguments: &[Rc<Expr>],
    toks: &Tokens,
) -> Rc<Expr> {
    let extended = Environment::with_outer(Rc::clone(env));
    for (param, arg) in params.iter().zip(arguments.iter()) {
        if let Expr::Identifier { main_idx } = param {
            extended.define(
                toks.repr(*main_idx).to_string(),
                EvalResult::Quote(Rc::clone(arg)),
            );
        }
    }

    match crate::eval::eval_statement(body, &extended, toks) {
        EvalResult::Quote(node) => node,
        _ => panic!("{}", MacroError::BodyNotQuote),
    }
}

/// `quote(expr)`'s own rewrite: walk `expr`, replacing every
/// `unquote(inner)` call with the AST form of `inner` evaluated right now,
/// in `env`.
pub fn eval_quote(expr: &Rc<Expr>, env: &Rc<Environment>, toks: &Tokens) -> Rc<Expr> {
    modify_expr(expr, &|node| unquote_if_called(node, env, toks))
}

fn unquote_if_called(expr: Rc<Expr>, env: &Rc<Environment>, toks: &Tokens) -> Rc<Expr> {
    if let Expr::Call {
        function,
        arguments,
        ..
    } = expr.as_ref()
    {
        if arguments.len() == 1 {
            if let Expr::Identifier { main_idx } = function.as_ref() {
                if toks.repr(*main_idx) == "unquote" {
                    let value = crate::eval::eval_expression(&arguments[0], env, toks);
                    return eval_result_to_node(value);
                }
            }
        }
    }
    expr
}

fn eval_result_to_node(value: EvalResult) -> Rc<Expr> {
    match value {
        EvalResult::Int(n) => Rc::new(Expr::IntResult(n)),
        EvalResult::String(s) => Rc::new(Expr::StringResult(s)),
        EvalResult::Bool(b) => Rc::new(Expr::BooleanResult(b)),
        EvalResult::Quote(node) => node,
        _ => panic!("{}", MacroError::UnquoteHasNoNode),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::Environment;
    use crate::parser::Parser;

    fn parse(src: &str) -> (Program, Tokens) {
        let toks = Tokens::lex(src);
        let (program, errors) = Parser::parse(&toks);
        assert!(errors.is_empty(), "unexpected parse errors: {errors:?}");
        (program, toks)
    }

    #[test]
    fn define_macros_erases_macro_let_statements() {
        let (program, toks) = parse(
            "let number = 1; let function = macro() { quote(1); }; let number2 = 2;",
        );
        let macro_env = Environment::new();
        let program = define_macros(program, &macro_env, &toks);

        assert_eq!(program.statements.len(), 2);
        for stmt in &program.statements {
            assert!(!matches!(
                stmt.as_ref(),
                Stmt::Let { value, .. } if matches!(value.as_ref(), Expr::MacroLiteral { .. })
            ));
        }
        assert!(macro_env.get("function").is_some());
    }

    #[test]
    fn expand_macros_rewrites_call_site_to_quoted_ast() {
        let (program, toks) = parse(
            "let unless = macro(c, a, b) { quote(if (!(unquote(c))) { unquote(a); } else { unquote(b); }); }; unless(10 > 5, \"nope\", \"yep\");",
        );
        let macro_env = Environment::new();
        let program = define_macros(program, &macro_env, &toks);
        let expanded = expand_macros(&program, &macro_env, &toks);

        assert_eq!(expanded.statements.len(), 1);
        match expanded.statements[0].as_ref() {
            Stmt::Expression { expr, .. } => {
                assert!(matches!(expr.as_ref(), Expr::If { .. }));
            }
            _ => panic!("expected the call site rewritten to an if-expression"),
        }
    }
}
