//! AST: the closed family of expression and statement nodes the parser
//! builds and the evaluator walks.
//!
//! Every node anchors itself to a token index (`main_idx`) rather than
//! owning source text; `show` takes the `Tokens` view it was built from to
//! recover text on demand. Recursive fields are `Rc`-shared rather than
//! boxed so that closures captured by `Value::Function`/`Value::Macro` can
//! outlive the `Program` they were parsed from (see spec §3, "Lifecycles").

use crate::lexer::{TokenTag, Tokens};
use std::rc::Rc;

#[derive(Debug, Clone)]
pub enum Expr {
    Identifier { main_idx: usize },
    Int { main_idx: usize },
    String { main_idx: usize },
    Boolean { main_idx: usize },

    /// Synthesized by the evaluator (never the parser) so that `unquote` can
    /// splice evaluated values back into a quoted AST without a token to
    /// anchor to.
    IntResult(i64),
    StringResult(String),
    BooleanResult(bool),

    Prefix {
        main_idx: usize,
        op: TokenTag,
        right: Rc<Expr>,
    },
    Infix {
        main_idx: usize,
        op: TokenTag,
        left: Rc<Expr>,
        right: Rc<Expr>,
    },
    If {
        main_idx: usize,
        condition: Rc<Expr>,
        consequence: Rc<Stmt>,
        alternative: Option<Rc<Stmt>>,
    },
    FunctionLiteral {
        main_idx: usize,
        params: Rc<Vec<Expr>>,
        body: Rc<Stmt>,
    },
    MacroLiteral {
        main_idx: usize,
        params: Rc<Vec<Expr>>,
        body: Rc<Stmt>,
    },
    Call {
        main_idx: usize,
        function: Rc<Expr>,
        arguments: Vec<Rc<Expr>>,
    },
    ArrayLiteral {
        main_idx: usize,
        elements: Vec<Rc<Expr>>,
    },
    HashLiteral {
        main_idx: usize,
        pairs: Vec<(Rc<Expr>, Rc<Expr>)>,
    },
    Index {
        main_idx: usize,
        left: Rc<Expr>,
        index: Rc<Expr>,
    },
}

#[derive(Debug, Clone)]
pub enum Stmt {
    Let {
        main_idx: usize,
        name_idx: usize,
        value: Rc<Expr>,
    },
    Return {
        main_idx: usize,
        value: Option<Rc<Expr>>,
    },
    Expression {
        main_idx: usize,
        expr: Rc<Expr>,
    },
    /// `{ idx }` is the index of the opening `{`; an empty block points at
    /// its own `{` for both.
    Block {
        main_idx: usize,
        statements: Vec<Rc<Stmt>>,
    },
}

impl Expr {
    pub fn main_idx(&self) -> usize {
        match self {
            Expr::Identifier { main_idx }
            | Expr::Int { main_idx }
            | Expr::String { main_idx }
            | Expr::Boolean { main_idx }
            | Expr::Prefix { main_idx, .. }
            | Expr::Infix { main_idx, .. }
            | Expr::If { main_idx, .. }
            | Expr::FunctionLiteral { main_idx, .. }
            | Expr::MacroLiteral { main_idx, .. }
            | Expr::Call { main_idx, .. }
            | Expr::ArrayLiteral { main_idx, .. }
            | Expr::HashLiteral { main_idx, .. }
            | Expr::Index { main_idx, .. } => *main_idx,
            // Synthesized nodes have no anchoring token; callers that need
            // one only ever hold these transiently during quote expansion.
            Expr::IntResult(_) | Expr::StringResult(_) | Expr::BooleanResult(_) => 0,
        }
    }

    /// Canonical parenthesized text used for debugging and `quote` round-tripping.
    pub fn show(&self, toks: &Tokens) -> String {
        match self {
            Expr::Identifier { main_idx } | Expr::Int { main_idx } | Expr::Boolean { main_idx } => {
                toks.repr(*main_idx).to_string()
            }
            Expr::String { main_idx } => toks.repr(*main_idx).to_string(),
            Expr::IntResult(n) => n.to_string(),
            Expr::StringResult(s) => s.clone(),
            Expr::BooleanResult(b) => b.to_string(),
            Expr::Prefix { op, right, .. } => format!("{}{}", op_repr(*op), right.show(toks)),
            Expr::Infix { op, left, right, .. } => {
                format!("({} {} {})", left.show(toks), op_repr(*op), right.show(toks))
            }
            Expr::If {
                condition,
                consequence,
                alternative,
                ..
            } => {
                let mut out = format!("if {} {}", condition.show(toks), consequence.show(toks));
                if let Some(alt) = alternative {
                    out.push_str(" else ");
                    out.push_str(&alt.show(toks));
                }
                out
            }
            Expr::FunctionLiteral { params, body, .. } => {
                format!("fn({}) {}", show_params(params, toks), body.show(toks))
            }
            Expr::MacroLiteral { params, body, .. } => {
                format!("macro({}) {}", show_params(params, toks), body.show(toks))
            }
            Expr::Call {
                function,
                arguments,
                ..
            } => {
                let args: Vec<String> = arguments.iter().map(|a| a.show(toks)).collect();
                format!("{}({})", function.show(toks), args.join(", "))
            }
            Expr::ArrayLiteral { elements, .. } => {
                let elems: Vec<String> = elements.iter().map(|e| e.show(toks)).collect();
                format!("[{}]", elems.join(", "))
            }
            Expr::HashLiteral { pairs, .. } => {
                let entries: Vec<String> = pairs
                    .iter()
                    .map(|(k, v)| format!("{}: {}", k.show(toks), v.show(toks)))
                    .collect();
                format!("{{{}}}", entries.join(", "))
            }
            Expr::Index { left, index, .. } => {
                format!("({}[{}])", left.show(toks), index.show(toks))
            }
        }
    }
}

fn show_params(params: &[Expr], toks: &Tokens) -> String {
    params
        .iter()
        .map(|p| p.show(toks))
        .collect::<Vec<_>>()
        .join(", ")
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

impl Stmt {
    pub fn main_idx(&self) -> usize {
        match self {
            Stmt::Let { main_idx, .. }
            | Stmt::Return { main_idx, .. }
            | Stmt::Expression { main_idx, .. }
            | Stmt::Block { main_idx, .. } => *main_idx,
        }
    }

    pub fn show(&self, toks: &Tokens) -> String {
        match self {
            Stmt::Let {
                name_idx, value, ..
            } => format!("let {} = {};", toks.repr(*name_idx), value.show(toks)),
            Stmt::Return { value: Some(v), .. } => format!("return {};", v.show(toks)),
            Stmt::Return { value: None, .. } => "return;".to_string(),
            Stmt::Expression { expr, .. } => format!("{};", expr.show(toks)),
            Stmt::Block { statements, .. } => {
                if statements.is_empty() {
                    "{}".to_string()
                } else {
                    let body: Vec<String> = statements.iter().map(|s| s.show(toks)).collect();
                    format!("{{ {} }}", body.join("\n"))
                }
            }
        }
    }
}

/// An ordered sequence of top-level statements.
pub struct Program {
    pub statements: Vec<Rc<Stmt>>,
}

impl Program {
    /// Pre-sizes the statement vector from the token count, per spec §3.
    pub fn new(token_count: usize) -> Self {
        Program {
            statements: Vec::with_capacity(token_count / 2 + 1),
        }
    }

    pub fn show(&self, toks: &Tokens) -> String {
        self.statements
            .iter()
            .map(|s| s.show(toks))
            .collect::<Vec<_>>()
            .join("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    fn show_roundtrip(src: &str) -> String {
        let toks = Tokens::lex(src);
        let program = Parser::new(&toks).parse_program();
        program.show(&toks)
    }

    #[test]
    fn prefix_show() {
        assert_eq!(show_roundtrip("-a * b;"), "((-a) * b);");
    }

    #[test]
    fn index_show() {
        assert_eq!(
            show_roundtrip("5 * [1,2,3,4][1*2] * 6;"),
            "((5 * ([1, 2, 3, 4][(1 * 2)])) * 6);"
        );
    }

    #[test]
    fn comparison_show() {
        assert_eq!(show_roundtrip("3 < 5 == false;"), "((3 < 5) == false);");
    }
}
