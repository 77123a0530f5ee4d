//! Pratt parser: turns a `Tokens` view into a `Program` plus an error list.
//!
//! Parsing is total — on a malformed construct the parser records an error
//! string and keeps going rather than aborting, so a single bad statement
//! never hides errors later in the source.

use crate::ast::{Expr, Program, Stmt};
use crate::lexer::{TokenTag, Tokens};
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Eq, Ord)]
enum Precedence {
    Lowest,
    Ternary,
    Equals,
    LessGreater,
    Term,
    Factor,
    Unary,
    Call,
    Index,
}

fn infix_precedence(tag: TokenTag) -> Precedence {
    match tag {
        TokenTag::Eq | TokenTag::NotEq => Precedence::Equals,
        TokenTag::Lt | TokenTag::Gt => Precedence::LessGreater,
        TokenTag::Plus | TokenTag::Minus => Precedence::Term,
        TokenTag::Asterisk | TokenTag::Slash => Precedence::Factor,
        TokenTag::LParen => Precedence::Call,
        TokenTag::LBracket => Precedence::Index,
        _ => Precedence::Lowest,
    }
}

pub struct Parser<'t> {
    toks: &'t Tokens,
    pos: usize,
    pub errors: Vec<String>,
}

impl<'t> Parser<'t> {
    pub fn new(toks: &'t Tokens) -> Self {
        Parser {
            toks,
            pos: 0,
            errors: Vec::new(),
        }
    }

    /// Convenience wrapper returning the program alongside its error list.
    pub fn parse(toks: &'t Tokens) -> (Program, Vec<String>) {
        let mut parser = Parser::new(toks);
        let program = parser.parse_program();
        (program, parser.errors)
    }

    /// Joins accumulated errors into one block for REPL/script display.
    pub fn format_errors(errors: &[String]) -> String {
        errors.join("\n")
    }

    fn cur_tag(&self) -> TokenTag {
        self.toks.tag(self.pos)
    }

    fn peek_idx(&self) -> usize {
        if self.pos + 1 < self.toks.count() {
            self.pos + 1
        } else {
            self.toks.count() - 1 // Eof
        }
    }

    fn peek_tag(&self) -> TokenTag {
        self.toks.tag(self.peek_idx())
    }

    fn advance(&mut self) {
        self.pos = self.peek_idx();
    }

    /// Advances and records a mismatch error if the peek token isn't `want`.
    fn expect_peek(&mut self, want: TokenTag) -> bool {
        if self.peek_tag() == want {
            self.advance();
            true
        } else {
            self.errors.push(format!(
                "Expected next token to be '{:?}'; got {:?} instead",
                want,
                self.peek_tag()
            ));
            false
        }
    }

    fn skip_to_semicolon(&mut self) {
        while self.cur_tag() != TokenTag::Semicolon && self.cur_tag() != TokenTag::Eof {
            self.advance();
        }
    }

    pub fn parse_program(&mut self) -> Program {
        let mut program = Program::new(self.toks.count());
        while self.cur_tag() != TokenTag::Eof {
            match self.cur_tag() {
                TokenTag::Semicolon => self.advance(),
                _ => {
                    if let Some(stmt) = self.parse_statement() {
                        program.statements.push(Rc::new(stmt));
                    }
                    self.advance();
                }
            }
        }
        program
    }

    fn parse_statement(&mut self) -> Option<Stmt> {
        match self.cur_tag() {
            TokenTag::Let => self.parse_let_statement(),
            TokenTag::Return => self.parse_return_statement(),
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_let_statement(&mut self) -> Option<Stmt> {
        if self.peek_tag() == TokenTag::Eof {
            self.errors
                .push("Not enough tokens for Let statement".to_string());
            return None;
        }
        if !self.expect_peek(TokenTag::Ident) {
            self.skip_to_semicolon();
            return None;
        }
        let name_idx = self.pos;

        if !self.expect_peek(TokenTag::Assign) {
            self.skip_to_semicolon();
            return None;
        }
        self.advance(); // onto the first token of the value expression

        let value = self.parse_expression(Precedence::Ternary)?;

        if self.peek_tag() == TokenTag::Semicolon {
            self.advance();
        }

        Some(Stmt::Let {
            main_idx: name_idx,
            name_idx,
            value,
        })
    }

    fn parse_return_statement(&mut self) -> Option<Stmt> {
        let main_idx = self.pos;
        self.advance(); // past `return`

        let value = if self.cur_tag() == TokenTag::Semicolon || self.cur_tag() == TokenTag::Eof {
            None
        } else {
            Some(self.parse_expression(Precedence::Ternary)?)
        };

        if self.peek_tag() == TokenTag::Semicolon {
            self.advance();
        }

        Some(Stmt::Return { main_idx, value })
    }

    fn parse_expression_statement(&mut self) -> Option<Stmt> {
        let main_idx = self.pos;
        let expr = self.parse_expression(Precedence::Ternary)?;

        if self.peek_tag() == TokenTag::Semicolon {
            self.advance();
        }

        Some(Stmt::Expression { main_idx, expr })
    }

    fn parse_block_statement(&mut self) -> Stmt {
        let main_idx = self.pos; // at `{`
        let mut statements = Vec::new();
        self.advance();

        while self.cur_tag() != TokenTag::RSquirly && self.cur_tag() != TokenTag::Eof {
            match self.cur_tag() {
                TokenTag::Semicolon => self.advance(),
                _ => {
                    if let Some(stmt) = self.parse_statement() {
                        statements.push(Rc::new(stmt));
                    }
                    self.advance();
                }
            }
        }

        Stmt::Block {
            main_idx,
            statements,
        }
    }

    fn parse_expression(&mut self, prec: Precedence) -> Option<Rc<Expr>> {
        let mut left = self.parse_prefix()?;

        while self.peek_tag() != TokenTag::Semicolon && prec < infix_precedence(self.peek_tag()) {
            match self.peek_tag() {
                TokenTag::Plus
                | TokenTag::Minus
                | TokenTag::Asterisk
                | TokenTag::Slash
                | TokenTag::Eq
                | TokenTag::NotEq
                | TokenTag::Lt
                | TokenTag::Gt => {
                    self.advance();
                    left = self.parse_infix_expression(left)?;
                }
                TokenTag::LParen => {
                    self.advance();
                    left = self.parse_call_expression(left)?;
                }
                TokenTag::LBracket => {
                    self.advance();
                    left = self.parse_index_expression(left)?;
                }
                _ => break,
            }
        }

        Some(left)
    }

    fn parse_prefix(&mut self) -> Option<Rc<Expr>> {
        match self.cur_tag() {
            TokenTag::Ident => {
                let main_idx = self.pos;
                Some(Rc::new(Expr::Identifier { main_idx }))
            }
            TokenTag::Int => {
                let main_idx = self.pos;
                Some(Rc::new(Expr::Int { main_idx }))
            }
            TokenTag::String => {
                let main_idx = self.pos;
                Some(Rc::new(Expr::String { main_idx }))
            }
            TokenTag::True | TokenTag::False => {
                let main_idx = self.pos;
                Some(Rc::new(Expr::Boolean { main_idx }))
            }
            TokenTag::Minus | TokenTag::Bang => self.parse_prefix_expression(),
            TokenTag::LParen => self.parse_grouped_expression(),
            TokenTag::If => self.parse_if_expression(),
            TokenTag::Function => self.parse_function_literal(),
            TokenTag::Macro => self.parse_macro_literal(),
            TokenTag::LBracket => self.parse_array_literal(),
            TokenTag::LSquirly => self.parse_hash_literal(),
            other => {
                self.errors
                    .push(format!("Expected expression, but got {:?} instead", other));
                None
            }
        }
    }

    fn parse_prefix_expression(&mut self) -> Option<Rc<Expr>> {
        let main_idx = self.pos;
        let op = self.cur_tag();
        self.advance();
        let right = self.parse_expression(Precedence::Unary)?;
        Some(Rc::new(Expr::Prefix {
            main_idx,
            op,
            right,
        }))
    }

    fn parse_infix_expression(&mut self, left: Rc<Expr>) -> Option<Rc<Expr>> {
        let main_idx = self.pos;
        let op = self.cur_tag();
        let prec = infix_precedence(op);
        match op {
            TokenTag::Plus
            | TokenTag::Minus
            | TokenTag::Asterisk
            | TokenTag::Slash
            | TokenTag::Eq
            | TokenTag::NotEq
            | TokenTag::Lt
            | TokenTag::Gt => {
                self.advance();
                let right = self.parse_expression(prec)?;
                Some(Rc::new(Expr::Infix {
                    main_idx,
                    op,
                    left,
                    right,
                }))
            }
            other => {
                self.errors
                    .push(format!("Invalid token {:?} for infix expression", other));
                None
            }
        }
    }

    fn parse_grouped_expression(&mut self) -> Option<Rc<Expr>> {
        self.advance(); // past `(`
        let expr = self.parse_expression(Precedence::Lowest)?;
        if !self.expect_peek(TokenTag::RParen) {
            return None;
        }
        Some(expr)
    }

    fn parse_if_expression(&mut self) -> Option<Rc<Expr>> {
        let main_idx = self.pos;

        if !self.expect_peek(TokenTag::LParen) {
            return None;
        }
        self.advance();
        let condition = self.parse_expression(Precedence::Lowest)?;

        if !self.expect_peek(TokenTag::RParen) {
            return None;
        }
        if !self.expect_peek(TokenTag::LSquirly) {
            return None;
        }
        let consequence = Rc::new(self.parse_block_statement());

        let alternative = if self.peek_tag() == TokenTag::Else {
            self.advance();
            if !self.expect_peek(TokenTag::LSquirly) {
                return None;
            }
            Some(Rc::new(self.parse_block_statement()))
        } else {
            None
        };

        Some(Rc::new(Expr::If {
            main_idx,
            condition,
            consequence,
            alternative,
        }))
    }

    fn parse_function_params(&mut self) -> Option<Vec<Expr>> {
        let mut params = Vec::new();

        if self.peek_tag() == TokenTag::RParen {
            self.advance();
            return Some(params);
        }

        self.advance();
        params.push(Expr::Identifier { main_idx: self.pos });

        while self.peek_tag() == TokenTag::Comma {
            self.advance();
            self.advance();
            params.push(Expr::Identifier { main_idx: self.pos });
        }

        if !self.expect_peek(TokenTag::RParen) {
            return None;
        }
        Some(params)
    }

    fn parse_function_literal(&mut self) -> Option<Rc<Expr>> {
        let main_idx = self.pos;
        if !self.expect_peek(TokenTag::LParen) {
            return None;
        }
        let params = Rc::new(self.parse_function_params()?);
        if !self.expect_peek(TokenTag::LSquirly) {
            return None;
        }
        let body = Rc::new(self.parse_block_statement());
        Some(Rc::new(Expr::FunctionLiteral {
            main_idx,
            params,
            body,
        }))
    }

    fn parse_macro_literal(&mut self) -> Option<Rc<Expr>> {
        let main_idx = self.pos;
        if !self.expect_peek(TokenTag::LParen) {
            return None;
        }
        let params = Rc::new(self.parse_function_params()?);
        if !self.expect_peek(TokenTag::LSquirly) {
            return None;
        }
        let body = Rc::new(self.parse_block_statement());
        Some(Rc::new(Expr::MacroLiteral {
            main_idx,
            params,
            body,
        }))
    }

    /// Parses a comma-separated expression list terminated by `end`. Assumes
    /// `cur` is sitting on the opening delimiter.
    fn parse_expression_list(&mut self, end: TokenTag) -> Option<Vec<Rc<Expr>>> {
        let mut list = Vec::new();

        if self.peek_tag() == end {
            self.advance();
            return Some(list);
        }

        self.advance();
        list.push(self.parse_expression(Precedence::Lowest)?);

        while self.peek_tag() == TokenTag::Comma {
            self.advance();
            self.advance();
            list.push(self.parse_expression(Precedence::Lowest)?);
        }

        if self.peek_tag() == TokenTag::Eof {
            self.errors
                .push("Incomplete argument list for function call".to_string());
            return None;
        }
        if !self.expect_peek(end) {
            return None;
        }
        Some(list)
    }

    fn parse_call_expression(&mut self, function: Rc<Expr>) -> Option<Rc<Expr>> {
        let main_idx = self.pos;
        let arguments = self.parse_expression_list(TokenTag::RParen)?;
        Some(Rc::new(Expr::Call {
            main_idx,
            function,
            arguments,
        }))
    }

    fn parse_array_literal(&mut self) -> Option<Rc<Expr>> {
        let main_idx = self.pos;
        let elements = self.parse_expression_list(TokenTag::RBracket)?;
        Some(Rc::new(Expr::ArrayLiteral { main_idx, elements }))
    }

    fn parse_index_expression(&mut self, left: Rc<Expr>) -> Option<Rc<Expr>> {
        let main_idx = self.pos;
        self.advance();
        let index = self.parse_expression(Precedence::Lowest)?;
        if !self.expect_peek(TokenTag::RBracket) {
            return None;
        }
        Some(Rc::new(Expr::Index {
            main_idx,
            left,
            index,
        }))
    }

    fn parse_hash_literal(&mut self) -> Option<Rc<Expr>> {
        let main_idx = self.pos;
        let mut pairs = Vec::new();

        while self.peek_tag() != TokenTag::RSquirly {
            self.advance();
            let key = self.parse_expression(Precedence::Lowest)?;

            if !self.expect_peek(TokenTag::Colon) {
                return None;
            }
            self.advance();
            let value = self.parse_expression(Precedence::Lowest)?;
            pairs.push((key, value));

            if self.peek_tag() != TokenTag::RSquirly && !self.expect_peek(TokenTag::Comma) {
                return None;
            }
        }

        if !self.expect_peek(TokenTag::RSquirly) {
            return None;
        }
        Some(Rc::new(Expr::HashLiteral { main_idx, pairs }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> (Program, Vec<String>) {
        let toks = Tokens::lex(src);
        Parser::parse(&toks)
    }

    #[test]
    fn parses_let_statement() {
        let (program, errors) = parse("let x = 5;");
        assert!(errors.is_empty());
        assert_eq!(program.statements.len(), 1);
    }

    #[test]
    fn let_statement_missing_ident_records_error() {
        let (_, errors) = parse("let = 5;");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("Expected next token to be"));
    }

    #[test]
    fn let_statement_missing_assign_records_error() {
        let (_, errors) = parse("let x 5;");
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn return_statement_without_value() {
        let (program, errors) = parse("return;");
        assert!(errors.is_empty());
        assert_eq!(program.statements.len(), 1);
    }

    #[test]
    fn parses_function_literal_params() {
        let toks = Tokens::lex("fn(x, y) { x + y; }");
        let (program, errors) = Parser::parse(&toks);
        assert!(errors.is_empty());
        match &*program.statements[0] {
            Stmt::Expression { expr, .. } => match &**expr {
                Expr::FunctionLiteral { params, .. } => assert_eq!(params.len(), 2),
                _ => panic!("expected function literal"),
            },
            _ => panic!("expected expression statement"),
        }
    }

    #[test]
    fn parses_macro_literal() {
        let toks = Tokens::lex("macro(x, y) { x; }");
        let (program, errors) = Parser::parse(&toks);
        assert!(errors.is_empty());
        assert_eq!(program.statements.len(), 1);
    }

    #[test]
    fn call_with_incomplete_args_records_error() {
        let (_, errors) = parse("foo(1, 2");
        assert!(!errors.is_empty());
    }

    #[test]
    fn parses_hash_literal() {
        let toks = Tokens::lex(r#"{"one": 1, "two": 2}"#);
        let (program, errors) = Parser::parse(&toks);
        assert!(errors.is_empty());
        match &*program.statements[0] {
            Stmt::Expression { expr, .. } => match &**expr {
                Expr::HashLiteral { pairs, .. } => assert_eq!(pairs.len(), 2),
                _ => panic!("expected hash literal"),
            },
            _ => panic!("expected expression statement"),
        }
    }

    #[test]
    fn parses_array_index_on_call_result() {
        let (program, errors) = parse("myArray[1 + 1]");
        assert!(errors.is_empty());
        assert_eq!(program.statements.len(), 1);
    }

    #[test]
    fn accumulates_multiple_errors_without_stopping() {
        let (_, errors) = parse("let = 5; let y 10;");
        assert_eq!(errors.len(), 2);
    }
}
