//! Lexer: turns Monkey source text into a flat token sequence.
//!
//! This is the "external" component spec.md treats as a collaborator: the
//! parser only depends on `Tokens::tag`, `Tokens::repr`, and `Tokens::count`.
//! Scanning itself is built from `nom` combinators, in the same style the
//! reference architecture's own expression parser uses.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while},
    character::complete::{char, digit1, multispace1, none_of, one_of},
    combinator::{opt, recognize, value},
    multi::many0,
    sequence::pair,
    IResult, Parser,
};

/// The closed set of token tags the parser's rule tables switch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenTag {
    Illegal,
    Eof,

    Ident,
    Int,
    String,

    Assign,
    Plus,
    Minus,
    Bang,
    Asterisk,
    Slash,

    Lt,
    Gt,
    Eq,
    NotEq,

    Comma,
    Semicolon,
    Colon,

    LParen,
    RParen,
    LSquirly,
    RSquirly,
    LBracket,
    RBracket,

    Function,
    Let,
    True,
    False,
    If,
    Else,
    Return,
    Macro,
}

/// A single scanned token: a tag plus the byte range it spans in the source.
#[derive(Debug, Clone, Copy)]
pub struct Token {
    pub tag: TokenTag,
    start: usize,
    end: usize,
}

/// The token view consumed by the parser (spec.md §6).
///
/// Built eagerly: the whole source is scanned once up front, and `repr`
/// slices back into the retained source string rather than re-deriving text.
pub struct Tokens {
    source: String,
    tokens: Vec<Token>,
}

impl Tokens {
    /// Scans `source` into a complete token sequence, always terminated by `Eof`.
    pub fn lex(source: &str) -> Self {
        let mut tokens = Vec::with_capacity(source.len() / 4 + 1);
        let mut rest = source;
        let mut consumed = 0usize;

        loop {
            let (after_ws, _) = skip_whitespace(rest).unwrap_or((rest, ()));
            consumed += rest.len() - after_ws.len();
            rest = after_ws;

            if rest.is_empty() {
                break;
            }

            match next_token(rest) {
                Ok((remaining, (tag, len))) => {
                    tokens.push(Token {
                        tag,
                        start: consumed,
                        end: consumed + len,
                    });
                    consumed += len;
                    rest = remaining;
                }
                Err(_) => {
                    // Single illegal byte; advance by one character so lexing is total.
                    let ch_len = rest.chars().next().map(char::len_utf8).unwrap_or(1);
                    tokens.push(Token {
                        tag: TokenTag::Illegal,
                        start: consumed,
                        end: consumed + ch_len,
                    });
                    consumed += ch_len;
                    rest = &rest[ch_len.min(rest.len())..];
                }
            }
        }

        tokens.push(Token {
            tag: TokenTag::Eof,
            start: consumed,
            end: consumed,
        });

        Tokens {
            source: source.to_string(),
            tokens,
        }
    }

    /// Tag of the token at `idx`.
    pub fn tag(&self, idx: usize) -> TokenTag {
        self.tokens[idx].tag
    }

    /// Source text (or canonical spelling) of the token at `idx`.
    pub fn repr(&self, idx: usize) -> &str {
        let tok = &self.tokens[idx];
        &self.source[tok.start..tok.end]
    }

    /// Number of tokens, including the trailing `Eof`.
    pub fn count(&self) -> usize {
        self.tokens.len()
    }
}

fn skip_whitespace(input: &str) -> IResult<&str, ()> {
    value((), multispace1).parse(input)
}

fn next_token(input: &str) -> IResult<&str, (TokenTag, usize)> {
    alt((lex_string, lex_number, lex_ident_or_keyword, lex_operator_or_punct)).parse(input)
}

fn lex_string(input: &str) -> IResult<&str, (TokenTag, usize)> {
    let (rest, matched) = recognize(pair(
        char('"'),
        pair(many0(none_of("\"\\")), opt(char('"'))),
    ))
    .parse(input)?;
    Ok((rest, (TokenTag::String, matched.len())))
}

fn lex_number(input: &str) -> IResult<&str, (TokenTag, usize)> {
    let (rest, matched) = digit1(input)?;
    Ok((rest, (TokenTag::Int, matched.len())))
}

fn lex_ident_or_keyword(input: &str) -> IResult<&str, (TokenTag, usize)> {
    let (rest, matched) = recognize(pair(
        one_of("abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ_"),
        take_while(|c: char| c.is_alphanumeric() || c == '_'),
    ))
    .parse(input)?;

    let tag = match matched {
        "fn" => TokenTag::Function,
        "let" => TokenTag::Let,
        "true" => TokenTag::True,
        "false" => TokenTag::False,
        "if" => TokenTag::If,
        "else" => TokenTag::Else,
        "return" => TokenTag::Return,
        "macro" => TokenTag::Macro,
        _ => TokenTag::Ident,
    };
    Ok((rest, (tag, matched.len())))
}

fn lex_operator_or_punct(input: &str) -> IResult<&str, (TokenTag, usize)> {
    alt((
        value((TokenTag::Eq, 2), tag("==")),
        value((TokenTag::NotEq, 2), tag("!=")),
        value((TokenTag::Assign, 1), char('=')),
        value((TokenTag::Plus, 1), char('+')),
        value((TokenTag::Minus, 1), char('-')),
        value((TokenTag::Bang, 1), char('!')),
        value((TokenTag::Asterisk, 1), char('*')),
        value((TokenTag::Slash, 1), char('/')),
        value((TokenTag::Lt, 1), char('<')),
        value((TokenTag::Gt, 1), char('>')),
        value((TokenTag::Comma, 1), char(',')),
        value((TokenTag::Semicolon, 1), char(';')),
        value((TokenTag::Colon, 1), char(':')),
        value((TokenTag::LParen, 1), char('(')),
        value((TokenTag::RParen, 1), char(')')),
        value((TokenTag::LSquirly, 1), char('{')),
        value((TokenTag::RSquirly, 1), char('}')),
        value((TokenTag::LBracket, 1), char('[')),
        value((TokenTag::RBracket, 1), char(']')),
    ))
    .parse(input)
}
