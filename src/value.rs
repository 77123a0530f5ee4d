//! `EvalResult`: the closed family of runtime values the evaluator produces,
//! plus `HashKey`, the hashable key type backing `EvalResult::Map`.

use crate::ast::{Expr, Stmt};
use crate::env::Environment;
use crate::lexer::Tokens;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HashType {
    Int,
    Boolean,
    String,
}

/// A hashable, tagged key. Distinct `HashType`s with equal `payload`s are
/// unequal — the tag participates in equality, so `Int(1)` and `Boolean(true)`
/// never collide even though both hash their payload to `1`. Ordered so a
/// `Map`'s entries can be rendered in a fixed order regardless of the
/// backing `HashMap`'s iteration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HashKey {
    pub kind: HashType,
    pub payload: i64,
}

impl HashKey {
    /// Builds a key for the three hashable `EvalResult` variants; any other
    /// variant is not a legal hash key.
    pub fn from_eval(value: &EvalResult) -> Option<HashKey> {
        match value {
            EvalResult::Int(n) => Some(HashKey {
                payload: *n,
                kind: HashType::Int,
            }),
            EvalResult::Bool(b) => Some(HashKey {
                payload: if *b { 1 } else { 0 },
                kind: HashType::Boolean,
            }),
            EvalResult::String(s) => Some(HashKey {
                payload: fnv1a_64(s.as_bytes()) as i64,
                kind: HashType::String,
            }),
            _ => None,
        }
    }
}

/// FNV-1a, 64-bit. Deterministic across runs so equal strings always map to
/// the same key.
fn fnv1a_64(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf29ce484222325;
    for &b in bytes {
        hash ^= b as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

#[derive(Debug, Clone)]
pub enum EvalResult {
    Int(i64),
    Bool(bool),
    String(String),
    Character(u8),
    Unit,
    Array(Vec<EvalResult>),
    Map(HashMap<HashKey, (EvalResult, EvalResult)>),
    Function {
        params: Rc<Vec<Expr>>,
        body: Rc<Stmt>,
        env: Rc<Environment>,
    },
    /// Only ever appears inside the macro pass; the evaluator never sees one.
    Macro {
        params: Rc<Vec<Expr>>,
        body: Rc<Stmt>,
        env: Rc<Environment>,
    },
    Quote(Rc<Expr>),
    BuiltinKey(&'static str),
    Return(Box<EvalResult>),
    Error(String),
}

impl EvalResult {
    /// Truthiness for `if` conditions: only `false`, `Unit`, and `Error` are
    /// falsy. Every integer — including `0` — is truthy, as are strings,
    /// arrays, and everything else.
    pub fn is_truthy(&self) -> bool {
        match self {
            EvalResult::Bool(false) => false,
            EvalResult::Unit => false,
            EvalResult::Error(_) => false,
            EvalResult::Return(inner) => inner.is_truthy(),
            _ => true,
        }
    }

    /// The uppercase type tag used in `Type mismatch`/`Unknown operator`
    /// error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            EvalResult::Int(_) => "INTEGER",
            EvalResult::Bool(_) => "BOOLEAN",
            EvalResult::String(_) => "STRING",
            EvalResult::Character(_) => "CHARACTER",
            EvalResult::Unit => "UNIT",
            EvalResult::Array(_) => "ARRAY",
            EvalResult::Map(_) => "MAP",
            EvalResult::Function { .. } => "FUNCTION",
            EvalResult::Macro { .. } => "MACRO",
            EvalResult::Quote(_) => "QUOTE",
            EvalResult::BuiltinKey(_) => "BUILTIN",
            EvalResult::Return(inner) => inner.type_name(),
            EvalResult::Error(_) => "ERROR",
        }
    }

    /// The final-result print form a REPL/script driver shows for a
    /// statement's value. `Quote` needs the `Tokens` view its AST was parsed
    /// from to recover source text, so this takes one rather than being a
    /// plain `Display` impl.
    pub fn render(&self, toks: &Tokens) -> String {
        match self {
            EvalResult::Int(n) => n.to_string(),
            EvalResult::Bool(b) => if *b { "true" } else { "false" }.to_string(),
            EvalResult::String(s) => s.clone(),
            EvalResult::Character(c) => format!("'{}'", *c as char),
            EvalResult::Unit => String::new(),
            EvalResult::Array(items) => {
                let rendered: Vec<String> = items.iter().map(|v| v.render(toks)).collect();
                format!("[{}]", rendered.join(", "))
            }
            EvalResult::Map(entries) => {
                if entries.is_empty() {
                    return "{}".to_string();
                }
                let mut by_key: Vec<(&HashKey, &(EvalResult, EvalResult))> = entries.iter().collect();
                by_key.sort_by_key(|(key, _)| **key);
                let rendered: Vec<String> = by_key
                    .iter()
                    .map(|(_, (k, v))| format!("{}: {}", k.render(toks), v.render(toks)))
                    .collect();
                format!("{{{}}}", rendered.join(", "))
            }
            EvalResult::Quote(node) => node.show(toks),
            EvalResult::Function { .. } => "<Function>".to_string(),
            EvalResult::Macro { .. } => "<Macro>".to_string(),
            EvalResult::BuiltinKey(name) => format!("<builtin {}>", name),
            EvalResult::Return(inner) => inner.render(toks),
            EvalResult::Error(msg) => msg.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Tokens;

    fn toks() -> Tokens {
        Tokens::lex("")
    }

    #[test]
    fn renders_scalars() {
        assert_eq!(EvalResult::Int(42).render(&toks()), "42");
        assert_eq!(EvalResult::Bool(true).render(&toks()), "true");
        assert_eq!(EvalResult::Bool(false).render(&toks()), "false");
        assert_eq!(EvalResult::String("hi".into()).render(&toks()), "hi");
        assert_eq!(EvalResult::Character(b'a').render(&toks()), "'a'");
        assert_eq!(EvalResult::Unit.render(&toks()), "");
    }

    #[test]
    fn renders_array_and_empty_map() {
        let arr = EvalResult::Array(vec![EvalResult::Int(1), EvalResult::Int(2)]);
        assert_eq!(arr.render(&toks()), "[1, 2]");
        assert_eq!(EvalResult::Map(HashMap::new()).render(&toks()), "{}");
    }

    #[test]
    fn renders_map_entries_in_a_fixed_order_regardless_of_insertion() {
        let mut forward = HashMap::new();
        for n in 1..=4 {
            let key = HashKey::from_eval(&EvalResult::Int(n)).unwrap();
            forward.insert(key, (EvalResult::Int(n), EvalResult::Int(n * 10)));
        }
        let mut backward = HashMap::new();
        for n in (1..=4).rev() {
            let key = HashKey::from_eval(&EvalResult::Int(n)).unwrap();
            backward.insert(key, (EvalResult::Int(n), EvalResult::Int(n * 10)));
        }
        assert_eq!(
            EvalResult::Map(forward).render(&toks()),
            EvalResult::Map(backward).render(&toks())
        );
    }

    #[test]
    fn renders_return_and_error() {
        let ret = EvalResult::Return(Box::new(EvalResult::Int(4)));
        assert_eq!(ret.render(&toks()), "4");
        let err = EvalResult::Error("Unknown symbol: foobar".to_string());
        assert_eq!(err.render(&toks()), "Unknown symbol: foobar");
    }

    #[test]
    fn truthiness_matches_spec() {
        assert!(EvalResult::Int(0).is_truthy());
        assert!(EvalResult::Int(1).is_truthy());
        assert!(EvalResult::Bool(true).is_truthy());
        assert!(!EvalResult::Bool(false).is_truthy());
        assert!(!EvalResult::Unit.is_truthy());
        assert!(!EvalResult::Error("x".into()).is_truthy());
        assert!(EvalResult::String("x".into()).is_truthy());
    }

    #[test]
    fn hash_key_distinguishes_types_with_equal_payload() {
        let int_key = HashKey::from_eval(&EvalResult::Int(1)).unwrap();
        let bool_key = HashKey::from_eval(&EvalResult::Bool(true)).unwrap();
        assert_ne!(int_key, bool_key);
    }

    #[test]
    fn hash_key_equal_strings_collide_on_purpose() {
        let a = HashKey::from_eval(&EvalResult::String("hello".into())).unwrap();
        let b = HashKey::from_eval(&EvalResult::String("hello".into())).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn hash_key_rejects_unhashable_variants() {
        assert!(HashKey::from_eval(&EvalResult::Unit).is_none());
        assert!(HashKey::from_eval(&EvalResult::Array(vec![])).is_none());
    }
}
