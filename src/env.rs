//! Environment: a lexical scope mapping names to `EvalResult`, with an
//! optional back-reference to an enclosing scope.

use crate::value::EvalResult;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug)]
pub struct Environment {
    bindings: RefCell<HashMap<String, EvalResult>>,
    outer: Option<Rc<Environment>>,
}

impl Environment {
    /// Creates a new global environment with no enclosing scope.
    pub fn new() -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            outer: None,
        })
    }

    /// Creates a child scope nested inside `outer`.
    pub fn with_outer(outer: Rc<Environment>) -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            outer: Some(outer),
        })
    }

    /// Binds `name` in this scope, overwriting any existing binding here.
    /// Callers that must reject re-binding (`Let`, per the language's rule)
    /// check `contains_local` first.
    pub fn define(&self, name: String, value: EvalResult) {
        self.bindings.borrow_mut().insert(name, value);
    }

    /// True if `name` is already bound directly in this scope (not an outer
    /// one) — used to reject `Let` re-binding in the same scope.
    pub fn contains_local(&self, name: &str) -> bool {
        self.bindings.borrow().contains_key(name)
    }

    /// Walks this scope and then each enclosing scope outward.
    pub fn get(&self, name: &str) -> Option<EvalResult> {
        if let Some(value) = self.bindings.borrow().get(name) {
            return Some(value.clone());
        }
        self.outer.as_ref().and_then(|outer| outer.get(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn define_and_get() {
        let env = Environment::new();
        env.define("x".to_string(), EvalResult::Int(42));
        match env.get("x") {
            Some(EvalResult::Int(n)) => assert_eq!(n, 42),
            _ => panic!("expected Int(42)"),
        }
    }

    #[test]
    fn undefined_symbol_is_none() {
        let env = Environment::new();
        assert!(env.get("undefined").is_none());
    }

    #[test]
    fn child_shadows_outer_binding() {
        let outer = Environment::new();
        outer.define("x".to_string(), EvalResult::Int(42));

        let child = Environment::with_outer(outer);
        child.define("x".to_string(), EvalResult::Int(100));

        match child.get("x") {
            Some(EvalResult::Int(n)) => assert_eq!(n, 100),
            _ => panic!("expected Int(100)"),
        }
    }

    #[test]
    fn child_sees_outer_binding_when_undefined_locally() {
        let outer = Environment::new();
        outer.define("x".to_string(), EvalResult::Int(42));
        let child = Environment::with_outer(outer);

        match child.get("x") {
            Some(EvalResult::Int(n)) => assert_eq!(n, 42),
            _ => panic!("expected Int(42)"),
        }
    }

    #[test]
    fn walks_multiple_outer_levels() {
        let grandparent = Environment::new();
        grandparent.define("a".to_string(), EvalResult::Int(1));

        let parent = Environment::with_outer(grandparent);
        parent.define("b".to_string(), EvalResult::Int(2));

        let child = Environment::with_outer(parent);
        child.define("c".to_string(), EvalResult::Int(3));

        assert!(matches!(child.get("a"), Some(EvalResult::Int(1))));
        assert!(matches!(child.get("b"), Some(EvalResult::Int(2))));
        assert!(matches!(child.get("c"), Some(EvalResult::Int(3))));
    }

    #[test]
    fn contains_local_ignores_outer_scope() {
        let outer = Environment::new();
        outer.define("x".to_string(), EvalResult::Int(1));
        let child = Environment::with_outer(outer);

        assert!(!child.contains_local("x"));
        child.define("x".to_string(), EvalResult::Int(2));
        assert!(child.contains_local("x"));
    }
}
