//! Black-box tests against the crate's public `run` entry point, covering
//! the end-to-end language scenarios and operator-precedence spot checks.

fn last_result(source: &str) -> String {
    let outcome = monkey::run(source);
    assert!(
        outcome.parse_errors.is_empty(),
        "unexpected parse errors: {:?}",
        outcome.parse_errors
    );
    outcome.results.last().cloned().unwrap_or_default()
}

#[test]
fn arithmetic_expression() {
    assert_eq!(last_result("5 + 5 + 5 + 5 - 10;"), "10");
}

#[test]
fn len_counts_array_elements_and_string_bytes() {
    assert_eq!(last_result("len([1,2*2,3+3]);"), "3");
    assert_eq!(last_result(r#"len("Hello world!");"#), "12");
}

#[test]
fn closures_over_an_outer_parameter() {
    let source = r#"
        let newAdder = fn(x) {
            fn(y) { x + y; };
        };
        let addTwo = newAdder(2);
        addTwo(2);
    "#;
    assert_eq!(last_result(source), "4");
}

#[test]
fn recursive_function_with_early_return() {
    let source = r#"
        let counter = fn(x) {
            if (x > 100) {
                return true;
            } else {
                counter(x + 1);
            }
        };
        counter(0);
    "#;
    assert_eq!(last_result(source), "true");
}

#[test]
fn quote_unquote_builds_a_new_ast_from_evaluated_values() {
    let source = "quote(unquote(4 + 4) + unquote(quote(4 + 4)));";
    assert_eq!(last_result(source), "(8 + (4 + 4))");
}

#[test]
fn unless_macro_expands_before_evaluation() {
    let source = r#"
        let unless = macro(condition, consequence, alternative) {
            quote(if (!(unquote(condition))) {
                unquote(consequence);
            } else {
                unquote(alternative);
            });
        };
        unless(10 > 5, "not greater", "yep");
    "#;
    assert_eq!(last_result(source), "yep");
}

#[test]
fn type_mismatch_between_integer_and_boolean() {
    assert_eq!(
        last_result("5 + true;"),
        "Type mismatch in expression: INTEGER + BOOLEAN"
    );
}

#[test]
fn unknown_symbol_reports_its_name() {
    assert_eq!(last_result("foobar;"), "Unknown symbol: foobar");
}

#[test]
fn array_traversal_with_higher_order_function() {
    let source = r#"
        let map = fn(arr, f) {
            let iter = fn(arr, accumulated) {
                if (len(arr) == 0) {
                    accumulated
                } else {
                    iter(rest(arr), push(accumulated, f(first(arr))));
                }
            };
            iter(arr, []);
        };
        let double = fn(x) { x * 2; };
        map([1, 2, 3], double);
    "#;
    assert_eq!(last_result(source), "[2, 4, 6]");
}

#[test]
fn hash_literal_lookup_by_computed_key() {
    let source = r#"{"one": 1, "two": 2}["one" + ""];"#;
    assert_eq!(last_result(source), "1");
}

#[test]
fn index_binds_tighter_than_multiplication() {
    assert_eq!(last_result("5 * [1,2,3,4][1*2];"), "15");
}

#[test]
fn comparison_binds_tighter_than_equals() {
    assert_eq!(last_result("3 < 5 == false;"), "false");
}

#[test]
fn unrecoverable_parse_errors_are_reported_without_evaluating() {
    let outcome = monkey::run("let = 5;");
    assert!(!outcome.parse_errors.is_empty());
    assert!(outcome.results.is_empty());
}

#[test]
fn let_redefinition_in_the_same_scope_is_an_error() {
    assert_eq!(
        last_result("let x = 1; let x = 2;"),
        "Symbol already defined: x"
    );
}
