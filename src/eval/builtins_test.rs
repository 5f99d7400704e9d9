//! Tests for the native functions, run through the whole interpreter.
use super::*;
use crate::Interpreter;

/// Evaluate the program, expecting no errors; returns the output lines.
fn run(program: &str) -> Vec<String> {
    let result = Interpreter::new().evaluate(program, None);
    if let Some(e) = result.error {
        panic!("unexpected error: {e}");
    }
    result.output
}

/// Evaluate the program; returns the rendering of its last statement.
fn last(program: &str) -> String {
    run(program).pop().unwrap_or_default()
}

/// Evaluate the program, expecting an error.
fn fails(program: &str) -> Error {
    match Interpreter::new().evaluate(program, None).error {
        Some(e) => e,
        None => panic!("expected an error from {program}"),
    }
}

#[test]
fn arithmetic() {
    assert_eq!(last("(+ 1 2 3)"), "6");
    assert_eq!(last("(+ 5)"), "5");
    assert_eq!(last("(- 10 4)"), "6");
    assert_eq!(last("(- 4)"), "-4");
    assert_eq!(last("(* 2 3 4)"), "24");
    assert_eq!(last("(/ 7 2)"), "3.5");
    assert_eq!(last("(modulo 7 3)"), "1");
    assert_eq!(last("(modulo -7 3)"), "-1");
    assert_eq!(last("(+ 0.5 0.25)"), "0.75");
}

#[test]
fn arithmetic_arity() {
    match fails("(+)") {
        Error::Arity {
            callee,
            expected,
            got: 0,
        } => {
            assert_eq!(callee, "+");
            assert_eq!(expected, "at least 1");
        }
        e => panic!("unexpected error: {e:?}"),
    }
    match fails("(- 1 2 3)") {
        Error::Arity { expected, got: 3, .. } => assert_eq!(expected, "1 or 2"),
        e => panic!("unexpected error: {e:?}"),
    }
    assert!(matches!(fails("(* 2)"), Error::Arity { got: 1, .. }));
    assert!(matches!(fails("(/ 1 2 3)"), Error::Arity { got: 3, .. }));
}

#[test]
fn arithmetic_types() {
    assert!(matches!(fails("(+ 1 \"2\")"), Error::Type(_)));
    assert!(matches!(fails("(* 'a 2)"), Error::Type(_)));
    assert!(matches!(fails("(< 1 #t)"), Error::Type(_)));
    assert!(matches!(fails("(/ 1 0)"), Error::Type(_)));
    assert!(matches!(fails("(modulo 1 0)"), Error::Type(_)));
}

#[test]
fn comparison() {
    assert_eq!(run("(> 2 1) (< 2 1) (>= 2 2) (<= 3 2)"), ["#t", "#f", "#t", "#f"]);
}

#[test]
fn equality() {
    assert_eq!(last("(= 1 1 1)"), "#t");
    assert_eq!(last("(= 1 1 2)"), "#f");
    assert_eq!(last("(= \"a\" \"a\")"), "#t");
    assert_eq!(last("(= 'a 'a)"), "#t");
    assert_eq!(last("(= 'a 'b)"), "#f");
    assert_eq!(last("(= #f #f)"), "#t");
    assert_eq!(last("(= '() '())"), "#t");
    // Different types are unequal, not an error.
    assert_eq!(last("(= 1 \"1\")"), "#f");
    assert_eq!(last("(= 0 #f)"), "#f");
}

#[test]
fn equality_rejects_functions_and_pairs() {
    assert!(matches!(fails("(= car car)"), Error::Type(_)));
    assert!(matches!(fails("(= (lambda () 1) 1)"), Error::Type(_)));
    assert!(matches!(fails("(= (list 1) (list 1))"), Error::Type(_)));
}

#[test]
fn logic() {
    assert_eq!(run("(and 1 \"x\") (and 1 0) (or 0 \"\") (or '() 'a)"), ["#t", "#f", "#f", "#t"]);
    assert!(matches!(fails("(and #t)"), Error::Arity { .. }));
}

#[test]
fn truthiness_in_conditionals() {
    assert_eq!(last("(if 0 \"yes\" \"no\")"), "no");
    assert_eq!(last("(if \"\" \"yes\" \"no\")"), "no");
    assert_eq!(last("(if '() \"yes\" \"no\")"), "no");
    assert_eq!(last("(if 'sym \"yes\" \"no\")"), "yes");
    assert_eq!(last("(if (list 0) \"yes\" \"no\")"), "yes");
    assert_eq!(last("(if car \"yes\" \"no\")"), "yes");
}

#[test]
fn print() {
    let output = run(r#"(print "hello" 'world 42 (list 1 2)) (print #t)"#);
    assert_eq!(output, ["hello world 42 (1 2)", "", "#t", ""]);
    assert!(matches!(fails("(print)"), Error::Arity { got: 0, .. }));
}

#[test]
fn lists() {
    assert_eq!(last("(list 1 2 3)"), "(1 2 3)");
    assert_eq!(last("(list)"), "");
    assert_eq!(last("(car (list 1 2 3))"), "1");
    assert_eq!(last("(cdr (list 1 2 3))"), "(2 3)");
    assert_eq!(last("(cdr (list 1))"), "");
    assert_eq!(last("(car (cons 1 2))"), "1");
    assert_eq!(last("(cdr (cons 1 2))"), "2");
    assert_eq!(last("(cons 1 (cons 2 '()))"), "(1 2)");
    assert_eq!(last("(car '(a b))"), "a");
}

#[test]
fn car_cdr_need_pairs() {
    assert!(matches!(fails("(car '())"), Error::Type(_)));
    assert!(matches!(fails("(cdr 5)"), Error::Type(_)));
    assert!(matches!(fails("(car (list 1) (list 2))"), Error::Arity { .. }));
}

#[test]
fn predicates() {
    assert_eq!(
        run("(null? '()) (null? 0) (string? \"\") (string? 'a) (number? 1.5) (number? \"1\")"),
        ["#t", "#f", "#t", "#f", "#t", "#f"]
    );
    assert_eq!(
        run("(function? car) (function? (lambda (x) x)) (function? 'car)"),
        ["#t", "#t", "#f"]
    );
    assert_eq!(
        run("(list? (list 1)) (list? (cons 1 2)) (list? '()) (list? 1)"),
        ["#t", "#t", "#t", "#f"]
    );
}

#[test]
fn factorial() {
    let program = r#"
        (define (fac n)
          (if (= n 0)
              1
              (* n (fac (- n 1)))))
        (fac 5)
        (fac 10)
    "#;
    assert_eq!(run(program), ["ok", "120", "3628800"]);
}

#[test]
fn adders_are_independent() {
    let program = r#"
        (define (make-adder n) (lambda (x) (+ x n)))
        (define add2 (make-adder 2))
        (define add10 (make-adder 10))
        (add2 1)
        (add10 1)
        (add2 1)
    "#;
    assert_eq!(run(program), ["ok", "ok", "ok", "3", "11", "3"]);
}

#[test]
fn map_over_list() {
    let program = r#"
        (define (map f xs)
          (if (null? xs)
              '()
              (cons (f (car xs)) (map f (cdr xs)))))
        (map (lambda (x) (* x x)) (list 1 2 3))
    "#;
    assert_eq!(last(program), "(1 4 9)");
}

#[test]
fn natives_can_be_shadowed() {
    assert_eq!(run("(define (list x) x) (list 5)"), ["ok", "5"]);
    assert!(matches!(fails("(define (list x) x) (list 1 2)"), Error::Arity { .. }));
}

#[test]
fn registry_install_keeps_existing_bindings() {
    let registry = Registry::standard();
    let mut env = crate::data::Environment::new();
    let car = env.intern("car");
    let global = env.global();
    env.define(global, car, 1.0.into());

    registry.install(&mut env);
    assert_eq!(env.get("car"), Some(&crate::data::Value::Number(1.0)));
    assert!(matches!(env.get("cdr"), Some(crate::data::Value::Native(_))));
}

#[test]
fn register_replaces() {
    let mut registry = Registry::standard();
    assert_eq!(registry.arity("car"), Some(Arity::OneOf(&[1])));
    registry.register("car", Arity::AtLeast(0), |_, _, _| Ok(crate::data::Value::Null));
    assert_eq!(registry.arity("car"), Some(Arity::AtLeast(0)));
    assert!(registry.names().any(|name| name == "list?"));
}

#[test]
fn empty_registry() {
    let registry = Registry::new();
    assert_eq!(registry.names().count(), 0);
    assert!(!registry.contains("+"));
}
