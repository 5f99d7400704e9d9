//! Native functions.
//!
//! The registry maps names to native implementations, each with an arity contract.
//! Arguments are evaluated before a native is invoked, and the arity is checked
//! before the implementation sees them; the evaluator knows nothing else about
//! what any particular native does.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use super::{Error, EvalResult};
use crate::data::{Environment, FrameId, NativeRef, Value};

/// Lines produced by `print`, in order.
pub type Output = Vec<String>;

/// The environment a native function is called from.
pub struct Scope<'e> {
    pub env: &'e mut Environment,
    pub frame: FrameId,
}

/// A native function: receives its evaluated arguments, the calling scope, and the output sink.
pub type NativeFn = fn(&[Value], &mut Scope<'_>, &mut Output) -> EvalResult<Value>;

/// How many arguments a native function accepts.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Arity {
    AtLeast(usize),
    /// Exactly one of these counts.
    OneOf(&'static [usize]),
}

impl Arity {
    pub fn accepts(&self, count: usize) -> bool {
        match self {
            Arity::AtLeast(min) => count >= *min,
            Arity::OneOf(counts) => counts.contains(&count),
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::AtLeast(min) => write!(f, "at least {min}"),
            Arity::OneOf([count]) => write!(f, "exactly {count}"),
            Arity::OneOf(counts) => {
                let counts: Vec<String> = counts.iter().map(|c| c.to_string()).collect();
                write!(f, "{}", counts.join(" or "))
            }
        }
    }
}

struct Native {
    arity: Arity,
    function: NativeFn,
}

/// Table of native functions, owned by one interpreter.
#[derive(Default)]
pub struct Registry {
    natives: BTreeMap<Rc<str>, Native>,
}

/// The standard natives.
const BUILTINS: &[(&str, Arity, NativeFn)] = &[
    ("+", Arity::AtLeast(1), builtin_add),
    ("-", Arity::OneOf(&[1, 2]), builtin_subtract),
    ("*", Arity::AtLeast(2), builtin_multiply),
    ("/", Arity::OneOf(&[2]), builtin_divide),
    ("modulo", Arity::OneOf(&[2]), builtin_modulo),
    ("=", Arity::AtLeast(2), builtin_equal),
    (">", Arity::OneOf(&[2]), builtin_greater),
    ("<", Arity::OneOf(&[2]), builtin_less),
    (">=", Arity::OneOf(&[2]), builtin_greater_equal),
    ("<=", Arity::OneOf(&[2]), builtin_less_equal),
    ("and", Arity::AtLeast(2), builtin_and),
    ("or", Arity::AtLeast(2), builtin_or),
    ("print", Arity::AtLeast(1), builtin_print),
    ("list", Arity::AtLeast(0), builtin_list),
    ("car", Arity::OneOf(&[1]), builtin_car),
    ("cdr", Arity::OneOf(&[1]), builtin_cdr),
    ("null?", Arity::OneOf(&[1]), builtin_is_null),
    ("string?", Arity::OneOf(&[1]), builtin_is_string),
    ("number?", Arity::OneOf(&[1]), builtin_is_number),
    ("function?", Arity::OneOf(&[1]), builtin_is_function),
    ("list?", Arity::OneOf(&[1]), builtin_is_list),
];

impl Registry {
    /// A registry with no natives at all.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the standard natives.
    pub fn standard() -> Self {
        let mut registry = Registry::new();
        for (name, arity, function) in BUILTINS {
            registry.register(name, *arity, *function);
        }
        registry
    }

    /// Add a native function. A later registration replaces an earlier one of the same name.
    pub fn register(&mut self, name: &str, arity: Arity, function: NativeFn) {
        let replaced = self
            .natives
            .insert(name.into(), Native { arity, function })
            .is_some();
        tracing::debug!(name, %arity, replaced, "registered native function");
    }

    pub fn contains(&self, name: &str) -> bool {
        self.natives.contains_key(name)
    }

    pub fn arity(&self, name: &str) -> Option<Arity> {
        self.natives.get(name).map(|native| native.arity)
    }

    pub fn names(&self) -> impl '_ + Iterator<Item = &str> {
        self.natives.keys().map(|name| name.as_ref())
    }

    /// Bind every native into the global frame of the environment,
    /// except where the name is already bound there.
    pub fn install(&self, env: &mut Environment) {
        let global = env.global();
        for name in self.natives.keys() {
            let sym = env.intern(name);
            if !env.binds_locally(global, sym) {
                env.define(global, sym, Value::Native(NativeRef::new(name.clone())));
            }
        }
    }

    /// Check the arity contract, then run the native.
    pub fn invoke(
        &self,
        native: &NativeRef,
        args: &[Value],
        scope: &mut Scope<'_>,
        output: &mut Output,
    ) -> EvalResult<Value> {
        let name = native.name();
        let Some(entry) = self.natives.get(name) else {
            return Err(Error::Unbound(name.to_owned()));
        };
        if !entry.arity.accepts(args.len()) {
            return Err(Error::Arity {
                callee: name.to_owned(),
                expected: entry.arity.to_string(),
                got: args.len(),
            });
        }
        (entry.function)(args, scope, output)
    }
}

/// Get exactly N arguments.
fn get_args<'v, const N: usize>(name: &str, args: &'v [Value]) -> EvalResult<&'v [Value; N]> {
    args.try_into().map_err(|_| Error::Arity {
        callee: name.to_owned(),
        expected: format!("exactly {N}"),
        got: args.len(),
    })
}

fn number(name: &str, value: &Value) -> EvalResult<f64> {
    match value {
        Value::Number(n) => Ok(*n),
        other => Err(Error::Type(format!(
            "`{name}` expects numbers, got a {}",
            other.type_name()
        ))),
    }
}

fn builtin_add(args: &[Value], _: &mut Scope<'_>, _: &mut Output) -> EvalResult<Value> {
    let sum: f64 = args.iter().map(|v| number("+", v)).sum::<EvalResult<f64>>()?;
    Ok(Value::Number(sum))
}

/// With one argument, negation; with two, subtraction.
fn builtin_subtract(args: &[Value], _: &mut Scope<'_>, _: &mut Output) -> EvalResult<Value> {
    if let [a] = args {
        return Ok(Value::Number(-number("-", a)?));
    }
    let [a, b] = get_args::<2>("-", args)?;
    Ok(Value::Number(number("-", a)? - number("-", b)?))
}

fn builtin_multiply(args: &[Value], _: &mut Scope<'_>, _: &mut Output) -> EvalResult<Value> {
    let product: f64 = args.iter().map(|v| number("*", v)).product::<EvalResult<f64>>()?;
    Ok(Value::Number(product))
}

/// Get two numeric operands, where the second must not be zero.
fn divisor_operands(name: &str, args: &[Value]) -> EvalResult<(f64, f64)> {
    let [a, b] = get_args::<2>(name, args)?;
    let (a, b) = (number(name, a)?, number(name, b)?);
    if b == 0.0 {
        return Err(Error::Type(format!("`{name}` by zero")));
    }
    Ok((a, b))
}

fn builtin_divide(args: &[Value], _: &mut Scope<'_>, _: &mut Output) -> EvalResult<Value> {
    let (a, b) = divisor_operands("/", args)?;
    Ok(Value::Number(a / b))
}

/// Remainder; the result has the sign of the dividend.
fn builtin_modulo(args: &[Value], _: &mut Scope<'_>, _: &mut Output) -> EvalResult<Value> {
    let (a, b) = divisor_operands("modulo", args)?;
    Ok(Value::Number(a % b))
}

/// Structural equality of atoms. Values of different types are unequal;
/// functions and pairs cannot be compared at all.
fn builtin_equal(args: &[Value], _: &mut Scope<'_>, _: &mut Output) -> EvalResult<Value> {
    if let Some(bad) = args
        .iter()
        .find(|v| v.is_callable() || matches!(v, Value::Pair(_)))
    {
        return Err(Error::Type(format!(
            "`=` cannot compare a {}",
            bad.type_name()
        )));
    }
    let equal = args.windows(2).all(|w| match (&w[0], &w[1]) {
        (Value::Number(a), Value::Number(b)) => a == b,
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Symbol(a), Value::Symbol(b)) => a == b,
        (Value::Boolean(a), Value::Boolean(b)) => a == b,
        (Value::Null, Value::Null) => true,
        _ => false,
    });
    Ok(Value::Boolean(equal))
}

fn compare(name: &str, args: &[Value], test: fn(f64, f64) -> bool) -> EvalResult<Value> {
    let [a, b] = get_args::<2>(name, args)?;
    Ok(Value::Boolean(test(number(name, a)?, number(name, b)?)))
}

fn builtin_greater(args: &[Value], _: &mut Scope<'_>, _: &mut Output) -> EvalResult<Value> {
    compare(">", args, |a, b| a > b)
}

fn builtin_less(args: &[Value], _: &mut Scope<'_>, _: &mut Output) -> EvalResult<Value> {
    compare("<", args, |a, b| a < b)
}

fn builtin_greater_equal(args: &[Value], _: &mut Scope<'_>, _: &mut Output) -> EvalResult<Value> {
    compare(">=", args, |a, b| a >= b)
}

fn builtin_less_equal(args: &[Value], _: &mut Scope<'_>, _: &mut Output) -> EvalResult<Value> {
    compare("<=", args, |a, b| a <= b)
}

fn builtin_and(args: &[Value], _: &mut Scope<'_>, _: &mut Output) -> EvalResult<Value> {
    Ok(Value::Boolean(args.iter().all(Value::is_truthy)))
}

fn builtin_or(args: &[Value], _: &mut Scope<'_>, _: &mut Output) -> EvalResult<Value> {
    Ok(Value::Boolean(args.iter().any(Value::is_truthy)))
}

/// Append one line to the output: each argument's canonical form, space-separated.
fn builtin_print(args: &[Value], scope: &mut Scope<'_>, output: &mut Output) -> EvalResult<Value> {
    let line: Vec<String> = args.iter().map(|v| scope.env.display(v)).collect();
    output.push(line.join(" "));
    Ok(Value::Null)
}

fn builtin_list(args: &[Value], _: &mut Scope<'_>, _: &mut Output) -> EvalResult<Value> {
    Ok(Value::list(args.iter().cloned()))
}

fn builtin_car(args: &[Value], _: &mut Scope<'_>, _: &mut Output) -> EvalResult<Value> {
    match get_args::<1>("car", args)? {
        [Value::Pair(pair)] => Ok(pair.car.clone()),
        [other] => Err(Error::Type(format!(
            "`car` expects a pair, got a {}",
            other.type_name()
        ))),
    }
}

fn builtin_cdr(args: &[Value], _: &mut Scope<'_>, _: &mut Output) -> EvalResult<Value> {
    match get_args::<1>("cdr", args)? {
        [Value::Pair(pair)] => Ok(pair.cdr.clone()),
        [other] => Err(Error::Type(format!(
            "`cdr` expects a pair, got a {}",
            other.type_name()
        ))),
    }
}

fn predicate(name: &str, args: &[Value], test: fn(&Value) -> bool) -> EvalResult<Value> {
    let [v] = get_args::<1>(name, args)?;
    Ok(Value::Boolean(test(v)))
}

fn builtin_is_null(args: &[Value], _: &mut Scope<'_>, _: &mut Output) -> EvalResult<Value> {
    predicate("null?", args, |v| matches!(v, Value::Null))
}

fn builtin_is_string(args: &[Value], _: &mut Scope<'_>, _: &mut Output) -> EvalResult<Value> {
    predicate("string?", args, |v| matches!(v, Value::String(_)))
}

fn builtin_is_number(args: &[Value], _: &mut Scope<'_>, _: &mut Output) -> EvalResult<Value> {
    predicate("number?", args, |v| matches!(v, Value::Number(_)))
}

fn builtin_is_function(args: &[Value], _: &mut Scope<'_>, _: &mut Output) -> EvalResult<Value> {
    predicate("function?", args, Value::is_callable)
}

/// True for pairs and for the empty list.
fn builtin_is_list(args: &[Value], _: &mut Scope<'_>, _: &mut Output) -> EvalResult<Value> {
    predicate("list?", args, |v| matches!(v, Value::Pair(_) | Value::Null))
}
