//! Lisp evaluator.
//!
//! A tree-walking evaluator over the parsed program. Special forms are
//! distinguished by the parser, so evaluation is a single match over [`Node`].
//!
//! Every evaluation step returns a [`Result`]; the first error aborts the
//! whole top-level statement it occurs in. Nested closure calls are counted, so
//! that runaway recursion fails with [`Error::StackExhausted`]. The native stack
//! grows on demand while evaluating, so the limit is reached before it overflows,
//! on whatever thread the evaluator runs.

use std::fmt;
use std::rc::Rc;

use crate::data::{Closure, Environment, FrameId, Value};
use crate::reader::{Lambda, Literal, Node, Operator, ParseError};

mod builtins;
#[cfg(test)]
mod builtins_test;

pub use builtins::{Arity, NativeFn, Output, Registry, Scope};

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// The program could not be read; nothing was evaluated.
    Parse(ParseError),
    /// A symbol was looked up or `set!` without being defined.
    Unbound(String),
    /// A function was called with the wrong number of arguments.
    Arity {
        callee: String,
        expected: String,
        got: usize,
    },
    /// An operation was applied to a value of the wrong type.
    Type(String),
    /// A non-function value was used in operator position.
    NotCallable(String),
    /// Function calls nested deeper than the configured limit.
    StackExhausted { limit: usize },
}

impl Error {
    /// Fatal errors end the whole evaluation, not just the current statement.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::StackExhausted { .. })
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Parse(e) => write!(f, "{e}"),
            Error::Unbound(name) => write!(f, "symbol `{name}` is not defined"),
            Error::Arity {
                callee,
                expected,
                got,
            } => write!(
                f,
                "`{callee}` expects {expected} arguments, but was called with {got}"
            ),
            Error::Type(message) => write!(f, "type error: {message}"),
            Error::NotCallable(value) => write!(f, "`{value}` is not a function"),
            Error::StackExhausted { limit } => write!(
                f,
                "stack exhausted: more than {limit} nested function calls"
            ),
        }
    }
}

impl std::error::Error for Error {}

impl From<ParseError> for Error {
    fn from(value: ParseError) -> Self {
        Error::Parse(value)
    }
}

pub type EvalResult<T> = Result<T, Error>;

/// Grow the stack when less than this remains.
const RED_ZONE: usize = 100 * 1024;

/// Size of each stack extension.
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// State for evaluating statements against one environment.
pub(crate) struct Evaluator<'i> {
    registry: &'i Registry,
    env: &'i mut Environment,
    output: &'i mut Output,
    depth: usize,
    max_depth: usize,
}

impl<'i> Evaluator<'i> {
    pub fn new(
        registry: &'i Registry,
        env: &'i mut Environment,
        output: &'i mut Output,
        max_depth: usize,
    ) -> Self {
        Evaluator {
            registry,
            env,
            output,
            depth: 0,
            max_depth,
        }
    }

    /// Evaluate the node in the given frame.
    pub fn eval(&mut self, node: &Node, frame: FrameId) -> EvalResult<Value> {
        stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, || self.eval_node(node, frame))
    }

    fn eval_node(&mut self, node: &Node, frame: FrameId) -> EvalResult<Value> {
        match node {
            Node::Number(n) => Ok(Value::Number(*n)),
            Node::String(s) => Ok(Value::String(s.clone())),
            Node::Boolean(b) => Ok(Value::Boolean(*b)),
            Node::Symbol(sym) => self.env.lookup(frame, *sym).cloned(),
            Node::Quoted(sym) => Ok(Value::Symbol(*sym)),
            Node::LiteralList(items) => Ok(literal_list(items)),
            Node::Cons(car, cdr) => {
                let car = self.eval(car, frame)?;
                let cdr = self.eval(cdr, frame)?;
                Ok(Value::cons(car, cdr))
            }
            Node::Define { name, value } => {
                let value = self.eval(value, frame)?;
                self.env.define(frame, *name, value);
                Ok(Value::Symbol(self.env.intern("ok")))
            }
            Node::Lambda(lambda) => Ok(self.closure(lambda, frame)),
            Node::If {
                condition,
                then,
                otherwise,
            } => {
                if self.eval(condition, frame)?.is_truthy() {
                    self.eval(then, frame)
                } else {
                    self.eval(otherwise, frame)
                }
            }
            Node::Begin(body) => self.eval_body(body, frame),
            Node::Set { name, value } => {
                let value = self.eval(value, frame)?;
                self.env.set(frame, *name, value.clone())?;
                Ok(value)
            }
            Node::Apply {
                operator,
                arguments,
            } => self.apply(operator, arguments, frame),
        }
    }

    fn closure(&mut self, lambda: &Rc<Lambda>, frame: FrameId) -> Value {
        self.env.capture(frame);
        Value::Closure(Rc::new(Closure {
            lambda: lambda.clone(),
            env: frame,
        }))
    }

    /// Evaluate each statement in order, returning the value of the last.
    fn eval_body(&mut self, body: &[Node], frame: FrameId) -> EvalResult<Value> {
        let mut last = Value::Null;
        for node in body {
            last = self.eval(node, frame)?;
        }
        Ok(last)
    }

    fn apply(&mut self, operator: &Operator, arguments: &[Node], frame: FrameId) -> EvalResult<Value> {
        let (callee, name) = match operator {
            Operator::Symbol(sym) => (
                self.env.lookup(frame, *sym)?.clone(),
                self.env.symbols().resolve(*sym).to_owned(),
            ),
            Operator::Lambda(lambda) => (self.closure(lambda, frame), "lambda".to_owned()),
        };

        let args = arguments
            .iter()
            .map(|argument| self.eval(argument, frame))
            .collect::<EvalResult<Vec<Value>>>()?;

        tracing::debug!(callee = %name, args = args.len(), depth = self.depth, "applying");
        self.call(&name, &callee, &args, frame)
    }

    /// Call a function value with already-evaluated arguments.
    fn call(&mut self, name: &str, callee: &Value, args: &[Value], frame: FrameId) -> EvalResult<Value> {
        match callee {
            Value::Native(native) => {
                let mut scope = Scope {
                    env: &mut *self.env,
                    frame,
                };
                self.registry.invoke(native, args, &mut scope, self.output)
            }
            Value::Closure(closure) => {
                if closure.arity() != args.len() {
                    return Err(Error::Arity {
                        callee: name.to_owned(),
                        expected: format!("exactly {}", closure.arity()),
                        got: args.len(),
                    });
                }
                if self.depth >= self.max_depth {
                    return Err(Error::StackExhausted {
                        limit: self.max_depth,
                    });
                }
                // Lexical scope: the new frame extends the closure's frame, not the caller's.
                let local = self.env.extend(closure.env);
                for (param, arg) in closure.lambda.params.iter().zip(args) {
                    self.env.define(local, *param, arg.clone());
                }
                self.depth += 1;
                let result = self.eval_body(&closure.lambda.body, local);
                self.depth -= 1;
                self.env.release(local);
                result
            }
            other => Err(Error::NotCallable(self.env.display(other))),
        }
    }
}

/// Quoted data: symbols stay symbols, nested lists become nested pairs.
fn literal_list(items: &[Literal]) -> Value {
    Value::list(items.iter().map(literal).collect::<Vec<_>>())
}

fn literal(item: &Literal) -> Value {
    match item {
        Literal::Symbol(sym) => Value::Symbol(*sym),
        Literal::Number(n) => Value::Number(*n),
        Literal::String(s) => Value::String(s.clone()),
        Literal::Boolean(b) => Value::Boolean(*b),
        Literal::List(items) => literal_list(items),
    }
}
