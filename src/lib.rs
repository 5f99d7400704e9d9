//! A small Lisp interpreter for notebook-style use.
//!
//! Source text is tokenized and parsed into a [`reader::Node`] tree, which is then
//! evaluated statement by statement against an [`Environment`]. Each evaluation
//! returns its output lines, the first error (if any), and the environment, which
//! can be passed to the next evaluation to carry definitions forward.

pub mod data;
pub mod eval;
pub mod reader;
mod repl;

pub use data::{Environment, Value};
pub use eval::{Arity, Error, NativeFn, Registry};
pub use repl::repl;

use eval::{Evaluator, Output};

/// Limit on nested function calls used when none is configured.
pub const DEFAULT_MAX_DEPTH: usize = 5000;

/// Environment variable that overrides [`Config::max_depth`].
pub const MAX_DEPTH_VAR: &str = "LISP_NOTEBOOK_MAX_DEPTH";

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Config {
    /// How many closure calls may be in progress at once before evaluation fails
    /// with [`Error::StackExhausted`]. Native calls and special forms do not count.
    pub max_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Config {
    /// Defaults, overridden by the process environment where set.
    pub fn from_env() -> Self {
        Self::from_var(std::env::var(MAX_DEPTH_VAR).ok().as_deref())
    }

    fn from_var(max_depth: Option<&str>) -> Self {
        let mut config = Config::default();
        match max_depth.map(str::parse::<usize>) {
            None => (),
            Some(Ok(depth)) if depth > 0 => config.max_depth = depth,
            Some(_) => tracing::warn!(
                var = MAX_DEPTH_VAR,
                value = max_depth,
                default = config.max_depth,
                "ignoring invalid nesting limit"
            ),
        }
        config
    }
}

/// The result of one call to [`Interpreter::evaluate`].
#[derive(Debug)]
pub struct Evaluation {
    /// Lines printed, and the rendered value of each statement that succeeded, in order.
    pub output: Vec<String>,
    /// The first error encountered, if any.
    pub error: Option<Error>,
    /// The environment after evaluation, for use in a later evaluation.
    pub environment: Environment,
}

impl Evaluation {
    /// The first error's message, or empty text if there was none.
    pub fn error_message(&self) -> String {
        self.error
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default()
    }
}

/// An interpreter: a native-function registry and a configuration.
pub struct Interpreter {
    registry: Registry,
    config: Config,
}

impl Default for Interpreter {
    fn default() -> Self {
        Interpreter::new()
    }
}

impl Interpreter {
    /// An interpreter with the standard natives and default configuration.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Interpreter {
            registry: Registry::standard(),
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Add or replace a native function.
    pub fn register(&mut self, name: &str, arity: Arity, function: NativeFn) {
        self.registry.register(name, arity, function)
    }

    /// A fresh environment with the natives installed.
    pub fn environment(&self) -> Environment {
        let mut env = Environment::new();
        self.registry.install(&mut env);
        env
    }

    /// Evaluate every statement of the input, in order.
    ///
    /// With `None`, a fresh environment is used. A parse error means nothing is evaluated.
    /// Otherwise an error ends only the statement it occurs in, and the remaining
    /// statements still run; only the first error is reported. Exhausting the stack
    /// ends the whole evaluation.
    pub fn evaluate(&self, input: &str, environment: Option<Environment>) -> Evaluation {
        let mut environment = environment.unwrap_or_default();
        self.registry.install(&mut environment);

        let mut output = Output::new();
        let program = match reader::parse_program(environment.symbols_mut(), input) {
            Ok(program) => program,
            Err(e) => {
                tracing::debug!(error = %e, "parse failed");
                return Evaluation {
                    output,
                    error: Some(e.into()),
                    environment,
                };
            }
        };

        let mut error: Option<Error> = None;
        let global = environment.global();
        for (index, statement) in program.iter().enumerate() {
            let result = Evaluator::new(
                &self.registry,
                &mut environment,
                &mut output,
                self.config.max_depth,
            )
            .eval(statement, global);
            match result {
                Ok(value) => {
                    let rendered = environment.display(&value);
                    tracing::trace!(statement = index, result = %rendered, "evaluated");
                    output.push(rendered);
                }
                Err(e) => {
                    let fatal = e.is_fatal();
                    if fatal {
                        tracing::error!(statement = index, error = %e, "evaluation aborted");
                    } else {
                        tracing::warn!(statement = index, error = %e, "statement failed");
                    }
                    error.get_or_insert(e);
                    if fatal {
                        break;
                    }
                }
            }
        }

        let stats = environment.stats();
        tracing::debug!(
            frames = stats.frames,
            bindings = stats.bindings,
            symbols = stats.symbols,
            "evaluation finished"
        );
        Evaluation {
            output,
            error,
            environment,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Arity, Config, Error, Interpreter, Value, DEFAULT_MAX_DEPTH};
    use crate::eval::{EvalResult, Output, Scope};

    #[test]
    fn config_from_var() {
        assert_eq!(Config::from_var(None).max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(Config::from_var(Some("64")).max_depth, 64);
        assert_eq!(Config::from_var(Some("0")).max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(Config::from_var(Some("deep")).max_depth, DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn outputs_each_statement() {
        let interpreter = Interpreter::new();
        let result = interpreter.evaluate("(define x 3) (+ x 1) \"done\"", None);
        assert_eq!(result.output, vec!["ok", "4", "done"]);
        assert!(result.error.is_none());
        assert_eq!(result.error_message(), "");
    }

    #[test]
    fn empty_input() {
        let result = Interpreter::new().evaluate("  ;; nothing here\n", None);
        assert!(result.output.is_empty());
        assert!(result.error.is_none());
    }

    #[test]
    fn environment_chains_between_evaluations() {
        let interpreter = Interpreter::new();
        let first = interpreter.evaluate("(define (square n) (* n n))", None);
        assert!(first.error.is_none());

        let second = interpreter.evaluate("(square 7)", Some(first.environment));
        assert_eq!(second.output, vec!["49"]);

        let fresh = interpreter.evaluate("(square 7)", None);
        assert!(matches!(fresh.error, Some(Error::Unbound(ref name)) if name == "square"));
    }

    #[test]
    fn parse_error_evaluates_nothing() {
        let result = Interpreter::new().evaluate("(print 1) (print 2", None);
        assert!(result.output.is_empty());
        match result.error {
            Some(Error::Parse(e)) => assert!(e.is_incomplete()),
            e => panic!("expected a parse error, got {e:?}"),
        }
    }

    #[test]
    fn errors_do_not_stop_later_statements() {
        let result = Interpreter::new().evaluate("(car 1) (undefined) (+ 1 2)", None);
        assert_eq!(result.output, vec!["3"]);
        // Only the first error is kept.
        assert!(matches!(result.error, Some(Error::Type(_))));
        assert!(result.error_message().starts_with("type error:"));
    }

    #[test]
    fn failed_statement_keeps_earlier_output() {
        let result = Interpreter::new().evaluate("(begin (print \"before\") (car '()))", None);
        assert_eq!(result.output, vec!["before"]);
        assert!(result.error.is_some());
    }

    #[test]
    fn stack_exhaustion_stops_evaluation() {
        let interpreter = Interpreter::with_config(Config { max_depth: 100 });
        let result = interpreter.evaluate(
            "(define (forever n) (+ 1 (forever n))) (forever 0) (print \"after\")",
            None,
        );
        assert_eq!(result.output, vec!["ok"]);
        assert_eq!(result.error, Some(Error::StackExhausted { limit: 100 }));
    }

    #[test]
    fn default_limit_on_a_small_stack() {
        let worker = std::thread::Builder::new()
            .stack_size(2 << 20)
            .spawn(|| {
                let interpreter = Interpreter::new();
                let deep = interpreter.evaluate(
                    "(define (sum n) (if (= n 0) 0 (+ n (sum (- n 1))))) (sum 4000)",
                    None,
                );
                let runaway = interpreter.evaluate(
                    "(define (forever n) (+ 1 (forever n))) (forever 0)",
                    None,
                );
                (deep.output, deep.error, runaway.error)
            })
            .expect("spawning a thread should succeed");
        let (output, error, runaway) = worker.join().expect("evaluation should not panic");

        assert_eq!(output, vec!["ok", "8002000"]);
        assert_eq!(error, None);
        assert_eq!(
            runaway,
            Some(Error::StackExhausted {
                limit: DEFAULT_MAX_DEPTH
            })
        );
    }

    #[test]
    fn set_of_undefined_name() {
        let result = Interpreter::new().evaluate("(set! nope 1) (+ 1 2)", None);
        assert_eq!(result.output, vec!["3"]);
        assert_eq!(result.error, Some(Error::Unbound("nope".to_owned())));
        assert_eq!(result.environment.get("nope"), None);
    }

    #[test]
    fn user_bindings_shadow_natives_across_evaluations() {
        let interpreter = Interpreter::new();
        let first = interpreter.evaluate("(define (car x) \"mine\")", None);
        let second = interpreter.evaluate("(car 1)", Some(first.environment));
        assert_eq!(second.output, vec!["mine"]);
    }

    fn native_twice(args: &[Value], _: &mut Scope<'_>, _: &mut Output) -> EvalResult<Value> {
        match args {
            [Value::Number(n)] => Ok(Value::Number(n * 2.0)),
            _ => Err(Error::Type("`twice` expects a number".to_owned())),
        }
    }

    #[test]
    fn custom_native() {
        let mut interpreter = Interpreter::new();
        interpreter.register("twice", Arity::OneOf(&[1]), native_twice);
        assert!(interpreter.registry().contains("twice"));

        let result = interpreter.evaluate("(twice 21) twice (twice 1 2)", None);
        assert_eq!(result.output, vec!["42", "native twice"]);
        assert!(matches!(result.error, Some(Error::Arity { got: 2, .. })));
    }

    #[test]
    fn fresh_environment_has_natives() {
        let env = Interpreter::new().environment();
        assert!(matches!(env.get("print"), Some(Value::Native(_))));
        assert!(env.get("square").is_none());
    }
}
