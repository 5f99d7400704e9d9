//! Interactive interpreter.
//!
//! Reads statements from stdin, evaluating each as soon as it is complete;
//! results go to stdout and errors to stderr.
//!
//! ```ignore
//! RUST_LOG=lisp_notebook=debug lisp-notebook <program.lisp
//! ```

use lisp_notebook::{Config, Interpreter};
use tracing_subscriber::EnvFilter;

fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env();
    tracing::info!(max_depth = config.max_depth, "starting");

    let interpreter = Interpreter::with_config(config);
    lisp_notebook::repl(
        &interpreter,
        std::io::stdin().lock(),
        &mut std::io::stdout().lock(),
        &mut std::io::stderr().lock(),
    )
}
