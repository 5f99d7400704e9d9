//! Line-oriented read-eval-print loop.

use std::io::{self, BufRead, Write};

use crate::{Error, Interpreter};

/// Read statements from `input` and evaluate them as they complete.
///
/// Lines are buffered until they parse; input that ends partway through a form
/// waits for more lines. Each evaluation continues from the environment of the
/// previous one. Results go to `output`, errors to `errors`.
pub fn repl(
    interpreter: &Interpreter,
    input: impl BufRead,
    output: &mut impl Write,
    errors: &mut impl Write,
) -> io::Result<()> {
    let mut environment = Some(interpreter.environment());
    let mut pending = String::new();

    for line in input.lines() {
        let line = line?;
        pending.push_str(&line);
        pending.push('\n');

        let evaluation = interpreter.evaluate(&pending, environment.take());
        match &evaluation.error {
            Some(Error::Parse(e)) if e.is_incomplete() => {
                tracing::trace!(pending = pending.len(), "waiting for more input");
                environment = Some(evaluation.environment);
                continue;
            }
            _ => (),
        }
        for line in &evaluation.output {
            writeln!(output, "{line}")?;
        }
        if let Some(e) = &evaluation.error {
            writeln!(errors, "{e}")?;
        }
        output.flush()?;
        environment = Some(evaluation.environment);
        pending.clear();
    }

    if !pending.trim().is_empty() {
        writeln!(errors, "incomplete input at end of stream")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::repl;
    use crate::Interpreter;

    fn run(input: &str) -> (String, String) {
        let interpreter = Interpreter::new();
        let mut output = Vec::new();
        let mut errors = Vec::new();
        repl(
            &interpreter,
            Cursor::new(input.as_bytes()),
            &mut output,
            &mut errors,
        )
        .expect("writing to a buffer should not fail");
        (
            String::from_utf8(output).expect("output should be UTF-8"),
            String::from_utf8(errors).expect("errors should be UTF-8"),
        )
    }

    #[test]
    fn evaluates_line_by_line() {
        let (output, errors) = run("(define x 2)\n(* x 21)\n");
        assert_eq!(output, "ok\n42\n");
        assert_eq!(errors, "");
    }

    #[test]
    fn waits_for_complete_forms() {
        let (output, errors) = run("(define (f n)\n  (+ n 1))\n(f 1)\n");
        assert_eq!(output, "ok\n2\n");
        assert_eq!(errors, "");
    }

    #[test]
    fn reports_errors_and_continues() {
        let (output, errors) = run("(car 5)\n(print \"still here\")\n");
        assert_eq!(output, "still here\n\n");
        assert!(errors.starts_with("type error:"), "{errors}");
    }

    #[test]
    fn syntax_errors_are_not_retried() {
        let (output, errors) = run(")\n1\n");
        assert_eq!(output, "1\n");
        assert!(errors.starts_with("parse error at line 1"), "{errors}");
    }

    #[test]
    fn incomplete_at_end() {
        let (output, errors) = run("(+ 1\n");
        assert_eq!(output, "");
        assert_eq!(errors, "incomplete input at end of stream\n");
    }
}
