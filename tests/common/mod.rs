#![allow(dead_code)]

use slox::{run, Diagnostics, Interpreter};

/// What one or more submissions produced: everything printed, and every diagnostic rendered
/// in its plain `Display` form.
pub struct RunOutput {
    pub stdout: String,
    pub diagnostics: Vec<String>,
    pub had_error: bool,
    pub had_runtime_error: bool,
}

impl RunOutput {
    pub fn lines(&self) -> Vec<&str> {
        self.stdout.lines().collect()
    }
}

/// Run a whole program as a single submission.
pub fn run_source(source: &str) -> RunOutput {
    let mut interpreter = Interpreter::new(Vec::new());
    let mut diagnostics = Diagnostics::new();
    run(source, &mut interpreter, &mut diagnostics);

    RunOutput {
        stdout: String::from_utf8_lossy(interpreter.output()).into_owned(),
        diagnostics: diagnostics.records().iter().map(ToString::to_string).collect(),
        had_error: diagnostics.had_error(),
        had_runtime_error: diagnostics.had_runtime_error(),
    }
}

/// Feed each entry as an independent submission to one interpreter, the way the prompt does:
/// globals persist, diagnostics are reset in between.
pub fn run_session(submissions: &[&str]) -> RunOutput {
    let mut interpreter = Interpreter::new(Vec::new());
    let mut diagnostics = Diagnostics::new();
    let mut rendered = Vec::new();
    let mut had_error = false;
    let mut had_runtime_error = false;

    for source in submissions {
        run(source, &mut interpreter, &mut diagnostics);
        rendered.extend(diagnostics.records().iter().map(ToString::to_string));
        had_error |= diagnostics.had_error();
        had_runtime_error |= diagnostics.had_runtime_error();
        diagnostics.reset();
    }

    RunOutput {
        stdout: String::from_utf8_lossy(interpreter.output()).into_owned(),
        diagnostics: rendered,
        had_error,
        had_runtime_error,
    }
}

/// Printed lines of a program that must run without any diagnostics.
pub fn output_lines(source: &str) -> Vec<String> {
    let result = run_source(source);
    assert!(
        result.diagnostics.is_empty(),
        "unexpected diagnostics for {:?}: {:?}",
        source,
        result.diagnostics
    );
    result.stdout.lines().map(str::to_string).collect()
}
