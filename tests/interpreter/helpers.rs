use rlox::{ExitStatus, Session};

/// Execute the provided lox source code.
/// It returns the program's output stream.
pub fn execute(source: &str) -> String {
    let outcome = try_execute(source);
    assert_eq!(
        outcome.status,
        ExitStatus::Success,
        "The program failed: {}",
        outcome.diagnostics
    );
    outcome.output
}

/// Execute the provided lox source code, capturing both streams and the
/// session's exit status.
pub fn try_execute(source: &str) -> Outcome {
    let mut output = Vec::new();
    let mut diagnostics = Vec::new();
    let status = {
        let mut session = Session::new(&mut output, &mut diagnostics);
        session.run(source).unwrap()
    };
    Outcome {
        status,
        output: String::from_utf8(output).unwrap(),
        diagnostics: String::from_utf8(diagnostics).unwrap(),
    }
}

pub struct Outcome {
    pub status: ExitStatus,
    pub output: String,
    pub diagnostics: String,
}
