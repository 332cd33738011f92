use crate::interpreter::Interpreter;
use crate::parser::ast::{ExpressionStatement, Statement};
use crate::parser::printer::print_expression;
use crate::parser::Parser;
use crate::resolver::Resolver;
use crate::scanner::{Scanner, Token, TokenType};
use std::io::Write;

/// How one invocation ended, as seen by the operating system.
///
/// Lexical, parse and resolver errors share an exit code; only errors raised
/// while the program is actually running get their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    StaticError,
    RuntimeFailure,
}

impl ExitStatus {
    pub fn code(self) -> i32 {
        match self {
            ExitStatus::Success => 0,
            ExitStatus::StaticError => 65,
            ExitStatus::RuntimeFailure => 70,
        }
    }
}

/// One CLI invocation: the output sink, the diagnostics sink and the four
/// commands that write to them. Both sinks are injected so that tests can
/// run a whole session against in-memory buffers.
pub struct Session<'a> {
    output: Box<dyn Write + 'a>,
    diagnostics: Box<dyn Write + 'a>,
}

impl<'a> Session<'a> {
    pub fn new<Output, Diagnostics>(output: Output, diagnostics: Diagnostics) -> Self
    where
        Output: Write + 'a,
        Diagnostics: Write + 'a,
    {
        Self {
            output: Box::new(output),
            diagnostics: Box::new(diagnostics),
        }
    }

    /// Print every token of `source`, one per line, as `KIND LEXEME LITERAL`.
    ///
    /// Lexical errors go to the diagnostics sink but do not stop the scan:
    /// all the tokens that could be scanned are still printed.
    pub fn tokenize(&mut self, source: &str) -> std::io::Result<ExitStatus> {
        let (tokens, had_error) = self.scan(source)?;
        for token in tokens {
            if let TokenType::Trivia = token.ty() {
                continue;
            }
            writeln!(self.output, "{token}")?;
        }
        Ok(if had_error {
            ExitStatus::StaticError
        } else {
            ExitStatus::Success
        })
    }

    /// Parse `source` as a single expression and print its parenthesised
    /// form.
    pub fn parse(&mut self, source: &str) -> std::io::Result<ExitStatus> {
        let (tokens, had_error) = self.scan(source)?;
        if had_error {
            return Ok(ExitStatus::StaticError);
        }
        match Parser::parse_expression(tokens.into_iter()) {
            Ok(expression) => {
                writeln!(self.output, "{}", print_expression(&expression))?;
                Ok(ExitStatus::Success)
            }
            Err(e) => {
                writeln!(self.diagnostics, "{e}")?;
                Ok(ExitStatus::StaticError)
            }
        }
    }

    /// Evaluate `source` as a single expression and print the resulting
    /// value.
    pub fn evaluate(&mut self, source: &str) -> std::io::Result<ExitStatus> {
        let (tokens, had_error) = self.scan(source)?;
        if had_error {
            return Ok(ExitStatus::StaticError);
        }
        let expression = match Parser::parse_expression(tokens.into_iter()) {
            Ok(expression) => expression,
            Err(e) => {
                writeln!(self.diagnostics, "{e}")?;
                return Ok(ExitStatus::StaticError);
            }
        };
        // The resolver pass catches `this`/`super` outside of a class even
        // for a bare expression.
        let statement = Statement::Expression(ExpressionStatement(expression.clone()));
        let locals = match Resolver::resolve(std::slice::from_ref(&statement)) {
            Ok(locals) => locals,
            Err(e) => {
                writeln!(self.diagnostics, "{e}")?;
                return Ok(ExitStatus::StaticError);
            }
        };
        // Scoped so that the interpreter releases the output sink before the
        // result is written to it.
        let result = {
            let mut interpreter = Interpreter::new(&mut self.output);
            interpreter.evaluate_expression(&expression, locals)
        };
        match result {
            Ok(value) => {
                writeln!(self.output, "{value}")?;
                Ok(ExitStatus::Success)
            }
            Err(e) => {
                writeln!(self.diagnostics, "{e}")?;
                Ok(ExitStatus::RuntimeFailure)
            }
        }
    }

    /// Scan, parse, resolve and execute `source` as a full program.
    pub fn run(&mut self, source: &str) -> std::io::Result<ExitStatus> {
        let (tokens, had_error) = self.scan(source)?;
        if had_error {
            return Ok(ExitStatus::StaticError);
        }
        let statements = match Parser::parse(tokens.into_iter()) {
            Ok(statements) => statements,
            Err(e) => {
                writeln!(self.diagnostics, "{e}")?;
                return Ok(ExitStatus::StaticError);
            }
        };
        let locals = match Resolver::resolve(&statements) {
            Ok(locals) => locals,
            Err(e) => {
                writeln!(self.diagnostics, "{e}")?;
                return Ok(ExitStatus::StaticError);
            }
        };
        let result = {
            let mut interpreter = Interpreter::new(&mut self.output);
            interpreter.execute_program(&statements, locals)
        };
        match result {
            Ok(()) => Ok(ExitStatus::Success),
            Err(e) => {
                writeln!(self.diagnostics, "{e}")?;
                Ok(ExitStatus::RuntimeFailure)
            }
        }
    }

    /// Scan `source` to the end, reporting every lexical error along the way.
    fn scan(&mut self, source: &str) -> std::io::Result<(Vec<Token>, bool)> {
        let mut tokens = Vec::new();
        let mut had_error = false;
        for token in Scanner::new(source) {
            if let TokenType::SyntaxError { message } = token.ty() {
                had_error = true;
                writeln!(self.diagnostics, "[line {}] Error: {}", token.line(), message)?;
            } else {
                tokens.push(token);
            }
        }
        Ok((tokens, had_error))
    }
}
