use crate::parser::ast::{
    Expression, ExpressionId, FunctionDeclarationStatement, Statement,
    VariableReferenceExpression,
};
use crate::resolver::scopes::{BindingStatus, ScopeStack};
use crate::scanner::Token;
use std::collections::HashMap;

/// The resolver's side table: how many environments the evaluator must hop
/// outwards to find the binding for a given expression. Expressions with no
/// entry refer to globals.
pub type ResolvedDepths = HashMap<ExpressionId, usize>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FunctionContext {
    None,
    Function,
    Method,
    Initializer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClassContext {
    None,
    Class,
    Subclass,
}

/// A static pass between parsing and evaluation: walks the AST without
/// executing it, tags every non-global variable use with its lexical depth
/// and rejects the handful of constructs that are only detectable with
/// scope context (`return` at top level, `this` outside a class, ...).
pub struct Resolver {
    scopes: ScopeStack,
    resolved_depths: ResolvedDepths,
    current_function: FunctionContext,
    current_class: ClassContext,
}

impl Resolver {
    /// The first error aborts resolution.
    pub fn resolve(statements: &[Statement]) -> Result<ResolvedDepths, ResolveError> {
        let mut resolver = Self {
            scopes: ScopeStack::new(),
            resolved_depths: ResolvedDepths::new(),
            current_function: FunctionContext::None,
            current_class: ClassContext::None,
        };
        resolver.resolve_statements(statements)?;
        Ok(resolver.resolved_depths)
    }

    fn resolve_statements(&mut self, statements: &[Statement]) -> Result<(), ResolveError> {
        for statement in statements {
            self.resolve_statement(statement)?;
        }
        Ok(())
    }

    fn resolve_statement(&mut self, statement: &Statement) -> Result<(), ResolveError> {
        match statement {
            Statement::Expression(e) => self.resolve_expression(&e.0),
            Statement::Print(p) => self.resolve_expression(&p.0),
            Statement::VariableDeclaration(v) => {
                self.declare(&v.identifier)?;
                if let Some(initializer) = &v.initializer {
                    self.resolve_expression(initializer)?;
                }
                self.scopes.define(v.identifier.lexeme());
                Ok(())
            }
            Statement::Block(b) => {
                let guard = self.scopes.enter_scope();
                let outcome = self.resolve_statements(&b.0);
                self.scopes.exit_scope(guard);
                outcome
            }
            Statement::IfElse(ifelse) => {
                self.resolve_expression(&ifelse.condition)?;
                self.resolve_statement(&ifelse.if_branch)?;
                if let Some(else_branch) = &ifelse.else_branch {
                    self.resolve_statement(else_branch)?;
                }
                Ok(())
            }
            Statement::While(w) => {
                self.resolve_expression(&w.condition)?;
                self.resolve_statement(&w.body)
            }
            Statement::FunctionDeclaration(f) => {
                // Declared and defined before the body resolves, so that the
                // function can recursively refer to itself.
                self.declare(&f.name)?;
                self.scopes.define(f.name.lexeme());
                self.resolve_function(f, FunctionContext::Function)
            }
            Statement::Return(r) => {
                if self.current_function == FunctionContext::None {
                    return Err(ResolveError::new(
                        &r.keyword,
                        "Can't return from top-level code.",
                    ));
                }
                if let Some(value) = &r.value {
                    if self.current_function == FunctionContext::Initializer {
                        return Err(ResolveError::new(
                            &r.keyword,
                            "Can't return a value from an initializer.",
                        ));
                    }
                    self.resolve_expression(value)?;
                }
                Ok(())
            }
            Statement::ClassDeclaration(c) => {
                self.declare(&c.name)?;
                self.scopes.define(c.name.lexeme());

                let enclosing_class = self.current_class;
                let super_guard = match &c.superclass {
                    Some(superclass) => {
                        if superclass.identifier.lexeme() == c.name.lexeme() {
                            return Err(ResolveError::new(
                                &superclass.identifier,
                                "A class can't inherit from itself.",
                            ));
                        }
                        self.current_class = ClassContext::Subclass;
                        self.resolve_variable_reference(superclass)?;
                        let guard = self.scopes.enter_scope();
                        self.scopes.define("super");
                        Some(guard)
                    }
                    None => {
                        self.current_class = ClassContext::Class;
                        None
                    }
                };

                let this_guard = self.scopes.enter_scope();
                self.scopes.define("this");

                let mut outcome = Ok(());
                for method in &c.methods {
                    let context = if method.name.lexeme() == "init" {
                        FunctionContext::Initializer
                    } else {
                        FunctionContext::Method
                    };
                    outcome = self.resolve_function(method, context);
                    if outcome.is_err() {
                        break;
                    }
                }

                self.scopes.exit_scope(this_guard);
                if let Some(guard) = super_guard {
                    self.scopes.exit_scope(guard);
                }
                self.current_class = enclosing_class;
                outcome
            }
        }
    }

    fn resolve_function(
        &mut self,
        declaration: &FunctionDeclarationStatement,
        context: FunctionContext,
    ) -> Result<(), ResolveError> {
        let enclosing_function = std::mem::replace(&mut self.current_function, context);
        let guard = self.scopes.enter_scope();

        let mut outcome = Ok(());
        for parameter in &declaration.parameters {
            outcome = self.declare(parameter);
            if outcome.is_err() {
                break;
            }
            self.scopes.define(parameter.lexeme());
        }
        if outcome.is_ok() {
            outcome = self.resolve_statements(&declaration.body);
        }

        self.scopes.exit_scope(guard);
        self.current_function = enclosing_function;
        outcome
    }

    fn resolve_expression(&mut self, expression: &Expression) -> Result<(), ResolveError> {
        match expression {
            Expression::Literal(_) => Ok(()),
            Expression::Unary(u) => self.resolve_expression(&u.operand),
            Expression::Binary(b) => {
                self.resolve_expression(&b.left)?;
                self.resolve_expression(&b.right)
            }
            Expression::Logical(l) => {
                self.resolve_expression(&l.left)?;
                self.resolve_expression(&l.right)
            }
            Expression::Grouping(g) => self.resolve_expression(&g.0),
            Expression::VariableReference(v) => self.resolve_variable_reference(v),
            Expression::VariableAssignment(a) => {
                self.resolve_expression(&a.value)?;
                self.resolve_local(a.id, a.identifier.lexeme());
                Ok(())
            }
            Expression::Call(c) => {
                self.resolve_expression(&c.callee)?;
                for argument in &c.arguments {
                    self.resolve_expression(argument)?;
                }
                Ok(())
            }
            // Properties are looked up dynamically, only the receiver resolves.
            Expression::PropertyGet(g) => self.resolve_expression(&g.object),
            Expression::PropertySet(s) => {
                self.resolve_expression(&s.value)?;
                self.resolve_expression(&s.object)
            }
            Expression::This(t) => {
                if self.current_class == ClassContext::None {
                    return Err(ResolveError::new(
                        &t.keyword,
                        "Can't use 'this' outside of a class.",
                    ));
                }
                self.resolve_local(t.id, "this");
                Ok(())
            }
            Expression::Super(s) => {
                match self.current_class {
                    ClassContext::None => {
                        return Err(ResolveError::new(
                            &s.keyword,
                            "Can't use 'super' outside of a class.",
                        ))
                    }
                    ClassContext::Class => {
                        return Err(ResolveError::new(
                            &s.keyword,
                            "Can't use 'super' in a class with no superclass.",
                        ))
                    }
                    ClassContext::Subclass => {}
                }
                self.resolve_local(s.id, "super");
                Ok(())
            }
        }
    }

    fn resolve_variable_reference(
        &mut self,
        v: &VariableReferenceExpression,
    ) -> Result<(), ResolveError> {
        if let Some((depth, status)) = self.scopes.depth_of(v.identifier.lexeme()) {
            if depth == 0 && status == BindingStatus::Declared {
                return Err(ResolveError::new(
                    &v.identifier,
                    "Can't read local variable in its own initializer.",
                ));
            }
            self.resolved_depths.insert(v.id, depth);
        }
        Ok(())
    }

    fn resolve_local(&mut self, id: ExpressionId, name: &str) {
        if let Some((depth, _)) = self.scopes.depth_of(name) {
            self.resolved_depths.insert(id, depth);
        }
    }

    fn declare(&mut self, token: &Token) -> Result<(), ResolveError> {
        if !self.scopes.declare(token.lexeme()) {
            return Err(ResolveError::new(
                token,
                "Already a variable with this name in this scope.",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("[line {line}] Error at '{lexeme}': {message}")]
pub struct ResolveError {
    line: u64,
    lexeme: String,
    message: String,
}

impl ResolveError {
    fn new(token: &Token, message: impl Into<String>) -> Self {
        Self {
            line: token.line(),
            lexeme: token.lexeme().to_string(),
            message: message.into(),
        }
    }
}
