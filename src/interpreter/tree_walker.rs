use crate::interpreter::environment::Environment;
use crate::interpreter::lox_callable::LoxCallable;
use crate::interpreter::lox_value::{LoxClass, LoxFunction, LoxInstance, LoxValue, NativeFunction};
use crate::parser::ast::{Expression, ExpressionId, LiteralExpression, Statement};
use crate::resolver::ResolvedDepths;
use crate::scanner::{Token, TokenDiscriminant};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::io::Write;
use std::rc::Rc;
use std::time::SystemTime;

pub struct Interpreter<'a> {
    globals: Rc<RefCell<Environment>>,
    environment: Rc<RefCell<Environment>>,
    locals: ResolvedDepths,
    output_stream: Box<dyn Write + 'a>,
}

impl<'a> Interpreter<'a> {
    pub fn new<OutputStream>(output: OutputStream) -> Self
    where
        OutputStream: Write + 'a,
    {
        let globals = Rc::new(RefCell::new(Environment::new()));
        globals.borrow_mut().define(
            "clock",
            LoxValue::NativeFunction(Rc::new(NativeFunction {
                arity: 0,
                function: clock,
            })),
        );
        Self {
            environment: Rc::clone(&globals),
            globals,
            locals: ResolvedDepths::new(),
            output_stream: Box::new(output),
        }
    }

    /// Execute a resolved program. It exits as soon as a runtime error is
    /// encountered.
    pub fn execute_program(
        &mut self,
        statements: &[Statement],
        locals: ResolvedDepths,
    ) -> Result<(), RuntimeError> {
        self.locals.extend(locals);
        for statement in statements {
            self.execute(statement).map_err(into_runtime_error)?;
        }
        Ok(())
    }

    /// Evaluate a single resolved expression to a value - the `evaluate`
    /// command.
    pub fn evaluate_expression(
        &mut self,
        expression: &Expression,
        locals: ResolvedDepths,
    ) -> Result<LoxValue, RuntimeError> {
        self.locals.extend(locals);
        self.eval(expression).map_err(into_runtime_error)
    }

    fn execute(&mut self, s: &Statement) -> Result<(), RuntimeErrorOrReturn> {
        match s {
            Statement::Expression(e) => {
                self.eval(&e.0)?;
            }
            Statement::Print(p) => {
                let value = self.eval(&p.0)?;
                writeln!(self.output_stream, "{value}").map_err(RuntimeError::failed_to_print)?;
                self.output_stream
                    .flush()
                    .map_err(RuntimeError::failed_to_flush)?;
            }
            Statement::VariableDeclaration(v) => {
                let value = match &v.initializer {
                    Some(initializer) => self.eval(initializer)?,
                    None => LoxValue::Nil,
                };
                self.environment
                    .borrow_mut()
                    .define(v.identifier.lexeme(), value);
            }
            Statement::Block(b) => {
                let environment = Environment::nested(Rc::clone(&self.environment));
                self.execute_block(&b.0, environment)?;
            }
            Statement::IfElse(ifelse) => {
                if self.eval(&ifelse.condition)?.is_truthy() {
                    self.execute(&ifelse.if_branch)?;
                } else if let Some(else_branch) = &ifelse.else_branch {
                    self.execute(else_branch)?;
                }
            }
            Statement::While(w) => {
                while self.eval(&w.condition)?.is_truthy() {
                    self.execute(&w.body)?;
                }
            }
            Statement::FunctionDeclaration(f) => {
                let function =
                    LoxFunction::new(Rc::clone(f), Rc::clone(&self.environment), false);
                self.environment
                    .borrow_mut()
                    .define(f.name.lexeme(), LoxValue::Function(Rc::new(function)));
            }
            Statement::Return(r) => {
                let value = match &r.value {
                    Some(value) => self.eval(value)?,
                    None => LoxValue::Nil,
                };
                return Err(Return {
                    value,
                    line: r.keyword.line(),
                }
                .into());
            }
            Statement::ClassDeclaration(c) => {
                let superclass = match &c.superclass {
                    Some(reference) => {
                        match self.lookup_variable(&reference.identifier, reference.id)? {
                            LoxValue::Class(class) => Some(class),
                            _ => {
                                return Err(RuntimeError::new(
                                    reference.identifier.line(),
                                    "Superclass must be a class.",
                                )
                                .into())
                            }
                        }
                    }
                    None => None,
                };

                // The name is bound before the class object exists, so that
                // method bodies can already refer to it.
                self.environment
                    .borrow_mut()
                    .define(c.name.lexeme(), LoxValue::Nil);

                // Methods of a subclass capture an extra environment holding
                // `super`, mirroring the scope the resolver walked them in.
                let method_closure = match &superclass {
                    Some(class) => {
                        let environment = Environment::nested(Rc::clone(&self.environment));
                        environment
                            .borrow_mut()
                            .define("super", LoxValue::Class(Rc::clone(class)));
                        environment
                    }
                    None => Rc::clone(&self.environment),
                };

                let methods: HashMap<_, _> = c
                    .methods
                    .iter()
                    .map(|method| {
                        let is_initializer = method.name.lexeme() == "init";
                        let function = LoxFunction::new(
                            Rc::clone(method),
                            Rc::clone(&method_closure),
                            is_initializer,
                        );
                        (method.name.lexeme().to_string(), Rc::new(function))
                    })
                    .collect();

                let class = LoxClass {
                    name: c.name.lexeme().to_string(),
                    superclass,
                    methods,
                };
                self.environment
                    .borrow_mut()
                    .define(c.name.lexeme(), LoxValue::Class(Rc::new(class)));
            }
        }
        Ok(())
    }

    /// Run `statements` with `environment` as the innermost scope, restoring
    /// the previous scope on every exit path - completion, runtime error and
    /// `return` unwind alike.
    pub(in crate::interpreter) fn execute_block(
        &mut self,
        statements: &[Statement],
        environment: Rc<RefCell<Environment>>,
    ) -> Result<(), RuntimeErrorOrReturn> {
        let previous = std::mem::replace(&mut self.environment, environment);
        let mut outcome = Ok(());
        for statement in statements {
            outcome = self.execute(statement);
            if outcome.is_err() {
                break;
            }
        }
        self.environment = previous;
        outcome
    }

    fn eval(&mut self, e: &Expression) -> Result<LoxValue, RuntimeErrorOrReturn> {
        match e {
            Expression::Literal(l) => Ok(l.into()),
            Expression::Grouping(g) => self.eval(&g.0),
            Expression::Unary(u) => {
                let value = self.eval(&u.operand)?;
                match u.operator.discriminant() {
                    TokenDiscriminant::Minus => match value {
                        LoxValue::Number(n) => Ok(LoxValue::Number(-n)),
                        _ => Err(RuntimeError::operands_must_be_numbers(&u.operator).into()),
                    },
                    TokenDiscriminant::Bang => Ok(LoxValue::Boolean(!value.is_truthy())),
                    _ => Err(RuntimeError::new(
                        u.operator.line(),
                        "`!` and `-` are the only valid unary operators",
                    )
                    .into()),
                }
            }
            Expression::Binary(b) => {
                let left = self.eval(&b.left)?;
                let right = self.eval(&b.right)?;
                let operator = &b.operator;
                match operator.discriminant() {
                    TokenDiscriminant::Minus => {
                        num_op(left, right, operator, |l, r| LoxValue::Number(l - r))
                    }
                    TokenDiscriminant::Plus => match (left, right) {
                        (LoxValue::Number(l), LoxValue::Number(r)) => Ok(LoxValue::Number(l + r)),
                        (LoxValue::String(l), LoxValue::String(r)) => Ok(LoxValue::String(l + &r)),
                        (_, _) => Err(RuntimeError::new(
                            operator.line(),
                            "Operands must be two numbers or two strings.",
                        )
                        .into()),
                    },
                    // IEEE-754 division: dividing by zero yields an infinity,
                    // `0 / 0` yields NaN.
                    TokenDiscriminant::Slash => {
                        num_op(left, right, operator, |l, r| LoxValue::Number(l / r))
                    }
                    TokenDiscriminant::Star => {
                        num_op(left, right, operator, |l, r| LoxValue::Number(l * r))
                    }
                    TokenDiscriminant::Greater => {
                        num_op(left, right, operator, |l, r| LoxValue::Boolean(l > r))
                    }
                    TokenDiscriminant::GreaterEqual => {
                        num_op(left, right, operator, |l, r| LoxValue::Boolean(l >= r))
                    }
                    TokenDiscriminant::Less => {
                        num_op(left, right, operator, |l, r| LoxValue::Boolean(l < r))
                    }
                    TokenDiscriminant::LessEqual => {
                        num_op(left, right, operator, |l, r| LoxValue::Boolean(l <= r))
                    }
                    TokenDiscriminant::EqualEqual => Ok(LoxValue::Boolean(left.is_equal(&right))),
                    TokenDiscriminant::BangEqual => Ok(LoxValue::Boolean(!left.is_equal(&right))),
                    _ => Err(RuntimeError::new(
                        operator.line(),
                        "It is not a valid binary operator",
                    )
                    .into()),
                }
            }
            Expression::Logical(l) => {
                let left = self.eval(&l.left)?;
                match l.operator.discriminant() {
                    TokenDiscriminant::Or if left.is_truthy() => Ok(left),
                    TokenDiscriminant::And if !left.is_truthy() => Ok(left),
                    _ => self.eval(&l.right),
                }
            }
            Expression::VariableReference(v) => self.lookup_variable(&v.identifier, v.id),
            Expression::VariableAssignment(a) => {
                let value = self.eval(&a.value)?;
                match self.locals.get(&a.id) {
                    Some(depth) => Environment::assign_at(
                        &self.environment,
                        *depth,
                        a.identifier.lexeme(),
                        value.clone(),
                    ),
                    None => {
                        if !self
                            .globals
                            .borrow_mut()
                            .assign(a.identifier.lexeme(), value.clone())
                        {
                            return Err(RuntimeError::undefined_variable(&a.identifier).into());
                        }
                    }
                }
                Ok(value)
            }
            Expression::Call(c) => {
                let callee = self.eval(&c.callee)?;
                let mut arguments = Vec::with_capacity(c.arguments.len());
                for argument in &c.arguments {
                    arguments.push(self.eval(argument)?);
                }

                let line = c.closing_parenthesis.line();
                let callable: &dyn LoxCallable = match &callee {
                    LoxValue::Function(function) => function.as_ref(),
                    LoxValue::NativeFunction(native) => native.as_ref(),
                    LoxValue::Class(class) => class,
                    _ => {
                        return Err(RuntimeError::new(
                            line,
                            "Can only call function and classes",
                        )
                        .into())
                    }
                };
                if callable.arity() != arguments.len() {
                    return Err(RuntimeError::new(
                        line,
                        format!(
                            "Expected {} arguments but got {}.",
                            callable.arity(),
                            arguments.len()
                        ),
                    )
                    .into());
                }
                callable.call(self, arguments).map_err(Into::into)
            }
            Expression::PropertyGet(g) => {
                let object = self.eval(&g.object)?;
                match object {
                    LoxValue::Instance(instance) => {
                        LoxInstance::get_property(&instance, g.name.lexeme()).ok_or_else(|| {
                            RuntimeError::undefined_property(&g.name).into()
                        })
                    }
                    _ => Err(RuntimeError::new(
                        g.name.line(),
                        "Only instances have properties.",
                    )
                    .into()),
                }
            }
            Expression::PropertySet(s) => {
                let object = self.eval(&s.object)?;
                let instance = match object {
                    LoxValue::Instance(instance) => instance,
                    _ => {
                        return Err(RuntimeError::new(
                            s.name.line(),
                            "Only instances have fields.",
                        )
                        .into())
                    }
                };
                let value = self.eval(&s.value)?;
                instance
                    .borrow_mut()
                    .set_field(s.name.lexeme(), value.clone());
                Ok(value)
            }
            Expression::This(t) => self.lookup_variable(&t.keyword, t.id),
            Expression::Super(s) => {
                let depth = *self
                    .locals
                    .get(&s.id)
                    .expect("A `super` expression escaped the resolver. This is an interpreter bug.");
                let superclass = match Environment::get_at(&self.environment, depth, "super") {
                    Some(LoxValue::Class(class)) => class,
                    _ => unreachable!("`super` is always bound to a class"),
                };
                // The receiver lives in the `this` scope nested right inside
                // the `super` one.
                let instance = match Environment::get_at(&self.environment, depth - 1, "this") {
                    Some(LoxValue::Instance(instance)) => instance,
                    _ => unreachable!("`this` is always bound to an instance"),
                };
                let method = superclass
                    .find_method(s.method.lexeme())
                    .ok_or_else(|| RuntimeError::undefined_property(&s.method))?;
                Ok(LoxValue::Function(Rc::new(method.bind(instance))))
            }
        }
    }

    /// Resolved references read from the environment exactly `depth` hops
    /// out; everything else is a global.
    fn lookup_variable(
        &self,
        identifier: &Token,
        id: ExpressionId,
    ) -> Result<LoxValue, RuntimeErrorOrReturn> {
        let value = match self.locals.get(&id) {
            Some(depth) => Environment::get_at(&self.environment, *depth, identifier.lexeme()),
            None => self.globals.borrow().get(identifier.lexeme()),
        };
        value.ok_or_else(|| RuntimeError::undefined_variable(identifier).into())
    }
}

/// Whole seconds since the Unix epoch - the single native function.
fn clock(_arguments: Vec<LoxValue>) -> Result<LoxValue, RuntimeError> {
    let elapsed = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map_err(|_| RuntimeError::without_line("The system clock went backwards."))?;
    Ok(LoxValue::Number(elapsed.as_secs() as f64))
}

/// Short-hand for evaluating numerical operations.
fn num_op<F>(
    left: LoxValue,
    right: LoxValue,
    operator: &Token,
    operation: F,
) -> Result<LoxValue, RuntimeErrorOrReturn>
where
    F: Fn(f64, f64) -> LoxValue,
{
    match (left, right) {
        (LoxValue::Number(l), LoxValue::Number(r)) => Ok(operation(l, r)),
        (_, _) => Err(RuntimeError::operands_must_be_numbers(operator).into()),
    }
}

fn into_runtime_error(e: RuntimeErrorOrReturn) -> RuntimeError {
    match e {
        RuntimeErrorOrReturn::RuntimeError(e) => e,
        // The resolver rejects top-level `return` and the call boundary
        // catches every unwind from a function body, so this arm is a
        // safety net.
        RuntimeErrorOrReturn::Return(r) => {
            RuntimeError::new(r.line, "Can't return from top-level code.")
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub(in crate::interpreter) enum RuntimeErrorOrReturn {
    #[error(transparent)]
    RuntimeError(#[from] RuntimeError),
    #[error(transparent)]
    Return(#[from] Return),
}

/// Not an error: the unwind carrier for `return` statements. It rides the
/// same propagation channel as runtime errors and is caught at the
/// function-call boundary, where it turns into the call's result.
#[derive(Debug, thiserror::Error)]
#[error("An early return was encountered")]
pub(in crate::interpreter) struct Return {
    pub(in crate::interpreter) value: LoxValue,
    pub(in crate::interpreter) line: u64,
}

#[derive(Debug)]
pub struct RuntimeError {
    line: Option<u64>,
    message: String,
}

impl RuntimeError {
    pub(in crate::interpreter) fn new(line: u64, message: impl Into<String>) -> Self {
        Self {
            line: Some(line),
            message: message.into(),
        }
    }

    fn without_line(message: impl Into<String>) -> Self {
        Self {
            line: None,
            message: message.into(),
        }
    }

    fn operands_must_be_numbers(operator: &Token) -> Self {
        Self::new(operator.line(), "Operands must be numbers.")
    }

    fn undefined_variable(identifier: &Token) -> Self {
        Self::new(
            identifier.line(),
            format!("Undefined variable '{}'.", identifier.lexeme()),
        )
    }

    fn undefined_property(name: &Token) -> Self {
        Self::new(
            name.line(),
            format!("Undefined property '{}'.", name.lexeme()),
        )
    }

    fn failed_to_print(e: std::io::Error) -> Self {
        Self::without_line(format!("Failed to execute a print statement.\n{e}"))
    }

    fn failed_to_flush(e: std::io::Error) -> Self {
        Self::without_line(format!("Failed to flush the output stream.\n{e}"))
    }
}

/// The diagnostic form for runtime failures: the message, then the line
/// marker on its own line.
impl Display for RuntimeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.line {
            Some(line) => write!(f, "{}\n[line {}]", self.message, line),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for RuntimeError {}

impl From<&LiteralExpression> for LoxValue {
    fn from(l: &LiteralExpression) -> Self {
        match l {
            LiteralExpression::Boolean(b) => LoxValue::Boolean(*b),
            LiteralExpression::Nil => LoxValue::Nil,
            LiteralExpression::String(s) => LoxValue::String(s.clone()),
            LiteralExpression::Number(n) => LoxValue::Number(*n),
        }
    }
}
