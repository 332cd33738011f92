use crate::interpreter::environment::Environment;
use crate::interpreter::lox_value::{LoxClass, LoxFunction, LoxInstance, LoxValue, NativeFunction};
use crate::interpreter::tree_walker::{Interpreter, RuntimeError, RuntimeErrorOrReturn};
use std::iter::zip;
use std::rc::Rc;

/// The contract shared by everything a `(...)` call site accepts: user
/// functions, native functions and classes.
pub(in crate::interpreter) trait LoxCallable {
    fn arity(&self) -> usize;
    fn call(
        &self,
        interpreter: &mut Interpreter,
        arguments: Vec<LoxValue>,
    ) -> Result<LoxValue, RuntimeError>;
}

impl LoxCallable for LoxFunction {
    fn arity(&self) -> usize {
        self.declaration.parameters.len()
    }

    fn call(
        &self,
        interpreter: &mut Interpreter,
        arguments: Vec<LoxValue>,
    ) -> Result<LoxValue, RuntimeError> {
        let environment = Environment::nested(Rc::clone(&self.closure));
        // The arity was checked at the call site, so the zip is exhaustive.
        for (parameter, argument) in zip(self.declaration.parameters.iter(), arguments) {
            environment.borrow_mut().define(parameter.lexeme(), argument);
        }

        match interpreter.execute_block(&self.declaration.body, environment) {
            Ok(()) => {
                if self.is_initializer {
                    Ok(self.bound_this())
                } else {
                    Ok(LoxValue::Nil)
                }
            }
            // This is where an unwinding `return` stops being control flow
            // and becomes the call's result value.
            Err(RuntimeErrorOrReturn::Return(r)) => {
                if self.is_initializer {
                    Ok(self.bound_this())
                } else {
                    Ok(r.value)
                }
            }
            Err(RuntimeErrorOrReturn::RuntimeError(e)) => Err(e),
        }
    }
}

impl LoxFunction {
    /// An initializer's result, whatever its body did. Initializers only run
    /// bound, so their closure's innermost environment holds `this`.
    fn bound_this(&self) -> LoxValue {
        Environment::get_at(&self.closure, 0, "this")
            .expect("An initializer was invoked without a bound `this`. This is an interpreter bug.")
    }
}

impl LoxCallable for NativeFunction {
    fn arity(&self) -> usize {
        self.arity
    }

    fn call(
        &self,
        _interpreter: &mut Interpreter,
        arguments: Vec<LoxValue>,
    ) -> Result<LoxValue, RuntimeError> {
        (self.function)(arguments)
    }
}

/// Calling a class constructs an instance of it. Implemented on the handle
/// rather than the class itself because the new instance needs to hold on to
/// its class.
impl LoxCallable for Rc<LoxClass> {
    fn arity(&self) -> usize {
        self.find_method("init")
            .map(|initializer| initializer.arity())
            .unwrap_or(0)
    }

    fn call(
        &self,
        interpreter: &mut Interpreter,
        arguments: Vec<LoxValue>,
    ) -> Result<LoxValue, RuntimeError> {
        let instance = LoxInstance::new(Rc::clone(self));
        if let Some(initializer) = self.find_method("init") {
            initializer
                .bind(Rc::clone(&instance))
                .call(interpreter, arguments)?;
        }
        Ok(LoxValue::Instance(instance))
    }
}
