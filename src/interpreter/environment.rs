use crate::interpreter::lox_value::LoxValue;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// A single link in the runtime scope chain.
///
/// Environments are shared: closures keep the environment they were defined
/// in alive long after the enclosing block has finished, so the chain is held
/// through `Rc<RefCell<_>>` rather than owned by the interpreter's stack.
/// Instance fields can complete a reference cycle back into an environment;
/// such cycles are intentional Lox programs and are left to die with the
/// process.
#[derive(Debug, Default)]
pub struct Environment {
    enclosing: Option<Rc<RefCell<Environment>>>,
    bindings: HashMap<String, LoxValue>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh environment whose lookups fall through to `enclosing`.
    pub fn nested(enclosing: Rc<RefCell<Environment>>) -> Rc<RefCell<Environment>> {
        Rc::new(RefCell::new(Self {
            enclosing: Some(enclosing),
            bindings: HashMap::new(),
        }))
    }

    /// Bind `name` in this environment, shadowing any enclosing binding and
    /// overwriting a previous one here.
    pub fn define(&mut self, name: impl Into<String>, value: LoxValue) {
        self.bindings.insert(name.into(), value);
    }

    /// Read `name`, walking outwards through the chain.
    pub fn get(&self, name: &str) -> Option<LoxValue> {
        match self.bindings.get(name) {
            Some(value) => Some(value.clone()),
            None => self
                .enclosing
                .as_ref()
                .and_then(|enclosing| enclosing.borrow().get(name)),
        }
    }

    /// Overwrite `name` at the innermost environment that has it. Returns
    /// `false` when no environment in the chain does.
    pub fn assign(&mut self, name: &str, value: LoxValue) -> bool {
        if let Some(slot) = self.bindings.get_mut(name) {
            *slot = value;
            true
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow_mut().assign(name, value)
        } else {
            false
        }
    }

    /// The environment `depth` hops out along the `enclosing` chain.
    ///
    /// The resolver only hands out depths it has verified against its scope
    /// stack, so a missing ancestor is an interpreter bug.
    pub fn ancestor(
        environment: &Rc<RefCell<Environment>>,
        depth: usize,
    ) -> Rc<RefCell<Environment>> {
        let mut current = Rc::clone(environment);
        for _ in 0..depth {
            let enclosing = current
                .borrow()
                .enclosing
                .as_ref()
                .map(Rc::clone)
                .expect("The environment chain is shorter than a resolved depth. This is an interpreter bug.");
            current = enclosing;
        }
        current
    }

    /// Read `name` directly from the environment at `depth`, skipping the
    /// chain walk.
    pub fn get_at(
        environment: &Rc<RefCell<Environment>>,
        depth: usize,
        name: &str,
    ) -> Option<LoxValue> {
        Self::ancestor(environment, depth)
            .borrow()
            .bindings
            .get(name)
            .cloned()
    }

    /// Write `name` directly into the environment at `depth`.
    pub fn assign_at(
        environment: &Rc<RefCell<Environment>>,
        depth: usize,
        name: &str,
        value: LoxValue,
    ) {
        Self::ancestor(environment, depth)
            .borrow_mut()
            .bindings
            .insert(name.to_string(), value);
    }
}
